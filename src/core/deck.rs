use crate::models::{MemberPreferences, PreferenceChoice, Restaurant};
use rand_core::RngCore;
use std::collections::{BTreeSet, HashSet};

/// Default number of cards dealt to each member
pub const DEFAULT_DECK_SIZE: usize = 10;

/// Deals swipe decks of a configured size
///
/// # Deck rules
/// 1. No preferences, or no cuisine marked `yes`: the first cards of the pool
/// 2. More cuisine matches than cards: a uniform random sample of the matches
/// 3. Fewer matches than cards: every match, then pool order filler
#[derive(Debug, Clone, Copy)]
pub struct DeckBuilder {
    deck_size: usize,
}

impl DeckBuilder {
    pub fn new(deck_size: usize) -> Self {
        Self { deck_size }
    }

    pub fn deck_size(&self) -> usize {
        self.deck_size
    }

    /// Deal a deck for one member
    ///
    /// # Arguments
    /// * `pool` - Every restaurant available to the session
    /// * `prefs` - The member's preferences, if they have saved any
    /// * `rng` - Source of randomness for sampling oversized match sets
    pub fn deal<R: RngCore + ?Sized>(
        &self,
        pool: &[Restaurant],
        prefs: Option<&MemberPreferences>,
        rng: &mut R,
    ) -> Vec<Restaurant> {
        build_deck(pool, prefs, self.deck_size, rng)
    }
}

impl Default for DeckBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_DECK_SIZE)
    }
}

/// Build a deck of at most `deck_size` restaurants, weighted toward the
/// member's `yes` cuisines.
///
/// The result holds `min(deck_size, distinct ids in pool)` restaurants and
/// never repeats an id. Randomness is only drawn when the cuisine matches
/// outnumber the deck.
pub fn build_deck<R: RngCore + ?Sized>(
    pool: &[Restaurant],
    prefs: Option<&MemberPreferences>,
    deck_size: usize,
    rng: &mut R,
) -> Vec<Restaurant> {
    if deck_size == 0 || pool.is_empty() {
        return Vec::new();
    }

    let wanted: BTreeSet<_> = match prefs {
        Some(prefs) => prefs.cuisine.marked(PreferenceChoice::Yes).collect(),
        None => BTreeSet::new(),
    };

    let mut used: HashSet<&str> = HashSet::with_capacity(deck_size);

    if wanted.is_empty() {
        return take_in_order(pool, deck_size, &mut used);
    }

    let mut matches: Vec<&Restaurant> = Vec::new();
    for restaurant in pool {
        if wanted.contains(&restaurant.cuisine) && used.insert(restaurant.id.as_str()) {
            matches.push(restaurant);
        }
    }

    if matches.len() > deck_size {
        shuffle(&mut matches, rng);
        matches.truncate(deck_size);
        return matches.into_iter().cloned().collect();
    }

    let mut deck: Vec<Restaurant> = matches.into_iter().cloned().collect();
    let remaining = deck_size - deck.len();
    deck.extend(take_in_order(pool, remaining, &mut used));
    deck
}

/// First `count` restaurants of the pool whose ids are not yet in `used`
fn take_in_order<'a>(
    pool: &'a [Restaurant],
    count: usize,
    used: &mut HashSet<&'a str>,
) -> Vec<Restaurant> {
    let mut picked = Vec::with_capacity(count);
    for restaurant in pool {
        if picked.len() == count {
            break;
        }
        if used.insert(restaurant.id.as_str()) {
            picked.push(restaurant.clone());
        }
    }
    picked
}

/// In-place Fisher-Yates shuffle
pub fn shuffle<T, R: RngCore + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = uniform_index(rng, i + 1);
        items.swap(i, j);
    }
}

/// Unbiased index in `0..bound`, rejecting the tail of the u64 range that
/// would skew a plain modulo
#[inline]
pub fn uniform_index<R: RngCore + ?Sized>(rng: &mut R, bound: usize) -> usize {
    let bound = bound as u64;
    let zone = u64::MAX - (u64::MAX % bound);
    loop {
        let value = rng.next_u64();
        if value < zone {
            return (value % bound) as usize;
        }
    }
}
