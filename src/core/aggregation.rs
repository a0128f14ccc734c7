use crate::models::{Member, Restaurant, RestaurantScore, SwipeTable, SwipeValue};
use std::cmp::Ordering;

/// Tally every member's swipes into a ranked score list
///
/// Every input restaurant gets a score, including ones nobody has voted on;
/// use [`voted_only`] to drop those before presenting results.
///
/// # Ranking
/// Score descending, then like count descending. Anything still tied keeps
/// its input order.
pub fn aggregate_results(
    restaurants: &[Restaurant],
    swipes: &SwipeTable,
    members: &[Member],
) -> Vec<RestaurantScore> {
    let total_members = members.len();

    let mut scores: Vec<RestaurantScore> = restaurants
        .iter()
        .map(|restaurant| score_restaurant(restaurant, swipes, members, total_members))
        .collect();

    rank_scores(&mut scores);
    scores
}

/// Stable sort by score, then like count, both descending
pub fn rank_scores(scores: &mut [RestaurantScore]) {
    scores.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| b.like_count.cmp(&a.like_count))
    });
}

fn score_restaurant(
    restaurant: &Restaurant,
    swipes: &SwipeTable,
    members: &[Member],
    total_members: usize,
) -> RestaurantScore {
    let mut like_count = 0;
    let mut dislike_count = 0;
    let mut liked_by = Vec::new();

    for member in members {
        let vote = swipes
            .get(&member.id)
            .and_then(|votes| votes.get(&restaurant.id));

        match vote {
            Some(SwipeValue::Like) => {
                like_count += 1;
                liked_by.push(member.name.clone());
            }
            Some(SwipeValue::Dislike) => dislike_count += 1,
            Some(SwipeValue::Neutral) | None => {}
        }
    }

    let score = if total_members > 0 {
        like_count as f64 / total_members as f64
    } else {
        0.0
    };

    RestaurantScore {
        restaurant: restaurant.clone(),
        like_count,
        dislike_count,
        score,
        liked_by,
    }
}

/// Drop restaurants without a single like or dislike, keeping rank order
pub fn voted_only(scores: Vec<RestaurantScore>) -> Vec<RestaurantScore> {
    scores.into_iter().filter(RestaurantScore::has_votes).collect()
}
