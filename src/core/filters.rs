use crate::models::{ChoiceSet, DietTag, MemberPreferences, PreferenceChoice, Restaurant};

/// Check whether a restaurant survives a member's preferences
///
/// Cuisine, price, distance and spice each carry a single value and go
/// through [`ChoiceSet::excludes`]. Diet is a set on the restaurant side and
/// is checked by [`matches_diet`].
#[inline]
pub fn is_admissible(restaurant: &Restaurant, prefs: &MemberPreferences) -> bool {
    if prefs.cuisine.excludes(restaurant.cuisine) {
        return false;
    }

    if prefs.price.excludes(restaurant.price_range) {
        return false;
    }

    if prefs.distance.excludes(restaurant.distance_level) {
        return false;
    }

    if prefs.spice.excludes(restaurant.spiciness_level) {
        return false;
    }

    matches_diet(restaurant, &prefs.diet)
}

/// Diet check: every `yes` tag is required, any `no` tag disqualifies
#[inline]
pub fn matches_diet(restaurant: &Restaurant, diet: &ChoiceSet<DietTag>) -> bool {
    let has_all_required = diet
        .marked(PreferenceChoice::Yes)
        .all(|tag| restaurant.diet_tags.contains(&tag));
    if !has_all_required {
        return false;
    }

    !diet
        .marked(PreferenceChoice::No)
        .any(|tag| restaurant.diet_tags.contains(&tag))
}

/// Keep the restaurants a member would accept, in input order
///
/// Without preferences every restaurant is kept.
pub fn filter_restaurants(
    restaurants: &[Restaurant],
    prefs: Option<&MemberPreferences>,
) -> Vec<Restaurant> {
    match prefs {
        Some(prefs) => restaurants
            .iter()
            .filter(|restaurant| is_admissible(restaurant, prefs))
            .cloned()
            .collect(),
        None => restaurants.to_vec(),
    }
}
