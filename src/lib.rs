//! FoodSwipe Algo - deck building and consensus engine for group dining
//!
//! Members of a session mark cuisines, prices, distances, spice levels and
//! diets as yes/no/neutral, swipe through a deck dealt from those
//! preferences, and the swipes are aggregated into a ranked group result.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{aggregate_results, build_deck, consensus_status, filter_restaurants, DeckBuilder};
pub use crate::models::{ConsensusStatus, MemberPreferences, PreferenceChoice, Restaurant, RestaurantScore, SwipeValue};
