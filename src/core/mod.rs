// Core algorithm exports
pub mod aggregation;
pub mod consensus;
pub mod deck;
pub mod filters;

pub use aggregation::{aggregate_results, rank_scores, voted_only};
pub use consensus::{consensus_status, member_progress, DECISION_THRESHOLD};
pub use deck::{build_deck, shuffle, uniform_index, DeckBuilder, DEFAULT_DECK_SIZE};
pub use filters::{filter_restaurants, is_admissible, matches_diet};
