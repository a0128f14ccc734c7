// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Category, ChoiceSet, ConsensusStatus, Cuisine, DietTag, DistanceLevel, Member, MemberPreferences,
    MemberProgress, PreferenceChoice, PriceRange, Restaurant, RestaurantScore, SessionState, SpiceLevel,
    SwipeMap, SwipeTable, SwipeValue,
};
pub use requests::{CreateSessionRequest, JoinSessionRequest, RecordSwipeRequest};
pub use responses::{DeckResponse, ErrorResponse, HealthResponse, MembershipResponse, ResultsResponse};
