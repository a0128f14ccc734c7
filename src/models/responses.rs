use serde::{Deserialize, Serialize};
use crate::models::domain::{ConsensusStatus, Member, MemberProgress, Restaurant, RestaurantScore, SessionState};

/// Response for create and join endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipResponse {
    pub session: SessionState,
    pub member: Member,
}

/// Deck dealt to one member
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeckResponse {
    #[serde(rename = "memberId")]
    pub member_id: String,
    pub restaurants: Vec<Restaurant>,
    #[serde(rename = "deckSize")]
    pub deck_size: usize,
}

/// Group results: ranking, consensus and per-member progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub scores: Vec<RestaurantScore>,
    pub consensus: ConsensusStatus,
    pub members: Vec<MemberProgress>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub restaurants: usize,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
