use serde::{Deserialize, Serialize};
use validator::Validate;
use crate::models::domain::SwipeValue;

/// Request to open a new session
///
/// Blank or missing names fall back to the session and member defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CreateSessionRequest {
    #[validate(length(max = 80))]
    #[serde(default)]
    pub name: Option<String>,
    #[validate(length(max = 40))]
    #[serde(default, alias = "member_name", rename = "memberName")]
    pub member_name: Option<String>,
}

/// Request to join an existing session
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct JoinSessionRequest {
    #[validate(length(max = 40))]
    #[serde(default, alias = "member_name", rename = "memberName")]
    pub member_name: Option<String>,
}

/// Request to record one swipe
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordSwipeRequest {
    #[validate(length(min = 1))]
    #[serde(alias = "restaurant_id", rename = "restaurantId")]
    pub restaurant_id: String,
    pub value: SwipeValue,
}
