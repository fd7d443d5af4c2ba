use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ActivityNotification, Echo, EphemeralConversation, EphemeralMessage};

// -- JWT Claims --

/// JWT claims shared across postsy-api (REST middleware) and postsy-gateway
/// (WebSocket authentication). Canonical definition lives here in
/// postsy-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub handle: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub phone_number: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub handle: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub handle: String,
    pub token: String,
}

// -- Echoes --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateEchoRequest {
    pub content: String,
    /// Reverse-geocoded display string from the client; the server falls
    /// back to "Campus Area" when absent.
    pub location: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedSort {
    #[default]
    New,
    Hot,
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub sort: FeedSort,
    #[serde(default = "default_feed_limit")]
    pub limit: usize,
}

fn default_feed_limit() -> usize {
    50
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VoteRequest {
    pub direction: VoteDirection,
}

#[derive(Debug, Serialize)]
pub struct FeedResponse {
    pub echoes: Vec<Echo>,
}

// -- Hashtags / trending --

#[derive(Debug, Deserialize)]
pub struct TrendingQuery {
    #[serde(default = "default_trending_limit")]
    pub limit: usize,
}

fn default_trending_limit() -> usize {
    10
}

#[derive(Debug, Deserialize)]
pub struct HashtagSearchQuery {
    pub q: String,
}

// -- Conversations --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StartConversationRequest {
    pub echo_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StartDirectConversationRequest {
    pub handle: String,
}

#[derive(Debug, Serialize)]
pub struct ConversationCreatedResponse {
    pub conversation_id: Uuid,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SendMessageRequest {
    pub content: String,
}

/// Limit and expiry failures are signaled through `sent`, not an error
/// status: the conversation is simply no longer accepting messages.
#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<EphemeralMessage>,
}

#[derive(Debug, Serialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<EphemeralConversation>,
}

// -- Notifications --

#[derive(Debug, Serialize)]
pub struct NotificationListResponse {
    pub notifications: Vec<ActivityNotification>,
    pub unread_count: usize,
}
