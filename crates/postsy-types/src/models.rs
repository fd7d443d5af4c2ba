use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub phone_number: String,
    pub handle: String,
    pub created_at: DateTime<Utc>,
}

/// An anonymous post. Counters only ever go up; echoes are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Echo {
    pub id: Uuid,
    pub content: String,
    pub pseudonym: String,
    pub location: String,
    pub created_at: DateTime<Utc>,
    pub upvotes: i64,
    pub downvotes: i64,
    pub replies: i64,
}

impl Echo {
    /// Net score used by the "hot" feed ordering.
    pub fn score(&self) -> i64 {
        self.upvotes - self.downvotes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Up,
    Down,
    Stable,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hashtag {
    pub id: Uuid,
    /// Normalized form, always lowercase with the leading '#'.
    pub tag: String,
    pub count: u64,
    pub trend: TrendDirection,
    pub echo_ids: Vec<Uuid>,
    pub created_at: DateTime<Utc>,
    pub last_used: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendingTopic {
    pub hashtag: Hashtag,
    pub score: f64,
    pub rank: usize,
    pub is_hot: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    Post,
    Direct,
}

/// The two generated display identities inside one conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationHandles {
    pub user: String,
    pub other: String,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MessageCount {
    pub user: u32,
    pub other: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EphemeralMessage {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub content: String,
    pub sender_handle: String,
    pub timestamp: DateTime<Utc>,
    pub from_owner: bool,
}

/// A private chat thread spawned from an echo or a direct search.
/// Limited both in time (24h) and in messages per side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EphemeralConversation {
    pub id: Uuid,
    pub echo_id: Option<Uuid>,
    pub echo_preview: String,
    pub handles: ConversationHandles,
    pub messages: Vec<EphemeralMessage>,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub message_count: MessageCount,
    pub max_messages: u32,
    pub is_active: bool,
    pub last_activity: DateTime<Utc>,
    pub kind: ConversationKind,
}

impl EphemeralConversation {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    /// Fallback label shown when the conversation has no source echo.
    pub fn context_label(&self) -> &str {
        if self.echo_preview.is_empty() {
            "Direct conversation"
        } else {
            &self.echo_preview
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewMessage,
    ConversationExpired,
    ConversationLimitReached,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityNotification {
    pub id: Uuid,
    pub kind: NotificationKind,
    pub conversation_id: Uuid,
    pub echo_preview: String,
    pub timestamp: DateTime<Utc>,
    pub is_read: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sender_handle: Option<String>,
}
