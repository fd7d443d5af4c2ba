use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{ActivityNotification, Echo, EphemeralMessage};

/// Events sent over the WebSocket gateway.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GatewayEvent {
    /// Server confirms successful authentication
    Ready { user_id: Uuid, handle: String },

    /// A new echo was posted (broadcast to everyone)
    EchoCreated { echo: Echo },

    /// A counterpart message landed in one of the user's conversations
    /// (targeted — only the conversation owner receives it)
    MessageCreate {
        conversation_id: Uuid,
        message: EphemeralMessage,
    },

    /// One of the user's conversations expired (targeted)
    ConversationExpired { conversation_id: Uuid },

    /// A new activity notification was recorded (targeted)
    NotificationCreate { notification: ActivityNotification },

    /// A user came online or went offline
    PresenceUpdate {
        user_id: Uuid,
        handle: String,
        online: bool,
    },
}

/// Commands sent FROM client TO server over WebSocket.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum GatewayCommand {
    /// Authenticate the WebSocket connection
    Identify { token: String },
}
