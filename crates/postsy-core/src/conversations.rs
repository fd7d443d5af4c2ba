use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use postsy_types::models::{
    ConversationHandles, ConversationKind, EphemeralConversation, EphemeralMessage, MessageCount,
};
use tracing::debug;
use uuid::Uuid;

use crate::handles::{generate_conversation_handles, generate_ephemeral_handle};

pub const CONVERSATION_TTL_HOURS: i64 = 24;
pub const MAX_MESSAGES_PER_SIDE: u32 = 5;

/// How much of the source echo is carried into the conversation header.
const PREVIEW_CHARS: usize = 100;

#[derive(Debug)]
pub enum SendOutcome {
    Sent(EphemeralMessage),
    /// The sender already used up their side of the message budget.
    LimitReached,
    /// Unknown, closed, or expired conversation. Silent failure.
    Unavailable,
}

/// A conversation removed by the sweep while it was still active; the
/// caller turns these into expiry notifications.
#[derive(Debug, Clone)]
pub struct ExpiredConversation {
    pub owner: Uuid,
    pub conversation_id: Uuid,
    pub context: String,
}

/// In-memory store of every user's ephemeral conversations. An explicit
/// object owned by the application state, constructed once at startup and
/// passed by reference.
#[derive(Default)]
pub struct ConversationStore {
    inner: Mutex<HashMap<Uuid, Vec<EphemeralConversation>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a conversation from an echo: two fresh distinct identities,
    /// 24h expiry, preview clipped from the echo content.
    pub fn start_from_echo(
        &self,
        owner: Uuid,
        echo_id: Uuid,
        echo_content: &str,
        now: DateTime<Utc>,
    ) -> Uuid {
        let conversation = new_conversation(
            Some(echo_id),
            clip_preview(echo_content),
            generate_conversation_handles(),
            ConversationKind::Post,
            now,
        );
        let id = conversation.id;
        let mut inner = self.inner.lock().expect("conversation store lock poisoned");
        inner.entry(owner).or_default().insert(0, conversation);
        id
    }

    /// Open (or resume) a direct conversation with a searched-up handle.
    /// An existing active direct conversation with the same counterpart is
    /// reused instead of creating a parallel thread.
    pub fn start_direct(&self, owner: Uuid, target_handle: &str, now: DateTime<Utc>) -> Uuid {
        let mut inner = self.inner.lock().expect("conversation store lock poisoned");
        let conversations = inner.entry(owner).or_default();

        if let Some(existing) = conversations.iter().find(|c| {
            c.kind == ConversationKind::Direct
                && c.handles.other == target_handle
                && c.is_active
                && !c.is_expired(now)
        }) {
            return existing.id;
        }

        let conversation = new_conversation(
            None,
            String::new(),
            ConversationHandles {
                user: generate_ephemeral_handle(),
                other: target_handle.to_string(),
            },
            ConversationKind::Direct,
            now,
        );
        let id = conversation.id;
        conversations.insert(0, conversation);
        id
    }

    /// Append a message from the owner's side.
    pub fn send(
        &self,
        owner: Uuid,
        conversation_id: Uuid,
        content: &str,
        now: DateTime<Utc>,
    ) -> SendOutcome {
        let mut inner = self.inner.lock().expect("conversation store lock poisoned");
        let Some(conversation) = inner
            .get_mut(&owner)
            .and_then(|list| list.iter_mut().find(|c| c.id == conversation_id))
        else {
            return SendOutcome::Unavailable;
        };

        if !conversation.is_active || conversation.is_expired(now) {
            return SendOutcome::Unavailable;
        }
        if conversation.message_count.user >= conversation.max_messages {
            return SendOutcome::LimitReached;
        }

        let message = EphemeralMessage {
            id: Uuid::new_v4(),
            conversation_id,
            content: content.trim().to_string(),
            sender_handle: conversation.handles.user.clone(),
            timestamp: now,
            from_owner: true,
        };
        conversation.messages.push(message.clone());
        conversation.message_count.user += 1;
        conversation.last_activity = now;
        SendOutcome::Sent(message)
    }

    /// Land a counterpart reply. Guards on the conversation still being
    /// active and under the counterpart's limit, so a reply scheduled
    /// before a close or expiry quietly evaporates instead of resurrecting
    /// a dead thread.
    pub fn record_reply(
        &self,
        owner: Uuid,
        conversation_id: Uuid,
        content: &str,
        now: DateTime<Utc>,
    ) -> Option<EphemeralMessage> {
        let mut inner = self.inner.lock().expect("conversation store lock poisoned");
        let conversation = inner
            .get_mut(&owner)
            .and_then(|list| list.iter_mut().find(|c| c.id == conversation_id))?;

        if !conversation.is_active || conversation.is_expired(now) {
            debug!("Dropping late reply for conversation {}", conversation_id);
            return None;
        }
        if conversation.message_count.other >= conversation.max_messages {
            return None;
        }

        let message = EphemeralMessage {
            id: Uuid::new_v4(),
            conversation_id,
            content: content.to_string(),
            sender_handle: conversation.handles.other.clone(),
            timestamp: now,
            from_owner: false,
        };
        conversation.messages.push(message.clone());
        conversation.message_count.other += 1;
        conversation.last_activity = now;
        Some(message)
    }

    pub fn close(&self, owner: Uuid, conversation_id: Uuid) -> bool {
        let mut inner = self.inner.lock().expect("conversation store lock poisoned");
        match inner
            .get_mut(&owner)
            .and_then(|list| list.iter_mut().find(|c| c.id == conversation_id))
        {
            Some(conversation) => {
                conversation.is_active = false;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, owner: Uuid, conversation_id: Uuid) -> Option<EphemeralConversation> {
        let inner = self.inner.lock().expect("conversation store lock poisoned");
        inner
            .get(&owner)
            .and_then(|list| list.iter().find(|c| c.id == conversation_id))
            .cloned()
    }

    /// Conversations not yet past their expiry, newest activity first.
    pub fn list_active(&self, owner: Uuid, now: DateTime<Utc>) -> Vec<EphemeralConversation> {
        let inner = self.inner.lock().expect("conversation store lock poisoned");
        let mut list: Vec<EphemeralConversation> = inner
            .get(&owner)
            .map(|conversations| {
                conversations
                    .iter()
                    .filter(|c| !c.is_expired(now))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        list.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        list
    }

    /// Prune every conversation past `expires_at`, reporting the ones that
    /// were still active so the caller can notify their owners.
    pub fn sweep(&self, now: DateTime<Utc>) -> Vec<ExpiredConversation> {
        let mut inner = self.inner.lock().expect("conversation store lock poisoned");
        let mut expired = Vec::new();

        for (&owner, conversations) in inner.iter_mut() {
            conversations.retain(|c| {
                if !c.is_expired(now) {
                    return true;
                }
                if c.is_active {
                    expired.push(ExpiredConversation {
                        owner,
                        conversation_id: c.id,
                        context: c.context_label().to_string(),
                    });
                }
                false
            });
        }

        expired
    }
}

fn new_conversation(
    echo_id: Option<Uuid>,
    echo_preview: String,
    handles: ConversationHandles,
    kind: ConversationKind,
    now: DateTime<Utc>,
) -> EphemeralConversation {
    EphemeralConversation {
        id: Uuid::new_v4(),
        echo_id,
        echo_preview,
        handles,
        messages: Vec::new(),
        created_at: now,
        expires_at: now + Duration::hours(CONVERSATION_TTL_HOURS),
        message_count: MessageCount::default(),
        max_messages: MAX_MESSAGES_PER_SIDE,
        is_active: true,
        last_activity: now,
        kind,
    }
}

fn clip_preview(content: &str) -> String {
    let mut preview: String = content.chars().take(PREVIEW_CHARS).collect();
    if content.chars().count() > PREVIEW_CHARS {
        preview.push_str("...");
    }
    preview
}
