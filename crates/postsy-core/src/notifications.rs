use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use postsy_types::models::{ActivityNotification, NotificationKind};
use uuid::Uuid;

/// Only the most recent entries are kept per user.
pub const MAX_NOTIFICATIONS: usize = 50;

/// What happened, before the feed stamps it with id/time/read-state.
#[derive(Debug, Clone)]
pub struct NewNotification {
    pub kind: NotificationKind,
    pub conversation_id: Uuid,
    pub echo_preview: String,
    pub sender_handle: Option<String>,
}

/// Per-user activity feed, newest first, capped at 50 entries.
#[derive(Default)]
pub struct NotificationFeed {
    inner: Mutex<HashMap<Uuid, Vec<ActivityNotification>>>,
}

impl NotificationFeed {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &self,
        owner: Uuid,
        notification: NewNotification,
        now: DateTime<Utc>,
    ) -> ActivityNotification {
        let entry = ActivityNotification {
            id: Uuid::new_v4(),
            kind: notification.kind,
            conversation_id: notification.conversation_id,
            echo_preview: notification.echo_preview,
            timestamp: now,
            is_read: false,
            sender_handle: notification.sender_handle,
        };

        let mut inner = self.inner.lock().expect("notification feed lock poisoned");
        let feed = inner.entry(owner).or_default();
        feed.insert(0, entry.clone());
        feed.truncate(MAX_NOTIFICATIONS);
        entry
    }

    pub fn list(&self, owner: Uuid) -> Vec<ActivityNotification> {
        let inner = self.inner.lock().expect("notification feed lock poisoned");
        inner.get(&owner).cloned().unwrap_or_default()
    }

    pub fn mark_read(&self, owner: Uuid, notification_id: Uuid) -> bool {
        let mut inner = self.inner.lock().expect("notification feed lock poisoned");
        match inner
            .get_mut(&owner)
            .and_then(|feed| feed.iter_mut().find(|n| n.id == notification_id))
        {
            Some(notification) => {
                notification.is_read = true;
                true
            }
            None => false,
        }
    }

    pub fn clear(&self, owner: Uuid) {
        let mut inner = self.inner.lock().expect("notification feed lock poisoned");
        inner.remove(&owner);
    }

    pub fn unread_count(&self, owner: Uuid) -> usize {
        let inner = self.inner.lock().expect("notification feed lock poisoned");
        inner
            .get(&owner)
            .map(|feed| feed.iter().filter(|n| !n.is_read).count())
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: NotificationKind) -> NewNotification {
        NewNotification {
            kind,
            conversation_id: Uuid::new_v4(),
            echo_preview: "some echo".into(),
            sender_handle: None,
        }
    }

    #[test]
    fn feed_is_capped_and_newest_first() {
        let feed = NotificationFeed::new();
        let owner = Uuid::new_v4();
        let now = Utc::now();

        let mut last_id = None;
        for _ in 0..60 {
            last_id = Some(feed.push(owner, event(NotificationKind::NewMessage), now).id);
        }

        let list = feed.list(owner);
        assert_eq!(list.len(), MAX_NOTIFICATIONS);
        assert_eq!(Some(list[0].id), last_id);
    }

    #[test]
    fn read_flag_and_unread_count() {
        let feed = NotificationFeed::new();
        let owner = Uuid::new_v4();
        let now = Utc::now();

        let first = feed.push(owner, event(NotificationKind::NewMessage), now);
        feed.push(owner, event(NotificationKind::ConversationExpired), now);
        assert_eq!(feed.unread_count(owner), 2);

        assert!(feed.mark_read(owner, first.id));
        assert_eq!(feed.unread_count(owner), 1);

        // Unknown id is a no-op
        assert!(!feed.mark_read(owner, Uuid::new_v4()));

        feed.clear(owner);
        assert!(feed.list(owner).is_empty());
        assert_eq!(feed.unread_count(owner), 0);
    }

    #[test]
    fn feeds_are_per_user() {
        let feed = NotificationFeed::new();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let now = Utc::now();

        feed.push(a, event(NotificationKind::ConversationLimitReached), now);
        assert_eq!(feed.list(a).len(), 1);
        assert!(feed.list(b).is_empty());
    }
}
