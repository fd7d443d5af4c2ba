use std::time::Duration;

use chrono::Utc;
use tracing::info;

use postsy_api::auth::AppState;
use postsy_core::notifications::NewNotification;
use postsy_types::events::GatewayEvent;
use postsy_types::models::NotificationKind;

/// Background task that prunes expired conversations.
///
/// Runs on an interval, drops every conversation past its `expires_at`
/// timestamp, and notifies owners of the ones that were still active.
pub async fn run_sweep_loop(state: AppState, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        interval.tick().await;

        let now = Utc::now();
        let expired = state.conversations.sweep(now);
        if expired.is_empty() {
            continue;
        }

        info!("Sweep: pruned {} expired conversations", expired.len());

        for conversation in expired {
            let notification = state.notifications.push(
                conversation.owner,
                NewNotification {
                    kind: NotificationKind::ConversationExpired,
                    conversation_id: conversation.conversation_id,
                    echo_preview: conversation.context,
                    sender_handle: None,
                },
                now,
            );

            state
                .dispatcher
                .send_to_user(
                    conversation.owner,
                    GatewayEvent::ConversationExpired {
                        conversation_id: conversation.conversation_id,
                    },
                )
                .await;
            state
                .dispatcher
                .send_to_user(
                    conversation.owner,
                    GatewayEvent::NotificationCreate { notification },
                )
                .await;
        }
    }
}
