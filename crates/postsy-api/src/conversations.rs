use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use postsy_core::conversations::SendOutcome;
use postsy_core::notifications::NewNotification;
use postsy_types::api::{
    Claims, ConversationCreatedResponse, ConversationListResponse, SendMessageRequest,
    SendMessageResponse, StartConversationRequest, StartDirectConversationRequest,
};
use postsy_types::events::GatewayEvent;
use postsy_types::models::NotificationKind;

use crate::auth::AppState;
use crate::error::ApiError;

/// "Reply privately" on an echo: spawns a fresh anonymous thread.
pub async fn start_conversation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<StartConversationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let echo = state
        .db
        .get_echo(&req.echo_id.to_string())?
        .ok_or(ApiError::NotFound)?;

    let conversation_id =
        state
            .conversations
            .start_from_echo(claims.sub, req.echo_id, &echo.content, Utc::now());

    info!("Conversation {} opened from echo {}", conversation_id, req.echo_id);

    Ok((
        StatusCode::CREATED,
        Json(ConversationCreatedResponse { conversation_id }),
    ))
}

/// Direct thread with a searched-up account handle. Reuses an active one.
pub async fn start_direct_conversation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<StartDirectConversationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = req.handle.trim();
    if handle.is_empty() {
        return Err(ApiError::Validation("Handle is required".into()));
    }
    state.db.get_user_by_handle(handle)?.ok_or(ApiError::NotFound)?;

    let conversation_id = state
        .conversations
        .start_direct(claims.sub, handle, Utc::now());

    Ok((
        StatusCode::CREATED,
        Json(ConversationCreatedResponse { conversation_id }),
    ))
}

pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Json<ConversationListResponse> {
    Json(ConversationListResponse {
        conversations: state.conversations.list_active(claims.sub, Utc::now()),
    })
}

pub async fn get_conversation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<Json<postsy_types::models::EphemeralConversation>, ApiError> {
    state
        .conversations
        .get(claims.sub, id)
        .map(Json)
        .ok_or(ApiError::NotFound)
}

pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
    Json(req): Json<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let now = Utc::now();
    match state.conversations.send(claims.sub, id, &req.content, now) {
        SendOutcome::Sent(message) => {
            schedule_counterpart_reply(state, claims.sub, id);
            Ok(Json(SendMessageResponse {
                sent: true,
                message: Some(message),
            }))
        }
        SendOutcome::LimitReached => {
            let context = state
                .conversations
                .get(claims.sub, id)
                .map(|c| c.context_label().to_string())
                .unwrap_or_default();
            let notification = state.notifications.push(
                claims.sub,
                NewNotification {
                    kind: NotificationKind::ConversationLimitReached,
                    conversation_id: id,
                    echo_preview: context,
                    sender_handle: None,
                },
                now,
            );
            state
                .dispatcher
                .send_to_user(claims.sub, GatewayEvent::NotificationCreate { notification })
                .await;
            Ok(Json(SendMessageResponse {
                sent: false,
                message: None,
            }))
        }
        SendOutcome::Unavailable => Ok(Json(SendMessageResponse {
            sent: false,
            message: None,
        })),
    }
}

pub async fn close_conversation(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.conversations.close(claims.sub, id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

/// Models the other side of the exchange without a second human: after the
/// responder's delay, a reply lands unless the conversation was closed or
/// expired in the meantime — the store guard makes late timers harmless.
fn schedule_counterpart_reply(state: AppState, owner: Uuid, conversation_id: Uuid) {
    let responder = state.responder.clone();
    tokio::spawn(async move {
        tokio::time::sleep(responder.reply_delay()).await;

        let now = Utc::now();
        let Some(message) =
            state
                .conversations
                .record_reply(owner, conversation_id, &responder.compose_reply(), now)
        else {
            return;
        };

        let context = state
            .conversations
            .get(owner, conversation_id)
            .map(|c| c.context_label().to_string())
            .unwrap_or_default();

        let notification = state.notifications.push(
            owner,
            NewNotification {
                kind: NotificationKind::NewMessage,
                conversation_id,
                echo_preview: context,
                sender_handle: Some(message.sender_handle.clone()),
            },
            now,
        );

        state
            .dispatcher
            .send_to_user(
                owner,
                GatewayEvent::MessageCreate {
                    conversation_id,
                    message,
                },
            )
            .await;
        state
            .dispatcher
            .send_to_user(owner, GatewayEvent::NotificationCreate { notification })
            .await;
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use postsy_core::conversations::ConversationStore;
    use postsy_core::moderation::ContentModerator;
    use postsy_core::notifications::NotificationFeed;
    use postsy_core::responder::CounterpartResponder;
    use postsy_db::Database;
    use postsy_gateway::dispatcher::Dispatcher;

    use crate::auth::AppStateInner;

    /// Deterministic stand-in for the simulated counterpart.
    struct InstantResponder;

    impl CounterpartResponder for InstantResponder {
        fn reply_delay(&self) -> Duration {
            Duration::ZERO
        }

        fn compose_reply(&self) -> String {
            "echo echo".into()
        }
    }

    fn test_state() -> AppState {
        Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            conversations: ConversationStore::new(),
            notifications: NotificationFeed::new(),
            moderator: ContentModerator::new(),
            responder: Arc::new(InstantResponder),
            dispatcher: Dispatcher::new(),
            jwt_secret: "test-secret".into(),
        })
    }

    fn test_claims() -> Claims {
        Claims {
            sub: Uuid::new_v4(),
            handle: "AB123C".into(),
            exp: usize::MAX,
        }
    }

    #[tokio::test]
    async fn sent_message_gets_a_counterpart_reply() {
        let state = test_state();
        let claims = test_claims();
        let id = state
            .conversations
            .start_from_echo(claims.sub, Uuid::new_v4(), "late night walk", Utc::now());

        let response = send_message(
            State(state.clone()),
            Extension(claims.clone()),
            Path(id),
            Json(SendMessageRequest {
                content: "hello out there".into(),
            }),
        )
        .await
        .unwrap();
        assert!(response.0.sent);

        // Zero-delay responder still needs the spawned task to run
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(20)).await;

        let conversation = state.conversations.get(claims.sub, id).unwrap();
        assert_eq!(conversation.message_count.user, 1);
        assert_eq!(conversation.message_count.other, 1);
        assert_eq!(conversation.messages.last().unwrap().content, "echo echo");

        let notifications = state.notifications.list(claims.sub);
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].kind, NotificationKind::NewMessage);
    }

    #[tokio::test]
    async fn limit_reached_records_notification_and_reports_not_sent() {
        let state = test_state();
        let claims = test_claims();
        let id = state
            .conversations
            .start_from_echo(claims.sub, Uuid::new_v4(), "capped thread", Utc::now());

        for i in 0..5 {
            let response = send_message(
                State(state.clone()),
                Extension(claims.clone()),
                Path(id),
                Json(SendMessageRequest {
                    content: format!("message {i}"),
                }),
            )
            .await
            .unwrap();
            assert!(response.0.sent);
        }

        let response = send_message(
            State(state.clone()),
            Extension(claims.clone()),
            Path(id),
            Json(SendMessageRequest {
                content: "over the line".into(),
            }),
        )
        .await
        .unwrap();
        assert!(!response.0.sent);

        let notifications = state.notifications.list(claims.sub);
        assert!(
            notifications
                .iter()
                .any(|n| n.kind == NotificationKind::ConversationLimitReached)
        );
    }

    #[tokio::test]
    async fn reply_scheduled_before_close_is_discarded() {
        let state = test_state();
        let claims = test_claims();
        let id = state
            .conversations
            .start_from_echo(claims.sub, Uuid::new_v4(), "closing soon", Utc::now());

        state
            .conversations
            .send(claims.sub, id, "hello", Utc::now());
        // Close before the reply task gets a chance to run
        state.conversations.close(claims.sub, id);
        schedule_counterpart_reply(state.clone(), claims.sub, id);

        tokio::time::sleep(Duration::from_millis(20)).await;

        let conversation = state.conversations.get(claims.sub, id).unwrap();
        assert_eq!(conversation.message_count.other, 0);
        assert!(state.notifications.list(claims.sub).is_empty());
    }
}
