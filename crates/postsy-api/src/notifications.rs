use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

use postsy_types::api::{Claims, NotificationListResponse};

use crate::auth::AppState;
use crate::error::ApiError;

pub async fn list_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Json<NotificationListResponse> {
    let notifications = state.notifications.list(claims.sub);
    let unread_count = state.notifications.unread_count(claims.sub);
    Json(NotificationListResponse {
        notifications,
        unread_count,
    })
}

pub async fn mark_notification_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if state.notifications.mark_read(claims.sub, id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound)
    }
}

pub async fn clear_notifications(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> StatusCode {
    state.notifications.clear(claims.sub);
    StatusCode::NO_CONTENT
}
