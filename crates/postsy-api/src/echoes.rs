use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use postsy_core::handles::generate_pseudonym;
use postsy_core::trending::extract_hashtags;
use postsy_types::api::{
    Claims, CreateEchoRequest, FeedQuery, FeedResponse, FeedSort, VoteDirection, VoteRequest,
};
use postsy_types::events::GatewayEvent;
use postsy_types::models::Echo;

use crate::auth::AppState;
use crate::error::ApiError;

/// Display string used when the client sends no usable location.
const FALLBACK_LOCATION: &str = "Campus Area";

pub async fn create_echo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateEchoRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.moderator.check(&req.content)?;

    let pseudonym = if claims.handle.is_empty() {
        generate_pseudonym()
    } else {
        format!("@{}", claims.handle)
    };

    let location = req
        .location
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_LOCATION.to_string());

    let now = Utc::now();
    let echo = Echo {
        id: Uuid::new_v4(),
        content: req.content,
        pseudonym,
        location,
        created_at: now,
        upvotes: 0,
        downvotes: 0,
        replies: 0,
    };

    state.db.insert_echo(
        &echo.id.to_string(),
        &echo.content,
        &echo.pseudonym,
        &echo.location,
        &now.to_rfc3339(),
    )?;

    for tag in extract_hashtags(&echo.content) {
        state.db.upsert_hashtag(
            &Uuid::new_v4().to_string(),
            &tag,
            &echo.id.to_string(),
            &now.to_rfc3339(),
        )?;
    }

    info!("Echo created: {} by {}", echo.id, echo.pseudonym);

    state
        .dispatcher
        .broadcast(GatewayEvent::EchoCreated { echo: echo.clone() });

    Ok((StatusCode::CREATED, Json(echo)))
}

pub async fn get_feed(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<FeedResponse>, ApiError> {
    let limit = query.limit.min(200);
    let rows = match query.sort {
        FeedSort::New => state.db.list_echoes_new(limit)?,
        FeedSort::Hot => state.db.list_echoes_hot(limit)?,
    };

    let echoes = rows
        .into_iter()
        .map(|row| row.into_echo())
        .collect::<anyhow::Result<Vec<_>>>()?;

    Ok(Json(FeedResponse { echoes }))
}

pub async fn get_echo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Echo>, ApiError> {
    let row = state
        .db
        .get_echo(&id.to_string())?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(row.into_echo()?))
}

pub async fn vote_on_echo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<VoteRequest>,
) -> Result<Json<Echo>, ApiError> {
    let upvote = matches!(req.direction, VoteDirection::Up);
    if !state.db.vote_echo(&id.to_string(), upvote)? {
        return Err(ApiError::NotFound);
    }

    let row = state
        .db
        .get_echo(&id.to_string())?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(row.into_echo()?))
}

/// Replies live client-side in this build; the server only tracks the count.
pub async fn reply_to_echo(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Echo>, ApiError> {
    if !state.db.increment_replies(&id.to_string())? {
        return Err(ApiError::NotFound);
    }

    let row = state
        .db
        .get_echo(&id.to_string())?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(row.into_echo()?))
}
