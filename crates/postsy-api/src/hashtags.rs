use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use uuid::Uuid;

use postsy_core::trending::trending_topics;
use postsy_types::api::{FeedResponse, HashtagSearchQuery, TrendingQuery};
use postsy_types::models::{Hashtag, TrendingTopic};

use crate::auth::AppState;
use crate::error::ApiError;

pub async fn get_trending(
    State(state): State<AppState>,
    Query(query): Query<TrendingQuery>,
) -> Result<Json<Vec<TrendingTopic>>, ApiError> {
    let hashtags = load_hashtags(&state)?;
    Ok(Json(trending_topics(&hashtags, query.limit, Utc::now())))
}

pub async fn search_hashtags(
    State(state): State<AppState>,
    Query(query): Query<HashtagSearchQuery>,
) -> Result<Json<Vec<Hashtag>>, ApiError> {
    let term = query.q.trim().trim_start_matches('#').to_lowercase();
    if term.is_empty() {
        return Ok(Json(vec![]));
    }

    let mut hashtags = Vec::new();
    for row in state.db.search_hashtags(&term)? {
        let echo_ids = echo_ids_for(&state, &row.tag)?;
        hashtags.push(row.into_hashtag(echo_ids)?);
    }
    Ok(Json(hashtags))
}

/// All echoes that used a tag, newest first.
pub async fn echoes_for_hashtag(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<Json<FeedResponse>, ApiError> {
    let normalized = normalize_tag(&tag);
    state.db.get_hashtag(&normalized)?.ok_or(ApiError::NotFound)?;

    let mut echoes = Vec::new();
    for echo_id in state.db.echo_ids_for_tag(&normalized)? {
        if let Some(row) = state.db.get_echo(&echo_id)? {
            echoes.push(row.into_echo()?);
        }
    }
    echoes.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    Ok(Json(FeedResponse { echoes }))
}

fn normalize_tag(raw: &str) -> String {
    let lower = raw.trim().to_lowercase();
    if lower.starts_with('#') {
        lower
    } else {
        format!("#{lower}")
    }
}

fn load_hashtags(state: &AppState) -> Result<Vec<Hashtag>, ApiError> {
    let mut hashtags = Vec::new();
    for row in state.db.list_hashtags()? {
        let echo_ids = echo_ids_for(state, &row.tag)?;
        hashtags.push(row.into_hashtag(echo_ids)?);
    }
    Ok(hashtags)
}

fn echo_ids_for(state: &AppState, tag: &str) -> Result<Vec<Uuid>, ApiError> {
    let mut ids = Vec::new();
    for raw in state.db.echo_ids_for_tag(tag)? {
        if let Ok(id) = raw.parse() {
            ids.push(id);
        }
    }
    Ok(ids)
}
