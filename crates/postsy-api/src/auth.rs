use std::sync::Arc;

use anyhow::anyhow;
use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Extension, Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use postsy_core::conversations::ConversationStore;
use postsy_core::handles::generate_account_handle;
use postsy_core::moderation::ContentModerator;
use postsy_core::notifications::NotificationFeed;
use postsy_core::responder::CounterpartResponder;
use postsy_db::Database;
use postsy_gateway::dispatcher::Dispatcher;
use postsy_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};

use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub conversations: ConversationStore,
    pub notifications: NotificationFeed,
    pub moderator: ContentModerator,
    pub responder: Arc<dyn CounterpartResponder>,
    pub dispatcher: Dispatcher,
    pub jwt_secret: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Validate input
    if !req.email.contains('@') || req.email.len() < 5 {
        return Err(ApiError::Validation("Invalid email address".into()));
    }
    if req.phone_number.trim().is_empty() {
        return Err(ApiError::Validation("Phone number is required".into()));
    }
    if req.password.len() < 8 {
        return Err(ApiError::Validation("Password must be at least 8 characters".into()));
    }

    if state.db.get_user_by_email(&req.email)?.is_some() {
        return Err(ApiError::Conflict("An account with this email already exists"));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(anyhow!("password hashing failed: {e}")))?
        .to_string();

    // Generated handles collide rarely; retry until free
    let handle = loop {
        let candidate = generate_account_handle();
        if !state.db.handle_taken(&candidate)? {
            break candidate;
        }
    };

    let user_id = Uuid::new_v4();
    state.db.create_user(
        &user_id.to_string(),
        &req.email,
        &req.phone_number,
        &handle,
        &password_hash,
        &Utc::now().to_rfc3339(),
    )?;

    let token = create_token(&state.jwt_secret, user_id, &handle)
        .map_err(|e| ApiError::Internal(anyhow!("token creation failed: {e}")))?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            user_id,
            handle,
            token,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .get_user_by_email(&req.email)?
        .ok_or(ApiError::Unauthorized)?;

    // Verify password
    let parsed_hash =
        PasswordHash::new(&user.password).map_err(|e| ApiError::Internal(anyhow!("stored hash unreadable: {e}")))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::Unauthorized)?;

    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|_| ApiError::Internal(anyhow!("malformed user id: {}", user.id)))?;

    let token = create_token(&state.jwt_secret, user_id, &user.handle)
        .map_err(|e| ApiError::Internal(anyhow!("token creation failed: {e}")))?;

    Ok(Json(LoginResponse {
        user_id,
        handle: user.handle,
        token,
    }))
}

/// Profile of the authenticated account.
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<Json<postsy_types::models::User>, ApiError> {
    let row = state
        .db
        .get_user_by_id(&claims.sub.to_string())?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(row.into_user()?))
}

fn create_token(secret: &str, user_id: Uuid, handle: &str) -> anyhow::Result<String> {
    let claims = Claims {
        sub: user_id,
        handle: handle.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{DecodingKey, Validation, decode};

    #[test]
    fn password_hashing_round_trip() {
        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(b"correct horse battery", &salt)
            .unwrap()
            .to_string();

        let parsed = PasswordHash::new(&hash).unwrap();
        assert!(
            Argon2::default()
                .verify_password(b"correct horse battery", &parsed)
                .is_ok()
        );
        assert!(
            Argon2::default()
                .verify_password(b"wrong password", &parsed)
                .is_err()
        );
    }

    #[test]
    fn tokens_decode_back_to_their_claims() {
        let user_id = Uuid::new_v4();
        let token = create_token("test-secret", user_id, "AB123C").unwrap();

        let decoded = decode::<Claims>(
            &token,
            &DecodingKey::from_secret(b"test-secret"),
            &Validation::default(),
        )
        .unwrap();
        assert_eq!(decoded.claims.sub, user_id);
        assert_eq!(decoded.claims.handle, "AB123C");
    }
}
