mod sweep;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    extract::{State, WebSocketUpgrade},
    middleware,
    response::IntoResponse,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use postsy_api::auth::{self, AppState, AppStateInner};
use postsy_api::middleware::require_auth;
use postsy_api::{conversations, echoes, hashtags, notifications};
use postsy_core::conversations::ConversationStore;
use postsy_core::moderation::ContentModerator;
use postsy_core::notifications::NotificationFeed;
use postsy_core::responder::SimulatedResponder;
use postsy_gateway::connection;
use postsy_gateway::dispatcher::Dispatcher;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "postsy=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("POSTSY_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("POSTSY_DB_PATH").unwrap_or_else(|_| "postsy.db".into());
    let host = std::env::var("POSTSY_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("POSTSY_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let sweep_interval: u64 = std::env::var("POSTSY_SWEEP_INTERVAL_SECS")
        .unwrap_or_else(|_| "60".into())
        .parse()?;

    // Init database
    let db = postsy_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let dispatcher = Dispatcher::new();
    let state: AppState = Arc::new(AppStateInner {
        db,
        conversations: ConversationStore::new(),
        notifications: NotificationFeed::new(),
        moderator: ContentModerator::new(),
        responder: Arc::new(SimulatedResponder),
        dispatcher: dispatcher.clone(),
        jwt_secret: jwt_secret.clone(),
    });

    // Expiry sweep runs for the life of the process
    tokio::spawn(sweep::run_sweep_loop(state.clone(), sweep_interval));

    // Routes
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/auth/me", get(auth::me))
        .route("/echoes", post(echoes::create_echo).get(echoes::get_feed))
        .route("/echoes/{echo_id}", get(echoes::get_echo))
        .route("/echoes/{echo_id}/vote", post(echoes::vote_on_echo))
        .route("/echoes/{echo_id}/reply", post(echoes::reply_to_echo))
        .route("/trending", get(hashtags::get_trending))
        .route("/hashtags/search", get(hashtags::search_hashtags))
        .route("/hashtags/{tag}/echoes", get(hashtags::echoes_for_hashtag))
        .route(
            "/conversations",
            post(conversations::start_conversation).get(conversations::list_conversations),
        )
        .route("/conversations/direct", post(conversations::start_direct_conversation))
        .route("/conversations/{conversation_id}", get(conversations::get_conversation))
        .route(
            "/conversations/{conversation_id}/messages",
            post(conversations::send_message),
        )
        .route(
            "/conversations/{conversation_id}/close",
            post(conversations::close_conversation),
        )
        .route(
            "/notifications",
            get(notifications::list_notifications).delete(notifications::clear_notifications),
        )
        .route(
            "/notifications/{notification_id}/read",
            post(notifications::mark_notification_read),
        )
        .layer(middleware::from_fn(require_auth))
        .with_state(state.clone());

    let ws_route = Router::new()
        .route("/gateway", get(ws_upgrade))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(ws_route)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Postsy server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> impl IntoResponse {
    ws.on_upgrade(move |socket| {
        connection::handle_connection(
            socket,
            state.dispatcher.clone(),
            state.jwt_secret.clone(),
        )
    })
}
