pub mod auth;
pub mod conversations;
pub mod echoes;
pub mod error;
pub mod hashtags;
pub mod middleware;
pub mod notifications;
