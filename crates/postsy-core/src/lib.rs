pub mod conversations;
pub mod handles;
pub mod moderation;
pub mod notifications;
pub mod responder;
pub mod trending;
