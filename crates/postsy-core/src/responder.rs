use std::time::Duration;

use rand::Rng;

/// The counterpart side of an ephemeral conversation. There is no second
/// human on the wire; replies come from an implementation of this trait so
/// the simulation can be swapped for a deterministic stub in tests.
pub trait CounterpartResponder: Send + Sync {
    /// How long the counterpart "thinks" before replying.
    fn reply_delay(&self) -> Duration;

    /// The reply text.
    fn compose_reply(&self) -> String;
}

const CANNED_REPLIES: &[&str] = &[
    "That's such an interesting perspective...",
    "I never thought about it that way before.",
    "Your story really resonated with me.",
    "Thanks for sharing that, it means a lot.",
    "I can relate to what you're saying.",
    "That's beautifully put.",
    "I appreciate you opening up about this.",
    "Your words are really thoughtful.",
    "Hello! Nice to connect with you.",
    "Thanks for reaching out, how are you?",
    "I'm glad we can chat like this.",
    "What's on your mind today?",
];

/// Production responder: a canned phrase after a 2-5 s pause.
pub struct SimulatedResponder;

impl CounterpartResponder for SimulatedResponder {
    fn reply_delay(&self) -> Duration {
        let jitter_ms = rand::rng().random_range(0..=3000);
        Duration::from_millis(2000 + jitter_ms)
    }

    fn compose_reply(&self) -> String {
        let mut rng = rand::rng();
        CANNED_REPLIES[rng.random_range(0..CANNED_REPLIES.len())].to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delay_stays_in_the_two_to_five_second_window() {
        let responder = SimulatedResponder;
        for _ in 0..100 {
            let delay = responder.reply_delay();
            assert!(delay >= Duration::from_millis(2000));
            assert!(delay <= Duration::from_millis(5000));
        }
    }

    #[test]
    fn replies_come_from_the_canned_list() {
        let responder = SimulatedResponder;
        let reply = responder.compose_reply();
        assert!(CANNED_REPLIES.contains(&reply.as_str()));
    }
}
