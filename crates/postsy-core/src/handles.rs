use postsy_types::models::ConversationHandles;
use rand::Rng;

/// Per-post pseudonyms: "Wandering Scholar".
const PSEUDONYM_ADJECTIVES: &[&str] = &[
    "Wandering", "Curious", "Silent", "Mystic", "Local", "Hidden", "Anonymous",
    "Whispering", "Gentle", "Wise", "Young", "Ancient", "Peaceful", "Restless",
    "Thoughtful", "Quiet", "Bold", "Shy", "Creative", "Dreaming", "Listening",
];

const PSEUDONYM_NOUNS: &[&str] = &[
    "Yak", "Scholar", "Walker", "Dreamer", "Thinker", "Observer", "Listener",
    "Traveler", "Student", "Artist", "Writer", "Seeker", "Wanderer", "Voice",
    "Soul", "Mind", "Heart", "Spirit", "Echo", "Shadow", "Light", "Wind",
];

/// Per-conversation identities carry a trailing letter: "Whispering Voice K".
const EPHEMERAL_ADJECTIVES: &[&str] = &[
    "Whispering", "Silent", "Curious", "Thoughtful", "Gentle", "Wise", "Mysterious",
    "Wandering", "Quiet", "Peaceful", "Dreaming", "Listening", "Observing", "Reflecting",
    "Pondering", "Musing", "Contemplating", "Wondering", "Seeking", "Exploring",
];

const EPHEMERAL_NOUNS: &[&str] = &[
    "Voice", "Echo", "Whisper", "Soul", "Mind", "Spirit", "Shadow", "Light",
    "Breeze", "Thought", "Dream", "Vision", "Spark", "Flame", "Wave", "Star",
    "Moon", "Sun", "Cloud", "Rain", "Wind", "River", "Ocean", "Mountain",
];

const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";

fn pick<'a>(rng: &mut impl Rng, list: &[&'a str]) -> &'a str {
    list[rng.random_range(0..list.len())]
}

pub fn generate_pseudonym() -> String {
    let mut rng = rand::rng();
    format!(
        "{} {}",
        pick(&mut rng, PSEUDONYM_ADJECTIVES),
        pick(&mut rng, PSEUDONYM_NOUNS)
    )
}

pub fn generate_ephemeral_handle() -> String {
    let mut rng = rand::rng();
    let letter = LETTERS[rng.random_range(0..LETTERS.len())] as char;
    format!(
        "{} {} {}",
        pick(&mut rng, EPHEMERAL_ADJECTIVES),
        pick(&mut rng, EPHEMERAL_NOUNS),
        letter
    )
}

/// Two distinct identities for the two sides of a conversation.
pub fn generate_conversation_handles() -> ConversationHandles {
    let user = generate_ephemeral_handle();
    loop {
        let other = generate_ephemeral_handle();
        if other != user {
            return ConversationHandles { user, other };
        }
    }
}

/// Account handle: 2-3 letters, 3-4 digits, 1-2 letters, e.g. "KD4821X".
pub fn generate_account_handle() -> String {
    let mut rng = rand::rng();
    let mut handle = String::new();
    for _ in 0..rng.random_range(2..=3) {
        handle.push(LETTERS[rng.random_range(0..LETTERS.len())] as char);
    }
    for _ in 0..rng.random_range(3..=4) {
        handle.push(DIGITS[rng.random_range(0..DIGITS.len())] as char);
    }
    for _ in 0..rng.random_range(1..=2) {
        handle.push(LETTERS[rng.random_range(0..LETTERS.len())] as char);
    }
    handle
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_handles_are_distinct() {
        for _ in 0..100 {
            let handles = generate_conversation_handles();
            assert_ne!(handles.user, handles.other);
        }
    }

    #[test]
    fn ephemeral_handle_shape() {
        let handle = generate_ephemeral_handle();
        let parts: Vec<&str> = handle.split(' ').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[2].len(), 1);
        assert!(parts[2].chars().all(|c| c.is_ascii_uppercase()));
    }

    #[test]
    fn account_handle_shape() {
        for _ in 0..50 {
            let handle = generate_account_handle();
            assert!((6..=9).contains(&handle.len()));
            assert!(handle.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
            assert!(handle.chars().next().unwrap().is_ascii_uppercase());
            assert!(handle.chars().last().unwrap().is_ascii_uppercase());
        }
    }
}
