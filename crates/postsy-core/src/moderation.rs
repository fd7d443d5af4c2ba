use regex::Regex;
use thiserror::Error;

/// Why a piece of content was turned away. The `Display` strings are
/// user-facing and surface verbatim in API error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("Content contains inappropriate language")]
    Inappropriate,
    #[error("Content appears to be spam")]
    Spam,
    #[error("Content is too short")]
    TooShort,
    #[error("Content is too long")]
    TooLong,
    #[error("Content reads as overly negative")]
    Negative,
    #[error("Content uses too much capitalization")]
    ExcessiveCaps,
    #[error("Content appears to share personal information")]
    PersonalInfo,
}

const MIN_CONTENT_CHARS: usize = 3;
const MAX_CONTENT_CHARS: usize = 280;

const BANNED_WORDS: &[&str] = &["hate", "spam", "abuse", "harassment", "threat", "violence"];

const NEGATIVE_WORDS: &[&str] = &[
    "terrible", "awful", "horrible", "worst", "useless", "pathetic",
    "disgusting", "miserable", "stupid", "idiot", "moron", "dumb",
];

const POSITIVE_WORDS: &[&str] = &[
    "love", "great", "good", "happy", "thanks", "awesome", "beautiful",
    "appreciate", "glad", "wonderful",
];

/// Fixed ordered rule chain gating post content. First matching rule wins;
/// there is no scoring and no external service.
pub struct ContentModerator {
    url: Regex,
    digit_run: Regex,
    phone: Regex,
    email: Regex,
    address: Regex,
}

impl Default for ContentModerator {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentModerator {
    pub fn new() -> Self {
        Self {
            url: Regex::new(r"https?://\S+").expect("URL pattern is valid"),
            digit_run: Regex::new(r"\d{10,}").expect("digit-run pattern is valid"),
            phone: Regex::new(r"\b\d{3}[-.\s]?\d{3}[-.\s]?\d{4}\b")
                .expect("phone pattern is valid"),
            email: Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}")
                .expect("email pattern is valid"),
            address: Regex::new(
                r"(?i)\b\d+\s+[A-Za-z]+\s+(street|st|avenue|ave|road|rd|drive|dr|lane|ln|boulevard|blvd|court|ct)\b",
            )
            .expect("address pattern is valid"),
        }
    }

    pub fn check(&self, content: &str) -> Result<(), Rejection> {
        let lower = content.to_lowercase();

        if BANNED_WORDS.iter().any(|word| lower.contains(word)) {
            return Err(Rejection::Inappropriate);
        }

        if self.url.is_match(content)
            || self.digit_run.is_match(content)
            || has_repeated_chars(content)
            || has_repeated_phrase(&lower)
        {
            return Err(Rejection::Spam);
        }

        let len = content.chars().count();
        if len < MIN_CONTENT_CHARS {
            return Err(Rejection::TooShort);
        }
        if len > MAX_CONTENT_CHARS {
            return Err(Rejection::TooLong);
        }

        let negative_hits = NEGATIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();
        let positive_hits = POSITIVE_WORDS.iter().filter(|w| lower.contains(*w)).count();
        if negative_hits >= 3 && positive_hits == 0 {
            return Err(Rejection::Negative);
        }

        if has_excessive_caps(content) {
            return Err(Rejection::ExcessiveCaps);
        }

        if self.phone.is_match(content)
            || self.email.is_match(content)
            || self.address.is_match(content)
        {
            return Err(Rejection::PersonalInfo);
        }

        Ok(())
    }
}

/// Five or more identical characters in a row, e.g. "hellooooo".
/// Done by hand since the regex crate has no backreferences.
fn has_repeated_chars(content: &str) -> bool {
    let mut last: Option<char> = None;
    let mut run = 0usize;
    for c in content.chars() {
        if Some(c) == last {
            run += 1;
            if run >= 5 {
                return true;
            }
        } else {
            last = Some(c);
            run = 1;
        }
    }
    false
}

/// The same word or short phrase (up to three words) three or more times
/// in a row, e.g. "buy now buy now buy now".
fn has_repeated_phrase(lower: &str) -> bool {
    let words: Vec<&str> = lower.split_whitespace().collect();
    for size in 1..=3 {
        if words.len() < size * 3 {
            continue;
        }
        for start in 0..=(words.len() - size * 3) {
            let first = &words[start..start + size];
            if (1..3).all(|k| words[start + k * size..start + (k + 1) * size] == *first) {
                return true;
            }
        }
    }
    false
}

/// More than half of the words are fully upper-case. Single-letter words
/// ("I", "A") don't count, and very short content is left alone.
fn has_excessive_caps(content: &str) -> bool {
    let words: Vec<&str> = content
        .split_whitespace()
        .filter(|w| w.chars().filter(|c| c.is_alphabetic()).count() >= 2)
        .collect();

    if words.len() < 4 {
        return false;
    }

    let caps = words
        .iter()
        .filter(|w| w.chars().filter(|c| c.is_alphabetic()).all(|c| c.is_uppercase()))
        .count();

    caps * 2 > words.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn moderator() -> ContentModerator {
        ContentModerator::new()
    }

    #[test]
    fn banned_words_rejected() {
        for content in [
            "I hate mondays",
            "this is spam honestly",
            "stop the harassment here",
        ] {
            assert_eq!(moderator().check(content), Err(Rejection::Inappropriate));
        }
    }

    #[test]
    fn spam_patterns_rejected() {
        let m = moderator();
        assert_eq!(m.check("check out https://example.com now"), Err(Rejection::Spam));
        assert_eq!(m.check("whyyyyy is this happening"), Err(Rejection::Spam));
        assert_eq!(m.check("call 12345678901 today"), Err(Rejection::Spam));
        assert_eq!(m.check("buy now buy now buy now"), Err(Rejection::Spam));
        assert_eq!(m.check("wow wow wow what a day"), Err(Rejection::Spam));
        assert_eq!(
            m.check("click this link click this link click this link"),
            Err(Rejection::Spam)
        );
        // Twice is emphasis, not spam
        assert!(m.check("buy now buy now while it lasts").is_ok());
    }

    #[test]
    fn length_bounds() {
        let m = moderator();
        assert_eq!(m.check("hi"), Err(Rejection::TooShort));

        // 281 chars; alternating so the repeated-char rule stays quiet
        let mut long = String::new();
        for i in 0..281 {
            long.push(if i % 2 == 0 { 'x' } else { 'y' });
        }
        assert_eq!(long.chars().count(), 281);
        assert_eq!(m.check(&long), Err(Rejection::TooLong));

        let mut at_limit = String::new();
        for i in 0..280 {
            at_limit.push(if i % 2 == 0 { 'x' } else { 'y' });
        }
        assert!(m.check(&at_limit).is_ok());
    }

    #[test]
    fn negativity_needs_three_hits_and_no_positives() {
        let m = moderator();
        assert_eq!(
            m.check("terrible awful horrible day"),
            Err(Rejection::Negative)
        );
        // A single positive word defuses the heuristic
        assert!(m.check("terrible awful horrible but thanks anyway").is_ok());
        // Two hits are not enough
        assert!(m.check("terrible awful day out there").is_ok());
    }

    #[test]
    fn shouting_rejected() {
        let m = moderator();
        assert_eq!(
            m.check("WHY IS EVERYONE SO loud today"),
            Err(Rejection::ExcessiveCaps)
        );
        assert!(m.check("OK but the rest is lowercase text").is_ok());
        // Fewer than four counted words is emphasis, not shouting
        assert!(m.check("HELLO WORLD OK").is_ok());
    }

    #[test]
    fn personal_information_rejected() {
        let m = moderator();
        assert_eq!(m.check("text me at 555-123-4567"), Err(Rejection::PersonalInfo));
        assert_eq!(
            m.check("mail me at someone@example.com"),
            Err(Rejection::PersonalInfo)
        );
        assert_eq!(
            m.check("I live at 42 Maple Street come by"),
            Err(Rejection::PersonalInfo)
        );
    }

    #[test]
    fn ordinary_content_allowed() {
        let m = moderator();
        assert!(m.check("I love this #sunny day").is_ok());
        assert!(m.check("quiet night at the library, finally").is_ok());
    }
}
