use std::cmp::Ordering;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use postsy_types::models::{Hashtag, TrendingTopic};
use regex::Regex;

static HASHTAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#[A-Za-z0-9_]+").expect("hashtag pattern is valid"));

/// Pull hashtags out of post content, lowercased. Duplicates are kept so a
/// post using a tag twice counts it twice.
pub fn extract_hashtags(content: &str) -> Vec<String> {
    HASHTAG_PATTERN
        .find_iter(content)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

/// Ranking metric combining usage frequency and recency:
/// `ln(count + 1) * (1 + recency * 2)` where recency decays linearly to
/// zero over 24 hours since last use.
pub fn trending_score(hashtag: &Hashtag, now: DateTime<Utc>) -> f64 {
    let hours_ago = (now - hashtag.last_used).num_seconds() as f64 / 3600.0;
    let recency = (1.0 - hours_ago / 24.0).max(0.0);
    let frequency = ((hashtag.count + 1) as f64).ln();
    frequency * (1.0 + recency * 2.0)
}

/// Top `limit` hashtags, sorted non-increasing by score with contiguous
/// 1-based ranks. Deterministic for a given collection and clock.
pub fn trending_topics(hashtags: &[Hashtag], limit: usize, now: DateTime<Utc>) -> Vec<TrendingTopic> {
    let mut scored: Vec<(f64, &Hashtag)> = hashtags
        .iter()
        .map(|hashtag| (trending_score(hashtag, now), hashtag))
        .collect();

    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));

    scored
        .into_iter()
        .take(limit)
        .enumerate()
        .map(|(idx, (score, hashtag))| TrendingTopic {
            is_hot: hashtag.count > 5 && score > 3.0,
            hashtag: hashtag.clone(),
            score,
            rank: idx + 1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use postsy_types::models::TrendDirection;
    use uuid::Uuid;

    fn tag(name: &str, count: u64, last_used_hours_ago: i64, now: DateTime<Utc>) -> Hashtag {
        Hashtag {
            id: Uuid::new_v4(),
            tag: name.to_string(),
            count,
            trend: TrendDirection::Stable,
            echo_ids: vec![],
            created_at: now - Duration::hours(48),
            last_used: now - Duration::hours(last_used_hours_ago),
        }
    }

    #[test]
    fn extraction_lowercases_and_keeps_order() {
        assert_eq!(
            extract_hashtags("Loving the #Sunset over #campus_life today #SUNSET"),
            vec!["#sunset", "#campus_life", "#sunset"]
        );
        assert!(extract_hashtags("no tags here").is_empty());
    }

    #[test]
    fn recency_boosts_score() {
        let now = Utc::now();
        let fresh = tag("#a", 10, 0, now);
        let stale = tag("#b", 10, 30, now);
        assert!(trending_score(&fresh, now) > trending_score(&stale, now));

        // Past the 24h window recency contributes nothing
        let score = trending_score(&stale, now);
        let expected = (11f64).ln();
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn topics_sorted_with_contiguous_ranks() {
        let now = Utc::now();
        let tags = vec![
            tag("#quiet", 2, 20, now),
            tag("#coffee", 18, 1, now),
            tag("#study", 10, 4, now),
            tag("#sunset", 8, 0, now),
        ];

        let topics = trending_topics(&tags, 10, now);
        assert_eq!(topics.len(), 4);
        for pair in topics.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
        for (idx, topic) in topics.iter().enumerate() {
            assert_eq!(topic.rank, idx + 1);
        }
    }

    #[test]
    fn hot_needs_both_count_and_score() {
        let now = Utc::now();
        // count > 5 and recent use -> hot
        let hot = trending_topics(&[tag("#coffee", 18, 0, now)], 1, now);
        assert!(hot[0].is_hot);

        // high count but last used days ago: score = ln(7) ~ 1.95 < 3
        let cold = trending_topics(&[tag("#archive", 6, 72, now)], 1, now);
        assert!(!cold[0].is_hot);

        // too few uses regardless of recency
        let small = trending_topics(&[tag("#new", 3, 0, now)], 1, now);
        assert!(!small[0].is_hot);
    }

    #[test]
    fn limit_is_respected() {
        let now = Utc::now();
        let tags: Vec<Hashtag> = (0..8).map(|i| tag(&format!("#t{i}"), i + 1, 1, now)).collect();
        assert_eq!(trending_topics(&tags, 3, now).len(), 3);
    }
}
