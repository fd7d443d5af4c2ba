/// Database row types — these map directly to SQLite rows.
/// Distinct from postsy-types API models to keep the DB layer independent.
use anyhow::Result;
use chrono::{DateTime, Utc};
use postsy_types::models::{Echo, Hashtag, TrendDirection, User};
use uuid::Uuid;

pub struct UserRow {
    pub id: String,
    pub email: String,
    pub phone_number: String,
    pub handle: String,
    pub password: String,
    pub created_at: String,
}

pub struct EchoRow {
    pub id: String,
    pub content: String,
    pub pseudonym: String,
    pub location: String,
    pub upvotes: i64,
    pub downvotes: i64,
    pub replies: i64,
    pub created_at: String,
}

pub struct HashtagRow {
    pub id: String,
    pub tag: String,
    pub count: i64,
    pub trend: String,
    pub created_at: String,
    pub last_used: String,
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)?.with_timezone(&Utc))
}

impl UserRow {
    pub fn into_user(self) -> Result<User> {
        Ok(User {
            id: self.id.parse()?,
            email: self.email,
            phone_number: self.phone_number,
            handle: self.handle,
            created_at: parse_timestamp(&self.created_at)?,
        })
    }
}

impl EchoRow {
    pub fn into_echo(self) -> Result<Echo> {
        Ok(Echo {
            id: self.id.parse()?,
            content: self.content,
            pseudonym: self.pseudonym,
            location: self.location,
            created_at: parse_timestamp(&self.created_at)?,
            upvotes: self.upvotes,
            downvotes: self.downvotes,
            replies: self.replies,
        })
    }
}

impl HashtagRow {
    pub fn into_hashtag(self, echo_ids: Vec<Uuid>) -> Result<Hashtag> {
        let trend = match self.trend.as_str() {
            "up" => TrendDirection::Up,
            "down" => TrendDirection::Down,
            _ => TrendDirection::Stable,
        };
        Ok(Hashtag {
            id: self.id.parse()?,
            tag: self.tag,
            count: self.count.max(0) as u64,
            trend,
            echo_ids,
            created_at: parse_timestamp(&self.created_at)?,
            last_used: parse_timestamp(&self.last_used)?,
        })
    }
}
