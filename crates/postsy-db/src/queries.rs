use crate::Database;
use crate::models::{EchoRow, HashtagRow, UserRow};
use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

impl Database {
    // -- Users --

    pub fn create_user(
        &self,
        id: &str,
        email: &str,
        phone_number: &str,
        handle: &str,
        password_hash: &str,
        created_at: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO users (id, email, phone_number, handle, password, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![id, email, phone_number, handle, password_hash, created_at],
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "email", email))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    pub fn get_user_by_handle(&self, handle: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "handle", handle))
    }

    pub fn handle_taken(&self, handle: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM users WHERE handle = ?1",
                [handle],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    // -- Echoes --

    pub fn insert_echo(
        &self,
        id: &str,
        content: &str,
        pseudonym: &str,
        location: &str,
        created_at: &str,
    ) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO echoes (id, content, pseudonym, location, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, content, pseudonym, location, created_at],
            )?;
            Ok(())
        })
    }

    pub fn get_echo(&self, id: &str) -> Result<Option<EchoRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, content, pseudonym, location, upvotes, downvotes, replies, created_at
                 FROM echoes WHERE id = ?1",
                [id],
                echo_from_row,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    /// Newest-first feed.
    pub fn list_echoes_new(&self, limit: usize) -> Result<Vec<EchoRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, content, pseudonym, location, upvotes, downvotes, replies, created_at
                 FROM echoes ORDER BY created_at DESC LIMIT ?1",
            )?;
            let rows = stmt
                .query_map([limit as i64], echo_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// "Hot" feed: echoes with more than 5 upvotes, ordered by net score.
    pub fn list_echoes_hot(&self, limit: usize) -> Result<Vec<EchoRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, content, pseudonym, location, upvotes, downvotes, replies, created_at
                 FROM echoes
                 WHERE upvotes > 5
                 ORDER BY (upvotes - downvotes) DESC, created_at DESC
                 LIMIT ?1",
            )?;
            let rows = stmt
                .query_map([limit as i64], echo_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Returns false if no echo with that id exists.
    pub fn vote_echo(&self, id: &str, upvote: bool) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let column = if upvote { "upvotes" } else { "downvotes" };
            let updated = conn.execute(
                &format!("UPDATE echoes SET {column} = {column} + 1 WHERE id = ?1"),
                [id],
            )?;
            Ok(updated > 0)
        })
    }

    pub fn increment_replies(&self, id: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let updated = conn.execute(
                "UPDATE echoes SET replies = replies + 1 WHERE id = ?1",
                [id],
            )?;
            Ok(updated > 0)
        })
    }

    // -- Hashtags --

    /// Record one use of a tag by an echo. Increments the counter and
    /// refreshes `last_used` for a known tag, inserts a fresh row otherwise.
    pub fn upsert_hashtag(&self, id: &str, tag: &str, echo_id: &str, now: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            let updated = conn.execute(
                "UPDATE hashtags SET count = count + 1, last_used = ?2, trend = 'up'
                 WHERE tag = ?1",
                rusqlite::params![tag, now],
            )?;
            if updated == 0 {
                conn.execute(
                    "INSERT INTO hashtags (id, tag, count, trend, created_at, last_used)
                     VALUES (?1, ?2, 1, 'up', ?3, ?3)",
                    rusqlite::params![id, tag, now],
                )?;
            }
            conn.execute(
                "INSERT OR IGNORE INTO echo_hashtags (echo_id, tag) VALUES (?1, ?2)",
                rusqlite::params![echo_id, tag],
            )?;
            Ok(())
        })
    }

    pub fn list_hashtags(&self) -> Result<Vec<HashtagRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, tag, count, trend, created_at, last_used FROM hashtags",
            )?;
            let rows = stmt
                .query_map([], hashtag_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_hashtag(&self, tag: &str) -> Result<Option<HashtagRow>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, tag, count, trend, created_at, last_used
                 FROM hashtags WHERE tag = ?1",
                [tag],
                hashtag_from_row,
            )
            .optional()
            .map_err(Into::into)
        })
    }

    /// Substring search over tags, most used first.
    pub fn search_hashtags(&self, term: &str) -> Result<Vec<HashtagRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, tag, count, trend, created_at, last_used
                 FROM hashtags
                 WHERE tag LIKE '%' || ?1 || '%'
                 ORDER BY count DESC",
            )?;
            let rows = stmt
                .query_map([term], hashtag_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn echo_ids_for_tag(&self, tag: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT echo_id FROM echo_hashtags WHERE tag = ?1",
            )?;
            let ids = stmt
                .query_map([tag], |row| row.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(ids)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    conn.query_row(
        &format!(
            "SELECT id, email, phone_number, handle, password, created_at
             FROM users WHERE {column} = ?1"
        ),
        [value],
        |row| {
            Ok(UserRow {
                id: row.get(0)?,
                email: row.get(1)?,
                phone_number: row.get(2)?,
                handle: row.get(3)?,
                password: row.get(4)?,
                created_at: row.get(5)?,
            })
        },
    )
    .optional()
    .map_err(Into::into)
}

fn echo_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<EchoRow> {
    Ok(EchoRow {
        id: row.get(0)?,
        content: row.get(1)?,
        pseudonym: row.get(2)?,
        location: row.get(3)?,
        upvotes: row.get(4)?,
        downvotes: row.get(5)?,
        replies: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn hashtag_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<HashtagRow> {
    Ok(HashtagRow {
        id: row.get(0)?,
        tag: row.get(1)?,
        count: row.get(2)?,
        trend: row.get(3)?,
        created_at: row.get(4)?,
        last_used: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use crate::Database;
    use chrono::Utc;
    use uuid::Uuid;

    fn now() -> String {
        Utc::now().to_rfc3339()
    }

    #[test]
    fn vote_and_reply_counters() {
        let db = Database::open_in_memory().unwrap();
        let id = Uuid::new_v4().to_string();
        db.insert_echo(&id, "late night thoughts", "Quiet Echo", "Campus Area", &now())
            .unwrap();

        assert!(db.vote_echo(&id, true).unwrap());
        assert!(db.vote_echo(&id, true).unwrap());
        assert!(db.vote_echo(&id, false).unwrap());
        assert!(db.increment_replies(&id).unwrap());

        let echo = db.get_echo(&id).unwrap().unwrap();
        assert_eq!(echo.upvotes, 2);
        assert_eq!(echo.downvotes, 1);
        assert_eq!(echo.replies, 1);

        // Voting on an unknown echo touches nothing
        assert!(!db.vote_echo(&Uuid::new_v4().to_string(), true).unwrap());
    }

    #[test]
    fn hot_feed_requires_more_than_five_upvotes() {
        let db = Database::open_in_memory().unwrap();
        let warm = Uuid::new_v4().to_string();
        let cold = Uuid::new_v4().to_string();
        db.insert_echo(&warm, "warm take", "Wandering Soul", "Campus Area", &now())
            .unwrap();
        db.insert_echo(&cold, "cold take", "Silent Mind", "Campus Area", &now())
            .unwrap();
        for _ in 0..6 {
            db.vote_echo(&warm, true).unwrap();
        }
        db.vote_echo(&cold, true).unwrap();

        let hot = db.list_echoes_hot(10).unwrap();
        assert_eq!(hot.len(), 1);
        assert_eq!(hot[0].id, warm);
    }

    #[test]
    fn hashtag_upsert_increments_count_and_links_echo() {
        let db = Database::open_in_memory().unwrap();
        let echo_a = Uuid::new_v4().to_string();
        let echo_b = Uuid::new_v4().to_string();
        db.insert_echo(&echo_a, "first #sunny", "A", "Campus Area", &now()).unwrap();
        db.insert_echo(&echo_b, "second #sunny", "B", "Campus Area", &now()).unwrap();

        db.upsert_hashtag(&Uuid::new_v4().to_string(), "#sunny", &echo_a, &now())
            .unwrap();
        let later = now();
        db.upsert_hashtag(&Uuid::new_v4().to_string(), "#sunny", &echo_b, &later)
            .unwrap();

        let tag = db.get_hashtag("#sunny").unwrap().unwrap();
        assert_eq!(tag.count, 2);
        assert_eq!(tag.last_used, later);
        assert_eq!(db.echo_ids_for_tag("#sunny").unwrap().len(), 2);
    }

    #[test]
    fn duplicate_email_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.create_user(
            &Uuid::new_v4().to_string(),
            "a@example.com",
            "+1234567890",
            "AB123C",
            "hash",
            &now(),
        )
        .unwrap();

        let err = db.create_user(
            &Uuid::new_v4().to_string(),
            "a@example.com",
            "+1987654321",
            "XY987Z",
            "hash",
            &now(),
        );
        assert!(err.is_err());
    }

    #[test]
    fn hashtag_search_orders_by_count() {
        let db = Database::open_in_memory().unwrap();
        let echo = Uuid::new_v4().to_string();
        db.insert_echo(&echo, "seed", "A", "Campus Area", &now()).unwrap();
        for _ in 0..3 {
            db.upsert_hashtag(&Uuid::new_v4().to_string(), "#coffee", &echo, &now())
                .unwrap();
        }
        db.upsert_hashtag(&Uuid::new_v4().to_string(), "#coffeebreak", &echo, &now())
            .unwrap();

        let results = db.search_hashtags("coffee").unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].tag, "#coffee");
        assert_eq!(results[0].count, 3);
    }
}
