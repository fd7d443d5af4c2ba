use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id              TEXT PRIMARY KEY,
            email           TEXT NOT NULL UNIQUE,
            phone_number    TEXT NOT NULL,
            handle          TEXT NOT NULL UNIQUE,
            password        TEXT NOT NULL,
            created_at      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS echoes (
            id          TEXT PRIMARY KEY,
            content     TEXT NOT NULL,
            pseudonym   TEXT NOT NULL,
            location    TEXT NOT NULL,
            upvotes     INTEGER NOT NULL DEFAULT 0,
            downvotes   INTEGER NOT NULL DEFAULT 0,
            replies     INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_echoes_created
            ON echoes(created_at);

        CREATE TABLE IF NOT EXISTS hashtags (
            id          TEXT PRIMARY KEY,
            tag         TEXT NOT NULL UNIQUE,
            count       INTEGER NOT NULL DEFAULT 0,
            trend       TEXT NOT NULL DEFAULT 'stable',
            created_at  TEXT NOT NULL,
            last_used   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS echo_hashtags (
            echo_id     TEXT NOT NULL REFERENCES echoes(id),
            tag         TEXT NOT NULL REFERENCES hashtags(tag),
            PRIMARY KEY (echo_id, tag)
        );

        CREATE INDEX IF NOT EXISTS idx_echo_hashtags_tag
            ON echo_hashtags(tag);
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
