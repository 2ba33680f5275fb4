use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);")?;

    let version: i64 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |r| r.get(0),
    )?;

    if version < 1 {
        info!("running migration v1 (users, message envelope, detail tables)");
        conn.execute_batch(
            "
            BEGIN;

            CREATE TABLE users (
                uid         INTEGER PRIMARY KEY AUTOINCREMENT,
                username    TEXT NOT NULL UNIQUE,
                password    TEXT NOT NULL,
                created_on  TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE messages (
                msg_id        INTEGER PRIMARY KEY AUTOINCREMENT,
                sender_id     INTEGER NOT NULL REFERENCES users(uid),
                recipient_id  INTEGER NOT NULL REFERENCES users(uid),
                type          TEXT NOT NULL CHECK (type IN ('text', 'image', 'video')),
                created_on    TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE INDEX idx_messages_recipient
                ON messages(recipient_id, msg_id);

            CREATE TABLE texts (
                msg_id  INTEGER PRIMARY KEY REFERENCES messages(msg_id),
                msg     TEXT NOT NULL
            );

            CREATE TABLE images (
                msg_id  INTEGER PRIMARY KEY REFERENCES messages(msg_id),
                width   INTEGER NOT NULL CHECK (width > 0),
                height  INTEGER NOT NULL CHECK (height > 0),
                i_url   TEXT NOT NULL
            );

            CREATE TABLE videos (
                msg_id  INTEGER PRIMARY KEY REFERENCES messages(msg_id),
                source  TEXT NOT NULL CHECK (source IN ('youtube', 'vimeo')),
                v_url   TEXT NOT NULL
            );

            INSERT INTO schema_version (version) VALUES (1);

            COMMIT;
            ",
        )?;
    }

    info!("Database migrations complete");
    Ok(())
}
