use courier_types::models::{Message, MessageDetail};
use rusqlite::{Connection, OptionalExtension, ffi, params};
use tracing::debug;

use crate::models::{MessageRow, UserRow};
use crate::{Database, StoreError};

impl Database {
    // -- Users --

    /// Inserts a user unless the username is taken. The existence check and
    /// the insert share one IMMEDIATE transaction, and the UNIQUE constraint
    /// backs it up.
    pub fn create_user(&self, username: &str, password_hash: &str) -> Result<i64, StoreError> {
        self.write(|tx| {
            let exists: bool = tx.query_row(
                "SELECT EXISTS (SELECT 1 FROM users WHERE username = ?1)",
                [username],
                |row| row.get(0),
            )?;
            if exists {
                return Err(StoreError::AlreadyExists);
            }

            tx.execute(
                "INSERT INTO users (username, password) VALUES (?1, ?2)",
                (username, password_hash),
            )
            .map_err(|e| match StoreError::constraint_code(&e) {
                Some(ffi::SQLITE_CONSTRAINT_UNIQUE) => StoreError::AlreadyExists,
                _ => e.into(),
            })?;

            Ok(tx.last_insert_rowid())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<UserRow, StoreError> {
        self.read(|tx| query_user_by_username(tx, username))?
            .ok_or(StoreError::NotFound)
    }

    // -- Messages --

    /// Writes the envelope and its single detail row atomically. Returns the
    /// assigned id and SQLite's `created_on` rendering.
    pub fn send_message(
        &self,
        sender_id: i64,
        recipient_id: i64,
        detail: &MessageDetail,
    ) -> Result<(i64, String), StoreError> {
        self.write(|tx| {
            tx.execute(
                "INSERT INTO messages (sender_id, recipient_id, type) VALUES (?1, ?2, ?3)",
                params![sender_id, recipient_id, detail.message_type().as_str()],
            )
            .map_err(|e| match StoreError::constraint_code(&e) {
                Some(ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => StoreError::UnknownUser,
                _ => e.into(),
            })?;

            let msg_id = tx.last_insert_rowid();
            let created_on: String = tx.query_row(
                "SELECT created_on FROM messages WHERE msg_id = ?1",
                [msg_id],
                |row| row.get(0),
            )?;

            insert_detail(tx, msg_id, detail)?;

            debug!(msg_id, sender_id, recipient_id, kind = %detail.message_type(), "message stored");
            Ok((msg_id, created_on))
        })
    }

    /// Messages addressed to `recipient_id` with `msg_id >= start_msg_id`,
    /// ascending by id, at most `limit` of them.
    pub fn get_messages(
        &self,
        recipient_id: i64,
        start_msg_id: i64,
        limit: u32,
    ) -> Result<Vec<Message>, StoreError> {
        self.read(|tx| query_messages(tx, recipient_id, start_msg_id, limit))
    }

    // -- Health --

    pub fn ping(&self) -> Result<bool, StoreError> {
        self.read(|tx| {
            let one: i64 = tx.query_row("SELECT 1", [], |row| row.get(0))?;
            Ok(one == 1)
        })
    }
}

fn insert_detail(conn: &Connection, msg_id: i64, detail: &MessageDetail) -> Result<(), StoreError> {
    match detail {
        MessageDetail::Text { text } => {
            conn.execute(
                "INSERT INTO texts (msg_id, msg) VALUES (?1, ?2)",
                params![msg_id, text],
            )?;
        }
        MessageDetail::Image { width, height, url } => {
            conn.execute(
                "INSERT INTO images (msg_id, width, height, i_url) VALUES (?1, ?2, ?3, ?4)",
                params![msg_id, width, height, url],
            )?;
        }
        MessageDetail::Video { source, url } => {
            conn.execute(
                "INSERT INTO videos (msg_id, source, v_url) VALUES (?1, ?2, ?3)",
                params![msg_id, source.as_str(), url],
            )?;
        }
    }
    Ok(())
}

fn query_user_by_username(conn: &Connection, username: &str) -> Result<Option<UserRow>, StoreError> {
    let mut stmt =
        conn.prepare("SELECT uid, username, password, created_on FROM users WHERE username = ?1")?;

    let row = stmt
        .query_row([username], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
                created_on: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

fn query_messages(
    conn: &Connection,
    recipient_id: i64,
    start_msg_id: i64,
    limit: u32,
) -> Result<Vec<Message>, StoreError> {
    // One outer join rebuilds every message type; the envelope's type picks the
    // populated column group.
    let mut stmt = conn.prepare(
        "SELECT m.msg_id, m.sender_id, m.recipient_id, m.type,
                t.msg, i.width, i.height, i.i_url, v.v_url, v.source, m.created_on
         FROM messages m
         LEFT JOIN texts t ON m.msg_id = t.msg_id
         LEFT JOIN images i ON m.msg_id = i.msg_id
         LEFT JOIN videos v ON m.msg_id = v.msg_id
         WHERE m.recipient_id = ?1 AND m.msg_id >= ?2
         ORDER BY m.msg_id
         LIMIT ?3",
    )?;

    let rows = stmt
        .query_map(params![recipient_id, start_msg_id, limit], |row| {
            Ok(MessageRow {
                msg_id: row.get(0)?,
                sender_id: row.get(1)?,
                recipient_id: row.get(2)?,
                kind: row.get(3)?,
                text: row.get(4)?,
                width: row.get(5)?,
                height: row.get(6)?,
                image_url: row.get(7)?,
                video_url: row.get(8)?,
                source: row.get(9)?,
                created_on: row.get(10)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    rows.into_iter().map(Message::try_from).collect()
}
