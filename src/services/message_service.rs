//! Store access for the group log and the pair-keyed private messages.
//!
//! Timestamps always come from the database (`now()`), so display order is
//! decided by the store and not by whatever clock the client has.

use sqlx::{Pool, Postgres};

use crate::error::AppResult;
use crate::models::{Correspondent, GroupMessage, PrivateMessage, UserSummary};

pub struct MessageService;

impl MessageService {
    /// Distinct users `user_id` has ever sent a private message to, with
    /// display names from the users table. Empty when they never sent one.
    pub async fn list_correspondents(
        db: &Pool<Postgres>,
        user_id: i64,
    ) -> AppResult<Vec<Correspondent>> {
        let rows = sqlx::query_as::<_, Correspondent>(
            r#"
            SELECT DISTINCT pm.receiver_id, u.username AS receiver_name
            FROM private_messages pm
            JOIN users u ON u.id = pm.receiver_id
            WHERE pm.sender_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;

        Ok(rows)
    }

    /// Substring search over user emails.
    pub async fn search_users(
        db: &Pool<Postgres>,
        email_fragment: &str,
    ) -> AppResult<Vec<UserSummary>> {
        let pattern = format!("%{email_fragment}%");
        let rows = sqlx::query_as::<_, UserSummary>(
            "SELECT id, username AS name, email FROM users WHERE email ILIKE $1",
        )
        .bind(pattern)
        .fetch_all(db)
        .await?;

        Ok(rows)
    }

    /// Full group log, oldest first. This is the only catch-up mechanism
    /// for the group channel; there is no replay on reconnect.
    pub async fn list_group_messages(db: &Pool<Postgres>) -> AppResult<Vec<GroupMessage>> {
        let rows = sqlx::query_as::<_, GroupMessage>(
            r#"
            SELECT id, user_id, user_name, message, timestamp
            FROM group_messages
            ORDER BY timestamp ASC
            "#,
        )
        .fetch_all(db)
        .await?;

        Ok(rows)
    }

    /// Append one row to the group log. Called off the broadcast path; a
    /// failure here is the caller's to log, never to surface to clients.
    pub async fn insert_group_message(
        db: &Pool<Postgres>,
        user_id: i64,
        user_name: &str,
        message: &str,
    ) -> AppResult<GroupMessage> {
        let row = sqlx::query_as::<_, GroupMessage>(
            r#"
            INSERT INTO group_messages (user_id, user_name, message, timestamp)
            VALUES ($1, $2, $3, now())
            RETURNING id, user_id, user_name, message, timestamp
            "#,
        )
        .bind(user_id)
        .bind(user_name)
        .bind(message)
        .fetch_one(db)
        .await?;

        Ok(row)
    }

    /// Every message between the pair, in either direction, oldest first.
    /// Symmetric in its arguments. No pagination: the full history comes
    /// back on every call (preserved boundary behavior).
    pub async fn fetch_conversation(
        db: &Pool<Postgres>,
        user_id: i64,
        other_id: i64,
    ) -> AppResult<Vec<PrivateMessage>> {
        let rows = sqlx::query_as::<_, PrivateMessage>(
            r#"
            SELECT id, sender_id, receiver_id, sender_name, message, timestamp
            FROM private_messages
            WHERE (sender_id = $1 AND receiver_id = $2)
               OR (sender_id = $2 AND receiver_id = $1)
            ORDER BY timestamp ASC
            "#,
        )
        .bind(user_id)
        .bind(other_id)
        .fetch_all(db)
        .await?;

        Ok(rows)
    }

    /// Persist one private message with a server timestamp. The write is
    /// synchronous with the request: the caller confirms success only
    /// after this returns Ok.
    pub async fn insert_private_message(
        db: &Pool<Postgres>,
        sender_id: i64,
        receiver_id: i64,
        sender_name: &str,
        message: &str,
    ) -> AppResult<PrivateMessage> {
        let row = sqlx::query_as::<_, PrivateMessage>(
            r#"
            INSERT INTO private_messages (sender_id, receiver_id, sender_name, message, timestamp)
            VALUES ($1, $2, $3, $4, now())
            RETURNING id, sender_id, receiver_id, sender_name, message, timestamp
            "#,
        )
        .bind(sender_id)
        .bind(receiver_id)
        .bind(sender_name)
        .bind(message)
        .fetch_one(db)
        .await?;

        Ok(row)
    }
}
