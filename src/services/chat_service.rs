//! Chat-entity variant of private messaging: an explicit `chats` row per
//! user pair, created lazily on first contact, with its own message table.

use sqlx::{Pool, Postgres};

use crate::error::AppResult;
use crate::models::{Chat, ChatMessage, ChatSummary};

pub struct ChatService;

impl ChatService {
    /// Chats involving `user_id`, newest first, each with the other
    /// member's display name.
    pub async fn list_chats(db: &Pool<Postgres>, user_id: i64) -> AppResult<Vec<ChatSummary>> {
        let rows = sqlx::query_as::<_, ChatSummary>(
            r#"
            SELECT c.id,
                   CASE WHEN c.user_one_id = $1 THEN c.user_two_id
                        ELSE c.user_one_id
                   END AS other_user_id,
                   u.username
            FROM chats c
            JOIN users u ON u.id = CASE WHEN c.user_one_id = $1 THEN c.user_two_id
                                  ELSE c.user_one_id
                             END
            WHERE c.user_one_id = $1 OR c.user_two_id = $1
            ORDER BY c.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?;

        Ok(rows)
    }

    pub async fn get_chat(db: &Pool<Postgres>, chat_id: i64) -> AppResult<Option<Chat>> {
        let row = sqlx::query_as::<_, Chat>(
            "SELECT id, user_one_id, user_two_id, created_at FROM chats WHERE id = $1",
        )
        .bind(chat_id)
        .fetch_optional(db)
        .await?;

        Ok(row)
    }

    /// Return the chat for the unordered pair, creating it on first
    /// contact. Lookup checks both orientations so there is at most one
    /// chat per pair.
    pub async fn find_or_create_chat(
        db: &Pool<Postgres>,
        user_id: i64,
        other_user_id: i64,
    ) -> AppResult<Chat> {
        let existing = sqlx::query_as::<_, Chat>(
            r#"
            SELECT id, user_one_id, user_two_id, created_at
            FROM chats
            WHERE (user_one_id = $1 AND user_two_id = $2)
               OR (user_one_id = $2 AND user_two_id = $1)
            "#,
        )
        .bind(user_id)
        .bind(other_user_id)
        .fetch_optional(db)
        .await?;

        if let Some(chat) = existing {
            return Ok(chat);
        }

        let chat = sqlx::query_as::<_, Chat>(
            r#"
            INSERT INTO chats (user_one_id, user_two_id, created_at)
            VALUES ($1, $2, now())
            RETURNING id, user_one_id, user_two_id, created_at
            "#,
        )
        .bind(user_id)
        .bind(other_user_id)
        .fetch_one(db)
        .await?;

        Ok(chat)
    }

    /// Messages in a chat, oldest first, with sender display names.
    pub async fn list_chat_messages(
        db: &Pool<Postgres>,
        chat_id: i64,
    ) -> AppResult<Vec<ChatMessage>> {
        let rows = sqlx::query_as::<_, ChatMessage>(
            r#"
            SELECT m.id, m.chat_id, m.sender_id, m.receiver_id, m.content,
                   m.created_at, u.username AS sender_username
            FROM chat_messages m
            JOIN users u ON u.id = m.sender_id
            WHERE m.chat_id = $1
            ORDER BY m.created_at ASC
            "#,
        )
        .bind(chat_id)
        .fetch_all(db)
        .await?;

        Ok(rows)
    }

    /// Append a message to a chat. The receiver is the other member;
    /// membership is the caller's responsibility to verify.
    pub async fn send_chat_message(
        db: &Pool<Postgres>,
        chat: &Chat,
        sender_id: i64,
        content: &str,
    ) -> AppResult<ChatMessage> {
        let receiver_id = chat.other_member(sender_id);

        let row = sqlx::query_as::<_, ChatMessage>(
            r#"
            INSERT INTO chat_messages (chat_id, sender_id, receiver_id, content, created_at, is_read)
            VALUES ($1, $2, $3, $4, now(), FALSE)
            RETURNING id, chat_id, sender_id, receiver_id, content, created_at,
                      NULL::text AS sender_username
            "#,
        )
        .bind(chat.id)
        .bind(sender_id)
        .bind(receiver_id)
        .bind(content)
        .fetch_one(db)
        .await?;

        Ok(row)
    }
}
