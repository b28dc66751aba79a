use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Explicit two-party chat, created lazily on first contact and looked up
/// by the unordered pair of member ids.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: i64,
    pub user_one_id: i64,
    pub user_two_id: i64,
    pub created_at: DateTime<Utc>,
}

impl Chat {
    pub fn is_member(&self, user_id: i64) -> bool {
        self.user_one_id == user_id || self.user_two_id == user_id
    }

    /// The member that is not `user_id`. Callers must check membership first.
    pub fn other_member(&self, user_id: i64) -> i64 {
        if self.user_one_id == user_id {
            self.user_two_id
        } else {
            self.user_one_id
        }
    }
}

/// Chat listing entry: the chat plus the other member's display name.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummary {
    pub id: i64,
    pub other_user_id: i64,
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: i64,
    pub chat_id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub sender_username: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn chat(one: i64, two: i64) -> Chat {
        Chat {
            id: 1,
            user_one_id: one,
            user_two_id: two,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn membership_covers_both_sides() {
        let c = chat(7, 9);
        assert!(c.is_member(7));
        assert!(c.is_member(9));
        assert!(!c.is_member(8));
    }

    #[test]
    fn other_member_flips() {
        let c = chat(7, 9);
        assert_eq!(c.other_member(7), 9);
        assert_eq!(c.other_member(9), 7);
    }
}
