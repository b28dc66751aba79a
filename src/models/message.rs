use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One entry in the append-only group chat log.
///
/// Rows are immutable once written; the timestamp is assigned by the
/// database at insert time, never supplied by the client.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct GroupMessage {
    pub id: i64,
    pub user_id: i64,
    pub user_name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// A message between exactly two users. The conversation between A and B
/// is the set of rows whose {sender_id, receiver_id} equals {A, B} in
/// either direction, ordered by timestamp ascending.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct PrivateMessage {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub sender_name: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// A distinct user someone has sent private messages to.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Correspondent {
    pub receiver_id: i64,
    pub receiver_name: String,
}
