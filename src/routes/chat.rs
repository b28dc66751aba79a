//! Legacy messaging endpoints: correspondent history, user search, the
//! group log and pair-keyed private messages.
//!
//! None of these enforce a credential. That matches the observed design
//! of the frontend they serve; the authenticated surface is the
//! chat-entity router in `routes::chats`.

use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;
use serde_json::json;

use crate::error::{AppError, AppResult};
use crate::services::MessageService;
use crate::state::AppState;

/// GET /history/{userId}
/// Distinct users this user has sent private messages to.
#[get("/history/{user_id}")]
pub async fn get_history(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let user_id = path.into_inner();
    let correspondents = MessageService::list_correspondents(&state.db, user_id).await?;
    Ok(HttpResponse::Ok().json(correspondents))
}

/// GET /users/{emailFragment}
/// Substring search over user emails.
#[get("/users/{email}")]
pub async fn search_users(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let fragment = path.into_inner();
    let users = MessageService::search_users(&state.db, &fragment).await?;
    Ok(HttpResponse::Ok().json(users))
}

/// GET /group
/// Full group log, timestamp ascending. Serves as initial-load history
/// for clients joining the group channel.
#[get("/group")]
pub async fn list_group_messages(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let messages = MessageService::list_group_messages(&state.db).await?;
    Ok(HttpResponse::Ok().json(messages))
}

/// GET /private/{userId}/{receiverId}
/// Conversation between the pair, either direction, timestamp ascending.
#[get("/private/{user_id}/{receiver_id}")]
pub async fn get_private_messages(
    state: web::Data<AppState>,
    path: web::Path<(i64, i64)>,
) -> AppResult<HttpResponse> {
    let (user_id, receiver_id) = path.into_inner();
    let messages = MessageService::fetch_conversation(&state.db, user_id, receiver_id).await?;
    Ok(HttpResponse::Ok().json(messages))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendPrivateMessageRequest {
    pub sender_id: Option<i64>,
    pub receiver_id: Option<i64>,
    pub sender_name: Option<String>,
    pub message: Option<String>,
}

impl SendPrivateMessageRequest {
    /// All four fields are required; the error names the first one missing.
    fn validate(self) -> Result<(i64, i64, String, String), AppError> {
        let sender_id = self
            .sender_id
            .ok_or_else(|| AppError::Validation("senderId is required".into()))?;
        let receiver_id = self
            .receiver_id
            .ok_or_else(|| AppError::Validation("receiverId is required".into()))?;
        let sender_name = self
            .sender_name
            .ok_or_else(|| AppError::Validation("senderName is required".into()))?;
        let message = self
            .message
            .ok_or_else(|| AppError::Validation("message is required".into()))?;
        Ok((sender_id, receiver_id, sender_name, message))
    }
}

/// POST /private
/// Persist one private message. The write is synchronous: the caller gets
/// the confirmation only after the row is in. Delivery to the receiver is
/// by polling the conversation, never pushed over the group channel.
#[post("/private")]
pub async fn send_private_message(
    state: web::Data<AppState>,
    body: web::Json<SendPrivateMessageRequest>,
) -> AppResult<HttpResponse> {
    let (sender_id, receiver_id, sender_name, message) = body.into_inner().validate()?;

    MessageService::insert_private_message(&state.db, sender_id, receiver_id, &sender_name, &message)
        .await?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Message sent successfully" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_request() -> SendPrivateMessageRequest {
        SendPrivateMessageRequest {
            sender_id: Some(1),
            receiver_id: Some(2),
            sender_name: Some("alice".into()),
            message: Some("hey".into()),
        }
    }

    #[test]
    fn complete_request_validates() {
        let (sender_id, receiver_id, sender_name, message) = full_request().validate().unwrap();
        assert_eq!((sender_id, receiver_id), (1, 2));
        assert_eq!(sender_name, "alice");
        assert_eq!(message, "hey");
    }

    #[test]
    fn each_missing_field_is_named() {
        let mut req = full_request();
        req.sender_id = None;
        assert!(matches!(req.validate(), Err(AppError::Validation(m)) if m.contains("senderId")));

        let mut req = full_request();
        req.receiver_id = None;
        assert!(matches!(req.validate(), Err(AppError::Validation(m)) if m.contains("receiverId")));

        let mut req = full_request();
        req.sender_name = None;
        assert!(matches!(req.validate(), Err(AppError::Validation(m)) if m.contains("senderName")));

        let mut req = full_request();
        req.message = None;
        assert!(matches!(req.validate(), Err(AppError::Validation(m)) if m.contains("message")));
    }

    #[test]
    fn request_body_parses_camel_case() {
        let raw = r#"{"senderId":1,"receiverId":2,"senderName":"alice","message":"hey"}"#;
        let req: SendPrivateMessageRequest = serde_json::from_str(raw).unwrap();
        assert!(req.validate().is_ok());
    }
}
