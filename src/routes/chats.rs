//! Chat-entity endpoints. Unlike the legacy router these require a valid
//! bearer token; the caller's id comes from the verified claims, never
//! from the request body.

use actix_web::{get, post, web, HttpResponse};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthenticatedUser;
use crate::models::Chat;
use crate::services::ChatService;
use crate::state::AppState;

/// GET /chats
/// Chats involving the caller, newest first.
#[get("/chats")]
pub async fn list_chats(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> AppResult<HttpResponse> {
    let chats = ChatService::list_chats(&state.db, user.id).await?;
    Ok(HttpResponse::Ok().json(chats))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatRequest {
    pub other_user_id: i64,
}

/// POST /chats
/// Return the existing chat with the other user, or create one.
#[post("/chats")]
pub async fn create_chat(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    body: web::Json<CreateChatRequest>,
) -> AppResult<HttpResponse> {
    let chat = ChatService::find_or_create_chat(&state.db, user.id, body.other_user_id).await?;
    Ok(HttpResponse::Ok().json(chat))
}

/// Load a chat and reject callers that are not one of its two members.
async fn member_chat(state: &AppState, chat_id: i64, user_id: i64) -> Result<Chat, AppError> {
    let chat = ChatService::get_chat(&state.db, chat_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if !chat.is_member(user_id) {
        return Err(AppError::Forbidden);
    }
    Ok(chat)
}

/// GET /chats/{chatId}/messages
#[get("/chats/{chat_id}/messages")]
pub async fn get_chat_messages(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let chat = member_chat(&state, path.into_inner(), user.id).await?;
    let messages = ChatService::list_chat_messages(&state.db, chat.id).await?;
    Ok(HttpResponse::Ok().json(messages))
}

#[derive(Debug, Deserialize)]
pub struct SendChatMessageRequest {
    pub content: String,
}

/// POST /chats/{chatId}/messages
/// The receiver is derived from chat membership, not supplied by the
/// client.
#[post("/chats/{chat_id}/messages")]
pub async fn send_chat_message(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    path: web::Path<i64>,
    body: web::Json<SendChatMessageRequest>,
) -> AppResult<HttpResponse> {
    if body.content.is_empty() {
        return Err(AppError::Validation("content is required".into()));
    }

    let chat = member_chat(&state, path.into_inner(), user.id).await?;
    let message = ChatService::send_chat_message(&state.db, &chat, user.id, &body.content).await?;
    Ok(HttpResponse::Created().json(message))
}
