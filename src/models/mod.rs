pub mod chat;
pub mod message;
pub mod user;

pub use chat::{Chat, ChatMessage, ChatSummary};
pub use message::{Correspondent, GroupMessage, PrivateMessage};
pub use user::UserSummary;
