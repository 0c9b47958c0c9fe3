//! Friends and the chat messages previewed next to them.

use serde::{Deserialize, Serialize};

use super::user::User;

/// Chat message as stored in `chat:<chatId>:messages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub sender_id: String,
    pub text: String,
    /// Milliseconds since the Unix epoch; also the sorted-set score.
    pub timestamp: i64,
}

/// A counterpart user listed in the sidebar.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Avatar URL, empty when the user has none.
    pub image: String,
    pub last_message: Option<Message>,
}

impl Friend {
    pub fn new(user: User, last_message: Option<Message>) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            image: user.image.unwrap_or_default(),
            last_message,
        }
    }
}
