//! Key layout shared by the web app and this service.

/// JSON user record.
pub fn user(user_id: &str) -> String {
    format!("user:{user_id}")
}

/// Email to user id index.
pub fn user_by_email(email: &str) -> String {
    format!("user:email:{email}")
}

/// Argon2 hash of the user's password.
pub fn credentials(user_id: &str) -> String {
    format!("user:{user_id}:credentials")
}

/// Set of friend ids.
pub fn friends(user_id: &str) -> String {
    format!("user:{user_id}:friends")
}

/// Set of ids that sent the user a friend request not yet accepted or denied.
pub fn incoming_friend_requests(user_id: &str) -> String {
    format!("user:{user_id}:incoming_friend_requests")
}

/// Sorted set of message JSON scored by timestamp.
pub fn chat_messages(chat_id: &str) -> String {
    format!("chat:{chat_id}:messages")
}

/// Identifier of the 1:1 chat between two users; the same for either argument order.
pub fn chat_id(a: &str, b: &str) -> String {
    if a <= b {
        format!("{a}--{b}")
    } else {
        format!("{b}--{a}")
    }
}
