//! Friend lookup: friend ids from the user's set, then each friend's profile
//! and the newest message of the shared chat.

use futures::future::try_join_all;

use crate::errors::AppError;
use crate::models::friend::{Friend, Message};
use crate::services::auth::find_user_by_id;
use crate::store::{self, keys, KeyValueStore};

/// Friends of `user_id`, in the order the store returns the friend ids.
///
/// Ids whose user record is gone are skipped.
pub async fn get_friends_by_user_id(
    store: &dyn KeyValueStore,
    user_id: &str,
) -> Result<Vec<Friend>, AppError> {
    let friend_ids = store::smembers(store, &keys::friends(user_id)).await?;

    let friends = try_join_all(
        friend_ids
            .iter()
            .map(|friend_id| load_friend(store, user_id, friend_id)),
    )
    .await?;

    Ok(friends.into_iter().flatten().collect())
}

async fn load_friend(
    store: &dyn KeyValueStore,
    user_id: &str,
    friend_id: &str,
) -> Result<Option<Friend>, AppError> {
    let (user, last_message) = tokio::try_join!(
        find_user_by_id(store, friend_id),
        last_message(store, user_id, friend_id),
    )?;

    match user {
        Some(user) => Ok(Some(Friend::new(user, last_message))),
        None => {
            tracing::warn!(user_id, friend_id, "Friend id has no user record");
            Ok(None)
        }
    }
}

/// Newest message exchanged between the two users, if any.
pub async fn last_message(
    store: &dyn KeyValueStore,
    user_id: &str,
    friend_id: &str,
) -> Result<Option<Message>, AppError> {
    let key = keys::chat_messages(&keys::chat_id(user_id, friend_id));
    let newest = store::zrange(store, &key, -1, -1).await?;

    match newest.into_iter().next() {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}
