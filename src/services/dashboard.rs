//! Dashboard aggregation: the data behind the chat sidebar.

use serde::Serialize;

use crate::errors::AppError;
use crate::models::friend::Friend;
use crate::models::session::Session;
use crate::models::sidebar::{FriendRequestsOption, Icon, SidebarOption, SIDEBAR_OPTIONS};
use crate::models::user::ProfileView;
use crate::services::friends;
use crate::store::{self, keys, KeyValueStore};

/// Reads the dashboard needs for one signed-in user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardData {
    pub friends: Vec<Friend>,
    pub unseen_request_count: usize,
}

/// Everything the sidebar layout renders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardLayout {
    pub home_href: &'static str,
    pub logo: Icon,
    pub show_chats_heading: bool,
    pub friends: Vec<Friend>,
    pub sidebar_options: &'static [SidebarOption],
    pub friend_requests: FriendRequestsOption,
    pub profile: ProfileView,
}

/// Fetch the friend list and the unseen friend-request count.
///
/// The two reads are independent and run concurrently. A failure of either
/// fails the whole aggregation.
pub async fn aggregate(
    store: &dyn KeyValueStore,
    session: &Session,
) -> Result<DashboardData, AppError> {
    let user_id = session.user_id();

    let (friends, unseen_request_count) = tokio::try_join!(
        friends::get_friends_by_user_id(store, user_id),
        unseen_request_count(store, user_id),
    )?;

    tracing::debug!(
        user_id,
        friends = friends.len(),
        unseen_request_count,
        "Aggregated dashboard"
    );

    Ok(DashboardData {
        friends,
        unseen_request_count,
    })
}

/// Number of pending incoming friend requests at the moment of the read.
pub async fn unseen_request_count(
    store: &dyn KeyValueStore,
    user_id: &str,
) -> Result<usize, AppError> {
    let senders = store::smembers(store, &keys::incoming_friend_requests(user_id)).await?;
    Ok(senders.len())
}

/// Shape the aggregated data for the sidebar.
pub fn build_layout(session: &Session, data: DashboardData) -> DashboardLayout {
    DashboardLayout {
        home_href: "/dashboard",
        logo: Icon::Logo,
        show_chats_heading: !data.friends.is_empty(),
        friends: data.friends,
        sidebar_options: SIDEBAR_OPTIONS,
        friend_requests: FriendRequestsOption::new(data.unseen_request_count),
        profile: ProfileView::from(&session.user),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::models::user::User;
    use crate::store::memory::MemoryStore;

    fn session_for(id: &str) -> Session {
        Session {
            user: User {
                id: id.to_string(),
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
                image: None,
            },
            expires: Utc::now() + Duration::hours(1),
        }
    }

    async fn put_user(store: &MemoryStore, id: &str) {
        let user = User {
            id: id.to_string(),
            name: id.to_uppercase(),
            email: format!("{id}@example.com"),
            image: None,
        };
        store::set(store, &keys::user(id), &serde_json::to_string(&user).unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn counts_incoming_requests() {
        let store = MemoryStore::new();
        store::sadd(&store, "user:u1:incoming_friend_requests", "u2")
            .await
            .unwrap();
        store::sadd(&store, "user:u1:incoming_friend_requests", "u3")
            .await
            .unwrap();

        let data = aggregate(&store, &session_for("u1")).await.unwrap();
        assert_eq!(data.unseen_request_count, 2);
        assert!(data.friends.is_empty());
    }

    #[tokio::test]
    async fn zero_requests_counts_zero() {
        let store = MemoryStore::new();
        let data = aggregate(&store, &session_for("u1")).await.unwrap();
        assert_eq!(data.unseen_request_count, 0);
    }

    #[tokio::test]
    async fn count_ignores_insertion_order() {
        let forward = MemoryStore::new();
        let backward = MemoryStore::new();
        let senders = ["a", "b", "c", "d"];
        for s in senders {
            store::sadd(&forward, &keys::incoming_friend_requests("u1"), s)
                .await
                .unwrap();
        }
        for s in senders.iter().rev() {
            store::sadd(&backward, &keys::incoming_friend_requests("u1"), s)
                .await
                .unwrap();
        }
        // a repeated request from the same sender is still one member
        store::sadd(&backward, &keys::incoming_friend_requests("u1"), "a")
            .await
            .unwrap();

        assert_eq!(unseen_request_count(&forward, "u1").await.unwrap(), 4);
        assert_eq!(unseen_request_count(&backward, "u1").await.unwrap(), 4);
    }

    #[tokio::test]
    async fn friends_pass_through_unchanged() {
        let store = MemoryStore::new();
        for id in ["u4", "u2", "u3"] {
            put_user(&store, id).await;
            store::sadd(&store, &keys::friends("u1"), id).await.unwrap();
        }

        let expected = friends::get_friends_by_user_id(&store, "u1").await.unwrap();
        let data = aggregate(&store, &session_for("u1")).await.unwrap();
        assert_eq!(data.friends, expected);
    }

    #[tokio::test]
    async fn failed_count_fails_aggregation() {
        let store = MemoryStore::new();
        store.fail_key(&keys::incoming_friend_requests("u1"));
        let result = aggregate(&store, &session_for("u1")).await;
        assert!(matches!(result, Err(AppError::Store(_))));
    }

    #[tokio::test]
    async fn failed_friend_lookup_fails_aggregation() {
        let store = MemoryStore::new();
        store.fail_key(&keys::friends("u1"));
        assert!(aggregate(&store, &session_for("u1")).await.is_err());
    }

    #[test]
    fn layout_without_friends_hides_heading() {
        let session = session_for("u1");
        let layout = build_layout(
            &session,
            DashboardData {
                friends: vec![],
                unseen_request_count: 3,
            },
        );
        assert!(!layout.show_chats_heading);
        assert_eq!(layout.friend_requests.initial_unseen_request_count, 3);
        assert_eq!(layout.profile.image, "");
        assert_eq!(layout.sidebar_options.len(), 1);
    }
}
