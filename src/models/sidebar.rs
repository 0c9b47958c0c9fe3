//! Sidebar navigation entries.

use serde::Serialize;

/// Icons the frontend knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Icon {
    Logo,
    UserPlus,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SidebarOption {
    pub id: u32,
    pub name: &'static str,
    pub href: &'static str,
    pub icon: Icon,
}

/// Static "Overview" links shown above the friend-request entry.
pub const SIDEBAR_OPTIONS: &[SidebarOption] = &[SidebarOption {
    id: 1,
    name: "Add Friend",
    href: "/dashboard/add",
    icon: Icon::UserPlus,
}];

/// The friend-request entry, carrying the count it starts from before live
/// updates take over on the client.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FriendRequestsOption {
    pub name: &'static str,
    pub href: &'static str,
    pub icon: Icon,
    pub initial_unseen_request_count: usize,
}

impl FriendRequestsOption {
    pub fn new(initial_unseen_request_count: usize) -> Self {
        Self {
            name: "Friend requests",
            href: "/dashboard/requests",
            icon: Icon::User,
            initial_unseen_request_count,
        }
    }
}
