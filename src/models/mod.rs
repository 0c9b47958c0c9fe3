//! Stored records and view DTOs.

pub mod friend;
pub mod session;
pub mod sidebar;
pub mod user;
