//! User record as stored under `user:<id>`.

use serde::{Deserialize, Serialize};

/// Stored user profile. `image` is optional: accounts created without an
/// avatar simply lack the field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Profile block shown in the sidebar footer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileView {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Avatar URL, empty when the user has none.
    pub image: String,
}

impl From<&User> for ProfileView {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.clone(),
            name: u.name.clone(),
            email: u.email.clone(),
            image: u.image.clone().unwrap_or_default(),
        }
    }
}
