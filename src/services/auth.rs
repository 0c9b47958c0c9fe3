//! Authentication provider: password hashing, session tokens and sign-in.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::session::Session;
use crate::models::user::User;
use crate::store::{self, keys, KeyValueStore};

/// Providers this service can sign users in with.
pub const PROVIDERS: &[&str] = &["credentials"];

/// JWT claims embedded in the session token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    /// Rebuild the session carried by these claims.
    pub fn into_session(self) -> Result<Session, AppError> {
        let expires = Utc
            .timestamp_opt(self.exp, 0)
            .single()
            .ok_or(AppError::Unauthorized)?;

        Ok(Session {
            user: User {
                id: self.sub,
                name: self.name,
                email: self.email,
                image: self.picture,
            },
            expires,
        })
    }
}

/// Signed session token and its expiry.
#[derive(Debug, Clone, Serialize)]
pub struct SessionToken {
    pub token: String,
    pub expires: DateTime<Utc>,
}

/// Hash a plaintext password with argon2id.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {e}")))
}

/// Verify a plaintext password against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

/// Sign a session token for `user`, valid for `max_age_secs`.
pub fn generate_token(
    user: &User,
    secret: &str,
    max_age_secs: i64,
) -> Result<SessionToken, AppError> {
    let now = Utc::now();
    let expires = Duration::try_seconds(max_age_secs)
        .and_then(|max_age| now.checked_add_signed(max_age))
        .ok_or_else(|| AppError::Internal(format!("Session max age out of range: {max_age_secs}")))?;

    let claims = Claims {
        sub: user.id.clone(),
        name: user.name.clone(),
        email: user.email.clone(),
        picture: user.image.clone(),
        exp: expires.timestamp(),
        iat: now.timestamp(),
    };

    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {e}")))?;

    Ok(SessionToken { token, expires })
}

/// Validate a session token and return the claims.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    jsonwebtoken::decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|_| AppError::Unauthorized)
}

/// Store a user record, its email index and its password hash.
pub async fn register_user(
    store: &dyn KeyValueStore,
    user: &User,
    password: &str,
) -> Result<(), AppError> {
    let record = serde_json::to_string(user)?;
    let password_hash = hash_password(password)?;

    store::set(store, &keys::user(&user.id), &record).await?;
    store::set(store, &keys::user_by_email(&user.email), &user.id).await?;
    store::set(store, &keys::credentials(&user.id), &password_hash).await?;
    Ok(())
}

/// Load the stored user record for `user_id`.
pub async fn find_user_by_id(
    store: &dyn KeyValueStore,
    user_id: &str,
) -> Result<Option<User>, AppError> {
    match store::get(store, &keys::user(user_id)).await? {
        Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
        None => Ok(None),
    }
}

/// Authenticate by email and password, returning a fresh session token.
///
/// Unknown emails, missing credentials and wrong passwords all map to
/// `Unauthorized` so the response does not reveal which one occurred.
pub async fn sign_in(
    store: &dyn KeyValueStore,
    email: &str,
    password: &str,
    secret: &str,
    max_age_secs: i64,
) -> Result<(SessionToken, Session), AppError> {
    let user_id = store::get(store, &keys::user_by_email(email))
        .await?
        .ok_or(AppError::Unauthorized)?;

    let password_hash = store::get(store, &keys::credentials(&user_id))
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !verify_password(password, &password_hash)? {
        tracing::info!(user_id = %user_id, "Rejected sign-in with wrong password");
        return Err(AppError::Unauthorized);
    }

    let user = find_user_by_id(store, &user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let token = generate_token(&user, secret, max_age_secs)?;
    let session = Session {
        user,
        expires: token.expires,
    };

    tracing::info!(user_id = %user_id, "User signed in");
    Ok((token, session))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;

    fn test_user() -> User {
        User {
            id: "u1".to_string(),
            name: "Ada Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            image: Some("https://example.com/ada.png".to_string()),
        }
    }

    #[test]
    fn password_hash_and_verify() {
        let password = "SecurePassword123!";
        let hash = hash_password(password).unwrap();
        assert_ne!(hash, password);
        assert!(verify_password(password, &hash).unwrap());
        assert!(!verify_password("WrongPassword", &hash).unwrap());
    }

    #[test]
    fn token_generation_and_validation() {
        let secret = "test-secret-key-for-jwt";
        let token = generate_token(&test_user(), secret, 900).unwrap();

        let claims = validate_token(&token.token, secret).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.email, "ada@example.com");

        let session = claims.into_session().unwrap();
        assert_eq!(session.user, test_user());
        assert_eq!(session.expires.timestamp(), token.expires.timestamp());
    }

    #[test]
    fn invalid_token_rejected() {
        let result = validate_token("garbage.token.here", "secret");
        assert!(result.is_err());
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = generate_token(&test_user(), "one-secret", 900).unwrap();
        assert!(validate_token(&token.token, "another-secret").is_err());
    }

    #[test]
    fn expired_token_rejected() {
        let secret = "test-secret";
        // Expired well beyond the 60s leeway window
        let token = generate_token(&test_user(), secret, -3600).unwrap();
        assert!(validate_token(&token.token, secret).is_err());
    }

    #[test]
    fn oversized_max_age_is_an_error() {
        let result = generate_token(&test_user(), "test-secret", i64::MAX);
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[tokio::test]
    async fn sign_in_with_registered_user() {
        let store = MemoryStore::new();
        register_user(&store, &test_user(), "hunter22").await.unwrap();

        let (token, session) = sign_in(&store, "ada@example.com", "hunter22", "s", 60)
            .await
            .unwrap();
        assert_eq!(session.user_id(), "u1");
        assert!(validate_token(&token.token, "s").is_ok());
    }

    #[tokio::test]
    async fn sign_in_rejects_bad_credentials() {
        let store = MemoryStore::new();
        register_user(&store, &test_user(), "hunter22").await.unwrap();

        let wrong_password = sign_in(&store, "ada@example.com", "nope", "s", 60).await;
        assert!(matches!(wrong_password, Err(AppError::Unauthorized)));

        let unknown_email = sign_in(&store, "bob@example.com", "hunter22", "s", 60).await;
        assert!(matches!(unknown_email, Err(AppError::Unauthorized)));
    }
}
