//! Upstash-style REST backend.
//!
//! Each command becomes `GET {base}/{command}/{arg}/...` with a bearer token;
//! the server answers `{"result": ...}` on success and `{"error": "..."}`
//! otherwise.

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;

use super::{Command, KeyValueStore, StoreValue};
use crate::errors::AppError;

#[derive(Debug, Clone)]
pub struct RestStore {
    client: reqwest::Client,
    base_url: Url,
    token: String,
}

#[derive(Debug, Deserialize)]
struct RestReply {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<String>,
}

impl RestStore {
    pub fn new(base_url: &str, token: &str) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::Internal(format!("Invalid REST store URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::Internal(format!(
                "REST store URL cannot be a base: {base_url}"
            )));
        }

        Ok(Self {
            client: reqwest::Client::new(),
            base_url,
            token: token.to_string(),
        })
    }

    /// Build the request URL, percent-encoding every argument as its own segment.
    pub fn command_url(&self, command: Command, args: &[&str]) -> Result<Url, AppError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("REST store URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push(command.as_str())
            .extend(args);
        Ok(url)
    }
}

#[async_trait]
impl KeyValueStore for RestStore {
    async fn execute(&self, command: Command, args: &[&str]) -> Result<StoreValue, AppError> {
        let url = self.command_url(command, args)?;
        let reply: RestReply = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?
            .json()
            .await?;

        if let Some(error) = reply.error {
            return Err(AppError::Store(error));
        }
        Ok(reply.result.map(StoreValue::from).unwrap_or(StoreValue::Nil))
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};
    use tokio::net::TcpListener;

    use super::*;
    use crate::store::{get as store_get, smembers};

    const TOKEN: &str = "rest-test-token";

    /// Minimal stand-in for the REST endpoint: answers a handful of fixed keys.
    async fn fake_upstash(headers: HeaderMap, Path(parts): Path<String>) -> (StatusCode, Json<Value>) {
        let authorized = headers
            .get("Authorization")
            .and_then(|v| v.to_str().ok())
            .map(|v| v == format!("Bearer {TOKEN}"))
            .unwrap_or(false);
        if !authorized {
            return (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Unauthorized" })));
        }

        match parts.as_str() {
            "smembers/user:u1:incoming_friend_requests" => {
                (StatusCode::OK, Json(json!({ "result": ["u2", "u3"] })))
            }
            "get/user:missing" => (StatusCode::OK, Json(json!({ "result": null }))),
            _ => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "ERR unknown command" })),
            ),
        }
    }

    async fn start_fake() -> String {
        let app = Router::new().route("/{*parts}", get(fake_upstash));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });
        format!("http://{addr}")
    }

    #[test]
    fn command_url_encodes_segments() {
        let store = RestStore::new("https://example.upstash.io/", "t").unwrap();
        let url = store
            .command_url(Command::Get, &["user:email:a b@example.com"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://example.upstash.io/get/user:email:a%20b@example.com"
        );
    }

    #[test]
    fn rejects_non_base_url() {
        assert!(RestStore::new("mailto:someone@example.com", "t").is_err());
        assert!(RestStore::new("not a url", "t").is_err());
    }

    #[tokio::test]
    async fn smembers_over_rest() {
        let base = start_fake().await;
        let store = RestStore::new(&base, TOKEN).unwrap();
        let members = smembers(&store, "user:u1:incoming_friend_requests")
            .await
            .unwrap();
        assert_eq!(members, vec!["u2", "u3"]);
    }

    #[tokio::test]
    async fn null_result_is_nil() {
        let base = start_fake().await;
        let store = RestStore::new(&base, TOKEN).unwrap();
        assert_eq!(store_get(&store, "user:missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn error_body_becomes_store_error() {
        let base = start_fake().await;
        let store = RestStore::new(&base, "wrong-token").unwrap();
        let err = smembers(&store, "user:u1:incoming_friend_requests")
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Store(ref msg) if msg == "Unauthorized"));
    }
}
