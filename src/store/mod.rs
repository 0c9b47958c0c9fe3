//! Key-value store access through a generic command interface.
//!
//! Every backend accepts the same [`Command`] set and answers with a
//! [`StoreValue`]. Callers normally go through the typed helpers at the bottom
//! of this module rather than matching on raw replies.

pub mod keys;
pub mod memory;
pub mod redis;
pub mod rest;

use std::fmt::Debug;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{AppConfig, StoreBackend};
use crate::errors::AppError;

/// Commands understood by every store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Get,
    Set,
    Smembers,
    Sadd,
    Zrange,
    Zadd,
    Ping,
}

impl Command {
    /// Wire name of the command, as used in the Redis protocol and REST paths.
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::Get => "get",
            Command::Set => "set",
            Command::Smembers => "smembers",
            Command::Sadd => "sadd",
            Command::Zrange => "zrange",
            Command::Zadd => "zadd",
            Command::Ping => "ping",
        }
    }
}

/// Backend-neutral reply to a store command.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreValue {
    Nil,
    Int(i64),
    Text(String),
    List(Vec<StoreValue>),
}

impl StoreValue {
    /// Interpret the reply as an optional string (`GET`).
    pub fn into_string(self) -> Result<Option<String>, AppError> {
        match self {
            StoreValue::Nil => Ok(None),
            StoreValue::Text(s) => Ok(Some(s)),
            StoreValue::Int(i) => Ok(Some(i.to_string())),
            StoreValue::List(_) => Err(AppError::Store(
                "expected a string reply, got a list".to_string(),
            )),
        }
    }

    /// Interpret the reply as a list of strings (`SMEMBERS`, `ZRANGE`).
    pub fn into_strings(self) -> Result<Vec<String>, AppError> {
        match self {
            StoreValue::Nil => Ok(Vec::new()),
            StoreValue::List(items) => items
                .into_iter()
                .map(|item| {
                    item.into_string()?.ok_or_else(|| {
                        AppError::Store("unexpected nil inside list reply".to_string())
                    })
                })
                .collect(),
            other => Err(AppError::Store(format!(
                "expected a list reply, got {other:?}"
            ))),
        }
    }

    /// Interpret the reply as an integer (`SADD`, `ZADD`).
    pub fn into_int(self) -> Result<i64, AppError> {
        match self {
            StoreValue::Int(i) => Ok(i),
            StoreValue::Text(s) => s
                .parse()
                .map_err(|_| AppError::Store(format!("expected an integer reply, got {s:?}"))),
            other => Err(AppError::Store(format!(
                "expected an integer reply, got {other:?}"
            ))),
        }
    }
}

impl From<serde_json::Value> for StoreValue {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => StoreValue::Nil,
            Value::Bool(b) => StoreValue::Int(i64::from(b)),
            Value::Number(n) => match n.as_i64() {
                Some(i) => StoreValue::Int(i),
                None => StoreValue::Text(n.to_string()),
            },
            Value::String(s) => StoreValue::Text(s),
            Value::Array(items) => StoreValue::List(items.into_iter().map(Into::into).collect()),
            object @ Value::Object(_) => StoreValue::Text(object.to_string()),
        }
    }
}

/// A key-value store reachable through a generic command dispatcher.
#[async_trait]
pub trait KeyValueStore: Send + Sync + Debug {
    /// Run `command` with positional `args` (the key comes first).
    async fn execute(&self, command: Command, args: &[&str]) -> Result<StoreValue, AppError>;
}

/// Store handle shared across handlers.
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Open the backend selected by the configuration.
pub async fn connect(config: &AppConfig) -> Result<SharedStore, AppError> {
    match config.store_backend {
        StoreBackend::Redis => {
            let store = redis::RedisStore::connect(&config.redis_url).await?;
            Ok(Arc::new(store))
        }
        StoreBackend::Rest => {
            let url = config.rest_url.as_deref().ok_or_else(|| {
                AppError::Internal("UPSTASH_REDIS_REST_URL must be set for the rest backend".into())
            })?;
            let token = config.rest_token.as_deref().ok_or_else(|| {
                AppError::Internal(
                    "UPSTASH_REDIS_REST_TOKEN must be set for the rest backend".into(),
                )
            })?;
            Ok(Arc::new(rest::RestStore::new(url, token)?))
        }
    }
}

/// `GET key`.
pub async fn get(store: &dyn KeyValueStore, key: &str) -> Result<Option<String>, AppError> {
    store.execute(Command::Get, &[key]).await?.into_string()
}

/// `SET key value`.
pub async fn set(store: &dyn KeyValueStore, key: &str, value: &str) -> Result<(), AppError> {
    store.execute(Command::Set, &[key, value]).await?;
    Ok(())
}

/// `SMEMBERS key`.
pub async fn smembers(store: &dyn KeyValueStore, key: &str) -> Result<Vec<String>, AppError> {
    store.execute(Command::Smembers, &[key]).await?.into_strings()
}

/// `SADD key member`, returning how many members were newly added.
pub async fn sadd(store: &dyn KeyValueStore, key: &str, member: &str) -> Result<i64, AppError> {
    store.execute(Command::Sadd, &[key, member]).await?.into_int()
}

/// `ZRANGE key start stop`.
pub async fn zrange(
    store: &dyn KeyValueStore,
    key: &str,
    start: i64,
    stop: i64,
) -> Result<Vec<String>, AppError> {
    let (start, stop) = (start.to_string(), stop.to_string());
    store
        .execute(Command::Zrange, &[key, &start, &stop])
        .await?
        .into_strings()
}

/// `ZADD key score member`.
pub async fn zadd(
    store: &dyn KeyValueStore,
    key: &str,
    score: i64,
    member: &str,
) -> Result<i64, AppError> {
    let score = score.to_string();
    store
        .execute(Command::Zadd, &[key, &score, member])
        .await?
        .into_int()
}

/// `PING`, used by the readiness check.
pub async fn ping(store: &dyn KeyValueStore) -> Result<(), AppError> {
    store.execute(Command::Ping, &[]).await?;
    Ok(())
}
