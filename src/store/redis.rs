//! Native Redis backend over a multiplexed async connection.

use std::fmt;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::Value;

use super::{Command, KeyValueStore, StoreValue};
use crate::errors::AppError;

#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
}

impl RedisStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }

    /// Open a client for `url` and establish the shared connection.
    pub async fn connect(url: &str) -> Result<Self, AppError> {
        let client = redis::Client::open(url)?;
        let conn = client.get_multiplexed_async_connection().await?;
        tracing::info!("Connected to Redis");
        Ok(Self::new(conn))
    }
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore").finish_non_exhaustive()
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn execute(&self, command: Command, args: &[&str]) -> Result<StoreValue, AppError> {
        // the multiplexed connection is cheap to clone and shares one socket
        let mut conn = self.conn.clone();
        let reply: Value = redis::cmd(command.as_str())
            .arg(args)
            .query_async(&mut conn)
            .await?;
        Ok(from_redis(reply))
    }
}

fn from_redis(value: Value) -> StoreValue {
    match value {
        Value::Nil => StoreValue::Nil,
        Value::Int(i) => StoreValue::Int(i),
        Value::BulkString(bytes) => StoreValue::Text(String::from_utf8_lossy(&bytes).into_owned()),
        Value::SimpleString(s) => StoreValue::Text(s),
        Value::Okay => StoreValue::Text("OK".to_string()),
        Value::Array(items) | Value::Set(items) => {
            StoreValue::List(items.into_iter().map(from_redis).collect())
        }
        other => StoreValue::Text(format!("{other:?}")),
    }
}
