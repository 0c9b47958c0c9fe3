//! In-process store used by tests and local tooling.
//!
//! Mirrors the Redis semantics of the supported commands closely enough for
//! the dashboard reads, and records every executed command so callers can
//! assert on exactly which reads took place.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::{Command, KeyValueStore, StoreValue};
use crate::errors::AppError;

#[derive(Debug, Clone)]
enum Entry {
    Text(String),
    /// Members in insertion order, without duplicates.
    Set(Vec<String>),
    /// Members ordered by `(score, member)`.
    SortedSet(Vec<(i64, String)>),
}

#[derive(Debug, Default)]
struct Inner {
    data: HashMap<String, Entry>,
    history: Vec<(Command, Vec<String>)>,
    failing_keys: Vec<String>,
    unavailable: bool,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every command executed so far, with its arguments.
    pub fn history(&self) -> Vec<(Command, Vec<String>)> {
        self.lock().history.clone()
    }

    /// Number of read commands executed so far.
    pub fn read_count(&self) -> usize {
        self.lock()
            .history
            .iter()
            .filter(|(command, _)| {
                matches!(command, Command::Get | Command::Smembers | Command::Zrange)
            })
            .count()
    }

    /// Make every command touching `key` fail from now on.
    pub fn fail_key(&self, key: &str) {
        self.lock().failing_keys.push(key.to_string());
    }

    /// Make every command fail from now on, `PING` included.
    pub fn fail_all(&self) {
        self.lock().unavailable = true;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        // a poisoned lock only means a test panicked mid-command
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn execute(&self, command: Command, args: &[&str]) -> Result<StoreValue, AppError> {
        let mut inner = self.lock();
        inner
            .history
            .push((command, args.iter().map(|a| a.to_string()).collect()));

        if inner.unavailable {
            return Err(AppError::Store(format!(
                "injected failure for {}",
                command.as_str()
            )));
        }
        if let Some(key) = args.first() {
            if inner.failing_keys.iter().any(|k| k == key) {
                return Err(AppError::Store(format!("injected failure for {key}")));
            }
        }

        match command {
            Command::Ping => Ok(StoreValue::Text("PONG".to_string())),
            Command::Get => {
                let [key] = expect_args::<1>(command, args)?;
                match inner.data.get(key) {
                    None => Ok(StoreValue::Nil),
                    Some(Entry::Text(value)) => Ok(StoreValue::Text(value.clone())),
                    Some(_) => Err(wrong_type(key)),
                }
            }
            Command::Set => {
                let [key, value] = expect_args::<2>(command, args)?;
                inner
                    .data
                    .insert(key.to_string(), Entry::Text(value.to_string()));
                Ok(StoreValue::Text("OK".to_string()))
            }
            Command::Smembers => {
                let [key] = expect_args::<1>(command, args)?;
                match inner.data.get(key) {
                    None => Ok(StoreValue::List(Vec::new())),
                    Some(Entry::Set(members)) => Ok(text_list(members.iter())),
                    Some(_) => Err(wrong_type(key)),
                }
            }
            Command::Sadd => {
                let (key, members) = args
                    .split_first()
                    .filter(|(_, members)| !members.is_empty())
                    .ok_or_else(|| arity(command))?;
                let entry = inner
                    .data
                    .entry(key.to_string())
                    .or_insert_with(|| Entry::Set(Vec::new()));
                let Entry::Set(set) = entry else {
                    return Err(wrong_type(key));
                };
                let mut added = 0;
                for member in members {
                    if !set.iter().any(|m| m == member) {
                        set.push(member.to_string());
                        added += 1;
                    }
                }
                Ok(StoreValue::Int(added))
            }
            Command::Zadd => {
                let [key, score, member] = expect_args::<3>(command, args)?;
                let score: i64 = score
                    .parse()
                    .map_err(|_| AppError::Store("ERR value is not an integer".to_string()))?;
                let entry = inner
                    .data
                    .entry(key.to_string())
                    .or_insert_with(|| Entry::SortedSet(Vec::new()));
                let Entry::SortedSet(zset) = entry else {
                    return Err(wrong_type(key));
                };
                let existed = zset.iter().position(|(_, m)| m == member);
                if let Some(index) = existed {
                    zset.remove(index);
                }
                zset.push((score, member.to_string()));
                zset.sort();
                Ok(StoreValue::Int(if existed.is_some() { 0 } else { 1 }))
            }
            Command::Zrange => {
                let [key, start, stop] = expect_args::<3>(command, args)?;
                let (start, stop) = match (start.parse::<i64>(), stop.parse::<i64>()) {
                    (Ok(start), Ok(stop)) => (start, stop),
                    _ => return Err(AppError::Store("ERR value is not an integer".to_string())),
                };
                match inner.data.get(key) {
                    None => Ok(StoreValue::List(Vec::new())),
                    Some(Entry::SortedSet(zset)) => {
                        let range = index_range(zset.len(), start, stop);
                        Ok(text_list(zset[range].iter().map(|(_, m)| m)))
                    }
                    Some(_) => Err(wrong_type(key)),
                }
            }
        }
    }
}

fn expect_args<'a, const N: usize>(
    command: Command,
    args: &[&'a str],
) -> Result<[&'a str; N], AppError> {
    <[&str; N]>::try_from(args).map_err(|_| arity(command))
}

fn arity(command: Command) -> AppError {
    AppError::Store(format!(
        "ERR wrong number of arguments for '{}' command",
        command.as_str()
    ))
}

fn wrong_type(key: &str) -> AppError {
    AppError::Store(format!(
        "WRONGTYPE Operation against a key holding the wrong kind of value: {key}"
    ))
}

fn text_list<'a>(items: impl Iterator<Item = &'a String>) -> StoreValue {
    StoreValue::List(items.map(|s| StoreValue::Text(s.clone())).collect())
}

/// Redis-style inclusive range with negative indices counted from the end.
fn index_range(len: usize, start: i64, stop: i64) -> std::ops::Range<usize> {
    let len = len as i64;
    let start = if start < 0 { (len + start).max(0) } else { start };
    let stop = if stop < 0 { len + stop } else { stop.min(len - 1) };
    if start > stop || start >= len {
        return 0..0;
    }
    start as usize..(stop + 1) as usize
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{get, sadd, set, smembers, zadd, zrange};

    #[tokio::test]
    async fn set_then_get() {
        let store = MemoryStore::new();
        set(&store, "user:u1", "{}").await.unwrap();
        assert_eq!(get(&store, "user:u1").await.unwrap().as_deref(), Some("{}"));
        assert_eq!(get(&store, "user:u2").await.unwrap(), None);
    }

    #[tokio::test]
    async fn sadd_ignores_duplicates() {
        let store = MemoryStore::new();
        assert_eq!(sadd(&store, "s", "a").await.unwrap(), 1);
        assert_eq!(sadd(&store, "s", "a").await.unwrap(), 0);
        assert_eq!(sadd(&store, "s", "b").await.unwrap(), 1);
        assert_eq!(smembers(&store, "s").await.unwrap(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn zrange_last_element() {
        let store = MemoryStore::new();
        zadd(&store, "z", 20, "second").await.unwrap();
        zadd(&store, "z", 10, "first").await.unwrap();
        assert_eq!(zrange(&store, "z", -1, -1).await.unwrap(), vec!["second"]);
        assert_eq!(
            zrange(&store, "z", 0, -1).await.unwrap(),
            vec!["first", "second"]
        );
        assert!(zrange(&store, "missing", -1, -1).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn wrong_type_is_an_error() {
        let store = MemoryStore::new();
        set(&store, "k", "v").await.unwrap();
        assert!(smembers(&store, "k").await.is_err());
    }

    #[tokio::test]
    async fn injected_failure_and_history() {
        let store = MemoryStore::new();
        store.fail_key("user:u1:friends");
        assert!(smembers(&store, "user:u1:friends").await.is_err());
        assert_eq!(store.read_count(), 1);
        assert_eq!(
            store.history(),
            vec![(Command::Smembers, vec!["user:u1:friends".to_string()])]
        );
    }

    #[tokio::test]
    async fn unavailable_store_fails_ping() {
        let store = MemoryStore::new();
        assert!(crate::store::ping(&store).await.is_ok());
        store.fail_all();
        assert!(crate::store::ping(&store).await.is_err());
        assert!(get(&store, "user:u1").await.is_err());
    }

    #[test]
    fn index_range_matches_redis() {
        assert_eq!(index_range(3, 0, -1), 0..3);
        assert_eq!(index_range(3, -1, -1), 2..3);
        assert_eq!(index_range(3, 1, 10), 1..3);
        assert_eq!(index_range(3, -10, 0), 0..1);
        assert_eq!(index_range(0, -1, -1), 0..0);
        assert_eq!(index_range(3, 2, 1), 0..0);
    }
}
