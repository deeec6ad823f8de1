use anyhow::Context;
use async_trait::async_trait;
use serde_json::Value;

use crate::{Order, Query, Table};

/// Row store of the hosted backend
///
/// Rows travel as JSON objects; the repositories convert them to and from
/// the typed rows of this crate.
#[async_trait(?Send)]
pub trait RemoteStore {
    async fn select(&self, table: Table, query: &Query, order: Order) -> anyhow::Result<Vec<Value>>;

    /// Returns the row as stored, including the columns filled by the backend
    async fn insert(&self, table: Table, row: Value) -> anyhow::Result<Value>;

    async fn update(&self, table: Table, query: &Query, patch: Value) -> anyhow::Result<()>;

    async fn delete(&self, table: Table, query: &Query) -> anyhow::Result<()>;
}

/// Object storage for attachments, scoped to one bucket
#[async_trait(?Send)]
pub trait ObjectStorage {
    async fn upload(&self, path: &str, content_type: &str, bytes: Vec<u8>) -> anyhow::Result<()>;

    fn public_url(&self, path: &str) -> String;

    async fn remove(&self, path: &str) -> anyhow::Result<()>;
}

/// Local persisted key-value storage, whole-value replace per key
pub trait KeyValueStore {
    fn get_raw(&self, key: &str) -> Option<String>;
    fn set_raw(&self, key: &str, value: String) -> anyhow::Result<()>;
    fn delete(&self, key: &str);

    /// Returns Ok(None) if the key is absent, and an error if it cannot be parsed
    fn get<T>(&self, key: &str) -> anyhow::Result<Option<T>>
    where
        T: for<'de> serde::Deserialize<'de>,
    {
        match self.get_raw(key) {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .with_context(|| format!("parsing local storage entry {key:?}")),
        }
    }

    fn set<T: ?Sized + serde::Serialize>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        let raw = serde_json::to_string(value)
            .with_context(|| format!("serializing local storage entry {key:?}"))?;
        self.set_raw(key, raw)
    }
}
