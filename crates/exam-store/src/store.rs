//! The `DataStore` abstraction shared by the REST client and the in-memory store.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::query::Query;

/// Table-oriented CRUD over JSON rows.
///
/// Writes return the affected rows as the store reports them after the change.
#[async_trait]
pub trait DataStore: Send + Sync {
    async fn select(&self, query: &Query) -> Result<Vec<Value>>;

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>>;

    /// Apply `patch` (a JSON object) to every row matched by `query`'s filters.
    async fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>>;

    async fn delete(&self, query: &Query) -> Result<Vec<Value>>;
}

/// Select and decode rows into `T`.
pub async fn fetch<T>(store: &dyn DataStore, query: &Query) -> Result<Vec<T>>
where
    T: DeserializeOwned,
{
    let rows = store.select(query).await?;
    decode_rows(rows)
}

/// Insert one record and decode the stored row.
pub async fn insert_row<T, R>(store: &dyn DataStore, table: &str, record: &T) -> Result<Vec<R>>
where
    T: Serialize + Sync,
    R: DeserializeOwned,
{
    let row = serde_json::to_value(record)?;
    let stored = store.insert(table, vec![row]).await?;
    decode_rows(stored)
}

/// Patch matched rows with a serializable value and decode the results.
pub async fn update_rows<P, R>(store: &dyn DataStore, query: &Query, patch: &P) -> Result<Vec<R>>
where
    P: Serialize + Sync,
    R: DeserializeOwned,
{
    let patch = serde_json::to_value(patch)?;
    let updated = store.update(query, patch).await?;
    decode_rows(updated)
}

fn decode_rows<T: DeserializeOwned>(rows: Vec<Value>) -> Result<Vec<T>> {
    rows.into_iter()
        .map(|row| serde_json::from_value(row).map_err(Into::into))
        .collect()
}
