//! In-process `DataStore` over JSON rows.
//!
//! Evaluates the same [`Query`] semantics the REST endpoint applies: filters
//! are AND-ed, timestamps compare as instants, ordering puts nulls last when
//! ascending and first when descending. Used by the test suites and by the
//! CLI's offline mode.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::query::{CompareOp, Direction, Filter, Query};
use crate::store::DataStore;

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<BTreeMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed `table` with `rows`, replacing any previous contents.
    pub fn with_table(mut self, table: impl Into<String>, rows: Vec<Value>) -> Self {
        self.tables.get_mut().insert(table.into(), rows);
        self
    }

    /// Load every `<table>.json` file in `dir`. Each file holds a JSON array of rows.
    pub async fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        let mut tables = BTreeMap::new();
        let mut entries = tokio::fs::read_dir(dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(table) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let text = tokio::fs::read_to_string(&path).await?;
            let rows = match serde_json::from_str::<Value>(&text)? {
                Value::Array(rows) => rows,
                _ => {
                    return Err(StoreError::InvalidConfig(format!(
                        "{} must contain a JSON array of rows",
                        path.display()
                    )))
                }
            };
            debug!(table, rows = rows.len(), "loaded fixture table");
            tables.insert(table.to_string(), rows);
        }

        Ok(Self {
            tables: RwLock::new(tables),
        })
    }

    /// Current contents of `table`, in storage order.
    pub async fn snapshot(&self, table: &str) -> Vec<Value> {
        self.tables
            .read()
            .await
            .get(table)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn select(&self, query: &Query) -> Result<Vec<Value>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<&Value> = tables
            .get(query.table_name())
            .map(|rows| rows.iter().filter(|row| matches_all(row, query)).collect())
            .unwrap_or_default();

        rows.sort_by(|a, b| compare_rows(a, b, query.ordering()));
        if let Some(n) = query.row_limit() {
            rows.truncate(n);
        }

        Ok(rows
            .into_iter()
            .map(|row| project(row, query.columns()))
            .collect())
    }

    async fn insert(&self, table: &str, rows: Vec<Value>) -> Result<Vec<Value>> {
        if let Some(bad) = rows.iter().find(|row| !row.is_object()) {
            return Err(StoreError::InvalidQuery {
                table: table.to_string(),
                reason: format!("row is not an object: {bad}"),
            });
        }
        let mut tables = self.tables.write().await;
        tables
            .entry(table.to_string())
            .or_default()
            .extend(rows.iter().cloned());
        Ok(rows)
    }

    async fn update(&self, query: &Query, patch: Value) -> Result<Vec<Value>> {
        query.require_filters("update")?;
        let Value::Object(patch) = patch else {
            return Err(StoreError::InvalidQuery {
                table: query.table_name().to_string(),
                reason: "update patch must be an object".into(),
            });
        };

        let mut tables = self.tables.write().await;
        let mut updated = Vec::new();
        if let Some(rows) = tables.get_mut(query.table_name()) {
            for row in rows.iter_mut().filter(|row| matches_all(row, query)) {
                if let Value::Object(fields) = row {
                    for (key, value) in &patch {
                        fields.insert(key.clone(), value.clone());
                    }
                }
                updated.push(row.clone());
            }
        }
        Ok(updated)
    }

    async fn delete(&self, query: &Query) -> Result<Vec<Value>> {
        query.require_filters("delete")?;
        let mut tables = self.tables.write().await;
        let Some(rows) = tables.get_mut(query.table_name()) else {
            return Ok(Vec::new());
        };
        let (removed, kept): (Vec<Value>, Vec<Value>) =
            rows.drain(..).partition(|row| matches_all(row, query));
        *rows = kept;
        Ok(removed)
    }
}

fn matches_all(row: &Value, query: &Query) -> bool {
    query.filters().iter().all(|filter| matches(row, filter))
}

fn matches(row: &Value, filter: &Filter) -> bool {
    let actual = row.get(filter.column()).unwrap_or(&Value::Null);
    match filter {
        Filter::Compare { op, value, .. } => {
            let ordering = compare_values(actual, value);
            match op {
                CompareOp::Eq => ordering == Some(Ordering::Equal),
                CompareOp::Neq => ordering.is_some_and(|o| o != Ordering::Equal),
                CompareOp::Gt => ordering == Some(Ordering::Greater),
                CompareOp::Gte => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
                CompareOp::Lt => ordering == Some(Ordering::Less),
                CompareOp::Lte => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
            }
        }
        Filter::In { values, .. } => values
            .iter()
            .any(|candidate| compare_values(actual, candidate) == Some(Ordering::Equal)),
    }
}

/// Loose comparison in the spirit of the REST endpoint, where every filter
/// value arrives as text. `None` means the values are not comparable.
fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Null, _) | (_, Value::Null) => None,
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        (Value::String(x), Value::String(y)) => match (parse_instant(x), parse_instant(y)) {
            (Some(x), Some(y)) => Some(x.cmp(&y)),
            _ => Some(x.cmp(y)),
        },
        (Value::Number(x), Value::String(y)) => x.as_f64()?.partial_cmp(&y.parse::<f64>().ok()?),
        (Value::String(x), Value::Number(y)) => x.parse::<f64>().ok()?.partial_cmp(&y.as_f64()?),
        (Value::Bool(x), Value::String(y)) => Some(x.cmp(&y.parse::<bool>().ok()?)),
        (Value::String(x), Value::Bool(y)) => Some(x.parse::<bool>().ok()?.cmp(y)),
        _ => None,
    }
}

fn parse_instant(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(s).ok()
}

fn compare_rows(a: &Value, b: &Value, order: &[(String, Direction)]) -> Ordering {
    for (column, direction) in order {
        let x = a.get(column).unwrap_or(&Value::Null);
        let y = b.get(column).unwrap_or(&Value::Null);
        let ordering = match (x.is_null(), y.is_null()) {
            (true, true) => Ordering::Equal,
            // Nulls sort as larger than any value.
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => compare_values(x, y).unwrap_or(Ordering::Equal),
        };
        let ordering = match direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn project(row: &Value, columns: &str) -> Value {
    if columns.trim() == "*" {
        return row.clone();
    }
    let Value::Object(fields) = row else {
        return row.clone();
    };
    let picked: Map<String, Value> = columns
        .split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .filter_map(|c| fields.get(c).map(|v| (c.to_string(), v.clone())))
        .collect();
    Value::Object(picked)
}
