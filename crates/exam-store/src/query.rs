//! Table queries: column selection, filters, ordering and limits.
//!
//! A [`Query`] is backend-neutral. [`Query::to_pairs`] renders it in the
//! PostgREST query-string dialect the hosted store speaks
//! (`status=eq.pending`, `status=in.(approved,rejected)`,
//! `order=submitted_at.desc`, `limit=20`); `MemoryStore` evaluates the same
//! structure in process.

use serde_json::Value;

use crate::error::{Result, StoreError};

/// Sort direction for an `order` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    fn suffix(self) -> &'static str {
        match self {
            Direction::Ascending => "asc",
            Direction::Descending => "desc",
        }
    }
}

/// Comparison operators supported in filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl CompareOp {
    fn keyword(self) -> &'static str {
        match self {
            CompareOp::Eq => "eq",
            CompareOp::Neq => "neq",
            CompareOp::Gt => "gt",
            CompareOp::Gte => "gte",
            CompareOp::Lt => "lt",
            CompareOp::Lte => "lte",
        }
    }
}

/// A single row filter. All filters of a query are AND-ed.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Compare {
        column: String,
        op: CompareOp,
        value: Value,
    },
    In {
        column: String,
        values: Vec<Value>,
    },
}

impl Filter {
    pub fn column(&self) -> &str {
        match self {
            Filter::Compare { column, .. } | Filter::In { column, .. } => column,
        }
    }

    fn render(&self) -> String {
        match self {
            Filter::Compare { op, value, .. } => {
                format!("{}.{}", op.keyword(), render_scalar(value))
            }
            Filter::In { values, .. } => {
                let items: Vec<String> = values.iter().map(render_list_item).collect();
                format!("in.({})", items.join(","))
            }
        }
    }
}

/// A query against one named table.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    table: String,
    columns: Option<String>,
    filters: Vec<Filter>,
    order: Vec<(String, Direction)>,
    limit: Option<usize>,
}

impl Query {
    pub fn table(name: impl Into<String>) -> Self {
        Self {
            table: name.into(),
            columns: None,
            filters: Vec::new(),
            order: Vec::new(),
            limit: None,
        }
    }

    /// Comma-separated column list; `*` (the default) selects everything.
    pub fn select(mut self, columns: impl Into<String>) -> Self {
        self.columns = Some(columns.into());
        self
    }

    pub fn eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.compare(column, CompareOp::Eq, value)
    }

    pub fn neq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.compare(column, CompareOp::Neq, value)
    }

    pub fn gt(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.compare(column, CompareOp::Gt, value)
    }

    pub fn gte(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.compare(column, CompareOp::Gte, value)
    }

    pub fn lt(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.compare(column, CompareOp::Lt, value)
    }

    pub fn lte(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.compare(column, CompareOp::Lte, value)
    }

    pub fn in_list<I, V>(mut self, column: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.filters.push(Filter::In {
            column: column.into(),
            values: values.into_iter().map(Into::into).collect(),
        });
        self
    }

    /// Append a sort key. Earlier keys take precedence.
    pub fn order(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.order.push((column.into(), direction));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    fn compare(mut self, column: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Compare {
            column: column.into(),
            op,
            value: value.into(),
        });
        self
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    pub fn columns(&self) -> &str {
        self.columns.as_deref().unwrap_or("*")
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn ordering(&self) -> &[(String, Direction)] {
        &self.order
    }

    pub fn row_limit(&self) -> Option<usize> {
        self.limit
    }

    /// Full query string for a read: select, filters, order, limit.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = vec![("select".to_string(), self.columns().to_string())];
        pairs.extend(self.filter_pairs());
        if !self.order.is_empty() {
            let keys: Vec<String> = self
                .order
                .iter()
                .map(|(column, dir)| format!("{}.{}", column, dir.suffix()))
                .collect();
            pairs.push(("order".to_string(), keys.join(",")));
        }
        if let Some(n) = self.limit {
            pairs.push(("limit".to_string(), n.to_string()));
        }
        pairs
    }

    /// Only the filter pairs, used to scope updates and deletes.
    pub fn filter_pairs(&self) -> Vec<(String, String)> {
        self.filters
            .iter()
            .map(|f| (f.column().to_string(), f.render()))
            .collect()
    }

    /// Writes without a filter would touch every row of the table.
    pub fn require_filters(&self, action: &str) -> Result<()> {
        if self.filters.is_empty() {
            return Err(StoreError::InvalidQuery {
                table: self.table.clone(),
                reason: format!("refusing unfiltered {action}"),
            });
        }
        Ok(())
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

/// List items containing reserved characters are double-quoted.
fn render_list_item(value: &Value) -> String {
    let raw = render_scalar(value);
    if raw.contains([',', '(', ')', '"', ' ']) {
        format!("\"{}\"", raw.replace('\\', "\\\\").replace('"', "\\\""))
    } else {
        raw
    }
}
