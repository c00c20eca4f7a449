//! Exam periods and term names for the calendar view.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::query::{Direction, Query};
use crate::records::{ExamPeriod, Term, EXAM_PERIOD_TABLE, TERM_TABLE};
use crate::store::{self, DataStore};
use crate::subscription::Subscription;

/// Label for a period whose term id has no row in the term table.
pub const UNKNOWN_TERM: &str = "Unknown Term";

/// Term id to display name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TermMap(BTreeMap<i64, String>);

impl TermMap {
    pub fn name(&self, term_id: i64) -> &str {
        self.0.get(&term_id).map(String::as_str).unwrap_or(UNKNOWN_TERM)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<Term> for TermMap {
    fn from_iter<I: IntoIterator<Item = Term>>(iter: I) -> Self {
        Self(iter.into_iter().map(|t| (t.term_id, t.term_name)).collect())
    }
}

/// Everything the calendar needs from one fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodSnapshot {
    pub periods: Vec<ExamPeriod>,
    pub terms: TermMap,
}

/// All exam periods, ordered by id so cell headlines are stable between fetches.
pub async fn load_periods(store: &dyn DataStore) -> Result<Vec<ExamPeriod>> {
    let query = Query::table(EXAM_PERIOD_TABLE).order("examperiod_id", Direction::Ascending);
    store::fetch(store, &query).await
}

pub async fn load_terms(store: &dyn DataStore) -> Result<TermMap> {
    let terms: Vec<Term> = store::fetch(store, &Query::table(TERM_TABLE)).await?;
    Ok(terms.into_iter().collect())
}

pub async fn load_snapshot(store: &dyn DataStore) -> Result<PeriodSnapshot> {
    let periods = load_periods(store).await?;
    let terms = load_terms(store).await?;
    Ok(PeriodSnapshot { periods, terms })
}

/// Refetch periods and terms every `interval`, publishing only on change.
pub fn watch_periods(
    store: Arc<dyn DataStore>,
    interval: Duration,
    token: CancellationToken,
) -> Subscription<PeriodSnapshot> {
    Subscription::with_token(interval, token, move || {
        let store = Arc::clone(&store);
        async move { load_snapshot(store.as_ref()).await }
    })
}
