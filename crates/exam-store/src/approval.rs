//! Dean approval of submitted exam schedules.
//!
//! The board holds two lists: requests still pending, oldest first, and the
//! most recent decided requests, newest first. A decision is written to the
//! store before the local lists change, so a failed write leaves the board as
//! it was.

use chrono::Utc;
use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::query::{Direction, Query};
use crate::records::{ApprovalStatus, NewApprovalRequest, ScheduleApproval, APPROVAL_TABLE};
use crate::store::{self, DataStore};

/// Number of decided requests loaded into the history list.
pub const HISTORY_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn status(self) -> ApprovalStatus {
        match self {
            Decision::Approve => ApprovalStatus::Approved,
            Decision::Reject => ApprovalStatus::Rejected,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApprovalBoard {
    pending: Vec<ScheduleApproval>,
    history: Vec<ScheduleApproval>,
}

impl ApprovalBoard {
    pub fn new(pending: Vec<ScheduleApproval>, history: Vec<ScheduleApproval>) -> Self {
        Self { pending, history }
    }

    pub async fn load(store: &dyn DataStore) -> Result<Self> {
        let pending = store::fetch(store, &pending_query()).await?;
        let history = store::fetch(store, &history_query()).await?;
        Ok(Self { pending, history })
    }

    /// Reload both lists. On error the current lists are kept.
    pub async fn refresh(&mut self, store: &dyn DataStore) -> Result<()> {
        match Self::load(store).await {
            Ok(fresh) => {
                *self = fresh;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "keeping previous approval lists");
                Err(err)
            }
        }
    }

    pub fn pending(&self) -> &[ScheduleApproval] {
        &self.pending
    }

    pub fn history(&self) -> &[ScheduleApproval] {
        &self.history
    }

    pub fn find(&self, request_id: Uuid) -> Option<&ScheduleApproval> {
        self.pending
            .iter()
            .chain(self.history.iter())
            .find(|r| r.request_id == request_id)
    }

    /// Approve or reject a pending request.
    ///
    /// # Errors
    /// `NotPending` if the request is not in the pending list, `NotFound` if
    /// the store updated no row, or the store's own error. In every error case
    /// the board is unchanged.
    pub async fn decide(
        &mut self,
        store: &dyn DataStore,
        request_id: Uuid,
        decision: Decision,
    ) -> Result<&ScheduleApproval> {
        let index = self
            .pending
            .iter()
            .position(|r| r.request_id == request_id)
            .ok_or(StoreError::NotPending(request_id))?;

        let status = decision.status();
        let query = Query::table(APPROVAL_TABLE).eq("request_id", request_id.to_string());
        let updated = store.update(&query, json!({ "status": status })).await?;
        if updated.is_empty() {
            return Err(StoreError::NotFound {
                table: APPROVAL_TABLE.to_string(),
                key: format!("request_id={request_id}"),
            });
        }

        let mut record = self.pending.remove(index);
        record.status = status;
        info!(%request_id, %status, "schedule request decided");
        self.history.insert(0, record);
        Ok(&self.history[0])
    }
}

/// Send a schedule to the dean as a new pending request.
pub async fn submit_request(
    store: &dyn DataStore,
    request: NewApprovalRequest,
) -> Result<ScheduleApproval> {
    let now = Utc::now();
    let record = ScheduleApproval {
        request_id: Uuid::new_v4(),
        dean_user_id: request.dean_user_id,
        dean_college: request.dean_college,
        submitted_by: request.submitted_by,
        submitted_at: Some(now),
        status: ApprovalStatus::Pending,
        remarks: request.remarks,
        created_at: now,
        file_url: request.file_url,
    };

    let stored: Vec<ScheduleApproval> = store::insert_row(store, APPROVAL_TABLE, &record).await?;
    info!(request_id = %record.request_id, dean = record.dean_user_id, "schedule sent for approval");
    Ok(stored.into_iter().next().unwrap_or(record))
}

fn pending_query() -> Query {
    Query::table(APPROVAL_TABLE)
        .eq("status", ApprovalStatus::Pending.as_str())
        .order("submitted_at", Direction::Ascending)
}

fn history_query() -> Query {
    Query::table(APPROVAL_TABLE)
        .in_list(
            "status",
            [
                ApprovalStatus::Approved.as_str(),
                ApprovalStatus::Rejected.as_str(),
            ],
        )
        .order("submitted_at", Direction::Descending)
        .limit(HISTORY_LIMIT)
}
