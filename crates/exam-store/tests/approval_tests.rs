//! Dean approval board: loading, decisions, and failure handling.

use async_trait::async_trait;
use exam_store::approval::{submit_request, HISTORY_LIMIT};
use exam_store::query::Query;
use exam_store::records::{ApprovalStatus, NewApprovalRequest, APPROVAL_TABLE};
use exam_store::{ApprovalBoard, DataStore, Decision, MemoryStore, StoreError};
use serde_json::{json, Value};
use uuid::Uuid;

// ── Helpers ─────────────────────────────────────────────────────────────────

fn request_id(n: u32) -> Uuid {
    Uuid::parse_str(&format!("00000000-0000-4000-8000-{n:012}")).unwrap()
}

fn row(n: u32, status: &str, submitted_at: &str) -> Value {
    json!({
        "request_id": request_id(n).to_string(),
        "dean_user_id": 4,
        "dean_college": "CITC",
        "submitted_by": 11,
        "submitted_at": submitted_at,
        "status": status,
        "remarks": null,
        "created_at": submitted_at,
        "file_url": null
    })
}

fn seeded() -> MemoryStore {
    MemoryStore::new().with_table(
        APPROVAL_TABLE,
        vec![
            row(1, "pending", "2025-06-03T08:00:00Z"),
            row(2, "approved", "2025-06-01T08:00:00Z"),
            row(3, "pending", "2025-06-02T08:00:00Z"),
            row(4, "rejected", "2025-06-02T09:00:00Z"),
        ],
    )
}

/// Reads pass through; every write fails.
struct ReadOnlyStore(MemoryStore);

#[async_trait]
impl DataStore for ReadOnlyStore {
    async fn select(&self, query: &Query) -> exam_store::Result<Vec<Value>> {
        self.0.select(query).await
    }

    async fn insert(&self, _table: &str, _rows: Vec<Value>) -> exam_store::Result<Vec<Value>> {
        Err(write_refused())
    }

    async fn update(&self, _query: &Query, _patch: Value) -> exam_store::Result<Vec<Value>> {
        Err(write_refused())
    }

    async fn delete(&self, _query: &Query) -> exam_store::Result<Vec<Value>> {
        Err(write_refused())
    }
}

fn write_refused() -> StoreError {
    StoreError::Api {
        status: 403,
        message: "permission denied".into(),
    }
}

// ── Loading ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn load_splits_pending_and_history() {
    let board = ApprovalBoard::load(&seeded()).await.unwrap();

    let pending: Vec<Uuid> = board.pending().iter().map(|r| r.request_id).collect();
    let history: Vec<Uuid> = board.history().iter().map(|r| r.request_id).collect();

    // Pending oldest first, history newest first.
    assert_eq!(pending, vec![request_id(3), request_id(1)]);
    assert_eq!(history, vec![request_id(4), request_id(2)]);
}

#[tokio::test]
async fn history_is_capped() {
    let rows: Vec<Value> = (1..=25)
        .map(|n| row(n, "approved", &format!("2025-05-{n:02}T08:00:00Z")))
        .collect();
    let store = MemoryStore::new().with_table(APPROVAL_TABLE, rows);

    let board = ApprovalBoard::load(&store).await.unwrap();
    assert_eq!(board.history().len(), HISTORY_LIMIT);
    assert_eq!(board.history()[0].request_id, request_id(25));
}

// ── Decisions ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn approve_moves_request_to_front_of_history() {
    let store = seeded();
    let mut board = ApprovalBoard::load(&store).await.unwrap();

    let decided = board
        .decide(&store, request_id(1), Decision::Approve)
        .await
        .unwrap();
    assert_eq!(decided.status, ApprovalStatus::Approved);

    assert_eq!(board.pending().len(), 1);
    assert_eq!(board.history()[0].request_id, request_id(1));
    assert_eq!(board.history().len(), 3);

    let stored = store.snapshot(APPROVAL_TABLE).await;
    assert_eq!(stored[0]["status"], "approved");
}

#[tokio::test]
async fn reject_writes_rejected_status() {
    let store = seeded();
    let mut board = ApprovalBoard::load(&store).await.unwrap();

    board
        .decide(&store, request_id(3), Decision::Reject)
        .await
        .unwrap();

    let reloaded = ApprovalBoard::load(&store).await.unwrap();
    assert_eq!(reloaded.pending().len(), 1);
    assert_eq!(
        reloaded.find(request_id(3)).unwrap().status,
        ApprovalStatus::Rejected
    );
}

#[tokio::test]
async fn deciding_a_non_pending_request_is_an_error() {
    let store = seeded();
    let mut board = ApprovalBoard::load(&store).await.unwrap();
    let before = board.clone();

    let err = board
        .decide(&store, request_id(2), Decision::Reject)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotPending(id) if id == request_id(2)));
    assert_eq!(board, before);
}

#[tokio::test]
async fn failed_update_leaves_board_unchanged() {
    let store = ReadOnlyStore(seeded());
    let mut board = ApprovalBoard::load(&store).await.unwrap();
    let before = board.clone();

    let err = board
        .decide(&store, request_id(1), Decision::Approve)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Api { status: 403, .. }));
    assert_eq!(board, before);
}

#[tokio::test]
async fn request_deleted_remotely_is_not_found() {
    let store = seeded();
    let mut board = ApprovalBoard::load(&store).await.unwrap();
    store
        .delete(&Query::table(APPROVAL_TABLE).eq("request_id", request_id(1).to_string()))
        .await
        .unwrap();

    let err = board
        .decide(&store, request_id(1), Decision::Approve)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound { .. }));
    assert_eq!(board.pending().len(), 2);
}

#[tokio::test]
async fn failed_refresh_keeps_previous_lists() {
    let store = seeded();
    let mut board = ApprovalBoard::load(&store).await.unwrap();
    let before = board.clone();

    // A row the record type cannot decode makes the reload fail.
    store
        .insert(APPROVAL_TABLE, vec![json!({ "status": "pending" })])
        .await
        .unwrap();

    assert!(board.refresh(&store).await.is_err());
    assert_eq!(board, before);
}

// ── Submission ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn submitted_request_appears_as_pending() {
    let store = MemoryStore::new();
    let submitted = submit_request(
        &store,
        NewApprovalRequest {
            dean_user_id: 4,
            dean_college: Some("CITC".into()),
            submitted_by: Some(11),
            remarks: Some("Finals, 1st semester".into()),
            file_url: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(submitted.status, ApprovalStatus::Pending);
    assert_eq!(submitted.request_id.get_version_num(), 4);

    let board = ApprovalBoard::load(&store).await.unwrap();
    assert_eq!(board.pending().len(), 1);
    assert_eq!(board.pending()[0].request_id, submitted.request_id);
}

#[tokio::test]
async fn failed_submission_is_reported() {
    let store = ReadOnlyStore(MemoryStore::new());
    let result = submit_request(&store, NewApprovalRequest::default()).await;
    assert!(result.is_err());
}
