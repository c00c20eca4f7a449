//! # exam-store
//!
//! Data access and view workflows for the exam scheduler.
//!
//! Everything talks to a [`DataStore`]: [`RestStore`] for the hosted
//! PostgREST endpoint, [`MemoryStore`] for tests and offline fixtures.
//!
//! ## Modules
//!
//! - [`query`] — backend-neutral select/filter/order/limit builder
//! - [`store`] — the `DataStore` trait and typed fetch helpers
//! - [`rest`] / [`memory`] — the two store implementations
//! - [`records`] — row types for the scheduling tables
//! - [`approval`] — dean approval board
//! - [`notifications`] — per-user inbox
//! - [`rooms`] — room occupancy and free-slot lookups
//! - [`periods`] — exam periods and term names for the calendar
//! - [`subscription`] — change-only periodic refetch
//! - [`storage`] — public URLs for uploaded files

pub mod approval;
pub mod error;
pub mod memory;
pub mod notifications;
pub mod periods;
pub mod query;
pub mod records;
pub mod rest;
pub mod rooms;
pub mod storage;
pub mod store;
pub mod subscription;

pub use approval::{ApprovalBoard, Decision};
pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use notifications::NotificationList;
pub use periods::{PeriodSnapshot, TermMap};
pub use query::{Direction, Query};
pub use rest::{RestConfig, RestStore};
pub use store::DataStore;
pub use subscription::Subscription;
