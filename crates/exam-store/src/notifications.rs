//! A user's notification inbox.

use serde_json::json;
use tracing::{debug, warn};

use crate::error::{Result, StoreError};
use crate::query::{Direction, Query};
use crate::records::{Notification, NOTIFICATIONS_TABLE};
use crate::store::{self, DataStore};

/// Notifications addressed to one user, newest first.
#[derive(Debug, Clone, PartialEq)]
pub struct NotificationList {
    user_id: i64,
    items: Vec<Notification>,
}

impl NotificationList {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            items: Vec::new(),
        }
    }

    pub async fn load(store: &dyn DataStore, user_id: i64) -> Result<Self> {
        let mut list = Self::new(user_id);
        list.refresh(store).await?;
        Ok(list)
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.is_read).count()
    }

    /// Refetch the inbox. On error the current items are kept.
    pub async fn refresh(&mut self, store: &dyn DataStore) -> Result<()> {
        let query = Query::table(NOTIFICATIONS_TABLE)
            .eq("receiver_id", self.user_id)
            .order("created_at", Direction::Descending);
        match store::fetch(store, &query).await {
            Ok(items) => {
                debug!(user_id = self.user_id, count = items.len(), "notifications loaded");
                self.items = items;
                Ok(())
            }
            Err(err) => {
                warn!(user_id = self.user_id, error = %err, "keeping previous notifications");
                Err(err)
            }
        }
    }

    /// Mark one notification read, then refetch the inbox.
    pub async fn mark_as_read(&mut self, store: &dyn DataStore, id: i64) -> Result<()> {
        let query = Query::table(NOTIFICATIONS_TABLE)
            .eq("id", id)
            .eq("receiver_id", self.user_id);
        let updated = store.update(&query, json!({ "is_read": true })).await?;
        if updated.is_empty() {
            return Err(StoreError::NotFound {
                table: NOTIFICATIONS_TABLE.to_string(),
                key: format!("id={id}"),
            });
        }
        self.refresh(store).await
    }
}
