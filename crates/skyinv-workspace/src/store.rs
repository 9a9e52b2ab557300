//! Workspace table backends

use crate::error::Result;
use crate::row::WsRow;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Table holding workspace rows
///
/// Implementations open their session lazily. `release` is called exactly
/// once by [`crate::WorkspaceControl`].
#[async_trait]
pub trait WorkspaceStore: Send + Sync {
    /// Backend name (e.g., "dynamodb", "ydb")
    fn name(&self) -> &str;

    /// Create the table unless it already exists
    async fn ensure_table(&self) -> Result<()>;

    async fn insert(&self, row: &WsRow) -> Result<()>;

    /// Update `state` and `update_date` of the row named `name`
    ///
    /// No existence check is made.
    async fn set_state(&self, name: &str, state: &str, update_date: DateTime<Utc>) -> Result<()>;

    /// Every row in the table
    async fn scan(&self) -> Result<Vec<WsRow>>;

    /// Release the session
    fn release(&mut self);
}

#[cfg(test)]
pub(crate) mod memory {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Calls observed by a [`MemoryStore`]
    #[derive(Debug, Default)]
    pub struct Calls {
        pub ensure_table: AtomicUsize,
        pub set_state: AtomicUsize,
        pub release: AtomicUsize,
    }

    #[derive(Debug, Default, Clone)]
    pub struct MemoryStore {
        pub rows: Arc<Mutex<Vec<WsRow>>>,
        pub calls: Arc<Calls>,
    }

    #[async_trait]
    impl WorkspaceStore for MemoryStore {
        fn name(&self) -> &str {
            "memory"
        }

        async fn ensure_table(&self) -> Result<()> {
            self.calls.ensure_table.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        async fn insert(&self, row: &WsRow) -> Result<()> {
            self.rows.lock().unwrap().push(row.clone());
            Ok(())
        }

        async fn set_state(&self, name: &str, state: &str, update_date: DateTime<Utc>) -> Result<()> {
            self.calls.set_state.fetch_add(1, Ordering::SeqCst);
            for row in self.rows.lock().unwrap().iter_mut().filter(|r| r.name == name) {
                row.state = state.to_string();
                row.update_date = update_date;
            }
            Ok(())
        }

        async fn scan(&self) -> Result<Vec<WsRow>> {
            Ok(self.rows.lock().unwrap().clone())
        }

        fn release(&mut self) {
            self.calls.release.fetch_add(1, Ordering::SeqCst);
        }
    }
}
