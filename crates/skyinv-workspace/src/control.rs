//! Workspace lifecycle commands

use crate::error::{Result, WorkspaceError};
use crate::row::WsRow;
use crate::store::WorkspaceStore;
use chrono::Utc;
use tracing::{debug, info};

/// `list` / `create` / `set_state` over a workspace store
///
/// The store is released once, by [`WorkspaceControl::close`] or on drop.
pub struct WorkspaceControl<S: WorkspaceStore> {
    store: S,
    released: bool,
}

impl<S: WorkspaceStore> WorkspaceControl<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            released: false,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// All workspace rows
    pub async fn list(&self) -> Result<Vec<WsRow>> {
        let rows = self.store.scan().await?;
        debug!(store = self.store.name(), count = rows.len(), "Scanned workspaces");
        Ok(rows)
    }

    /// Insert a new workspace in state `creating`
    pub async fn create(&self, json: &str) -> Result<WsRow> {
        let mut row: WsRow = serde_json::from_str(json)?;
        row.mark_created(Utc::now());

        self.store.ensure_table().await?;
        self.store.insert(&row).await?;
        info!(name = %row.name, store = self.store.name(), "Created workspace");
        Ok(row)
    }

    /// Change the state of an existing workspace
    pub async fn set_state(&self, json: &str) -> Result<()> {
        let row: WsRow = serde_json::from_str(json)?;
        if row.name.is_empty() || row.state.is_empty() {
            return Err(WorkspaceError::InvalidArguments(
                "Set state. Must set ws Name and ws State".to_string(),
            ));
        }

        self.store.set_state(&row.name, &row.state, Utc::now()).await?;
        info!(name = %row.name, state = %row.state, "Updated workspace state");
        Ok(())
    }

    /// Release the store session
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        if !self.released {
            self.store.release();
            self.released = true;
            debug!(store = self.store.name(), "Released workspace store");
        }
    }
}

impl<S: WorkspaceStore> Drop for WorkspaceControl<S> {
    fn drop(&mut self) {
        self.release();
    }
}
