//! Workspace table row

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State assigned to every newly created workspace
pub const STATE_CREATING: &str = "creating";

/// One workspace, keyed by `name`
///
/// Fields missing from input JSON take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WsRow {
    pub name: String,
    pub net_id: u32,
    pub create_date: DateTime<Utc>,
    pub update_date: DateTime<Utc>,
    pub state: String,
    pub ha_mode: bool,
}

impl WsRow {
    /// Reset the row to a freshly created workspace
    pub fn mark_created(&mut self, now: DateTime<Utc>) {
        self.state = STATE_CREATING.to_string();
        self.create_date = now;
        self.update_date = now;
    }
}
