//! skyinv core
//!
//! Folds cloud hosts into an Ansible dynamic inventory and renders the SSH
//! gateway configuration derived from it.

pub mod error;
pub mod gateway;
pub mod host;
pub mod inventory;

pub use error::{InventoryError, Result};
pub use gateway::{gateway_address, render_ssh_config};
pub use host::host_vars;
pub use inventory::{
    ALL_GROUP, GROUP_LABEL, Inventory, InventoryBuilder, InventoryGroup, META_GROUP, NAT_GROUP,
    build_inventory,
};
