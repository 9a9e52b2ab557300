//! Workspace lifecycle table
//!
//! Stores one row per workspace in a cloud-native table: DynamoDB on AWS and
//! YDB on Yandex Cloud. [`WorkspaceControl`] implements the `--db-*` commands
//! on top of any [`WorkspaceStore`].

pub mod control;
pub mod dynamodb;
pub mod error;
pub mod row;
pub mod store;
pub mod ydb;

pub use control::WorkspaceControl;
pub use dynamodb::DynamoDbStore;
pub use error::{Result, WorkspaceError};
pub use row::{STATE_CREATING, WsRow};
pub use store::WorkspaceStore;
pub use ydb::YdbStore;
