pub mod db;
pub mod host;
pub mod inventory;
pub mod ssh;
