//! Yandex Cloud provider for skyinv
//!
//! Lists Compute instances, VPC networks, subnets and managed YDB databases
//! through the public REST API.
//!
//! ## Environment
//!
//! - `YC_TOKEN`: OAuth token, exchanged for an IAM token on first request
//! - `FOLDER_ID`: folder to list resources in

pub mod api;
pub mod error;
pub mod provider;
pub mod resource;

pub use api::{Endpoints, YandexApi, YandexConfig};
pub use error::{Result, YandexError};
pub use provider::YandexCloudProvider;
pub use resource::{YcDatabase, YcInstance, YcNetwork, YcSubnet};
