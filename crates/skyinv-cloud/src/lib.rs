//! skyinv Cloud Resource Layer
//!
//! This crate provides the provider-agnostic model of cloud resources used by
//! skyinv, the filters that select them, and the provider facade trait.
//!
//! # Supported Providers
//!
//! - **AWS**: EC2 instances, VPCs, subnets (`skyinv-cloud-aws`)
//! - **Yandex Cloud**: instances, networks, subnets, YDB databases (`skyinv-cloud-yandex`)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                   skyinv CLI                     │
//! │            (--list / --ssh / --db-*)             │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │                 skyinv-cloud                     │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │          Provider Abstraction             │   │
//! │  │  trait CloudProvider { ... }              │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────────┐  ┌──────────────┐            │
//! │  │  Resources   │  │   Filters    │            │
//! │  └──────────────┘  └──────────────┘            │
//! └───────┬─────────────────┬───────────────────────┘
//!         │                 │
//! ┌───────▼───────┐ ┌───────▼───────┐
//! │      aws      │ │    yandex     │
//! │   provider    │ │   provider    │
//! └───────────────┘ └───────────────┘
//! ```

pub mod error;
pub mod filter;
pub mod provider;
pub mod resource;
#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

// Re-exports
pub use error::{CloudError, Result};
pub use filter::Filter;
pub use provider::{CloudProvider, DatabaseList, HostList, SubnetList, VpcList};
pub use resource::{
    CloudDb, Host, Identifiable, Interfaces, Labeled, NAME_TAG, Named, Resource, ResourceKind,
    Subnet, Vpc, name_from_tags, tags_to_map,
};
