//! AWS provider for skyinv
//!
//! This crate implements the CloudProvider trait for AWS,
//! listing EC2 instances, VPCs and subnets.
//!
//! # Requirements
//!
//! - A resolvable region (`AWS_REGION`, `AWS_PROFILE`, or `~/.aws/config`)
//! - Credentials from the default provider chain
//!
//! # Example
//!
//! ```ignore
//! use skyinv_cloud::{CloudProvider, Filter};
//! use skyinv_cloud_aws::AwsCloudProvider;
//!
//! let provider = AwsCloudProvider::from_env().await?;
//! let hosts = provider
//!     .list_instances(Some(&Filter::workspace("prod")))
//!     .await?;
//! ```

pub mod provider;
pub mod resource;

pub use provider::AwsCloudProvider;
pub use resource::{Ec2Instance, Ec2Subnet, Ec2Vpc};
