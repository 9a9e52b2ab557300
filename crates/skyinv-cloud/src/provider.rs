//! Cloud provider trait definition

use crate::error::{CloudError, Result};
use crate::filter::Filter;
use crate::resource::{CloudDb, Host, Subnet, Vpc};
use async_trait::async_trait;

pub type HostList = Vec<Box<dyn Host>>;
pub type VpcList = Vec<Box<dyn Vpc>>;
pub type SubnetList = Vec<Box<dyn Subnet>>;
pub type DatabaseList = Vec<Box<dyn CloudDb>>;

/// Cloud provider abstraction trait
///
/// All cloud providers (AWS, Yandex Cloud) implement this trait so that
/// callers can list resources without knowing which provider is configured.
///
/// Every listing fetches the complete resource set (following pagination
/// until exhausted) and then applies `filter`, defaulting to
/// [`Filter::AcceptAll`]. Survivors keep the order returned by the provider.
/// A failure on any page aborts the whole call.
#[async_trait]
pub trait CloudProvider: Send + Sync {
    /// Returns the provider name (e.g., "aws", "yandex")
    fn name(&self) -> &str;

    /// List virtual machines
    async fn list_instances(&self, filter: Option<&Filter>) -> Result<HostList>;

    /// List virtual networks
    async fn list_vpcs(&self, filter: Option<&Filter>) -> Result<VpcList>;

    /// List subnets
    async fn list_subnets(&self, filter: Option<&Filter>) -> Result<SubnetList>;

    /// List managed databases
    ///
    /// Providers without a managed database concept report
    /// [`CloudError::NotImplemented`] instead of an empty list.
    async fn list_databases(&self, _filter: Option<&Filter>) -> Result<DatabaseList> {
        Err(CloudError::NotImplemented(format!(
            "database listing for {}",
            self.name()
        )))
    }
}
