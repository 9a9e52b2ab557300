//! In-memory provider for tests
//!
//! Enabled with the `test-utils` feature. Resources are returned in insertion
//! order, the same way a real provider returns a snapshot list.

use crate::error::{CloudError, Result};
use crate::filter::{self, Filter};
use crate::provider::{CloudProvider, DatabaseList, HostList, SubnetList, VpcList};
use crate::resource::{
    CloudDb, Host, Identifiable, Interfaces, Labeled, Named, ResourceKind, Subnet, Vpc,
};
use crate::impl_resource;
use async_trait::async_trait;
use std::collections::HashMap;

fn collect_labels<K, V, I>(labels: I) -> HashMap<String, String>
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    labels
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

#[derive(Debug, Clone, Default)]
pub struct StaticHost {
    pub id: String,
    pub name: String,
    pub labels: HashMap<String, String>,
    pub interfaces: Interfaces,
}

impl StaticHost {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_labels<K, V, I>(mut self, labels: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.labels.extend(collect_labels(labels));
        self
    }

    pub fn with_interface(mut self, private: impl Into<String>, public: Option<&str>) -> Self {
        self.interfaces.push(private, public);
        self
    }
}

impl Identifiable for StaticHost {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Named for StaticHost {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Labeled for StaticHost {
    fn labels(&self) -> &HashMap<String, String> {
        &self.labels
    }
}

impl Host for StaticHost {
    fn interfaces(&self) -> Interfaces {
        self.interfaces.clone()
    }
}

impl_resource!(StaticHost, ResourceKind::Host);

#[derive(Debug, Clone, Default)]
pub struct StaticVpc {
    pub id: String,
    pub name: String,
    pub labels: HashMap<String, String>,
}

impl StaticVpc {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            labels: HashMap::new(),
        }
    }

    pub fn with_labels<K, V, I>(mut self, labels: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.labels.extend(collect_labels(labels));
        self
    }
}

impl Identifiable for StaticVpc {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Named for StaticVpc {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Labeled for StaticVpc {
    fn labels(&self) -> &HashMap<String, String> {
        &self.labels
    }
}

impl Vpc for StaticVpc {}

impl_resource!(StaticVpc, ResourceKind::Vpc);

#[derive(Debug, Clone, Default)]
pub struct StaticSubnet {
    pub id: String,
    pub name: String,
    pub vpc_id: String,
    pub cidrs: Vec<String>,
    pub labels: HashMap<String, String>,
}

impl StaticSubnet {
    pub fn new<C, I>(id: impl Into<String>, vpc_id: impl Into<String>, cidrs: I) -> Self
    where
        C: Into<String>,
        I: IntoIterator<Item = C>,
    {
        Self {
            id: id.into(),
            vpc_id: vpc_id.into(),
            cidrs: cidrs.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_labels<K, V, I>(mut self, labels: I) -> Self
    where
        K: Into<String>,
        V: Into<String>,
        I: IntoIterator<Item = (K, V)>,
    {
        self.labels.extend(collect_labels(labels));
        self
    }
}

impl Identifiable for StaticSubnet {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Named for StaticSubnet {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Labeled for StaticSubnet {
    fn labels(&self) -> &HashMap<String, String> {
        &self.labels
    }
}

impl Subnet for StaticSubnet {
    fn vpc_id(&self) -> &str {
        &self.vpc_id
    }

    fn cidrs(&self) -> &[String] {
        &self.cidrs
    }
}

impl_resource!(StaticSubnet, ResourceKind::Subnet);

#[derive(Debug, Clone, Default)]
pub struct StaticDatabase {
    pub id: String,
    pub name: String,
    pub endpoint: String,
    pub labels: HashMap<String, String>,
}

impl StaticDatabase {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            endpoint: endpoint.into(),
            labels: HashMap::new(),
        }
    }
}

impl Identifiable for StaticDatabase {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Named for StaticDatabase {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Labeled for StaticDatabase {
    fn labels(&self) -> &HashMap<String, String> {
        &self.labels
    }
}

impl CloudDb for StaticDatabase {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl_resource!(StaticDatabase, ResourceKind::Database);

/// Provider serving a fixed snapshot
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    pub hosts: Vec<StaticHost>,
    pub vpcs: Vec<StaticVpc>,
    pub subnets: Vec<StaticSubnet>,
    /// `None` makes `list_databases` report `NotImplemented`
    pub databases: Option<Vec<StaticDatabase>>,
    /// Make `list_subnets` fail with an API error
    pub fail_subnets: bool,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_host(mut self, host: StaticHost) -> Self {
        self.hosts.push(host);
        self
    }

    pub fn with_vpc(mut self, vpc: StaticVpc) -> Self {
        self.vpcs.push(vpc);
        self
    }

    pub fn with_subnet(mut self, subnet: StaticSubnet) -> Self {
        self.subnets.push(subnet);
        self
    }

    pub fn with_database(mut self, database: StaticDatabase) -> Self {
        self.databases.get_or_insert_with(Vec::new).push(database);
        self
    }

    pub fn failing_subnets(mut self) -> Self {
        self.fail_subnets = true;
        self
    }
}

#[async_trait]
impl CloudProvider for StaticProvider {
    fn name(&self) -> &str {
        "static"
    }

    async fn list_instances(&self, filter: Option<&Filter>) -> Result<HostList> {
        let hosts: HostList = self
            .hosts
            .iter()
            .cloned()
            .map(|h| Box::new(h) as Box<dyn Host>)
            .collect();
        Ok(filter::apply(filter, hosts))
    }

    async fn list_vpcs(&self, filter: Option<&Filter>) -> Result<VpcList> {
        let vpcs: VpcList = self
            .vpcs
            .iter()
            .cloned()
            .map(|v| Box::new(v) as Box<dyn Vpc>)
            .collect();
        Ok(filter::apply(filter, vpcs))
    }

    async fn list_subnets(&self, filter: Option<&Filter>) -> Result<SubnetList> {
        if self.fail_subnets {
            return Err(CloudError::api("ListSubnets", "simulated failure"));
        }
        let subnets: SubnetList = self
            .subnets
            .iter()
            .cloned()
            .map(|s| Box::new(s) as Box<dyn Subnet>)
            .collect();
        Ok(filter::apply(filter, subnets))
    }

    async fn list_databases(&self, filter: Option<&Filter>) -> Result<DatabaseList> {
        let Some(databases) = &self.databases else {
            return Err(CloudError::NotImplemented(
                "database listing for static".to_string(),
            ));
        };
        let databases: DatabaseList = databases
            .iter()
            .cloned()
            .map(|d| Box::new(d) as Box<dyn CloudDb>)
            .collect();
        Ok(filter::apply(filter, databases))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> StaticProvider {
        StaticProvider::new()
            .with_host(StaticHost::new("i-1", "web1").with_labels([("workspace", "prod")]))
            .with_host(StaticHost::new("i-2", "web2").with_labels([("workspace", "dev")]))
            .with_vpc(StaticVpc::new("v1", "main").with_labels([("workspace", "prod")]))
            .with_subnet(
                StaticSubnet::new("s1", "v1", ["10.0.0.0/24"]).with_labels([("workspace", "dev")]),
            )
    }

    #[tokio::test]
    async fn test_list_instances_filtered() {
        let hosts = provider()
            .list_instances(Some(&Filter::workspace("prod")))
            .await
            .unwrap();
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].id(), "i-1");
    }

    #[tokio::test]
    async fn test_list_defaults_to_accept_all() {
        let p = provider();
        assert_eq!(p.list_instances(None).await.unwrap().len(), 2);
        assert_eq!(p.list_vpcs(None).await.unwrap().len(), 1);
        assert_eq!(p.list_subnets(None).await.unwrap()[0].vpc_id(), "v1");
    }

    #[tokio::test]
    async fn test_list_databases_not_implemented() {
        let err = match provider().list_databases(None).await {
            Err(e) => e,
            Ok(_) => panic!("expected NotImplemented"),
        };
        assert!(err.is_not_implemented());
    }

    #[tokio::test]
    async fn test_list_databases_by_name() {
        let p = provider()
            .with_database(StaticDatabase::new("db1", "inventory", "grpcs://a:2135/?database=/x"))
            .with_database(StaticDatabase::new("db2", "other", "grpcs://b:2135/?database=/y"));
        let dbs = p
            .list_databases(Some(&Filter::name_equals("INVENTORY")))
            .await
            .unwrap();
        assert_eq!(dbs.len(), 1);
        assert_eq!(dbs[0].endpoint(), "grpcs://a:2135/?database=/x");
    }

    #[test]
    fn test_failing_subnets() {
        let result = tokio_test::block_on(provider().failing_subnets().list_subnets(None));
        assert!(matches!(result, Err(CloudError::Api { .. })));
    }
}
