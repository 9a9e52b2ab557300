//! Yandex Cloud resources normalized for skyinv

use crate::api::{DatabaseInfo, InstanceInfo, NetworkInfo, SubnetInfo};
use skyinv_cloud::{
    CloudDb, Host, Identifiable, Interfaces, Labeled, Named, ResourceKind, Subnet, Vpc,
    impl_resource,
};
use std::collections::HashMap;

// Yandex resources all carry a native id, name and label map
macro_rules! impl_identity {
    ($ty:ty) => {
        impl Identifiable for $ty {
            fn id(&self) -> &str {
                &self.id
            }
        }

        impl Named for $ty {
            fn name(&self) -> &str {
                &self.name
            }
        }

        impl Labeled for $ty {
            fn labels(&self) -> &HashMap<String, String> {
                &self.labels
            }
        }
    };
}

/// Compute instance
#[derive(Debug, Clone, Default)]
pub struct YcInstance {
    pub id: String,
    pub name: String,
    pub labels: HashMap<String, String>,
    pub interfaces: Interfaces,
}

impl From<&InstanceInfo> for YcInstance {
    fn from(info: &InstanceInfo) -> Self {
        let mut interfaces = Interfaces::new();
        for nic in &info.network_interfaces {
            if let Some(private) = nic.private_address() {
                interfaces.push(private, nic.nat_address());
            }
        }

        Self {
            id: info.id.clone(),
            name: info.name.clone(),
            labels: info.labels.clone(),
            interfaces,
        }
    }
}

impl_identity!(YcInstance);

impl Host for YcInstance {
    fn interfaces(&self) -> Interfaces {
        self.interfaces.clone()
    }
}

impl_resource!(YcInstance, ResourceKind::Host);

/// VPC network
#[derive(Debug, Clone, Default)]
pub struct YcNetwork {
    pub id: String,
    pub name: String,
    pub labels: HashMap<String, String>,
}

impl From<&NetworkInfo> for YcNetwork {
    fn from(info: &NetworkInfo) -> Self {
        Self {
            id: info.id.clone(),
            name: info.name.clone(),
            labels: info.labels.clone(),
        }
    }
}

impl_identity!(YcNetwork);

impl Vpc for YcNetwork {}

impl_resource!(YcNetwork, ResourceKind::Vpc);

/// VPC subnet; may carry several IPv4 blocks
#[derive(Debug, Clone, Default)]
pub struct YcSubnet {
    pub id: String,
    pub name: String,
    pub labels: HashMap<String, String>,
    pub network_id: String,
    pub cidrs: Vec<String>,
}

impl From<&SubnetInfo> for YcSubnet {
    fn from(info: &SubnetInfo) -> Self {
        Self {
            id: info.id.clone(),
            name: info.name.clone(),
            labels: info.labels.clone(),
            network_id: info.network_id.clone(),
            cidrs: info.v4_cidr_blocks.clone(),
        }
    }
}

impl_identity!(YcSubnet);

impl Subnet for YcSubnet {
    fn vpc_id(&self) -> &str {
        &self.network_id
    }

    fn cidrs(&self) -> &[String] {
        &self.cidrs
    }
}

impl_resource!(YcSubnet, ResourceKind::Subnet);

/// Managed YDB database
#[derive(Debug, Clone, Default)]
pub struct YcDatabase {
    pub id: String,
    pub name: String,
    pub labels: HashMap<String, String>,
    pub endpoint: String,
}

impl From<&DatabaseInfo> for YcDatabase {
    fn from(info: &DatabaseInfo) -> Self {
        Self {
            id: info.id.clone(),
            name: info.name.clone(),
            labels: info.labels.clone(),
            endpoint: info.endpoint.clone(),
        }
    }
}

impl_identity!(YcDatabase);

impl CloudDb for YcDatabase {
    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl_resource!(YcDatabase, ResourceKind::Database);
