//! EC2 resources normalized for skyinv
//!
//! EC2 carries no first-class name: the `Name` tag is used instead.

use aws_sdk_ec2::types;
use skyinv_cloud::{
    Host, Identifiable, Interfaces, Labeled, Named, ResourceKind, Subnet, Vpc, impl_resource,
    name_from_tags, tags_to_map,
};
use std::collections::HashMap;

fn labels_from(tags: &[types::Tag]) -> HashMap<String, String> {
    tags_to_map(tags.iter().map(|t| (t.key(), t.value())))
}

/// EC2 instance
#[derive(Debug, Clone, Default)]
pub struct Ec2Instance {
    pub id: String,
    pub name: String,
    pub labels: HashMap<String, String>,
    pub interfaces: Interfaces,
}

impl From<&types::Instance> for Ec2Instance {
    fn from(instance: &types::Instance) -> Self {
        let labels = labels_from(instance.tags());
        let mut interfaces = Interfaces::new();

        let nics = instance.network_interfaces();
        if nics.is_empty() {
            // Instances without ENI details only report top-level addresses
            if let Some(private) = instance.private_ip_address() {
                interfaces.push(private, instance.public_ip_address());
            }
        } else {
            for nic in nics {
                let Some(private) = nic.private_ip_address() else {
                    continue;
                };
                let public = nic.association().and_then(|a| a.public_ip());
                interfaces.push(private, public);
            }
        }

        Self {
            id: instance.instance_id().unwrap_or_default().to_string(),
            name: name_from_tags(&labels),
            labels,
            interfaces,
        }
    }
}

impl Identifiable for Ec2Instance {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Named for Ec2Instance {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Labeled for Ec2Instance {
    fn labels(&self) -> &HashMap<String, String> {
        &self.labels
    }
}

impl Host for Ec2Instance {
    fn interfaces(&self) -> Interfaces {
        self.interfaces.clone()
    }
}

impl_resource!(Ec2Instance, ResourceKind::Host);

/// VPC
#[derive(Debug, Clone, Default)]
pub struct Ec2Vpc {
    pub id: String,
    pub name: String,
    pub labels: HashMap<String, String>,
}

impl From<&types::Vpc> for Ec2Vpc {
    fn from(vpc: &types::Vpc) -> Self {
        let labels = labels_from(vpc.tags());
        Self {
            id: vpc.vpc_id().unwrap_or_default().to_string(),
            name: name_from_tags(&labels),
            labels,
        }
    }
}

impl Identifiable for Ec2Vpc {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Named for Ec2Vpc {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Labeled for Ec2Vpc {
    fn labels(&self) -> &HashMap<String, String> {
        &self.labels
    }
}

impl Vpc for Ec2Vpc {}

impl_resource!(Ec2Vpc, ResourceKind::Vpc);

/// VPC subnet; EC2 reports exactly one IPv4 block per subnet
#[derive(Debug, Clone, Default)]
pub struct Ec2Subnet {
    pub id: String,
    pub name: String,
    pub vpc_id: String,
    pub cidrs: Vec<String>,
    pub labels: HashMap<String, String>,
}

impl From<&types::Subnet> for Ec2Subnet {
    fn from(subnet: &types::Subnet) -> Self {
        let labels = labels_from(subnet.tags());
        Self {
            id: subnet.subnet_id().unwrap_or_default().to_string(),
            name: name_from_tags(&labels),
            vpc_id: subnet.vpc_id().unwrap_or_default().to_string(),
            cidrs: vec![subnet.cidr_block().unwrap_or_default().to_string()],
            labels,
        }
    }
}

impl Identifiable for Ec2Subnet {
    fn id(&self) -> &str {
        &self.id
    }
}

impl Named for Ec2Subnet {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Labeled for Ec2Subnet {
    fn labels(&self) -> &HashMap<String, String> {
        &self.labels
    }
}

impl Subnet for Ec2Subnet {
    fn vpc_id(&self) -> &str {
        &self.vpc_id
    }

    fn cidrs(&self) -> &[String] {
        &self.cidrs
    }
}

impl_resource!(Ec2Subnet, ResourceKind::Subnet);
