//! Ansible dynamic inventory
//!
//! Hosts are folded one at a time in provider order. Host lists stay sorted
//! after every step; group vars keep the first value seen for a key.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use skyinv_cloud::{CloudProvider, Filter, Host, Subnet};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Group holding every listed host
pub const ALL_GROUP: &str = "all";
/// Group carrying only `hostvars`
pub const META_GROUP: &str = "_meta";
/// Group whose vars receive `tf_subnets`
pub const NAT_GROUP: &str = "nat";
/// Label naming a host's group
pub const GROUP_LABEL: &str = "group";
/// Prefix added to label keys when they become group vars
pub const VAR_PREFIX: &str = "tf_";

const ANSIBLE_HOST: &str = "ansible_host";
const PUBLIC_ADDRESS: &str = "public_address";
const SUBNETS_VAR: &str = "tf_subnets";

pub type HostVars = BTreeMap<String, String>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InventoryGroup {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hosts: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, Value>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hostvars: BTreeMap<String, HostVars>,
}

/// Inventory keyed by group name
///
/// Serializes as a plain JSON object with sorted keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    groups: BTreeMap<String, InventoryGroup>,
}

impl Inventory {
    pub fn group(&self, name: &str) -> Option<&InventoryGroup> {
        self.groups.get(name)
    }

    pub fn groups(&self) -> &BTreeMap<String, InventoryGroup> {
        &self.groups
    }

    pub fn hostvars(&self, host: &str) -> Option<&HostVars> {
        self.groups.get(META_GROUP)?.hostvars.get(host)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Set the NAT group's `tf_subnets` to `cidrs`
    ///
    /// Does nothing when there is no NAT group.
    pub fn set_nat_subnets(&mut self, cidrs: Vec<String>) {
        if let Some(nat) = self.groups.get_mut(NAT_GROUP) {
            nat.vars.insert(SUBNETS_VAR.to_string(), Value::from(cidrs));
        }
    }
}

/// Incremental inventory fold
#[derive(Debug, Default)]
pub struct InventoryBuilder {
    groups: BTreeMap<String, InventoryGroup>,
    hostvars: BTreeMap<String, HostVars>,
}

impl InventoryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_host<H: Host + ?Sized>(&mut self, host: &H) {
        let name = host.name();
        insert_sorted(&mut self.groups.entry(ALL_GROUP.to_string()).or_default().hosts, name);

        let interfaces = host.interfaces();
        if let Some(private) = interfaces.primary_private() {
            self.hostvars.insert(
                name.to_string(),
                HostVars::from([(ANSIBLE_HOST.to_string(), private.to_string())]),
            );
        }
        if let Some(public) = interfaces.primary_public().filter(|p| !p.is_empty()) {
            self.hostvars
                .entry(name.to_string())
                .or_default()
                .insert(PUBLIC_ADDRESS.to_string(), public.to_string());
        }

        let Some(group) = host.label(GROUP_LABEL) else {
            debug!(host = name, "Host has no group label");
            return;
        };

        let entry = self.groups.entry(group.to_string()).or_default();
        insert_sorted(&mut entry.hosts, name);
        for (key, value) in host.labels() {
            entry
                .vars
                .entry(format!("{VAR_PREFIX}{key}"))
                .or_insert_with(|| Value::String(value.clone()));
        }
    }

    /// Assign per-group host ids and attach `_meta`
    pub fn finish(mut self) -> Inventory {
        for (group, entry) in &self.groups {
            if group == ALL_GROUP || group == META_GROUP {
                continue;
            }
            let key = format!("tf_group_{}_id", group);
            for (index, host) in entry.hosts.iter().enumerate() {
                self.hostvars
                    .entry(host.clone())
                    .or_default()
                    .insert(key.clone(), index.to_string());
            }
        }

        self.groups.insert(
            META_GROUP.to_string(),
            InventoryGroup {
                hostvars: self.hostvars,
                ..Default::default()
            },
        );

        Inventory {
            groups: self.groups,
        }
    }
}

impl<'a, H: Host + ?Sized + 'a> FromIterator<&'a H> for Inventory {
    fn from_iter<I: IntoIterator<Item = &'a H>>(hosts: I) -> Self {
        let mut builder = InventoryBuilder::new();
        for host in hosts {
            builder.add_host(host);
        }
        builder.finish()
    }
}

/// List hosts through `provider` and fold them into an inventory
///
/// When a subnet filter is given and a NAT group exists, the matching
/// subnets' CIDR blocks are attached to it. A subnet listing failure is
/// logged and the inventory is returned without them.
pub async fn build_inventory(
    provider: &dyn CloudProvider,
    host_filter: Option<&Filter>,
    subnet_filter: Option<&Filter>,
) -> Result<Inventory> {
    let hosts = provider.list_instances(host_filter).await?;
    info!(provider = provider.name(), hosts = hosts.len(), "Building inventory");

    let mut inventory: Inventory = hosts.iter().map(|h| &**h).collect();

    if let Some(filter) = subnet_filter
        && inventory.group(NAT_GROUP).is_some()
    {
        match provider.list_subnets(Some(filter)).await {
            Ok(subnets) => {
                let cidrs: Vec<String> = subnets
                    .iter()
                    .flat_map(|s| s.cidrs().iter().cloned())
                    .collect();
                debug!(count = cidrs.len(), "Attaching subnets to NAT group");
                inventory.set_nat_subnets(cidrs);
            }
            Err(e) => warn!(error = %e, "Failed to list subnets, skipping tf_subnets"),
        }
    }

    Ok(inventory)
}

fn insert_sorted(list: &mut Vec<String>, value: &str) {
    let index = list.partition_point(|existing| existing.as_str() <= value);
    list.insert(index, value.to_string());
}
