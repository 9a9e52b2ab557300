//! SSH configuration for reaching hosts through the NAT gateway

use crate::error::{InventoryError, Result};
use crate::inventory::Inventory;
use skyinv_config::SshSettings;
use tera::{Context, Tera};

const SSH_CONFIG_TEMPLATE: &str = "Host *
  User={{ user }}
  ProxyCommand=ssh -o StrictHostKeyChecking=no -q -W %h:%p {{ user }}@{{ gateway }} -p{{ port }}
";

/// Public address of the first host in `nat_group`
pub fn gateway_address<'a>(inventory: &'a Inventory, nat_group: &str) -> Result<&'a str> {
    let first = inventory
        .group(nat_group)
        .and_then(|group| group.hosts.first())
        .ok_or(InventoryError::NatNotFound)?;

    inventory
        .hostvars(first)
        .and_then(|vars| vars.get("public_address"))
        .map(String::as_str)
        .filter(|address| !address.is_empty())
        .ok_or(InventoryError::NatNotFound)
}

pub fn render_ssh_config(inventory: &Inventory, ssh: &SshSettings) -> Result<String> {
    let gateway = gateway_address(inventory, &ssh.nat_group)?;
    tracing::debug!(gateway, user = %ssh.user, port = ssh.port, "Rendering SSH config");

    let mut context = Context::new();
    context.insert("user", &ssh.user);
    context.insert("gateway", gateway);
    context.insert("port", &ssh.port);

    let mut tera = Tera::default();
    Ok(tera.render_str(SSH_CONFIG_TEMPLATE, &context)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyinv_cloud::testing::StaticHost;

    fn inventory(hosts: &[StaticHost]) -> Inventory {
        hosts.iter().collect()
    }

    fn nat(name: &str, public: Option<&str>) -> StaticHost {
        StaticHost::new(name, name)
            .with_labels([("group", "nat")])
            .with_interface("10.0.0.2", public)
    }

    #[test]
    fn test_render_ssh_config() {
        let inventory = inventory(&[nat("nat2", Some("9.9.9.9")), nat("nat1", Some("5.6.7.8"))]);

        let config = render_ssh_config(&inventory, &SshSettings::default()).unwrap();
        assert_eq!(
            config,
            "Host *\n  User=cloud-user\n  ProxyCommand=ssh -o StrictHostKeyChecking=no -q -W %h:%p cloud-user@5.6.7.8 -p22\n"
        );
    }

    #[test]
    fn test_render_with_custom_settings() {
        let inventory = inventory(&[StaticHost::new("gw", "gw")
            .with_labels([("group", "bastion")])
            .with_interface("10.0.0.3", Some("7.7.7.7"))]);
        let ssh = SshSettings {
            user: "ubuntu".to_string(),
            nat_group: "bastion".to_string(),
            port: 2222,
        };

        let config = render_ssh_config(&inventory, &ssh).unwrap();
        assert!(config.contains("User=ubuntu"));
        assert!(config.ends_with("ubuntu@7.7.7.7 -p2222\n"));
    }

    #[test]
    fn test_missing_group() {
        let inventory = inventory(&[StaticHost::new("web1", "web1")]);
        let err = gateway_address(&inventory, "nat").unwrap_err();
        assert!(matches!(err, InventoryError::NatNotFound));
        assert_eq!(err.to_string(), "Nat IP not found");
    }

    #[test]
    fn test_first_host_without_public_address() {
        let inventory = inventory(&[nat("nat1", None), nat("nat2", Some("9.9.9.9"))]);
        assert!(matches!(
            gateway_address(&inventory, "nat"),
            Err(InventoryError::NatNotFound)
        ));
    }
}
