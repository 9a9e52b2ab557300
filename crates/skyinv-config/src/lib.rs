pub mod error;

pub use error::*;

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Provider selector variable
pub const CLOUD_TYPE_ENV: &str = "CLOUD_TYPE";
/// Workspace label value selecting the inventory
pub const WORKSPACE_ENV: &str = "WORKSPACE";

/// Read a set of required environment variables
///
/// Unset and empty variables both count as missing. All missing names are
/// reported at once so the user can fix them in one go.
pub fn require_envs(names: &[&str]) -> Result<HashMap<String, String>> {
    let mut envs = HashMap::new();
    let mut missing = Vec::new();

    for name in names {
        match std::env::var(name) {
            Ok(value) if !value.is_empty() => {
                envs.insert(name.to_string(), value);
            }
            _ => missing.push(name.to_string()),
        }
    }

    if missing.is_empty() {
        Ok(envs)
    } else {
        Err(ConfigError::MissingEnv(missing))
    }
}

/// Supported cloud providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Aws,
    Yandex,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Aws => "aws",
            ProviderKind::Yandex => "yandex",
        }
    }

    /// Parse the provider for workspace database commands
    ///
    /// Accepts `ydb` as an extra alias of Yandex.
    pub fn for_database(value: &str) -> Result<Self> {
        match value {
            "ydb" => Ok(ProviderKind::Yandex),
            other => other.parse(),
        }
    }
}

impl FromStr for ProviderKind {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "aws" => Ok(ProviderKind::Aws),
            "yandex" | "yacloud" => Ok(ProviderKind::Yandex),
            other => Err(ConfigError::UnsupportedProvider(other.to_string())),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// SSH gateway settings for `--ssh`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SshSettings {
    pub user: String,
    pub nat_group: String,
    pub port: u16,
}

impl Default for SshSettings {
    fn default() -> Self {
        Self {
            user: "cloud-user".to_string(),
            nat_group: "nat".to_string(),
            port: 22,
        }
    }
}

/// Resolved settings for one invocation
///
/// Built once at the entry point and passed down by reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub provider: ProviderKind,
    /// Raw `CLOUD_TYPE` value (database commands accept extra aliases)
    pub cloud_type: String,
    pub workspace: Option<String>,
    pub ssh: SshSettings,
}

impl Settings {
    pub fn new(cloud_type: impl Into<String>) -> Result<Self> {
        let cloud_type = cloud_type.into();
        Ok(Self {
            provider: ProviderKind::for_database(&cloud_type)?,
            cloud_type,
            workspace: None,
            ssh: SshSettings::default(),
        })
    }

    pub fn with_workspace(mut self, workspace: Option<String>) -> Self {
        self.workspace = workspace.filter(|w| !w.is_empty());
        self
    }

    pub fn with_ssh(mut self, ssh: SshSettings) -> Self {
        self.ssh = ssh;
        self
    }

    /// Workspace for inventory commands
    pub fn require_workspace(&self) -> Result<&str> {
        self.workspace
            .as_deref()
            .ok_or_else(|| ConfigError::MissingEnv(vec![WORKSPACE_ENV.to_string()]))
    }

    /// Provider for inventory commands (`ydb` is not a compute provider)
    pub fn cloud_provider(&self) -> Result<ProviderKind> {
        self.cloud_type.parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_require_envs_all_present() {
        temp_env::with_vars(
            [("YC_TOKEN", Some("token")), ("FOLDER_ID", Some("b1g"))],
            || {
                let envs = require_envs(&["YC_TOKEN", "FOLDER_ID"]).unwrap();
                assert_eq!(envs["YC_TOKEN"], "token");
                assert_eq!(envs["FOLDER_ID"], "b1g");
            },
        );
    }

    #[test]
    #[serial]
    fn test_require_envs_lists_every_missing() {
        temp_env::with_vars(
            [
                ("YC_TOKEN", None),
                ("FOLDER_ID", Some("")),
                ("YC_DB", Some("inventory")),
            ],
            || {
                let err = require_envs(&["YC_TOKEN", "FOLDER_ID", "YC_DB"]).unwrap_err();
                assert_eq!(
                    err,
                    ConfigError::MissingEnv(vec!["YC_TOKEN".into(), "FOLDER_ID".into()])
                );
                assert_eq!(err.to_string(), "You must set this ENVs: YC_TOKEN, FOLDER_ID");
            },
        );
    }

    #[test]
    fn test_provider_kind_parse() {
        assert_eq!("aws".parse::<ProviderKind>(), Ok(ProviderKind::Aws));
        assert_eq!("yandex".parse::<ProviderKind>(), Ok(ProviderKind::Yandex));
        assert_eq!("yacloud".parse::<ProviderKind>(), Ok(ProviderKind::Yandex));
        assert!(matches!(
            "gcp".parse::<ProviderKind>(),
            Err(ConfigError::UnsupportedProvider(_))
        ));
        assert!("ydb".parse::<ProviderKind>().is_err());
        assert_eq!(ProviderKind::for_database("ydb"), Ok(ProviderKind::Yandex));
    }

    #[test]
    fn test_settings_workspace() {
        let settings = Settings::new("aws").unwrap();
        assert!(settings.require_workspace().is_err());

        let settings = settings.with_workspace(Some(String::new()));
        assert!(settings.require_workspace().is_err());

        let settings = settings.with_workspace(Some("prod".to_string()));
        assert_eq!(settings.require_workspace(), Ok("prod"));
        assert_eq!(settings.ssh, SshSettings::default());
    }

    #[test]
    fn test_settings_ydb_alias_is_database_only() {
        let settings = Settings::new("ydb").unwrap();
        assert_eq!(settings.provider, ProviderKind::Yandex);
        assert!(settings.cloud_provider().is_err());
        assert!(Settings::new("gcp").is_err());
    }
}
