//! Yandex Cloud REST API wrapper
//!
//! Wraps the public REST endpoints for Compute, VPC and YDB. Every listing
//! follows `nextPageToken` until the API returns an empty one.

use crate::error::{Result, YandexError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio::sync::OnceCell;

/// Items requested per page
pub const PAGE_SIZE: u32 = 100;

/// Credentials and scope read from the environment
#[derive(Debug, Clone)]
pub struct YandexConfig {
    /// OAuth token (`YC_TOKEN`), exchanged for an IAM token on first use
    pub oauth_token: String,
    /// Folder to list resources in (`FOLDER_ID`)
    pub folder_id: String,
}

impl YandexConfig {
    pub const REQUIRED_ENVS: [&'static str; 2] = ["YC_TOKEN", "FOLDER_ID"];

    /// Create YandexConfig from environment variables
    pub fn from_env() -> Result<Self> {
        let mut envs = skyinv_config::require_envs(&Self::REQUIRED_ENVS)?;
        Ok(Self {
            oauth_token: envs.remove("YC_TOKEN").unwrap_or_default(),
            folder_id: envs.remove("FOLDER_ID").unwrap_or_default(),
        })
    }
}

/// API base URLs
#[derive(Debug, Clone)]
pub struct Endpoints {
    pub iam: String,
    pub compute: String,
    pub vpc: String,
    pub ydb: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            iam: "https://iam.api.cloud.yandex.net".to_string(),
            compute: "https://compute.api.cloud.yandex.net".to_string(),
            vpc: "https://vpc.api.cloud.yandex.net".to_string(),
            ydb: "https://ydb.api.cloud.yandex.net".to_string(),
        }
    }
}

/// Yandex Cloud API client
pub struct YandexApi {
    client: reqwest::Client,
    config: YandexConfig,
    endpoints: Endpoints,
    iam_token: OnceCell<String>,
}

impl YandexApi {
    pub fn new(config: YandexConfig) -> Self {
        Self::with_endpoints(config, Endpoints::default())
    }

    pub fn with_endpoints(config: YandexConfig, endpoints: Endpoints) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
            endpoints,
            iam_token: OnceCell::new(),
        }
    }

    pub fn folder_id(&self) -> &str {
        &self.config.folder_id
    }

    /// IAM token for the configured OAuth token, exchanged once per client
    pub async fn iam_token(&self) -> Result<&str> {
        let token = self
            .iam_token
            .get_or_try_init(|| self.exchange_token())
            .await?;
        Ok(token.as_str())
    }

    async fn exchange_token(&self) -> Result<String> {
        let url = format!("{}/iam/v1/tokens", self.endpoints.iam);
        tracing::debug!("Exchanging OAuth token for IAM token");

        let response = self
            .client
            .post(&url)
            .json(&CreateIamTokenRequest {
                yandex_passport_oauth_token: &self.config.oauth_token,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(YandexError::AuthenticationFailed(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }

        let token: CreateIamTokenResponse = response.json().await?;
        Ok(token.iam_token)
    }

    /// List all instances in the folder
    pub async fn list_instances(&self) -> Result<Vec<InstanceInfo>> {
        let url = format!("{}/compute/v1/instances", self.endpoints.compute);
        self.list_all::<ListInstancesResponse>("ListInstances", &url)
            .await
    }

    /// List all networks in the folder
    pub async fn list_networks(&self) -> Result<Vec<NetworkInfo>> {
        let url = format!("{}/vpc/v1/networks", self.endpoints.vpc);
        self.list_all::<ListNetworksResponse>("ListNetworks", &url)
            .await
    }

    /// List all subnets in the folder
    pub async fn list_subnets(&self) -> Result<Vec<SubnetInfo>> {
        let url = format!("{}/vpc/v1/subnets", self.endpoints.vpc);
        self.list_all::<ListSubnetsResponse>("ListSubnets", &url)
            .await
    }

    /// List all YDB databases in the folder
    pub async fn list_databases(&self) -> Result<Vec<DatabaseInfo>> {
        let url = format!("{}/ydb/v1/databases", self.endpoints.ydb);
        self.list_all::<ListDatabasesResponse>("ListDatabases", &url)
            .await
    }

    async fn list_all<P: Page>(&self, operation: &str, url: &str) -> Result<Vec<P::Item>> {
        let token = self.iam_token().await?;
        let mut result = Vec::new();
        let mut page_token = String::new();

        loop {
            let mut request = self
                .client
                .get(url)
                .bearer_auth(token)
                .query(&[("folderId", self.config.folder_id.as_str())])
                .query(&[("pageSize", PAGE_SIZE)]);
            if !page_token.is_empty() {
                request = request.query(&[("pageToken", page_token.as_str())]);
            }

            let response = request.send().await?;
            let page: P = parse_response(operation, response).await?;
            let (items, next_page_token) = page.into_parts();
            result.extend(items);

            tracing::debug!(operation, count = result.len(), "Fetched page");
            if next_page_token.is_empty() {
                break;
            }
            page_token = next_page_token;
        }

        Ok(result)
    }
}

async fn parse_response<T: DeserializeOwned>(
    operation: &str,
    response: reqwest::Response,
) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let message = response.text().await.unwrap_or_default();
        return Err(YandexError::Api {
            operation: operation.to_string(),
            status: status.as_u16(),
            message,
        });
    }
    let body = response.text().await?;
    Ok(serde_json::from_str(&body)?)
}

/// A page of a list response
pub trait Page: DeserializeOwned {
    type Item;

    /// Items on this page and the token of the next one (empty when done)
    fn into_parts(self) -> (Vec<Self::Item>, String);
}

macro_rules! list_response {
    ($name:ident, $field:ident, $item:ty) => {
        #[derive(Debug, Clone, Default, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            #[serde(default)]
            pub $field: Vec<$item>,
            #[serde(default)]
            pub next_page_token: String,
        }

        impl Page for $name {
            type Item = $item;

            fn into_parts(self) -> (Vec<$item>, String) {
                (self.$field, self.next_page_token)
            }
        }
    };
}

list_response!(ListInstancesResponse, instances, InstanceInfo);
list_response!(ListNetworksResponse, networks, NetworkInfo);
list_response!(ListSubnetsResponse, subnets, SubnetInfo);
list_response!(ListDatabasesResponse, databases, DatabaseInfo);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateIamTokenRequest<'a> {
    yandex_passport_oauth_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateIamTokenResponse {
    iam_token: String,
}

/// Compute instance
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstanceInfo {
    pub id: String,
    pub folder_id: String,
    pub name: String,
    pub labels: HashMap<String, String>,
    pub status: String,
    pub network_interfaces: Vec<NetworkInterface>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkInterface {
    pub index: String,
    pub subnet_id: String,
    pub primary_v4_address: Option<PrimaryAddress>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PrimaryAddress {
    pub address: String,
    pub one_to_one_nat: Option<OneToOneNat>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OneToOneNat {
    pub address: String,
}

impl NetworkInterface {
    pub fn private_address(&self) -> Option<&str> {
        self.primary_v4_address.as_ref().map(|a| a.address.as_str())
    }

    pub fn nat_address(&self) -> Option<&str> {
        self.primary_v4_address
            .as_ref()?
            .one_to_one_nat
            .as_ref()
            .map(|nat| nat.address.as_str())
            .filter(|a| !a.is_empty())
    }
}

/// VPC network
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NetworkInfo {
    pub id: String,
    pub name: String,
    pub labels: HashMap<String, String>,
}

/// VPC subnet
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SubnetInfo {
    pub id: String,
    pub name: String,
    pub labels: HashMap<String, String>,
    pub network_id: String,
    pub v4_cidr_blocks: Vec<String>,
}

/// Managed YDB database
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseInfo {
    pub id: String,
    pub name: String,
    pub labels: HashMap<String, String>,
    pub status: String,
    /// e.g. `grpcs://ydb.serverless.yandexcloud.net:2135/?database=/ru-central1/b1g/etn`
    pub endpoint: String,
}
