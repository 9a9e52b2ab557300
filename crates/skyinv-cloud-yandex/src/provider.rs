//! Yandex Cloud provider implementation

use crate::api::{Endpoints, YandexApi, YandexConfig};
use crate::resource::{YcDatabase, YcInstance, YcNetwork, YcSubnet};
use async_trait::async_trait;
use skyinv_cloud::filter;
use skyinv_cloud::{
    CloudDb, CloudProvider, DatabaseList, Filter, Host, HostList, Result, Subnet, SubnetList, Vpc,
    VpcList,
};

/// Yandex Cloud provider (Compute, VPC, YDB)
pub struct YandexCloudProvider {
    api: YandexApi,
}

impl YandexCloudProvider {
    /// Create provider from `YC_TOKEN` and `FOLDER_ID`
    pub fn from_env() -> Result<Self> {
        let config = YandexConfig::from_env()?;
        Ok(Self::new(config))
    }

    pub fn new(config: YandexConfig) -> Self {
        Self {
            api: YandexApi::new(config),
        }
    }

    /// Point the provider at alternative API base URLs
    pub fn with_endpoints(config: YandexConfig, endpoints: Endpoints) -> Self {
        Self {
            api: YandexApi::with_endpoints(config, endpoints),
        }
    }

    pub fn folder_id(&self) -> &str {
        self.api.folder_id()
    }

    /// IAM token for other Yandex services (e.g. YDB)
    pub async fn iam_token(&self) -> Result<String> {
        Ok(self.api.iam_token().await?.to_string())
    }
}

#[async_trait]
impl CloudProvider for YandexCloudProvider {
    fn name(&self) -> &str {
        "yandex"
    }

    async fn list_instances(&self, filter: Option<&Filter>) -> Result<HostList> {
        let hosts: HostList = self
            .api
            .list_instances()
            .await?
            .iter()
            .map(|i| Box::new(YcInstance::from(i)) as Box<dyn Host>)
            .collect();
        Ok(filter::apply(filter, hosts))
    }

    async fn list_vpcs(&self, filter: Option<&Filter>) -> Result<VpcList> {
        let networks: VpcList = self
            .api
            .list_networks()
            .await?
            .iter()
            .map(|n| Box::new(YcNetwork::from(n)) as Box<dyn Vpc>)
            .collect();
        Ok(filter::apply(filter, networks))
    }

    async fn list_subnets(&self, filter: Option<&Filter>) -> Result<SubnetList> {
        let subnets: SubnetList = self
            .api
            .list_subnets()
            .await?
            .iter()
            .map(|s| Box::new(YcSubnet::from(s)) as Box<dyn Subnet>)
            .collect();
        Ok(filter::apply(filter, subnets))
    }

    async fn list_databases(&self, filter: Option<&Filter>) -> Result<DatabaseList> {
        let databases: DatabaseList = self
            .api
            .list_databases()
            .await?
            .iter()
            .map(|d| Box::new(YcDatabase::from(d)) as Box<dyn CloudDb>)
            .collect();
        Ok(filter::apply(filter, databases))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use skyinv_cloud::{CloudError, Named};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    fn config() -> YandexConfig {
        YandexConfig {
            oauth_token: "y0_token".to_string(),
            folder_id: "b1g".to_string(),
        }
    }

    /// Endpoints that refuse connections immediately
    fn unreachable() -> Endpoints {
        let base = "http://127.0.0.1:1".to_string();
        Endpoints {
            iam: base.clone(),
            compute: base.clone(),
            vpc: base.clone(),
            ydb: base,
        }
    }

    /// Serve `responses` in order, one per connection, and return the
    /// request heads that were received
    async fn scripted_server(
        responses: Vec<(u16, &'static str)>,
    ) -> (Endpoints, tokio::task::JoinHandle<Vec<String>>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let mut requests = Vec::new();
            for (status, body) in responses {
                let (mut stream, _) = listener.accept().await.unwrap();
                requests.push(read_request(&mut stream).await);

                let reason = if status == 200 { "OK" } else { "Error" };
                let response = format!(
                    "HTTP/1.1 {status} {reason}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                    body.len()
                );
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.unwrap();
            }
            requests
        });

        let endpoints = Endpoints {
            iam: base.clone(),
            compute: base.clone(),
            vpc: base.clone(),
            ydb: base,
        };
        (endpoints, handle)
    }

    async fn read_request(stream: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        let head_end = loop {
            let n = stream.read(&mut chunk).await.unwrap();
            assert!(n > 0, "connection closed before request head");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
        let content_length = head
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        while buf.len() < head_end + content_length {
            let n = stream.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
        }
        head
    }

    const IAM_REPLY: &str = r#"{"iamToken": "t1.iam"}"#;

    #[tokio::test]
    async fn test_list_instances_follows_page_tokens() {
        let (endpoints, server) = scripted_server(vec![
            (200, IAM_REPLY),
            (
                200,
                r#"{"instances": [{"id": "i1", "name": "web1"}, {"id": "i2", "name": "web2"}], "nextPageToken": "p2"}"#,
            ),
            (200, r#"{"instances": [{"id": "i3", "name": "nat1"}]}"#),
        ])
        .await;
        let provider = YandexCloudProvider::with_endpoints(config(), endpoints);

        let hosts = provider.list_instances(None).await.unwrap();
        let names: Vec<&str> = hosts.iter().map(|h| h.name()).collect();
        assert_eq!(names, vec!["web1", "web2", "nat1"]);

        let requests = server.await.unwrap();
        assert!(requests[0].starts_with("POST /iam/v1/tokens"));

        let first = requests[1].lines().next().unwrap();
        assert!(first.starts_with("GET /compute/v1/instances?"));
        assert!(first.contains("folderId=b1g"));
        assert!(first.contains("pageSize=100"));
        assert!(!first.contains("pageToken"));
        assert!(requests[1].to_lowercase().contains("authorization: bearer t1.iam"));

        let second = requests[2].lines().next().unwrap();
        assert!(second.contains("pageToken=p2"));
    }

    #[tokio::test]
    async fn test_failed_page_aborts_listing() {
        let (endpoints, server) = scripted_server(vec![
            (200, IAM_REPLY),
            (
                200,
                r#"{"subnets": [{"id": "e9b1", "name": "a", "v4CidrBlocks": ["10.0.0.0/24"]}], "nextPageToken": "p2"}"#,
            ),
            (500, r#"{"message": "internal"}"#),
        ])
        .await;
        let provider = YandexCloudProvider::with_endpoints(config(), endpoints);

        let err = match provider.list_subnets(None).await {
            Err(e) => e,
            Ok(subnets) => panic!("expected API error, got {} subnets", subnets.len()),
        };
        match err {
            CloudError::Api { operation, message } => {
                assert_eq!(operation, "ListSubnets");
                assert!(message.starts_with("HTTP 500"));
            }
            other => panic!("unexpected error: {other}"),
        }

        let requests = server.await.unwrap();
        assert_eq!(requests.len(), 3);
        assert!(requests[2].lines().next().unwrap().contains("pageToken=p2"));
    }

    #[tokio::test]
    async fn test_iam_token_exchanged_once() {
        let (endpoints, server) = scripted_server(vec![
            (200, IAM_REPLY),
            (200, r#"{"networks": [{"id": "enp1", "name": "default"}]}"#),
            (200, r#"{"databases": []}"#),
        ])
        .await;
        let provider = YandexCloudProvider::with_endpoints(config(), endpoints);

        assert_eq!(provider.list_vpcs(None).await.unwrap().len(), 1);
        assert!(provider.list_databases(None).await.unwrap().is_empty());
        assert_eq!(provider.iam_token().await.unwrap(), "t1.iam");

        let requests = server.await.unwrap();
        let iam_calls = requests
            .iter()
            .filter(|r| r.starts_with("POST /iam/v1/tokens"))
            .count();
        assert_eq!(iam_calls, 1);
    }

    #[test]
    #[serial]
    fn test_from_env_reports_missing_envs() {
        temp_env::with_vars([("YC_TOKEN", None::<&str>), ("FOLDER_ID", Some("b1g"))], || {
            let err = match YandexCloudProvider::from_env() {
                Err(e) => e,
                Ok(_) => panic!("expected MissingEnv"),
            };
            match err {
                CloudError::MissingEnv(missing) => assert_eq!(missing, vec!["YC_TOKEN"]),
                other => panic!("unexpected error: {other}"),
            }
        });
    }

    #[test]
    fn test_provider_name_and_folder() {
        let provider = YandexCloudProvider::new(config());
        assert_eq!(provider.name(), "yandex");
        assert_eq!(provider.folder_id(), "b1g");
    }

    #[tokio::test]
    async fn test_listing_fails_when_token_exchange_fails() {
        let provider = YandexCloudProvider::with_endpoints(config(), unreachable());

        let err = match provider.list_instances(None).await {
            Err(e) => e,
            Ok(_) => panic!("expected API error"),
        };
        assert!(matches!(err, CloudError::Api { .. }));
        assert!(provider.list_databases(Some(&Filter::AcceptAll)).await.is_err());
    }
}
