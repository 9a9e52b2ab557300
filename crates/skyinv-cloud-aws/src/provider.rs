//! AWS EC2 provider implementation

use crate::resource::{Ec2Instance, Ec2Subnet, Ec2Vpc};
use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_ec2::Client;
use aws_sdk_ec2::error::DisplayErrorContext;
use skyinv_cloud::filter;
use skyinv_cloud::{
    CloudError, CloudProvider, Filter, Host, HostList, Result, Subnet, SubnetList, Vpc, VpcList,
};

/// AWS EC2 provider
pub struct AwsCloudProvider {
    client: Client,
}

impl AwsCloudProvider {
    /// Load the shared AWS configuration (environment, `~/.aws/config`, IMDS)
    pub async fn from_env() -> Result<Self> {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self::from_sdk_config(&config)
    }

    /// Build the provider, failing fast when region or credentials are absent
    pub fn from_sdk_config(config: &SdkConfig) -> Result<Self> {
        let mut missing = Vec::new();
        if config.region().is_none() {
            missing.push("AWS_REGION".to_string());
        }
        if config.credentials_provider().is_none() {
            missing.push("AWS_ACCESS_KEY_ID/AWS_SECRET_ACCESS_KEY or AWS_PROFILE".to_string());
        }
        if !missing.is_empty() {
            return Err(CloudError::MissingEnv(missing));
        }

        Ok(Self {
            client: Client::new(config),
        })
    }

    async fn describe_instances(&self) -> Result<Vec<Ec2Instance>> {
        let mut result = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let out = self
                .client
                .describe_instances()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| CloudError::api("DescribeInstances", DisplayErrorContext(&e)))?;

            for reservation in out.reservations() {
                result.extend(reservation.instances().iter().map(Ec2Instance::from));
            }

            tracing::debug!(count = result.len(), "Fetched EC2 instances page");
            match out.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }
        Ok(result)
    }

    async fn describe_vpcs(&self) -> Result<Vec<Ec2Vpc>> {
        let mut result = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let out = self
                .client
                .describe_vpcs()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| CloudError::api("DescribeVpcs", DisplayErrorContext(&e)))?;

            result.extend(out.vpcs().iter().map(Ec2Vpc::from));

            tracing::debug!(count = result.len(), "Fetched VPCs page");
            match out.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }
        Ok(result)
    }

    async fn describe_subnets(&self) -> Result<Vec<Ec2Subnet>> {
        let mut result = Vec::new();
        let mut next_token: Option<String> = None;
        loop {
            let out = self
                .client
                .describe_subnets()
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| CloudError::api("DescribeSubnets", DisplayErrorContext(&e)))?;

            result.extend(out.subnets().iter().map(Ec2Subnet::from));

            tracing::debug!(count = result.len(), "Fetched subnets page");
            match out.next_token() {
                Some(token) if !token.is_empty() => next_token = Some(token.to_string()),
                _ => break,
            }
        }
        Ok(result)
    }
}

#[async_trait]
impl CloudProvider for AwsCloudProvider {
    fn name(&self) -> &str {
        "aws"
    }

    async fn list_instances(&self, filter: Option<&Filter>) -> Result<HostList> {
        let hosts: HostList = self
            .describe_instances()
            .await?
            .into_iter()
            .map(|h| Box::new(h) as Box<dyn Host>)
            .collect();
        Ok(filter::apply(filter, hosts))
    }

    async fn list_vpcs(&self, filter: Option<&Filter>) -> Result<VpcList> {
        let vpcs: VpcList = self
            .describe_vpcs()
            .await?
            .into_iter()
            .map(|v| Box::new(v) as Box<dyn Vpc>)
            .collect();
        Ok(filter::apply(filter, vpcs))
    }

    async fn list_subnets(&self, filter: Option<&Filter>) -> Result<SubnetList> {
        let subnets: SubnetList = self
            .describe_subnets()
            .await?
            .into_iter()
            .map(|s| Box::new(s) as Box<dyn Subnet>)
            .collect();
        Ok(filter::apply(filter, subnets))
    }

    // TODO: list RDS instances once a database adapter exists for AWS
}
