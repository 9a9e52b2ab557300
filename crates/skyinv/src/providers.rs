use skyinv_cloud::CloudProvider;
use skyinv_cloud_aws::AwsCloudProvider;
use skyinv_cloud_yandex::YandexCloudProvider;
use skyinv_config::{ProviderKind, Settings};

/// Build the compute provider selected by `CLOUD_TYPE`
pub async fn cloud_provider(settings: &Settings) -> anyhow::Result<Box<dyn CloudProvider>> {
    let provider: Box<dyn CloudProvider> = match settings.cloud_provider()? {
        ProviderKind::Aws => Box::new(AwsCloudProvider::from_env().await?),
        ProviderKind::Yandex => Box::new(YandexCloudProvider::from_env()?),
    };
    tracing::info!(provider = provider.name(), "Using cloud provider");
    Ok(provider)
}
