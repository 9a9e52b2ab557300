use crate::providers;
use skyinv_cloud::Filter;
use skyinv_config::Settings;

pub async fn handle(settings: &Settings) -> anyhow::Result<()> {
    let workspace = settings.require_workspace()?;
    let provider = providers::cloud_provider(settings).await?;

    let filter = Filter::workspace(workspace);
    let inventory =
        skyinv_core::build_inventory(provider.as_ref(), Some(&filter), Some(&filter)).await?;

    println!("{}", inventory.to_json_pretty()?);
    Ok(())
}
