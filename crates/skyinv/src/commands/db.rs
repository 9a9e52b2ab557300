use skyinv_config::{ProviderKind, Settings};
use skyinv_workspace::{DynamoDbStore, WorkspaceControl, WorkspaceStore, YdbStore};

pub enum DbCommand {
    List,
    Create(String),
    SetState(String),
}

pub async fn handle(settings: &Settings, command: DbCommand) -> anyhow::Result<()> {
    match settings.provider {
        ProviderKind::Aws => {
            let store = DynamoDbStore::from_env().await?;
            run(WorkspaceControl::new(store), command).await
        }
        ProviderKind::Yandex => {
            let store = YdbStore::from_env().await?;
            run(WorkspaceControl::new(store), command).await
        }
    }
}

async fn run<S: WorkspaceStore>(
    control: WorkspaceControl<S>,
    command: DbCommand,
) -> anyhow::Result<()> {
    let result = execute(&control, command).await;
    control.close();
    result
}

async fn execute<S: WorkspaceStore>(
    control: &WorkspaceControl<S>,
    command: DbCommand,
) -> anyhow::Result<()> {
    match command {
        DbCommand::List => {
            let rows = control.list().await?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        DbCommand::Create(json) => {
            let row = control.create(&json).await?;
            tracing::info!(name = %row.name, "Workspace created");
        }
        DbCommand::SetState(json) => control.set_state(&json).await?,
    }
    Ok(())
}
