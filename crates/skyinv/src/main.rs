mod commands;
mod providers;

use clap::{ArgGroup, CommandFactory, Parser};
use colored::Colorize;
use skyinv_config::{CLOUD_TYPE_ENV, ConfigError, Settings, SshSettings};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "skyinv", version)]
#[command(about = "Ansible dynamic inventory for AWS and Yandex Cloud", long_about = None)]
#[command(group(
    ArgGroup::new("mode").args(["list", "host", "ssh", "db_list", "db_create", "db_set"])
))]
struct Cli {
    /// Print the inventory of the workspace as JSON
    #[arg(long)]
    list: bool,

    /// Print variables of a single host
    #[arg(long, value_name = "NAME")]
    host: Option<String>,

    /// Print an SSH config that proxies through the NAT host
    #[arg(long)]
    ssh: bool,

    /// SSH user for --ssh
    #[arg(long, default_value = "cloud-user")]
    ssh_user: String,

    /// Group whose first host is the SSH gateway
    #[arg(long, default_value = "nat")]
    ssh_nat_group: String,

    /// SSH port of the gateway
    #[arg(long, default_value_t = 22)]
    ssh_port: u16,

    /// List workspaces in the workspace table
    #[arg(long)]
    db_list: bool,

    /// Create a workspace from a JSON row
    #[arg(long, value_name = "JSON")]
    db_create: Option<String>,

    /// Set the state of a workspace from a JSON row ({"name": .., "state": ..})
    #[arg(long, value_name = "JSON")]
    db_set: Option<String>,

    /// Cloud provider (aws, yandex)
    #[arg(long = "cloud", env = "CLOUD_TYPE")]
    cloud: Option<String>,

    /// Workspace label value selecting the inventory
    #[arg(long, env = "WORKSPACE")]
    workspace: Option<String>,
}

enum Mode {
    List,
    Host(String),
    Ssh,
    Db(commands::db::DbCommand),
}

impl Cli {
    fn mode(&self) -> Option<Mode> {
        use commands::db::DbCommand;

        if self.list {
            Some(Mode::List)
        } else if let Some(host) = &self.host {
            Some(Mode::Host(host.clone()))
        } else if self.ssh {
            Some(Mode::Ssh)
        } else if self.db_list {
            Some(Mode::Db(DbCommand::List))
        } else if let Some(json) = &self.db_create {
            Some(Mode::Db(DbCommand::Create(json.clone())))
        } else {
            self.db_set
                .as_ref()
                .map(|json| Mode::Db(DbCommand::SetState(json.clone())))
        }
    }

    fn settings(&self) -> anyhow::Result<Settings> {
        let cloud = self
            .cloud
            .clone()
            .filter(|c| !c.is_empty())
            .ok_or_else(|| ConfigError::MissingEnv(vec![CLOUD_TYPE_ENV.to_string()]))?;

        Ok(Settings::new(cloud)?
            .with_workspace(self.workspace.clone())
            .with_ssh(SshSettings {
                user: self.ssh_user.clone(),
                nat_group: self.ssh_nat_group.clone(),
                port: self.ssh_port,
            }))
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // stdout carries JSON, logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let Some(mode) = cli.mode() else {
        let _ = Cli::command().print_help();
        std::process::exit(1);
    };

    if let Err(e) = run(&cli, mode).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn run(cli: &Cli, mode: Mode) -> anyhow::Result<()> {
    let settings = cli.settings()?;
    tracing::debug!(provider = %settings.provider, workspace = ?settings.workspace, "Resolved settings");

    match mode {
        Mode::List => commands::inventory::handle(&settings).await,
        Mode::Host(name) => commands::host::handle(&name),
        Mode::Ssh => commands::ssh::handle(&settings).await,
        Mode::Db(command) => commands::db::handle(&settings, command).await,
    }
}
