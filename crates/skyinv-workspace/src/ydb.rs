//! YDB workspace store
//!
//! The database is found by name in the configured Yandex Cloud folder. The
//! connection is opened on first use with an IAM token.

use crate::error::{Result, WorkspaceError};
use crate::row::WsRow;
use crate::store::WorkspaceStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use skyinv_cloud::{CloudDb, CloudProvider, Filter, Named};
use skyinv_cloud_yandex::{YandexCloudProvider, YandexConfig};
use skyinv_config::require_envs;
use std::collections::HashMap;
use std::time::SystemTime;
use tokio::sync::OnceCell;
use ydb::{AccessTokenCredentials, Client, ClientBuilder, Query, Value, ydb_params};

pub const REQUIRED_ENVS: [&str; 3] = ["YC_TOKEN", "FOLDER_ID", "YC_DB"];

const TABLE: &str = "main";

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS main (
    name Utf8,
    net_id Uint32,
    create_date Timestamp,
    update_date Timestamp,
    state Utf8,
    ha_mode Bool,
    PRIMARY KEY (name)
)";

const INSERT: &str = "DECLARE $name AS Utf8;
DECLARE $net_id AS Uint32;
DECLARE $create_date AS Timestamp;
DECLARE $update_date AS Timestamp;
DECLARE $state AS Utf8;
DECLARE $ha_mode AS Bool;
INSERT INTO main (name, net_id, create_date, update_date, state, ha_mode)
VALUES ($name, $net_id, $create_date, $update_date, $state, $ha_mode);";

const SET_STATE: &str = "DECLARE $name AS Utf8;
DECLARE $state AS Utf8;
DECLARE $now AS Timestamp;
UPDATE main SET update_date = $now, state = $state WHERE name = $name;";

const SELECT_ALL: &str =
    "SELECT name, net_id, create_date, update_date, state, ha_mode FROM main;";

pub struct YdbStore {
    endpoint: String,
    token: String,
    client: OnceCell<Client>,
}

impl YdbStore {
    /// Locate the `YC_DB` database in `FOLDER_ID` and prepare a store for it
    pub async fn from_env() -> Result<Self> {
        let mut envs = require_envs(&REQUIRED_ENVS)?;
        let db_name = envs.remove("YC_DB").unwrap_or_default();
        let provider = YandexCloudProvider::new(YandexConfig {
            oauth_token: envs.remove("YC_TOKEN").unwrap_or_default(),
            folder_id: envs.remove("FOLDER_ID").unwrap_or_default(),
        });

        let databases = provider
            .list_databases(Some(&Filter::name_equals(db_name.as_str())))
            .await?;
        let database = databases
            .first()
            .ok_or_else(|| WorkspaceError::DatabaseNotFound(db_name.clone()))?;
        tracing::debug!(database = %database.name(), endpoint = %database.endpoint(), "Found YDB database");

        let token = provider.iam_token().await?;
        Self::new(database.endpoint(), token)
    }

    /// Store for `endpoint`, which must carry a `database` query parameter
    pub fn new(endpoint: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let endpoint = endpoint.into();
        database_path(&endpoint)?;
        Ok(Self {
            endpoint,
            token: token.into(),
            client: OnceCell::new(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    async fn client(&self) -> Result<&Client> {
        self.client.get_or_try_init(|| self.connect()).await
    }

    async fn connect(&self) -> Result<Client> {
        tracing::debug!(endpoint = %self.endpoint, "Connecting to YDB");
        let client = ClientBuilder::new_from_connection_string(&self.endpoint)
            .map_err(|e| WorkspaceError::store("Connect", e))?
            .with_credentials(AccessTokenCredentials::from(self.token.clone()))
            .client()
            .map_err(|e| WorkspaceError::store("Connect", e))?;
        client
            .wait()
            .await
            .map_err(|e| WorkspaceError::store("Connect", e))?;
        Ok(client)
    }

    async fn execute(&self, operation: &str, text: &str, params: HashMap<String, Value>) -> Result<()> {
        let client = self.client().await?;
        client
            .table_client()
            .retry_transaction(|t| {
                let query = Query::new(text).with_params(params.clone());
                async move {
                    let mut t = t;
                    t.query(query).await?;
                    t.commit().await?;
                    Ok(())
                }
            })
            .await
            .map_err(|e| WorkspaceError::store(operation, e))
    }
}

#[async_trait]
impl WorkspaceStore for YdbStore {
    fn name(&self) -> &str {
        "ydb"
    }

    async fn ensure_table(&self) -> Result<()> {
        let client = self.client().await?;
        client
            .table_client()
            .retry_execute_scheme_query(CREATE_TABLE)
            .await
            .map_err(|e| WorkspaceError::store("CreateTable", e))?;
        tracing::debug!(table = TABLE, "Ensured YDB table");
        Ok(())
    }

    async fn insert(&self, row: &WsRow) -> Result<()> {
        let params = ydb_params!(
            "$name" => row.name.clone(),
            "$net_id" => row.net_id,
            "$create_date" => Value::Timestamp(SystemTime::from(row.create_date)),
            "$update_date" => Value::Timestamp(SystemTime::from(row.update_date)),
            "$state" => row.state.clone(),
            "$ha_mode" => row.ha_mode
        );
        self.execute("Insert", INSERT, params).await
    }

    async fn set_state(&self, name: &str, state: &str, update_date: DateTime<Utc>) -> Result<()> {
        let params = ydb_params!(
            "$name" => name.to_string(),
            "$state" => state.to_string(),
            "$now" => Value::Timestamp(SystemTime::from(update_date))
        );
        self.execute("SetState", SET_STATE, params).await
    }

    async fn scan(&self) -> Result<Vec<WsRow>> {
        let client = self.client().await?;
        let result_set = client
            .table_client()
            .retry_transaction(|t| async move {
                let mut t = t;
                Ok(t.query(Query::new(SELECT_ALL)).await?.into_only_result()?)
            })
            .await
            .map_err(|e| WorkspaceError::store("Select", e))?;

        let mut rows = Vec::new();
        for row in result_set.rows() {
            match decode_row(row) {
                Ok(row) => rows.push(row),
                Err(e) => tracing::warn!(error = %e, "Skipping undecodable row"),
            }
        }
        Ok(rows)
    }

    fn release(&mut self) {
        if self.client.take().is_some() {
            tracing::debug!(endpoint = %self.endpoint, "Closed YDB connection");
        }
    }
}

fn decode_row(mut row: ydb::Row) -> ydb::YdbResult<WsRow> {
    let name: Option<String> = row.remove_field_by_name("name")?.try_into()?;
    let net_id: Option<u32> = row.remove_field_by_name("net_id")?.try_into()?;
    let create_date: Option<SystemTime> = row.remove_field_by_name("create_date")?.try_into()?;
    let update_date: Option<SystemTime> = row.remove_field_by_name("update_date")?.try_into()?;
    let state: Option<String> = row.remove_field_by_name("state")?.try_into()?;
    let ha_mode: Option<bool> = row.remove_field_by_name("ha_mode")?.try_into()?;

    Ok(WsRow {
        name: name.unwrap_or_default(),
        net_id: net_id.unwrap_or_default(),
        create_date: create_date.map(DateTime::from).unwrap_or_default(),
        update_date: update_date.map(DateTime::from).unwrap_or_default(),
        state: state.unwrap_or_default(),
        ha_mode: ha_mode.unwrap_or_default(),
    })
}

/// Database path from the `database` query parameter of an endpoint
pub fn database_path(endpoint: &str) -> Result<String> {
    let url =
        url::Url::parse(endpoint).map_err(|_| WorkspaceError::BadEndpoint(endpoint.to_string()))?;
    url.query_pairs()
        .find(|(key, _)| key == "database")
        .map(|(_, value)| value.into_owned())
        .filter(|path| !path.is_empty())
        .ok_or_else(|| WorkspaceError::BadEndpoint(endpoint.to_string()))
}
