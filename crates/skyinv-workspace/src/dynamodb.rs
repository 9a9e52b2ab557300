//! DynamoDB workspace store

use crate::error::{Result, WorkspaceError};
use crate::row::WsRow;
use crate::store::WorkspaceStore;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, KeySchemaElement, KeyType, ProvisionedThroughput,
    ScalarAttributeType,
};
use chrono::{DateTime, SecondsFormat, Utc};
use skyinv_config::{ConfigError, require_envs};
use std::collections::HashMap;

pub const TABLE_ENV: &str = "AWS_TABLE";

const KEY: &str = "name";

type Item = HashMap<String, AttributeValue>;

pub struct DynamoDbStore {
    client: Client,
    table: String,
}

impl DynamoDbStore {
    /// Table from `AWS_TABLE`, credentials from the shared AWS configuration
    pub async fn from_env() -> Result<Self> {
        let mut envs = require_envs(&[TABLE_ENV])?;
        let table = envs.remove(TABLE_ENV).unwrap_or_default();
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;
        Self::from_sdk_config(&config, table)
    }

    pub fn from_sdk_config(config: &SdkConfig, table: impl Into<String>) -> Result<Self> {
        let mut missing = Vec::new();
        if config.region().is_none() {
            missing.push("AWS_REGION".to_string());
        }
        if config.credentials_provider().is_none() {
            missing.push("AWS_ACCESS_KEY_ID/AWS_SECRET_ACCESS_KEY or AWS_PROFILE".to_string());
        }
        if !missing.is_empty() {
            return Err(ConfigError::MissingEnv(missing).into());
        }

        Ok(Self {
            client: Client::new(config),
            table: table.into(),
        })
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    async fn create_table(&self) -> Result<()> {
        let attribute = AttributeDefinition::builder()
            .attribute_name(KEY)
            .attribute_type(ScalarAttributeType::S)
            .build()
            .map_err(|e| WorkspaceError::store("CreateTable", e))?;
        let key = KeySchemaElement::builder()
            .attribute_name(KEY)
            .key_type(KeyType::Hash)
            .build()
            .map_err(|e| WorkspaceError::store("CreateTable", e))?;
        let throughput = ProvisionedThroughput::builder()
            .read_capacity_units(1)
            .write_capacity_units(1)
            .build()
            .map_err(|e| WorkspaceError::store("CreateTable", e))?;

        self.client
            .create_table()
            .table_name(&self.table)
            .attribute_definitions(attribute)
            .key_schema(key)
            .provisioned_throughput(throughput)
            .send()
            .await
            .map_err(|e| WorkspaceError::store("CreateTable", DisplayErrorContext(&e)))?;

        tracing::info!(table = %self.table, "Created DynamoDB table");
        Ok(())
    }
}

#[async_trait]
impl WorkspaceStore for DynamoDbStore {
    fn name(&self) -> &str {
        "dynamodb"
    }

    async fn ensure_table(&self) -> Result<()> {
        match self
            .client
            .describe_table()
            .table_name(&self.table)
            .send()
            .await
        {
            Ok(_) => Ok(()),
            Err(e)
                if e
                    .as_service_error()
                    .is_some_and(|e| e.is_resource_not_found_exception()) =>
            {
                self.create_table().await
            }
            Err(e) => Err(WorkspaceError::store("DescribeTable", DisplayErrorContext(&e))),
        }
    }

    async fn insert(&self, row: &WsRow) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(to_item(row)))
            .send()
            .await
            .map_err(|e| WorkspaceError::store("PutItem", DisplayErrorContext(&e)))?;
        Ok(())
    }

    async fn set_state(&self, name: &str, state: &str, update_date: DateTime<Utc>) -> Result<()> {
        self.client
            .update_item()
            .table_name(&self.table)
            .key(KEY, AttributeValue::S(name.to_string()))
            .update_expression("set #S = :r, update_date = :u")
            .expression_attribute_names("#S", "state")
            .expression_attribute_values(":r", AttributeValue::S(state.to_string()))
            .expression_attribute_values(":u", AttributeValue::S(format_date(&update_date)))
            .send()
            .await
            .map_err(|e| WorkspaceError::store("UpdateItem", DisplayErrorContext(&e)))?;
        Ok(())
    }

    async fn scan(&self) -> Result<Vec<WsRow>> {
        let out = self
            .client
            .scan()
            .table_name(&self.table)
            .send()
            .await
            .map_err(|e| WorkspaceError::store("Scan", DisplayErrorContext(&e)))?;

        let rows = out
            .items()
            .iter()
            .filter_map(|item| {
                let row = from_item(item);
                if row.is_none() {
                    tracing::warn!(table = %self.table, "Skipping undecodable item");
                }
                row
            })
            .collect();
        Ok(rows)
    }

    fn release(&mut self) {
        tracing::debug!(table = %self.table, "DynamoDB client released");
    }
}

fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

fn to_item(row: &WsRow) -> Item {
    HashMap::from([
        (KEY.to_string(), AttributeValue::S(row.name.clone())),
        ("net_id".to_string(), AttributeValue::N(row.net_id.to_string())),
        ("create_date".to_string(), AttributeValue::S(format_date(&row.create_date))),
        ("update_date".to_string(), AttributeValue::S(format_date(&row.update_date))),
        ("state".to_string(), AttributeValue::S(row.state.clone())),
        ("ha_mode".to_string(), AttributeValue::Bool(row.ha_mode)),
    ])
}

fn from_item(item: &Item) -> Option<WsRow> {
    let string = |key: &str| item.get(key)?.as_s().ok().cloned();
    let date = |key: &str| {
        DateTime::parse_from_rfc3339(item.get(key)?.as_s().ok()?)
            .ok()
            .map(|d| d.with_timezone(&Utc))
    };

    Some(WsRow {
        name: string(KEY)?,
        net_id: item.get("net_id")?.as_n().ok()?.parse().ok()?,
        create_date: date("create_date")?,
        update_date: date("update_date")?,
        state: string("state").unwrap_or_default(),
        ha_mode: item
            .get("ha_mode")
            .and_then(|v| v.as_bool().ok().copied())
            .unwrap_or_default(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> WsRow {
        let mut row = WsRow {
            name: "ws1".to_string(),
            net_id: 7,
            ha_mode: true,
            ..Default::default()
        };
        row.mark_created(
            DateTime::parse_from_rfc3339("2024-05-01T10:00:00.250Z")
                .unwrap()
                .with_timezone(&Utc),
        );
        row
    }

    #[test]
    fn test_item_layout() {
        let item = to_item(&row());
        assert_eq!(item["name"], AttributeValue::S("ws1".into()));
        assert_eq!(item["net_id"], AttributeValue::N("7".into()));
        assert_eq!(item["create_date"], AttributeValue::S("2024-05-01T10:00:00.250Z".into()));
        assert_eq!(item["state"], AttributeValue::S("creating".into()));
        assert_eq!(item["ha_mode"], AttributeValue::Bool(true));
    }

    #[test]
    fn test_item_decodes_back() {
        let row = row();
        assert_eq!(from_item(&to_item(&row)), Some(row));
    }

    #[test]
    fn test_undecodable_items() {
        let mut item = to_item(&row());
        item.insert("net_id".into(), AttributeValue::S("seven".into()));
        assert_eq!(from_item(&item), None);

        let mut item = to_item(&row());
        item.remove("create_date");
        assert_eq!(from_item(&item), None);

        let mut item = to_item(&row());
        item.remove("ha_mode");
        item.remove("state");
        let decoded = from_item(&item).unwrap();
        assert!(!decoded.ha_mode);
        assert_eq!(decoded.state, "");
    }

    #[test]
    fn test_missing_region_and_credentials() {
        let config = SdkConfig::builder().build();
        let err = match DynamoDbStore::from_sdk_config(&config, "workspaces") {
            Err(e) => e,
            Ok(_) => panic!("expected MissingEnv"),
        };
        assert!(matches!(
            err,
            WorkspaceError::Config(ConfigError::MissingEnv(ref missing)) if missing.len() == 2
        ));
    }

    #[test]
    #[serial_test::serial]
    fn test_from_env_requires_table() {
        let result = temp_env::with_vars([(TABLE_ENV, None::<&str>)], || {
            tokio::runtime::Runtime::new()
                .unwrap()
                .block_on(DynamoDbStore::from_env())
        });
        match result {
            Err(WorkspaceError::Config(ConfigError::MissingEnv(missing))) => {
                assert_eq!(missing, vec![TABLE_ENV]);
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("expected MissingEnv"),
        }
    }
}
