//! Configuration migration
//!
//! A configuration is read once from the source project, stripped of
//! source-only fields and created again in the destination project together
//! with all of its rows. State is never copied: it belongs to the environment
//! the configuration ran in.

use kbc_client::model::{
    ComponentConfiguration, ConfigurationRow, NewConfiguration, NewConfigurationRow,
};
use kbc_client::{Result, StorageApi};
use serde_json::{Map, Value};
use tracing::{debug, info};

/// Keys removed from a row's nested configuration payload
const ROW_PAYLOAD_SOURCE_KEYS: &[&str] = &["id", "rowId"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MigrateOptions {
    /// Create the destination configuration and rows under the source ids
    pub use_source_id: bool,
    /// When `false`, an existing destination configuration turns the migration into a no-op
    pub fail_on_existing: bool,
}

impl Default for MigrateOptions {
    fn default() -> Self {
        Self {
            use_source_id: false,
            fail_on_existing: true,
        }
    }
}

/// Copy configuration `config_id` of `component_id` from `source` to `destination`.
///
/// Returns `false` when the destination already holds the configuration and
/// `fail_on_existing` is off. Any failure after the existence check aborts the migration;
/// a partially created destination configuration is left in place.
pub async fn migrate_configuration(
    source: &StorageApi<'_>,
    destination: &StorageApi<'_>,
    component_id: &str,
    config_id: &str,
    options: MigrateOptions,
) -> Result<bool> {
    if !options.fail_on_existing && configuration_exists(destination, component_id, config_id).await? {
        info!(
            component_id,
            config_id, "Configuration already exists in destination, skipping"
        );
        return Ok(false);
    }

    let src_config = source.get_configuration(component_id, config_id).await?;
    let src_rows = source
        .list_configuration_rows(component_id, config_id)
        .await?;

    info!(component_id, config_id, rows = src_rows.len(), "Transferring config");
    let created = destination
        .create_configuration(
            component_id,
            &destination_configuration(&src_config, options.use_source_id),
        )
        .await?;

    for row in &src_rows {
        debug!(component_id, config_id = %created.id, row_id = %row.id, "Transferring config row");
        destination
            .create_configuration_row(
                component_id,
                &created.id,
                &destination_row(row, options.use_source_id),
            )
            .await?;
    }

    Ok(true)
}

async fn configuration_exists(
    destination: &StorageApi<'_>,
    component_id: &str,
    config_id: &str,
) -> Result<bool> {
    match destination.get_configuration(component_id, config_id).await {
        Ok(_) => Ok(true),
        Err(e) if e.is_not_found() => Ok(false),
        Err(e) => Err(e),
    }
}

/// Destination payload for a source configuration; never carries state
pub fn destination_configuration(
    source: &ComponentConfiguration,
    use_source_id: bool,
) -> NewConfiguration {
    NewConfiguration {
        configuration_id: use_source_id.then(|| source.id.clone()),
        name: source.name.clone(),
        description: source.description.clone(),
        configuration: source.configuration.clone(),
        state: None,
        change_description: change_description(&source.extra),
    }
}

/// Destination payload for a source row, stripped of source ids and state
pub fn destination_row(source: &ConfigurationRow, use_source_id: bool) -> NewConfigurationRow {
    let mut configuration = source.configuration.clone();
    if let Value::Object(payload) = &mut configuration {
        for key in ROW_PAYLOAD_SOURCE_KEYS {
            payload.remove(*key);
        }
    }

    NewConfigurationRow {
        row_id: use_source_id.then(|| source.id.clone()),
        name: source.name.clone(),
        description: source.description.clone(),
        configuration,
        state: None,
        change_description: change_description(&source.extra),
        is_disabled: source.is_disabled,
    }
}

fn change_description(extra: &Map<String, Value>) -> String {
    extra
        .get("changeDescription")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source_config() -> ComponentConfiguration {
        serde_json::from_value(json!({
            "id": "123",
            "name": "Orders",
            "description": "orders extractor",
            "configuration": {"parameters": {"db": "orders"}},
            "state": {"lastFetched": "2024-01-01"},
            "changeDescription": "Initial import"
        }))
        .unwrap()
    }

    fn source_row() -> ConfigurationRow {
        serde_json::from_value(json!({
            "id": "456",
            "name": "customers",
            "configuration": {"id": "456", "rowId": "456", "table": "customers"},
            "state": {"cursor": 99},
            "isDisabled": true
        }))
        .unwrap()
    }

    #[test]
    fn test_destination_configuration_keeps_source_id() {
        let new = destination_configuration(&source_config(), true);
        assert_eq!(new.configuration_id.as_deref(), Some("123"));
        assert_eq!(new.name, "Orders");
        assert_eq!(new.description, "orders extractor");
        assert_eq!(new.configuration, json!({"parameters": {"db": "orders"}}));
        assert_eq!(new.change_description, "Initial import");
        assert!(new.state.is_none());
    }

    #[test]
    fn test_destination_configuration_generated_id() {
        let new = destination_configuration(&source_config(), false);
        assert!(new.configuration_id.is_none());
        assert!(new.state.is_none());
    }

    #[test]
    fn test_destination_row_strips_source_fields() {
        let new = destination_row(&source_row(), true);
        assert_eq!(new.row_id.as_deref(), Some("456"));
        assert_eq!(new.configuration, json!({"table": "customers"}));
        assert!(new.state.is_none());
        assert!(new.is_disabled);

        let new = destination_row(&source_row(), false);
        assert!(new.row_id.is_none());
    }

    #[test]
    fn test_destination_row_non_object_payload() {
        let mut row = source_row();
        row.configuration = Value::Null;
        let new = destination_row(&row, false);
        assert_eq!(new.configuration, Value::Null);
    }

    #[test]
    fn test_default_options() {
        let options = MigrateOptions::default();
        assert!(!options.use_source_id);
        assert!(options.fail_on_existing);
    }
}
