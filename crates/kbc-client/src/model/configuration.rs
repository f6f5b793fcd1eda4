// Component configuration and configuration row models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{null_as_default, string_or_number};

/// Component entry from the project component listing
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInfo {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub component_type: String,
    #[serde(default)]
    pub configurations: Vec<ComponentConfiguration>,
}

/// Full component configuration as returned by the storage API
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentConfiguration {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub configuration: Value,
    #[serde(default)]
    pub state: Value,
    #[serde(default)]
    pub rows: Vec<ConfigurationRow>,
    #[serde(default)]
    pub is_disabled: bool,
    /// Everything else the API returns (version, created, creatorToken, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Configuration row as returned by the storage API
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigurationRow {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub configuration: Value,
    #[serde(default)]
    pub state: Value,
    #[serde(default)]
    pub is_disabled: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payload for creating a configuration
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewConfiguration {
    /// Explicit id to create the configuration under; generated by the API when `None`
    pub configuration_id: Option<String>,
    pub name: String,
    pub description: String,
    pub configuration: Value,
    pub state: Option<Value>,
    pub change_description: String,
}

/// Payload for creating a configuration row
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NewConfigurationRow {
    pub row_id: Option<String>,
    pub name: String,
    pub description: String,
    pub configuration: Value,
    pub state: Option<Value>,
    pub change_description: String,
    pub is_disabled: bool,
}

/// Payload for updating an existing configuration
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigurationUpdate {
    pub name: String,
    pub description: String,
    /// Left untouched by the API when `None`
    pub configuration: Option<Value>,
    pub state: Option<Value>,
    pub change_description: String,
}

/// Form body shared by configuration create/update; payloads travel as JSON strings
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfigurationForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration: Option<String>,
    pub name: String,
    pub description: String,
    pub change_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ConfigurationRowForm {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_id: Option<String>,
    pub configuration: String,
    pub name: String,
    pub description: String,
    pub change_description: String,
    pub is_disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl NewConfiguration {
    pub(crate) fn to_form(&self) -> serde_json::Result<ConfigurationForm> {
        Ok(ConfigurationForm {
            configuration_id: self.configuration_id.clone(),
            configuration: Some(serde_json::to_string(&self.configuration)?),
            name: self.name.clone(),
            description: self.description.clone(),
            change_description: self.change_description.clone(),
            state: encode_state(self.state.as_ref())?,
        })
    }
}

impl NewConfigurationRow {
    pub(crate) fn to_form(&self) -> serde_json::Result<ConfigurationRowForm> {
        Ok(ConfigurationRowForm {
            row_id: self.row_id.clone(),
            configuration: serde_json::to_string(&self.configuration)?,
            name: self.name.clone(),
            description: self.description.clone(),
            change_description: self.change_description.clone(),
            is_disabled: self.is_disabled,
            state: encode_state(self.state.as_ref())?,
        })
    }
}

impl ConfigurationUpdate {
    pub(crate) fn to_form(&self, configuration_id: &str) -> serde_json::Result<ConfigurationForm> {
        Ok(ConfigurationForm {
            configuration_id: Some(configuration_id.to_string()),
            configuration: self
                .configuration
                .as_ref()
                .map(serde_json::to_string)
                .transpose()?,
            name: self.name.clone(),
            description: self.description.clone(),
            change_description: self.change_description.clone(),
            state: self.state.as_ref().map(serde_json::to_string).transpose()?,
        })
    }
}

// Empty states are not worth sending on create
fn encode_state(state: Option<&Value>) -> serde_json::Result<Option<String>> {
    match state {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) if map.is_empty() => Ok(None),
        Some(value) => serde_json::to_string(value).map(Some),
    }
}
