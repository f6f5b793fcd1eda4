// Management API models: projects, organizations and storage tokens

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::string_or_number;

/// Storage token issued through the management API
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageToken {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub token: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub expires: Option<String>,
}

impl std::fmt::Debug for StorageToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageToken")
            .field("id", &self.id)
            .field("token", &"***")
            .field("description", &self.description)
            .field("expires", &self.expires)
            .finish()
    }
}

/// Request body for creating a project storage token
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRequest {
    pub description: String,
    pub can_manage_buckets: bool,
    pub can_read_all_file_uploads: bool,
    pub can_purge_trash: bool,
    pub can_manage_tokens: bool,
    pub bucket_permissions: HashMap<String, String>,
    pub expires_in: u64,
}

impl TokenRequest {
    /// Token with write access to every bucket, expiring after `expires_in` seconds
    pub fn bucket_writer(description: &str, expires_in: u64, manage_tokens: bool) -> Self {
        Self {
            description: description.to_string(),
            can_manage_buckets: true,
            can_read_all_file_uploads: false,
            can_purge_trash: false,
            can_manage_tokens: manage_tokens,
            bucket_permissions: HashMap::from([("*".to_string(), "write".to_string())]),
            expires_in,
        }
    }
}

/// Request body for creating a project
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProject {
    pub name: String,
    #[serde(rename = "type")]
    pub project_type: String,
    pub default_backend: String,
    pub region: String,
}

impl NewProject {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            project_type: "poc6months".to_string(),
            default_backend: "snowflake".to_string(),
            region: "us-east-1".to_string(),
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub region: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub projects: Vec<Project>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
