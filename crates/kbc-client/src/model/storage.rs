// Storage models: buckets, tables, files and asynchronous jobs

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::string_or_number;

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub stage: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Table {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub primary_key: Vec<String>,
    /// Only present in table detail responses
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows_count: Option<u64>,
}

#[derive(Clone, Debug, Serialize)]
pub struct NewBucket {
    pub name: String,
    pub stage: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Table created from a previously uploaded file
#[derive(Clone, Debug)]
pub struct NewTable {
    pub name: String,
    pub data_file_id: String,
    pub primary_key: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct NewTableForm<'a> {
    pub name: &'a str,
    pub data_file_id: &'a str,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub primary_key: String,
}

impl NewTable {
    pub(crate) fn to_form(&self) -> NewTableForm<'_> {
        NewTableForm {
            name: &self.name,
            data_file_id: &self.data_file_id,
            primary_key: self.primary_key.join(","),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Waiting,
    Processing,
    Success,
    Error,
    #[serde(other)]
    Unknown,
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Error)
    }
}

/// Asynchronous storage job
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageJob {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub status: JobStatus,
    #[serde(default)]
    pub results: Value,
    #[serde(default)]
    pub error: Option<Value>,
}

impl StorageJob {
    /// Id of the file produced by an export job
    pub fn result_file_id(&self) -> Option<String> {
        match self.results.get("file")?.get("id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn error_message(&self) -> String {
        self.error
            .as_ref()
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string()
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Pre-signed download URL; for sliced files, the URL of the slice manifest
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default)]
    pub is_sliced: bool,
}

/// Upload slot returned by `files/prepare`
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreparedFile {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub upload_params: UploadParams,
}

/// Presigned POST target: the object store URL plus the signed policy fields
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadParams {
    pub url: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Keys of `uploadParams` that are not form fields of the presigned POST
const NON_FORM_UPLOAD_KEYS: &[&str] = &["bucket", "credentials"];

impl UploadParams {
    /// Form fields to send ahead of the file part, in response order
    pub fn form_fields(&self) -> Vec<(String, String)> {
        self.extra
            .iter()
            .filter(|(key, _)| !NON_FORM_UPLOAD_KEYS.contains(&key.as_str()))
            .filter_map(|(key, value)| {
                let value = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => return None,
                };
                Some((key.clone(), value))
            })
            .collect()
    }
}

/// Manifest of a sliced file
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SlicedFileManifest {
    #[serde(default)]
    pub entries: Vec<SliceEntry>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SliceEntry {
    pub url: String,
}
