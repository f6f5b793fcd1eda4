// Model types for Keboola API requests and responses

pub mod configuration;
pub mod management;
pub mod orchestration;
pub mod storage;

pub use configuration::{
    ComponentConfiguration, ComponentInfo, ConfigurationRow, ConfigurationUpdate,
    NewConfiguration, NewConfigurationRow,
};
pub use management::{NewProject, Organization, Project, StorageToken, TokenRequest};
pub use orchestration::{Orchestration, SyrupJob};
pub use storage::{
    Bucket, FileInfo, JobStatus, NewBucket, NewTable, PreparedFile, SliceEntry, SlicedFileManifest,
    StorageJob, Table, UploadParams,
};

use serde::{Deserialize, Deserializer};

/// Ids come back as strings from the storage API and as numbers from syrup
/// and the management API; both are normalized to `String`.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Int(i64),
        Float(f64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Int(i) => i.to_string(),
        Id::Float(f) => f.to_string(),
    })
}

/// Treat an explicit `null` like a missing field
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
