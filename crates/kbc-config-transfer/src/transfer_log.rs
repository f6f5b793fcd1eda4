//! Output table of transferred configurations
//!
//! One CSV row per transferred item, flushed as soon as it is written, plus a
//! manifest declaring the primary key and incremental loading so repeated
//! runs append to the same table.

use std::fs::File;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Output columns in order
pub const LOG_COLUMNS: &[&str] = &[
    "project_id",
    "region",
    "src_cfg_id",
    "dst_cfg_id",
    "component_id",
    "time",
];

/// Primary key of the output table (every column except `time`)
pub const LOG_PRIMARY_KEY: &[&str] = &[
    "project_id",
    "region",
    "src_cfg_id",
    "dst_cfg_id",
    "component_id",
];

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferLogEntry {
    pub project_id: String,
    pub region: String,
    pub src_cfg_id: String,
    pub dst_cfg_id: String,
    pub component_id: String,
    /// RFC 3339 UTC timestamp
    pub time: String,
}

impl TransferLogEntry {
    pub fn new(
        project_id: &str,
        region: &str,
        src_cfg_id: &str,
        dst_cfg_id: &str,
        component_id: &str,
        time: DateTime<Utc>,
    ) -> Self {
        Self {
            project_id: project_id.to_string(),
            region: region.to_string(),
            src_cfg_id: src_cfg_id.to_string(),
            dst_cfg_id: dst_cfg_id.to_string(),
            component_id: component_id.to_string(),
            time: time.to_rfc3339_opts(SecondsFormat::Micros, true),
        }
    }
}

/// Manifest written next to an output table
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableManifest {
    pub primary_key: Vec<String>,
    pub incremental: bool,
}

impl TableManifest {
    pub fn transfer_log() -> Self {
        Self {
            primary_key: LOG_PRIMARY_KEY.iter().map(|c| c.to_string()).collect(),
            incremental: true,
        }
    }

    pub fn path_for(table_path: &Path) -> PathBuf {
        let mut name = table_path.as_os_str().to_owned();
        name.push(".manifest");
        PathBuf::from(name)
    }

    pub fn write_for(&self, table_path: &Path) -> Result<PathBuf> {
        let path = Self::path_for(table_path);
        let file = File::create(&path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(path)
    }
}

pub struct TransferLogWriter {
    writer: csv::Writer<File>,
}

impl TransferLogWriter {
    /// Create (or truncate) the output table and write its header
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)?;
        writer.write_record(LOG_COLUMNS)?;
        writer.flush()?;
        Ok(Self { writer })
    }

    pub fn append(&mut self, entry: &TransferLogEntry) -> Result<()> {
        self.writer.serialize(entry)?;
        self.writer.flush()?;
        Ok(())
    }
}
