//! kbc-config-transfer - copies configurations between Keboola projects
//!
//! The transfer reads `(project_id, component_id, configuration_id)` rows and,
//! for each destination project, issues a storage token once, then either
//! migrates the configuration with its rows or clones a legacy orchestration.
//! Storage buckets can be copied table by table.

pub mod bucket;
pub mod driver;
pub mod error;
pub mod logging;
pub mod migrate;
pub mod orchestration;
pub mod settings;
pub mod token_cache;
pub mod transfer_log;

pub use driver::{TransferDriver, TransferSummary};
pub use error::{Result, TransferError};
pub use migrate::{MigrateOptions, migrate_configuration};
pub use orchestration::clone_orchestration;
pub use settings::{Parameters, Settings, SettingsError};
pub use token_cache::TokenCache;
