//! kbc-client - HTTP client for the Keboola Connection APIs
//!
//! This crate provides:
//! - Region to host-suffix resolution for every supported stack
//! - An HTTP client that authenticates with storage or management tokens
//! - Typed wrappers for the storage, syrup and management endpoints
//! - Model types for configurations, orchestrations, buckets and jobs

pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod http;
pub mod model;
pub mod region;

pub use api::{KbcApiClient, ManagementApi, StorageApi};
pub use config::{KbcClientConfig, RetryConfig};
pub use error::{ApiError, Result};
pub use http::{Credentials, KbcHttpClient};
pub use region::{RegionMap, Service};
