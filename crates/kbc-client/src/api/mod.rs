//! Typed API surface
//!
//! [`KbcApiClient`] owns the HTTP client and hands out region-bound views:
//! - [`StorageApi`]: storage + syrup endpoints of one project (storage token)
//! - [`ManagementApi`]: management endpoints of one stack (management token)
//!
//! Both views resolve their base URLs on creation, so an unknown region fails
//! before any request is sent.

mod components;
mod management;
mod storage;
mod syrup;

use crate::config::KbcClientConfig;
use crate::error::Result;
use crate::http::{Credentials, KbcHttpClient};
use crate::region::Service;

/// Facade for all Keboola API operations
pub struct KbcApiClient {
    http_client: KbcHttpClient,
}

impl KbcApiClient {
    /// Create a new KbcApiClient with the given configuration
    pub fn new(config: KbcClientConfig) -> Result<Self> {
        Ok(Self {
            http_client: KbcHttpClient::new(config)?,
        })
    }

    pub fn http(&self) -> &KbcHttpClient {
        &self.http_client
    }

    /// Storage and syrup endpoints of the project owning `token`
    pub fn storage(&self, token: &str, region: &str) -> Result<StorageApi<'_>> {
        Ok(StorageApi {
            http: &self.http_client,
            credentials: Credentials::Storage(token.to_string()),
            region: region.to_string(),
            connection_url: self.http_client.base_url(Service::Connection, region)?,
            syrup_url: self.http_client.base_url(Service::Syrup, region)?,
        })
    }

    /// Management endpoints of the stack in `region`
    pub fn management(&self, manage_token: &str, region: &str) -> Result<ManagementApi<'_>> {
        Ok(ManagementApi {
            http: &self.http_client,
            credentials: Credentials::Manage(manage_token.to_string()),
            region: region.to_string(),
            connection_url: self.http_client.base_url(Service::Connection, region)?,
        })
    }
}

/// Storage token bound view of one project
pub struct StorageApi<'a> {
    http: &'a KbcHttpClient,
    credentials: Credentials,
    region: String,
    connection_url: String,
    syrup_url: String,
}

impl StorageApi<'_> {
    pub fn region(&self) -> &str {
        &self.region
    }

    fn connection(&self, path: &str) -> String {
        format!("{}{}", self.connection_url, path)
    }

    fn syrup(&self, path: &str) -> String {
        format!("{}{}", self.syrup_url, path)
    }
}

/// Management token bound view of one stack
pub struct ManagementApi<'a> {
    http: &'a KbcHttpClient,
    credentials: Credentials,
    region: String,
    connection_url: String,
}

impl ManagementApi<'_> {
    pub fn region(&self) -> &str {
        &self.region
    }

    fn connection(&self, path: &str) -> String {
        format!("{}{}", self.connection_url, path)
    }
}
