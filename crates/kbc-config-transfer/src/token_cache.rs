//! Per-project storage token cache
//!
//! Tokens are issued through the management API the first time a destination
//! project is seen and reused for the rest of the run. They are never
//! persisted or refreshed; the expiry is long enough for one run.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use kbc_client::model::{StorageToken, TokenRequest};
use kbc_client::{ManagementApi, Result};
use tracing::info;

/// Description attached to every issued token
pub const TOKEN_DESCRIPTION: &str = "Sample Config provisioning";
/// Lifetime of issued tokens in seconds
pub const TOKEN_EXPIRES_IN_SECS: u64 = 1800;

/// Storage tokens keyed by (region, project id)
#[derive(Debug, Default)]
pub struct TokenCache {
    tokens: HashMap<(String, String), StorageToken>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached token of `project_id` in the management API's region,
    /// issuing one on first use
    pub async fn get_or_create(
        &mut self,
        management: &ManagementApi<'_>,
        project_id: &str,
    ) -> Result<&StorageToken> {
        let key = (
            management.region().to_ascii_uppercase(),
            project_id.to_string(),
        );

        match self.tokens.entry(key) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                info!(
                    project_id,
                    region = management.region(),
                    "Generating token for project"
                );
                let request =
                    TokenRequest::bucket_writer(TOKEN_DESCRIPTION, TOKEN_EXPIRES_IN_SECS, true);
                let token = management.create_token(project_id, &request).await?;
                Ok(entry.insert(token))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
