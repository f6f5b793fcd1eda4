//! Region to API host resolution
//!
//! Every stack of the platform is reachable under `https://<service><suffix>`,
//! where the suffix depends on the region code (e.g. `EU` maps to
//! `.eu-central-1.keboola.com`). Additional stacks can be supplied at
//! construction time; the map never changes afterwards.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{ApiError, Result};

/// Built-in region codes and their host suffixes
pub const DEFAULT_SUFFIXES: &[(&str, &str)] = &[
    ("US", ".keboola.com"),
    ("EU", ".eu-central-1.keboola.com"),
    ("AZURE-EU", ".north-europe.azure.keboola.com"),
    ("GCP-US", ".us-east4.gcp.keboola.com"),
    ("GCP-EU", ".europe-west3.gcp.keboola.com"),
];

/// Template placeholder replaced by the service host prefix
pub const SERVICE_PLACEHOLDER: &str = "{service}";
/// Template placeholder replaced by the region suffix
pub const SUFFIX_PLACEHOLDER: &str = "{suffix}";

/// Platform services addressed by host prefix
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Service {
    /// Storage and management API
    Connection,
    /// Orchestrator and docker runner
    Syrup,
}

impl Service {
    pub fn host_prefix(&self) -> &'static str {
        match self {
            Service::Connection => "connection",
            Service::Syrup => "syrup",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.host_prefix())
    }
}

/// Immutable mapping of region codes to host suffixes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionMap {
    suffixes: BTreeMap<String, String>,
}

impl Default for RegionMap {
    fn default() -> Self {
        Self::from_entries(
            DEFAULT_SUFFIXES
                .iter()
                .map(|(region, suffix)| (region.to_string(), suffix.to_string())),
        )
    }
}

impl RegionMap {
    /// Build a map from the given entries only
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let suffixes = entries
            .into_iter()
            .map(|(region, suffix)| (normalize(&region), suffix))
            .collect();
        Self { suffixes }
    }

    /// Default stacks with `extra` entries layered on top (later wins)
    pub fn with_overrides<I>(extra: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut map = Self::default();
        for (region, suffix) in extra {
            map.suffixes.insert(normalize(&region), suffix);
        }
        map
    }

    pub fn suffix(&self, region: &str) -> Result<&str> {
        self.suffixes
            .get(&normalize(region))
            .map(String::as_str)
            .ok_or_else(|| ApiError::UnknownRegion {
                region: region.to_string(),
                known: self.regions().collect::<Vec<_>>().join(", "),
            })
    }

    pub fn contains(&self, region: &str) -> bool {
        self.suffixes.contains_key(&normalize(region))
    }

    pub fn regions(&self) -> impl Iterator<Item = &str> {
        self.suffixes.keys().map(String::as_str)
    }

    /// Resolve the base URL of `service` in `region` using `template`
    pub fn base_url(&self, template: &str, service: Service, region: &str) -> Result<String> {
        let suffix = self.suffix(region)?;
        Ok(template
            .replace(SERVICE_PLACEHOLDER, service.host_prefix())
            .replace(SUFFIX_PLACEHOLDER, suffix)
            .trim_end_matches('/')
            .to_string())
    }
}

fn normalize(region: &str) -> String {
    region.trim().to_ascii_uppercase()
}
