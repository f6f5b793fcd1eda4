//! Input table driver
//!
//! Rows are processed strictly in input order. Each row resolves a storage
//! token for its destination project, then routes by component: legacy
//! orchestrations are cloned, everything else is migrated under the source
//! configuration id. The first error aborts the run; rows already logged stay
//! in the output table.

use std::path::Path;

use chrono::Utc;
use kbc_client::{KbcApiClient, StorageApi};
use serde::Deserialize;
use tracing::{debug, info};

use crate::bucket::{self, BucketTransferReport};
use crate::error::{Result, TransferError};
use crate::migrate::{MigrateOptions, migrate_configuration};
use crate::orchestration::clone_orchestration;
use crate::settings::Parameters;
use crate::token_cache::TokenCache;
use crate::transfer_log::{TableManifest, TransferLogEntry, TransferLogWriter};

/// Legacy orchestrations live in syrup and are cloned instead of migrated
pub const LEGACY_ORCHESTRATOR: &str = "orchestrator-legacy";
/// Input alias of the flow component
pub const FLOW_ALIAS: &str = "flow";
pub const FLOW_COMPONENT: &str = "keboola.orchestrator";

/// One input table row; extra columns are ignored
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct InputRow {
    pub project_id: String,
    pub component_id: String,
    pub configuration_id: String,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransferSummary {
    pub transferred: usize,
    pub skipped: usize,
}

/// Component id used in the destination project
pub fn destination_component(component_id: &str) -> &str {
    if component_id == FLOW_ALIAS {
        FLOW_COMPONENT
    } else {
        component_id
    }
}

pub struct TransferDriver {
    api: KbcApiClient,
    params: Parameters,
    tokens: TokenCache,
}

impl TransferDriver {
    pub fn new(api: KbcApiClient, params: Parameters) -> Self {
        Self {
            api,
            params,
            tokens: TokenCache::new(),
        }
    }

    pub fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    /// Transfer every row of the `input` table, logging transfers into `output`
    pub async fn run(&mut self, input: &Path, output: &Path) -> Result<TransferSummary> {
        if !input.is_file() {
            return Err(TransferError::MissingInputTable(input.to_path_buf()));
        }
        let rows = read_input(input)?;
        info!(rows = rows.len(), input = %input.display(), "Loaded input table");

        let mut log = TransferLogWriter::create(output)?;
        TableManifest::transfer_log().write_for(output)?;

        let mut summary = TransferSummary::default();
        for row in &rows {
            match self.transfer_row(row).await? {
                Some(entry) => {
                    log.append(&entry)?;
                    summary.transferred += 1;
                }
                None => summary.skipped += 1,
            }
        }

        info!(
            transferred = summary.transferred,
            skipped = summary.skipped,
            "Finished transfer"
        );
        Ok(summary)
    }

    /// Transfer one row; `None` when the destination already had it
    pub async fn transfer_row(&mut self, row: &InputRow) -> Result<Option<TransferLogEntry>> {
        let source = source_api(&self.api, &self.params)?;
        let destination =
            destination_api(&self.api, &mut self.tokens, &self.params, &row.project_id).await?;

        let (component_id, dst_cfg_id) = if row.component_id == LEGACY_ORCHESTRATOR {
            info!(
                project_id = %row.project_id,
                orchestration_id = %row.configuration_id,
                "Transferring orchestration"
            );
            let created = clone_orchestration(&source, &destination, &row.configuration_id).await?;
            (row.component_id.as_str(), created.id)
        } else {
            let component_id = destination_component(&row.component_id);
            info!(
                project_id = %row.project_id,
                component_id,
                config_id = %row.configuration_id,
                "Transferring configuration"
            );
            let options = MigrateOptions {
                use_source_id: true,
                fail_on_existing: false,
            };
            let migrated = migrate_configuration(
                &source,
                &destination,
                component_id,
                &row.configuration_id,
                options,
            )
            .await?;
            if !migrated {
                return Ok(None);
            }
            (component_id, row.configuration_id.clone())
        };

        Ok(Some(TransferLogEntry::new(
            &row.project_id,
            destination.region(),
            &row.configuration_id,
            &dst_cfg_id,
            component_id,
            Utc::now(),
        )))
    }

    /// Copy a bucket of the source project into project `project_id`
    pub async fn transfer_bucket(
        &mut self,
        project_id: &str,
        src_bucket_id: &str,
        dst_bucket_id: Option<&str>,
        tmp_dir: &Path,
    ) -> Result<BucketTransferReport> {
        let source = source_api(&self.api, &self.params)?;
        let destination =
            destination_api(&self.api, &mut self.tokens, &self.params, project_id).await?;
        bucket::transfer_bucket(&source, &destination, src_bucket_id, dst_bucket_id, tmp_dir).await
    }
}

fn source_api<'a>(api: &'a KbcApiClient, params: &Parameters) -> Result<StorageApi<'a>> {
    Ok(api.storage(&params.src_token, &params.src_region)?)
}

async fn destination_api<'a>(
    api: &'a KbcApiClient,
    tokens: &mut TokenCache,
    params: &Parameters,
    project_id: &str,
) -> Result<StorageApi<'a>> {
    let management = api.management(&params.api_token, &params.dst_region)?;
    let token = tokens.get_or_create(&management, project_id).await?;
    debug!(project_id, token_id = %token.id, "Using destination token");
    Ok(api.storage(&token.token, &params.dst_region)?)
}

fn read_input(path: &Path) -> Result<Vec<InputRow>> {
    let mut reader = csv::Reader::from_path(path)?;
    let rows = reader.deserialize().collect::<std::result::Result<Vec<InputRow>, _>>()?;
    Ok(rows)
}
