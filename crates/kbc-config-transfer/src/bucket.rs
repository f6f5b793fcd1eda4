//! Storage bucket transfer
//!
//! Tables are copied one by one: export from the source project into a local
//! CSV temp file, upload into the destination project, create the table
//! with the same primary key, remove the temp file. Tables already present in
//! the destination bucket are skipped without comparing their contents.

use std::collections::HashSet;
use std::path::Path;

use kbc_client::StorageApi;
use kbc_client::model::{NewBucket, NewTable};
use tracing::info;

use crate::error::{Result, TransferError};

/// Outcome of a bucket transfer, by destination table id
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BucketTransferReport {
    pub transferred: Vec<String>,
    pub skipped: Vec<String>,
}

/// Copy every table of `src_bucket_id` into `dest_bucket_id` (defaults to the same id).
///
/// There is no transactionality: a failure leaves the tables copied so far in
/// place, and a rerun skips them.
pub async fn transfer_bucket(
    source: &StorageApi<'_>,
    destination: &StorageApi<'_>,
    src_bucket_id: &str,
    dest_bucket_id: Option<&str>,
    tmp_dir: &Path,
) -> Result<BucketTransferReport> {
    let new_bucket_id = dest_bucket_id.unwrap_or(src_bucket_id);

    info!(bucket_id = src_bucket_id, "Getting tables from bucket");
    let tables = source.list_bucket_tables(src_bucket_id).await?;

    let mut bucket_exists = destination
        .list_buckets()
        .await?
        .iter()
        .any(|b| b.id == new_bucket_id);
    let mut existing: HashSet<String> = if bucket_exists {
        destination
            .list_bucket_tables(new_bucket_id)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect()
    } else {
        HashSet::new()
    };

    tokio::fs::create_dir_all(tmp_dir).await?;
    let mut report = BucketTransferReport::default();

    for table in tables {
        let new_table_id = destination_table_id(&table.id, src_bucket_id, new_bucket_id);
        if existing.contains(&new_table_id) {
            info!(table_id = %new_table_id, "Table already exists in destination bucket, skipping");
            report.skipped.push(new_table_id);
            continue;
        }

        let new_bucket = if bucket_exists {
            None
        } else {
            Some(new_bucket_request(new_bucket_id)?)
        };

        let local = tempfile::Builder::new()
            .prefix(&format!("{}.", table.id))
            .suffix(".csv")
            .tempfile_in(tmp_dir)?;
        source.download_table(&table.id, local.path()).await?;

        if let Some(bucket) = new_bucket {
            info!(bucket_id = new_bucket_id, "Creating new bucket in destination project");
            destination.create_bucket(&bucket).await?;
            bucket_exists = true;
        }

        info!(table_id = %table.id, new_table_id = %new_table_id, "Creating table in the destination project");
        let data_file_id = destination.upload_file(local.path()).await?;
        destination
            .create_table(
                new_bucket_id,
                &NewTable {
                    name: table.name.clone(),
                    data_file_id,
                    primary_key: table.primary_key.clone(),
                },
            )
            .await?;

        local.close()?;
        existing.insert(new_table_id.clone());
        report.transferred.push(new_table_id);
    }

    info!(
        transferred = report.transferred.len(),
        skipped = report.skipped.len(),
        "Finished bucket transfer"
    );
    Ok(report)
}

/// Table id with the source bucket prefix replaced by the destination bucket id
pub fn destination_table_id(table_id: &str, src_bucket_id: &str, dest_bucket_id: &str) -> String {
    match table_id.strip_prefix(src_bucket_id) {
        Some(rest) => format!("{}{}", dest_bucket_id, rest),
        None => table_id.replace(src_bucket_id, dest_bucket_id),
    }
}

/// Bucket creation request for an id of the form `<stage>.c-<name>`
pub fn new_bucket_request(bucket_id: &str) -> Result<NewBucket> {
    let (stage, name) = bucket_id
        .split_once('.')
        .ok_or_else(|| TransferError::InvalidBucketId(bucket_id.to_string()))?;
    let name = name.strip_prefix("c-").unwrap_or(name);

    if stage.is_empty() || name.is_empty() {
        return Err(TransferError::InvalidBucketId(bucket_id.to_string()));
    }

    Ok(NewBucket {
        name: name.to_string(),
        stage: stage.to_string(),
        description: None,
    })
}
