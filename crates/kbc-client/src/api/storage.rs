// Bucket, table, file and job endpoints of the storage API

use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use super::StorageApi;
use crate::constants::storage_api_path;
use crate::error::{ApiError, Result};
use crate::model::{
    Bucket, FileInfo, JobStatus, NewBucket, NewTable, PreparedFile, SlicedFileManifest, StorageJob,
    Table,
};

impl StorageApi<'_> {
    pub async fn list_buckets(&self) -> Result<Vec<Bucket>> {
        self.http
            .get(&self.connection(storage_api_path::BUCKETS), &self.credentials)
            .await
    }

    pub async fn list_bucket_tables(&self, bucket_id: &str) -> Result<Vec<Table>> {
        self.http
            .get(
                &self.connection(&storage_api_path::bucket_tables(bucket_id)),
                &self.credentials,
            )
            .await
    }

    /// Table detail, including its column names
    pub async fn get_table(&self, table_id: &str) -> Result<Table> {
        self.http
            .get(&self.connection(&storage_api_path::table(table_id)), &self.credentials)
            .await
    }

    pub async fn create_bucket(&self, bucket: &NewBucket) -> Result<Bucket> {
        info!(name = %bucket.name, stage = %bucket.stage, "Creating bucket");
        self.http
            .post_form(
                &self.connection(storage_api_path::BUCKETS),
                &self.credentials,
                bucket,
            )
            .await
    }

    pub async fn get_job(&self, job_id: &str) -> Result<StorageJob> {
        self.http
            .get(&self.connection(&storage_api_path::job(job_id)), &self.credentials)
            .await
    }

    /// Poll a storage job until it finishes; a failed job becomes [`ApiError::JobFailed`]
    pub async fn wait_for_job(&self, job: StorageJob) -> Result<StorageJob> {
        let interval = Duration::from_millis(self.http.config().job_poll_interval_ms);
        let mut job = job;

        while !job.status.is_finished() {
            tokio::time::sleep(interval).await;
            job = self.get_job(&job.id).await?;
            debug!(job_id = %job.id, status = ?job.status, "Polled storage job");
        }

        if job.status == JobStatus::Error {
            return Err(ApiError::JobFailed {
                id: job.id.clone(),
                message: job.error_message(),
            });
        }
        Ok(job)
    }

    pub async fn get_file(&self, file_id: &str) -> Result<FileInfo> {
        self.http
            .get(&self.connection(&storage_api_path::file(file_id)), &self.credentials)
            .await
    }

    /// Export a table into an uncompressed storage file and return that file
    pub async fn export_table(&self, table_id: &str) -> Result<FileInfo> {
        #[derive(Serialize)]
        struct ExportForm {
            gzip: u8,
        }

        let job: StorageJob = self
            .http
            .post_form(
                &self.connection(&storage_api_path::table_export_async(table_id)),
                &self.credentials,
                &ExportForm { gzip: 0 },
            )
            .await?;
        let job = self.wait_for_job(job).await?;

        let file_id = job.result_file_id().ok_or_else(|| {
            ApiError::UnexpectedResponse(format!(
                "export job {} of table {} returned no file",
                job.id, table_id
            ))
        })?;
        self.get_file(&file_id).await
    }

    /// Export a table and download it to `path` as CSV with a header row.
    ///
    /// Sliced exports carry no header; it is written from the table columns,
    /// followed by every slice in manifest order.
    pub async fn download_table(&self, table_id: &str, path: &Path) -> Result<u64> {
        let file = self.export_table(table_id).await?;
        info!(table_id, path = %path.display(), sliced = file.is_sliced, "Downloading table");
        if !file.is_sliced {
            return self.http.download_to_file(&file.url, path).await;
        }

        let table = self.get_table(table_id).await?;
        let manifest: SlicedFileManifest = self.http.get_presigned(&file.url).await?;
        if let Some(entry) = manifest
            .entries
            .iter()
            .find(|e| !e.url.starts_with("https://") && !e.url.starts_with("http://"))
        {
            return Err(ApiError::UnexpectedResponse(format!(
                "slice {} of table {} is not downloadable over HTTP",
                entry.url, table_id
            )));
        }

        let header = csv_header(&table.columns)?;
        let mut out = tokio::fs::File::create(path).await?;
        out.write_all(&header).await?;
        let mut written = header.len() as u64;
        for entry in &manifest.entries {
            written += self.http.download_into(&entry.url, &mut out).await?;
        }
        out.flush().await?;

        debug!(table_id, slices = manifest.entries.len(), written, "Merged sliced export");
        Ok(written)
    }

    /// Reserve an upload slot for a file of `size_bytes`
    pub async fn prepare_file(&self, name: &str, size_bytes: u64) -> Result<PreparedFile> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct PrepareForm<'a> {
            name: &'a str,
            size_bytes: u64,
            notify: u8,
        }

        self.http
            .post_form(
                &self.connection(storage_api_path::FILES_PREPARE),
                &self.credentials,
                &PrepareForm {
                    name,
                    size_bytes,
                    notify: 0,
                },
            )
            .await
    }

    /// Upload a local file to storage and return its file id
    pub async fn upload_file(&self, path: &Path) -> Result<String> {
        let size_bytes = tokio::fs::metadata(path).await?.len();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());

        let prepared = self.prepare_file(&name, size_bytes).await?;
        self.http
            .upload_presigned_post(
                &prepared.upload_params.url,
                prepared.upload_params.form_fields(),
                path,
            )
            .await?;
        Ok(prepared.id)
    }

    /// Create a table in `bucket_id` from an uploaded file and wait for the job
    pub async fn create_table(&self, bucket_id: &str, table: &NewTable) -> Result<StorageJob> {
        info!(bucket_id, name = %table.name, "Creating table");
        let job: StorageJob = self
            .http
            .post_form(
                &self.connection(&storage_api_path::bucket_tables_async(bucket_id)),
                &self.credentials,
                &table.to_form(),
            )
            .await?;
        self.wait_for_job(job).await
    }
}

/// Header line with every column quoted, as the storage API writes it
fn csv_header(columns: &[String]) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(Vec::new());
    writer.write_record(columns).map_err(std::io::Error::from)?;
    writer
        .into_inner()
        .map_err(|e| ApiError::Io(e.into_error()))
}
