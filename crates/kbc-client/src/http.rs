//! HTTP client with token authentication
//!
//! Every request carries either a storage token or a management token.
//! Any non-2xx response is turned into [`ApiError::RequestFailed`] so callers
//! can inspect the status (e.g. treat 404 as "does not exist").

use std::path::Path;
use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;
use tracing::{debug, error};

use crate::config::KbcClientConfig;
use crate::constants::{MANAGE_TOKEN_HEADER, STORAGE_TOKEN_HEADER};
use crate::error::{ApiError, Result};
use crate::region::Service;

/// Credential attached to a request
#[derive(Clone)]
pub enum Credentials {
    /// Project-scoped storage token
    Storage(String),
    /// Management token
    Manage(String),
}

impl Credentials {
    fn header(&self) -> (&'static str, &str) {
        match self {
            Credentials::Storage(token) => (STORAGE_TOKEN_HEADER, token),
            Credentials::Manage(token) => (MANAGE_TOKEN_HEADER, token),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Storage(_) => f.write_str("Storage(***)"),
            Credentials::Manage(_) => f.write_str("Manage(***)"),
        }
    }
}

/// HTTP client shared by all API wrappers
pub struct KbcHttpClient {
    client: Client,
    config: KbcClientConfig,
}

impl KbcHttpClient {
    /// Create a new HTTP client
    pub fn new(config: KbcClientConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_millis(config.connect_timeout_ms))
            .timeout(Duration::from_millis(config.read_timeout_ms))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &KbcClientConfig {
        &self.config
    }

    /// Resolve the base URL of a service, failing fast on unknown regions
    pub fn base_url(&self, service: Service, region: &str) -> Result<String> {
        self.config
            .regions
            .base_url(&self.config.url_template, service, region)
    }

    fn request(&self, method: Method, url: &str, credentials: &Credentials) -> RequestBuilder {
        let (name, value) = credentials.header();
        debug!("{} {}", method, url);
        self.client.request(method, url).header(name, value)
    }

    /// Make a GET request
    pub async fn get<T: DeserializeOwned>(&self, url: &str, credentials: &Credentials) -> Result<T> {
        self.send(url, self.request(Method::GET, url, credentials))
            .await
    }

    /// Make a GET request with query parameters
    pub async fn get_with_query<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        url: &str,
        credentials: &Credentials,
        query: &Q,
    ) -> Result<T> {
        self.send(url, self.request(Method::GET, url, credentials).query(query))
            .await
    }

    /// Make a POST request with form data
    pub async fn post_form<T: DeserializeOwned, F: Serialize + ?Sized>(
        &self,
        url: &str,
        credentials: &Credentials,
        form: &F,
    ) -> Result<T> {
        self.send(url, self.request(Method::POST, url, credentials).form(form))
            .await
    }

    /// Make a POST request with JSON body
    pub async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        url: &str,
        credentials: &Credentials,
        body: &B,
    ) -> Result<T> {
        self.send(url, self.request(Method::POST, url, credentials).json(body))
            .await
    }

    /// Make a POST request without a body
    pub async fn post_empty<T: DeserializeOwned>(
        &self,
        url: &str,
        credentials: &Credentials,
    ) -> Result<T> {
        self.send(url, self.request(Method::POST, url, credentials))
            .await
    }

    /// Make a PUT request with form data
    pub async fn put_form<T: DeserializeOwned, F: Serialize + ?Sized>(
        &self,
        url: &str,
        credentials: &Credentials,
        form: &F,
    ) -> Result<T> {
        self.send(url, self.request(Method::PUT, url, credentials).form(form))
            .await
    }

    /// GET a pre-signed URL and parse its JSON body; no token is sent
    pub async fn get_presigned<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        self.send(url, self.client.get(url)).await
    }

    /// Download a pre-signed URL into `path`, returning the number of bytes written
    pub async fn download_to_file(&self, url: &str, path: &Path) -> Result<u64> {
        let mut file = tokio::fs::File::create(path).await?;
        let written = self.download_into(url, &mut file).await?;
        file.flush().await?;
        debug!("Downloaded {} bytes into {}", written, path.display());
        Ok(written)
    }

    /// Stream a pre-signed URL to the end of an open file
    pub async fn download_into(&self, url: &str, file: &mut tokio::fs::File) -> Result<u64> {
        let mut response = self.check_status(url, self.client.get(url).send().await?).await?;
        let mut written = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        Ok(written)
    }

    /// Upload a local file with a presigned POST: the signed fields first, the file part last
    pub async fn upload_presigned_post(
        &self,
        url: &str,
        fields: Vec<(String, String)>,
        path: &Path,
    ) -> Result<()> {
        let file = tokio::fs::File::open(path).await?;
        let length = file.metadata().await?.len();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload".to_string());

        let mut form = Form::new();
        for (name, value) in fields {
            form = form.text(name, value);
        }
        let part = Part::stream_with_length(Body::from(file), length).file_name(file_name);
        form = form.part("file", part);

        debug!("Uploading {} bytes from {}", length, path.display());
        let response = self.client.post(url).multipart(form).send().await?;
        self.check_status(url, response).await?;
        Ok(())
    }

    async fn send<T: DeserializeOwned>(&self, url: &str, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        self.handle_response(url, response).await
    }

    /// Handle response and parse JSON
    async fn handle_response<T: DeserializeOwned>(&self, url: &str, response: Response) -> Result<T> {
        let response = self.check_status(url, response).await?;
        let body = response.bytes().await?;
        if body.is_empty() {
            // Some endpoints answer 204 / empty body; deserialize as JSON null
            return Ok(serde_json::from_value(serde_json::Value::Null)?);
        }
        Ok(serde_json::from_slice(&body)?)
    }

    async fn check_status(&self, url: &str, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        if status == StatusCode::NOT_FOUND {
            debug!("Request to {} returned 404", url);
        } else {
            error!("Request to {} failed with status {}: {}", url, status, body);
        }
        Err(ApiError::RequestFailed {
            url: url.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}
