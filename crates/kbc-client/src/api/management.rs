// Management API endpoints: tokens, projects, organizations and users

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{info, warn};

use super::ManagementApi;
use crate::constants::manage_api_path;
use crate::error::{ApiError, Result};
use crate::model::{NewProject, Organization, Project, StorageToken, TokenRequest};

impl ManagementApi<'_> {
    /// Create a storage token in `project_id`.
    ///
    /// Transient failures (connection errors, timeouts, 408/429/5xx) are retried
    /// with exponential backoff up to the configured number of attempts.
    pub async fn create_token(&self, project_id: &str, request: &TokenRequest) -> Result<StorageToken> {
        let retry = &self.http.config().retry;
        let strategy = ExponentialBackoff::from_millis(2)
            .factor(retry.base_delay_ms.max(1) / 2)
            .max_delay(Duration::from_secs(60))
            .map(jitter)
            .take(retry.max_attempts.saturating_sub(1));

        let url = self.connection(&manage_api_path::project_tokens(project_id));

        RetryIf::spawn(
            strategy,
            || {
                self.http
                    .post_json::<StorageToken, _>(&url, &self.credentials, request)
            },
            |e: &ApiError| {
                let transient = e.is_transient();
                if transient {
                    warn!(project_id, error = %e, "Token creation failed, retrying");
                }
                transient
            },
        )
        .await
    }

    pub async fn create_project(&self, organization_id: &str, project: &NewProject) -> Result<Project> {
        info!(organization_id, name = %project.name, "Creating project");
        self.http
            .post_json(
                &self.connection(&manage_api_path::organization_projects(organization_id)),
                &self.credentials,
                project,
            )
            .await
    }

    pub async fn invite_user(&self, project_id: &str, email: &str) -> Result<()> {
        #[derive(Serialize)]
        struct Invitation<'a> {
            email: &'a str,
        }

        info!(project_id, email, "Inviting user to project");
        let _response: Value = self
            .http
            .post_json(
                &self.connection(&manage_api_path::project_users(project_id)),
                &self.credentials,
                &Invitation { email },
            )
            .await?;
        Ok(())
    }

    pub async fn get_organization(&self, organization_id: &str) -> Result<Organization> {
        self.http
            .get(
                &self.connection(&manage_api_path::organization(organization_id)),
                &self.credentials,
            )
            .await
    }
}
