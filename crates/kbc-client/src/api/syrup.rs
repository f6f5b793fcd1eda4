// Syrup endpoints: orchestrations and the docker runner

use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::StorageApi;
use crate::constants::syrup_api_path;
use crate::error::Result;
use crate::model::orchestration::NewOrchestration;
use crate::model::{Orchestration, SyrupJob};

impl StorageApi<'_> {
    /// Create an orchestration with the given tasks, passed through verbatim
    pub async fn create_orchestration(&self, name: &str, tasks: &[Value]) -> Result<Orchestration> {
        self.http
            .post_json(
                &self.syrup(syrup_api_path::ORCHESTRATIONS),
                &self.credentials,
                &NewOrchestration { name, tasks },
            )
            .await
    }

    pub async fn list_orchestrations(&self) -> Result<Vec<Orchestration>> {
        self.http
            .get(&self.syrup(syrup_api_path::ORCHESTRATIONS), &self.credentials)
            .await
    }

    /// Trigger a job of an existing orchestration
    pub async fn run_orchestration(&self, orchestration_id: &str) -> Result<SyrupJob> {
        info!(orchestration_id, "Triggering orchestration job");
        self.http
            .post_empty(
                &self.syrup(&syrup_api_path::orchestration_jobs(orchestration_id)),
                &self.credentials,
            )
            .await
    }

    /// Run a component configuration through the docker runner
    pub async fn run_configuration(&self, component_id: &str, config_id: &str) -> Result<SyrupJob> {
        #[derive(Serialize)]
        struct RunRequest<'a> {
            config: &'a str,
        }

        info!(component_id, config_id, "Running configuration");
        self.http
            .post_json(
                &self.syrup(&syrup_api_path::docker_run(component_id)),
                &self.credentials,
                &RunRequest { config: config_id },
            )
            .await
    }

    /// Fetch a job by its absolute URL (as returned in [`SyrupJob::url`])
    pub async fn get_job_status(&self, job_url: &str) -> Result<SyrupJob> {
        self.http.get(job_url, &self.credentials).await
    }
}
