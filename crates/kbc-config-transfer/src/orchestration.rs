//! Legacy orchestration cloning
//!
//! Orchestrations are read from the `orchestrator` component configuration and
//! recreated through syrup with the same name and tasks. Tasks are not
//! remapped, so the configurations they reference have to be migrated with
//! their source ids first. Every call creates a new orchestration.

use kbc_client::constants::ORCHESTRATOR_COMPONENT;
use kbc_client::model::Orchestration;
use kbc_client::{ApiError, Result, StorageApi};
use serde_json::Value;
use tracing::info;

pub async fn clone_orchestration(
    source: &StorageApi<'_>,
    destination: &StorageApi<'_>,
    orchestration_id: &str,
) -> Result<Orchestration> {
    let src_config = source
        .get_configuration(ORCHESTRATOR_COMPONENT, orchestration_id)
        .await?;

    let tasks = src_config
        .configuration
        .get("tasks")
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ApiError::UnexpectedResponse(format!(
                "orchestration {} has no task list",
                orchestration_id
            ))
        })?;

    let created = destination
        .create_orchestration(&src_config.name, tasks)
        .await?;
    info!(
        orchestration_id,
        new_orchestration_id = %created.id,
        tasks = tasks.len(),
        "Cloned orchestration"
    );
    Ok(created)
}
