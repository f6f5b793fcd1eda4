// Syrup orchestration and job models

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::string_or_number;

/// Orchestration as returned by the syrup orchestrator
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Orchestration {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    /// Task references are opaque to this client and passed through verbatim
    #[serde(default)]
    pub tasks: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request body for creating an orchestration
#[derive(Clone, Debug, Serialize)]
pub(crate) struct NewOrchestration<'a> {
    pub name: &'a str,
    pub tasks: &'a [Value],
}

/// Job created by the docker runner or the orchestrator
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyrupJob {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    /// Absolute URL of the job resource
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub status: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_orchestration_numeric_id() {
        let orchestration: Orchestration = serde_json::from_value(json!({
            "id": 987654,
            "name": "Nightly",
            "tasks": [{"component": "keboola.ex-db-mysql", "action": "run"}],
            "active": true
        }))
        .unwrap();

        assert_eq!(orchestration.id, "987654");
        assert_eq!(orchestration.tasks.len(), 1);
        assert_eq!(orchestration.extra["active"], true);
    }

    #[test]
    fn test_syrup_job() {
        let job: SyrupJob = serde_json::from_value(json!({
            "id": 1,
            "url": "https://syrup.keboola.com/queue/job/1",
            "status": "waiting"
        }))
        .unwrap();
        assert_eq!(job.id, "1");
        assert_eq!(job.status, "waiting");
    }
}
