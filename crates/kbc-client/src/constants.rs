// REST path constants for the Keboola Connection, syrup and management APIs

/// Header carrying a project storage token
pub const STORAGE_TOKEN_HEADER: &str = "X-StorageApi-Token";
/// Header carrying a management token
pub const MANAGE_TOKEN_HEADER: &str = "X-KBC-ManageApiToken";

pub mod storage_api_path {
    // Components and configurations
    pub const COMPONENTS: &str = "/v2/storage/components";

    pub fn component_configs(component_id: &str) -> String {
        format!("{}/{}/configs", COMPONENTS, component_id)
    }

    pub fn component_config(component_id: &str, config_id: &str) -> String {
        format!("{}/{}", component_configs(component_id), config_id)
    }

    pub fn component_config_rows(component_id: &str, config_id: &str) -> String {
        format!("{}/rows", component_config(component_id, config_id))
    }

    // Buckets and tables
    pub const BUCKETS: &str = "/v2/storage/buckets";

    pub fn bucket_tables(bucket_id: &str) -> String {
        format!("{}/{}/tables", BUCKETS, bucket_id)
    }

    pub fn bucket_tables_async(bucket_id: &str) -> String {
        format!("{}/{}/tables-async", BUCKETS, bucket_id)
    }

    pub fn table(table_id: &str) -> String {
        format!("/v2/storage/tables/{}", table_id)
    }

    pub fn table_export_async(table_id: &str) -> String {
        format!("/v2/storage/tables/{}/export-async", table_id)
    }

    // Files and jobs
    pub const FILES_PREPARE: &str = "/v2/storage/files/prepare";

    pub fn file(file_id: &str) -> String {
        format!("/v2/storage/files/{}", file_id)
    }

    pub fn job(job_id: &str) -> String {
        format!("/v2/storage/jobs/{}", job_id)
    }
}

pub mod syrup_api_path {
    pub const ORCHESTRATIONS: &str = "/orchestrator/orchestrations";

    pub fn orchestration_jobs(orchestration_id: &str) -> String {
        format!("{}/{}/jobs", ORCHESTRATIONS, orchestration_id)
    }

    pub fn docker_run(component_id: &str) -> String {
        format!("/docker/{}/run", component_id)
    }
}

pub mod manage_api_path {
    pub fn project_tokens(project_id: &str) -> String {
        format!("/manage/projects/{}/tokens", project_id)
    }

    pub fn project_users(project_id: &str) -> String {
        format!("/manage/projects/{}/users", project_id)
    }

    pub fn organization(organization_id: &str) -> String {
        format!("/manage/organizations/{}", organization_id)
    }

    pub fn organization_projects(organization_id: &str) -> String {
        format!("{}/projects", organization(organization_id))
    }
}

/// Component id of the legacy orchestrator, whose configurations back syrup orchestrations
pub const ORCHESTRATOR_COMPONENT: &str = "orchestrator";

/// Change description sent with state updates
pub const STATE_UPDATE_DESCRIPTION: &str = "Update state";
