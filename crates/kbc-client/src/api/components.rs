// Component configuration endpoints of the storage API

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::StorageApi;
use crate::constants::{STATE_UPDATE_DESCRIPTION, storage_api_path};
use crate::error::Result;
use crate::model::{
    ComponentConfiguration, ComponentInfo, ConfigurationRow, ConfigurationUpdate,
    NewConfiguration, NewConfigurationRow,
};

impl StorageApi<'_> {
    /// List components of the project together with their configurations
    pub async fn list_components(&self, component_type: Option<&str>) -> Result<Vec<ComponentInfo>> {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Query<'a> {
            #[serde(skip_serializing_if = "Option::is_none")]
            component_type: Option<&'a str>,
        }

        self.http
            .get_with_query(
                &self.connection(storage_api_path::COMPONENTS),
                &self.credentials,
                &Query { component_type },
            )
            .await
    }

    pub async fn list_configurations(
        &self,
        component_id: &str,
    ) -> Result<Vec<ComponentConfiguration>> {
        self.http
            .get(
                &self.connection(&storage_api_path::component_configs(component_id)),
                &self.credentials,
            )
            .await
    }

    pub async fn get_configuration(
        &self,
        component_id: &str,
        config_id: &str,
    ) -> Result<ComponentConfiguration> {
        self.http
            .get(
                &self.connection(&storage_api_path::component_config(component_id, config_id)),
                &self.credentials,
            )
            .await
    }

    pub async fn list_configuration_rows(
        &self,
        component_id: &str,
        config_id: &str,
    ) -> Result<Vec<ConfigurationRow>> {
        self.http
            .get(
                &self.connection(&storage_api_path::component_config_rows(
                    component_id,
                    config_id,
                )),
                &self.credentials,
            )
            .await
    }

    pub async fn create_configuration(
        &self,
        component_id: &str,
        config: &NewConfiguration,
    ) -> Result<ComponentConfiguration> {
        debug!(
            component_id,
            configuration_id = ?config.configuration_id,
            "Creating configuration"
        );
        self.http
            .post_form(
                &self.connection(&storage_api_path::component_configs(component_id)),
                &self.credentials,
                &config.to_form()?,
            )
            .await
    }

    pub async fn update_configuration(
        &self,
        component_id: &str,
        config_id: &str,
        update: &ConfigurationUpdate,
    ) -> Result<ComponentConfiguration> {
        self.http
            .put_form(
                &self.connection(&storage_api_path::component_config(component_id, config_id)),
                &self.credentials,
                &update.to_form(config_id)?,
            )
            .await
    }

    /// Replace the state of a configuration, leaving its payload untouched
    pub async fn update_configuration_state(
        &self,
        component_id: &str,
        config_id: &str,
        name: &str,
        state: &Value,
    ) -> Result<ComponentConfiguration> {
        let update = ConfigurationUpdate {
            name: name.to_string(),
            state: Some(state.clone()),
            change_description: STATE_UPDATE_DESCRIPTION.to_string(),
            ..Default::default()
        };
        self.update_configuration(component_id, config_id, &update)
            .await
    }

    pub async fn create_configuration_row(
        &self,
        component_id: &str,
        config_id: &str,
        row: &NewConfigurationRow,
    ) -> Result<ConfigurationRow> {
        debug!(component_id, config_id, row_id = ?row.row_id, "Creating configuration row");
        self.http
            .post_form(
                &self.connection(&storage_api_path::component_config_rows(
                    component_id,
                    config_id,
                )),
                &self.credentials,
                &row.to_form()?,
            )
            .await
    }
}
