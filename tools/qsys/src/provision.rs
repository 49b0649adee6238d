//! The provision module owns the 'deploy' sequence: each resource is created from its section of
//! the config plus the IDs of the resources created before it.
//!
//! There's no cleanup if a step fails; anything already created stays in the account and has to
//! be removed by hand.

use crate::client::QBusiness;
use log::info;
use qsys_config::{ApplicationConfig, DataSourceConfig, DeployConfig, IndexConfig};
use serde::{Deserialize, Serialize};
use snafu::ensure;

/// IDs of everything created by a deployment, in the form written to the output file
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Deployment {
    pub(crate) application_id: String,
    pub(crate) index_id: String,
    pub(crate) data_source_id: String,
    pub(crate) execution_id: String,
}

/// Validates the config, then creates the application, index, and data source and starts the
/// first sync.  Nothing is sent to the service if validation fails.
pub(crate) async fn deploy<C>(client: &C, config: &DeployConfig) -> Result<Deployment>
where
    C: QBusiness + Sync + ?Sized,
{
    info!("Starting Amazon Q Business deployment...");
    ensure!(config.validate(), error::ValidationFailedSnafu);

    let application_id = create_application(client, &config.application).await?;
    let index_id = create_index(client, &application_id, &config.index).await?;
    let data_source_id =
        create_data_source(client, &application_id, &index_id, &config.data_source).await?;
    let execution_id =
        start_sync(client, &application_id, &index_id, &data_source_id).await?;

    let deployment = Deployment {
        application_id,
        index_id,
        data_source_id,
        execution_id,
    };
    info!("Deployment completed successfully!");
    info!("Resources created:");
    info!("  applicationId: {}", deployment.application_id);
    info!("  indexId: {}", deployment.index_id);
    info!("  dataSourceId: {}", deployment.data_source_id);
    info!("  executionId: {}", deployment.execution_id);
    Ok(deployment)
}

async fn create_application<C>(client: &C, application: &ApplicationConfig) -> Result<String>
where
    C: QBusiness + Sync + ?Sized,
{
    info!("Creating Amazon Q Business application...");
    let application_id = client.create_application(application).await?;
    info!("Application created with ID: {}", application_id);
    Ok(application_id)
}

async fn create_index<C>(client: &C, application_id: &str, index: &IndexConfig) -> Result<String>
where
    C: QBusiness + Sync + ?Sized,
{
    info!("Creating index...");
    let index_id = client.create_index(application_id, index).await?;
    info!("Index created with ID: {}", index_id);
    Ok(index_id)
}

async fn create_data_source<C>(
    client: &C,
    application_id: &str,
    index_id: &str,
    data_source: &DataSourceConfig,
) -> Result<String>
where
    C: QBusiness + Sync + ?Sized,
{
    info!("Creating S3 data source...");
    let data_source_id = client
        .create_data_source(application_id, index_id, data_source)
        .await?;
    info!("Data source created with ID: {}", data_source_id);
    Ok(data_source_id)
}

// The sync job runs asynchronously on the service side; we only report that it started.
async fn start_sync<C>(
    client: &C,
    application_id: &str,
    index_id: &str,
    data_source_id: &str,
) -> Result<String>
where
    C: QBusiness + Sync + ?Sized,
{
    info!("Starting data source synchronization...");
    let execution_id = client
        .start_data_source_sync_job(application_id, index_id, data_source_id)
        .await?;
    info!("Sync job started with execution ID: {}", execution_id);
    Ok(execution_id)
}

mod error {
    use crate::client;
    use snafu::Snafu;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)))]
    pub(crate) enum Error {
        #[snafu(display(
            "Configuration validation failed. Please fix the errors and try again."
        ))]
        ValidationFailed,

        #[snafu(context(false), display("Deployment failed: {}", source))]
        Client { source: client::Error },
    }
}
pub(crate) use error::Error;
type Result<T> = std::result::Result<T, error::Error>;

#[cfg(test)]
mod test {
    use super::{deploy, Deployment, Error};
    use crate::client::fake::{Call, FakeQBusiness};
    use qsys_config::DeployConfig;

    const CONFIG: &str = include_str!("../test_configs/config.json");

    fn config() -> DeployConfig {
        DeployConfig::from_json_str(CONFIG).unwrap()
    }

    #[tokio::test]
    async fn ids_are_chained_through_each_call() {
        let client = FakeQBusiness::default();
        let deployment = deploy(&client, &config()).await.unwrap();

        assert_eq!(
            deployment,
            Deployment {
                application_id: "A1".to_string(),
                index_id: "I1".to_string(),
                data_source_id: "D1".to_string(),
                execution_id: "E1".to_string(),
            }
        );
        assert_eq!(
            client.calls(),
            vec![
                Call::CreateApplication {
                    display_name: "RegulatoryDocsAssistant".to_string(),
                },
                Call::CreateIndex {
                    application_id: "A1".to_string(),
                },
                Call::CreateDataSource {
                    application_id: "A1".to_string(),
                    index_id: "I1".to_string(),
                },
                Call::StartSyncJob {
                    application_id: "A1".to_string(),
                    index_id: "I1".to_string(),
                    data_source_id: "D1".to_string(),
                },
            ]
        );
    }

    #[tokio::test]
    async fn invalid_config_makes_no_calls() {
        let client = FakeQBusiness::default();
        let mut config = config();
        config.data_source.role_arn = "arn:aws:iam::<YOUR-ACCOUNT>:role/QBusinessS3Role".into();

        let err = deploy(&client, &config).await.unwrap_err();
        assert!(matches!(err, Error::ValidationFailed));
        assert!(client.calls().is_empty());
    }

    #[tokio::test]
    async fn data_source_failure_stops_sync() {
        let client = FakeQBusiness::failing_data_source();
        let err = deploy(&client, &config()).await.unwrap_err();

        assert!(matches!(err, Error::Client { .. }));
        assert!(err.to_string().starts_with(
            "Deployment failed: Failed to create data source for application 'A1', index 'I1'"
        ));
        let calls = client.calls();
        assert_eq!(calls.len(), 3);
        assert!(!calls
            .iter()
            .any(|call| matches!(call, Call::StartSyncJob { .. })));
    }

    #[test]
    fn deployment_serializes_with_camel_case_keys() {
        let deployment = Deployment {
            application_id: "A1".to_string(),
            index_id: "I1".to_string(),
            data_source_id: "D1".to_string(),
            execution_id: "E1".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&deployment).unwrap(),
            serde_json::json!({
                "applicationId": "A1",
                "indexId": "I1",
                "dataSourceId": "D1",
                "executionId": "E1"
            })
        );
    }
}
