//! The client module owns the calls we make to the Q Business API.  Provisioning code talks to the
//! `QBusiness` trait so the sequence of calls can be exercised without AWS.

use crate::document::json_to_document;
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_qbusiness::types::{
    AttachmentsConfiguration, AttachmentsControlMode, AttributeType,
    DocumentAttributeConfiguration, IdentityType, IndexCapacityConfiguration, IndexStatus,
    IndexType, PersonalizationConfiguration, PersonalizationControlMode, QAppsConfiguration,
    QAppsControlMode, Status,
};
use aws_sdk_qbusiness::Client as QBusinessSdkClient;
use aws_types::region::Region;
use log::{debug, info};
use qsys_config::{ApplicationConfig, AwsConfig, DataSourceConfig, IndexConfig};
use snafu::{OptionExt, ResultExt};
use std::time::Duration;

// Document attributes can only be set once the index is active.  Max wait is 10 minutes (60
// attempts * 10s).
const INDEX_POLL_ATTEMPTS: u32 = 60;
const INDEX_POLL_INTERVAL: Duration = Duration::from_secs(10);

/// The four calls needed to stand up a searchable application.  Each returns the identifier the
/// service allocated.
#[async_trait]
pub(crate) trait QBusiness {
    async fn create_application(&self, application: &ApplicationConfig) -> Result<String>;

    async fn create_index(&self, application_id: &str, index: &IndexConfig) -> Result<String>;

    async fn create_data_source(
        &self,
        application_id: &str,
        index_id: &str,
        data_source: &DataSourceConfig,
    ) -> Result<String>;

    /// Starts ingestion; the returned execution ID identifies a job that keeps running after we
    /// return.
    async fn start_data_source_sync_job(
        &self,
        application_id: &str,
        index_id: &str,
        data_source_id: &str,
    ) -> Result<String>;
}

/// `QBusiness` backed by the AWS SDK
pub(crate) struct QBusinessClient {
    client: QBusinessSdkClient,
}

impl QBusinessClient {
    /// Builds an SDK client for the configured region, using the named profile if there is one.
    pub(crate) async fn new(aws: &AwsConfig) -> Self {
        let mut loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(aws.region.clone()));
        if let Some(profile) = &aws.profile {
            debug!("Using AWS profile '{}'", profile);
            loader = loader.profile_name(profile);
        }
        let sdk_config = loader.load().await;
        Self {
            client: QBusinessSdkClient::new(&sdk_config),
        }
    }

    /// Polls the index until it's active so it can be updated.
    async fn wait_for_index(&self, application_id: &str, index_id: &str) -> Result<()> {
        for _ in 0..INDEX_POLL_ATTEMPTS {
            let status = self
                .client
                .get_index()
                .application_id(application_id)
                .index_id(index_id)
                .send()
                .await
                .context(error::GetIndexSnafu { index_id })?
                .status
                .context(error::MissingFieldSnafu {
                    operation: "GetIndex",
                    field: "status",
                })?;
            match status {
                IndexStatus::Active => return Ok(()),
                IndexStatus::Failed => return error::IndexFailedSnafu { index_id }.fail(),
                _ => {
                    info!(
                        "Waiting for index to be ready, current status is '{}'...",
                        status.as_str()
                    );
                    tokio::time::sleep(INDEX_POLL_INTERVAL).await;
                }
            }
        }
        error::IndexTimeoutSnafu { index_id }.fail()
    }
}

#[async_trait]
impl QBusiness for QBusinessClient {
    async fn create_application(&self, application: &ApplicationConfig) -> Result<String> {
        let q_apps = QAppsConfiguration::builder()
            .q_apps_control_mode(QAppsControlMode::from(
                application.q_apps_configuration.q_apps_control_mode.as_str(),
            ))
            .build()
            .context(error::BuildRequestSnafu {
                what: "qAppsConfiguration",
            })?;
        let personalization = PersonalizationConfiguration::builder()
            .personalization_control_mode(PersonalizationControlMode::from(
                application
                    .personalization_configuration
                    .personalization_control_mode
                    .as_str(),
            ))
            .build()
            .context(error::BuildRequestSnafu {
                what: "personalizationConfiguration",
            })?;
        let attachments = AttachmentsConfiguration::builder()
            .attachments_control_mode(AttachmentsControlMode::from(
                application
                    .attachments_configuration
                    .attachments_control_mode
                    .as_str(),
            ))
            .build()
            .context(error::BuildRequestSnafu {
                what: "attachmentsConfiguration",
            })?;

        let identity_type = IdentityType::from(application.identity_type.as_str());
        let request = self
            .client
            .create_application()
            .display_name(&application.display_name)
            .description(&application.description)
            .identity_type(identity_type.clone())
            .q_apps_configuration(q_apps)
            .personalization_configuration(personalization)
            .attachments_configuration(attachments);
        // An IAM Identity Center instance is passed separately from IAM identity providers.
        let request = if identity_type == IdentityType::AwsIamIdc {
            request.identity_center_instance_arn(&application.iam_identity_provider_arn)
        } else {
            request.iam_identity_provider_arn(&application.iam_identity_provider_arn)
        };

        request
            .send()
            .await
            .context(error::CreateApplicationSnafu {
                display_name: &application.display_name,
            })?
            .application_id
            .context(error::MissingFieldSnafu {
                operation: "CreateApplication",
                field: "applicationId",
            })
    }

    async fn create_index(&self, application_id: &str, index: &IndexConfig) -> Result<String> {
        let mut request = self
            .client
            .create_index()
            .application_id(application_id)
            .display_name(&index.display_name)
            .description(&index.description)
            .r#type(IndexType::from(index.index_type.as_str()));
        if let Some(units) = index.capacity_configuration.units {
            request = request.capacity_configuration(
                IndexCapacityConfiguration::builder().units(units).build(),
            );
        }

        let index_id = request
            .send()
            .await
            .context(error::CreateIndexSnafu { application_id })?
            .index_id
            .context(error::MissingFieldSnafu {
                operation: "CreateIndex",
                field: "indexId",
            })?;

        if index.document_attribute_configurations.is_empty() {
            return Ok(index_id);
        }

        // CreateIndex doesn't accept document attributes, so they're set on the new index.
        let attributes = index
            .document_attribute_configurations
            .iter()
            .map(|attribute| {
                DocumentAttributeConfiguration::builder()
                    .name(&attribute.name)
                    .r#type(AttributeType::from(attribute.attribute_type.as_str()))
                    .search(Status::from(attribute.search.as_str()))
                    .build()
            })
            .collect::<Vec<_>>();
        self.wait_for_index(application_id, &index_id).await?;
        info!(
            "Configuring {} document attribute(s) on index {}",
            attributes.len(),
            index_id
        );
        self.client
            .update_index()
            .application_id(application_id)
            .index_id(&index_id)
            .set_document_attribute_configurations(Some(attributes))
            .send()
            .await
            .context(error::UpdateIndexSnafu {
                index_id: &index_id,
            })?;

        Ok(index_id)
    }

    async fn create_data_source(
        &self,
        application_id: &str,
        index_id: &str,
        data_source: &DataSourceConfig,
    ) -> Result<String> {
        let mut request = self
            .client
            .create_data_source()
            .application_id(application_id)
            .index_id(index_id)
            .display_name(&data_source.display_name)
            .description(&data_source.description)
            .configuration(json_to_document(&data_source.configuration))
            .role_arn(&data_source.role_arn);
        if let Some(schedule) = &data_source.sync_schedule {
            request = request.sync_schedule(schedule);
        }

        request
            .send()
            .await
            .context(error::CreateDataSourceSnafu {
                application_id,
                index_id,
            })?
            .data_source_id
            .context(error::MissingFieldSnafu {
                operation: "CreateDataSource",
                field: "dataSourceId",
            })
    }

    async fn start_data_source_sync_job(
        &self,
        application_id: &str,
        index_id: &str,
        data_source_id: &str,
    ) -> Result<String> {
        self.client
            .start_data_source_sync_job()
            .application_id(application_id)
            .index_id(index_id)
            .data_source_id(data_source_id)
            .send()
            .await
            .context(error::StartSyncJobSnafu { data_source_id })?
            .execution_id
            .context(error::MissingFieldSnafu {
                operation: "StartDataSourceSyncJob",
                field: "executionId",
            })
    }
}

pub(crate) mod error {
    use aws_sdk_qbusiness::error::SdkError;
    use aws_sdk_qbusiness::operation::{
        create_application::CreateApplicationError, create_data_source::CreateDataSourceError,
        create_index::CreateIndexError, get_index::GetIndexError,
        start_data_source_sync_job::StartDataSourceSyncJobError, update_index::UpdateIndexError,
    };
    use snafu::Snafu;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(crate)))]
    pub(crate) enum Error {
        #[snafu(display("Failed to build {}: {}", what, source))]
        BuildRequest {
            what: String,
            source: aws_sdk_qbusiness::error::BuildError,
        },

        #[snafu(display("Failed to create application '{}': {}", display_name, source))]
        CreateApplication {
            display_name: String,
            source: SdkError<CreateApplicationError>,
        },

        #[snafu(display(
            "Failed to create index for application '{}': {}",
            application_id,
            source
        ))]
        CreateIndex {
            application_id: String,
            source: SdkError<CreateIndexError>,
        },

        #[snafu(display(
            "Failed to create data source for application '{}', index '{}': {}",
            application_id,
            index_id,
            source
        ))]
        CreateDataSource {
            application_id: String,
            index_id: String,
            source: SdkError<CreateDataSourceError>,
        },

        #[snafu(display("Failed to fetch details of index '{}': {}", index_id, source))]
        GetIndex {
            index_id: String,
            source: SdkError<GetIndexError>,
        },

        #[snafu(display("Index '{}' reached FAILED status", index_id))]
        IndexFailed { index_id: String },

        #[snafu(display("Timed out waiting for index '{}' to become active", index_id))]
        IndexTimeout { index_id: String },

        #[snafu(display("Missing field '{}' in {} response", field, operation))]
        MissingField {
            operation: &'static str,
            field: &'static str,
        },

        #[snafu(display(
            "Failed to start sync job for data source '{}': {}",
            data_source_id,
            source
        ))]
        StartSyncJob {
            data_source_id: String,
            source: SdkError<StartDataSourceSyncJobError>,
        },

        #[snafu(display(
            "Failed to set document attributes on index '{}': {}",
            index_id,
            source
        ))]
        UpdateIndex {
            index_id: String,
            source: SdkError<UpdateIndexError>,
        },
    }
}
pub(crate) use error::Error;
pub(crate) type Result<T> = std::result::Result<T, error::Error>;
