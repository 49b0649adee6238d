//! Checks that the placeholder values shipped in the sample config have been replaced before we
//! try to create anything.

use crate::DeployConfig;
use log::{error, info};

pub const ACCOUNT_PLACEHOLDER: &str = "<YOUR-ACCOUNT>";
pub const BUCKET_PLACEHOLDER: &str = "<YOUR-S3-BUCKET-NAME>";
pub const IDENTITY_CENTER_PLACEHOLDER: &str = "<YOUR-IAM-IDENTITY-CENTER-ARN>";
pub const IDENTITY_CENTER_ARN_PREFIX: &str = "arn:aws:sso:::instance/";

impl DeployConfig {
    /// Returns every problem found with the config values; an empty list means the config is
    /// ready to deploy.
    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.data_source.role_arn.contains(ACCOUNT_PLACEHOLDER) {
            errors.push(format!(
                "Please replace '{}' in dataSource.roleArn with your actual AWS account ID",
                ACCOUNT_PLACEHOLDER
            ));
        }

        match self.data_source.bucket_name() {
            Some(BUCKET_PLACEHOLDER) => errors.push(format!(
                "Please replace '{}' in dataSource.configuration.additionalProperties.bucketName \
                 with your actual S3 bucket name",
                BUCKET_PLACEHOLDER
            )),
            Some(_) => {}
            None => errors.push(
                "Missing dataSource.configuration.additionalProperties.bucketName".to_string(),
            ),
        }

        let identity_arn = &self.application.iam_identity_provider_arn;
        if identity_arn == IDENTITY_CENTER_PLACEHOLDER {
            errors.push(format!(
                "Please replace '{}' in application.iamIdentityProviderArn with your actual IAM \
                 Identity Center ARN",
                IDENTITY_CENTER_PLACEHOLDER
            ));
        }
        if !identity_arn.starts_with(IDENTITY_CENTER_ARN_PREFIX) {
            errors.push("Invalid iamIdentityProviderArn format".to_string());
        }

        errors
    }

    /// Logs every validation error and returns false if there were any.  Failing validation isn't
    /// an error in itself; the caller decides whether to stop.
    pub fn validate(&self) -> bool {
        let errors = self.validation_errors();
        if errors.is_empty() {
            info!("Configuration validation passed");
            return true;
        }

        error!("Configuration validation errors:");
        for e in &errors {
            error!("  - {}", e);
        }
        false
    }
}
