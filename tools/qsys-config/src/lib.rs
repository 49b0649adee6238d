//! The config module owns the definition and loading process for the Q Business deployment
//! configuration file.
pub mod validate;

use log::info;
use serde::{Deserialize, Serialize};
use snafu::{ensure, OptionExt, ResultExt};
use std::fs;
use std::path::Path;

/// Top-level sections that must be present in the config file, in the order they're checked.
pub const REQUIRED_SECTIONS: [&str; 4] = ["aws", "application", "index", "dataSource"];

/// Everything needed to create a Q Business application, its index and data source, and start the
/// first sync
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DeployConfig {
    pub aws: AwsConfig,
    pub application: ApplicationConfig,
    pub index: IndexConfig,
    pub data_source: DataSourceConfig,
}

impl DeployConfig {
    /// Deserializes a DeployConfig from a given path
    pub fn from_path<P>(path: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        let path = path.as_ref();
        ensure!(path.exists(), error::FileNotFoundSnafu { path });
        let config_str = fs::read_to_string(path).context(error::FileSnafu { path })?;
        let config = Self::from_json_str(&config_str).context(error::LoadSnafu { path })?;
        info!("Configuration loaded successfully from {}", path.display());
        Ok(config)
    }

    /// Parses a DeployConfig from JSON text. Sections are checked for presence before the
    /// document is converted, so a missing section is reported by name rather than as a generic
    /// deserialization failure.
    pub fn from_json_str(config_str: &str) -> std::result::Result<Self, ParseError> {
        let document: serde_json::Value =
            serde_json::from_str(config_str).context(error::InvalidJsonSnafu)?;
        let sections = document.as_object().context(error::NotAnObjectSnafu)?;
        for section in REQUIRED_SECTIONS {
            ensure!(
                sections.contains_key(section),
                error::MissingSectionSnafu { section }
            );
        }
        serde_json::from_value(document).context(error::InvalidConfigSnafu)
    }
}

/// AWS-specific configuration
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct AwsConfig {
    pub region: String,
    // Named profile from the shared AWS config files; the default credentials chain is used
    // otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

/// Settings for the CreateApplication call
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationConfig {
    pub display_name: String,
    pub description: String,
    pub identity_type: String,
    pub iam_identity_provider_arn: String,
    pub q_apps_configuration: QAppsConfig,
    pub personalization_configuration: PersonalizationConfig,
    pub attachments_configuration: AttachmentsConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QAppsConfig {
    pub q_apps_control_mode: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PersonalizationConfig {
    pub personalization_control_mode: String,
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentsConfig {
    pub attachments_control_mode: String,
}

/// Settings for the CreateIndex call
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct IndexConfig {
    pub display_name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub index_type: String,
    #[serde(default)]
    pub capacity_configuration: CapacityConfig,
    #[serde(default)]
    pub document_attribute_configurations: Vec<DocumentAttributeConfig>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct CapacityConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<i32>,
}

/// A document attribute the index should know about, e.g. `{"name": "_category", "type":
/// "STRING", "search": "ENABLED"}`
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct DocumentAttributeConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub attribute_type: String,
    pub search: String,
}

/// Settings for the CreateDataSource call
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DataSourceConfig {
    pub display_name: String,
    pub description: String,
    // The connector configuration is owned by the service; we pass it through untouched.
    pub configuration: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sync_schedule: Option<String>,
    pub role_arn: String,
}

impl DataSourceConfig {
    /// The S3 bucket the connector reads from, if the connector configuration names one.
    pub fn bucket_name(&self) -> Option<&str> {
        self.configuration
            .pointer("/additionalProperties/bucketName")
            .and_then(serde_json::Value::as_str)
    }
}

mod error {
    use snafu::Snafu;
    use std::io;
    use std::path::PathBuf;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)))]
    pub enum Error {
        #[snafu(display("Configuration file '{}' not found", path.display()))]
        FileNotFound { path: PathBuf },

        #[snafu(display("Failed to read '{}': {}", path.display(), source))]
        File { path: PathBuf, source: io::Error },

        #[snafu(display("Error loading configuration from '{}': {}", path.display(), source))]
        Load { path: PathBuf, source: ParseError },
    }

    /// Problems with the contents of a config document, independent of where it came from
    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)))]
    pub enum ParseError {
        #[snafu(display("Invalid JSON in configuration file: {}", source))]
        InvalidJson { source: serde_json::Error },

        #[snafu(display("Invalid JSON in configuration file: top level must be an object"))]
        NotAnObject,

        #[snafu(display("Missing required configuration section: {}", section))]
        MissingSection { section: String },

        #[snafu(display("Invalid configuration: {}", source))]
        InvalidConfig { source: serde_json::Error },
    }
}
pub use error::{Error, ParseError};
pub type Result<T> = std::result::Result<T, error::Error>;
