/*!
`qsys` stands up an Amazon Q Business application for querying a bucket of documents.

Currently implemented:
* validating the deployment config, catching placeholder values left over from the sample
* creating the application, its index, and an S3 data source
* starting the first data source sync
* writing the IDs of everything created to a JSON file

Configuration comes from:
* command-line parameters, to specify the log level and the config and output paths
* config.json, for the settings of each resource (see config.example.json)

Resources created before a failing step are not cleaned up.
*/

mod client;
mod document;
mod output;
mod provision;

use client::{QBusiness, QBusinessClient};
use clap::Parser;
use log::info;
use qsys_config::DeployConfig;
use simplelog::{CombinedLogger, Config as LogConfig, ConfigBuilder, LevelFilter, SimpleLogger};
use snafu::{ensure, ResultExt};
use std::path::{Path, PathBuf};
use std::process;
use tokio::runtime::Runtime;

//   =^..^=   =^..^=   =^..^=  SUB-COMMAND STRUCTS  =^..^=   =^..^=   =^..^=

/// Provisions Amazon Q Business resources
#[derive(Debug, Parser)]
struct Args {
    #[arg(global = true, long, default_value = "INFO")]
    /// How much detail to log; from least to most: ERROR, WARN, INFO, DEBUG, TRACE
    log_level: LevelFilter,

    #[arg(global = true, long, default_value = "config.json")]
    /// Path to the deployment config
    config_path: PathBuf,

    #[command(subcommand)]
    subcommand: SubCommand,
}

#[derive(Debug, Parser)]
struct DeployArgs {
    /// Where to write the IDs of the created resources
    #[arg(long, default_value = "deployment_output.json")]
    output_path: PathBuf,
}

#[derive(Debug, Parser)]
enum SubCommand {
    /// Creates the application, index, and data source, and starts the first sync.
    Deploy(DeployArgs),

    /// Checks the config for problems without calling AWS.
    ValidateConfig,
}

//  =^..^=   =^..^=   =^..^=  MAIN METHODS  =^..^=   =^..^=   =^..^=

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse and store the args passed to the program
    let args = Args::parse();

    init_logger(args.log_level)?;

    let config = DeployConfig::from_path(&args.config_path).context(error::ConfigSnafu)?;

    match args.subcommand {
        SubCommand::ValidateConfig => {
            ensure!(
                config.validate(),
                error::InvalidConfigSnafu {
                    path: &args.config_path
                }
            );
            Ok(())
        }
        SubCommand::Deploy(ref deploy_args) => {
            let rt = Runtime::new().context(error::RuntimeSnafu)?;
            rt.block_on(async {
                let client = QBusinessClient::new(&config.aws).await;
                deploy_and_save(&client, &config, &deploy_args.output_path).await
            })
        }
    }
}

/// SimpleLogger sends errors to stderr and anything less to stdout.  At the default level the AWS
/// SDK is noisy, so its messages get a second logger that only passes warnings and above.
fn init_logger(log_level: LevelFilter) -> Result<()> {
    match log_level {
        LevelFilter::Info => CombinedLogger::init(vec![
            SimpleLogger::new(
                LevelFilter::Info,
                ConfigBuilder::new()
                    .add_filter_ignore_str("aws_config")
                    .add_filter_ignore_str("aws_credential_types")
                    .add_filter_ignore_str("aws_smithy")
                    .add_filter_ignore_str("tracing::span")
                    .build(),
            ),
            SimpleLogger::new(
                LevelFilter::Warn,
                ConfigBuilder::new()
                    .add_filter_allow_str("aws_config")
                    .add_filter_allow_str("aws_credential_types")
                    .add_filter_allow_str("aws_smithy")
                    .add_filter_allow_str("tracing::span")
                    .build(),
            ),
        ])
        .context(error::LoggerSnafu),

        // Set the supplied log level across the whole crate.
        _ => SimpleLogger::init(log_level, LogConfig::default()).context(error::LoggerSnafu),
    }
}

/// Runs the deployment and records the resulting IDs.  The output file is only written if every
/// step succeeded.
async fn deploy_and_save<C>(client: &C, config: &DeployConfig, output_path: &Path) -> Result<()>
where
    C: QBusiness + Sync + ?Sized,
{
    let deployment = provision::deploy(client, config)
        .await
        .context(error::DeploySnafu)?;

    output::write_deployment(output_path, &deployment).context(error::OutputSnafu)?;
    info!("Resource IDs saved to {}", output_path.display());
    Ok(())
}

mod error {
    use snafu::Snafu;
    use std::path::PathBuf;

    #[derive(Debug, Snafu)]
    #[snafu(visibility(pub(super)))]
    pub(super) enum Error {
        #[snafu(display("{}", source))]
        Config { source: qsys_config::Error },

        #[snafu(display("{}", source))]
        Deploy { source: crate::provision::Error },

        #[snafu(display("Configuration at '{}' failed validation", path.display()))]
        InvalidConfig { path: PathBuf },

        #[snafu(display("Logger setup error: {}", source))]
        Logger { source: log::SetLoggerError },

        #[snafu(display("Failed to save deployment output: {}", source))]
        Output { source: crate::output::Error },

        #[snafu(display("Failed to create async runtime: {}", source))]
        Runtime { source: std::io::Error },
    }
}
type Result<T> = std::result::Result<T, error::Error>;

//  =^..^=   =^..^=   =^..^=  TESTS  =^..^=   =^..^=   =^..^=
