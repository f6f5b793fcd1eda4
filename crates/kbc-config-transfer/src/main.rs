//! kbc-config-transfer entry point

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use kbc_client::KbcApiClient;
use kbc_config_transfer::TransferDriver;
use kbc_config_transfer::logging::{LoggingConfig, init_logging};
use kbc_config_transfer::settings::{Cli, Command, Settings};
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let settings = match Settings::load(Cli::parse()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let logging_config = LoggingConfig::new(settings.debug(), settings.log_dir.clone());
    let _logging_guard = match init_logging(&logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(settings: Settings) -> anyhow::Result<()> {
    info!(
        version = env!("CARGO_PKG_VERSION"),
        src_region = %settings.parameters.src_region,
        dst_region = %settings.parameters.dst_region,
        "Starting kbc-config-transfer"
    );

    let api = KbcApiClient::new(settings.client_config()).context("Failed to build API client")?;
    let mut driver = TransferDriver::new(api, settings.parameters.clone());

    match &settings.command {
        Command::Configs => {
            let summary = driver
                .run(&settings.input_table(), &settings.output_table())
                .await
                .context("Configuration transfer failed")?;
            info!(
                transferred = summary.transferred,
                skipped = summary.skipped,
                "Done"
            );
        }
        Command::Bucket {
            project_id,
            src_bucket,
            dst_bucket,
        } => {
            let report = driver
                .transfer_bucket(
                    project_id,
                    src_bucket,
                    dst_bucket.as_deref(),
                    &settings.tmp_dir(),
                )
                .await
                .with_context(|| format!("Transfer of bucket {} failed", src_bucket))?;
            info!(
                transferred = report.transferred.len(),
                skipped = report.skipped.len(),
                "Done"
            );
        }
    }

    Ok(())
}
