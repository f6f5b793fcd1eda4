//! Command line and `config.json` loading
//!
//! The data directory follows the platform convention:
//! `<data-dir>/config.json`, `<data-dir>/in/tables/` and `<data-dir>/out/tables/`.
//! Values given on the command line (or their environment variables) win over
//! the file.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use config::{Config, File, FileFormat};
use kbc_client::{KbcClientConfig, RegionMap};
use serde::Deserialize;

pub const CONFIG_FILE: &str = "config.json";
pub const INPUT_TABLE: &str = "in/tables/configs.csv";
pub const OUTPUT_TABLE: &str = "out/tables/transferred_configs_log.csv";
pub const TMP_DIR: &str = "tmp";

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Missing required parameter '{0}'")]
    MissingParameter(&'static str),

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
}

#[derive(Parser)]
#[command(name = "kbc-config-transfer", version, about)]
pub struct Cli {
    /// Data directory holding config.json and the in/out tables
    #[arg(long, env = "KBC_DATADIR", default_value = "./data")]
    pub data_dir: PathBuf,

    /// Verbose logging
    #[arg(long)]
    pub debug: bool,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    /// Management API token (overrides `#api_token`)
    #[arg(long, env = "KBC_MANAGE_TOKEN", hide_env_values = true)]
    pub api_token: Option<String>,

    /// Source project storage token (overrides `#src_token`)
    #[arg(long, env = "KBC_SRC_TOKEN", hide_env_values = true)]
    pub src_token: Option<String>,

    /// Source region (overrides `aws_region`)
    #[arg(long)]
    pub src_region: Option<String>,

    /// Destination region (overrides `dst_aws_region`)
    #[arg(long)]
    pub dst_region: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Clone, Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Transfer the configurations listed in the input table
    Configs,
    /// Copy every table of a bucket into a destination project
    Bucket {
        /// Destination project id
        #[arg(long)]
        project_id: String,
        #[arg(long)]
        src_bucket: String,
        /// Defaults to the source bucket id
        #[arg(long)]
        dst_bucket: Option<String>,
    },
}

#[derive(Default, Deserialize)]
struct RawParameters {
    #[serde(rename = "#api_token")]
    api_token: Option<String>,
    #[serde(rename = "#src_token")]
    src_token: Option<String>,
    aws_region: Option<String>,
    dst_aws_region: Option<String>,
    debug: Option<bool>,
}

#[derive(Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    parameters: RawParameters,
    #[serde(default)]
    image_parameters: HashMap<String, serde_json::Value>,
}

/// Validated run parameters
#[derive(Clone)]
pub struct Parameters {
    pub api_token: String,
    pub src_token: String,
    pub src_region: String,
    pub dst_region: String,
    pub debug: bool,
}

impl fmt::Debug for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameters")
            .field("api_token", &"***")
            .field("src_token", &"***")
            .field("src_region", &self.src_region)
            .field("dst_region", &self.dst_region)
            .field("debug", &self.debug)
            .finish()
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub data_dir: PathBuf,
    pub parameters: Parameters,
    pub regions: RegionMap,
    pub log_dir: Option<PathBuf>,
    pub command: Command,
}

impl Settings {
    /// Load `config.json` from the data directory and apply command line overrides
    pub fn load(cli: Cli) -> Result<Self, SettingsError> {
        let path = cli.data_dir.join(CONFIG_FILE);
        let raw: RawConfig = Config::builder()
            .add_source(File::from(path).format(FileFormat::Json).required(false))
            .build()?
            .try_deserialize()?;

        let params = raw.parameters;
        let parameters = Parameters {
            api_token: required(cli.api_token.or(params.api_token), "#api_token")?,
            src_token: required(cli.src_token.or(params.src_token), "#src_token")?,
            src_region: required(cli.src_region.or(params.aws_region), "aws_region")?,
            dst_region: required(cli.dst_region.or(params.dst_aws_region), "dst_aws_region")?,
            debug: cli.debug || params.debug.unwrap_or(false),
        };

        // Only string values are region suffixes
        let regions = RegionMap::with_overrides(
            raw.image_parameters
                .into_iter()
                .filter_map(|(region, value)| match value {
                    serde_json::Value::String(suffix) => Some((region, suffix)),
                    _ => None,
                }),
        );

        Ok(Self {
            data_dir: cli.data_dir,
            parameters,
            regions,
            log_dir: cli.log_dir,
            command: cli.command.unwrap_or(Command::Configs),
        })
    }

    pub fn debug(&self) -> bool {
        self.parameters.debug
    }

    pub fn input_table(&self) -> PathBuf {
        self.data_dir.join(INPUT_TABLE)
    }

    pub fn output_table(&self) -> PathBuf {
        self.data_dir.join(OUTPUT_TABLE)
    }

    pub fn tmp_dir(&self) -> PathBuf {
        self.data_dir.join(TMP_DIR)
    }

    pub fn client_config(&self) -> KbcClientConfig {
        KbcClientConfig::with_regions(self.regions.clone())
    }
}

fn required(value: Option<String>, name: &'static str) -> Result<String, SettingsError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(SettingsError::MissingParameter(name))
}
