use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};

use mapcheck_core::config::loader::load_config;
use mapcheck_core::{CodeSystemRef, ConceptMapSelection, MappingConfig, RunConfig};

#[derive(Parser)]
#[command(name = "mapcheck")]
#[command(about = "Verify code mappings against a FHIR terminology server")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log level for diagnostics on stderr (RUST_LOG takes precedence)
    #[arg(long, global = true, env = "MAPCHECK_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Annotate a source_code,target_code CSV with displays and mapping validity
    ///
    /// Config file:  mapcheck run <CONFIG> <INPUT> <OUTPUT>
    /// Flags:        mapcheck run --url <URL> --source-system <S> --target-system <T> <INPUT> <OUTPUT>
    Run(RunArgs),
}

#[derive(clap::Args)]
pub struct RunArgs {
    /// Terminology server base URL; selects flag mode (no config file)
    #[arg(long, requires_all = ["source_system", "target_system"])]
    pub url: Option<String>,

    /// Source code system URL
    #[arg(long, requires = "url")]
    pub source_system: Option<String>,

    /// Source code system version
    #[arg(long, requires = "url")]
    pub source_version: Option<String>,

    /// Target code system URL
    #[arg(long, requires = "url")]
    pub target_system: Option<String>,

    /// Target code system version
    #[arg(long, requires = "url")]
    pub target_version: Option<String>,

    /// Accept any TLS certificate from the terminology server
    #[arg(long)]
    pub insecure: bool,

    /// [CONFIG] INPUT OUTPUT (CONFIG only without --url)
    #[arg(value_name = "FILE", num_args = 2..=3, required = true)]
    pub files: Vec<PathBuf>,
}

/// A fully resolved `run` invocation.
#[derive(Debug)]
pub struct RunPlan {
    pub config: RunConfig,
    pub input: PathBuf,
    pub output: PathBuf,
}

impl RunArgs {
    pub fn into_plan(mut self) -> Result<RunPlan> {
        let files = std::mem::take(&mut self.files);
        match (self.url.is_some(), files.as_slice()) {
            (false, [config_path, input, output]) => {
                let mut config = load_config(config_path)
                    .with_context(|| format!("Failed to load config {}", config_path.display()))?;
                if self.insecure {
                    config.verify_tls = false;
                }
                Ok(RunPlan {
                    config,
                    input: input.clone(),
                    output: output.clone(),
                })
            }
            (true, [input, output]) => Ok(RunPlan {
                input: input.clone(),
                output: output.clone(),
                config: self.flag_config()?,
            }),
            (false, _) => bail!("Expected <CONFIG> <INPUT> <OUTPUT> (or use --url for flag mode)"),
            (true, _) => bail!("Expected <INPUT> <OUTPUT> with --url (no config file)"),
        }
    }

    /// Flag mode never pins a concept map; the server picks one.
    fn flag_config(self) -> Result<RunConfig> {
        let config = RunConfig {
            server_url: self.url.context("--url is required")?,
            verify_tls: !self.insecure,
            mapping: MappingConfig {
                source: CodeSystemRef::new(
                    self.source_system.context("--source-system is required")?,
                    self.source_version,
                ),
                target: CodeSystemRef::new(
                    self.target_system.context("--target-system is required")?,
                    self.target_version,
                ),
                concept_map: ConceptMapSelection::ServerDefault,
            },
        };
        config.validate()?;
        Ok(config)
    }
}
