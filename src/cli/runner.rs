//! CLI runner - executes commands

use crate::auth::YamlSecretStore;
use crate::cli::commands::{Cli, Commands};
use crate::config::AppConfig;
use crate::engine::{FetchEngine, ResourceFetch};
use crate::error::{Error, Phase, Result};
use crate::normalize::{flatten_bss, flatten_records};
use crate::output::{write_records, write_rows, OutputFormat};
use crate::types::Resource;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command, logging total wall time on success
    pub async fn run(&self) -> Result<()> {
        let start = Instant::now();

        match &self.cli.command {
            Commands::Refresh => self.refresh().await?,
            Commands::Fetch {
                resource,
                output,
                format,
                rate,
                page_limit,
                raw,
            } => {
                self.fetch(
                    *resource,
                    output.as_deref(),
                    *format,
                    (*rate, *page_limit),
                    *raw,
                )
                .await?;
            }
            Commands::Run {
                output_dir,
                format,
                rate,
                page_limit,
            } => self.run_all(output_dir, *format, (*rate, *page_limit)).await?,
        }

        info!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Execution time: {:.2}s",
            start.elapsed().as_secs_f64()
        );
        Ok(())
    }

    /// Load the config file and build an engine over the secrets file
    fn engine(&self, overrides: (Option<u32>, Option<u32>)) -> Result<FetchEngine> {
        let config = AppConfig::from_file(&self.cli.config)
            .and_then(|config| config.with_overrides(overrides.0, overrides.1))
            .map_err(|e| e.in_phase(Phase::Setup))?;
        let store = Arc::new(YamlSecretStore::new(&self.cli.secrets));
        FetchEngine::new(config, store)
    }

    async fn refresh(&self) -> Result<()> {
        let mut engine = self.engine((None, None))?;
        engine.refresh().await?;
        Ok(())
    }

    async fn fetch(
        &self,
        resource: Resource,
        output: Option<&Path>,
        format: OutputFormat,
        overrides: (Option<u32>, Option<u32>),
        raw: bool,
    ) -> Result<()> {
        if raw && format == OutputFormat::Parquet {
            return Err(Error::config("--raw can only be combined with json or pretty")
                .in_phase(Phase::Setup));
        }

        let mut engine = self.engine(overrides)?;
        let mut fetched = engine.run(&[resource]).await?;
        let Some(fetch) = fetched.pop() else {
            return Ok(());
        };

        let written = if raw {
            write_records(&fetch.result.records, format, output)
        } else {
            write_fetch(&fetch, format, output)
        };
        let written = written.map_err(|e| e.in_phase(Phase::Output))?;

        info!(resource = %resource, rows = written, "Output written");
        Ok(())
    }

    async fn run_all(
        &self,
        output_dir: &Path,
        format: OutputFormat,
        overrides: (Option<u32>, Option<u32>),
    ) -> Result<()> {
        let mut engine = self.engine(overrides)?;
        let fetched = engine.run(&Resource::all()).await?;

        tokio::fs::create_dir_all(output_dir)
            .await
            .map_err(|e| Error::from(e).in_phase(Phase::Output))?;

        for fetch in &fetched {
            let path = output_dir.join(format!("{}.{}", fetch.resource, format.extension()));
            let written = write_fetch(fetch, format, Some(path.as_path()))
                .map_err(|e| e.in_phase(Phase::Output))?;
            info!(
                resource = %fetch.resource,
                rows = written,
                path = %path.display(),
                "Output written"
            );
        }

        let stats = engine.stats();
        info!(
            fetches = stats.fetches,
            requests = stats.requests,
            records = stats.records,
            "Run complete"
        );
        Ok(())
    }
}

/// Normalize a fetch the way its collection needs and write it
fn write_fetch(fetch: &ResourceFetch, format: OutputFormat, path: Option<&Path>) -> Result<usize> {
    let rows = match fetch.resource {
        Resource::Bss => flatten_bss(&fetch.result.records),
        Resource::Apinfo => flatten_records(&fetch.result.records),
    };
    write_rows(&rows, format, path)
}
