//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{load_config, ClientConfig};
use crate::error::{Error, Result};
use crate::pagination::{PageFetcher, PageOptions, PagedSequence};
use futures::StreamExt;
use serde_json::Value;
use std::io::Write;
use std::sync::Arc;
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

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::List {
                origin,
                page_size,
                start,
                max_pages,
                format,
            } => {
                let config = self.load_config()?;
                let mut options = config.paging;
                options.page_size = page_size.or(options.page_size);
                options.start_page = start.or(options.start_page);
                options.page_count = max_pages.or(options.page_count);

                let stdout = std::io::stdout();
                let mut out = stdout.lock();
                let count = list(&config, origin, options, *format, &mut out).await?;
                info!(items = count, "Done");
                Ok(())
            }
            Commands::Validate => {
                let config = self.load_config()?;
                config.validate()?;
                println!("Configuration OK: {}", config.base_url);
                Ok(())
            }
        }
    }

    /// Load the config file (if any), then apply environment and flags
    fn load_config(&self) -> Result<ClientConfig> {
        let mut config = match &self.cli.config {
            Some(path) => load_config(path)?,
            None => ClientConfig::default(),
        };

        if let Some(base_url) = &self.cli.base_url {
            config.base_url.clone_from(base_url);
        }
        if let Some(token) = &self.cli.api_token {
            config.api_token = Some(token.clone());
        }

        Ok(config.with_env_token())
    }
}

/// Write every item reachable from `origin` to `out`, returning the item count
pub async fn list<W: Write>(
    config: &ClientConfig,
    origin: &str,
    options: PageOptions,
    format: OutputFormat,
    out: &mut W,
) -> Result<usize> {
    let fetcher: Arc<dyn PageFetcher<Value>> = Arc::new(config.http_client()?);
    let first = PagedSequence::fetch_first(origin, options, fetcher).await?;

    let mut pages = Box::pin(first.pages());
    let mut count = 0;
    let mut page_number = 0;

    while let Some(page) = pages.next().await {
        let page = page?;
        page_number += 1;
        info!(
            page = page_number,
            items = page.len(),
            next_start = ?page.continuation(),
            "Received page"
        );

        for item in &page {
            let line = match format {
                OutputFormat::Json => serde_json::to_string(item)?,
                OutputFormat::Pretty => serde_json::to_string_pretty(item)?,
            };
            writeln!(out, "{line}").map_err(Error::Io)?;
            count += 1;
        }
    }

    Ok(count)
}
