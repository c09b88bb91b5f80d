use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::config::{Config, Inputs};
use crate::output::ActionOutput;
use crate::release::{GitHubReleaseClient, ReleaseApi, UploadOrchestrator};

/// Load configuration, upload the asset directory and report the URLs
///
/// Returns the number of uploaded assets.
pub async fn run(inputs: Inputs, output: &ActionOutput) -> Result<usize> {
    let config = Config::from_env(inputs)?;

    info!("Asset directory: {}", config.asset_dir.display());
    info!("Concurrent workers: {}", config.max_concurrent);

    let client = GitHubReleaseClient::new(config.token.clone(), config.timeout)?;
    let urls = upload_and_report(Arc::new(client), &config, output).await?;

    Ok(urls.len())
}

/// Upload all assets through `api` and set the download URLs output
///
/// The output is only written once every upload has succeeded.
pub async fn upload_and_report(
    api: Arc<dyn ReleaseApi>,
    config: &Config,
    output: &ActionOutput,
) -> Result<Vec<String>> {
    let orchestrator = UploadOrchestrator::new(api, config.max_concurrent);

    let urls = orchestrator
        .run(&config.upload_url, &config.asset_dir)
        .await?;

    output
        .set_download_urls(&urls)
        .context("Failed to set browser_download_urls output")?;

    Ok(urls)
}
