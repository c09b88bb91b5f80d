use anyhow::Result;
use clap::Parser;
use console::style;
use release_assets::ActionOutput;
use release_assets::config::Inputs;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(
    name = "upload-release-assets",
    version = env!("CARGO_PKG_VERSION"),
    author = "Tyr Chen <tyr.chen@gmail.com>",
    about = "Upload every file in a directory as a GitHub release asset",
    long_about = "Uploads all non-hidden files directly inside a directory to a GitHub release \
                  and reports their download URLs as the `browser_download_urls` output. \
                  Subdirectories are not uploaded. Inputs can also be given the GitHub Actions way \
                  (INPUT_UPLOAD_URL, INPUT_ASSET_DIR); the token is read from GITHUB_TOKEN.",
    after_help = "Examples:\n  \
                  upload-release-assets --upload-url \"$UPLOAD_URL\" --asset-dir dist\n  \
                  upload-release-assets --upload-url \"$UPLOAD_URL\" --asset-dir dist -c 8\n\n\
                  Configuration (.env):\n  \
                  GITHUB_TOKEN=ghp_...\n  \
                  INPUT_UPLOAD_URL=https://uploads.github.com/repos/OWNER/REPO/releases/ID/assets{?name,label}\n  \
                  INPUT_ASSET_DIR=dist\n  \
                  LOG_LEVEL=debug"
)]
struct Cli {
    /// Release upload URL (may keep the `{?name,label}` template)
    #[arg(long)]
    upload_url: Option<String>,

    /// Directory whose files are uploaded
    #[arg(long)]
    asset_dir: Option<PathBuf>,

    /// GitHub token (defaults to GITHUB_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// Maximum number of concurrent uploads
    #[arg(long, short = 'c')]
    max_concurrent: Option<usize>,

    /// Per-request timeout in seconds (0 disables it)
    #[arg(long)]
    timeout_secs: Option<u64>,
}

impl From<Cli> for Inputs {
    fn from(cli: Cli) -> Self {
        Self {
            upload_url: cli.upload_url,
            asset_dir: cli.asset_dir,
            token: cli.token,
            max_concurrent: cli.max_concurrent,
            timeout_secs: cli.timeout_secs,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file early to get LOG_LEVEL
    dotenv::dotenv().ok();

    let log_level = std::env::var("LOG_LEVEL")
        .ok()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .unwrap_or_else(|| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new(&log_level))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let output = ActionOutput::from_env();

    info!("Release Asset Uploader v{}", env!("CARGO_PKG_VERSION"));

    match release_assets::run(cli.into(), &output).await {
        Ok(count) => {
            eprintln!(
                "{}",
                style(format!("✅ Uploaded {} release asset(s)", count))
                    .green()
                    .bold()
            );
            Ok(())
        }
        Err(e) => {
            error!("{:#}", e);
            eprintln!("{}", style(format!("❌ {:#}", e)).red().bold());
            output.set_failed(&format!("{:#}", e));
            std::process::exit(1);
        }
    }
}
