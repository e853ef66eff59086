use anyhow::{Context, Result};
use clap::Parser;
use seek_common::observability::init_logging;
use seek_config::{SeekConfig, SeekConfigLoader};
use seek_web::BraveClient;

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Args::parse();

    // 1) Load config (env wins over files)
    let loader = match &args.config {
        Some(path) => SeekConfigLoader::new().with_file(path),
        None => SeekConfigLoader::new().with_default_file(),
    };
    let cfg: SeekConfig = loader.load().context("failed to load seek config")?;

    let log_path = init_logging(cfg.logging.to_log_config("seek"))?;
    tracing::debug!(log_path = %log_path.display(), "seek.start");

    // 2) Build the client
    let mut builder = BraveClient::builder(cfg.brave.api_key.clone())
        .endpoint(cfg.brave.endpoint.clone())
        .base_url(cfg.brave.base_url.clone());
    if let Some(timeout) = cfg.brave.timeout() {
        builder = builder.timeout(timeout);
    }
    let brave = builder.build()?;

    // 3) Search and print
    let resp = brave.search(args.to_params()).await?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&resp)?);
    } else {
        for url in resp.urls() {
            println!("{url}");
        }
    }
    Ok(())
}
