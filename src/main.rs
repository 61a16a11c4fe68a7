use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use verifiable_build_images::config::GeneratorConfig;
use verifiable_build_images::http::RetryPolicy;
use verifiable_build_images::image::{DockerHubRegistry, ImageRegistry};
use verifiable_build_images::logging::{self, LogFormat};
use verifiable_build_images::pipeline::Generator;
use verifiable_build_images::publish::{DockerCli, Publisher, VersionFilter};
use verifiable_build_images::release::source::GitRemoteTagSource;
use verifiable_build_images::toolchain::{GitHubRawHost, ToolchainResolver};

#[derive(Parser)]
#[command(name = "verifiable-build-images")]
#[command(about = "Generate and publish Solana/Agave verifiable-build Docker images")]
struct Cli {
    /// Build and push the images after generating the Dockerfiles
    #[arg(long)]
    upload: bool,

    /// Do not fetch the already published tags; treat every image as unpublished
    #[arg(long = "skip_cache", visible_alias = "skip-cache")]
    skip_cache: bool,

    /// Only publish MAJOR.MINOR or MAJOR.MINOR.PATCH, rebuilding it unconditionally
    #[arg(long, value_name = "X.Y[.Z]")]
    version: Option<VersionFilter>,

    /// JSON configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory the Dockerfiles are written to
    #[arg(long)]
    output_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    /// Also write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = logging::init(cli.log_format, cli.log_file.as_deref())?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(run(cli))
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = GeneratorConfig::load(cli.config.as_deref())?;
    if let Some(output_dir) = cli.output_dir {
        config.output_dir = output_dir;
    }

    let retry = RetryPolicy::new(config.rate_limit_retries);
    let registry: Arc<dyn ImageRegistry> =
        Arc::new(DockerHubRegistry::new(&config.endpoints.docker_hub, retry));
    let resolver = ToolchainResolver::new(Arc::new(GitHubRawHost::new(
        &config.endpoints.raw_files,
        retry,
    )));

    let outcome = Generator::new(
        config.clone(),
        Arc::new(GitRemoteTagSource),
        registry.clone(),
        resolver,
    )
    .run()
    .await?;
    info!(
        "Generated {} Dockerfiles ({} changed)",
        outcome.definitions.len(),
        outcome.dirty.len()
    );

    if !cli.upload {
        return Ok(());
    }

    let published = if cli.skip_cache {
        HashSet::new()
    } else {
        info!("Fetching existing images");
        registry
            .fetch_published_tags(&config.publish_repository)
            .await
            .context("Failed to fetch published images")?
    };

    info!("Uploading all Dockerfiles");
    let publisher = Publisher::new(
        Arc::new(DockerCli::default()),
        &config.local_image_repository,
        &config.publish_repository,
    );
    let report = publisher
        .publish(
            &outcome.definitions,
            &published,
            &outcome.dirty,
            cli.version.as_ref(),
        )
        .await;

    info!(
        "Pushed {}, up to date {}, filtered {}, failed {}",
        report.pushed.len(),
        report.up_to_date.len(),
        report.filtered.len(),
        report.failed.len()
    );

    Ok(())
}
