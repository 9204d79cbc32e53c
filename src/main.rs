use anyhow::Context as _;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use tracing::error;
use tracing_subscriber::EnvFilter;

use atomic_asset::{
    AssetPipeline, Config, ContentSource, HttpBundlingRelay, HttpContentSource,
    HttpDeployEndpoint, HttpLedgerEndpoint, HttpStateProvider, Wallet,
};

/// Archive a URL as an ownership-tracked atomic asset
#[derive(Debug, Parser)]
#[command(name = "atomic-asset", version)]
struct Args {
    /// URL of the content to archive
    url: String,

    /// Path to the JSON wallet keyfile
    #[arg(long, default_value = "wallet.json")]
    wallet: PathBuf,

    /// Optional TOML configuration file overriding the default endpoints
    #[arg(long)]
    config: Option<PathBuf>,

    /// Asset type recorded in the descriptor tags
    #[arg(long, default_value = "web-page")]
    asset_type: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => Config::default(),
    };
    let wallet = Wallet::load(&args.wallet)
        .with_context(|| format!("loading wallet from {}", args.wallet.display()))?;

    let client = reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()
        .context("building HTTP client")?;

    let source = HttpContentSource::new(client.clone());
    let ledger = HttpLedgerEndpoint::new(client.clone(), config.ledger_submit_url.clone());
    let state_provider = HttpStateProvider::new(client.clone(), config.contract_state_url.clone());
    let relay = HttpBundlingRelay::new(client.clone(), config.bundler_url.clone());
    let deploy = HttpDeployEndpoint::new(client, config.deploy_url.clone());

    let content = source
        .fetch(&args.url)
        .await
        .with_context(|| format!("fetching {}", args.url))?;

    let pipeline = AssetPipeline::new(&config, &wallet, &ledger, &state_provider, &relay, &deploy);
    let mut rng = StdRng::from_entropy();

    // Creation failures must be loud: a non-zero exit, never a silent 0.
    let created = match pipeline
        .create_atomic_asset(&content, &args.asset_type, &mut rng)
        .await
    {
        Ok(created) => created,
        Err(err) => {
            error!(stage = %err.stage, error = %err.source, "atomic asset creation failed");
            return Err(err.into());
        }
    };

    println!("{}", config.resource_url(created.base_content_id));
    Ok(())
}
