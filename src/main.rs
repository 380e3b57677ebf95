use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::{Result, bail};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use movie_browser::application::{Debouncer, SearchOrchestrator};
use movie_browser::domain::ports::MovieCatalogPort;
use movie_browser::infrastructure::{AppConfig, CliArgs, ImageLoader, StorageManager, TmdbClient};
use movie_browser::presentation::Console;

fn init_logging(config: &AppConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.to_string()));

    if let Some(log_path) = config.effective_log_path() {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        let file_layer = fmt::layer()
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();

        info!(path = %log_path.display(), "Logging initialized");
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

fn load_config(storage: &StorageManager, args: CliArgs) -> Result<AppConfig> {
    let mut config = storage.load_config()?;
    config.merge_with_args(args);
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    dotenvy::dotenv().ok();

    let mut args = CliArgs::parse();
    let query = args.query.take();
    let pages = args.pages;
    let key_to_save = if args.save_api_key {
        match args.api_key.clone() {
            Some(key) => Some(key),
            None => bail!("--save-api-key needs a key from --api-key or TMDB_API_KEY"),
        }
    } else {
        None
    };

    let storage = StorageManager::new(args.config.as_deref())?;
    let config = load_config(&storage, args)?;
    init_logging(&config)?;

    info!(version = movie_browser::VERSION, "Starting {}", movie_browser::NAME);
    if let Some(key) = key_to_save {
        storage.store_api_key(&key)?;
        info!(path = %storage.config_path().display(), "Saved API key to config file");
    }
    if config.api.api_key.is_none() {
        warn!("No API key configured, catalog requests will be rejected");
    }

    let catalog: Arc<dyn MovieCatalogPort> = Arc::new(TmdbClient::with_base_url(
        config.api.base_url.clone(),
        config.api.api_key.clone(),
        config.api.timeout(),
    )?);
    let images = Arc::new(TmdbClient::with_base_url(
        config.api.base_url.clone(),
        None,
        config.images.timeout(),
    )?);

    let loader = ImageLoader::new(images, config.images.loader_config());
    let orchestrator =
        SearchOrchestrator::new(catalog.clone()).with_poster_tier(config.images.poster_tier);
    let debouncer = Debouncer::new(config.search.debounce());

    let mut console = Console::new(orchestrator, catalog, loader, debouncer, tokio::io::stdout());

    match query {
        Some(term) => console.run_query(&term, pages).await?,
        None => {
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            console.run(stdin).await?;
        }
    }

    info!("Exiting");
    Ok(())
}
