use std::sync::Arc;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use podart::application::{CoverEvent, CoverService};
use podart::domain::entities::{BasicAuth, ChannelInfo, CoverRequest, SyncedEpisode};
use podart::domain::ports::FixedFolder;
use podart::infrastructure::config::FeedArgs;
use podart::infrastructure::{
    AppConfig, CliArgs, Command, DeviceArtSync, HttpCoverFetcher, ImageCache, StorageManager,
};

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

async fn create_cache(config: &AppConfig) -> Result<Arc<ImageCache>> {
    let fetcher = Arc::new(HttpCoverFetcher::new(
        config.network.timeout_secs,
        &config.network.user_agent,
    )?);

    let mut cache = ImageCache::new(config.cache.effective_directory(), fetcher).await?;
    if let Some(placeholder) = &config.cache.placeholder {
        cache = cache.with_placeholder(placeholder);
    }

    Ok(Arc::new(cache))
}

fn channel_from(feed: FeedArgs) -> ChannelInfo {
    let mut channel = ChannelInfo::new(feed.feed_url, feed.title);
    if let Some(cover_url) = feed.cover_url {
        channel = channel.with_cover_url(cover_url);
    }
    if let (Some(username), Some(password)) = (feed.username, feed.password) {
        channel = channel.with_auth(BasicAuth::new(username, password));
    }
    channel
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = CliArgs::parse();
    let mut config = StorageManager::new()?.load_config(args.config.as_deref())?;
    config.merge_with_args(&args);

    init_logging(&config)?;

    info!(version = podart::VERSION, "Starting {}", podart::NAME);

    let cache = create_cache(&config).await?;

    match args.command {
        Command::Cover { feed, cache_only } => {
            let channel = channel_from(feed);
            let mut request = CoverRequest::for_channel(&channel);
            if cache_only {
                request = request.cache_only();
            }
            let resolved = cache.resolve_strict(&request).await?;
            println!("{}", resolved.path.display());
        }
        Command::Replace { feed, custom_url } => {
            let channel = channel_from(feed);
            let service = CoverService::new(cache.clone());
            let mut events = service.subscribe();

            service.replace_cover(&channel, custom_url).await?;

            match events.recv().await {
                Some(CoverEvent::Available { image: Some(_), .. }) => {
                    if let Some(path) = cache.find_cached(channel.url()).await {
                        println!("{}", path.display());
                    }
                }
                _ => eprintln!("no cover available for {}", channel.url()),
            }
        }
        Command::SyncArt {
            feed,
            episode_file,
            device_folder,
        } => {
            let sync = DeviceArtSync::new(config.device_art.clone(), cache);
            let episode = SyncedEpisode::new(channel_from(feed), episode_file);
            let outcome = sync
                .on_episode_synced(&FixedFolder(device_folder), &episode)
                .await;
            println!("{outcome}");
        }
        Command::ClearCache => {
            let removed = cache.clear().await?;
            println!("removed {removed} cached covers");
        }
    }

    Ok(())
}
