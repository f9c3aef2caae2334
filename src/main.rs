use std::process::ExitCode;
use std::sync::Arc;

use tokio::sync::watch;

use devbytes_sync::config::Config;
use devbytes_sync::db::VideoStore;
use devbytes_sync::error::Result;
use devbytes_sync::network::{PlaylistFetcher, PlaylistSource};
use devbytes_sync::sync::VideoSyncService;
use devbytes_sync::work::{JobOutcome, PeriodicScheduler, RefreshDataJob};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    // Initialize logging (info and above unless RUST_LOG says otherwise)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let flag = args.get(1).map(String::as_str);

    let config = Config::load()?;
    let store = VideoStore::open(&config.db_path).await?;
    let source: Arc<dyn PlaylistSource> = Arc::new(PlaylistFetcher::new(&config.playlist_url)?);

    match flag {
        // Run the job once and exit
        Some("--refresh") => {
            let outcome = RefreshDataJob::new(store, source).execute().await;
            println!("Refresh finished: {}", outcome);
            Ok(if outcome == JobOutcome::Success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }

        Some("--list") => {
            let service = VideoSyncService::new(store, source);
            let videos = service.videos().await?;
            for video in videos.borrow().iter() {
                println!("{}\n  {}\n  {}\n", video.title, video.url, video.short_description());
            }
            Ok(ExitCode::SUCCESS)
        }

        Some(other) => {
            eprintln!("Unknown argument: {}", other);
            eprintln!("Usage: devbytes-sync [--refresh | --list]");
            Ok(ExitCode::FAILURE)
        }

        None => {
            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        tracing::info!("Shutting down");
                        let _ = shutdown_tx.send(true);
                    }
                    Err(e) => {
                        tracing::warn!("Ctrl-C handler unavailable: {}", e);
                        // keep the sender alive so the scheduler keeps running
                        std::future::pending::<()>().await;
                    }
                }
            });

            let job = RefreshDataJob::new(store, source);
            PeriodicScheduler::from_config(&config)
                .run(&job, shutdown_rx)
                .await;
            Ok(ExitCode::SUCCESS)
        }
    }
}
