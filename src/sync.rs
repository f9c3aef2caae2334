use std::sync::Arc;

use tokio::sync::{watch, OnceCell};

use crate::db::VideoStore;
use crate::error::Result;
use crate::models::{Video, VideoRecord};
use crate::network::PlaylistSource;

/// Bridges the remote playlist and the local cache.
///
/// Observers read [`VideoSyncService::videos`]; it follows the store on its
/// own, so nothing has to be reloaded after [`VideoSyncService::refresh`].
pub struct VideoSyncService {
    store: VideoStore,
    source: Arc<dyn PlaylistSource>,
    videos: OnceCell<watch::Receiver<Vec<Video>>>,
}

impl VideoSyncService {
    pub fn new(store: VideoStore, source: Arc<dyn PlaylistSource>) -> Self {
        Self {
            store,
            source,
            videos: OnceCell::new(),
        }
    }

    /// Live projection of the cached playlist.
    ///
    /// The first call loads the current store contents and starts following
    /// store writes; later calls hand out more receivers on the same feed.
    pub async fn videos(&self) -> Result<watch::Receiver<Vec<Video>>> {
        let rx = self
            .videos
            .get_or_try_init(|| spawn_projection(self.store.clone()))
            .await?;
        Ok(rx.clone())
    }

    /// Fetch the remote playlist and write it into the store.
    ///
    /// Nothing is written when the fetch fails.
    pub async fn refresh(&self) -> Result<()> {
        let playlist = self.source.fetch_playlist().await?;

        let records: Vec<VideoRecord> = playlist.into_iter().map(VideoRecord::from).collect();
        let count = records.len();
        self.store.upsert_all(records).await?;

        tracing::info!("Refreshed {} videos", count);
        Ok(())
    }
}

fn project(records: Vec<VideoRecord>) -> Vec<Video> {
    records.into_iter().map(Video::from).collect()
}

async fn spawn_projection(store: VideoStore) -> Result<watch::Receiver<Vec<Video>>> {
    // Subscribe before the initial read so a write landing in between is not missed.
    let mut changes = store.subscribe();
    let initial = project(store.read_all().await?);
    let (tx, rx) = watch::channel(initial);

    tokio::spawn(async move {
        loop {
            tokio::select! {
                changed = changes.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = tx.closed() => break,
            }

            match store.read_all().await {
                Ok(records) => {
                    if tx.send(project(records)).is_err() {
                        break;
                    }
                }
                Err(e) => tracing::error!("Failed to reload cached videos: {}", e),
            }
        }
        tracing::debug!("Video projection stopped");
    });

    Ok(rx)
}
