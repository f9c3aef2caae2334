use std::path::Path;
use std::sync::Arc;

use rusqlite::{params, Row};
use tokio::sync::watch;
use tokio_rusqlite::Connection;

use crate::error::{AppError, Result};
use crate::models::VideoRecord;

use super::schema::SCHEMA;

/// Durable cache of playlist videos.
///
/// Clones share the same connection and change notifier, so a write through
/// any handle wakes every subscriber.
#[derive(Clone)]
pub struct VideoStore {
    conn: Connection,
    changes: Arc<watch::Sender<u64>>,
}

impl VideoStore {
    pub async fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let conn = Connection::open(db_path).await?;
        Self::init(conn).await
    }

    pub async fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::init(conn).await
    }

    async fn init(conn: Connection) -> Result<Self> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        let (changes, _) = watch::channel(0);
        Ok(Self {
            conn,
            changes: Arc::new(changes),
        })
    }

    /// Receiver that observes a new generation after every committed write.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    pub async fn read_all(&self) -> Result<Vec<VideoRecord>> {
        let videos = self
            .conn
            .call(|conn| {
                let mut stmt = conn
                    .prepare("SELECT url, updated, title, description, thumbnail FROM videos")?;
                let videos = stmt
                    .query_map([], record_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(videos)
            })
            .await?;
        Ok(videos)
    }

    /// Insert or replace every record by url in a single transaction.
    pub async fn upsert_all(&self, records: Vec<VideoRecord>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let count = records.len();
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare(
                        r#"INSERT OR REPLACE INTO videos (url, updated, title, description, thumbnail)
                           VALUES (?1, ?2, ?3, ?4, ?5)"#,
                    )?;
                    for record in &records {
                        stmt.execute(params![
                            record.url,
                            record.updated,
                            record.title,
                            record.description,
                            record.thumbnail,
                        ])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(AppError::LocalWrite)?;

        self.changes.send_modify(|generation| *generation += 1);
        tracing::debug!("Upserted {} videos", count);
        Ok(())
    }

    pub async fn count(&self) -> Result<usize> {
        let count = self
            .conn
            .call(|conn| {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM videos", [], |row| row.get(0))?;
                Ok(count)
            })
            .await?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    #[cfg(test)]
    pub(crate) async fn drop_table_for_tests(&self) {
        self.conn
            .call(|conn| {
                conn.execute_batch("DROP TABLE videos")?;
                Ok(())
            })
            .await
            .unwrap();
    }
}

fn record_from_row(row: &Row) -> rusqlite::Result<VideoRecord> {
    Ok(VideoRecord {
        url: row.get(0)?,
        updated: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        thumbnail: row.get(4)?,
    })
}
