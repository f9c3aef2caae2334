//! Offline cache for the DevBytes playlist.
//!
//! [`db::VideoStore`] keeps the videos in SQLite, [`sync::VideoSyncService`]
//! refreshes them from the network and exposes a live list, and
//! [`work::RefreshDataJob`] is the unit of background work a scheduler runs.

pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod network;
pub mod sync;
pub mod work;
