mod fetcher;

pub use fetcher::{PlaylistFetcher, PlaylistSource};
