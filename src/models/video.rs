use serde::{Deserialize, Serialize};

const SHORT_DESCRIPTION_LEN: usize = 200;
const TRAILING_SEPARATORS: [&str; 4] = [", ", "; ", ": ", " "];

/// Playlist payload as served by the remote endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkVideoContainer {
    pub videos: Vec<NetworkVideo>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkVideo {
    pub title: String,
    pub description: String,
    pub url: String,
    pub updated: String,
    pub thumbnail: String,
    #[serde(default)]
    pub closed_captions: Option<String>,
}

/// Stored form of a video. `url` is the natural key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoRecord {
    pub url: String,
    pub updated: String,
    pub title: String,
    pub description: String,
    pub thumbnail: String,
}

/// Domain form handed to observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Video {
    pub title: String,
    pub description: String,
    pub url: String,
    pub updated: String,
    pub thumbnail: String,
}

impl Video {
    /// Description cut at a word boundary near 200 characters.
    pub fn short_description(&self) -> String {
        smart_truncate(&self.description, SHORT_DESCRIPTION_LEN)
    }
}

impl From<NetworkVideo> for VideoRecord {
    fn from(video: NetworkVideo) -> Self {
        Self {
            url: video.url,
            updated: video.updated,
            title: video.title,
            description: video.description,
            thumbnail: video.thumbnail,
        }
    }
}

impl From<VideoRecord> for Video {
    fn from(record: VideoRecord) -> Self {
        Self {
            title: record.title,
            description: record.description,
            url: record.url,
            updated: record.updated,
            thumbnail: record.thumbnail,
        }
    }
}

fn smart_truncate(text: &str, length: usize) -> String {
    let mut out = String::with_capacity(text.len().min(length + 16));
    let mut has_more = false;

    for word in text.split(' ') {
        if out.chars().count() > length {
            has_more = true;
            break;
        }
        out.push_str(word);
        out.push(' ');
    }

    for sep in TRAILING_SEPARATORS {
        if out.ends_with(sep) {
            out.truncate(out.len() - sep.len());
        }
    }

    if has_more {
        out.push_str("...");
    }
    out
}
