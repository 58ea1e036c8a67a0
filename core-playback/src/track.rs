//! # Track & Catalog Model
//!
//! A [`Track`] is an immutable playable resource derived from its URL; a
//! [`Catalog`] is the ordered playlist the controller cycles through.

use bridge_traits::playback::MediaSource;
use serde::{Deserialize, Serialize};

/// MIME type used when the extension is missing or unknown.
pub const DEFAULT_MIME_TYPE: &str = "audio/mpeg";

/// Infer the MIME type of an audio URL from its extension.
///
/// The extension is whatever follows the last `.` of the whole URL,
/// compared case-insensitively.
pub fn mime_type_for(url: &str) -> &'static str {
    let extension = url.rsplit('.').next().unwrap_or_default().to_ascii_lowercase();
    match extension.as_str() {
        "mp3" => "audio/mpeg",
        "ogg" => "audio/ogg",
        "wav" => "audio/wav",
        "opus" => "audio/opus",
        "m4a" => "audio/mp4",
        _ => DEFAULT_MIME_TYPE,
    }
}

/// Human-readable name for a track URL: the basename without its extension.
///
/// Falls back to the full URL when that would be empty.
pub fn display_name(url: &str) -> String {
    let basename = url.rsplit('/').next().unwrap_or_default();
    let stem = match basename.rfind('.') {
        Some(dot) if dot + 1 < basename.len() => &basename[..dot],
        _ => basename,
    };

    if stem.is_empty() {
        url.to_string()
    } else {
        stem.to_string()
    }
}

/// A single playable audio resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    url: String,
    mime_type: String,
    title: String,
}

impl Track {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            mime_type: mime_type_for(&url).to_string(),
            title: display_name(&url),
            url,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Source descriptor handed to the media device.
    pub fn source(&self) -> MediaSource {
        MediaSource::new(self.url.clone(), self.mime_type.clone())
    }
}

/// Ordered playlist with modular index arithmetic.
///
/// An empty catalog is valid but nothing can be played from it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn from_urls<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(urls.into_iter().map(Track::new).collect())
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Index after `index`, wrapping to 0. `None` on an empty catalog.
    pub fn next_index(&self, index: usize) -> Option<usize> {
        let len = self.len();
        (len > 0).then(|| (index + 1) % len)
    }

    /// Index before `index`, wrapping to the last track. `None` on an empty catalog.
    pub fn previous_index(&self, index: usize) -> Option<usize> {
        let len = self.len();
        (len > 0).then(|| (index % len + len - 1) % len)
    }
}
