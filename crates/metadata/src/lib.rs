//! Platform metadata for downloaded videos
//!
//! Downloaded files carry their platform ID in brackets, e.g.
//! `[BV1xx411c7mD] title.mp4`. The ID is used to look up the publish date,
//! which is stored in `published.json` and joined into the summary.

pub mod bilibili;
pub mod fetch;

pub use bilibili::BilibiliClient;
pub use fetch::{fetch_publish_dates, FetchReport};

use chrono::{Local, NaiveDate, TimeZone};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;
use thiserror::Error;

static RE_BV_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(BV[A-Za-z0-9]+)\]").expect("valid BV id regex"));
static RE_AV_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(av\d+)\]").expect("valid av id regex"));

const VIDEO_URL_BASE: &str = "https://www.bilibili.com/video/";

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    #[error("No video data for {0}")]
    MissingData(String),

    #[error("Invalid video id: {0}")]
    InvalidVideoId(String),
}

pub type Result<T> = std::result::Result<T, MetadataError>;

/// Video details returned by the metadata API
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct VideoInfo {
    /// Unix seconds; zero or negative when unknown
    #[serde(default)]
    pub pubdate: i64,
    #[serde(default)]
    pub title: String,
    /// Seconds
    #[serde(default)]
    pub duration: u64,
}

impl VideoInfo {
    /// Publish date in local time, if the API reported one
    #[must_use]
    pub fn publish_date(&self) -> Option<NaiveDate> {
        publish_date_from_unix(self.pubdate)
    }
}

/// Look up video details by platform ID
pub trait MetadataClient {
    fn video_info(&self, video_id: &str) -> Result<VideoInfo>;
}

/// Platform ID embedded in a filename: the first bracketed BV ID, else an av ID
#[must_use]
pub fn extract_video_id(filename: &str) -> Option<String> {
    RE_BV_ID
        .captures(filename)
        .or_else(|| RE_AV_ID.captures(filename))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[must_use]
pub fn publish_date_from_unix(pubdate: i64) -> Option<NaiveDate> {
    if pubdate <= 0 {
        return None;
    }
    Local
        .timestamp_opt(pubdate, 0)
        .single()
        .map(|datetime| datetime.date_naive())
}

/// Seconds from an `MM:SS` timestamp
#[must_use]
pub fn timestamp_to_seconds(timestamp: &str) -> Option<u64> {
    let (minutes, seconds) = timestamp.trim().split_once(':')?;
    let minutes: u64 = minutes.parse().ok()?;
    let seconds: u64 = seconds.parse().ok()?;
    (seconds < 60).then_some(minutes * 60 + seconds)
}

/// Watch page for a video
#[must_use]
pub fn video_url(video_id: &str) -> String {
    format!("{VIDEO_URL_BASE}{video_id}")
}

/// Watch page starting at an `MM:SS` offset; an unparseable offset links the start
#[must_use]
pub fn video_url_at(video_id: &str, timestamp: &str) -> String {
    match timestamp_to_seconds(timestamp) {
        Some(seconds) => format!("{}?t={seconds}", video_url(video_id)),
        None => video_url(video_id),
    }
}
