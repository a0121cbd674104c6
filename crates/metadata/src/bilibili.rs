//! Bilibili web API client.

use crate::{MetadataClient, MetadataError, Result, VideoInfo};
use reqwest::header::{HeaderMap, HeaderValue, REFERER, USER_AGENT};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const DEFAULT_API_URL: &str = "https://api.bilibili.com/x/web-interface/view";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// The API rejects requests without browser-like headers
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                                  (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
const REFERER_URL: &str = "https://www.bilibili.com";

/// `{code, message, data}` wrapper around every response
#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
    #[serde(default)]
    message: String,
    data: Option<VideoInfo>,
}

impl Envelope {
    fn into_info(self, video_id: &str) -> Result<VideoInfo> {
        if self.code != 0 {
            return Err(MetadataError::Api {
                code: self.code,
                message: self.message,
            });
        }
        self.data
            .ok_or_else(|| MetadataError::MissingData(video_id.to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct BilibiliClient {
    api_url: String,
    client: reqwest::blocking::Client,
}

impl BilibiliClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers.insert(REFERER, HeaderValue::from_static(REFERER_URL));

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            api_url: DEFAULT_API_URL.to_string(),
            client,
        })
    }

    #[must_use]
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Query parameter for an ID: `bvid=BV...` or `aid=<digits>`
    fn query_for(video_id: &str) -> Result<(&'static str, String)> {
        if video_id.starts_with("BV") {
            return Ok(("bvid", video_id.to_string()));
        }
        match video_id.strip_prefix("av") {
            Some(aid) if !aid.is_empty() && aid.bytes().all(|b| b.is_ascii_digit()) => {
                Ok(("aid", aid.to_string()))
            }
            _ => Err(MetadataError::InvalidVideoId(video_id.to_string())),
        }
    }
}

impl MetadataClient for BilibiliClient {
    fn video_info(&self, video_id: &str) -> Result<VideoInfo> {
        let (key, value) = Self::query_for(video_id)?;
        debug!("GET {}?{}={}", self.api_url, key, value);

        let envelope: Envelope = self
            .client
            .get(&self.api_url)
            .query(&[(key, value.as_str())])
            .send()?
            .error_for_status()?
            .json()?;

        envelope.into_info(video_id)
    }
}
