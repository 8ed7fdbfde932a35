use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use tokio::time::Duration;
use tracing::{debug, info};

use crate::error::{HighlightError, Result};
use crate::models::Vod;

/// Source of VOD metadata for a streamer.
///
/// Implementations resolve a streamer login to a channel id and list that
/// channel's archived broadcasts ascending by start time.
#[async_trait]
pub trait VodSource {
    async fn resolve_streamer(&self, login: &str) -> Result<String>;
    async fn fetch_vods(&self, streamer_id: &str, limit: u32) -> Result<Vec<Vod>>;
}

/// Source of raw per-day chat-log text.
#[async_trait]
pub trait LogSource {
    /// Fetch the newline-delimited chat log for one calendar day.
    async fn fetch_daily_log(&self, streamer: &str, date: NaiveDate) -> Result<String>;
}

const RECORDED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Client for the Twitch Kraken v5 video endpoints.
pub struct TwitchApi {
    client: reqwest::Client,
    api_base: String,
    client_id: String,
}

#[derive(Debug, Deserialize)]
struct UsersPayload {
    users: Vec<RawUser>,
}

#[derive(Debug, Deserialize)]
struct RawUser {
    #[serde(rename = "_id")]
    id: String,
}

#[derive(Debug, Deserialize)]
struct VideosPayload {
    videos: Vec<RawVideo>,
}

#[derive(Debug, Deserialize)]
struct RawVideo {
    broadcast_id: u64,
    url: String,
    length: i64,
    recorded_at: String,
}

impl TwitchApi {
    pub fn new(api_base: String, client_id: String, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            api_base,
            client_id,
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("Accept", "application/vnd.twitchtv.v5+json")
            .header("Client-ID", &self.client_id)
    }
}

#[async_trait]
impl VodSource for TwitchApi {
    async fn resolve_streamer(&self, login: &str) -> Result<String> {
        let url = format!("{}/users?login={}", self.api_base, login);
        debug!("resolving streamer id via {}", url);

        let payload: UsersPayload = self
            .get(&url)
            .send()
            .await?
            .json()
            .await
            .map_err(|_| HighlightError::UnknownStreamer {
                name: login.to_string(),
            })?;

        match payload.users.into_iter().next() {
            Some(user) => {
                info!("🔎 Resolved {} to channel id {}", login, user.id);
                Ok(user.id)
            }
            None => Err(HighlightError::UnknownStreamer {
                name: login.to_string(),
            }),
        }
    }

    async fn fetch_vods(&self, streamer_id: &str, limit: u32) -> Result<Vec<Vod>> {
        let url = format!(
            "{}/channels/{}/videos?broadcast_type=archive&limit={}",
            self.api_base, streamer_id, limit
        );
        debug!("fetching VOD list via {}", url);

        let payload: VideosPayload = self.get(&url).send().await?.json().await?;

        // The API returns newest first; the grouping step needs ascending
        // start order.
        let mut vods = Vec::with_capacity(payload.videos.len());
        for raw in payload.videos.into_iter().rev() {
            let started = NaiveDateTime::parse_from_str(&raw.recorded_at, RECORDED_AT_FORMAT)
                .map_err(|_| HighlightError::UnexpectedPayload {
                    context: format!("recorded_at {:?} in video list", raw.recorded_at),
                })?;
            vods.push(Vod::new(raw.broadcast_id, raw.url, started, raw.length));
        }

        info!("📼 Fetched {} archived VODs", vods.len());
        Ok(vods)
    }
}

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Client for the OverRustle chat-log archive.
pub struct OverrustleArchive {
    client: reqwest::Client,
    base_url: String,
}

impl OverrustleArchive {
    pub fn new(base_url: String, timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { client, base_url }
    }

    /// The archive stores one text file per streamer per day, keyed by the
    /// English month name.
    fn log_url(&self, streamer: &str, date: NaiveDate) -> String {
        use chrono::Datelike;
        let month_name = MONTH_NAMES[date.month0() as usize];
        format!(
            "{}/{}%20chatlog/{}%20{}/{}-{:02}-{:02}.txt",
            self.base_url,
            streamer,
            month_name,
            date.year(),
            date.year(),
            date.month(),
            date.day(),
        )
    }
}

#[async_trait]
impl LogSource for OverrustleArchive {
    async fn fetch_daily_log(&self, streamer: &str, date: NaiveDate) -> Result<String> {
        let url = self.log_url(streamer, date);
        info!("💬 Fetching chat log for {} on {}", streamer, date);
        let text = self.client.get(&url).send().await?.text().await?;
        Ok(text)
    }
}
