use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::analysis::RankParams;

/// Configuration for the VOD highlighter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Twitch API settings
    pub twitch: TwitchConfig,

    /// Chat-log archive settings
    pub archive: ArchiveConfig,

    /// Analysis tuning knobs
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitchConfig {
    /// Client-ID header sent with every API call
    pub client_id: String,

    /// Base URL of the video API
    pub api_base: String,

    /// Maximum number of archived VODs fetched per run
    pub vod_limit: u32,

    /// Request timeout in seconds
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveConfig {
    /// Base URL of the chat-log archive
    pub base_url: String,

    /// Request timeout in seconds
    pub request_timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Maximum gap between VODs of the same session, in seconds
    pub max_inter_stream_secs: i64,

    /// Minimum separation between detected peaks, in seconds
    pub peak_distance: usize,

    /// Minimum prominence of a detected peak
    pub peak_prominence: f64,

    /// Lead-in subtracted from each highlight start, in seconds
    pub lead_in_seconds: usize,
}

impl AnalysisConfig {
    pub fn rank_params(&self) -> RankParams {
        RankParams {
            distance: self.peak_distance,
            prominence: self.peak_prominence,
            subtract_seconds: self.lead_in_seconds,
        }
    }
}

impl Config {
    /// Load configuration from the default location, falling back to
    /// defaults when no file exists. `TWITCH_CLIENT_ID` in the environment
    /// overrides the file value either way.
    pub fn load() -> Result<Self> {
        let mut config = if Path::new("config.toml").exists() {
            Self::load_from("config.toml")?
        } else {
            Self::default()
        };

        if let Ok(client_id) = std::env::var("TWITCH_CLIENT_ID") {
            config.twitch.client_id = client_id;
        }

        Ok(config)
    }

    /// Load configuration from a specific TOML file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        Ok(())
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.twitch.client_id.is_empty() {
            return Err(anyhow!(
                "twitch.client_id is required (or set TWITCH_CLIENT_ID)"
            ));
        }
        if self.twitch.vod_limit == 0 || self.twitch.vod_limit > 100 {
            return Err(anyhow!("twitch.vod_limit must be between 1 and 100"));
        }
        if self.analysis.max_inter_stream_secs < 0 {
            return Err(anyhow!("analysis.max_inter_stream_secs must not be negative"));
        }
        if self.analysis.peak_distance == 0 {
            return Err(anyhow!("analysis.peak_distance must be at least 1"));
        }
        if self.analysis.peak_prominence <= 0.0 {
            return Err(anyhow!("analysis.peak_prominence must be positive"));
        }
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "VOD Highlighter Configuration:\n\
            - VOD limit: {}\n\
            - Session gap threshold: {}s\n\
            - Peak distance: {}s\n\
            - Peak prominence: {}\n\
            - Highlight lead-in: {}s",
            self.twitch.vod_limit,
            self.analysis.max_inter_stream_secs,
            self.analysis.peak_distance,
            self.analysis.peak_prominence,
            self.analysis.lead_in_seconds,
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            twitch: TwitchConfig {
                client_id: String::new(),
                api_base: "https://api.twitch.tv/kraken".to_string(),
                vod_limit: 100,
                request_timeout_seconds: 30,
            },
            archive: ArchiveConfig {
                base_url: "https://overrustlelogs.net".to_string(),
                request_timeout_seconds: 30,
            },
            analysis: AnalysisConfig {
                max_inter_stream_secs: 3600,
                peak_distance: 150,
                peak_prominence: 1.0,
                lead_in_seconds: 30,
            },
        }
    }
}
