/// VOD Highlighter
///
/// Locates candidate highlight moments in archived Twitch broadcasts by
/// correlating spikes in chat activity with video timestamps.

pub mod analysis;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod sessions;
pub mod sources;

// Re-export main types for easy access
pub use crate::analysis::{markers_for_vod, RankParams};
pub use crate::cache::ChatLogCache;
pub use crate::config::Config;
pub use crate::error::{HighlightError, Result};
pub use crate::models::{ChatMessage, HighlightMarker, StreamSession, Vod};
pub use crate::pipeline::{Highlighter, PipelineParams, SessionReport};
pub use crate::sources::{LogSource, OverrustleArchive, TwitchApi, VodSource};
