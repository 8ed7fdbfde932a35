use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info};

use crate::analysis::{markers_for_vod, RankParams};
use crate::cache::ChatLogCache;
use crate::error::Result;
use crate::models::{HighlightMarker, StreamSession};
use crate::sessions;
use crate::sources::{LogSource, VodSource};

/// Tuning for one highlighter run.
#[derive(Debug, Clone)]
pub struct PipelineParams {
    /// Maximum gap between VODs of the same session, in seconds.
    pub max_inter_stream_secs: i64,
    /// Maximum number of archived VODs fetched from the API.
    pub vod_limit: u32,
    /// Peak ranking knobs.
    pub rank: RankParams,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            max_inter_stream_secs: 3600,
            vod_limit: 100,
            rank: RankParams::default(),
        }
    }
}

/// Highlight candidates for one VOD, in ranked order.
#[derive(Debug, Clone, Serialize)]
pub struct VodReport {
    pub vod_id: u64,
    pub vod_url: String,
    pub markers: Vec<HighlightMarker>,
}

/// One reconstructed session and the per-VOD highlight candidates found in
/// its chat activity.
#[derive(Debug, Clone, Serialize)]
pub struct SessionReport {
    pub session: StreamSession,
    pub vods: Vec<VodReport>,
}

/// Wires the collaborators together: VOD fetch, session grouping, message
/// binding through the chat-log cache, then frequency analysis and peak
/// ranking per VOD.
pub struct Highlighter<V, L> {
    streamer: String,
    vod_source: V,
    cache: ChatLogCache<L>,
    params: PipelineParams,
}

impl<V: VodSource, L: LogSource> Highlighter<V, L> {
    pub fn new(
        streamer: impl Into<String>,
        vod_source: V,
        log_source: L,
        params: PipelineParams,
    ) -> Self {
        let streamer = streamer.into();
        let cache = ChatLogCache::new(streamer.clone(), log_source);
        Self {
            streamer,
            vod_source,
            cache,
            params,
        }
    }

    /// Sessions covering the target date, with every VOD's messages bound.
    pub async fn sessions_on(&mut self, date: NaiveDate) -> Result<Vec<StreamSession>> {
        let streamer_id = self.vod_source.resolve_streamer(&self.streamer).await?;
        let vods = self
            .vod_source
            .fetch_vods(&streamer_id, self.params.vod_limit)
            .await?;
        debug!("{} VODs in archive for {}", vods.len(), self.streamer);

        let mut sessions = sessions::group(&vods, date, self.params.max_inter_stream_secs);
        info!("🎬 {} session(s) cover {}", sessions.len(), date);

        for session in &mut sessions {
            self.bind_messages(session).await?;
        }
        Ok(sessions)
    }

    /// Populate each VOD's message list exactly once from the cache, using
    /// the VOD's own time window.
    async fn bind_messages(&mut self, session: &mut StreamSession) -> Result<()> {
        for vod in &mut session.vods {
            let messages = self
                .cache
                .messages_in_range(vod.time_started, vod.time_finished)
                .await?;
            debug!("bound {} messages to VOD {}", messages.len(), vod.id);
            vod.messages = messages;
        }
        Ok(())
    }

    /// Run the whole pipeline for one calendar date.
    pub async fn run(&mut self, date: NaiveDate) -> Result<Vec<SessionReport>> {
        let sessions = self.sessions_on(date).await?;
        let mut reports = Vec::with_capacity(sessions.len());

        for session in sessions {
            let vods = session
                .vods
                .iter()
                .map(|vod| VodReport {
                    vod_id: vod.id,
                    vod_url: vod.url.clone(),
                    markers: markers_for_vod(vod, &self.params.rank),
                })
                .collect();
            reports.push(SessionReport { session, vods });
        }

        let total_markers: usize = reports
            .iter()
            .flat_map(|r| r.vods.iter())
            .map(|v| v.markers.len())
            .sum();
        info!("✨ Found {} highlight candidate(s)", total_markers);
        Ok(reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HighlightError;
    use crate::models::Vod;
    use crate::sources::{LogSource, VodSource};
    use async_trait::async_trait;
    use chrono::{Duration, NaiveDate};
    use std::fmt::Write as _;

    struct FixedVods(Vec<Vod>);

    #[async_trait]
    impl VodSource for FixedVods {
        async fn resolve_streamer(&self, login: &str) -> Result<String> {
            if login == "nobody" {
                return Err(HighlightError::UnknownStreamer {
                    name: login.to_string(),
                });
            }
            Ok("1234".to_string())
        }

        async fn fetch_vods(&self, _streamer_id: &str, _limit: u32) -> Result<Vec<Vod>> {
            Ok(self.0.clone())
        }
    }

    /// Synthesizes one burst of chat lines per requested (clock, count)
    /// pair, for any day asked of it.
    struct BurstArchive {
        bursts: Vec<(u32, u32, u32)>,
    }

    #[async_trait]
    impl LogSource for BurstArchive {
        async fn fetch_daily_log(&self, _streamer: &str, date: NaiveDate) -> Result<String> {
            let mut text = String::new();
            for &(hour, minute, count) in &self.bursts {
                // Every line of a burst shares one wall-clock second, so a
                // burst shows up as a single histogram spike of that height.
                for i in 0..count {
                    writeln!(
                        text,
                        "[{} {:02}:{:02}:00 UTC] viewer{}: PogChamp",
                        date.format("%Y-%m-%d"),
                        hour,
                        minute,
                        i
                    )
                    .ok();
                }
            }
            Ok(text)
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 3, 12).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_streamer_is_fatal() {
        let mut highlighter = Highlighter::new(
            "nobody",
            FixedVods(Vec::new()),
            BurstArchive { bursts: Vec::new() },
            PipelineParams::default(),
        );
        let err = highlighter.run(day()).await.unwrap_err();
        assert!(matches!(err, HighlightError::UnknownStreamer { .. }));
    }

    #[tokio::test]
    async fn test_no_vods_on_date_yields_empty_report() {
        let start = day().pred_opt().unwrap().and_hms_opt(1, 0, 0).unwrap();
        let vods = vec![Vod::new(1, "u".into(), start, 600)];
        let mut highlighter = Highlighter::new(
            "loltyler1",
            FixedVods(vods),
            BurstArchive { bursts: Vec::new() },
            PipelineParams::default(),
        );
        assert!(highlighter.run(day()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_run_binds_messages_and_finds_markers() {
        // One two-hour VOD; chat bursts at 10:30 (small) and 11:30 (large)
        // against a sparse baseline.
        let start = day().and_hms_opt(10, 0, 0).unwrap();
        let vods = vec![Vod::new(
            7,
            "https://www.twitch.tv/videos/7".to_string(),
            start,
            7200,
        )];
        let archive = BurstArchive {
            bursts: vec![(10, 30, 4), (11, 30, 12)],
        };

        let mut highlighter = Highlighter::new(
            "loltyler1",
            FixedVods(vods),
            archive,
            PipelineParams::default(),
        );
        let reports = highlighter.run(day()).await.unwrap();

        assert_eq!(reports.len(), 1);
        let session = &reports[0].session;
        assert_eq!(session.vods.len(), 1);
        assert_eq!(session.vods[0].messages.len(), 16);

        let markers = &reports[0].vods[0].markers;
        // Peak values 4 and 12; the secondary median cut keeps the 11:30
        // burst only, 30s lead-in applied: 5400 - 30.
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].offset_seconds, 5370);
        assert_eq!(
            markers[0].url,
            "https://www.twitch.tv/videos/7/?t=01h29m30s"
        );
    }

    #[tokio::test]
    async fn test_split_sessions_get_separate_reports() {
        let start1 = day().and_hms_opt(10, 0, 0).unwrap();
        let start2 = start1 + Duration::seconds(1800 + 1800); // 30min gap
        let start3 = day().and_hms_opt(20, 0, 0).unwrap();
        let vods = vec![
            Vod::new(1, "u1".into(), start1, 1800),
            Vod::new(2, "u2".into(), start2, 1800),
            Vod::new(3, "u3".into(), start3, 1800),
        ];
        let mut highlighter = Highlighter::new(
            "loltyler1",
            FixedVods(vods),
            BurstArchive { bursts: Vec::new() },
            PipelineParams::default(),
        );
        let reports = highlighter.run(day()).await.unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].session.vods.len(), 2);
        assert_eq!(reports[1].session.vods.len(), 1);
        // No chat activity, no markers, and that is not an error.
        assert!(reports.iter().all(|r| r
            .vods
            .iter()
            .all(|v| v.markers.is_empty())));
    }
}
