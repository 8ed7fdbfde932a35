use serde::{Deserialize, Serialize};
use tracing::debug;

use super::frequency::message_frequencies;
use super::peaks::{find_peaks, median};
use crate::models::{HighlightMarker, Vod};

/// Knobs for peak ranking, mirroring the analysis section of the config.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankParams {
    /// Minimum separation between detected peaks, in seconds.
    pub distance: usize,
    /// Minimum prominence of a detected peak.
    pub prominence: f64,
    /// Lead-in subtracted from each peak so clips start slightly before the
    /// activity spike.
    pub subtract_seconds: usize,
}

impl Default for RankParams {
    fn default() -> Self {
        Self {
            distance: 150,
            prominence: 1.0,
            subtract_seconds: 30,
        }
    }
}

/// Ranked highlight offsets for one activity histogram.
///
/// Detection requires peaks to clear the histogram's median height, the
/// separation `distance` and the `prominence` floor simultaneously. A
/// second, tighter cut then keeps only peaks strictly above the median of
/// the detected peaks' own values. Surviving offsets get the lead-in
/// subtracted (clamped at zero) and are ordered by their histogram value,
/// lowest-magnitude qualifying spike first.
pub fn rank(histogram: &[u32], params: &RankParams) -> Vec<usize> {
    if histogram.is_empty() {
        return Vec::new();
    }

    let peaks = find_peaks(
        histogram,
        median(histogram),
        params.distance,
        params.prominence,
    );
    if peaks.is_empty() {
        return Vec::new();
    }

    let peak_values: Vec<u32> = peaks.iter().map(|&p| histogram[p]).collect();
    let cutoff = median(&peak_values);
    debug!(
        "{} detected peaks, secondary cutoff {:.1}",
        peaks.len(),
        cutoff
    );

    let mut offsets: Vec<usize> = peaks
        .into_iter()
        .filter(|&p| (histogram[p] as f64) > cutoff)
        .map(|p| p.saturating_sub(params.subtract_seconds))
        .collect();
    offsets.sort_by_key(|&offset| histogram[offset]);
    offsets
}

fn seconds_to_hms(total_seconds: usize) -> (usize, usize, usize) {
    let (hours, rest) = (total_seconds / 3600, total_seconds % 3600);
    (hours, rest / 60, rest % 60)
}

/// Clip URL anchored at an offset into the VOD, in the player's
/// `?t=<HH>h<MM>m<SS>s` query form.
pub fn clip_url(vod_url: &str, offset_seconds: usize) -> String {
    let (hours, minutes, seconds) = seconds_to_hms(offset_seconds);
    format!("{}/?t={:02}h{:02}m{:02}s", vod_url, hours, minutes, seconds)
}

/// Full analysis of one VOD with bound messages: histogram, peak ranking
/// and marker construction, in ranked order.
pub fn markers_for_vod(vod: &Vod, params: &RankParams) -> Vec<HighlightMarker> {
    let histogram = message_frequencies(vod);
    rank(&histogram, params)
        .into_iter()
        .map(|offset| HighlightMarker {
            vod_id: vod.id,
            offset_seconds: offset as u64,
            url: clip_url(&vod.url, offset),
        })
        .collect()
}
