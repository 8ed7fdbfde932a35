/// Chat-activity analysis
///
/// Turns a VOD's bound chat messages into a per-second activity histogram,
/// detects spikes in it and converts the surviving spikes into timestamped
/// highlight markers.
pub mod frequency;
pub mod highlights;
pub mod peaks;

pub use frequency::message_frequencies;
pub use highlights::{markers_for_vod, rank, RankParams};
pub use peaks::find_peaks;
