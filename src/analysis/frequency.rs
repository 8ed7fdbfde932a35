use crate::models::Vod;

/// Per-second message-frequency histogram for one VOD, one bucket per
/// elapsed second of the recording.
///
/// Each bound message lands in the bucket `floor(timestamp - start)`,
/// clamped to the valid bucket range so boundary messages are counted at
/// the nearest edge instead of dropped. A zero-length VOD yields an empty
/// histogram.
pub fn message_frequencies(vod: &Vod) -> Vec<u32> {
    let total_secs = vod.duration_seconds();
    if total_secs <= 0 {
        return Vec::new();
    }

    let mut buckets = vec![0u32; total_secs as usize];
    for message in &vod.messages {
        let delta = (message.timestamp - vod.time_started).num_seconds();
        let bucket = delta.clamp(0, total_secs - 1) as usize;
        buckets[bucket] += 1;
    }
    buckets
}
