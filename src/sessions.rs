use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

use crate::models::{StreamSession, Vod};

/// Reconstructs logical streaming sessions from a flat, possibly fragmented
/// VOD list.
///
/// The input list must be sorted ascending by `time_started`. Grouping runs
/// in three steps: pick the pivot VODs whose date range covers the target
/// date, extend that set outward along the full list while neighbouring
/// boundary gaps stay within the threshold, then partition the extended set
/// into sessions wherever a gap exceeds the threshold.
pub fn group(vods: &[Vod], target_date: NaiveDate, gap_threshold_secs: i64) -> Vec<StreamSession> {
    let pivots = pivot_indices(vods, target_date);
    if pivots.is_empty() {
        debug!("no VODs cover {}", target_date);
        return Vec::new();
    }

    let first = pivots[0];
    let last = pivots[pivots.len() - 1];

    let mut selected = extend_backward(vods, first, gap_threshold_secs);
    selected.extend(pivots);
    selected.extend(extend_forward(vods, last, gap_threshold_secs));

    let relevant: Vec<Vod> = selected.into_iter().map(|i| vods[i].clone()).collect();
    debug!(
        "{} relevant VODs around {} (threshold {}s)",
        relevant.len(),
        target_date,
        gap_threshold_secs
    );
    partition(relevant, gap_threshold_secs)
}

/// Indices of VODs whose `[start.date(), finish.date()]` range contains the
/// target date.
fn pivot_indices(vods: &[Vod], target_date: NaiveDate) -> Vec<usize> {
    vods.iter()
        .enumerate()
        .filter(|(_, v)| v.covers_date(target_date))
        .map(|(i, _)| i)
        .collect()
}

// Gap comparison uses the absolute value of the signed delta: a segment
// that starts before its predecessor finishes (overlapping, malformed
// input) still merges as if contiguous.
fn within_gap(a: NaiveDateTime, b: NaiveDateTime, threshold_secs: i64) -> bool {
    (a - b).num_seconds().abs() <= threshold_secs
}

/// Walk backward from `index`, collecting predecessors that belong to the
/// same uninterrupted session. Returned indices are in ascending order.
fn extend_backward(vods: &[Vod], index: usize, threshold_secs: i64) -> Vec<usize> {
    let mut added = Vec::new();
    let mut i = index;
    while i > 0 {
        if within_gap(vods[i - 1].time_finished, vods[i].time_started, threshold_secs) {
            added.push(i - 1);
        } else {
            break;
        }
        i -= 1;
    }
    added.reverse();
    added
}

/// Walk forward from `index`, collecting successors that belong to the same
/// uninterrupted session.
fn extend_forward(vods: &[Vod], index: usize, threshold_secs: i64) -> Vec<usize> {
    let mut added = Vec::new();
    let mut i = index;
    while i + 1 < vods.len() {
        if within_gap(vods[i + 1].time_started, vods[i].time_finished, threshold_secs) {
            added.push(i + 1);
        } else {
            break;
        }
        i += 1;
    }
    added
}

/// Single scan over the relevant VODs: a new session starts whenever the gap
/// to the previous VOD exceeds the threshold; equality merges.
fn partition(vods: Vec<Vod>, threshold_secs: i64) -> Vec<StreamSession> {
    let mut sessions = Vec::new();
    let mut current: Vec<Vod> = Vec::new();

    for vod in vods {
        match current.last() {
            Some(prev) if !within_gap(vod.time_started, prev.time_finished, threshold_secs) => {
                sessions.push(StreamSession::new(std::mem::take(&mut current)));
                current.push(vod);
            }
            _ => current.push(vod),
        }
    }
    if !current.is_empty() {
        sessions.push(StreamSession::new(current));
    }
    sessions
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2019, 3, 12).unwrap()
    }

    fn vod(id: u64, date: NaiveDate, hour: u32, min: u32, duration_secs: i64) -> Vod {
        let start = date.and_hms_opt(hour, min, 0).unwrap();
        Vod::new(id, format!("https://example.com/v/{id}"), start, duration_secs)
    }

    #[test]
    fn test_empty_input_yields_no_sessions() {
        assert!(group(&[], day(), 3600).is_empty());
    }

    #[test]
    fn test_no_pivots_yields_no_sessions() {
        let vods = vec![vod(1, day().pred_opt().unwrap(), 10, 0, 3600)];
        assert!(group(&vods, day(), 3600).is_empty());
    }

    #[test]
    fn test_single_vod_single_session() {
        let vods = vec![vod(1, day(), 10, 0, 3600)];
        let sessions = group(&vods, day(), 3600);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].vods.len(), 1);
        assert_eq!(sessions[0].vods[0].id, 1);
    }

    #[test]
    fn test_gap_partitioning() {
        // VOD1 10:00-10:30, VOD2 11:00 (gap 1800s, merged), VOD3 15:00
        // (gap from 11:30 finish is 12600s, split) with threshold 3600s.
        let vods = vec![
            vod(1, day(), 10, 0, 1800),
            vod(2, day(), 11, 0, 1800),
            vod(3, day(), 15, 0, 1800),
        ];
        let sessions = group(&vods, day(), 3600);
        assert_eq!(sessions.len(), 2);
        let ids: Vec<u64> = sessions[0].vods.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(sessions[1].vods[0].id, 3);
    }

    #[test]
    fn test_gap_equal_to_threshold_merges() {
        let vods = vec![vod(1, day(), 10, 0, 1800), vod(2, day(), 11, 30, 1800)];
        // Gap is exactly 3600s between 10:30 and 11:30.
        let sessions = group(&vods, day(), 3600);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].vods.len(), 2);
    }

    #[test]
    fn test_extension_pulls_in_adjacent_days() {
        let prev = day().pred_opt().unwrap();
        let next = day().succ_opt().unwrap();
        // Late-night VOD ends 23:50 the day before; pivot starts 00:10;
        // another VOD starts 00:20 the day after the pivot ends.
        let vods = vec![
            vod(1, prev, 23, 0, 3000),
            vod(2, day(), 0, 10, 84_600),
            vod(3, next, 0, 20, 600),
        ];
        let sessions = group(&vods, day(), 3600);
        assert_eq!(sessions.len(), 1);
        let ids: Vec<u64> = sessions[0].vods.iter().map(|v| v.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_extension_stops_at_large_gap() {
        let prev = day().pred_opt().unwrap();
        let vods = vec![
            vod(1, prev, 10, 0, 3600),
            vod(2, prev, 23, 30, 3600),
            vod(3, day(), 1, 0, 3600),
        ];
        let sessions = group(&vods, day(), 3600);
        assert_eq!(sessions.len(), 1);
        let ids: Vec<u64> = sessions[0].vods.iter().map(|v| v.id).collect();
        // VOD1 is separated from VOD2 by far more than the threshold.
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_overlapping_vods_merge() {
        // VOD2 starts before VOD1 finishes; the absolute gap is small, so
        // they are still treated as one continuous session.
        let vods = vec![vod(1, day(), 10, 0, 3600), vod(2, day(), 10, 30, 3600)];
        let sessions = group(&vods, day(), 3600);
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].vods.len(), 2);
    }

    #[test]
    fn test_inter_session_gaps_exceed_threshold() {
        let vods = vec![
            vod(1, day(), 8, 0, 1800),
            vod(2, day(), 9, 0, 1800),
            vod(3, day(), 13, 0, 1800),
            vod(4, day(), 14, 0, 1800),
        ];
        let sessions = group(&vods, day(), 3600);
        assert_eq!(sessions.len(), 2);
        for session in &sessions {
            for pair in session.vods.windows(2) {
                let gap = (pair[1].time_started - pair[0].time_finished)
                    .num_seconds()
                    .abs();
                assert!(gap <= 3600);
            }
        }
        let tail = sessions[0].vods.last().unwrap().time_finished;
        let head = sessions[1].vods[0].time_started;
        assert!((head - tail).num_seconds().abs() > 3600);
    }
}
