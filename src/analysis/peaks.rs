/// Local-maxima peak detection over an activity histogram.
///
/// The peak and prominence definitions here are part of the system's
/// observable contract, so the algorithm is implemented in full rather than
/// delegated to a numerical toolkit:
///
/// 1. Candidate peaks are interior samples strictly greater than both
///    neighbours; a flat plateau counts once, at its middle sample.
/// 2. Candidates below `min_height` are dropped.
/// 3. Candidates closer than `distance` samples to a taller kept candidate
///    are suppressed, tallest first; a separation of exactly `distance`
///    survives.
/// 4. Candidates whose prominence falls below `min_prominence` are dropped.
///    Prominence is the drop from the peak to the higher of the two lowest
///    valleys on either side, where each side's valley search stops at the
///    first sample taller than the peak (or the histogram edge).
///
/// Returned indices are in ascending position order.
pub fn find_peaks(
    values: &[u32],
    min_height: f64,
    distance: usize,
    min_prominence: f64,
) -> Vec<usize> {
    let mut peaks = local_maxima(values);
    peaks.retain(|&p| values[p] as f64 >= min_height);
    let mut peaks = select_by_distance(peaks, values, distance);
    peaks.retain(|&p| prominence_of(values, p) >= min_prominence);
    peaks
}

/// Median of a sequence of counts; the mean of the two middle values for an
/// even length, 0 for an empty sequence.
pub fn median(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    } else {
        sorted[mid] as f64
    }
}

/// Interior samples strictly greater than both neighbours. A plateau is
/// reported once, at its middle index; plateaus touching either edge are
/// not peaks.
fn local_maxima(values: &[u32]) -> Vec<usize> {
    let n = values.len();
    let mut peaks = Vec::new();
    if n < 3 {
        return peaks;
    }

    let mut i = 1;
    while i < n - 1 {
        if values[i] > values[i - 1] {
            // Right edge of a possible plateau starting at i.
            let mut j = i;
            while j + 1 < n && values[j + 1] == values[i] {
                j += 1;
            }
            if j + 1 < n && values[j + 1] < values[i] {
                peaks.push((i + j) / 2);
            }
            i = j + 1;
        } else {
            i += 1;
        }
    }
    peaks
}

/// Greedy distance suppression, tallest peak first: any remaining peak
/// strictly closer than `distance` samples to a kept peak is removed.
fn select_by_distance(peaks: Vec<usize>, values: &[u32], distance: usize) -> Vec<usize> {
    if peaks.len() < 2 || distance < 2 {
        return peaks;
    }

    let mut keep = vec![true; peaks.len()];
    let mut order: Vec<usize> = (0..peaks.len()).collect();
    order.sort_by_key(|&k| values[peaks[k]]);

    for &k in order.iter().rev() {
        if !keep[k] {
            continue;
        }
        let mut j = k;
        while j > 0 {
            j -= 1;
            if peaks[k] - peaks[j] < distance {
                keep[j] = false;
            } else {
                break;
            }
        }
        let mut j = k + 1;
        while j < peaks.len() {
            if peaks[j] - peaks[k] < distance {
                keep[j] = false;
                j += 1;
            } else {
                break;
            }
        }
    }

    peaks
        .into_iter()
        .zip(keep)
        .filter_map(|(p, kept)| kept.then_some(p))
        .collect()
}

/// Vertical drop from the peak to the higher of its two base valleys.
fn prominence_of(values: &[u32], peak: usize) -> f64 {
    let height = values[peak];

    let mut left_base = height;
    let mut i = peak;
    while i > 0 {
        i -= 1;
        if values[i] > height {
            break;
        }
        left_base = left_base.min(values[i]);
    }

    let mut right_base = height;
    let mut i = peak;
    while i + 1 < values.len() {
        i += 1;
        if values[i] > height {
            break;
        }
        right_base = right_base.min(values[i]);
    }

    (height - left_base.max(right_base)) as f64
}
