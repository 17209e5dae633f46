use super::model::{DespikeOutcome, DespikeParams};
use crate::error::{Result, SparkError};

/// Scale factor that turns a MAD into a Gaussian-consistent sigma estimate.
pub const MAD_TO_SIGMA: f64 = 1.4826;

/// Below this many samples no sample has a neighbour to compare against.
const MIN_SAMPLES: usize = 2;

// ---------------------------------------------------------------------------
// Window statistics
// ---------------------------------------------------------------------------

/// Robust statistics of the neighbourhood around one sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowStats {
    pub median: f64,
    pub mad: f64,
}

impl WindowStats {
    /// Level above which the centre sample counts as a spike.
    pub fn threshold(&self, multiplier: f64) -> f64 {
        self.median + multiplier * MAD_TO_SIGMA * self.mad
    }
}

/// Statistics of `y[i-radius ..= i+radius]` clipped to the series, with
/// `y[i]` itself left out. `None` when the window holds nothing else.
pub fn window_stats(y: &[f64], i: usize, radius: usize) -> Option<WindowStats> {
    let mut scratch = Vec::with_capacity(2 * radius);
    window_stats_with(y, i, radius, &mut scratch)
}

fn window_stats_with(
    y: &[f64],
    i: usize,
    radius: usize,
    scratch: &mut Vec<f64>,
) -> Option<WindowStats> {
    let n = y.len();
    if i >= n {
        return None;
    }
    let lo = i.saturating_sub(radius);
    let hi = (i + radius + 1).min(n);

    scratch.clear();
    scratch.extend_from_slice(&y[lo..i]);
    scratch.extend_from_slice(&y[i + 1..hi]);
    if scratch.is_empty() {
        return None;
    }

    let median = median_in_place(scratch);
    for v in scratch.iter_mut() {
        *v = (*v - median).abs();
    }
    let mad = median_in_place(scratch);

    Some(WindowStats { median, mad })
}

/// Median with the even-length convention (mean of the two middle values).
/// Reorders `values`; the caller guarantees it is non-empty.
fn median_in_place(values: &mut [f64]) -> f64 {
    values.sort_unstable_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        (values[mid - 1] + values[mid]) / 2.0
    } else {
        values[mid]
    }
}

// ---------------------------------------------------------------------------
// Detection
// ---------------------------------------------------------------------------

/// Flag every sample that sits above its local threshold. Upward only.
///
/// Each sample is judged against the untouched input, never against values
/// corrected earlier in the scan.
pub fn detect_spikes(y: &[f64], params: &DespikeParams) -> Vec<bool> {
    let n = y.len();
    let mut mask = vec![false; n];
    if n < MIN_SAMPLES {
        return mask;
    }

    let radius = params.window_radius();
    let mut scratch = Vec::with_capacity(2 * radius);
    for (i, flag) in mask.iter_mut().enumerate() {
        if let Some(stats) = window_stats_with(y, i, radius, &mut scratch) {
            *flag = y[i] > stats.threshold(params.threshold_multiplier);
        }
    }
    mask
}

// ---------------------------------------------------------------------------
// Repair
// ---------------------------------------------------------------------------

/// Replace flagged samples by linear interpolation over sample position.
///
/// Flags before the first or after the last clean sample are extrapolated
/// from the nearest clean segment. A single clean sample extrapolates flat.
pub fn repair_spikes(y: &[f64], mask: &[bool]) -> Result<Vec<f64>> {
    debug_assert_eq!(y.len(), mask.len());
    let mut corrected = y.to_vec();
    if !mask.iter().any(|&m| m) {
        return Ok(corrected);
    }

    let anchors: Vec<usize> = mask
        .iter()
        .enumerate()
        .filter(|(_, &m)| !m)
        .map(|(i, _)| i)
        .collect();
    if anchors.is_empty() {
        return Err(SparkError::InsufficientReferenceData);
    }

    // `seg` is the index into `anchors` of the left end of the segment used
    // for the current position; it only moves forward.
    let mut seg = 0;
    for (i, value) in corrected.iter_mut().enumerate() {
        if !mask[i] {
            continue;
        }
        if anchors.len() == 1 {
            *value = y[anchors[0]];
            continue;
        }
        while seg + 2 < anchors.len() && anchors[seg + 1] < i {
            seg += 1;
        }
        let (a, b) = (anchors[seg], anchors[seg + 1]);
        *value = lerp(a, y[a], b, y[b], i);
    }
    Ok(corrected)
}

fn lerp(x0: usize, y0: f64, x1: usize, y1: f64, x: usize) -> f64 {
    let t = (x as f64 - x0 as f64) / (x1 as f64 - x0 as f64);
    y0 + t * (y1 - y0)
}

// ---------------------------------------------------------------------------
// Full pass
// ---------------------------------------------------------------------------

/// Detect and repair in one call.
pub fn despike(y: &[f64], params: &DespikeParams) -> Result<DespikeOutcome> {
    let mask = detect_spikes(y, params);
    let corrected = repair_spikes(y, &mask)?;
    let outcome = DespikeOutcome { mask, corrected };
    log::debug!(
        "Despiked {} samples (radius {}, multiplier {}): {} flagged",
        y.len(),
        params.window_radius(),
        params.threshold_multiplier,
        outcome.spike_count()
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(window_size: usize, threshold: f64) -> DespikeParams {
        DespikeParams::new(window_size, threshold).unwrap()
    }

    /// Smooth baseline with a little deterministic ripple.
    fn ripple(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + 2.0 * ((i as f64) * 0.7).sin() + 0.5 * ((i as f64) * 2.3).cos())
            .collect()
    }

    #[test]
    fn test_isolated_spike() {
        let y = [1.0, 1.0, 1.0, 1.0, 100.0, 1.0, 1.0, 1.0, 1.0];
        let out = despike(&y, &params(5, 3.0)).unwrap();
        assert_eq!(
            out.mask,
            vec![false, false, false, false, true, false, false, false, false]
        );
        assert_eq!(out.corrected, vec![1.0; 9]);
    }

    #[test]
    fn test_median_even_and_odd() {
        let mut odd = [3.0, 1.0, 2.0];
        assert_eq!(median_in_place(&mut odd), 2.0);
        let mut even = [4.0, 1.0, 3.0, 2.0];
        assert_eq!(median_in_place(&mut even), 2.5);
    }

    #[test]
    fn test_window_stats_values() {
        // Window of index 2 with radius 2: {1, 2, 8, 16}
        let y = [1.0, 2.0, 1000.0, 8.0, 16.0];
        let stats = window_stats(&y, 2, 2).unwrap();
        assert_eq!(stats.median, 5.0);
        // deviations {4, 3, 3, 11} -> 3.5
        assert_eq!(stats.mad, 3.5);
        assert!((stats.threshold(2.0) - (5.0 + 2.0 * MAD_TO_SIGMA * 3.5)).abs() < 1e-12);
    }

    #[test]
    fn test_boundary_windows_are_clipped() {
        let y = [50.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        // Index 0, radius 2: only y[1], y[2]
        let first = window_stats(&y, 0, 2).unwrap();
        assert_eq!(first.median, 1.5);
        assert_eq!(first.mad, 0.5);
        // Last index, radius 2: only y[3], y[4]
        let last = window_stats(&y, 5, 2).unwrap();
        assert_eq!(last.median, 3.5);
        assert_eq!(last.mad, 0.5);
        assert!(window_stats(&y, 6, 2).is_none());
    }

    #[test]
    fn test_centre_does_not_influence_its_own_window() {
        let mut y = ripple(21);
        let before = window_stats(&y, 10, 4).unwrap();
        y[10] = 1.0e9;
        let after = window_stats(&y, 10, 4).unwrap();
        assert_eq!(before, after);
        y[10] = -1.0e9;
        assert_eq!(window_stats(&y, 10, 4).unwrap(), before);
    }

    #[test]
    fn test_even_window_size_uses_floor_radius() {
        // A three-sample plateau hides from radius 2 but not from radius 3.
        let y = [1.0, 1.0, 1.0, 1.0, 1.0, 50.0, 50.0, 50.0, 1.0, 1.0, 1.0, 1.0, 1.0];
        let mut expected = vec![false; y.len()];
        expected[5..8].fill(true);

        assert!(detect_spikes(&y, &params(5, 3.0)).iter().all(|&m| !m));
        let six = detect_spikes(&y, &params(6, 3.0));
        assert_eq!(six, expected);
        assert_eq!(detect_spikes(&y, &params(7, 3.0)), six);

        let out = despike(&y, &params(6, 3.0)).unwrap();
        assert_eq!(out.corrected, vec![1.0; y.len()]);
    }

    #[test]
    fn test_single_sample_is_left_alone() {
        let out = despike(&[42.0], &params(5, 3.0)).unwrap();
        assert_eq!(out.mask, vec![false]);
        assert_eq!(out.corrected, vec![42.0]);
    }

    #[test]
    fn test_empty_input() {
        let out = despike(&[], &params(5, 3.0)).unwrap();
        assert!(out.mask.is_empty());
        assert!(out.corrected.is_empty());
    }

    #[test]
    fn test_dips_are_never_flagged() {
        let mut y = vec![10.0; 15];
        y[7] = -500.0;
        let out = despike(&y, &params(5, 1.0)).unwrap();
        assert_eq!(out.spike_count(), 0);
        assert_eq!(out.corrected, y);
    }

    #[test]
    fn test_clean_samples_are_bit_identical() {
        let mut y = ripple(60);
        y[5] += 80.0;
        y[6] += 60.0;
        y[31] += 200.0;
        y[59] += 150.0;
        let out = despike(&y, &params(7, 3.0)).unwrap();
        assert!(out.spike_count() >= 3);
        for i in 0..y.len() {
            if !out.mask[i] {
                assert_eq!(out.corrected[i].to_bits(), y[i].to_bits(), "index {i}");
            } else {
                assert!(out.corrected[i].is_finite());
            }
        }
    }

    #[test]
    fn test_higher_threshold_never_adds_flags() {
        let mut y = ripple(80);
        for (i, bump) in [(3, 9.0), (17, 4.0), (40, 30.0), (41, 12.0), (66, 6.0), (79, 20.0)] {
            y[i] += bump;
        }
        let mut previous = detect_spikes(&y, &params(9, 1.0));
        for t in [1.5, 2.0, 3.0, 4.5, 6.0, 10.0] {
            let current = detect_spikes(&y, &params(9, t));
            for i in 0..y.len() {
                assert!(!current[i] || previous[i], "index {i} appeared at multiplier {t}");
            }
            previous = current;
        }
    }

    #[test]
    fn test_detection_uses_original_values() {
        // Two adjacent spikes: if index 4 were corrected before index 5 was
        // judged, the result would differ from judging both on raw input.
        let y = [1.0, 1.0, 1.0, 1.0, 50.0, 50.0, 1.0, 1.0, 1.0, 1.0];
        let mask = detect_spikes(&y, &params(5, 3.0));
        assert_eq!(mask[4], y[4] > window_stats(&y, 4, 2).unwrap().threshold(3.0));
        assert_eq!(mask[5], y[5] > window_stats(&y, 5, 2).unwrap().threshold(3.0));
        assert!(mask[4] && mask[5]);
    }

    #[test]
    fn test_repair_interpolates_linearly() {
        let y = [0.0, 99.0, 99.0, 3.0, 4.0];
        let mask = [false, true, true, false, false];
        let fixed = repair_spikes(&y, &mask).unwrap();
        for (got, want) in fixed.iter().zip([0.0, 1.0, 2.0, 3.0, 4.0]) {
            assert!((got - want).abs() < 1e-12, "{got} vs {want}");
        }
    }

    #[test]
    fn test_repair_extrapolates_at_both_ends() {
        let y = [99.0, 99.0, 2.0, 3.0, 4.0, 99.0];
        let mask = [true, true, false, false, true, true];
        let fixed = repair_spikes(&y, &mask).unwrap();
        assert_eq!(fixed, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_repair_with_single_anchor_is_flat() {
        let y = [9.0, 7.0, 9.0];
        let fixed = repair_spikes(&y, &[true, false, true]).unwrap();
        assert_eq!(fixed, vec![7.0, 7.0, 7.0]);
    }

    #[test]
    fn test_all_flagged_is_an_error() {
        let y = [5.0, 6.0, 7.0];
        let err = repair_spikes(&y, &[true, true, true]).unwrap_err();
        assert!(matches!(err, SparkError::InsufficientReferenceData));
    }
}
