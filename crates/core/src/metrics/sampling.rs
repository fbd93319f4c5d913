//! Chart downsampling: cap a daily series at a point limit while keeping
//! both endpoints.

/// Default point limit for chart series.
pub const DEFAULT_THRESHOLD: usize = 200;

/// Downsamples `points` to at most `threshold` evenly spaced entries.
///
/// Series at or under the limit are returned unchanged. The first and
/// last points are always retained.
#[must_use]
pub fn downsample<T: Clone>(points: &[T], threshold: usize) -> Vec<T> {
    if threshold == 0 {
        return Vec::new();
    }
    if points.len() <= threshold {
        return points.to_vec();
    }
    if threshold == 1 {
        return vec![points[0].clone()];
    }

    let last = points.len() - 1;
    (0..threshold)
        .map(|i| points[i * last / (threshold - 1)].clone())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_small_series_unchanged() {
        let points: Vec<u32> = (0..50).collect();
        assert_eq!(downsample(&points, 200), points);
    }

    #[test]
    fn test_exact_threshold_unchanged() {
        let points: Vec<u32> = (0..200).collect();
        assert_eq!(downsample(&points, 200).len(), 200);
    }

    #[test]
    fn test_large_series_capped_with_endpoints() {
        let points: Vec<u32> = (0..1000).collect();
        let sampled = downsample(&points, 200);
        assert_eq!(sampled.len(), 200);
        assert_eq!(sampled[0], 0);
        assert_eq!(*sampled.last().unwrap(), 999);
    }

    #[test]
    fn test_zero_threshold() {
        let points: Vec<u32> = (0..10).collect();
        assert!(downsample(&points, 0).is_empty());
    }

    #[test]
    fn test_empty_series() {
        let points: Vec<u32> = vec![];
        assert!(downsample(&points, 200).is_empty());
    }

    proptest! {
        #[test]
        fn prop_never_exceeds_threshold_and_keeps_endpoints(
            len in 1usize..2000,
            threshold in 2usize..300,
        ) {
            let points: Vec<usize> = (0..len).collect();
            let sampled = downsample(&points, threshold);

            prop_assert!(sampled.len() <= threshold);
            prop_assert_eq!(sampled[0], 0);
            prop_assert_eq!(*sampled.last().unwrap(), len - 1);

            // Order is preserved.
            for pair in sampled.windows(2) {
                prop_assert!(pair[0] <= pair[1]);
            }
        }
    }
}
