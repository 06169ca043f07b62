/// Map `value` from the source range `from` onto the target range `to`.
///
/// No clamping is applied, so values outside `from` are extrapolated
/// proportionally. Returns `None` when the source range is empty
/// (`from.0 == from.1`), where the mapping is undefined.
pub fn map_range(value: f64, from: (f64, f64), to: (f64, f64)) -> Option<f64> {
    let (a1, a2) = from;
    let (b1, b2) = to;
    if a1 == a2 {
        return None;
    }
    Some((value - a1) * (b2 - b1) / (a2 - a1) + b1)
}

/// Blur strength (sigma) for a level in `[0, steps]`.
///
/// Level 0 maps to no blur and level `steps` to `max_strength`. A zero
/// `steps` yields 0.0 rather than an undefined value.
pub fn level_strength(level: u32, steps: u32, max_strength: f64) -> f64 {
    map_range(level as f64, (0.0, steps as f64), (0.0, max_strength)).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rstest::rstest;

    #[rstest]
    #[case::half(0.5, (0.0, 1.0), (0.0, 10.0), 5.0)]
    #[case::down_scale(2.0, (0.0, 10.0), (0.0, 1.0), 0.2)]
    #[case::byte_to_unit(128.0, (0.0, 255.0), (0.0, 1.0), 0.5019607)]
    #[case::offset_ranges(6.0, (10.0, 48.0), (5.0, 9.0), 4.578947)]
    fn test_map_range_positive(
        #[case] value: f64,
        #[case] from: (f64, f64),
        #[case] to: (f64, f64),
        #[case] expected: f64,
    ) {
        assert_relative_eq!(map_range(value, from, to).unwrap(), expected, epsilon = 1e-6);
    }

    #[rstest]
    #[case::negative_target(0.5, (0.0, 1.0), (0.0, -10.0), -5.0)]
    #[case::negative_source(-2.0, (0.0, -10.0), (0.0, 1.0), 0.2)]
    #[case::both_negative(-8.0, (0.0, -10.0), (0.0, -1.0), -0.8)]
    fn test_map_range_negative(
        #[case] value: f64,
        #[case] from: (f64, f64),
        #[case] to: (f64, f64),
        #[case] expected: f64,
    ) {
        assert_relative_eq!(map_range(value, from, to).unwrap(), expected, epsilon = 1e-9);
    }

    #[rstest]
    #[case::above(6.0, (0.0, 1.0), (0.0, 10.0), 60.0)]
    #[case::above_offset(20.5, (10.0, 20.0), (0.0, 10.0), 10.5)]
    #[case::below_offset(5.2, (10.0, 20.0), (0.0, 10.0), -4.8)]
    #[case::below(-4.0, (0.0, 1.0), (1.0, 2.0), -3.0)]
    fn test_map_range_extrapolates(
        #[case] value: f64,
        #[case] from: (f64, f64),
        #[case] to: (f64, f64),
        #[case] expected: f64,
    ) {
        assert_relative_eq!(map_range(value, from, to).unwrap(), expected, epsilon = 1e-9);
    }

    #[test]
    fn test_map_range_empty_source_is_undefined() {
        assert!(map_range(3.0, (4.0, 4.0), (0.0, 1.0)).is_none());
    }

    #[test]
    fn test_level_strength_endpoints() {
        assert_relative_eq!(level_strength(0, 10, 12.0), 0.0);
        assert_relative_eq!(level_strength(10, 10, 12.0), 12.0);
        assert_relative_eq!(level_strength(4, 10, 12.0), 4.8, epsilon = 1e-9);
    }

    #[test]
    fn test_level_strength_is_monotonic() {
        let steps = 17;
        let strengths: Vec<f64> = (0..=steps).map(|l| level_strength(l, steps, 9.5)).collect();
        assert!(strengths.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn test_level_strength_zero_steps() {
        assert_relative_eq!(level_strength(0, 0, 10.0), 0.0);
    }
}
