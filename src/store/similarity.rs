//! Distance to similarity conversion

/// Convert a cosine distance into a user-facing similarity score
///
/// Raw `1 - distance` compresses most results into a narrow band for the
/// embedding models we use, so distances are mapped through calibrated
/// ranges instead:
///
/// - distance <= 0.3  -> 0.85..=1.0
/// - 0.3 < d <= 0.6   -> 0.70..0.85
/// - 0.6 < d <= 0.9   -> 0.50..0.70
/// - 0.9 < d <= 1.2   -> 0.30..0.50
/// - d > 1.2          -> 0.0..0.30
#[must_use]
pub fn distance_to_similarity(distance: f32) -> f32 {
    if distance < 0.0 {
        return 1.0;
    }

    if distance <= 0.3 {
        0.85 + (0.3 - distance) / 0.3 * 0.15
    } else if distance <= 0.6 {
        0.70 + (0.6 - distance) / 0.3 * 0.15
    } else if distance <= 0.9 {
        0.50 + (0.9 - distance) / 0.3 * 0.20
    } else if distance <= 1.2 {
        0.30 + (1.2 - distance) / 0.3 * 0.20
    } else {
        (0.30 - (distance - 1.2) / 0.8 * 0.30).max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_vectors_score_one() {
        assert!((distance_to_similarity(0.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_band_boundaries() {
        assert!((distance_to_similarity(0.3) - 0.85).abs() < 1e-6);
        assert!((distance_to_similarity(0.6) - 0.70).abs() < 1e-6);
        assert!((distance_to_similarity(0.9) - 0.50).abs() < 1e-6);
        assert!((distance_to_similarity(1.2) - 0.30).abs() < 1e-6);
    }

    #[test]
    fn test_monotonically_decreasing() {
        let mut previous = f32::INFINITY;
        let mut d = 0.0f32;
        while d <= 2.0 {
            let s = distance_to_similarity(d);
            assert!(s <= previous, "similarity increased at distance {d}");
            previous = s;
            d += 0.05;
        }
    }

    #[test]
    fn test_far_distances_clamped_to_zero() {
        assert!((distance_to_similarity(2.0) - 0.0).abs() < 1e-6);
        assert!((distance_to_similarity(5.0) - 0.0).abs() < 1e-6);
    }

    #[test]
    fn test_negative_distance_clamped() {
        assert!((distance_to_similarity(-0.1) - 1.0).abs() < 1e-6);
    }
}
