//! Deterministic float ordering.
//!
//! Anything that sorts panels by a float coordinate goes through here so the
//! result does not depend on `-0.0` vs `0.0` or on NaN payloads.

use core::cmp::Ordering;

/// Canonicalize a floating-point value for deterministic ordering.
///
/// Rules:
/// - `-0.0` becomes `0.0`
/// - all NaNs become a single canonical NaN
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

/// Deterministic total ordering for floats.
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    canonical_f64(a).total_cmp(&canonical_f64(b))
}

/// Clamp that tolerates an inverted range by collapsing to `lo`.
pub fn clamp_f64(v: f64, lo: f64, hi: f64) -> f64 {
    if hi < lo {
        return lo;
    }
    v.max(lo).min(hi)
}

#[cfg(test)]
mod tests {
    use super::{canonical_f64, clamp_f64, stable_total_cmp_f64};
    use core::cmp::Ordering;

    #[test]
    fn canonicalizes_negative_zero() {
        assert_eq!(canonical_f64(-0.0), 0.0);
        assert_eq!(stable_total_cmp_f64(-0.0, 0.0), Ordering::Equal);
    }

    #[test]
    fn stable_cmp_is_total() {
        assert_eq!(stable_total_cmp_f64(1.0, 2.0), Ordering::Less);
        assert_eq!(stable_total_cmp_f64(f64::NAN, f64::NAN), Ordering::Equal);
    }

    #[test]
    fn clamp_handles_inverted_range() {
        assert_eq!(clamp_f64(5.0, 0.0, 3.0), 3.0);
        assert_eq!(clamp_f64(-1.0, 0.0, 3.0), 0.0);
        assert_eq!(clamp_f64(2.0, 4.0, 1.0), 4.0);
    }
}
