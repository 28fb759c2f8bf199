//! Utility maths functions
//!
//! Angles in the navigation software are handled in degrees, counter-clockwise
//! positive, so the helpers here work in degrees too.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()` if `lhs` is much smaller than `rhs.abs()` in
/// magnitude and `lhs < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

/// Normalise an angle in degrees into the range [0, 360).
pub fn norm_deg_360<T>(angle_deg: T) -> T
where
    T: Float,
{
    let full: T = T::from(360.0).unwrap_or_else(T::max_value);

    let r = rem_euclid(angle_deg, full);

    // Round-off in rem_euclid can land exactly on the upper bound
    if r >= full {
        T::zero()
    } else {
        r
    }
}

/// Wrap an angle in degrees into the range (-180, 180].
pub fn wrap_deg_180<T>(angle_deg: T) -> T
where
    T: Float,
{
    let half: T = T::from(180.0).unwrap_or_else(T::max_value);
    let full: T = half + half;

    let r = norm_deg_360(angle_deg);

    if r > half {
        r - full
    } else {
        r
    }
}

/// Get the signed angle in degrees which takes `from_deg` onto `to_deg` by
/// the shortest rotation, in the range (-180, 180].
pub fn get_ang_dist_deg<T>(from_deg: T, to_deg: T) -> T
where
    T: Float,
{
    wrap_deg_180(to_deg - from_deg)
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_norm_deg_360() {
        assert_eq!(norm_deg_360(0f64), 0f64);
        assert_eq!(norm_deg_360(360f64), 0f64);
        assert_eq!(norm_deg_360(-90f64), 270f64);
        assert_eq!(norm_deg_360(450f64), 90f64);
        assert!(norm_deg_360(-1e-20f64) < 360f64);
    }

    #[test]
    fn test_wrap_deg_180() {
        assert_eq!(wrap_deg_180(180f64), 180f64);
        assert_eq!(wrap_deg_180(-180f64), 180f64);
        assert_eq!(wrap_deg_180(190f64), -170f64);
        assert_eq!(wrap_deg_180(-225f64), 135f64);
        assert_eq!(wrap_deg_180(45f32), 45f32);
    }

    #[test]
    fn test_get_ang_dist_deg() {
        assert_eq!(get_ang_dist_deg(90f64, 315f64), -135f64);
        assert_eq!(get_ang_dist_deg(350f64, 10f64), 20f64);
        assert_eq!(get_ang_dist_deg(10f64, 350f64), -20f64);
        assert_eq!(get_ang_dist_deg(0f64, 0f64), 0f64);
    }
}
