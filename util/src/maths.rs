//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Limit a value to the range `[min, max]`.
pub fn clamp<T>(value: T, min: T, max: T) -> T 
where
    T: Float
{
    let mut ret = value;

    if ret > max {
        ret = max
    }
    if ret < min {
        ret = min
    }

    ret
}

/// Square a value while keeping its sign, giving finer control near zero.
pub fn sign_preserving_square<T>(value: T) -> T
where
    T: Float
{
    value.abs() * value
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(1.5f64, -1.0, 1.0), 1.0);
        assert_eq!(clamp(-1.5f64, -1.0, 1.0), -1.0);
        assert_eq!(clamp(0.3f64, -1.0, 1.0), 0.3);
    }

    #[test]
    fn test_sign_preserving_square() {
        assert_eq!(sign_preserving_square(0.5f64), 0.25);
        assert_eq!(sign_preserving_square(-0.5f64), -0.25);
        assert_eq!(sign_preserving_square(0f64), 0.0);
    }
}
