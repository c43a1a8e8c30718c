/// Gaussian falloff of an item's distance `d` from the scroll focus.
///
/// 1.0 at the focus, fading to 0 a few `sigma` away. Drives the cosmetic
/// magnification of idle items near the middle of the view.
pub fn proximity(d: f32, sigma: f32) -> f32 {
    if sigma <= 0.0 {
        return if d == 0.0 { 1.0 } else { 0.0 };
    }
    (-(d * d) / (2.0 * sigma * sigma)).exp()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_peak_and_falloff() {
        assert_eq!(proximity(0.0, 0.36), 1.0);
        let one_sigma = proximity(0.36, 0.36);
        assert!((one_sigma - (-0.5f32).exp()).abs() < 1e-6);
        assert!(proximity(2.0, 0.36) < 1e-6);
    }

    #[test]
    fn test_symmetric() {
        assert_eq!(proximity(0.2, 0.36), proximity(-0.2, 0.36));
    }

    #[test]
    fn test_degenerate_sigma() {
        assert_eq!(proximity(0.0, 0.0), 1.0);
        assert_eq!(proximity(0.1, 0.0), 0.0);
    }
}
