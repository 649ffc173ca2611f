//! Free-space transmittance and knife-edge diffraction loss.

use rustfft::num_complex::Complex64;
use std::f64::consts::PI;

/// Path lengths below this are floored before division.
pub const MIN_PATH_LENGTH: f64 = 1e-6;
/// Floor for magnitudes fed to `log10`.
pub const MIN_LINEAR: f64 = 1e-15;

/// Reference value of the Berg edge parameter.
const BERG_Q_LAMBDA: f64 = 0.1;
const BERG_EXPONENT: f64 = 1.5;

/// Coherent free-space transfer function of a path of length `r`:
/// `R * (lambda / 4 pi r) * exp(-j 2 pi r / lambda)`.
pub fn transmittance(r: f64, wavelength: f64, reflection: f64) -> Complex64 {
    let r = r.max(MIN_PATH_LENGTH);
    let amplitude = reflection * wavelength / (4.0 * PI * r);
    Complex64::from_polar(amplitude, -2.0 * PI * r / wavelength)
}

/// Received power in dBm for a path of length `r`.
pub fn received_power_dbm(
    tx_power_w: f64,
    r: f64,
    wavelength: f64,
    reflection: f64,
    loss_db: f64,
) -> f64 {
    let h = transmittance(r, wavelength, reflection).norm().max(MIN_LINEAR);
    10.0 * tx_power_w.max(MIN_LINEAR).log10() + 20.0 * h.log10() - loss_db
}

/// Berg knife-edge loss in dB.
///
/// `d1` is the distance to the edge, `d2` the distance past it and `alpha`
/// the deviation from the incident direction in radians. Out-of-domain
/// arguments give no loss.
pub fn berg_diffraction_loss(d1: f64, d2: f64, wavelength: f64, alpha: f64) -> f64 {
    if d1 <= 0.0 || d2 <= 0.0 || wavelength <= 0.0 || alpha <= 0.0 || alpha > PI {
        return 0.0;
    }
    let q90 = (BERG_Q_LAMBDA / wavelength).sqrt();
    let q1 = q90 * (alpha.to_degrees() / 90.0).powf(BERG_EXPONENT);
    let loss = 20.0 * (1.0 + d1 * d2 * q1 / (d1 + d2)).log10();
    loss.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAMBDA: f64 = 0.124913524;

    #[test]
    fn test_transmittance_magnitude() {
        let h = transmittance(10.0, LAMBDA, 1.0);
        assert!((h.norm() - LAMBDA / (40.0 * PI)).abs() < 1e-12);
        let h = transmittance(10.0, LAMBDA, 0.5);
        assert!((h.norm() - 0.5 * LAMBDA / (40.0 * PI)).abs() < 1e-12);
    }

    #[test]
    fn test_transmittance_phase() {
        let r = LAMBDA / 4.0;
        let h = transmittance(r, LAMBDA, 1.0);
        // exp(-j pi/2) = -j
        assert!(h.re.abs() < 1e-9 * h.norm());
        assert!(h.im < 0.0);
    }

    #[test]
    fn test_short_paths_are_floored() {
        let a = received_power_dbm(1.0, 0.0, LAMBDA, 1.0, 0.0);
        let b = received_power_dbm(1.0, MIN_PATH_LENGTH, LAMBDA, 1.0, 0.0);
        assert!(a.is_finite());
        assert!((a - b).abs() < 1e-12);
    }

    #[test]
    fn test_free_space_at_one_metre() {
        let p = received_power_dbm(1.0, 1.0, LAMBDA, 1.0, 0.0);
        assert!((p + 40.05).abs() < 0.01, "{p}");
        let p = received_power_dbm(10.0, 1.0, LAMBDA, 1.0, 3.0);
        assert!((p + 33.05).abs() < 0.01, "{p}");
    }

    #[test]
    fn test_power_decays_monotonically_with_distance() {
        let mut prev = f64::INFINITY;
        for k in 1..500 {
            let r = k as f64 * 0.37;
            let p = received_power_dbm(1.0, r, LAMBDA, 1.0, 0.0);
            assert!(p < prev, "power did not decrease at r = {r}");
            prev = p;
        }
    }

    #[test]
    fn test_zero_reflection_is_floored() {
        let p = received_power_dbm(1.0, 5.0, LAMBDA, 0.0, 0.0);
        assert!((p + 300.0).abs() < 1e-9);
    }

    #[test]
    fn test_berg_out_of_domain() {
        assert_eq!(berg_diffraction_loss(0.0, 5.0, LAMBDA, 0.5), 0.0);
        assert_eq!(berg_diffraction_loss(5.0, 0.0, LAMBDA, 0.5), 0.0);
        assert_eq!(berg_diffraction_loss(5.0, 5.0, 0.0, 0.5), 0.0);
        assert_eq!(berg_diffraction_loss(5.0, 5.0, LAMBDA, 0.0), 0.0);
        assert_eq!(berg_diffraction_loss(5.0, 5.0, LAMBDA, 3.2), 0.0);
    }

    #[test]
    fn test_berg_value() {
        let d1: f64 = 10.0;
        let d2: f64 = 5.0;
        let q1 = (0.1 / LAMBDA).sqrt() * (45.0_f64 / 90.0).powf(1.5);
        let expected = 20.0 * (1.0 + d1 * d2 * q1 / (d1 + d2)).log10();
        let loss = berg_diffraction_loss(d1, d2, LAMBDA, PI / 4.0);
        assert!((loss - expected).abs() < 1e-12);
    }

    #[test]
    fn test_berg_grows_with_angle_and_distance() {
        let small = berg_diffraction_loss(10.0, 5.0, LAMBDA, 0.2);
        let large = berg_diffraction_loss(10.0, 5.0, LAMBDA, 1.2);
        assert!(large > small);
        let far = berg_diffraction_loss(10.0, 50.0, LAMBDA, 0.2);
        assert!(far > small);
    }
}
