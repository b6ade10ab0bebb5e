//! Core numerical pieces of the profile builder.
//!
//! The pressure/temperature walk and the water vapor profile come from two
//! separate models: hydrostatic integration on one side ([`hydrostatic_step`])
//! and an exponential decay with height on the other
//! ([`water_vapor_at_height`]). They are not coupled.

/// Mean radius of the Earth in km
pub(crate) const EARTH_RADIUS_KM: f64 = 6371.2;

/// Standard gravity at the surface in m/s²
pub(crate) const STANDARD_GRAVITY: f64 = 9.80665;

/// Hydrostatic constant, `R / M` in the mixed units of the step formula
pub(crate) const HYDROSTATIC_CONSTANT: f64 = 288.6948;

/// Quadratic interpolation through three points.
///
/// Fits `y = a + b x + c x²` exactly through `(x1, y1)`, `(x2, y2)` and `(x3,
/// y3)` and evaluates it at `ha`. The abscissas must be distinct; repeated
/// abscissas divide by zero and the result is NaN or infinite.
pub fn poli2(ha: f64, x1: f64, x2: f64, x3: f64, y1: f64, y2: f64, y3: f64) -> f64 {
    let c = (y3 - y2) * (x2 - x1) - (y2 - y1) * (x3 - x2);
    let b = (x2 - x1) * (x3 * x3 - x2 * x2) - (x2 * x2 - x1 * x1) * (x3 - x2);
    let c = c / b;
    let b = ((y2 - y1) - c * (x2 * x2 - x1 * x1)) / (x2 - x1);
    let a = y1 - c * x1 * x1 - b * x1;

    a + b * ha + c * ha.powi(2)
}

/// Gravity in m/s² at `height_m` metres, inverse-square corrected.
pub fn gravity_at_height(height_m: f64) -> f64 {
    STANDARD_GRAVITY * (1.0 + (height_m / 1000.0) / EARTH_RADIUS_KM).powi(-2)
}

/// Thickness in m of the slab between pressures `p_lower` and `p_upper`.
///
/// `temperature` is the temperature at the bottom of the slab in K,
/// `water_vapor` is the water vapor density at the bottom of the slab in kg/m³
/// and `gravity` is in m/s². The water vapor term is scaled by a further 1e-3.
pub fn hydrostatic_step(
    temperature: f64,
    water_vapor: f64,
    p_lower: f64,
    p_upper: f64,
    gravity: f64,
) -> f64 {
    HYDROSTATIC_CONSTANT * temperature * (1.0 + 0.61 * water_vapor / 1000.0)
        * (p_lower / p_upper).ln()
        / gravity
}

/// Extrapolate the absolute humidity at `altitude_km` down to sea level.
///
/// Both densities share units (g/m³ in the builder); `scale_height_km` is the
/// water vapor scale height.
pub fn sea_level_water_density(density: f64, altitude_km: f64, scale_height_km: f64) -> f64 {
    density * (altitude_km / scale_height_km).exp()
}

/// Absolute humidity at `height_m` metres above sea level from the sea-level
/// value `sea_level_density`.
pub fn water_vapor_at_height(sea_level_density: f64, height_m: f64, scale_height_km: f64) -> f64 {
    sea_level_density * (-height_m / (1000.0 * scale_height_km)).exp()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn poli2_reproduces_a_quadratic() {
        let f = |x: f64| 3.5 - 2.25 * x + 0.75 * x * x;
        let (x1, x2, x3) = (-1.5, 0.25, 4.0);
        let (y1, y2, y3) = (f(x1), f(x2), f(x3));

        for x in [x1, x2, x3] {
            assert_relative_eq!(poli2(x, x1, x2, x3, y1, y2, y3), f(x), max_relative = 1e-12);
        }
        for x in [-10.0, -0.3, 1.0, 2.5, 17.0] {
            assert_relative_eq!(poli2(x, x1, x2, x3, y1, y2, y3), f(x), max_relative = 1e-10);
        }
    }

    #[test]
    fn poli2_on_a_line_is_linear() {
        let v = poli2(2.0, 0.0, 1.0, 3.0, 1.0, 3.0, 7.0);
        assert_abs_diff_eq!(v, 5.0, epsilon = 1e-12);
    }

    #[test]
    fn poli2_degenerate_abscissas() {
        assert!(!poli2(0.5, 1.0, 1.0, 2.0, 1.0, 2.0, 3.0).is_finite());
        assert!(!poli2(0.5, 0.0, 2.0, 2.0, 1.0, 2.0, 3.0).is_finite());
    }

    #[test]
    fn gravity_falls_with_height() {
        assert_relative_eq!(gravity_at_height(0.0), STANDARD_GRAVITY);
        let g10 = gravity_at_height(10_000.0);
        assert!(g10 < STANDARD_GRAVITY);
        assert_relative_eq!(
            g10,
            STANDARD_GRAVITY / (1.0 + 10.0 / EARTH_RADIUS_KM).powi(2),
            max_relative = 1e-12
        );
    }

    #[test]
    fn hydrostatic_step_scale() {
        // ~10 mb near the surface is ~85 m of atmosphere
        let dh = hydrostatic_step(288.0, 0.0, 1013.0, 1003.0, STANDARD_GRAVITY);
        assert!(dh > 80.0 && dh < 90.0, "dh = {dh}");
        assert_eq!(hydrostatic_step(288.0, 0.0, 500.0, 500.0, 9.8), 0.0);
        assert!(hydrostatic_step(250.0, 0.01, 300.0, 200.0, 9.8) > 0.0);
    }

    #[test]
    fn water_vapor_round_trip() {
        let h0 = 2.0;
        let w0 = sea_level_water_density(1.7, 5.0, h0);
        assert_relative_eq!(water_vapor_at_height(w0, 5000.0, h0), 1.7, max_relative = 1e-12);
        assert_relative_eq!(water_vapor_at_height(w0, 0.0, h0), w0);
        assert!(water_vapor_at_height(w0, 7000.0, h0) < 1.7);
    }
}
