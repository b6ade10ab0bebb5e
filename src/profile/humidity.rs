//! Conversions between relative humidity and water vapor mass density.

use crate::units::{Humidity, MassDensity, Pressure, Temperature};

/// Molar gas constant of water vapor in the mixed units of the conversion
const WATER_GAS_CONSTANT: f64 = 216.502;

/// Saturation vapor pressure over water in mb at `t` K.
fn saturation_pressure(t: f64) -> f64 {
    6.105 * (25.22 / t * (t - 273.0) - 5.31 * (t / 273.0).ln()).exp()
}

/// Absolute humidity from temperature, relative humidity and pressure.
///
/// Returns zero if any input is non-positive.
pub fn rwat(t: Temperature, rh: Humidity, p: Pressure) -> MassDensity {
    let t = t.get("K");
    let u = rh.get("%");
    let p = p.get("mb");

    if p <= 0.0 || t <= 0.0 || u <= 0.0 {
        return MassDensity::new(0.0, "gm**-3");
    }

    let es = saturation_pressure(t);
    let e = es * u / 100.0 / (1.0 - (1.0 - u / 100.0) * es / p);

    MassDensity::new(e * WATER_GAS_CONSTANT / t, "gm**-3")
}

/// Relative humidity from temperature, water vapor density and pressure.
///
/// Exact inverse of [`rwat`]. Returns zero if any input is non-positive.
/// Negative results are clamped to zero below 3 mb only; above that the raw
/// value is returned.
pub fn rwat_inv(t: Temperature, rho: MassDensity, p: Pressure) -> Humidity {
    let t = t.get("K");
    let r = rho.get("gm**-3");
    let p = p.get("mb");

    if p <= 0.0 || t <= 0.0 || r <= 0.0 {
        return Humidity::new(0.0, "%");
    }

    let es = saturation_pressure(t);
    let e = r * t / WATER_GAS_CONSTANT;
    let mut rinv = 100.0 * e * (p - es) / (es * (p - e));
    if rinv < 0.0 && p < 3.0 {
        rinv = 0.0;
    }

    Humidity::new(rinv, "%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn rwat_typical_values() {
        // 20 °C, 50 %, sea level: a little under 9 g/m³
        let rho = rwat(
            Temperature::new(293.15, "K"),
            Humidity::new(50.0, "%"),
            Pressure::new(1013.0, "mb"),
        );
        let g = rho.get("gm**-3");
        assert!(g > 8.0 && g < 9.5, "rho = {g}");
        assert_relative_eq!(rho.get("kgm**-3"), g * 1e-3, max_relative = 1e-12);
    }

    #[test]
    fn rwat_inv_inverts_rwat() {
        for (t, u, p) in [
            (288.0, 50.0, 1013.0),
            (270.0, 20.0, 550.0),
            (300.0, 90.0, 1000.0),
            (250.0, 5.0, 300.0),
        ] {
            let t = Temperature::new(t, "K");
            let p = Pressure::new(p, "mb");
            let rho = rwat(t, Humidity::new(u, "%"), p);
            assert_relative_eq!(rwat_inv(t, rho, p).get("%"), u, max_relative = 1e-9);
        }
    }

    #[test]
    fn non_positive_inputs_give_zero() {
        let t = Temperature::new(280.0, "K");
        let u = Humidity::new(40.0, "%");
        let p = Pressure::new(900.0, "mb");
        let rho = MassDensity::new(5.0, "gm**-3");

        assert_eq!(rwat(Temperature::new(0.0, "K"), u, p).value(), 0.0);
        assert_eq!(rwat(t, Humidity::new(-1.0, "%"), p).value(), 0.0);
        assert_eq!(rwat(t, u, Pressure::new(0.0, "mb")).value(), 0.0);

        assert_eq!(rwat_inv(Temperature::new(-5.0, "K"), rho, p).value(), 0.0);
        assert_eq!(rwat_inv(t, MassDensity::new(0.0, "gm**-3"), p).value(), 0.0);
        assert_eq!(rwat_inv(t, rho, Pressure::new(-1.0, "mb")).value(), 0.0);
    }

    #[test]
    fn negative_humidity_clamped_only_at_low_pressure() {
        let t = Temperature::new(300.0, "K");
        let rho = MassDensity::new(1.0, "gm**-3");

        assert_eq!(rwat_inv(t, rho, Pressure::new(2.0, "mb")).value(), 0.0);
        assert!(rwat_inv(t, rho, Pressure::new(10.0, "mb")).value() < 0.0);
    }
}
