//! Profile construction from the basic ground parameters.
//!
//! The builder first walks a set of layer *boundaries* up from the site, then
//! averages each adjacent pair of boundaries into one output layer.
//!
//! Below the type-dependent pressure limit the boundaries are spaced by a
//! geometrically growing pressure step and their heights follow from the
//! hydrostatic equation with a constant lapse rate. Above it the walk follows
//! a fixed table of standard-atmosphere knots instead, with the knot
//! temperatures rebased so they join the tropospheric profile continuously.
#![allow(clippy::excessive_precision)]

use log::{debug, trace, warn};
use smallvec::SmallVec;

use super::core::{
    gravity_at_height, hydrostatic_step, sea_level_water_density, water_vapor_at_height,
};
use super::humidity::{rwat, rwat_inv};
use super::st76::st76;
use super::{BasicParameters, LayerArrays, ProfileOptions};
use crate::units::{Length, MassDensity, NumberDensity, Pressure, Temperature};

/// Boundary values of a profile, from the site upward.
///
/// `water_vapor` is in g/m³.
#[derive(Debug, Clone, Default)]
pub(crate) struct Boundaries {
    pub pressure: SmallVec<[f64; 64]>,
    pub height: SmallVec<[f64; 64]>,
    pub temperature: SmallVec<[f64; 64]>,
    pub water_vapor: SmallVec<[f64; 64]>,
    /// Boundary where the knot table takes over
    pub tropo_layer: usize,
    /// Number of layers the boundaries describe
    pub num_layers: usize,
}

/// A fully built profile.
#[derive(Debug, Clone)]
pub(crate) struct BuiltProfile {
    pub layers: LayerArrays,
    pub tropo_layer: usize,
    pub tropo_altitude: Length,
    pub tropo_temperature: Temperature,
}

pub(crate) fn walk_boundaries(params: &BasicParameters, options: &ProfileOptions) -> Boundaries {
    let atm_type = params.atm_type();
    let t_ground = params.ground_temperature().get("K");
    let p_ground = params.ground_pressure().get("mb");
    let h0 = params.wv_scale_height().get("km");
    let dp = params.pressure_step().get("mb");
    let dp1 = params.pressure_step_factor();
    let alti = params.altitude().get("km");
    let top = params.top_atm_profile().get("m");
    let dt = params.tropo_lapse_rate();
    let pr_limit = atm_type.pressure_limit();

    let knot_p = &KNOT_PRESSURE[atm_type.row()];
    let knot_t = &KNOT_TEMPERATURE[atm_type.row()];

    let mut b = Boundaries::default();
    b.pressure.push(p_ground);
    b.height.push(alti * 1000.0);
    b.temperature.push(t_ground);

    let wgr = rwat(params.ground_temperature(), params.relative_humidity(), params.ground_pressure())
        .get("gm**-3");
    let wgr0 = sea_level_water_density(wgr, alti, h0);
    b.water_vapor.push(wgr);

    let mut g = gravity_at_height(b.height[0]);
    let mut www = 0.0;
    let mut tropo_layer: Option<usize> = None;
    let mut i0 = 0;
    let mut j = 0;
    let mut i = 0;

    loop {
        i += 1;
        if i >= options.max_boundaries {
            warn!(
                "stopping profile walk after {} boundaries, below the {:.1} km top",
                options.max_boundaries,
                top / 1000.0
            );
            break;
        }

        let next = b.pressure[i - 1] - dp * dp1.powi(i as i32 - 1);
        if next <= pr_limit {
            if tropo_layer.is_none() {
                j = knot_p.iter().position(|&p| next >= p).unwrap_or(0).max(1);
                debug!(
                    "pressure {next:.2} mb below the {pr_limit} mb limit, switching to knot {j}"
                );
            }
            // re-evaluated each pass, so a walk starting above the limit
            // rebases on boundary 1
            if i0 == 0 {
                i0 = i - 1;
            }

            let h_new = if tropo_layer.is_none() {
                b.pressure.push(knot_p[j - 1]);
                b.temperature.push(knot_t[j - 1] - knot_t[0] + b.temperature[i0]);
                b.height[i - 1]
                    + hydrostatic_step(b.temperature[i - 1], www, b.pressure[i - 1], b.pressure[i], g)
            } else {
                j += 1;
                if j >= KNOT_ALTITUDE_KM.len() {
                    debug!("knot table exhausted at {:.2} km", b.height[i - 1] / 1000.0);
                    break;
                }
                b.pressure.push(knot_p[j - 1]);
                b.temperature.push(knot_t[j - 1] - knot_t[0] + b.temperature[i0]);
                b.height[i - 1] + (KNOT_ALTITUDE_KM[j] - KNOT_ALTITUDE_KM[j - 1]) * 1000.0
            };
            b.height.push(h_new);
            b.water_vapor.push(water_vapor_at_height(wgr0, h_new, h0));
            trace!(
                "boundary {i} (knot {j}): P {:.4} mb, T {:.2} K, h {h_new:.1} m",
                b.pressure[i],
                b.temperature[i]
            );

            if tropo_layer.is_none() {
                tropo_layer = Some(i - 1);
                debug!("tropopause at boundary {}", i - 1);
            }
            if h_new > top {
                break;
            }
        } else {
            b.pressure.push(next);
            www = b.water_vapor[i - 1] / 1000.0;
            g = gravity_at_height(b.height[i - 1]);
            let dh = hydrostatic_step(b.temperature[i - 1], www, b.pressure[i - 1], next, g);
            let h_new = b.height[i - 1] + dh;
            b.height.push(h_new);
            b.temperature.push(b.temperature[i - 1] + dt * dh / 1000.0);
            b.water_vapor.push(water_vapor_at_height(wgr0, h_new, h0));

            let humidity = rwat_inv(
                Temperature::new(b.temperature[i], "K"),
                MassDensity::new(b.water_vapor[i], "gm**-3"),
                Pressure::new(next, "mb"),
            );
            trace!(
                "boundary {i}: P {next:.2} mb, T {:.2} K, h {h_new:.1} m, w {:.4} g/m3, RH {:.1} %",
                b.temperature[i],
                b.water_vapor[i],
                humidity.get("%")
            );

            if h_new > top {
                break;
            }
        }
    }

    b.num_layers = i - 1;
    b.tropo_layer = tropo_layer.unwrap_or(b.num_layers);
    b
}

/// Average adjacent boundaries into layers and fill in the minor gases.
pub(crate) fn average_layers(
    b: &Boundaries,
    params: &BasicParameters,
    options: &ProfileOptions,
) -> LayerArrays {
    let n = b.num_layers;
    let mut layers = LayerArrays::with_capacity(n);
    let mut altura = params.altitude().get("km");

    for k in 0..n {
        let thickness = b.height[k + 1] - b.height[k];
        altura += thickness / 2.0e3;

        let gases = st76(Length::new(altura, "km"), params.atm_type(), options.co_indexing);

        layers.thickness.push(Length::new(thickness, "m"));
        layers
            .temperature
            .push(Temperature::new((b.temperature[k + 1] + b.temperature[k]) / 2.0, "K"));
        layers.pressure.push(Pressure::new(
            ((b.pressure[k + 1].ln() + b.pressure[k].ln()) / 2.0).exp(),
            "mb",
        ));
        layers.water_vapor.push(MassDensity::new(
            1.0e-3 * ((b.water_vapor[k + 1].ln() + b.water_vapor[k].ln()) / 2.0).exp(),
            "kgm**-3",
        ));
        layers.o3.push(NumberDensity::new(1.0e6 * gases.o3.get("cm**-3"), "m**-3"));
        layers.co.push(NumberDensity::new(1.0e6 * gases.co.get("cm**-3"), "m**-3"));
        layers.n2o.push(NumberDensity::new(1.0e6 * gases.n2o.get("cm**-3"), "m**-3"));

        altura += thickness / 2.0e3;
    }

    layers
}

/// Build the layered profile for `params`.
pub(crate) fn build(params: &BasicParameters, options: &ProfileOptions) -> BuiltProfile {
    let boundaries = walk_boundaries(params, options);
    let layers = average_layers(&boundaries, params, options);
    let tropo = boundaries.tropo_layer;

    let built = BuiltProfile {
        layers,
        tropo_layer: tropo,
        tropo_altitude: Length::new(boundaries.height[tropo], "m"),
        tropo_temperature: Temperature::new(boundaries.temperature[tropo], "K"),
    };
    debug!(
        "built {} layers for {}, tropopause at {:.3} km ({:.2} K)",
        boundaries.num_layers,
        params.atm_type(),
        built.tropo_altitude.get("km"),
        built.tropo_temperature.get("K")
    );
    built
}

/// Altitudes of the upper-atmosphere knots, in km.
pub(crate) const KNOT_ALTITUDE_KM: [f64; 20] = [
    9.225, 10.225, 11.225, 12.850, 14.850, 16.850, 18.850, 22.600, 26.600, 30.600,
    34.850, 40.850, 46.850, 52.850, 58.850, 65.100, 73.100, 81.100, 89.100, 95.600,
];

/// Pressure at each knot in mb, one row per atmosphere type.
pub(crate) const KNOT_PRESSURE: [[f64; 20]; 5] = [
    [
        0.3190E+03, 0.2768E+03, 0.2391E+03, 0.1864E+03, 0.1354E+03,
        0.9613E+02, 0.6833E+02, 0.3726E+02, 0.2023E+02, 0.1121E+02,
        0.6142E+01, 0.2732E+01, 0.1260E+01, 0.6042E+00, 0.2798E+00,
        0.1202E+00, 0.3600E-01, 0.9162E-02, 0.2076E-02, 0.6374E-03,
    ],
    [
        0.3139E+03, 0.2721E+03, 0.2350E+03, 0.1833E+03, 0.1332E+03,
        0.9726E+02, 0.7115E+02, 0.3992E+02, 0.2185E+02, 0.1216E+02,
        0.6680E+01, 0.2985E+01, 0.1400E+01, 0.6780E+00, 0.3178E+00,
        0.1380E+00, 0.4163E-01, 0.9881E-02, 0.2010E-02, 0.5804E-03,
    ],
    [
        0.2892E+03, 0.2480E+03, 0.2124E+03, 0.1649E+03, 0.1206E+03,
        0.8816E+02, 0.6433E+02, 0.3558E+02, 0.1901E+02, 0.1014E+02,
        0.5316E+01, 0.2255E+01, 0.1022E+01, 0.4814E+00, 0.2206E+00,
        0.9455E-01, 0.3000E-01, 0.8729E-02, 0.2332E-02, 0.8164E-03,
    ],
    [
        0.3006E+03, 0.2587E+03, 0.2223E+03, 0.1739E+03, 0.1288E+03,
        0.9495E+02, 0.7018E+02, 0.3983E+02, 0.2199E+02, 0.1232E+02,
        0.6771E+01, 0.3056E+01, 0.1452E+01, 0.7051E+00, 0.3353E+00,
        0.1459E+00, 0.4431E-01, 0.1024E-01, 0.1985E-02, 0.5627E-03,
    ],
    [
        0.2731E+03, 0.2335E+03, 0.1995E+03, 0.1546E+03, 0.1130E+03,
        0.8252E+02, 0.6017E+02, 0.3314E+02, 0.1751E+02, 0.9306E+01,
        0.4826E+01, 0.1988E+01, 0.8645E+00, 0.4000E+00, 0.1819E+00,
        0.7866E-01, 0.2639E-01, 0.8264E-02, 0.2364E-02, 0.8439E-03,
    ],
];

/// Temperature at each knot in K, one row per atmosphere type.
pub(crate) const KNOT_TEMPERATURE: [[f64; 20]; 5] = [
    [
        0.2421E+03, 0.2354E+03, 0.2286E+03, 0.2180E+03, 0.2046E+03,
        0.1951E+03, 0.2021E+03, 0.2160E+03, 0.2250E+03, 0.2336E+03,
        0.2428E+03, 0.2558E+03, 0.2686E+03, 0.2667E+03, 0.2560E+03,
        0.2357E+03, 0.2083E+03, 0.1826E+03, 0.1767E+03, 0.1841E+03,
    ],
    [
        0.2403E+03, 0.2338E+03, 0.2273E+03, 0.2167E+03, 0.2157E+03,
        0.2157E+03, 0.2177E+03, 0.2223E+03, 0.2271E+03, 0.2349E+03,
        0.2448E+03, 0.2596E+03, 0.2740E+03, 0.2727E+03, 0.2603E+03,
        0.2394E+03, 0.2045E+03, 0.1715E+03, 0.1644E+03, 0.1785E+03,
    ],
    [
        0.2239E+03, 0.2196E+03, 0.2191E+03, 0.2183E+03, 0.2173E+03,
        0.2163E+03, 0.2153E+03, 0.2152E+03, 0.2152E+03, 0.2178E+03,
        0.2275E+03, 0.2458E+03, 0.2637E+03, 0.2633E+03, 0.2531E+03,
        0.2407E+03, 0.2243E+03, 0.2072E+03, 0.1991E+03, 0.2091E+03,
    ],
    [
        0.2301E+03, 0.2252E+03, 0.2252E+03, 0.2252E+03, 0.2252E+03,
        0.2252E+03, 0.2252E+03, 0.2252E+03, 0.2298E+03, 0.2361E+03,
        0.2468E+03, 0.2648E+03, 0.2756E+03, 0.2763E+03, 0.2662E+03,
        0.2392E+03, 0.2023E+03, 0.1681E+03, 0.1609E+03, 0.1770E+03,
    ],
    [
        0.2172E+03, 0.2172E+03, 0.2172E+03, 0.2172E+03, 0.2172E+03,
        0.2161E+03, 0.2149E+03, 0.2126E+03, 0.2127E+03, 0.2165E+03,
        0.2222E+03, 0.2368E+03, 0.2516E+03, 0.2601E+03, 0.2523E+03,
        0.2486E+03, 0.2388E+03, 0.2215E+03, 0.2033E+03, 0.2113E+03,
    ],
];
