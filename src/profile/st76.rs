//! Standard-atmosphere minor gas lookup.
//!
//! The tables hold the total air density and the O3, N2O and CO mixing ratios
//! of the five climatological atmospheres on a fixed 50-point altitude grid
//! from 0 to 120 km. Values between grid points come from a quadratic through
//! the three nearest knots.
#![allow(clippy::excessive_precision)]

use super::core::poli2;
use super::AtmosphereType;
use crate::units::{Length, NumberDensity};

/// Avogadro's number, 1/mol
pub(crate) const AVOGADRO: f64 = 6.022045E+23;

/// Molecular weight of dry air, g/mol
pub(crate) const AIR_MOLECULAR_WEIGHT: f64 = 28.964;

/// Which row of the CO table is read for a given atmosphere type.
///
/// The O3, N2O and density tables are read at row `code - 1`. Historically
/// the CO table has been read at row `code`, i.e. the next atmosphere's
/// column. Profiles validated against existing pipelines depend on that, so
/// it stays the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoTableIndexing {
    /// Read CO at row `code`, matching existing outputs
    #[default]
    Legacy,
    /// Read CO at row `code - 1`, like the other tables
    Corrected,
}

impl CoTableIndexing {
    fn row(self, atm_type: AtmosphereType) -> usize {
        match self {
            CoTableIndexing::Legacy => atm_type.row() + 1,
            CoTableIndexing::Corrected => atm_type.row(),
        }
    }
}

/// Minor gas number densities at one altitude.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct MinorGasDensities {
    /// Ozone
    pub o3: NumberDensity,
    /// Nitrous oxide
    pub n2o: NumberDensity,
    /// Carbon monoxide
    pub co: NumberDensity,
}

/// Indices of the three grid knots bracketing `ha` km, or `None` outside the
/// grid (including exactly at its top).
fn bracket(ha: f64) -> Option<[usize; 3]> {
    if !(0.0..=ALTITUDE_KM[ALTITUDE_KM.len() - 1]).contains(&ha) {
        return None;
    }
    let last = ALTITUDE_KM.len() - 1;
    let i = ALTITUDE_KM.iter().position(|&alt| ha < alt)?;
    Some(match i {
        0 => [0, 1, 2],
        i if i == last => [last - 2, last - 1, last],
        i => [i - 1, i, i + 1],
    })
}

fn interpolate(ha: f64, knots: [usize; 3], table: &[f64; 50]) -> f64 {
    let [i1, i2, i3] = knots;
    poli2(
        ha,
        ALTITUDE_KM[i1],
        ALTITUDE_KM[i2],
        ALTITUDE_KM[i3],
        table[i1],
        table[i2],
        table[i3],
    )
}

/// O3, N2O and CO number densities at `altitude` for `atm_type`.
///
/// Altitudes outside `[0, 120)` km give exact zeros.
pub fn st76(
    altitude: Length,
    atm_type: AtmosphereType,
    co_indexing: CoTableIndexing,
) -> MinorGasDensities {
    let ha = altitude.get("km");
    let Some(knots) = bracket(ha) else {
        return MinorGasDensities::default();
    };

    let row = atm_type.row();
    // total density, g/m³
    let d = interpolate(ha, knots, &DENSITY[row]) * AIR_MOLECULAR_WEIGHT * 1e6 / AVOGADRO;
    let to_cm3 = |ppmv: f64| {
        NumberDensity::new(ppmv * 1e-12 * d * AVOGADRO / AIR_MOLECULAR_WEIGHT, "cm**-3")
    };

    MinorGasDensities {
        o3: to_cm3(interpolate(ha, knots, &OZONE[row])),
        n2o: to_cm3(interpolate(ha, knots, &N2O[row])),
        co: to_cm3(interpolate(ha, knots, &CO[co_indexing.row(atm_type)])),
    }
}

/// Altitude grid of the standard-atmosphere tables, in km.
pub(crate) const ALTITUDE_KM: [f64; 50] = [
    0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0,
    10.0, 11.0, 12.0, 13.0, 14.0, 15.0, 16.0, 17.0, 18.0, 19.0,
    20.0, 21.0, 22.0, 23.0, 24.0, 25.0, 27.5, 30.0, 32.5, 35.0,
    37.5, 40.0, 42.5, 45.0, 47.5, 50.0, 55.0, 60.0, 65.0, 70.0,
    75.0, 80.0, 85.0, 90.0, 95.0, 100.0, 105.0, 110.0, 115.0, 120.0,
];

/// Total air number density in cm⁻³, one row per atmosphere type.
pub(crate) const DENSITY: [[f64; 50]; 6] = [
    [
        2.450E+19, 2.231E+19, 2.028E+19, 1.827E+19, 1.656E+19,
        1.499E+19, 1.353E+19, 1.218E+19, 1.095E+19, 9.789E+18,
        8.747E+18, 7.780E+18, 6.904E+18, 6.079E+18, 5.377E+18,
        4.697E+18, 4.084E+18, 3.486E+18, 2.877E+18, 2.381E+18,
        1.981E+18, 1.651E+18, 1.381E+18, 1.169E+18, 9.920E+17,
        8.413E+17, 5.629E+17, 3.807E+17, 2.598E+17, 1.789E+17,
        1.243E+17, 8.703E+16, 6.147E+16, 4.352E+16, 3.119E+16,
        2.291E+16, 1.255E+16, 6.844E+15, 3.716E+15, 1.920E+15,
        9.338E+14, 4.314E+14, 1.801E+14, 7.043E+13, 2.706E+13,
        1.098E+13, 4.445E+12, 1.941E+12, 8.706E+11, 4.225E+11,
    ],
    [
        0.496E+19, 2.257E+19, 2.038E+19, 1.843E+19, 1.666E+19,
        1.503E+19, 1.351E+19, 1.212E+19, 1.086E+19, 9.716E+18,
        8.656E+18, 7.698E+18, 6.814E+18, 6.012E+18, 5.141E+18,
        4.368E+18, 3.730E+18, 3.192E+18, 2.715E+18, 2.312E+18,
        1.967E+18, 1.677E+18, 1.429E+18, 1.223E+18, 1.042E+18,
        8.919E+17, 6.050E+17, 4.094E+17, 2.820E+17, 1.927E+17,
        1.338E+17, 9.373E+16, 6.624E+16, 4.726E+16, 3.398E+16,
        2.500E+16, 1.386E+16, 7.668E+15, 4.196E+15, 2.227E+15,
        1.109E+15, 4.996E+14, 1.967E+14, 7.204E+13, 2.541E+13,
        9.816E+12, 3.816E+12, 1.688E+12, 8.145E+11, 4.330E+11,
    ],
    [
        0.711E+19, 2.420E+19, 2.158E+19, 1.922E+19, 1.724E+19,
        1.542E+19, 1.376E+19, 1.225E+19, 1.086E+19, 9.612E+18,
        8.472E+18, 7.271E+18, 6.237E+18, 5.351E+18, 4.588E+18,
        3.931E+18, 3.368E+18, 2.886E+18, 2.473E+18, 2.115E+18,
        1.809E+18, 1.543E+18, 1.317E+18, 1.125E+18, 9.633E+17,
        8.218E+17, 5.536E+17, 3.701E+17, 2.486E+17, 1.647E+17,
        1.108E+17, 7.540E+16, 5.202E+16, 3.617E+16, 2.570E+16,
        1.863E+16, 1.007E+16, 5.433E+15, 2.858E+15, 1.477E+15,
        7.301E+14, 3.553E+14, 1.654E+14, 7.194E+13, 3.052E+13,
        1.351E+13, 6.114E+12, 2.952E+12, 1.479E+12, 7.836E+11,
    ],
    [
        0.549E+19, 2.305E+19, 2.080E+19, 1.873E+19, 1.682E+19,
        1.508E+19, 1.357E+19, 1.216E+19, 1.088E+19, 9.701E+18,
        8.616E+18, 7.402E+18, 6.363E+18, 5.471E+18, 4.699E+18,
        4.055E+18, 3.476E+18, 2.987E+18, 2.568E+18, 2.208E+18,
        1.899E+18, 1.632E+18, 1.403E+18, 1.207E+18, 1.033E+18,
        8.834E+17, 6.034E+17, 4.131E+17, 2.839E+17, 1.938E+17,
        1.344E+17, 9.402E+16, 6.670E+16, 4.821E+16, 3.516E+16,
        2.581E+16, 1.421E+16, 7.946E+15, 4.445E+15, 2.376E+15,
        1.198E+15, 5.311E+14, 2.022E+14, 7.221E+13, 2.484E+13,
        9.441E+12, 3.624E+12, 1.610E+12, 7.951E+11, 4.311E+11,
    ],
    [
        0.855E+19, 2.484E+19, 2.202E+19, 1.950E+19, 1.736E+19,
        1.552E+19, 1.383E+19, 1.229E+19, 1.087E+19, 9.440E+18,
        8.069E+18, 6.898E+18, 5.893E+18, 5.039E+18, 4.308E+18,
        3.681E+18, 3.156E+18, 2.704E+18, 2.316E+18, 1.982E+18,
        1.697E+18, 1.451E+18, 1.241E+18, 1.061E+18, 9.065E+17,
        7.742E+17, 5.134E+17, 3.423E+17, 2.292E+17, 1.533E+17,
        1.025E+17, 6.927E+16, 4.726E+16, 3.266E+16, 2.261E+16,
        1.599E+16, 8.364E+15, 4.478E+15, 2.305E+15, 1.181E+15,
        6.176E+14, 3.127E+14, 1.531E+14, 7.244E+13, 3.116E+13,
        1.403E+13, 6.412E+12, 3.099E+12, 1.507E+12, 7.814E+11,
    ],
    [
        0.548E+19, 2.313E+19, 2.094E+19, 1.891E+19, 1.704E+19,
        1.532E+19, 1.373E+19, 1.228E+19, 1.094E+19, 9.719E+18,
        8.602E+18, 7.589E+18, 6.489E+18, 5.546E+18, 4.739E+18,
        4.050E+18, 3.462E+18, 2.960E+18, 2.530E+18, 2.163E+18,
        1.849E+18, 1.575E+18, 1.342E+18, 1.144E+18, 9.765E+17,
        8.337E+17, 5.640E+17, 3.830E+17, 2.524E+17, 1.761E+17,
        1.238E+17, 8.310E+16, 5.803E+16, 4.090E+16, 2.920E+16,
        2.136E+16, 1.181E+16, 6.426E+15, 3.386E+15, 1.723E+15,
        8.347E+14, 3.832E+14, 1.711E+14, 7.136E+13, 2.924E+13,
        1.189E+13, 5.033E+12, 2.144E+12, 9.688E+11, 5.114E+11,
    ],
];

/// O3 mixing ratio in ppmv.
pub(crate) const OZONE: [[f64; 50]; 6] = [
    [
        2.869E-02, 3.150E-02, 3.342E-02, 3.504E-02, 3.561E-02,
        3.767E-02, 3.989E-02, 4.223E-02, 4.471E-02, 5.000E-02,
        5.595E-02, 6.613E-02, 7.815E-02, 9.289E-02, 1.050E-01,
        1.256E-01, 1.444E-01, 2.500E-01, 5.000E-01, 9.500E-01,
        1.400E+00, 1.800E+00, 2.400E+00, 3.400E+00, 4.300E+00,
        5.400E+00, 7.800E+00, 9.300E+00, 9.850E+00, 9.700E+00,
        8.800E+00, 7.500E+00, 5.900E+00, 4.500E+00, 3.450E+00,
        2.800E+00, 1.800E+00, 1.100E+00, 6.500E-01, 3.000E-01,
        1.800E-01, 3.300E-01, 5.000E-01, 5.200E-01, 5.000E-01,
        4.000E-01, 2.000E-01, 5.000E-02, 5.000E-03, 5.000E-04,
    ],
    [
        3.017E-02, 3.337E-02, 3.694E-02, 4.222E-02, 4.821E-02,
        5.512E-02, 6.408E-02, 7.764E-02, 9.126E-02, 1.111E-01,
        1.304E-01, 1.793E-01, 2.230E-01, 3.000E-01, 4.400E-01,
        5.000E-01, 6.000E-01, 7.000E-01, 1.000E+00, 1.500E+00,
        2.000E+00, 2.400E+00, 2.900E+00, 3.400E+00, 4.000E+00,
        4.800E+00, 6.000E+00, 7.000E+00, 8.100E+00, 8.900E+00,
        8.700E+00, 7.550E+00, 5.900E+00, 4.500E+00, 3.500E+00,
        2.800E+00, 1.800E+00, 1.300E+00, 8.000E-01, 4.000E-01,
        1.900E-01, 2.000E-01, 5.700E-01, 7.500E-01, 7.000E-01,
        4.000E-01, 2.000E-01, 5.000E-02, 5.000E-03, 5.000E-04,
    ],
    [
        2.778E-02, 2.800E-02, 2.849E-02, 3.200E-02, 3.567E-02,
        4.720E-02, 5.837E-02, 7.891E-02, 1.039E-01, 1.567E-01,
        2.370E-01, 3.624E-01, 5.232E-01, 7.036E-01, 8.000E-01,
        9.000E-01, 1.100E+00, 1.400E+00, 1.800E+00, 2.300E+00,
        2.900E+00, 3.500E+00, 3.900E+00, 4.300E+00, 4.700E+00,
        5.100E+00, 5.600E+00, 6.100E+00, 6.800E+00, 7.100E+00,
        7.200E+00, 6.900E+00, 5.900E+00, 4.600E+00, 3.700E+00,
        2.750E+00, 1.700E+00, 1.000E+00, 5.500E-01, 3.200E-01,
        2.500E-01, 2.300E-01, 5.500E-01, 8.000E-01, 8.000E-01,
        4.000E-01, 2.000E-01, 5.000E-02, 5.000E-03, 5.000E-04,
    ],
    [
        2.412E-02, 2.940E-02, 3.379E-02, 3.887E-02, 4.478E-02,
        5.328E-02, 6.564E-02, 7.738E-02, 9.114E-02, 1.420E-01,
        1.890E-01, 3.050E-01, 4.100E-01, 5.000E-01, 6.000E-01,
        7.000E-01, 8.500E-01, 1.000E+00, 1.300E+00, 1.700E+00,
        2.100E+00, 2.700E+00, 3.300E+00, 3.700E+00, 4.200E+00,
        4.500E+00, 5.300E+00, 5.700E+00, 6.900E+00, 7.700E+00,
        7.800E+00, 7.000E+00, 5.400E+00, 4.200E+00, 3.200E+00,
        2.500E+00, 1.700E+00, 1.200E+00, 8.000E-01, 4.000E-01,
        2.000E-01, 1.800E-01, 6.500E-01, 9.000E-01, 8.000E-01,
        4.000E-01, 2.000E-01, 5.000E-02, 5.000E-03, 5.000E-04,
    ],
    [
        1.802E-02, 2.072E-02, 2.336E-02, 2.767E-02, 3.253E-02,
        3.801E-02, 4.446E-02, 7.252E-02, 1.040E-01, 2.100E-01,
        3.000E-01, 3.500E-01, 4.000E-01, 6.500E-01, 9.000E-01,
        1.200E+00, 1.500E+00, 1.900E+00, 2.450E+00, 3.100E+00,
        3.700E+00, 4.000E+00, 4.200E+00, 4.500E+00, 4.600E+00,
        4.700E+00, 4.900E+00, 5.400E+00, 5.900E+00, 6.200E+00,
        6.250E+00, 5.900E+00, 5.100E+00, 4.100E+00, 3.000E+00,
        2.600E+00, 1.600E+00, 9.500E-01, 6.500E-01, 5.000E-01,
        3.300E-01, 1.300E-01, 7.500E-01, 8.000E-01, 8.000E-01,
        4.000E-01, 2.000E-01, 5.000E-02, 5.000E-03, 5.000E-04,
    ],
    [
        2.660E-02, 2.931E-02, 3.237E-02, 3.318E-02, 3.387E-02,
        3.768E-02, 4.112E-02, 5.009E-02, 5.966E-02, 9.168E-02,
        1.313E-01, 2.149E-01, 3.095E-01, 3.846E-01, 5.030E-01,
        6.505E-01, 8.701E-01, 1.187E+00, 1.587E+00, 2.030E+00,
        2.579E+00, 3.028E+00, 3.647E+00, 4.168E+00, 4.627E+00,
        5.118E+00, 5.803E+00, 6.553E+00, 7.373E+00, 7.837E+00,
        7.800E+00, 7.300E+00, 6.200E+00, 5.250E+00, 4.100E+00,
        3.100E+00, 1.800E+00, 1.100E+00, 7.000E-01, 3.000E-01,
        2.500E-01, 3.000E-01, 5.000E-01, 7.000E-01, 7.000E-01,
        4.000E-01, 2.000E-01, 5.000E-02, 5.000E-03, 5.000E-04,
    ],
];

/// N2O mixing ratio in ppmv.
pub(crate) const N2O: [[f64; 50]; 6] = [
    [
        3.200E-01, 3.200E-01, 3.200E-01, 3.200E-01, 3.200E-01,
        3.200E-01, 3.200E-01, 3.200E-01, 3.200E-01, 3.195E-01,
        3.179E-01, 3.140E-01, 3.095E-01, 3.048E-01, 2.999E-01,
        2.944E-01, 2.877E-01, 2.783E-01, 2.671E-01, 2.527E-01,
        2.365E-01, 2.194E-01, 2.051E-01, 1.967E-01, 1.875E-01,
        1.756E-01, 1.588E-01, 1.416E-01, 1.165E-01, 9.275E-02,
        6.693E-02, 4.513E-02, 2.751E-02, 1.591E-02, 9.378E-03,
        4.752E-03, 3.000E-03, 2.065E-03, 1.507E-03, 1.149E-03,
        8.890E-04, 7.056E-04, 5.716E-04, 4.708E-04, 3.932E-04,
        3.323E-04, 2.837E-04, 2.443E-04, 2.120E-04, 1.851E-04,
    ],
    [
        3.200E-01, 3.200E-01, 3.200E-01, 3.200E-01, 3.200E-01,
        3.200E-01, 3.200E-01, 3.200E-01, 3.195E-01, 3.163E-01,
        3.096E-01, 2.989E-01, 2.936E-01, 2.860E-01, 2.800E-01,
        2.724E-01, 2.611E-01, 2.421E-01, 2.174E-01, 1.843E-01,
        1.607E-01, 1.323E-01, 1.146E-01, 1.035E-01, 9.622E-02,
        8.958E-02, 8.006E-02, 6.698E-02, 4.958E-02, 3.695E-02,
        2.519E-02, 1.736E-02, 1.158E-02, 7.665E-03, 5.321E-03,
        3.215E-03, 2.030E-03, 1.397E-03, 1.020E-03, 7.772E-04,
        6.257E-04, 5.166E-04, 4.352E-04, 3.727E-04, 3.237E-04,
        2.844E-04, 2.524E-04, 2.260E-04, 2.039E-04, 1.851E-04,
    ],
    [
        3.200E-01, 3.200E-01, 3.200E-01, 3.200E-01, 3.200E-01,
        3.200E-01, 3.200E-01, 3.200E-01, 3.195E-01, 3.163E-01,
        3.096E-01, 2.989E-01, 2.936E-01, 2.860E-01, 2.800E-01,
        2.724E-01, 2.611E-01, 2.421E-01, 2.174E-01, 1.843E-01,
        1.621E-01, 1.362E-01, 1.230E-01, 1.124E-01, 1.048E-01,
        9.661E-02, 8.693E-02, 7.524E-02, 6.126E-02, 5.116E-02,
        3.968E-02, 2.995E-02, 2.080E-02, 1.311E-02, 8.071E-03,
        4.164E-03, 2.629E-03, 1.809E-03, 1.321E-03, 1.007E-03,
        7.883E-04, 6.333E-04, 5.194E-04, 4.333E-04, 3.666E-04,
        3.140E-04, 2.717E-04, 2.373E-04, 2.089E-04, 1.851E-04,
    ],
    [
        3.100E-01, 3.100E-01, 3.100E-01, 3.100E-01, 3.079E-01,
        3.024E-01, 2.906E-01, 2.822E-01, 2.759E-01, 2.703E-01,
        2.651E-01, 2.600E-01, 2.549E-01, 2.494E-01, 2.433E-01,
        2.355E-01, 2.282E-01, 2.179E-01, 2.035E-01, 1.817E-01,
        1.567E-01, 1.350E-01, 1.218E-01, 1.102E-01, 9.893E-02,
        8.775E-02, 7.327E-02, 5.941E-02, 4.154E-02, 3.032E-02,
        1.949E-02, 1.274E-02, 9.001E-03, 6.286E-03, 4.558E-03,
        2.795E-03, 1.765E-03, 1.214E-03, 8.866E-04, 6.756E-04,
        5.538E-04, 4.649E-04, 3.979E-04, 3.459E-04, 3.047E-04,
        2.713E-04, 2.439E-04, 2.210E-04, 2.017E-04, 1.851E-04,
    ],
    [
        3.200E-01, 3.200E-01, 3.200E-01, 3.200E-01, 3.200E-01,
        3.200E-01, 3.200E-01, 3.200E-01, 3.195E-01, 3.163E-01,
        3.096E-01, 2.989E-01, 2.936E-01, 2.860E-01, 2.800E-01,
        2.724E-01, 2.611E-01, 2.421E-01, 2.174E-01, 1.843E-01,
        1.621E-01, 1.362E-01, 1.230E-01, 1.122E-01, 1.043E-01,
        9.570E-02, 8.598E-02, 7.314E-02, 5.710E-02, 4.670E-02,
        3.439E-02, 2.471E-02, 1.631E-02, 1.066E-02, 7.064E-03,
        3.972E-03, 2.508E-03, 1.726E-03, 1.260E-03, 9.602E-04,
        7.554E-04, 6.097E-04, 5.024E-04, 4.210E-04, 3.579E-04,
        3.080E-04, 2.678E-04, 2.350E-04, 2.079E-04, 1.851E-04,
    ],
    [
        3.200E-01, 3.200E-01, 3.200E-01, 3.200E-01, 3.200E-01,
        3.200E-01, 3.200E-01, 3.200E-01, 3.200E-01, 3.195E-01,
        3.179E-01, 3.140E-01, 3.095E-01, 3.048E-01, 2.999E-01,
        2.944E-01, 2.877E-01, 2.783E-01, 2.671E-01, 2.527E-01,
        2.365E-01, 2.194E-01, 2.051E-01, 1.967E-01, 1.875E-01,
        1.756E-01, 1.588E-01, 1.416E-01, 1.165E-01, 9.275E-02,
        6.693E-02, 4.513E-02, 2.751E-02, 1.591E-02, 9.378E-03,
        4.752E-03, 3.000E-03, 2.065E-03, 1.507E-03, 1.149E-03,
        8.890E-04, 7.056E-04, 5.716E-04, 4.708E-04, 3.932E-04,
        3.323E-04, 2.837E-04, 2.443E-04, 2.120E-04, 1.851E-04,
    ],
];

/// CO mixing ratio in ppmv.
pub(crate) const CO: [[f64; 50]; 6] = [
    [
        1.500E-01, 1.450E-01, 1.399E-01, 1.349E-01, 1.312E-01,
        1.303E-01, 1.288E-01, 1.247E-01, 1.185E-01, 1.094E-01,
        9.962E-02, 8.964E-02, 7.814E-02, 6.374E-02, 5.025E-02,
        3.941E-02, 3.069E-02, 2.489E-02, 1.966E-02, 1.549E-02,
        1.331E-02, 1.232E-02, 1.232E-02, 1.307E-02, 1.400E-02,
        1.521E-02, 1.722E-02, 1.995E-02, 2.266E-02, 2.487E-02,
        2.738E-02, 3.098E-02, 3.510E-02, 3.987E-02, 4.482E-02,
        5.092E-02, 5.985E-02, 6.960E-02, 9.188E-02, 1.938E-01,
        5.688E-01, 1.549E+00, 3.849E+00, 6.590E+00, 1.044E+01,
        1.705E+01, 2.471E+01, 3.358E+01, 4.148E+01, 5.000E+01,
    ],
    [
        1.500E-01, 1.450E-01, 1.399E-01, 1.349E-01, 1.312E-01,
        1.303E-01, 1.288E-01, 1.247E-01, 1.185E-01, 1.094E-01,
        9.962E-02, 8.964E-02, 7.814E-02, 6.374E-02, 5.025E-02,
        3.941E-02, 3.069E-02, 2.489E-02, 1.966E-02, 1.549E-02,
        1.331E-02, 1.232E-02, 1.232E-02, 1.307E-02, 1.400E-02,
        1.521E-02, 1.722E-02, 1.995E-02, 2.266E-02, 2.487E-02,
        2.716E-02, 2.962E-02, 3.138E-02, 3.307E-02, 3.487E-02,
        3.645E-02, 3.923E-02, 4.673E-02, 6.404E-02, 1.177E-01,
        2.935E-01, 6.815E-01, 1.465E+00, 2.849E+00, 5.166E+00,
        1.008E+01, 1.865E+01, 2.863E+01, 3.890E+01, 5.000E+01,
    ],
    [
        1.500E-01, 1.450E-01, 1.399E-01, 1.349E-01, 1.312E-01,
        1.303E-01, 1.288E-01, 1.247E-01, 1.185E-01, 1.094E-01,
        9.962E-02, 8.964E-02, 7.814E-02, 6.374E-02, 5.025E-02,
        3.941E-02, 3.069E-02, 2.489E-02, 1.966E-02, 1.549E-02,
        1.331E-02, 1.232E-02, 1.232E-02, 1.307E-02, 1.400E-02,
        1.498E-02, 1.598E-02, 1.710E-02, 1.850E-02, 1.997E-02,
        2.147E-02, 2.331E-02, 2.622E-02, 3.057E-02, 3.803E-02,
        6.245E-02, 1.480E-01, 2.926E-01, 5.586E-01, 1.078E+00,
        1.897E+00, 2.960E+00, 4.526E+00, 6.862E+00, 1.054E+01,
        1.709E+01, 2.473E+01, 3.359E+01, 4.149E+01, 5.000E+01,
    ],
    [
        1.500E-01, 1.450E-01, 1.399E-01, 1.349E-01, 1.312E-01,
        1.303E-01, 1.288E-01, 1.247E-01, 1.185E-01, 1.094E-01,
        9.962E-02, 8.964E-02, 7.814E-02, 6.374E-02, 5.025E-02,
        3.941E-02, 3.069E-02, 2.489E-02, 1.966E-02, 1.549E-02,
        1.331E-02, 1.232E-02, 1.232E-02, 1.307E-02, 1.400E-02,
        1.510E-02, 1.649E-02, 1.808E-02, 1.997E-02, 2.183E-02,
        2.343E-02, 2.496E-02, 2.647E-02, 2.809E-02, 2.999E-02,
        3.220E-02, 3.650E-02, 4.589E-02, 6.375E-02, 1.176E-01,
        3.033E-01, 7.894E-01, 1.823E+00, 3.402E+00, 5.916E+00,
        1.043E+01, 1.881E+01, 2.869E+01, 3.892E+01, 5.000E+01,
    ],
    [
        1.500E-01, 1.450E-01, 1.399E-01, 1.349E-01, 1.312E-01,
        1.303E-01, 1.288E-01, 1.247E-01, 1.185E-01, 1.094E-01,
        9.962E-02, 8.964E-02, 7.814E-02, 6.374E-02, 5.025E-02,
        3.941E-02, 3.069E-02, 2.489E-02, 1.966E-02, 1.549E-02,
        1.331E-02, 1.232E-02, 1.232E-02, 1.307E-02, 1.400E-02,
        1.521E-02, 1.722E-02, 2.037E-02, 2.486E-02, 3.168E-02,
        4.429E-02, 6.472E-02, 1.041E-01, 1.507E-01, 2.163E-01,
        3.141E-01, 4.842E-01, 7.147E-01, 1.067E+00, 1.516E+00,
        2.166E+00, 3.060E+00, 4.564E+00, 6.877E+00, 1.055E+01,
        1.710E+01, 2.473E+01, 3.359E+01, 4.149E+01, 5.000E+01,
    ],
    [
        1.500E-01, 1.450E-01, 1.399E-01, 1.349E-01, 1.312E-01,
        1.303E-01, 1.288E-01, 1.247E-01, 1.185E-01, 1.094E-01,
        9.962E-02, 8.964E-02, 7.814E-02, 6.374E-02, 5.025E-02,
        3.941E-02, 3.069E-02, 2.489E-02, 1.966E-02, 1.549E-02,
        1.331E-02, 1.232E-02, 1.232E-02, 1.307E-02, 1.400E-02,
        1.498E-02, 1.598E-02, 1.710E-02, 1.850E-02, 2.009E-02,
        2.220E-02, 2.497E-02, 2.824E-02, 3.241E-02, 3.717E-02,
        4.597E-02, 6.639E-02, 1.073E-01, 1.862E-01, 3.059E-01,
        6.375E-01, 1.497E+00, 3.239E+00, 5.843E+00, 1.013E+01,
        1.692E+01, 2.467E+01, 3.356E+01, 4.148E+01, 5.000E+01,
    ],
];

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const ALL_TYPES: [AtmosphereType; 5] = [
        AtmosphereType::Tropical,
        AtmosphereType::MidlatSummer,
        AtmosphereType::MidlatWinter,
        AtmosphereType::SubarcticSummer,
        AtmosphereType::SubarcticWinter,
    ];

    fn ppmv_to_cm3(ppmv: f64, density_cm3: f64) -> f64 {
        ppmv * 1e-6 * density_cm3
    }

    #[test]
    fn zero_outside_the_grid() {
        for atm in ALL_TYPES {
            for km in [-0.001, -10.0, 120.0, 120.5, 500.0] {
                let gases = st76(Length::new(km, "km"), atm, CoTableIndexing::Legacy);
                assert_eq!(gases, MinorGasDensities::default(), "{atm} at {km} km");
                assert_eq!(gases.o3.value(), 0.0);
            }
        }
    }

    #[test]
    fn grid_points_reproduce_tables() {
        for atm in ALL_TYPES {
            let row = atm.row();
            for k in 0..ALTITUDE_KM.len() - 1 {
                let gases = st76(
                    Length::new(ALTITUDE_KM[k], "km"),
                    atm,
                    CoTableIndexing::Corrected,
                );
                let den = DENSITY[row][k];
                assert_relative_eq!(
                    gases.o3.get("cm**-3"),
                    ppmv_to_cm3(OZONE[row][k], den),
                    max_relative = 1e-6
                );
                assert_relative_eq!(
                    gases.n2o.get("cm**-3"),
                    ppmv_to_cm3(N2O[row][k], den),
                    max_relative = 1e-6
                );
                assert_relative_eq!(
                    gases.co.get("cm**-3"),
                    ppmv_to_cm3(CO[row][k], den),
                    max_relative = 1e-6
                );
            }
        }
    }

    #[test]
    fn legacy_co_reads_the_next_row() {
        let h = Length::new(3.0, "km");
        for atm in ALL_TYPES {
            let row = atm.row();
            let legacy = st76(h, atm, CoTableIndexing::Legacy);
            let corrected = st76(h, atm, CoTableIndexing::Corrected);

            assert_eq!(legacy.o3, corrected.o3);
            assert_eq!(legacy.n2o, corrected.n2o);
            assert_relative_eq!(
                legacy.co.get("cm**-3"),
                ppmv_to_cm3(CO[row + 1][3], DENSITY[row][3]),
                max_relative = 1e-6
            );
        }
    }

    #[test]
    fn results_in_per_cubic_metre() {
        let gases = st76(
            Length::new(2500.0, "m"),
            AtmosphereType::MidlatWinter,
            CoTableIndexing::Legacy,
        );
        assert!(gases.o3.value() > 0.0);
        assert_relative_eq!(gases.o3.value(), gases.o3.get("cm**-3") * 1e6, max_relative = 1e-12);
    }

    #[test]
    fn bracket_windows() {
        assert_eq!(bracket(0.0), Some([0, 1, 2]));
        assert_eq!(bracket(0.5), Some([0, 1, 2]));
        assert_eq!(bracket(5.5), Some([5, 6, 7]));
        assert_eq!(bracket(116.0), Some([47, 48, 49]));
        assert_eq!(bracket(119.99), Some([47, 48, 49]));
        assert_eq!(bracket(120.0), None);
        assert_eq!(bracket(-1.0), None);
    }
}
