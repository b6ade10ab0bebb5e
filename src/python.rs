//! Python bindings
//!
//! NOTE: this module is the interface between Rust and Python. The real work
//! happens in the other modules, which do not use `pyo3`.

use std::fmt::Write as _;
use std::time::Duration;

use log::{debug, info, warn};
use ndarray::Array1;
use numpy::{PyArray1, PyArray2, PyReadonlyArray1, ToPyArray};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::batch::{self, BatchProgress, ProfileSummary};
use crate::error::AtmError;
use crate::profile::{
    self, AtmProfile, AtmosphereType, BasicParameters, CoTableIndexing, ProfileOptions,
};
use crate::units::{Humidity, Length, Pressure, Temperature};

impl From<AtmError> for PyErr {
    fn from(e: AtmError) -> Self {
        PyValueError::new_err(e.to_string())
    }
}

fn co_indexing_from_str(name: &str) -> PyResult<CoTableIndexing> {
    match name.to_ascii_lowercase().as_str() {
        "legacy" => Ok(CoTableIndexing::Legacy),
        "corrected" => Ok(CoTableIndexing::Corrected),
        _ => Err(PyValueError::new_err(format!(
            "unknown CO indexing {name:?}, expected \"legacy\" or \"corrected\""
        ))),
    }
}

/// Basic parameters of the current profile, as plain numbers.
#[pyclass(get_all, frozen)]
#[derive(Debug, Clone)]
struct BasicAtmParms {
    altitude_m: f64,
    temperature_k: f64,
    pressure_mb: f64,
    max_altitude_km: f64,
    humidity: f64,
    lapse_rate: f64,
    pressure_step_mb: f64,
    pressure_step_factor: f64,
    scale_height_km: f64,
    atm_type: String,
    report: String,
}

/// Per-layer profile, each a numpy array of length `num_layers`.
#[pyclass(name = "Profile", frozen)]
#[derive(Debug)]
struct PyProfile {
    thickness: Array1<f64>,
    temperature: Array1<f64>,
    water_mass_density: Array1<f64>,
    water_number_density: Array1<f64>,
    pressure: Array1<f64>,
    o3: Array1<f64>,
    co: Array1<f64>,
    n2o: Array1<f64>,
    report: String,
}

#[pymethods]
impl PyProfile {
    /// Layer thickness in m
    #[getter]
    fn thickness<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.thickness.to_pyarray(py)
    }

    /// Layer temperature in K
    #[getter]
    fn temperature<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.temperature.to_pyarray(py)
    }

    /// Water vapor in kg m-3
    #[getter]
    fn water_mass_density<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.water_mass_density.to_pyarray(py)
    }

    /// Water vapor in m-3
    #[getter]
    fn water_number_density<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.water_number_density.to_pyarray(py)
    }

    /// Layer pressure in mb
    #[getter]
    fn pressure<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.pressure.to_pyarray(py)
    }

    /// Ozone in m-3
    #[getter]
    fn o3<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.o3.to_pyarray(py)
    }

    /// Carbon monoxide in m-3
    #[getter]
    fn co<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.co.to_pyarray(py)
    }

    /// Nitrous oxide in m-3
    #[getter]
    fn n2o<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.n2o.to_pyarray(py)
    }

    /// Text listing of the layers
    #[getter]
    fn report(&self) -> String {
        self.report.clone()
    }
}

impl PyProfile {
    fn new(profile: &AtmProfile) -> Self {
        let n = profile.num_layers();
        let thickness: Array1<f64> = profile.thickness_profile().iter().map(|v| v.get("m")).collect();
        let temperature: Array1<f64> =
            profile.temperature_profile().iter().map(|v| v.get("K")).collect();
        let water_mass_density: Array1<f64> =
            profile.water_vapor_profile().iter().map(|v| v.get("kg m-3")).collect();
        let water_number_density: Array1<f64> = (0..n)
            .filter_map(|i| profile.layer_water_vapor_number_density(i))
            .map(|v| v.get("m-3"))
            .collect();
        let pressure: Array1<f64> = profile.pressure_profile().iter().map(|v| v.get("mb")).collect();
        let o3: Array1<f64> = profile.o3_profile().iter().map(|v| v.get("m-3")).collect();
        let co: Array1<f64> = profile.co_profile().iter().map(|v| v.get("m-3")).collect();
        let n2o: Array1<f64> = profile.n2o_profile().iter().map(|v| v.get("m-3")).collect();

        let mut report = format!("Number of layers returned: {n}\nLayer parameters: \n");
        for i in 0..n {
            let _ = writeln!(
                report,
                " P: {} mb  T: {} K  Thickness: {} m  WaterVapor: {} kg m-3  WaterVapor: {} m-3  CO: {} m-3  O3: {} m-3  N2O: {} m-3",
                pressure[i],
                temperature[i],
                thickness[i],
                water_mass_density[i],
                water_number_density[i],
                co[i],
                o3[i],
                n2o[i],
            );
        }

        Self {
            thickness,
            temperature,
            water_mass_density,
            water_number_density,
            pressure,
            o3,
            co,
            n2o,
            report,
        }
    }
}

/// The atmosphere tool: one reference profile, built on request.
#[pyclass]
#[derive(Debug, Default)]
struct Atmosphere {
    profile: Option<AtmProfile>,
}

impl Atmosphere {
    fn profile(&self) -> Result<&AtmProfile, AtmError> {
        self.profile.as_ref().ok_or_else(|| {
            warn!("Please initialize atmospheric profile with init_atm_profile.");
            AtmError::NotInitialized
        })
    }
}

#[pymethods]
impl Atmosphere {
    #[new]
    fn new() -> Self {
        Self::default()
    }

    /// Build the reference profile and describe it.
    #[pyo3(signature = (altitude_m=5000.0, temperature_k=270.0, pressure_mb=560.0, max_altitude_km=48.0, humidity=20.0, lapse_rate=-5.6, pressure_step_mb=10.0, pressure_step_factor=1.2, scale_height_km=2.0, atm_type=1, co_indexing="legacy"))]
    #[allow(clippy::too_many_arguments)]
    fn init_atm_profile(
        &mut self,
        altitude_m: f64,
        temperature_k: f64,
        pressure_mb: f64,
        max_altitude_km: f64,
        humidity: f64,
        lapse_rate: f64,
        pressure_step_mb: f64,
        pressure_step_factor: f64,
        scale_height_km: f64,
        atm_type: u32,
        co_indexing: &str,
    ) -> PyResult<String> {
        let atm_type = AtmosphereType::try_from(atm_type)?;
        let options = ProfileOptions {
            co_indexing: co_indexing_from_str(co_indexing)?,
            ..ProfileOptions::default()
        };
        let params = BasicParameters::new(
            Length::new(altitude_m, "m"),
            Pressure::new(pressure_mb, "mb"),
            Temperature::new(temperature_k, "K"),
            lapse_rate,
            Humidity::new(humidity, "%"),
            Length::new(scale_height_km, "km"),
            atm_type,
        )
        .with_pressure_step(Pressure::new(pressure_step_mb, "mb"))
        .with_pressure_step_factor(pressure_step_factor)
        .with_top_atm_profile(Length::new(max_altitude_km, "km"));

        let profile = AtmProfile::with_options(params, options);

        let mut report = String::new();
        report.push_str("BASIC ATMOSPHERIC PARAMETERS TO GENERATE REFERENCE ATMOSPHERIC PROFILE\n  \n");
        let _ = writeln!(report, "Ground temperature T:         {temperature_k} K");
        let _ = writeln!(report, "Ground pressure P:            {pressure_mb} mb");
        let _ = writeln!(report, "Relative humidity rh:         {humidity} %");
        let _ = writeln!(report, "Scale height h0:              {scale_height_km} km");
        let _ = writeln!(report, "Pressure step dp:             {pressure_step_mb} mb");
        let _ = writeln!(report, "Altitude alti:                {altitude_m} m");
        let _ = writeln!(report, "Attitude top atm profile:     {max_altitude_km} km");
        let _ = writeln!(report, "Pressure step factor:         {pressure_step_factor} ");
        let _ = writeln!(report, "Tropospheric lapse rate:      {lapse_rate} K/km");
        let _ = writeln!(report, "Atmospheric type:             {atm_type}");
        let _ = writeln!(report);
        let _ = writeln!(report, "Built atmospheric profile with {} layers.", profile.num_layers());
        let _ = writeln!(report);

        self.profile = Some(profile);
        Ok(report)
    }

    /// Rebuild the profile if any of the ground parameters changed.
    #[pyo3(signature = (altitude_m, temperature_k, pressure_mb, humidity, lapse_rate, scale_height_km))]
    fn update_atm_profile(
        &mut self,
        altitude_m: f64,
        temperature_k: f64,
        pressure_mb: f64,
        humidity: f64,
        lapse_rate: f64,
        scale_height_km: f64,
    ) -> PyResult<String> {
        let profile = self.profile.as_mut().ok_or(AtmError::NotInitialized)?;
        let changed = profile.set_basic_atmospheric_parameters(
            Length::new(altitude_m, "m"),
            Pressure::new(pressure_mb, "mb"),
            Temperature::new(temperature_k, "K"),
            lapse_rate,
            Humidity::new(humidity, "%"),
            Length::new(scale_height_km, "km"),
        );
        if changed {
            debug!("rebuilt profile with {} layers", profile.num_layers());
        } else {
            info!("Atmospheric profile unchanged");
        }

        let mut report = String::new();
        report.push_str(
            "UPDATED BASIC ATMOSPHERIC PARAMETERS TO GENERATE REFERENCE ATMOSPHERIC PROFILE\n  \n",
        );
        let _ = writeln!(report, "Ground temperature T:         {temperature_k} K");
        let _ = writeln!(report, "Ground pressure P:            {pressure_mb} mb");
        let _ = writeln!(report, "Relative humidity rh:         {humidity} %");
        let _ = writeln!(report, "Scale height h0:              {scale_height_km} km");
        let _ = writeln!(report, "Altitude alti:                {altitude_m} m");
        let _ = writeln!(report, "Tropospheric lapse rate:      {lapse_rate} K/km");
        let _ = writeln!(report);
        Ok(report)
    }

    /// Parameters the current profile was built from.
    fn get_basic_atm_parms(&self) -> PyResult<BasicAtmParms> {
        let profile = self.profile()?;
        let params = profile.basic_parameters().ok_or(AtmError::NotInitialized)?;

        let mut parms = BasicAtmParms {
            altitude_m: params.altitude().get("m"),
            temperature_k: params.ground_temperature().get("K"),
            pressure_mb: params.ground_pressure().get("mb"),
            max_altitude_km: params.top_atm_profile().get("km"),
            humidity: params.relative_humidity().get("%"),
            lapse_rate: params.tropo_lapse_rate(),
            pressure_step_mb: params.pressure_step().get("mb"),
            pressure_step_factor: params.pressure_step_factor(),
            scale_height_km: params.wv_scale_height().get("km"),
            atm_type: params.atm_type().to_string(),
            report: String::new(),
        };

        let report = &mut parms.report;
        report.push_str("CURRENT ATMOSPHERIC PARAMETERS OF REFERENCE ATMOSPHERIC PROFILE\n  \n");
        let _ = writeln!(report, "Ground temperature T:         {} K", parms.temperature_k);
        let _ = writeln!(report, "Ground pressure P:            {} mbar", parms.pressure_mb);
        let _ = writeln!(report, "Relative humidity rh:         {} %", parms.humidity);
        let _ = writeln!(report, "Scale height h0:              {} km", parms.scale_height_km);
        let _ = writeln!(report, "Pressure step dp:             {} mbar", parms.pressure_step_mb);
        let _ = writeln!(report, "Altitude alti:                {} m", parms.altitude_m);
        let _ = writeln!(report, "Attitude top atm profile      {} km", parms.max_altitude_km);
        let _ = writeln!(report, "Pressure step factor          {} ", parms.pressure_step_factor);
        let _ = writeln!(report, "Tropospheric lapse rate       {} K/km", parms.lapse_rate);
        let _ = writeln!(report, "Atmospheric type:             {}", parms.atm_type);
        let _ = writeln!(report);
        let _ = writeln!(report, "Atmospheric profile has {} layers.", profile.num_layers());

        Ok(parms)
    }

    /// Number of layers of the current profile
    fn get_num_layers(&self) -> PyResult<usize> {
        Ok(self.profile()?.num_layers())
    }

    /// Zenith water vapor column in mm
    fn get_ground_wh2o(&self) -> PyResult<f64> {
        Ok(self.profile()?.ground_wh2o().get("mm"))
    }

    /// Tropopause altitude in km and temperature in K
    fn get_tropopause(&self) -> PyResult<(f64, f64)> {
        let profile = self.profile()?;
        Ok((
            profile.tropopause_altitude().get("km"),
            profile.tropopause_temperature().get("K"),
        ))
    }

    /// All layer values of the current profile
    fn get_profile(&self) -> PyResult<PyProfile> {
        Ok(PyProfile::new(self.profile()?))
    }

    /// One line per atmosphere type
    #[staticmethod]
    fn list_atmosphere_types() -> String {
        profile::list_atmosphere_types().join("\n")
    }

    /// O3, N2O and CO number densities in m-3 at `altitude_km`
    #[staticmethod]
    #[pyo3(signature = (altitude_km, atm_type, co_indexing="legacy"))]
    fn st76(altitude_km: f64, atm_type: u32, co_indexing: &str) -> PyResult<(f64, f64, f64)> {
        let gases = profile::st76(
            Length::new(altitude_km, "km"),
            AtmosphereType::try_from(atm_type)?,
            co_indexing_from_str(co_indexing)?,
        );
        Ok((gases.o3.get("m-3"), gases.n2o.get("m-3"), gases.co.get("m-3")))
    }
}

/// Per-site results of [`compute_profiles`]
#[pyclass(name = "ProfileSummary", frozen)]
#[derive(Debug)]
struct PyProfileSummary(ProfileSummary);

#[pymethods]
impl PyProfileSummary {
    #[getter]
    fn num_layers<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<u32>> {
        self.0.num_layers.to_pyarray(py)
    }

    #[getter]
    fn ground_wh2o<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.0.ground_wh2o_mm.to_pyarray(py)
    }

    #[getter]
    fn tropopause_altitude<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.0.tropopause_altitude_km.to_pyarray(py)
    }

    #[getter]
    fn tropopause_temperature<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray1<f64>> {
        self.0.tropopause_temperature_k.to_pyarray(py)
    }

    #[getter]
    fn thickness<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.0.thickness_m.to_pyarray(py)
    }

    #[getter]
    fn temperature<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.0.temperature_k.to_pyarray(py)
    }

    #[getter]
    fn pressure<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.0.pressure_mb.to_pyarray(py)
    }

    #[getter]
    fn water_vapor<'py>(&self, py: Python<'py>) -> Bound<'py, PyArray2<f64>> {
        self.0.water_vapor_kg_m3.to_pyarray(py)
    }
}

/// Build one profile per site.
///
/// All inputs have shape (`num_sites`, ):
///
/// `altitude`: site altitude in m
///
/// `temperature`: ground temperature in K
///
/// `pressure`: ground pressure in mb
///
/// `humidity`: relative humidity in %
///
/// `lapse_rate`: tropospheric lapse rate in K/km
///
/// `scale_height`: water vapor scale height in km
///
/// `atm_type`: atmosphere type code, 1 to 5
///
/// Scalars in the returned summary have shape (`num_sites`, ) and layer
/// arrays (`num_sites`, `max_layers`), padded with NaN.
///
/// The number of worker threads is controlled by `num_threads`. It must be a
/// positive integer, or `None` to automatically choose the number of threads.
#[pyfunction]
#[pyo3(signature = (altitude, temperature, pressure, humidity, lapse_rate, scale_height, atm_type, num_threads=None, co_indexing="legacy"))]
#[allow(clippy::too_many_arguments)]
fn compute_profiles(
    py: Python<'_>,
    altitude: PyReadonlyArray1<'_, f64>,
    temperature: PyReadonlyArray1<'_, f64>,
    pressure: PyReadonlyArray1<'_, f64>,
    humidity: PyReadonlyArray1<'_, f64>,
    lapse_rate: PyReadonlyArray1<'_, f64>,
    scale_height: PyReadonlyArray1<'_, f64>,
    atm_type: PyReadonlyArray1<'_, u32>,
    num_threads: Option<usize>,
    co_indexing: &str,
) -> PyResult<PyProfileSummary> {
    let altitude = altitude.as_slice()?;
    let temperature = temperature.as_slice()?;
    let pressure = pressure.as_slice()?;
    let humidity = humidity.as_slice()?;
    let lapse_rate = lapse_rate.as_slice()?;
    let scale_height = scale_height.as_slice()?;
    let atm_type = atm_type.as_slice()?;
    let num_sites = altitude.len();

    let lengths = [
        temperature.len(),
        pressure.len(),
        humidity.len(),
        lapse_rate.len(),
        scale_height.len(),
        atm_type.len(),
    ];
    if lengths.iter().any(|&n| n != num_sites) {
        return Err(AtmError::InconsistentInputs.into());
    }
    debug!("input shapes are consistent");

    let sites = (0..num_sites)
        .map(|i| -> Result<_, AtmError> {
            Ok(BasicParameters::new(
                Length::new(altitude[i], "m"),
                Pressure::new(pressure[i], "mb"),
                Temperature::new(temperature[i], "K"),
                lapse_rate[i],
                Humidity::new(humidity[i], "%"),
                Length::new(scale_height[i], "km"),
                AtmosphereType::try_from(atm_type[i])?,
            ))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let options = ProfileOptions {
        co_indexing: co_indexing_from_str(co_indexing)?,
        ..ProfileOptions::default()
    };

    let progress = BatchProgress::new();
    let profiles = batch::build_profiles_monitored(
        &sites,
        &options,
        num_threads,
        &progress,
        |progress| -> PyResult<()> {
            py.check_signals()?;

            let num_completed = progress.completed();
            let percent = num_completed as f32 / num_sites.max(1) as f32 * 100.;
            info!("Built {num_completed}/{num_sites} profiles ({percent:0.2}%)");

            if num_completed < num_sites {
                py.allow_threads(|| std::thread::sleep(Duration::from_secs(1)));
            }
            Ok(())
        },
    )?;

    debug!("summarizing {} profiles", profiles.len());
    Ok(PyProfileSummary(batch::summarize(&profiles)))
}

/// Atmospheric profiles for radiative transfer, implemented in Rust.
#[pymodule]
fn atm_profile(m: &Bound<'_, PyModule>) -> PyResult<()> {
    pyo3_log::init();

    m.add_function(wrap_pyfunction!(compute_profiles, m)?)?;
    m.add_class::<Atmosphere>()?;
    m.add_class::<BasicAtmParms>()?;
    m.add_class::<PyProfile>()?;
    m.add_class::<PyProfileSummary>()?;
    Ok(())
}

