//! Layered model of the atmosphere above a site.
//!
//! An [`AtmProfile`] is either built from a handful of ground observables
//! ([`BasicParameters`]) or taken directly from caller-supplied layers
//! ([`LayerProfile`]). Layer 0 is the layer immediately above the site.

mod builder;
pub mod core;
pub mod humidity;
pub mod st76;

#[cfg(test)]
mod tests;

pub use self::core::poli2;
pub use self::humidity::{rwat, rwat_inv};
pub use self::st76::{st76, CoTableIndexing, MinorGasDensities};

use crate::error::AtmError;
use crate::units::{Humidity, Length, MassDensity, NumberDensity, Pressure, Temperature};
use log::{debug, warn};

/// Avogadro's number used for the water vapor number density
const WV_AVOGADRO: f64 = 6.023e23;

/// Molecular weight of water, g/mol
const WATER_MOLECULAR_WEIGHT: f64 = 18.0;

fn water_mass_to_number(kg_m3: f64) -> f64 {
    kg_m3 * WV_AVOGADRO * 1000.0 / WATER_MOLECULAR_WEIGHT
}

fn water_number_to_mass(per_m3: f64) -> f64 {
    per_m3 * WATER_MOLECULAR_WEIGHT / (1000.0 * WV_AVOGADRO)
}

/// The five climatological atmospheres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AtmosphereType {
    /// Code 1
    Tropical,
    /// Code 2
    MidlatSummer,
    /// Code 3
    MidlatWinter,
    /// Code 4
    SubarcticSummer,
    /// Code 5
    SubarcticWinter,
}

impl AtmosphereType {
    /// All atmosphere types in code order.
    pub const ALL: [AtmosphereType; 5] = [
        AtmosphereType::Tropical,
        AtmosphereType::MidlatSummer,
        AtmosphereType::MidlatWinter,
        AtmosphereType::SubarcticSummer,
        AtmosphereType::SubarcticWinter,
    ];

    /// Integer code, 1 to 5.
    pub fn code(self) -> u32 {
        match self {
            AtmosphereType::Tropical => 1,
            AtmosphereType::MidlatSummer => 2,
            AtmosphereType::MidlatWinter => 3,
            AtmosphereType::SubarcticSummer => 4,
            AtmosphereType::SubarcticWinter => 5,
        }
    }

    /// Upper-case name, e.g. `"MIDLATWINTER"`.
    pub fn name(self) -> &'static str {
        match self {
            AtmosphereType::Tropical => "TROPICAL",
            AtmosphereType::MidlatSummer => "MIDLATSUMMER",
            AtmosphereType::MidlatWinter => "MIDLATWINTER",
            AtmosphereType::SubarcticSummer => "SUBARCTICSUMMER",
            AtmosphereType::SubarcticWinter => "SUBARCTICWINTER",
        }
    }

    /// Pressure in mb below which the profile follows the standard-atmosphere
    /// knots instead of the lapse rate.
    pub fn pressure_limit(self) -> f64 {
        pressure_limit_for_code(self.code())
    }

    /// Row of the per-type tables.
    pub(crate) fn row(self) -> usize {
        self.code() as usize - 1
    }
}

impl TryFrom<u32> for AtmosphereType {
    type Error = AtmError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        AtmosphereType::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or(AtmError::UnknownAtmosphereType(code))
    }
}

impl std::fmt::Display for AtmosphereType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Pressure limit in mb for an integer atmosphere code; any code outside 1 to
/// 5 gets 250 mb.
pub fn pressure_limit_for_code(code: u32) -> f64 {
    match code {
        1 => 230.2,
        2 => 198.0,
        3 => 300.0,
        4 => 311.0,
        5 => 332.0,
        _ => 250.0,
    }
}

/// Human-readable list of the atmosphere types, `"1 - TROPICAL"` and so on.
pub fn list_atmosphere_types() -> Vec<String> {
    AtmosphereType::ALL
        .iter()
        .map(|t| format!("{} - {}", t.code(), t.name()))
        .collect()
}

/// Ground observables and stepping controls a profile is built from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasicParameters {
    altitude: Length,
    ground_pressure: Pressure,
    ground_temperature: Temperature,
    tropo_lapse_rate: f64,
    relative_humidity: Humidity,
    wv_scale_height: Length,
    pressure_step: Pressure,
    pressure_step_factor: f64,
    top_atm_profile: Length,
    atm_type: AtmosphereType,
}

impl BasicParameters {
    /// Parameters for a site, with the default stepping: 10 mb first
    /// pressure step growing by a factor 1.2, up to 48 km.
    ///
    /// `tropo_lapse_rate` is in K/km and is usually negative.
    pub fn new(
        altitude: Length,
        ground_pressure: Pressure,
        ground_temperature: Temperature,
        tropo_lapse_rate: f64,
        relative_humidity: Humidity,
        wv_scale_height: Length,
        atm_type: AtmosphereType,
    ) -> Self {
        Self {
            altitude,
            ground_pressure,
            ground_temperature,
            tropo_lapse_rate,
            relative_humidity,
            wv_scale_height,
            pressure_step: Pressure::new(10.0, "mb"),
            pressure_step_factor: 1.2,
            top_atm_profile: Length::new(48.0, "km"),
            atm_type,
        }
    }

    /// Override the first pressure step.
    pub fn with_pressure_step(mut self, pressure_step: Pressure) -> Self {
        self.pressure_step = pressure_step;
        self
    }

    /// Override the growth factor of the pressure step.
    pub fn with_pressure_step_factor(mut self, factor: f64) -> Self {
        self.pressure_step_factor = factor;
        self
    }

    /// Override the top of the profile.
    pub fn with_top_atm_profile(mut self, top: Length) -> Self {
        self.top_atm_profile = top;
        self
    }

    /// Site altitude
    pub fn altitude(&self) -> Length {
        self.altitude
    }

    /// Pressure at the site
    pub fn ground_pressure(&self) -> Pressure {
        self.ground_pressure
    }

    /// Temperature at the site
    pub fn ground_temperature(&self) -> Temperature {
        self.ground_temperature
    }

    /// Tropospheric lapse rate in K/km
    pub fn tropo_lapse_rate(&self) -> f64 {
        self.tropo_lapse_rate
    }

    /// Relative humidity at the site
    pub fn relative_humidity(&self) -> Humidity {
        self.relative_humidity
    }

    /// Water vapor scale height
    pub fn wv_scale_height(&self) -> Length {
        self.wv_scale_height
    }

    /// First pressure step
    pub fn pressure_step(&self) -> Pressure {
        self.pressure_step
    }

    /// Growth factor of the pressure step
    pub fn pressure_step_factor(&self) -> f64 {
        self.pressure_step_factor
    }

    /// Top of the profile
    pub fn top_atm_profile(&self) -> Length {
        self.top_atm_profile
    }

    /// Climatological atmosphere
    pub fn atm_type(&self) -> AtmosphereType {
        self.atm_type
    }

    /// Whether any of the six watched parameters differ. The atmosphere type
    /// and the stepping controls are not watched.
    fn watched_differ(&self, other: &BasicParameters) -> bool {
        self.altitude.value() != other.altitude.value()
            || self.ground_pressure.value() != other.ground_pressure.value()
            || self.ground_temperature.value() != other.ground_temperature.value()
            || self.wv_scale_height.value() != other.wv_scale_height.value()
            || self.tropo_lapse_rate != other.tropo_lapse_rate
            || self.relative_humidity.value() != other.relative_humidity.value()
    }
}

/// Switches of the profile engine that aren't physical inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProfileOptions {
    /// Row selection for the CO table
    pub co_indexing: CoTableIndexing,
    /// Most boundaries the builder walks before giving up on reaching the top
    pub max_boundaries: usize,
}

impl Default for ProfileOptions {
    fn default() -> Self {
        Self {
            co_indexing: CoTableIndexing::Legacy,
            max_boundaries: 1000,
        }
    }
}

/// Per-layer water vapor supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum WaterVaporProfile {
    /// Mass densities
    Mass(Vec<MassDensity>),
    /// Number densities, converted with 18 g/mol
    Number(Vec<NumberDensity>),
}

impl WaterVaporProfile {
    fn len(&self) -> usize {
        match self {
            WaterVaporProfile::Mass(v) => v.len(),
            WaterVaporProfile::Number(v) => v.len(),
        }
    }

    fn into_mass(self) -> Vec<MassDensity> {
        match self {
            WaterVaporProfile::Mass(v) => v,
            WaterVaporProfile::Number(v) => v
                .into_iter()
                .map(|n| MassDensity::new(water_number_to_mass(n.get("m**-3")), "kgm**-3"))
                .collect(),
        }
    }
}

/// An externally computed profile.
///
/// Gases left as `None` are zero in every layer.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerProfile {
    /// Layer thicknesses
    pub thickness: Vec<Length>,
    /// Layer mean pressures
    pub pressure: Vec<Pressure>,
    /// Layer mean temperatures
    pub temperature: Vec<Temperature>,
    /// Layer water vapor
    pub water_vapor: WaterVaporProfile,
    /// Layer ozone
    pub o3: Option<Vec<NumberDensity>>,
    /// Layer carbon monoxide
    pub co: Option<Vec<NumberDensity>>,
    /// Layer nitrous oxide
    pub n2o: Option<Vec<NumberDensity>>,
}

impl LayerProfile {
    /// Profile without minor gases.
    pub fn new(
        thickness: Vec<Length>,
        pressure: Vec<Pressure>,
        temperature: Vec<Temperature>,
        water_vapor: WaterVaporProfile,
    ) -> Self {
        Self {
            thickness,
            pressure,
            temperature,
            water_vapor,
            o3: None,
            co: None,
            n2o: None,
        }
    }

    /// Add an ozone profile.
    pub fn with_o3(mut self, o3: Vec<NumberDensity>) -> Self {
        self.o3 = Some(o3);
        self
    }

    /// Add carbon monoxide and nitrous oxide profiles.
    pub fn with_co_n2o(mut self, co: Vec<NumberDensity>, n2o: Vec<NumberDensity>) -> Self {
        self.co = Some(co);
        self.n2o = Some(n2o);
        self
    }

    fn is_consistent(&self) -> bool {
        let n = self.thickness.len();
        let gas_ok = |gas: &Option<Vec<NumberDensity>>| gas.as_ref().map_or(true, |v| v.len() == n);
        self.pressure.len() == n
            && self.temperature.len() == n
            && self.water_vapor.len() == n
            && gas_ok(&self.o3)
            && gas_ok(&self.co)
            && gas_ok(&self.n2o)
    }
}

/// The seven per-layer arrays, always of one length.
#[derive(Debug, Clone, Default, PartialEq)]
pub(crate) struct LayerArrays {
    pub thickness: Vec<Length>,
    pub temperature: Vec<Temperature>,
    pub pressure: Vec<Pressure>,
    pub water_vapor: Vec<MassDensity>,
    pub o3: Vec<NumberDensity>,
    pub co: Vec<NumberDensity>,
    pub n2o: Vec<NumberDensity>,
}

impl LayerArrays {
    pub fn with_capacity(n: usize) -> Self {
        Self {
            thickness: Vec::with_capacity(n),
            temperature: Vec::with_capacity(n),
            pressure: Vec::with_capacity(n),
            water_vapor: Vec::with_capacity(n),
            o3: Vec::with_capacity(n),
            co: Vec::with_capacity(n),
            n2o: Vec::with_capacity(n),
        }
    }

    pub fn zeros(n: usize) -> Self {
        Self {
            thickness: vec![Length::default(); n],
            temperature: vec![Temperature::default(); n],
            pressure: vec![Pressure::default(); n],
            water_vapor: vec![MassDensity::default(); n],
            o3: vec![NumberDensity::default(); n],
            co: vec![NumberDensity::default(); n],
            n2o: vec![NumberDensity::default(); n],
        }
    }

    pub fn len(&self) -> usize {
        self.thickness.len()
    }
}

fn set_layer<Q>(values: &mut [Q], index: usize, value: Q) -> Result<(), AtmError> {
    let num_layers = values.len();
    let slot = values
        .get_mut(index)
        .ok_or(AtmError::LayerOutOfRange { index, num_layers })?;
    *slot = value;
    Ok(())
}

/// A 1-D plane-parallel atmosphere above a site.
#[derive(Debug, Clone, Default)]
pub struct AtmProfile {
    params: Option<BasicParameters>,
    options: ProfileOptions,
    layers: LayerArrays,
    tropo_layer: usize,
    tropo_altitude: Length,
    tropo_temperature: Temperature,
    new_basic_params: bool,
}

impl AtmProfile {
    /// Build the profile for `params` with the default options.
    pub fn new(params: BasicParameters) -> Self {
        Self::with_options(params, ProfileOptions::default())
    }

    /// Build the profile for `params`.
    pub fn with_options(params: BasicParameters, options: ProfileOptions) -> Self {
        let mut profile = Self {
            params: Some(params),
            options,
            ..Self::default()
        };
        profile.rebuild();
        profile
    }

    /// A profile of `num_layers` layers, every value zero.
    pub fn with_layers(num_layers: usize) -> Self {
        Self {
            layers: LayerArrays::zeros(num_layers),
            new_basic_params: true,
            ..Self::default()
        }
    }

    /// Take the layers as given.
    ///
    /// If the supplied vectors don't all have the same length the profile is
    /// left empty. Use [`AtmProfile::try_from_layers`] to get an error
    /// instead.
    pub fn from_layers(input: LayerProfile) -> Self {
        Self::try_from_layers(input).unwrap_or_else(|e| {
            warn!("{e}, using an empty profile");
            Self {
                new_basic_params: true,
                ..Self::default()
            }
        })
    }

    /// Take the layers as given, failing if the vectors differ in length.
    pub fn try_from_layers(input: LayerProfile) -> Result<Self, AtmError> {
        if !input.is_consistent() {
            return Err(AtmError::InconsistentInputs);
        }
        let n = input.thickness.len();
        let zeros = || vec![NumberDensity::default(); n];

        let layers = LayerArrays {
            water_vapor: input.water_vapor.into_mass(),
            thickness: input.thickness,
            temperature: input.temperature,
            pressure: input.pressure,
            o3: input.o3.unwrap_or_else(zeros),
            co: input.co.unwrap_or_else(zeros),
            n2o: input.n2o.unwrap_or_else(zeros),
        };
        debug!("profile with {n} user-supplied layers");

        Ok(Self {
            layers,
            new_basic_params: true,
            ..Self::default()
        })
    }

    fn rebuild(&mut self) {
        if let Some(params) = &self.params {
            let built = builder::build(params, &self.options);
            self.layers = built.layers;
            self.tropo_layer = built.tropo_layer;
            self.tropo_altitude = built.tropo_altitude;
            self.tropo_temperature = built.tropo_temperature;
            self.new_basic_params = true;
        }
    }

    /// Rebuild the profile if any of the six watched parameters changed.
    ///
    /// Returns `true` if the profile was rebuilt. The values are compared
    /// exactly. A profile made from user-supplied layers has nothing to
    /// rebuild from and always returns `false`.
    pub fn update_atm_profile(
        &mut self,
        altitude: Length,
        ground_pressure: Pressure,
        ground_temperature: Temperature,
        tropo_lapse_rate: f64,
        relative_humidity: Humidity,
        wv_scale_height: Length,
    ) -> bool {
        let Some(current) = self.params else {
            warn!("profile was not built from basic parameters, ignoring update");
            return false;
        };
        let candidate = BasicParameters {
            altitude,
            ground_pressure,
            ground_temperature,
            tropo_lapse_rate,
            relative_humidity,
            wv_scale_height,
            ..current
        };
        if !current.watched_differ(&candidate) {
            return false;
        }

        self.params = Some(candidate);
        self.rebuild();
        debug!("basic parameters changed, rebuilt {} layers", self.num_layers());
        true
    }

    /// Same as [`AtmProfile::update_atm_profile`].
    pub fn set_basic_atmospheric_parameters(
        &mut self,
        altitude: Length,
        ground_pressure: Pressure,
        ground_temperature: Temperature,
        tropo_lapse_rate: f64,
        relative_humidity: Humidity,
        wv_scale_height: Length,
    ) -> bool {
        self.update_atm_profile(
            altitude,
            ground_pressure,
            ground_temperature,
            tropo_lapse_rate,
            relative_humidity,
            wv_scale_height,
        )
    }

    /// Parameters the profile was built from, if any.
    pub fn basic_parameters(&self) -> Option<&BasicParameters> {
        self.params.as_ref()
    }

    /// Engine options in use
    pub fn options(&self) -> &ProfileOptions {
        &self.options
    }

    /// Climatological atmosphere, if the profile was built from parameters.
    pub fn atmosphere_type(&self) -> Option<AtmosphereType> {
        self.params.map(|p| p.atm_type)
    }

    /// Number of layers
    pub fn num_layers(&self) -> usize {
        self.layers.len()
    }

    /// Boundary index where the standard-atmosphere knots take over.
    pub fn tropopause_layer(&self) -> usize {
        self.tropo_layer
    }

    /// Altitude of the tropopause above sea level.
    pub fn tropopause_altitude(&self) -> Length {
        self.tropo_altitude
    }

    /// Temperature at the tropopause
    pub fn tropopause_temperature(&self) -> Temperature {
        self.tropo_temperature
    }

    /// Whether the profile changed since the last
    /// [`AtmProfile::acknowledge_basic_parameters`].
    pub fn has_new_basic_parameters(&self) -> bool {
        self.new_basic_params
    }

    /// Clear the new-parameters flag.
    pub fn acknowledge_basic_parameters(&mut self) {
        self.new_basic_params = false;
    }

    /// Layer thicknesses, from the site upward
    pub fn thickness_profile(&self) -> &[Length] {
        &self.layers.thickness
    }

    /// Layer mean temperatures
    pub fn temperature_profile(&self) -> &[Temperature] {
        &self.layers.temperature
    }

    /// Layer mean pressures
    pub fn pressure_profile(&self) -> &[Pressure] {
        &self.layers.pressure
    }

    /// Layer mean water vapor mass densities
    pub fn water_vapor_profile(&self) -> &[MassDensity] {
        &self.layers.water_vapor
    }

    /// Layer ozone number densities
    pub fn o3_profile(&self) -> &[NumberDensity] {
        &self.layers.o3
    }

    /// Layer carbon monoxide number densities
    pub fn co_profile(&self) -> &[NumberDensity] {
        &self.layers.co
    }

    /// Layer nitrous oxide number densities
    pub fn n2o_profile(&self) -> &[NumberDensity] {
        &self.layers.n2o
    }

    /// Thickness of layer `i`
    pub fn layer_thickness(&self, i: usize) -> Option<Length> {
        self.layers.thickness.get(i).copied()
    }

    /// Mean temperature of layer `i`
    pub fn layer_temperature(&self, i: usize) -> Option<Temperature> {
        self.layers.temperature.get(i).copied()
    }

    /// Mean pressure of layer `i`
    pub fn layer_pressure(&self, i: usize) -> Option<Pressure> {
        self.layers.pressure.get(i).copied()
    }

    /// Water vapor mass density of layer `i`
    pub fn layer_water_vapor_mass_density(&self, i: usize) -> Option<MassDensity> {
        self.layers.water_vapor.get(i).copied()
    }

    /// Water vapor number density of layer `i`
    pub fn layer_water_vapor_number_density(&self, i: usize) -> Option<NumberDensity> {
        self.layer_water_vapor_mass_density(i)
            .map(|m| NumberDensity::new(water_mass_to_number(m.get("kgm**-3")), "m**-3"))
    }

    /// Ozone number density of layer `i`
    pub fn layer_o3(&self, i: usize) -> Option<NumberDensity> {
        self.layers.o3.get(i).copied()
    }

    /// Carbon monoxide number density of layer `i`
    pub fn layer_co(&self, i: usize) -> Option<NumberDensity> {
        self.layers.co.get(i).copied()
    }

    /// Nitrous oxide number density of layer `i`
    pub fn layer_n2o(&self, i: usize) -> Option<NumberDensity> {
        self.layers.n2o.get(i).copied()
    }

    /// Overwrite the thickness of layer `i`. No other layer is touched.
    pub fn set_layer_thickness(&mut self, i: usize, thickness: Length) -> Result<(), AtmError> {
        set_layer(&mut self.layers.thickness, i, thickness)
    }

    /// Overwrite the temperature of layer `i`.
    pub fn set_layer_temperature(
        &mut self,
        i: usize,
        temperature: Temperature,
    ) -> Result<(), AtmError> {
        set_layer(&mut self.layers.temperature, i, temperature)
    }

    /// Overwrite the pressure of layer `i`.
    pub fn set_layer_pressure(&mut self, i: usize, pressure: Pressure) -> Result<(), AtmError> {
        set_layer(&mut self.layers.pressure, i, pressure)
    }

    /// Overwrite the water vapor of layer `i`.
    pub fn set_layer_water_vapor_mass_density(
        &mut self,
        i: usize,
        water_vapor: MassDensity,
    ) -> Result<(), AtmError> {
        set_layer(&mut self.layers.water_vapor, i, water_vapor)
    }

    /// Overwrite the water vapor of layer `i` from a number density.
    pub fn set_layer_water_vapor_number_density(
        &mut self,
        i: usize,
        water_vapor: NumberDensity,
    ) -> Result<(), AtmError> {
        let mass = MassDensity::new(water_number_to_mass(water_vapor.get("m**-3")), "kgm**-3");
        set_layer(&mut self.layers.water_vapor, i, mass)
    }

    /// Overwrite the ozone of layer `i`.
    pub fn set_layer_o3(&mut self, i: usize, o3: NumberDensity) -> Result<(), AtmError> {
        set_layer(&mut self.layers.o3, i, o3)
    }

    /// Overwrite the carbon monoxide of layer `i`.
    pub fn set_layer_co(&mut self, i: usize, co: NumberDensity) -> Result<(), AtmError> {
        set_layer(&mut self.layers.co, i, co)
    }

    /// Overwrite the nitrous oxide of layer `i`.
    pub fn set_layer_n2o(&mut self, i: usize, n2o: NumberDensity) -> Result<(), AtmError> {
        set_layer(&mut self.layers.n2o, i, n2o)
    }

    /// Zenith column of water vapor above the site.
    ///
    /// Numerically the column in kg/m², which is mm of precipitable water,
    /// returned as a length.
    pub fn ground_wh2o(&self) -> Length {
        let kg_m2: f64 = self
            .layers
            .water_vapor
            .iter()
            .zip(&self.layers.thickness)
            .map(|(w, dz)| w.get("kgm**-3") * dz.get("m"))
            .sum();
        Length::new(kg_m2 * 1e-3, "m")
    }
}
