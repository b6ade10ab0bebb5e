//! Atmospheric profiles above an observing site
//!
//! Builds a layered, plane-parallel model of the atmosphere (thickness,
//! temperature, pressure, water vapor, O3, CO and N2O per layer) from a few
//! ground observables, the way the ATM radiative transfer model expects it.
//!
//! ```no_run
//! use atm_profile::{AtmProfile, AtmosphereType, BasicParameters};
//! use atm_profile::units::{Humidity, Length, Pressure, Temperature};
//!
//! let params = BasicParameters::new(
//!     Length::new(5000.0, "m"),
//!     Pressure::new(550.0, "mb"),
//!     Temperature::new(270.0, "K"),
//!     -5.6,
//!     Humidity::new(20.0, "%"),
//!     Length::new(2.0, "km"),
//!     AtmosphereType::Tropical,
//! );
//! let profile = AtmProfile::new(params);
//! println!("{} layers, {} mm of water", profile.num_layers(), profile.ground_wh2o().get("mm"));
//! ```
//!
//! The Python extension module is built with the `python` feature.

pub mod batch;
pub mod error;
pub mod profile;
pub mod units;

#[cfg(feature = "python")]
mod python;

pub use error::AtmError;
pub use profile::{
    list_atmosphere_types, AtmProfile, AtmosphereType, BasicParameters, CoTableIndexing,
    LayerProfile, ProfileOptions, WaterVaporProfile,
};
