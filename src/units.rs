//! Unit-tagged physical quantities.
//!
//! Every type wraps a single `f64` held in one canonical unit:
//!
//! | type            | canonical unit |
//! |-----------------|----------------|
//! | [`Length`]        | m              |
//! | [`Pressure`]      | mb             |
//! | [`Temperature`]   | K              |
//! | [`Humidity`]      | %              |
//! | [`MassDensity`]   | kg m⁻³         |
//! | [`NumberDensity`] | m⁻³            |
//!
//! Unit strings are matched case-insensitively at the boundary (`new` and
//! `get`). A unit that isn't recognised is treated as the canonical unit; this
//! is relied upon by callers passing e.g. `"kg m-3"` style labels around.

use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Value returned by the legacy per-layer accessors for a missing layer, in
/// the canonical unit of the quantity.
pub const SENTINEL: f64 = -999.0;

/// Common behaviour of the unit-tagged quantities.
pub trait Quantity: Copy {
    /// Name of the canonical unit.
    const CANONICAL_UNIT: &'static str;

    /// Wrap a value already expressed in the canonical unit.
    fn from_canonical(value: f64) -> Self;

    /// The value in the canonical unit.
    fn canonical(self) -> f64;
}

/// Map a missing value onto the historical `-999` sentinel.
///
/// Pipelines built around the old silent-failure accessors compare against
/// this value instead of checking for absence.
pub fn or_sentinel<Q: Quantity>(value: Option<Q>) -> Q {
    value.unwrap_or_else(|| Q::from_canonical(SENTINEL))
}

/// Look up how many canonical units one `unit` is worth. Unknown units are
/// worth exactly one canonical unit.
fn scale(unit: &str, aliases: &[(&str, f64)]) -> f64 {
    let unit = unit.trim();
    aliases
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(unit))
        .map_or(1.0, |&(_, factor)| factor)
}

macro_rules! quantity {
    ($(#[$doc:meta])* $name:ident, $canonical:literal, $to_canonical:ident, $from_canonical:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
        pub struct $name(f64);

        impl $name {
            /// Create a quantity from `value` expressed in `unit`.
            pub fn new(value: f64, unit: &str) -> Self {
                Self($to_canonical(value, unit))
            }

            /// The value expressed in `unit`.
            pub fn get(self, unit: &str) -> f64 {
                $from_canonical(self.0, unit)
            }

            /// The value in the canonical unit.
            pub const fn value(self) -> f64 {
                self.0
            }
        }

        impl Quantity for $name {
            const CANONICAL_UNIT: &'static str = $canonical;

            fn from_canonical(value: f64) -> Self {
                Self(value)
            }

            fn canonical(self) -> f64 {
                self.0
            }
        }

        impl From<f64> for $name {
            fn from(value: f64) -> Self {
                Self(value)
            }
        }

        impl Add for $name {
            type Output = Self;
            fn add(self, rhs: Self) -> Self {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $name {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self {
                Self(self.0 - rhs.0)
            }
        }

        impl Neg for $name {
            type Output = Self;
            fn neg(self) -> Self {
                Self(-self.0)
            }
        }

        impl Mul<f64> for $name {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $name {
            type Output = Self;
            fn div(self, rhs: f64) -> Self {
                Self(self.0 / rhs)
            }
        }

        /// Ratio of two quantities of the same kind.
        impl Div for $name {
            type Output = f64;
            fn div(self, rhs: Self) -> f64 {
                self.0 / rhs.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} {}", self.0, $canonical)
            }
        }
    };
}

const LENGTH_UNITS: &[(&str, f64)] = &[
    ("m", 1.0),
    ("km", 1.0e3),
    ("cm", 1.0e-2),
    ("mm", 1.0e-3),
    ("microns", 1.0e-6),
    ("micron", 1.0e-6),
    ("um", 1.0e-6),
    ("nm", 1.0e-9),
];

fn length_to_m(value: f64, unit: &str) -> f64 {
    value * scale(unit, LENGTH_UNITS)
}

fn length_from_m(value: f64, unit: &str) -> f64 {
    value / scale(unit, LENGTH_UNITS)
}

const PRESSURE_UNITS: &[(&str, f64)] = &[
    ("mb", 1.0),
    ("mbar", 1.0),
    ("hpa", 1.0),
    ("pa", 1.0e-2),
    ("kpa", 10.0),
    ("bar", 1.0e3),
    ("atm", 1013.25),
    ("torr", 1013.25 / 760.0),
];

fn pressure_to_mb(value: f64, unit: &str) -> f64 {
    value * scale(unit, PRESSURE_UNITS)
}

fn pressure_from_mb(value: f64, unit: &str) -> f64 {
    value / scale(unit, PRESSURE_UNITS)
}

/// Offset between the Celsius and Kelvin scales.
const CELSIUS_OFFSET: f64 = 273.15;

fn is_celsius(unit: &str) -> bool {
    ["c", "degc"].iter().any(|u| u.eq_ignore_ascii_case(unit.trim()))
}

fn is_millikelvin(unit: &str) -> bool {
    unit.trim().eq_ignore_ascii_case("mk")
}

fn temperature_to_k(value: f64, unit: &str) -> f64 {
    if is_celsius(unit) {
        value + CELSIUS_OFFSET
    } else if is_millikelvin(unit) {
        value * 1.0e-3
    } else {
        value
    }
}

fn temperature_from_k(value: f64, unit: &str) -> f64 {
    if is_celsius(unit) {
        value - CELSIUS_OFFSET
    } else if is_millikelvin(unit) {
        value * 1.0e3
    } else {
        value
    }
}

const HUMIDITY_UNITS: &[(&str, f64)] = &[("%", 1.0), ("percent", 1.0)];

fn humidity_to_percent(value: f64, unit: &str) -> f64 {
    value * scale(unit, HUMIDITY_UNITS)
}

fn humidity_from_percent(value: f64, unit: &str) -> f64 {
    value / scale(unit, HUMIDITY_UNITS)
}

const MASS_DENSITY_UNITS: &[(&str, f64)] = &[
    ("kgm**-3", 1.0),
    ("kg m-3", 1.0),
    ("kg/m3", 1.0),
    ("gm**-3", 1.0e-3),
    ("g m-3", 1.0e-3),
    ("g/m3", 1.0e-3),
    ("gcm**-3", 1.0e3),
    ("g cm-3", 1.0e3),
    ("g/cm3", 1.0e3),
];

fn mass_density_to_kgm3(value: f64, unit: &str) -> f64 {
    value * scale(unit, MASS_DENSITY_UNITS)
}

fn mass_density_from_kgm3(value: f64, unit: &str) -> f64 {
    value / scale(unit, MASS_DENSITY_UNITS)
}

const NUMBER_DENSITY_UNITS: &[(&str, f64)] = &[
    ("m**-3", 1.0),
    ("m-3", 1.0),
    ("cm**-3", 1.0e6),
    ("cm-3", 1.0e6),
];

fn number_density_to_m3(value: f64, unit: &str) -> f64 {
    value * scale(unit, NUMBER_DENSITY_UNITS)
}

fn number_density_from_m3(value: f64, unit: &str) -> f64 {
    value / scale(unit, NUMBER_DENSITY_UNITS)
}

quantity!(
    /// A length or altitude, stored in m.
    Length,
    "m",
    length_to_m,
    length_from_m
);

quantity!(
    /// A pressure, stored in mb (hPa).
    Pressure,
    "mb",
    pressure_to_mb,
    pressure_from_mb
);

quantity!(
    /// A temperature, stored in K. Also accepts `"C"` and `"mK"`.
    Temperature,
    "K",
    temperature_to_k,
    temperature_from_k
);

quantity!(
    /// A relative humidity, stored in %.
    Humidity,
    "%",
    humidity_to_percent,
    humidity_from_percent
);

quantity!(
    /// A mass density, stored in kg m⁻³.
    MassDensity,
    "kgm**-3",
    mass_density_to_kgm3,
    mass_density_from_kgm3
);

quantity!(
    /// A number density, stored in m⁻³.
    NumberDensity,
    "m**-3",
    number_density_to_m3,
    number_density_from_m3
);
