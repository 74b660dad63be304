#![warn(clippy::pedantic)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::many_single_char_names,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::too_many_lines,
    clippy::float_cmp,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::module_name_repetitions
)]

use thiserror::Error;

pub mod ellipsoid;
pub mod geodesic;
pub mod geodesic_line;
pub mod intersect;
pub mod latlon;
pub mod magnetic;
pub mod projections;
pub mod rhumb;
pub mod utm;
pub mod utility;

pub(crate) mod constants;
pub(crate) mod elliptic;

pub use ellipsoid::Ellipsoid;
pub use geodesic::{Geodesic, DirectSolution, InverseSolution};
pub use geodesic_line::GeodesicLine;
pub use intersect::{Coincidence, Crossing, Intersect};
pub use latlon::{Hemisphere, LatLon};
pub use magnetic::{FieldComponents, MagneticField, MagneticModel, MagneticRegistry};
pub use projections::{polar_stereographic::PolarStereographic, transverse_mercator::TransverseMercator};
pub use rhumb::{Rhumb, RhumbInverse, RhumbLine};
pub use utm::{UtmUps, ZoneSpec};

/// Errors raised while building an ellipsoid or a projector from its
/// defining parameters.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConstructionError {
    #[error("Equatorial radius {0} is not positive")]
    EquatorialRadiusNotPositive(f64),
    #[error("Flattening {0} gives a polar semi-axis that is not positive")]
    PolarSemiAxisNotPositive(f64),
    #[error("Scale factor {0} is not positive")]
    ScaleFactorNotPositive(f64),
    #[error("Extended domain requires the exact transverse Mercator formulation")]
    ExtendedRequiresExact,
    #[error("Flattening {0} is not positive, the exact transverse Mercator needs an oblate ellipsoid")]
    FlatteningNotPositive(f64),
}

/// Errors raised when an input lies outside the domain an operation accepts.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum RangeError {
    #[error("Latitude {0} outside of valid range [-90, 90]")]
    IllegalLatitude(f64),
    #[error("Longitude {0} is not a finite number")]
    IllegalLongitude(f64),
    #[error("Zone {0} not in range [0, 60]")]
    ZoneOutOfRange(i32),
    #[error("Zone specification {0} is not recognized")]
    InvalidZoneSpec(i32),
    #[error("Easting {easting:.2}m not in UTM range [{min:.2}m, {max:.2}m]")]
    UtmEastingOutOfBounds { easting: f64, min: f64, max: f64 },
    #[error("Northing {northing:.2}m not in UTM range [{min:.2}m, {max:.2}m]")]
    UtmNorthingOutOfBounds { northing: f64, min: f64, max: f64 },
    #[error("Easting {easting:.2}m not in UPS range [{min:.2}m, {max:.2}m]")]
    UpsEastingOutOfBounds { easting: f64, min: f64, max: f64 },
    #[error("Northing {northing:.2}m not in UPS range [{min:.2}m, {max:.2}m]")]
    UpsNorthingOutOfBounds { northing: f64, min: f64, max: f64 },
    #[error("Longitude {longitude} more than 60d from the central meridian of UTM zone {zone}")]
    LongitudeTooFarFromZone { longitude: f64, zone: i32 },
    #[error("Latitude {0} more than 20d from the pole, UPS is not defined there")]
    LatitudeTooFarFromPole(f64),
    #[error("Latitude {0} is the pole opposite the polar stereographic center")]
    OppositePole(f64),
    #[error("Rhumb line from latitude {latitude} with azimuth {azimuth} passes a pole before {distance}m")]
    RhumbPastPole { latitude: f64, azimuth: f64, distance: f64 },
}

/// Errors raised while loading or evaluating a magnetic field model.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Magnetic model {name} not found in {directory}")]
    ModelNotFound { name: String, directory: String },
    #[error("Could not read magnetic model {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Magnetic model {name} is malformed: {msg}")]
    Format { name: String, msg: String },
    #[error("Magnetic model {name} coefficient file ID {found} does not match {expected}")]
    IdMismatch { name: String, expected: String, found: String },
    #[error("Height {height}m outside of model range [{min}m, {max}m]")]
    OutsideHeightRange { height: f64, min: f64, max: f64 },
    #[error("Time {time} outside of model range [{min}, {max})")]
    OutsideTimeRange { time: f64, min: f64, max: f64 },
    #[error(transparent)]
    Range(#[from] RangeError),
}

/// Any error raised by this crate.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Construction(#[from] ConstructionError),
    #[error(transparent)]
    Range(#[from] RangeError),
    #[error(transparent)]
    Model(#[from] ModelError),
}

trait ThisOrThat {
    fn ternary<T>(&self, r#true: T, r#false: T) -> T;
    fn ternary_lazy<F, E, T>(&self, r#true: F, r#false: E) -> T
    where
        F: Fn() -> T,
        E: Fn() -> T;
}

impl ThisOrThat for bool {
    fn ternary<T>(&self, r#true: T, r#false: T) -> T {
        if *self { r#true } else { r#false }
    }

    fn ternary_lazy<F, E, T>(&self, r#true: F, r#false: E) -> T
    where
        F: Fn() -> T,
        E: Fn() -> T,
    {
        if *self { r#true() } else { r#false() }
    }
}
