//! Geomagnetic field models such as the World Magnetic Model.
//!
//! A model named `name` is stored in a directory as two files: the text
//! header `name.wmm` and the binary coefficients `name.wmm.cof`. The
//! model holds one or more sets of Gauss coefficients at regularly spaced
//! epochs, the secular variation of the last epoch and optionally a set of
//! constant terms. The field at a given time is interpolated linearly
//! between epochs and extrapolated with the secular variation past the
//! last one.

use std::{
    env,
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use tracing::{debug, warn};

use crate::{
    latlon::check_latitude,
    utility::{atan2d, GeoMath},
    Ellipsoid, LatLon, ModelError, RangeError,
};

mod harmonic;
mod metadata;
pub mod registry;

use harmonic::{Coefficients, HarmonicSet};
use metadata::Metadata;
pub use registry::MagneticRegistry;

/// Fallback directory for model files when no environment variable
/// points elsewhere.
pub const DEFAULT_DIRECTORY: &str = "/usr/local/share/GeographicLib/magnetic";

/// Model loaded by [`MagneticModel::from_default_directory`] when
/// `GEOGRAPHICLIB_MAGNETIC_NAME` is not set.
pub const DEFAULT_NAME: &str = "wmm2025";

/// The directory holding magnetic model files: `GEOGRAPHICLIB_MAGNETIC_PATH`
/// if set, else `$GEOGRAPHICLIB_DATA/magnetic`, else [`DEFAULT_DIRECTORY`].
pub fn default_directory() -> PathBuf {
    let directory = resolve_directory(
        env::var_os("GEOGRAPHICLIB_MAGNETIC_PATH"),
        env::var_os("GEOGRAPHICLIB_DATA"),
    );
    if !directory.is_dir() {
        warn!(directory = %directory.display(), "magnetic model directory does not exist");
    }
    directory
}

/// The model name from `GEOGRAPHICLIB_MAGNETIC_NAME`, else [`DEFAULT_NAME`].
pub fn default_name() -> String {
    env::var("GEOGRAPHICLIB_MAGNETIC_NAME")
        .ok()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| DEFAULT_NAME.to_string())
}

fn resolve_directory(magnetic_path: Option<OsString>, data: Option<OsString>) -> PathBuf {
    match (magnetic_path, data) {
        (Some(path), _) if !path.is_empty() => PathBuf::from(path),
        (_, Some(data)) if !data.is_empty() => Path::new(&data).join("magnetic"),
        _ => PathBuf::from(DEFAULT_DIRECTORY),
    }
}

/// The field vector in nanotesla, resolved along the local east, north and
/// up directions.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MagneticField {
    pub east: f64,
    pub north: f64,
    pub up: f64,
}

/// The field as a compass user sees it.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FieldComponents {
    /// Angle of the horizontal field east of true north, in degrees
    pub declination: f64,
    /// Angle of the field below the horizontal, in degrees
    pub inclination: f64,
    /// Horizontal intensity in nanotesla
    pub horizontal: f64,
    /// Total intensity in nanotesla
    pub total: f64,
}

impl MagneticField {
    /// Declination, inclination and intensities of this field. The
    /// declination is 0 where the horizontal field vanishes.
    pub fn components(&self) -> FieldComponents {
        let horizontal = self.east.hypot(self.north);
        let total = horizontal.hypot(self.up);
        let declination = if horizontal == 0. { 0. } else { atan2d(self.east, self.north) };
        let inclination = atan2d(-self.up, horizontal);

        FieldComponents {
            declination,
            inclination,
            horizontal,
            total,
        }
    }
}

/// A spherical harmonic model of the geomagnetic field, evaluated on the
/// WGS84 ellipsoid.
///
/// # Usage
///
/// ```no_run
/// use geodesy::{LatLon, MagneticModel};
///
/// let model = MagneticModel::load("wmm2020", "/usr/local/share/GeographicLib/magnetic").unwrap();
/// let field = model.field(2022.5, &LatLon::create(-27.47, 153.03).unwrap(), 0.).unwrap();
/// println!("declination {:.2}", field.components().declination);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct MagneticModel {
    meta: Metadata,
    sets: Vec<HarmonicSet>,
    /// Highest degree over all sets
    degree: usize,
    ellipsoid: Ellipsoid,
}

impl MagneticModel {
    /// Reads the model `name` from `directory`.
    pub fn load(name: &str, directory: impl AsRef<Path>) -> Result<MagneticModel, ModelError> {
        let directory = directory.as_ref();
        let header = directory.join(format!("{name}.wmm"));
        let coefficients = directory.join(format!("{name}.wmm.cof"));
        if !header.is_file() || !coefficients.is_file() {
            return Err(ModelError::ModelNotFound {
                name: name.to_string(),
                directory: directory.display().to_string(),
            });
        }

        let io_error = |source| ModelError::Io {
            name: name.to_string(),
            source,
        };
        let text = fs::read_to_string(&header).map_err(io_error)?;
        let meta = metadata::parse(name, &text)?;
        let bytes = fs::read(&coefficients).map_err(io_error)?;
        let sets = harmonic::read_sets(&meta, &bytes)?;
        let degree = sets
            .iter()
            .filter_map(|set| usize::try_from(set.degree()).ok())
            .max()
            .unwrap_or(0);

        debug!(
            name = %meta.name,
            directory = %directory.display(),
            degree,
            epoch = meta.epoch,
            "loaded magnetic model"
        );

        Ok(Self {
            meta,
            sets,
            degree,
            ellipsoid: Ellipsoid::WGS84,
        })
    }

    /// Reads the model named by [`default_name`] from [`default_directory`].
    pub fn from_default_directory() -> Result<MagneticModel, ModelError> {
        Self::load(&default_name(), default_directory())
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn description(&self) -> &str {
        &self.meta.description
    }

    pub fn release_date(&self) -> &str {
        &self.meta.release_date
    }

    /// Reference radius of the harmonic expansion in meters.
    pub fn radius(&self) -> f64 {
        self.meta.radius
    }

    /// The first epoch, in fractional years.
    pub fn epoch(&self) -> f64 {
        self.meta.epoch
    }

    /// Earliest time the model is valid for.
    pub fn min_time(&self) -> f64 {
        self.meta.min_time
    }

    /// The model is valid strictly before this time.
    pub fn max_time(&self) -> f64 {
        self.meta.max_time
    }

    pub fn min_height(&self) -> f64 {
        self.meta.min_height
    }

    pub fn max_height(&self) -> f64 {
        self.meta.max_height
    }

    /// Highest degree of the expansion.
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// The field at `position` and `height` meters above the ellipsoid, at
    /// `time` in fractional years.
    ///
    /// # Errors
    ///
    /// The latitude is checked first, then the height against
    /// `[min_height, max_height]`, then the time against
    /// `[min_time, max_time)`.
    pub fn field(&self, time: f64, position: &LatLon, height: f64) -> Result<MagneticField, ModelError> {
        self.evaluate(time, position.latitude(), position.longitude(), height)
    }

    /// As [`MagneticModel::field`], with the position given in degrees.
    pub fn evaluate(&self, time: f64, lat: f64, lon: f64, height: f64) -> Result<MagneticField, ModelError> {
        check_latitude(lat)?;
        if !lon.is_finite() {
            return Err(RangeError::IllegalLongitude(lon).into());
        }
        let meta = &self.meta;
        if !(meta.min_height..=meta.max_height).contains(&height) {
            return Err(ModelError::OutsideHeightRange {
                height,
                min: meta.min_height,
                max: meta.max_height,
            });
        }
        if !(meta.min_time..meta.max_time).contains(&time) {
            return Err(ModelError::OutsideTimeRange {
                time,
                min: meta.min_time,
                max: meta.max_time,
            });
        }

        let coefficients = self.coefficients_at(time);
        let (r, sinp, cosp) = self.ellipsoid.geocentric(lat, height);
        let (north, east, down) = coefficients.synthesize(meta.radius, r, sinp, cosp, lon.to_radians());

        // Rotate from the geocentric to the geodetic vertical
        let (sphi, cphi) = lat.sincosd();
        let (spsi, cpsi) = (sinp * cphi - cosp * sphi, cosp * cphi + sinp * sphi);
        let north_geodetic = north * cpsi - down * spsi;
        let down_geodetic = north * spsi + down * cpsi;

        Ok(MagneticField {
            east,
            north: north_geodetic,
            up: -down_geodetic,
        })
    }

    /// Convenience wrapper returning [`MagneticField::components`].
    pub fn field_components(&self, time: f64, position: &LatLon, height: f64) -> Result<FieldComponents, ModelError> {
        self.field(time, position, height).map(|field| field.components())
    }

    /// The Schmidt semi-normalized coefficients in effect at `time`.
    fn coefficients_at(&self, time: f64) -> Coefficients {
        let meta = &self.meta;
        let models = meta.num_models;
        let t = time - meta.epoch;
        let n = ((t / meta.delta_epoch).floor().max(0.) as usize).min(models - 1);
        let t = t - n as f64 * meta.delta_epoch;

        let mut coefficients = Coefficients::zeros(self.degree);
        if n + 1 < models {
            // Linear interpolation between epochs n and n + 1
            let w = t / meta.delta_epoch;
            coefficients.accumulate(&self.sets[n], 1. - w, meta.normalization);
            coefficients.accumulate(&self.sets[n + 1], w, meta.normalization);
        } else {
            // Past the last epoch, set n + 1 is its secular variation
            coefficients.accumulate(&self.sets[n], 1., meta.normalization);
            coefficients.accumulate(&self.sets[n + 1], t, meta.normalization);
        }
        if meta.num_constants > 0 {
            coefficients.accumulate(&self.sets[models + 1], 1., meta.normalization);
        }
        coefficients
    }
}
