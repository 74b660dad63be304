//! Picks the magnetic model that covers a date. Models are loaded from disk
//! the first time a date needs them and kept for the life of the registry.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use lazy_static::lazy_static;
use tracing::debug;

use super::{default_directory, FieldComponents, MagneticModel};
use crate::{LatLon, ModelError};

/// A model that serves dates in `[start, end)`.
#[derive(Clone, Copy, Debug)]
struct Window {
    start: f64,
    end: f64,
    name: &'static str,
}

const fn window(start: f64, end: f64, name: &'static str) -> Window {
    Window { start, end, name }
}

/// World models, the most recent last.
const WORLD: [Window; 4] = [
    window(2010., 2015., "emm2010"),
    window(2015., 2020., "wmm2015v2"),
    window(2020., 2025., "wmm2020"),
    window(2025., 2030., "wmmhr2025"),
];

/// Enhanced (higher degree) models, the most recent last.
const ENHANCED: [Window; 3] = [
    window(2000., 2010., "emm2015"),
    window(2010., 2015., "emm2010"),
    window(2015., 2022., "emm2017"),
];

lazy_static! {
    /// Registry over [`default_directory`].
    pub static ref REGISTRY: MagneticRegistry = MagneticRegistry::from_default_directory();
}

/// Date driven access to the world and enhanced magnetic models found in
/// one directory.
///
/// # Usage
///
/// ```no_run
/// use geodesy::{LatLon, MagneticRegistry};
///
/// let registry = MagneticRegistry::with_directory("/usr/local/share/GeographicLib/magnetic");
/// let position = LatLon::create(51.5, -0.13).unwrap();
/// let components = registry.world_field(2021.2, &position, 0.).unwrap();
/// println!("{} uses declination {:.2}", registry.world(2021.2).unwrap().name(), components.declination);
/// ```
#[derive(Debug)]
pub struct MagneticRegistry {
    directory: PathBuf,
    models: HashMap<&'static str, OnceLock<MagneticModel>>,
}

impl MagneticRegistry {
    pub fn with_directory(directory: impl Into<PathBuf>) -> MagneticRegistry {
        let models = WORLD
            .iter()
            .chain(&ENHANCED)
            .map(|window| (window.name, OnceLock::new()))
            .collect();
        Self {
            directory: directory.into(),
            models,
        }
    }

    /// A registry over [`default_directory`].
    pub fn from_default_directory() -> MagneticRegistry {
        Self::with_directory(default_directory())
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// The world model for `time`.
    ///
    /// # Errors
    ///
    /// [`ModelError::OutsideTimeRange`] if no world model covers `time`, or
    /// any error raised while loading the model.
    pub fn world(&self, time: f64) -> Result<&MagneticModel, ModelError> {
        self.select(&WORLD, time)
    }

    /// The enhanced model for `time`.
    ///
    /// # Errors
    ///
    /// As [`MagneticRegistry::world`].
    pub fn enhanced(&self, time: f64) -> Result<&MagneticModel, ModelError> {
        self.select(&ENHANCED, time)
    }

    /// Field components from the world model for `time`.
    pub fn world_field(&self, time: f64, position: &LatLon, height: f64) -> Result<FieldComponents, ModelError> {
        self.world(time)?.field_components(time, position, height)
    }

    /// Field components from the enhanced model for `time`.
    pub fn enhanced_field(&self, time: f64, position: &LatLon, height: f64) -> Result<FieldComponents, ModelError> {
        self.enhanced(time)?.field_components(time, position, height)
    }

    fn select(&self, table: &[Window], time: f64) -> Result<&MagneticModel, ModelError> {
        let window = table
            .iter()
            .rev()
            .find(|window| (window.start..window.end).contains(&time))
            .ok_or_else(|| ModelError::OutsideTimeRange {
                time,
                min: table.first().map_or(f64::NAN, |window| window.start),
                max: table.last().map_or(f64::NAN, |window| window.end),
            })?;
        debug!(time, model = window.name, "selected magnetic model");
        self.model(window.name)
    }

    fn model(&self, name: &'static str) -> Result<&MagneticModel, ModelError> {
        let slot = self.models.get(name).ok_or_else(|| ModelError::ModelNotFound {
            name: name.to_string(),
            directory: self.directory.display().to_string(),
        })?;
        if let Some(model) = slot.get() {
            return Ok(model);
        }
        // Two threads may both load the model, only the first result is kept
        let model = MagneticModel::load(name, &self.directory)?;
        Ok(slot.get_or_init(|| model))
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::magnetic::tests::{scratch_directory, write_dipole, RADIUS};

    /// Distinct dipoles for the four world models, each starting at the
    /// beginning of its window.
    fn world_directory(label: &str) -> PathBuf {
        let dir = scratch_directory(label);
        for (i, window) in WORLD.iter().enumerate() {
            write_dipole(&dir, window.name, window.start, &[-30000. - 100. * i as f64], 0., None, "");
        }
        dir
    }

    #[test]
    fn tables_are_contiguous() {
        for table in [&WORLD[..], &ENHANCED[..]] {
            for pair in table.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
        }
    }

    #[test]
    fn selects_the_model_covering_a_date() {
        let registry = MagneticRegistry::with_directory(world_directory("select"));
        assert_eq!(registry.world(2012.).unwrap().name(), "emm2010");
        assert_eq!(registry.world(2015.).unwrap().name(), "wmm2015v2");
        assert_eq!(registry.world(2024.99).unwrap().name(), "wmm2020");
        assert_eq!(registry.world(2029.).unwrap().name(), "wmmhr2025");
    }

    #[test]
    fn dates_outside_the_tables() {
        let registry = MagneticRegistry::with_directory(world_directory("outside"));
        for time in [2009.9, 2030., f64::NAN] {
            assert!(matches!(
                registry.world(time),
                Err(ModelError::OutsideTimeRange { .. })
            ));
        }
        assert!(matches!(
            registry.enhanced(2022.5),
            Err(ModelError::OutsideTimeRange { min, max, .. }) if min == 2000. && max == 2022.
        ));
    }

    #[test]
    fn models_are_loaded_once_and_lazily() {
        let dir = world_directory("lazy");
        let registry = MagneticRegistry::with_directory(&dir);
        let first: *const MagneticModel = registry.world(2021.).unwrap();
        // Removing the files no longer matters once loaded
        fs::remove_file(dir.join("wmm2020.wmm")).unwrap();
        let second: *const MagneticModel = registry.world(2022.).unwrap();
        assert_eq!(first, second);

        // Enhanced models were never written
        assert!(matches!(
            registry.enhanced(2005.),
            Err(ModelError::ModelNotFound { .. })
        ));
        // but the shared 2010 model was
        assert_eq!(registry.enhanced(2012.).unwrap().name(), "emm2010");
    }

    #[test]
    fn field_through_the_registry() {
        let registry = MagneticRegistry::with_directory(world_directory("field"));
        let position = LatLon::create(0., 0.).unwrap();
        let components = registry.world_field(2021., &position, 0.).unwrap();
        let ratio = (RADIUS / crate::Ellipsoid::WGS84.equatorial_radius()).powi(3);
        assert_abs_diff_eq!(components.horizontal, 30200. * ratio, epsilon = 1e-6);
        assert_abs_diff_eq!(components.declination, 0., epsilon = 1e-12);
    }
}
