pub mod polar_stereographic;
pub mod transverse_mercator;
pub(crate) mod transverse_mercator_exact;

/// Result of a forward projection: plane coordinates about the projection
/// origin (no false easting or northing), together with the meridian
/// convergence in degrees and the point scale.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectedPoint {
    pub x: f64,
    pub y: f64,
    pub convergence: f64,
    pub scale: f64,
}

/// Result of a reverse projection.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GeographicPoint {
    pub latitude: f64,
    pub longitude: f64,
    pub convergence: f64,
    pub scale: f64,
}
