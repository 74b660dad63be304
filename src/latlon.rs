use std::fmt::Display;

use crate::{utility::{dms, GeoMath}, RangeError};

/// Which side of the equator a projected coordinate refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Hemisphere {
    Northern,
    Southern,
}

impl Hemisphere {
    /// Hemisphere of a latitude. Zero and positive latitudes (including
    /// `+0.0`) are northern, negative ones (including `-0.0`) southern.
    pub fn from_latitude(lat: f64) -> Hemisphere {
        if lat.is_sign_negative() {
            Hemisphere::Southern
        } else {
            Hemisphere::Northern
        }
    }

    #[inline]
    pub fn is_north(self) -> bool {
        self == Hemisphere::Northern
    }
}

impl From<bool> for Hemisphere {
    fn from(northp: bool) -> Self {
        if northp { Hemisphere::Northern } else { Hemisphere::Southern }
    }
}

/// A geographic position in degrees. Latitude is always within `[-90, 90]`;
/// longitude is kept normalized to `(-180, 180]`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LatLon {
    #[cfg_attr(feature = "serde", serde(alias = "lat"))]
    pub(crate) latitude: f64,
    #[cfg_attr(feature = "serde", serde(alias = "lon"))]
    pub(crate) longitude: f64,
}

impl LatLon {
    /// Internal-only constructor that doesn't check the bounds of lat/lon
    pub(crate) fn new(lat: f64, lon: f64) -> LatLon {
        Self {
            latitude: lat,
            longitude: normalize_longitude(lon),
        }
    }

    /// Tries to create a latitude/longitude point from a lat/lon pair.
    /// Latitude must be in `[-90, 90]`; any finite longitude is accepted and
    /// reduced to `(-180, 180]`.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::IllegalLatitude`] if the latitude is outside its
    /// range (or NaN) and [`RangeError::IllegalLongitude`] if the longitude is
    /// not finite.
    ///
    /// # Usage
    ///
    /// ```
    /// use geodesy::LatLon;
    ///
    /// let coord = LatLon::create(40.748333, -73.985278).unwrap();
    /// assert_eq!(coord.latitude(), 40.748333);
    /// assert_eq!(coord.longitude(), -73.985278);
    ///
    /// let wrapped = LatLon::create(10.0, 370.0).unwrap();
    /// assert_eq!(wrapped.longitude(), 10.0);
    ///
    /// assert!(LatLon::create(90.000001, 0.0).is_err());
    /// ```
    pub fn create(lat: f64, lon: f64) -> Result<LatLon, RangeError> {
        check_latitude(lat)?;
        if !lon.is_finite() {
            return Err(RangeError::IllegalLongitude(lon));
        }
        Ok(LatLon::new(lat, lon))
    }

    /// Returns the latitude value.
    #[inline]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Returns the longitude value.
    #[inline]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Returns whether the current point is in the northern hemisphere.
    ///
    /// # Example
    ///
    /// ```
    /// use geodesy::LatLon;
    ///
    /// let coord = LatLon::create(40.748333, -73.985278).unwrap();
    /// assert!(coord.is_north());
    ///
    /// let coord = LatLon::create(-40.748333, -73.985278).unwrap();
    /// assert!(!coord.is_north());
    /// ```
    pub fn is_north(&self) -> bool {
        self.hemisphere().is_north()
    }

    pub fn hemisphere(&self) -> Hemisphere {
        Hemisphere::from_latitude(self.latitude)
    }
}

/// Checks that `lat` lies in `[-90, 90]`.
pub(crate) fn check_latitude(lat: f64) -> Result<(), RangeError> {
    let qd = f64::from(dms::QD);
    if (-qd..=qd).contains(&lat) {
        Ok(())
    } else {
        Err(RangeError::IllegalLatitude(lat))
    }
}

fn normalize_longitude(lon: f64) -> f64 {
    let lon = lon.ang_normalize();
    let hd = f64::from(dms::HD);
    if lon == -hd { hd } else { lon }
}

impl Display for LatLon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut buf = ryu::Buffer::new();
        let lat = buf.format(self.latitude);
        let mut buf = ryu::Buffer::new();
        let lon = buf.format(self.longitude);
        write!(
            f,
            "{lat} {lon}",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_latitudes() {
        assert_eq!(LatLon::create(90. + 1e-9, 0.), Err(RangeError::IllegalLatitude(90. + 1e-9)));
        assert_eq!(LatLon::create(-91., 0.), Err(RangeError::IllegalLatitude(-91.)));
        assert!(LatLon::create(f64::NAN, 0.).is_err());
        assert!(LatLon::create(90., 0.).is_ok());
        assert!(LatLon::create(-90., 0.).is_ok());
        assert!(matches!(LatLon::create(0., f64::NAN), Err(RangeError::IllegalLongitude(_))));
        assert_eq!(LatLon::create(0., f64::INFINITY), Err(RangeError::IllegalLongitude(f64::INFINITY)));
    }

    #[test]
    fn normalizes_longitude() {
        assert_eq!(LatLon::create(0., -180.).unwrap().longitude(), 180.);
        assert_eq!(LatLon::create(0., 540.).unwrap().longitude(), 180.);
        assert_eq!(LatLon::create(0., -190.).unwrap().longitude(), 170.);
        assert_eq!(LatLon::create(0., 45.5).unwrap().longitude(), 45.5);
    }

    #[test]
    fn hemisphere_follows_sign() {
        assert_eq!(Hemisphere::from_latitude(0.), Hemisphere::Northern);
        assert_eq!(Hemisphere::from_latitude(-0.), Hemisphere::Southern);
        assert_eq!(Hemisphere::from(false), Hemisphere::Southern);
    }

    #[test]
    fn displays_shortest_representation() {
        let coord = LatLon::create(-31.94028333, 115.96695).unwrap();
        assert_eq!(coord.to_string(), "-31.94028333 115.96695");
    }
}
