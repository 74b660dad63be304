use std::fmt::Display;

use crate::{
    constants::{
        MAXUPS_N_IND, MAXUPS_S_IND, MAXUTMCOL, MAXUTM_N_ROW, MAXUTM_S_ROW, MINUPS_N_IND, MINUPS_S_IND, MINUTMCOL,
        MINUTM_N_ROW, MINUTM_S_ROW, TILE, UPSEASTING, UTMEASTING,
    },
    latlon::{check_latitude, Hemisphere, LatLon},
    projections::{polar_stereographic::UPS, transverse_mercator::UTM},
    utility::{dms, GeoMath},
    RangeError,
    ThisOrThat,
};

pub(crate) mod zonespec {
    pub(crate) const INVALID: i32 = -4;
    pub(crate) const MATCH: i32 = -3;
    pub(crate) const UTM: i32 = -2;
    pub(crate) const STANDARD: i32 = -1;
    pub(crate) const UPS: i32 = 0;
    pub(crate) const MINZONE: i32 = 0;
    pub(crate) const MINUTMZONE: i32 = 1;
    pub(crate) const MAXUTMZONE: i32 = 60;
    pub(crate) const MAXZONE: i32 = 60;
}

// Indexed by utmp * 2 + northp
const FALSE_EASTING: [i32; 4] = [
    UPSEASTING * TILE,
    UPSEASTING * TILE,
    UTMEASTING * TILE,
    UTMEASTING * TILE,
];

const FALSE_NORTHING: [i32; 4] = [
    UPSEASTING * TILE,
    UPSEASTING * TILE,
    MAXUTM_S_ROW * TILE,
    MINUTM_N_ROW * TILE,
];

const MIN_EASTING: [i32; 4] = [
    MINUPS_S_IND * TILE,
    MINUPS_N_IND * TILE,
    MINUTMCOL * TILE,
    MINUTMCOL * TILE,
];

const MAX_EASTING: [i32; 4] = [
    MAXUPS_S_IND * TILE,
    MAXUPS_N_IND * TILE,
    MAXUTMCOL * TILE,
    MAXUTMCOL * TILE,
];

const MIN_NORTHING: [i32; 4] = [
    MINUPS_S_IND * TILE,
    MINUPS_N_IND * TILE,
    MINUTM_S_ROW * TILE,
    (MINUTM_N_ROW + MINUTM_S_ROW - MAXUTM_S_ROW) * TILE,
];

const MAX_NORTHING: [i32; 4] = [
    MAXUPS_S_IND * TILE,
    MAXUPS_N_IND * TILE,
    (MAXUTM_S_ROW + MAXUTM_N_ROW - MINUTM_N_ROW) * TILE,
    MAXUTM_N_ROW * TILE,
];

/// How the zone of a geographic point is chosen when converting to
/// UTM/UPS.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ZoneSpec {
    /// Never yields a zone; conversions fail.
    Invalid,
    /// Keep the zone of an existing coordinate. On a fresh conversion this
    /// behaves like [`ZoneSpec::Standard`].
    Match,
    /// Always use UTM, even in the polar regions.
    Utm,
    /// UTM for latitudes in `[-80, 84)`, UPS elsewhere.
    #[default]
    Standard,
    /// Always use UPS.
    Ups,
    /// A specific UTM zone in `[1, 60]`.
    Manual(i32),
}

impl TryFrom<i32> for ZoneSpec {
    type Error = RangeError;

    /// Decodes the integer convention used by GeographicLib: `-4` invalid,
    /// `-3` match, `-2` UTM, `-1` standard, `0` UPS and `1..=60` a zone.
    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            zonespec::INVALID => Ok(ZoneSpec::Invalid),
            zonespec::MATCH => Ok(ZoneSpec::Match),
            zonespec::UTM => Ok(ZoneSpec::Utm),
            zonespec::STANDARD => Ok(ZoneSpec::Standard),
            zonespec::UPS => Ok(ZoneSpec::Ups),
            zonespec::MINUTMZONE..=zonespec::MAXUTMZONE => Ok(ZoneSpec::Manual(value)),
            _ => Err(RangeError::InvalidZoneSpec(value)),
        }
    }
}

impl From<ZoneSpec> for i32 {
    fn from(value: ZoneSpec) -> Self {
        match value {
            ZoneSpec::Invalid => zonespec::INVALID,
            ZoneSpec::Match => zonespec::MATCH,
            ZoneSpec::Utm => zonespec::UTM,
            ZoneSpec::Standard => zonespec::STANDARD,
            ZoneSpec::Ups => zonespec::UPS,
            ZoneSpec::Manual(zone) => zone,
        }
    }
}

/// Representation of a WGS84
/// [UTM](https://en.wikipedia.org/wiki/Universal_Transverse_Mercator_coordinate_system)
/// /
/// [UPS](https://en.wikipedia.org/wiki/Universal_polar_stereographic_coordinate_system)
/// point. If converted to from lat/lon, it will
/// automatically determine whether it should be UTM/UPS. It becomes a UPS coordinate
/// if the latitude is outside the range `[-80, 84)`. A zone value of `0`
/// designates UPS.
///
/// Eastings and northings include the false origin. The meridian
/// convergence (degrees) and point scale of the position are carried along.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UtmUps {
    pub(crate) zone: i32,
    pub(crate) hemisphere: Hemisphere,
    pub(crate) easting: f64,
    pub(crate) northing: f64,
    pub(crate) convergence: f64,
    pub(crate) scale: f64,
}

impl UtmUps {
    /// Tries to create a UTM or UPS point from its constituent parts. Zone
    /// of `0` designates UPS, otherwise it is UTM.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::ZoneOutOfRange`] if the zone is outside the range `[0, 60]`.
    /// Returns one of the easting/northing bounds errors if the coordinate
    /// lies outside the region covered by the zone and hemisphere.
    ///
    /// # Usage
    ///
    /// ```
    /// use geodesy::{Hemisphere, UtmUps};
    ///
    /// let coord = UtmUps::create(18, Hemisphere::Northern, 585664.121, 4511315.422);
    ///
    /// assert!(coord.is_ok());
    ///
    /// let coord = coord.unwrap();
    ///
    /// assert_eq!(coord.zone(), 18);
    /// assert_eq!(coord.is_north(), true);
    /// assert!((coord.easting() - 585664.121).abs() < 1e-3);
    /// assert!((coord.northing() - 4511315.422).abs() < 1e-3);
    ///
    /// let invalid_coord_zone_neg = UtmUps::create(-10, Hemisphere::Northern, 585664.121, 4511315.422);
    /// assert!(invalid_coord_zone_neg.is_err());
    ///
    /// let invalid_coord_zone_too_big = UtmUps::create(70, Hemisphere::Northern, 585664.121, 4511315.422);
    /// assert!(invalid_coord_zone_too_big.is_err());
    /// ```
    pub fn create(zone: i32, hemisphere: Hemisphere, easting: f64, northing: f64) -> Result<UtmUps, RangeError> {
        Self::create_with_limits(zone, hemisphere, easting, northing, false)
    }

    /// Like [`UtmUps::create`], optionally holding the coordinate to the
    /// tighter MGRS limits (no 100 km margin around each zone).
    ///
    /// # Errors
    ///
    /// Same as [`UtmUps::create`].
    pub fn create_with_limits(
        zone: i32,
        hemisphere: Hemisphere,
        easting: f64,
        northing: f64,
        mgrs_limits: bool,
    ) -> Result<UtmUps, RangeError> {
        // Make sure zone is a valid value
        if !(zonespec::MINZONE..=zonespec::MAXZONE).contains(&zone) {
            return Err(RangeError::ZoneOutOfRange(zone));
        }

        let utmp = zone != zonespec::UPS;
        let northp = hemisphere.is_north();
        check_coords(utmp, northp, easting, northing, mgrs_limits)?;

        let ind = utmp.ternary(2, 0) + northp.ternary(1, 0);
        let x = easting - f64::from(FALSE_EASTING[ind]);
        let y = northing - f64::from(FALSE_NORTHING[ind]);
        let point = if utmp {
            UTM.reverse(central_meridian(zone), x, y)
        } else {
            UPS.reverse(hemisphere, x, y)
        };

        Ok(Self {
            zone,
            hemisphere,
            easting,
            northing,
            convergence: point.convergence,
            scale: point.scale,
        })
    }

    /// Returns the UTM zone, `0` for UPS.
    ///
    /// # Example
    /// ```
    /// use geodesy::{Hemisphere, UtmUps};
    ///
    /// let coord = UtmUps::create(18, Hemisphere::Northern, 585664.121, 4511315.422).unwrap();
    /// assert_eq!(coord.zone(), 18);
    /// ```
    pub fn zone(&self) -> i32 {
        self.zone
    }

    pub fn is_ups(&self) -> bool {
        self.zone == zonespec::UPS
    }

    pub fn hemisphere(&self) -> Hemisphere {
        self.hemisphere
    }

    /// Returns whether the coordinate is in the northern hemisphere.
    pub fn is_north(&self) -> bool {
        self.hemisphere.is_north()
    }

    /// Returns the easting in meters, false easting included.
    pub fn easting(&self) -> f64 {
        self.easting
    }

    /// Returns the northing in meters, false northing included.
    pub fn northing(&self) -> f64 {
        self.northing
    }

    /// Meridian convergence in degrees, the bearing of grid north measured
    /// clockwise from true north.
    pub fn convergence(&self) -> f64 {
        self.convergence
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Converts from [`LatLon`] to [`UtmUps`] using the standard zone.
    ///
    /// # Errors
    ///
    /// See [`UtmUps::from_latlon_with`].
    ///
    /// # Usage
    ///
    /// ```
    /// use geodesy::{LatLon, UtmUps};
    ///
    /// let coord = LatLon::create(40.748333, -73.985278).unwrap();
    ///
    /// let converted = UtmUps::from_latlon(&coord).unwrap();
    ///
    /// assert_eq!(converted.zone(), 18);
    /// assert_eq!(converted.is_north(), true);
    /// // Check if the converted coordinate is accurate to 3 decimals (same as reference)
    /// assert!((converted.easting() - 585664.121).abs() < 1e-3);
    /// assert!((converted.northing() - 4511315.422).abs() < 1e-3);
    /// ```
    pub fn from_latlon(value: &LatLon) -> Result<UtmUps, RangeError> {
        Self::from_latlon_with(value, ZoneSpec::Standard, false)
    }

    /// Converts from [`LatLon`] to [`UtmUps`] with the zone chosen by `spec`.
    ///
    /// # Errors
    ///
    /// - [`RangeError::InvalidZoneSpec`] for [`ZoneSpec::Invalid`].
    /// - [`RangeError::ZoneOutOfRange`] for a manual zone outside `[1, 60]`.
    /// - [`RangeError::LongitudeTooFarFromZone`] if a forced UTM zone is
    ///   more than 60 degrees from the point.
    /// - [`RangeError::LatitudeTooFarFromPole`] if UPS is forced for a
    ///   latitude within 70 degrees of the equator.
    /// - A bounds error if the projected point falls outside the zone.
    pub fn from_latlon_with(value: &LatLon, spec: ZoneSpec, mgrs_limits: bool) -> Result<UtmUps, RangeError> {
        let (lat, lon) = (value.latitude, value.longitude);
        let hemisphere = value.hemisphere();
        let northp = hemisphere.is_north();
        let zone = standard_zone(lat, lon, spec)?;
        if !(zonespec::MINZONE..=zonespec::MAXZONE).contains(&zone) {
            return Err(RangeError::ZoneOutOfRange(zone));
        }

        let utmp = zone != zonespec::UPS;
        let point = if utmp {
            let lon0 = central_meridian(zone);
            if !(lon0.ang_diff(lon).abs() <= 60.) {
                return Err(RangeError::LongitudeTooFarFromZone { longitude: lon, zone });
            }
            UTM.forward(lon0, lat, lon)?
        } else {
            if lat.abs() < 70. {
                return Err(RangeError::LatitudeTooFarFromPole(lat));
            }
            UPS.forward(hemisphere, lat, lon)?
        };

        let ind = utmp.ternary(2, 0) + northp.ternary(1, 0);
        let easting = point.x + f64::from(FALSE_EASTING[ind]);
        let northing = point.y + f64::from(FALSE_NORTHING[ind]);
        check_coords(utmp, northp, easting, northing, mgrs_limits)?;

        Ok(UtmUps {
            zone,
            hemisphere,
            easting,
            northing,
            convergence: point.convergence,
            scale: point.scale,
        })
    }

    /// Converts from [`UtmUps`] to [`LatLon`]
    ///
    /// # Usage
    ///
    /// ```
    /// use geodesy::{Hemisphere, LatLon, UtmUps};
    ///
    /// let coord = LatLon::create(40.748333, -73.985278).unwrap();
    /// let coord_utm = UtmUps::create(18, Hemisphere::Northern, 585664.121, 4511315.422).unwrap();
    ///
    /// let converted = coord_utm.to_latlon();
    ///
    /// // Check if the converted coordinate is accurate to 6 decimals (same as reference)
    /// assert!((converted.latitude() - coord.latitude()).abs() < 1e-6);
    /// assert!((converted.longitude() - coord.longitude()).abs() < 1e-6);
    /// ```
    pub fn to_latlon(&self) -> LatLon {
        let utmp = self.zone != zonespec::UPS;
        let ind = utmp.ternary(2, 0) + self.is_north().ternary(1, 0);

        let x = self.easting - f64::from(FALSE_EASTING[ind]);
        let y = self.northing - f64::from(FALSE_NORTHING[ind]);

        let point = if utmp {
            UTM.reverse(central_meridian(self.zone), x, y)
        } else {
            UPS.reverse(self.hemisphere, x, y)
        };
        LatLon::new(point.latitude, point.longitude)
    }
}

/// Longitude of the central meridian of UTM `zone`.
pub fn central_meridian(zone: i32) -> f64 {
    6.0 * f64::from(zone) - 183.
}

/// Index of the 8 degree latitude band containing `lat`, from `-10` for
/// `[-80, -72)` to `9` for `[72, 84)`. Values beyond either end are clamped.
pub fn latitude_band(lat: f64) -> i32 {
    let lat_int = lat.floor() as i32;
    (-10).max(9.min((lat_int + 80) / 8 - 10))
}

/// Map lat/lon to zone in either UTM or UPS based on position. Returns `0`
/// for UPS.
///
/// # Errors
///
/// Returns [`RangeError::IllegalLatitude`] for a latitude outside
/// `[-90, 90]`, [`RangeError::IllegalLongitude`] for a non-finite longitude
/// and [`RangeError::InvalidZoneSpec`] for [`ZoneSpec::Invalid`].
///
/// # Usage
///
/// ```
/// use geodesy::{utm::standard_zone, ZoneSpec};
///
/// assert_eq!(standard_zone(40.7, -74.0, ZoneSpec::Standard).unwrap(), 18);
/// // Southwestern Norway uses zone 32
/// assert_eq!(standard_zone(60.0, 5.0, ZoneSpec::Standard).unwrap(), 32);
/// assert_eq!(standard_zone(85.0, 10.0, ZoneSpec::Standard).unwrap(), 0);
/// assert_eq!(standard_zone(85.0, 20.0, ZoneSpec::Utm).unwrap(), 33);
/// ```
pub fn standard_zone(lat: f64, lon: f64, spec: ZoneSpec) -> Result<i32, RangeError> {
    check_latitude(lat)?;
    match spec {
        ZoneSpec::Invalid => return Err(RangeError::InvalidZoneSpec(zonespec::INVALID)),
        ZoneSpec::Manual(zone) => return Ok(zone),
        ZoneSpec::Ups => return Ok(zonespec::UPS),
        ZoneSpec::Utm | ZoneSpec::Standard | ZoneSpec::Match => {}
    }
    if !lon.is_finite() {
        return Err(RangeError::IllegalLongitude(lon));
    }

    if spec == ZoneSpec::Utm || ((-80_f64)..84.0).contains(&lat) {
        let mut lon_int = lon.ang_normalize().floor() as i32;
        if lon_int == dms::HD {
            lon_int = -dms::HD;
        }

        let mut zone = (lon_int + 186) / 6;
        let band = latitude_band(lat);
        // The Norway exception
        if band == 7 && zone == 31 && lon_int >= 3 {
            zone = 32;
        }
        // The Svalbard exception
        else if band == 9 && (0..42).contains(&lon_int) {
            zone = 2 * ((lon_int + 183) / 12) + 1;
        }

        Ok(zone)
    } else {
        Ok(zonespec::UPS)
    }
}

pub(crate) fn check_coords(utmp: bool, northp: bool, x: f64, y: f64, mgrs_limits: bool) -> Result<(), RangeError> {
    let slop = mgrs_limits.ternary(0., f64::from(TILE));

    let ind = utmp.ternary(2, 0) + northp.ternary(1, 0);
    let min = f64::from(MIN_EASTING[ind]) - slop;
    let max = f64::from(MAX_EASTING[ind]) + slop;
    if !(min..=max).contains(&x) {
        return Err(if utmp {
            RangeError::UtmEastingOutOfBounds { easting: x, min, max }
        } else {
            RangeError::UpsEastingOutOfBounds { easting: x, min, max }
        });
    }

    let min = f64::from(MIN_NORTHING[ind]) - slop;
    let max = f64::from(MAX_NORTHING[ind]) + slop;
    if !(min..=max).contains(&y) {
        return Err(if utmp {
            RangeError::UtmNorthingOutOfBounds { northing: y, min, max }
        } else {
            RangeError::UpsNorthingOutOfBounds { northing: y, min, max }
        });
    }

    Ok(())
}

impl Display for UtmUps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hemisphere = self.is_north().ternary("n", "s");
        if self.is_ups() {
            write!(f, "{hemisphere} {} {}", self.easting, self.northing)
        } else {
            write!(f, "{}{hemisphere} {} {}", self.zone, self.easting, self.northing)
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn zone_spec_from_raw_values() {
        assert_eq!(ZoneSpec::try_from(-4), Ok(ZoneSpec::Invalid));
        assert_eq!(ZoneSpec::try_from(-3), Ok(ZoneSpec::Match));
        assert_eq!(ZoneSpec::try_from(-2), Ok(ZoneSpec::Utm));
        assert_eq!(ZoneSpec::try_from(-1), Ok(ZoneSpec::Standard));
        assert_eq!(ZoneSpec::try_from(0), Ok(ZoneSpec::Ups));
        assert_eq!(ZoneSpec::try_from(60), Ok(ZoneSpec::Manual(60)));
        assert_eq!(ZoneSpec::try_from(61), Err(RangeError::InvalidZoneSpec(61)));
        assert_eq!(ZoneSpec::try_from(-5), Err(RangeError::InvalidZoneSpec(-5)));
        assert_eq!(i32::from(ZoneSpec::Manual(17)), 17);
        assert_eq!(i32::from(ZoneSpec::default()), -1);
    }

    #[test]
    fn standard_zones() {
        assert_eq!(standard_zone(0., 0., ZoneSpec::Standard), Ok(31));
        assert_eq!(standard_zone(0., -0.5, ZoneSpec::Standard), Ok(30));
        assert_eq!(standard_zone(0., 180., ZoneSpec::Standard), Ok(1));
        assert_eq!(standard_zone(0., 179.9, ZoneSpec::Standard), Ok(60));
        assert_eq!(standard_zone(-80., 10., ZoneSpec::Standard), Ok(32));
        assert_eq!(standard_zone(-80.000_001, 10., ZoneSpec::Standard), Ok(0));
        assert_eq!(standard_zone(84., 10., ZoneSpec::Standard), Ok(0));
        assert_eq!(standard_zone(84., 10., ZoneSpec::Match), Ok(0));
        assert_eq!(standard_zone(10., 10., ZoneSpec::Ups), Ok(0));
        assert_eq!(standard_zone(10., 10., ZoneSpec::Manual(5)), Ok(5));
    }

    #[test]
    fn norway_and_svalbard_exceptions() {
        assert_eq!(standard_zone(60., 2.9, ZoneSpec::Standard), Ok(31));
        assert_eq!(standard_zone(60., 3., ZoneSpec::Standard), Ok(32));
        assert_eq!(standard_zone(55.9, 3., ZoneSpec::Standard), Ok(31));
        assert_eq!(standard_zone(64., 3., ZoneSpec::Standard), Ok(31));
        for (lon, zone) in [(5., 31), (10., 33), (25., 35), (35., 37), (41.9, 37), (42., 38)] {
            assert_eq!(standard_zone(78., lon, ZoneSpec::Standard), Ok(zone));
        }
        assert_eq!(standard_zone(71.9, 10., ZoneSpec::Standard), Ok(32));
    }

    #[test]
    fn zone_selection_errors() {
        assert_eq!(standard_zone(0., 0., ZoneSpec::Invalid), Err(RangeError::InvalidZoneSpec(-4)));
        for spec in [ZoneSpec::Invalid, ZoneSpec::Standard, ZoneSpec::Ups, ZoneSpec::Manual(3)] {
            assert_eq!(standard_zone(90. + 1e-9, 0., spec), Err(RangeError::IllegalLatitude(90. + 1e-9)));
        }
    }

    #[test]
    fn latitude_bands() {
        assert_eq!(latitude_band(-80.), -10);
        assert_eq!(latitude_band(-90.), -10);
        assert_eq!(latitude_band(0.), 0);
        assert_eq!(latitude_band(-0.1), -1);
        assert_eq!(latitude_band(56.), 7);
        assert_eq!(latitude_band(83.9), 9);
        assert_eq!(central_meridian(1), -177.);
        assert_eq!(central_meridian(31), 3.);
    }

    #[test]
    fn forward_to_perth() {
        let ypph = LatLon::create(-31.940_283_33, 115.966_95).unwrap();
        let utm = UtmUps::from_latlon(&ypph).unwrap();
        assert_eq!(utm.zone(), 50);
        assert_eq!(utm.hemisphere(), Hemisphere::Southern);
        assert_abs_diff_eq!(utm.easting(), 402_357.369_285_629, epsilon = 1e-5);
        assert_abs_diff_eq!(utm.northing(), 6_465_717.701_277_924, epsilon = 1e-5);
        assert_abs_diff_eq!(utm.convergence(), 0.546_562_979_444_2, epsilon = 1e-9);
        assert_abs_diff_eq!(utm.scale(), 0.999_717_579_467_930, epsilon = 1e-12);

        let forced = UtmUps::from_latlon_with(&ypph, ZoneSpec::Manual(49), false).unwrap();
        assert_eq!(forced.zone(), 49);
        assert!(forced.easting() > 500_000.);
        let back = forced.to_latlon();
        assert_abs_diff_eq!(back.latitude(), ypph.latitude(), epsilon = 1e-9);
        assert_abs_diff_eq!(back.longitude(), ypph.longitude(), epsilon = 1e-9);
    }

    #[test]
    fn reverse_from_fields() {
        let utm = UtmUps::create(38, Hemisphere::Northern, 444_140.54, 3_684_706.36).unwrap();
        let latlon = utm.to_latlon();
        assert_abs_diff_eq!(latlon.latitude(), 33.300_000_039_883_49, epsilon = 1e-9);
        assert_abs_diff_eq!(latlon.longitude(), 44.399_999_946_897_69, epsilon = 1e-9);
        assert_abs_diff_eq!(utm.convergence(), -0.329_422_251_515_1, epsilon = 1e-9);
        assert_abs_diff_eq!(utm.scale(), 0.999_638_469_353_107, epsilon = 1e-12);
    }

    #[test]
    fn polar_points_use_ups() {
        let kunlun = LatLon::create(-80.4174, 77.1166).unwrap();
        let ups = UtmUps::from_latlon(&kunlun).unwrap();
        assert!(ups.is_ups());
        assert_eq!(ups.hemisphere(), Hemisphere::Southern);
        assert_abs_diff_eq!(ups.easting(), 3_039_440.641_302_266, epsilon = 1e-5);
        assert_abs_diff_eq!(ups.northing(), 2_237_746.759_453_198, epsilon = 1e-5);
        assert_abs_diff_eq!(ups.convergence(), -77.1166, epsilon = 1e-12);
        assert_abs_diff_eq!(ups.scale(), 1.000_982_886_651_784, epsilon = 1e-12);

        let barneo = LatLon::create(89.524_997_9, -30.449_998_2).unwrap();
        let ups = UtmUps::from_latlon(&barneo).unwrap();
        assert_eq!(ups.hemisphere(), Hemisphere::Northern);
        assert_abs_diff_eq!(ups.easting(), 1_973_273.698_017_827, epsilon = 1e-5);
        assert_abs_diff_eq!(ups.northing(), 1_954_537.063_512_382, epsilon = 1e-5);
        assert_abs_diff_eq!(ups.convergence(), -30.449_998_2, epsilon = 1e-12);
        assert_abs_diff_eq!(ups.scale(), 0.994_017_079_575_084, epsilon = 1e-12);

        let back = ups.to_latlon();
        assert_abs_diff_eq!(back.latitude(), barneo.latitude(), epsilon = 1e-9);
        assert_abs_diff_eq!(back.longitude(), barneo.longitude(), epsilon = 1e-9);
    }

    #[test]
    fn forced_projections_are_checked() {
        let equator = LatLon::create(10., 10.).unwrap();
        assert_eq!(
            UtmUps::from_latlon_with(&equator, ZoneSpec::Ups, false),
            Err(RangeError::LatitudeTooFarFromPole(10.))
        );
        assert_eq!(
            UtmUps::from_latlon_with(&equator, ZoneSpec::Manual(50), false),
            Err(RangeError::LongitudeTooFarFromZone { longitude: 10., zone: 50 })
        );
        assert_eq!(
            UtmUps::from_latlon_with(&equator, ZoneSpec::Manual(61), false),
            Err(RangeError::ZoneOutOfRange(61))
        );
        assert_eq!(
            UtmUps::from_latlon_with(&equator, ZoneSpec::Invalid, false),
            Err(RangeError::InvalidZoneSpec(-4))
        );
        // Six zones away lands outside the easting range
        assert!(matches!(
            UtmUps::from_latlon_with(&equator, ZoneSpec::Manual(38), false),
            Err(RangeError::UtmEastingOutOfBounds { .. })
        ));
        let polar = LatLon::create(86., 10.).unwrap();
        assert_eq!(UtmUps::from_latlon_with(&polar, ZoneSpec::Utm, false).unwrap().zone(), 33);
    }

    #[test]
    fn bounds_are_enforced_for_every_zone() {
        let (n, s) = (Hemisphere::Northern, Hemisphere::Southern);
        for zone in 1..=60 {
            assert!(UtmUps::create(zone, n, 0., 0.).is_ok());
            assert!(UtmUps::create(zone, n, 1_000_000., 5_000_000.).is_ok());
            assert!(matches!(UtmUps::create(zone, n, -1., 0.), Err(RangeError::UtmEastingOutOfBounds { .. })));
            assert!(matches!(
                UtmUps::create(zone, n, 1_000_001., 0.),
                Err(RangeError::UtmEastingOutOfBounds { .. })
            ));
            assert!(matches!(
                UtmUps::create(zone, n, 500_000., 9_600_001.),
                Err(RangeError::UtmNorthingOutOfBounds { .. })
            ));
            assert!(matches!(
                UtmUps::create(zone, n, 500_000., -9_100_001.),
                Err(RangeError::UtmNorthingOutOfBounds { .. })
            ));
            assert!(matches!(
                UtmUps::create(zone, s, 500_000., 899_999.),
                Err(RangeError::UtmNorthingOutOfBounds { .. })
            ));
            assert!(matches!(
                UtmUps::create(zone, s, 500_000., 19_600_001.),
                Err(RangeError::UtmNorthingOutOfBounds { .. })
            ));
        }
    }

    #[test]
    fn mgrs_limits_are_tighter() {
        let n = Hemisphere::Northern;
        assert!(UtmUps::create_with_limits(31, n, 100_000., 0., true).is_ok());
        assert_eq!(
            UtmUps::create_with_limits(31, n, 99_999., 0., true),
            Err(RangeError::UtmEastingOutOfBounds { easting: 99_999., min: 100_000., max: 900_000. })
        );
        assert_eq!(
            UtmUps::create_with_limits(0, n, 1_250_000., 2_000_000., true),
            Err(RangeError::UpsEastingOutOfBounds { easting: 1_250_000., min: 1_300_000., max: 2_700_000. })
        );
        assert!(UtmUps::create(0, n, 1_250_000., 2_000_000.).is_ok());
        assert_eq!(
            UtmUps::create(0, Hemisphere::Southern, 2_000_000., 3_300_001.),
            Err(RangeError::UpsNorthingOutOfBounds { northing: 3_300_001., min: 700_000., max: 3_300_000. })
        );
        assert_eq!(UtmUps::create(-1, n, 0., 0.), Err(RangeError::ZoneOutOfRange(-1)));
    }

    #[test]
    fn round_trips_within_the_zone() {
        for zone in [1, 17, 31, 60] {
            for hemisphere in [Hemisphere::Northern, Hemisphere::Southern] {
                for (e, n) in [(166_021.44, 1_000_000.), (500_000., 5_000_000.), (833_978.56, 9_000_000.)] {
                    let utm = UtmUps::create(zone, hemisphere, e, n).unwrap();
                    let latlon = utm.to_latlon();
                    let again = UtmUps::from_latlon_with(&latlon, ZoneSpec::Manual(zone), false).unwrap();
                    assert_abs_diff_eq!(again.easting(), e, epsilon = 1e-6);
                    assert_abs_diff_eq!(again.northing(), n, epsilon = 1e-6);
                    let back = again.to_latlon();
                    assert_abs_diff_eq!(back.latitude(), latlon.latitude(), epsilon = 1e-9);
                    assert_abs_diff_eq!(back.longitude(), latlon.longitude(), epsilon = 1e-9);
                }
            }
        }
    }

    #[test]
    fn display() {
        let utm = UtmUps::create(38, Hemisphere::Northern, 444_140.5, 3_684_706.25).unwrap();
        assert_eq!(utm.to_string(), "38n 444140.5 3684706.25");
        let ups = UtmUps::create(0, Hemisphere::Southern, 2_000_000., 2_000_000.).unwrap();
        assert_eq!(ups.to_string(), "s 2000000 2000000");
    }
}
