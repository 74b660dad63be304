use approx::assert_abs_diff_eq;
use geodesy::{
    utm::standard_zone, Ellipsoid, Hemisphere, LatLon, RangeError, TransverseMercator, UtmUps, ZoneSpec,
};

#[test]
fn known_fixed_points() {
    let perth = UtmUps::from_latlon(&LatLon::create(-31.940_283_33, 115.966_95).unwrap()).unwrap();
    assert_eq!((perth.zone(), perth.hemisphere()), (50, Hemisphere::Southern));
    assert_abs_diff_eq!(perth.easting(), 402_357.369_285_629, epsilon = 1e-5);
    assert_abs_diff_eq!(perth.northing(), 6_465_717.701_277_924, epsilon = 1e-5);
    assert_abs_diff_eq!(perth.convergence(), 0.546_562_979_444_2, epsilon = 1e-9);
    assert_abs_diff_eq!(perth.scale(), 0.999_717_579_467_930, epsilon = 1e-12);

    let kunlun = UtmUps::from_latlon(&LatLon::create(-80.4174, 77.1166).unwrap()).unwrap();
    assert_eq!((kunlun.zone(), kunlun.hemisphere()), (0, Hemisphere::Southern));
    assert_abs_diff_eq!(kunlun.easting(), 3_039_440.641_302_266, epsilon = 1e-5);
    assert_abs_diff_eq!(kunlun.northing(), 2_237_746.759_453_198, epsilon = 1e-5);
    assert_abs_diff_eq!(kunlun.convergence(), -77.1166, epsilon = 1e-12);
    assert_abs_diff_eq!(kunlun.scale(), 1.000_982_886_651_784, epsilon = 1e-12);
}

#[test]
fn round_trip_in_every_zone() {
    for zone in 1..=60 {
        for (hemisphere, northing) in [
            (Hemisphere::Northern, 1_000_000.),
            (Hemisphere::Northern, 6_500_000.),
            (Hemisphere::Southern, 2_000_000.),
            (Hemisphere::Southern, 8_900_000.),
        ] {
            for easting in [250_000., 500_000., 760_000.] {
                let utm = UtmUps::create(zone, hemisphere, easting, northing).unwrap();
                let position = utm.to_latlon();
                let again = UtmUps::from_latlon_with(&position, ZoneSpec::Manual(zone), false).unwrap();
                assert_eq!(again.zone(), zone);
                assert_eq!(again.hemisphere(), hemisphere);
                assert_abs_diff_eq!(again.easting(), easting, epsilon = 1e-6);
                assert_abs_diff_eq!(again.northing(), northing, epsilon = 1e-6);

                let back = again.to_latlon();
                assert_abs_diff_eq!(back.latitude(), position.latitude(), epsilon = 1e-9);
                assert_abs_diff_eq!(back.longitude(), position.longitude(), epsilon = 1e-9);
            }
        }
    }
}

#[test]
fn one_meter_outside_the_bounds() {
    for zone in 1..=60 {
        let n = Hemisphere::Northern;
        let s = Hemisphere::Southern;
        assert!(matches!(
            UtmUps::create(zone, n, -1., 5_000_000.),
            Err(RangeError::UtmEastingOutOfBounds { .. })
        ));
        assert!(matches!(
            UtmUps::create(zone, n, 1_000_001., 5_000_000.),
            Err(RangeError::UtmEastingOutOfBounds { .. })
        ));
        assert!(matches!(
            UtmUps::create(zone, n, 500_000., 9_600_001.),
            Err(RangeError::UtmNorthingOutOfBounds { .. })
        ));
        assert!(matches!(
            UtmUps::create(zone, s, 500_000., 899_999.),
            Err(RangeError::UtmNorthingOutOfBounds { .. })
        ));
        assert!(UtmUps::create(zone, s, 0., 19_600_000.).is_ok());
    }
    assert!(matches!(
        UtmUps::create(0, Hemisphere::Northern, 1_199_999., 2_000_000.),
        Err(RangeError::UpsEastingOutOfBounds { .. })
    ));
    assert!(matches!(
        UtmUps::create(0, Hemisphere::Southern, 2_000_000., 3_300_001.),
        Err(RangeError::UpsNorthingOutOfBounds { .. })
    ));
    assert_eq!(
        UtmUps::create(61, Hemisphere::Northern, 500_000., 5_000_000.),
        Err(RangeError::ZoneOutOfRange(61))
    );
}

#[test]
fn zones_are_constant_between_boundaries() {
    for lat in [-79.5, -40., -0.5, 0., 20., 55.9, 64., 71.9] {
        for zone in 1..=60 {
            let east = f64::from(6 * zone - 180);
            for lon in [east - 5.999, east - 3., east - 0.001] {
                assert_eq!(standard_zone(lat, lon, ZoneSpec::Standard), Ok(zone), "{lat} {lon}");
            }
        }
    }
}

#[test]
fn exact_and_series_agree_near_the_central_meridian() {
    let series = TransverseMercator::new(&Ellipsoid::WGS84, 0.9996).unwrap();
    let exact = TransverseMercator::with_options(&Ellipsoid::WGS84, 0.9996, true, false).unwrap();
    for (lat, lon) in [(0., 1.), (33.3, 3.), (-60., -2.5), (80., 5.)] {
        let a = series.forward(0., lat, lon).unwrap();
        let b = exact.forward(0., lat, lon).unwrap();
        assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-6);
        assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-6);
        assert_abs_diff_eq!(a.convergence, b.convergence, epsilon = 1e-9);
        assert_abs_diff_eq!(a.scale, b.scale, epsilon = 1e-11);
    }
}
