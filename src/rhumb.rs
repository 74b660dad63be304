//! Rhumb lines (loxodromes): paths that cross every meridian at the same
//! azimuth. They appear as straight lines on a Mercator map.
//!
//! Meridian distances come from a series in the third flattening, or for
//! strongly flattened ellipsoids from the elliptic integral of the meridian
//! ellipse.

use std::f64::consts::FRAC_PI_2;

use lazy_static::lazy_static;

use crate::{
    constants::EXACT_FLATTENING,
    elliptic::EllipticFunction,
    geodesic::sin_series,
    latlon::LatLon,
    utility::{atan2d, dms, norm, GeoMath},
    Ellipsoid,
    RangeError,
    ThisOrThat,
};

// 5 point Gauss-Legendre quadrature on [-1, 1]
const GAUSS_NODES: [f64; 5] = [0., -0.538_469_310_105_683_1, 0.538_469_310_105_683_1, -0.906_179_845_938_664, 0.906_179_845_938_664];
const GAUSS_WEIGHTS: [f64; 5] = [
    0.568_888_888_888_888_9,
    0.478_628_670_499_366_5,
    0.478_628_670_499_366_5,
    0.236_926_885_056_189_1,
    0.236_926_885_056_189_1,
];

lazy_static! {
    /// Rhumb line calculations on the WGS84 ellipsoid.
    pub static ref WGS84: Rhumb = Rhumb::new(&Ellipsoid::WGS84);
}

/// Output of an inverse rhumb line calculation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RhumbInverse {
    /// Constant azimuth of the line, degrees in `[-180, 180]`.
    pub azimuth: f64,
    /// Length of the line in meters.
    pub distance: f64,
}

/// Solver for rhumb lines on one ellipsoid.
///
/// # Usage
///
/// ```
/// use geodesy::{rhumb::WGS84, LatLon};
///
/// let jfk = LatLon::create(40.6, -73.8).unwrap();
/// let lhr = LatLon::create(51.6, -0.5).unwrap();
/// let inverse = WGS84.inverse(&jfk, &lhr);
/// assert!((inverse.azimuth - 77.768_39).abs() < 1e-5);
///
/// let there = WGS84.direct(&jfk, inverse.azimuth, inverse.distance).unwrap();
/// assert!((there.longitude() + 0.5).abs() < 1e-9);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Rhumb {
    ellipsoid: Ellipsoid,
    es: f64,
    /// Rectifying radius: meridian distance is `rectifying_radius * mu`.
    rectifying_radius: f64,
    /// Series for the rectifying latitude in terms of the geographic one
    mu_coeff: [f64; 5],
    /// And its reversion
    phi_coeff: [f64; 5],
    /// `E(beta, -e'^2)`, the meridian arc in terms of the parametric
    /// latitude, when solving exactly
    meridian: Option<EllipticFunction>,
}

impl Rhumb {
    /// A solver for `ellipsoid`, exact when `|f| > 0.02`.
    pub fn new(ellipsoid: &Ellipsoid) -> Rhumb {
        Self::with_exact(ellipsoid, ellipsoid.f.abs() > EXACT_FLATTENING)
    }

    /// A solver for `ellipsoid` that measures meridians with elliptic
    /// integrals if `exact`, else with a fourth order series.
    ///
    /// ```
    /// use geodesy::{Ellipsoid, LatLon, Rhumb};
    ///
    /// let saturn = Ellipsoid::new(60_268_000., 0.097_96).unwrap();
    /// assert!(Rhumb::new(&saturn).is_exact());
    ///
    /// let series = Rhumb::with_exact(&Ellipsoid::WGS84, false);
    /// let exact = Rhumb::with_exact(&Ellipsoid::WGS84, true);
    /// let (p1, p2) = (LatLon::create(-40., 10.).unwrap(), LatLon::create(70., 60.).unwrap());
    /// let difference = series.inverse(&p1, &p2).distance - exact.inverse(&p1, &p2).distance;
    /// assert!(difference.abs() < 1e-5);
    /// ```
    pub fn with_exact(ellipsoid: &Ellipsoid, exact: bool) -> Rhumb {
        let n = ellipsoid.n;
        let n2 = n.powi(2);
        let n3 = n * n2;
        let n4 = n2.powi(2);

        let meridian = exact.then(|| EllipticFunction::new(-ellipsoid.ep2));
        let rectifying_radius = match &meridian {
            Some(ell) => ellipsoid.b * ell.e() / FRAC_PI_2,
            None => ellipsoid.rectifying_radius(),
        };

        Self {
            ellipsoid: *ellipsoid,
            es: ellipsoid.es(),
            rectifying_radius,
            mu_coeff: [
                0.,
                -3. * n / 2. + 9. * n3 / 16.,
                15. * n2 / 16. - 15. * n4 / 32.,
                -35. * n3 / 48.,
                315. * n4 / 512.,
            ],
            phi_coeff: [
                0.,
                3. * n / 2. - 27. * n3 / 32.,
                21. * n2 / 16. - 55. * n4 / 32.,
                151. * n3 / 96.,
                1097. * n4 / 512.,
            ],
            meridian,
        }
    }

    #[inline]
    pub fn is_exact(&self) -> bool {
        self.meridian.is_some()
    }

    #[inline]
    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    /// Rectifying latitude (radians) of geographic latitude `phi` (radians).
    fn rectifying(&self, phi: f64) -> f64 {
        let (s, c) = phi.sin_cos();
        match &self.meridian {
            Some(ell) => {
                let (sbet, cbet) = norm((1. - self.ellipsoid.f) * s, c);
                ell.e_jacobi(sbet, cbet, ell.delta(sbet, cbet)) * FRAC_PI_2 / ell.e()
            }
            None => phi + sin_series(s, c, &self.mu_coeff),
        }
    }

    /// Geographic latitude (radians) of rectifying latitude `mu` (radians).
    fn geographic(&self, mu: f64) -> f64 {
        if let Some(ell) = &self.meridian {
            let (sbet, cbet) = ell.e_inv(mu * ell.e() / FRAC_PI_2).sin_cos();
            return sbet.atan2((1. - self.ellipsoid.f) * cbet).clamp(-FRAC_PI_2, FRAC_PI_2);
        }
        let (s, c) = mu.sin_cos();
        let mut phi = mu + sin_series(s, c, &self.phi_coeff);
        // Polish the reverted series against the forward one
        for _ in 0..2 {
            let dphi = (mu - self.rectifying(phi)) * self.rectifying_radius / self.meridian_radius(phi);
            phi += dphi;
        }
        phi.clamp(-FRAC_PI_2, FRAC_PI_2)
    }

    /// Meridional radius of curvature at `phi` (radians).
    fn meridian_radius(&self, phi: f64) -> f64 {
        let e2 = self.ellipsoid.e2;
        self.ellipsoid.a * (1. - e2) / (1. - e2 * phi.sin().powi(2)).powf(1.5)
    }

    /// Isometric latitude of `lat` (degrees).
    fn isometric(&self, lat: f64) -> f64 {
        lat.tand().taupf(self.es).asinh()
    }

    /// `d psi / d phi` at `phi` (radians).
    fn isometric_slope(&self, phi: f64) -> f64 {
        let e2 = self.ellipsoid.e2;
        let (s, c) = phi.sin_cos();
        (1. - e2) / ((1. - e2 * s.powi(2)) * c)
    }

    /// Change in isometric latitude between two latitudes (degrees) and the
    /// ratio of meridian distance to isometric latitude over the interval.
    /// The ratio tends to the radius of the parallel as the latitudes merge.
    fn segment(&self, lat1: f64, lat2: f64) -> (f64, f64) {
        let phi1 = lat1.to_radians();
        let phi2 = lat2.to_radians();
        let dphi = phi2 - phi1;

        if dphi.abs() < 0.1 * phi1.abs().max(phi2.abs()).cos() {
            let mid = (phi1 + phi2) / 2.;
            let (mut dm, mut dpsi) = (0., 0.);
            for (x, w) in GAUSS_NODES.iter().zip(GAUSS_WEIGHTS) {
                let phi = mid + x * dphi / 2.;
                dm += w * self.meridian_radius(phi);
                dpsi += w * self.isometric_slope(phi);
            }
            (dpsi * dphi / 2., dm / dpsi)
        } else {
            let dpsi = self.isometric(lat2) - self.isometric(lat1);
            let dm = self.rectifying_radius * (self.rectifying(phi2) - self.rectifying(phi1));
            (dpsi, dm / dpsi)
        }
    }

    /// The rhumb line between two points. Of the two rhumb lines joining
    /// points on opposite sides of the antimeridian the shorter is chosen;
    /// when both are equally long the east-going one wins.
    pub fn inverse(&self, point1: &LatLon, point2: &LatLon) -> RhumbInverse {
        let qd = f64::from(dms::QD);
        let hd = f64::from(dms::HD);
        let (lat1, lat2) = (point1.latitude, point2.latitude);

        if lat1.abs() == qd || lat2.abs() == qd {
            // Every rhumb line through a pole is a meridian
            let dm = self.rectifying_radius * (self.rectifying(lat2.to_radians()) - self.rectifying(lat1.to_radians()));
            return RhumbInverse {
                azimuth: (lat2 >= lat1).ternary(0., hd),
                distance: dm.abs(),
            };
        }

        let lon12 = point1.longitude.ang_diff(point2.longitude);
        let lon12 = (lon12 == -hd).ternary(hd, lon12);
        let lam12 = lon12.to_radians();
        let (psi12, ratio) = self.segment(lat1, lat2);

        RhumbInverse {
            azimuth: atan2d(lam12, psi12),
            distance: ratio * lam12.hypot(psi12),
        }
    }

    /// The point reached by following the rhumb line leaving `origin` with
    /// `azimuth` for `distance` meters.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::RhumbPastPole`] if the line reaches a pole
    /// before `distance` is covered.
    pub fn direct(&self, origin: &LatLon, azimuth: f64, distance: f64) -> Result<LatLon, RangeError> {
        self.line(origin, azimuth).position(distance)
    }

    pub fn line(&self, origin: &LatLon, azimuth: f64) -> RhumbLine {
        RhumbLine::new(self, origin, azimuth)
    }
}

impl Default for Rhumb {
    fn default() -> Self {
        *WGS84
    }
}

/// A rhumb line through a point. Positions along it are found without
/// repeating the set up.
#[derive(Clone, Copy, Debug)]
pub struct RhumbLine {
    rhumb: Rhumb,
    lat1: f64,
    lon1: f64,
    azi1: f64,
    salp: f64,
    calp: f64,
    mu1: f64,
}

impl RhumbLine {
    fn new(rhumb: &Rhumb, origin: &LatLon, azimuth: f64) -> RhumbLine {
        let azi1 = azimuth.ang_normalize();
        let (salp, calp) = azi1.sincosd();

        Self {
            rhumb: *rhumb,
            lat1: origin.latitude,
            lon1: origin.longitude,
            azi1,
            salp,
            calp,
            mu1: rhumb.rectifying(origin.latitude.to_radians()),
        }
    }

    #[inline]
    pub fn origin(&self) -> LatLon {
        LatLon::new(self.lat1, self.lon1)
    }

    #[inline]
    pub fn azimuth(&self) -> f64 {
        self.azi1
    }

    /// The point `distance` meters along the line.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::RhumbPastPole`] if the line reaches a pole
    /// before `distance` is covered.
    pub fn position(&self, distance: f64) -> Result<LatLon, RangeError> {
        let qd = f64::from(dms::QD);
        let mu12 = distance * self.calp / self.rhumb.rectifying_radius;
        let mu2 = self.mu1 + mu12;

        // Allow for roundoff when the line ends right at the pole
        if mu2.abs() > FRAC_PI_2 * (1. + 4. * f64::EPSILON) {
            return Err(RangeError::RhumbPastPole {
                latitude: self.lat1,
                azimuth: self.azi1,
                distance,
            });
        }
        let mu2 = mu2.clamp(-FRAC_PI_2, FRAC_PI_2);

        if mu2.abs() == FRAC_PI_2 {
            return Ok(LatLon::new(qd.copysign(mu2), self.lon1));
        }

        let lat2 = if self.calp == 0. {
            self.lat1
        } else {
            self.rhumb.geographic(mu2).to_degrees()
        };

        let lon12 = if self.salp == 0. || self.lat1.abs() == qd {
            0.
        } else {
            let (_, ratio) = self.rhumb.segment(self.lat1, lat2);
            (distance * self.salp / ratio).to_degrees()
        };

        Ok(LatLon::new(lat2, self.lon1 + lon12))
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn point(lat: f64, lon: f64) -> LatLon {
        LatLon::create(lat, lon).unwrap()
    }

    #[test]
    fn rectifying_latitude_round_trips() {
        for lat in [-89.9, -45., -1e-7, 0., 12.5, 60., 89.999] {
            let phi = f64::to_radians(lat);
            assert_abs_diff_eq!(WGS84.geographic(WGS84.rectifying(phi)), phi, epsilon = 1e-15);
        }
        assert_abs_diff_eq!(WGS84.rectifying(FRAC_PI_2), FRAC_PI_2, epsilon = 1e-15);
    }

    #[test]
    fn along_the_equator() {
        let inverse = WGS84.inverse(&point(0., 0.), &point(0., 1.));
        assert_eq!(inverse.azimuth, 90.);
        assert_abs_diff_eq!(inverse.distance, 111_319.490_793_273_57, epsilon = 1e-8);
    }

    #[test]
    fn along_a_meridian() {
        let inverse = WGS84.inverse(&point(0., 10.), &point(45., 10.));
        assert_eq!(inverse.azimuth, 0.);
        assert_abs_diff_eq!(inverse.distance, 4_984_944.378, epsilon = 1e-2);

        let inverse = WGS84.inverse(&point(0., 10.), &point(-90., 10.));
        assert_eq!(inverse.azimuth, 180.);
        assert_abs_diff_eq!(inverse.distance, Ellipsoid::WGS84.quarter_meridian(), epsilon = 1e-6);
    }

    #[test]
    fn antimeridian_is_crossed_the_short_way() {
        let inverse = WGS84.inverse(&point(10., 179.), &point(10., -179.));
        assert_abs_diff_eq!(inverse.azimuth, 90., epsilon = 1e-12);
        assert!(inverse.distance < 250_000.);

        // Half way round the equator either way: go east
        let east = WGS84.inverse(&point(0., 0.), &point(0., 180.));
        assert_eq!(east.azimuth, 90.);
        let east = WGS84.inverse(&point(0., 0.), &point(0., -180.));
        assert_eq!(east.azimuth, 90.);
        assert_abs_diff_eq!(east.distance, Ellipsoid::WGS84.equatorial_radius() * std::f64::consts::PI, epsilon = 1e-6);
    }

    #[test]
    fn jfk_to_heathrow() {
        let inverse = WGS84.inverse(&point(40.6, -73.8), &point(51.6, -0.5));
        assert_abs_diff_eq!(inverse.azimuth, 77.768_389_71, epsilon = 1e-6);
        assert_abs_diff_eq!(inverse.distance, 5_771_083.383, epsilon = 1e-2);
    }

    #[test]
    fn direct_recovers_inverse() {
        for (p1, p2) in [
            (point(40.6, -73.8), point(51.6, -0.5)),
            (point(-33.9, 151.2), point(35.7, 139.7)),
            (point(10., 170.), point(-20., -150.)),
            (point(60., 5.), point(60.000_001, 5.1)),
            (point(-80., -100.), point(88., 80.)),
        ] {
            let inverse = WGS84.inverse(&p1, &p2);
            let there = WGS84.direct(&p1, inverse.azimuth, inverse.distance).unwrap();
            assert_abs_diff_eq!(there.latitude(), p2.latitude(), epsilon = 1e-9);
            assert_abs_diff_eq!(there.longitude(), p2.longitude(), epsilon = 1e-8);
        }
    }

    #[test]
    fn rhumb_is_not_shorter_than_geodesic() {
        let (p1, p2) = (point(40.6, -73.8), point(51.6, -0.5));
        let geodesic = crate::geodesic::WGS84.inverse(&p1, &p2);
        assert!(WGS84.inverse(&p1, &p2).distance > geodesic.distance);
    }

    #[test]
    fn passing_a_pole_is_an_error() {
        let error = WGS84.direct(&point(89., 0.), 0., 500_000.).unwrap_err();
        assert!(matches!(error, RangeError::RhumbPastPole { .. }));
        let error = WGS84.direct(&point(-89., 0.), 170., 500_000.).unwrap_err();
        assert!(matches!(error, RangeError::RhumbPastPole { .. }));

        // Exactly to the pole is fine
        let quarter = Ellipsoid::WGS84.quarter_meridian();
        let pole = WGS84.direct(&point(0., 30.), 0., quarter).unwrap();
        assert_abs_diff_eq!(pole.latitude(), 90., epsilon = 1e-12);
    }

    #[test]
    fn flattening_selects_the_meridian_formula() {
        let at = |f: f64| Rhumb::new(&Ellipsoid::new(6.4e6, f).unwrap()).is_exact();
        assert!(!WGS84.is_exact());
        assert!(!at(0.02));
        assert!(at(0.03));
        assert!(at(-0.1));
    }

    #[test]
    fn exact_rectifying_latitude() {
        let jupiter = Rhumb::new(&Ellipsoid::new(71_492_000., 0.064_87).unwrap());
        for lat in [-90., -62.5, -1e-7, 0., 30., 89.999, 90.] {
            let phi = f64::to_radians(lat);
            assert_abs_diff_eq!(jupiter.geographic(jupiter.rectifying(phi)), phi, epsilon = 1e-14);
        }
        assert_abs_diff_eq!(jupiter.rectifying(FRAC_PI_2), FRAC_PI_2, epsilon = 1e-15);

        // Meridian arc from the equator to 45 degrees, integrated numerically
        let inverse = jupiter.inverse(&point(0., 3.), &point(45., 3.));
        assert_eq!(inverse.azimuth, 0.);
        assert_abs_diff_eq!(inverse.distance, 50_867_856.273_913_21, epsilon = 1e-6);
        // The series is metres out at this flattening
        let series = Rhumb::with_exact(jupiter.ellipsoid(), false);
        assert!((series.inverse(&point(0., 3.), &point(45., 3.)).distance - inverse.distance).abs() > 1.);
    }

    #[test]
    fn line_positions() {
        let line = WGS84.line(&point(20., 30.), 90.);
        let p = line.position(1e6).unwrap();
        assert_eq!(p.latitude(), 20.);
        assert!(p.longitude() > 39.);
        let back = line.position(-1e6).unwrap();
        assert_abs_diff_eq!(back.longitude() - 30., 30. - p.longitude(), epsilon = 1e-12);
        assert_eq!(line.origin(), point(20., 30.));
        assert_eq!(line.azimuth(), 90.);
    }
}
