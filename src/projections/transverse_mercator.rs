use std::f64::consts::{FRAC_PI_2, PI};

use lazy_static::lazy_static;
use num::Complex;

use crate::{
    constants::UTM_K0,
    latlon::check_latitude,
    utility::{atan2d, dms, polyval, GeoMath},
    ConstructionError,
    Ellipsoid,
    RangeError,
    ThisOrThat,
};

use super::{transverse_mercator_exact::TransverseMercatorExact, GeographicPoint, ProjectedPoint};

// ================================
// Transverse Mercator Constants
// ================================

// Assuming GEOGRAPHICLIB_TRANSVERSEMERCATOR_ORDER == 6
const B1_COEFF: [f64; 5] = [
    // b1*(n+1), polynomial in n2 of order 3
    1., 4., 64., 256., 256.,
];  // count = 5

#[allow(clippy::unreadable_literal)]
const ALP_COEFF: [f64; 27] = [
    // alp[1]/n^1, polynomial in n of order 5
    31564., -66675., 34440., 47250., -100800., 75600., 151200.,
    // alp[2]/n^2, polynomial in n of order 4
    -1983433., 863232., 748608., -1161216., 524160., 1935360.,
    // alp[3]/n^3, polynomial in n of order 3
    670412., 406647., -533952., 184464., 725760.,
    // alp[4]/n^4, polynomial in n of order 2
    6601661., -7732800., 2230245., 7257600.,
    // alp[5]/n^5, polynomial in n of order 1
    -13675556., 3438171., 7983360.,
    // alp[6]/n^6, polynomial in n of order 0
    212378941., 319334400.,
];  // count = 27

#[allow(clippy::unreadable_literal)]
const BET_COEFF: [f64; 27] = [
    // bet[1]/n^1, polynomial in n of order 5
    384796., -382725., -6720., 932400., -1612800., 1209600., 2419200.,
    // bet[2]/n^2, polynomial in n of order 4
    -1118711., 1695744., -1174656., 258048., 80640., 3870720.,
    // bet[3]/n^3, polynomial in n of order 3
    22276., -16929., -15984., 12852., 362880.,
    // bet[4]/n^4, polynomial in n of order 2
    -830251., -158400., 197865., 7257600.,
    // bet[5]/n^5, polynomial in n of order 1
    -435388., 453717., 15966720.,
    // bet[6]/n^6, polynomial in n of order 0
    20648693., 638668800.,
];  // count = 27

const MAXPOW: usize = 6;

lazy_static! {
    /// Series transverse Mercator on WGS84 with the UTM central scale factor.
    pub static ref UTM: TransverseMercator = TransverseMercator::series(&Ellipsoid::WGS84, UTM_K0);
}

/// Krüger series for one ellipsoid, accurate to a few nanometers within
/// 3900 km of the central meridian for Earth-like flattening.
#[derive(Clone, Copy, Debug)]
struct TransverseMercatorSeries {
    e2: f64,
    es: f64,
    c: f64,
    a1: f64,
    b1: f64,
    alp: [f64; MAXPOW + 1],
    bet: [f64; MAXPOW + 1],
}

#[derive(Clone, Copy, Debug)]
enum Method {
    Series(TransverseMercatorSeries),
    Exact(TransverseMercatorExact),
}

/// Transverse Mercator projection for one ellipsoid and central scale
/// factor. False easting and northing are left to the caller.
///
/// # Usage
///
/// ```
/// use geodesy::{Ellipsoid, TransverseMercator};
///
/// let tm = TransverseMercator::new(&Ellipsoid::WGS84, 0.9996).unwrap();
/// let p = tm.forward(3., 45., 3.).unwrap();
/// assert_eq!(p.x, 0.);
/// let g = tm.reverse(3., p.x, p.y);
/// assert!((g.latitude - 45.).abs() < 1e-12);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct TransverseMercator {
    ellipsoid: Ellipsoid,
    k0: f64,
    method: Method,
}

impl TransverseMercatorSeries {
    fn new(ellipsoid: &Ellipsoid) -> TransverseMercatorSeries {
        let n = ellipsoid.n;
        let e2 = ellipsoid.e2;
        let es = ellipsoid.es();
        let c = (1. - e2).sqrt() * 1_f64.eatanhe(es).exp();

        let m = MAXPOW / 2;
        let b1 = polyval(&B1_COEFF[0..=m], n.powi(2)) / (B1_COEFF[m + 1] * (1. + n));
        // a1 is the equivalent radius for computing the circumference of
        // ellipse.
        let a1 = b1 * ellipsoid.a;

        let mut alp = [0_f64; MAXPOW + 1];
        let mut bet = [0_f64; MAXPOW + 1];

        let mut o = 0;
        let mut d = n;
        for l in 1..=MAXPOW {
            let m = MAXPOW - l;
            alp[l] = d * polyval(&ALP_COEFF[o..=o + m], n) / ALP_COEFF[o + m + 1];
            bet[l] = d * polyval(&BET_COEFF[o..=o + m], n) / BET_COEFF[o + m + 1];
            o += m + 2;
            d *= n;
        }

        Self { e2, es, c, a1, b1, alp, bet }
    }

    /// Clenshaw summation of the series `coeff` at `2 * zeta`, returning
    /// the sum and its derivative.
    fn clenshaw(coeff: &[f64; MAXPOW + 1], sign: f64, c0: f64, ch0: f64, s0: f64, sh0: f64) -> (Complex<f64>, Complex<f64>) {
        let a = Complex::new(2. * c0 * ch0, -2. * s0 * sh0);
        let mut n = MAXPOW;

        let odd = n % 2 == 1;
        let mut y0 = Complex::new(odd.ternary(sign * coeff[n], 0.), 0.);
        let mut y1 = Complex::default();
        let mut z0 = Complex::new(odd.ternary(sign * 2. * n as f64 * coeff[n], 0.), 0.);
        let mut z1 = Complex::default();

        if odd {
            n -= 1;
        }

        while n > 0 {
            y1 = a * y0 - y1 + sign * coeff[n];
            z1 = a * z0 - z1 + sign * 2. * (n as f64) * coeff[n];
            n -= 1;

            y0 = a * y1 - y0 + sign * coeff[n];
            z0 = a * z1 - z0 + sign * 2. * (n as f64) * coeff[n];
            n -= 1;
        }

        let z1 = 1. - z1 + a / 2. * z0;
        let y1 = Complex::new(s0 * ch0, c0 * sh0) * y0;
        (y1, z1)
    }

    fn forward(&self, k0: f64, lon0: f64, lat: f64, lon: f64) -> ProjectedPoint {
        let qd = f64::from(dms::QD);
        let hd = f64::from(dms::HD);
        let mut lon = lon0.ang_diff(lon);
        let mut lat = lat;

        let mut latsign = lat.is_sign_negative().ternary(-1., 1.);
        let lonsign = lon.is_sign_negative().ternary(-1., 1.);
        lon *= lonsign;
        lat *= latsign;
        let backside = lon > qd;
        if backside {
            if lat == 0. {
                latsign = -1.;
            }
            lon = hd - lon;
        }

        let (sphi, cphi) = lat.sincosd();
        let (slam, clam) = lon.sincosd();

        let (xip, etap, mut gamma, mut k) = if lat == qd {
            (FRAC_PI_2, 0., lon, self.c)
        } else {
            let tau = sphi / cphi;
            let taup = tau.taupf(self.es);
            (
                taup.atan2(clam),
                (slam / taup.hypot(clam)).asinh(),
                atan2d(slam * taup, clam * 1_f64.hypot(taup)),
                (1. - self.e2 + self.e2 * cphi.powi(2)).sqrt() * 1_f64.hypot(tau) / taup.hypot(clam),
            )
        };

        let c0 = (2. * xip).cos();
        let ch0 = (2. * etap).cosh();
        let s0 = (2. * xip).sin();
        let sh0 = (2. * etap).sinh();
        let (y1, z1) = Self::clenshaw(&self.alp, 1., c0, ch0, s0, sh0);

        gamma -= atan2d(z1.im, z1.re);
        k *= self.b1 * z1.norm();

        let xi = xip + y1.re;
        let eta = etap + y1.im;
        let y = self.a1 * k0 * backside.ternary(PI - xi, xi) * latsign;
        let x = self.a1 * k0 * eta * lonsign;
        if backside {
            gamma = hd - gamma;
        }
        gamma *= latsign * lonsign;

        ProjectedPoint { x, y, convergence: gamma.ang_normalize(), scale: k * k0 }
    }

    fn reverse(&self, k0: f64, lon0: f64, x: f64, y: f64) -> GeographicPoint {
        let qd = f64::from(dms::QD);
        let hd = f64::from(dms::HD);
        let mut xi = y / (self.a1 * k0);
        let mut eta = x / (self.a1 * k0);

        let xi_sign = xi.is_sign_negative().ternary(-1., 1.);
        let eta_sign = eta.is_sign_negative().ternary(-1., 1.);

        xi *= xi_sign;
        eta *= eta_sign;

        let backside = xi > FRAC_PI_2;
        if backside {
            xi = PI - xi;
        }

        let c0 = (2. * xi).cos();
        let ch0 = (2. * eta).cosh();
        let s0 = (2. * xi).sin();
        let sh0 = (2. * eta).sinh();
        let (y1, z1) = Self::clenshaw(&self.bet, -1., c0, ch0, s0, sh0);

        let mut gamma = atan2d(z1.im, z1.re);
        let mut k = self.b1 / z1.norm();

        let xip = xi + y1.re;
        let etap = eta + y1.im;
        let s = etap.sinh();
        let c = 0_f64.max(xip.cos());
        let r = s.hypot(c);

        let (mut lat, mut lon) = if r == 0. {
            k *= self.c;
            (qd, 0.)
        } else {
            let lon = atan2d(s, c);
            let sxip = xip.sin();
            let tau = (sxip / r).tauf(self.es);
            let phi = tau.atan();
            gamma += atan2d(sxip * etap.tanh(), c);
            k *= (1. - self.e2 + self.e2 * phi.cos().powi(2)).sqrt() * 1_f64.hypot(tau) * r;

            (phi.to_degrees(), lon)
        };

        lat *= xi_sign;
        if backside {
            lon = hd - lon;
        }
        lon *= eta_sign;
        lon = (lon + lon0).ang_normalize();
        if backside {
            gamma = hd - gamma;
        }
        gamma *= xi_sign * eta_sign;

        GeographicPoint { latitude: lat, longitude: lon, convergence: gamma.ang_normalize(), scale: k * k0 }
    }
}

impl TransverseMercator {
    /// Internal-only constructor that doesn't check the parameters
    pub(crate) fn series(ellipsoid: &Ellipsoid, k0: f64) -> TransverseMercator {
        Self {
            ellipsoid: *ellipsoid,
            k0,
            method: Method::Series(TransverseMercatorSeries::new(ellipsoid)),
        }
    }

    /// Creates a projection using the fast series expansion.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::ScaleFactorNotPositive`] if `k0` is not a
    /// positive finite number.
    pub fn new(ellipsoid: &Ellipsoid, k0: f64) -> Result<TransverseMercator, ConstructionError> {
        Self::with_options(ellipsoid, k0, false, false)
    }

    /// Creates a projection, choosing between the series expansion and the
    /// exact elliptic-function formulation. `extended` maps the whole
    /// ellipsoid without folding about the equator and central meridian and
    /// is only available with `exact`.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::ScaleFactorNotPositive`] for a bad `k0`,
    /// [`ConstructionError::ExtendedRequiresExact`] if `extended` is asked
    /// for without `exact`, and [`ConstructionError::FlatteningNotPositive`]
    /// if `exact` is asked for on a sphere or prolate ellipsoid.
    pub fn with_options(ellipsoid: &Ellipsoid, k0: f64, exact: bool, extended: bool) -> Result<TransverseMercator, ConstructionError> {
        if !(k0.is_finite() && k0 > 0.) {
            return Err(ConstructionError::ScaleFactorNotPositive(k0));
        }
        if extended && !exact {
            return Err(ConstructionError::ExtendedRequiresExact);
        }
        if !exact {
            return Ok(Self::series(ellipsoid, k0));
        }
        if !(ellipsoid.f > 0.) {
            return Err(ConstructionError::FlatteningNotPositive(ellipsoid.f));
        }

        Ok(Self {
            ellipsoid: *ellipsoid,
            k0,
            method: Method::Exact(TransverseMercatorExact::new(ellipsoid, k0, extended)),
        })
    }

    #[inline]
    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    #[inline]
    pub fn equatorial_radius(&self) -> f64 {
        self.ellipsoid.a
    }

    #[inline]
    pub fn flattening(&self) -> f64 {
        self.ellipsoid.f
    }

    /// Central scale factor `k0`.
    #[inline]
    pub fn central_scale(&self) -> f64 {
        self.k0
    }

    pub fn is_exact(&self) -> bool {
        matches!(self.method, Method::Exact(_))
    }

    /// Projects `(lat, lon)` relative to the central meridian `lon0`.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::IllegalLatitude`] if `lat` is outside `[-90, 90]`.
    pub fn forward(&self, lon0: f64, lat: f64, lon: f64) -> Result<ProjectedPoint, RangeError> {
        check_latitude(lat)?;
        Ok(match &self.method {
            Method::Series(series) => series.forward(self.k0, lon0, lat, lon),
            Method::Exact(exact) => exact.forward(lon0, lat, lon),
        })
    }

    /// Inverse of [`TransverseMercator::forward`]. The returned longitude is
    /// in `[-180, 180]`.
    pub fn reverse(&self, lon0: f64, x: f64, y: f64) -> GeographicPoint {
        match &self.method {
            Method::Series(series) => series.reverse(self.k0, lon0, x, y),
            Method::Exact(exact) => exact.reverse(lon0, x, y),
        }
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    #[test]
    fn rejects_bad_parameters() {
        let wgs84 = Ellipsoid::WGS84;
        assert_eq!(TransverseMercator::new(&wgs84, 0.).unwrap_err(), ConstructionError::ScaleFactorNotPositive(0.));
        assert_eq!(TransverseMercator::new(&wgs84, -1.).unwrap_err(), ConstructionError::ScaleFactorNotPositive(-1.));
        assert_eq!(
            TransverseMercator::with_options(&wgs84, 1., false, true).unwrap_err(),
            ConstructionError::ExtendedRequiresExact
        );
        let sphere = Ellipsoid::new(6_371_000., 0.).unwrap();
        assert_eq!(
            TransverseMercator::with_options(&sphere, 1., true, false).unwrap_err(),
            ConstructionError::FlatteningNotPositive(0.)
        );
        assert!(TransverseMercator::new(&sphere, 1.).is_ok());
    }

    #[test]
    fn rejects_bad_latitude() {
        assert_eq!(UTM.forward(0., 91., 0.).unwrap_err(), RangeError::IllegalLatitude(91.));
        assert!(UTM.forward(0., f64::NAN, 0.).is_err());
    }

    #[test]
    fn central_meridian_is_true_scale() {
        let p = UTM.forward(9., 0., 9.).unwrap();
        assert_eq!((p.x, p.y), (0., 0.));
        assert_abs_diff_eq!(p.scale, UTM_K0, epsilon = 1e-15);
        assert_eq!(p.convergence, 0.);
        assert_eq!(UTM.central_scale(), UTM_K0);
        assert_eq!(UTM.equatorial_radius(), Ellipsoid::WGS84.equatorial_radius());
        assert!(!UTM.is_exact());
    }

    #[test]
    fn pole_maps_to_quarter_meridian() {
        let tm = TransverseMercator::new(&Ellipsoid::WGS84, 1.).unwrap();
        let p = tm.forward(0., 90., 0.).unwrap();
        assert_abs_diff_eq!(p.y, Ellipsoid::WGS84.quarter_meridian(), epsilon = 1e-4);
        let g = tm.reverse(0., 0., p.y);
        assert_abs_diff_eq!(g.latitude, 90., epsilon = 1e-9);
    }

    #[test]
    fn parity_is_respected() {
        let p = UTM.forward(0., 30., 2.).unwrap();
        let q = UTM.forward(0., -30., -2.).unwrap();
        assert_eq!(p.x, -q.x);
        assert_eq!(p.y, -q.y);
        assert_eq!(p.convergence, q.convergence);
        assert_eq!(p.scale, q.scale);
    }

    #[test]
    fn series_agrees_with_exact() {
        let exact = TransverseMercator::with_options(&Ellipsoid::WGS84, UTM_K0, true, false).unwrap();
        assert!(exact.is_exact());
        for (lat, lon) in [(0., 3.), (45., -2.5), (-60., 10.), (80., 25.), (-12., 30.)] {
            let s = UTM.forward(0., lat, lon).unwrap();
            let e = exact.forward(0., lat, lon).unwrap();
            assert_abs_diff_eq!(s.x, e.x, epsilon = 1e-5);
            assert_abs_diff_eq!(s.y, e.y, epsilon = 1e-5);
            assert_abs_diff_eq!(s.convergence, e.convergence, epsilon = 1e-8);
            assert_abs_diff_eq!(s.scale, e.scale, epsilon = 1e-9);
        }
    }

    #[test]
    fn extended_matches_standard_in_the_first_quadrant() {
        let standard = TransverseMercator::with_options(&Ellipsoid::WGS84, 1., true, false).unwrap();
        let extended = TransverseMercator::with_options(&Ellipsoid::WGS84, 1., true, true).unwrap();
        let p = standard.forward(0., 35., 20.).unwrap();
        let q = extended.forward(0., 35., 20.).unwrap();
        assert_abs_diff_eq!(p.x, q.x, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y, q.y, epsilon = 1e-9);
    }

    #[test]
    fn round_trips() {
        for (lat, lon) in [(0., 0.5), (33.3, 44.4), (-71., -5.), (89.9, 2.), (10., 20.)] {
            let p = UTM.forward(45., lat, lon + 45.).unwrap();
            let g = UTM.reverse(45., p.x, p.y);
            assert_abs_diff_eq!(g.latitude, lat, epsilon = 1e-9);
            assert_abs_diff_eq!(g.longitude, lon + 45., epsilon = 1e-9);
            assert_abs_diff_eq!(g.convergence, p.convergence, epsilon = 1e-9);
            assert_abs_diff_eq!(g.scale, p.scale, epsilon = 1e-12);
        }
    }
}
