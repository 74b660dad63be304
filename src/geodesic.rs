//! Direct and inverse geodesic problems on an ellipsoid of revolution.
//!
//! Two formulations are available. Series expansions of order 6 in the third
//! flattening are fast and accurate to roundoff for `|f| <= 1/50`. Beyond
//! that the distance, longitude and reduced length integrals are evaluated
//! as elliptic integrals, which hold for any flattening.

use std::f64::consts::{FRAC_PI_2, PI};

use lazy_static::lazy_static;

use crate::{
    constants::EXACT_FLATTENING,
    elliptic::EllipticFunction,
    geodesic_line::GeodesicLine,
    latlon::LatLon,
    utility::{atan2d, dms, norm, polyval, GeoMath},
    Ellipsoid,
    ThisOrThat,
};

// ================================
// Geodesic Constants
// ================================

// Assuming GEOGRAPHICLIB_GEODESIC_ORDER == 6
pub(crate) const GEODESIC_ORDER: usize = 6;
pub(crate) const NA1: usize = GEODESIC_ORDER;
pub(crate) const NC1: usize = GEODESIC_ORDER;
pub(crate) const NC1P: usize = GEODESIC_ORDER;
pub(crate) const NA2: usize = GEODESIC_ORDER;
pub(crate) const NC2: usize = GEODESIC_ORDER;
pub(crate) const NA3: usize = GEODESIC_ORDER;
pub(crate) const NA3X: usize = NA3;
pub(crate) const NC3: usize = GEODESIC_ORDER;
pub(crate) const NC3X: usize = (NC3 * (NC3 - 1)) / 2;

const MAXIT1: u32 = 20;
const MAXIT2: u32 = MAXIT1 + f64::MANTISSA_DIGITS + 10;

const A1M1F_COEFF: [f64; 5] = [
    // (1-eps)*A1-1, polynomial in eps2 of order 3
    1., 4., 64., 0., 256.,
];

const C1F_COEFF: [f64; 18] = [
    // C1[1]/eps^1, polynomial in eps2 of order 2
    -1., 6., -16., 32.,
    // C1[2]/eps^2, polynomial in eps2 of order 2
    -9., 64., -128., 2048.,
    // C1[3]/eps^3, polynomial in eps2 of order 1
    9., -20., 256.,
    // C1[4]/eps^4, polynomial in eps2 of order 1
    3., -5., 512.,
    // C1[5]/eps^5, polynomial in eps2 of order 0
    -7., 1280.,
    // C1[6]/eps^6, polynomial in eps2 of order 0
    -7., 2048.,
];

const C1PF_COEFF: [f64; 18] = [
    // C1p[1]/eps^1, polynomial in eps2 of order 2
    205., -432., 768., 1536.,
    // C1p[2]/eps^2, polynomial in eps2 of order 2
    4005., -4736., 3840., 12288.,
    // C1p[3]/eps^3, polynomial in eps2 of order 1
    -225., 116., 384.,
    // C1p[4]/eps^4, polynomial in eps2 of order 1
    -7173., 2695., 7680.,
    // C1p[5]/eps^5, polynomial in eps2 of order 0
    3467., 7680.,
    // C1p[6]/eps^6, polynomial in eps2 of order 0
    38081., 61440.,
];

const A2M1F_COEFF: [f64; 5] = [
    // (eps+1)*A2-1, polynomial in eps2 of order 3
    -11., -28., -192., 0., 256.,
];

const C2F_COEFF: [f64; 18] = [
    // C2[1]/eps^1, polynomial in eps2 of order 2
    1., 2., 16., 32.,
    // C2[2]/eps^2, polynomial in eps2 of order 2
    35., 64., 384., 2048.,
    // C2[3]/eps^3, polynomial in eps2 of order 1
    15., 80., 768.,
    // C2[4]/eps^4, polynomial in eps2 of order 1
    7., 35., 512.,
    // C2[5]/eps^5, polynomial in eps2 of order 0
    63., 1280.,
    // C2[6]/eps^6, polynomial in eps2 of order 0
    77., 2048.,
];

const A3_COEFF: [f64; 18] = [
    // A3, coeff of eps^5, polynomial in n of order 0
    -3., 128.,
    // A3, coeff of eps^4, polynomial in n of order 1
    -2., -3., 64.,
    // A3, coeff of eps^3, polynomial in n of order 2
    -1., -3., -1., 16.,
    // A3, coeff of eps^2, polynomial in n of order 2
    3., -1., -2., 8.,
    // A3, coeff of eps^1, polynomial in n of order 1
    1., -1., 2.,
    // A3, coeff of eps^0, polynomial in n of order 0
    1., 1.,
];

const C3_COEFF: [f64; 45] = [
    // C3[1], coeff of eps^5, polynomial in n of order 0
    3., 128.,
    // C3[1], coeff of eps^4, polynomial in n of order 1
    2., 5., 128.,
    // C3[1], coeff of eps^3, polynomial in n of order 2
    -1., 3., 3., 64.,
    // C3[1], coeff of eps^2, polynomial in n of order 2
    -1., 0., 1., 8.,
    // C3[1], coeff of eps^1, polynomial in n of order 1
    -1., 1., 4.,
    // C3[2], coeff of eps^5, polynomial in n of order 0
    5., 256.,
    // C3[2], coeff of eps^4, polynomial in n of order 1
    1., 3., 128.,
    // C3[2], coeff of eps^3, polynomial in n of order 2
    -3., -2., 3., 64.,
    // C3[2], coeff of eps^2, polynomial in n of order 2
    1., -3., 2., 32.,
    // C3[3], coeff of eps^5, polynomial in n of order 0
    7., 512.,
    // C3[3], coeff of eps^4, polynomial in n of order 1
    -10., 9., 384.,
    // C3[3], coeff of eps^3, polynomial in n of order 2
    5., -9., 5., 192.,
    // C3[4], coeff of eps^5, polynomial in n of order 0
    7., 512.,
    // C3[4], coeff of eps^4, polynomial in n of order 1
    -14., 7., 512.,
    // C3[5], coeff of eps^5, polynomial in n of order 0
    21., 2560.,
];

pub(crate) fn tiny() -> f64 {
    f64::MIN_POSITIVE.sqrt()
}

fn tol0() -> f64 {
    f64::EPSILON
}

fn tol1() -> f64 {
    200. * tol0()
}

fn tol2() -> f64 {
    tol0().sqrt()
}

// Check on bisection interval
fn tolb() -> f64 {
    tol0() * tol2()
}

fn xthresh() -> f64 {
    1000. * tol2()
}

lazy_static! {
    /// Geodesic calculations on the WGS84 ellipsoid.
    pub static ref WGS84: Geodesic = Geodesic::new(&Ellipsoid::WGS84);
}

/// Evaluates `sum(c[i] * sin(2 i x), i, 1, n)` by Clenshaw summation, where
/// `n = c.len() - 1` and `c[0]` is unused.
pub(crate) fn sin_series(sinx: f64, cosx: f64, c: &[f64]) -> f64 {
    let mut n = c.len() - 1;
    // 2 * cos(2 * x)
    let ar = 2. * (cosx - sinx) * (cosx + sinx);
    let mut y0 = if n % 2 == 1 {
        n -= 1;
        c[n + 1]
    } else {
        0.
    };
    let mut y1 = 0.;
    // Now n is even
    while n > 0 {
        y1 = ar * y0 - y1 + c[n];
        y0 = ar * y1 - y0 + c[n - 1];
        n -= 2;
    }
    // sin(2 * x) * y0
    2. * sinx * cosx * y0
}

/// Expansion parameter `eps` of the series for a geodesic with
/// `k2 = ep2 cos(alp0)^2`.
pub(crate) fn series_parameter(k2: f64) -> f64 {
    k2 / (2. * (1. + (1. + k2).sqrt()) + k2)
}

/// `(1 - eps) * A1 - 1`
pub(crate) fn a1m1f(eps: f64) -> f64 {
    let m = NA1 / 2;
    let t = polyval(&A1M1F_COEFF[0..=m], eps.powi(2)) / A1M1F_COEFF[m + 1];
    (t + eps) / (1. - eps)
}

/// `(1 + eps) * A2 - 1`
pub(crate) fn a2m1f(eps: f64) -> f64 {
    let m = NA2 / 2;
    let t = polyval(&A2M1F_COEFF[0..=m], eps.powi(2)) / A2M1F_COEFF[m + 1];
    (t - eps) / (1. + eps)
}

/// Fills `c[1..=n]` from a coefficient table whose `l`th entry is a
/// polynomial in `eps^2` of order `(n - l) / 2`.
fn even_series(coeff: &[f64], n: usize, eps: f64) -> [f64; GEODESIC_ORDER + 1] {
    let mut c = [0_f64; GEODESIC_ORDER + 1];
    let eps2 = eps.powi(2);
    let mut d = eps;
    let mut o = 0;
    for l in 1..=n {
        let m = (n - l) / 2;
        c[l] = d * polyval(&coeff[o..=o + m], eps2) / coeff[o + m + 1];
        o += m + 2;
        d *= eps;
    }
    c
}

pub(crate) fn c1f(eps: f64) -> [f64; NC1 + 1] {
    even_series(&C1F_COEFF, NC1, eps)
}

pub(crate) fn c1pf(eps: f64) -> [f64; NC1P + 1] {
    even_series(&C1PF_COEFF, NC1P, eps)
}

pub(crate) fn c2f(eps: f64) -> [f64; NC2 + 1] {
    even_series(&C2F_COEFF, NC2, eps)
}

/// Solve `k^4 + 2 k^3 - (x^2 + y^2 - 1) k^2 - 2 y^2 k - y^2 = 0` for the
/// positive root `k`.
fn astroid(x: f64, y: f64) -> f64 {
    let p = x.powi(2);
    let q = y.powi(2);
    let r = (p + q - 1.) / 6.;
    if q == 0. && r <= 0. {
        return 0.;
    }

    let s = p * q / 4.;
    let r2 = r.powi(2);
    let r3 = r * r2;
    // The discriminant of the quadratic equation for T3. This is zero on
    // the evolute curve p^(1/3)+q^(1/3) = 1
    let disc = s * (s + 2. * r3);
    let mut u = r;
    if disc >= 0. {
        let mut t3 = s + r3;
        // Pick the sign on the sqrt to maximize abs(T3), minimizing loss of
        // precision due to cancellation
        t3 += (t3 < 0.).ternary(-disc.sqrt(), disc.sqrt());
        let t = t3.cbrt();
        u += t + (t != 0.).ternary_lazy(|| r2 / t, || 0.);
    } else {
        // T is complex, but the way u is defined the result is real
        let ang = (-disc).sqrt().atan2(-(s + r3));
        u += 2. * r * (ang / 3.).cos();
    }
    let v = (u.powi(2) + q).sqrt();
    // Avoid loss of accuracy when u < 0
    let uv = (u < 0.).ternary_lazy(|| q / (v - u), || u + v);
    let w = (uv - q) / (2. * v);

    uv / ((uv + w.powi(2)).sqrt() + w)
}

/// Output of a direct geodesic calculation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirectSolution {
    pub destination: LatLon,
    /// Forward azimuth at the destination, degrees in `[-180, 180]`.
    pub azimuth: f64,
    /// Distance in meters.
    pub distance: f64,
    /// Arc length on the auxiliary sphere in degrees. More than 180 means
    /// the path is not a shortest geodesic.
    pub arc_length: f64,
    /// Reduced length `m12` in meters.
    pub reduced_length: f64,
}

/// Output of an inverse geodesic calculation.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InverseSolution {
    /// Distance in meters.
    pub distance: f64,
    /// Azimuth at the first point, degrees in `[-180, 180]`.
    pub azimuth1: f64,
    /// Forward azimuth at the second point, degrees in `[-180, 180]`.
    pub azimuth2: f64,
    /// Arc length on the auxiliary sphere in degrees, in `[0, 180]`.
    pub arc_length: f64,
    /// Reduced length `m12` in meters.
    pub reduced_length: f64,
}

/// Everything the inverse calculation knows, with the azimuths still as
/// sine/cosine pairs.
pub(crate) struct InverseCore {
    pub a12: f64,
    pub s12: f64,
    pub m12: f64,
    pub salp1: f64,
    pub calp1: f64,
    pub salp2: f64,
    pub calp2: f64,
}

struct Lambda12 {
    v: f64,
    salp2: f64,
    calp2: f64,
    sig12: f64,
    ssig1: f64,
    csig1: f64,
    ssig2: f64,
    csig2: f64,
    k2: f64,
    dlam12: f64,
}

/// Solver for geodesics on one ellipsoid.
///
/// [`Geodesic::new`] picks the series formulation for `|f| <= 0.02` and the
/// elliptic integral one otherwise; [`Geodesic::with_exact`] chooses
/// explicitly.
///
/// # Usage
///
/// ```
/// use geodesy::{geodesic::WGS84, LatLon};
///
/// let jfk = LatLon::create(40.6, -73.8).unwrap();
/// let lhr = LatLon::create(51.6, -0.5).unwrap();
/// let inverse = WGS84.inverse(&jfk, &lhr);
/// assert!((inverse.distance - 5_551_759.4).abs() < 1.);
///
/// let direct = WGS84.direct(&jfk, inverse.azimuth1, inverse.distance);
/// assert!((direct.destination.latitude() - 51.6).abs() < 1e-9);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Geodesic {
    pub(crate) ellipsoid: Ellipsoid,
    pub(crate) a: f64,
    pub(crate) f: f64,
    pub(crate) f1: f64,
    pub(crate) e2: f64,
    pub(crate) ep2: f64,
    pub(crate) n: f64,
    pub(crate) b: f64,
    pub(crate) c2: f64,
    pub(crate) exact: bool,
    etol2: f64,
    a3x: [f64; NA3X],
    c3x: [f64; NC3X],
}

impl Geodesic {
    /// A solver for `ellipsoid`, using elliptic integrals when the
    /// flattening is too large for the series, `|f| > 0.02`.
    pub fn new(ellipsoid: &Ellipsoid) -> Geodesic {
        Self::with_exact(ellipsoid, ellipsoid.f.abs() > EXACT_FLATTENING)
    }

    /// A solver for `ellipsoid` using elliptic integrals if `exact`, else
    /// the order 6 series. Both agree to roundoff for Earth-like
    /// ellipsoids; the series are several times faster.
    ///
    /// ```
    /// use geodesy::{Ellipsoid, Geodesic, LatLon};
    ///
    /// let jupiter = Ellipsoid::new(71_492_000., 0.064_87).unwrap();
    /// assert!(Geodesic::new(&jupiter).is_exact());
    ///
    /// let series = Geodesic::with_exact(&Ellipsoid::WGS84, false);
    /// let exact = Geodesic::with_exact(&Ellipsoid::WGS84, true);
    /// let (p1, p2) = (LatLon::create(10., 0.).unwrap(), LatLon::create(-40., 120.).unwrap());
    /// let difference = series.inverse(&p1, &p2).distance - exact.inverse(&p1, &p2).distance;
    /// assert!(difference.abs() < 1e-7);
    /// ```
    pub fn with_exact(ellipsoid: &Ellipsoid, exact: bool) -> Geodesic {
        let f = ellipsoid.f;
        let n = ellipsoid.n;
        let etol2 = 0.1 * tol2() / ((f.abs().max(0.001) * (1. - f / 2.).min(1.)) / 2.).sqrt();

        let mut a3x = [0_f64; NA3X];
        let mut o = 0;
        for (k, j) in (0..NA3).rev().enumerate() {
            // coeff of eps^j, polynomial in n of order m
            let m = (NA3 - j - 1).min(j);
            a3x[k] = polyval(&A3_COEFF[o..=o + m], n) / A3_COEFF[o + m + 1];
            o += m + 2;
        }

        let mut c3x = [0_f64; NC3X];
        let mut o = 0;
        let mut k = 0;
        for l in 1..NC3 {
            for j in (l..NC3).rev() {
                let m = (NC3 - j - 1).min(j);
                c3x[k] = polyval(&C3_COEFF[o..=o + m], n) / C3_COEFF[o + m + 1];
                k += 1;
                o += m + 2;
            }
        }

        Self {
            ellipsoid: *ellipsoid,
            a: ellipsoid.a,
            f,
            f1: 1. - f,
            e2: ellipsoid.e2,
            ep2: ellipsoid.ep2,
            n,
            b: ellipsoid.b,
            c2: ellipsoid.authalic_radius_squared(),
            exact,
            etol2,
            a3x,
            c3x,
        }
    }

    #[inline]
    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    /// Whether this solver evaluates elliptic integrals instead of series.
    #[inline]
    pub fn is_exact(&self) -> bool {
        self.exact
    }

    pub(crate) fn a3f(&self, eps: f64) -> f64 {
        polyval(&self.a3x, eps)
    }

    /// `C3[l]` for `l` in `1..NC3`; element 0 is unused.
    pub(crate) fn c3f(&self, eps: f64) -> [f64; NC3] {
        let mut c = [0_f64; NC3];
        let mut mult = 1.;
        let mut o = 0;
        for l in 1..NC3 {
            // order of polynomial in eps
            let m = NC3 - l - 1;
            mult *= eps;
            c[l] = mult * polyval(&self.c3x[o..=o + m], eps);
            o += m + 1;
        }
        c
    }

    /// Scaled distance `s12 / b`, reduced length `m12 / b` and `m0` along a
    /// geodesic with `k2 = ep2 cos(alp0)^2`.
    fn lengths(
        &self,
        k2: f64,
        sig12: f64,
        (ssig1, csig1, dn1): (f64, f64, f64),
        (ssig2, csig2, dn2): (f64, f64, f64),
    ) -> (f64, f64, f64) {
        let (s12b, j12, m0x) = if self.exact {
            // s / b = E(sig, -k2) and J = E - F = k2 D(sig, -k2)
            let ell = EllipticFunction::new(-k2);
            let s12b =
                ell.e() / FRAC_PI_2 * (sig12 + (ell.delta_e(ssig2, csig2, dn2) - ell.delta_e(ssig1, csig1, dn1)));
            let m0x = k2 * ell.d() / FRAC_PI_2;
            let j12 = m0x * (sig12 + (ell.delta_d(ssig2, csig2, dn2) - ell.delta_d(ssig1, csig1, dn1)));
            (s12b, j12, m0x)
        } else {
            let eps = series_parameter(k2);
            let ca = c1f(eps);
            let cb = c2f(eps);
            let a1 = a1m1f(eps);
            let a2 = a2m1f(eps);
            let m0x = a1 - a2;
            let a1 = 1. + a1;
            let a2 = 1. + a2;

            let b1 = sin_series(ssig2, csig2, &ca) - sin_series(ssig1, csig1, &ca);
            let b2 = sin_series(ssig2, csig2, &cb) - sin_series(ssig1, csig1, &cb);
            (a1 * (sig12 + b1), m0x * sig12 + (a1 * b1 - a2 * b2), m0x)
        };

        // Keep the parens around (csig1 * ssig2) and (ssig1 * csig2) for
        // accurate cancellation in the case of coincident points.
        let m12b = dn2 * (csig1 * ssig2) - dn1 * (ssig1 * csig2) - csig1 * csig2 * j12;

        (s12b, m12b, m0x)
    }

    /// Starting point for Newton's method. Returns `(sig12, salp1, calp1,
    /// salp2, calp2, dnm)`; `sig12` is non-negative (and the rest are final)
    /// only for short lines that need no iteration.
    fn inverse_start(
        &self,
        (sbet1, cbet1, dn1): (f64, f64, f64),
        (sbet2, cbet2, dn2): (f64, f64, f64),
        lam12: f64,
        slam12: f64,
        clam12: f64,
    ) -> (f64, f64, f64, f64, f64, f64) {
        let mut sig12 = -1.;
        let (mut salp2, mut calp2, mut dnm) = (f64::NAN, f64::NAN, f64::NAN);
        // bet12 = bet2 - bet1 in [0, pi); bet12a = bet2 + bet1 in (-pi, 0]
        let sbet12 = sbet2 * cbet1 - cbet2 * sbet1;
        let cbet12 = cbet2 * cbet1 + sbet2 * sbet1;
        let sbet12a = sbet2 * cbet1 + cbet2 * sbet1;
        let shortline = cbet12 >= 0. && sbet12 < 0.5 && cbet2 * lam12 < 0.5;

        let (mut somg12, mut comg12) = if shortline {
            let mut sbetm2 = (sbet1 + sbet2).powi(2);
            // sin((bet1+bet2)/2)^2
            // =  (sbet1 + sbet2)^2 / ((sbet1 + sbet2)^2 + (cbet1 + cbet2)^2)
            sbetm2 /= sbetm2 + (cbet1 + cbet2).powi(2);
            dnm = (1. + self.ep2 * sbetm2).sqrt();
            let omg12 = lam12 / (self.f1 * dnm);
            omg12.sin_cos()
        } else {
            (slam12, clam12)
        };

        let mut salp1 = cbet2 * somg12;
        let mut calp1 = if comg12 >= 0. {
            sbet12 + cbet2 * sbet1 * somg12.powi(2) / (1. + comg12)
        } else {
            sbet12a - cbet2 * sbet1 * somg12.powi(2) / (1. - comg12)
        };

        let ssig12 = salp1.hypot(calp1);
        let csig12 = sbet1 * sbet2 + cbet1 * cbet2 * comg12;

        if shortline && ssig12 < self.etol2 {
            // really short lines
            salp2 = cbet1 * somg12;
            calp2 = sbet12
                - cbet1 * sbet2 * (comg12 >= 0.).ternary_lazy(|| somg12.powi(2) / (1. + comg12), || 1. - comg12);
            (salp2, calp2) = norm(salp2, calp2);
            sig12 = ssig12.atan2(csig12);
        } else if self.n.abs() > 0.1 || csig12 >= 0. || ssig12 >= 6. * self.n.abs() * PI * cbet1.powi(2) {
            // Nothing to do, zeroth order spherical approximation is OK
        } else {
            // Scale lam12 and bet2 to x, y coordinate system where antipodal
            // point is at origin and singular point is at y = 0, x = -1.
            let lam12x = (-slam12).atan2(-clam12); // lam12 - pi
            let (x, y, lamscale) = if self.f >= 0. {
                // x = dlong, y = dlat
                let k2 = sbet1.powi(2) * self.ep2;
                let lamscale = if self.exact {
                    self.e2 / self.f1 * cbet1 * 2. * EllipticFunction::with_alpha(-k2, -self.ep2).h()
                } else {
                    self.f * cbet1 * self.a3f(series_parameter(k2)) * PI
                };
                let betscale = lamscale * cbet1;
                (lam12x / lamscale, sbet12a / betscale, lamscale)
            } else {
                // x = dlat, y = dlong
                let cbet12a = cbet2 * cbet1 - sbet2 * sbet1;
                let bet12a = sbet12a.atan2(cbet12a);
                // In the case of lon12 = 180, this repeats a calculation made
                // in inverse.
                let (_, m12b, m0) = self.lengths(self.ep2, PI + bet12a, (sbet1, -cbet1, dn1), (sbet2, cbet2, dn2));
                let x = -1. + m12b / (cbet1 * cbet2 * m0 * PI);
                let betscale = (x < -0.01).ternary_lazy(|| sbet12a / x, || -self.f * cbet1.powi(2) * PI);
                let lamscale = betscale / cbet1;
                (x, lam12x / lamscale, lamscale)
            };

            if y > -tol1() && x > -1. - xthresh() {
                // strip near cut
                if self.f >= 0. {
                    salp1 = (-x).min(1.);
                    calp1 = -(1. - salp1.powi(2)).sqrt();
                } else {
                    calp1 = x.max((x > -tol1()).ternary(0., -1.));
                    salp1 = (1. - calp1.powi(2)).sqrt();
                }
            } else {
                // Estimate alp1, by solving the astroid problem.
                let k = astroid(x, y);
                let omg12a = lamscale * (self.f >= 0.).ternary_lazy(|| -x * k / (1. + k), || -y * (1. + k) / k);
                somg12 = omg12a.sin();
                comg12 = -omg12a.cos();
                // Update spherical estimate of alp1 using omg12 instead of lam12
                salp1 = cbet2 * somg12;
                calp1 = sbet12a - cbet2 * sbet1 * somg12.powi(2) / (1. - comg12);
            }
        }

        // Sanity check on starting guess. Backwards check allows NaN through.
        if salp1 > 0. || salp1.is_nan() {
            (salp1, calp1) = norm(salp1, calp1);
        } else {
            salp1 = 1.;
            calp1 = 0.;
        }

        (sig12, salp1, calp1, salp2, calp2, dnm)
    }

    /// Longitude difference (minus the target `lam120`) reached by a
    /// geodesic leaving point 1 with azimuth `alp1`, and its derivative with
    /// respect to `alp1` if `diffp`.
    fn lambda12(
        &self,
        (sbet1, cbet1, dn1): (f64, f64, f64),
        (sbet2, cbet2, dn2): (f64, f64, f64),
        salp1: f64,
        calp1: f64,
        slam120: f64,
        clam120: f64,
        diffp: bool,
    ) -> Lambda12 {
        // Break degeneracy of equatorial line. This case has already been
        // handled.
        let calp1 = (sbet1 == 0. && calp1 == 0.).ternary(-tiny(), calp1);

        // sin(alp1) * cos(bet1) = sin(alp0)
        let salp0 = salp1 * cbet1;
        // calp0 > 0
        let calp0 = calp1.hypot(salp1 * sbet1);

        // tan(bet1) = tan(sig1) * cos(alp1)
        // tan(omg1) = sin(alp0) * tan(sig1) = tan(omg1)=tan(alp1)*sin(bet1)
        let somg1 = salp0 * sbet1;
        let comg1 = calp1 * cbet1;
        let (ssig1, csig1) = norm(sbet1, comg1);

        // Enforce symmetries in the case abs(bet2) = -bet1. Need to be careful
        // about this case, since this can yield singularities in the Newton
        // iteration.
        // sin(alp2) * cos(bet2) = sin(alp0)
        let salp2 = (cbet2 != cbet1).ternary(salp0 / cbet2, salp1);
        // calp2 = sqrt(1 - sq(salp2))
        //       = sqrt(sq(calp0) - sq(sbet2)) / cbet2
        // and subst for calp0 and rearrange to give (choose positive sqrt
        // to give alp2 in [0, pi/2]).
        let calp2 = if cbet2 != cbet1 || sbet2.abs() != -sbet1 {
            ((calp1 * cbet1).powi(2)
                + (cbet1 < -sbet1).ternary_lazy(
                    || (cbet2 - cbet1) * (cbet1 + cbet2),
                    || (sbet1 - sbet2) * (sbet1 + sbet2),
                ))
            .sqrt()
                / cbet2
        } else {
            calp1.abs()
        };
        // tan(bet2) = tan(sig2) * cos(alp2)
        // tan(omg2) = sin(alp0) * tan(sig2).
        let somg2 = salp0 * sbet2;
        let comg2 = calp2 * cbet2;
        let (ssig2, csig2) = norm(sbet2, comg2);

        // sig12 = sig2 - sig1, limit to [0, pi]
        let sig12 = ((csig1 * ssig2 - ssig1 * csig2).max(0.) + 0.).atan2(csig1 * csig2 + ssig1 * ssig2);

        let k2 = calp0.powi(2) * self.ep2;
        let v = if self.exact {
            // Split lam12 into chi12, with tan(chi) = tan(omg) / (f1 dn), and
            // a third kind integral. Without normalization schi = somg.
            let cchi1 = self.f1 * dn1 * comg1;
            let cchi2 = self.f1 * dn2 * comg2;
            // chi12 = chi2 - chi1, limit to [0, pi]
            let schi12 = (cchi1 * somg2 - somg1 * cchi2).max(0.) + 0.;
            let cchi12 = cchi1 * cchi2 + somg1 * somg2;
            // eta = chi12 - lam120
            let eta = (schi12 * clam120 - cchi12 * slam120).atan2(cchi12 * clam120 + schi12 * slam120);
            let ell = EllipticFunction::with_alpha(-k2, -self.ep2);
            let deta12 = -self.e2 / self.f1 * salp0 * ell.h() / FRAC_PI_2
                * (sig12 + (ell.delta_h(ssig2, csig2, dn2) - ell.delta_h(ssig1, csig1, dn1)));
            eta + deta12
        } else {
            // omg12 = omg2 - omg1, limit to [0, pi]
            let somg12 = (comg1 * somg2 - somg1 * comg2).max(0.) + 0.;
            let comg12 = comg1 * comg2 + somg1 * somg2;
            // eta = omg12 - lam120
            let eta = (somg12 * clam120 - comg12 * slam120).atan2(comg12 * clam120 + somg12 * slam120);
            let eps = series_parameter(k2);
            let c3a = self.c3f(eps);
            let b312 = sin_series(ssig2, csig2, &c3a) - sin_series(ssig1, csig1, &c3a);
            eta - self.f * self.a3f(eps) * salp0 * (sig12 + b312)
        };

        let dlam12 = if !diffp {
            f64::NAN
        } else if calp2 == 0. {
            -2. * self.f1 * dn1 / sbet1
        } else {
            let (_, m12b, _) = self.lengths(k2, sig12, (ssig1, csig1, dn1), (ssig2, csig2, dn2));
            m12b * self.f1 / (calp2 * cbet2)
        };

        Lambda12 { v, salp2, calp2, sig12, ssig1, csig1, ssig2, csig2, k2, dlam12 }
    }

    /// The inverse problem between two raw positions. Latitudes must already
    /// be within `[-90, 90]`.
    pub(crate) fn gen_inverse(&self, lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> InverseCore {
        let qd = f64::from(dms::QD);
        let hd = f64::from(dms::HD);
        let tiny = tiny();

        // Compute longitude difference (ang_diff does this carefully).
        let (lon12, lon12s) = lon1.ang_diff_err(lon2);
        // Make longitude difference positive.
        let mut lonsign = lon12.is_sign_negative().ternary(-1., 1.);
        let lon12 = lon12 * lonsign;
        let lon12s = lon12s * lonsign;
        let lam12 = lon12.to_radians();
        // Calculate sincos of lon12 + error (this applies ang_round internally).
        let (slam12, clam12) = lon12.sincosde(lon12s);
        // the supplementary longitude difference
        let lon12s = (hd - lon12) - lon12s;

        // If really close to the equator, treat as on equator.
        let mut lat1 = lat1.lat_fix().ang_round();
        let mut lat2 = lat2.lat_fix().ang_round();
        // Swap points so that point with higher (abs) latitude is point 1.
        // If one latitude is a nan, then it becomes lat1.
        let swapp = (lat1.abs() < lat2.abs() || lat2.is_nan()).ternary(-1., 1.);
        if swapp < 0. {
            lonsign *= -1.;
            std::mem::swap(&mut lat1, &mut lat2);
        }
        // Make lat1 <= -0
        let latsign = lat1.is_sign_negative().ternary(1., -1.);
        lat1 *= latsign;
        lat2 *= latsign;
        // Now we have
        //
        //     0 <= lon12 <= 180
        //     -90 <= lat1 <= -0
        //     lat1 <= lat2 <= -lat1
        //
        // lonsign, swapp, latsign register the transformation to bring the
        // coordinates to this canonical form. In all cases, 1 means no change
        // was made.

        let (sbet1, cbet1) = lat1.sincosd();
        let (sbet1, cbet1) = norm(sbet1 * self.f1, cbet1);
        // Ensure cbet1 = +epsilon at poles; doing the fix on beta means that
        // sig12 will be <= 2*tiny for two points at the same pole.
        let cbet1 = cbet1.max(tiny);

        let (sbet2, cbet2) = lat2.sincosd();
        let (mut sbet2, cbet2) = norm(sbet2 * self.f1, cbet2);
        // Ensure cbet2 = +epsilon at poles
        let mut cbet2 = cbet2.max(tiny);

        // If cbet1 < -sbet1, then cbet2 - cbet1 is a sensitive measure of the
        // |bet1| - |bet2|. Alternatively (cbet1 >= -sbet1), abs(sbet2) + sbet1
        // is a better measure. Sometimes these quantities vanish and in that
        // case we force bet2 = +/- bet1 exactly.
        if cbet1 < -sbet1 {
            if cbet2 == cbet1 {
                sbet2 = sbet1.copysign(sbet2);
            }
        } else if sbet2.abs() == -sbet1 {
            cbet2 = cbet1;
        }

        let dn1 = (1. + self.ep2 * sbet1.powi(2)).sqrt();
        let dn2 = (1. + self.ep2 * sbet2.powi(2)).sqrt();
        let p1 = (sbet1, cbet1, dn1);
        let p2 = (sbet2, cbet2, dn2);

        let (mut salp1, mut calp1, mut salp2, mut calp2) = (0., 0., 0., 0.);
        let (mut a12, mut s12x, mut m12x) = (f64::NAN, f64::NAN, f64::NAN);

        let mut meridian = lat1 == -qd || slam12 == 0.;

        if meridian {
            // Endpoints are on a single full meridian, so the geodesic might
            // lie on a meridian.

            // Head to the target longitude
            calp1 = clam12;
            salp1 = slam12;
            // At the target we're heading north
            calp2 = 1.;
            salp2 = 0.;

            // tan(bet) = tan(sig) * cos(alp)
            let (ssig1, csig1) = (sbet1, calp1 * cbet1);
            let (ssig2, csig2) = (sbet2, calp2 * cbet2);

            // sig12 = sig2 - sig1
            let mut sig12 = ((csig1 * ssig2 - ssig1 * csig2).max(0.) + 0.).atan2(csig1 * csig2 + ssig1 * ssig2);
            // A meridian has alp0 = 0
            let (s, m, _) = self.lengths(self.ep2, sig12, (ssig1, csig1, dn1), (ssig2, csig2, dn2));
            s12x = s;
            m12x = m;
            // Add the check for sig12 since zero length geodesics might yield
            // m12 < 0. In fact, we will have sig12 > pi/2 for meridional
            // geodesic which is not a shortest path.
            if sig12 < 1. || m12x >= 0. {
                // Need at least 2, to handle 90 0 90 180
                if sig12 < 3. * tiny || (sig12 < tol0() && (s12x < 0. || m12x < 0.)) {
                    // Prevent negative s12 or m12 for short lines
                    sig12 = 0.;
                    m12x = 0.;
                    s12x = 0.;
                }
                m12x *= self.b;
                s12x *= self.b;
                a12 = sig12.to_degrees();
            } else {
                // m12 < 0, i.e., prolate and too close to anti-podal
                meridian = false;
            }
        }

        if !meridian && sbet1 == 0. && (self.f <= 0. || lon12s >= self.f * hd) {
            // and sbet2 == 0
            // Geodesic runs along equator
            calp1 = 0.;
            calp2 = 0.;
            salp1 = 1.;
            salp2 = 1.;
            s12x = self.a * lam12;
            let sig12 = lam12 / self.f1;
            m12x = self.b * sig12.sin();
            a12 = lon12 / self.f1;
        } else if !meridian {
            // Now point1 and point2 belong within a hemisphere bounded by a
            // meridian and geodesic is neither meridional or equatorial.

            // Figure a starting point for Newton's method
            let (sig12, s1, c1, s2, c2, dnm) = self.inverse_start(p1, p2, lam12, slam12, clam12);
            salp1 = s1;
            calp1 = c1;

            if sig12 >= 0. {
                // Short lines (inverse_start sets salp2, calp2, dnm)
                salp2 = s2;
                calp2 = c2;
                s12x = sig12 * self.b * dnm;
                m12x = dnm.powi(2) * self.b * (sig12 / dnm).sin();
                a12 = sig12.to_degrees();
            } else {
                // Newton's method. This is a straightforward solution of
                // f(alp1) = lambda12(alp1) - lam12 = 0 with one wrinkle. f(alp)
                // has exactly one root in the interval (0, pi) and its
                // derivative is positive at the root. Thus f(alp) is positive
                // for alp > alp1 and negative for alp < alp1. During the
                // course of the iteration, a range (alp1a, alp1b) is
                // maintained which brackets the root and with each evaluation
                // of f(alp) the range is shrunk, if possible. Newton's method
                // is restarted whenever the derivative of f is negative
                // (because the new value of alp1 is then further from the
                // solution) or if the new estimate of alp1 lies outside
                // (0,pi); in this case, the new starting guess is taken to be
                // (alp1a + alp1b) / 2.

                // Bracketing range
                let (mut salp1a, mut calp1a, mut salp1b, mut calp1b) = (tiny, 1., tiny, -1.);
                let mut tripn = false;
                let mut tripb = false;
                let mut bisecting = false;
                let mut last = self.lambda12(p1, p2, salp1, calp1, slam12, clam12, true);
                for numit in 0..=MAXIT2 {
                    if numit > 0 {
                        last = self.lambda12(p1, p2, salp1, calp1, slam12, clam12, numit < MAXIT1);
                    }
                    let v = last.v;
                    if tripb
                        // Reversed test to allow escape with NaNs
                        || !(v.abs() >= tripn.ternary(8., 1.) * tol0())
                        // Enough bisections to get accurate result
                        || numit == MAXIT2
                    {
                        break;
                    }
                    // Update bracketing values
                    if v > 0. && (numit > MAXIT1 || calp1 / salp1 > calp1b / salp1b) {
                        salp1b = salp1;
                        calp1b = calp1;
                    } else if v < 0. && (numit > MAXIT1 || calp1 / salp1 < calp1a / salp1a) {
                        salp1a = salp1;
                        calp1a = calp1;
                    }
                    if numit < MAXIT1 && last.dlam12 > 0. {
                        let dalp1 = -v / last.dlam12;
                        if dalp1.abs() < PI {
                            let (sdalp1, cdalp1) = dalp1.sin_cos();
                            let nsalp1 = salp1 * cdalp1 + calp1 * sdalp1;
                            if nsalp1 > 0. {
                                calp1 = calp1 * cdalp1 - salp1 * sdalp1;
                                salp1 = nsalp1;
                                (salp1, calp1) = norm(salp1, calp1);
                                // In some regimes we don't get quadratic
                                // convergence because slope -> 0. So use
                                // convergence conditions based on epsilon
                                // instead of sqrt(epsilon).
                                tripn = v.abs() <= 16. * tol0();
                                continue;
                            }
                        }
                    }
                    // Either dlam12 was not positive or updated value was
                    // outside legal range. Use the midpoint of the bracket as
                    // the next estimate.
                    if !bisecting {
                        bisecting = true;
                        tracing::trace!(numit, lat1, lat2, lon12, "geodesic inverse falling back to bisection");
                    }
                    salp1 = (salp1a + salp1b) / 2.;
                    calp1 = (calp1a + calp1b) / 2.;
                    (salp1, calp1) = norm(salp1, calp1);
                    tripn = false;
                    tripb = (salp1a - salp1).abs() + (calp1a - calp1) < tolb()
                        || (salp1 - salp1b).abs() + (calp1 - calp1b) < tolb();
                }

                salp2 = last.salp2;
                calp2 = last.calp2;
                let (s, m, _) = self.lengths(
                    last.k2,
                    last.sig12,
                    (last.ssig1, last.csig1, dn1),
                    (last.ssig2, last.csig2, dn2),
                );
                m12x = m * self.b;
                s12x = s * self.b;
                a12 = last.sig12.to_degrees();
            }
        }

        // Convert -0 to 0
        let s12 = 0. + s12x;
        let m12 = 0. + m12x;

        // Convert calp, salp to azimuth accounting for lonsign, swapp, latsign.
        if swapp < 0. {
            std::mem::swap(&mut salp1, &mut salp2);
            std::mem::swap(&mut calp1, &mut calp2);
        }

        salp1 *= swapp * lonsign;
        calp1 *= swapp * latsign;
        salp2 *= swapp * lonsign;
        calp2 *= swapp * latsign;

        InverseCore { a12, s12, m12, salp1, calp1, salp2, calp2 }
    }

    /// Shortest geodesic between two points.
    pub fn inverse(&self, point1: &LatLon, point2: &LatLon) -> InverseSolution {
        self.inverse_raw(point1.latitude, point1.longitude, point2.latitude, point2.longitude)
    }

    pub(crate) fn inverse_raw(&self, lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> InverseSolution {
        let core = self.gen_inverse(lat1, lon1, lat2, lon2);
        InverseSolution {
            distance: core.s12,
            azimuth1: atan2d(core.salp1, core.calp1),
            azimuth2: atan2d(core.salp2, core.calp2),
            arc_length: core.a12,
            reduced_length: core.m12,
        }
    }

    /// Destination reached by travelling `distance` meters (negative
    /// distances go backwards) from `origin` with initial `azimuth`
    /// (degrees).
    pub fn direct(&self, origin: &LatLon, azimuth: f64, distance: f64) -> DirectSolution {
        self.line(origin, azimuth).position(distance)
    }

    /// Like [`Geodesic::direct`] with the length given as an arc length
    /// on the auxiliary sphere, in degrees.
    pub fn arc_direct(&self, origin: &LatLon, azimuth: f64, arc_length: f64) -> DirectSolution {
        self.line(origin, azimuth).arc_position(arc_length)
    }

    /// The geodesic through `origin` with the given azimuth.
    pub fn line(&self, origin: &LatLon, azimuth: f64) -> GeodesicLine {
        GeodesicLine::new(self, origin.latitude, origin.longitude, azimuth)
    }

    /// The geodesic of a direct problem; its segment ends `distance` meters
    /// from `origin`.
    pub fn direct_line(&self, origin: &LatLon, azimuth: f64, distance: f64) -> GeodesicLine {
        self.line(origin, azimuth).with_distance(distance)
    }

    /// The geodesic of an inverse problem, running from `point1` through
    /// `point2`.
    pub fn inverse_line(&self, point1: &LatLon, point2: &LatLon) -> GeodesicLine {
        let core = self.gen_inverse(point1.latitude, point1.longitude, point2.latitude, point2.longitude);
        GeodesicLine::with_sincos(
            self,
            point1.latitude,
            point1.longitude,
            atan2d(core.salp1, core.calp1),
            core.salp1,
            core.calp1,
        )
        .with_arc(core.a12)
    }
}

impl Default for Geodesic {
    fn default() -> Self {
        *WGS84
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
    fn series_coefficients() {
        // Series vanish on a sphere
        let sphere = Geodesic::new(&Ellipsoid::new(1., 0.).unwrap());
        assert_eq!(sphere.a3f(0.), 1.);
        assert!(sphere.c3f(0.).iter().all(|c| *c == 0.));
        assert_eq!(a1m1f(0.), 0.);
        assert_eq!(a2m1f(0.), 0.);
        assert!(c1f(0.).iter().all(|c| *c == 0.));
        // Leading terms
        let eps = 1e-3;
        assert_abs_diff_eq!(a1m1f(eps), (eps + eps * eps / 4.) / (1. - eps), epsilon = 1e-12);
        assert_abs_diff_eq!(c1f(1e-3)[1], -1e-3 / 2., epsilon = 1e-8);
        assert_abs_diff_eq!(c1pf(1e-3)[1], 1e-3 / 2., epsilon = 1e-8);
    }

    #[test]
    fn sin_series_matches_direct_sum() {
        let c = [0., 0.3, -0.2, 0.1, 0.05, -0.01];
        let x = 0.7_f64;
        let expected: f64 = (1..c.len()).map(|i| c[i] * (2. * i as f64 * x).sin()).sum();
        assert_abs_diff_eq!(sin_series(x.sin(), x.cos(), &c), expected, epsilon = 1e-15);
    }

    #[test]
    fn astroid_root() {
        let (x, y) = (-0.7, 0.3);
        let k = astroid(x, y);
        let residual = k.powi(4) + 2. * k.powi(3) - (x * x + y * y - 1.) * k * k - 2. * y * y * k - y * y;
        assert!(k > 0.);
        assert_abs_diff_eq!(residual, 0., epsilon = 1e-14);
        assert_eq!(astroid(0.5, 0.), 0.);
    }

    #[test]
    fn karney_direct_example() {
        let direct = WGS84.direct(&point(40., 0.), 30., 10_000_000.);
        assert_abs_diff_eq!(direct.destination.latitude(), 41.793_310_205_06, epsilon = 1e-9);
        assert_abs_diff_eq!(direct.destination.longitude(), 137.844_900_043_77, epsilon = 1e-9);
        assert_abs_diff_eq!(direct.azimuth, 149.090_169_318_07, epsilon = 1e-9);
        assert_eq!(direct.distance, 10_000_000.);
    }

    #[test]
    fn karney_inverse_example() {
        let inverse = WGS84.inverse(&point(-30., 0.), &point(29.9, 179.8));
        assert_abs_diff_eq!(inverse.azimuth1, 161.890_524_736_33, epsilon = 1e-9);
        assert_abs_diff_eq!(inverse.azimuth2, 18.090_737_245_74, epsilon = 1e-9);
        assert_abs_diff_eq!(inverse.distance, 19_989_832.827_61, epsilon = 1e-4);
        assert!(inverse.arc_length < 180.);
    }

    #[test]
    fn equatorial_and_meridional_lines() {
        let inverse = WGS84.inverse(&point(0., 0.), &point(0., 1.));
        assert_abs_diff_eq!(inverse.distance, 111_319.490_793_273_57, epsilon = 1e-8);
        assert_eq!(inverse.azimuth1, 90.);
        assert_eq!(inverse.azimuth2, 90.);

        let inverse = WGS84.inverse(&point(0., 0.), &point(90., 0.));
        assert_abs_diff_eq!(inverse.distance, 10_001_965.729_312_7, epsilon = 1e-6);
        assert_eq!(inverse.azimuth1, 0.);

        // Antipodal points on the equator are joined through the poles
        let inverse = WGS84.inverse(&point(0., 0.), &point(0., 180.));
        assert_abs_diff_eq!(inverse.distance, 2. * Ellipsoid::WGS84.quarter_meridian(), epsilon = 1e-6);
        assert_eq!(inverse.azimuth1.abs(), 0.);
        assert_eq!(inverse.azimuth2.abs(), 180.);
    }

    #[test]
    fn coincident_points() {
        let inverse = WGS84.inverse(&point(20.001, 0.), &point(20.001, 0.));
        assert_eq!(inverse.distance, 0.);
        assert_eq!(inverse.reduced_length, 0.);
        let inverse = WGS84.inverse(&point(90., 0.), &point(90., 180.));
        assert_abs_diff_eq!(inverse.distance, 0., epsilon = 1e-8);
    }

    #[test]
    fn direct_from_the_pole_follows_the_meridian() {
        let direct = WGS84.direct(&point(90., 0.), 180., 1_000_000.);
        assert!(direct.destination.latitude() < 90.);
        assert_abs_diff_eq!(direct.destination.longitude(), 0., epsilon = 1e-9);
    }

    #[test]
    fn inverse_recovers_direct() {
        for (lat1, azi1, s12) in [
            (0., 45., 5_000_000.),
            (40., 30., 10_000_000.),
            (-60., 170., 15_000_000.),
            (10., -95., 100.),
            (-89.5, 10., 18_000_000.),
            (33.3, 0., 1000.),
        ] {
            let origin = point(lat1, 13.);
            let direct = WGS84.direct(&origin, azi1, s12);
            let inverse = WGS84.inverse(&origin, &direct.destination);
            assert_abs_diff_eq!(inverse.distance, s12, epsilon = 1e-8);
            assert_abs_diff_eq!(inverse.azimuth1, azi1, epsilon = 1e-8);
            assert_abs_diff_eq!(inverse.azimuth2, direct.azimuth, epsilon = 1e-8);
            assert_abs_diff_eq!(inverse.reduced_length, direct.reduced_length, epsilon = 1e-6);
        }
    }

    #[test]
    fn other_ellipsoids() {
        for f in [1. / 50., -1. / 50., 0.] {
            let geod = Geodesic::new(&Ellipsoid::new(6.4e6, f).unwrap());
            for (lat1, azi1, s12) in [(10., 20., 3e6), (-45., 135., 1.2e7), (80., -60., 8e6)] {
                let origin = point(lat1, -40.);
                let direct = geod.direct(&origin, azi1, s12);
                let inverse = geod.inverse(&origin, &direct.destination);
                assert_abs_diff_eq!(inverse.distance, s12, epsilon = 1e-5);
                assert_abs_diff_eq!(inverse.azimuth1, azi1, epsilon = 1e-7);
            }
        }
    }

    #[test]
    fn flattening_selects_the_formulation() {
        let at = |f: f64| Geodesic::new(&Ellipsoid::new(6.4e6, f).unwrap()).is_exact();
        assert!(!WGS84.is_exact());
        assert!(!at(0.02));
        assert!(!at(-0.02));
        assert!(at(0.020_001));
        assert!(at(-0.1));
        assert!(Geodesic::with_exact(&Ellipsoid::WGS84, true).is_exact());
    }

    #[test]
    fn exact_agrees_with_series_on_wgs84() {
        let exact = Geodesic::with_exact(&Ellipsoid::WGS84, true);
        for (lat1, azi1, s12) in [(40., 30., 10_000_000.), (-60., 170., 15_000_000.), (10., -95., 100.)] {
            let origin = point(lat1, 13.);
            let series = WGS84.direct(&origin, azi1, s12);
            let direct = exact.direct(&origin, azi1, s12);
            assert_abs_diff_eq!(direct.destination.latitude(), series.destination.latitude(), epsilon = 1e-11);
            assert_abs_diff_eq!(direct.destination.longitude(), series.destination.longitude(), epsilon = 1e-11);
            assert_abs_diff_eq!(direct.azimuth, series.azimuth, epsilon = 1e-11);
            assert_abs_diff_eq!(direct.reduced_length, series.reduced_length, epsilon = 1e-6);

            let inverse = exact.inverse(&origin, &series.destination);
            assert_abs_diff_eq!(inverse.distance, s12, epsilon = 1e-7);
            assert_abs_diff_eq!(inverse.azimuth1, azi1, epsilon = 1e-10);
        }
    }

    #[test]
    fn exact_meridian_and_equator() {
        // Meridian arcs on a prolate spheroid, where a < b
        let prolate = Geodesic::new(&Ellipsoid::new(6.4e6, -0.1).unwrap());
        let quarter = prolate.inverse(&point(0., 0.), &point(90., 0.));
        assert_abs_diff_eq!(quarter.distance, 10_561_736.150_620_314, epsilon = 1e-6);
        let equator = prolate.inverse(&point(0., 0.), &point(0., 10.));
        assert_abs_diff_eq!(equator.distance, 6.4e6 * 10_f64.to_radians(), epsilon = 1e-7);
        assert_eq!(equator.azimuth1, 90.);
    }

    #[test]
    fn nearly_antipodal_points_converge() {
        let inverse = WGS84.inverse(&point(-30., 0.), &point(30., 179.99));
        assert!(inverse.distance.is_finite());
        assert!(inverse.distance > 19_900_000. && inverse.distance < 20_010_000.);
        let direct = WGS84.direct(&point(-30., 0.), inverse.azimuth1, inverse.distance);
        assert_abs_diff_eq!(direct.destination.latitude(), 30., epsilon = 1e-8);
        assert_abs_diff_eq!(direct.destination.longitude(), 179.99, epsilon = 1e-8);
    }
}
