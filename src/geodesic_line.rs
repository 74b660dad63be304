use std::f64::consts::FRAC_PI_2;

use lazy_static::lazy_static;

use crate::{
    elliptic::EllipticFunction,
    geodesic::{self, a1m1f, a2m1f, c1f, c1pf, c2f, series_parameter, sin_series, Geodesic, NC1, NC1P, NC2, NC3},
    latlon::LatLon,
    utility::{atan2d, norm, GeoMath},
    DirectSolution,
    Ellipsoid,
};

lazy_static! {
    /// One meter of the WGS84 geodesic heading north from `(0, 0)`.
    pub static ref UNIT: GeodesicLine = geodesic::WGS84.direct_line(&LatLon::new(0., 0.), 0., 1.);
}

/// Distance, longitude and reduced length integrals of one line, with their
/// values at the origin.
#[derive(Clone, Copy, Debug)]
enum Integrals {
    Series {
        a1m1: f64,
        a2m1: f64,
        a3c: f64,
        b11: f64,
        b21: f64,
        b31: f64,
        c1a: [f64; NC1 + 1],
        c1pa: [f64; NC1P + 1],
        c2a: [f64; NC2 + 1],
        c3a: [f64; NC3],
    },
    Exact {
        ell: EllipticFunction,
        // Secular coefficients and periodic parts at sig1 of the distance (e),
        // reduced length (d) and longitude (h) integrals
        e0: f64,
        e1: f64,
        d0: f64,
        d1: f64,
        h0: f64,
        h1: f64,
        cchi1: f64,
    },
}

/// A geodesic with its series coefficients worked out once, so that points
/// along it can be found without solving a new problem each time.
///
/// Lines come from [`Geodesic::line`], [`Geodesic::direct_line`] or
/// [`Geodesic::inverse_line`]. The last two also record the segment that
/// defined them, see [`GeodesicLine::distance`].
///
/// # Usage
///
/// ```
/// use geodesy::{geodesic::WGS84, LatLon};
///
/// let jfk = LatLon::create(40.6, -73.8).unwrap();
/// let sin = LatLon::create(1.4, 104.0).unwrap();
/// let line = WGS84.inverse_line(&jfk, &sin);
///
/// let total = line.distance().unwrap();
/// let halfway = line.position(total / 2.);
/// let end = line.position(total);
/// assert!((end.destination.latitude() - 1.4).abs() < 1e-9);
/// assert!(halfway.destination.latitude() > 60.);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct GeodesicLine {
    ellipsoid: Ellipsoid,
    b: f64,
    f: f64,
    f1: f64,
    lat1: f64,
    lon1: f64,
    azi1: f64,
    salp0: f64,
    calp0: f64,
    k2: f64,
    ssig1: f64,
    csig1: f64,
    dn1: f64,
    stau1: f64,
    ctau1: f64,
    somg1: f64,
    comg1: f64,
    integrals: Integrals,
    s13: Option<f64>,
    a13: Option<f64>,
}

impl GeodesicLine {
    pub(crate) fn new(geodesic: &Geodesic, lat1: f64, lon1: f64, azi1: f64) -> GeodesicLine {
        let azi1 = azi1.ang_normalize();
        // Guard against underflow in salp0
        let (salp1, calp1) = azi1.ang_round().sincosd();
        Self::with_sincos(geodesic, lat1, lon1, azi1, salp1, calp1)
    }

    pub(crate) fn with_sincos(
        geodesic: &Geodesic,
        lat1: f64,
        lon1: f64,
        azi1: f64,
        salp1: f64,
        calp1: f64,
    ) -> GeodesicLine {
        let f1 = geodesic.f1;
        let lat1 = lat1.lat_fix();

        let (sbet1, cbet1) = lat1.ang_round().sincosd();
        let (sbet1, cbet1) = norm(sbet1 * f1, cbet1);
        // Ensure cbet1 = +epsilon at poles
        let cbet1 = cbet1.max(geodesic::tiny());
        let dn1 = (1. + geodesic.ep2 * sbet1.powi(2)).sqrt();

        // Evaluate alp0 from sin(alp1) * cos(bet1) = sin(alp0),
        // alp0 in [0, pi/2 - |bet1|]
        let salp0 = salp1 * cbet1;
        // Alt: calp0 = hypot(sbet1, calp1 * cbet1). The following
        // is slightly better (consider the case salp1 = 0).
        let calp0 = calp1.hypot(salp1 * sbet1);
        // Evaluate sig with tan(bet1) = tan(sig1) * cos(alp1).
        // sig = 0 is nearest northward crossing of equator.
        // With bet1 = 0, alp1 = pi/2, we have sig1 = 0 (equatorial line).
        // With bet1 =  pi/2, alp1 = -pi, sig1 =  pi/2
        // With bet1 = -pi/2, alp1 =  0 , sig1 = -pi/2
        // Evaluate omg1 with tan(omg1) = sin(alp0) * tan(sig1).
        // With alp0 in (0, pi/2], quadrants for sig and omg coincide.
        // No atan2(0,0) ambiguity at poles since cbet1 = +epsilon.
        // With alp0 = 0, omg1 = 0 for alp1 = 0, omg1 = pi for alp1 = pi.
        let somg1 = salp0 * sbet1;
        let comg1 = if sbet1 != 0. || calp1 != 0. { cbet1 * calp1 } else { 1. };
        // sig1 in (-pi, pi]
        let (ssig1, csig1) = norm(sbet1, comg1);

        let k2 = calp0.powi(2) * geodesic.ep2;

        let (integrals, tau1) = if geodesic.exact {
            let ell = EllipticFunction::with_alpha(-k2, -geodesic.ep2);
            let e1 = ell.delta_e(ssig1, csig1, dn1);
            let integrals = Integrals::Exact {
                ell,
                e0: ell.e() / FRAC_PI_2,
                e1,
                d0: k2 * ell.d() / FRAC_PI_2,
                d1: ell.delta_d(ssig1, csig1, dn1),
                h0: -geodesic.e2 / f1 * salp0 * ell.h() / FRAC_PI_2,
                h1: ell.delta_h(ssig1, csig1, dn1),
                cchi1: f1 * dn1 * comg1,
            };
            (integrals, e1)
        } else {
            let eps = series_parameter(k2);
            let c1a = c1f(eps);
            let b11 = sin_series(ssig1, csig1, &c1a);
            let c2a = c2f(eps);
            let c3a = geodesic.c3f(eps);
            let integrals = Integrals::Series {
                a1m1: a1m1f(eps),
                a2m1: a2m1f(eps),
                a3c: -geodesic.f * salp0 * geodesic.a3f(eps),
                b11,
                b21: sin_series(ssig1, csig1, &c2a),
                b31: sin_series(ssig1, csig1, &c3a),
                c1a,
                c1pa: c1pf(eps),
                c2a,
                c3a,
            };
            (integrals, b11)
        };
        let (s, c) = tau1.sin_cos();
        // tau1 = sig1 + B11 (or the periodic part of E)
        let stau1 = ssig1 * c + csig1 * s;
        let ctau1 = csig1 * c - ssig1 * s;

        Self {
            ellipsoid: geodesic.ellipsoid,
            b: geodesic.b,
            f: geodesic.f,
            f1,
            lat1,
            lon1,
            azi1,
            salp0,
            calp0,
            k2,
            ssig1,
            csig1,
            dn1,
            stau1,
            ctau1,
            somg1,
            comg1,
            integrals,
            s13: None,
            a13: None,
        }
    }

    /// Records a defining segment of `s13` meters.
    pub(crate) fn with_distance(mut self, s13: f64) -> GeodesicLine {
        self.a13 = Some(self.gen_position(false, s13).arc_length);
        self.s13 = Some(s13);
        self
    }

    /// Records a defining segment of `a13` degrees of arc.
    pub(crate) fn with_arc(mut self, a13: f64) -> GeodesicLine {
        self.s13 = Some(self.gen_position(true, a13).distance);
        self.a13 = Some(a13);
        self
    }

    /// Arc length `sig12` (radians) on the auxiliary sphere that covers
    /// `s12` meters.
    fn arc_for_distance(&self, s12: f64) -> f64 {
        match &self.integrals {
            Integrals::Series { a1m1, b11, c1a, c1pa, .. } => {
                let tau12 = s12 / (self.b * (1. + a1m1));
                let (s, c) = tau12.sin_cos();
                // tau2 = tau1 + tau12
                let b12 = -sin_series(self.stau1 * c + self.ctau1 * s, self.ctau1 * c - self.stau1 * s, c1pa);
                let sig12 = tau12 - (b12 - b11);
                if self.f.abs() <= 0.01 {
                    return sig12;
                }
                // Reverted distance series is inaccurate for |f| > 1/100, so
                // correct sig12 with 1 Newton iteration.
                let (ssig12, csig12) = sig12.sin_cos();
                let ssig2 = self.ssig1 * csig12 + self.csig1 * ssig12;
                let csig2 = self.csig1 * csig12 - self.ssig1 * ssig12;
                let b12 = sin_series(ssig2, csig2, c1a);
                let serr = (1. + a1m1) * (sig12 + (b12 - b11)) - s12 / self.b;
                sig12 - serr / (1. + self.k2 * ssig2.powi(2)).sqrt()
            }
            Integrals::Exact { ell, e0, e1, .. } => {
                let tau12 = s12 / (self.b * e0);
                let (s, c) = tau12.sin_cos();
                // tau2 = tau1 + tau12, and E2 is the periodic part at sig2
                let e2 = -ell.delta_e_inv(self.stau1 * c + self.ctau1 * s, self.ctau1 * c - self.stau1 * s);
                tau12 - (e2 - e1)
            }
        }
    }

    fn gen_position(&self, arcmode: bool, s12_a12: f64) -> DirectSolution {
        let (sig12, ssig12, csig12) = if arcmode {
            // Interpret s12_a12 as spherical arc length
            let (ssig12, csig12) = s12_a12.sincosd();
            (s12_a12.to_radians(), ssig12, csig12)
        } else {
            // Interpret s12_a12 as distance
            let sig12 = self.arc_for_distance(s12_a12);
            let (ssig12, csig12) = sig12.sin_cos();
            (sig12, ssig12, csig12)
        };

        // sig2 = sig1 + sig12
        let ssig2 = self.ssig1 * csig12 + self.csig1 * ssig12;
        let mut csig2 = self.csig1 * csig12 - self.ssig1 * ssig12;
        let dn2 = (1. + self.k2 * ssig2.powi(2)).sqrt();
        // Distance past the secular term, and the secular coefficient
        let (ab1, scale) = match &self.integrals {
            Integrals::Series { a1m1, b11, c1a, .. } => {
                ((1. + a1m1) * (sin_series(ssig2, csig2, c1a) - b11), 1. + a1m1)
            }
            Integrals::Exact { ell, e0, e1, .. } => (e0 * (ell.delta_e(ssig2, csig2, dn2) - e1), *e0),
        };

        // sin(bet2) = cos(alp0) * sin(sig2)
        let sbet2 = self.calp0 * ssig2;
        // Alt: cbet2 = hypot(csig2, salp0 * ssig2);
        let mut cbet2 = self.salp0.hypot(self.calp0 * csig2);
        if cbet2 == 0. {
            // I.e., salp0 = 0, csig2 = 0. Break the degeneracy in this case
            cbet2 = geodesic::tiny();
            csig2 = cbet2;
        }
        // tan(alp0) = cos(sig2)*tan(alp2). No need to normalize
        let salp2 = self.salp0;
        let calp2 = self.calp0 * csig2;

        let s12 = if arcmode { self.b * (scale * sig12 + ab1) } else { s12_a12 };

        // tan(omg2) = sin(alp0) * tan(sig2). No need to normalize
        let somg2 = self.salp0 * ssig2;
        let comg2 = csig2;
        let (lam12, j12) = match &self.integrals {
            Integrals::Series { a1m1, a2m1, a3c, b21, b31, c2a, c3a, .. } => {
                // omg12 = omg2 - omg1
                let omg12 = (somg2 * self.comg1 - comg2 * self.somg1).atan2(comg2 * self.comg1 + somg2 * self.somg1);
                let lam12 = omg12 + a3c * (sig12 + (sin_series(ssig2, csig2, c3a) - b31));
                let ab2 = (1. + a2m1) * (sin_series(ssig2, csig2, c2a) - b21);
                (lam12, (a1m1 - a2m1) * sig12 + (ab1 - ab2))
            }
            Integrals::Exact { ell, d0, d1, h0, h1, cchi1, .. } => {
                // chi12 = chi2 - chi1, with schi = somg
                let cchi2 = self.f1 * dn2 * comg2;
                let chi12 = (somg2 * cchi1 - cchi2 * self.somg1).atan2(cchi2 * cchi1 + somg2 * self.somg1);
                let lam12 = chi12 + h0 * (sig12 + (ell.delta_h(ssig2, csig2, dn2) - h1));
                (lam12, d0 * (sig12 + (ell.delta_d(ssig2, csig2, dn2) - d1)))
            }
        };
        let lon12 = lam12.to_degrees();
        let lon2 = (self.lon1.ang_normalize() + lon12.ang_normalize()).ang_normalize();

        let lat2 = atan2d(sbet2, self.f1 * cbet2);
        let azi2 = atan2d(salp2, calp2);

        // Keep the parens around (csig1 * ssig2) and (ssig1 * csig2) for
        // accurate cancellation in the case of coincident points.
        let m12 = self.b * ((dn2 * (self.csig1 * ssig2) - self.dn1 * (self.ssig1 * csig2)) - self.csig1 * csig2 * j12);

        DirectSolution {
            destination: LatLon::new(lat2, lon2),
            azimuth: azi2,
            distance: s12,
            arc_length: if arcmode { s12_a12 } else { sig12.to_degrees() },
            reduced_length: m12,
        }
    }

    /// The point `distance` meters along the line; negative distances go
    /// backwards from the origin.
    pub fn position(&self, distance: f64) -> DirectSolution {
        self.gen_position(false, distance)
    }

    /// The point `arc_length` degrees along the line, measured on the
    /// auxiliary sphere.
    pub fn arc_position(&self, arc_length: f64) -> DirectSolution {
        self.gen_position(true, arc_length)
    }

    #[inline]
    pub fn origin(&self) -> LatLon {
        LatLon::new(self.lat1, self.lon1)
    }

    /// Azimuth at the origin, degrees in `[-180, 180]`.
    #[inline]
    pub fn azimuth(&self) -> f64 {
        self.azi1
    }

    /// Azimuth where the line crosses the equator heading north.
    pub fn equatorial_azimuth(&self) -> f64 {
        atan2d(self.salp0, self.calp0)
    }

    /// Length in meters of the segment this line was built from, if any.
    #[inline]
    pub fn distance(&self) -> Option<f64> {
        self.s13
    }

    /// Arc length in degrees of the segment this line was built from, if
    /// any.
    #[inline]
    pub fn arc_length(&self) -> Option<f64> {
        self.a13
    }

    #[inline]
    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::geodesic::WGS84;

    fn point(lat: f64, lon: f64) -> LatLon {
        LatLon::create(lat, lon).unwrap()
    }

    #[test]
    fn unit_line() {
        assert_eq!(UNIT.distance(), Some(1.));
        assert_eq!(UNIT.origin(), point(0., 0.));
        assert_eq!(UNIT.azimuth(), 0.);
        let end = UNIT.position(1.);
        assert!(end.destination.latitude() > 0.);
        assert_abs_diff_eq!(end.destination.longitude(), 0., epsilon = 1e-15);
        assert_eq!(Some(end.arc_length), UNIT.arc_length());
        // The meridian radius of curvature on the equator is a (1 - e^2)
        let wgs84 = Ellipsoid::WGS84;
        let meridian_radius = wgs84.equatorial_radius() * (1. - wgs84.eccentricity_squared());
        assert_abs_diff_eq!(end.destination.latitude(), (1. / meridian_radius).to_degrees(), epsilon = 1e-14);
    }

    #[test]
    fn positions_match_direct_problems() {
        let origin = point(-12., 55.);
        let line = WGS84.line(&origin, 63.);
        for s in [-3e6, 0., 1e3, 7.5e6, 1.5e7] {
            let direct = WGS84.direct(&origin, 63., s);
            let position = line.position(s);
            assert_eq!(position, direct);
        }
        let start = line.position(0.);
        assert_abs_diff_eq!(start.destination.latitude(), -12., epsilon = 1e-13);
        assert_abs_diff_eq!(start.azimuth, 63., epsilon = 1e-13);
    }

    #[test]
    fn arc_mode_agrees_with_distance_mode() {
        let line = WGS84.line(&point(35., -100.), -20.);
        let by_distance = line.position(4e6);
        let by_arc = line.arc_position(by_distance.arc_length);
        assert_abs_diff_eq!(by_arc.distance, 4e6, epsilon = 1e-7);
        assert_abs_diff_eq!(by_arc.destination.latitude(), by_distance.destination.latitude(), epsilon = 1e-12);
        assert_abs_diff_eq!(by_arc.destination.longitude(), by_distance.destination.longitude(), epsilon = 1e-12);
    }

    #[test]
    fn inverse_line_reaches_the_second_point() {
        let p1 = point(-30., 0.);
        let p2 = point(29.9, 179.8);
        let line = WGS84.inverse_line(&p1, &p2);
        let inverse = WGS84.inverse(&p1, &p2);
        assert_abs_diff_eq!(line.distance().unwrap(), inverse.distance, epsilon = 1e-6);
        assert_eq!(line.arc_length(), Some(inverse.arc_length));
        assert_abs_diff_eq!(line.azimuth(), inverse.azimuth1, epsilon = 1e-12);
        let end = line.arc_position(inverse.arc_length);
        assert_abs_diff_eq!(end.destination.latitude(), 29.9, epsilon = 1e-9);
        assert_abs_diff_eq!(end.destination.longitude(), 179.8, epsilon = 1e-9);
        assert_abs_diff_eq!(end.azimuth, inverse.azimuth2, epsilon = 1e-9);
    }

    #[test]
    fn direct_line_records_its_segment() {
        let line = WGS84.direct_line(&point(40., 0.), 30., 1e7);
        assert_eq!(line.distance(), Some(1e7));
        assert!(line.arc_length().unwrap() > 89. && line.arc_length().unwrap() < 91.);
        assert!(WGS84.line(&point(40., 0.), 30.).distance().is_none());
    }

    #[test]
    fn equatorial_azimuth_is_steepest_crossing() {
        let line = WGS84.line(&point(0., 0.), 30.);
        assert_abs_diff_eq!(line.equatorial_azimuth(), 30., epsilon = 1e-12);
        let line = WGS84.line(&point(60., 0.), 90.);
        // Clairaut: sin(alp0) = cos(beta1)
        let beta = ((1. - Ellipsoid::WGS84.flattening()) * 60_f64.to_radians().tan()).atan();
        assert_abs_diff_eq!(line.equatorial_azimuth().to_radians().sin(), beta.cos(), epsilon = 1e-12);
    }
}
