//! Exact transverse Mercator projection following Lee's formulation in
//! terms of Jacobi elliptic functions. Slower than the series, but accurate
//! over the whole ellipsoid and able to map the extended domain.

use std::f64::consts::FRAC_PI_2;
use std::f64::consts::PI;

use crate::{elliptic::EllipticFunction, utility::{dms, GeoMath}, Ellipsoid, ThisOrThat};

use super::{GeographicPoint, ProjectedPoint};

const NUMIT: usize = 10;

#[derive(Clone, Copy, Debug)]
pub(crate) struct TransverseMercatorExact {
    a: f64,
    k0: f64,
    extended: bool,
    // e^2, 1 - e^2 and e
    mu: f64,
    mv: f64,
    e: f64,
    eu: EllipticFunction,
    ev: EllipticFunction,
}

/// Thompson coordinates `w = u + i v` with the Jacobi functions of both parts.
struct Jacobi {
    snu: f64,
    cnu: f64,
    dnu: f64,
    snv: f64,
    cnv: f64,
    dnv: f64,
}

impl TransverseMercatorExact {
    /// The ellipsoid must be oblate; callers check this.
    pub fn new(ellipsoid: &Ellipsoid, k0: f64, extended: bool) -> TransverseMercatorExact {
        let mu = ellipsoid.e2;
        let mv = 1. - mu;
        Self {
            a: ellipsoid.a,
            k0,
            extended,
            mu,
            mv,
            e: mu.sqrt(),
            eu: EllipticFunction::new(mu),
            ev: EllipticFunction::new(mv),
        }
    }

    fn jacobi(&self, u: f64, v: f64) -> Jacobi {
        let (snu, cnu, dnu) = self.eu.sncndn(u);
        let (snv, cnv, dnv) = self.ev.sncndn(v);
        Jacobi { snu, cnu, dnu, snv, cnv, dnv }
    }

    /// `(taup, lambda)` as a function of `w`, Lee 54.17.
    fn zeta(&self, j: &Jacobi) -> (f64, f64) {
        let overflow = 1. / f64::EPSILON.powi(2);
        let d1 = (j.cnu.powi(2) + self.mv * (j.snu * j.snv).powi(2)).sqrt();
        let d2 = (self.mu * j.cnu.powi(2) + self.mv * j.cnv.powi(2)).sqrt();
        let t1 = if d1 != 0. {
            j.snu * j.dnv / d1
        } else {
            j.snu.is_sign_negative().ternary(-overflow, overflow)
        };
        let t2 = if d2 != 0. {
            (self.e * (self.e * j.snu / d2).asinh()).sinh()
        } else {
            j.snu.is_sign_negative().ternary(-overflow, overflow)
        };
        let taup = t1 * 1_f64.hypot(t2) - t2 * 1_f64.hypot(t1);
        let lam = if d1 != 0. && d2 != 0. {
            (j.dnu * j.snv).atan2(j.cnu * j.cnv) - self.e * (self.e * j.cnu * j.snv).atan2(j.dnu * j.cnv)
        } else {
            0.
        };
        (taup, lam)
    }

    /// Reciprocal of the derivative of `zeta`, Lee 54.21.
    fn dwdzeta(&self, j: &Jacobi) -> (f64, f64) {
        let d = self.mv * (j.cnv.powi(2) + self.mu * (j.snu * j.snv).powi(2)).powi(2);
        let du = j.cnu * j.dnu * j.dnv * (j.cnv.powi(2) - self.mu * (j.snu * j.snv).powi(2)) / d;
        let dv = -j.snu * j.snv * j.cnv * ((j.dnu * j.dnv).powi(2) + self.mu * j.cnu.powi(2)) / d;
        (du, dv)
    }

    /// Starting guess for inverting `zeta`. Returns `true` when the guess is
    /// already accurate enough.
    fn zetainv0(&self, psi: f64, lam: f64) -> (f64, f64, bool) {
        let taytol = f64::EPSILON.powf(0.6);
        let e = self.e;
        if psi < -e * PI / 4. && lam > (1. - 2. * e) * FRAC_PI_2 && psi < lam - (1. - e) * FRAC_PI_2 {
            // Log singularity at the south pole
            let psix = 1. - psi / e;
            let lamx = (FRAC_PI_2 - lam) / e;
            let u = (lamx.sin() / lamx.cos().hypot(psix.sinh())).asinh() * (1. + self.mu / 2.);
            let v = lamx.cos().atan2(psix.sinh()) * (1. + self.mu / 2.);
            (self.eu.k() - u, self.ev.k() - v, false)
        } else if psi < e * FRAC_PI_2 && lam > (1. - 2. * e) * FRAC_PI_2 {
            // Taylor series about w0 = i Ev.K(), where zeta' = zeta'' = 0
            let dlam = lam - (1. - e) * FRAC_PI_2;
            let rad = psi.hypot(dlam);
            let ang = (dlam - psi).atan2(psi + dlam) - 0.75 * PI;
            let done = rad < e * taytol;
            let rad = (3. / (self.mv * e) * rad).cbrt();
            let ang = ang / 3.;
            (rad * ang.cos(), rad * ang.sin() + self.ev.k(), done)
        } else {
            // Spherical transverse Mercator, scaled so the pole lands on Eu.K()
            let v = (lam.sin() / lam.cos().hypot(psi.sinh())).asinh();
            let u = psi.sinh().atan2(lam.cos());
            let scale = self.eu.k() / FRAC_PI_2;
            (u * scale, v * scale, false)
        }
    }

    /// Invert `zeta` by Newton's method.
    fn zetainv(&self, taup: f64, lam: f64) -> (f64, f64) {
        let tol2 = 0.1 * f64::EPSILON;
        let psi = taup.asinh();
        let scal = 1. / 1_f64.hypot(taup);
        let (mut u, mut v, done) = self.zetainv0(psi, lam);
        if done {
            return (u, v);
        }
        let stol2 = tol2 / psi.max(1.).powi(2);
        let mut trip = false;
        for _ in 0..NUMIT {
            let j = self.jacobi(u, v);
            let (tau1, lam1) = self.zeta(&j);
            let (du1, dv1) = self.dwdzeta(&j);
            let tau1 = (tau1 - taup) * scal;
            let lam1 = lam1 - lam;
            let delu = tau1 * du1 - lam1 * dv1;
            let delv = tau1 * dv1 + lam1 * du1;
            u -= delu;
            v -= delv;
            if trip {
                break;
            }
            let delw2 = delu.powi(2) + delv.powi(2);
            if !(delw2 >= stol2) {
                trip = true;
            }
        }
        (u, v)
    }

    /// `(xi, eta)` as a function of `w`, Lee 55.4.
    fn sigma(&self, v: f64, j: &Jacobi) -> (f64, f64) {
        let d = self.mu * j.cnu.powi(2) + self.mv * j.cnv.powi(2);
        let xi = self.eu.e_jacobi(j.snu, j.cnu, j.dnu) - self.mu * j.snu * j.cnu * j.dnu / d;
        let eta = v - self.ev.e_jacobi(j.snv, j.cnv, j.dnv) + self.mv * j.snv * j.cnv * j.dnv / d;
        (xi, eta)
    }

    /// Reciprocal of the derivative of `sigma`, Lee 55.9.
    fn dwdsigma(&self, j: &Jacobi) -> (f64, f64) {
        let d = self.mv * (j.cnv.powi(2) + self.mu * (j.snu * j.snv).powi(2)).powi(2);
        let dnr = j.dnu * j.cnv * j.dnv;
        let dni = -self.mu * j.snu * j.cnu * j.snv;
        ((dnr.powi(2) - dni.powi(2)) / d, 2. * dnr * dni / d)
    }

    fn sigmainv0(&self, xi: f64, eta: f64) -> (f64, f64, bool) {
        let taytol = f64::EPSILON.powf(0.6);
        if eta > 1.25 * self.ev.ke() || (xi < -0.25 * self.eu.e() && xi < eta - self.ev.ke()) {
            // Simple pole at w0 = Eu.K() + i Ev.K()
            let x = xi - self.eu.e();
            let y = eta - self.ev.ke();
            let r2 = x.powi(2) + y.powi(2);
            (self.eu.k() + x / r2, self.ev.k() - y / r2, false)
        } else if (eta > 0.75 * self.ev.ke() && xi < 0.25 * self.eu.e()) || eta > self.ev.ke() {
            // Taylor series about w0 = i Ev.K()
            let deta = eta - self.ev.ke();
            let rad = xi.hypot(deta);
            let ang = (deta - xi).atan2(xi + deta) - 0.75 * PI;
            let done = rad < 2. * taytol;
            let rad = (3. / self.mv * rad).cbrt();
            let ang = ang / 3.;
            (rad * ang.cos(), rad * ang.sin() + self.ev.k(), done)
        } else {
            let scale = self.eu.k() / self.eu.e();
            (xi * scale, eta * scale, false)
        }
    }

    /// Invert `sigma` by Newton's method.
    fn sigmainv(&self, xi: f64, eta: f64) -> (f64, f64) {
        let tol2 = 0.1 * f64::EPSILON;
        let (mut u, mut v, done) = self.sigmainv0(xi, eta);
        if done {
            return (u, v);
        }
        let mut trip = false;
        for _ in 0..NUMIT {
            let j = self.jacobi(u, v);
            let (xi1, eta1) = self.sigma(v, &j);
            let (du1, dv1) = self.dwdsigma(&j);
            let xi1 = xi1 - xi;
            let eta1 = eta1 - eta;
            let delu = xi1 * du1 - eta1 * dv1;
            let delv = xi1 * dv1 + eta1 * du1;
            u -= delu;
            v -= delv;
            if trip {
                break;
            }
            let delw2 = delu.powi(2) + delv.powi(2);
            if !(delw2 >= tol2) {
                trip = true;
            }
        }
        (u, v)
    }

    /// Meridian convergence (radians) and scale, without the factor `k0`.
    fn scale(&self, tau: f64, j: &Jacobi) -> (f64, f64) {
        let sec2 = 1. + tau.powi(2);
        let gamma = (self.mv * j.snu * j.snv * j.cnv).atan2(j.cnu * j.dnu * j.dnv);
        let k = (self.mv + self.mu / sec2).sqrt()
            * sec2.sqrt()
            * ((self.mv * j.snv.powi(2) + (j.cnu * j.dnv).powi(2))
                / (self.mu * j.cnu.powi(2) + self.mv * j.cnv.powi(2)))
            .sqrt();
        (gamma, k)
    }

    pub fn forward(&self, lon0: f64, lat: f64, lon: f64) -> ProjectedPoint {
        let qd = f64::from(dms::QD);
        let mut lon = lon0.ang_diff(lon);
        let mut lat = lat;

        let mut latsign = (!self.extended && lat.is_sign_negative()).ternary(-1., 1.);
        let lonsign = (!self.extended && lon.is_sign_negative()).ternary(-1., 1.);
        lon *= lonsign;
        lat *= latsign;
        let backside = !self.extended && lon > qd;
        if backside {
            if lat == 0. {
                latsign = -1.;
            }
            lon = 2. * qd - lon;
        }
        let lam = lon.to_radians();
        let tau = lat.tand();

        let (u, v) = if lat == qd {
            (self.eu.k(), 0.)
        } else if lat == 0. && lon == qd * (1. - self.e) {
            (0., self.ev.k())
        } else {
            self.zetainv(tau.taupf(self.e), lam)
        };

        let j = self.jacobi(u, v);
        let (mut xi, eta) = self.sigma(v, &j);
        if backside {
            xi = 2. * self.eu.e() - xi;
        }
        let y = xi * self.a * self.k0 * latsign;
        let x = eta * self.a * self.k0 * lonsign;

        let (mut gamma, k) = if lat == qd {
            (lon, 1.)
        } else {
            // Recompute (tau, lam) from (u, v) for an accurate scale
            let (taup, _) = self.zeta(&j);
            let (gamma, k) = self.scale(taup.tauf(self.e), &j);
            (gamma.to_degrees(), k)
        };
        if backside {
            gamma = 2. * qd - gamma;
        }
        gamma *= latsign * lonsign;

        ProjectedPoint { x, y, convergence: gamma, scale: k * self.k0 }
    }

    pub fn reverse(&self, lon0: f64, x: f64, y: f64) -> GeographicPoint {
        let qd = f64::from(dms::QD);
        let mut xi = y / (self.a * self.k0);
        let mut eta = x / (self.a * self.k0);

        let xisign = (!self.extended && xi.is_sign_negative()).ternary(-1., 1.);
        let etasign = (!self.extended && eta.is_sign_negative()).ternary(-1., 1.);
        xi *= xisign;
        eta *= etasign;
        let backside = !self.extended && xi > self.eu.e();
        if backside {
            xi = 2. * self.eu.e() - xi;
        }

        let (u, v) = if xi == 0. && eta == self.ev.ke() {
            (0., self.ev.k())
        } else {
            self.sigmainv(xi, eta)
        };

        let j = self.jacobi(u, v);
        let (mut lat, mut lon, mut gamma, k) = if v != 0. || u != self.eu.k() {
            let (taup, lam) = self.zeta(&j);
            let tau = taup.tauf(self.e);
            let (gamma, k) = self.scale(tau, &j);
            (tau.atand(), lam.to_degrees(), gamma.to_degrees(), k)
        } else {
            (qd, 0., 0., 1.)
        };

        if backside {
            lon = 2. * qd - lon;
        }
        lon *= etasign;
        lon = (lon + lon0.ang_normalize()).ang_normalize();
        lat *= xisign;
        if backside {
            gamma = 2. * qd - gamma;
        }
        gamma *= xisign * etasign;

        GeographicPoint { latitude: lat, longitude: lon, convergence: gamma, scale: k * self.k0 }
    }
}
