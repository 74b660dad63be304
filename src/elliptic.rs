//! Complete and incomplete elliptic integrals together with the Jacobi
//! elliptic functions, as needed by the exact transverse Mercator projection,
//! the exact geodesic and exact rhumb lines. The integrals are evaluated
//! with Carlson's symmetric forms.

use std::f64::consts::{FRAC_PI_2, PI};

use crate::ThisOrThat;

// Maximum number of Landen steps in sncndn
const NUM: usize = 13;

/// Elliptic functions for a fixed parameter `k2` (the modulus squared) and,
/// for the integral of the third kind, characteristic `alpha2`.
///
/// Negative parameters are allowed. The geodesic and rhumb line code rely on
/// them, since `E(phi, -k2)` is the arc length of a meridian ellipse.
#[derive(Clone, Copy, Debug)]
pub(crate) struct EllipticFunction {
    k2: f64,
    kp2: f64,
    alphap2: f64,
    // (1 - kp)/(1 + kp), starting guess for the inverse of E
    eps: f64,
    // Complete integrals K(k), E(k), K(k) - E(k), D(k) and H(alpha, k)
    kc: f64,
    ec: f64,
    kec: f64,
    dc: f64,
    hc: f64,
}

impl EllipticFunction {
    pub fn new(k2: f64) -> EllipticFunction {
        Self::with_alpha(k2, 0.)
    }

    pub fn with_alpha(k2: f64, alpha2: f64) -> EllipticFunction {
        let kp2 = 1. - k2;
        let alphap2 = 1. - alpha2;
        let (kc, ec, dc) = if kp2 == 0. {
            (f64::INFINITY, 1., f64::INFINITY)
        } else {
            (rf2(kp2, 1.), 2. * rg2(kp2, 1.), rd(0., kp2, 1.) / 3.)
        };
        let kec = if k2 == 0. { 0. } else { k2 * dc };
        // With alpha2 = 0 the integrand cos^2 / Delta splits into F - D
        let hc = if alpha2 == 0. {
            kc - dc
        } else {
            rf(0., kp2, 1.) - alphap2 * rj(0., kp2, 1., alphap2) / 3.
        };
        let eps = k2 / (kp2.sqrt() + 1.).powi(2);

        Self { k2, kp2, alphap2, eps, kc, ec, kec, dc, hc }
    }

    /// Complete integral of the first kind, `K(k)`.
    #[inline]
    pub fn k(&self) -> f64 {
        self.kc
    }

    /// Complete integral of the second kind, `E(k)`.
    #[inline]
    pub fn e(&self) -> f64 {
        self.ec
    }

    /// `K(k) - E(k)` computed without cancellation.
    #[inline]
    pub fn ke(&self) -> f64 {
        self.kec
    }

    /// Complete integral `D(k) = (K(k) - E(k)) / k^2`.
    #[inline]
    pub fn d(&self) -> f64 {
        self.dc
    }

    /// Complete integral `H(alpha, k)` of `cos^2 / ((1 - alpha^2 sin^2) Delta)`.
    #[inline]
    pub fn h(&self) -> f64 {
        self.hc
    }

    /// `Delta = sqrt(1 - k^2 sin^2)`.
    #[inline]
    pub fn delta(&self, sn: f64, cn: f64) -> f64 {
        (self.k2 < 0.).ternary_lazy(|| (1. - self.k2 * sn * sn).sqrt(), || (self.kp2 + self.k2 * cn * cn).sqrt())
    }

    /// The Jacobi elliptic functions `(sn(x), cn(x), dn(x))` by Bulirsch's
    /// descending Landen transformation.
    pub fn sncndn(&self, x: f64) -> (f64, f64, f64) {
        let tol_jac = (f64::EPSILON * 0.01).sqrt();
        if self.kp2 == 0. {
            let cn = 1. / x.cosh();
            return (x.tanh(), cn, cn);
        }

        let mut x = x;
        let mut mc = self.kp2;
        let mut d = 0.;
        if self.kp2 < 0. {
            d = 1. - mc;
            mc /= -d;
            d = d.sqrt();
            x *= d;
        }

        let mut m = [0_f64; NUM];
        let mut n = [0_f64; NUM];
        let mut c = 0.;
        let mut l = 0;
        let mut a = 1.;
        while l < NUM {
            m[l] = a;
            mc = mc.sqrt();
            n[l] = mc;
            c = (a + mc) / 2.;
            if !((a - mc).abs() > tol_jac * a) {
                l += 1;
                break;
            }
            mc *= a;
            a = c;
            l += 1;
        }

        x *= c;
        let mut sn = x.sin();
        let mut cn = x.cos();
        let mut dn = 1.;
        if sn != 0. {
            let mut a = cn / sn;
            c *= a;
            while l > 0 {
                l -= 1;
                let b = m[l];
                a *= c;
                c *= dn;
                dn = (n[l] + a) / (b + a);
                a = c / b;
            }
            a = 1. / (c * c + 1.).sqrt();
            sn = a.copysign(sn);
            cn = c * sn;
            if self.kp2 < 0. {
                std::mem::swap(&mut cn, &mut dn);
                sn /= d;
            }
        }
        (sn, cn, dn)
    }

    /// Incomplete integral of the second kind in terms of the Jacobi
    /// functions of its argument. Extended to all real arguments through
    /// `E(-x) = -E(x)` and `E(x + 2K) = E(x) + 2E`.
    pub fn e_jacobi(&self, sn: f64, cn: f64, dn: f64) -> f64 {
        let (cn2, dn2, sn2) = (cn * cn, dn * dn, sn * sn);
        let ei = if cn2 == 0. {
            self.e()
        } else if self.k2 <= 0. {
            sn.abs() * (rf(cn2, dn2, 1.) - self.k2 * sn2 * rd(cn2, dn2, 1.) / 3.)
        } else if self.kp2 >= 0. {
            sn.abs()
                * (self.kp2 * rf(cn2, dn2, 1.)
                    + self.k2 * self.kp2 * sn2 * rd(cn2, 1., dn2) / 3.
                    + self.k2 * cn.abs() / dn)
        } else {
            sn.abs() * (-self.kp2 * sn2 * rd(dn2, 1., cn2) / 3. + dn / cn.abs())
        };
        let ei = if cn.is_sign_negative() { 2. * self.e() - ei } else { ei };
        ei.copysign(sn)
    }

    /// Incomplete integral `D(phi) = (F(phi) - E(phi)) / k^2`.
    pub fn d_jacobi(&self, sn: f64, cn: f64, dn: f64) -> f64 {
        let (cn2, dn2, sn2) = (cn * cn, dn * dn, sn * sn);
        let di = if cn2 == 0. {
            self.dc
        } else {
            sn.abs() * sn2 * rd(cn2, dn2, 1.) / 3.
        };
        let di = if cn.is_sign_negative() { 2. * self.dc - di } else { di };
        di.copysign(sn)
    }

    /// Incomplete integral `H(phi)`, the third kind counterpart of
    /// [`EllipticFunction::h`].
    pub fn h_jacobi(&self, sn: f64, cn: f64, dn: f64) -> f64 {
        let (cn2, dn2, sn2) = (cn * cn, dn * dn, sn * sn);
        let hi = if cn2 == 0. {
            self.hc
        } else {
            sn.abs() * (rf(cn2, dn2, 1.) - self.alphap2 * sn2 * rj(cn2, dn2, 1., cn2 + self.alphap2 * sn2) / 3.)
        };
        let hi = if cn.is_sign_negative() { 2. * self.hc - hi } else { hi };
        hi.copysign(sn)
    }

    /// The periodic part of an incomplete integral: `X(phi) (pi/2) / X - phi`.
    /// Its period is `pi`.
    fn periodic(sn: f64, cn: f64, integral: impl Fn(f64, f64) -> f64, complete: f64) -> f64 {
        let (sn, cn) = if cn.is_sign_negative() { (-sn, -cn) } else { (sn, cn) };
        integral(sn, cn) * FRAC_PI_2 / complete - sn.atan2(cn)
    }

    pub fn delta_e(&self, sn: f64, cn: f64, dn: f64) -> f64 {
        Self::periodic(sn, cn, |sn, cn| self.e_jacobi(sn, cn, dn), self.ec)
    }

    pub fn delta_d(&self, sn: f64, cn: f64, dn: f64) -> f64 {
        Self::periodic(sn, cn, |sn, cn| self.d_jacobi(sn, cn, dn), self.dc)
    }

    pub fn delta_h(&self, sn: f64, cn: f64, dn: f64) -> f64 {
        Self::periodic(sn, cn, |sn, cn| self.h_jacobi(sn, cn, dn), self.hc)
    }

    /// The amplitude `phi` with `E(phi) = x`, by Newton's method from a
    /// first order guess.
    pub fn e_inv(&self, x: f64) -> f64 {
        let tol_jac = (f64::EPSILON * 0.01).sqrt();
        let n = (x / (2. * self.ec) + 0.5).floor();
        // x now in [-E, E)
        let x = x - 2. * self.ec * n;
        let mut phi = PI * x / (2. * self.ec);
        phi -= self.eps * (2. * phi).sin() / 2.;
        for _ in 0..NUM {
            let (sn, cn) = phi.sin_cos();
            let dn = self.delta(sn, cn);
            let err = (self.e_jacobi(sn, cn, dn) - x) / dn;
            phi -= err;
            if !(err.abs() > tol_jac) {
                break;
            }
        }
        n * PI + phi
    }

    /// Periodic part of the inverse of `E`: `sigma - tau` where
    /// `E(sigma) (pi/2) / E = tau`.
    pub fn delta_e_inv(&self, stau: f64, ctau: f64) -> f64 {
        let (stau, ctau) = if ctau.is_sign_negative() { (-stau, -ctau) } else { (stau, ctau) };
        let tau = stau.atan2(ctau);
        self.e_inv(tau * self.ec / FRAC_PI_2) - tau
    }
}

/// Carlson's symmetric integral of the first kind `R_F(x, y, z)`.
pub(crate) fn rf(x: f64, y: f64, z: f64) -> f64 {
    let tol = (3. * f64::EPSILON * 0.01).powf(1. / 8.);
    let a0 = (x + y + z) / 3.;
    let q = (a0 - x).abs().max((a0 - y).abs()).max((a0 - z).abs()) / tol;
    let (mut an, mut x0, mut y0, mut z0, mut mul) = (a0, x, y, z, 1.);
    while q >= mul * an.abs() {
        let lam = x0.sqrt() * y0.sqrt() + y0.sqrt() * z0.sqrt() + z0.sqrt() * x0.sqrt();
        an = (an + lam) / 4.;
        x0 = (x0 + lam) / 4.;
        y0 = (y0 + lam) / 4.;
        z0 = (z0 + lam) / 4.;
        mul *= 4.;
    }
    let xx = (a0 - x) / (mul * an);
    let yy = (a0 - y) / (mul * an);
    let zz = -(xx + yy);
    let e2 = xx * yy - zz * zz;
    let e3 = xx * yy * zz;

    (e3 * (6930. * e3 + e2 * (15015. * e2 - 16380.) + 17160.)
        + e2 * ((10010. - 5775. * e2) * e2 - 24024.)
        + 240_240.)
        / (240_240. * an.sqrt())
}

/// `R_F(x, y, 0)` by the arithmetic-geometric mean.
fn rf2(x: f64, y: f64) -> f64 {
    let tol = 2.7 * (f64::EPSILON * 0.01).sqrt();
    let (mut xn, mut yn) = (x.sqrt(), y.sqrt());
    if xn < yn {
        std::mem::swap(&mut xn, &mut yn);
    }
    while (xn - yn).abs() > tol * xn {
        let t = (xn + yn) / 2.;
        yn = (xn * yn).sqrt();
        xn = t;
    }
    PI / (xn + yn)
}

/// `R_G(x, y, 0)`, the complete symmetric integral of the second kind.
fn rg2(x: f64, y: f64) -> f64 {
    let tol = 2.7 * (f64::EPSILON * 0.01).sqrt();
    let x0 = x.max(y).sqrt();
    let y0 = x.min(y).sqrt();
    let (mut xn, mut yn, mut s, mut mul) = (x0, y0, 0., 0.25);
    while (xn - yn).abs() > tol * xn {
        let t = (xn + yn) / 2.;
        yn = (xn * yn).sqrt();
        xn = t;
        mul *= 2.;
        let t = xn - yn;
        s += mul * t * t;
    }
    (((x0 + y0) / 2.).powi(2) - s) * PI / (2. * (xn + yn))
}

/// Carlson's degenerate symmetric integral of the third kind `R_D(x, y, z)`.
pub(crate) fn rd(x: f64, y: f64, z: f64) -> f64 {
    let tol = (0.2 * (f64::EPSILON * 0.01)).powf(1. / 8.);
    let a0 = (x + y + 3. * z) / 5.;
    let q = (a0 - x).abs().max((a0 - y).abs()).max((a0 - z).abs()) / tol;
    let (mut an, mut x0, mut y0, mut z0, mut mul, mut s) = (a0, x, y, z, 1., 0.);
    while q >= mul * an.abs() {
        let lam = x0.sqrt() * y0.sqrt() + y0.sqrt() * z0.sqrt() + z0.sqrt() * x0.sqrt();
        s += 1. / (mul * z0.sqrt() * (z0 + lam));
        an = (an + lam) / 4.;
        x0 = (x0 + lam) / 4.;
        y0 = (y0 + lam) / 4.;
        z0 = (z0 + lam) / 4.;
        mul *= 4.;
    }
    let xx = (a0 - x) / (mul * an);
    let yy = (a0 - y) / (mul * an);
    let zz = -(xx + yy) / 3.;
    let e2 = xx * yy - 6. * zz * zz;
    let e3 = (3. * xx * yy - 8. * zz * zz) * zz;
    let e4 = 3. * (xx * yy - zz * zz) * zz * zz;
    let e5 = xx * yy * zz * zz * zz;

    ((471_240. - 540_540. * e2) * e5
        + (612_612. * e2 - 540_540. * e3 - 556_920.) * e4
        + e3 * (306_306. * e3 + e2 * (675_675. * e2 - 706_860.) + 680_680.)
        + e2 * ((417_690. - 255_255. * e2) * e2 - 875_160.)
        + 4_084_080.)
        / (4_084_080. * mul * an * an.sqrt())
        + 3. * s
}

/// Carlson's degenerate integral `R_C(x, y)`, for `x >= 0` and `y != 0`.
fn rc(x: f64, y: f64) -> f64 {
    if !(x >= y) {
        // x < y, and NaNs
        ((y - x) / x).sqrt().atan() / (y - x).sqrt()
    } else if x == y {
        1. / y.sqrt()
    } else {
        let t = (y > 0.).ternary_lazy(|| ((x - y) / y).sqrt(), || (-x / y).sqrt());
        t.asinh() / (x - y).sqrt()
    }
}

/// Carlson's symmetric integral of the third kind `R_J(x, y, z, p)`.
pub(crate) fn rj(x: f64, y: f64, z: f64, p: f64) -> f64 {
    let tol = (0.2 * (f64::EPSILON * 0.01)).powf(1. / 8.);
    let a0 = (x + y + z + 2. * p) / 5.;
    let delta = (p - x) * (p - y) * (p - z);
    let q = (a0 - x).abs().max((a0 - y).abs()).max((a0 - z).abs()).max((a0 - p).abs()) / tol;
    let (mut an, mut x0, mut y0, mut z0, mut p0) = (a0, x, y, z, p);
    let (mut mul, mut mul3, mut s) = (1., 1., 0.);
    while q >= mul * an.abs() {
        let lam = x0.sqrt() * y0.sqrt() + y0.sqrt() * z0.sqrt() + z0.sqrt() * x0.sqrt();
        let d0 = (p0.sqrt() + x0.sqrt()) * (p0.sqrt() + y0.sqrt()) * (p0.sqrt() + z0.sqrt());
        let e0 = delta / (mul3 * d0.powi(2));
        s += rc(1., 1. + e0) / (mul * d0);
        an = (an + lam) / 4.;
        x0 = (x0 + lam) / 4.;
        y0 = (y0 + lam) / 4.;
        z0 = (z0 + lam) / 4.;
        p0 = (p0 + lam) / 4.;
        mul *= 4.;
        mul3 *= 64.;
    }
    let xx = (a0 - x) / (mul * an);
    let yy = (a0 - y) / (mul * an);
    let zz = (a0 - z) / (mul * an);
    let pp = -(xx + yy + zz) / 2.;
    let e2 = xx * yy + xx * zz + yy * zz - 3. * pp * pp;
    let e3 = xx * yy * zz + 2. * pp * (e2 + 2. * pp * pp);
    let e4 = (2. * xx * yy * zz + pp * (e2 + 3. * pp * pp)) * pp;
    let e5 = xx * yy * zz * pp * pp;

    ((471_240. - 540_540. * e2) * e5
        + (612_612. * e2 - 540_540. * e3 - 556_920.) * e4
        + e3 * (306_306. * e3 + e2 * (675_675. * e2 - 706_860.) + 680_680.)
        + e2 * ((417_690. - 255_255. * e2) * e2 - 875_160.)
        + 4_084_080.)
        / (4_084_080. * mul * an * an.sqrt())
        + 6. * s
}
