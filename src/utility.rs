//! Angle arithmetic shared by the solvers and projections. Angles are in
//! degrees unless a name says otherwise.

use crate::ThisOrThat;

pub(crate) mod dms {
    /// Degrees per quarter turn
    pub const QD: i32 = 90;
    /// Degrees per half turn
    pub const HD: i32 = 2 * QD;
    /// Degrees per turn
    pub const TD: i32 = 2 * HD;
}

/// Error-free sum: `s = round(u + v)` and `t` the rounding error so that
/// `s + t == u + v` exactly.
pub(crate) fn special_sum(u: f64, v: f64) -> (f64, f64) {
    let s = u + v;
    let up = s - v;
    let vpp = s - up;

    let up = up - u;
    let vpp = vpp - v;

    let t = (s == 0.).ternary_lazy(|| s, || -(up + vpp));

    (s, t)
}

/// Evaluate a polynomial whose coefficients are in decreasing powers of `x`
pub(crate) fn polyval(p: &[f64], x: f64) -> f64 {
    p
        .iter()
        .fold(0_f64, |acc, val| acc*x + val)
}

/// `atan2(y, x)` in degrees, exact for multiples of 45 degrees. The result
/// is in `[-180, 180]`.
pub(crate) fn atan2d(y: f64, x: f64) -> f64 {
    // Reduce to the first octant before calling atan2 so that the result
    // keeps full precision and atan2d(+-0, -1) gives +-180.
    let (mut y, mut x) = (y, x);
    let mut q = 0;
    if y.abs() > x.abs() {
        std::mem::swap(&mut x, &mut y);
        q = 2;
    }
    if x.is_sign_negative() {
        x = -x;
        q += 1;
    }

    let ang = y.atan2(x).to_degrees();
    match q {
        1 => f64::from(dms::HD).copysign(y) - ang,
        2 => f64::from(dms::QD) - ang,
        3 => -f64::from(dms::QD) + ang,
        _ => ang,
    }
}

/// Normalize the vector `(x, y)` to unit length.
pub(crate) fn norm(x: f64, y: f64) -> (f64, f64) {
    let r = x.hypot(y);
    (x / r, y / r)
}

/// Sine and cosine for the quadrant `q` given the reduced values.
fn quadrant(q: i64, s: f64, c: f64) -> (f64, f64) {
    match q.rem_euclid(4) {
        0 => (s, c),
        1 => (c, -s),
        2 => (-s, -c),
        _ => (-c, s),
    }
}

/// Splits `x` into `(r, q)` with `x = r + 90 q` and `|r| <= 45`.
fn reduce_quarter(x: f64) -> (f64, i64) {
    let qd = f64::from(dms::QD);
    // fmod is exact, so the reduction loses nothing
    let r = x % f64::from(dms::TD);
    let q = (r / qd).round_ties_even();
    (r - q * qd, q as i64)
}

pub(crate) trait GeoMath {
    fn ang_normalize(&self) -> Self;
    fn ang_diff(&self, other: Self) -> Self;
    fn ang_diff_err(&self, other: Self) -> (Self, Self)
    where
        Self: Sized;
    fn ang_round(&self) -> Self;
    fn lat_fix(&self) -> Self;
    fn sincosd(&self) -> (Self, Self)
    where
        Self: Sized;
    fn sincosde(&self, t: Self) -> (Self, Self)
    where
        Self: Sized;
    fn tand(&self) -> Self;
    fn atand(&self) -> Self;
    fn eatanhe(&self, es: Self) -> Self;
    fn remainder(&self, denom: Self) -> Self;
    fn taupf(&self, es: Self) -> Self;
    fn tauf(&self, es: Self) -> Self;
}

impl GeoMath for f64 {
    /// Reduce an angle to `[-180, 180]`, keeping the sign of the input for
    /// odd multiples of 180.
    fn ang_normalize(&self) -> f64 {
        let value = self.remainder(f64::from(dms::TD));
        let hd = f64::from(dms::HD);

        if value.abs() == hd {
            hd.copysign(*self)
        }
        else {
            value
        }
    }

    fn ang_diff(&self, other: f64) -> f64 {
        self.ang_diff_err(other).0
    }

    /// Exact difference `other - self` reduced to `[-180, 180]`, together
    /// with the rounding error of the difference.
    fn ang_diff_err(&self, other: f64) -> (f64, f64) {
        let td = f64::from(dms::TD);
        // Use remainder instead of AngNormalize, since we treat boundary cases
        // later taking account of the error
        let (diff, err) = special_sum((-*self).remainder(td), other.remainder(td));
        // This second sum can only change d if abs(d) < 128, so don't need to
        // apply remainder yet again.
        let (diff, err) = special_sum(diff.remainder(td), err);

        let hd = f64::from(dms::HD);
        // Fix the sign if d = -180, 0, 180.
        if diff == 0. || diff.abs() == hd {
            // If e == 0, take sign from y - x
            // else (e != 0, implies d = +/-180), d and e must have opposite signs
            let sign = (err == 0.).ternary(other - *self, -err);
            (diff.copysign(sign), err)
        }
        else {
            (diff, err)
        }
    }

    /// Round tiny values so that adding them to 1/16 is exact. Avoids
    /// trouble with angles close to zero.
    fn ang_round(&self) -> f64 {
        let z = 1. / 16.;
        let mut y = self.abs();
        let w = z - y;
        if w > 0. {
            y = z - w;
        }
        y.copysign(*self)
    }

    fn lat_fix(&self) -> f64 {
        (self.abs() > f64::from(dms::QD)).ternary(f64::NAN, *self)
    }

    fn sincosd(&self) -> (f64, f64) {
        if !self.is_finite() {
            return (f64::NAN, f64::NAN);
        }
        let (r, q) = reduce_quarter(*self);
        let (s, c) = r.to_radians().sin_cos();
        let (s, c) = quadrant(q, s, c);

        ((s == 0.).ternary(s.copysign(*self), s), c + 0.)
    }

    /// Sine and cosine of `self + t` where `t` is a small correction.
    fn sincosde(&self, t: f64) -> (f64, f64) {
        if !self.is_finite() {
            return (f64::NAN, f64::NAN);
        }
        let (r, q) = reduce_quarter(*self);
        let (s, c) = (r + t).ang_round().to_radians().sin_cos();
        let (s, c) = quadrant(q, s, c);

        ((s == 0.).ternary(s.copysign(*self), s), c + 0.)
    }

    fn tand(&self) -> f64 {
        let overflow = 1. / f64::EPSILON.powi(2);
        let (s, c) = self.sincosd();
        if c != 0. {
            s / c
        } else {
            s.is_sign_negative().ternary(-overflow, overflow)
        }
    }

    fn atand(&self) -> f64 {
        atan2d(*self, 1.)
    }

    /// `es * atanh(es * x)` for oblate ellipsoids, continued to
    /// `-es * atan(es * x)` when `es` is negative (prolate).
    fn eatanhe(&self, es: f64) -> f64 {
        if es > 0. {
            es * (es * *self).atanh()
        } else {
            -es * (es * *self).atan()
        }
    }

    /// IEEE style remainder with the result in `[-denom/2, denom/2]`.
    fn remainder(&self, denom: Self) -> Self {
        let r = *self % denom;
        let half = denom.abs() / 2.;
        if r > half {
            r - denom.abs()
        } else if r < -half {
            r + denom.abs()
        } else {
            r
        }
    }

    /// Tangent of the conformal latitude given the tangent of the
    /// geographic latitude.
    fn taupf(&self, es: f64) -> f64 {
        if !self.is_finite() {
            return *self;
        }
        let tau1 = 1.0_f64.hypot(*self);
        let sig = (*self / tau1).eatanhe(es).sinh();

        1.0_f64.hypot(sig) * *self - sig * tau1
    }

    /// Inverse of [`GeoMath::taupf`] by Newton's method.
    fn tauf(&self, es: f64) -> f64 {
        let numit = 5;
        let tol = f64::EPSILON.sqrt() / 10.0;
        let taumax = 2. / f64::EPSILON.sqrt();

        // es carries the sign of e^2, negative for prolate ellipsoids
        let e2m = 1.0 - es * es.abs();
        let mut tau = if self.abs() > 70.0 {
            self * 1_f64.eatanhe(es).exp()
        } else {
            self / e2m
        };

        if !(tau.abs() < taumax) {
            return tau;
        }

        let stol = tol * self.abs().max(1.0);
        for _ in 0..numit {
            let taupa = tau.taupf(es);
            let dtau = (self - taupa) * (1.0 + e2m * tau.powi(2))
                / (e2m * 1.0_f64.hypot(tau) * 1.0_f64.hypot(taupa));
            tau += dtau;
            if !(dtau.abs() >= stol) {
                break;
            }
        }
        tau
    }
}
