use std::f64::consts::FRAC_PI_2;

use crate::{constants::{WGS84_A, WGS84_F}, utility::GeoMath, ConstructionError, ThisOrThat};

/// An ellipsoid of revolution given by its equatorial radius and
/// flattening. Negative flattening gives a prolate ellipsoid, zero a sphere.
///
/// The parameters are validated once by [`Ellipsoid::new`]; every solver and
/// projection built from an `Ellipsoid` can rely on `a > 0` and `b > 0`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ellipsoid {
    pub(crate) a: f64,
    pub(crate) f: f64,
    pub(crate) b: f64,
    pub(crate) e2: f64,
    pub(crate) ep2: f64,
    pub(crate) n: f64,
}

impl Ellipsoid {
    /// The WGS84 ellipsoid.
    pub const WGS84: Ellipsoid = Ellipsoid::new_unchecked(WGS84_A, WGS84_F);

    /// Internal-only constructor that doesn't check the parameters
    pub(crate) const fn new_unchecked(a: f64, f: f64) -> Ellipsoid {
        let e2 = f * (2. - f);
        Self {
            a,
            f,
            b: a * (1. - f),
            e2,
            ep2: e2 / ((1. - f) * (1. - f)),
            n: f / (2. - f),
        }
    }

    /// Creates an ellipsoid with equatorial radius `a` (meters) and
    /// flattening `f`.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::EquatorialRadiusNotPositive`] if `a` is not a
    /// positive finite number and [`ConstructionError::PolarSemiAxisNotPositive`]
    /// if `f >= 1`.
    ///
    /// # Usage
    ///
    /// ```
    /// use geodesy::Ellipsoid;
    ///
    /// let sphere = Ellipsoid::new(6_371_000., 0.).unwrap();
    /// assert_eq!(sphere.polar_semi_axis(), 6_371_000.);
    ///
    /// assert!(Ellipsoid::new(-1., 0.).is_err());
    /// assert!(Ellipsoid::new(6_371_000., 1.).is_err());
    /// ```
    pub fn new(a: f64, f: f64) -> Result<Ellipsoid, ConstructionError> {
        if !(a.is_finite() && a > 0.) {
            return Err(ConstructionError::EquatorialRadiusNotPositive(a));
        }
        let b = a * (1. - f);
        if !(f.is_finite() && b.is_finite() && b > 0.) {
            return Err(ConstructionError::PolarSemiAxisNotPositive(f));
        }

        Ok(Ellipsoid::new_unchecked(a, f))
    }

    /// Equatorial radius `a` in meters.
    #[inline]
    pub fn equatorial_radius(&self) -> f64 {
        self.a
    }

    #[inline]
    pub fn flattening(&self) -> f64 {
        self.f
    }

    /// Polar semi-axis `b = a (1 - f)` in meters.
    #[inline]
    pub fn polar_semi_axis(&self) -> f64 {
        self.b
    }

    /// Eccentricity squared `e^2 = f (2 - f)`, negative for prolate ellipsoids.
    #[inline]
    pub fn eccentricity_squared(&self) -> f64 {
        self.e2
    }

    #[inline]
    pub fn third_flattening(&self) -> f64 {
        self.n
    }

    /// Eccentricity carrying the sign of `e^2`, as used by the conformal
    /// latitude helpers.
    pub(crate) fn es(&self) -> f64 {
        (self.f < 0.).ternary(-1., 1.) * self.e2.abs().sqrt()
    }

    /// Distance from the equator to a pole along a meridian, in meters.
    pub fn quarter_meridian(&self) -> f64 {
        self.rectifying_radius() * FRAC_PI_2
    }

    /// Radius of the sphere whose great circles have the same length as the
    /// meridians of this ellipsoid.
    pub(crate) fn rectifying_radius(&self) -> f64 {
        let n2 = self.n.powi(2);
        self.a / (1. + self.n) * (1. + n2 * (1. / 4. + n2 * (1. / 64. + n2 / 256.)))
    }

    /// Radius of the sphere with the same surface area as this ellipsoid.
    ///
    /// ```
    /// use geodesy::Ellipsoid;
    ///
    /// assert!((Ellipsoid::WGS84.authalic_radius() - 6_371_007.181).abs() < 1e-3);
    /// ```
    pub fn authalic_radius(&self) -> f64 {
        self.authalic_radius_squared().sqrt()
    }

    pub(crate) fn authalic_radius_squared(&self) -> f64 {
        let e = self.e2.abs().sqrt();
        let ratio = if self.e2 == 0. {
            1.
        } else if self.e2 > 0. {
            e.atanh() / e
        } else {
            e.atan() / e
        };
        (self.a.powi(2) + self.b.powi(2) * ratio) / 2.
    }

    /// Geocentric radius and the sine and cosine of the geocentric latitude
    /// of a point at geodetic latitude `lat` and height `h` above the
    /// ellipsoid.
    pub(crate) fn geocentric(&self, lat: f64, h: f64) -> (f64, f64, f64) {
        let (sphi, cphi) = lat.sincosd();
        let nu = self.a / (1. - self.e2 * sphi.powi(2)).sqrt();
        let p = (nu + h) * cphi;
        let z = (nu * (1. - self.e2) + h) * sphi;
        let r = p.hypot(z);

        (r, z / r, p / r)
    }
}

impl Default for Ellipsoid {
    fn default() -> Self {
        Ellipsoid::WGS84
    }
}
