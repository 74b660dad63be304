use lazy_static::lazy_static;

use crate::{
    constants::UPS_K0,
    latlon::check_latitude,
    utility::{atan2d, dms, GeoMath},
    ConstructionError,
    Ellipsoid,
    Hemisphere,
    RangeError,
    ThisOrThat,
};

use super::{GeographicPoint, ProjectedPoint};

lazy_static! {
    /// Polar stereographic on WGS84 with the UPS central scale factor.
    pub static ref UPS: PolarStereographic = PolarStereographic::new_unchecked(&Ellipsoid::WGS84, UPS_K0);
}

/// Polar stereographic projection about either pole. `k0` is the scale at
/// the pole.
#[derive(Clone, Copy, Debug)]
pub struct PolarStereographic {
    ellipsoid: Ellipsoid,
    k0: f64,
    es: f64,
    c: f64,
}

impl PolarStereographic {
    /// Internal-only constructor that doesn't check the parameters
    pub(crate) fn new_unchecked(ellipsoid: &Ellipsoid, k0: f64) -> PolarStereographic {
        let es = ellipsoid.es();
        let c = (1. - ellipsoid.f) * 1_f64.eatanhe(es).exp();

        Self {
            ellipsoid: *ellipsoid,
            k0,
            es,
            c,
        }
    }

    /// # Errors
    ///
    /// Returns [`ConstructionError::ScaleFactorNotPositive`] if `k0` is not a
    /// positive finite number.
    pub fn new(ellipsoid: &Ellipsoid, k0: f64) -> Result<PolarStereographic, ConstructionError> {
        if !(k0.is_finite() && k0 > 0.) {
            return Err(ConstructionError::ScaleFactorNotPositive(k0));
        }
        Ok(Self::new_unchecked(ellipsoid, k0))
    }

    #[inline]
    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    #[inline]
    pub fn central_scale(&self) -> f64 {
        self.k0
    }

    fn scale(&self, rho: f64, secphi: f64) -> f64 {
        let e2 = self.ellipsoid.e2;
        (rho / self.ellipsoid.a) * secphi * (1. - e2 + e2 / secphi.powi(2)).sqrt()
    }

    /// Projects `(lat, lon)` about the pole of `hemisphere`. The projection
    /// is defined on the whole ellipsoid except the opposite pole, which
    /// maps to infinity.
    ///
    /// # Errors
    ///
    /// - [`RangeError::IllegalLatitude`] if `lat` is outside `[-90, 90]`.
    /// - [`RangeError::OppositePole`] for the pole of the other hemisphere.
    ///
    /// # Usage
    ///
    /// ```
    /// use geodesy::{Hemisphere, projections::polar_stereographic::UPS};
    ///
    /// let p = UPS.forward(Hemisphere::Northern, 90., 30.).unwrap();
    /// assert_eq!((p.x, p.y), (0., 0.));
    /// assert_eq!(p.scale, 0.994);
    /// ```
    pub fn forward(&self, hemisphere: Hemisphere, lat: f64, lon: f64) -> Result<ProjectedPoint, RangeError> {
        check_latitude(lat)?;
        let qd = f64::from(dms::QD);
        let northp = hemisphere.is_north();
        let lat = lat * northp.ternary(1., -1.);
        if lat == -qd {
            return Err(RangeError::OppositePole(northp.ternary(lat, -lat)));
        }

        let tau = lat.tand();
        let secphi = 1_f64.hypot(tau);
        let taup = tau.taupf(self.es);
        let mut rho = 1_f64.hypot(taup) + taup.abs();
        rho = (taup >= 0.).ternary_lazy(|| (lat != qd).ternary_lazy(|| 1. / rho, || 0.), || rho);
        rho *= 2. * self.k0 * self.ellipsoid.a / self.c;

        let k = (lat != qd).ternary_lazy(|| self.scale(rho, secphi), || self.k0);
        let (sinlon, coslon) = lon.sincosd();

        Ok(ProjectedPoint {
            x: rho * sinlon,
            y: northp.ternary(-rho, rho) * coslon,
            convergence: northp.ternary(lon, -lon).ang_normalize(),
            scale: k,
        })
    }

    /// Inverse of [`PolarStereographic::forward`].
    pub fn reverse(&self, hemisphere: Hemisphere, x: f64, y: f64) -> GeographicPoint {
        let northp = hemisphere.is_north();
        let rho = x.hypot(y);
        let t = (rho != 0.)
            .ternary_lazy(
                || rho / (2. * self.k0 * self.ellipsoid.a / self.c),
                || f64::EPSILON.powi(2)
            );
        let taup = (1. / t - t) / 2.;
        let tau = taup.tauf(self.es);
        let secphi = 1_f64.hypot(tau);

        let k = (rho != 0.).ternary_lazy(|| self.scale(rho, secphi), || self.k0);
        let lat = northp.ternary(1., -1.) * tau.atand();
        let lon = atan2d(x, northp.ternary(-y, y));

        GeographicPoint {
            latitude: lat,
            longitude: lon,
            convergence: northp.ternary(lon, -lon).ang_normalize(),
            scale: k,
        }
    }
}
