//! Where two geodesics cross. Positions along each line are measured as
//! signed distances from the line's origin; the search refines a guess by
//! repeatedly solving the spherical triangle formed by the current points
//! and the crossing.

use std::ops::{Add, Sub};

use crate::{
    geodesic::Geodesic,
    geodesic_line::GeodesicLine,
    utility::GeoMath,
    ThisOrThat,
};

const NUMIT: usize = 100;

/// How two lines relate at the crossing that was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Coincidence {
    /// The lines cross at a single point.
    None,
    /// The lines overlap heading the same way.
    Parallel,
    /// The lines overlap heading opposite ways.
    Antiparallel,
}

impl Coincidence {
    fn from_sign(c: i8) -> Coincidence {
        match c {
            1 => Coincidence::Parallel,
            -1 => Coincidence::Antiparallel,
            _ => Coincidence::None,
        }
    }
}

/// Distances along the first and second line to their crossing.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Crossing {
    pub s1: f64,
    pub s2: f64,
    pub coincidence: Coincidence,
}

#[derive(Clone, Copy, Debug)]
struct XPoint {
    x: f64,
    y: f64,
    c: i8,
}

impl XPoint {
    fn new(x: f64, y: f64) -> XPoint {
        Self { x, y, c: 0 }
    }

    /// L1 distance from the origin
    fn dist(&self) -> f64 {
        self.x.abs() + self.y.abs()
    }

    fn dist_to(&self, other: &XPoint) -> f64 {
        (*self - *other).dist()
    }
}

impl Add for XPoint {
    type Output = XPoint;

    fn add(self, rhs: XPoint) -> XPoint {
        XPoint {
            x: self.x + rhs.x,
            y: self.y + rhs.y,
            c: (rhs.c != 0).ternary(rhs.c, self.c),
        }
    }
}

impl Sub for XPoint {
    type Output = XPoint;

    fn sub(self, rhs: XPoint) -> XPoint {
        XPoint {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            c: self.c,
        }
    }
}

/// Finds the crossing of two geodesic lines nearest a starting guess.
///
/// # Usage
///
/// ```
/// use geodesy::{geodesic::WGS84, Coincidence, Intersect, LatLon};
///
/// let intersect = Intersect::new(&WGS84);
/// let line1 = WGS84.line(&LatLon::create(0., 0.).unwrap(), 45.);
/// let line2 = WGS84.line(&LatLon::create(0., 10.).unwrap(), -45.);
/// let crossing = intersect.closest(&line1, &line2);
/// assert_eq!(crossing.coincidence, Coincidence::None);
/// assert!((crossing.s1 - crossing.s2).abs() < 1e-6);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Intersect {
    geodesic: Geodesic,
    /// Radius of the authalic sphere
    r: f64,
    eps: f64,
    tol: f64,
    delta: f64,
    /// Shortest distance between conjugate crossings
    t1: f64,
    /// Offset for the alternative starting guesses
    d1: f64,
}

impl Intersect {
    pub fn new(geodesic: &Geodesic) -> Intersect {
        let r = geodesic.c2.sqrt();
        // Used to normalize distances
        let d = r * std::f64::consts::PI;
        let ellipsoid = geodesic.ellipsoid();
        let t1 = std::f64::consts::PI * ellipsoid.equatorial_radius().min(ellipsoid.polar_semi_axis());

        Self {
            geodesic: *geodesic,
            r,
            eps: 3. * f64::EPSILON,
            tol: d * f64::EPSILON.powf(0.75),
            delta: d * f64::EPSILON.powf(0.2),
            t1,
            d1: 2. * ellipsoid.quarter_meridian(),
        }
    }

    /// The crossing closest to the origins of both lines.
    pub fn closest(&self, line1: &GeodesicLine, line2: &GeodesicLine) -> Crossing {
        self.closest_from(line1, line2, 0., 0.)
    }

    /// The crossing closest to the points `s1` along `line1` and `s2`
    /// along `line2`.
    pub fn closest_from(&self, line1: &GeodesicLine, line2: &GeodesicLine, s1: f64, s2: f64) -> Crossing {
        let q = self.closest_int(line1, line2, XPoint::new(s1, s2));
        Crossing {
            s1: q.x,
            s2: q.y,
            coincidence: Coincidence::from_sign(q.c),
        }
    }

    fn closest_int(&self, line1: &GeodesicLine, line2: &GeodesicLine, p0: XPoint) -> XPoint {
        const IX: [f64; 5] = [0., 1., -1., 0., 0.];
        const IY: [f64; 5] = [0., 0., 0., 1., -1.];
        let mut skip = [false; 5];
        let offset = |n: usize| p0 + XPoint::new(IX[n] * self.d1, IY[n] * self.d1);

        // Best crossing so far
        let mut best: Option<XPoint> = None;
        for n in 0..IX.len() {
            if skip[n] {
                continue;
            }
            let qx = self.basic(line1, line2, offset(n));
            let qx = fix_coincident(p0, qx);
            if let Some(q) = best {
                if (q.x - qx.x).abs() <= self.delta && (q.y - qx.y).abs() <= self.delta {
                    continue;
                }
            }
            let dist = qx.dist_to(&p0);
            if dist < self.t1 {
                best = Some(qx);
                break;
            }
            if best.map_or(true, |q| dist < q.dist_to(&p0)) {
                best = Some(qx);
            }
            for m in n + 1..IX.len() {
                skip[m] = skip[m] || qx.dist_to(&offset(m)) < 2. * self.t1 - self.d1 - self.delta;
            }
        }

        best.unwrap_or(p0)
    }

    fn basic(&self, line1: &GeodesicLine, line2: &GeodesicLine, p0: XPoint) -> XPoint {
        let mut q = p0;
        for _ in 0..NUMIT {
            let dq = self.spherical(line1, line2, &q);
            q = q + dq;
            // break if nan
            if q.c != 0 || !(dq.dist() > self.tol) {
                break;
            }
        }
        q
    }

    /// One step of the iteration: treat the triangle made by the current
    /// points on each line and their crossing as spherical.
    fn spherical(&self, line1: &GeodesicLine, line2: &GeodesicLine, p: &XPoint) -> XPoint {
        let pos1 = line1.position(p.x);
        let pos2 = line2.position(p.y);
        let inverse = self.geodesic.inverse(&pos1.destination, &pos2.destination);
        let z = inverse.distance;
        let (sinz, cosz) = (z / self.r).sin_cos();

        // X = interior angle at X, Y = exterior angle at Y
        let (x, dx) = pos1.azimuth.ang_diff_err(inverse.azimuth1);
        let (y, dy) = pos2.azimuth.ang_diff_err(inverse.azimuth2);
        let (xy, dxy) = x.ang_diff_err(y);
        // inverted triangle
        let s = (xy + (dxy + dy - dx)).is_sign_negative().ternary(-1., 1.);
        let (sinx, cosx) = (x * s).sincosde(s * dx);
        let (siny, cosy) = (y * s).sincosde(s * dy);

        let eps = self.eps;
        if z <= eps * self.r {
            // Already at the crossing. Check whether the lines are
            // parallel or antiparallel.
            let c = if (sinx - siny).abs() <= eps && (cosx - cosy).abs() <= eps {
                1
            } else if (sinx + siny).abs() <= eps && (cosx + cosy).abs() <= eps {
                -1
            } else {
                0
            };
            XPoint { x: 0., y: 0., c }
        } else if sinx.abs() <= eps && siny.abs() <= eps {
            // Coincident geodesics, place the crossing at the midpoint
            let c = (cosx * cosy > 0.).ternary(1, -1);
            XPoint {
                x: cosx * z / 2.,
                y: -cosy * z / 2.,
                c,
            }
        } else {
            // General case. sinz < 0 (z > pi * r) must be handled correctly
            // or the iteration may not converge.
            XPoint::new(
                self.r * (siny * sinz).atan2(siny * cosx * cosz - cosy * sinx),
                self.r * (sinx * sinz).atan2(-sinx * cosy * cosz + cosx * siny),
            )
        }
    }
}

/// For coincident lines any point on the overlap is a crossing; pick the
/// one nearest `p0`.
fn fix_coincident(p0: XPoint, p: XPoint) -> XPoint {
    if p.c == 0 {
        return p;
    }
    let c = f64::from(p.c);
    let s = ((p0.x + c * p0.y) - (p.x + c * p.y)) / 2.;
    p + XPoint::new(s, c * s)
}
