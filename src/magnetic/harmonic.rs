//! Spherical harmonic coefficient sets and the synthesis of the field they
//! describe.

use std::io::{self, Cursor};

use byteorder::{BigEndian, ByteOrder, LittleEndian, ReadBytesExt};

use super::metadata::{Endianness, Metadata, Normalization};
use crate::ModelError;

/// One set of Gauss coefficients as stored in the coefficient file. For
/// a set of degree `n_max` and order `m_max`, the cosine coefficient of
/// degree `n` and order `m` sits at `m * n_max - m * (m - 1) / 2 + n`;
/// the sine coefficients skip the `m = 0` column.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct HarmonicSet {
    n_max: i32,
    m_max: i32,
    c: Vec<f64>,
    s: Vec<f64>,
}

impl HarmonicSet {
    fn index(&self, n: i32, m: i32) -> usize {
        // Both are in [0, n_max] here, and read bounded the set's size
        let (n, m, n_max) = (n as usize, m as usize, self.n_max as usize);
        m * n_max - m * m.saturating_sub(1) / 2 + n
    }

    /// The (cosine, sine) coefficient pair for degree `n` and order `m`.
    fn get(&self, n: i32, m: i32) -> (f64, f64) {
        if n > self.n_max || m > self.m_max {
            return (0., 0.);
        }
        let k = self.index(n, m);
        let s = if m == 0 { 0. } else { self.s[k - (self.n_max + 1) as usize] };
        (self.c[k], s)
    }

    pub fn degree(&self) -> i32 {
        self.n_max
    }

    /// Number of cosine and sine coefficients in a set of degree `n_max`
    /// and order `m_max`, or `None` if that overflows.
    fn sizes(n_max: i32, m_max: i32) -> Option<(usize, usize)> {
        let n1 = usize::try_from(n_max.checked_add(1)?).ok()?;
        let m1 = usize::try_from(m_max.checked_add(1)?).ok()?;
        // (m_max + 1) (2 n_max - m_max + 2) / 2
        let c_size = m1.checked_mul(n1.checked_mul(2)?.checked_sub(m1)?.checked_add(1)?)? / 2;
        Some((c_size, c_size.checked_sub(n1)?))
    }

    fn read<B: ByteOrder>(cursor: &mut Cursor<&[u8]>) -> io::Result<HarmonicSet> {
        let invalid = |msg: String| io::Error::new(io::ErrorKind::InvalidData, msg);

        let n_max = cursor.read_i32::<B>()?;
        let m_max = cursor.read_i32::<B>()?;
        if !(n_max >= m_max && m_max >= -1) || (m_max == -1 && n_max != -1) {
            return Err(invalid(format!("bad degree {n_max} and order {m_max}")));
        }
        let (c_size, s_size) =
            Self::sizes(n_max, m_max).ok_or_else(|| invalid(format!("degree {n_max} and order {m_max} are too large")))?;
        let remaining = cursor.get_ref().len().saturating_sub(cursor.position() as usize);
        let needed = c_size.checked_add(s_size).and_then(|count| count.checked_mul(8));
        if needed.map_or(true, |needed| needed > remaining) {
            return Err(invalid(format!(
                "degree {n_max} and order {m_max} need more than the {remaining} bytes left"
            )));
        }

        let mut c = vec![0.; c_size];
        cursor.read_f64_into::<B>(&mut c)?;
        let mut s = vec![0.; s_size];
        cursor.read_f64_into::<B>(&mut s)?;

        Ok(Self { n_max, m_max, c, s })
    }
}

/// Reads every harmonic set named by `meta` from the bytes of the
/// coefficient file.
pub(crate) fn read_sets(meta: &Metadata, bytes: &[u8]) -> Result<Vec<HarmonicSet>, ModelError> {
    let format = |msg: String| ModelError::Format {
        name: meta.name.clone(),
        msg,
    };

    let id_length = meta.id.len();
    if bytes.len() < id_length {
        return Err(format("coefficient file is too short for its ID".to_string()));
    }
    let found = String::from_utf8_lossy(&bytes[..id_length]);
    if found != meta.id.as_str() {
        return Err(ModelError::IdMismatch {
            name: meta.name.clone(),
            expected: meta.id.clone(),
            found: found.into_owned(),
        });
    }

    let mut cursor = Cursor::new(&bytes[id_length..]);
    let mut sets = Vec::with_capacity(meta.num_sets());
    for _ in 0..meta.num_sets() {
        let set = match meta.byte_order {
            Endianness::Little => HarmonicSet::read::<LittleEndian>(&mut cursor),
            Endianness::Big => HarmonicSet::read::<BigEndian>(&mut cursor),
        };
        let set = set.map_err(|err| match err.kind() {
            io::ErrorKind::UnexpectedEof => format("coefficient file is truncated".to_string()),
            _ => format(err.to_string()),
        })?;
        sets.push(set);
    }

    let remaining = cursor.get_ref().len() as u64 - cursor.position();
    if remaining != 0 {
        return Err(format(format!("{remaining} bytes of extra data in the coefficient file")));
    }

    Ok(sets)
}

/// Dense Schmidt semi-normalized coefficients `g` and `h`, stored by
/// degree then order.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Coefficients {
    n_max: usize,
    g: Vec<f64>,
    h: Vec<f64>,
}

impl Coefficients {
    pub fn zeros(n_max: usize) -> Coefficients {
        let size = (n_max + 1) * (n_max + 2) / 2;
        Self {
            n_max,
            g: vec![0.; size],
            h: vec![0.; size],
        }
    }

    fn index(n: usize, m: usize) -> usize {
        n * (n + 1) / 2 + m
    }

    /// Adds `weight` times `set` to these coefficients.
    pub fn accumulate(&mut self, set: &HarmonicSet, weight: f64, normalization: Normalization) {
        if weight == 0. {
            return;
        }
        let n_max = usize::try_from(set.n_max).unwrap_or(0).min(self.n_max);
        for n in 0..=n_max {
            let scale = match normalization {
                Normalization::Schmidt => weight,
                Normalization::Full => weight * ((2 * n + 1) as f64).sqrt(),
            };
            for m in 0..=n {
                let (c, s) = set.get(n as i32, m as i32);
                let k = Self::index(n, m);
                self.g[k] += scale * c;
                self.h[k] += scale * s;
            }
        }
    }

    /// Schmidt semi-normalized associated Legendre functions of `sin φ` and
    /// their derivatives with respect to φ.
    fn legendre(&self, sinp: f64, cosp: f64) -> (Vec<f64>, Vec<f64>) {
        let size = self.g.len();
        let mut p = vec![0.; size];
        let mut dp = vec![0.; size];
        p[0] = 1.;
        for n in 1..=self.n_max {
            for m in 0..=n {
                let k = Self::index(n, m);
                if m == n {
                    let prev = Self::index(n - 1, m - 1);
                    let f = if n == 1 { 1. } else { ((2 * n - 1) as f64 / (2 * n) as f64).sqrt() };
                    p[k] = f * cosp * p[prev];
                    dp[k] = f * (cosp * dp[prev] - sinp * p[prev]);
                } else {
                    let k1 = Self::index(n - 1, m);
                    let (nf, mf) = (n as f64, m as f64);
                    let a = (2. * nf - 1.) / (nf * nf - mf * mf).sqrt();
                    p[k] = a * sinp * p[k1];
                    dp[k] = a * (sinp * dp[k1] + cosp * p[k1]);
                    if n >= m + 2 {
                        let k2 = Self::index(n - 2, m);
                        let b = (((nf - 1.) * (nf - 1.) - mf * mf) / (nf * nf - mf * mf)).sqrt();
                        p[k] -= b * p[k2];
                        dp[k] -= b * dp[k2];
                    }
                }
            }
        }
        (p, dp)
    }

    /// The field at geocentric radius `r`, geocentric latitude (given by
    /// its sine and cosine) and longitude `lon` (radians), for a reference
    /// radius `radius`. Returns the (north, east, down) components in the
    /// geocentric frame.
    pub fn synthesize(&self, radius: f64, r: f64, sinp: f64, cosp: f64, lon: f64) -> (f64, f64, f64) {
        // Keep the east component finite at the poles
        let cosp = cosp.max(1e-10);
        let (p, dp) = self.legendre(sinp, cosp);
        let rotations: Vec<(f64, f64)> = (0..=self.n_max).map(|m| (m as f64 * lon).sin_cos()).collect();

        let ratio = radius / r;
        let mut scale = ratio * ratio;
        let (mut north, mut east, mut down) = (0., 0., 0.);
        for n in 1..=self.n_max {
            scale *= ratio;
            for m in 0..=n {
                let k = Self::index(n, m);
                let (sinm, cosm) = rotations[m];
                let (g, h) = (self.g[k], self.h[k]);
                let gh = g * cosm + h * sinm;
                north -= scale * gh * dp[k];
                east += scale * m as f64 * (g * sinm - h * cosm) * p[k];
                down -= scale * (n + 1) as f64 * gh * p[k];
            }
        }

        (north, east / cosp, down)
    }
}
