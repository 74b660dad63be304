// Semi-major axis a
pub(crate) const WGS84_A: f64 = 6_378_137.;
// Flattening
#[allow(clippy::unreadable_literal)]
pub(crate) const WGS84_F: f64 = 1.0 / 298.257223563;

// UTM central scale factor
pub(crate) const UTM_K0: f64 = 9996.0 / 10_000.;
// UPS central scale factor
pub(crate) const UPS_K0: f64 = 994.0 / 1000.;

// UTM/UPS limits, in units of 100km tiles
pub(crate) const TILE: i32 = 100_000;
pub(crate) const MINUTMCOL: i32 = 1;
pub(crate) const MAXUTMCOL: i32 = 9;
pub(crate) const MINUTM_S_ROW: i32 = 10;
pub(crate) const MAXUTM_S_ROW: i32 = 100;
pub(crate) const MINUTM_N_ROW: i32 = 0;
pub(crate) const MAXUTM_N_ROW: i32 = 95;
pub(crate) const MINUPS_S_IND: i32 = 8;
pub(crate) const MAXUPS_S_IND: i32 = 32;
pub(crate) const MINUPS_N_IND: i32 = 13;
pub(crate) const MAXUPS_N_IND: i32 = 27;
pub(crate) const UPSEASTING: i32 = 20;
pub(crate) const UTMEASTING: i32 = 5;

// Largest |f| for which the geodesic and rhumb line series are accurate to
// roundoff; flatter ellipsoids default to elliptic integrals
pub(crate) const EXACT_FLATTENING: f64 = 0.02;
