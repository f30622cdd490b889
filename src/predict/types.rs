use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::predict::geodesy::CompassPoint;

/// Information about a single satellite from TLE
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SatelliteInfo {
    pub name: String,
    pub norad_id: u32,
    pub tle_source: String,
}

/// An interval during which a satellite's subpoint is within its
/// transmission radius of the observer.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct Pass {
    pub sat_id: u32,
    pub name: String,
    #[serde(rename = "start_time_iso")]
    pub start: DateTime<Utc>,
    #[serde(rename = "end_time_iso")]
    pub end: DateTime<Utc>,
    /// Elevation at the midpoint of the pass, truncated to whole degrees.
    pub max_alt: i32,
    pub max_dir: CompassPoint,
    pub duration_m: i64,
}

/// One ground-track sample, serialized as `[unix_ts, lat, lon, alt_km]`.
/// `unix_ts` is fractional seconds with millisecond resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(into = "(f64, f64, f64, f64)")]
pub struct EphemerisPoint {
    pub timestamp: f64,
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_km: f64,
}

impl From<EphemerisPoint> for (f64, f64, f64, f64) {
    fn from(p: EphemerisPoint) -> Self {
        (p.timestamp, p.latitude_deg, p.longitude_deg, p.altitude_km)
    }
}

/// Topocentric sample for sky-track plots.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct SkyPoint {
    pub az: f64,
    pub el: f64,
    pub time: DateTime<Utc>,
}
