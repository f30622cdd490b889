use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::predict::sampler::{sample_positions, TimeVector};
use crate::predict::satellite::GroundTrack;
use crate::predict::types::EphemerisPoint;

pub const DEFAULT_HOURS_RADIUS: f64 = 48.0;
pub const DEFAULT_STEP_SECONDS: u32 = 15;

pub type Ephemeris = BTreeMap<u32, Vec<EphemerisPoint>>;

/// Dense ground track for each satellite over
/// `[center - hours_radius, center + hours_radius)`, keyed by catalog id.
///
/// Samples the propagator cannot evaluate are left out, so a satellite may map
/// to an empty list.
pub fn generate_ephemeris<S>(
    satellites: &[S],
    center: DateTime<Utc>,
    hours_radius: f64,
    step_seconds: u32,
) -> Ephemeris
where
    S: GroundTrack + Sync,
{
    let times = TimeVector::centered(center, hours_radius, step_seconds);
    if times.is_empty() {
        log::debug!("Empty ephemeris window around {}", center.to_rfc3339());
    }

    satellites
        .par_iter()
        .map(|sat| (sat.norad_id(), ground_track(sat, &times)))
        .collect()
}

pub fn ground_track<S: GroundTrack + ?Sized>(satellite: &S, times: &TimeVector) -> Vec<EphemerisPoint> {
    let track = sample_positions(satellite, times);

    times
        .iter()
        .enumerate()
        .filter(|&(i, _)| !track.latitudes[i].is_nan())
        .map(|(i, t)| EphemerisPoint {
            timestamp: t.timestamp_millis() as f64 / 1000.0,
            latitude_deg: round_to(track.latitudes[i], 4),
            longitude_deg: round_to(track.longitudes[i], 4),
            altitude_km: round_to(track.altitudes_km[i], 1),
        })
        .collect()
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round() / scale
}
