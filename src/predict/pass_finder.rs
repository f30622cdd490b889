use chrono::{DateTime, Utc};
use rayon::prelude::*;

use crate::predict::error::PredictError;
use crate::predict::geodesy::{great_circle_distance_km, CompassPoint};
use crate::predict::observer::Observer;
use crate::predict::refine::{refine_boundary, Crossing};
use crate::predict::sampler::{sample_positions, TimeVector};
use crate::predict::satellite::GroundTrack;
use crate::predict::types::Pass;

pub const DEFAULT_WINDOW_HOURS: f64 = 24.0;
/// Longest window accepted from users, for pass searches and ephemeris radii.
pub const MAX_WINDOW_HOURS: f64 = 168.0;

pub fn check_window_hours(hours: f64) -> Result<f64, PredictError> {
    if hours.is_finite() && hours > 0.0 && hours <= MAX_WINDOW_HOURS {
        Ok(hours)
    } else {
        Err(PredictError::InvalidWindow(hours))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RangeState {
    Outside,
    Inside,
}

/// Find all passes of every satellite within `hours` from `start`, sorted by
/// start time (ties broken by catalog id).
///
/// `observer` is captured once for the whole batch.
pub fn predict_passes<S>(
    satellites: &[S],
    observer: &Observer,
    start: DateTime<Utc>,
    hours: f64,
) -> Vec<Pass>
where
    S: GroundTrack + Sync,
{
    let times = TimeVector::pass_grid(start, hours);

    let mut passes: Vec<Pass> = satellites
        .par_iter()
        .flat_map_iter(|sat| find_passes(sat, observer, &times))
        .collect();

    passes.sort_by(|a, b| a.start.cmp(&b.start).then(a.sat_id.cmp(&b.sat_id)));
    passes
}

/// Scan one satellite over `times` and emit a [`Pass`] for every closed
/// in-range interval.
///
/// A pass still open at the last sample is dropped. A pass already open at the
/// first sample starts at the first sample. Samples whose subpoint is NaN are
/// treated as out of range.
pub fn find_passes<S: GroundTrack + ?Sized>(
    satellite: &S,
    observer: &Observer,
    times: &TimeVector,
) -> Vec<Pass> {
    let radius_km = satellite.transmission_radius_km();
    let track = sample_positions(satellite, times);

    let mut passes = Vec::new();
    let mut state = RangeState::Outside;
    let mut aos_index = 0;

    for i in 0..track.len() {
        let distance = great_circle_distance_km(
            observer.latitude_deg,
            observer.longitude_deg,
            track.latitudes[i],
            track.longitudes[i],
        );
        // NaN compares false, so unpropagatable samples count as outside.
        let in_range = distance < radius_km;

        match (state, in_range) {
            (RangeState::Outside, true) => {
                state = RangeState::Inside;
                aos_index = i;
            }
            (RangeState::Inside, false) => {
                state = RangeState::Outside;
                if let Some(pass) = close_pass(satellite, observer, times, aos_index, i, radius_km) {
                    passes.push(pass);
                }
            }
            _ => {}
        }
    }

    if state == RangeState::Inside {
        log::debug!(
            "{} ({}) still in range at {}, open pass dropped",
            satellite.name(),
            satellite.norad_id(),
            times.at(times.len() - 1)
        );
    }

    log::debug!(
        "{} ({}): {} passes",
        satellite.name(),
        satellite.norad_id(),
        passes.len()
    );

    passes
}

fn close_pass<S: GroundTrack + ?Sized>(
    satellite: &S,
    observer: &Observer,
    times: &TimeVector,
    aos_index: usize,
    los_index: usize,
    radius_km: f64,
) -> Option<Pass> {
    let aos = refine_boundary(
        satellite,
        observer,
        times.at(aos_index.saturating_sub(1)),
        times.at(aos_index),
        radius_km,
        Crossing::Enter,
    );
    let los = refine_boundary(
        satellite,
        observer,
        times.at(los_index - 1),
        times.at(los_index),
        radius_km,
        Crossing::Exit,
    );

    if los <= aos {
        log::debug!(
            "{} ({}): degenerate pass at {} skipped",
            satellite.name(),
            satellite.norad_id(),
            aos
        );
        return None;
    }

    // Midpoint look angles stand in for the true culmination.
    let midpoint = aos + (los - aos) / 2;
    let angles = satellite.look_angles(observer, midpoint);
    let duration_m = ((los - aos).num_milliseconds() as f64 / 60_000.0).round() as i64;

    Some(Pass {
        sat_id: satellite.norad_id(),
        name: satellite.name().to_string(),
        start: aos,
        end: los,
        max_alt: angles.elevation_deg as i32,
        max_dir: CompassPoint::from_azimuth(angles.azimuth_deg),
        duration_m,
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::predict::geodesy::EARTH_RADIUS_KM;
    use crate::predict::propagation::{look_angles, LookAngles, Subpoint};
    use crate::predict::satellite::tests::{iss, iss_epoch};
    use chrono::{Duration, TimeZone};

    /// Subpoint sweeping eastwards along the equator at a constant rate.
    pub struct EquatorialTrack {
        pub id: u32,
        pub epoch: DateTime<Utc>,
        pub lon0_deg: f64,
        pub rate_deg_s: f64,
        pub radius_km: f64,
        /// Subpoints before this instant are NaN.
        pub valid_from: Option<DateTime<Utc>>,
    }

    impl EquatorialTrack {
        pub fn new(id: u32, epoch: DateTime<Utc>, lon0_deg: f64) -> Self {
            Self {
                id,
                epoch,
                lon0_deg,
                rate_deg_s: 0.05,
                radius_km: 2500.0,
                valid_from: None,
            }
        }

        fn longitude_at(&self, at: DateTime<Utc>) -> f64 {
            let secs = (at - self.epoch).num_microseconds().unwrap() as f64 / 1e6;
            (self.lon0_deg + self.rate_deg_s * secs + 180.0).rem_euclid(360.0) - 180.0
        }
    }

    impl GroundTrack for EquatorialTrack {
        fn norad_id(&self) -> u32 {
            self.id
        }

        fn name(&self) -> &str {
            "EQUATORIAL"
        }

        fn transmission_radius_km(&self) -> f64 {
            self.radius_km
        }

        fn subpoint(&self, at: DateTime<Utc>) -> Subpoint {
            if self.valid_from.is_some_and(|from| at < from) {
                return Subpoint::NAN;
            }
            Subpoint {
                latitude_deg: 0.0,
                longitude_deg: self.longitude_at(at),
                altitude_km: 400.0,
            }
        }

        fn look_angles(&self, observer: &Observer, at: DateTime<Utc>) -> LookAngles {
            let sub = self.subpoint(at);
            let ecef = Observer::new(sub.latitude_deg, sub.longitude_deg, sub.altitude_km * 1000.0)
                .position_ecef_km();
            look_angles(observer, ecef)
        }
    }

    pub fn epoch() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
    }

    fn origin() -> Observer {
        Observer::new(0.0, 0.0, 0.0)
    }

    /// Seconds after `epoch` at which the track reaches `lon_deg`.
    fn analytic_time(track: &EquatorialTrack, lon_deg: f64) -> f64 {
        (lon_deg - track.lon0_deg) / track.rate_deg_s
    }

    fn threshold_deg(radius_km: f64) -> f64 {
        (radius_km / EARTH_RADIUS_KM).to_degrees()
    }

    fn secs_since(epoch: DateTime<Utc>, t: DateTime<Utc>) -> f64 {
        (t - epoch).num_microseconds().unwrap() as f64 / 1e6
    }

    #[test]
    fn single_pass_matches_analytic_crossings() {
        let track = EquatorialTrack::new(1, epoch(), -60.0);
        let passes = predict_passes(std::slice::from_ref(&track), &origin(), epoch(), 1.0);
        assert_eq!(passes.len(), 1);

        let theta = threshold_deg(track.radius_km);
        let enter = analytic_time(&track, -theta);
        let exit = analytic_time(&track, theta);

        let pass = &passes[0];
        let start = secs_since(epoch(), pass.start);
        let end = secs_since(epoch(), pass.end);

        assert!(start >= enter && start - enter < 0.05, "start {start} vs {enter}");
        assert!(end <= exit && exit - end < 0.05, "end {end} vs {exit}");
        assert_eq!(pass.sat_id, 1);
        assert_eq!(pass.name, "EQUATORIAL");
        assert_eq!(pass.duration_m, ((end - start) / 60.0).round() as i64);
        assert_eq!(pass.duration_m, 15);
        // Midpoint is directly overhead.
        assert!(pass.max_alt >= 89);
    }

    #[test]
    fn coarse_grid_brackets_truth_before_refinement() {
        let track = EquatorialTrack::new(1, epoch(), -60.0);
        let times = TimeVector::pass_grid(epoch(), 1.0);
        let theta = threshold_deg(track.radius_km);
        let enter = analytic_time(&track, -theta);

        let first_inside = times
            .iter()
            .find(|t| track.longitude_at(*t).abs() < theta)
            .unwrap();
        let coarse = secs_since(epoch(), first_inside);
        assert!(coarse >= enter && coarse - enter <= 60.0);
    }

    #[test]
    fn multiple_passes_in_window() {
        let track = EquatorialTrack::new(7, epoch(), -60.0);
        let passes = predict_passes(std::slice::from_ref(&track), &origin(), epoch(), 6.0);
        assert_eq!(passes.len(), 3);
        for pair in passes.windows(2) {
            let gap = secs_since(pair[0].start, pair[1].start);
            assert!((gap - 7200.0).abs() < 0.1, "orbit period gap {gap}");
        }
    }

    #[test]
    fn open_pass_at_window_end_is_dropped() {
        let track = EquatorialTrack::new(1, epoch(), -60.0);
        // 24 minutes: inside range from ~750 s until past the last sample.
        let passes = predict_passes(std::slice::from_ref(&track), &origin(), epoch(), 0.4);
        assert!(passes.is_empty());
    }

    #[test]
    fn pass_open_at_window_start_is_clipped() {
        let track = EquatorialTrack::new(1, epoch(), -10.0);
        let passes = predict_passes(std::slice::from_ref(&track), &origin(), epoch(), 1.0);
        assert_eq!(passes.len(), 1);
        assert_eq!(passes[0].start, epoch());
        let exit = analytic_time(&track, threshold_deg(track.radius_km));
        assert!((secs_since(epoch(), passes[0].end) - exit).abs() < 0.05);
    }

    #[test]
    fn nan_samples_count_as_outside() {
        let mut track = EquatorialTrack::new(1, epoch(), -60.0);
        let valid_from = epoch() + Duration::seconds(800);
        track.valid_from = Some(valid_from);

        let passes = predict_passes(std::slice::from_ref(&track), &origin(), epoch(), 1.0);
        assert_eq!(passes.len(), 1);
        let start = secs_since(valid_from, passes[0].start);
        assert!((0.0..0.05).contains(&start), "start offset {start}");
    }

    #[test]
    fn out_of_range_satellite_has_no_passes() {
        let mut track = EquatorialTrack::new(1, epoch(), -60.0);
        track.radius_km = 10.0;
        track.rate_deg_s = 0.0;
        let passes = predict_passes(std::slice::from_ref(&track), &origin(), epoch(), 24.0);
        assert!(passes.is_empty());
    }

    #[test]
    fn passes_sorted_by_start_then_id() {
        let late = EquatorialTrack::new(3, epoch(), -70.0);
        let early_b = EquatorialTrack::new(9, epoch(), -50.0);
        let early_a = EquatorialTrack::new(2, epoch(), -50.0);
        let passes = predict_passes(&[late, early_b, early_a], &origin(), epoch(), 1.0);

        let ids: Vec<u32> = passes.iter().map(|p| p.sat_id).collect();
        assert_eq!(ids, vec![2, 9, 3]);
        for pair in passes.windows(2) {
            assert!(pair[0].start <= pair[1].start);
        }
    }

    #[test]
    fn iss_passes_over_horb_are_valid() {
        let observer = Observer::new(48.4172, 8.7526, 445.0);
        let sat = iss();
        let passes = predict_passes(std::slice::from_ref(&sat), &observer, iss_epoch(), 24.0);

        assert!(passes.len() >= 2, "expected several passes, got {}", passes.len());
        for pass in &passes {
            assert!(pass.start < pass.end);
            let minutes = (pass.end - pass.start).num_milliseconds() as f64 / 60_000.0;
            assert_eq!(pass.duration_m, minutes.round() as i64);
            assert!(pass.duration_m <= 15);
            assert!(pass.start >= iss_epoch());
            assert!(pass.end <= iss_epoch() + Duration::hours(24) + Duration::minutes(1));
            assert!((-90..=90).contains(&pass.max_alt));
        }
        for pair in passes.windows(2) {
            assert!(pair[0].end < pair[1].start);
        }
    }

    #[test]
    fn pass_serializes_with_api_field_names() {
        let track = EquatorialTrack::new(42, epoch(), -60.0);
        let passes = predict_passes(std::slice::from_ref(&track), &origin(), epoch(), 1.0);
        let json = serde_json::to_value(&passes[0]).unwrap();
        for key in [
            "sat_id",
            "name",
            "start_time_iso",
            "end_time_iso",
            "max_alt",
            "max_dir",
            "duration_m",
        ] {
            assert!(json.get(key).is_some(), "missing {key}");
        }
        assert_eq!(json["sat_id"], 42);
    }

    #[test]
    fn window_hours_must_be_finite_and_bounded() {
        assert_eq!(check_window_hours(24.0).unwrap(), 24.0);
        assert_eq!(check_window_hours(MAX_WINDOW_HOURS).unwrap(), MAX_WINDOW_HOURS);
        for bad in [0.0, -1.0, MAX_WINDOW_HOURS + 1.0, f64::INFINITY, f64::NAN] {
            assert!(matches!(check_window_hours(bad), Err(PredictError::InvalidWindow(_))));
        }
    }
}
