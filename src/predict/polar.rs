use chrono::{DateTime, Duration, Utc};

use crate::predict::observer::Observer;
use crate::predict::satellite::GroundTrack;
use crate::predict::types::SkyPoint;

const SKY_TRACK_STEP_SECONDS: i64 = 10;

/// Azimuth/elevation samples every 10 s over `[start, end]`, keeping only
/// those above the horizon.
pub fn sky_track<S: GroundTrack + ?Sized>(
    satellite: &S,
    observer: &Observer,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
) -> Vec<SkyPoint> {
    let step = Duration::seconds(SKY_TRACK_STEP_SECONDS);
    let mut points = Vec::new();
    let mut cursor = start;

    while cursor <= end {
        let angles = satellite.look_angles(observer, cursor);
        if angles.elevation_deg > 0.0 {
            points.push(SkyPoint {
                az: round1(angles.azimuth_deg),
                el: round1(angles.elevation_deg),
                time: cursor,
            });
        }
        cursor += step;
    }

    points
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::predict::pass_finder::predict_passes;
    use crate::predict::pass_finder::tests::{epoch, EquatorialTrack};

    #[test]
    fn only_points_above_horizon() {
        let track = EquatorialTrack::new(1, epoch(), -60.0);
        let observer = Observer::new(0.0, 0.0, 0.0);
        let points = sky_track(&track, &observer, epoch(), epoch() + Duration::hours(1));

        assert!(!points.is_empty());
        assert!(points.iter().all(|p| p.el > 0.0));
        for pair in points.windows(2) {
            assert!((pair[1].time - pair[0].time) >= Duration::seconds(SKY_TRACK_STEP_SECONDS));
        }
        let peak = points.iter().map(|p| p.el).fold(f64::MIN, f64::max);
        assert!(peak > 89.0);
    }

    #[test]
    fn covers_predicted_pass() {
        let track = EquatorialTrack::new(1, epoch(), -60.0);
        let observer = Observer::new(0.0, 0.0, 0.0);
        let pass = predict_passes(std::slice::from_ref(&track), &observer, epoch(), 1.0)
            .pop()
            .unwrap();
        // A 400 km subpoint 2500 km away sits just under the horizon, so the
        // visible arc lies strictly inside the pass.
        let points = sky_track(&track, &observer, pass.start, pass.end);
        assert!(!points.is_empty());
        assert!(points.first().unwrap().time >= pass.start);
        assert!(points.last().unwrap().time <= pass.end);
    }

    #[test]
    fn empty_for_inverted_window() {
        let track = EquatorialTrack::new(1, epoch(), 0.0);
        let observer = Observer::new(0.0, 0.0, 0.0);
        assert!(sky_track(&track, &observer, epoch(), epoch() - Duration::seconds(1)).is_empty());
    }
}
