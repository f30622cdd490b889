use chrono::{DateTime, Duration, Utc};

use crate::predict::satellite::GroundTrack;

/// Hard ceiling on any grid span. Callers validate user input against tighter
/// limits; this only keeps the length arithmetic and `at` in range.
pub const MAX_GRID_HOURS: f64 = 24.0 * 366.0;

/// Evenly spaced instants starting at `start`.
#[derive(Debug, Clone)]
pub struct TimeVector {
    start: DateTime<Utc>,
    step: Duration,
    len: usize,
}

impl TimeVector {
    /// `len` is capped so every index fits the `i32` multiplier used by `at`.
    pub fn new(start: DateTime<Utc>, step: Duration, len: usize) -> Self {
        Self {
            start,
            step,
            len: len.min(i32::MAX as usize),
        }
    }

    /// One-minute grid covering `hours` from `start`, plus one trailing sample
    /// so a crossing in the final minute can still be bracketed.
    pub fn pass_grid(start: DateTime<Utc>, hours: f64) -> Self {
        let hours = clamp_hours(hours);
        let len = ((hours / 24.0 * 1440.0) as usize).saturating_add(2);
        Self::new(start, Duration::seconds(60), len)
    }

    /// `step_seconds` grid over `[center - hours_radius, center + hours_radius)`.
    pub fn centered(center: DateTime<Utc>, hours_radius: f64, step_seconds: u32) -> Self {
        let hours_radius = clamp_hours(hours_radius);
        let half = Duration::milliseconds((hours_radius * 3_600_000.0) as i64);
        let step_seconds = step_seconds.max(1);
        let len = (hours_radius * 2.0 * 3600.0 / step_seconds as f64) as usize;
        Self::new(center - half, Duration::seconds(step_seconds as i64), len)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn at(&self, index: usize) -> DateTime<Utc> {
        self.start + self.step * index as i32
    }

    pub fn iter(&self) -> impl Iterator<Item = DateTime<Utc>> + '_ {
        (0..self.len).map(move |i| self.at(i))
    }
}

/// Non-finite and negative spans collapse to zero.
fn clamp_hours(hours: f64) -> f64 {
    if hours.is_finite() {
        hours.clamp(0.0, MAX_GRID_HOURS)
    } else {
        0.0
    }
}

/// Parallel arrays of subpoint coordinates, one entry per time sample.
#[derive(Debug, Clone, Default)]
pub struct TrackSamples {
    pub latitudes: Vec<f64>,
    pub longitudes: Vec<f64>,
    pub altitudes_km: Vec<f64>,
}

impl TrackSamples {
    pub fn len(&self) -> usize {
        self.latitudes.len()
    }
}

pub fn sample_positions<S: GroundTrack + ?Sized>(satellite: &S, times: &TimeVector) -> TrackSamples {
    let mut samples = TrackSamples {
        latitudes: Vec::with_capacity(times.len()),
        longitudes: Vec::with_capacity(times.len()),
        altitudes_km: Vec::with_capacity(times.len()),
    };

    for t in times.iter() {
        let sub = satellite.subpoint(t);
        samples.latitudes.push(sub.latitude_deg);
        samples.longitudes.push(sub.longitude_deg);
        samples.altitudes_km.push(sub.altitude_km);
    }

    samples
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn pass_grid_covers_window_plus_margin() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let grid = TimeVector::pass_grid(start, 24.0);
        assert_eq!(grid.len(), 1442);
        assert_eq!(grid.at(0), start);
        assert_eq!(grid.at(1440), start + Duration::hours(24));
        assert_eq!(grid.iter().count(), grid.len());
    }

    #[test]
    fn centered_grid_is_symmetric() {
        let center = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let grid = TimeVector::centered(center, 48.0, 15);
        assert_eq!(grid.len(), 2 * 48 * 3600 / 15);
        assert_eq!(grid.at(0), center - Duration::hours(48));
        assert_eq!(grid.at(1) - grid.at(0), Duration::seconds(15));
        assert_eq!(grid.at(grid.len() / 2), center);
    }

    #[test]
    fn zero_radius_is_empty() {
        let center = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        assert!(TimeVector::centered(center, 0.0, 15).is_empty());
    }

    #[test]
    fn unbounded_spans_are_clamped() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(TimeVector::pass_grid(start, f64::INFINITY).len(), 2);
        assert_eq!(TimeVector::pass_grid(start, f64::NAN).len(), 2);
        assert_eq!(TimeVector::pass_grid(start, -5.0).len(), 2);

        let huge = TimeVector::pass_grid(start, 1e12);
        assert_eq!(huge.len(), (MAX_GRID_HOURS * 60.0) as usize + 2);
        assert_eq!(huge.at(huge.len() - 1), start + Duration::minutes(huge.len() as i64 - 1));

        assert!(TimeVector::centered(start, f64::INFINITY, 15).is_empty());
    }

    #[test]
    fn length_fits_index_multiplier() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let grid = TimeVector::new(start, Duration::milliseconds(1), usize::MAX);
        assert_eq!(grid.len(), i32::MAX as usize);
    }
}
