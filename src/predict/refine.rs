use chrono::{DateTime, Duration, Utc};

use crate::predict::geodesy::great_circle_distance_km;
use crate::predict::observer::Observer;
use crate::predict::satellite::GroundTrack;

/// Fixed bisection count. A 60 s bracket resolves to 60 / 2^12 ≈ 15 ms.
pub const BISECTION_ITERATIONS: usize = 12;

/// Direction of a threshold crossing, in chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Crossing {
    /// Outside at `before`, inside at `after`.
    Enter,
    /// Inside at `before`, outside at `after`.
    Exit,
}

/// Locates where `f` crosses `threshold` inside `[before, after]` by bisecting
/// exactly [`BISECTION_ITERATIONS`] times. "Inside" means `f(x) < threshold`.
///
/// The returned bound is always the one on the inside of the crossing (the
/// upper bound for [`Crossing::Enter`], the lower for [`Crossing::Exit`]), so
/// the reported in-range interval never shrinks below the true one.
pub fn bisect_crossing<F>(mut f: F, before: f64, after: f64, threshold: f64, crossing: Crossing) -> f64
where
    F: FnMut(f64) -> f64,
{
    let mut low = before;
    let mut high = after;

    for _ in 0..BISECTION_ITERATIONS {
        let mid = (low + high) / 2.0;
        let inside = f(mid) < threshold;

        match (crossing, inside) {
            (Crossing::Enter, true) | (Crossing::Exit, false) => high = mid,
            (Crossing::Enter, false) | (Crossing::Exit, true) => low = mid,
        }
    }

    match crossing {
        Crossing::Enter => high,
        Crossing::Exit => low,
    }
}

/// Refines the instant a satellite's subpoint crosses `radius_km` of ground
/// distance from the observer, within one coarse sample interval.
pub fn refine_boundary<S: GroundTrack + ?Sized>(
    satellite: &S,
    observer: &Observer,
    before: DateTime<Utc>,
    after: DateTime<Utc>,
    radius_km: f64,
    crossing: Crossing,
) -> DateTime<Utc> {
    let span_s = (after - before).num_microseconds().unwrap_or(0) as f64 / 1e6;

    let distance_at = |offset_s: f64| {
        let sub = satellite.subpoint(offset_to_instant(before, offset_s));
        great_circle_distance_km(
            observer.latitude_deg,
            observer.longitude_deg,
            sub.latitude_deg,
            sub.longitude_deg,
        )
    };

    let offset_s = bisect_crossing(distance_at, 0.0, span_s, radius_km, crossing);
    offset_to_instant(before, offset_s)
}

fn offset_to_instant(base: DateTime<Utc>, offset_s: f64) -> DateTime<Utc> {
    base + Duration::microseconds((offset_s * 1e6).round() as i64)
}
