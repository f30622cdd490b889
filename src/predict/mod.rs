mod catalog;
mod ephemeris;
mod error;
mod geodesy;
mod observer;
mod pass_finder;
mod polar;
mod propagation;
mod refine;
mod sampler;
mod satellite;
mod tle_loader;
mod types;

pub use catalog::{SatelliteConfig, SatelliteEntry};
pub use ephemeris::{generate_ephemeris, Ephemeris, DEFAULT_HOURS_RADIUS, DEFAULT_STEP_SECONDS};
pub use error::PredictError;
pub use geodesy::{degrees_to_cardinal, great_circle_distance_km, CompassPoint};
pub use observer::Observer;
pub use pass_finder::{check_window_hours, predict_passes, DEFAULT_WINDOW_HOURS, MAX_WINDOW_HOURS};
pub use polar::sky_track;
pub use propagation::{LookAngles, Subpoint};
pub use refine::{bisect_crossing, Crossing, BISECTION_ITERATIONS};
pub use satellite::{GroundTrack, Satellite, DEFAULT_TRANSMISSION_RADIUS_KM};
pub use tle_loader::{SearchResult, TleEntry, TleLoader};
pub use types::{EphemerisPoint, Pass, SatelliteInfo, SkyPoint};
