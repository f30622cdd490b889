use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::SystemTime;
use tokio::sync::RwLock;

use crate::predict::{generate_ephemeris, Ephemeris, Observer, Satellite, SatelliteConfig, TleLoader};

use super::config::Config;

/// Station parameters that can be changed at runtime.
#[derive(Debug, Clone)]
pub struct StationSettings {
    pub name: String,
    pub observer: Observer,
    pub min_elevation: f64,
}

#[derive(Debug, Clone)]
pub struct CachedEphemeris {
    pub center_time: DateTime<Utc>,
    pub ephemeris: Arc<Ephemeris>,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub station: Arc<RwLock<StationSettings>>,
    pub catalog: Arc<RwLock<TleLoader>>,
    pub satellite_config: Arc<RwLock<SatelliteConfig>>,
    /// Replaced wholesale on every re-enrichment; readers keep their snapshot.
    pub satellites: Arc<RwLock<Arc<Vec<Satellite>>>>,
    pub ephemeris: Arc<RwLock<Option<CachedEphemeris>>>,
}

impl AppState {
    pub async fn initialize(config: Config, observer: Observer) -> Self {
        let mut catalog = TleLoader::new(config.tle.file.clone());
        if let Err(e) = catalog.load_all() {
            log::warn!("Failed to initialize TLE loader: {}", e);
        }

        let satellite_config = SatelliteConfig::load(&config.satellites_file).unwrap_or_else(|e| {
            log::warn!(
                "Failed to load satellite config {}: {}",
                config.satellites_file.display(),
                e
            );
            SatelliteConfig::default()
        });

        let satellites =
            satellite_config.enrich(&catalog, config.predict.default_transmission_radius_km);

        let station = StationSettings {
            name: config
                .station
                .name
                .clone()
                .unwrap_or_else(|| "Ground station".to_string()),
            observer,
            min_elevation: config.predict.min_elevation,
        };

        let state = Self {
            config: Arc::new(config),
            station: Arc::new(RwLock::new(station)),
            catalog: Arc::new(RwLock::new(catalog)),
            satellite_config: Arc::new(RwLock::new(satellite_config)),
            satellites: Arc::new(RwLock::new(Arc::new(satellites))),
            ephemeris: Arc::new(RwLock::new(None)),
        };

        state.refresh_ephemeris().await;
        state
    }

    pub async fn observer(&self) -> Observer {
        self.station.read().await.observer
    }

    pub async fn tracked(&self) -> Arc<Vec<Satellite>> {
        self.satellites.read().await.clone()
    }

    /// Rebuild the tracked set from the current catalog and satellite config.
    pub async fn retrack(&self) {
        let satellites = {
            let catalog = self.catalog.read().await;
            let satellite_config = self.satellite_config.read().await;
            satellite_config.enrich(
                &catalog,
                self.config.predict.default_transmission_radius_km,
            )
        };
        *self.satellites.write().await = Arc::new(satellites);
    }

    /// Recompute the cached ephemeris around the current time.
    pub async fn refresh_ephemeris(&self) {
        let satellites = self.tracked().await;
        let now = Utc::now();
        let hours_radius = self.config.ephemeris.hours_radius;
        let step_seconds = self.config.ephemeris.step_seconds;

        let result = tokio::task::spawn_blocking(move || {
            generate_ephemeris(satellites.as_slice(), now, hours_radius, step_seconds)
        })
        .await;

        match result {
            Ok(ephemeris) => {
                *self.ephemeris.write().await = Some(CachedEphemeris {
                    center_time: now,
                    ephemeris: Arc::new(ephemeris),
                });
                log::info!(
                    "Ephemeris cached at {} (±{} hours)",
                    now.to_rfc3339(),
                    hours_radius
                );
            }
            Err(e) => log::warn!("Ephemeris computation failed: {}", e),
        }
    }

    /// Reload the TLE catalog if its source changed on disk, then re-enrich
    /// and recompute the cache. Warns when the source is older than `max_age`.
    pub async fn check_tle(&self) {
        let (changed, modified) = {
            let catalog = self.catalog.read().await;
            (catalog.changed_on_disk(), catalog.source_modified())
        };

        if let Some(age) = modified.and_then(|m| SystemTime::now().duration_since(m).ok()) {
            let age_hours = age.as_secs_f64() / 3600.0;
            if age > self.config.tle.max_age {
                log::warn!("TLE cache is {:.1} hours old", age_hours);
            } else {
                log::info!("TLE cache is {:.1} hours old", age_hours);
            }
        }

        if !changed {
            return;
        }

        log::info!("TLE source changed on disk, reloading");
        if let Err(e) = self.catalog.write().await.reload() {
            log::warn!("TLE reload failed: {}", e);
            return;
        }
        self.retrack().await;
        self.refresh_ephemeris().await;
    }
}

pub fn spawn_refresh_task(state: AppState) -> tokio::task::JoinHandle<()> {
    let period = state.config.tle.check_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        // The first tick completes immediately; startup already loaded everything.
        interval.tick().await;
        loop {
            interval.tick().await;
            state.check_tle().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const ISS_TLE: &str = "ISS (ZARYA)
1 25544U 98067A   08264.51782528 -.00002182  00000-0 -11606-4 0  2927
2 25544  51.6416 247.4627 0006703 130.5360 325.0288 15.72125391563537
";

    fn config_in(dir: &std::path::Path) -> Config {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join("active.txt"), ISS_TLE).unwrap();
        fs::write(
            dir.join("satellites.json"),
            r#"{"25544": {"name": "ISS", "transmission_radius_km": 2000}}"#,
        )
        .unwrap();

        Config::from_yaml(&format!(
            "station:\n  coordinates: \"48.4172, 8.7526\"\ntle:\n  file: {}\nsatellites_file: {}\nephemeris:\n  hours_radius: 0.1\n  step_seconds: 60\n",
            dir.join("active.txt").display(),
            dir.join("satellites.json").display(),
        ))
        .unwrap()
    }

    #[tokio::test]
    async fn initializes_tracked_set_and_cache() {
        let dir = std::env::temp_dir().join(format!("sattrack-state-{}", std::process::id()));
        let config = config_in(&dir);
        let observer = config.observer().unwrap();

        let state = AppState::initialize(config, observer).await;

        let tracked = state.tracked().await;
        assert_eq!(tracked.len(), 1);
        assert_eq!(tracked[0].name, "ISS");
        assert_eq!(tracked[0].transmission_radius_km, 2000.0);

        let cached = state.ephemeris.read().await.clone().unwrap();
        assert!(cached.ephemeris.contains_key(&25544));

        // Unchanged source: nothing to reload.
        state.check_tle().await;
        assert_eq!(state.tracked().await.len(), 1);

        *state.satellite_config.write().await = SatelliteConfig::default();
        state.retrack().await;
        assert!(state.tracked().await.is_empty());
        // Earlier snapshots are unaffected.
        assert_eq!(tracked.len(), 1);

        let _ = fs::remove_dir_all(&dir);
    }
}
