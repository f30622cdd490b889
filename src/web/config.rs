use serde::{Deserialize, Deserializer};
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::predict::{
    Observer, DEFAULT_HOURS_RADIUS, DEFAULT_STEP_SECONDS, DEFAULT_TRANSMISSION_RADIUS_KM,
    DEFAULT_WINDOW_HOURS,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("invalid station coordinates: {0}")]
    InvalidCoordinates(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub station: StationConfig,
    #[serde(default)]
    pub web: WebConfig,
    pub tle: TleConfig,
    #[serde(default = "default_satellites_file")]
    pub satellites_file: PathBuf,
    #[serde(default)]
    pub predict: PredictConfig,
    #[serde(default)]
    pub ephemeris: EphemerisConfig,
    #[serde(default)]
    pub api_keys: Vec<ApiKey>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

fn default_bind() -> String {
    "0.0.0.0:5000".to_string()
}

fn default_satellites_file() -> PathBuf {
    PathBuf::from("data/satellites.json")
}

#[derive(Debug, Clone, Deserialize)]
pub struct StationConfig {
    pub name: Option<String>,
    pub coordinates: String,
    #[serde(default)]
    pub altitude_m: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TleConfig {
    /// TLE cache file, or a directory of `.tle`/`.txt` files.
    pub file: PathBuf,
    #[serde(default = "default_max_age", deserialize_with = "deserialize_duration")]
    pub max_age: Duration,
    #[serde(
        default = "default_check_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub check_interval: Duration,
}

fn default_max_age() -> Duration {
    Duration::from_secs(12 * 3600)
}

fn default_check_interval() -> Duration {
    Duration::from_secs(3600)
}

#[derive(Debug, Clone, Deserialize)]
pub struct PredictConfig {
    #[serde(default = "default_window_hours")]
    pub window_hours: f64,
    #[serde(default = "default_min_elevation")]
    pub min_elevation: f64,
    #[serde(default = "default_radius")]
    pub default_transmission_radius_km: f64,
}

impl Default for PredictConfig {
    fn default() -> Self {
        Self {
            window_hours: default_window_hours(),
            min_elevation: default_min_elevation(),
            default_transmission_radius_km: default_radius(),
        }
    }
}

fn default_window_hours() -> f64 {
    DEFAULT_WINDOW_HOURS
}

fn default_min_elevation() -> f64 {
    10.0
}

fn default_radius() -> f64 {
    DEFAULT_TRANSMISSION_RADIUS_KM
}

#[derive(Debug, Clone, Deserialize)]
pub struct EphemerisConfig {
    #[serde(default = "default_hours_radius")]
    pub hours_radius: f64,
    #[serde(default = "default_step_seconds")]
    pub step_seconds: u32,
}

impl Default for EphemerisConfig {
    fn default() -> Self {
        Self {
            hours_radius: default_hours_radius(),
            step_seconds: default_step_seconds(),
        }
    }
}

fn default_hours_radius() -> f64 {
    DEFAULT_HOURS_RADIUS
}

fn default_step_seconds() -> u32 {
    DEFAULT_STEP_SECONDS
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiKey {
    pub key: String,
    pub name: String,
    pub permissions: HashSet<Permission>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    UpdateConfig,
    UpdateSatellites,
}

fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    humantime::parse_duration(s.trim()).map_err(serde::de::Error::custom)
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)?;
        config.observer()?;
        Ok(config)
    }

    pub fn observer(&self) -> Result<Observer, ConfigError> {
        Observer::from_coordinates(&self.station.coordinates, Some(self.station.altitude_m))
            .ok_or_else(|| ConfigError::InvalidCoordinates(self.station.coordinates.clone()))
    }

    pub fn find_api_key(&self, key: &str) -> Option<&ApiKey> {
        self.api_keys.iter().find(|k| k.key == key)
    }
}
