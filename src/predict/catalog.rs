use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::predict::error::PredictError;
use crate::predict::satellite::Satellite;
use crate::predict::tle_loader::TleLoader;

/// Per-satellite configuration. Older files store a bare display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SatelliteEntry {
    Name(String),
    Detailed {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        transmission_radius_km: Option<f64>,
        /// Fields owned by other tools (recording commands, webhooks, ...),
        /// kept verbatim.
        #[serde(flatten)]
        extra: Map<String, Value>,
    },
}

impl SatelliteEntry {
    pub fn name(&self) -> Option<&str> {
        match self {
            SatelliteEntry::Name(name) => Some(name),
            SatelliteEntry::Detailed { name, .. } => name.as_deref(),
        }
    }

    pub fn transmission_radius_km(&self) -> Option<f64> {
        match self {
            SatelliteEntry::Name(_) => None,
            SatelliteEntry::Detailed {
                transmission_radius_km,
                ..
            } => *transmission_radius_km,
        }
    }
}

/// Tracked satellites keyed by catalog id string, as stored on disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SatelliteConfig {
    pub entries: BTreeMap<String, SatelliteEntry>,
}

impl SatelliteConfig {
    /// A missing file yields an empty configuration.
    pub fn load(path: &Path) -> Result<Self, PredictError> {
        if !path.exists() {
            log::warn!(
                "Satellite config {} not found, tracking nothing",
                path.display()
            );
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), PredictError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Entries keyed by parsed catalog id. Keys are trimmed before parsing,
    /// so `"025544"` and `"25544"` name the same satellite; the first in key
    /// order wins. Non-numeric keys are ignored.
    fn by_id(&self) -> BTreeMap<u32, &SatelliteEntry> {
        let mut ids = BTreeMap::new();
        for (key, entry) in &self.entries {
            if let Ok(id) = key.trim().parse::<u32>() {
                ids.entry(id).or_insert(entry);
            }
        }
        ids
    }

    pub fn tracked_ids(&self) -> HashSet<u32> {
        self.by_id().into_keys().collect()
    }

    /// Keys that do not name a catalog id.
    pub fn ignored_keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .keys()
            .filter(|k| k.trim().parse::<u32>().is_err())
            .map(String::as_str)
    }

    pub fn get(&self, norad_id: u32) -> Option<&SatelliteEntry> {
        self.by_id().get(&norad_id).copied()
    }

    /// Builds the tracked set from the TLE catalog, applying configured names
    /// and transmission radii. Ids missing from the catalog are logged and
    /// skipped.
    pub fn enrich(&self, catalog: &TleLoader, default_radius_km: f64) -> Vec<Satellite> {
        let ids = self.by_id();

        let mut satellites = Vec::with_capacity(ids.len());
        for (&id, &entry) in &ids {
            let Some(tle) = catalog.get(id) else {
                log::warn!("Tracked satellite {} not present in TLE catalog", id);
                continue;
            };

            let satellite = match Satellite::from_elements(tle.elements.clone()) {
                Ok(sat) => sat,
                Err(e) => {
                    log::warn!("Cannot initialise propagator for {}: {}", id, e);
                    continue;
                }
            };

            let name = entry
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| tle.info.name.clone());
            let radius = entry.transmission_radius_km().unwrap_or(default_radius_km);

            satellites.push(satellite.with_name(name).with_transmission_radius_km(radius));
        }

        log::info!("Tracking {} satellites", satellites.len());
        satellites
    }
}
