use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::Serialize;
use sgp4::Elements;
use utoipa::ToSchema;

use crate::predict::error::PredictError;
use crate::predict::types::SatelliteInfo;

const MAX_SEARCH_RESULTS: usize = 20;
const MIN_QUERY_LEN: usize = 2;

pub struct TleEntry {
    pub info: SatelliteInfo,
    pub elements: Elements,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SearchResult {
    pub norad_id: String,
    pub name: String,
    pub already_tracked: bool,
}

/// Every satellite in the TLE cache, keyed by catalog id.
pub struct TleLoader {
    source: PathBuf,
    satellites: BTreeMap<u32, TleEntry>,
    loaded_modified: Option<SystemTime>,
}

impl TleLoader {
    /// `source` is either a single TLE file or a directory of `.tle`/`.txt` files.
    pub fn new(source: PathBuf) -> Self {
        Self {
            source,
            satellites: BTreeMap::new(),
            loaded_modified: None,
        }
    }

    pub fn load_all(&mut self) -> Result<(), PredictError> {
        if !self.source.exists() {
            return Err(PredictError::SourceNotFound(
                self.source.display().to_string(),
            ));
        }

        let modified = self.source_modified();
        let mut satellites = BTreeMap::new();

        if self.source.is_dir() {
            for entry in fs::read_dir(&self.source)? {
                let path = entry?.path();
                if !path.is_file() {
                    continue;
                }
                let is_tle = path
                    .extension()
                    .is_some_and(|ext| ext == "tle" || ext == "txt");
                if !is_tle {
                    continue;
                }
                match parse_tle_file(&path) {
                    Ok(entries) => {
                        for tle_entry in entries {
                            satellites.insert(tle_entry.info.norad_id, tle_entry);
                        }
                    }
                    Err(e) => {
                        log::warn!("Failed to parse TLE file {}: {}", path.display(), e);
                    }
                }
            }
        } else {
            for tle_entry in parse_tle_file(&self.source)? {
                satellites.insert(tle_entry.info.norad_id, tle_entry);
            }
        }

        log::info!(
            "Loaded {} satellites from {}",
            satellites.len(),
            self.source.display()
        );

        self.satellites = satellites;
        self.loaded_modified = modified;
        Ok(())
    }

    pub fn reload(&mut self) -> Result<(), PredictError> {
        self.load_all()
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn satellites(&self) -> impl Iterator<Item = &TleEntry> {
        self.satellites.values()
    }

    pub fn get(&self, norad_id: u32) -> Option<&TleEntry> {
        self.satellites.get(&norad_id)
    }

    pub fn len(&self) -> usize {
        self.satellites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.satellites.is_empty()
    }

    pub fn source_modified(&self) -> Option<SystemTime> {
        fs::metadata(&self.source).and_then(|m| m.modified()).ok()
    }

    /// True when the source on disk differs from what was last loaded.
    pub fn changed_on_disk(&self) -> bool {
        match (self.source_modified(), self.loaded_modified) {
            (Some(now), Some(loaded)) => now != loaded,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// Case-insensitive substring match on name or catalog id.
    pub fn search(&self, query: &str, tracked: &HashSet<u32>) -> Vec<SearchResult> {
        let query = query.trim().to_lowercase();
        if query.chars().count() < MIN_QUERY_LEN {
            return Vec::new();
        }

        self.satellites
            .values()
            .filter(|entry| {
                entry.info.name.to_lowercase().contains(&query)
                    || entry.info.norad_id.to_string().contains(&query)
            })
            .take(MAX_SEARCH_RESULTS)
            .map(|entry| SearchResult {
                norad_id: entry.info.norad_id.to_string(),
                name: entry.info.name.clone(),
                already_tracked: tracked.contains(&entry.info.norad_id),
            })
            .collect()
    }
}

/// Parse a single TLE file (may contain multiple satellites)
fn parse_tle_file(path: &Path) -> Result<Vec<TleEntry>, PredictError> {
    let content = fs::read_to_string(path)?;
    let filename = path
        .file_name()
        .unwrap_or_default()
        .to_string_lossy()
        .to_string();
    Ok(parse_tle_text(&content, &filename))
}

/// Entries that fail to parse are skipped with a warning.
pub fn parse_tle_text(content: &str, source: &str) -> Vec<TleEntry> {
    let mut results = Vec::new();

    for (name, line1, line2) in parse_multi_tle(content) {
        let elements = match Elements::from_tle(name.clone(), line1.as_bytes(), line2.as_bytes()) {
            Ok(e) => e,
            Err(e) => {
                let err = PredictError::InvalidTle {
                    file: source.to_string(),
                    message: e.to_string(),
                };
                log::warn!("Skipping {}: {}", name.as_deref().unwrap_or("unnamed TLE"), err);
                continue;
            }
        };

        let sat_name = name.unwrap_or_else(|| format!("NORAD {}", elements.norad_id));

        results.push(TleEntry {
            info: SatelliteInfo {
                name: sat_name,
                norad_id: elements.norad_id as u32,
                tle_source: source.to_string(),
            },
            elements,
        });
    }

    results
}

/// Parse multi-satellite TLE content
fn parse_multi_tle(content: &str) -> Vec<(Option<String>, String, String)> {
    let lines: Vec<&str> = content
        .lines()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect();

    let mut result = Vec::new();
    let mut i = 0;

    while i < lines.len() {
        if lines[i].starts_with("1 ") && i + 1 < lines.len() && lines[i + 1].starts_with("2 ") {
            result.push((None, lines[i].to_string(), lines[i + 1].to_string()));
            i += 2;
        } else if i + 2 < lines.len()
            && lines[i + 1].starts_with("1 ")
            && lines[i + 2].starts_with("2 ")
        {
            let name = lines[i].strip_prefix("0 ").unwrap_or(lines[i]).trim();
            result.push((
                Some(name.to_string()),
                lines[i + 1].to_string(),
                lines[i + 2].to_string(),
            ));
            i += 3;
        } else {
            i += 1;
        }
    }

    result
}
