use chrono::{DateTime, Utc};
use sgp4::{Constants, Elements};

use crate::predict::error::PredictError;
use crate::predict::observer::Observer;
use crate::predict::propagation::{ecef_to_geodetic, look_angles, propagate_ecef, LookAngles, Subpoint};

pub const DEFAULT_TRANSMISSION_RADIUS_KM: f64 = 2500.0;

/// A body whose ground track can be evaluated at arbitrary instants.
///
/// Pass detection and ephemeris generation are written against this trait so
/// they do not care whether positions come from SGP4 or a synthetic model.
/// Implementations return NaN coordinates for instants they cannot evaluate.
pub trait GroundTrack {
    fn norad_id(&self) -> u32;

    fn name(&self) -> &str;

    /// Range threshold, in kilometres of ground distance, for "in range".
    fn transmission_radius_km(&self) -> f64;

    fn subpoint(&self, at: DateTime<Utc>) -> Subpoint;

    fn look_angles(&self, observer: &Observer, at: DateTime<Utc>) -> LookAngles;
}

/// A tracked satellite: SGP4 elements plus per-satellite configuration.
pub struct Satellite {
    pub norad_id: u32,
    pub name: String,
    pub transmission_radius_km: f64,
    elements: Elements,
    constants: Constants,
}

impl Satellite {
    pub fn from_elements(elements: Elements) -> Result<Self, PredictError> {
        let constants = Constants::from_elements(&elements)
            .map_err(|e| PredictError::Propagation(e.to_string()))?;
        let norad_id = elements.norad_id as u32;
        let name = elements
            .object_name
            .clone()
            .unwrap_or_else(|| format!("NORAD {}", norad_id));

        Ok(Self {
            norad_id,
            name,
            transmission_radius_km: DEFAULT_TRANSMISSION_RADIUS_KM,
            elements,
            constants,
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_transmission_radius_km(mut self, radius_km: f64) -> Self {
        self.transmission_radius_km = radius_km;
        self
    }

    pub fn elements(&self) -> &Elements {
        &self.elements
    }

    pub fn position_ecef_km(&self, at: DateTime<Utc>) -> Result<[f64; 3], PredictError> {
        propagate_ecef(&self.elements, &self.constants, at)
    }
}

impl GroundTrack for Satellite {
    fn norad_id(&self) -> u32 {
        self.norad_id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn transmission_radius_km(&self) -> f64 {
        self.transmission_radius_km
    }

    fn subpoint(&self, at: DateTime<Utc>) -> Subpoint {
        match self.position_ecef_km(at) {
            Ok(ecef) => ecef_to_geodetic(ecef),
            Err(e) => {
                log::trace!("{}: no subpoint at {}: {}", self.name, at, e);
                Subpoint::NAN
            }
        }
    }

    fn look_angles(&self, observer: &Observer, at: DateTime<Utc>) -> LookAngles {
        match self.position_ecef_km(at) {
            Ok(ecef) => look_angles(observer, ecef),
            Err(_) => LookAngles::NAN,
        }
    }
}
