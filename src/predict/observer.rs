use serde::Serialize;
use utoipa::ToSchema;

// WGS-84
pub const WGS84_A_KM: f64 = 6378.137;
pub const WGS84_E2: f64 = 0.006_694_379_990_14;

/// Fixed geodetic location of the ground station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct Observer {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub elevation_m: f64,
}

impl Default for Observer {
    fn default() -> Self {
        Self {
            latitude_deg: 0.0,
            longitude_deg: 0.0,
            elevation_m: 0.0,
        }
    }
}

impl Observer {
    pub fn new(latitude_deg: f64, longitude_deg: f64, elevation_m: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            elevation_m,
        }
    }

    /// Parses `"lat, lon"`.
    pub fn from_coordinates(coordinates: &str, elevation_m: Option<f64>) -> Option<Self> {
        let parts: Vec<_> = coordinates.split(',').map(|s| s.trim()).collect();
        if parts.len() < 2 {
            return None;
        }
        let lat: f64 = parts[0].parse().ok()?;
        let lon: f64 = parts[1].parse().ok()?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=360.0).contains(&lon) {
            return None;
        }
        Some(Self::new(lat, lon, elevation_m.unwrap_or(0.0)))
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn position_ecef_km(&self) -> [f64; 3] {
        let lat = self.lat_rad();
        let lon = self.lon_rad();
        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        let alt_km = self.elevation_m / 1000.0;
        [
            (n + alt_km) * cos_lat * lon.cos(),
            (n + alt_km) * cos_lat * lon.sin(),
            (n * (1.0 - WGS84_E2) + alt_km) * sin_lat,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn parses_coordinates() {
        let obs = Observer::from_coordinates("48.417203, 8.752587", Some(445.0)).unwrap();
        assert_relative_eq!(obs.latitude_deg, 48.417203);
        assert_relative_eq!(obs.longitude_deg, 8.752587);
        assert_relative_eq!(obs.elevation_m, 445.0);
    }

    #[test]
    fn rejects_bad_coordinates() {
        assert!(Observer::from_coordinates("48.4", None).is_none());
        assert!(Observer::from_coordinates("north, east", None).is_none());
        assert!(Observer::from_coordinates("91.0, 0.0", None).is_none());
    }

    #[test]
    fn ecef_on_equator_and_pole() {
        let eq = Observer::new(0.0, 0.0, 0.0).position_ecef_km();
        assert_relative_eq!(eq[0], WGS84_A_KM, epsilon = 1e-9);
        assert_relative_eq!(eq[1], 0.0, epsilon = 1e-9);
        assert_relative_eq!(eq[2], 0.0, epsilon = 1e-9);

        let pole = Observer::new(90.0, 0.0, 0.0).position_ecef_km();
        assert_relative_eq!(pole[2], 6356.752, epsilon = 1e-3);
    }
}
