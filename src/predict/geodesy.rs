use serde::Serialize;
use strum_macros::Display;
use utoipa::ToSchema;

/// Mean Earth radius used for ground-track distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance in kilometres between two points given in degrees,
/// using the haversine formula on a sphere of radius [`EARTH_RADIUS_KM`].
pub fn great_circle_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// 16-point compass rose, clockwise from north.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, ToSchema)]
#[strum(serialize_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum CompassPoint {
    N,
    Nne,
    Ne,
    Ene,
    E,
    Ese,
    Se,
    Sse,
    S,
    Ssw,
    Sw,
    Wsw,
    W,
    Wnw,
    Nw,
    Nnw,
}

const COMPASS_ROSE: [CompassPoint; 16] = [
    CompassPoint::N,
    CompassPoint::Nne,
    CompassPoint::Ne,
    CompassPoint::Ene,
    CompassPoint::E,
    CompassPoint::Ese,
    CompassPoint::Se,
    CompassPoint::Sse,
    CompassPoint::S,
    CompassPoint::Ssw,
    CompassPoint::Sw,
    CompassPoint::Wsw,
    CompassPoint::W,
    CompassPoint::Wnw,
    CompassPoint::Nw,
    CompassPoint::Nnw,
];

impl CompassPoint {
    /// Sector containing `azimuth_deg`. Each sector is 22.5° wide and centred
    /// on its direction, so north covers [348.75°, 11.25°).
    pub fn from_azimuth(azimuth_deg: f64) -> Self {
        // Truncating cast; NaN maps to sector 0.
        let sector = ((azimuth_deg + 11.25) / 22.5) as i64;
        COMPASS_ROSE[sector.rem_euclid(16) as usize]
    }
}

pub fn degrees_to_cardinal(azimuth_deg: f64) -> String {
    CompassPoint::from_azimuth(azimuth_deg).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn distance_is_symmetric() {
        let points = [
            (48.4172, 8.7526),
            (-33.86, 151.21),
            (0.0, 0.0),
            (89.9, -179.9),
            (-45.0, 90.0),
        ];
        for &(lat1, lon1) in &points {
            for &(lat2, lon2) in &points {
                let ab = great_circle_distance_km(lat1, lon1, lat2, lon2);
                let ba = great_circle_distance_km(lat2, lon2, lat1, lon1);
                assert_abs_diff_eq!(ab, ba, epsilon = 1e-9);
            }
        }
    }

    #[test]
    fn distance_to_self_is_zero() {
        for &(lat, lon) in &[(48.4172, 8.7526), (0.0, 0.0), (-90.0, 45.0), (12.5, -170.0)] {
            assert_abs_diff_eq!(great_circle_distance_km(lat, lon, lat, lon), 0.0, epsilon = 1e-9);
        }
    }

    #[test]
    fn antipodal_distance_is_half_circumference() {
        let d = great_circle_distance_km(0.0, 0.0, 0.0, 180.0);
        assert_abs_diff_eq!(d, std::f64::consts::PI * EARTH_RADIUS_KM, epsilon = 1e-6);
    }

    #[test]
    fn one_degree_along_equator() {
        let d = great_circle_distance_km(0.0, 0.0, 0.0, 1.0);
        assert_abs_diff_eq!(d, EARTH_RADIUS_KM * 1f64.to_radians(), epsilon = 1e-9);
    }

    #[test]
    fn cardinal_boundaries() {
        assert_eq!(degrees_to_cardinal(0.0), "N");
        assert_eq!(degrees_to_cardinal(360.0), "N");
        assert_eq!(degrees_to_cardinal(11.0), "N");
        assert_eq!(degrees_to_cardinal(11.25), "NNE");
        assert_eq!(degrees_to_cardinal(12.0), "NNE");
        assert_eq!(degrees_to_cardinal(348.75), "N");
        assert_eq!(degrees_to_cardinal(348.7), "NNW");
    }

    #[test]
    fn cardinal_principal_directions() {
        assert_eq!(CompassPoint::from_azimuth(90.0), CompassPoint::E);
        assert_eq!(CompassPoint::from_azimuth(180.0), CompassPoint::S);
        assert_eq!(CompassPoint::from_azimuth(270.0), CompassPoint::W);
        assert_eq!(CompassPoint::from_azimuth(225.0).to_string(), "SW");
        assert_eq!(CompassPoint::from_azimuth(f64::NAN), CompassPoint::N);
    }

    #[test]
    fn compass_point_serializes_uppercase() {
        let json = serde_json::to_string(&CompassPoint::Wnw).unwrap();
        assert_eq!(json, "\"WNW\"");
    }
}
