//! Great-circle distance, used to sort stores by proximity.

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Haversine distance between two WGS84 coordinates, in kilometres.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_for_identical_points() {
        assert!(haversine_km(9.93, 76.27, 9.93, 76.27) < 1e-9);
    }

    #[test]
    fn one_degree_of_longitude_at_the_equator() {
        let d = haversine_km(0.0, 0.0, 0.0, 1.0);
        assert!((d - 111.19).abs() < 0.5, "got {d}");
    }

    #[test]
    fn symmetric() {
        let a = haversine_km(9.93, 76.27, 12.97, 77.59);
        let b = haversine_km(12.97, 77.59, 9.93, 76.27);
        assert!((a - b).abs() < 1e-9);
        // Kochi to Bangalore is a few hundred kilometres.
        assert!(a > 250.0 && a < 450.0, "got {a}");
    }
}
