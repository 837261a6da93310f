use crate::models::coordinates::Coordinates;

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Great-circle distance between two points, in meters.
pub fn haversine_meters(from: Coordinates, to: Coordinates) -> f64 {
    let phi1 = from.lat.to_radians();
    let phi2 = to.lat.to_radians();
    let d_phi = (to.lat - from.lat).to_radians();
    let d_lambda = (to.lng - from.lng).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Human readout: "350 m" below one kilometer, "1.2 km" above.
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{} m", meters.round() as i64)
    } else {
        format!("{:.1} km", meters / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAIRO: Coordinates = Coordinates {
        lat: 30.0444,
        lng: 31.2357,
    };
    const ALEXANDRIA: Coordinates = Coordinates {
        lat: 31.2001,
        lng: 29.9187,
    };

    #[test]
    fn distance_is_symmetric() {
        let pairs = [
            (CAIRO, ALEXANDRIA),
            (Coordinates::new(-33.86, 151.2), Coordinates::new(51.5, -0.12)),
            (Coordinates::new(0.0, 179.9), Coordinates::new(0.0, -179.9)),
        ];
        for (a, b) in pairs {
            assert_eq!(haversine_meters(a, b), haversine_meters(b, a));
        }
    }

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(haversine_meters(CAIRO, CAIRO), 0.0);
        assert_eq!(haversine_meters(ALEXANDRIA, ALEXANDRIA), 0.0);
    }

    #[test]
    fn cairo_to_alexandria_is_about_179_km() {
        let d = haversine_meters(CAIRO, ALEXANDRIA);
        assert!((d - 179_000.0).abs() <= 2_000.0, "got {d}");
    }

    #[test]
    fn readout_switches_to_kilometers() {
        assert_eq!(format_distance(0.0), "0 m");
        assert_eq!(format_distance(205.4), "205 m");
        assert_eq!(format_distance(999.4), "999 m");
        assert_eq!(format_distance(1_240.0), "1.2 km");
        assert_eq!(format_distance(179_984.0), "180.0 km");
    }
}
