//! Distance calculations on a spherical Earth.
//!
//! The polyline distance uses a local planar projection centred on the
//! query latitude. It is not geodesically exact but is accurate to well
//! under 1% at the ~100 km scale used for trench proximity.

/// Mean Earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

const EARTH_RADIUS_M: f64 = EARTH_RADIUS_KM * 1000.0;

/// Returned by `distance_to_polyline_km` when there is no segment to
/// measure against. Never satisfies a threshold comparison.
pub const UNREACHABLE_DISTANCE_KM: f64 = f64::MAX;

/// Great-circle distance between two coordinates, in kilometres.
pub fn haversine_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Minimum distance in kilometres from a point to a connected sequence of
/// segments given as `(lat, lon)` vertices.
///
/// Returns `UNREACHABLE_DISTANCE_KM` for fewer than two vertices.
pub fn distance_to_polyline_km(lat: f64, lon: f64, vertices: &[(f64, f64)]) -> f64 {
    let cos_lat0 = lat.to_radians().cos();
    let project = |lat: f64, lon: f64| -> (f64, f64) {
        (
            lon.to_radians() * EARTH_RADIUS_M * cos_lat0,
            lat.to_radians() * EARTH_RADIUS_M,
        )
    };

    let (px, py) = project(lat, lon);

    let min_m = vertices
        .windows(2)
        .map(|seg| {
            let (ax, ay) = project(seg[0].0, seg[0].1);
            let (bx, by) = project(seg[1].0, seg[1].1);
            point_to_segment_m((px, py), (ax, ay), (bx, by))
        })
        .fold(f64::INFINITY, f64::min);

    if min_m.is_finite() {
        min_m / 1000.0
    } else {
        UNREACHABLE_DISTANCE_KM
    }
}

fn point_to_segment_m(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (vx, vy) = (b.0 - a.0, b.1 - a.1);
    let (wx, wy) = (p.0 - a.0, p.1 - a.1);
    let len2 = vx * vx + vy * vy;
    // Degenerate segment: distance to its single point.
    let t = if len2 == 0.0 {
        0.0
    } else {
        ((wx * vx + wy * vy) / len2).clamp(0.0, 1.0)
    };
    let dx = p.0 - (a.0 + t * vx);
    let dy = p.1 - (a.1 + t * vy);
    (dx * dx + dy * dy).sqrt()
}
