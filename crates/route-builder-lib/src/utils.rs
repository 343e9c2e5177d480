//! Distance and projection helpers for route statistics and map framing

use crate::geometry::GeoPoint;
use geo::{Point, Rect};

/// Web Mercator bounds in meters (EPSG:3857)
pub const EARTH_MERCATOR_MAX: f64 = 20037508.34;
pub const EARTH_MERCATOR_MIN: f64 = -20037508.34;
pub const EARTH_SIZE_METERS: f64 = EARTH_MERCATOR_MAX - EARTH_MERCATOR_MIN;

/// Maximum latitude that can be represented in Web Mercator
pub const MAX_LATITUDE: f64 = 85.05112878;

/// Mean Earth radius in meters
pub const EARTH_RADIUS_M: f64 = 6371000.0;

/// Side of one map tile in pixels
pub const TILE_SIZE_PX: f64 = 256.0;

/// Zoom range used when framing a route
pub const MIN_FIT_ZOOM: f64 = 2.0;
pub const MAX_FIT_ZOOM: f64 = 17.0;

const LON_TO_X_FACTOR: f64 = EARTH_MERCATOR_MAX / 180.0;
const Y_FACTOR: f64 = EARTH_MERCATOR_MAX / std::f64::consts::PI;

/// Convert WGS84 (lat, lon) to Web Mercator (x, y) in meters.
///
/// Latitude is clamped to the Mercator range first.
#[inline(always)]
pub fn wgs84_to_mercator(lat: f64, lon: f64) -> Point<f64> {
    let lat = lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
    let x = lon * LON_TO_X_FACTOR;
    let lat_rad = lat.to_radians();
    let y = (lat_rad.tan() + (1.0 / lat_rad.cos())).ln() * Y_FACTOR;
    Point::new(x, y)
}

/// Great-circle distance between two positions in meters
#[inline]
pub fn haversine_distance(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.y().to_radians();
    let lat2 = to.y().to_radians();
    let delta_lat = (to.y() - from.y()).to_radians();
    let delta_lon = (to.x() - from.x()).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Length of the polyline through `points` in meters
pub fn route_length(points: impl IntoIterator<Item = GeoPoint>) -> f64 {
    #[cfg(feature = "profiling")]
    profiling::scope!("utils::route_length");
    let mut points = points.into_iter();
    let Some(mut previous) = points.next() else {
        return 0.0;
    };
    let mut total = 0.0;
    for point in points {
        total += haversine_distance(previous, point);
        previous = point;
    }
    total
}

/// Human readable distance: meters below one kilometer, kilometers above
pub fn format_distance(meters: f64) -> String {
    if meters < 1000.0 {
        format!("{meters:.0} m")
    } else if meters < 100_000.0 {
        format!("{:.1} km", meters / 1000.0)
    } else {
        format!("{:.0} km", meters / 1000.0)
    }
}

/// Center and zoom that fit `bounds` into a viewport of the given size.
///
/// `bounds` is in WGS84 degrees (x = lon, y = lat). A degenerate box (one
/// waypoint) gets [`MAX_FIT_ZOOM`].
pub fn fit_bounds(bounds: Rect<f64>, viewport_width_px: f64, viewport_height_px: f64) -> (GeoPoint, f64) {
    let center: GeoPoint = bounds.center().into();

    let min = wgs84_to_mercator(bounds.min().y, bounds.min().x);
    let max = wgs84_to_mercator(bounds.max().y, bounds.max().x);
    let width_m = (max.x() - min.x()).abs();
    let height_m = (max.y() - min.y()).abs();

    let zoom_for = |extent_m: f64, viewport_px: f64| {
        if extent_m <= f64::EPSILON || viewport_px <= 0.0 {
            MAX_FIT_ZOOM
        } else {
            (viewport_px * EARTH_SIZE_METERS / (extent_m * TILE_SIZE_PX)).log2()
        }
    };
    let zoom = zoom_for(width_m, viewport_width_px)
        .min(zoom_for(height_m, viewport_height_px))
        .clamp(MIN_FIT_ZOOM, MAX_FIT_ZOOM);

    (center, zoom)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::lat_lon;
    use geo::Coord;

    #[test]
    fn test_wgs84_to_mercator_origin() {
        let point = wgs84_to_mercator(0.0, 0.0);
        assert!(point.x().abs() < 0.01);
        assert!(point.y().abs() < 0.01);
    }

    #[test]
    fn test_wgs84_to_mercator_bounds() {
        let east = wgs84_to_mercator(0.0, 180.0);
        assert!((east.x() - EARTH_MERCATOR_MAX).abs() < 1.0);
    }

    #[test]
    fn test_haversine_moscow_paris() {
        let distance = haversine_distance(lat_lon(55.7558, 37.6173), lat_lon(48.8566, 2.3522));
        // ~2487 km
        assert!((distance - 2_487_000.0).abs() < 10_000.0);
    }

    #[test]
    fn test_haversine_same_point() {
        let point = lat_lon(51.66082, 39.200404);
        assert_eq!(haversine_distance(point, point), 0.0);
    }

    #[test]
    fn test_route_length() {
        assert_eq!(route_length(Vec::new()), 0.0);
        assert_eq!(route_length(vec![lat_lon(10.0, 10.0)]), 0.0);

        let a = lat_lon(55.7558, 37.6173);
        let b = lat_lon(52.52, 13.405);
        let c = lat_lon(48.8566, 2.3522);
        let total = route_length(vec![a, b, c]);
        assert!((total - haversine_distance(a, b) - haversine_distance(b, c)).abs() < 1e-6);
    }

    #[test]
    fn test_format_distance() {
        assert_eq!(format_distance(0.0), "0 m");
        assert_eq!(format_distance(999.4), "999 m");
        assert_eq!(format_distance(1500.0), "1.5 km");
        assert_eq!(format_distance(2_487_000.0), "2487 km");
    }

    #[test]
    fn test_fit_bounds_single_point() {
        let bounds = Rect::new(
            Coord { x: 37.6, y: 55.7 },
            Coord { x: 37.6, y: 55.7 },
        );
        let (center, zoom) = fit_bounds(bounds, 800.0, 600.0);
        assert_eq!(center, lat_lon(55.7, 37.6));
        assert_eq!(zoom, MAX_FIT_ZOOM);
    }

    #[test]
    fn test_fit_bounds_wider_route_zooms_out() {
        let small = Rect::new(Coord { x: 37.0, y: 55.0 }, Coord { x: 38.0, y: 56.0 });
        let large = Rect::new(Coord { x: 2.0, y: 48.0 }, Coord { x: 38.0, y: 56.0 });

        let (_, small_zoom) = fit_bounds(small, 800.0, 600.0);
        let (_, large_zoom) = fit_bounds(large, 800.0, 600.0);

        assert!(large_zoom < small_zoom);
        assert!(large_zoom >= MIN_FIT_ZOOM);
    }
}
