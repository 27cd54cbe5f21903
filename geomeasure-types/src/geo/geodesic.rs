use std::f64::consts::PI;

use ::geo::{GeodesicDistance, Point};

use crate::geo::impls::GeodeticPoint;
use crate::geo::traits::point::GeoPoint;

/// Geodesic computations between two points.
pub trait GeodesyProvider: Send + Sync {
    /// Length of the geodesic between the surface projections of two points, in meters. Heights of the points are
    /// ignored.
    fn surface_distance(&self, from: &GeodeticPoint, to: &GeodeticPoint) -> f64;

    /// Initial bearing from `from` to `to` in degrees in the range `[0, 360)`.
    ///
    /// The default implementation uses the spherical formula over latitude and longitude differences.
    fn initial_bearing(&self, from: &GeodeticPoint, to: &GeodeticPoint) -> f64 {
        let lat1 = from.lat_rad();
        let lon1 = from.lon_rad();
        let lat2 = to.lat_rad();
        let lon2 = to.lon_rad();

        let mut angle = -((lon1 - lon2).sin() * lat2.cos())
            .atan2(lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * (lon1 - lon2).cos());
        if angle < 0.0 {
            angle += PI * 2.0;
        }

        angle.to_degrees()
    }

    /// Distance between two points over a locally flat earth: surface distance combined with the height difference
    /// as `sqrt(surface² + Δh²)`.
    fn slant_distance(&self, from: &GeodeticPoint, to: &GeodeticPoint) -> f64 {
        let surface = self.surface_distance(from, to);
        let dh = to.height() - from.height();
        (surface * surface + dh * dh).sqrt()
    }
}

/// Geodesics on the WGS84 ellipsoid.
///
/// Surface distances are computed by the `geo` crate (Karney's algorithm). Initial bearings use the spherical
/// formula of [`GeodesyProvider::initial_bearing`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EllipsoidGeodesic;

impl GeodesyProvider for EllipsoidGeodesic {
    fn surface_distance(&self, from: &GeodeticPoint, to: &GeodeticPoint) -> f64 {
        Point::new(from.lon(), from.lat()).geodesic_distance(&Point::new(to.lon(), to.lat()))
    }
}
