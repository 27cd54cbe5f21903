use approx::AbsDiffEq;
use serde::{Deserialize, Serialize};

use crate::cartesian::CartesianPoint2d;
use crate::geo::traits::point::GeoPoint;

/// Point above (or below) the reference ellipsoid: longitude and latitude in degrees and height in meters.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Deserialize, Serialize)]
pub struct GeodeticPoint {
    lon: f64,
    lat: f64,
    height: f64,
}

impl GeodeticPoint {
    /// Creates a new point.
    pub const fn new(lon: f64, lat: f64, height: f64) -> Self {
        Self { lon, lat, height }
    }

    /// Height above the ellipsoid in meters.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Returns the same surface position with the height replaced.
    pub fn with_height(&self, height: f64) -> Self {
        Self { height, ..*self }
    }

    /// Coordinates as `[lon, lat, height]`.
    pub fn coords(&self) -> [f64; 3] {
        [self.lon, self.lat, self.height]
    }
}

impl GeoPoint for GeodeticPoint {
    type Num = f64;

    fn lat(&self) -> f64 {
        self.lat
    }

    fn lon(&self) -> f64 {
        self.lon
    }
}

impl CartesianPoint2d for GeodeticPoint {
    type Num = f64;

    fn x(&self) -> f64 {
        self.lon
    }

    fn y(&self) -> f64 {
        self.lat
    }
}

impl AbsDiffEq for GeodeticPoint {
    type Epsilon = f64;

    fn default_epsilon() -> Self::Epsilon {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: Self::Epsilon) -> bool {
        self.lon.abs_diff_eq(&other.lon, epsilon)
            && self.lat.abs_diff_eq(&other.lat, epsilon)
            && self.height.abs_diff_eq(&other.height, epsilon)
    }
}

/// Creates a new [`GeodeticPoint`] from longitude, latitude (in degrees) and optional height (in meters).
///
/// ```
/// use geomeasure_types::geo::GeoPoint;
/// use geomeasure_types::geodetic;
///
/// let point = geodetic!(52.0, 38.0, 120.0);
/// assert_eq!(point.lat(), 38.0);
/// assert_eq!(point.height(), 120.0);
/// ```
#[macro_export]
macro_rules! geodetic {
    ($lon:expr, $lat:expr) => {
        $crate::geo::GeodeticPoint::new($lon, $lat, 0.0)
    };
    ($lon:expr, $lat:expr, $height:expr) => {
        $crate::geo::GeodeticPoint::new($lon, $lat, $height)
    };
}
