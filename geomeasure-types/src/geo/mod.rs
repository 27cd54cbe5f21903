//! Points in geographic coordinates (see [`GeodeticPoint`]) and geodesic computations between points (see
//! [`GeodesyProvider`]).

mod geodesic;
pub mod impls;
mod traits;

pub use geodesic::{EllipsoidGeodesic, GeodesyProvider};
pub use impls::GeodeticPoint;
pub use traits::point::GeoPoint;
