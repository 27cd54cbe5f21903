//! Geometry primitives used by the `geomeasure` tools.
//!
//! The crate is split into two coordinate worlds:
//!
//! * [`geo`] contains points on the surface of the Earth ([`GeodeticPoint`](geo::GeodeticPoint)) and the
//!   [`GeodesyProvider`](geo::GeodesyProvider) trait that gives surface distances and bearings between points.
//! * [`cartesian`] contains planar points and helpers, that are used where only `x/y` components matter
//!   (bounding boxes, screen positions).

pub mod cartesian;
pub mod geo;
