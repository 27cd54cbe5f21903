//! Implementations of geographic point types.

mod point;

pub use point::GeodeticPoint;
