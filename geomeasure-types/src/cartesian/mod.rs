//! Types and functions on geometries in cartesian coordinates.

mod impls;
mod rect;
mod traits;

pub use impls::{Point2, Point2d};
pub use rect::Rect;
pub use traits::*;
