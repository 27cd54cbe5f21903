use num_traits::{Bounded, FromPrimitive, Num};

/// A point in 2-dimensional cartesian space.
///
/// Points of higher dimensions can implement this trait too, in which case only the `x` and `y` components take
/// part in the planar computations.
pub trait CartesianPoint2d {
    /// Numeric type of the coordinates.
    type Num: Num + Copy + PartialOrd + Bounded + FromPrimitive;

    /// X coordinate.
    fn x(&self) -> Self::Num;
    /// Y coordinate.
    fn y(&self) -> Self::Num;
}
