use geo::{Coord, LineString, SimplifyIdx};
use geomeasure_types::cartesian::CartesianPoint2d;

/// Reduces the number of points in a line with the Douglas-Peucker algorithm.
///
/// A point is kept if it is farther than `tolerance` from the segment between the points kept around it. Only `x`
/// and `y` components of the points take part in the distance computation, other components of the kept points are
/// preserved. The first and the last points are always kept, lines of 2 or fewer points are returned unchanged.
pub fn simplify<P>(points: &[P], tolerance: f64) -> Vec<P>
where
    P: CartesianPoint2d<Num = f64> + Clone,
{
    if points.len() <= 2 {
        return points.to_vec();
    }

    let line: LineString<f64> = points
        .iter()
        .map(|point| Coord {
            x: point.x(),
            y: point.y(),
        })
        .collect();

    // `geo` leaves the line untouched for non-positive epsilon. Zero tolerance still drops points lying exactly on
    // the line.
    let epsilon = tolerance.max(f64::MIN_POSITIVE);
    line.simplify_idx(&epsilon)
        .into_iter()
        .map(|index| points[index].clone())
        .collect()
}
