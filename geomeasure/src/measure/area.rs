use std::sync::Arc;

use geomeasure_types::cartesian::Rect;
use geomeasure_types::geo::{GeodesyProvider, GeodeticPoint};

use crate::measure::{MeasureContext, Measurement, SharedCapture};
use crate::scene::{Binding, Entity, EntityCollection, EntityId, EntityKind};

/// Area of the polygon in square meters.
///
/// The polygon is split into a fan of triangles sharing the first vertex. For every triangle the angle at its
/// middle vertex is taken from the difference of the initial bearings (normalized to `[0, 360)` degrees) and the
/// triangle contributes `d1 * d2 * sin(angle) / 2`, where `d1` and `d2` are slant distances from the first vertex.
/// The sine is applied to the angle value in degrees. The absolute value of the sum is rounded to 4 decimal
/// digits.
///
/// Returns 0 for less than 3 points.
pub fn polygon_area(geodesy: &dyn GeodesyProvider, points: &[GeodeticPoint]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }

    let mut sum = 0.0;
    for i in 0..n - 2 {
        let j = (i + 1) % n;
        let k = (i + 2) % n;
        let angle = corner_angle(geodesy, &points[i], &points[j], &points[k]);

        let d1 = geodesy.slant_distance(&points[j], &points[0]);
        let d2 = geodesy.slant_distance(&points[k], &points[0]);
        sum += d1 * d2 * angle.sin() / 2.0;
    }

    (sum.abs() * 1e4).round() / 1e4
}

fn corner_angle(
    geodesy: &dyn GeodesyProvider,
    p1: &GeodeticPoint,
    p2: &GeodeticPoint,
    p3: &GeodeticPoint,
) -> f64 {
    let angle = geodesy.initial_bearing(p2, p1) - geodesy.initial_bearing(p2, p3);
    if angle < 0.0 {
        angle + 360.0
    } else {
        angle
    }
}

/// Position of the area label: center of the longitude/latitude bounding box of the points at the given height.
///
/// With less than 3 points the first point is returned as is.
pub fn label_center(points: &[GeodeticPoint], height: f64) -> Option<GeodeticPoint> {
    if points.len() < 3 {
        return points.first().copied();
    }

    let center = Rect::from_points(points.iter())?.center();
    Some(GeodeticPoint::new(center.x, center.y, height))
}

fn closed(mut points: Vec<GeodeticPoint>) -> Vec<GeodeticPoint> {
    if let Some(&first) = points.first() {
        points.push(first);
    }
    points
}

fn area_text(area: f64) -> String {
    format!("Area: {area:.4} m²")
}

fn total_area_text(area: f64) -> String {
    format!("Total area: {area:.4} m²")
}

/// Draws a polygon with its dashed outline and a label with the polygon area.
#[derive(Debug, Default)]
pub struct AreaMeasurement {
    polygon: Option<EntityId>,
    result_label: Option<EntityId>,
    drawn: Vec<EntityId>,
}

impl AreaMeasurement {
    /// Ids of all entities drawn since the last clear.
    pub fn drawn(&self) -> &[EntityId] {
        &self.drawn
    }

    fn add(&mut self, entities: &EntityCollection, entity: Entity) -> EntityId {
        let id = entities.add(entity);
        self.drawn.push(id);
        id
    }

    fn label_height(capture: &SharedCapture, offset: f64) -> f64 {
        capture.read().reference_height().unwrap_or_default() + offset
    }

    fn create_live_label(&mut self, ctx: &MeasureContext) {
        let offset = ctx.config().label_height_offset();

        let position_capture = ctx.capture().clone();
        let position = Binding::live(move || {
            let height = Self::label_height(&position_capture, offset);
            let points = position_capture.read().live_points();
            label_center(&points, height).unwrap_or_default()
        });

        let text_capture = ctx.capture().clone();
        let geodesy = Arc::clone(ctx.geodesy());
        let text = Binding::live(move || {
            let points = text_capture.read().live_points();
            area_text(polygon_area(geodesy.as_ref(), &points))
        });

        let label = self.add(
            ctx.entities(),
            Entity::new(EntityKind::AreaResult)
                .with_position(position)
                .with_label(text),
        );
        self.result_label = Some(label);
    }
}

impl Measurement for AreaMeasurement {
    const MIN_POINTS: usize = 3;
    const UNIFY_HEIGHT: bool = true;

    fn start(&mut self) {
        self.polygon = None;
        self.result_label = None;
    }

    fn point_added(&mut self, ctx: &MeasureContext) {
        let (count, last) = {
            let capture = ctx.capture().read();
            (capture.points().len(), capture.points().last().copied())
        };
        let Some(last) = last else {
            return;
        };

        let entities = ctx.entities();
        if count == 1 {
            let polygon_capture = ctx.capture().clone();
            let outline_capture = ctx.capture().clone();
            let polygon = self.add(
                entities,
                Entity::new(EntityKind::AreaPolygon)
                    .with_polygon(Binding::live(move || polygon_capture.read().live_points()))
                    .with_polyline(Binding::live(move || {
                        closed(outline_capture.read().live_points())
                    })),
            );
            self.polygon = Some(polygon);
        }

        self.add(
            entities,
            Entity::new(EntityKind::AreaVertex).with_position(last),
        );
    }

    fn preview_moved(&mut self, ctx: &MeasureContext) {
        if self.result_label.is_none() && ctx.capture().read().live_points().len() >= 3 {
            self.create_live_label(ctx);
        }
    }

    fn finalize(&mut self, ctx: &MeasureContext) -> f64 {
        let points = ctx.capture().read().points().to_vec();
        let entities = ctx.entities();

        let area = polygon_area(ctx.geodesy().as_ref(), &points);
        let height = Self::label_height(ctx.capture(), ctx.config().label_height_offset());
        let center = label_center(&points, height).unwrap_or_default();

        if let Some(polygon) = self.polygon {
            let outline = closed(points.clone());
            entities.update(polygon, move |entity| {
                entity.set_polygon(points);
                entity.set_polyline(outline);
            });
        }

        let updated = self.result_label.is_some_and(|label| {
            entities.update(label, |entity| {
                entity.set_position(center);
                entity.set_label(total_area_text(area));
            })
        });
        if !updated {
            let label = self.add(
                entities,
                Entity::new(EntityKind::AreaResult)
                    .with_position(center)
                    .with_label(total_area_text(area)),
            );
            self.result_label = Some(label);
        }

        area
    }

    fn freeze(&mut self, entities: &EntityCollection) {
        for id in &self.drawn {
            entities.update(*id, Entity::freeze);
        }
    }

    fn clear(&mut self, entities: &EntityCollection) {
        for id in self.drawn.drain(..) {
            entities.remove(id);
        }

        self.polygon = None;
        self.result_label = None;
    }
}

#[cfg(test)]
mod tests {
    use approx::{assert_abs_diff_eq, assert_relative_eq};
    use geomeasure_types::geo::EllipsoidGeodesic;
    use geomeasure_types::geodetic;

    use super::*;
    use crate::control::UserEventHandler;
    use crate::measure::MeasureArea;
    use crate::scene::Viewer;
    use crate::tests::{click, move_to, right_click, PlanarGeodesy, TestPicker};

    fn planar_tool(picker: &TestPicker) -> (Viewer, MeasureArea) {
        let viewer = Viewer::new(Arc::new(picker.clone()));
        let tool = MeasureArea::with_measurement(
            viewer.clone(),
            AreaMeasurement::default(),
            Arc::new(PlanarGeodesy),
        );
        (viewer, tool)
    }

    fn find(entities: &EntityCollection, kind: EntityKind) -> Option<Entity> {
        entities
            .ids()
            .into_iter()
            .filter_map(|id| entities.get(id))
            .find(|e| e.kind() == kind)
    }

    #[test]
    fn fan_area_of_square() {
        let points = [
            geodetic!(0.0, 0.0),
            geodetic!(10.0, 0.0),
            geodetic!(10.0, 10.0),
            geodetic!(0.0, 10.0),
        ];

        // Both triangles have a 270 degree corner and legs of 10 and sqrt(200).
        let expected = (10.0 * 200f64.sqrt() * 270f64.sin()).abs();
        assert_abs_diff_eq!(
            polygon_area(&PlanarGeodesy, &points),
            expected,
            epsilon = 1e-4
        );
    }

    #[test]
    fn area_is_rounded_to_four_decimals() {
        let points = [
            geodetic!(10.0, 45.0),
            geodetic!(10.001, 45.0),
            geodetic!(10.001, 45.001),
        ];
        let area = polygon_area(&EllipsoidGeodesic, &points);
        assert!(area > 0.0);
        assert_abs_diff_eq!(area * 1e4, (area * 1e4).round(), epsilon = 1e-6);
    }

    #[test]
    fn ellipsoid_area_matches_reference_values() {
        let geodesy = EllipsoidGeodesic;

        let triangle = [
            geodetic!(116.39, 39.91, 50.0),
            geodetic!(116.40, 39.91, 50.0),
            geodetic!(116.40, 39.92, 50.0),
        ];
        assert_relative_eq!(
            polygon_area(&geodesy, &triangle),
            103_581.7256,
            max_relative = 1e-6
        );

        let quad = [
            geodetic!(10.0, 45.0),
            geodetic!(10.01, 45.0),
            geodetic!(10.01, 45.01),
            geodetic!(10.0, 45.01),
        ];
        assert_relative_eq!(
            polygon_area(&geodesy, &quad),
            228_620.5884,
            max_relative = 1e-6
        );
    }

    #[test]
    fn degenerate_polygon_has_no_area() {
        let geodesy = PlanarGeodesy;
        assert_eq!(polygon_area(&geodesy, &[]), 0.0);
        assert_eq!(
            polygon_area(&geodesy, &[geodetic!(0.0, 0.0), geodetic!(1.0, 1.0)]),
            0.0
        );
    }

    #[test]
    fn label_center_is_bbox_center() {
        let points = [
            geodetic!(0.0, 0.0, 5.0),
            geodetic!(4.0, 1.0, 5.0),
            geodetic!(2.0, 6.0, 5.0),
        ];
        assert_eq!(label_center(&points, 5.3), Some(geodetic!(2.0, 3.0, 5.3)));
        assert_eq!(
            label_center(&points[..2], 5.3),
            Some(geodetic!(0.0, 0.0, 5.0))
        );
        assert_eq!(label_center(&[], 0.0), None);
    }

    #[test]
    fn heights_are_unified_to_first_point() {
        let picker = TestPicker::default();
        picker.set_rendered(1.0, 1.0, geodetic!(0.0, 0.0, 12.0));
        picker.set_rendered(2.0, 2.0, geodetic!(10.0, 0.0, 40.0));
        picker.set_rendered(3.0, 3.0, geodetic!(10.0, 10.0, -3.0));
        picker.set_rendered(4.0, 4.0, geodetic!(0.0, 10.0, 99.0));
        let (_, mut tool) = planar_tool(&picker);

        tool.activate();
        tool.handle(&click(1.0, 1.0));
        tool.handle(&click(2.0, 2.0));
        tool.handle(&click(3.0, 3.0));
        tool.handle(&move_to(4.0, 4.0));

        assert!(tool.points().iter().all(|p| p.height() == 12.0));
        assert_eq!(tool.points().len(), 3);
        assert_eq!(tool.preview().map(|p| p.height()), Some(12.0));
    }

    #[test]
    fn live_label_appears_with_three_live_points() {
        let picker = TestPicker::default();
        picker.set_rendered(1.0, 1.0, geodetic!(0.0, 0.0, 1.0));
        picker.set_rendered(2.0, 2.0, geodetic!(10.0, 0.0, 1.0));
        picker.set_rendered(3.0, 3.0, geodetic!(10.0, 10.0, 1.0));
        let (viewer, mut tool) = planar_tool(&picker);

        tool.activate();
        tool.handle(&click(1.0, 1.0));
        tool.handle(&move_to(2.0, 2.0));
        assert!(find(viewer.entities(), EntityKind::AreaResult).is_none());

        tool.handle(&click(2.0, 2.0));
        tool.handle(&move_to(3.0, 3.0));
        let label = find(viewer.entities(), EntityKind::AreaResult).expect("label is created");
        assert!(label.is_live());
        assert_eq!(
            label.position().map(Binding::value),
            Some(geodetic!(5.0, 5.0, 1.3))
        );

        let polygon = find(viewer.entities(), EntityKind::AreaPolygon).expect("polygon is drawn");
        assert_eq!(polygon.polygon().map(|p| p.value().len()), Some(3));
        assert_eq!(polygon.polyline().map(|p| p.value().len()), Some(4));
    }

    #[test]
    fn finalize_fixes_polygon_and_reports_area() {
        let picker = TestPicker::default();
        picker.set_rendered(1.0, 1.0, geodetic!(0.0, 0.0, 2.0));
        picker.set_rendered(2.0, 2.0, geodetic!(10.0, 0.0, 5.0));
        picker.set_rendered(3.0, 3.0, geodetic!(10.0, 10.0, 9.0));
        picker.set_rendered(4.0, 4.0, geodetic!(0.0, 10.0, 0.0));
        let (viewer, mut tool) = planar_tool(&picker);

        tool.activate();
        for i in 1..=4 {
            tool.handle(&click(i as f64, i as f64));
        }
        tool.handle(&right_click(4.0, 4.0));

        let points = [
            geodetic!(0.0, 0.0, 2.0),
            geodetic!(10.0, 0.0, 2.0),
            geodetic!(10.0, 10.0, 2.0),
            geodetic!(0.0, 10.0, 2.0),
        ];
        let expected = polygon_area(&PlanarGeodesy, &points);
        assert_abs_diff_eq!(tool.result(), expected);
        assert!(!tool.is_active());

        let entities = viewer.entities();
        let polygon = find(entities, EntityKind::AreaPolygon).expect("polygon is drawn");
        assert!(!polygon.is_live());
        assert_eq!(polygon.polygon().map(Binding::value), Some(points.to_vec()));

        let label = find(entities, EntityKind::AreaResult).expect("label is created");
        assert!(!label.is_live());
        assert_eq!(
            label.label().map(Binding::value),
            Some(format!("Total area: {expected:.4} m²"))
        );
        assert_eq!(
            label.position().map(Binding::value),
            Some(geodetic!(5.0, 5.0, 2.3))
        );
    }

    #[test]
    fn secondary_click_with_two_points_cancels() {
        let picker = TestPicker::default();
        picker.set_rendered(1.0, 1.0, geodetic!(0.0, 0.0));
        picker.set_rendered(2.0, 2.0, geodetic!(10.0, 0.0));
        let (viewer, mut tool) = planar_tool(&picker);

        tool.activate();
        tool.handle(&click(1.0, 1.0));
        tool.handle(&click(2.0, 2.0));
        tool.handle(&right_click(2.0, 2.0));

        assert!(!tool.is_active());
        assert_eq!(tool.result(), 0.0);
        assert!(viewer.entities().is_empty());
    }
}
