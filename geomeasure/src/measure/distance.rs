use geomeasure_types::geo::{GeodesyProvider, GeodeticPoint};

use crate::measure::{MeasureContext, Measurement};
use crate::scene::{Binding, Entity, EntityCollection, EntityId, EntityKind};

/// Length of the path in meters: sum of the slant distances of its segments.
pub fn path_length(geodesy: &dyn GeodesyProvider, points: &[GeodeticPoint]) -> f64 {
    points
        .windows(2)
        .map(|segment| geodesy.slant_distance(&segment[0], &segment[1]))
        .sum()
}

/// Draws a path with the length of every segment next to its end vertex.
#[derive(Debug, Default)]
pub struct DistanceMeasurement {
    line: Option<EntityId>,
    vertices: Vec<EntityId>,
    drawn: Vec<EntityId>,
}

impl DistanceMeasurement {
    /// Ids of all entities drawn since the last clear.
    pub fn drawn(&self) -> &[EntityId] {
        &self.drawn
    }

    fn add(&mut self, entities: &EntityCollection, entity: Entity) -> EntityId {
        let id = entities.add(entity);
        self.drawn.push(id);
        id
    }
}

impl Measurement for DistanceMeasurement {
    const MIN_POINTS: usize = 2;

    fn start(&mut self) {
        self.line = None;
        self.vertices.clear();
    }

    fn point_added(&mut self, ctx: &MeasureContext) {
        let points = ctx.capture().read().points().to_vec();
        let Some(&last) = points.last() else {
            return;
        };

        let entities = ctx.entities();
        if points.len() == 1 {
            let capture = ctx.capture().clone();
            let line = self.add(
                entities,
                Entity::new(EntityKind::DistanceLine)
                    .with_polyline(Binding::live(move || capture.read().live_points())),
            );
            self.line = Some(line);

            let start = self.add(
                entities,
                Entity::new(EntityKind::DistanceVertex).with_position(last),
            );
            self.vertices.push(start);
            return;
        }

        let segment = ctx
            .geodesy()
            .slant_distance(&points[points.len() - 2], &last);
        let vertex = self.add(
            entities,
            Entity::new(EntityKind::DistanceVertex)
                .with_position(last)
                .with_label(ctx.config().format_distance(segment)),
        );
        self.vertices.push(vertex);
    }

    fn finalize(&mut self, ctx: &MeasureContext) -> f64 {
        let points = ctx.capture().read().points().to_vec();
        let entities = ctx.entities();

        if let Some(last_vertex) = self.vertices.pop() {
            entities.remove(last_vertex);
            self.drawn.retain(|id| *id != last_vertex);
        }

        let total = path_length(ctx.geodesy().as_ref(), &points);
        if let Some(&end) = points.last() {
            let label = format!("Total distance: {}", ctx.config().format_distance(total));
            let end_vertex = self.add(
                entities,
                Entity::new(EntityKind::DistanceVertex)
                    .with_position(end)
                    .with_label(label),
            );
            self.vertices.push(end_vertex);
        }

        if let Some(line) = self.line {
            entities.update(line, move |entity| entity.set_polyline(points));
        }

        total
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

        self.line = None;
        self.vertices.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use approx::assert_abs_diff_eq;
    use geomeasure_types::geo::EllipsoidGeodesic;
    use geomeasure_types::geodetic;

    use super::*;
    use crate::control::UserEventHandler;
    use crate::measure::MeasureDistance;
    use crate::scene::Viewer;
    use crate::tests::{click, move_to, right_click, TestPicker};

    fn labels(entities: &EntityCollection) -> Vec<String> {
        entities
            .ids()
            .into_iter()
            .filter_map(|id| entities.get(id))
            .filter_map(|e| e.label().map(Binding::value))
            .collect()
    }

    #[test]
    fn path_length_sums_slant_segments() {
        let geodesy = EllipsoidGeodesic;
        let points = [
            geodetic!(0.0, 0.0, 0.0),
            geodetic!(0.0, 0.0, 30.0),
            geodetic!(0.0, 0.0, 70.0),
        ];
        assert_abs_diff_eq!(path_length(&geodesy, &points), 70.0, epsilon = 1e-9);
        assert_eq!(path_length(&geodesy, &points[..1]), 0.0);
    }

    #[test]
    fn distance_at_same_height_is_surface_distance() {
        let picker = TestPicker::default();
        picker.set_ellipsoid(1.0, 1.0, geodetic!(10.0, 45.0, 20.0));
        picker.set_ellipsoid(2.0, 2.0, geodetic!(10.1, 45.05, 20.0));
        let mut tool = MeasureDistance::new(Viewer::new(Arc::new(picker)));

        tool.activate();
        tool.handle(&click(1.0, 1.0));
        tool.handle(&click(2.0, 2.0));
        tool.handle(&right_click(2.0, 2.0));

        let expected = EllipsoidGeodesic
            .surface_distance(&geodetic!(10.0, 45.0), &geodetic!(10.1, 45.05));
        assert_abs_diff_eq!(tool.result(), expected, epsilon = 1e-6);
    }

    #[test]
    fn vertical_path_measures_height_difference() {
        let picker = TestPicker::default();
        picker.set_rendered(1.0, 1.0, geodetic!(0.0, 0.0, 0.0));
        picker.set_rendered(2.0, 2.0, geodetic!(0.0, 0.0, 100.0));
        let mut tool = MeasureDistance::new(Viewer::new(Arc::new(picker)));

        tool.activate();
        tool.handle(&click(1.0, 1.0));
        tool.handle(&click(2.0, 2.0));
        tool.handle(&right_click(2.0, 2.0));

        assert_abs_diff_eq!(tool.result(), 100.0, epsilon = 1e-9);
    }

    #[test]
    fn vertices_are_labelled_with_segment_lengths() {
        let picker = TestPicker::default();
        picker.set_rendered(1.0, 1.0, geodetic!(0.0, 0.0, 0.0));
        picker.set_rendered(2.0, 2.0, geodetic!(0.0, 0.0, 10.0));
        picker.set_rendered(3.0, 3.0, geodetic!(0.0, 0.0, 30.0));
        let viewer = Viewer::new(Arc::new(picker));
        let mut tool = MeasureDistance::new(viewer.clone());

        tool.activate();
        tool.handle(&click(1.0, 1.0));
        assert_eq!(viewer.entities().len(), 2);
        assert!(labels(viewer.entities()).is_empty());

        tool.handle(&click(2.0, 2.0));
        tool.handle(&click(3.0, 3.0));
        assert_eq!(viewer.entities().len(), 4);
        assert_eq!(labels(viewer.entities()), vec!["10.00 m", "20.00 m"]);
    }

    #[test]
    fn finalize_replaces_last_label_with_total() {
        let picker = TestPicker::default();
        picker.set_rendered(1.0, 1.0, geodetic!(0.0, 0.0, 0.0));
        picker.set_rendered(2.0, 2.0, geodetic!(0.0, 0.0, 10.0));
        picker.set_rendered(3.0, 3.0, geodetic!(0.0, 0.0, 30.0));
        picker.set_rendered(4.0, 4.0, geodetic!(0.0, 0.0, 50.0));
        let viewer = Viewer::new(Arc::new(picker));
        let mut tool = MeasureDistance::new(viewer.clone());

        tool.activate();
        tool.handle(&click(1.0, 1.0));
        tool.handle(&click(2.0, 2.0));
        tool.handle(&click(3.0, 3.0));
        tool.handle(&move_to(4.0, 4.0));
        tool.handle(&right_click(4.0, 4.0));

        let entities = viewer.entities();
        assert_eq!(entities.len(), 4);
        assert_eq!(
            labels(entities),
            vec!["10.00 m", "Total distance: 30.00 m"]
        );

        let line = entities
            .ids()
            .into_iter()
            .filter_map(|id| entities.get(id))
            .find(|e| e.kind() == EntityKind::DistanceLine)
            .expect("line is drawn");
        assert!(!line.is_live());
        assert_eq!(line.polyline().map(|p| p.value().len()), Some(3));
    }

    #[test]
    fn clear_removes_drawings_of_all_sessions() {
        let picker = TestPicker::default();
        picker.set_rendered(1.0, 1.0, geodetic!(0.0, 0.0, 0.0));
        picker.set_rendered(2.0, 2.0, geodetic!(0.0, 0.0, 10.0));
        let viewer = Viewer::new(Arc::new(picker));
        let mut tool = MeasureDistance::new(viewer.clone());

        for _ in 0..2 {
            tool.activate();
            tool.handle(&click(1.0, 1.0));
            tool.handle(&click(2.0, 2.0));
            tool.handle(&right_click(2.0, 2.0));
        }
        assert_eq!(viewer.entities().len(), 6);
        assert_eq!(tool.measurement().drawn().len(), 6);

        tool.clear();
        assert!(viewer.entities().is_empty());
    }
}
