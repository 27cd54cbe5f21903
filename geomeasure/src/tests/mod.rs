use std::collections::HashMap;
use std::sync::Arc;

use geomeasure_types::cartesian::Point2d;
use geomeasure_types::geo::{GeodesyProvider, GeodeticPoint, GeoPoint};
use parking_lot::RwLock;

use crate::control::{MouseButton, MouseButtonsState, MouseEvent, UserEvent};
use crate::scene::{EntityId, EntityRef, PickedObject, Picker};

type ScreenKey = [i64; 2];

fn key(x: f64, y: f64) -> ScreenKey {
    [x.round() as i64, y.round() as i64]
}

#[derive(Default)]
struct PickerState {
    rendered: HashMap<ScreenKey, GeodeticPoint>,
    ellipsoid: HashMap<ScreenKey, GeodeticPoint>,
    terrain: HashMap<ScreenKey, GeodeticPoint>,
    objects: HashMap<ScreenKey, PickedObject>,
}

/// Picker returning positions set up by the test for integer screen positions.
#[derive(Clone, Default)]
pub struct TestPicker {
    state: Arc<RwLock<PickerState>>,
}

impl TestPicker {
    pub fn set_rendered(&self, x: f64, y: f64, position: GeodeticPoint) {
        self.state.write().rendered.insert(key(x, y), position);
    }

    pub fn set_ellipsoid(&self, x: f64, y: f64, position: GeodeticPoint) {
        self.state.write().ellipsoid.insert(key(x, y), position);
    }

    pub fn set_terrain(&self, x: f64, y: f64, position: GeodeticPoint) {
        self.state.write().terrain.insert(key(x, y), position);
    }

    pub fn set_object(&self, x: f64, y: f64, id: Option<EntityId>, entity: EntityRef) {
        self.state
            .write()
            .objects
            .insert(key(x, y), PickedObject { id, entity });
    }
}

impl Picker for TestPicker {
    fn pick_rendered_position(&self, screen_position: Point2d) -> Option<GeodeticPoint> {
        self.state.read().rendered.get(&key(screen_position.x, screen_position.y)).copied()
    }

    fn pick_ellipsoid_position(&self, screen_position: Point2d) -> Option<GeodeticPoint> {
        self.state.read().ellipsoid.get(&key(screen_position.x, screen_position.y)).copied()
    }

    fn pick_object(&self, screen_position: Point2d) -> Option<PickedObject> {
        self.state.read().objects.get(&key(screen_position.x, screen_position.y)).cloned()
    }

    fn pick_terrain_position(&self, screen_position: Point2d) -> Option<GeodeticPoint> {
        self.state.read().terrain.get(&key(screen_position.x, screen_position.y)).copied()
    }
}

/// Geodesy on a plane where one degree is one meter. Bearings are measured clockwise from the latitude axis.
pub struct PlanarGeodesy;

impl GeodesyProvider for PlanarGeodesy {
    fn surface_distance(&self, from: &GeodeticPoint, to: &GeodeticPoint) -> f64 {
        (to.lon() - from.lon()).hypot(to.lat() - from.lat())
    }

    fn initial_bearing(&self, from: &GeodeticPoint, to: &GeodeticPoint) -> f64 {
        let bearing = (to.lon() - from.lon())
            .atan2(to.lat() - from.lat())
            .to_degrees();
        if bearing < 0.0 {
            bearing + 360.0
        } else {
            bearing
        }
    }
}

pub fn mouse_event(x: f64, y: f64) -> MouseEvent {
    MouseEvent {
        screen_pointer_position: Point2d::new(x, y),
        buttons: MouseButtonsState::default(),
    }
}

pub fn click(x: f64, y: f64) -> UserEvent {
    UserEvent::Click(MouseButton::Left, mouse_event(x, y))
}

pub fn right_click(x: f64, y: f64) -> UserEvent {
    UserEvent::Click(MouseButton::Right, mouse_event(x, y))
}

pub fn move_to(x: f64, y: f64) -> UserEvent {
    UserEvent::PointerMoved(mouse_event(x, y))
}

pub fn press(x: f64, y: f64) -> UserEvent {
    UserEvent::ButtonPressed(MouseButton::Left, mouse_event(x, y))
}

pub fn release(x: f64, y: f64) -> UserEvent {
    UserEvent::ButtonReleased(MouseButton::Left, mouse_event(x, y))
}
