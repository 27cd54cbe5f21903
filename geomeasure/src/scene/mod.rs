//! Interfaces of the rendering host consumed by the tools.
//!
//! The crate does not render anything itself. The host provides a [`Picker`] that resolves screen positions into
//! positions on the globe, and reads the [`EntityCollection`], [`CameraController`] and [`Cursor`] of the
//! [`Viewer`] to draw the scene.

use std::sync::Arc;

use geomeasure_types::cartesian::Point2d;
use geomeasure_types::geo::GeodeticPoint;
use maybe_sync::{MaybeSend, MaybeSync};

use crate::messenger::Messenger;

mod binding;
mod camera;
mod entity;

pub use binding::Binding;
pub use camera::{CameraController, Cursor, CursorOverride, CursorStyle, RotationLock};
pub use entity::{Entity, EntityCollection, EntityId, EntityKind, EntityRef};

/// Resolves screen positions into positions in the scene.
pub trait Picker: MaybeSend + MaybeSync {
    /// Position on the rendered surface (terrain, models) under the screen point.
    fn pick_rendered_position(&self, screen_position: Point2d) -> Option<GeodeticPoint>;

    /// Intersection of the camera ray through the screen point with the ellipsoid.
    fn pick_ellipsoid_position(&self, screen_position: Point2d) -> Option<GeodeticPoint>;

    /// Object under the screen point.
    fn pick_object(&self, screen_position: Point2d) -> Option<PickedObject>;

    /// Intersection of the camera ray through the screen point with the globe terrain.
    ///
    /// The default implementation intersects with the ellipsoid.
    fn pick_terrain_position(&self, screen_position: Point2d) -> Option<GeodeticPoint> {
        self.pick_ellipsoid_position(screen_position)
    }
}

/// Object found by [`Picker::pick_object`].
#[derive(Debug, Clone)]
pub struct PickedObject {
    /// Id of the object, if the object is identifiable.
    pub id: Option<EntityId>,
    /// Reference to the picked entity.
    pub entity: EntityRef,
}

/// Result of picking at a screen position.
#[derive(Debug, Clone)]
pub enum PickResult {
    /// Nothing is under the pointer.
    None,
    /// A position on the globe surface.
    Surface(GeodeticPoint),
    /// An identifiable object.
    Object(EntityId, EntityRef),
}

/// Handle to the scene of the rendering host.
///
/// Cloning the viewer gives another handle to the same scene.
#[derive(Clone)]
pub struct Viewer {
    picker: Arc<dyn Picker>,
    entities: EntityCollection,
    camera: CameraController,
    cursor: Cursor,
    messenger: Option<Arc<dyn Messenger>>,
}

impl Viewer {
    /// Creates a new viewer with an empty entity collection.
    pub fn new(picker: Arc<dyn Picker>) -> Self {
        Self {
            picker,
            entities: EntityCollection::default(),
            camera: CameraController::default(),
            cursor: Cursor::default(),
            messenger: None,
        }
    }

    /// Sets the messenger that is notified when the scene changes.
    pub fn with_messenger(mut self, messenger: impl Messenger + 'static) -> Self {
        self.messenger = Some(Arc::new(messenger));
        self
    }

    /// Picker of the scene.
    pub fn picker(&self) -> &dyn Picker {
        &*self.picker
    }

    /// Entities of the scene.
    pub fn entities(&self) -> &EntityCollection {
        &self.entities
    }

    /// Camera of the scene.
    pub fn camera(&self) -> &CameraController {
        &self.camera
    }

    /// Cursor over the scene.
    pub fn cursor(&self) -> &Cursor {
        &self.cursor
    }

    /// Requests the host to redraw the scene.
    pub fn request_redraw(&self) {
        if let Some(messenger) = &self.messenger {
            messenger.request_redraw();
        }
    }

    /// Position under the screen point: the rendered surface if there is one, the ellipsoid otherwise.
    pub fn pick_position(&self, screen_position: Point2d) -> Option<GeodeticPoint> {
        self.picker
            .pick_rendered_position(screen_position)
            .or_else(|| self.picker.pick_ellipsoid_position(screen_position))
    }

    /// Picks at the screen point. Objects without an id are not reported as objects.
    pub fn pick(&self, screen_position: Point2d) -> PickResult {
        if let Some(PickedObject {
            id: Some(id),
            entity,
        }) = self.picker.pick_object(screen_position)
        {
            return PickResult::Object(id, entity);
        }

        match self.pick_position(screen_position) {
            Some(position) => PickResult::Surface(position),
            None => PickResult::None,
        }
    }
}
