use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use geomeasure_types::geo::GeodeticPoint;
use parking_lot::RwLock;

use crate::scene::Binding;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of an entity in an [`EntityCollection`].
#[derive(Debug, Copy, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Returns a new unique id.
    pub fn next_id() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Role of an entity. The rendering host chooses the visual style by the kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EntityKind {
    /// Vertex of a measured path, optionally labelled with the segment length.
    DistanceVertex,
    /// Line connecting the vertices of a measured path.
    DistanceLine,
    /// Vertex of a measured polygon.
    AreaVertex,
    /// Measured polygon with its closed outline.
    AreaPolygon,
    /// Label with the area of a measured polygon.
    AreaResult,
    /// Any other object in the scene.
    Marker,
}

/// Object displayed in the scene. Every field is a [`Binding`], so it can either be fixed or follow some other state.
#[derive(Debug, Clone)]
pub struct Entity {
    kind: EntityKind,
    position: Option<Binding<GeodeticPoint>>,
    label: Option<Binding<String>>,
    polyline: Option<Binding<Vec<GeodeticPoint>>>,
    polygon: Option<Binding<Vec<GeodeticPoint>>>,
}

impl Entity {
    /// Creates an empty entity of the given kind.
    pub fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            position: None,
            label: None,
            polyline: None,
            polygon: None,
        }
    }

    /// Sets the position of the entity.
    pub fn with_position(mut self, position: impl Into<Binding<GeodeticPoint>>) -> Self {
        self.position = Some(position.into());
        self
    }

    /// Sets the label text of the entity.
    pub fn with_label(mut self, label: impl Into<Binding<String>>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the polyline of the entity.
    pub fn with_polyline(mut self, polyline: impl Into<Binding<Vec<GeodeticPoint>>>) -> Self {
        self.polyline = Some(polyline.into());
        self
    }

    /// Sets the polygon of the entity.
    pub fn with_polygon(mut self, polygon: impl Into<Binding<Vec<GeodeticPoint>>>) -> Self {
        self.polygon = Some(polygon.into());
        self
    }

    /// Kind of the entity.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Position binding.
    pub fn position(&self) -> Option<&Binding<GeodeticPoint>> {
        self.position.as_ref()
    }

    /// Label binding.
    pub fn label(&self) -> Option<&Binding<String>> {
        self.label.as_ref()
    }

    /// Polyline binding.
    pub fn polyline(&self) -> Option<&Binding<Vec<GeodeticPoint>>> {
        self.polyline.as_ref()
    }

    /// Polygon binding.
    pub fn polygon(&self) -> Option<&Binding<Vec<GeodeticPoint>>> {
        self.polygon.as_ref()
    }

    /// Replaces the position binding.
    pub fn set_position(&mut self, position: impl Into<Binding<GeodeticPoint>>) {
        self.position = Some(position.into());
    }

    /// Replaces the label binding.
    pub fn set_label(&mut self, label: impl Into<Binding<String>>) {
        self.label = Some(label.into());
    }

    /// Replaces the polyline binding.
    pub fn set_polyline(&mut self, polyline: impl Into<Binding<Vec<GeodeticPoint>>>) {
        self.polyline = Some(polyline.into());
    }

    /// Replaces the polygon binding.
    pub fn set_polygon(&mut self, polygon: impl Into<Binding<Vec<GeodeticPoint>>>) {
        self.polygon = Some(polygon.into());
    }

    /// Returns true if any of the fields is bound live.
    pub fn is_live(&self) -> bool {
        self.position.as_ref().is_some_and(Binding::is_live)
            || self.label.as_ref().is_some_and(Binding::is_live)
            || self.polyline.as_ref().is_some_and(Binding::is_live)
            || self.polygon.as_ref().is_some_and(Binding::is_live)
    }

    /// Freezes all live fields to their current values.
    pub fn freeze(&mut self) {
        if let Some(position) = &mut self.position {
            position.freeze();
        }
        if let Some(label) = &mut self.label {
            label.freeze();
        }
        if let Some(polyline) = &mut self.polyline {
            polyline.freeze();
        }
        if let Some(polygon) = &mut self.polygon {
            polygon.freeze();
        }
    }
}

/// Shared store of the scene entities.
///
/// Cloning the collection gives another handle to the same store.
#[derive(Debug, Clone, Default)]
pub struct EntityCollection {
    entities: Arc<RwLock<BTreeMap<EntityId, Arc<RwLock<Entity>>>>>,
}

impl EntityCollection {
    /// Adds the entity to the store and returns its id.
    pub fn add(&self, entity: Entity) -> EntityId {
        let id = EntityId::next_id();
        self.entities.write().insert(id, Arc::new(RwLock::new(entity)));
        id
    }

    /// Removes the entity. Returns the removed entity if it was in the store.
    pub fn remove(&self, id: EntityId) -> Option<Entity> {
        let entry = self.entities.write().remove(&id)?;
        let entity = entry.read().clone();
        Some(entity)
    }

    /// Returns true if an entity with the id is in the store.
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.read().contains_key(&id)
    }

    /// Number of entities in the store.
    pub fn len(&self) -> usize {
        self.entities.read().len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.read().is_empty()
    }

    /// Returns a copy of the entity.
    pub fn get(&self, id: EntityId) -> Option<Entity> {
        let entry = self.entities.read().get(&id).cloned()?;
        let entity = entry.read().clone();
        Some(entity)
    }

    /// Returns a non-owning reference to the entity.
    pub fn entity_ref(&self, id: EntityId) -> Option<EntityRef> {
        self.entities
            .read()
            .get(&id)
            .map(|entry| EntityRef(Arc::downgrade(entry)))
    }

    /// Modifies the entity in place. Returns false if there is no entity with the id.
    pub fn update(&self, id: EntityId, f: impl FnOnce(&mut Entity)) -> bool {
        let Some(entry) = self.entities.read().get(&id).cloned() else {
            return false;
        };

        f(&mut *entry.write());
        true
    }

    /// Ids of all entities in the store in creation order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.entities.read().keys().copied().collect()
    }
}

/// Non-owning reference to an entity in an [`EntityCollection`].
///
/// The reference becomes dead when the entity is removed from the collection.
#[derive(Clone)]
pub struct EntityRef(Weak<RwLock<Entity>>);

impl EntityRef {
    /// Returns true if the entity is still in its collection.
    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    /// Reads the entity. Returns `None` if the entity was removed.
    pub fn read<R>(&self, f: impl FnOnce(&Entity) -> R) -> Option<R> {
        let entity = self.0.upgrade()?;
        let result = f(&*entity.read());
        Some(result)
    }

    /// Modifies the entity. Returns false if the entity was removed.
    pub fn update(&self, f: impl FnOnce(&mut Entity)) -> bool {
        let Some(entity) = self.0.upgrade() else {
            return false;
        };

        f(&mut *entity.write());
        true
    }
}

impl Debug for EntityRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityRef")
            .field("alive", &self.is_alive())
            .finish()
    }
}
