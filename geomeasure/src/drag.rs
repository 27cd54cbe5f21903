//! Moving scene objects with the pointer.

use std::sync::Arc;

use geomeasure_types::geo::GeodeticPoint;
use parking_lot::RwLock;

use crate::control::{
    EventPropagation, InputActions, InputEventKind, MouseEvent, UserEvent, UserEventHandler,
};
use crate::scene::{Binding, EntityId, EntityRef, PickResult, RotationLock, Viewer};

/// State of a [`DragTool`].
#[derive(Debug, Clone)]
pub enum DragState {
    /// No object is dragged.
    Idle,
    /// An object is grabbed and follows the pointer.
    Armed {
        /// Grabbed object.
        target: EntityRef,
        /// Id of the grabbed object.
        target_id: EntityId,
        /// Position of the object when it was grabbed.
        original_position: Option<GeodeticPoint>,
        /// True when the object position is bound to the pointer.
        following: bool,
    },
}

/// Tool that lets the user grab an identifiable object with the primary button, move it over the globe and drop
/// it by releasing the button.
///
/// The tool never owns the dragged object. Camera rotation is disabled while an object is grabbed.
pub struct DragTool {
    viewer: Viewer,
    input_actions: InputActions<Self>,
    state: DragState,
    rotation_lock: Option<RotationLock>,
    drag_position: Arc<RwLock<Option<GeodeticPoint>>>,
}

impl DragTool {
    /// Creates a new tool. The tool does not react to input until [`DragTool::start_drag`] is called.
    pub fn new(viewer: Viewer) -> Self {
        Self {
            viewer,
            input_actions: InputActions::default(),
            state: DragState::Idle,
            rotation_lock: None,
            drag_position: Arc::default(),
        }
    }

    /// Starts reacting to input.
    pub fn start_drag(&mut self) {
        self.input_actions
            .set_input_action(InputEventKind::PrimaryDown, Self::on_press);
        self.input_actions
            .set_input_action(InputEventKind::PointerMove, Self::on_move);
        self.input_actions
            .set_input_action(InputEventKind::PrimaryUp, Self::on_release);
    }

    /// Stops reacting to input. An object grabbed at this moment is left where it is.
    pub fn cancel_drag(&mut self) {
        self.input_actions
            .remove_input_action(InputEventKind::PrimaryDown);
        self.input_actions
            .remove_input_action(InputEventKind::PrimaryUp);
        self.input_actions
            .remove_input_action(InputEventKind::PointerMove);

        if let DragState::Armed { target, .. } =
            std::mem::replace(&mut self.state, DragState::Idle)
        {
            target.update(|entity| {
                if let Some(position) = entity.position().map(Binding::value) {
                    entity.set_position(position);
                }
            });
            self.detach();
        }
    }

    /// Current state.
    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// Returns true if an object is grabbed.
    pub fn is_armed(&self) -> bool {
        matches!(self.state, DragState::Armed { .. })
    }

    fn detach(&mut self) {
        *self.drag_position.write() = None;
        drop(self.rotation_lock.take());
        self.viewer.request_redraw();
    }

    fn on_press(&mut self, event: &MouseEvent) -> EventPropagation {
        if self.is_armed() {
            return EventPropagation::Stop;
        }

        let PickResult::Object(target_id, target) = self.viewer.pick(event.screen_pointer_position)
        else {
            return EventPropagation::Propagate;
        };

        let original_position = target
            .read(|entity| entity.position().map(Binding::value))
            .flatten();
        *self.drag_position.write() = None;
        self.rotation_lock = Some(self.viewer.camera().lock_rotation());
        self.state = DragState::Armed {
            target,
            target_id,
            original_position,
            following: false,
        };

        log::debug!("Grabbed entity {target_id:?}");
        EventPropagation::Stop
    }

    fn on_move(&mut self, event: &MouseEvent) -> EventPropagation {
        let DragState::Armed {
            target,
            original_position,
            following,
            ..
        } = &mut self.state
        else {
            return EventPropagation::Propagate;
        };

        let Some(position) = self
            .viewer
            .picker()
            .pick_terrain_position(event.screen_pointer_position)
        else {
            return EventPropagation::Stop;
        };

        *self.drag_position.write() = Some(position);
        if !*following {
            let cell = self.drag_position.clone();
            let fallback = *original_position;
            *following = target.update(|entity| {
                entity.set_position(Binding::live(move || {
                    cell.read().or(fallback).unwrap_or_default()
                }))
            });
        }

        self.viewer.request_redraw();
        EventPropagation::Stop
    }

    fn on_release(&mut self, event: &MouseEvent) -> EventPropagation {
        let DragState::Armed {
            target,
            target_id,
            original_position,
            ..
        } = std::mem::replace(&mut self.state, DragState::Idle)
        else {
            return EventPropagation::Propagate;
        };

        let last_position = *self.drag_position.read();
        let position = self
            .viewer
            .picker()
            .pick_terrain_position(event.screen_pointer_position)
            .or(last_position)
            .or(original_position);

        if let Some(position) = position {
            target.update(|entity| entity.set_position(position));
        }
        self.detach();

        log::debug!("Dropped entity {target_id:?} at {position:?}");
        EventPropagation::Stop
    }
}

impl UserEventHandler for DragTool {
    fn handle(&mut self, event: &UserEvent) -> EventPropagation {
        InputActions::dispatch(self, |tool| &tool.input_actions, event)
    }
}
