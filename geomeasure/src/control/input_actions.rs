use std::collections::HashMap;

use crate::control::{EventPropagation, InputEventKind, MouseEvent, UserEvent};

/// Callback registered for an input kind. It is given the owner of the table and the mouse state of the event.
pub type InputAction<T> = fn(&mut T, &MouseEvent) -> EventPropagation;

/// Table of input actions of a tool. At most one action is registered per [`InputEventKind`], registering a new
/// one replaces the previous.
pub struct InputActions<T> {
    actions: HashMap<InputEventKind, InputAction<T>>,
}

impl<T> Default for InputActions<T> {
    fn default() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }
}

impl<T> std::fmt::Debug for InputActions<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.actions.keys()).finish()
    }
}

impl<T> InputActions<T> {
    /// Registers the action for the kind, replacing the one registered before.
    pub fn set_input_action(&mut self, kind: InputEventKind, action: InputAction<T>) {
        self.actions.insert(kind, action);
    }

    /// Removes the action for the kind. Does nothing if no action is registered.
    pub fn remove_input_action(&mut self, kind: InputEventKind) {
        self.actions.remove(&kind);
    }

    /// Returns the action registered for the kind.
    pub fn get(&self, kind: InputEventKind) -> Option<InputAction<T>> {
        self.actions.get(&kind).copied()
    }

    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns true if no actions are registered.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Finds the action for the event in the table of `target` and runs it.
    ///
    /// Events with no registered action are propagated to the next handler.
    pub fn dispatch(
        target: &mut T,
        table: impl Fn(&T) -> &InputActions<T>,
        event: &UserEvent,
    ) -> EventPropagation {
        let action = event.input_kind().and_then(|kind| table(target).get(kind));
        match action {
            Some(action) => action(target, event.mouse_event()),
            None => EventPropagation::Propagate,
        }
    }
}
