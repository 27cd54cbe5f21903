//! This module contains traits and structs that turn user input into actions of the interactive tools.
//!
//! User interaction handling is done in several steps:
//! 1. OS or host event is converted to a common [`RawUserEvent`] enum.
//! 2. `RawUserEvent` is given to the [`EventProcessor`], that converts it into a [`UserEvent`]. `EventProcessor`
//!    keeps track of input state (which mouse buttons are pressed, when they were pressed) and recognizes clicks.
//! 3. `EventProcessor` has a list of [`UserEventHandler`]s, which change the state of the tools based on the
//!    events.
//!
//! Tools keep an [`InputActions`] table that maps an [`InputEventKind`] to the tool method that handles it. A tool
//! only reacts to the kinds of events it currently has an action registered for.

use geomeasure_types::cartesian::Point2d;
use maybe_sync::{MaybeSend, MaybeSync};

mod event_processor;
mod input_actions;

pub use event_processor::{EventProcessor, SharedHandler};
pub use input_actions::{InputAction, InputActions};

/// User input handler.
pub trait UserEventHandler: MaybeSend + MaybeSync {
    /// Handle the event.
    fn handle(&mut self, event: &UserEvent) -> EventPropagation;
}

/// Raw user interaction event. This type is an intermediate step between a host event and an event that will be
/// processed by the tools. It does not carry any input state information, which is instead stored in the
/// [`EventProcessor`] and combined with the raw event to produce a [`UserEvent`].
#[derive(Debug, Clone)]
pub enum RawUserEvent {
    /// A mouse button was pressed.
    ButtonPressed(MouseButton),
    /// A mouse button was released.
    ButtonReleased(MouseButton),
    /// Mouse pointer was moved to the given screen pixel position.
    PointerMoved(Point2d),
}

/// User interaction event. This is the main type that the tools handle through [`UserEventHandler`]s.
#[derive(Debug, Clone)]
pub enum UserEvent {
    /// A mouse button was pressed.
    ButtonPressed(MouseButton, MouseEvent),
    /// A mouse button was released.
    ButtonReleased(MouseButton, MouseEvent),
    /// A mouse button was clicked. This event is fired right after the [`UserEvent::ButtonReleased`] event if the
    /// release was shortly after the press event.
    Click(MouseButton, MouseEvent),
    /// A double click was done. This event is fired right after the second [`UserEvent::Click`] event if the second
    /// click was done shortly after the first one.
    DoubleClick(MouseButton, MouseEvent),
    /// Mouse pointer moved.
    PointerMoved(MouseEvent),
}

impl UserEvent {
    /// Kind of input action this event triggers, if any.
    pub fn input_kind(&self) -> Option<InputEventKind> {
        match self {
            UserEvent::Click(MouseButton::Left, _) => Some(InputEventKind::PrimaryClick),
            UserEvent::Click(MouseButton::Right, _) => Some(InputEventKind::SecondaryClick),
            UserEvent::ButtonPressed(MouseButton::Left, _) => Some(InputEventKind::PrimaryDown),
            UserEvent::ButtonReleased(MouseButton::Left, _) => Some(InputEventKind::PrimaryUp),
            UserEvent::PointerMoved(_) => Some(InputEventKind::PointerMove),
            _ => None,
        }
    }

    /// State of the mouse at the moment of the event.
    pub fn mouse_event(&self) -> &MouseEvent {
        match self {
            UserEvent::ButtonPressed(_, e)
            | UserEvent::ButtonReleased(_, e)
            | UserEvent::Click(_, e)
            | UserEvent::DoubleClick(_, e)
            | UserEvent::PointerMoved(e) => e,
        }
    }
}

/// Kinds of input a tool can register an action for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum InputEventKind {
    /// Click of the primary (left) button.
    PrimaryClick,
    /// Click of the secondary (right) button.
    SecondaryClick,
    /// Pointer movement.
    PointerMove,
    /// Primary button pressed.
    PrimaryDown,
    /// Primary button released.
    PrimaryUp,
}

/// Value returned by an [`UserEventHandler`] to indicate the status of the event.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum EventPropagation {
    /// Event should be propagated to the next handler.
    Propagate,
    /// Event should not be propagated to the next handler.
    Stop,
}

/// Mouse button enum.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum MouseButton {
    /// The button you click when you want to shoot.
    Left,
    /// the button you click when you want to reload.
    Middle,
    /// The button you click when you want to hit with a rifle handle.
    Right,
    /// The button you click when you are a pro gamer and want to look cool.
    Other,
}

/// State of the mouse at the moment of the event.
#[derive(Debug, Clone)]
pub struct MouseEvent {
    /// Pointer position on the screen in pixels from the top-left corner.
    pub screen_pointer_position: Point2d,
    /// State of the mouse buttons.
    pub buttons: MouseButtonsState,
}

/// State of a mouse button.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MouseButtonState {
    /// Button is pressed.
    Pressed,
    /// Button is not pressed.
    Released,
}

/// State of all mouse buttons.
#[derive(Debug, Copy, Clone)]
pub struct MouseButtonsState {
    /// State of the left mouse button.
    pub left: MouseButtonState,
    /// State of the middle mouse button.
    pub middle: MouseButtonState,
    /// State of the right mouse button.
    pub right: MouseButtonState,
}

impl MouseButtonsState {
    pub(crate) fn set_pressed(&mut self, button: MouseButton) {
        self.set_state(button, MouseButtonState::Pressed);
    }

    pub(crate) fn set_released(&mut self, button: MouseButton) {
        self.set_state(button, MouseButtonState::Released);
    }

    fn set_state(&mut self, button: MouseButton, state: MouseButtonState) {
        match button {
            MouseButton::Left => self.left = state,
            MouseButton::Middle => self.middle = state,
            MouseButton::Right => self.right = state,
            MouseButton::Other => {}
        }
    }
}

impl Default for MouseButtonsState {
    fn default() -> Self {
        Self {
            left: MouseButtonState::Released,
            middle: MouseButtonState::Released,
            right: MouseButtonState::Released,
        }
    }
}
