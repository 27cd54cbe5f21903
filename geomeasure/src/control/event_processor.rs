use std::sync::Arc;

use geomeasure_types::cartesian::Point2d;
use parking_lot::RwLock;
use web_time::SystemTime;

use crate::control::{
    EventPropagation, MouseButtonsState, MouseEvent, RawUserEvent, UserEvent, UserEventHandler,
};

const CLICK_TIMEOUT: std::time::Duration = std::time::Duration::from_millis(200);
const DBL_CLICK_TIMEOUT: std::time::Duration = std::time::Duration::from_millis(500);

/// Shared handle to a registered handler. The caller keeps a clone of it to drive the tool (activate, deactivate)
/// while the processor feeds it events.
pub type SharedHandler = Arc<RwLock<dyn UserEventHandler>>;

/// Converts [`RawUserEvent`]s into [`UserEvent`]s and gives them to the registered handlers.
///
/// Handlers are called in the order they were added until one of them returns [`EventPropagation::Stop`].
pub struct EventProcessor {
    handlers: Vec<SharedHandler>,
    pointer_position: Point2d,
    buttons_state: MouseButtonsState,

    last_pressed_time: SystemTime,
    last_click_time: SystemTime,
}

impl Default for EventProcessor {
    fn default() -> Self {
        Self {
            handlers: vec![],
            pointer_position: Default::default(),
            buttons_state: Default::default(),
            last_pressed_time: SystemTime::UNIX_EPOCH,
            last_click_time: SystemTime::UNIX_EPOCH,
        }
    }
}

impl EventProcessor {
    /// Adds a handler to the end of the handler list.
    pub fn add_handler(&mut self, handler: SharedHandler) {
        self.handlers.push(handler);
    }

    /// Number of registered handlers.
    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Last known pointer position.
    pub fn pointer_position(&self) -> Point2d {
        self.pointer_position
    }

    /// Processes the raw event and dispatches resulting events to the handlers.
    pub fn handle(&mut self, event: RawUserEvent) {
        for user_event in self.process(event) {
            for handler in &self.handlers {
                if handler.write().handle(&user_event) == EventPropagation::Stop {
                    break;
                }
            }
        }
    }

    fn process(&mut self, event: RawUserEvent) -> Vec<UserEvent> {
        let now = SystemTime::now();
        match event {
            RawUserEvent::ButtonPressed(button) => {
                self.buttons_state.set_pressed(button);
                self.last_pressed_time = now;

                vec![UserEvent::ButtonPressed(button, self.mouse_event())]
            }
            RawUserEvent::ButtonReleased(button) => {
                self.buttons_state.set_released(button);
                let mut events = vec![UserEvent::ButtonReleased(button, self.mouse_event())];

                if now
                    .duration_since(self.last_pressed_time)
                    .unwrap_or_default()
                    < CLICK_TIMEOUT
                {
                    events.push(UserEvent::Click(button, self.mouse_event()));

                    if now.duration_since(self.last_click_time).unwrap_or_default()
                        < DBL_CLICK_TIMEOUT
                    {
                        events.push(UserEvent::DoubleClick(button, self.mouse_event()));
                    }

                    self.last_click_time = now;
                }

                events
            }
            RawUserEvent::PointerMoved(position) => {
                self.pointer_position = position;
                vec![UserEvent::PointerMoved(self.mouse_event())]
            }
        }
    }

    fn mouse_event(&self) -> MouseEvent {
        MouseEvent {
            screen_pointer_position: self.pointer_position,
            buttons: self.buttons_state,
        }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::control::{MouseButton, MouseButtonState};

    #[derive(Default)]
    struct Recorder {
        events: Vec<UserEvent>,
        propagation: Option<EventPropagation>,
    }

    impl UserEventHandler for Recorder {
        fn handle(&mut self, event: &UserEvent) -> EventPropagation {
            self.events.push(event.clone());
            self.propagation.unwrap_or(EventPropagation::Propagate)
        }
    }

    fn recorder(propagation: Option<EventPropagation>) -> Arc<RwLock<Recorder>> {
        Arc::new(RwLock::new(Recorder {
            events: vec![],
            propagation,
        }))
    }

    #[test]
    fn quick_release_produces_click() {
        let mut processor = EventProcessor::default();
        let handler = recorder(None);
        processor.add_handler(handler.clone());

        processor.handle(RawUserEvent::PointerMoved(Point2d::new(10.0, 20.0)));
        processor.handle(RawUserEvent::ButtonPressed(MouseButton::Left));
        processor.handle(RawUserEvent::ButtonReleased(MouseButton::Left));

        let events = &handler.read().events;
        assert_eq!(events.len(), 4);
        assert_matches!(events[0], UserEvent::PointerMoved(_));
        assert_matches!(
            &events[1],
            UserEvent::ButtonPressed(MouseButton::Left, e) if e.buttons.left == MouseButtonState::Pressed
        );
        assert_matches!(
            &events[2],
            UserEvent::ButtonReleased(MouseButton::Left, e) if e.buttons.left == MouseButtonState::Released
        );
        assert_matches!(
            &events[3],
            UserEvent::Click(MouseButton::Left, e) if e.screen_pointer_position == Point2d::new(10.0, 20.0)
        );
    }

    #[test]
    fn second_click_is_double_click() {
        let mut processor = EventProcessor::default();
        let handler = recorder(None);
        processor.add_handler(handler.clone());

        for _ in 0..2 {
            processor.handle(RawUserEvent::ButtonPressed(MouseButton::Right));
            processor.handle(RawUserEvent::ButtonReleased(MouseButton::Right));
        }

        let events = &handler.read().events;
        assert_matches!(events.last(), Some(UserEvent::DoubleClick(MouseButton::Right, _)));
    }

    #[test]
    fn stop_prevents_further_dispatch() {
        let mut processor = EventProcessor::default();
        let first = recorder(Some(EventPropagation::Stop));
        let second = recorder(None);
        processor.add_handler(first.clone());
        processor.add_handler(second.clone());
        assert_eq!(processor.handler_count(), 2);

        processor.handle(RawUserEvent::PointerMoved(Point2d::new(1.0, 1.0)));

        assert_eq!(first.read().events.len(), 1);
        assert!(second.read().events.is_empty());
        assert_eq!(processor.pointer_position(), Point2d::new(1.0, 1.0));
    }
}
