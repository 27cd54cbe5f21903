//! Interactive measurement tools.
//!
//! Both tools share the same state machine, [`CaptureSession`]. While active, the session adds a point under the
//! pointer on every primary click, previews the next point under the moving pointer and finishes the measurement on
//! a secondary click. What is drawn and what is measured is decided by the [`Measurement`] the session is
//! parameterized with:
//! * [`MeasureDistance`] measures the length of a path,
//! * [`MeasureArea`] measures the area of a polygon.
//!
//! ```no_run
//! use std::sync::Arc;
//! use geomeasure::measure::MeasureDistance;
//! use geomeasure::scene::{Picker, Viewer};
//!
//! fn start(picker: Arc<dyn Picker>) -> MeasureDistance {
//!     let viewer = Viewer::new(picker);
//!     let mut tool = MeasureDistance::new(viewer);
//!     tool.on_measure_end(|distance| log::info!("Measured {distance} m"));
//!     tool.activate();
//!     tool
//! }
//! ```

use std::sync::Arc;

use geomeasure_types::geo::{EllipsoidGeodesic, GeodesyProvider, GeodeticPoint};
use maybe_sync::{MaybeSend, MaybeSync};
use parking_lot::RwLock;

use crate::control::{
    EventPropagation, InputActions, InputEventKind, MouseEvent, UserEvent, UserEventHandler,
};
use crate::scene::{CursorOverride, CursorStyle, EntityCollection, Viewer};

mod area;
mod distance;

pub use area::{label_center, polygon_area, AreaMeasurement};
pub use distance::{path_length, DistanceMeasurement};

/// Tool measuring the length of a path.
pub type MeasureDistance = CaptureSession<DistanceMeasurement>;
/// Tool measuring the area of a polygon.
pub type MeasureArea = CaptureSession<AreaMeasurement>;

/// Display configuration of the measurement tools.
#[derive(Debug, Clone)]
pub struct MeasureConfiguration {
    label_height_offset: f64,
    distance_decimals: usize,
}

impl Default for MeasureConfiguration {
    fn default() -> Self {
        Self {
            label_height_offset: 0.3,
            distance_decimals: 2,
        }
    }
}

impl MeasureConfiguration {
    /// Height in meters the area label is lifted above the measured polygon.
    pub fn label_height_offset(&self) -> f64 {
        self.label_height_offset
    }

    /// Sets the height the area label is lifted above the measured polygon.
    pub fn with_label_height_offset(mut self, offset: f64) -> Self {
        self.label_height_offset = offset;
        self
    }

    /// Sets the height the area label is lifted above the measured polygon.
    pub fn set_label_height_offset(&mut self, offset: f64) {
        self.label_height_offset = offset;
    }

    /// Number of decimal digits in distance labels.
    pub fn distance_decimals(&self) -> usize {
        self.distance_decimals
    }

    /// Sets the number of decimal digits in distance labels.
    pub fn with_distance_decimals(mut self, decimals: usize) -> Self {
        self.distance_decimals = decimals;
        self
    }

    /// Sets the number of decimal digits in distance labels.
    pub fn set_distance_decimals(&mut self, decimals: usize) {
        self.distance_decimals = decimals;
    }

    pub(crate) fn format_distance(&self, meters: f64) -> String {
        format!("{meters:.prec$} m", prec = self.distance_decimals)
    }
}

/// Points captured by a session.
#[derive(Debug, Default, Clone)]
pub struct CaptureState {
    points: Vec<GeodeticPoint>,
    preview: Option<GeodeticPoint>,
    reference_height: Option<f64>,
}

impl CaptureState {
    /// Committed points in the order they were added.
    pub fn points(&self) -> &[GeodeticPoint] {
        &self.points
    }

    /// Point under the pointer.
    pub fn preview(&self) -> Option<GeodeticPoint> {
        self.preview
    }

    /// Height all points are brought to, for the tools that unify heights.
    pub fn reference_height(&self) -> Option<f64> {
        self.reference_height
    }

    /// Committed points followed by the preview point.
    pub fn live_points(&self) -> Vec<GeodeticPoint> {
        let mut points = self.points.clone();
        points.extend(self.preview);
        points
    }

    fn reset(&mut self) {
        self.points.clear();
        self.preview = None;
        self.reference_height = None;
    }
}

/// Capture state shared between the session and the live bindings of the drawn entities.
pub type SharedCapture = Arc<RwLock<CaptureState>>;

/// Everything a [`Measurement`] needs to draw and compute.
pub struct MeasureContext<'a> {
    viewer: &'a Viewer,
    capture: &'a SharedCapture,
    geodesy: &'a Arc<dyn GeodesyProvider>,
    config: &'a MeasureConfiguration,
}

impl<'a> MeasureContext<'a> {
    /// Scene the measurement is drawn into.
    pub fn viewer(&self) -> &'a Viewer {
        self.viewer
    }

    /// Entities of the scene.
    pub fn entities(&self) -> &'a EntityCollection {
        self.viewer.entities()
    }

    /// Captured points.
    pub fn capture(&self) -> &'a SharedCapture {
        self.capture
    }

    /// Geodesic computations.
    pub fn geodesy(&self) -> &'a Arc<dyn GeodesyProvider> {
        self.geodesy
    }

    /// Display configuration.
    pub fn config(&self) -> &'a MeasureConfiguration {
        self.config
    }
}

/// Drawing and computation part of a measurement tool.
pub trait Measurement: MaybeSend + MaybeSync + 'static {
    /// Minimum number of points the measurement can be finished with. A secondary click with fewer points cancels
    /// the measurement.
    const MIN_POINTS: usize;
    /// If true, every captured point is brought to the height of the first captured point.
    const UNIFY_HEIGHT: bool = false;

    /// Starts a new measurement. Entities drawn by previous measurements are kept.
    fn start(&mut self);

    /// Called after a point was added to the capture state.
    fn point_added(&mut self, ctx: &MeasureContext);

    /// Called after the preview point was moved.
    fn preview_moved(&mut self, _ctx: &MeasureContext) {}

    /// Replaces live drawing by the final one and returns the result of the measurement.
    fn finalize(&mut self, ctx: &MeasureContext) -> f64;

    /// Fixes all live entities to their current state.
    fn freeze(&mut self, entities: &EntityCollection);

    /// Removes all entities drawn by the measurement.
    fn clear(&mut self, entities: &EntityCollection);
}

/// State of a [`CaptureSession`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// The session does not react to input.
    Inactive,
    /// The session captures points.
    Active,
}

type EndListener = Box<dyn Fn(f64) + Send + Sync>;

/// Pointer driven point capture shared by the measurement tools.
pub struct CaptureSession<M: Measurement> {
    viewer: Viewer,
    geodesy: Arc<dyn GeodesyProvider>,
    config: MeasureConfiguration,
    input_actions: InputActions<Self>,
    state: SessionState,
    cursor_override: Option<CursorOverride>,
    capture: SharedCapture,
    measurement: M,
    result: f64,
    end_listeners: Vec<EndListener>,
}

impl<M: Measurement + Default> CaptureSession<M> {
    /// Creates a new inactive tool working on the WGS84 ellipsoid.
    pub fn new(viewer: Viewer) -> Self {
        Self::with_measurement(viewer, M::default(), Arc::new(EllipsoidGeodesic))
    }
}

impl<M: Measurement> CaptureSession<M> {
    /// Creates a new inactive tool.
    pub fn with_measurement(
        viewer: Viewer,
        measurement: M,
        geodesy: Arc<dyn GeodesyProvider>,
    ) -> Self {
        Self {
            viewer,
            geodesy,
            config: MeasureConfiguration::default(),
            input_actions: InputActions::default(),
            state: SessionState::Inactive,
            cursor_override: None,
            capture: Arc::default(),
            measurement,
            result: 0.0,
            end_listeners: vec![],
        }
    }

    /// Sets the display configuration.
    pub fn with_config(mut self, config: MeasureConfiguration) -> Self {
        self.config = config;
        self
    }

    /// Display configuration.
    pub fn config(&self) -> &MeasureConfiguration {
        &self.config
    }

    /// Starts a new measurement, abandoning the one in progress.
    pub fn activate(&mut self) {
        self.deactivate();

        self.input_actions
            .set_input_action(InputEventKind::PrimaryClick, Self::on_primary_click);
        self.input_actions
            .set_input_action(InputEventKind::SecondaryClick, Self::on_secondary_click);
        self.input_actions
            .set_input_action(InputEventKind::PointerMove, Self::on_pointer_move);

        self.cursor_override = Some(self.viewer.cursor().override_style(CursorStyle::Default));
        self.capture.write().reset();
        self.measurement.start();
        self.result = 0.0;
        self.state = SessionState::Active;

        log::debug!("Measurement session activated");
    }

    /// Stops reacting to input. Drawn entities stay in the scene, use [`CaptureSession::clear`] to remove them.
    pub fn deactivate(&mut self) {
        if self.state == SessionState::Inactive {
            return;
        }

        self.input_actions
            .remove_input_action(InputEventKind::SecondaryClick);
        self.input_actions
            .remove_input_action(InputEventKind::PrimaryClick);
        self.input_actions
            .remove_input_action(InputEventKind::PointerMove);

        self.measurement.freeze(self.viewer.entities());
        self.capture.write().reset();
        drop(self.cursor_override.take());
        self.state = SessionState::Inactive;
        self.viewer.request_redraw();

        log::debug!("Measurement session deactivated");
    }

    /// Removes everything the tool has drawn.
    pub fn clear(&mut self) {
        self.measurement.clear(self.viewer.entities());
        self.viewer.request_redraw();
    }

    /// Adds a listener called with the result when a measurement is finished.
    pub fn on_measure_end(&mut self, listener: impl Fn(f64) + Send + Sync + 'static) {
        self.end_listeners.push(Box::new(listener));
    }

    /// State of the session.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Returns true if the session captures points.
    pub fn is_active(&self) -> bool {
        self.state == SessionState::Active
    }

    /// Committed points of the current measurement.
    pub fn points(&self) -> Vec<GeodeticPoint> {
        self.capture.read().points.clone()
    }

    /// Current preview point.
    pub fn preview(&self) -> Option<GeodeticPoint> {
        self.capture.read().preview
    }

    /// Committed points followed by the preview point.
    pub fn live_points(&self) -> Vec<GeodeticPoint> {
        self.capture.read().live_points()
    }

    /// Result of the last finished measurement.
    pub fn result(&self) -> f64 {
        self.result
    }

    /// Drawing part of the tool.
    pub fn measurement(&self) -> &M {
        &self.measurement
    }

    fn on_primary_click(&mut self, event: &MouseEvent) -> EventPropagation {
        let Some(mut position) = self.viewer.pick_position(event.screen_pointer_position) else {
            return EventPropagation::Stop;
        };

        {
            let mut capture = self.capture.write();
            if M::UNIFY_HEIGHT {
                let height = *capture.reference_height.get_or_insert(position.height());
                for point in &mut capture.points {
                    *point = point.with_height(height);
                }
                position = position.with_height(height);
            }

            capture.points.push(position);
        }

        let ctx = MeasureContext {
            viewer: &self.viewer,
            capture: &self.capture,
            geodesy: &self.geodesy,
            config: &self.config,
        };
        self.measurement.point_added(&ctx);
        self.viewer.request_redraw();

        EventPropagation::Stop
    }

    fn on_pointer_move(&mut self, event: &MouseEvent) -> EventPropagation {
        if self.capture.read().points.is_empty() {
            return EventPropagation::Propagate;
        }

        let Some(position) = self.viewer.pick_position(event.screen_pointer_position) else {
            return EventPropagation::Propagate;
        };

        {
            let mut capture = self.capture.write();
            let position = match capture.reference_height {
                Some(height) => position.with_height(height),
                None => position,
            };
            capture.preview = Some(position);
        }

        let ctx = MeasureContext {
            viewer: &self.viewer,
            capture: &self.capture,
            geodesy: &self.geodesy,
            config: &self.config,
        };
        self.measurement.preview_moved(&ctx);
        self.viewer.request_redraw();

        EventPropagation::Propagate
    }

    fn on_secondary_click(&mut self, _event: &MouseEvent) -> EventPropagation {
        let point_count = self.capture.read().points.len();
        if point_count < M::MIN_POINTS {
            log::debug!(
                "Measurement cancelled with {point_count} points, at least {} required",
                M::MIN_POINTS
            );
            self.deactivate();
            self.clear();
            return EventPropagation::Stop;
        }

        let ctx = MeasureContext {
            viewer: &self.viewer,
            capture: &self.capture,
            geodesy: &self.geodesy,
            config: &self.config,
        };
        self.result = self.measurement.finalize(&ctx);
        self.deactivate();

        log::debug!("Measurement finished with result {}", self.result);
        for listener in &self.end_listeners {
            listener(self.result);
        }

        EventPropagation::Stop
    }
}

impl<M: Measurement> UserEventHandler for CaptureSession<M> {
    fn handle(&mut self, event: &UserEvent) -> EventPropagation {
        InputActions::dispatch(self, |session| &session.input_actions, event)
    }
}
