//! Geomeasure provides interactive measurement and line simplification tools for 3D globe viewers.
//!
//! The crate does not render anything. It is plugged into a rendering host through a few seams:
//!
//! * the host converts its input events into [`RawUserEvent`](control::RawUserEvent)s and gives them to an
//!   [`EventProcessor`](control::EventProcessor), that recognizes clicks and passes the resulting events to the tools;
//! * the host implements [`Picker`](scene::Picker) to resolve screen positions into positions on the globe and into
//!   scene objects;
//! * the tools draw into the [`EntityCollection`](scene::EntityCollection) of the [`Viewer`](scene::Viewer), that the
//!   host reads every frame. Entity fields are [`Binding`](scene::Binding)s: either fixed values, or values
//!   recomputed on every read, so the drawing can follow the pointer.
//!
//! # Tools
//!
//! * [`MeasureDistance`](measure::MeasureDistance) measures the length of a path clicked on the globe. Segment
//!   lengths combine the geodesic surface distance with the height difference of the segment ends.
//! * [`MeasureArea`](measure::MeasureArea) measures the area of a polygon clicked on the globe.
//! * [`DragTool`](drag::DragTool) moves scene objects with the pointer.
//! * [`LineSimplifier`](simplify::LineSimplifier) simplifies line features of large GeoJSON collections in
//!   batches, optionally on a background task.
//!
//! ```no_run
//! use std::sync::Arc;
//! use parking_lot::RwLock;
//! use geomeasure::control::{EventProcessor, RawUserEvent, MouseButton};
//! use geomeasure::measure::MeasureArea;
//! use geomeasure::scene::{Picker, Viewer};
//!
//! fn setup(picker: Arc<dyn Picker>) -> (EventProcessor, Arc<RwLock<MeasureArea>>) {
//!     let viewer = Viewer::new(picker);
//!     let tool = Arc::new(RwLock::new(MeasureArea::new(viewer)));
//!     tool.write().activate();
//!
//!     let mut processor = EventProcessor::default();
//!     processor.add_handler(tool.clone());
//!     processor.handle(RawUserEvent::ButtonPressed(MouseButton::Left));
//!     processor.handle(RawUserEvent::ButtonReleased(MouseButton::Left));
//!
//!     (processor, tool)
//! }
//! ```

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub mod control;
pub mod drag;
pub mod error;
pub mod measure;
mod messenger;
pub mod scene;
pub mod simplify;

#[cfg(test)]
pub(crate) mod tests;

pub use error::GeomeasureError;
pub use messenger::Messenger;

// Reexport geomeasure_types
pub use geomeasure_types;
