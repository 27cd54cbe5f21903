//! Streaming simplification of GeoJSON line features.
//!
//! Large feature collections are simplified in batches, so that the consumer can display the result progressively.
//! [`LineSimplifier::process`] runs synchronously and gives every message to a callback, while
//! [`LineSimplifier::spawn`] runs the same pipeline on a blocking tokio task and streams the messages through a
//! channel.

use geojson::feature::Id;
use geojson::{Feature, Geometry, JsonObject};
use geomeasure_types::geo::GeodeticPoint;
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};
use tokio::task::JoinHandle;

use crate::error::GeomeasureError;

mod douglas_peucker;

pub use douglas_peucker::simplify;

/// Number of features in a batch if not specified otherwise.
pub const DEFAULT_BATCH_SIZE: usize = 2000;

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

/// Input of the simplification pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimplificationTask {
    /// GeoJSON feature collection.
    pub feature_collection: Value,
    /// Maximum distance a removed point can be from the simplified line, in coordinate units.
    pub tolerance: f64,
    /// Number of features in one output batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

impl SimplificationTask {
    /// Creates a task with the default batch size.
    pub fn new(feature_collection: Value, tolerance: f64) -> Self {
        Self {
            feature_collection,
            tolerance,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Decodes the task from its JSON representation.
    pub fn from_json(json: &str) -> Result<Self, GeomeasureError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Starts the task on a blocking tokio task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self) -> SimplificationJob {
        LineSimplifier::from(&self).spawn(self.feature_collection)
    }
}

/// Message produced by the simplification pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum SimplifyMessage {
    /// Next batch of simplified features.
    Batch {
        /// Simplified features in input order.
        batch: Vec<Feature>,
        /// Percentage of valid features processed before this batch.
        progress: f64,
    },
    /// All features were processed.
    Done,
}

impl SimplifyMessage {
    /// Progress in percent at the moment of the message.
    pub fn progress(&self) -> f64 {
        match self {
            Self::Batch { progress, .. } => *progress,
            Self::Done => 100.0,
        }
    }

    /// Returns true for the final message.
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done)
    }
}

impl Serialize for SimplifyMessage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        match self {
            Self::Batch { batch, progress } => {
                map.serialize_entry("batch", batch)?;
                map.serialize_entry("progress", progress)?;
            }
            Self::Done => {
                map.serialize_entry("done", &true)?;
            }
        }
        map.end()
    }
}

/// Number of features in a processed collection.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct FeatureCounts {
    /// Valid line features.
    pub valid: usize,
    /// All features of the collection.
    pub total: usize,
}

struct LineFeature {
    id: Option<Id>,
    properties: Option<JsonObject>,
    foreign_members: Option<JsonObject>,
    coordinates: Vec<GeodeticPoint>,
}

/// Batched Douglas-Peucker simplification of the line features of a collection.
///
/// Only `LineString` features with at least 2 coordinates, each of them having at least 2 numeric components, are
/// processed. All other features are dropped. Output coordinates always have 3 components, missing altitude is set
/// to 0.
#[derive(Debug, Clone)]
pub struct LineSimplifier {
    tolerance: f64,
    batch_size: usize,
}

impl LineSimplifier {
    /// Creates a new simplifier with the default batch size.
    pub fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Sets the number of features in one batch.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// Simplification tolerance.
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// Number of features in one batch.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Simplifies the collection, giving the batches to `sink` in input order, followed by
    /// [`SimplifyMessage::Done`].
    pub fn process(
        &self,
        feature_collection: &Value,
        mut sink: impl FnMut(SimplifyMessage),
    ) -> FeatureCounts {
        let (features, total) = line_features(feature_collection);
        let valid = features.len();
        log::info!("Valid line features: {valid}/{total}");

        let batch_size = self.effective_batch_size();
        let mut processed = 0;
        let mut features = features.into_iter().peekable();
        while features.peek().is_some() {
            let batch: Vec<Feature> = features
                .by_ref()
                .take(batch_size)
                .map(|line| self.simplify_feature(line))
                .collect();
            let progress = processed as f64 / valid as f64 * 100.0;
            processed += batch.len();

            sink(SimplifyMessage::Batch { batch, progress });
        }

        sink(SimplifyMessage::Done);
        FeatureCounts { valid, total }
    }

    /// Runs [`LineSimplifier::process`] on a blocking tokio task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(self, feature_collection: Value) -> SimplificationJob {
        let (sender, receiver) = unbounded_channel();
        let handle = tokio::task::spawn_blocking(move || {
            self.process(&feature_collection, |message| {
                if sender.send(message).is_err() {
                    log::debug!("Simplification output is dropped, nobody is listening");
                }
            })
        });

        SimplificationJob { receiver, handle }
    }

    fn effective_batch_size(&self) -> usize {
        if self.batch_size == 0 {
            log::warn!("Batch size of 0 is not allowed, using batches of 1 feature");
            1
        } else {
            self.batch_size
        }
    }

    fn simplify_feature(&self, line: LineFeature) -> Feature {
        let simplified = simplify(&line.coordinates, self.tolerance)
            .iter()
            .map(|point| point.coords().to_vec())
            .collect();

        Feature {
            bbox: None,
            geometry: Some(Geometry::new(geojson::Value::LineString(simplified))),
            id: line.id,
            properties: line.properties,
            foreign_members: line.foreign_members,
        }
    }
}

impl From<&SimplificationTask> for LineSimplifier {
    fn from(task: &SimplificationTask) -> Self {
        Self::new(task.tolerance).with_batch_size(task.batch_size)
    }
}

/// Handle to a simplification running in background.
pub struct SimplificationJob {
    receiver: UnboundedReceiver<SimplifyMessage>,
    handle: JoinHandle<FeatureCounts>,
}

impl SimplificationJob {
    /// Waits for the next message. Returns `None` after [`SimplifyMessage::Done`] was received and the worker
    /// finished.
    pub async fn next(&mut self) -> Option<SimplifyMessage> {
        self.receiver.recv().await
    }

    /// Waits for the worker to finish and returns the feature counts of the collection.
    pub async fn join(self) -> Result<FeatureCounts, GeomeasureError> {
        Ok(self.handle.await?)
    }
}

fn line_features(feature_collection: &Value) -> (Vec<LineFeature>, usize) {
    let Some(features) = feature_collection
        .get("features")
        .and_then(Value::as_array)
    else {
        return (vec![], 0);
    };

    let valid = features.iter().filter_map(line_feature).collect();
    (valid, features.len())
}

fn line_feature(value: &Value) -> Option<LineFeature> {
    let object = value.as_object()?;
    let geometry = object.get("geometry")?;
    if geometry.get("type")?.as_str()? != "LineString" {
        return None;
    }

    let coordinates = geometry.get("coordinates")?.as_array()?;
    if coordinates.len() < 2 {
        return None;
    }

    let coordinates = coordinates
        .iter()
        .map(coordinate)
        .collect::<Option<Vec<_>>>()?;

    Some(LineFeature {
        id: object.get("id").and_then(feature_id),
        properties: object.get("properties").and_then(Value::as_object).cloned(),
        foreign_members: foreign_members(object),
        coordinates,
    })
}

fn feature_id(value: &Value) -> Option<Id> {
    match value {
        Value::String(id) => Some(Id::String(id.clone())),
        Value::Number(id) => Some(Id::Number(id.clone())),
        _ => None,
    }
}

fn foreign_members(object: &JsonObject) -> Option<JsonObject> {
    let members: JsonObject = object
        .iter()
        .filter(|(key, _)| {
            !matches!(
                key.as_str(),
                "type" | "id" | "geometry" | "properties" | "bbox"
            )
        })
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    (!members.is_empty()).then_some(members)
}

fn coordinate(value: &Value) -> Option<GeodeticPoint> {
    let components = value.as_array()?;
    if components.len() < 2 {
        return None;
    }

    let lon = components[0].as_f64()?;
    let lat = components[1].as_f64()?;
    let height = components.get(2).and_then(Value::as_f64).unwrap_or(0.0);

    Some(GeodeticPoint::new(lon, lat, height))
}
