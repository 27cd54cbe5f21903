//! This example simplifies the line features of a GeoJSON file on a background task and prints the progress.
//!
//! Usage: `cargo run --example simplify_geojson -- <path to geojson> [tolerance] [batch size]`

use anyhow::Context;
use geomeasure::simplify::{SimplificationTask, SimplifyMessage, DEFAULT_BATCH_SIZE};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let path = args.next().context("path to a GeoJSON file is required")?;
    let tolerance: f64 = match args.next() {
        Some(v) => v.parse().context("invalid tolerance")?,
        None => 0.001,
    };
    let batch_size: usize = match args.next() {
        Some(v) => v.parse().context("invalid batch size")?,
        None => DEFAULT_BATCH_SIZE,
    };

    let contents =
        std::fs::read_to_string(&path).with_context(|| format!("failed to read {path}"))?;
    let feature_collection = serde_json::from_str(&contents).context("invalid JSON")?;

    let mut task = SimplificationTask::new(feature_collection, tolerance);
    task.batch_size = batch_size;

    let mut job = task.spawn();
    let mut points = 0;
    while let Some(message) = job.next().await {
        if let SimplifyMessage::Batch { batch, .. } = &message {
            points += batch
                .iter()
                .filter_map(|feature| feature.geometry.as_ref())
                .map(|geometry| match &geometry.value {
                    geojson::Value::LineString(coords) => coords.len(),
                    _ => 0,
                })
                .sum::<usize>();
        }

        println!("{:>6.2}%", message.progress());
    }

    let counts = job.join().await?;
    println!(
        "Simplified {} of {} features, {points} points left",
        counts.valid, counts.total
    );

    Ok(())
}
