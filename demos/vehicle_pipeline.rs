//! End-to-end vehicle pipeline: mask -> boxes -> filter/split -> ATS.
//!
//! Run with `RUST_LOG=debug` to see the per-stage tracing output.

use bev_eval::segmentation::extract_boxes_with;
use bev_eval::synthetic::baseline_boxes;
use bev_eval::{BbSpace, EvalConfig, FilterInput, VehicleFilter};
use ndarray::{s, Array2};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Vehicle Pipeline Example ===\n");

    let config = EvalConfig::default();
    config.validate()?;
    let space: BbSpace = config.bb_space;

    // A predicted probability mask: one queue of three cars fused into a
    // single blob, two separate cars, a speck and a blob off the road
    let mut mask = Array2::<f32>::zeros((800, 800));
    mask.slice_mut(s![420..445, 20..170]).fill(0.9);
    mask.slice_mut(s![420..445, 220..270]).fill(0.8);
    mask.slice_mut(s![420..445, 320..370]).fill(0.7);
    mask.slice_mut(s![500..504, 500..504]).fill(0.9);
    mask.slice_mut(s![40..70, 300..360]).fill(0.9);

    println!("1. Filtering and splitting");
    let filter: VehicleFilter = config.vehicle_filter;
    let raw = extract_boxes_with(&mask, &config.segmentation);
    let (cars, stats) = filter.filter_and_split_with_stats(&raw)?;
    println!("   Raw blobs: {}", raw.len());
    println!("   {stats}");

    let same = filter.process(FilterInput::Mask {
        mask: mask.view(),
        threshold: config.segmentation.threshold,
    })?;
    assert_eq!(same.len(), cars.len());
    println!();

    println!("2. Scoring against the baseline row");
    let predictions = cars.to_bb_space(&space);
    let targets = baseline_boxes(true);
    let report = config.scorer().evaluate(&predictions, &targets);
    println!("   Predictions: {}", report.num_predictions);
    println!("   Targets:     {}", report.num_targets);
    println!("   ATS:         {:.4}", report.score);
    println!();

    println!("=== Example Complete ===");
    Ok(())
}
