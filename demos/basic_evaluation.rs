//! Basic evaluation example demonstrating core functionality.

use bev_eval::{
    loader::load_boxes_from_string, metrics::iou::calculate_iou, score_mask, AtsScorer, BbSpace,
    BoundingBox,
};
use ndarray::{s, Array2};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== BEV Vehicle Evaluation Example ===\n");

    // Example 1: IoU Calculation
    println!("1. IoU Calculation");
    let bbox1 = BoundingBox::from_rect(0.0, 0.0, 5.0, 2.0);
    let bbox2 = BoundingBox::from_rect(1.0, 0.0, 5.0, 2.0);
    println!("   IoU between shifted cars: {:.4}", calculate_iou(&bbox1, &bbox2));

    let rotated = BoundingBox::new([2.5, 0.0, 0.0, -2.5], [0.0, 2.5, -2.5, 0.0]);
    let square = BoundingBox::from_rect(-2.5, -2.5, 5.0, 5.0);
    println!("   IoU between square and inscribed diamond: {:.4}", calculate_iou(&square, &rotated));
    println!();

    // Example 2: Coordinate transform
    println!("2. Pixel <-> Bounding-Box Space");
    let space = BbSpace::default();
    for (x, y) in [(0.0, 0.0), (400.0, 400.0), (800.0, 800.0)] {
        let (bx, by) = space.point_to_bb(x, y);
        println!("   pixel ({x:>5.1}, {y:>5.1}) -> bb ({bx:>5.1}, {by:>5.1})");
    }
    println!();

    // Example 3: Load boxes
    println!("3. Loading Boxes");
    let targets_json = r#"[
        [[5, 5, 0, 0], [-1, 1, -1, 1]],
        [[15, 15, 10, 10], [-1, 1, -1, 1]],
        [[25, 25, 20, 20], [-1, 1, -1, 1]]
    ]"#;
    let predictions_json = r#"[
        [[5, 5, 0, 0], [-1, 1, -1, 1]],
        [[15.5, 15.5, 10.5, 10.5], [-1, 1, -1, 1]],
        [[-20, -20, -25, -25], [-1, 1, -1, 1]]
    ]"#;

    let targets = load_boxes_from_string(targets_json)?;
    let predictions = load_boxes_from_string(predictions_json)?;
    println!("   Loaded {} targets and {} predictions", targets.len(), predictions.len());
    println!();

    // Example 4: ATS
    println!("4. Average Threat Score");
    let report = AtsScorer::default().evaluate(&predictions, &targets);
    println!("   Candidate pairs: {}", report.candidate_pairs);
    println!("   Threshold | Weight | TP | Threat Score");
    println!("   ----------|--------|----|-------------");
    for entry in &report.per_threshold {
        println!(
            "   {:>9.2} | {:>6.3} | {:>2} | {:>12.4}",
            entry.threshold, entry.weight, entry.true_positives, entry.threat_score
        );
    }
    println!("   └─ ATS: {:.4}", report.score);
    println!();

    // Example 5: Road map score
    println!("5. Road Map Threat Score");
    let mut predicted_road = Array2::<u8>::zeros((800, 800));
    let mut target_road = Array2::<u8>::zeros((800, 800));
    predicted_road.slice_mut(s![380..460, ..]).fill(1);
    target_road.slice_mut(s![390..460, ..]).fill(1);
    println!("   Road TS: {:.4}", score_mask(&predicted_road, &target_road)?);
    println!();

    println!("=== Example Complete ===");

    Ok(())
}
