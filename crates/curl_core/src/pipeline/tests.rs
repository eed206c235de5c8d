use super::*;
use crate::config::TEE_TO_TEE_M;
use crate::geometry::Point;
use crate::shot::{ContextTag, GameContext, StoneMovement};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

const BUTTON_Y: f64 = TEE_TO_TEE_M;

fn draw(shot_id: u64, player: &str, final_pos: Point) -> ShotRecord {
    ShotRecord::new(shot_id, player)
        .with_release(Point::ORIGIN)
        .with_stone(StoneMovement::thrown("y1", final_pos))
}

/// Open-house draws scattered around the button
fn synthetic_batch(seed: u64, n: usize) -> Vec<ShotRecord> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let players = ["anna", "bjorn", "chen"];
    (0..n)
        .map(|i| {
            let final_pos = Point::new(
                rng.gen_range(-1.2..1.2),
                BUTTON_Y + rng.gen_range(-1.5..1.5),
            );
            let context = GameContext {
                pressure: rng.gen_bool(0.3),
                house_complexity: rng.gen_range(0.0..1.0),
                ..GameContext::default()
            };
            draw(i as u64, players[i % players.len()], final_pos).with_context(context)
        })
        .collect()
}

#[test]
fn test_reference_draw_scenario() {
    let report = AccuracyPipeline::default().run(&[draw(1, "p1", Point::new(0.14, BUTTON_Y))]);

    assert_eq!(report.metrics.len(), 1);
    let metric = &report.metrics[0];
    assert_eq!(metric.category, ShotCategory::Draw);
    assert_eq!(metric.target, Point::new(0.0, BUTTON_Y));
    assert!((metric.distance_error - 0.14).abs() < 1e-9);
    let expected_deg = 0.14f64.atan2(BUTTON_Y).to_degrees();
    assert!((metric.direction_error - expected_deg).abs() < 1e-9);

    let stat = &report.category_stats[0];
    assert_eq!(stat.sample_count, 1);
    assert_eq!(stat.std_distance_error(), 0.0);
    assert!(stat.low_confidence);
    assert_eq!(report.parameters.get("draw", "low_confidence"), Some(1.0));
}

#[test]
fn test_record_without_thrown_stone_produces_no_metric() {
    let malformed = ShotRecord::new(7, "p1")
        .with_release(Point::ORIGIN)
        .with_stone(StoneMovement::resting("r1", Point::new(0.0, BUTTON_Y)));
    let report = AccuracyPipeline::default().run(&[malformed]);

    assert!(report.metrics.is_empty());
    assert_eq!(report.exclusions.malformed, 1);
    assert_eq!(report.exclusions.total(), 1);
    assert_eq!(report.classification_counts[&ShotCategory::Unknown], 1);
    assert!(report.parameters.is_empty());
}

#[test]
fn test_mixed_batch_counts() {
    let takeout = ShotRecord::new(2, "p1")
        .with_release(Point::ORIGIN)
        .with_stone(StoneMovement::removed("r1", Point::new(0.4, BUTTON_Y - 0.6)))
        .with_stone(StoneMovement::thrown("y1", Point::new(0.5, BUTTON_Y - 0.45)));
    let hit_and_stick = ShotRecord::new(3, "p2")
        .with_release(Point::ORIGIN)
        .with_stone(StoneMovement::moved(
            "r1",
            Point::new(0.0, BUTTON_Y - 0.5),
            Point::new(0.0, BUTTON_Y + 0.75),
        ))
        .with_stone(StoneMovement::thrown("y1", Point::new(0.0, BUTTON_Y - 0.75)));
    let no_release =
        ShotRecord::new(4, "p2").with_stone(StoneMovement::thrown("y1", Point::new(0.1, BUTTON_Y)));
    let no_thrown = ShotRecord::new(5, "p1").with_release(Point::ORIGIN);

    let records = vec![
        draw(1, "p1", Point::new(0.14, BUTTON_Y)),
        takeout,
        hit_and_stick,
        no_release,
        no_thrown,
        draw(6, "p2", Point::new(-0.3, BUTTON_Y + 0.4)),
    ];
    let report = AccuracyPipeline::default().run(&records);

    assert_eq!(report.record_count, 6);
    let ids: Vec<u64> = report.metrics.iter().map(|m| m.shot_id).collect();
    assert_eq!(ids, vec![1, 2, 6]);

    assert_eq!(report.exclusions.unknown, 1);
    assert_eq!(report.exclusions.missing_geometry, 1);
    assert_eq!(report.exclusions.malformed, 1);
    assert_eq!(report.exclusions.inference_error, 0);
    assert_eq!(report.measured_count() + report.exclusions.total(), 6);

    assert_eq!(report.classification_counts[&ShotCategory::Draw], 3);
    assert_eq!(report.classification_counts[&ShotCategory::TakeOut], 1);
    assert_eq!(report.classification_counts[&ShotCategory::Unknown], 2);

    let takeout_metric = &report.metrics[1];
    assert_eq!(takeout_metric.category, ShotCategory::TakeOut);
    assert_eq!(takeout_metric.target, Point::new(0.4, BUTTON_Y - 0.6));

    let categories: Vec<ShotCategory> =
        report.category_stats.iter().map(|s| s.key.category).collect();
    assert_eq!(categories, vec![ShotCategory::Draw, ShotCategory::TakeOut]);
    assert_eq!(report.player_stats.len(), 3);
    assert!(report.parameters.players.contains_key("p2"));
    assert_eq!(
        report.unmeasured_categories(),
        vec![ShotCategory::Guard, ShotCategory::HitAndRoll, ShotCategory::Freeze]
    );
}

#[test]
fn test_process_record_reports_exclusion_reason() {
    let pipeline = AccuracyPipeline::default();
    let shot = pipeline.process_record(&ShotRecord::new(9, "p").with_release(Point::ORIGIN));
    assert_eq!(
        shot.outcome,
        RecordOutcome::Excluded(ExclusionReason::Malformed(RecordError::NoThrownStone))
    );
    assert!(shot.metric().is_none());

    let shot = pipeline.process_record(
        &ShotRecord::new(10, "p").with_stone(StoneMovement::thrown("y1", Point::new(0.0, BUTTON_Y))),
    );
    assert_eq!(
        shot.outcome,
        RecordOutcome::Excluded(ExclusionReason::MissingGeometry(GeometryPart::ReleasePosition))
    );
}

#[test]
fn test_rerun_is_idempotent() {
    let records = synthetic_batch(42, 120);
    let pipeline = AccuracyPipeline::default();

    let first = pipeline.run(&records);
    let second = pipeline.run(&records);
    assert_eq!(first, second);
    assert_eq!(
        first.parameters.checksum().unwrap(),
        second.parameters.checksum().unwrap()
    );
    assert_eq!(
        first.parameters.to_json().unwrap(),
        second.parameters.to_json().unwrap()
    );
}

#[test]
fn test_parallel_matches_sequential() {
    let records = synthetic_batch(7, 200);

    let mut sequential = PipelineConfig::default();
    sequential.aggregation.parallel_threshold = usize::MAX;
    let mut parallel = PipelineConfig::default();
    parallel.aggregation.parallel_threshold = 0;

    let a = AccuracyPipeline::new(sequential).run(&records);
    let b = AccuracyPipeline::new(parallel).run(&records);
    assert_eq!(a, b);
}

#[test]
fn test_shuffled_input_gives_same_parameters() {
    let records = synthetic_batch(11, 90);
    let mut reversed = records.clone();
    reversed.reverse();

    let pipeline = AccuracyPipeline::default();
    let a = pipeline.run(&records);
    let b = pipeline.run(&reversed);
    assert_eq!(a.parameters, b.parameters);
    assert_eq!(a.category_stats, b.category_stats);
}

#[test]
fn test_modifiers_exported() {
    let report = AccuracyPipeline::default().run(&synthetic_batch(3, 60));
    let draw = &report.category_stats[0];
    assert_eq!(draw.sample_count, 60);
    assert!(!draw.low_confidence);

    let pressure = draw.modifier(ContextTag::Pressure).map_or(0, |m| m.sample_count);
    let calm = draw.modifier(ContextTag::NoPressure).map_or(0, |m| m.sample_count);
    assert_eq!(pressure + calm, 60);
    if pressure > 0 {
        assert!(report
            .parameters
            .modifier("pressure", "draw", "distance_factor")
            .is_some());
    }
}

#[test]
fn test_empty_batch() {
    let report = AccuracyPipeline::default().run(&[]);
    assert_eq!(report.record_count, 0);
    assert!(report.metrics.is_empty());
    assert!(report.category_stats.is_empty());
    assert_eq!(report.patterns.total, 0);
    assert!(report.parameters.is_empty());
}
