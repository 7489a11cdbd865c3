//! Timestamp planning tests.

use std::time::Duration;

use mt::{SamplePlan, SheetError, tail_trim_millis};

// ── Tail trim ─────────────────────────────────────────────────────

#[test]
fn short_video_loses_eleven_percent() {
    assert_eq!(tail_trim_millis(200_000), 22_000);
    assert_eq!(tail_trim_millis(100), 11);
}

#[test]
fn long_video_with_small_proportional_trim_keeps_it() {
    // 11% of 10 minutes is 66 s, under the two-minute cap.
    assert_eq!(tail_trim_millis(600_000), 66_000);
}

#[test]
fn long_video_with_large_proportional_trim_is_capped() {
    assert_eq!(tail_trim_millis(1_200_000), 120_000);
    assert_eq!(tail_trim_millis(7_200_000), 120_000);
}

#[test]
fn four_minute_boundary_uses_proportional_trim() {
    assert_eq!(tail_trim_millis(240_000), 26_400);
}

// ── SamplePlan ───────────────────────────────────────────────────

#[test]
fn ten_minute_video_four_captures() {
    let plan = SamplePlan::new(Duration::from_millis(600_000), 4).unwrap();
    assert_eq!(plan.usable(), Duration::from_millis(534_000));
    assert_eq!(plan.interval(), Duration::from_millis(133_500));
    let expected: Vec<Duration> = [133_500, 267_000, 400_500, 534_000]
        .into_iter()
        .map(Duration::from_millis)
        .collect();
    assert_eq!(plan.timestamps(), expected.as_slice());
}

#[test]
fn twenty_minute_video_uses_fixed_trim() {
    let plan = SamplePlan::new(Duration::from_millis(1_200_000), 4).unwrap();
    assert_eq!(plan.usable(), Duration::from_millis(1_080_000));
    assert_eq!(plan.interval(), Duration::from_millis(270_000));
}

#[test]
fn short_video_interval() {
    let plan = SamplePlan::new(Duration::from_millis(200_000), 4).unwrap();
    assert_eq!(plan.interval(), Duration::from_millis(44_500));
    assert_eq!(plan.len(), 4);
    assert!(!plan.is_empty());
}

#[test]
fn timestamps_strictly_increase_and_stay_inside_usable_span() {
    let plan = SamplePlan::new(Duration::from_millis(3_601_234), 37).unwrap();
    assert_eq!(plan.len(), 37);
    for pair in plan.timestamps().windows(2) {
        assert!(pair[0] < pair[1]);
    }
    assert!(*plan.timestamps().last().unwrap() <= plan.usable());
}

#[test]
fn single_capture_lands_at_the_end_of_the_usable_span() {
    let plan = SamplePlan::new(Duration::from_millis(200_000), 1).unwrap();
    assert_eq!(plan.timestamps(), &[Duration::from_millis(178_000)]);
}

#[test]
fn zero_captures_rejected() {
    let result = SamplePlan::new(Duration::from_secs(60), 0);
    assert!(matches!(result, Err(SheetError::InvalidConfiguration(_))));
}

#[test]
fn zero_duration_rejected() {
    let result = SamplePlan::new(Duration::ZERO, 4);
    assert!(matches!(result, Err(SheetError::InvalidDuration(_))));
}

#[test]
fn interval_collapsing_to_zero_rejected() {
    let result = SamplePlan::new(Duration::from_millis(3), 4);
    assert!(matches!(
        result,
        Err(SheetError::IntervalTooSmall { count: 4, .. })
    ));
}

#[test]
fn tiny_intervals_are_still_planned() {
    // 8 ms of usable time over 8 captures: logged, but valid.
    let plan = SamplePlan::new(Duration::from_millis(9), 8).unwrap();
    assert_eq!(plan.interval(), Duration::from_millis(1));
}
