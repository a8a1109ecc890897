use puzzle_director_core::{
    Event, PlayerId, PuzzleCategory, RawPuzzleOutcome, RawTelemetry, SessionTime,
};
use puzzle_director_system_telemetry::TelemetrySink;

#[test]
fn out_of_range_values_are_clamped_not_rejected() {
    let mut sink = TelemetrySink::default();
    let mut readings = Vec::new();
    let mut attempts = Vec::new();

    sink.handle(
        &[
            Event::TelemetryReceived {
                telemetry: RawTelemetry {
                    movement_intensity: 7.5,
                    interaction_frequency: -0.4,
                    puzzle_progress: f32::NAN,
                    active_puzzle_count: 3,
                },
                at: SessionTime::from_secs(12),
            },
            Event::OutcomeReported {
                outcome: RawPuzzleOutcome {
                    category: PuzzleCategory::Logic,
                    player: PlayerId::new(7),
                    success: true,
                    completion_time_secs: -5.0,
                    difficulty_at_attempt: 14.0,
                },
                at: SessionTime::from_secs(13),
            },
        ],
        &mut readings,
        &mut attempts,
    );

    assert_eq!(readings.len(), 1);
    let reading = readings[0];
    assert_eq!(reading.movement_intensity, 1.0);
    assert_eq!(reading.interaction_frequency, 0.0);
    assert_eq!(reading.puzzle_progress, 0.0);
    assert_eq!(reading.timestamp, SessionTime::from_secs(12));

    assert_eq!(attempts.len(), 1);
    let attempt = attempts[0];
    assert_eq!(attempt.completion_time_secs, 0.0);
    assert_eq!(attempt.difficulty, 10.0);
    assert_eq!(attempt.player, PlayerId::new(7));

    let stats = sink.stats();
    assert_eq!(stats.samples, 1);
    assert_eq!(stats.outcomes, 1);
    assert_eq!(stats.sanitized_values, 4);
}

#[test]
fn unrelated_events_are_ignored() {
    let mut sink = TelemetrySink::default();
    let mut readings = Vec::new();
    let mut attempts = Vec::new();
    sink.handle(
        &[Event::TimeAdvanced {
            dt: std::time::Duration::from_secs(1),
        }],
        &mut readings,
        &mut attempts,
    );
    assert!(readings.is_empty());
    assert!(attempts.is_empty());
}
