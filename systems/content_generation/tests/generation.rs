use proptest::prelude::*;
use puzzle_director_core::{PerformanceSnapshot, SessionTime, Theme};
use puzzle_director_system_content_generation::{
    seeds, ContentGenerator, GenerationConfig, ThemeWeight,
};
use puzzle_director_system_puzzle_selection::PuzzleTypeSelector;

fn generator(config: &GenerationConfig) -> ContentGenerator {
    ContentGenerator::new(config, PuzzleTypeSelector::default())
}

fn snapshot(average_performance: f32, success_rate: f32) -> PerformanceSnapshot {
    PerformanceSnapshot {
        average_performance,
        success_rate,
        ..PerformanceSnapshot::NEUTRAL
    }
}

#[test]
fn same_seed_produces_identical_rooms() {
    let config = GenerationConfig::default();
    let mut first = generator(&config);
    let mut second = generator(&config);
    for job in 0..5 {
        let base = seeds::derive_job_seed(99, job);
        let mut rng_a = seeds::labeled_rng(base, seeds::STREAM_GENERATION);
        let mut rng_b = seeds::labeled_rng(base, seeds::STREAM_GENERATION);
        let room_a = first.generate_room(&snapshot(0.6, 0.7), 5.0, SessionTime::from_secs(30), &mut rng_a);
        let room_b = second.generate_room(&snapshot(0.6, 0.7), 5.0, SessionTime::from_secs(30), &mut rng_b);
        assert_eq!(room_a, room_b);
    }
}

#[test]
fn ids_are_unique_across_rooms() {
    let mut generator = generator(&GenerationConfig::default());
    let mut rng = seeds::labeled_rng(1, seeds::STREAM_GENERATION);
    let first = generator.generate_room(&snapshot(0.9, 0.9), 5.0, SessionTime::ZERO, &mut rng);
    let second = generator.generate_room(&snapshot(0.9, 0.9), 5.0, SessionTime::ZERO, &mut rng);
    assert_ne!(first.id, second.id);
    for puzzle in &first.puzzles {
        assert!(second.puzzles.iter().all(|other| other.id != puzzle.id));
        assert_eq!(puzzle.room, first.id);
    }
}

#[test]
fn no_enabled_themes_yields_unthemed_room() {
    let config = GenerationConfig {
        themes: vec![ThemeWeight {
            theme: Theme::CrystalCavern,
            weight: 0.0,
        }],
        ..GenerationConfig::default()
    };
    let mut generator = generator(&config);
    let mut rng = seeds::labeled_rng(5, seeds::STREAM_GENERATION);
    let room = generator.generate_room(&snapshot(0.5, 0.5), 5.0, SessionTime::ZERO, &mut rng);
    assert_eq!(room.theme, None);
    assert!(room.name.starts_with("Chamber"));
    assert!(!room.puzzles.is_empty());
}

#[test]
fn single_enabled_theme_is_always_chosen() {
    let config = GenerationConfig {
        themes: vec![ThemeWeight {
            theme: Theme::OvergrownGarden,
            weight: 2.0,
        }],
        ..GenerationConfig::default()
    };
    let generator = generator(&config);
    let mut rng = seeds::labeled_rng(8, seeds::STREAM_GENERATION);
    for _ in 0..50 {
        assert_eq!(generator.select_theme(&mut rng), Some(Theme::OvergrownGarden));
    }
}

#[test]
fn staged_generation_matches_one_shot_generation() {
    let config = GenerationConfig::default();
    let mut staged = generator(&config);
    let mut one_shot = generator(&config);
    let mut rng_a = seeds::labeled_rng(3, seeds::STREAM_GENERATION);
    let mut rng_b = seeds::labeled_rng(3, seeds::STREAM_GENERATION);

    let blueprint = staged.build_structure(&snapshot(0.4, 0.6), 4.0, SessionTime::from_secs(60), &mut rng_a);
    assert!(blueprint.room().puzzles.is_empty());
    let count = blueprint.puzzle_count();
    let room = staged.populate_puzzles(blueprint, &mut rng_a);
    assert_eq!(room.puzzles.len(), count);

    let expected = one_shot.generate_room(&snapshot(0.4, 0.6), 4.0, SessionTime::from_secs(60), &mut rng_b);
    assert_eq!(room, expected);
}

proptest! {
    #[test]
    fn generated_rooms_respect_bounds(
        seed in any::<u64>(),
        performance in 0.0f32..=1.0,
        success in 0.0f32..=1.0,
    ) {
        let config = GenerationConfig {
            min_room_complexity: 2,
            max_room_complexity: 8,
            ..GenerationConfig::default()
        };
        let mut generator = generator(&config);
        let mut rng = seeds::labeled_rng(seed, seeds::STREAM_GENERATION);
        let room = generator.generate_room(&snapshot(performance, success), 5.0, SessionTime::ZERO, &mut rng);

        prop_assert!((2..=8).contains(&room.complexity.get()));
        prop_assert!((1..=8).contains(&room.puzzles.len()));
        for pair in room.puzzles.windows(2) {
            prop_assert!(pair[0].difficulty <= pair[1].difficulty);
        }
        for puzzle in &room.puzzles {
            prop_assert!((1..=10).contains(&puzzle.difficulty.get()));
            prop_assert!(puzzle.requirements.success_threshold <= 0.95);
            prop_assert_eq!(puzzle.parameters.len(), 3);
        }
    }
}
