use proptest::prelude::*;
use puzzle_director_core::{Complexity, PuzzleCategory, Theme};
use puzzle_director_system_puzzle_selection::{PuzzleTypeSelector, SelectorConfig};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const DRAWS: usize = 100_000;
const TOLERANCE: f32 = 0.02;

fn selector() -> PuzzleTypeSelector {
    PuzzleTypeSelector::new(&SelectorConfig::default()).expect("default selector config")
}

#[test]
fn repeated_draws_converge_on_renormalized_weights() {
    let selector = selector();
    let complexity = Complexity::new(6);
    let theme = Some(Theme::ClockworkWorkshop);
    let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);
    let mut counts = [0usize; 7];
    for _ in 0..DRAWS {
        let category = selector.select(complexity, theme, &mut rng);
        counts[category.index()] += 1;
    }

    for (category, expected) in selector.distribution(complexity, theme) {
        let observed = counts[category.index()] as f32 / DRAWS as f32;
        assert!(
            (observed - expected).abs() <= TOLERANCE,
            "{}: observed {observed}, expected {expected}",
            category.label()
        );
    }
}

#[test]
fn theme_without_affinities_matches_complexity_adjusted_weights() {
    let selector = selector();
    let config = SelectorConfig::default();
    let complexity = Complexity::new(7);
    let sanctuary = selector.distribution(complexity, Some(Theme::Sanctuary));

    let adjusted: Vec<f32> = PuzzleCategory::ALL
        .iter()
        .map(|category| {
            config.base_weights.get(*category) * selector.complexity_multiplier(*category, complexity)
        })
        .collect();
    let total: f32 = adjusted.iter().sum();

    for (category, weight) in sanctuary {
        let expected = adjusted[category.index()] / total;
        assert!((weight - expected).abs() < 1e-6);
    }
    assert_eq!(sanctuary, selector.distribution(complexity, None));
}

proptest! {
    #[test]
    fn distributions_always_sum_to_one(level in 0u8..=12, theme_index in 0usize..6) {
        let selector = selector();
        let theme = Theme::ALL.get(theme_index).copied();
        let distribution = selector.distribution(Complexity::new(level), theme);
        let total: f32 = distribution.iter().map(|(_, weight)| *weight).sum();
        prop_assert!((total - 1.0).abs() < 1e-5);
        prop_assert!(distribution.iter().all(|(_, weight)| *weight >= 0.0));
    }

    #[test]
    fn complexity_multiplier_is_non_decreasing(level in 1u8..10) {
        let selector = selector();
        for category in PuzzleCategory::ALL {
            let lower = selector.complexity_multiplier(category, Complexity::new(level));
            let higher = selector.complexity_multiplier(category, Complexity::new(level + 1));
            prop_assert!(higher >= lower);
        }
    }
}
