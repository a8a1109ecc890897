#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Weighted puzzle category selection.
//!
//! Weights are built from three factors: a configured base table, a
//! per-category complexity multiplier and a theme affinity multiplier. The
//! product is renormalized before every draw, so the cumulative walk always
//! covers `[0, 1]`.

use std::collections::BTreeMap;

use puzzle_director_core::{Complexity, ConfigError, PuzzleCategory, Theme};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

const CATEGORY_COUNT: usize = PuzzleCategory::ALL.len();
const WEIGHT_TOLERANCE: f64 = 1e-6;

/// One value per puzzle category, keyed by field for readable configuration files.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
    /// Relic placement puzzles.
    pub relic_placement: f32,
    /// Gesture puzzles.
    pub gesture: f32,
    /// Pattern matching puzzles.
    pub pattern_matching: f32,
    /// Sequence memory puzzles.
    pub sequence: f32,
    /// Logic puzzles.
    pub logic: f32,
    /// Physics puzzles.
    pub physics: f32,
    /// Combination lock puzzles.
    pub combination: f32,
}

impl CategoryWeights {
    /// Value configured for `category`.
    #[must_use]
    pub const fn get(&self, category: PuzzleCategory) -> f32 {
        match category {
            PuzzleCategory::RelicPlacement => self.relic_placement,
            PuzzleCategory::Gesture => self.gesture,
            PuzzleCategory::PatternMatching => self.pattern_matching,
            PuzzleCategory::Sequence => self.sequence,
            PuzzleCategory::Logic => self.logic,
            PuzzleCategory::Physics => self.physics,
            PuzzleCategory::Combination => self.combination,
        }
    }

    /// Iterates the values in fixed category order.
    pub fn iter(&self) -> impl Iterator<Item = (PuzzleCategory, f32)> + '_ {
        PuzzleCategory::ALL
            .into_iter()
            .map(move |category| (category, self.get(category)))
    }

    fn to_array(self) -> [f32; CATEGORY_COUNT] {
        PuzzleCategory::ALL.map(|category| self.get(category))
    }

    /// Base weights favouring tactile puzzles at low complexity.
    #[must_use]
    pub const fn default_base() -> Self {
        Self {
            relic_placement: 0.20,
            gesture: 0.15,
            pattern_matching: 0.15,
            sequence: 0.15,
            logic: 0.15,
            physics: 0.10,
            combination: 0.10,
        }
    }

    /// Complexity slopes; cognitively heavy categories grow fastest.
    #[must_use]
    pub const fn default_slopes() -> Self {
        Self {
            relic_placement: 0.0,
            gesture: 0.2,
            pattern_matching: 0.4,
            sequence: 1.0,
            logic: 1.0,
            physics: 0.5,
            combination: 0.8,
        }
    }
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self::default_base()
    }
}

/// Multiplier applied to one category while a theme is active.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThemeAffinity {
    /// Theme the affinity belongs to.
    pub theme: Theme,
    /// Category boosted by the theme.
    pub category: PuzzleCategory,
    /// Multiplier applied to the category weight.
    pub multiplier: f32,
}

impl ThemeAffinity {
    const fn new(theme: Theme, category: PuzzleCategory, multiplier: f32) -> Self {
        Self {
            theme,
            category,
            multiplier,
        }
    }
}

/// Default affinity table. [`Theme::Sanctuary`] intentionally has no entries.
#[must_use]
pub fn default_affinities() -> Vec<ThemeAffinity> {
    use PuzzleCategory::{Combination, Gesture, Logic, PatternMatching, Physics, RelicPlacement, Sequence};
    vec![
        ThemeAffinity::new(Theme::AncientTemple, RelicPlacement, 1.5),
        ThemeAffinity::new(Theme::AncientTemple, Sequence, 1.2),
        ThemeAffinity::new(Theme::CrystalCavern, PatternMatching, 1.4),
        ThemeAffinity::new(Theme::CrystalCavern, Gesture, 1.2),
        ThemeAffinity::new(Theme::ClockworkWorkshop, Physics, 1.5),
        ThemeAffinity::new(Theme::ClockworkWorkshop, Logic, 1.3),
        ThemeAffinity::new(Theme::ClockworkWorkshop, Combination, 1.2),
        ThemeAffinity::new(Theme::OvergrownGarden, Gesture, 1.3),
        ThemeAffinity::new(Theme::OvergrownGarden, Physics, 1.2),
    ]
}

/// Selector configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Base weights; must sum to one.
    pub base_weights: CategoryWeights,
    /// Per-category growth of the complexity multiplier.
    pub complexity_slopes: CategoryWeights,
    /// Theme affinity table.
    pub affinities: Vec<ThemeAffinity>,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            base_weights: CategoryWeights::default_base(),
            complexity_slopes: CategoryWeights::default_slopes(),
            affinities: default_affinities(),
        }
    }
}

impl SelectorConfig {
    /// Rejects negative weights, negative slopes and base weights that do not sum to one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (category, weight) in self.base_weights.iter() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    field: category.label(),
                    value: f64::from(weight),
                });
            }
        }
        let sum: f64 = self
            .base_weights
            .iter()
            .map(|(_, weight)| f64::from(weight))
            .sum();
        if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(ConfigError::WeightsNotNormalized { sum });
        }
        for (_, slope) in self.complexity_slopes.iter() {
            if !slope.is_finite() || slope < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    field: "selection.complexity_slopes",
                    value: f64::from(slope),
                });
            }
        }
        for affinity in &self.affinities {
            if !affinity.multiplier.is_finite() || affinity.multiplier < 0.0 {
                return Err(ConfigError::InvalidWeight {
                    field: "selection.affinities",
                    value: f64::from(affinity.multiplier),
                });
            }
        }
        Ok(())
    }
}

/// Renormalized probability per category in fixed category order.
pub type CategoryDistribution = [(PuzzleCategory, f32); CATEGORY_COUNT];

/// Draws puzzle categories from a complexity- and theme-adjusted distribution.
#[derive(Clone, Debug)]
pub struct PuzzleTypeSelector {
    base: [f32; CATEGORY_COUNT],
    slopes: [f32; CATEGORY_COUNT],
    affinities: BTreeMap<(Theme, PuzzleCategory), f32>,
}

impl PuzzleTypeSelector {
    /// Builds a selector after validating the configuration.
    pub fn new(config: &SelectorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_validated(config))
    }

    fn from_validated(config: &SelectorConfig) -> Self {
        let affinities = config
            .affinities
            .iter()
            .map(|affinity| ((affinity.theme, affinity.category), affinity.multiplier))
            .collect();
        Self {
            base: config.base_weights.to_array(),
            slopes: config.complexity_slopes.to_array(),
            affinities,
        }
    }

    /// Multiplier `1 + slope × (c − 1) / 9` for `category` at `complexity`.
    #[must_use]
    pub fn complexity_multiplier(&self, category: PuzzleCategory, complexity: Complexity) -> f32 {
        let c = f32::from(complexity.get()).clamp(1.0, 10.0);
        1.0 + self.slopes[category.index()] * (c - 1.0) / 9.0
    }

    /// Affinity multiplier, `1.0` when the pair has no entry or no theme is active.
    #[must_use]
    pub fn theme_multiplier(&self, category: PuzzleCategory, theme: Option<Theme>) -> f32 {
        theme
            .and_then(|theme| self.affinities.get(&(theme, category)).copied())
            .unwrap_or(1.0)
    }

    /// Renormalized distribution for the given context.
    ///
    /// Falls back to a uniform distribution when every adjusted weight is zero.
    #[must_use]
    pub fn distribution(&self, complexity: Complexity, theme: Option<Theme>) -> CategoryDistribution {
        let raw = PuzzleCategory::ALL.map(|category| {
            self.base[category.index()]
                * self.complexity_multiplier(category, complexity)
                * self.theme_multiplier(category, theme)
        });
        let total: f32 = raw.iter().sum();
        if total <= 0.0 || !total.is_finite() {
            warn!("adjusted category weights collapsed, using uniform distribution");
            let uniform = 1.0 / CATEGORY_COUNT as f32;
            return PuzzleCategory::ALL.map(|category| (category, uniform));
        }
        PuzzleCategory::ALL.map(|category| (category, raw[category.index()] / total))
    }

    /// Draws a category using `rng`.
    pub fn select<R>(&self, complexity: Complexity, theme: Option<Theme>, rng: &mut R) -> PuzzleCategory
    where
        R: Rng + ?Sized,
    {
        let draw: f32 = rng.gen();
        self.select_with_draw(draw, complexity, theme)
    }

    /// Walks the cumulative distribution with an explicit draw in `[0, 1)`.
    ///
    /// Returns the first category whose cumulative weight reaches `draw`. A
    /// draw no category reaches, such as one left uncovered by rounding,
    /// resolves to the first category in fixed order.
    #[must_use]
    pub fn select_with_draw(
        &self,
        draw: f32,
        complexity: Complexity,
        theme: Option<Theme>,
    ) -> PuzzleCategory {
        let mut cumulative = 0.0f32;
        for (category, weight) in self.distribution(complexity, theme) {
            cumulative += weight;
            if cumulative >= draw {
                return category;
            }
        }
        let fallback = PuzzleCategory::ALL[0];
        debug!(draw, cumulative, fallback = fallback.label(), "category draw fell through");
        fallback
    }
}

impl Default for PuzzleTypeSelector {
    fn default() -> Self {
        Self::from_validated(&SelectorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::{CategoryWeights, PuzzleTypeSelector, SelectorConfig};
    use puzzle_director_core::{Complexity, ConfigError, PuzzleCategory, Theme};

    #[test]
    fn default_configuration_is_valid() {
        assert!(SelectorConfig::default().validate().is_ok());
        assert!(PuzzleTypeSelector::new(&SelectorConfig::default()).is_ok());
    }

    #[test]
    fn unnormalized_base_weights_are_rejected() {
        let config = SelectorConfig {
            base_weights: CategoryWeights {
                relic_placement: 0.5,
                ..CategoryWeights::default_base()
            },
            ..SelectorConfig::default()
        };
        match PuzzleTypeSelector::new(&config) {
            Err(ConfigError::WeightsNotNormalized { sum }) => assert!((sum - 1.3).abs() < 1e-6),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn complexity_favours_cognitive_categories() {
        let selector = PuzzleTypeSelector::default();
        let low = selector.distribution(Complexity::new(1), None);
        let high = selector.distribution(Complexity::new(10), None);
        let logic = PuzzleCategory::Logic.index();
        let relic = PuzzleCategory::RelicPlacement.index();
        assert!(high[logic].1 > low[logic].1);
        assert!(high[relic].1 < low[relic].1);
    }

    #[test]
    fn affinity_boosts_matching_category() {
        let selector = PuzzleTypeSelector::default();
        let plain = selector.distribution(Complexity::new(5), None);
        let temple = selector.distribution(Complexity::new(5), Some(Theme::AncientTemple));
        let relic = PuzzleCategory::RelicPlacement.index();
        assert!(temple[relic].1 > plain[relic].1);
    }

    #[test]
    fn out_of_range_draw_falls_back_to_first_category() {
        let selector = PuzzleTypeSelector::default();
        let complexity = Complexity::new(4);
        assert_eq!(
            selector.select_with_draw(1.5, complexity, None),
            PuzzleCategory::RelicPlacement
        );
        assert_eq!(
            selector.select_with_draw(f32::NAN, complexity, None),
            PuzzleCategory::RelicPlacement
        );
        assert_eq!(
            selector.select_with_draw(0.0, complexity, None),
            PuzzleCategory::RelicPlacement
        );
    }
}
