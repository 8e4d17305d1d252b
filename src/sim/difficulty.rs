//! Difficulty tiers
//!
//! A rubric table maps progress thresholds to (partial) spawner configs. The
//! tier at threshold 0 is the base and must be complete; each later tier only
//! lists what it overrides. [`DifficultyManager`] ratchets forward through the
//! tiers as progress grows and never steps back.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::condiment::CondimentKind;
use super::error::SimError;

/// Platform zone colours
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformColors {
    pub base: u32,
    pub accurate: u32,
    pub inaccurate: u32,
}

impl Default for PlatformColors {
    fn default() -> Self {
        Self {
            base: 0x666666,
            accurate: 0x88ff88,
            inaccurate: 0xffff00,
        }
    }
}

/// Independent per-kind spawn chance in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CondimentProbability {
    pub coin: f32,
    pub left_spike: f32,
    pub right_spike: f32,
}

impl CondimentProbability {
    pub fn get(&self, kind: CondimentKind) -> f32 {
        match kind {
            CondimentKind::Coin => self.coin,
            CondimentKind::LeftSpike => self.left_spike,
            CondimentKind::RightSpike => self.right_spike,
        }
    }
}

/// Everything the spawner needs to place one platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnerConfig {
    pub min_gap: f32,
    pub max_gap: f32,
    pub min_height: f32,
    pub max_height: f32,
    pub min_platform_width: f32,
    pub max_platform_width: f32,
    pub min_platform_height: f32,
    pub max_platform_height: f32,
    /// Share of the platform width taken by the main zone; also the fraction
    /// of the player's width trimmed from each side before judging a landing
    pub required_accuracy: f32,
    pub platform_color: PlatformColors,
    pub condiment_probability: CondimentProbability,
}

impl SpawnerConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        let ranges = [
            (self.min_gap, self.max_gap, "gap range"),
            (self.min_height, self.max_height, "height range"),
            (self.min_platform_width, self.max_platform_width, "platform width range"),
            (self.min_platform_height, self.max_platform_height, "platform height range"),
        ];
        for (min, max, what) in ranges {
            if !min.is_finite() || !max.is_finite() {
                return Err(SimError::InvalidConfig("non-finite spawner range"));
            }
            if min > max {
                log::error!("Spawner {what} is inverted: {min} > {max}");
                return Err(SimError::InvalidConfig("spawner range min exceeds max"));
            }
        }
        if self.min_gap < 0.0 {
            return Err(SimError::InvalidConfig("gap must be non-negative"));
        }
        if self.min_platform_width <= 0.0 || self.min_platform_height <= 0.0 {
            return Err(SimError::InvalidConfig("platform size must be positive"));
        }
        if !(0.0..=1.0).contains(&self.required_accuracy) {
            return Err(SimError::InvalidConfig("required accuracy must be in [0, 1]"));
        }
        let p = self.condiment_probability;
        if [p.coin, p.left_spike, p.right_spike]
            .iter()
            .any(|v| !(0.0..=1.0).contains(v))
        {
            return Err(SimError::InvalidConfig("condiment probability must be in [0, 1]"));
        }
        Ok(())
    }
}

/// Tier override; unset fields inherit from earlier tiers.
///
/// Nested structs (`platformColor`, `condimentProbability`) are replaced as a
/// whole, not merged field by field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PartialSpawnerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_gap: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_gap: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_platform_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_platform_width: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_platform_height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_platform_height: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_accuracy: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform_color: Option<PlatformColors>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condiment_probability: Option<CondimentProbability>,
}

impl PartialSpawnerConfig {
    /// Overwrite every field set here
    pub fn merge_into(&self, config: &mut SpawnerConfig) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if let Some(v) = self.$field { config.$field = v; })*
            };
        }
        take!(
            min_gap,
            max_gap,
            min_height,
            max_height,
            min_platform_width,
            max_platform_width,
            min_platform_height,
            max_platform_height,
            required_accuracy,
            platform_color,
            condiment_probability
        );
    }

    /// Promote to a full config; every field must be present
    pub fn to_full(&self) -> Result<SpawnerConfig, SimError> {
        macro_rules! need {
            ($field:ident, $name:literal) => {
                self.$field.ok_or(SimError::IncompleteBaseTier($name))?
            };
        }
        Ok(SpawnerConfig {
            min_gap: need!(min_gap, "minGap"),
            max_gap: need!(max_gap, "maxGap"),
            min_height: need!(min_height, "minHeight"),
            max_height: need!(max_height, "maxHeight"),
            min_platform_width: need!(min_platform_width, "minPlatformWidth"),
            max_platform_width: need!(max_platform_width, "maxPlatformWidth"),
            min_platform_height: need!(min_platform_height, "minPlatformHeight"),
            max_platform_height: need!(max_platform_height, "maxPlatformHeight"),
            required_accuracy: need!(required_accuracy, "requiredAccuracy"),
            platform_color: need!(platform_color, "platformColor"),
            condiment_probability: self.condiment_probability.unwrap_or_default(),
        })
    }
}

impl From<SpawnerConfig> for PartialSpawnerConfig {
    fn from(c: SpawnerConfig) -> Self {
        Self {
            min_gap: Some(c.min_gap),
            max_gap: Some(c.max_gap),
            min_height: Some(c.min_height),
            max_height: Some(c.max_height),
            min_platform_width: Some(c.min_platform_width),
            max_platform_width: Some(c.max_platform_width),
            min_platform_height: Some(c.min_platform_height),
            max_platform_height: Some(c.max_platform_height),
            required_accuracy: Some(c.required_accuracy),
            platform_color: Some(c.platform_color),
            condiment_probability: Some(c.condiment_probability),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct Tier {
    threshold: u64,
    overrides: PartialSpawnerConfig,
    /// Base merged with every override up to and including this tier
    config: SpawnerConfig,
}

/// Sorted, validated tier table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<u64, PartialSpawnerConfig>",
    into = "BTreeMap<u64, PartialSpawnerConfig>"
)]
pub struct DifficultyRubrics {
    tiers: Vec<Tier>,
}

impl TryFrom<BTreeMap<u64, PartialSpawnerConfig>> for DifficultyRubrics {
    type Error = SimError;

    fn try_from(map: BTreeMap<u64, PartialSpawnerConfig>) -> Result<Self, Self::Error> {
        let mut entries = map.into_iter();
        let (threshold, base) = entries.next().ok_or(SimError::MissingBaseTier)?;
        if threshold != 0 {
            return Err(SimError::MissingBaseTier);
        }

        let mut config = base.to_full()?;
        config.validate()?;
        let mut tiers = vec![Tier {
            threshold,
            overrides: base,
            config: config.clone(),
        }];

        for (threshold, overrides) in entries {
            overrides.merge_into(&mut config);
            config.validate()?;
            tiers.push(Tier {
                threshold,
                overrides,
                config: config.clone(),
            });
        }

        Ok(Self { tiers })
    }
}

impl From<DifficultyRubrics> for BTreeMap<u64, PartialSpawnerConfig> {
    fn from(rubrics: DifficultyRubrics) -> Self {
        rubrics
            .tiers
            .into_iter()
            .map(|t| (t.threshold, t.overrides))
            .collect()
    }
}

impl DifficultyRubrics {
    pub fn new(map: BTreeMap<u64, PartialSpawnerConfig>) -> Result<Self, SimError> {
        Self::try_from(map)
    }

    /// The table used in endless mode, keyed by score
    pub fn default_endless() -> Self {
        let colors = PlatformColors::default();
        let base = SpawnerConfig {
            min_gap: 400.0,
            max_gap: 400.0,
            min_height: 900.0,
            max_height: 1000.0,
            min_platform_width: 200.0,
            max_platform_width: 200.0,
            min_platform_height: 20.0,
            max_platform_height: 20.0,
            required_accuracy: 0.8,
            platform_color: colors,
            condiment_probability: CondimentProbability {
                coin: 0.2,
                left_spike: 0.0,
                right_spike: 0.0,
            },
        };

        fn tier(
            gap: (f32, f32),
            height: (f32, f32),
            width: (f32, f32),
            accuracy: f32,
            spikes: f32,
            coin: f32,
        ) -> PartialSpawnerConfig {
            PartialSpawnerConfig {
                min_gap: Some(gap.0),
                max_gap: Some(gap.1),
                min_height: Some(height.0),
                max_height: Some(height.1),
                min_platform_width: Some(width.0),
                max_platform_width: Some(width.1),
                required_accuracy: Some(accuracy),
                condiment_probability: Some(CondimentProbability {
                    coin,
                    left_spike: spikes,
                    right_spike: spikes,
                }),
                ..Default::default()
            }
        }

        let mut tiers = vec![Tier {
            threshold: 0,
            overrides: base.clone().into(),
            config: base.clone(),
        }];
        let mut config = base;
        for (threshold, overrides) in [
            (50, tier((200.0, 500.0), (800.0, 1000.0), (180.0, 200.0), 0.6, 0.05, 0.25)),
            (75, tier((200.0, 500.0), (900.0, 1100.0), (100.0, 180.0), 0.5, 0.1, 0.25)),
            (200, tier((300.0, 600.0), (600.0, 800.0), (80.0, 100.0), 0.4, 0.15, 0.3)),
            (300, tier((600.0, 800.0), (600.0, 800.0), (70.0, 80.0), 0.4, 0.2, 0.3)),
        ] {
            overrides.merge_into(&mut config);
            tiers.push(Tier {
                threshold,
                overrides,
                config: config.clone(),
            });
        }

        Self { tiers }
    }

    pub fn len(&self) -> usize {
        self.tiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers.is_empty()
    }

    pub fn thresholds(&self) -> impl Iterator<Item = u64> + '_ {
        self.tiers.iter().map(|t| t.threshold)
    }

    /// Cumulative config for tier `index`
    pub fn config(&self, index: usize) -> Option<&SpawnerConfig> {
        self.tiers.get(index).map(|t| &t.config)
    }

    fn threshold(&self, index: usize) -> Option<u64> {
        self.tiers.get(index).map(|t| t.threshold)
    }
}

/// Forward-only cursor over a rubric table
#[derive(Debug, Clone)]
pub struct DifficultyManager {
    rubrics: DifficultyRubrics,
    cursor: usize,
}

impl DifficultyManager {
    pub fn new(rubrics: DifficultyRubrics) -> Self {
        Self { rubrics, cursor: 0 }
    }

    /// Advance at most one tier if `progress` reached the next threshold and
    /// return the active config.
    ///
    /// Only the next tier is checked, so callers must poll on every progress
    /// change to avoid lagging behind.
    pub fn update_tier(&mut self, progress: u64) -> &SpawnerConfig {
        let next = self.rubrics.threshold(self.cursor + 1);
        if next.is_some_and(|threshold| threshold <= progress) {
            self.cursor += 1;
            log::info!("Difficulty tier {} reached at progress {progress}", self.cursor);
        }
        self.current()
    }

    pub fn current(&self) -> &SpawnerConfig {
        &self.rubrics.tiers[self.cursor].config
    }

    pub fn tier_index(&self) -> usize {
        self.cursor
    }

    pub fn rubrics(&self) -> &DifficultyRubrics {
        &self.rubrics
    }

    /// Swap tables and restart from the base tier
    pub fn set_rubrics(&mut self, rubrics: DifficultyRubrics) {
        self.rubrics = rubrics;
        self.cursor = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn manager() -> DifficultyManager {
        DifficultyManager::new(DifficultyRubrics::default_endless())
    }

    #[test]
    fn test_default_table_is_valid() {
        let rubrics = DifficultyRubrics::default_endless();
        assert_eq!(rubrics.thresholds().collect::<Vec<_>>(), vec![0, 50, 75, 200, 300]);
        for i in 0..rubrics.len() {
            rubrics.config(i).expect("tier").validate().expect("valid tier");
        }
        // Survives a JSON round trip through the validating constructor
        let json = serde_json::to_string(&rubrics).expect("encode");
        let back: DifficultyRubrics = serde_json::from_str(&json).expect("decode");
        assert_eq!(back, rubrics);
    }

    #[test]
    fn test_default_odds_ramp_up() {
        let rubrics = DifficultyRubrics::default_endless();
        let odds: Vec<CondimentProbability> = (0..rubrics.len())
            .map(|i| rubrics.config(i).expect("tier").condiment_probability)
            .collect();
        assert_eq!(odds[0].left_spike, 0.0);
        assert_eq!(odds[0].right_spike, 0.0);
        assert_eq!(odds[0].coin, 0.2);
        for pair in odds.windows(2) {
            assert!(pair[1].left_spike > pair[0].left_spike);
            assert_eq!(pair[1].left_spike, pair[1].right_spike);
            assert!(pair[1].coin >= pair[0].coin);
        }
        assert_eq!(odds[4].left_spike, 0.2);
        assert_eq!(odds[4].coin, 0.3);
    }

    #[test]
    fn test_update_tier_is_idempotent() {
        let mut dm = manager();
        let first = dm.update_tier(60).clone();
        for _ in 0..10 {
            assert_eq!(*dm.update_tier(60), first);
        }
        assert_eq!(dm.tier_index(), 1);
        assert_eq!(first.required_accuracy, 0.6);
    }

    #[test]
    fn test_never_regresses() {
        let mut dm = manager();
        dm.update_tier(80);
        dm.update_tier(80);
        assert_eq!(dm.tier_index(), 2);
        dm.update_tier(0);
        assert_eq!(dm.tier_index(), 2);
        assert_eq!(dm.current().min_platform_width, 100.0);
    }

    #[test]
    fn test_advances_one_tier_per_call() {
        let mut dm = manager();
        dm.update_tier(1000);
        assert_eq!(dm.tier_index(), 1);
        dm.update_tier(1000);
        dm.update_tier(1000);
        dm.update_tier(1000);
        assert_eq!(dm.tier_index(), 4);
        dm.update_tier(1000);
        assert_eq!(dm.tier_index(), 4);
    }

    #[test]
    fn test_partial_tiers_inherit() {
        let base = DifficultyRubrics::default_endless()
            .config(0)
            .cloned()
            .expect("base");
        let mut map = BTreeMap::new();
        map.insert(0, PartialSpawnerConfig::from(base.clone()));
        map.insert(
            10,
            PartialSpawnerConfig {
                max_gap: Some(600.0),
                ..Default::default()
            },
        );
        map.insert(
            20,
            PartialSpawnerConfig {
                platform_color: Some(PlatformColors {
                    base: 1,
                    accurate: 2,
                    inaccurate: 3,
                }),
                ..Default::default()
            },
        );
        let rubrics = DifficultyRubrics::new(map).expect("valid");
        let last = rubrics.config(2).expect("tier 2");
        assert_eq!(last.max_gap, 600.0);
        assert_eq!(last.min_gap, base.min_gap);
        assert_eq!(last.platform_color.accurate, 2);
    }

    #[test]
    fn test_base_tier_required() {
        let mut map = BTreeMap::new();
        map.insert(5, PartialSpawnerConfig::default());
        assert_eq!(DifficultyRubrics::new(map), Err(SimError::MissingBaseTier));
        assert_eq!(DifficultyRubrics::new(BTreeMap::new()), Err(SimError::MissingBaseTier));

        let mut map = BTreeMap::new();
        map.insert(
            0,
            PartialSpawnerConfig {
                min_gap: Some(1.0),
                ..Default::default()
            },
        );
        assert_eq!(
            DifficultyRubrics::new(map),
            Err(SimError::IncompleteBaseTier("maxGap"))
        );
    }

    #[test]
    fn test_inverted_override_rejected() {
        let base = DifficultyRubrics::default_endless()
            .config(0)
            .cloned()
            .expect("base");
        let mut map = BTreeMap::new();
        map.insert(0, PartialSpawnerConfig::from(base));
        map.insert(
            10,
            PartialSpawnerConfig {
                min_gap: Some(900.0),
                ..Default::default()
            },
        );
        assert!(matches!(DifficultyRubrics::new(map), Err(SimError::InvalidConfig(_))));
    }

    proptest! {
        #[test]
        fn prop_tier_monotonic(mut steps in proptest::collection::vec(0u64..400, 1..60)) {
            steps.sort_unstable();
            let mut dm = manager();
            let mut last = 0;
            for progress in steps {
                dm.update_tier(progress);
                prop_assert!(dm.tier_index() >= last);
                last = dm.tier_index();
            }
        }
    }
}
