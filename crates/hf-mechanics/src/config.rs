//! Configuration for level-up sequences.

use rand::SeedableRng;
use rand::rngs::StdRng;

use hf_core::CampaignSettings;

use crate::error::MechResult;
use crate::progression::ExperienceTable;

/// Configuration for a level-up sequence.
#[derive(Debug, Clone, Default)]
pub struct ProgressionConfig {
    /// RNG seed for reproducible hit point rolls. `None` seeds from the OS.
    pub seed: Option<u64>,
    /// XP thresholds per level.
    pub experience: ExperienceTable,
}

impl ProgressionConfig {
    /// Read the campaign's progression settings.
    pub fn from_settings(settings: &CampaignSettings) -> MechResult<Self> {
        let experience = if settings.experience_thresholds.is_empty() {
            ExperienceTable::default()
        } else {
            ExperienceTable::from_thresholds(settings.experience_thresholds.clone())?
        };
        Ok(Self {
            seed: settings.seed,
            experience,
        })
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replace the experience table.
    pub fn with_experience_table(mut self, table: ExperienceTable) -> Self {
        self.experience = table;
        self
    }

    /// A fresh RNG for this configuration.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;

    #[test]
    fn default_config() {
        let cfg = ProgressionConfig::default();
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.experience, ExperienceTable::default());
    }

    #[test]
    fn builder_methods() {
        let table = ExperienceTable::from_thresholds(vec![100, 300]).unwrap();
        let cfg = ProgressionConfig::default()
            .with_seed(7)
            .with_experience_table(table.clone());
        assert_eq!(cfg.seed, Some(7));
        assert_eq!(cfg.experience, table);
    }

    #[test]
    fn seeded_rng_repeats() {
        let cfg = ProgressionConfig::default().with_seed(99);
        let a: u32 = cfg.rng().random_range(1..=1000);
        let b: u32 = cfg.rng().random_range(1..=1000);
        assert_eq!(a, b);
    }

    #[test]
    fn from_settings() {
        let settings = CampaignSettings {
            experience_thresholds: vec![50, 150],
            seed: Some(3),
        };
        let cfg = ProgressionConfig::from_settings(&settings).unwrap();
        assert_eq!(cfg.seed, Some(3));
        assert_eq!(cfg.experience.max_level(), 3);

        let cfg = ProgressionConfig::from_settings(&CampaignSettings::default()).unwrap();
        assert_eq!(cfg.experience.max_level(), 20);

        let bad = CampaignSettings {
            experience_thresholds: vec![500, 100],
            seed: None,
        };
        assert!(ProgressionConfig::from_settings(&bad).is_err());
    }
}
