//! Synthetic garment attributes used when recognition is unavailable.

use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, RngCore, SeedableRng};

use crate::types::{GarmentAttributes, GarmentCategory, Season, SeasonSet};

pub const DEFAULT_CATEGORIES: [GarmentCategory; 6] = [
    GarmentCategory::Top,
    GarmentCategory::Bottom,
    GarmentCategory::Dress,
    GarmentCategory::Outerwear,
    GarmentCategory::Shoes,
    GarmentCategory::Accessory,
];

pub const DEFAULT_COLORS: [&str; 8] = [
    "red", "blue", "black", "white", "gray", "pink", "yellow", "green",
];

pub const DEFAULT_STYLES: [&str; 6] = [
    "casual",
    "formal",
    "sporty",
    "vintage",
    "trendy",
    "minimalist",
];

/// Draws plausible attributes from fixed vocabularies.
///
/// Output never carries a confidence, which is how callers tell it apart from
/// a real classification. The random source is injected so tests can seed it.
pub struct DefaultAttributeGenerator {
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl DefaultAttributeGenerator {
    pub fn new(rng: impl RngCore + Send + 'static) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
        }
    }

    /// Generator seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }

    pub fn generate(&self) -> GarmentAttributes {
        let mut guard = self
            .rng
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let rng = &mut **guard;

        let category = DEFAULT_CATEGORIES
            .choose(rng)
            .copied()
            .unwrap_or(GarmentCategory::Other);
        let color = DEFAULT_COLORS.choose(rng).copied().unwrap_or("black");

        let season_count = rng.random_range(1..=3);
        let seasons: SeasonSet = Season::ALL
            .choose_multiple(rng, season_count)
            .copied()
            .collect();

        let style = DEFAULT_STYLES.choose(rng).copied().unwrap_or("casual");

        GarmentAttributes {
            category,
            color: color.to_string(),
            seasons,
            style: style.to_string(),
            confidence: None,
        }
    }
}

impl Default for DefaultAttributeGenerator {
    fn default() -> Self {
        Self::from_os_rng()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_draws_from_fixed_vocabularies() {
        let generator = DefaultAttributeGenerator::new(ChaCha8Rng::seed_from_u64(7));

        for _ in 0..200 {
            let attrs = generator.generate();
            assert!(DEFAULT_CATEGORIES.contains(&attrs.category));
            assert!(DEFAULT_COLORS.contains(&attrs.color.as_str()));
            assert!(DEFAULT_STYLES.contains(&attrs.style.as_str()));
            assert!((1..=3).contains(&attrs.seasons.len()));
            assert_eq!(attrs.confidence, None);
        }
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let a = DefaultAttributeGenerator::new(ChaCha8Rng::seed_from_u64(42));
        let b = DefaultAttributeGenerator::new(ChaCha8Rng::seed_from_u64(42));

        for _ in 0..20 {
            assert_eq!(a.generate(), b.generate());
        }
    }
}
