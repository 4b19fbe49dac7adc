//! Generation backfill.

use std::collections::BTreeMap;

use pw_model::{Generation, PlantMap};
use tracing::debug;

pub const HOURS_PER_YEAR: f64 = 8760.0;

/// Capacity factors by lowercase fuel name.
pub const DEFAULT_CAPACITY_FACTORS: [(&str, f64); 12] = [
    ("biomass", 0.51),
    ("coal", 0.59),
    ("cogeneration", 0.52),
    ("gas", 0.48),
    ("geothermal", 0.71),
    ("hydro", 0.38),
    ("nuclear", 0.91),
    ("oil", 0.20),
    ("solar", 0.18),
    ("waste", 0.55),
    ("wave and tidal", 0.25),
    ("wind", 0.32),
];

/// Fills missing annual generation on admitted plants.
pub trait GenerationEstimator {
    /// Returns how many records were filled. Never adds or removes entries.
    fn estimate(&self, canonical: &mut PlantMap) -> usize;
}

/// `capacity_mw * 8760 h * factor / 1000` GWh for plants with a known
/// capacity and a fuel that has a factor.
#[derive(Debug, Clone, PartialEq)]
pub struct CapacityFactorEstimator {
    factors: BTreeMap<String, f64>,
}

impl CapacityFactorEstimator {
    pub fn new<I, S>(factors: I) -> Self
    where
        I: IntoIterator<Item = (S, f64)>,
        S: AsRef<str>,
    {
        let factors = factors
            .into_iter()
            .map(|(fuel, factor)| (normalize_fuel(fuel.as_ref()), factor))
            .collect();
        Self { factors }
    }

    pub fn factor(&self, fuel: &str) -> Option<f64> {
        self.factors.get(&normalize_fuel(fuel)).copied()
    }

    pub fn factors(&self) -> impl Iterator<Item = (&str, f64)> {
        self.factors
            .iter()
            .map(|(fuel, factor)| (fuel.as_str(), *factor))
    }

    pub fn annual_gwh(capacity_mw: f64, factor: f64) -> f64 {
        capacity_mw * HOURS_PER_YEAR * factor / 1000.0
    }
}

impl Default for CapacityFactorEstimator {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY_FACTORS)
    }
}

impl GenerationEstimator for CapacityFactorEstimator {
    fn estimate(&self, canonical: &mut PlantMap) -> usize {
        let mut filled = 0usize;
        let mut no_factor = 0usize;
        for plant in canonical.values_mut() {
            if plant.generation.is_some() {
                continue;
            }
            let (Some(capacity), Some(fuel)) = (plant.capacity_mw, plant.fuel.as_deref()) else {
                continue;
            };
            let Some(factor) = self.factor(fuel) else {
                no_factor += 1;
                continue;
            };
            plant.generation = Some(Generation::estimated(Self::annual_gwh(capacity, factor)));
            filled += 1;
        }
        debug!(filled, no_factor, "generation estimated");
        filled
    }
}

fn normalize_fuel(fuel: &str) -> String {
    fuel.trim().to_lowercase()
}
