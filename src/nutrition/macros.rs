use serde::{Deserialize, Serialize};

use crate::profile::HealthGoal;

/// Atwater factors, kcal per gram.
pub const KCAL_PER_G_PROTEIN: f64 = 4.0;
pub const KCAL_PER_G_CARB: f64 = 4.0;
pub const KCAL_PER_G_FAT: f64 = 9.0;

/// Percentage split of daily calories. The three parts always sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacroSplit {
    pub protein_pct: u8,
    pub carb_pct: u8,
    pub fat_pct: u8,
}

const LEAN_SPLIT: MacroSplit = MacroSplit {
    protein_pct: 30,
    carb_pct: 40,
    fat_pct: 30,
};
const GAIN_SPLIT: MacroSplit = MacroSplit {
    protein_pct: 35,
    carb_pct: 45,
    fat_pct: 20,
};
const BALANCED_SPLIT: MacroSplit = MacroSplit {
    protein_pct: 25,
    carb_pct: 50,
    fat_pct: 25,
};

pub fn macro_split_for_goal(goal: HealthGoal) -> MacroSplit {
    match goal {
        HealthGoal::WeightLoss | HealthGoal::HeartHealth | HealthGoal::DiabetesManagement => LEAN_SPLIT,
        HealthGoal::MuscleBuilding | HealthGoal::WeightGain => GAIN_SPLIT,
        HealthGoal::Maintenance
        | HealthGoal::EnergyBoost
        | HealthGoal::BetterSleep
        | HealthGoal::DigestiveHealth
        | HealthGoal::Other => BALANCED_SPLIT,
    }
}

/// Daily macronutrient targets. Gram values are unrounded; round at display time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroTargets {
    pub protein_pct: u8,
    pub carb_pct: u8,
    pub fat_pct: u8,
    pub protein_g: f64,
    pub carb_g: f64,
    pub fat_g: f64,
}

impl MacroTargets {
    /// Converts `calories` into grams using the split for `goal`.
    pub fn for_goal(calories: f64, goal: HealthGoal) -> Self {
        let split = macro_split_for_goal(goal);
        Self {
            protein_pct: split.protein_pct,
            carb_pct: split.carb_pct,
            fat_pct: split.fat_pct,
            protein_g: calories * f64::from(split.protein_pct) / 100.0 / KCAL_PER_G_PROTEIN,
            carb_g: calories * f64::from(split.carb_pct) / 100.0 / KCAL_PER_G_CARB,
            fat_g: calories * f64::from(split.fat_pct) / 100.0 / KCAL_PER_G_FAT,
        }
    }

    pub fn total_kcal(&self) -> f64 {
        self.protein_g * KCAL_PER_G_PROTEIN + self.carb_g * KCAL_PER_G_CARB + self.fat_g * KCAL_PER_G_FAT
    }
}
