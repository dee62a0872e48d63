use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PlannerError;

pub const AGE_RANGE: (u32, u32) = (18, 100);
pub const WEIGHT_RANGE_KG: (f64, f64) = (40.0, 200.0);
pub const HEIGHT_RANGE_CM: (f64, f64) = (140.0, 220.0);

/// Implements `label()`, `ALL`, `Display` and a label-based `FromStr` for a
/// closed form enum.
macro_rules! labelled_enum {
    ($name:ident, $kind:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }

        impl FromStr for $name {
            type Err = PlannerError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|v| v.label() == s)
                    .ok_or_else(|| PlannerError::UnknownLabel {
                        kind: $kind,
                        label: s.to_string(),
                    })
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum Gender {
    Male,
    Female,
}

labelled_enum!(Gender, "gender", {
    Male => "Male",
    Female => "Female",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum ActivityLevel {
    Sedentary,
    LightlyActive,
    ModeratelyActive,
    VeryActive,
    ExtraActive,
}

labelled_enum!(ActivityLevel, "activity level", {
    Sedentary => "Sedentary (little or no exercise)",
    LightlyActive => "Lightly active (light exercise/sports 1-3 days/week)",
    ModeratelyActive => "Moderately active (moderate exercise/sports 3-5 days/week)",
    VeryActive => "Very active (hard exercise/sports 6-7 days a week)",
    ExtraActive => "Extra active (very hard exercise, physical job or training twice a day)",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum DietaryPreference {
    NoRestrictions,
    Vegetarian,
    Vegan,
    Pescatarian,
    GlutenFree,
    DairyFree,
    Keto,
    Paleo,
    Mediterranean,
    LowCarb,
    LowFat,
    Other,
}

labelled_enum!(DietaryPreference, "dietary preference", {
    NoRestrictions => "No Restrictions",
    Vegetarian => "Vegetarian",
    Vegan => "Vegan",
    Pescatarian => "Pescatarian",
    GlutenFree => "Gluten-Free",
    DairyFree => "Dairy-Free",
    Keto => "Keto",
    Paleo => "Paleo",
    Mediterranean => "Mediterranean",
    LowCarb => "Low-Carb",
    LowFat => "Low-Fat",
    Other => "Other",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum HealthGoal {
    WeightLoss,
    WeightGain,
    MuscleBuilding,
    Maintenance,
    HeartHealth,
    DiabetesManagement,
    EnergyBoost,
    BetterSleep,
    DigestiveHealth,
    Other,
}

labelled_enum!(HealthGoal, "health goal", {
    WeightLoss => "Weight Loss",
    WeightGain => "Weight Gain",
    MuscleBuilding => "Muscle Building",
    Maintenance => "Maintenance",
    HeartHealth => "Heart Health",
    DiabetesManagement => "Diabetes Management",
    EnergyBoost => "Energy Boost",
    BetterSleep => "Better Sleep",
    DigestiveHealth => "Digestive Health",
    Other => "Other",
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum)]
pub enum Allergy {
    #[value(name = "none")]
    NoneDeclared,
    Peanuts,
    TreeNuts,
    Dairy,
    Eggs,
    Fish,
    Shellfish,
    Soy,
    Wheat,
    Gluten,
}

labelled_enum!(Allergy, "allergy", {
    NoneDeclared => "None",
    Peanuts => "Peanuts",
    TreeNuts => "Tree Nuts",
    Dairy => "Dairy",
    Eggs => "Eggs",
    Fish => "Fish",
    Shellfish => "Shellfish",
    Soy => "Soy",
    Wheat => "Wheat",
    Gluten => "Gluten",
});

/// One form submission. Immutable for the duration of a recommendation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub age: u32,
    pub gender: Gender,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub activity_level: ActivityLevel,
    pub dietary_preference: DietaryPreference,
    pub health_goal: HealthGoal,
    /// Selection order is kept for display; duplicates are dropped.
    pub allergies: Vec<Allergy>,
    pub food_preferences: String,
    pub food_dislikes: String,
}

impl UserProfile {
    /// Checks the bounds the input form enforces. The calculators themselves
    /// never validate.
    pub fn validate(&self) -> Result<(), PlannerError> {
        if self.age < AGE_RANGE.0 || self.age > AGE_RANGE.1 {
            return Err(PlannerError::InvalidProfile(format!(
                "age {} outside {}-{}",
                self.age, AGE_RANGE.0, AGE_RANGE.1
            )));
        }
        if !(WEIGHT_RANGE_KG.0..=WEIGHT_RANGE_KG.1).contains(&self.weight_kg) {
            return Err(PlannerError::InvalidProfile(format!(
                "weight {} kg outside {}-{}",
                self.weight_kg, WEIGHT_RANGE_KG.0, WEIGHT_RANGE_KG.1
            )));
        }
        if !(HEIGHT_RANGE_CM.0..=HEIGHT_RANGE_CM.1).contains(&self.height_cm) {
            return Err(PlannerError::InvalidProfile(format!(
                "height {} cm outside {}-{}",
                self.height_cm, HEIGHT_RANGE_CM.0, HEIGHT_RANGE_CM.1
            )));
        }
        Ok(())
    }

    /// Comma-joined allergy labels, or "None" when nothing was selected.
    pub fn allergies_display(&self) -> String {
        if self.allergies.is_empty() {
            return Allergy::NoneDeclared.label().to_string();
        }
        let mut seen = Vec::with_capacity(self.allergies.len());
        for allergy in &self.allergies {
            if !seen.contains(allergy) {
                seen.push(*allergy);
            }
        }
        seen.iter().map(Allergy::label).collect::<Vec<_>>().join(", ")
    }
}
