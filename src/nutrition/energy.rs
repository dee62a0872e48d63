use serde::{Deserialize, Serialize};

use crate::profile::{ActivityLevel, Gender, HealthGoal, UserProfile};

/// Calorie shift applied for goals that call for a deficit or a surplus.
pub const GOAL_CALORIE_DELTA: f64 = 500.0;

/// Energy targets derived from a profile. Recomputed whenever an input changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnergyProfile {
    pub bmr: f64,
    pub daily_calories: f64,
    pub adjusted_calories: f64,
}

impl EnergyProfile {
    pub fn from_profile(profile: &UserProfile) -> Self {
        let bmr = calculate_bmr(profile.weight_kg, profile.height_cm, profile.age, profile.gender);
        let daily_calories = calculate_calorie_needs(bmr, profile.activity_level);
        let adjusted_calories = adjust_calories_for_goal(daily_calories, profile.health_goal);
        Self {
            bmr,
            daily_calories,
            adjusted_calories,
        }
    }
}

/// Basal Metabolic Rate using the Mifflin-St Jeor equation.
///
/// `10 x weight_kg + 6.25 x height_cm - 5 x age`, then `+5` for men and
/// `-161` for women. Inputs are not range-checked.
pub fn calculate_bmr(weight_kg: f64, height_cm: f64, age: u32, gender: Gender) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    match gender {
        Gender::Male => base + 5.0,
        Gender::Female => base - 161.0,
    }
}

impl ActivityLevel {
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.2,
            ActivityLevel::LightlyActive => 1.375,
            ActivityLevel::ModeratelyActive => 1.55,
            ActivityLevel::VeryActive => 1.725,
            ActivityLevel::ExtraActive => 1.9,
        }
    }
}

/// Daily energy needs: BMR scaled by the activity multiplier.
pub fn calculate_calorie_needs(bmr: f64, activity_level: ActivityLevel) -> f64 {
    bmr * activity_level.multiplier()
}

/// Weight Loss takes 500 kcal off, Weight Gain and Muscle Building add 500,
/// every other goal keeps the figure unchanged.
pub fn adjust_calories_for_goal(calories: f64, goal: HealthGoal) -> f64 {
    match goal {
        HealthGoal::WeightLoss => calories - GOAL_CALORIE_DELTA,
        HealthGoal::WeightGain | HealthGoal::MuscleBuilding => calories + GOAL_CALORIE_DELTA,
        HealthGoal::Maintenance
        | HealthGoal::HeartHealth
        | HealthGoal::DiabetesManagement
        | HealthGoal::EnergyBoost
        | HealthGoal::BetterSleep
        | HealthGoal::DigestiveHealth
        | HealthGoal::Other => calories,
    }
}
