use crate::profile::{Allergy, DietaryPreference, HealthGoal, UserProfile};

pub const NO_RESTRICTIONS_NOTE: &str = "No specific dietary restrictions identified.";

/// Dietary considerations shown next to the calorie targets, in display order.
/// Never empty.
pub fn dietary_notes(profile: &UserProfile) -> Vec<String> {
    let mut notes = Vec::new();

    match profile.dietary_preference {
        DietaryPreference::Vegetarian => {
            notes.push("Your vegetarian diet excludes meat but may include dairy and eggs.".to_string())
        }
        DietaryPreference::Vegan => notes.push(
            "Your vegan diet excludes all animal products. Ensure adequate B12, iron, and zinc intake."
                .to_string(),
        ),
        _ => {}
    }

    let mut seen = Vec::with_capacity(profile.allergies.len());
    for allergy in &profile.allergies {
        if *allergy == Allergy::NoneDeclared || seen.contains(allergy) {
            continue;
        }
        seen.push(*allergy);
        notes.push(format!("Excluding all sources of {} from your meal plan.", allergy));
    }

    match profile.health_goal {
        HealthGoal::WeightLoss => {
            notes.push("Creating a moderate calorie deficit for sustainable weight loss.".to_string())
        }
        HealthGoal::WeightGain | HealthGoal::MuscleBuilding => {
            notes.push("Providing a calorie surplus for muscle growth and weight gain.".to_string())
        }
        _ => {}
    }

    if notes.is_empty() {
        notes.push(NO_RESTRICTIONS_NOTE.to_string());
    }
    notes
}
