use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api_connection::connection::ChatBackend;
use crate::api_connection::endpoints::{ChatCompletionRequest, ChatMessage};
use crate::error::PlannerError;
use crate::knowledge_index::KnowledgeBase;
use crate::profile::UserProfile;
use crate::search::data_loader::DocumentLoader;
use crate::search::embedding_engine::Embedder;

pub const DEFAULT_RETRIEVAL_K: usize = 5;

/// Headings the generated plan is asked to contain, in order.
pub const PLAN_SECTIONS: [&str; 6] = [
    "Nutrition Strategy Summary",
    "Macronutrient Targets",
    "7-Day Meal Plan",
    "Shopping List",
    "Implementation Guide",
    "Key Nutritional Insights",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub answer_text: String,
    /// Retrieved chunks that grounded the answer, best match first.
    pub source_snippets: Vec<String>,
}

/// Natural-language query used only for retrieval.
pub fn build_retrieval_query(profile: &UserProfile) -> String {
    format!(
        "Create a personalized meal plan for a {}-year-old {} with {} diet, aiming for {}, with allergies to {}.",
        profile.age,
        profile.gender,
        profile.dietary_preference,
        profile.health_goal,
        profile.allergies_display()
    )
}

/// Full generation prompt: profile, calorie target, instructions, and the
/// retrieved context. Calories are interpolated as a whole number.
pub fn build_plan_prompt(profile: &UserProfile, adjusted_calories: f64, context: &[&str]) -> String {
    format!(
        r#"Personalized Evidence-Based Nutrition Plan

**User Profile:**
- Age: {age}
- Gender: {gender}
- Weight: {weight} kg
- Height: {height} cm
- Activity Level: {activity_level}
- Dietary Preference: {dietary_preference}
- Health Goal: {health_goal}
- Allergies/Intolerances: {allergies}
- Preferred Foods: {food_preferences}
- Disliked Foods: {food_dislikes}
- Estimated Daily Calorie Needs: {calories} calories

**Comprehensive Nutrition Plan Instructions:**

1. **Nutritional Analysis & Guidelines**
- Provide macronutrient distribution appropriate for the user's health goal
- Include micronutrient considerations based on their profile
- Offer scientifically validated nutritional guidance for their specific health goal

2. **Personalized 7-Day Meal Plan**
- Create a complete 7-day meal plan with breakfast, lunch, dinner, and snacks
- Ensure all meals align with dietary preferences and restrictions
- Completely avoid any allergens listed
- Include foods they prefer and exclude foods they dislike
- Ensure caloric and nutritional targets are met
- Include portion sizes and approximate calories per meal

3. **Practical Implementation Guidance**
- Provide meal prep strategies
- Offer shopping list organized by food categories
- Include time-saving preparation tips
- Suggest meal timing recommendations based on activity level and goals

4. **Educational Component**
- Explain the nutritional science behind recommendations
- Include information on key nutrients particularly important for their health goal
- Provide tips for eating out while maintaining the plan

5. **Progress Monitoring**
- Suggest metrics to track progress
- Recommend adjustment strategies as goals evolve
- Provide guidelines for when to reassess the nutrition plan

**Output Format:**
- **{s0}:** [Brief overview of approach]
- **{s1}:** [Specific daily targets with rationale]
- **{s2}:** [Detailed daily plans with all meals]
- **{s3}:** [Comprehensive list organized by category]
- **{s4}:** [Practical tips for success]
- **{s5}:** [Educational content relevant to user]

Utilize evidence-based nutrition science to provide a holistic, practical, and personalized nutrition plan.

<context>
{context}
</context>
"#,
        age = profile.age,
        gender = profile.gender,
        weight = profile.weight_kg,
        height = profile.height_cm,
        activity_level = profile.activity_level,
        dietary_preference = profile.dietary_preference,
        health_goal = profile.health_goal,
        allergies = profile.allergies_display(),
        food_preferences = profile.food_preferences,
        food_dislikes = profile.food_dislikes,
        calories = adjusted_calories.round() as i64,
        s0 = PLAN_SECTIONS[0],
        s1 = PLAN_SECTIONS[1],
        s2 = PLAN_SECTIONS[2],
        s3 = PLAN_SECTIONS[3],
        s4 = PLAN_SECTIONS[4],
        s5 = PLAN_SECTIONS[5],
        context = context.join("\n\n"),
    )
}

/// Section headings absent from a generated answer (case-insensitive).
pub fn missing_sections(answer: &str) -> Vec<&'static str> {
    let lowered = answer.to_lowercase();
    PLAN_SECTIONS
        .iter()
        .copied()
        .filter(|section| !lowered.contains(&section.to_lowercase()))
        .collect()
}

/// Produces a grounded meal plan for `profile`.
///
/// An out-of-range profile is rejected before the knowledge index is touched.
/// Otherwise the index is built if needed and the backend credential checked
/// before the `k` closest chunks are retrieved and sent with the prompt. The
/// answer is returned as-is; missing section headings are only logged.
pub async fn get_meal_plan_recommendations<L, E, B>(
    knowledge: &mut KnowledgeBase<L, E>,
    backend: &B,
    profile: &UserProfile,
    adjusted_calories: f64,
    k: usize,
) -> Result<RecommendationResult, PlannerError>
where
    L: DocumentLoader,
    E: Embedder,
    B: ChatBackend + ?Sized,
{
    profile.validate()?;
    let index = knowledge.ensure_index()?;
    backend.ensure_credentials()?;

    let query = build_retrieval_query(profile);
    let retrieved = index
        .search(&query, k)
        .map_err(|e| PlannerError::Generation(format!("{:#}", e)))?;
    info!(retrieved = retrieved.len(), "retrieved knowledge chunks");

    let source_snippets: Vec<String> = retrieved.iter().map(|c| c.text.clone()).collect();
    let context: Vec<&str> = source_snippets.iter().map(String::as_str).collect();
    let prompt = build_plan_prompt(profile, adjusted_calories, &context);

    let request = ChatCompletionRequest {
        model: backend.model_name(),
        messages: vec![ChatMessage::user(prompt)],
        temperature: None,
        max_tokens: None,
    };

    info!("Generating personalized meal plan...");
    let response = backend.call_chat_completion(request).await?;
    let answer_text = response
        .first_content()
        .map(str::to_string)
        .ok_or_else(|| PlannerError::Generation("Backend returned no choices".to_string()))?;

    let missing = missing_sections(&answer_text);
    if !missing.is_empty() {
        warn!(?missing, "generated plan is missing requested sections");
    }

    Ok(RecommendationResult {
        answer_text,
        source_snippets,
    })
}

/// Collapses a recommendation into display text plus optional sources. A
/// `None` context marks a failed request.
pub fn into_display(
    result: Result<RecommendationResult, PlannerError>,
) -> (String, Option<Vec<String>>) {
    match result {
        Ok(r) => (r.answer_text, Some(r.source_snippets)),
        Err(e) => (e.to_string(), None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::tests::sample_profile;
    use crate::profile::{Allergy, HealthGoal};

    #[test]
    fn test_retrieval_query_interpolates_profile() {
        let mut profile = sample_profile();
        profile.allergies = vec![Allergy::Peanuts, Allergy::Soy];
        assert_eq!(
            build_retrieval_query(&profile),
            "Create a personalized meal plan for a 30-year-old Male with Mediterranean diet, aiming for Weight Loss, with allergies to Peanuts, Soy."
        );
    }

    #[test]
    fn test_prompt_embeds_every_field_and_context() {
        let mut profile = sample_profile();
        profile.health_goal = HealthGoal::HeartHealth;
        let prompt = build_plan_prompt(&profile, 2008.2, &["chunk one", "chunk two"]);

        assert!(prompt.contains("- Age: 30"));
        assert!(prompt.contains("- Weight: 70 kg"));
        assert!(prompt.contains("- Activity Level: Sedentary (little or no exercise)"));
        assert!(prompt.contains("- Health Goal: Heart Health"));
        assert!(prompt.contains("- Allergies/Intolerances: None"));
        assert!(prompt.contains("- Preferred Foods: salmon, lentils"));
        assert!(prompt.contains("- Disliked Foods: okra"));
        assert!(prompt.contains("Estimated Daily Calorie Needs: 2008 calories"));
        assert!(prompt.contains("<context>\nchunk one\n\nchunk two\n</context>"));
        for section in PLAN_SECTIONS {
            assert!(prompt.contains(&format!("**{}:**", section)));
        }
    }

    #[test]
    fn test_missing_sections() {
        assert_eq!(missing_sections("").len(), 6);
        let full = PLAN_SECTIONS.join("\n");
        assert!(missing_sections(&full.to_uppercase()).is_empty());
        assert_eq!(
            missing_sections("Nutrition Strategy Summary\nShopping list"),
            vec!["Macronutrient Targets", "7-Day Meal Plan", "Implementation Guide", "Key Nutritional Insights"]
        );
    }

    #[test]
    fn test_into_display() {
        let ok = Ok(RecommendationResult {
            answer_text: "plan".to_string(),
            source_snippets: vec!["a".to_string()],
        });
        assert_eq!(into_display(ok), ("plan".to_string(), Some(vec!["a".to_string()])));

        let (text, context) = into_display(Err(PlannerError::Configuration("GROQ_API_KEY not found.".to_string())));
        assert_eq!(text, "GROQ_API_KEY not found.");
        assert!(context.is_none());
    }
}
