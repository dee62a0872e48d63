use anyhow::{Context, Result};
use meal_planner::api_connection::connection::ChatClient;
use meal_planner::api_connection::endpoints::{
    Provider, GROQ_API_KEY_ENV_VAR, OPENROUTER_API_KEY_ENV_VAR,
};
use meal_planner::cli::{parse_args, BackendChoice, Command, ProfileArgs, RagArgs};
use meal_planner::knowledge_index::KnowledgeBase;
use meal_planner::meal_planner::{get_meal_plan_recommendations, into_display};
use meal_planner::nutrition::{dietary_notes, EnergyProfile, MacroTargets};
use meal_planner::profile::UserProfile;
use meal_planner::search::{EmbeddingEngine, PdfDirectoryLoader};
use meal_planner::skin_tone::{analyze_skin_tone, describe, ColorKind, SkinToneError, StoneCli};
use std::path::Path;
use tracing::info;

fn print_targets(profile: &UserProfile) -> EnergyProfile {
    let energy = EnergyProfile::from_profile(profile);
    let macros = MacroTargets::for_goal(energy.adjusted_calories, profile.health_goal);

    println!("Estimated Energy Needs");
    println!("  Basal Metabolic Rate (BMR): {:.0} calories/day", energy.bmr);
    println!("  Daily Energy Needs: {:.0} calories/day", energy.daily_calories);
    println!("  Adjusted for {}: {:.0} calories/day", profile.health_goal, energy.adjusted_calories);
    println!("Suggested Macronutrient Distribution");
    println!("  Protein: {}% ({:.0}g)", macros.protein_pct, macros.protein_g);
    println!("  Carbohydrates: {}% ({:.0}g)", macros.carb_pct, macros.carb_g);
    println!("  Fats: {}% ({:.0}g)", macros.fat_pct, macros.fat_g);
    println!("Dietary Considerations");
    for note in dietary_notes(profile) {
        println!("  - {}", note);
    }
    energy
}

async fn run_plan(profile_args: &ProfileArgs, rag: &RagArgs) -> Result<()> {
    let profile = profile_args.to_profile();
    let energy = print_targets(&profile);

    let provider = match rag.provider {
        BackendChoice::Groq => Provider::groq(GROQ_API_KEY_ENV_VAR),
        BackendChoice::Openrouter => Provider::openrouter(OPENROUTER_API_KEY_ENV_VAR),
    };
    let client = ChatClient::new(provider, rag.model.clone());

    let mut knowledge = KnowledgeBase::new(
        PdfDirectoryLoader::new(&rag.knowledge_dir),
        EmbeddingEngine::new,
        rag.chunking(),
    );

    let result = get_meal_plan_recommendations(
        &mut knowledge,
        &client,
        &profile,
        energy.adjusted_calories,
        rag.top_k,
    )
    .await;

    let (text, context) = into_display(result);
    match context {
        Some(sources) => {
            println!("\nYour Personalized Meal Plan\n");
            println!("{}", text);
            if !sources.is_empty() {
                println!("\nNutritional References");
                for (i, snippet) in sources.iter().enumerate() {
                    println!("\nSource {}\n{}\n---", i + 1, snippet);
                }
            }
        }
        None => eprintln!("\n{}", text),
    }
    Ok(())
}

async fn run_skin_tone(image: &Path, stone_bin: &Path, report_out: Option<&Path>) -> Result<()> {
    let image_bytes = tokio::fs::read(image)
        .await
        .with_context(|| format!("Failed to read image file '{}'", image.display()))?;

    let detector = StoneCli::new(stone_bin);
    match analyze_skin_tone(&image_bytes, &detector) {
        Ok(analysis) => {
            let info = &analysis.skin_info;
            println!("Skin tone: {} ({})", info.hex_code, describe(&info.hex_code, ColorKind::Skin));
            println!("Tone label: {}", info.tone_label);
            println!("Accuracy: {:.1}", info.accuracy);
            for color in &info.dominant_colors {
                println!("  dominant {} ({:.0}%)", color.hex, color.percent * 100.0);
            }
            if let (Some(out), Some(bytes)) = (report_out, analysis.report_image.as_ref()) {
                tokio::fs::write(out, bytes)
                    .await
                    .with_context(|| format!("Failed to write report image to '{}'", out.display()))?;
                println!("Report image written to {}", out.display());
            }
        }
        Err(SkinToneError::NoFaceDetected) => eprintln!("No faces detected in the image"),
        Err(e) => eprintln!("Error: {}", e),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = parse_args();
    info!(version = env!("CARGO_PKG_VERSION"), "meal planner starting");

    match &cli.command {
        Command::Targets(profile_args) => {
            let profile = profile_args.to_profile();
            profile.validate()?;
            print_targets(&profile);
        }
        Command::Plan { profile, rag } => run_plan(profile, rag).await?,
        Command::SkinTone {
            image,
            stone_bin,
            report_out,
        } => run_skin_tone(image, stone_bin, report_out.as_deref()).await?,
        Command::DescribeColor { hex, kind } => println!("{}", describe(hex, *kind)),
    }
    Ok(())
}
