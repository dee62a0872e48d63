use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::knowledge_index::ChunkingConfig;
use crate::meal_planner::DEFAULT_RETRIEVAL_K;
use crate::profile::{
    ActivityLevel, Allergy, DietaryPreference, Gender, HealthGoal, UserProfile, AGE_RANGE,
    HEIGHT_RANGE_CM, WEIGHT_RANGE_KG,
};
use crate::search::data_loader::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};
use crate::skin_tone::color::ColorKind;
use crate::skin_tone::stone::DEFAULT_STONE_PROGRAM;

pub const DEFAULT_KNOWLEDGE_DIR: &str = "nutrition_knowledge_base";

#[derive(Parser, Debug)]
#[command(author, version, about = "Personalized, evidence-based meal planning", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print energy needs and macronutrient targets
    Targets(ProfileArgs),
    /// Generate a personalized meal plan grounded in the knowledge base
    Plan {
        #[command(flatten)]
        profile: ProfileArgs,
        #[command(flatten)]
        rag: RagArgs,
    },
    /// Estimate skin tone from a photo
    SkinTone {
        /// Path to the image file
        #[arg(short, long)]
        image: PathBuf,
        /// Skin tone classifier executable
        #[arg(long, default_value = DEFAULT_STONE_PROGRAM)]
        stone_bin: PathBuf,
        /// Where to write the annotated report image, if one is produced
        #[arg(long)]
        report_out: Option<PathBuf>,
    },
    /// Map a hex colour to a coarse skin, hair or eye label
    DescribeColor {
        #[arg(long)]
        hex: String,
        #[arg(long, value_enum)]
        kind: ColorKind,
    },
}

#[derive(Args, Debug, Clone)]
pub struct ProfileArgs {
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u32).range(i64::from(AGE_RANGE.0)..=i64::from(AGE_RANGE.1)))]
    pub age: u32,
    #[arg(long, value_enum, default_value = "male")]
    pub gender: Gender,
    /// Weight in kg
    #[arg(long, default_value_t = 70.0, value_parser = parse_weight)]
    pub weight: f64,
    /// Height in cm
    #[arg(long, default_value_t = 170.0, value_parser = parse_height)]
    pub height: f64,
    #[arg(long, value_enum, default_value = "sedentary")]
    pub activity: ActivityLevel,
    #[arg(long, value_enum, default_value = "no-restrictions")]
    pub diet: DietaryPreference,
    #[arg(long, value_enum, default_value = "weight-loss")]
    pub goal: HealthGoal,
    /// Repeat for several allergies; none given means "None"
    #[arg(long = "allergy", value_enum)]
    pub allergies: Vec<Allergy>,
    /// Foods you enjoy (comma separated)
    #[arg(long, default_value = "")]
    pub likes: String,
    /// Foods you dislike (comma separated)
    #[arg(long, default_value = "")]
    pub dislikes: String,
}

impl ProfileArgs {
    pub fn to_profile(&self) -> UserProfile {
        let allergies = if self.allergies.is_empty() {
            vec![Allergy::NoneDeclared]
        } else {
            self.allergies.clone()
        };
        UserProfile {
            age: self.age,
            gender: self.gender,
            weight_kg: self.weight,
            height_cm: self.height,
            activity_level: self.activity,
            dietary_preference: self.diet,
            health_goal: self.goal,
            allergies,
            food_preferences: self.likes.clone(),
            food_dislikes: self.dislikes.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendChoice {
    Groq,
    Openrouter,
}

#[derive(Args, Debug, Clone)]
pub struct RagArgs {
    /// Directory of PDF documents seeding the knowledge base
    #[arg(long, default_value = DEFAULT_KNOWLEDGE_DIR)]
    pub knowledge_dir: PathBuf,
    #[arg(long, value_enum, default_value = "groq")]
    pub provider: BackendChoice,
    /// Model name; defaults to the provider's first model
    #[arg(long)]
    pub model: Option<String>,
    /// Number of knowledge chunks retrieved as context
    #[arg(long, default_value_t = DEFAULT_RETRIEVAL_K)]
    pub top_k: usize,
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: usize,
    #[arg(long, default_value_t = DEFAULT_CHUNK_OVERLAP)]
    pub chunk_overlap: usize,
}

impl RagArgs {
    pub fn chunking(&self) -> ChunkingConfig {
        ChunkingConfig {
            chunk_size: self.chunk_size,
            overlap: self.chunk_overlap,
        }
    }
}

fn parse_in_range(s: &str, (min, max): (f64, f64), unit: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|_| format!("'{}' is not a number", s))?;
    if !(min..=max).contains(&value) {
        return Err(format!("must be between {} and {} {}", min, max, unit));
    }
    Ok(value)
}

fn parse_weight(s: &str) -> Result<f64, String> {
    parse_in_range(s, WEIGHT_RANGE_KG, "kg")
}

fn parse_height(s: &str) -> Result<f64, String> {
    parse_in_range(s, HEIGHT_RANGE_CM, "cm")
}

pub fn parse_args() -> Cli {
    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_targets_defaults() {
        let cli = Cli::try_parse_from(["meal-planner", "targets"]).unwrap();
        let Command::Targets(args) = cli.command else {
            panic!("expected targets command");
        };
        let profile = args.to_profile();
        assert_eq!(profile.age, 30);
        assert_eq!(profile.gender, Gender::Male);
        assert_eq!(profile.activity_level, ActivityLevel::Sedentary);
        assert_eq!(profile.health_goal, HealthGoal::WeightLoss);
        assert_eq!(profile.allergies, vec![Allergy::NoneDeclared]);
    }

    #[test]
    fn test_plan_flags() {
        let cli = Cli::try_parse_from([
            "meal-planner", "plan", "--age", "45", "--gender", "female", "--activity", "very-active",
            "--diet", "gluten-free", "--goal", "heart-health", "--allergy", "tree-nuts", "--allergy",
            "dairy", "--provider", "openrouter", "--top-k", "3",
        ])
        .unwrap();
        let Command::Plan { profile, rag } = cli.command else {
            panic!("expected plan command");
        };
        let profile = profile.to_profile();
        assert_eq!(profile.gender, Gender::Female);
        assert_eq!(profile.dietary_preference, DietaryPreference::GlutenFree);
        assert_eq!(profile.allergies_display(), "Tree Nuts, Dairy");
        assert_eq!(rag.provider, BackendChoice::Openrouter);
        assert_eq!(rag.top_k, 3);
        assert_eq!(rag.chunking(), ChunkingConfig::default());
    }

    #[test]
    fn test_form_ranges_rejected() {
        assert!(Cli::try_parse_from(["meal-planner", "targets", "--age", "17"]).is_err());
        assert!(Cli::try_parse_from(["meal-planner", "targets", "--age", "101"]).is_err());
        assert!(Cli::try_parse_from(["meal-planner", "targets", "--age", "100"]).is_ok());
        assert!(Cli::try_parse_from(["meal-planner", "targets", "--weight", "39"]).is_err());
        assert!(Cli::try_parse_from(["meal-planner", "targets", "--height", "221"]).is_err());
    }
}
