pub mod analyzer;
pub mod color;
pub mod stone;

pub use analyzer::{
    analyze_skin_tone, DetectionReport, DominantColor, SkinDetector, SkinToneAnalysis, SkinToneError,
    SkinToneResult,
};
pub use color::{describe, get_color_description, ColorKind};
pub use stone::StoneCli;
