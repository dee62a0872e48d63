use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum SkinToneError {
    #[error("No faces detected in the image")]
    NoFaceDetected,
    #[error("Skin tone detection failed: {0}")]
    Detector(String),
    #[error("Failed to stage image for analysis: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DominantColor {
    pub hex: String,
    pub percent: f64,
}

/// Tone of the first detected face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkinToneResult {
    pub hex_code: String,
    pub tone_label: String,
    /// Detector confidence, 0-100.
    pub accuracy: f64,
    pub dominant_colors: Vec<DominantColor>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkinToneAnalysis {
    pub skin_info: SkinToneResult,
    /// Annotated image for the first face, when the detector produced one.
    pub report_image: Option<Vec<u8>>,
}

/// Raw output of a face/skin detector run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionReport {
    pub faces: Vec<SkinToneResult>,
    pub report_image: Option<Vec<u8>>,
}

/// External face and skin detector operating on an image file.
pub trait SkinDetector {
    fn detect(&self, image_path: &Path) -> anyhow::Result<DetectionReport>;
}

/// Stages `image_bytes` in a temporary file, runs `detector` on it and
/// returns the first face's tone. The temporary file is removed on every
/// exit path.
pub fn analyze_skin_tone<D: SkinDetector + ?Sized>(
    image_bytes: &[u8],
    detector: &D,
) -> Result<SkinToneAnalysis, SkinToneError> {
    let mut staged = tempfile::Builder::new()
        .prefix("skin-tone-")
        .suffix(".jpg")
        .tempfile()?;
    staged.write_all(image_bytes)?;
    staged.flush()?;
    debug!(path = %staged.path().display(), bytes = image_bytes.len(), "staged image for skin tone analysis");

    let report = detector
        .detect(staged.path())
        .map_err(|e| SkinToneError::Detector(format!("{:#}", e)))?;

    let DetectionReport { faces, report_image } = report;
    let skin_info = faces.into_iter().next().ok_or(SkinToneError::NoFaceDetected)?;
    Ok(SkinToneAnalysis {
        skin_info,
        report_image,
    })
}
