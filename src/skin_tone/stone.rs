use anyhow::{Context, Result};
use csv::ReaderBuilder;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};
use walkdir::WalkDir;

use super::analyzer::{DetectionReport, DominantColor, SkinDetector, SkinToneResult};

pub const DEFAULT_STONE_PROGRAM: &str = "stone";

const RESULT_FILE: &str = "result.csv";
const DEBUG_DIR: &str = "debug";

const FACE_ID_COL: &str = "face id";
const SKIN_TONE_COL: &str = "skin tone";
const TONE_LABEL_COL: &str = "tone label";
const ACCURACY_COL: &str = "accuracy(0-100)";
const DOMINANT_PREFIX: &str = "dominant ";
const PERCENT_PREFIX: &str = "percent ";

/// Face id the detector writes when it fell back to the whole image.
const NO_FACE_ID: &str = "NA";

/// Runs the `stone` skin tone classifier CLI and reads back its CSV report.
#[derive(Debug, Clone)]
pub struct StoneCli {
    program: PathBuf,
}

impl StoneCli {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl SkinDetector for StoneCli {
    fn detect(&self, image_path: &Path) -> Result<DetectionReport> {
        let output_dir = tempfile::tempdir().context("Failed to create detector output directory")?;
        info!(program = %self.program.display(), image = %image_path.display(), "running skin tone detector");

        let output = Command::new(&self.program)
            .arg("-i")
            .arg(image_path)
            .args(["-t", "auto", "--debug", "-o"])
            .arg(output_dir.path())
            .output()
            .with_context(|| format!("Failed to launch {:?}", self.program))?;

        if !output.status.success() {
            return Err(anyhow::anyhow!(
                "{:?} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        let result_path = output_dir.path().join(RESULT_FILE);
        let file = std::fs::File::open(&result_path)
            .with_context(|| format!("Detector produced no result file at {:?}", result_path))?;
        let faces = parse_result_csv(file)?;
        debug!(faces = faces.len(), "detector report parsed");

        let report_image = first_report_image(&output_dir.path().join(DEBUG_DIR))?;
        Ok(DetectionReport { faces, report_image })
    }
}

/// Reads the detector's CSV report. Rows without a detected face are dropped.
pub fn parse_result_csv<R: Read>(reader: R) -> Result<Vec<SkinToneResult>> {
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let headers = rdr.headers()?.clone();

    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| anyhow::anyhow!("Column '{}' not found", name))
    };
    let face_idx = column(FACE_ID_COL)?;
    let tone_idx = column(SKIN_TONE_COL)?;
    let label_idx = column(TONE_LABEL_COL)?;
    let accuracy_idx = column(ACCURACY_COL)?;

    // (dominant column, matching percent column)
    let dominant_cols: Vec<(usize, Option<usize>)> = headers
        .iter()
        .enumerate()
        .filter_map(|(i, h)| {
            let n = h.trim().strip_prefix(DOMINANT_PREFIX)?;
            let percent = format!("{}{}", PERCENT_PREFIX, n);
            Some((i, headers.iter().position(|h| h.trim() == percent)))
        })
        .collect();

    let mut faces = Vec::new();
    for (row_index, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("Failed to read record at row index {}", row_index))?;
        let field = |idx: usize| record.get(idx).map(str::trim).unwrap_or("");

        let face_id = field(face_idx);
        if face_id.is_empty() || face_id == NO_FACE_ID {
            continue;
        }

        let dominant_colors = dominant_cols
            .iter()
            .filter_map(|&(hex_idx, percent_idx)| {
                let hex = field(hex_idx);
                if hex.is_empty() || hex == NO_FACE_ID {
                    return None;
                }
                let percent = percent_idx.and_then(|i| field(i).parse::<f64>().ok()).unwrap_or(0.0);
                Some(DominantColor {
                    hex: hex.to_string(),
                    percent,
                })
            })
            .collect();

        faces.push(SkinToneResult {
            hex_code: field(tone_idx).to_string(),
            tone_label: field(label_idx).to_string(),
            accuracy: field(accuracy_idx).parse::<f64>().unwrap_or(0.0),
            dominant_colors,
        });
    }
    Ok(faces)
}

/// First PNG/JPEG under `dir`, walking entries in file-name order, if the
/// directory exists.
fn first_report_image(dir: &Path) -> Result<Option<Vec<u8>>> {
    if !dir.is_dir() {
        return Ok(None);
    }
    for entry in WalkDir::new(dir).follow_links(false).sort_by_file_name() {
        let entry = entry.with_context(|| format!("Failed to walk {:?}", dir))?;
        if !entry.file_type().is_file() || !is_image(entry.path()) {
            continue;
        }
        let path = entry.path();
        debug!(image = %path.display(), "found detector report image");
        let bytes = std::fs::read(path).with_context(|| format!("Failed to read report image {:?}", path))?;
        return Ok(Some(bytes));
    }
    Ok(None)
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "png" | "jpg" | "jpeg"))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str =
        "file,image type,face id,dominant 1,percent 1,dominant 2,percent 2,skin tone,tone label,accuracy(0-100)";

    #[test]
    fn test_parse_result_with_faces() -> Result<()> {
        let csv = format!(
            "{}\nphoto.jpg,color,1,#C99676,0.67,#805341,0.33,#9D7A54,CF,86.74\nphoto.jpg,color,2,#E0B9A0,0.7,#A47A5F,0.3,#BE9167,CG,80.1\n",
            HEADER
        );
        let faces = parse_result_csv(csv.as_bytes())?;
        assert_eq!(faces.len(), 2);

        let first = &faces[0];
        assert_eq!(first.hex_code, "#9D7A54");
        assert_eq!(first.tone_label, "CF");
        assert!((first.accuracy - 86.74).abs() < 1e-9);
        assert_eq!(
            first.dominant_colors,
            vec![
                DominantColor {
                    hex: "#C99676".to_string(),
                    percent: 0.67,
                },
                DominantColor {
                    hex: "#805341".to_string(),
                    percent: 0.33,
                },
            ]
        );
        Ok(())
    }

    #[test]
    fn test_parse_result_without_face() -> Result<()> {
        let csv = format!("{}\nphoto.jpg,color,NA,#C99676,0.67,#805341,0.33,#9D7A54,CF,86.74\n", HEADER);
        assert!(parse_result_csv(csv.as_bytes())?.is_empty());
        Ok(())
    }

    #[test]
    fn test_parse_result_missing_column() {
        let csv = "file,face id,skin tone\nphoto.jpg,1,#9D7A54\n";
        let err = parse_result_csv(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Column 'tone label' not found"));
    }

    #[test]
    fn test_missing_program_is_an_error() {
        let detector = StoneCli::new("this-program-does-not-exist-xyz");
        let err = detector.detect(Path::new("photo.jpg")).unwrap_err();
        assert!(err.to_string().contains("Failed to launch"));
    }

    #[test]
    fn test_first_report_image() -> Result<()> {
        let dir = tempfile::tempdir()?;
        assert_eq!(first_report_image(&dir.path().join("debug"))?, None);

        let nested = dir.path().join("debug").join("color").join("faces_1");
        std::fs::create_dir_all(&nested)?;
        std::fs::write(nested.join("notes.txt"), b"ignored")?;
        std::fs::write(nested.join("photo-1.png"), b"png")?;
        assert_eq!(first_report_image(&dir.path().join("debug"))?, Some(b"png".to_vec()));
        Ok(())
    }

    #[test]
    fn test_first_report_image_takes_earliest_name() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let debug_dir = dir.path().join("debug");
        std::fs::create_dir_all(debug_dir.join("b_faces"))?;
        std::fs::create_dir_all(debug_dir.join("a_faces"))?;
        std::fs::write(debug_dir.join("b_faces").join("face.jpg"), b"second")?;
        std::fs::write(debug_dir.join("a_faces").join("face.JPEG"), b"first")?;
        std::fs::write(debug_dir.join("a_faces").join("face.csv"), b"ignored")?;

        assert_eq!(first_report_image(&debug_dir)?, Some(b"first".to_vec()));
        Ok(())
    }
}
