//! Coarse hex-colour bucketing for skin, hair and eye colours.
//!
//! The thresholds are hand-tuned and deliberately simplistic; this is not a
//! calibrated colour model.

use clap::ValueEnum;
use std::str::FromStr;

pub const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorKind {
    Skin,
    Hair,
    Eyes,
}

impl FromStr for ColorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "skin" => Ok(ColorKind::Skin),
            "hair" => Ok(ColorKind::Hair),
            "eyes" => Ok(ColorKind::Eyes),
            other => Err(format!("unsupported color type '{}'", other)),
        }
    }
}

/// Parses `#RRGGBB` (leading `#` optional) into channels.
pub fn parse_hex(hex_code: &str) -> Option<(u8, u8, u8)> {
    let hex = hex_code.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Label for `hex_code` in the given category. Empty, malformed codes and
/// unknown categories all yield `"unknown"`.
pub fn get_color_description(hex_code: &str, color_type: &str) -> &'static str {
    match color_type.parse::<ColorKind>() {
        Ok(kind) => describe(hex_code, kind),
        Err(_) => UNKNOWN,
    }
}

pub fn describe(hex_code: &str, kind: ColorKind) -> &'static str {
    let Some((r, g, b)) = parse_hex(hex_code) else {
        return UNKNOWN;
    };
    match kind {
        ColorKind::Skin => skin_label(r, g, b),
        ColorKind::Hair => hair_label(r, g, b),
        ColorKind::Eyes => eye_label(r, g, b),
    }
}

fn skin_label(r: u8, g: u8, b: u8) -> &'static str {
    if r > 200 && g > 160 && b > 140 {
        "fair"
    } else if r > 160 && g > 120 && b > 100 {
        "medium"
    } else {
        "deep"
    }
}

// Bands overlap, so order matters.
fn hair_label(r: u8, g: u8, b: u8) -> &'static str {
    if r > 150 && g > 100 && b > 50 {
        "blonde"
    } else if r > 100 && g > 50 && b > 40 {
        "brown"
    } else if r < 80 && g < 60 && b < 60 {
        "black"
    } else if r > 150 && g < 100 && b < 80 {
        "red"
    } else {
        "brown"
    }
}

fn eye_label(r: u8, g: u8, b: u8) -> &'static str {
    if b > r && b > g {
        "blue"
    } else if g > r && g > b {
        "green"
    } else if r > g && r > b {
        "brown"
    } else {
        "hazel"
    }
}
