use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::errors::ExportError;

// ────────────────────────────────────────────────────────────────────────────
// Process configuration
// ────────────────────────────────────────────────────────────────────────────

/// Process configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON settings file; defaults apply when absent.
    pub settings_path: Option<PathBuf>,
    /// Directory the exported display list lands in when no output path is given.
    pub export_dir: PathBuf,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let export_dir = std::env::var("EXPORT_DIR").unwrap_or_else(|_| ".".to_string());

        Ok(Config {
            settings_path: std::env::var("SCREENPLAY_SETTINGS").ok().map(PathBuf::from),
            export_dir: PathBuf::from(export_dir),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Export settings
// ────────────────────────────────────────────────────────────────────────────

/// Named page sizes the writers support, in points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageSize {
    #[default]
    Letter,
    A4,
    Legal,
}

impl PageSize {
    /// `(width, height)` in points.
    pub fn dimensions(self) -> (f32, f32) {
        match self {
            PageSize::Letter => (612.0, 792.0),
            PageSize::A4 => (595.28, 841.89),
            PageSize::Legal => (612.0, 1008.0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneNumberPosition {
    #[default]
    Inline,
    Margin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneNumberStyle {
    #[default]
    Plain,
    Parentheses,
}

/// User-facing export settings. Every key is optional; missing keys take the
/// industry-standard defaults below.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportSettings {
    pub page_size: PageSize,
    pub margin_top_in: f32,
    pub margin_bottom_in: f32,
    pub margin_left_in: f32,
    pub margin_right_in: f32,
    pub font_path: String,
    pub font_size: f32,
    pub line_gap: f32,
    pub indent_character_in: f32,
    pub indent_parenthetical_in: f32,
    pub indent_dialogue_in: f32,
    pub dual_gutter_in: f32,
    pub scene_numbers: bool,
    pub scene_number_position: SceneNumberPosition,
    pub scene_number_style: SceneNumberStyle,
    pub show_more: bool,
    pub show_contd: bool,
    pub min_block_lines: usize,
    pub page_numbers: bool,
}

impl Default for ExportSettings {
    fn default() -> Self {
        ExportSettings {
            page_size: PageSize::Letter,
            margin_top_in: 1.0,
            margin_bottom_in: 1.0,
            margin_left_in: 1.5,
            margin_right_in: 1.0,
            font_path: "Courier".to_string(),
            font_size: 12.0,
            line_gap: 0.0,
            indent_character_in: 2.2,
            indent_parenthetical_in: 0.5,
            indent_dialogue_in: 1.0,
            dual_gutter_in: 0.25,
            scene_numbers: false,
            scene_number_position: SceneNumberPosition::Inline,
            scene_number_style: SceneNumberStyle::Plain,
            show_more: true,
            show_contd: true,
            min_block_lines: 2,
            page_numbers: true,
        }
    }
}

impl ExportSettings {
    /// Reads settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file '{}'", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Settings file '{}' is not valid JSON", path.display()))
    }

    /// Rejects settings the layout engine cannot honor.
    pub fn validate(&self) -> Result<(), ExportError> {
        if self.min_block_lines == 0 {
            return Err(ExportError::InvalidSettings(
                "minBlockLines must be at least 1".to_string(),
            ));
        }
        if self.font_size <= 0.0 {
            return Err(ExportError::InvalidSettings(format!(
                "fontSize must be positive, got {}",
                self.font_size
            )));
        }
        if self.line_gap < 0.0 {
            return Err(ExportError::InvalidSettings(
                "lineGap must not be negative".to_string(),
            ));
        }

        let lengths = [
            ("marginTopIn", self.margin_top_in),
            ("marginBottomIn", self.margin_bottom_in),
            ("marginLeftIn", self.margin_left_in),
            ("marginRightIn", self.margin_right_in),
            ("indentCharacterIn", self.indent_character_in),
            ("indentParentheticalIn", self.indent_parenthetical_in),
            ("indentDialogueIn", self.indent_dialogue_in),
            ("dualGutterIn", self.dual_gutter_in),
        ];
        if let Some((name, value)) = lengths.iter().find(|(_, v)| *v < 0.0) {
            return Err(ExportError::InvalidSettings(format!(
                "{name} must not be negative, got {value}"
            )));
        }

        let (width, height) = self.page_size.dimensions();
        let printable_width = width - (self.margin_left_in + self.margin_right_in) * 72.0;
        let printable_height = height - (self.margin_top_in + self.margin_bottom_in) * 72.0;
        if printable_width <= 0.0 || printable_height <= 0.0 {
            return Err(ExportError::InvalidSettings(
                "margins leave no printable area".to_string(),
            ));
        }

        let dialogue_width = printable_width
            - 2.0 * (self.indent_dialogue_in + self.indent_parenthetical_in) * 72.0;
        if dialogue_width <= 0.0 {
            return Err(ExportError::InvalidSettings(
                "dialogue indents leave no room for text".to_string(),
            ));
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(ExportSettings::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{ "pageSize": "a4", "minBlockLines": 3, "sceneNumberPosition": "margin" }"#;
        let settings: ExportSettings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.page_size, PageSize::A4);
        assert_eq!(settings.min_block_lines, 3);
        assert_eq!(settings.scene_number_position, SceneNumberPosition::Margin);
        assert_eq!(settings.scene_number_style, SceneNumberStyle::Plain);
        assert!(settings.show_more);
        assert_eq!(settings.font_path, "Courier");
    }

    #[test]
    fn test_zero_min_block_lines_rejected() {
        let settings = ExportSettings {
            min_block_lines: 0,
            ..ExportSettings::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(ExportError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_oversized_margins_rejected() {
        let settings = ExportSettings {
            margin_left_in: 5.0,
            margin_right_in: 4.0,
            ..ExportSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_negative_indent_rejected() {
        let settings = ExportSettings {
            indent_dialogue_in: -1.0,
            ..ExportSettings::default()
        };
        let err = settings.validate().unwrap_err();
        assert!(err.to_string().contains("indentDialogueIn"));
    }

    #[test]
    fn test_load_reads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{ "showMore": false, "fontSize": 11 }"#).unwrap();
        let settings = ExportSettings::load(&path).unwrap();
        assert!(!settings.show_more);
        assert_eq!(settings.font_size, 11.0);
    }

    #[test]
    fn test_load_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        assert!(ExportSettings::load(&dir.path().join("missing.json")).is_err());
    }
}
