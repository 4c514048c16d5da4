//! Document writer capability consumed by the layout pass.
//!
//! The pass never reads position state from a writer: every draw receives an
//! explicit `(x, y)` and the caller advances its own cursor by the height the
//! writer reported for the same text and width.

pub mod display_list;
pub mod recording;

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::WriterError;
use crate::layout::font_metrics::{get_metrics, FontFamily, FontMetricTable};

pub use display_list::DisplayListWriter;
pub use recording::RecordingWriter;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Per-call text box options.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TextOptions {
    pub width: f32,
    pub align: Align,
    pub line_gap: f32,
}

impl TextOptions {
    pub fn new(width: f32) -> Self {
        TextOptions {
            width,
            align: Align::Left,
            line_gap: 0.0,
        }
    }

    pub fn align(mut self, align: Align) -> Self {
        self.align = align;
        self
    }

    pub fn line_gap(mut self, line_gap: f32) -> Self {
        self.line_gap = line_gap;
        self
    }
}

/// What a writer hands back once the document is complete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalizedDocument {
    pub location: String,
    pub pages: usize,
}

#[async_trait]
pub trait DocumentWriter: Send {
    fn font(&mut self, path: &str) -> Result<(), WriterError>;

    fn font_size(&mut self, size: f32) -> Result<(), WriterError>;

    /// Height `text` occupies when wrapped at `options.width`.
    fn height_of_string(&self, text: &str, options: &TextOptions) -> Result<f32, WriterError>;

    /// Draws `text` with its top-left corner at `(x, y)`.
    fn draw_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        options: &TextOptions,
    ) -> Result<(), WriterError>;

    fn new_page(&mut self) -> Result<(), WriterError>;

    /// Flushes the finished document. Called once, after the last draw.
    async fn finalize(&mut self) -> Result<FinalizedDocument, WriterError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Shared typesetting state
// ────────────────────────────────────────────────────────────────────────────

/// Font selection and metric-based wrapping shared by the bundled writers.
#[derive(Clone, Copy)]
pub struct Typesetter {
    metrics: &'static FontMetricTable,
    font_size: f32,
}

impl std::fmt::Debug for Typesetter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Typesetter")
            .field("font", &self.metrics.font)
            .field("font_size", &self.font_size)
            .finish()
    }
}

impl Default for Typesetter {
    fn default() -> Self {
        Typesetter {
            metrics: get_metrics(FontFamily::Courier),
            font_size: 12.0,
        }
    }
}

impl Typesetter {
    pub fn family(&self) -> FontFamily {
        self.metrics.font
    }

    pub fn size(&self) -> f32 {
        self.font_size
    }

    /// Selects metrics for a built-in name or an existing font file.
    pub fn set_font(&mut self, path: &str) -> Result<FontFamily, WriterError> {
        let family = match FontFamily::from_name(path) {
            Some(family) => family,
            None => {
                let file = Path::new(path);
                if !file.is_file() {
                    return Err(WriterError::FontUnavailable(path.to_string()));
                }
                FontFamily::for_font_file(file)
            }
        };
        self.metrics = get_metrics(family);
        Ok(family)
    }

    pub fn set_size(&mut self, size: f32) -> Result<(), WriterError> {
        if !(size.is_finite() && size > 0.0) {
            return Err(WriterError::InvalidFontSize(size));
        }
        self.font_size = size;
        Ok(())
    }

    pub fn line_height(&self, line_gap: f32) -> f32 {
        self.font_size + line_gap
    }

    pub fn wrap(&self, text: &str, width: f32) -> Result<Vec<String>, WriterError> {
        if !(width.is_finite() && width > 0.0) {
            return Err(WriterError::Measure(format!(
                "column width must be positive, got {width}"
            )));
        }
        Ok(self.metrics.wrap(text, width / self.font_size))
    }

    pub fn height(&self, text: &str, options: &TextOptions) -> Result<f32, WriterError> {
        let lines = self.wrap(text, options.width)?;
        Ok(lines.len() as f32 * self.line_height(options.line_gap))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typesetter_height_counts_wrapped_lines() {
        let ts = Typesetter::default();
        // Courier 12pt: 7.2pt per char, 72pt box holds 10 chars.
        let opts = TextOptions::new(72.0);
        assert_eq!(ts.height("short", &opts).unwrap(), 12.0);
        assert_eq!(ts.height("aaaa bbbb cccc", &opts).unwrap(), 24.0);
        assert_eq!(ts.height("one", &opts.line_gap(2.0)).unwrap(), 14.0);
    }

    #[test]
    fn test_unknown_font_file_is_unavailable() {
        let mut ts = Typesetter::default();
        let err = ts.set_font("/definitely/not/here.ttf").unwrap_err();
        assert!(matches!(err, WriterError::FontUnavailable(_)));
    }

    #[test]
    fn test_existing_font_file_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("CourierPrime.ttf");
        std::fs::write(&path, b"not really a font").unwrap();
        let mut ts = Typesetter::default();
        let family = ts.set_font(path.to_str().unwrap()).unwrap();
        assert_eq!(family, FontFamily::CourierPrime);
    }

    #[test]
    fn test_rejects_non_positive_sizes_and_widths() {
        let mut ts = Typesetter::default();
        assert!(ts.set_size(0.0).is_err());
        assert!(ts.height("x", &TextOptions::new(0.0)).is_err());
    }
}
