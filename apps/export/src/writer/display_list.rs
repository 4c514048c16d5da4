//! Writer that lays text into positioned, pre-wrapped lines and finalizes to a
//! JSON display list a renderer can paint without re-measuring.

use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::PageSize;
use crate::errors::WriterError;
use crate::layout::font_metrics::FontFamily;
use crate::writer::{Align, DocumentWriter, FinalizedDocument, TextOptions, Typesetter};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayItem {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub align: Align,
    pub line_height: f32,
    /// Wrapped lines, top to bottom.
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayPage {
    pub number: usize,
    pub items: Vec<DisplayItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayDocument {
    pub page_width: f32,
    pub page_height: f32,
    pub font: FontFamily,
    pub font_path: String,
    pub font_size: f32,
    pub pages: Vec<DisplayPage>,
}

#[derive(Debug)]
pub struct DisplayListWriter {
    destination: PathBuf,
    typesetter: Typesetter,
    font_path: String,
    page_width: f32,
    page_height: f32,
    pages: Vec<DisplayPage>,
}

impl DisplayListWriter {
    /// Prepares a writer targeting `destination`. Fails if the parent directory
    /// is missing or read-only, before any page is allocated.
    pub fn create(
        destination: impl Into<PathBuf>,
        page_size: PageSize,
    ) -> Result<Self, WriterError> {
        let destination = destination.into();
        let parent = parent_dir(&destination);
        let meta = std::fs::metadata(&parent).map_err(|e| {
            WriterError::Destination(format!("{}: {e}", parent.display()))
        })?;
        if !meta.is_dir() {
            return Err(WriterError::Destination(format!(
                "{} is not a directory",
                parent.display()
            )));
        }
        if meta.permissions().readonly() {
            return Err(WriterError::Destination(format!(
                "{} is read-only",
                parent.display()
            )));
        }

        let (page_width, page_height) = page_size.dimensions();
        Ok(DisplayListWriter {
            destination,
            typesetter: Typesetter::default(),
            font_path: "Courier".to_string(),
            page_width,
            page_height,
            pages: vec![DisplayPage {
                number: 1,
                items: Vec::new(),
            }],
        })
    }

    pub fn document(&self) -> DisplayDocument {
        DisplayDocument {
            page_width: self.page_width,
            page_height: self.page_height,
            font: self.typesetter.family(),
            font_path: self.font_path.clone(),
            font_size: self.typesetter.size(),
            pages: self.pages.clone(),
        }
    }

    fn current_page(&mut self) -> &mut DisplayPage {
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[async_trait]
impl DocumentWriter for DisplayListWriter {
    fn font(&mut self, path: &str) -> Result<(), WriterError> {
        let family = self.typesetter.set_font(path)?;
        debug!(font = path, ?family, "Display list font selected");
        self.font_path = path.to_string();
        Ok(())
    }

    fn font_size(&mut self, size: f32) -> Result<(), WriterError> {
        self.typesetter.set_size(size)
    }

    fn height_of_string(&self, text: &str, options: &TextOptions) -> Result<f32, WriterError> {
        self.typesetter.height(text, options)
    }

    fn draw_text(
        &mut self,
        text: &str,
        x: f32,
        y: f32,
        options: &TextOptions,
    ) -> Result<(), WriterError> {
        if !(x.is_finite() && y.is_finite()) {
            return Err(WriterError::Draw(format!("non-finite position ({x}, {y})")));
        }
        let lines = self.typesetter.wrap(text, options.width)?;
        let line_height = self.typesetter.line_height(options.line_gap);
        self.current_page().items.push(DisplayItem {
            x,
            y,
            width: options.width,
            align: options.align,
            line_height,
            lines,
        });
        Ok(())
    }

    fn new_page(&mut self) -> Result<(), WriterError> {
        let number = self.pages.len() + 1;
        self.pages.push(DisplayPage {
            number,
            items: Vec::new(),
        });
        Ok(())
    }

    async fn finalize(&mut self) -> Result<FinalizedDocument, WriterError> {
        let document = self.document();
        let bytes = serde_json::to_vec_pretty(&document)?;
        let destination = self.destination.clone();
        let parent = parent_dir(&destination);

        // Write to a temp file beside the destination, then rename over it, so
        // a failed export never leaves a partial file behind.
        let target = destination.clone();
        tokio::task::spawn_blocking(move || -> Result<(), WriterError> {
            let mut tmp = tempfile::NamedTempFile::new_in(&parent)?;
            tmp.write_all(&bytes)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&target).map_err(|e| WriterError::Io(e.error))?;
            Ok(())
        })
        .await
        .map_err(|e| WriterError::Io(std::io::Error::other(e.to_string())))??;

        Ok(FinalizedDocument {
            location: destination.display().to_string(),
            pages: document.pages.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_rejects_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nope").join("out.json");
        let err = DisplayListWriter::create(dest, PageSize::Letter).unwrap_err();
        assert!(matches!(err, WriterError::Destination(_)));
    }

    #[test]
    fn test_draw_records_wrapped_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut w =
            DisplayListWriter::create(dir.path().join("out.json"), PageSize::Letter).unwrap();
        w.draw_text("aaaa bbbb cccc", 10.0, 72.0, &TextOptions::new(72.0))
            .unwrap();
        w.new_page().unwrap();
        let doc = w.document();
        assert_eq!(doc.pages.len(), 2);
        assert_eq!(doc.pages[0].items[0].lines, vec!["aaaa bbbb", "cccc"]);
        assert_eq!(doc.pages[1].number, 2);
        assert!(doc.pages[1].items.is_empty());
    }

    #[test]
    fn test_measured_height_matches_drawn_lines() {
        let dir = tempfile::tempdir().unwrap();
        let mut w = DisplayListWriter::create(dir.path().join("out.json"), PageSize::A4).unwrap();
        let opts = TextOptions::new(90.0).line_gap(1.5);
        let text = "A line long enough to wrap inside a narrow column.";
        let height = w.height_of_string(text, &opts).unwrap();
        w.draw_text(text, 0.0, 0.0, &opts).unwrap();
        let item = &w.document().pages[0].items[0];
        assert_eq!(item.lines.len() as f32 * item.line_height, height);
    }

    #[tokio::test]
    async fn test_finalize_writes_json_document() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("script.pages.json");
        let mut w = DisplayListWriter::create(&dest, PageSize::Letter).unwrap();
        w.font("Courier").unwrap();
        w.draw_text("FADE IN:", 108.0, 72.0, &TextOptions::new(432.0))
            .unwrap();

        let finalized = w.finalize().await.unwrap();
        assert_eq!(finalized.pages, 1);
        assert_eq!(finalized.location, dest.display().to_string());

        let raw = std::fs::read_to_string(&dest).unwrap();
        let doc: DisplayDocument = serde_json::from_str(&raw).unwrap();
        assert_eq!(doc.pages[0].items[0].lines, vec!["FADE IN:"]);
        assert_eq!(doc.font, FontFamily::Courier);
    }
}
