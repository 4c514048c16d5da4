//! In-memory writer that records every call. Backs `--dry-run` and the layout tests.

use async_trait::async_trait;
use serde::Serialize;

use crate::errors::WriterError;
use crate::writer::{Align, DocumentWriter, FinalizedDocument, TextOptions, Typesetter};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawnText {
    /// 1-based physical page the text landed on.
    pub page: usize,
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub align: Align,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum WriterCall {
    Font(String),
    FontSize(f32),
    Draw(DrawnText),
    NewPage,
    Finalize,
}

#[derive(Debug, Default)]
pub struct RecordingWriter {
    calls: Vec<WriterCall>,
    page: usize,
    typesetter: Typesetter,
    fail_after_draws: Option<usize>,
    draws: usize,
}

impl RecordingWriter {
    pub fn new() -> Self {
        RecordingWriter {
            page: 1,
            ..Default::default()
        }
    }

    /// A writer whose draw calls start failing once `draws` have succeeded.
    pub fn failing_after(draws: usize) -> Self {
        RecordingWriter {
            fail_after_draws: Some(draws),
            ..Self::new()
        }
    }

    pub fn draws(&self) -> impl Iterator<Item = &DrawnText> {
        self.calls.iter().filter_map(|call| match call {
            WriterCall::Draw(d) => Some(d),
            _ => None,
        })
    }

    pub fn draws_on_page(&self, page: usize) -> Vec<&DrawnText> {
        self.draws().filter(|d| d.page == page).collect()
    }

    /// Texts of every draw, in order.
    pub fn texts(&self) -> Vec<&str> {
        self.draws().map(|d| d.text.as_str()).collect()
    }

    pub fn page_count(&self) -> usize {
        self.page
    }

    pub fn is_finalized(&self) -> bool {
        self.calls.iter().any(|c| matches!(c, WriterCall::Finalize))
    }
}

#[async_trait]
impl DocumentWriter for RecordingWriter {
    fn font(&mut self, path: &str) -> Result<(), WriterError> {
        self.typesetter.set_font(path)?;
        self.calls.push(WriterCall::Font(path.to_string()));
        Ok(())
    }

    fn font_size(&mut self, size: f32) -> Result<(), WriterError> {
        self.typesetter.set_size(size)?;
        self.calls.push(WriterCall::FontSize(size));
        Ok(())
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
        if self.fail_after_draws.is_some_and(|limit| self.draws >= limit) {
            return Err(WriterError::Draw(format!("injected failure drawing '{text}'")));
        }
        let height = self.typesetter.height(text, options)?;
        self.draws += 1;
        self.calls.push(WriterCall::Draw(DrawnText {
            page: self.page,
            text: text.to_string(),
            x,
            y,
            width: options.width,
            align: options.align,
            height,
        }));
        Ok(())
    }

    fn new_page(&mut self) -> Result<(), WriterError> {
        self.page += 1;
        self.calls.push(WriterCall::NewPage);
        Ok(())
    }

    async fn finalize(&mut self) -> Result<FinalizedDocument, WriterError> {
        self.calls.push(WriterCall::Finalize);
        Ok(FinalizedDocument {
            location: "memory://recording".to_string(),
            pages: self.page,
        })
    }
}
