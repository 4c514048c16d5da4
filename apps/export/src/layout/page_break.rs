//! Page break decisions and the dialogue block procedure.
//!
//! # Block procedure
//! 1. Measure the cue and the first `min(min_block_lines, len)` lines.
//! 2. If they cannot start here together, break before the cue.
//! 3. Write the cue, then each line. A line that would cross the bottom margin
//!    breaks the page: without `(MORE)` when the minimum has not been reached
//!    on this page, with it otherwise. The cue is re-emitted with `(CONT'D)`.
//! 4. Lines are never split across pages.
//!
//! Every decision reads the cursor passed in; nothing is read back from the
//! writer.

use tracing::{debug, warn};

use crate::errors::WriterError;
use crate::layout::block::DialogueBlock;
use crate::layout::geometry::{Cursor, LayoutOptions, PageGeometry};
use crate::layout::height::HeightEstimator;
use crate::layout::orchestrator::LayoutSummary;
use crate::script::ElementKind;
use crate::writer::{Align, DocumentWriter};

pub const MORE_MARKER: &str = "(MORE)";
pub const CONTD_SUFFIX: &str = " (CONT'D)";

/// Whether a character cue may start at the current cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueDecision {
    WriteHere,
    BreakFirst,
}

/// What to do with the next dialogue line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineDecision {
    Write,
    /// Break before the line; `more` asks for a `(MORE)` marker first.
    Break { more: bool },
}

pub struct PageBreakDecider<'a> {
    geometry: &'a PageGeometry,
    options: &'a LayoutOptions,
}

impl<'a> PageBreakDecider<'a> {
    pub fn new(geometry: &'a PageGeometry, options: &'a LayoutOptions) -> Self {
        PageBreakDecider { geometry, options }
    }

    // ── pure decisions ──────────────────────────────────────────────────────

    pub fn decide_cue(
        &self,
        cursor: &Cursor,
        header_height: f32,
        first_lines_height: f32,
    ) -> CueDecision {
        if cursor.fits(header_height + first_lines_height, self.geometry)
            || cursor.is_at_top(self.geometry)
        {
            CueDecision::WriteHere
        } else {
            CueDecision::BreakFirst
        }
    }

    /// `header_only_page` is true while the page holds nothing but this
    /// block's cue; a line that overflows such a page is written anyway.
    pub fn decide_line(
        &self,
        cursor: &Cursor,
        line_height: f32,
        written_on_page: usize,
        header_only_page: bool,
    ) -> LineDecision {
        if cursor.fits(line_height, self.geometry) || header_only_page {
            LineDecision::Write
        } else if written_on_page < self.options.min_block_lines {
            LineDecision::Break { more: false }
        } else {
            LineDecision::Break {
                more: self.options.show_more,
            }
        }
    }

    /// Cue text for a block resumed on a new page.
    pub fn continuation_name(&self, name: &str) -> String {
        if self.options.show_contd {
            format!("{name}{CONTD_SUFFIX}")
        } else {
            name.to_string()
        }
    }

    // ── writer effects ──────────────────────────────────────────────────────

    /// Starts a new page and stamps its page number.
    pub fn break_page<W: DocumentWriter + ?Sized>(
        &self,
        writer: &mut W,
        cursor: &mut Cursor,
        estimator: &HeightEstimator<'_>,
        reason: &'static str,
    ) -> Result<(), WriterError> {
        writer.new_page()?;
        cursor.next_page(self.geometry);
        debug!(page = cursor.page, reason, "Page break");

        if self.options.page_numbers && cursor.page > 1 {
            let label = format!("{}.", cursor.page);
            let placement = estimator.placement(
                ElementKind::Action,
                self.geometry.margin_left,
                self.geometry.printable_width,
            );
            let opts = estimator.text_options(placement, Align::Right);
            let height = writer.height_of_string(&label, &opts)?;
            let y = ((self.geometry.margin_top - height) / 2.0).max(0.0);
            writer.draw_text(&label, placement.x, y, &opts)?;
        }
        Ok(())
    }

    /// Breaks before a unit of `height` unless it fits or the page is still
    /// empty. Returns true when the unit overflows even so.
    pub fn make_room<W: DocumentWriter + ?Sized>(
        &self,
        writer: &mut W,
        cursor: &mut Cursor,
        estimator: &HeightEstimator<'_>,
        height: f32,
        reason: &'static str,
    ) -> Result<bool, WriterError> {
        if !cursor.fits(height, self.geometry) && !cursor.is_at_top(self.geometry) {
            self.break_page(writer, cursor, estimator, reason)?;
        }
        Ok(!cursor.fits(height, self.geometry))
    }

    /// Draws `(MORE)` right-aligned in the dialogue column at the cursor.
    /// The cursor does not move; a page break follows.
    pub fn draw_more<W: DocumentWriter + ?Sized>(
        &self,
        writer: &mut W,
        cursor: &Cursor,
        estimator: &HeightEstimator<'_>,
        column_x: f32,
        column_width: f32,
    ) -> Result<(), WriterError> {
        let placement = estimator.placement(ElementKind::Dialogue, column_x, column_width);
        let opts = estimator.text_options(placement, Align::Right);
        writer.draw_text(MORE_MARKER, placement.x, cursor.y, &opts)
    }

    fn draw_cue<W: DocumentWriter + ?Sized>(
        &self,
        writer: &mut W,
        cursor: &mut Cursor,
        estimator: &HeightEstimator<'_>,
        text: &str,
        height: f32,
    ) -> Result<(), WriterError> {
        let placement = estimator.placement(
            ElementKind::Character,
            self.geometry.margin_left,
            self.geometry.printable_width,
        );
        writer.draw_text(
            text,
            placement.x,
            cursor.y,
            &estimator.text_options(placement, Align::Left),
        )?;
        cursor.advance(height);
        Ok(())
    }

    // ── block procedure ─────────────────────────────────────────────────────

    /// Writes a single-column dialogue block under `name`.
    pub fn write_block<W: DocumentWriter + ?Sized>(
        &self,
        writer: &mut W,
        cursor: &mut Cursor,
        estimator: &HeightEstimator<'_>,
        name: &str,
        block: &DialogueBlock,
        summary: &mut LayoutSummary,
    ) -> Result<(), WriterError> {
        let width = self.geometry.printable_width;
        let header_height = estimator.height_of(writer, name, ElementKind::Character, width)?;
        let heights = block
            .lines
            .iter()
            .map(|line| estimator.height_of(writer, &line.text, line.kind, width))
            .collect::<Result<Vec<f32>, WriterError>>()?;

        let guaranteed = self.options.min_block_lines.min(block.len());
        let first_lines: f32 = heights.iter().take(guaranteed).sum();

        if self.decide_cue(cursor, header_height, first_lines) == CueDecision::BreakFirst {
            self.break_page(writer, cursor, estimator, "cue cannot keep its first lines")?;
        }

        let mut header_only_page = cursor.is_at_top(self.geometry);
        self.draw_cue(writer, cursor, estimator, name, header_height)?;
        let mut written_on_page = 0usize;

        for (line, &height) in block.lines.iter().zip(&heights) {
            if let LineDecision::Break { more } =
                self.decide_line(cursor, height, written_on_page, header_only_page)
            {
                if more {
                    self.draw_more(writer, cursor, estimator, self.geometry.margin_left, width)?;
                    summary.more_markers += 1;
                }
                let reason = if written_on_page < self.options.min_block_lines {
                    "dialogue minimum cannot be honored"
                } else {
                    "dialogue continues"
                };
                self.break_page(writer, cursor, estimator, reason)?;
                summary.continuations += 1;

                let header = self.continuation_name(name);
                let header_height =
                    estimator.height_of(writer, &header, ElementKind::Character, width)?;
                self.draw_cue(writer, cursor, estimator, &header, header_height)?;
                written_on_page = 0;
            }

            if !cursor.fits(height, self.geometry) {
                warn!(
                    page = cursor.page,
                    cue = name,
                    "Dialogue line taller than the page; writing anyway"
                );
                summary.oversize_units += 1;
            }

            let placement = estimator.placement(line.kind, self.geometry.margin_left, width);
            writer.draw_text(
                &line.text,
                placement.x,
                cursor.y,
                &estimator.text_options(placement, Align::Left),
            )?;
            cursor.advance(height);
            written_on_page += 1;
            header_only_page = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportSettings;
    use crate::layout::block::BlockLine;
    use crate::writer::RecordingWriter;

    fn setup(min_block_lines: usize) -> (PageGeometry, LayoutOptions) {
        let settings = ExportSettings {
            min_block_lines,
            page_numbers: false,
            ..ExportSettings::default()
        };
        (
            PageGeometry::from_settings(&settings),
            LayoutOptions::from(&settings),
        )
    }

    fn block(n: usize) -> DialogueBlock {
        DialogueBlock {
            lines: (1..=n)
                .map(|i| BlockLine {
                    kind: ElementKind::Dialogue,
                    text: format!("Line {i}."),
                })
                .collect(),
        }
    }

    /// Cursor with `lines` 12pt lines left before the bottom margin.
    fn cursor_with_room(g: &PageGeometry, lines: usize) -> Cursor {
        Cursor {
            y: g.printable_bottom - 12.0 * lines as f32,
            page: 1,
        }
    }

    // ── decide_cue ───────────────────────────────────────────────────────────

    #[test]
    fn test_cue_breaks_when_minimum_cannot_follow() {
        let (g, o) = setup(2);
        let decider = PageBreakDecider::new(&g, &o);
        let cursor = cursor_with_room(&g, 2);
        assert_eq!(decider.decide_cue(&cursor, 12.0, 24.0), CueDecision::BreakFirst);
        assert_eq!(decider.decide_cue(&cursor, 12.0, 12.0), CueDecision::WriteHere);
    }

    #[test]
    fn test_cue_never_breaks_an_empty_page() {
        let (g, o) = setup(2);
        let decider = PageBreakDecider::new(&g, &o);
        let cursor = Cursor::new(&g);
        assert_eq!(decider.decide_cue(&cursor, 12.0, 10_000.0), CueDecision::WriteHere);
    }

    // ── decide_line ──────────────────────────────────────────────────────────

    #[test]
    fn test_line_break_without_more_below_minimum() {
        let (g, o) = setup(3);
        let decider = PageBreakDecider::new(&g, &o);
        let cursor = cursor_with_room(&g, 0);
        assert_eq!(
            decider.decide_line(&cursor, 12.0, 2, false),
            LineDecision::Break { more: false }
        );
        assert_eq!(
            decider.decide_line(&cursor, 12.0, 3, false),
            LineDecision::Break { more: true }
        );
    }

    #[test]
    fn test_line_written_on_header_only_page() {
        let (g, o) = setup(2);
        let decider = PageBreakDecider::new(&g, &o);
        let cursor = cursor_with_room(&g, 0);
        assert_eq!(decider.decide_line(&cursor, 12.0, 0, true), LineDecision::Write);
    }

    #[test]
    fn test_more_disabled() {
        let settings = ExportSettings {
            show_more: false,
            ..ExportSettings::default()
        };
        let g = PageGeometry::from_settings(&settings);
        let o = LayoutOptions::from(&settings);
        let decider = PageBreakDecider::new(&g, &o);
        let cursor = cursor_with_room(&g, 0);
        assert_eq!(
            decider.decide_line(&cursor, 12.0, 5, false),
            LineDecision::Break { more: false }
        );
    }

    #[test]
    fn test_continuation_name_respects_setting() {
        let (g, o) = setup(2);
        assert_eq!(PageBreakDecider::new(&g, &o).continuation_name("JOHN"), "JOHN (CONT'D)");
        let o = LayoutOptions {
            show_contd: false,
            ..o
        };
        assert_eq!(PageBreakDecider::new(&g, &o).continuation_name("JOHN"), "JOHN");
    }

    // ── write_block ──────────────────────────────────────────────────────────

    #[test]
    fn test_block_moves_whole_when_minimum_does_not_fit() {
        let (g, o) = setup(2);
        let decider = PageBreakDecider::new(&g, &o);
        let est = HeightEstimator::new(&g, 0.0);
        let mut w = RecordingWriter::new();
        let mut cursor = cursor_with_room(&g, 1);
        let mut summary = LayoutSummary::default();

        decider
            .write_block(&mut w, &mut cursor, &est, "JOHN", &block(5), &mut summary)
            .unwrap();

        assert!(w.draws_on_page(1).is_empty());
        let page2: Vec<&str> = w.draws_on_page(2).iter().map(|d| d.text.as_str()).collect();
        assert_eq!(page2, vec!["JOHN", "Line 1.", "Line 2.", "Line 3.", "Line 4.", "Line 5."]);
        assert_eq!(summary.continuations, 0);
    }

    #[test]
    fn test_block_splits_with_more_and_contd() {
        let (g, o) = setup(2);
        let decider = PageBreakDecider::new(&g, &o);
        let est = HeightEstimator::new(&g, 0.0);
        let mut w = RecordingWriter::new();
        // Room for the cue plus three lines.
        let mut cursor = cursor_with_room(&g, 4);
        let mut summary = LayoutSummary::default();

        decider
            .write_block(&mut w, &mut cursor, &est, "JOHN", &block(5), &mut summary)
            .unwrap();

        let page1: Vec<&str> = w.draws_on_page(1).iter().map(|d| d.text.as_str()).collect();
        let page2: Vec<&str> = w.draws_on_page(2).iter().map(|d| d.text.as_str()).collect();
        assert_eq!(page1, vec!["JOHN", "Line 1.", "Line 2.", "Line 3.", "(MORE)"]);
        assert_eq!(page2, vec!["JOHN (CONT'D)", "Line 4.", "Line 5."]);
        assert_eq!(summary.continuations, 1);
        assert_eq!(summary.more_markers, 1);
        for d in w.draws_on_page(1) {
            assert!(d.y + d.height <= g.printable_bottom + 12.0);
        }
    }

    /// Settings whose printable area holds exactly three 12pt rows.
    fn short_page(min_block_lines: usize) -> ExportSettings {
        ExportSettings {
            margin_top_in: 5.0,
            margin_bottom_in: 5.5,
            min_block_lines,
            page_numbers: false,
            ..ExportSettings::default()
        }
    }

    #[test]
    fn test_block_forced_break_below_minimum_skips_more() {
        let settings = short_page(3);
        let g = PageGeometry::from_settings(&settings);
        let o = LayoutOptions::from(&settings);
        let decider = PageBreakDecider::new(&g, &o);
        let est = HeightEstimator::new(&g, 0.0);
        let mut w = RecordingWriter::new();
        let mut cursor = Cursor::new(&g);
        let mut summary = LayoutSummary::default();

        decider
            .write_block(&mut w, &mut cursor, &est, "JOHN", &block(4), &mut summary)
            .unwrap();

        let page1: Vec<&str> = w.draws_on_page(1).iter().map(|d| d.text.as_str()).collect();
        let page2: Vec<&str> = w.draws_on_page(2).iter().map(|d| d.text.as_str()).collect();
        assert_eq!(page1, vec!["JOHN", "Line 1.", "Line 2."]);
        assert_eq!(page2, vec!["JOHN (CONT'D)", "Line 3.", "Line 4."]);
        assert_eq!(summary.more_markers, 0);
    }

    #[test]
    fn test_oversize_line_is_written_not_dropped() {
        let settings = short_page(2);
        let g = PageGeometry::from_settings(&settings);
        let o = LayoutOptions::from(&settings);
        let decider = PageBreakDecider::new(&g, &o);
        let est = HeightEstimator::new(&g, 0.0);
        let mut w = RecordingWriter::new();
        let mut cursor = Cursor::new(&g);
        let mut summary = LayoutSummary::default();
        // Printable height is 36pt; this line wraps to many rows.
        let mut b = block(1);
        b.lines[0].text = "word ".repeat(60).trim_end().to_string();

        decider
            .write_block(&mut w, &mut cursor, &est, "JOHN", &b, &mut summary)
            .unwrap();

        assert_eq!(w.texts().len(), 2);
        assert_eq!(summary.oversize_units, 1);
        assert_eq!(w.page_count(), 1);
    }

    #[test]
    fn test_page_number_stamped_after_break() {
        let settings = ExportSettings::default();
        let g = PageGeometry::from_settings(&settings);
        let o = LayoutOptions::from(&settings);
        let decider = PageBreakDecider::new(&g, &o);
        let est = HeightEstimator::new(&g, 0.0);
        let mut w = RecordingWriter::new();
        let mut cursor = Cursor::new(&g);

        decider.break_page(&mut w, &mut cursor, &est, "test").unwrap();

        let stamp = &w.draws_on_page(2)[0];
        assert_eq!(stamp.text, "2.");
        assert_eq!(stamp.align, Align::Right);
        assert!(stamp.y < g.printable_top);
    }
}
