//! Height estimation against the writer's own measurement.
//!
//! Measuring and drawing both go through `placement`, so the width a line is
//! measured at is always the width it is drawn at.

use crate::errors::WriterError;
use crate::layout::geometry::PageGeometry;
use crate::script::ElementKind;
use crate::writer::{Align, DocumentWriter, TextOptions};

/// Horizontal box an element is drawn into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub x: f32,
    pub width: f32,
}

/// Narrowest box handed to a writer; keeps extreme indents measurable.
const MIN_COLUMN_WIDTH: f32 = 1.0;

pub struct HeightEstimator<'g> {
    geometry: &'g PageGeometry,
    line_gap: f32,
}

impl<'g> HeightEstimator<'g> {
    pub fn new(geometry: &'g PageGeometry, line_gap: f32) -> Self {
        HeightEstimator { geometry, line_gap }
    }

    /// Box for `kind` inside a column starting at `column_x`. Indents scale
    /// with the column so dual columns keep the single-column proportions.
    pub fn placement(&self, kind: ElementKind, column_x: f32, column_width: f32) -> Placement {
        let scale = column_width / self.geometry.printable_width;
        let (left, right) = self.geometry.indents.insets(kind);
        Placement {
            x: column_x + left * scale,
            width: (column_width - (left + right) * scale).max(MIN_COLUMN_WIDTH),
        }
    }

    pub fn text_options(&self, placement: Placement, align: Align) -> TextOptions {
        TextOptions::new(placement.width)
            .align(align)
            .line_gap(self.line_gap)
    }

    /// Rendered height of `text` as `kind` in a column of `column_width`.
    pub fn height_of<W: DocumentWriter + ?Sized>(
        &self,
        writer: &W,
        text: &str,
        kind: ElementKind,
        column_width: f32,
    ) -> Result<f32, WriterError> {
        let placement = self.placement(kind, 0.0, column_width);
        writer.height_of_string(text, &self.text_options(placement, Align::Left))
    }

    /// Summed height of several lines, each measured on its own.
    pub fn height_of_lines<'t, W, I>(
        &self,
        writer: &W,
        lines: I,
        column_width: f32,
    ) -> Result<f32, WriterError>
    where
        W: DocumentWriter + ?Sized,
        I: IntoIterator<Item = (ElementKind, &'t str)>,
    {
        lines.into_iter().try_fold(0.0, |acc, (kind, text)| {
            Ok(acc + self.height_of(writer, text, kind, column_width)?)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExportSettings;
    use crate::writer::RecordingWriter;

    fn geometry() -> PageGeometry {
        PageGeometry::from_settings(&ExportSettings::default())
    }

    #[test]
    fn test_placement_applies_kind_indents() {
        let g = geometry();
        let est = HeightEstimator::new(&g, 0.0);
        let action = est.placement(ElementKind::Action, g.margin_left, g.printable_width);
        let dialogue = est.placement(ElementKind::Dialogue, g.margin_left, g.printable_width);
        let paren = est.placement(ElementKind::Parenthetical, g.margin_left, g.printable_width);
        assert_eq!(action.x, g.margin_left);
        assert_eq!(action.width, g.printable_width);
        assert_eq!(dialogue.x, g.margin_left + 72.0);
        assert_eq!(dialogue.width, g.printable_width - 144.0);
        assert!(paren.width < dialogue.width);
    }

    #[test]
    fn test_dual_column_scales_indents() {
        let g = geometry();
        let est = HeightEstimator::new(&g, 0.0);
        let col = g.dual_column_width();
        let dialogue = est.placement(ElementKind::Dialogue, 0.0, col);
        let scale = col / g.printable_width;
        assert!((dialogue.x - 72.0 * scale).abs() < 1e-3);
        assert!(dialogue.width > 0.0 && dialogue.width < col);
    }

    #[test]
    fn test_narrower_kind_measures_taller() {
        let g = geometry();
        let est = HeightEstimator::new(&g, 0.0);
        let w = RecordingWriter::new();
        // 50 Courier characters: one line of action (60 chars), two of dialogue (40 chars).
        let text = "x".repeat(24) + " " + &"y".repeat(25);
        let action = est.height_of(&w, &text, ElementKind::Action, g.printable_width).unwrap();
        let dialogue = est.height_of(&w, &text, ElementKind::Dialogue, g.printable_width).unwrap();
        assert_eq!(action, 12.0);
        assert_eq!(dialogue, 24.0);
    }

    #[test]
    fn test_height_of_lines_sums_each_line() {
        let g = geometry();
        let est = HeightEstimator::new(&g, 2.0);
        let w = RecordingWriter::new();
        let total = est
            .height_of_lines(
                &w,
                [(ElementKind::Dialogue, "Hi."), (ElementKind::Parenthetical, "(beat)")],
                g.printable_width,
            )
            .unwrap();
        assert_eq!(total, 28.0);
    }
}
