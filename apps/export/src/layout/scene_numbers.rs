//! Scene numbering and heading placement.

use crate::config::{SceneNumberPosition, SceneNumberStyle};
use crate::errors::WriterError;
use crate::layout::geometry::{Cursor, LayoutOptions, PageGeometry};
use crate::layout::height::HeightEstimator;
use crate::script::ElementKind;
use crate::writer::{Align, DocumentWriter, TextOptions};

/// Space between a margin label and the printable area.
const MARGIN_LABEL_GAP: f32 = 18.0;

/// Monotonic scene counter. Counts every heading whether or not numbers are
/// printed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SceneNumberer {
    last: u32,
}

impl SceneNumberer {
    pub fn new() -> Self {
        SceneNumberer::default()
    }

    pub fn next(&mut self) -> u32 {
        self.last += 1;
        self.last
    }

    /// Scenes counted so far.
    pub fn count(&self) -> u32 {
        self.last
    }

    pub fn label(number: u32, style: SceneNumberStyle) -> String {
        match style {
            SceneNumberStyle::Plain => number.to_string(),
            SceneNumberStyle::Parentheses => format!("({number})"),
        }
    }

    /// Heading text as drawn in the printable column.
    pub fn heading_text(heading: &str, number: u32, options: &LayoutOptions) -> String {
        if options.scene_numbers && options.scene_number_position == SceneNumberPosition::Inline {
            format!("{heading} {}", Self::label(number, options.scene_number_style))
        } else {
            heading.to_string()
        }
    }

    /// Draws the heading at the cursor and, in margin mode, the label in both
    /// margins at the same Y. Advances the cursor by `height`.
    #[allow(clippy::too_many_arguments)]
    pub fn draw_heading<W: DocumentWriter + ?Sized>(
        writer: &mut W,
        cursor: &mut Cursor,
        geometry: &PageGeometry,
        estimator: &HeightEstimator<'_>,
        options: &LayoutOptions,
        text: &str,
        number: u32,
        height: f32,
    ) -> Result<(), WriterError> {
        let placement =
            estimator.placement(ElementKind::Scene, geometry.margin_left, geometry.printable_width);
        writer.draw_text(
            text,
            placement.x,
            cursor.y,
            &estimator.text_options(placement, Align::Left),
        )?;

        if options.scene_numbers && options.scene_number_position == SceneNumberPosition::Margin {
            let label = Self::label(number, options.scene_number_style);
            let left = TextOptions::new((geometry.margin_left - MARGIN_LABEL_GAP).max(1.0))
                .align(Align::Right)
                .line_gap(options.line_gap);
            writer.draw_text(&label, 0.0, cursor.y, &left)?;

            let right = TextOptions::new((geometry.margin_right - MARGIN_LABEL_GAP).max(1.0))
                .align(Align::Left)
                .line_gap(options.line_gap);
            let right_x = geometry.page_width - geometry.margin_right + MARGIN_LABEL_GAP;
            writer.draw_text(&label, right_x, cursor.y, &right)?;
        }

        cursor.advance(height);
        Ok(())
    }
}
