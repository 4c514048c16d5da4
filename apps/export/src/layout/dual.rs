//! Dual dialogue: two speakers side by side, sharing a top Y.

use tracing::{debug, warn};

use crate::errors::WriterError;
use crate::layout::block::{BlockCollector, Collected, DialogueBlock};
use crate::layout::geometry::{Cursor, LayoutOptions, PageGeometry};
use crate::layout::height::HeightEstimator;
use crate::layout::orchestrator::LayoutSummary;
use crate::layout::page_break::PageBreakDecider;
use crate::script::{CharacterCue, Element, ElementKind, LineClassifier};
use crate::writer::{Align, DocumentWriter};

/// One speaker of a dual pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Side {
    pub name: String,
    pub block: DialogueBlock,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DualPair {
    pub left: Side,
    /// `None` when a caret cue has no partner; laid out as a lone left column.
    pub right: Option<Side>,
}

/// How a character cue at a given index is laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CueLayout {
    Single { name: String, collected: Collected },
    Dual { pair: DualPair, next_index: usize },
}

impl CueLayout {
    pub fn next_index(&self) -> usize {
        match self {
            CueLayout::Single { collected, .. } => collected.next_index,
            CueLayout::Dual { next_index, .. } => *next_index,
        }
    }
}

/// Inspects the cue at `idx` and the next cue after its block. A caret on
/// either cue makes a pair; blank lines between the halves belong to it.
pub fn detect<C: LineClassifier + ?Sized>(
    collector: &BlockCollector<'_, C>,
    classifier: &C,
    lines: &[&str],
    idx: usize,
) -> CueLayout {
    let left_cue = CharacterCue::parse(lines[idx]);
    let left = collector.collect(lines, idx + 1);

    let mut next_cue = left.next_index;
    while next_cue < lines.len() && lines[next_cue].trim().is_empty() {
        next_cue += 1;
    }
    let right_cue = (next_cue < lines.len())
        .then(|| classifier.classify(lines, next_cue))
        .and_then(|element| match element {
            Element::Character(raw) => Some(CharacterCue::parse(&raw)),
            _ => None,
        });

    match right_cue {
        Some(right_cue) if left_cue.dual || right_cue.dual => {
            let right = collector.collect(lines, next_cue + 1);
            CueLayout::Dual {
                pair: DualPair {
                    left: Side {
                        name: left_cue.name,
                        block: left.block,
                    },
                    right: Some(Side {
                        name: right_cue.name,
                        block: right.block,
                    }),
                },
                next_index: right.next_index,
            }
        }
        _ if left_cue.dual => CueLayout::Dual {
            pair: DualPair {
                left: Side {
                    name: left_cue.name,
                    block: left.block,
                },
                right: None,
            },
            next_index: left.next_index,
        },
        _ => CueLayout::Single {
            name: left_cue.name,
            collected: left,
        },
    }
}

pub struct DualDialogueLayout<'a> {
    geometry: &'a PageGeometry,
    options: &'a LayoutOptions,
}

impl<'a> DualDialogueLayout<'a> {
    pub fn new(geometry: &'a PageGeometry, options: &'a LayoutOptions) -> Self {
        DualDialogueLayout { geometry, options }
    }

    fn column_x(&self) -> (f32, f32) {
        let left = self.geometry.margin_left;
        let right = left + self.geometry.dual_column_width() + self.geometry.dual_gutter;
        (left, right)
    }

    fn side_height<W: DocumentWriter + ?Sized>(
        &self,
        writer: &W,
        estimator: &HeightEstimator<'_>,
        name: &str,
        block: &DialogueBlock,
    ) -> Result<f32, WriterError> {
        let width = self.geometry.dual_column_width();
        let header = estimator.height_of(writer, name, ElementKind::Character, width)?;
        let body = estimator.height_of_lines(
            writer,
            block.lines.iter().map(|l| (l.kind, l.text.as_str())),
            width,
        )?;
        Ok(header + body)
    }

    fn draw_side<W: DocumentWriter + ?Sized>(
        &self,
        writer: &mut W,
        estimator: &HeightEstimator<'_>,
        column_x: f32,
        top: f32,
        name: &str,
        block: &DialogueBlock,
    ) -> Result<(), WriterError> {
        let width = self.geometry.dual_column_width();
        let mut y = top;
        let rows = std::iter::once((ElementKind::Character, name))
            .chain(block.lines.iter().map(|l| (l.kind, l.text.as_str())));
        for (kind, text) in rows {
            let placement = estimator.placement(kind, column_x, width);
            let opts = estimator.text_options(placement, Align::Left);
            writer.draw_text(text, placement.x, y, &opts)?;
            y += writer.height_of_string(text, &opts)?;
        }
        Ok(())
    }

    /// Writes both columns from the same Y and advances the cursor by the
    /// taller one. A pair that does not fit moves whole to the next page.
    pub fn write<W: DocumentWriter + ?Sized>(
        &self,
        writer: &mut W,
        cursor: &mut Cursor,
        estimator: &HeightEstimator<'_>,
        decider: &PageBreakDecider<'_>,
        pair: &DualPair,
        summary: &mut LayoutSummary,
    ) -> Result<(), WriterError> {
        let mut left_name = pair.left.name.clone();
        let mut right_name = pair.right.as_ref().map(|side| side.name.clone());

        let mut needed = self.needed(writer, estimator, pair, &left_name, right_name.as_deref())?;

        if !cursor.fits(needed, self.geometry) && !cursor.is_at_top(self.geometry) {
            if self.options.show_more {
                decider.draw_more(
                    writer,
                    cursor,
                    estimator,
                    self.geometry.margin_left,
                    self.geometry.dual_column_width(),
                )?;
                summary.more_markers += 1;
            }
            decider.break_page(writer, cursor, estimator, "dual dialogue does not fit")?;
            summary.continuations += 1;

            left_name = decider.continuation_name(&pair.left.name);
            right_name = pair
                .right
                .as_ref()
                .map(|side| decider.continuation_name(&side.name));
            needed = self.needed(writer, estimator, pair, &left_name, right_name.as_deref())?;
        }

        if !cursor.fits(needed, self.geometry) {
            warn!(
                page = cursor.page,
                cue = %pair.left.name,
                "Dual dialogue taller than the page; writing anyway"
            );
            summary.oversize_units += 1;
        }

        let (left_x, right_x) = self.column_x();
        let top = cursor.y;
        self.draw_side(writer, estimator, left_x, top, &left_name, &pair.left.block)?;
        if let (Some(side), Some(name)) = (&pair.right, &right_name) {
            self.draw_side(writer, estimator, right_x, top, name, &side.block)?;
        }
        debug!(page = cursor.page, y = top, height = needed, "Dual dialogue placed");

        cursor.advance(needed);
        summary.dual_pairs += 1;
        Ok(())
    }

    fn needed<W: DocumentWriter + ?Sized>(
        &self,
        writer: &W,
        estimator: &HeightEstimator<'_>,
        pair: &DualPair,
        left_name: &str,
        right_name: Option<&str>,
    ) -> Result<f32, WriterError> {
        let left = self.side_height(writer, estimator, left_name, &pair.left.block)?;
        let right = match (&pair.right, right_name) {
            (Some(side), Some(name)) => self.side_height(writer, estimator, name, &side.block)?,
            _ => 0.0,
        };
        Ok(left.max(right))
    }
}
