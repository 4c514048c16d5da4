//! Single forward pagination pass over a screenplay.
//!
//! The pass owns the cursor and the scene counter, visits every body line
//! exactly once (dialogue blocks and dual pairs advance the index past the
//! lines they absorb) and re-classifies each line when it is reached.

use serde::Serialize;
use tracing::{debug, warn};

use crate::errors::{LayoutError, WriterError};
use crate::layout::block::BlockCollector;
use crate::layout::dual::{self, CueLayout, DualDialogueLayout};
use crate::layout::geometry::{Cursor, LayoutOptions, PageGeometry};
use crate::layout::height::HeightEstimator;
use crate::layout::page_break::PageBreakDecider;
use crate::layout::scene_numbers::SceneNumberer;
use crate::script::{parse_title_page, ElementKind, LineClassifier, TitleMetadata};
use crate::writer::{Align, DocumentWriter, TextOptions};

/// Drawn for every blank source line so vertical spacing survives.
pub const BLANK_PLACEHOLDER: &str = " ";

/// Counters reported after a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LayoutSummary {
    /// Physical pages, title page included.
    pub pages: usize,
    pub scenes: u32,
    pub dialogue_blocks: usize,
    pub dual_pairs: usize,
    /// Page breaks inside a dialogue block or before a moved dual pair.
    pub continuations: usize,
    pub more_markers: usize,
    /// Units taller than a whole page, written past the bottom margin.
    pub oversize_units: usize,
    pub title_page: bool,
}

fn failed_at(line: usize) -> impl Fn(WriterError) -> LayoutError {
    move |source| LayoutError::Writer { line, source }
}

pub struct Orchestrator<'a, C: LineClassifier + ?Sized> {
    geometry: &'a PageGeometry,
    options: &'a LayoutOptions,
    classifier: &'a C,
}

impl<'a, C: LineClassifier + ?Sized> Orchestrator<'a, C> {
    pub fn new(geometry: &'a PageGeometry, options: &'a LayoutOptions, classifier: &'a C) -> Self {
        Orchestrator {
            geometry,
            options,
            classifier,
        }
    }

    /// Lays out `text` onto `writer`. The caller finalizes the writer.
    pub fn run<W: DocumentWriter + ?Sized>(
        &self,
        text: &str,
        writer: &mut W,
    ) -> Result<LayoutSummary, LayoutError> {
        writer
            .font(&self.options.font_path)
            .map_err(LayoutError::Setup)?;
        writer
            .font_size(self.options.font_size)
            .map_err(LayoutError::Setup)?;

        let lines: Vec<&str> = text.lines().collect();
        let title = parse_title_page(&lines);
        let mut summary = LayoutSummary::default();

        if title.is_present() {
            self.render_title_page(writer, &title.metadata)
                .and_then(|()| writer.new_page())
                .map_err(failed_at(1))?;
            summary.title_page = true;
            debug!(entries = title.metadata.entries.len(), "Title page rendered");
        }

        let cursor =
            self.layout_body(writer, &lines[title.consumed..], title.consumed, &mut summary)?;
        summary.pages = cursor.page + usize::from(summary.title_page);
        debug!(?summary, "Layout pass complete");
        Ok(summary)
    }

    // ── title page ──────────────────────────────────────────────────────────

    fn render_title_page<W: DocumentWriter + ?Sized>(
        &self,
        writer: &mut W,
        metadata: &TitleMetadata,
    ) -> Result<(), WriterError> {
        let g = self.geometry;
        let centered = TextOptions::new(g.printable_width)
            .align(Align::Center)
            .line_gap(self.options.line_gap);
        let spacer = writer.height_of_string(BLANK_PLACEHOLDER, &centered)?;

        let mut y = g.page_height / 3.0;
        let stack = [
            metadata.title(),
            metadata.credit(),
            metadata.author(),
            metadata.source(),
        ];
        for value in stack.into_iter().flatten().filter(|v| !v.is_empty()) {
            writer.draw_text(value, g.margin_left, y, &centered)?;
            y += writer.height_of_string(value, &centered)? + spacer;
        }

        let half = (g.printable_width / 2.0).max(1.0);
        if let Some(contact) = metadata.contact().filter(|v| !v.is_empty()) {
            let opts = TextOptions::new(half).line_gap(self.options.line_gap);
            let height = writer.height_of_string(contact, &opts)?;
            writer.draw_text(contact, g.margin_left, g.printable_bottom - height, &opts)?;
        }
        if let Some(date) = metadata.draft_date().filter(|v| !v.is_empty()) {
            let opts = TextOptions::new(half)
                .align(Align::Right)
                .line_gap(self.options.line_gap);
            let height = writer.height_of_string(date, &opts)?;
            writer.draw_text(date, g.margin_left + half, g.printable_bottom - height, &opts)?;
        }
        Ok(())
    }

    // ── body ────────────────────────────────────────────────────────────────

    fn layout_body<W: DocumentWriter + ?Sized>(
        &self,
        writer: &mut W,
        body: &[&str],
        offset: usize,
        summary: &mut LayoutSummary,
    ) -> Result<Cursor, LayoutError> {
        let estimator = HeightEstimator::new(self.geometry, self.options.line_gap);
        let decider = PageBreakDecider::new(self.geometry, self.options);
        let dual_layout = DualDialogueLayout::new(self.geometry, self.options);
        let collector = BlockCollector::new(self.classifier);
        let mut scenes = SceneNumberer::new();
        let mut cursor = Cursor::new(self.geometry);

        let mut idx = 0;
        while idx < body.len() {
            let at = failed_at(offset + idx + 1);

            if body[idx].trim().is_empty() {
                self.write_unit(
                    writer,
                    &mut cursor,
                    &estimator,
                    &decider,
                    ElementKind::Action,
                    BLANK_PLACEHOLDER,
                    Align::Left,
                    summary,
                )
                .map_err(&at)?;
                idx += 1;
                continue;
            }

            let element = self.classifier.classify(body, idx);
            match element.kind() {
                ElementKind::Scene => {
                    let number = scenes.next();
                    let heading =
                        SceneNumberer::heading_text(&element.display_text(), number, self.options);
                    self.write_heading(
                        writer,
                        &mut cursor,
                        &estimator,
                        &decider,
                        &heading,
                        number,
                        summary,
                    )
                    .map_err(&at)?;
                    idx += 1;
                }
                ElementKind::Character => {
                    let layout = dual::detect(&collector, self.classifier, body, idx);
                    let next = layout.next_index();
                    match layout {
                        CueLayout::Single { name, collected } => {
                            decider
                                .write_block(
                                    writer,
                                    &mut cursor,
                                    &estimator,
                                    &name,
                                    &collected.block,
                                    summary,
                                )
                                .map_err(&at)?;
                            summary.dialogue_blocks += 1;
                        }
                        CueLayout::Dual { pair, .. } => {
                            dual_layout
                                .write(writer, &mut cursor, &estimator, &decider, &pair, summary)
                                .map_err(&at)?;
                        }
                    }
                    idx = next;
                }
                ElementKind::Transition => {
                    self.write_unit(
                        writer,
                        &mut cursor,
                        &estimator,
                        &decider,
                        ElementKind::Transition,
                        &element.display_text(),
                        Align::Right,
                        summary,
                    )
                    .map_err(&at)?;
                    idx += 1;
                }
                kind @ (ElementKind::Dialogue
                | ElementKind::Parenthetical
                | ElementKind::Lyrics) => {
                    self.write_unit(
                        writer,
                        &mut cursor,
                        &estimator,
                        &decider,
                        kind,
                        &element.display_text(),
                        Align::Left,
                        summary,
                    )
                    .map_err(&at)?;
                    idx += 1;
                }
                ElementKind::Action | ElementKind::Unknown => {
                    self.write_unit(
                        writer,
                        &mut cursor,
                        &estimator,
                        &decider,
                        ElementKind::Action,
                        &element.display_text(),
                        Align::Left,
                        summary,
                    )
                    .map_err(&at)?;
                    idx += 1;
                }
            }
        }

        summary.scenes = scenes.count();
        Ok(cursor)
    }

    /// Writes one unbreakable unit after a single fit check.
    #[allow(clippy::too_many_arguments)]
    fn write_unit<W: DocumentWriter + ?Sized>(
        &self,
        writer: &mut W,
        cursor: &mut Cursor,
        estimator: &HeightEstimator<'_>,
        decider: &PageBreakDecider<'_>,
        kind: ElementKind,
        text: &str,
        align: Align,
        summary: &mut LayoutSummary,
    ) -> Result<(), WriterError> {
        let g = self.geometry;
        let height = estimator.height_of(writer, text, kind, g.printable_width)?;
        if decider.make_room(writer, cursor, estimator, height, "unit does not fit")? {
            warn!(page = cursor.page, ?kind, "Element taller than the page; writing anyway");
            summary.oversize_units += 1;
        }
        let placement = estimator.placement(kind, g.margin_left, g.printable_width);
        writer.draw_text(text, placement.x, cursor.y, &estimator.text_options(placement, align))?;
        cursor.advance(height);
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn write_heading<W: DocumentWriter + ?Sized>(
        &self,
        writer: &mut W,
        cursor: &mut Cursor,
        estimator: &HeightEstimator<'_>,
        decider: &PageBreakDecider<'_>,
        heading: &str,
        number: u32,
        summary: &mut LayoutSummary,
    ) -> Result<(), WriterError> {
        let height = estimator.height_of(
            writer,
            heading,
            ElementKind::Scene,
            self.geometry.printable_width,
        )?;
        if decider.make_room(writer, cursor, estimator, height, "scene heading does not fit")? {
            warn!(
                page = cursor.page,
                scene = number,
                "Scene heading taller than the page; writing anyway"
            );
            summary.oversize_units += 1;
        }
        SceneNumberer::draw_heading(
            writer,
            cursor,
            self.geometry,
            estimator,
            self.options,
            heading,
            number,
            height,
        )
    }
}
