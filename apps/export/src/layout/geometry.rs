//! Page geometry, per-export layout options, and the running write cursor.

use serde::{Deserialize, Serialize};

use crate::config::{ExportSettings, SceneNumberPosition, SceneNumberStyle};
use crate::script::ElementKind;

pub const POINTS_PER_INCH: f32 = 72.0;

/// Slack allowed when comparing the cursor with the bottom margin.
const EPSILON: f32 = 0.01;

fn inches(value: f32) -> f32 {
    value * POINTS_PER_INCH
}

// ────────────────────────────────────────────────────────────────────────────
// Geometry
// ────────────────────────────────────────────────────────────────────────────

/// Element indentation in points, relative to the printable area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Indents {
    pub character: f32,
    pub dialogue: f32,
    pub parenthetical: f32,
}

impl Indents {
    /// `(left, right)` insets for an element kind at full printable width.
    /// Parentheticals nest inside the dialogue column.
    pub fn insets(&self, kind: ElementKind) -> (f32, f32) {
        match kind {
            ElementKind::Character => (self.character, self.dialogue),
            ElementKind::Dialogue | ElementKind::Lyrics => (self.dialogue, self.dialogue),
            ElementKind::Parenthetical => {
                let inset = self.dialogue + self.parenthetical;
                (inset, inset)
            }
            ElementKind::Scene
            | ElementKind::Action
            | ElementKind::Transition
            | ElementKind::Unknown => (0.0, 0.0),
        }
    }
}

/// Immutable page measurements for one export, in points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    pub printable_width: f32,
    pub printable_top: f32,
    pub printable_bottom: f32,
    pub indents: Indents,
    pub dual_gutter: f32,
}

impl PageGeometry {
    pub fn from_settings(settings: &ExportSettings) -> Self {
        let (page_width, page_height) = settings.page_size.dimensions();
        let margin_top = inches(settings.margin_top_in);
        let margin_bottom = inches(settings.margin_bottom_in);
        let margin_left = inches(settings.margin_left_in);
        let margin_right = inches(settings.margin_right_in);

        PageGeometry {
            page_width,
            page_height,
            margin_top,
            margin_bottom,
            margin_left,
            margin_right,
            printable_width: page_width - margin_left - margin_right,
            printable_top: margin_top,
            printable_bottom: page_height - margin_bottom,
            indents: Indents {
                character: inches(settings.indent_character_in),
                dialogue: inches(settings.indent_dialogue_in),
                parenthetical: inches(settings.indent_parenthetical_in),
            },
            dual_gutter: inches(settings.dual_gutter_in),
        }
    }

    /// Width of one dual dialogue column.
    pub fn dual_column_width(&self) -> f32 {
        (self.printable_width - self.dual_gutter) / 2.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Layout options
// ────────────────────────────────────────────────────────────────────────────

/// Behavioral switches for one pass, fixed before the first line is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutOptions {
    pub font_path: String,
    pub font_size: f32,
    pub line_gap: f32,
    pub min_block_lines: usize,
    pub show_more: bool,
    pub show_contd: bool,
    pub scene_numbers: bool,
    pub scene_number_position: SceneNumberPosition,
    pub scene_number_style: SceneNumberStyle,
    pub page_numbers: bool,
}

impl From<&ExportSettings> for LayoutOptions {
    fn from(settings: &ExportSettings) -> Self {
        LayoutOptions {
            font_path: settings.font_path.clone(),
            font_size: settings.font_size,
            line_gap: settings.line_gap,
            min_block_lines: settings.min_block_lines.max(1),
            show_more: settings.show_more,
            show_contd: settings.show_contd,
            scene_numbers: settings.scene_numbers,
            scene_number_position: settings.scene_number_position,
            scene_number_style: settings.scene_number_style,
            page_numbers: settings.page_numbers,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Cursor
// ────────────────────────────────────────────────────────────────────────────

/// Vertical write position on the current body page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cursor {
    pub y: f32,
    /// 1-based body page number.
    pub page: usize,
}

impl Cursor {
    pub fn new(geometry: &PageGeometry) -> Self {
        Cursor {
            y: geometry.printable_top,
            page: 1,
        }
    }

    /// Whether `height` fits between the cursor and the printable bottom.
    pub fn fits(&self, height: f32, geometry: &PageGeometry) -> bool {
        self.y + height <= geometry.printable_bottom + EPSILON
    }

    /// True when nothing has been written on the current page yet.
    pub fn is_at_top(&self, geometry: &PageGeometry) -> bool {
        (self.y - geometry.printable_top).abs() < EPSILON
    }

    pub fn advance(&mut self, height: f32) {
        self.y += height;
    }

    pub fn next_page(&mut self, geometry: &PageGeometry) {
        self.page += 1;
        self.y = geometry.printable_top;
    }
}
