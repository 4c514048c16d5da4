// Pagination engine: one forward pass that places script elements on pages.
// Measurement always goes through the writer; the pass itself is CPU-bound and
// must run inside tokio::task::spawn_blocking when called from async code.

pub mod block;
pub mod dual;
pub mod font_metrics;
pub mod geometry;
pub mod height;
pub mod orchestrator;
pub mod page_break;
pub mod scene_numbers;

// Re-export the public API consumed by the export entry point.
pub use geometry::{Cursor, LayoutOptions, PageGeometry};
pub use orchestrator::{LayoutSummary, Orchestrator};
