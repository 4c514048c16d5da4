//! Screenplay pagination engine.
//!
//! Turns Fountain-style plain text into positioned, paginated output through a
//! single forward layout pass:
//! - `script`: line classification and title page detection
//! - `layout`: geometry, height estimation, page breaks, dual dialogue, scene
//!   numbers and the orchestrating pass
//! - `writer`: the `DocumentWriter` capability and the bundled writers
//! - `export`: async entry point that validates, lays out and finalizes

pub mod config;
pub mod errors;
pub mod export;
pub mod layout;
pub mod script;
pub mod writer;

pub use config::{Config, ExportSettings};
pub use errors::{ExportError, LayoutError, WriterError};
pub use export::{
    export_or_none, export_or_none_with, export_screenplay, export_screenplay_with, ExportOutcome,
};
