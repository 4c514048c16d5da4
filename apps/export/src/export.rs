//! Export entry point: validate, lay out, finalize.
//!
//! # Flow
//! 1. No source text → `ExportError::NoInput`, before the writer is touched.
//! 2. Settings are validated and frozen into geometry and layout options.
//! 3. The layout pass runs in `spawn_blocking`, owning the writer, and hands
//!    it back with the summary.
//! 4. `finalize` is awaited only after a clean pass. A failed pass drops the
//!    writer, so no output is produced.

use serde::Serialize;
use tracing::{error, info};

use crate::config::ExportSettings;
use crate::errors::{ExportError, WriterError};
use crate::layout::{LayoutOptions, LayoutSummary, Orchestrator, PageGeometry};
use crate::script::FountainClassifier;
use crate::writer::{DocumentWriter, FinalizedDocument};

#[derive(Debug, Clone, Serialize)]
pub struct ExportOutcome {
    pub document: FinalizedDocument,
    pub summary: LayoutSummary,
}

pub async fn export_screenplay<W>(
    source: Option<String>,
    settings: &ExportSettings,
    writer: W,
) -> Result<ExportOutcome, ExportError>
where
    W: DocumentWriter + 'static,
{
    export_screenplay_with(source, settings, move || Ok(writer)).await
}

/// Like [`export_screenplay`], but the writer is built only after the input
/// and settings checks pass. A failing factory is `ExportError::WriterInit`.
pub async fn export_screenplay_with<W, F>(
    source: Option<String>,
    settings: &ExportSettings,
    make_writer: F,
) -> Result<ExportOutcome, ExportError>
where
    W: DocumentWriter + 'static,
    F: FnOnce() -> Result<W, WriterError>,
{
    let text = source.ok_or(ExportError::NoInput)?;
    settings.validate()?;
    let writer = make_writer().map_err(ExportError::WriterInit)?;

    let geometry = PageGeometry::from_settings(settings);
    let options = LayoutOptions::from(settings);
    info!(
        lines = text.lines().count(),
        page_size = ?settings.page_size,
        font = %options.font_path,
        "Starting screenplay export"
    );

    // CPU-bound pass: spawn_blocking keeps the async executor free.
    let (mut writer, summary) = tokio::task::spawn_blocking(move || {
        let mut writer = writer;
        let summary = Orchestrator::new(&geometry, &options, &FountainClassifier)
            .run(&text, &mut writer)?;
        Ok::<_, ExportError>((writer, summary))
    })
    .await
    .map_err(|e| {
        ExportError::Internal(anyhow::anyhow!("spawn_blocking failed in layout pass: {e}"))
    })??;

    let document = writer.finalize().await.map_err(ExportError::Finalize)?;
    info!(
        location = %document.location,
        pages = summary.pages,
        scenes = summary.scenes,
        dual_pairs = summary.dual_pairs,
        continuations = summary.continuations,
        "Screenplay export complete"
    );

    Ok(ExportOutcome { document, summary })
}

/// Same as [`export_screenplay`], for callers that only need a success
/// signal. Failures are logged with their code.
pub async fn export_or_none<W>(
    source: Option<String>,
    settings: &ExportSettings,
    writer: W,
) -> Option<ExportOutcome>
where
    W: DocumentWriter + 'static,
{
    export_or_none_with(source, settings, move || Ok(writer)).await
}

/// Same as [`export_screenplay_with`], logging failures with their code.
pub async fn export_or_none_with<W, F>(
    source: Option<String>,
    settings: &ExportSettings,
    make_writer: F,
) -> Option<ExportOutcome>
where
    W: DocumentWriter + 'static,
    F: FnOnce() -> Result<W, WriterError>,
{
    match export_screenplay_with(source, settings, make_writer).await {
        Ok(outcome) => Some(outcome),
        Err(e) => {
            error!(code = e.code(), "Screenplay export failed: {e}");
            None
        }
    }
}
