use thiserror::Error;

/// Failures raised by a `DocumentWriter` backend.
#[derive(Debug, Error)]
pub enum WriterError {
    #[error("Font unavailable: {0}")]
    FontUnavailable(String),

    #[error("Invalid font size: {0}")]
    InvalidFontSize(f32),

    #[error("Destination not writable: {0}")]
    Destination(String),

    #[error("Measurement failed: {0}")]
    Measure(String),

    #[error("Draw failed: {0}")]
    Draw(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failures raised during the pagination pass.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The writer rejected the typography set up before the first draw.
    #[error("Writer setup failed: {0}")]
    Setup(#[source] WriterError),

    /// A measure or draw call failed mid-pass. The pass is abandoned.
    #[error("Writer failed at line {line}: {source}")]
    Writer {
        line: usize,
        #[source]
        source: WriterError,
    },
}

/// Export-level error type returned by `export_screenplay`.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("No input document available")]
    NoInput,

    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Writer initialization failed: {0}")]
    WriterInit(#[source] WriterError),

    #[error("Layout failed: {0}")]
    Layout(#[source] LayoutError),

    #[error("Finalize failed: {0}")]
    Finalize(#[source] WriterError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LayoutError> for ExportError {
    fn from(err: LayoutError) -> Self {
        match err {
            LayoutError::Setup(source) => ExportError::WriterInit(source),
            other => ExportError::Layout(other),
        }
    }
}

impl ExportError {
    /// Short machine-readable code, mirrored in the failure notification.
    pub fn code(&self) -> &'static str {
        match self {
            ExportError::NoInput => "NO_INPUT",
            ExportError::InvalidSettings(_) => "INVALID_SETTINGS",
            ExportError::WriterInit(_) => "WRITER_INIT",
            ExportError::Layout(_) => "LAYOUT_FAILED",
            ExportError::Finalize(_) => "FINALIZE_FAILED",
            ExportError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_failure_maps_to_writer_init() {
        let err: ExportError =
            LayoutError::Setup(WriterError::FontUnavailable("Nope.ttf".into())).into();
        assert!(matches!(err, ExportError::WriterInit(_)));
        assert_eq!(err.code(), "WRITER_INIT");
    }

    #[test]
    fn test_mid_pass_failure_maps_to_layout() {
        let err: ExportError = LayoutError::Writer {
            line: 7,
            source: WriterError::Draw("backend gone".into()),
        }
        .into();
        assert!(matches!(err, ExportError::Layout(_)));
        assert!(err.to_string().contains("line 7"));
    }
}
