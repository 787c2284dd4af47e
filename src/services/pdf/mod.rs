//! Question paper generation: selected questions are laid out as HTML and
//! printed to PDF by a [`PdfRenderer`].

mod naming;
mod renderer;
mod template;

use std::path::Path;
use std::time::Instant;

use thiserror::Error;

use crate::core::metrics::{PDF_RENDER_DURATION, PDF_RENDER_TOTAL};

pub(crate) use naming::{normalize_rename_target, paper_file_name};
pub(crate) use renderer::{ChromiumRenderer, PdfRenderer};
pub(crate) use template::{render_paper, DiagramImage, PaperDocument};

#[derive(Debug, Error)]
pub(crate) enum PdfError {
    #[error("failed to write paper html: {0}")]
    WriteHtml(#[source] std::io::Error),
    #[error("failed to start renderer: {0}")]
    Spawn(#[source] std::io::Error),
    #[error("renderer exited with status {status:?}: {stderr}")]
    Exit { status: Option<i32>, stderr: String },
    #[error("renderer timed out after {0}s")]
    Timeout(u64),
    #[error("renderer produced no output file")]
    MissingOutput,
}

/// Renders `html` into `output`, recording outcome and latency.
pub(crate) async fn render_to_file(
    renderer: &dyn PdfRenderer,
    html: &str,
    output: &Path,
) -> Result<(), PdfError> {
    let started = Instant::now();
    let result = renderer.render(html, output).await;

    let outcome = match &result {
        Ok(()) => "success",
        Err(PdfError::Timeout(_)) => "timeout",
        Err(_) => "failure",
    };
    metrics::counter!(PDF_RENDER_TOTAL, "outcome" => outcome).increment(1);
    metrics::histogram!(PDF_RENDER_DURATION).record(started.elapsed().as_secs_f64());

    result
}
