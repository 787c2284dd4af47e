use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs;
use tokio::process::Command;
use uuid::Uuid;

use super::PdfError;
use crate::core::config::Settings;

#[async_trait]
pub(crate) trait PdfRenderer: Send + Sync {
    /// Prints `html` to a PDF file at `output`.
    async fn render(&self, html: &str, output: &Path) -> Result<(), PdfError>;
}

/// Drives a headless Chromium binary with `--print-to-pdf`.
#[derive(Debug, Clone)]
pub(crate) struct ChromiumRenderer {
    binary: String,
    timeout: Duration,
    work_dir: PathBuf,
}

impl ChromiumRenderer {
    pub(crate) fn from_settings(settings: &Settings) -> Self {
        Self {
            binary: settings.pdf().chromium_binary.clone(),
            timeout: Duration::from_secs(settings.pdf().render_timeout_seconds),
            work_dir: std::env::temp_dir(),
        }
    }

    fn command(&self, html_path: &Path, output: &Path) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-sandbox")
            .arg("--no-pdf-header-footer")
            .arg(format!("--print-to-pdf={}", output.display()))
            .arg(format!("file://{}", html_path.display()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    async fn run(&self, html_path: &Path, output: &Path) -> Result<(), PdfError> {
        let child = self.command(html_path, output).spawn().map_err(PdfError::Spawn)?;

        let result = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| PdfError::Timeout(self.timeout.as_secs()))?
            .map_err(PdfError::Spawn)?;

        if !result.status.success() {
            return Err(PdfError::Exit {
                status: result.status.code(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        match fs::metadata(output).await {
            Ok(metadata) if metadata.len() > 0 => Ok(()),
            _ => Err(PdfError::MissingOutput),
        }
    }
}

#[async_trait]
impl PdfRenderer for ChromiumRenderer {
    async fn render(&self, html: &str, output: &Path) -> Result<(), PdfError> {
        let html_path = self.work_dir.join(format!("exam-paper-{}.html", Uuid::new_v4()));
        fs::write(&html_path, html).await.map_err(PdfError::WriteHtml)?;

        let result = self.run(&html_path, output).await;

        if let Err(err) = fs::remove_file(&html_path).await {
            tracing::warn!(error = %err, path = %html_path.display(), "Failed to remove paper html");
        }

        if result.is_err() {
            let _ = fs::remove_file(output).await;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer(binary: &str) -> ChromiumRenderer {
        let work_dir = std::env::temp_dir().join(format!("exam-render-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&work_dir).expect("work dir");
        ChromiumRenderer { binary: binary.to_string(), timeout: Duration::from_secs(5), work_dir }
    }

    fn is_empty(dir: &Path) -> bool {
        std::fs::read_dir(dir).map(|mut entries| entries.next().is_none()).unwrap_or(false)
    }

    #[tokio::test]
    async fn missing_binary_is_a_spawn_error() {
        let renderer = renderer("/nonexistent/chromium-binary");
        let output = renderer.work_dir.join("out.pdf");

        let result = renderer.render("<p>x</p>", &output).await;

        assert!(matches!(result, Err(PdfError::Spawn(_))));
        assert!(is_empty(&renderer.work_dir));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn failing_binary_reports_exit_and_removes_html() {
        let renderer = renderer("false");
        let output = renderer.work_dir.join("out.pdf");

        let result = renderer.render("<p>x</p>", &output).await;

        assert!(matches!(result, Err(PdfError::Exit { .. })));
        assert!(is_empty(&renderer.work_dir));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn succeeding_binary_without_output_is_missing_output() {
        let renderer = renderer("true");
        let output = renderer.work_dir.join("out.pdf");

        let result = renderer.render("<p>x</p>", &output).await;

        assert!(matches!(result, Err(PdfError::MissingOutput)));
    }
}
