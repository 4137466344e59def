//! External rendering collaborator.
//!
//! The HTML→PDF engine is not part of this workspace; it is consumed as
//! a pure function behind [`Renderer`]. The default implementation
//! shells out to a command with a weasyprint-compatible argument shape.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, info};
use url::Url;

use docbinder_shared::{DocbinderError, Result};

/// Interface to the fixed-layout rendering engine.
///
/// `render` consumes a composite document already written to disk and a
/// base URL for resolving any remaining relative references, and
/// produces the rendered artifact's path.
pub trait Renderer: Send + Sync {
    fn render(&self, html_path: &Path, base_url: &Url) -> Result<PathBuf>;
}

/// Renderer that invokes an external command:
/// `<command> <input.html> <output.pdf> --base-url <url>`.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    command: String,
}

impl CommandRenderer {
    /// Create a renderer around the given command (e.g. `weasyprint`).
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }
}

impl Renderer for CommandRenderer {
    fn render(&self, html_path: &Path, base_url: &Url) -> Result<PathBuf> {
        let pdf_path = html_path.with_extension("pdf");

        debug!(
            command = %self.command,
            input = %html_path.display(),
            output = %pdf_path.display(),
            "invoking renderer"
        );

        let output = Command::new(&self.command)
            .arg(html_path)
            .arg(&pdf_path)
            .arg("--base-url")
            .arg(base_url.as_str())
            .output()
            .map_err(|e| DocbinderError::Render(format!("failed to run {}: {e}", self.command)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DocbinderError::Render(format!(
                "{} exited with {}: {}",
                self.command,
                output.status,
                stderr.trim()
            )));
        }

        info!(path = %pdf_path.display(), "rendered document");
        Ok(pdf_path)
    }
}
