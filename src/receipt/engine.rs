//! Typst rendering engine.
//!
//! Compiles a Typst source file, together with the assets next to it, into a
//! PDF at the requested output path.

use std::path::{Path, PathBuf};
use std::process::Command;

use super::GeneratorError;

/// Turns a layout source on disk into a finished document.
pub trait DocumentRenderer: Send + Sync {
    /// Render `source` to `output`. Assets referenced by the source are
    /// resolved relative to the source's directory.
    fn render(&self, source: &Path, output: &Path) -> Result<(), GeneratorError>;
}

/// Renderer backed by the `typst` command line compiler.
#[derive(Debug, Clone)]
pub struct TypstRenderer {
    binary: PathBuf,
}

impl TypstRenderer {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for TypstRenderer {
    fn default() -> Self {
        Self::new("typst")
    }
}

impl DocumentRenderer for TypstRenderer {
    fn render(&self, source: &Path, output: &Path) -> Result<(), GeneratorError> {
        let root = source.parent().unwrap_or_else(|| Path::new("."));

        let result = Command::new(&self.binary)
            .arg("compile")
            .arg("--root")
            .arg(root)
            .arg(source)
            .arg(output)
            .output()
            .map_err(GeneratorError::RendererIo)?;

        if !result.status.success() {
            let code = result.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&result.stderr).trim().to_string();
            log::error!("Typst exited with status {}: {}", code, stderr);
            return Err(GeneratorError::RendererExit { code, stderr });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("comprobante.typ");
        std::fs::write(&source, "Hola").unwrap();

        let renderer = TypstRenderer::new(dir.path().join("no-such-typst"));
        let result = renderer.render(&source, &dir.path().join("out.pdf"));
        assert!(matches!(result, Err(GeneratorError::RendererIo(_))));
    }
}
