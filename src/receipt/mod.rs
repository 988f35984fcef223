//! Receipt module - renders the single-page PDF for each submission.
//!
//! - `generator` - lays out the fields and photo and drives the renderer
//! - `engine` - the `DocumentRenderer` seam and its Typst CLI implementation
//! - `photo` - image format detection and proportional sizing
//! - `common` - formatting, naming and transient file cleanup

pub mod common;
pub mod engine;
pub mod generator;
pub mod photo;
pub mod traits;

pub use engine::{DocumentRenderer, TypstRenderer};
pub use generator::{ReceiptGenerator, ReceiptRequest};
pub use photo::{detect_image_format, ImageDimensions, ReceiptImageFormat};
pub use traits::Generator;

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur during receipt generation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("receipt image is not a JPEG or PNG")]
    UnsupportedImage,
    #[error("failed to create temporary directory: {0}")]
    TempDir(#[source] std::io::Error),
    #[error("failed to write transient image: {0}")]
    WriteImage(#[source] std::io::Error),
    #[error("failed to read receipt image: {0}")]
    Image(#[source] image::ImageError),
    #[error("failed to write Typst source: {0}")]
    WriteSource(#[source] std::io::Error),
    #[error("Typst CLI execution failed: {0}")]
    RendererIo(#[source] std::io::Error),
    #[error("Typst CLI exited with status {code}: {stderr}")]
    RendererExit { code: i32, stderr: String },
    #[error("renderer produced no document at {0}")]
    MissingOutput(PathBuf),
}

/// Result of a successful receipt generation.
#[derive(Debug, Clone)]
pub struct GeneratedReceipt {
    pub filename: String,
    pub path: PathBuf,
}

impl GeneratedReceipt {
    /// Path as stored in the ledger.
    pub fn link(&self) -> String {
        self.path.display().to_string()
    }
}
