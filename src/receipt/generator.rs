//! Generator for the one-page expense receipt.
//!
//! The entered fields and the receipt photo are laid out on a US Letter page.
//! The photo is written to a transient file first because the layout engine
//! only reads images from disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::tempdir;

use super::common::{escape_typst_string, format_amount, receipt_filename, remove_transient};
use super::engine::DocumentRenderer;
use super::photo::{detect_image_format, ImageDimensions};
use super::traits::Generator;
use super::{GeneratedReceipt, GeneratorError};

const TEMPLATE: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/static/comprobante.typ"));
const SOURCE_FILE: &str = "comprobante.typ";
const TRANSIENT_IMAGE_STEM: &str = "temp_image";

/// Everything needed to lay out one receipt.
#[derive(Debug, Clone)]
pub struct ReceiptRequest {
    pub driver: String,
    /// `DD/MM/YYYY`
    pub date: String,
    pub amount: u64,
    pub description: String,
    pub image: Vec<u8>,
}

pub struct ReceiptGenerator {
    receipts_dir: PathBuf,
    title: String,
    currency_suffix: String,
    renderer: Arc<dyn DocumentRenderer>,
}

impl ReceiptGenerator {
    pub fn new(
        receipts_dir: impl Into<PathBuf>,
        title: impl Into<String>,
        currency_suffix: impl Into<String>,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Self {
        Self {
            receipts_dir: receipts_dir.into(),
            title: title.into(),
            currency_suffix: currency_suffix.into(),
            renderer,
        }
    }

    pub fn receipts_dir(&self) -> &Path {
        &self.receipts_dir
    }

    /// Where the receipt for `driver` on `date` is written.
    pub fn output_path(&self, driver: &str, date: &str) -> PathBuf {
        self.receipts_dir.join(receipt_filename(driver, date))
    }

    /// Typst source for the receipt, with the photo already sized.
    pub fn render_source(
        &self,
        request: &ReceiptRequest,
        image_file: &str,
        size: ImageDimensions,
    ) -> String {
        format!(
            r#"#let datos = (
  titulo: "{}",
  conductor: "{}",
  fecha: "{}",
  monto: "{}",
  descripcion: "{}",
  imagen: "{}",
  ancho: {:.2}pt,
  alto: {:.2}pt,
)

{}"#,
            escape_typst_string(&self.title),
            escape_typst_string(&request.driver),
            escape_typst_string(&request.date),
            escape_typst_string(&format_amount(request.amount, &self.currency_suffix)),
            escape_typst_string(&request.description),
            escape_typst_string(image_file),
            size.width,
            size.height,
            TEMPLATE,
        )
    }

    fn render_with_image(
        &self,
        request: &ReceiptRequest,
        workdir: &Path,
        image_path: &Path,
        output_path: &Path,
    ) -> Result<(), GeneratorError> {
        let size = ImageDimensions::of_file(image_path)?.fit_receipt();
        log::debug!(
            "Receipt image sized to {:.1}x{:.1}pt",
            size.width,
            size.height
        );

        let image_file = image_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let source_path = workdir.join(SOURCE_FILE);
        fs::write(&source_path, self.render_source(request, image_file, size))
            .map_err(GeneratorError::WriteSource)?;

        self.renderer.render(&source_path, output_path)
    }
}

impl Generator<ReceiptRequest> for ReceiptGenerator {
    type Output = GeneratedReceipt;

    /// Render the receipt into the receipts directory, overwriting any
    /// earlier receipt for the same driver and date.
    fn generate(&self, request: ReceiptRequest) -> Result<GeneratedReceipt, GeneratorError> {
        let format = detect_image_format(&request.image).ok_or(GeneratorError::UnsupportedImage)?;
        let filename = receipt_filename(&request.driver, &request.date);
        let path = self.receipts_dir.join(&filename);

        let workdir = tempdir().map_err(GeneratorError::TempDir)?;
        let image_path = workdir
            .path()
            .join(format!("{}.{}", TRANSIENT_IMAGE_STEM, format.extension()));
        fs::write(&image_path, &request.image).map_err(GeneratorError::WriteImage)?;

        let rendered = self.render_with_image(&request, workdir.path(), &image_path, &path);
        remove_transient(&image_path);
        rendered?;

        if !path.is_file() {
            return Err(GeneratorError::MissingOutput(path));
        }

        log::info!("Generated receipt {}", path.display());
        Ok(GeneratedReceipt { filename, path })
    }
}
