#![allow(dead_code)]

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use actix_web::web;
use parking_lot::Mutex;
use rendiciones_server::receipt::{DocumentRenderer, GeneratorError};
use rendiciones_server::{AppConfig, AppState};
use tempfile::TempDir;

/// Renderer double that writes the layout source as the "document".
///
/// It records every source it was asked to render and which files sat next
/// to it at the time, so tests can inspect layout and transient files.
#[derive(Default)]
pub struct FakeRenderer {
    pub fail: bool,
    pub sources: Mutex<Vec<String>>,
    pub neighbours: Mutex<Vec<PathBuf>>,
}

impl FakeRenderer {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn last_source(&self) -> String {
        self.sources.lock().last().cloned().unwrap_or_default()
    }

    pub fn render_count(&self) -> usize {
        self.sources.lock().len()
    }
}

impl DocumentRenderer for FakeRenderer {
    fn render(&self, source: &Path, output: &Path) -> Result<(), GeneratorError> {
        let text = fs::read_to_string(source).map_err(GeneratorError::RendererIo)?;
        self.sources.lock().push(text.clone());
        if let Some(dir) = source.parent() {
            let entries = fs::read_dir(dir).map_err(GeneratorError::RendererIo)?;
            for entry in entries.flatten() {
                self.neighbours.lock().push(entry.path());
            }
        }

        if self.fail {
            return Err(GeneratorError::RendererExit {
                code: 1,
                stderr: "simulated failure".to_string(),
            });
        }

        fs::write(output, format!("%PDF-1.7\n{}", text)).map_err(GeneratorError::RendererIo)
    }
}

pub struct TestEnv {
    pub dir: TempDir,
    pub renderer: Arc<FakeRenderer>,
    pub state: web::Data<AppState>,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_renderer(FakeRenderer::default(), |_| {})
    }

    pub fn with_renderer<F>(renderer: FakeRenderer, tweak: F) -> Self
    where
        F: FnOnce(&mut AppConfig),
    {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = AppConfig {
            ledger_path: dir.path().join("Rendiciones.xlsx"),
            receipts_dir: dir.path().join("Comprobantes_pdf"),
            ..AppConfig::default()
        };
        tweak(&mut config);

        let renderer = Arc::new(renderer);
        let state = AppState::with_renderer(config, renderer.clone()).expect("state should build");
        Self {
            dir,
            renderer,
            state: web::Data::new(state),
        }
    }

    pub fn receipts_dir(&self) -> PathBuf {
        self.state.config.receipts_dir.clone()
    }

    pub fn receipt_files(&self) -> Vec<PathBuf> {
        fs::read_dir(self.receipts_dir())
            .expect("receipts dir")
            .flatten()
            .map(|e| e.path())
            .collect()
    }

    pub fn ledger_rows(&self) -> usize {
        self.state.ledger.read_table().expect("ledger readable").len()
    }
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, image::ImageFormat::Png)
}

pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, image::ImageFormat::Jpeg)
}

fn encode(width: u32, height: u32, format: image::ImageFormat) -> Vec<u8> {
    let img = image::RgbImage::from_pixel(width, height, image::Rgb([210, 210, 200]));
    let mut bytes = Vec::new();
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut bytes), format)
        .expect("encode fixture image");
    bytes
}
