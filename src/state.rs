//! Shared application state.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::config::{AppConfig, ConfigError};
use crate::ledger::{LedgerError, LedgerStore};
use crate::receipt::{DocumentRenderer, ReceiptGenerator, TypstRenderer};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

pub struct AppState {
    pub config: AppConfig,
    pub ledger: LedgerStore,
    pub receipts: ReceiptGenerator,
    submission_lock: Mutex<()>,
}

impl AppState {
    /// Build the state with the Typst CLI as renderer.
    pub fn new(config: AppConfig) -> Result<Self, StartupError> {
        let renderer = Arc::new(TypstRenderer::new(config.typst_bin.clone()));
        Self::with_renderer(config, renderer)
    }

    /// Build the state around any renderer, creating directories and the
    /// ledger file as needed.
    pub fn with_renderer(
        config: AppConfig,
        renderer: Arc<dyn DocumentRenderer>,
    ) -> Result<Self, StartupError> {
        config.bootstrap()?;

        let ledger = LedgerStore::new(config.ledger_path.clone());
        ledger.ensure_exists()?;

        let receipts = ReceiptGenerator::new(
            config.receipts_dir.clone(),
            config.receipt_title.clone(),
            config.currency_suffix.clone(),
            renderer,
        );

        Ok(Self {
            config,
            ledger,
            receipts,
            submission_lock: Mutex::new(()),
        })
    }

    /// Serialises submissions within this process.
    pub fn submission_lock(&self) -> &Mutex<()> {
        &self.submission_lock
    }
}
