//! Runtime configuration.
//!
//! Everything path-like is resolved once at startup and handed to the ledger
//! and receipt components explicitly.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;

pub const DEFAULT_LEDGER_PATH: &str = "./data/Rendiciones.xlsx";
pub const DEFAULT_RECEIPTS_DIR: &str = "./data/Comprobantes_pdf";
pub const DEFAULT_TYPST_BIN: &str = "typst";
pub const DEFAULT_RECEIPT_TITLE: &str = "Control de Gastos Trast";
pub const DEFAULT_CURRENCY_SUFFIX: &str = "CLP";
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Spreadsheet ledger file.
    pub ledger_path: PathBuf,
    /// Directory receiving one PDF per submission.
    pub receipts_dir: PathBuf,
    pub typst_bin: PathBuf,
    pub receipt_title: String,
    pub currency_suffix: String,
    pub max_image_bytes: usize,
    pub bind_addr: String,
    pub port: u16,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from(DEFAULT_LEDGER_PATH),
            receipts_dir: PathBuf::from(DEFAULT_RECEIPTS_DIR),
            typst_bin: PathBuf::from(DEFAULT_TYPST_BIN),
            receipt_title: DEFAULT_RECEIPT_TITLE.to_string(),
            currency_suffix: DEFAULT_CURRENCY_SUFFIX.to_string(),
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl AppConfig {
    /// Load configuration from the process environment, reading `.env` first.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Ok(Self {
            ledger_path: string_or(&lookup, "LEDGER_PATH", DEFAULT_LEDGER_PATH).into(),
            receipts_dir: string_or(&lookup, "RECEIPTS_DIR", DEFAULT_RECEIPTS_DIR).into(),
            typst_bin: string_or(&lookup, "TYPST_BIN", DEFAULT_TYPST_BIN).into(),
            receipt_title: string_or(&lookup, "RECEIPT_TITLE", DEFAULT_RECEIPT_TITLE),
            currency_suffix: string_or(&lookup, "CURRENCY_SUFFIX", DEFAULT_CURRENCY_SUFFIX),
            max_image_bytes: parsed_or(&lookup, "MAX_IMAGE_BYTES", defaults.max_image_bytes)?,
            bind_addr: string_or(&lookup, "BIND_ADDR", DEFAULT_BIND_ADDR),
            port: parsed_or(&lookup, "PORT", defaults.port)?,
        })
    }

    /// Create the receipts directory and the ledger's parent directory.
    pub fn bootstrap(&self) -> Result<(), ConfigError> {
        create_dir(&self.receipts_dir)?;
        if let Some(parent) = self.ledger_path.parent() {
            if !parent.as_os_str().is_empty() {
                create_dir(parent)?;
            }
        }
        Ok(())
    }
}

fn create_dir(path: &Path) -> Result<(), ConfigError> {
    fs::create_dir_all(path).map_err(|source| ConfigError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}

fn string_or<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => value,
        _ => {
            log::warn!("{} not set, using default: {}", key, default);
            default.to_string()
        }
    }
}

fn parsed_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(value) if !value.trim().is_empty() => {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key, value })
        }
        _ => Ok(default),
    }
}
