//! Common utilities for receipt generation.
//!
//! Formatting helpers for the document body, output naming and transient
//! file cleanup.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use num_format::{Locale, ToFormattedString};

/// Wait before the single retry of a failed transient file removal.
pub const CLEANUP_RETRY_DELAY: Duration = Duration::from_millis(200);

const FILENAME_FALLBACK: &str = "conductor";

/// Format an amount with thousands separators and currency suffix,
/// e.g. `$15,000 CLP`.
pub fn format_amount(amount: u64, currency_suffix: &str) -> String {
    format!("${} {}", amount.to_formatted_string(&Locale::en), currency_suffix)
}

/// Output filename for a receipt: `{driver}_{dd-mm-yyyy}.pdf`.
///
/// The driver part only loses characters that are not allowed in filenames.
pub fn receipt_filename(driver: &str, date: &str) -> String {
    let mut safe_driver = sanitize_filename::sanitize(driver.trim());
    if safe_driver.trim().is_empty() {
        safe_driver = FILENAME_FALLBACK.to_string();
    }
    let safe_date = sanitize_filename::sanitize(date.replace('/', "-"));
    format!("{}_{}.pdf", safe_driver, safe_date)
}

/// Escape special characters for Typst strings.
pub fn escape_typst_string(value: &str) -> String {
    value
        .replace('\\', r"\\")
        .replace('"', r#"\""#)
        .replace('\r', "")
        .replace('\n', r"\n")
}

/// Get the static assets directory path.
pub fn get_static_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("static")
}

/// Best-effort removal of a transient file.
///
/// A failed first attempt is retried once after [`CLEANUP_RETRY_DELAY`];
/// a second failure leaves the file behind. Returns whether the file is gone.
pub fn remove_transient(path: &Path) -> bool {
    remove_with_retry(path, CLEANUP_RETRY_DELAY, |p| fs::remove_file(p))
}

pub(crate) fn remove_with_retry<F>(path: &Path, delay: Duration, mut remove: F) -> bool
where
    F: FnMut(&Path) -> io::Result<()>,
{
    match remove(path) {
        Ok(()) => return true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return true,
        Err(e) => {
            log::debug!(
                "Removing {} failed ({}), retrying in {:?}",
                path.display(),
                e,
                delay
            );
        }
    }

    thread::sleep(delay);
    match remove(path) {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => true,
        Err(e) => {
            log::warn!("Leaving transient file {} behind: {}", path.display(), e);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(15000, "CLP"), "$15,000 CLP");
        assert_eq!(format_amount(999, "CLP"), "$999 CLP");
        assert_eq!(format_amount(1234567, "USD"), "$1,234,567 USD");
    }

    #[test]
    fn test_receipt_filename_keeps_spaces_and_accents() {
        assert_eq!(
            receipt_filename("Juan Pérez", "05/06/2024"),
            "Juan Pérez_05-06-2024.pdf"
        );
    }

    #[test]
    fn test_receipt_filename_strips_path_separators() {
        let name = receipt_filename("../etc/passwd", "01/02/2024");
        assert!(!name.contains('/'));
        assert!(name.ends_with("_01-02-2024.pdf"));
    }

    #[test]
    fn test_receipt_filename_fallback() {
        assert_eq!(receipt_filename("///", "01/02/2024"), "conductor_01-02-2024.pdf");
    }

    #[test]
    fn test_escape_typst_string() {
        assert_eq!(escape_typst_string(r#"Peaje "Ruta 5""#), r#"Peaje \"Ruta 5\""#);
        assert_eq!(escape_typst_string("Linea1\r\nLinea2"), r"Linea1\nLinea2");
        assert_eq!(escape_typst_string(r"C:\tmp"), r"C:\\tmp");
    }

    #[test]
    fn test_remove_transient_deletes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("temp_image.jpg");
        fs::write(&path, b"bytes").unwrap();
        assert!(remove_transient(&path));
        assert!(!path.exists());
    }

    #[test]
    fn test_remove_missing_file_counts_as_removed() {
        let dir = tempfile::tempdir().unwrap();
        assert!(remove_transient(&dir.path().join("never-written.png")));
    }

    #[test]
    fn test_remove_retries_once_after_failure() {
        let mut attempts = 0;
        let removed = remove_with_retry(Path::new("locked.jpg"), Duration::ZERO, |_| {
            attempts += 1;
            if attempts == 1 {
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"))
            } else {
                Ok(())
            }
        });
        assert!(removed);
        assert_eq!(attempts, 2);
    }

    #[test]
    fn test_remove_gives_up_after_second_failure() {
        let mut attempts = 0;
        let removed = remove_with_retry(Path::new("locked.jpg"), Duration::ZERO, |_| {
            attempts += 1;
            Err(io::Error::new(io::ErrorKind::PermissionDenied, "locked"))
        });
        assert!(!removed);
        assert_eq!(attempts, 2);
    }
}
