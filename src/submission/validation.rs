//! Input validation for the expense form.
//!
//! Field problems are gathered into a single [`ValidationErrors`] so the user
//! sees one combined message.

use std::fmt;

use chrono::{Local, NaiveDate};

/// Message shown when any required field is missing or invalid.
pub const FIELDS_REQUIRED_MESSAGE: &str = "⚠ Por favor completa todos los campos.";
/// Message shown when neither an upload nor a capture was sent.
pub const IMAGE_REQUIRED_MESSAGE: &str = "⚠ Debes subir o tomar una foto del comprobante.";
/// Message shown when the image is not a JPEG or PNG.
pub const UNSUPPORTED_IMAGE_MESSAGE: &str =
    "⚠ El comprobante debe ser una imagen JPG, JPEG o PNG.";

/// Display format of ledger and receipt dates.
pub const DATE_FORMAT: &str = "%d/%m/%Y";
const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

/// Trait for validating request objects.
///
/// A successful validation yields the cleaned values.
pub trait Validator {
    type Output;

    fn validate(&self) -> Result<Self::Output, ValidationErrors>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// The form field that failed validation
    pub field: String,
    /// Human-readable message in Spanish
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn empty_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} no puede estar vacío", label))
    }

    pub fn non_positive_amount(field: &str) -> Self {
        Self::new(field, "El monto debe ser mayor a 0")
    }

    pub fn invalid_date(field: &str, value: &str) -> Self {
        Self::new(
            field,
            format!("La fecha '{}' no es válida, usa DD/MM/AAAA", value),
        )
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Default, Clone)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// One line per failed field.
    pub fn details(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", FIELDS_REQUIRED_MESSAGE)?;
        for error in &self.errors {
            write!(f, " {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Validate that a string is not empty after trimming
pub fn validate_required(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::empty_field(field, label));
    }
}

pub fn validate_positive_amount(value: i64, field: &str, errors: &mut ValidationErrors) {
    if value <= 0 {
        errors.add(ValidationError::non_positive_amount(field));
    }
}

/// Normalize `value`, recording an error when it is not a date.
pub fn validate_date(value: &str, field: &str, errors: &mut ValidationErrors) -> Option<String> {
    let date = normalize_date(value);
    if date.is_none() {
        errors.add(ValidationError::invalid_date(field, value.trim()));
    }
    date
}

/// Normalize a form date to `DD/MM/YYYY`.
///
/// Accepts `DD/MM/YYYY` and `YYYY-MM-DD`; an empty value means today.
pub fn normalize_date(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(Local::now().date_naive().format(DATE_FORMAT).to_string());
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT))
        .ok()
        .map(|date| date.format(DATE_FORMAT).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required_rejects_blank() {
        let mut errors = ValidationErrors::new();
        validate_required("   ", "conductor", "Conductor", &mut errors);
        validate_required("Ana", "descripcion", "Descripción", &mut errors);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].field, "conductor");
    }

    #[test]
    fn test_validate_positive_amount() {
        let mut errors = ValidationErrors::new();
        validate_positive_amount(0, "monto", &mut errors);
        validate_positive_amount(-100, "monto", &mut errors);
        validate_positive_amount(100, "monto", &mut errors);
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_normalize_date_formats() {
        assert_eq!(normalize_date("05/06/2024").as_deref(), Some("05/06/2024"));
        assert_eq!(normalize_date("2024-06-05").as_deref(), Some("05/06/2024"));
        assert_eq!(normalize_date("5/6/2024").as_deref(), Some("05/06/2024"));
        assert_eq!(normalize_date("31/02/2024"), None);
        assert_eq!(normalize_date("ayer"), None);
    }

    #[test]
    fn test_validate_date_returns_normalized_value() {
        let mut errors = ValidationErrors::new();
        assert_eq!(
            validate_date("2024-06-05", "fecha", &mut errors).as_deref(),
            Some("05/06/2024")
        );
        assert!(errors.is_empty());

        assert_eq!(validate_date("32/13/2024", "fecha", &mut errors), None);
        assert_eq!(errors.errors()[0].field, "fecha");
    }

    #[test]
    fn test_empty_date_means_today() {
        let today = Local::now().date_naive().format(DATE_FORMAT).to_string();
        assert_eq!(normalize_date(""), Some(today));
    }

    #[test]
    fn test_combined_message_lists_fields() {
        let mut errors = ValidationErrors::new();
        validate_required("", "conductor", "Conductor", &mut errors);
        validate_positive_amount(0, "monto", &mut errors);
        let message = errors.to_string();
        assert!(message.starts_with(FIELDS_REQUIRED_MESSAGE));
        assert!(message.contains("[conductor]"));
        assert!(message.contains("[monto]"));
        assert_eq!(errors.details().len(), 2);
    }
}
