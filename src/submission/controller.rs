//! Submit pipeline: validate the form, render the receipt, then append the
//! ledger row that links to it.

use actix_web::HttpResponse;
use thiserror::Error;

use crate::ledger::LedgerError;
use crate::models::ExpenseRecord;
use crate::receipt::{detect_image_format, Generator, GeneratorError, ReceiptRequest};
use crate::state::AppState;
use crate::ErrorResponse;

use super::models::SubmissionForm;
use super::validation::{
    validate_date, validate_positive_amount, validate_required, ValidationErrors, Validator, IMAGE_REQUIRED_MESSAGE, UNSUPPORTED_IMAGE_MESSAGE,
};

pub const SUCCESS_MESSAGE: &str = "✅ La rendición fue enviada correctamente.";
const RECEIPT_FAILED_MESSAGE: &str = "No se pudo generar el comprobante PDF. Intenta nuevamente.";
const LEDGER_FAILED_MESSAGE: &str =
    "El comprobante fue generado, pero no se pudo registrar la rendición en la planilla.";

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("{0}")]
    Validation(ValidationErrors),
    #[error("{}", IMAGE_REQUIRED_MESSAGE)]
    ImageRequired,
    #[error("{}", UNSUPPORTED_IMAGE_MESSAGE)]
    UnsupportedImage,
    #[error("receipt generation failed: {0}")]
    Receipt(#[from] GeneratorError),
    #[error("ledger append failed for {receipt}: {source}")]
    Ledger {
        receipt: String,
        #[source]
        source: LedgerError,
    },
}

impl From<SubmissionError> for HttpResponse {
    fn from(error: SubmissionError) -> Self {
        match error {
            SubmissionError::Validation(errors) => HttpResponse::BadRequest().json(
                ErrorResponse::new("ValidationError", super::validation::FIELDS_REQUIRED_MESSAGE)
                    .with_details(errors.details()),
            ),
            SubmissionError::ImageRequired => HttpResponse::BadRequest()
                .json(ErrorResponse::new("ImageRequired", IMAGE_REQUIRED_MESSAGE)),
            SubmissionError::UnsupportedImage => HttpResponse::BadRequest()
                .json(ErrorResponse::new("UnsupportedImage", UNSUPPORTED_IMAGE_MESSAGE)),
            SubmissionError::Receipt(GeneratorError::UnsupportedImage) => {
                HttpResponse::BadRequest()
                    .json(ErrorResponse::new("UnsupportedImage", UNSUPPORTED_IMAGE_MESSAGE))
            }
            SubmissionError::Receipt(_) => HttpResponse::InternalServerError()
                .json(ErrorResponse::new("ReceiptError", RECEIPT_FAILED_MESSAGE)),
            SubmissionError::Ledger { .. } => HttpResponse::InternalServerError()
                .json(ErrorResponse::new("LedgerError", LEDGER_FAILED_MESSAGE)),
        }
    }
}

/// Form fields after validation: trimmed text, normalized date, whole amount.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedFields {
    pub driver: String,
    pub date: String,
    pub amount: u64,
    pub description: String,
}

impl Validator for SubmissionForm {
    type Output = ValidatedFields;

    fn validate(&self) -> Result<ValidatedFields, ValidationErrors> {
        let mut errors = ValidationErrors::new();
        validate_required(&self.driver, "conductor", "Conductor", &mut errors);
        let date = validate_date(&self.date, "fecha", &mut errors);
        validate_positive_amount(self.amount, "monto", &mut errors);
        validate_required(&self.description, "descripcion", "Descripción", &mut errors);

        match (date, u64::try_from(self.amount)) {
            (Some(date), Ok(amount)) if errors.is_empty() => Ok(ValidatedFields {
                driver: self.driver.trim().to_string(),
                date,
                amount,
                description: self.description.trim().to_string(),
            }),
            _ => Err(errors),
        }
    }
}

/// Handle one submit event to completion.
///
/// Checks run in order: required fields, then image presence, then image
/// type. Nothing touches the disk until all of them pass. The receipt is
/// written before the ledger row so a stored row always links to an
/// existing file.
pub fn submit(state: &AppState, form: SubmissionForm) -> Result<ExpenseRecord, SubmissionError> {
    let ValidatedFields {
        driver,
        date,
        amount,
        description,
    } = form.validate().map_err(SubmissionError::Validation)?;

    let image = form.image().ok_or(SubmissionError::ImageRequired)?;
    if detect_image_format(&image.bytes).is_none() {
        return Err(SubmissionError::UnsupportedImage);
    }
    log::debug!(
        "Using {:?} image ({} bytes) for {}",
        image.source,
        image.bytes.len(),
        driver
    );
    let image_bytes = image.bytes.clone();

    // One submission at a time owns the ledger and receipts directory.
    let _guard = state.submission_lock().lock();

    let receipt = state.receipts.generate(ReceiptRequest {
        driver: driver.clone(),
        date: date.clone(),
        amount,
        description: description.clone(),
        image: image_bytes,
    })?;

    let record = ExpenseRecord {
        driver,
        date,
        amount,
        description,
        receipt_link: receipt.link(),
    };

    state
        .ledger
        .append(&record)
        .map_err(|source| SubmissionError::Ledger {
            receipt: receipt.link(),
            source,
        })?;

    log::info!(
        "Stored expense for {} on {} ({})",
        record.driver,
        record.date,
        record.receipt_link
    );
    Ok(record)
}
