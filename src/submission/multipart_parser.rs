use actix_multipart::{Field, Multipart};
use actix_web::HttpResponse;
use std::sync::LazyLock;

use futures::StreamExt;
use regex::Regex;
use sanitize_filename::sanitize;

use crate::ErrorResponse;

use super::models::{ImagePayload, ImageSource, SubmissionForm};

#[derive(Debug, thiserror::Error)]
pub enum MultipartParseError {
    #[error("Multipart field error: {0}")]
    FieldError(String),
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
    #[error("IO error: {0}")]
    IoError(String),
    #[error("Invalid UTF-8 data: {0}")]
    Utf8Error(String),
    #[error("Field {field} exceeds the limit of {limit} bytes")]
    TooLarge { field: String, limit: usize },
}

impl From<MultipartParseError> for HttpResponse {
    fn from(error: MultipartParseError) -> Self {
        match error {
            MultipartParseError::TooLarge { .. } => HttpResponse::PayloadTooLarge()
                .json(ErrorResponse::new("PayloadTooLarge", &error.to_string())),
            _ => HttpResponse::BadRequest().json(ErrorResponse::bad_request(&error.to_string())),
        }
    }
}

/// Multipart field names of the expense form.
pub mod fields {
    pub const DRIVER: &str = "conductor";
    pub const DATE: &str = "fecha";
    pub const AMOUNT: &str = "monto";
    pub const DESCRIPTION: &str = "descripcion";
    pub const UPLOAD: &str = "comprobante";
    pub const CAPTURE: &str = "foto";
}

pub struct MultipartParser;

impl MultipartParser {
    /// Collect the expense form from a multipart payload.
    ///
    /// Missing text fields stay empty and an empty amount reads as 0 so the
    /// validation step can report them together. File parts without content,
    /// as browsers send for untouched file inputs, are ignored.
    pub async fn parse_submission_multipart(
        mut multipart: Multipart,
        max_image_bytes: usize,
    ) -> Result<SubmissionForm, MultipartParseError> {
        let mut form = SubmissionForm::default();

        while let Some(item) = multipart.next().await {
            let mut field = item.map_err(|e| MultipartParseError::FieldError(e.to_string()))?;
            let content_disposition = field
                .content_disposition()
                .ok_or_else(|| MultipartParseError::FieldError("Content disposition not found".to_string()))?;
            let name = content_disposition
                .get_name()
                .ok_or_else(|| MultipartParseError::FieldError("Field name not found".to_string()))?
                .to_string();
            let filename = content_disposition
                .get_filename()
                .filter(|f| !f.is_empty())
                .map(|f| sanitize(f));

            match name.as_str() {
                fields::DRIVER => form.driver = read_text(&mut field, &name).await?,
                fields::DATE => form.date = read_text(&mut field, &name).await?,
                fields::DESCRIPTION => form.description = read_text(&mut field, &name).await?,
                fields::AMOUNT => {
                    let value = read_text(&mut field, &name).await?;
                    form.amount = parse_amount(&value).ok_or_else(|| {
                        MultipartParseError::InvalidValue {
                            field: name.clone(),
                            value: value.clone(),
                        }
                    })?;
                }
                fields::UPLOAD | fields::CAPTURE => {
                    let bytes = read_bytes(&mut field, &name, max_image_bytes).await?;
                    if bytes.is_empty() {
                        continue;
                    }
                    if name == fields::UPLOAD {
                        form.upload = Some(ImagePayload::new(bytes, filename, ImageSource::Upload));
                    } else {
                        form.capture = Some(ImagePayload::new(bytes, filename, ImageSource::Capture));
                    }
                }
                _ => {
                    log::debug!("Ignoring unknown multipart field '{}'", name);
                    continue;
                }
            }
        }

        Ok(form)
    }
}

/// Whole units, either plain digits or grouped by thousands with `.`, `,`,
/// space or `_`.
static AMOUNT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^-?(?:\d+|\d{1,3}(?:[., _]\d{3})+)$").expect("hardcoded regex should be valid")
});

/// Parse the amount field; blank means 0.
///
/// Decimal fractions are rejected rather than folded into the integer part.
pub fn parse_amount(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Some(0);
    }
    if !AMOUNT_PATTERN.is_match(trimmed) {
        return None;
    }
    let digits: String = trimmed
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-')
        .collect();
    digits.parse().ok()
}

async fn read_bytes(
    field: &mut Field,
    name: &str,
    limit: usize,
) -> Result<Vec<u8>, MultipartParseError> {
    let mut buffer = Vec::new();
    while let Some(chunk) = field.next().await {
        let data_chunk = chunk.map_err(|e| MultipartParseError::IoError(e.to_string()))?;
        if buffer.len() + data_chunk.len() > limit {
            return Err(MultipartParseError::TooLarge {
                field: name.to_string(),
                limit,
            });
        }
        buffer.extend_from_slice(&data_chunk);
    }
    Ok(buffer)
}

const TEXT_FIELD_LIMIT: usize = 64 * 1024;

async fn read_text(field: &mut Field, name: &str) -> Result<String, MultipartParseError> {
    let buffer = read_bytes(field, name, TEXT_FIELD_LIMIT).await?;
    String::from_utf8(buffer).map_err(|e| MultipartParseError::Utf8Error(e.to_string()))
}
