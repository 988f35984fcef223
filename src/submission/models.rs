use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::ExpenseRecord;

/// Channel an image arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    /// File picked with the upload control.
    Upload,
    /// Photo taken with the live-capture control.
    Capture,
}

#[derive(Debug, Clone)]
pub struct ImagePayload {
    pub bytes: Vec<u8>,
    pub filename: Option<String>,
    pub source: ImageSource,
}

impl ImagePayload {
    pub fn new(bytes: Vec<u8>, filename: Option<String>, source: ImageSource) -> Self {
        Self {
            bytes,
            filename,
            source,
        }
    }
}

/// Values of the expense form at the moment it is submitted.
#[derive(Debug, Clone, Default)]
pub struct SubmissionForm {
    pub driver: String,
    /// `DD/MM/YYYY` or `YYYY-MM-DD`; empty means today.
    pub date: String,
    pub amount: i64,
    pub description: String,
    pub upload: Option<ImagePayload>,
    pub capture: Option<ImagePayload>,
}

impl SubmissionForm {
    /// The image to attach: the upload if present, otherwise the capture.
    /// Empty payloads count as absent.
    pub fn image(&self) -> Option<&ImagePayload> {
        self.upload
            .as_ref()
            .filter(|p| !p.bytes.is_empty())
            .or_else(|| self.capture.as_ref().filter(|p| !p.bytes.is_empty()))
    }
}

/// Body returned when a submission is stored.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubmissionResponse {
    #[schema(example = "✅ La rendición fue enviada correctamente.")]
    pub message: String,
    pub record: ExpenseRecord,
}

/// Multipart fields accepted by `POST /api/rendiciones`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct SubmitExpenseRequest {
    #[allow(unused)]
    #[schema(example = "Juan Pérez")]
    pub conductor: String,
    #[allow(unused)]
    #[schema(example = "05/06/2024")]
    pub fecha: Option<String>,
    #[allow(unused)]
    #[schema(example = 15000)]
    pub monto: i64,
    #[allow(unused)]
    #[schema(example = "Combustible")]
    pub descripcion: String,
    /// Uploaded receipt image (jpg, jpeg or png).
    #[allow(unused)]
    #[schema(value_type = Option<String>, format = Binary)]
    pub comprobante: Option<Vec<u8>>,
    /// Photo taken with the camera; used when no upload is sent.
    #[allow(unused)]
    #[schema(value_type = Option<String>, format = Binary)]
    pub foto: Option<Vec<u8>>,
}
