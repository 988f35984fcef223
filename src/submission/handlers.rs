use actix_multipart::Multipart;
use actix_web::{web, HttpResponse, Responder};
use log::{error, info, warn};

use crate::state::AppState;
use crate::ErrorResponse;

use super::controller::{self, SubmissionError, SUCCESS_MESSAGE};
use super::models::{SubmissionResponse, SubmitExpenseRequest};
use super::multipart_parser::MultipartParser;

#[utoipa::path(
    context_path = "/api",
    tag = "Rendiciones",
    post,
    path = "/rendiciones",
    request_body(content = inline(SubmitExpenseRequest), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Expense stored and receipt generated", body = SubmissionResponse),
        (status = 400, description = "Missing fields, missing image or unsupported image", body = ErrorResponse),
        (status = 413, description = "Image exceeds the configured size limit", body = ErrorResponse),
        (status = 500, description = "Receipt or ledger could not be written", body = ErrorResponse)
    )
)]
pub async fn submit_expense(payload: Multipart, data: web::Data<AppState>) -> impl Responder {
    info!("Executing submit_expense handler");

    let form = match MultipartParser::parse_submission_multipart(payload, data.config.max_image_bytes).await {
        Ok(form) => form,
        Err(e) => {
            warn!("Rejected multipart payload: {}", e);
            return HttpResponse::from(e);
        }
    };

    let state = data.clone();
    let outcome = web::block(move || controller::submit(&state, form)).await;

    match outcome {
        Ok(Ok(record)) => HttpResponse::Created().json(SubmissionResponse {
            message: SUCCESS_MESSAGE.to_string(),
            record,
        }),
        Ok(Err(e)) => {
            match &e {
                SubmissionError::Validation(_)
                | SubmissionError::ImageRequired
                | SubmissionError::UnsupportedImage => info!("Submission rejected: {}", e),
                SubmissionError::Ledger { receipt, .. } => {
                    error!("{}; receipt {} is not referenced by the ledger", e, receipt)
                }
                SubmissionError::Receipt(_) => error!("{}", e),
            }
            HttpResponse::from(e)
        }
        Err(e) => {
            error!("Submission task failed: {}", e);
            HttpResponse::InternalServerError()
                .json(ErrorResponse::internal_error("No se pudo procesar la rendición"))
        }
    }
}

/// Configure submission routes
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/rendiciones").route(web::post().to(submit_expense)));
}
