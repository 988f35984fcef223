//! Submission module - the expense form and its submit pipeline.
//!
//! - `models` - form values and response bodies
//! - `multipart_parser` - reads the form from `multipart/form-data`
//! - `validation` - field checks and user-facing messages
//! - `controller` - validation, receipt generation and ledger append
//! - `handlers` - the HTTP endpoint

pub mod controller;
pub mod handlers;
pub mod models;
pub mod multipart_parser;
pub mod validation;

pub use controller::{submit, SubmissionError, ValidatedFields, SUCCESS_MESSAGE};
pub use models::{ImagePayload, ImageSource, SubmissionForm, SubmissionResponse};
