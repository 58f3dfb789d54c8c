//! src/routes/bulk_email.rs
use crate::dispatch::{dispatch, DispatchConfig, RunRequest, RunSummary, ValidationError};
use crate::domain::{Address, Body, Subject};
use crate::email::MailRelay;
use crate::ingest::{normalize_rows, CsvRowSource, IngestionError};
use crate::routes::error_chain_fmt;
use crate::telemetry::spawn_blocking_with_tracing;
use actix_multipart::{Field, Multipart, MultipartError};
use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use anyhow::Context;
use futures_util::TryStreamExt;
use serde::Serialize;
use uuid::Uuid;

/// Largest accepted upload, in bytes.
#[derive(Debug, Clone, Copy)]
pub struct UploadLimit(pub usize);

#[derive(thiserror::Error)]
pub enum BulkEmailError {
    #[error("CSV file is required")]
    MissingFile,
    #[error("Only CSV files are allowed")]
    NotCsv,
    #[error("Uploads are limited to {0} bytes")]
    TooLarge(usize),
    #[error("Malformed upload: {0}")]
    MalformedUpload(String),
    #[error(transparent)]
    ValidationError(#[from] ValidationError),
    #[error("Failed to process bulk email")]
    IngestionError(#[from] IngestionError),
    #[error("Failed to process bulk email")]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for BulkEmailError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

#[derive(Serialize)]
struct Rejection {
    error: String,
}

#[derive(Serialize)]
struct Failure {
    success: bool,
    error: String,
    message: String,
}

impl ResponseError for BulkEmailError {
    fn status_code(&self) -> StatusCode {
        match self {
            BulkEmailError::IngestionError(_) | BulkEmailError::UnexpectedError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let mut response = HttpResponse::build(self.status_code());
        match self {
            BulkEmailError::IngestionError(e) => response.json(Failure {
                success: false,
                error: self.to_string(),
                message: e.to_string(),
            }),
            BulkEmailError::UnexpectedError(e) => response.json(Failure {
                success: false,
                error: self.to_string(),
                message: format!("{:#}", e),
            }),
            _ => response.json(Rejection {
                error: self.to_string(),
            }),
        }
    }
}

#[derive(Serialize)]
struct BulkEmailResponse {
    success: bool,
    message: &'static str,
    results: RunSummary,
}

struct CsvUpload {
    filename: String,
    bytes: Vec<u8>,
}

#[derive(Default)]
struct BulkEmailForm {
    csv_file: Option<CsvUpload>,
    subject: Option<String>,
    body: Option<String>,
}

#[tracing::instrument(
    name = "Sending bulk email",
    skip(payload, relay, dispatch_config, upload_limit),
    fields(request_id = %Uuid::new_v4())
)]
pub async fn send_bulk_email(
    payload: Multipart,
    relay: web::Data<dyn MailRelay>,
    dispatch_config: web::Data<DispatchConfig>,
    upload_limit: web::Data<UploadLimit>,
) -> Result<HttpResponse, BulkEmailError> {
    // The upload lives in memory only and is dropped on every return path.
    let form = read_form(payload, upload_limit.0).await?;

    let csv_file = form.csv_file.ok_or(BulkEmailError::MissingFile)?;
    let subject = Subject::parse(form.subject.unwrap_or_default()).map_err(ValidationError::from)?;
    let body = Body::parse(form.body.unwrap_or_default()).map_err(ValidationError::from)?;

    tracing::info!("Processing CSV file: {}", csv_file.filename);
    let addresses = parse_csv(csv_file.bytes).await?;
    tracing::info!("Found {} valid email(s)", addresses.len());

    let request = RunRequest::new(addresses, subject, body, dispatch_config.limits)?;
    let report = dispatch(&request, &dispatch_config, relay.get_ref()).await;

    Ok(HttpResponse::Ok().json(BulkEmailResponse {
        success: true,
        message: "Bulk email sending completed",
        results: report.summary(),
    }))
}

#[tracing::instrument(name = "Parse uploaded CSV", skip(bytes), fields(size = bytes.len()))]
async fn parse_csv(bytes: Vec<u8>) -> Result<Vec<Address>, BulkEmailError> {
    let addresses = spawn_blocking_with_tracing(move || -> Result<Vec<Address>, IngestionError> {
        let source = CsvRowSource::new(bytes.as_slice())?;
        normalize_rows(source)
    })
    .await
    .context("Failed to spawn blocking thread")??;

    Ok(addresses)
}

async fn read_form(mut payload: Multipart, limit: usize) -> Result<BulkEmailForm, BulkEmailError> {
    let mut form = BulkEmailForm::default();

    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        let name = field.content_disposition().get_name().unwrap_or_default().to_owned();
        match name.as_str() {
            "csvFile" => {
                let filename = field
                    .content_disposition()
                    .get_filename()
                    .unwrap_or_default()
                    .to_owned();
                if !is_csv(&field, &filename) {
                    return Err(BulkEmailError::NotCsv);
                }
                let bytes = read_field(&mut field, limit).await?;
                form.csv_file = Some(CsvUpload { filename, bytes });
            }
            "subject" => form.subject = Some(read_text(&mut field, limit).await?),
            "body" => form.body = Some(read_text(&mut field, limit).await?),
            _ => {
                read_field(&mut field, limit).await?;
            }
        }
    }

    Ok(form)
}

fn is_csv(field: &Field, filename: &str) -> bool {
    let csv_mime = field
        .content_type()
        .map(|mime| mime.essence_str() == "text/csv")
        .unwrap_or(false);
    csv_mime || filename.to_lowercase().ends_with(".csv")
}

async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>, BulkEmailError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field.try_next().await.map_err(malformed)? {
        if bytes.len() + chunk.len() > limit {
            return Err(BulkEmailError::TooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

async fn read_text(field: &mut Field, limit: usize) -> Result<String, BulkEmailError> {
    let bytes = read_field(field, limit).await?;
    String::from_utf8(bytes).map_err(|e| BulkEmailError::MalformedUpload(e.to_string()))
}

fn malformed(e: MultipartError) -> BulkEmailError {
    BulkEmailError::MalformedUpload(e.to_string())
}
