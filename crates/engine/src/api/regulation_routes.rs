//! Regulation routes: multipart uploads and PDF streaming.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Path, State,
    },
    http::{header, HeaderValue, StatusCode},
    response::Response,
    Json,
};
use sidesa_domain::{Regulation, RegulationId};
use sidesa_shared::{MessageResponse, RegulationForm};
use tokio_util::io::ReaderStream;

use crate::api::error::ApiError;
use crate::api::extract::serial_id;
use crate::app::App;
use crate::infrastructure::file_storage::LocalFileStorage;
use crate::infrastructure::ports::{FileStorage, UploadedFile};
use crate::use_cases::regulation::{ensure_pdf, PDF_CONTENT_TYPE};
use crate::use_cases::RegulationError;

pub async fn list(
    State(app): State<Arc<App>>,
) -> Result<Json<MessageResponse<Vec<Regulation>>>, ApiError> {
    let regulations = app.use_cases.regulation.list().await?;
    Ok(Json(MessageResponse::ok(
        "Regulations retrieved successfully",
        regulations,
    )))
}

pub async fn get(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse<Regulation>>, ApiError> {
    let regulation = app.use_cases.regulation.get(regulation_id(&id)?).await?;
    Ok(Json(MessageResponse::ok(
        "Regulation retrieved successfully",
        regulation,
    )))
}

pub async fn create(
    State(app): State<Arc<App>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<MessageResponse<Regulation>>), ApiError> {
    let multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let upload = read_upload(&app.storage, multipart).await?;
    let regulation = app
        .use_cases
        .regulation
        .create(upload.form, upload.file)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::ok(
            "Regulation created successfully",
            regulation,
        )),
    ))
}

pub async fn update(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<MessageResponse<Regulation>>, ApiError> {
    let multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let upload = read_upload(&app.storage, multipart).await?;
    let id = match regulation_id(&id) {
        Ok(id) => id,
        Err(e) => {
            upload.discard(&app.storage).await;
            return Err(e);
        }
    };
    let regulation = app
        .use_cases
        .regulation
        .update(id, upload.form, upload.file)
        .await?;
    Ok(Json(MessageResponse::ok(
        "Regulation updated successfully",
        regulation,
    )))
}

pub async fn delete(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse<()>>, ApiError> {
    app.use_cases.regulation.delete(regulation_id(&id)?).await?;
    Ok(Json(MessageResponse::ok_empty(
        "Regulation deleted successfully",
    )))
}

pub async fn download(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let regulation = app
        .use_cases
        .regulation
        .stored_document(regulation_id(&id)?)
        .await?;
    stream_document(&regulation, "attachment").await
}

pub async fn preview(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let regulation = app
        .use_cases
        .regulation
        .stored_document(regulation_id(&id)?)
        .await?;
    stream_document(&regulation, "inline").await
}

fn regulation_id(raw: &str) -> Result<RegulationId, ApiError> {
    serial_id(raw)
        .map(RegulationId::new)
        .ok_or_else(|| RegulationError::NotFound.into())
}

async fn stream_document(regulation: &Regulation, disposition: &str) -> Result<Response, ApiError> {
    let file = match tokio::fs::File::open(&regulation.file_path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(RegulationError::FileNotFound.into())
        }
        Err(e) => return Err(ApiError::Internal(e.to_string())),
    };
    let length = file.metadata().await.ok().map(|m| m.len());

    let mut builder = Response::builder()
        .header(header::CONTENT_TYPE, PDF_CONTENT_TYPE)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(disposition, &regulation.file_name),
        );
    if let Some(length) = length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }

    builder
        .body(Body::from_stream(ReaderStream::new(file)))
        .map_err(|e| ApiError::Internal(e.to_string()))
}

/// `<disposition>; filename="<name>"` with the name reduced to safe ASCII.
fn content_disposition(disposition: &str, file_name: &str) -> HeaderValue {
    let safe: String = file_name
        .chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\') {
                c
            } else {
                '_'
            }
        })
        .collect();
    HeaderValue::from_str(&format!("{disposition}; filename=\"{safe}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}

/// Text fields and the stored file of a regulation upload.
#[derive(Default)]
struct Upload {
    form: RegulationForm,
    file: Option<UploadedFile>,
}

impl Upload {
    async fn discard(self, storage: &LocalFileStorage) {
        if let Some(file) = self.file {
            if let Err(e) = storage.remove(&file.path).await {
                tracing::warn!(path = %file.path, error = %e, "Failed to remove rejected upload");
            }
        }
    }
}

/// Read the form, writing the `file` part to storage as it streams in.
/// On failure nothing written so far is left on disk.
async fn read_upload(storage: &LocalFileStorage, multipart: Multipart) -> Result<Upload, ApiError> {
    let mut upload = Upload::default();
    match read_fields(storage, multipart, &mut upload).await {
        Ok(()) => Ok(upload),
        Err(e) => {
            upload.discard(storage).await;
            Err(e)
        }
    }
}

async fn read_fields(
    storage: &LocalFileStorage,
    mut multipart: Multipart,
    upload: &mut Upload,
) -> Result<(), ApiError> {
    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => upload.form.title = Some(field.text().await.map_err(multipart_error)?),
            "year" => upload.form.year = Some(field.text().await.map_err(multipart_error)?),
            "file" => {
                if upload.file.is_some() {
                    return Err(ApiError::BadRequest("Only one file may be uploaded".into()));
                }
                ensure_pdf(field.content_type())?;

                let original_name = field.file_name().unwrap_or("document.pdf").to_string();
                let mut sink = storage.begin_upload(&original_name).await?;
                loop {
                    let chunk = match field.chunk().await {
                        Ok(Some(chunk)) => chunk,
                        Ok(None) => break,
                        Err(e) => {
                            sink.abort().await;
                            return Err(multipart_error(e));
                        }
                    };
                    if let Err(e) = sink.write_chunk(&chunk).await {
                        sink.abort().await;
                        return Err(e.into());
                    }
                }
                upload.file = Some(sink.finish().await?);
            }
            other => tracing::debug!(field = other, "Ignoring unknown multipart field"),
        }
    }
    Ok(())
}

fn multipart_error(e: MultipartError) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge
    } else {
        ApiError::BadRequest(e.body_text())
    }
}
