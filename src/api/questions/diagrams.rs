use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentTeacher, CurrentUser};
use crate::api::validation::{parse_question_id, validate_image_upload};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::question::{DiagramCreateForm, DiagramResponse};
use crate::services::file_store::FileStoreError;

struct UploadedFile {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

fn multipart_error(err: MultipartError, max_mb: u64) -> ApiError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::PayloadTooLarge(format!("File size exceeds {max_mb}MB limit"))
    } else {
        ApiError::BadRequest("Invalid multipart data".to_string())
    }
}

pub(super) async fn upload_diagram(
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<DiagramResponse>), ApiError> {
    let storage = state.settings().storage();
    let max_bytes = storage.max_upload_bytes();
    let max_mb = storage.max_upload_size_mb;

    let mut form = DiagramCreateForm::default();
    let mut year_raw: Option<String> = None;
    let mut upload: Option<UploadedFile> = None;

    while let Some(mut field) =
        multipart.next_field().await.map_err(|e| multipart_error(e, max_mb))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" | "diagram" | "image" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let content_type =
                    field.content_type().unwrap_or("application/octet-stream").to_string();
                let mut bytes = Vec::new();
                while let Some(chunk) =
                    field.chunk().await.map_err(|e| multipart_error(e, max_mb))?
                {
                    if bytes.len() as u64 + chunk.len() as u64 > max_bytes {
                        return Err(ApiError::PayloadTooLarge(format!(
                            "File size exceeds {max_mb}MB limit"
                        )));
                    }
                    bytes.extend_from_slice(&chunk);
                }
                upload = Some(UploadedFile { file_name, content_type, bytes });
            }
            "subject" | "year" | "question_text" | "questionText" | "question" => {
                let text = field.text().await.map_err(|e| multipart_error(e, max_mb))?;
                match name.as_str() {
                    "subject" => form.subject = text.trim().to_string(),
                    "year" => year_raw = Some(text.trim().to_string()),
                    _ => form.question_text = text.trim().to_string(),
                }
            }
            _ => {}
        }
    }

    form.year = match year_raw.as_deref() {
        Some(raw) => raw
            .parse::<i32>()
            .map_err(|_| ApiError::BadRequest("Year must be a number".to_string()))?,
        None => 0,
    };
    form.validate()?;

    let upload = upload
        .filter(|file| !file.bytes.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Diagram image is required".to_string()))?;
    let extension = validate_image_upload(
        &upload.file_name,
        &upload.content_type,
        &storage.allowed_image_extensions,
    )?;

    let stored_name = format!("{}.{extension}", Uuid::new_v4());
    state
        .diagrams()
        .write(&stored_name, &upload.bytes)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to store diagram image"))?;

    let mime_type = upload.content_type.trim().to_ascii_lowercase();
    let created = repositories::diagrams::create(
        state.db(),
        repositories::diagrams::CreateDiagram {
            subject: &form.subject,
            year: form.year,
            question_text: &form.question_text,
            diagram_path: &stored_name,
            mime_type: &mime_type,
            created_by: &teacher.id,
            created_at: primitive_now_utc(),
        },
    )
    .await;

    let diagram = match created {
        Ok(diagram) => diagram,
        Err(err) => {
            if let Err(cleanup) = state.diagrams().delete(&stored_name).await {
                tracing::warn!(error = %cleanup, file = %stored_name, "Failed to remove orphaned diagram");
            }
            return Err(ApiError::internal(err, "Failed to save diagram"));
        }
    };

    tracing::info!(
        teacher_id = %teacher.id,
        diagram_id = diagram.id,
        size = upload.bytes.len(),
        "Diagram uploaded"
    );

    Ok((
        StatusCode::CREATED,
        Json(DiagramResponse::from_db(diagram, &state.settings().api().prefix)),
    ))
}

pub(super) async fn diagram_image(
    Path(diagram_id): Path<String>,
    CurrentUser(_user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let diagram_id = parse_question_id(&diagram_id)?;
    let diagram = repositories::diagrams::find_by_id(state.db(), diagram_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch diagram"))?
        .ok_or_else(|| ApiError::NotFound("Diagram not found".to_string()))?;

    let bytes = state.diagrams().read(&diagram.diagram_path).await.map_err(|err| match err {
        FileStoreError::NotFound | FileStoreError::InvalidName => {
            ApiError::NotFound("Diagram image not found".to_string())
        }
        other => ApiError::internal(other, "Failed to read diagram image"),
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, diagram.mime_type),
            (header::CACHE_CONTROL, "private, max-age=3600".to_string()),
        ],
        bytes,
    )
        .into_response())
}
