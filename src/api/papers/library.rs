use axum::{
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};

use super::invalid_file_name;
use crate::api::errors::ApiError;
use crate::api::guards::CurrentTeacher;
use crate::core::state::AppState;
use crate::core::time::{format_clock, format_date, format_primitive};
use crate::repositories;
use crate::schemas::paper::{
    format_size, PaperListResponse, PaperSummary, RenamePaperRequest, RenamePaperResponse,
};
use crate::schemas::SuccessResponse;
use crate::services::file_store::FileStoreError;
use crate::services::pdf::normalize_rename_target;

const PAPER_NOT_FOUND: &str = "Paper not found";

pub(super) async fn list_papers(
    CurrentTeacher(_teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<PaperListResponse>, ApiError> {
    let rows = repositories::generated_pdfs::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list papers"))?;

    let mut papers = Vec::with_capacity(rows.len());
    for row in rows {
        let size = state.papers().size(&row.filename).await.unwrap_or_else(|err| {
            tracing::warn!(error = %err, file = %row.filename, "Failed to stat paper");
            None
        });

        papers.push(PaperSummary {
            size: format_size(size),
            creation_date: format_date(row.created_at.date()),
            creation_time: format_clock(row.created_at.assume_utc()),
            created_at: format_primitive(row.created_at),
            filename: row.filename,
            subject: row.subject,
        });
    }

    Ok(Json(PaperListResponse { papers }))
}

pub(super) async fn download_paper(
    Path(filename): Path<String>,
    CurrentTeacher(_teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Response, ApiError> {
    let filename = normalize_rename_target(&filename).ok_or_else(invalid_file_name)?;

    let bytes = state.papers().read(&filename).await.map_err(|err| match err {
        FileStoreError::NotFound => ApiError::NotFound(PAPER_NOT_FOUND.to_string()),
        FileStoreError::InvalidName => invalid_file_name(),
        other => ApiError::internal(other, "Failed to read paper"),
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, format!("attachment; filename=\"{filename}\"")),
        ],
        bytes,
    )
        .into_response())
}

pub(super) async fn rename_paper(
    Path(filename): Path<String>,
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<RenamePaperRequest>,
) -> Result<Json<RenamePaperResponse>, ApiError> {
    let from = normalize_rename_target(&filename).ok_or_else(invalid_file_name)?;
    let to = normalize_rename_target(&payload.new_file_name).ok_or_else(invalid_file_name)?;

    let existing = repositories::generated_pdfs::find_by_filename(state.db(), &from)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch paper"))?;
    if existing.is_none() {
        return Err(ApiError::NotFound(PAPER_NOT_FOUND.to_string()));
    }
    if from == to {
        return Ok(Json(RenamePaperResponse { success: true, filename: to }));
    }

    let taken = repositories::generated_pdfs::exists_by_filename(state.db(), &to)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check target name"))?;
    if taken {
        return Err(ApiError::Conflict("A paper with the new name already exists".to_string()));
    }

    state.papers().rename(&from, &to).await.map_err(|err| match err {
        FileStoreError::NotFound => ApiError::NotFound(PAPER_NOT_FOUND.to_string()),
        FileStoreError::AlreadyExists => {
            ApiError::Conflict("A paper with the new name already exists".to_string())
        }
        FileStoreError::InvalidName => invalid_file_name(),
        other => ApiError::internal(other, "Failed to rename paper"),
    })?;

    if let Err(err) = repositories::generated_pdfs::rename(state.db(), &from, &to).await {
        if let Err(restore) = state.papers().rename(&to, &from).await {
            tracing::error!(error = %restore, from = %to, to = %from, "Failed to restore paper name");
        }
        return Err(if repositories::is_unique_violation(&err) {
            ApiError::Conflict("A paper with the new name already exists".to_string())
        } else {
            ApiError::internal(err, "Failed to rename paper record")
        });
    }

    tracing::info!(teacher_id = %teacher.id, from = %from, to = %to, "Paper renamed");

    Ok(Json(RenamePaperResponse { success: true, filename: to }))
}

pub(super) async fn delete_paper(
    Path(filename): Path<String>,
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let filename = normalize_rename_target(&filename).ok_or_else(invalid_file_name)?;

    let removed = repositories::generated_pdfs::delete_by_filename(state.db(), &filename)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete paper record"))?;
    if removed == 0 {
        return Err(ApiError::NotFound(PAPER_NOT_FOUND.to_string()));
    }

    match state.papers().delete(&filename).await {
        Ok(true) => {}
        Ok(false) => tracing::warn!(file = %filename, "Paper file was already missing"),
        Err(err) => tracing::warn!(error = %err, file = %filename, "Failed to remove paper file"),
    }

    tracing::info!(teacher_id = %teacher.id, file = %filename, "Paper deleted");

    Ok(Json(SuccessResponse::ok()))
}
