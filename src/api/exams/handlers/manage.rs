use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentTeacher, CurrentUser};
use crate::core::state::AppState;
use crate::db::types::UserRole;
use crate::repositories;
use crate::schemas::exam::{ExamDetailResponse, ExamResponse};
use crate::schemas::question::{DiagramResponse, McqQuestionResponse, SubjectiveQuestionResponse};

use super::super::helpers;

pub(in crate::api::exams) async fn get_exam(
    Path(exam_id): Path<String>,
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<ExamDetailResponse>, ApiError> {
    let exam = helpers::fetch_exam(state.db(), &exam_id).await?;
    let questions = helpers::load_questions(
        state.db(),
        &exam.subject,
        &exam.subjective_ids.0,
        &exam.mcq_ids.0,
        &exam.diagram_ids.0,
    )
    .await?;

    let is_student = user.role == UserRole::Student;
    let submitted = if is_student {
        Some(
            repositories::student_answers::has_submitted(state.db(), &exam.id, &user.id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to check submission"))?,
        )
    } else {
        None
    };
    let api_prefix = &state.settings().api().prefix;

    Ok(Json(ExamDetailResponse {
        exam: ExamResponse::from_db(exam, submitted),
        subjective_questions: questions
            .subjective
            .into_iter()
            .map(SubjectiveQuestionResponse::from_db)
            .collect(),
        objective_questions: questions
            .mcqs
            .into_iter()
            .map(|q| McqQuestionResponse::from_db(q, !is_student))
            .collect(),
        diagram_questions: questions
            .diagrams
            .into_iter()
            .map(|d| DiagramResponse::from_db(d, api_prefix))
            .collect(),
    }))
}

pub(in crate::api::exams) async fn delete_exam(
    Path(exam_id): Path<String>,
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let removed = repositories::generated_exams::delete_by_id(state.db(), &exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete exam"))?;
    if removed == 0 {
        return Err(ApiError::NotFound("Exam not found".to_string()));
    }

    tracing::info!(teacher_id = %teacher.id, exam_id = %exam_id, "Exam deleted");

    Ok(StatusCode::NO_CONTENT)
}
