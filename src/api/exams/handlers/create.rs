use axum::{extract::State, http::StatusCode, Json};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentTeacher;
use crate::core::state::AppState;
use crate::core::time::{parse_date, primitive_now_utc};
use crate::db::types::QuestionKind;
use crate::repositories;
use crate::schemas::exam::{CreateExamRequest, ExamResponse};

use super::super::helpers;

pub(in crate::api::exams) async fn create_exam(
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<CreateExamRequest>,
) -> Result<(StatusCode, Json<ExamResponse>), ApiError> {
    payload.validate()?;
    let exam_date = parse_date(&payload.exam_date)
        .ok_or_else(|| ApiError::BadRequest("Exam date must be YYYY-MM-DD".to_string()))?;

    let selection = payload.selected_questions.deduplicated();
    if selection.is_empty() {
        return Err(ApiError::BadRequest("Select at least one question".to_string()));
    }

    let subject = payload.subject.trim();
    let found = helpers::load_questions(
        state.db(),
        subject,
        &selection.subjective,
        &selection.mcq,
        &selection.diagram,
    )
    .await?;

    let missing = [
        (
            QuestionKind::Subjective,
            helpers::missing_ids(&selection.subjective, found.subjective.iter().map(|q| q.id)),
        ),
        (QuestionKind::Mcq, helpers::missing_ids(&selection.mcq, found.mcqs.iter().map(|q| q.id))),
        (
            QuestionKind::Diagram,
            helpers::missing_ids(&selection.diagram, found.diagrams.iter().map(|d| d.id)),
        ),
    ];
    let errors: Vec<String> = missing
        .iter()
        .filter(|(_, ids)| !ids.is_empty())
        .map(|(kind, ids)| format!("Unknown {kind} question ids for subject {subject}: {ids:?}"))
        .collect();
    if !errors.is_empty() {
        return Err(ApiError::Validation(errors));
    }

    let exam = repositories::generated_exams::create(
        state.db(),
        repositories::generated_exams::CreateGeneratedExam {
            id: &Uuid::new_v4().to_string(),
            subject,
            description: payload.description.trim(),
            timer_minutes: payload.timer,
            exam_date,
            subjective_ids: &selection.subjective,
            mcq_ids: &selection.mcq,
            diagram_ids: &selection.diagram,
            created_by: &teacher.id,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create exam"))?;

    tracing::info!(
        teacher_id = %teacher.id,
        exam_id = %exam.id,
        subject = %exam.subject,
        "Exam created"
    );

    Ok((StatusCode::CREATED, Json(ExamResponse::from_db(exam, None))))
}
