use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentTeacher;
use crate::api::validation::parse_question_id;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::QuestionKind;
use crate::repositories;
use crate::schemas::question::{
    normalize_option_letter, DiagramResponse, McqCreateRequest, McqQuestionResponse,
    QuestionResponse, QuestionUpdateRequest, SubjectiveCreateRequest, SubjectiveQuestionResponse,
};
use crate::schemas::SuccessResponse;

const INVALID_CORRECT_ANSWER: &str = "Correct answer must be one of A, B, C or D";

pub(super) async fn create_subjective(
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<SubjectiveCreateRequest>,
) -> Result<(StatusCode, Json<SubjectiveQuestionResponse>), ApiError> {
    payload.validate()?;

    let question = repositories::subjective_questions::create(
        state.db(),
        repositories::subjective_questions::CreateSubjectiveQuestion {
            subject: payload.subject.trim(),
            year: payload.year,
            question_type: payload.question_type.trim(),
            question_text: payload.question_text.trim(),
            created_by: &teacher.id,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create question"))?;

    tracing::info!(
        teacher_id = %teacher.id,
        question_id = question.id,
        subject = %question.subject,
        "Subjective question added"
    );

    Ok((StatusCode::CREATED, Json(SubjectiveQuestionResponse::from_db(question))))
}

pub(super) async fn create_mcq(
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<McqCreateRequest>,
) -> Result<(StatusCode, Json<McqQuestionResponse>), ApiError> {
    payload.validate()?;
    let correct_answer = normalize_option_letter(&payload.correct_answer)
        .ok_or_else(|| ApiError::BadRequest(INVALID_CORRECT_ANSWER.to_string()))?;

    let question = repositories::mcq_questions::create(
        state.db(),
        repositories::mcq_questions::CreateMcqQuestion {
            subject: payload.subject.trim(),
            year: payload.year,
            question_text: payload.question_text.trim(),
            options: [
                payload.option_a.trim(),
                payload.option_b.trim(),
                payload.option_c.trim(),
                payload.option_d.trim(),
            ],
            correct_answer,
            created_by: &teacher.id,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to create MCQ"))?;

    tracing::info!(
        teacher_id = %teacher.id,
        question_id = question.id,
        subject = %question.subject,
        "MCQ added"
    );

    Ok((StatusCode::CREATED, Json(McqQuestionResponse::from_db(question, true))))
}

fn parse_kind(raw: &str) -> Result<QuestionKind, ApiError> {
    raw.parse::<QuestionKind>()
        .map_err(|_| ApiError::BadRequest(format!("Unknown question kind '{raw}'")))
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|text| text.trim().to_string())
}

pub(super) async fn update_question(
    Path((kind, question_id)): Path<(String, String)>,
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
    Json(payload): Json<QuestionUpdateRequest>,
) -> Result<Json<QuestionResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let question_id = parse_question_id(&question_id)?;
    payload.validate()?;

    let updated = match kind {
        QuestionKind::Subjective => {
            if payload.touches_mcq_fields() {
                return Err(ApiError::BadRequest(
                    "Options only apply to MCQ questions".to_string(),
                ));
            }
            repositories::subjective_questions::update(
                state.db(),
                question_id,
                repositories::subjective_questions::UpdateSubjectiveQuestion {
                    year: payload.year,
                    question_type: trimmed(payload.question_type),
                    question_text: trimmed(payload.question_text),
                },
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to update question"))?
            .map(|q| QuestionResponse::Subjective(SubjectiveQuestionResponse::from_db(q)))
        }
        QuestionKind::Mcq => {
            if payload.question_type.is_some() {
                return Err(ApiError::BadRequest(
                    "Question type only applies to subjective questions".to_string(),
                ));
            }
            let correct_answer = match payload.correct_answer.as_deref() {
                Some(raw) => Some(
                    normalize_option_letter(raw)
                        .ok_or_else(|| ApiError::BadRequest(INVALID_CORRECT_ANSWER.to_string()))?,
                ),
                None => None,
            };
            for option in [&payload.option_a, &payload.option_b, &payload.option_c, &payload.option_d]
                .into_iter()
                .flatten()
            {
                if option.trim().is_empty() {
                    return Err(ApiError::BadRequest("Options must not be empty".to_string()));
                }
            }
            repositories::mcq_questions::update(
                state.db(),
                question_id,
                repositories::mcq_questions::UpdateMcqQuestion {
                    year: payload.year,
                    question_text: trimmed(payload.question_text),
                    option_a: trimmed(payload.option_a),
                    option_b: trimmed(payload.option_b),
                    option_c: trimmed(payload.option_c),
                    option_d: trimmed(payload.option_d),
                    correct_answer,
                },
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to update MCQ"))?
            .map(|q| QuestionResponse::Mcq(McqQuestionResponse::from_db(q, true)))
        }
        QuestionKind::Diagram => {
            if payload.touches_mcq_fields() || payload.question_type.is_some() {
                return Err(ApiError::BadRequest(
                    "Only year and question text can be changed on a diagram".to_string(),
                ));
            }
            repositories::diagrams::update(
                state.db(),
                question_id,
                repositories::diagrams::UpdateDiagram {
                    year: payload.year,
                    question_text: trimmed(payload.question_text),
                },
            )
            .await
            .map_err(|e| ApiError::internal(e, "Failed to update diagram"))?
            .map(|d| {
                QuestionResponse::Diagram(DiagramResponse::from_db(d, &state.settings().api().prefix))
            })
        }
    };

    let updated = updated.ok_or_else(|| ApiError::NotFound("Question not found".to_string()))?;

    tracing::info!(teacher_id = %teacher.id, kind = %kind, question_id, "Question updated");

    Ok(Json(updated))
}

pub(super) async fn delete_question(
    Path((kind, question_id)): Path<(String, String)>,
    CurrentTeacher(teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let kind = parse_kind(&kind)?;
    let question_id = parse_question_id(&question_id)?;

    let removed = match kind {
        QuestionKind::Subjective => {
            repositories::subjective_questions::delete_by_id(state.db(), question_id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to delete question"))?
                > 0
        }
        QuestionKind::Mcq => {
            repositories::mcq_questions::delete_by_id(state.db(), question_id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to delete MCQ"))?
                > 0
        }
        QuestionKind::Diagram => {
            let diagram = repositories::diagrams::delete_by_id(state.db(), question_id)
                .await
                .map_err(|e| ApiError::internal(e, "Failed to delete diagram"))?;
            if let Some(diagram) = &diagram {
                if let Err(err) = state.diagrams().delete(&diagram.diagram_path).await {
                    tracing::warn!(
                        error = %err,
                        diagram_id = diagram.id,
                        file = %diagram.diagram_path,
                        "Failed to remove diagram file"
                    );
                }
            }
            diagram.is_some()
        }
    };

    if !removed {
        return Err(ApiError::NotFound("Question not found".to_string()));
    }

    tracing::info!(teacher_id = %teacher.id, kind = %kind, question_id, "Question deleted");

    Ok(Json(SuccessResponse::ok()))
}
