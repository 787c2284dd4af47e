use axum::{
    extract::{Path, Query, State},
    routing::{get, MethodRouter},
    Json,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentTeacher;
use crate::api::pagination::PageInfo;
use crate::core::state::AppState;
use crate::repositories::{self, QuestionFilter};
use crate::schemas::question::{
    DiagramResponse, McqListResponse, McqQuestionResponse, QuestionBankPagination,
    QuestionBankResponse, QuestionSearchQuery, SubjectiveQuestionResponse,
};

pub(super) async fn search_questions(
    Path(subject): Path<String>,
    Query(query): Query<QuestionSearchQuery>,
    CurrentTeacher(_teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<QuestionBankResponse>, ApiError> {
    search(&subject, &query, &state).await
}

/// Search for a subject whose name collides with a static route under
/// `/questions` (`subjective`, `mcq`, `diagrams`).
pub(super) fn search_literal(subject: &'static str) -> MethodRouter<AppState> {
    get(
        move |Query(query): Query<QuestionSearchQuery>,
              CurrentTeacher(_teacher): CurrentTeacher,
              State(state): State<AppState>| async move {
            search(subject, &query, &state).await
        },
    )
}

async fn search(
    subject: &str,
    query: &QuestionSearchQuery,
    state: &AppState,
) -> Result<Json<QuestionBankResponse>, ApiError> {
    let subject = subject.trim().to_string();
    if subject.is_empty() {
        return Err(ApiError::BadRequest("Subject is required".to_string()));
    }

    let (page, per_page, offset) = query.window();
    let filter = QuestionFilter {
        subject: &subject,
        year: query.year,
        search: query.search.as_deref(),
        question_type: query.question_type.as_deref(),
    };
    let db = state.db();

    let (subjective, subjective_total, mcqs, mcq_total, diagrams, diagram_total) = tokio::try_join!(
        repositories::subjective_questions::list(db, &filter, offset, per_page),
        repositories::subjective_questions::count(db, &filter),
        repositories::mcq_questions::list(db, &filter, offset, per_page),
        repositories::mcq_questions::count(db, &filter),
        repositories::diagrams::list(db, &filter, offset, per_page),
        repositories::diagrams::count(db, &filter),
    )
    .map_err(|e| ApiError::internal(e, "Failed to search question bank"))?;

    let api_prefix = &state.settings().api().prefix;

    Ok(Json(QuestionBankResponse {
        subject,
        subjective: subjective.into_iter().map(SubjectiveQuestionResponse::from_db).collect(),
        mcqs: mcqs.into_iter().map(|q| McqQuestionResponse::from_db(q, true)).collect(),
        diagrams: diagrams.into_iter().map(|d| DiagramResponse::from_db(d, api_prefix)).collect(),
        pagination: QuestionBankPagination {
            subjective: PageInfo::new(page, per_page, subjective_total),
            mcqs: PageInfo::new(page, per_page, mcq_total),
            diagrams: PageInfo::new(page, per_page, diagram_total),
        },
        total_questions: subjective_total + mcq_total + diagram_total,
    }))
}

pub(super) async fn list_mcqs(
    Path(subject): Path<String>,
    CurrentTeacher(_teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<McqListResponse>, ApiError> {
    let subject = subject.trim().to_string();
    let mcqs = repositories::mcq_questions::list_by_subject(state.db(), &subject)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch MCQs"))?;

    Ok(Json(McqListResponse {
        subject,
        mcqs: mcqs.into_iter().map(|q| McqQuestionResponse::from_db(q, true)).collect(),
    }))
}
