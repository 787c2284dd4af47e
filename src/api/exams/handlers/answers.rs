use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;

use crate::api::errors::ApiError;
use crate::api::guards::CurrentStudent;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::models::GeneratedExam;
use crate::db::types::QuestionKind;
use crate::repositories;
use crate::repositories::student_answers::NewAnswer;
use crate::schemas::exam::{AnswerInput, ExamResultResponse, SubmitAnswersRequest};
use crate::schemas::question::normalize_option_letter;

use super::super::helpers;

const ALREADY_SUBMITTED: &str = "Answers for this exam have already been submitted";

/// Checks every answer against the exam and grades the MCQ ones.
/// `correct_answers` maps MCQ id to its letter.
fn prepare_answers(
    exam: &GeneratedExam,
    answers: Vec<AnswerInput>,
    correct_answers: &HashMap<i64, char>,
) -> Result<Vec<NewAnswer>, ApiError> {
    if answers.is_empty() {
        return Err(ApiError::BadRequest("At least one answer is required".to_string()));
    }

    let mut seen = HashSet::new();
    let mut prepared = Vec::with_capacity(answers.len());

    for input in answers {
        let kind = input.question_kind.parse::<QuestionKind>().map_err(|_| {
            ApiError::BadRequest(format!("Unknown question kind '{}'", input.question_kind))
        })?;

        if !helpers::exam_contains(exam, kind, input.question_id) {
            return Err(ApiError::BadRequest(format!(
                "Question {kind} {} is not part of this exam",
                input.question_id
            )));
        }
        if !seen.insert((kind, input.question_id)) {
            return Err(ApiError::BadRequest(format!(
                "Duplicate answer for question {kind} {}",
                input.question_id
            )));
        }

        let (answer_text, is_correct) = match kind {
            QuestionKind::Mcq => {
                let raw = input.answer.trim();
                if raw.is_empty() {
                    (String::new(), Some(false))
                } else {
                    let letter = normalize_option_letter(raw).ok_or_else(|| {
                        ApiError::BadRequest("MCQ answers must be one of A, B, C or D".to_string())
                    })?;
                    let correct = correct_answers.get(&input.question_id) == Some(&letter);
                    (letter.to_string(), Some(correct))
                }
            }
            QuestionKind::Subjective | QuestionKind::Diagram => (input.answer, None),
        };

        prepared.push(NewAnswer {
            id: Uuid::new_v4().to_string(),
            question_kind: kind,
            question_id: input.question_id,
            answer_text,
            is_correct,
        });
    }

    Ok(prepared)
}

pub(in crate::api::exams) async fn submit_answers(
    Path(exam_id): Path<String>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
    Json(payload): Json<SubmitAnswersRequest>,
) -> Result<(StatusCode, Json<ExamResultResponse>), ApiError> {
    let exam = helpers::fetch_exam(state.db(), &exam_id).await?;

    let mcqs = repositories::mcq_questions::find_by_ids_for_subject(
        state.db(),
        &exam.mcq_ids.0,
        &exam.subject,
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to load exam questions"))?;
    let correct_answers: HashMap<i64, char> = mcqs
        .iter()
        .filter_map(|q| normalize_option_letter(&q.correct_answer).map(|letter| (q.id, letter)))
        .collect();

    let answers = prepare_answers(&exam, payload.answers, &correct_answers)?;

    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    repositories::student_answers::lock_submission(&mut *tx, &exam.id, &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to lock submission"))?;

    let submitted = repositories::student_answers::has_submitted(&mut *tx, &exam.id, &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check submission"))?;
    if submitted {
        return Err(ApiError::Conflict(ALREADY_SUBMITTED.to_string()));
    }

    repositories::student_answers::insert_many(
        &mut *tx,
        &exam.id,
        &student.id,
        &answers,
        primitive_now_utc(),
    )
    .await
    .map_err(|e| {
        if repositories::is_unique_violation(&e) {
            ApiError::Conflict(ALREADY_SUBMITTED.to_string())
        } else {
            ApiError::internal(e, "Failed to save answers")
        }
    })?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit answers"))?;

    let stored = repositories::student_answers::list_for_student(state.db(), &exam.id, &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load saved answers"))?;
    let result = ExamResultResponse::from_db(exam, stored);

    tracing::info!(
        student_id = %student.id,
        exam_id = %result.exam_id,
        answers = result.answers.len(),
        mcq_correct = result.score.mcq_correct,
        mcq_total = result.score.mcq_total,
        "Exam answers submitted"
    );

    Ok((StatusCode::CREATED, Json(result)))
}

pub(in crate::api::exams) async fn get_result(
    Path(exam_id): Path<String>,
    CurrentStudent(student): CurrentStudent,
    State(state): State<AppState>,
) -> Result<Json<ExamResultResponse>, ApiError> {
    let exam = helpers::fetch_exam(state.db(), &exam_id).await?;

    let answers = repositories::student_answers::list_for_student(state.db(), &exam.id, &student.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load answers"))?;
    if answers.is_empty() {
        return Err(ApiError::NotFound("No submission found for this exam".to_string()));
    }

    Ok(Json(ExamResultResponse::from_db(exam, answers)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::types::Json as SqlJson;
    use time::macros::{date, datetime};

    fn exam() -> GeneratedExam {
        GeneratedExam {
            id: "exam-1".to_string(),
            subject: "Physics".to_string(),
            description: "Midterm".to_string(),
            timer_minutes: 60,
            exam_date: date!(2025 - 03 - 01),
            subjective_ids: SqlJson(vec![1]),
            mcq_ids: SqlJson(vec![10, 11]),
            diagram_ids: SqlJson(vec![]),
            created_by: None,
            created_at: datetime!(2025-02-01 09:00:00),
        }
    }

    fn input(kind: &str, id: i64, answer: &str) -> AnswerInput {
        AnswerInput { question_kind: kind.to_string(), question_id: id, answer: answer.to_string() }
    }

    #[test]
    fn mcq_answers_are_normalized_and_graded() {
        let correct = HashMap::from([(10, 'B'), (11, 'C')]);
        let prepared = prepare_answers(
            &exam(),
            vec![input("mcq", 10, " b "), input("objective", 11, "a"), input("subjective", 1, "F = ma")],
            &correct,
        )
        .expect("answers");

        assert_eq!(prepared[0].answer_text, "B");
        assert_eq!(prepared[0].is_correct, Some(true));
        assert_eq!(prepared[1].is_correct, Some(false));
        assert_eq!(prepared[2].question_kind, QuestionKind::Subjective);
        assert_eq!(prepared[2].is_correct, None);
    }

    #[test]
    fn answers_outside_the_exam_or_duplicated_are_rejected() {
        let correct = HashMap::new();
        assert!(prepare_answers(&exam(), vec![input("mcq", 99, "A")], &correct).is_err());
        assert!(prepare_answers(&exam(), vec![input("diagram", 1, "x")], &correct).is_err());
        assert!(prepare_answers(
            &exam(),
            vec![input("mcq", 10, "A"), input("mcqs", 10, "B")],
            &correct
        )
        .is_err());
        assert!(prepare_answers(&exam(), vec![input("mcq", 10, "E")], &correct).is_err());
        assert!(prepare_answers(&exam(), Vec::new(), &correct).is_err());
    }
}
