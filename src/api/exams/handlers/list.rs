use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentTeacher, CurrentUser};
use crate::core::state::AppState;
use crate::core::time::format_primitive;
use crate::db::types::UserRole;
use crate::repositories;
use crate::repositories::student_answers::AnswerWithStudentRow;
use crate::schemas::exam::{
    AnswerResponse, ExamListQuery, ExamListResponse, ExamResponse, ExamSubmissionsResponse,
    McqScore, StudentSubmission,
};

use super::super::helpers;

pub(in crate::api::exams) async fn list_exams(
    CurrentUser(user): CurrentUser,
    State(state): State<AppState>,
    Query(params): Query<ExamListQuery>,
) -> Result<Json<ExamListResponse>, ApiError> {
    let subject = params.subject.as_deref().map(str::trim).filter(|value| !value.is_empty());
    let exams = repositories::generated_exams::list(state.db(), subject)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list exams"))?;

    let submitted: Option<HashSet<String>> = if user.role == UserRole::Student {
        let ids = repositories::student_answers::submitted_exam_ids(state.db(), &user.id)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to load submissions"))?;
        Some(ids.into_iter().collect())
    } else {
        None
    };

    let exams = exams
        .into_iter()
        .map(|exam| {
            let flag = submitted.as_ref().map(|ids| ids.contains(&exam.id));
            ExamResponse::from_db(exam, flag)
        })
        .collect();

    Ok(Json(ExamListResponse { exams }))
}

/// Rows arrive ordered by student, so consecutive rows form one submission.
fn group_by_student(
    rows: Vec<AnswerWithStudentRow>,
    exam_mcq_count: usize,
) -> Vec<StudentSubmission> {
    let mut submissions: Vec<StudentSubmission> = Vec::new();

    for row in rows {
        let answer = AnswerResponse {
            question_kind: row.question_kind,
            question_id: row.question_id,
            answer: row.answer_text,
            is_correct: row.is_correct,
        };

        let same_student =
            submissions.last().is_some_and(|current| current.student_id == row.student_id);
        if same_student {
            if let Some(current) = submissions.last_mut() {
                current.answers.push(answer);
            }
            continue;
        }

        submissions.push(StudentSubmission {
            student_id: row.student_id,
            firstname: row.firstname,
            lastname: row.lastname,
            email: row.email,
            submitted_at: format_primitive(row.submitted_at),
            answers: vec![answer],
            score: McqScore::default(),
        });
    }

    for submission in &mut submissions {
        submission.score = McqScore::tally(
            submission.answers.iter().map(|answer| (answer.question_kind.as_str(), answer.is_correct)),
            exam_mcq_count,
        );
    }

    submissions
}

pub(in crate::api::exams) async fn list_exam_answers(
    Path(exam_id): Path<String>,
    CurrentTeacher(_teacher): CurrentTeacher,
    State(state): State<AppState>,
) -> Result<Json<ExamSubmissionsResponse>, ApiError> {
    let exam = helpers::fetch_exam(state.db(), &exam_id).await?;

    let rows = repositories::student_answers::list_for_exam(state.db(), &exam.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to load exam answers"))?;

    let submissions = group_by_student(rows, exam.mcq_ids.0.len());
    Ok(Json(ExamSubmissionsResponse { exam_id: exam.id, submissions }))
}
