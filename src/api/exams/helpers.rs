use std::collections::HashSet;

use sqlx::PgPool;

use crate::api::errors::ApiError;
use crate::db::models::{Diagram, GeneratedExam, McqQuestion, SubjectiveQuestion};
use crate::db::types::QuestionKind;
use crate::repositories;

pub(super) async fn fetch_exam(db: &PgPool, exam_id: &str) -> Result<GeneratedExam, ApiError> {
    repositories::generated_exams::find_by_id(db, exam_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch exam"))?
        .ok_or_else(|| ApiError::NotFound("Exam not found".to_string()))
}

pub(super) struct ExamQuestions {
    pub(super) subjective: Vec<SubjectiveQuestion>,
    pub(super) mcqs: Vec<McqQuestion>,
    pub(super) diagrams: Vec<Diagram>,
}

/// Loads the referenced questions, restricted to `subject`.
pub(super) async fn load_questions(
    db: &PgPool,
    subject: &str,
    subjective_ids: &[i64],
    mcq_ids: &[i64],
    diagram_ids: &[i64],
) -> Result<ExamQuestions, ApiError> {
    let (subjective, mcqs, diagrams) = tokio::try_join!(
        repositories::subjective_questions::find_by_ids_for_subject(db, subjective_ids, subject),
        repositories::mcq_questions::find_by_ids_for_subject(db, mcq_ids, subject),
        repositories::diagrams::find_by_ids_for_subject(db, diagram_ids, subject),
    )
    .map_err(|e| ApiError::internal(e, "Failed to fetch exam questions"))?;

    Ok(ExamQuestions { subjective, mcqs, diagrams })
}

/// Ids from `requested` that are absent from `found`, in request order.
pub(super) fn missing_ids(requested: &[i64], found: impl IntoIterator<Item = i64>) -> Vec<i64> {
    let found: HashSet<i64> = found.into_iter().collect();
    requested.iter().copied().filter(|id| !found.contains(id)).collect()
}

pub(super) fn exam_contains(exam: &GeneratedExam, kind: QuestionKind, question_id: i64) -> bool {
    let ids = match kind {
        QuestionKind::Subjective => &exam.subjective_ids.0,
        QuestionKind::Mcq => &exam.mcq_ids.0,
        QuestionKind::Diagram => &exam.diagram_ids.0,
    };
    ids.contains(&question_id)
}

#[cfg(test)]
mod tests {
    use super::missing_ids;

    #[test]
    fn missing_ids_keeps_request_order() {
        assert_eq!(missing_ids(&[5, 1, 9], [1]), vec![5, 9]);
        assert!(missing_ids(&[1, 2], [2, 1, 3]).is_empty());
    }
}
