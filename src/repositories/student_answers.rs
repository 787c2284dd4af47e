use sqlx::{PgPool, Postgres, QueryBuilder};
use time::PrimitiveDateTime;

use crate::db::models::StudentAnswer;
use crate::db::types::QuestionKind;

const COLUMNS: &str = "\
    id, exam_id, student_id, question_kind, question_id, answer_text, is_correct, submitted_at";

pub(crate) struct NewAnswer {
    pub(crate) id: String,
    pub(crate) question_kind: QuestionKind,
    pub(crate) question_id: i64,
    pub(crate) answer_text: String,
    pub(crate) is_correct: Option<bool>,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AnswerWithStudentRow {
    pub(crate) student_id: String,
    pub(crate) firstname: String,
    pub(crate) lastname: String,
    pub(crate) email: String,
    pub(crate) question_kind: String,
    pub(crate) question_id: i64,
    pub(crate) answer_text: String,
    pub(crate) is_correct: Option<bool>,
    pub(crate) submitted_at: PrimitiveDateTime,
}

/// Serialises concurrent submissions of one student for one exam until the
/// transaction ends.
pub(crate) async fn lock_submission(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: &str,
    student_id: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1 || ':' || $2))")
        .bind(exam_id)
        .bind(student_id)
        .execute(executor)
        .await?;
    Ok(())
}

pub(crate) async fn has_submitted(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: &str,
    student_id: &str,
) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT EXISTS (SELECT 1 FROM student_answers WHERE exam_id = $1 AND student_id = $2)",
    )
    .bind(exam_id)
    .bind(student_id)
    .fetch_one(executor)
    .await
}

pub(crate) async fn insert_many(
    executor: impl sqlx::PgExecutor<'_>,
    exam_id: &str,
    student_id: &str,
    answers: &[NewAnswer],
    submitted_at: PrimitiveDateTime,
) -> Result<u64, sqlx::Error> {
    if answers.is_empty() {
        return Ok(0);
    }

    let mut builder = QueryBuilder::<Postgres>::new(
        "INSERT INTO student_answers (
            id, exam_id, student_id, question_kind, question_id, answer_text, is_correct, submitted_at
        ) ",
    );
    builder.push_values(answers, |mut row, answer| {
        row.push_bind(answer.id.clone())
            .push_bind(exam_id.to_string())
            .push_bind(student_id.to_string())
            .push_bind(answer.question_kind.as_str())
            .push_bind(answer.question_id)
            .push_bind(answer.answer_text.clone())
            .push_bind(answer.is_correct)
            .push_bind(submitted_at);
    });

    let result = builder.build().execute(executor).await?;
    Ok(result.rows_affected())
}

pub(crate) async fn list_for_student(
    pool: &PgPool,
    exam_id: &str,
    student_id: &str,
) -> Result<Vec<StudentAnswer>, sqlx::Error> {
    sqlx::query_as::<_, StudentAnswer>(&format!(
        "SELECT {COLUMNS} FROM student_answers
         WHERE exam_id = $1 AND student_id = $2
         ORDER BY question_kind, question_id"
    ))
    .bind(exam_id)
    .bind(student_id)
    .fetch_all(pool)
    .await
}

pub(crate) async fn list_for_exam(
    pool: &PgPool,
    exam_id: &str,
) -> Result<Vec<AnswerWithStudentRow>, sqlx::Error> {
    sqlx::query_as::<_, AnswerWithStudentRow>(
        "SELECT a.student_id,
                u.firstname,
                u.lastname,
                u.email,
                a.question_kind,
                a.question_id,
                a.answer_text,
                a.is_correct,
                a.submitted_at
         FROM student_answers a
         JOIN users u ON u.id = a.student_id
         WHERE a.exam_id = $1
         ORDER BY u.lastname, u.firstname, a.student_id, a.question_kind, a.question_id",
    )
    .bind(exam_id)
    .fetch_all(pool)
    .await
}

/// Exam ids the student has already answered.
pub(crate) async fn submitted_exam_ids(
    pool: &PgPool,
    student_id: &str,
) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar("SELECT DISTINCT exam_id FROM student_answers WHERE student_id = $1")
        .bind(student_id)
        .fetch_all(pool)
        .await
}
