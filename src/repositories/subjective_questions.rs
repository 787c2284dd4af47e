use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::db::models::SubjectiveQuestion;
use crate::repositories::QuestionFilter;

const COLUMNS: &str = "id, subject, year, question_type, question_text, created_by, created_at";

pub(crate) struct CreateSubjectiveQuestion<'a> {
    pub(crate) subject: &'a str,
    pub(crate) year: i32,
    pub(crate) question_type: &'a str,
    pub(crate) question_text: &'a str,
    pub(crate) created_by: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateSubjectiveQuestion<'_>,
) -> Result<SubjectiveQuestion, sqlx::Error> {
    sqlx::query_as::<_, SubjectiveQuestion>(&format!(
        "INSERT INTO subjective_questions (
            subject, year, question_type, question_text, created_by, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6)
        RETURNING {COLUMNS}"
    ))
    .bind(params.subject)
    .bind(params.year)
    .bind(params.question_type)
    .bind(params.question_text)
    .bind(params.created_by)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list(
    pool: &PgPool,
    filter: &QuestionFilter<'_>,
    offset: i64,
    limit: i64,
) -> Result<Vec<SubjectiveQuestion>, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM subjective_questions"));
    filter.push_where(&mut builder, true);
    builder.push(" ORDER BY year DESC, id ASC OFFSET ");
    builder.push_bind(offset.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(limit);

    builder.build_query_as::<SubjectiveQuestion>().fetch_all(pool).await
}

pub(crate) async fn count(pool: &PgPool, filter: &QuestionFilter<'_>) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM subjective_questions");
    filter.push_where(&mut builder, true);
    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

/// Rows among `ids` that belong to `subject`, ordered by id.
pub(crate) async fn find_by_ids_for_subject(
    pool: &PgPool,
    ids: &[i64],
    subject: &str,
) -> Result<Vec<SubjectiveQuestion>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, SubjectiveQuestion>(&format!(
        "SELECT {COLUMNS} FROM subjective_questions
         WHERE id = ANY($1) AND LOWER(subject) = LOWER($2)
         ORDER BY id"
    ))
    .bind(ids)
    .bind(subject)
    .fetch_all(pool)
    .await
}

pub(crate) struct UpdateSubjectiveQuestion {
    pub(crate) year: Option<i32>,
    pub(crate) question_type: Option<String>,
    pub(crate) question_text: Option<String>,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: i64,
    params: UpdateSubjectiveQuestion,
) -> Result<Option<SubjectiveQuestion>, sqlx::Error> {
    sqlx::query_as::<_, SubjectiveQuestion>(&format!(
        "UPDATE subjective_questions SET
            year = COALESCE($1, year),
            question_type = COALESCE($2, question_type),
            question_text = COALESCE($3, question_text)
         WHERE id = $4
         RETURNING {COLUMNS}"
    ))
    .bind(params.year)
    .bind(params.question_type)
    .bind(params.question_text)
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM subjective_questions WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
