use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use time::Date;

use crate::db::models::GeneratedExam;

const COLUMNS: &str = "\
    id, subject, description, timer_minutes, exam_date, subjective_ids, mcq_ids, diagram_ids, \
    created_by, created_at";

pub(crate) struct CreateGeneratedExam<'a> {
    pub(crate) id: &'a str,
    pub(crate) subject: &'a str,
    pub(crate) description: &'a str,
    pub(crate) timer_minutes: i32,
    pub(crate) exam_date: Date,
    pub(crate) subjective_ids: &'a [i64],
    pub(crate) mcq_ids: &'a [i64],
    pub(crate) diagram_ids: &'a [i64],
    pub(crate) created_by: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateGeneratedExam<'_>,
) -> Result<GeneratedExam, sqlx::Error> {
    sqlx::query_as::<_, GeneratedExam>(&format!(
        "INSERT INTO generated_exams (
            id, subject, description, timer_minutes, exam_date,
            subjective_ids, mcq_ids, diagram_ids, created_by, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.subject)
    .bind(params.description)
    .bind(params.timer_minutes)
    .bind(params.exam_date)
    .bind(Json(params.subjective_ids))
    .bind(Json(params.mcq_ids))
    .bind(Json(params.diagram_ids))
    .bind(params.created_by)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(
    pool: &PgPool,
    id: &str,
) -> Result<Option<GeneratedExam>, sqlx::Error> {
    sqlx::query_as::<_, GeneratedExam>(&format!("SELECT {COLUMNS} FROM generated_exams WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list(
    pool: &PgPool,
    subject: Option<&str>,
) -> Result<Vec<GeneratedExam>, sqlx::Error> {
    let mut builder =
        QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM generated_exams"));

    if let Some(subject) = subject {
        builder.push(" WHERE LOWER(subject) = LOWER(");
        builder.push_bind(subject.to_string());
        builder.push(")");
    }

    builder.push(" ORDER BY exam_date DESC, created_at DESC");
    builder.build_query_as::<GeneratedExam>().fetch_all(pool).await
}

pub(crate) async fn delete_by_id(pool: &PgPool, id: &str) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("DELETE FROM generated_exams WHERE id = $1").bind(id).execute(pool).await?;
    Ok(result.rows_affected())
}
