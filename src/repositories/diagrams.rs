use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::db::models::Diagram;
use crate::repositories::QuestionFilter;

const COLUMNS: &str =
    "id, subject, year, question_text, diagram_path, mime_type, created_by, created_at";

pub(crate) struct CreateDiagram<'a> {
    pub(crate) subject: &'a str,
    pub(crate) year: i32,
    pub(crate) question_text: &'a str,
    pub(crate) diagram_path: &'a str,
    pub(crate) mime_type: &'a str,
    pub(crate) created_by: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(pool: &PgPool, params: CreateDiagram<'_>) -> Result<Diagram, sqlx::Error> {
    sqlx::query_as::<_, Diagram>(&format!(
        "INSERT INTO diagrams (
            subject, year, question_text, diagram_path, mime_type, created_by, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7)
        RETURNING {COLUMNS}"
    ))
    .bind(params.subject)
    .bind(params.year)
    .bind(params.question_text)
    .bind(params.diagram_path)
    .bind(params.mime_type)
    .bind(params.created_by)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Diagram>, sqlx::Error> {
    sqlx::query_as::<_, Diagram>(&format!("SELECT {COLUMNS} FROM diagrams WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub(crate) async fn list(
    pool: &PgPool,
    filter: &QuestionFilter<'_>,
    offset: i64,
    limit: i64,
) -> Result<Vec<Diagram>, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new(format!("SELECT {COLUMNS} FROM diagrams"));
    filter.push_where(&mut builder, false);
    builder.push(" ORDER BY year DESC, id ASC OFFSET ");
    builder.push_bind(offset.max(0));
    builder.push(" LIMIT ");
    builder.push_bind(limit);

    builder.build_query_as::<Diagram>().fetch_all(pool).await
}

pub(crate) async fn count(pool: &PgPool, filter: &QuestionFilter<'_>) -> Result<i64, sqlx::Error> {
    let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM diagrams");
    filter.push_where(&mut builder, false);
    builder.build_query_scalar::<i64>().fetch_one(pool).await
}

pub(crate) async fn find_by_ids_for_subject(
    pool: &PgPool,
    ids: &[i64],
    subject: &str,
) -> Result<Vec<Diagram>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(Vec::new());
    }

    sqlx::query_as::<_, Diagram>(&format!(
        "SELECT {COLUMNS} FROM diagrams
         WHERE id = ANY($1) AND LOWER(subject) = LOWER($2)
         ORDER BY id"
    ))
    .bind(ids)
    .bind(subject)
    .fetch_all(pool)
    .await
}

pub(crate) struct UpdateDiagram {
    pub(crate) year: Option<i32>,
    pub(crate) question_text: Option<String>,
}

pub(crate) async fn update(
    pool: &PgPool,
    id: i64,
    params: UpdateDiagram,
) -> Result<Option<Diagram>, sqlx::Error> {
    sqlx::query_as::<_, Diagram>(&format!(
        "UPDATE diagrams SET
            year = COALESCE($1, year),
            question_text = COALESCE($2, question_text)
         WHERE id = $3
         RETURNING {COLUMNS}"
    ))
    .bind(params.year)
    .bind(params.question_text)
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Deletes the row and hands it back so the caller can remove the file.
pub(crate) async fn delete_by_id(pool: &PgPool, id: i64) -> Result<Option<Diagram>, sqlx::Error> {
    sqlx::query_as::<_, Diagram>(&format!("DELETE FROM diagrams WHERE id = $1 RETURNING {COLUMNS}"))
        .bind(id)
        .fetch_optional(pool)
        .await
}
