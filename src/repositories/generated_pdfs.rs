use sqlx::PgPool;

use crate::db::models::GeneratedPdf;

const COLUMNS: &str = "id, filename, subject, question_count, sha256, created_by, created_at";

pub(crate) struct CreateGeneratedPdf<'a> {
    pub(crate) id: &'a str,
    pub(crate) filename: &'a str,
    pub(crate) subject: &'a str,
    pub(crate) question_count: i32,
    pub(crate) sha256: &'a str,
    pub(crate) created_by: &'a str,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreateGeneratedPdf<'_>,
) -> Result<GeneratedPdf, sqlx::Error> {
    sqlx::query_as::<_, GeneratedPdf>(&format!(
        "INSERT INTO generated_pdfs (
            id, filename, subject, question_count, sha256, created_by, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.filename)
    .bind(params.subject)
    .bind(params.question_count)
    .bind(params.sha256)
    .bind(params.created_by)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn find_by_filename(
    pool: &PgPool,
    filename: &str,
) -> Result<Option<GeneratedPdf>, sqlx::Error> {
    sqlx::query_as::<_, GeneratedPdf>(&format!(
        "SELECT {COLUMNS} FROM generated_pdfs WHERE filename = $1"
    ))
    .bind(filename)
    .fetch_optional(pool)
    .await
}

pub(crate) async fn exists_by_filename(pool: &PgPool, filename: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM generated_pdfs WHERE filename = $1)")
        .bind(filename)
        .fetch_one(pool)
        .await
}

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<GeneratedPdf>, sqlx::Error> {
    sqlx::query_as::<_, GeneratedPdf>(&format!(
        "SELECT {COLUMNS} FROM generated_pdfs ORDER BY created_at DESC, filename ASC"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn rename(pool: &PgPool, from: &str, to: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE generated_pdfs SET filename = $1 WHERE filename = $2")
        .bind(to)
        .bind(from)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

pub(crate) async fn delete_by_filename(pool: &PgPool, filename: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM generated_pdfs WHERE filename = $1")
        .bind(filename)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}
