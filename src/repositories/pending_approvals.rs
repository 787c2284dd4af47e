use sqlx::PgPool;

use crate::db::models::PendingApproval;
use crate::db::types::UserRole;

const COLUMNS: &str = "id, firstname, lastname, email, hashed_password, role, created_at";

pub(crate) struct CreatePendingApproval<'a> {
    pub(crate) id: &'a str,
    pub(crate) firstname: &'a str,
    pub(crate) lastname: &'a str,
    pub(crate) email: &'a str,
    pub(crate) hashed_password: &'a str,
    pub(crate) role: UserRole,
    pub(crate) created_at: time::PrimitiveDateTime,
}

pub(crate) async fn create(
    pool: &PgPool,
    params: CreatePendingApproval<'_>,
) -> Result<PendingApproval, sqlx::Error> {
    sqlx::query_as::<_, PendingApproval>(&format!(
        "INSERT INTO pending_approvals (
            id, firstname, lastname, email, hashed_password, role, created_at
        ) VALUES ($1,$2,$3,$4,$5,$6,$7)
        RETURNING {COLUMNS}"
    ))
    .bind(params.id)
    .bind(params.firstname)
    .bind(params.lastname)
    .bind(params.email)
    .bind(params.hashed_password)
    .bind(params.role)
    .bind(params.created_at)
    .fetch_one(pool)
    .await
}

pub(crate) async fn list(pool: &PgPool) -> Result<Vec<PendingApproval>, sqlx::Error> {
    sqlx::query_as::<_, PendingApproval>(&format!(
        "SELECT {COLUMNS} FROM pending_approvals ORDER BY created_at ASC"
    ))
    .fetch_all(pool)
    .await
}

pub(crate) async fn find_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<PendingApproval>, sqlx::Error> {
    sqlx::query_as::<_, PendingApproval>(&format!(
        "SELECT {COLUMNS} FROM pending_approvals WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await
}

/// Locks the row until the surrounding transaction ends.
pub(crate) async fn find_for_update(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<Option<PendingApproval>, sqlx::Error> {
    sqlx::query_as::<_, PendingApproval>(&format!(
        "SELECT {COLUMNS} FROM pending_approvals WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub(crate) async fn delete_by_id(
    executor: impl sqlx::PgExecutor<'_>,
    id: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM pending_approvals WHERE id = $1")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
