use axum::{
    extract::{Path, Query, State},
    routing::{delete, get, patch, post},
    Json, Router,
};

use crate::api::errors::ApiError;
use crate::api::guards::CurrentAdmin;
use crate::api::pagination::{offset_window, PaginatedResponse};
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::user::{
    PendingApprovalResponse, UserEnvelope, UserListQuery, UserResponse, UserUpdateRequest,
};
use crate::schemas::SuccessResponse;

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/pending-approvals", get(list_pending))
        .route("/pending-approvals/:pending_id/approve", post(approve_pending))
        .route("/pending-approvals/:pending_id/deny", delete(deny_pending))
        .route("/users", get(list_users))
        .route("/users/:user_id", patch(update_user).delete(delete_user))
}

async fn list_pending(
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<PendingApprovalResponse>>, ApiError> {
    let pending = repositories::pending_approvals::list(state.db())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list pending approvals"))?;

    Ok(Json(pending.into_iter().map(PendingApprovalResponse::from_db).collect()))
}

async fn approve_pending(
    Path(pending_id): Path<String>,
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<UserEnvelope>, ApiError> {
    let mut tx =
        state.db().begin().await.map_err(|e| ApiError::internal(e, "Failed to start transaction"))?;

    let pending = repositories::pending_approvals::find_for_update(&mut *tx, &pending_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch pending approval"))?
        .ok_or_else(|| ApiError::NotFound("Pending approval not found".to_string()))?;

    let existing = repositories::users::find_by_email(&mut *tx, &pending.email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing user"))?;
    if existing.is_some() {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let user = repositories::users::create(
        &mut *tx,
        repositories::users::CreateUser {
            id: &pending.id,
            firstname: &pending.firstname,
            lastname: &pending.lastname,
            email: &pending.email,
            hashed_password: &pending.hashed_password,
            role: pending.role,
            is_active: true,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| {
        if repositories::is_unique_violation(&e) {
            ApiError::Conflict("Email already registered".to_string())
        } else {
            ApiError::internal(e, "Failed to create user")
        }
    })?;

    repositories::pending_approvals::delete_by_id(&mut *tx, &pending.id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to remove pending approval"))?;

    tx.commit().await.map_err(|e| ApiError::internal(e, "Failed to commit approval"))?;

    tracing::info!(
        admin_id = %admin.id,
        user_id = %user.id,
        action = "signup_approve",
        "Admin approved signup"
    );

    Ok(Json(UserEnvelope { user: UserResponse::from_db(user) }))
}

async fn deny_pending(
    Path(pending_id): Path<String>,
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let removed = repositories::pending_approvals::delete_by_id(state.db(), &pending_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to deny pending approval"))?;
    if removed == 0 {
        return Err(ApiError::NotFound("Pending approval not found".to_string()));
    }

    tracing::info!(
        admin_id = %admin.id,
        pending_id = %pending_id,
        action = "signup_deny",
        "Admin denied signup"
    );

    Ok(Json(SuccessResponse::ok()))
}

async fn list_users(
    Query(params): Query<UserListQuery>,
    CurrentAdmin(_admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<PaginatedResponse<UserResponse>>, ApiError> {
    let (skip, limit) = offset_window(params.skip, params.limit);

    let users = repositories::users::list(state.db(), params.role, skip, limit)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to list users"))?;
    let total_count = repositories::users::count(state.db(), params.role)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to count users"))?;

    Ok(Json(PaginatedResponse {
        items: users.into_iter().map(UserResponse::from_db).collect(),
        total_count,
        skip,
        limit,
    }))
}

async fn update_user(
    Path(user_id): Path<String>,
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
    Json(payload): Json<UserUpdateRequest>,
) -> Result<Json<UserEnvelope>, ApiError> {
    let user = repositories::users::update(
        state.db(),
        &user_id,
        repositories::users::UpdateUser {
            role: payload.role,
            is_active: payload.is_active,
            updated_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| ApiError::internal(e, "Failed to update user"))?
    .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(
        admin_id = %admin.id,
        user_id = %user.id,
        action = "user_update",
        role = user.role.as_str(),
        is_active = user.is_active,
        "Admin updated user"
    );

    Ok(Json(UserEnvelope { user: UserResponse::from_db(user) }))
}

async fn delete_user(
    Path(user_id): Path<String>,
    CurrentAdmin(admin): CurrentAdmin,
    State(state): State<AppState>,
) -> Result<Json<SuccessResponse>, ApiError> {
    if admin.id == user_id {
        return Err(ApiError::BadRequest("Admins cannot delete their own account".to_string()));
    }

    let removed = repositories::users::delete_by_id(state.db(), &user_id)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to delete user"))?;
    if removed == 0 {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    tracing::info!(
        admin_id = %admin.id,
        user_id = %user_id,
        action = "user_delete",
        "Admin deleted user"
    );

    Ok(Json(SuccessResponse::ok()))
}

#[cfg(test)]
mod tests;
