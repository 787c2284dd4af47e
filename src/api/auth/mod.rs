use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::api::errors::ApiError;
use crate::api::guards::{CurrentSession, CurrentUser};
use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::repositories;
use crate::schemas::auth::{LoginRequest, SignupRequest, SignupResponse, TokenResponse};
use crate::schemas::user::{UserEnvelope, UserResponse};
use crate::schemas::SuccessResponse;

/// Max attempts per window for login and signup, per email.
const AUTH_RATE_LIMIT: u64 = 10;
/// Rate limit window in seconds.
const AUTH_RATE_WINDOW_SECONDS: u64 = 60;

const INVALID_LOGIN: &str = "Invalid email or password";

pub(crate) fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
}

async fn enforce_rate_limit(
    state: &AppState,
    action: &str,
    email: &str,
    message: &'static str,
) -> Result<(), ApiError> {
    let rate_key = format!("rl:{action}:{email}");
    let allowed = state
        .redis()
        .rate_limit(&rate_key, AUTH_RATE_LIMIT, AUTH_RATE_WINDOW_SECONDS)
        .await
        .unwrap_or(true);
    if allowed {
        Ok(())
    } else {
        Err(ApiError::TooManyRequests(message))
    }
}

async fn signup(
    State(state): State<AppState>,
    Json(mut payload): Json<SignupRequest>,
) -> Result<(StatusCode, Json<SignupResponse>), ApiError> {
    payload.email = payload.normalized_email();
    payload.validate()?;
    let role = payload
        .user_role()
        .ok_or_else(|| ApiError::Validation(vec!["Role must be teacher or student".to_string()]))?;

    enforce_rate_limit(&state, "signup", &payload.email, "Too many signup attempts, try again later")
        .await?;

    let registered = repositories::users::email_registered(state.db(), &payload.email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to check existing user"))?;
    if registered {
        return Err(ApiError::Conflict("Email already registered".to_string()));
    }

    let hashed_password = security::hash_password(&payload.password)
        .map_err(|e| ApiError::internal(e, "Failed to hash password"))?;

    let pending = repositories::pending_approvals::create(
        state.db(),
        repositories::pending_approvals::CreatePendingApproval {
            id: &Uuid::new_v4().to_string(),
            firstname: payload.firstname.trim(),
            lastname: payload.lastname.trim(),
            email: &payload.email,
            hashed_password: &hashed_password,
            role,
            created_at: primitive_now_utc(),
        },
    )
    .await
    .map_err(|e| {
        if repositories::is_unique_violation(&e) {
            ApiError::Conflict("Email already registered".to_string())
        } else {
            ApiError::internal(e, "Failed to create pending approval")
        }
    })?;

    tracing::info!(pending_id = %pending.id, role = role.as_str(), "Signup awaiting approval");

    Ok((
        StatusCode::ACCEPTED,
        Json(SignupResponse {
            message: "Signup successful. Your account is awaiting admin approval.".to_string(),
            pending_id: pending.id,
        }),
    ))
}

async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let email = payload.email.trim().to_ascii_lowercase();
    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::BadRequest("Email and password are required".to_string()));
    }

    enforce_rate_limit(&state, "login", &email, "Too many login attempts, try again later").await?;

    let user = repositories::users::find_by_email(state.db(), &email)
        .await
        .map_err(|e| ApiError::internal(e, "Failed to fetch user"))?;

    let Some(user) = user else {
        let pending = repositories::pending_approvals::find_by_email(state.db(), &email)
            .await
            .map_err(|e| ApiError::internal(e, "Failed to fetch pending approval"))?;

        if let Some(pending) = pending {
            let verified = security::verify_password(&payload.password, &pending.hashed_password)
                .unwrap_or(false);
            if verified {
                return Err(ApiError::Forbidden("Account is awaiting admin approval"));
            }
        }
        return Err(ApiError::Unauthorized(INVALID_LOGIN));
    };

    let verified = security::verify_password(&payload.password, &user.hashed_password)
        .map_err(|_| ApiError::Unauthorized(INVALID_LOGIN))?;
    if !verified {
        return Err(ApiError::Unauthorized(INVALID_LOGIN));
    }

    if !user.is_active {
        return Err(ApiError::Forbidden("Account is inactive"));
    }

    let token = security::create_access_token(&user.id, user.role, state.settings(), None)
        .map_err(|e| ApiError::internal(e, "Failed to create access token"))?;

    Ok(Json(TokenResponse {
        access_token: token,
        token_type: "bearer".to_string(),
        user: UserResponse::from_db(user),
    }))
}

async fn logout(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Json<SuccessResponse>, ApiError> {
    let revoked = state
        .redis()
        .revoke_token(&session.claims.jti, session.claims.remaining_seconds())
        .await
        .map_err(|e| ApiError::internal(e, "Failed to revoke token"))?;

    if !revoked {
        tracing::warn!(user_id = %session.user.id, "Redis unavailable; token not revoked");
    }

    Ok(Json(SuccessResponse::ok()))
}

pub(crate) async fn me(CurrentUser(user): CurrentUser) -> Json<UserEnvelope> {
    Json(UserEnvelope { user: UserResponse::from_db(user) })
}
