use uuid::Uuid;

use crate::core::security;
use crate::core::state::AppState;
use crate::core::time::primitive_now_utc;
use crate::db::types::UserRole;
use crate::repositories;

/// Makes sure the configured first admin exists, is active and can log in
/// with the configured password.
pub(crate) async fn ensure_admin(state: &AppState) -> anyhow::Result<()> {
    let admin = state.settings().admin();
    if admin.first_admin_password.is_empty() {
        tracing::warn!("FIRST_ADMIN_PASSWORD not configured; skipping admin creation");
        return Ok(());
    }

    let email = &admin.first_admin_email;
    let now = primitive_now_utc();

    if let Some(user) = repositories::users::find_by_email(state.db(), email).await? {
        let verified = security::verify_password(&admin.first_admin_password, &user.hashed_password)
            .unwrap_or(false);

        if verified && user.role == UserRole::Admin && user.is_active {
            tracing::info!("Default admin already up to date");
            return Ok(());
        }

        let hashed_password = if verified {
            user.hashed_password.clone()
        } else {
            security::hash_password(&admin.first_admin_password)?
        };

        sqlx::query(
            "UPDATE users
             SET hashed_password = $1, role = $2, is_active = TRUE, updated_at = $3
             WHERE id = $4",
        )
        .bind(hashed_password)
        .bind(UserRole::Admin)
        .bind(now)
        .bind(&user.id)
        .execute(state.db())
        .await?;

        tracing::info!(email = %email, "Updated default admin");
        return Ok(());
    }

    let hashed_password = security::hash_password(&admin.first_admin_password)?;
    repositories::users::create(
        state.db(),
        repositories::users::CreateUser {
            id: &Uuid::new_v4().to_string(),
            firstname: "System",
            lastname: "Admin",
            email,
            hashed_password: &hashed_password,
            role: UserRole::Admin,
            is_active: true,
            created_at: now,
        },
    )
    .await?;

    tracing::info!(email = %email, "Created default admin");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::ensure_admin;
    use crate::core::security;
    use crate::db::types::UserRole;
    use crate::repositories;
    use crate::test_support;

    #[tokio::test]
    async fn creates_then_repairs_admin() {
        let ctx = test_support::setup_test_context().await;
        let email = ctx.state.settings().admin().first_admin_email.clone();

        ensure_admin(&ctx.state).await.expect("bootstrap");
        let created = repositories::users::find_by_email(ctx.state.db(), &email)
            .await
            .expect("lookup")
            .expect("admin row");
        assert_eq!(created.role, UserRole::Admin);
        assert!(created.is_active);

        sqlx::query("UPDATE users SET role = 'student', is_active = FALSE, hashed_password = $1 WHERE id = $2")
            .bind(security::hash_password("something-else").expect("hash"))
            .bind(&created.id)
            .execute(ctx.state.db())
            .await
            .expect("degrade admin");

        ensure_admin(&ctx.state).await.expect("bootstrap again");
        let repaired = repositories::users::find_by_email(ctx.state.db(), &email)
            .await
            .expect("lookup")
            .expect("admin row");
        assert_eq!(repaired.id, created.id);
        assert_eq!(repaired.role, UserRole::Admin);
        assert!(repaired.is_active);
        assert!(security::verify_password(
            &ctx.state.settings().admin().first_admin_password,
            &repaired.hashed_password
        )
        .expect("verify"));
    }
}
