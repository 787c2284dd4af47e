use std::sync::Arc;

use redis::aio::ConnectionManager;
use redis::{cmd, AsyncCommands, Client, RedisError};
use tokio::sync::RwLock;

const REVOKED_TOKEN_PREFIX: &str = "auth:revoked:";

#[derive(Clone)]
pub(crate) struct RedisHandle {
    url: String,
    manager: Arc<RwLock<Option<ConnectionManager>>>,
}

#[derive(Debug, Clone)]
pub(crate) enum RedisHealth {
    Healthy,
    Disconnected,
    Unhealthy(String),
}

impl RedisHandle {
    pub(crate) fn new(url: String) -> Self {
        Self { url, manager: Arc::new(RwLock::new(None)) }
    }

    pub(crate) async fn connect(&self) -> Result<(), RedisError> {
        let client = Client::open(self.url.clone())?;
        let manager = ConnectionManager::new(client).await?;
        let mut guard = self.manager.write().await;
        *guard = Some(manager);
        Ok(())
    }

    pub(crate) async fn disconnect(&self) {
        let mut guard = self.manager.write().await;
        *guard = None;
    }

    async fn manager(&self) -> Option<ConnectionManager> {
        self.manager.read().await.clone()
    }

    pub(crate) async fn health(&self) -> RedisHealth {
        let Some(mut manager) = self.manager().await else {
            return RedisHealth::Disconnected;
        };

        match cmd("PING").query_async::<_, String>(&mut manager).await {
            Ok(_) => RedisHealth::Healthy,
            Err(err) => RedisHealth::Unhealthy(err.to_string()),
        }
    }

    /// Fixed-window counter. Returns `Ok(true)` while under the limit and
    /// also when Redis is not connected.
    pub(crate) async fn rate_limit(
        &self,
        key: &str,
        limit: u64,
        window_seconds: u64,
    ) -> Result<bool, RedisError> {
        let Some(mut manager) = self.manager().await else {
            return Ok(true);
        };

        let script = redis::Script::new(
            r#"
            local current = redis.call("INCR", KEYS[1])
            if current == 1 then
                redis.call("EXPIRE", KEYS[1], ARGV[1])
            end
            return current
        "#,
        );

        let current: i64 =
            script.key(key).arg(window_seconds as i64).invoke_async(&mut manager).await?;

        Ok(current <= limit as i64)
    }

    /// Marks a token id as revoked until it would have expired anyway.
    /// Returns `Ok(false)` when Redis is not connected.
    pub(crate) async fn revoke_token(&self, jti: &str, ttl_seconds: u64) -> Result<bool, RedisError> {
        let Some(mut manager) = self.manager().await else {
            return Ok(false);
        };

        let key = format!("{REVOKED_TOKEN_PREFIX}{jti}");
        manager.set_ex::<_, _, ()>(key, 1, ttl_seconds).await?;
        Ok(true)
    }

    pub(crate) async fn is_token_revoked(&self, jti: &str) -> Result<bool, RedisError> {
        let Some(mut manager) = self.manager().await else {
            return Ok(false);
        };

        let key = format!("{REVOKED_TOKEN_PREFIX}{jti}");
        manager.exists(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::RedisHandle;
    use crate::core::config::Settings;
    use crate::test_support;
    use uuid::Uuid;

    async fn connected_handle() -> RedisHandle {
        test_support::set_test_env();
        let settings = Settings::load().expect("settings");
        test_support::reset_redis(settings.redis().redis_url()).await.expect("redis reset");

        let redis = RedisHandle::new(settings.redis().redis_url());
        redis.connect().await.expect("redis connect");
        redis
    }

    #[tokio::test]
    async fn rate_limit_enforces_limit() {
        let _guard = test_support::env_lock().await;
        let redis = connected_handle().await;

        let key = format!("rate-limit:{}", Uuid::new_v4());
        let first = redis.rate_limit(&key, 1, 5).await.expect("rate limit");
        let second = redis.rate_limit(&key, 1, 5).await.expect("rate limit");

        assert!(first);
        assert!(!second);
    }

    #[tokio::test]
    async fn revoked_token_is_reported() {
        let _guard = test_support::env_lock().await;
        let redis = connected_handle().await;

        let jti = Uuid::new_v4().to_string();
        assert!(!redis.is_token_revoked(&jti).await.expect("exists"));
        assert!(redis.revoke_token(&jti, 30).await.expect("revoke"));
        assert!(redis.is_token_revoked(&jti).await.expect("exists"));
    }

    #[tokio::test]
    async fn disconnected_handle_fails_open() {
        let redis = RedisHandle::new("redis://127.0.0.1:1/0".to_string());
        assert!(redis.rate_limit("any", 0, 5).await.expect("rate limit"));
        assert!(!redis.is_token_revoked("any").await.expect("exists"));
        assert!(!redis.revoke_token("any", 5).await.expect("revoke"));
    }
}
