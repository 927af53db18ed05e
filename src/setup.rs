use crate::config::Config;
use crate::seed;
use crate::server::AppState;
use crate::store::{ExpiredDeletion, MemoryStore, RedisStore, Store};
use color_eyre::eyre::Context;
use std::sync::Arc;
use std::time::Duration;

const MARKER_SWEEP_PERIOD: Duration = Duration::from_secs(60);

pub async fn setup(config: &Config) -> color_eyre::Result<AppState> {
    let store: Arc<dyn Store> = if let Some(redis_config) = &config.redis {
        tracing::info!("Redis URI provided, using Redis for record storage.");
        let redis_conn = redis_config
            .start()
            .await
            .wrap_err("Failed to start Redis")?;
        Arc::new(RedisStore::new(redis_conn))
    } else {
        tracing::info!("No Redis URI, using in-memory record storage.");
        let store = MemoryStore::new();
        tokio::spawn(
            store
                .clone()
                .delete_expired_markers(MARKER_SWEEP_PERIOD),
        );
        Arc::new(store)
    };

    if config.auth.uses_default_secret() {
        tracing::warn!("Using the built-in JWT secret, set APP_AUTH__JWT_SECRET in production");
    }

    let state = AppState::new(store, &config.auth);

    if config.seed.enabled {
        seed::seed(&config.seed, &state.users, &state.announcements)
            .await
            .wrap_err("Failed to seed initial data")?;
    }

    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_setup_seeds_memory_store() {
        let overrides = HashMap::from([
            ("auth.password_iterations".to_owned(), "1".to_owned()),
            ("seed.enabled".to_owned(), "true".to_owned()),
        ]);
        let config = Config::load_with_sources(Some(overrides)).unwrap();

        let state = setup(&config).await.unwrap();
        let admin = state
            .users
            .find_by_email(&config.seed.admin_email)
            .await
            .unwrap()
            .unwrap();
        assert!(admin.is_barangay());
        assert!(state.announcements.count().await.unwrap() > 0);
    }
}
