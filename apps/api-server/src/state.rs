//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{PostRepository, TokenService, UserRepository};
use quill_core::services::{ContentService, IdentityService};
use quill_infra::auth::{Argon2PasswordService, JwtTokenService};
use quill_infra::database::{DatabaseConfig, DatabaseConnections, InMemoryStore};
use quill_infra::database::{InMemoryPostRepository, InMemoryUserRepository};

#[cfg(feature = "postgres")]
use quill_infra::database::{PostgresPostRepository, PostgresUserRepository};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub identity: Arc<IdentityService>,
    pub content: Arc<ContentService>,
    pub tokens: Arc<dyn TokenService>,
    pub db: Option<Arc<DatabaseConnections>>,
}

type Repos = (Arc<dyn UserRepository>, Arc<dyn PostRepository>);

fn in_memory_repos() -> Repos {
    let store = InMemoryStore::new();
    (
        Arc::new(InMemoryUserRepository::new(store.clone())),
        Arc::new(InMemoryPostRepository::new(store)),
    )
}

impl AppState {
    /// Build the application state with appropriate implementations.
    pub async fn new(db_config: Option<&DatabaseConfig>) -> Self {
        #[cfg(feature = "postgres")]
        let (db, user_repo, post_repo): (Option<Arc<DatabaseConnections>>, _, _) = {
            if let Some(config) = db_config {
                match DatabaseConnections::init(config).await {
                    Ok(connections) => {
                        let conn = Arc::new(connections);
                        let users: Arc<dyn UserRepository> =
                            Arc::new(PostgresUserRepository::new(conn.main.clone()));
                        let posts: Arc<dyn PostRepository> =
                            Arc::new(PostgresPostRepository::new(conn.main.clone()));
                        (Some(conn), users, posts)
                    }
                    Err(e) => {
                        tracing::error!(
                            "Failed to connect to database: {}. Using in-memory fallback.",
                            e
                        );
                        let (users, posts) = in_memory_repos();
                        (None, users, posts)
                    }
                }
            } else {
                tracing::warn!("DATABASE_URL not set. Running without database (in-memory mode).");
                let (users, posts) = in_memory_repos();
                (None, users, posts)
            }
        };

        #[cfg(not(feature = "postgres"))]
        let (db, user_repo, post_repo): (Option<Arc<DatabaseConnections>>, _, _) = {
            let _ = db_config;
            tracing::info!("Running without postgres feature - using in-memory repositories");
            let (users, posts) = in_memory_repos();
            (None, users, posts)
        };

        let state = Self::with_repos(user_repo, post_repo, db);
        tracing::info!("Application state initialized");
        state
    }

    /// Wire the services over the given repositories.
    fn with_repos(
        users: Arc<dyn UserRepository>,
        posts: Arc<dyn PostRepository>,
        db: Option<Arc<DatabaseConnections>>,
    ) -> Self {
        let passwords = Arc::new(Argon2PasswordService::new());
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::from_env());

        Self {
            identity: Arc::new(IdentityService::new(users.clone(), passwords)),
            content: Arc::new(ContentService::new(posts, users)),
            tokens,
            db,
        }
    }

    /// State backed entirely by the in-memory store. Used by tests.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        let (users, posts) = in_memory_repos();
        Self::with_repos(users, posts, None)
    }
}
