//! In-memory repositories - used as fallback when the database is
//! unavailable, and by tests.
//!
//! Both repositories share one [`InMemoryStore`] so relational semantics
//! hold across them: deleting a user also deletes that user's posts, the
//! same cascade the schema enforces in Postgres. Note: data is lost on
//! process restart.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use quill_core::domain::{NewPost, NewUser, Post, User};
use quill_core::error::RepoError;
use quill_core::ports::{BaseRepository, PostRepository, UserRepository};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    posts: Vec<Post>,
}

/// Shared backing store for the in-memory repositories.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
    next_user_id: AtomicI64,
    next_post_id: AtomicI64,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }
}

/// In-memory user repository.
pub struct InMemoryUserRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryUserRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<User, i64> for InMemoryUserRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<User>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.store.tables.write().await;
        let before = tables.users.len();
        tables.users.retain(|u| u.id != id);
        if tables.users.len() == before {
            return Err(RepoError::NotFound);
        }
        // ON DELETE CASCADE
        tables.posts.retain(|p| p.user_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: NewUser) -> Result<User, RepoError> {
        let mut tables = self.store.tables.write().await;
        if tables.users.iter().any(|u| u.username == user.username) {
            return Err(RepoError::Constraint(
                "unique constraint violated on users.username".to_string(),
            ));
        }
        if tables.users.iter().any(|u| u.email == user.email) {
            return Err(RepoError::Constraint(
                "unique constraint violated on users.email".to_string(),
            ));
        }

        let id = self.store.next_user_id.fetch_add(1, Ordering::SeqCst) + 1;
        let user = User {
            id,
            username: user.username,
            email: user.email,
            password_hash: user.password_hash,
            is_admin: user.is_admin,
            phone: user.phone,
            bio: user.bio,
            created_at: user.created_at,
            updated_at: user.updated_at,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }
}

/// In-memory post repository.
pub struct InMemoryPostRepository {
    store: Arc<InMemoryStore>,
}

impl InMemoryPostRepository {
    pub fn new(store: Arc<InMemoryStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BaseRepository<Post, i64> for InMemoryPostRepository {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.id == id).cloned())
    }

    async fn delete(&self, id: i64) -> Result<(), RepoError> {
        let mut tables = self.store.tables.write().await;
        let before = tables.posts.len();
        tables.posts.retain(|p| p.id != id);
        if tables.posts.len() == before {
            return Err(RepoError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn create(&self, post: NewPost) -> Result<Post, RepoError> {
        let mut tables = self.store.tables.write().await;
        if tables.posts.iter().any(|p| p.slug == post.slug) {
            return Err(RepoError::Constraint(
                "unique constraint violated on posts.slug".to_string(),
            ));
        }

        let id = self.store.next_post_id.fetch_add(1, Ordering::SeqCst) + 1;
        let post = Post {
            id,
            user_id: post.user_id,
            title: post.title,
            content: post.content,
            slug: post.slug,
            excerpt: post.excerpt,
            category: post.category,
            is_published: post.is_published,
            created_at: post.created_at,
            updated_at: post.updated_at,
        };
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.store.tables.write().await;
        if tables
            .posts
            .iter()
            .any(|p| p.slug == post.slug && p.id != post.id)
        {
            return Err(RepoError::Constraint(
                "unique constraint violated on posts.slug".to_string(),
            ));
        }
        match tables.posts.iter_mut().find(|p| p.id == post.id) {
            Some(row) => {
                *row = post.clone();
                Ok(post)
            }
            None => Err(RepoError::NotFound),
        }
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.slug == slug).cloned())
    }

    async fn slug_exists(
        &self,
        slug: &str,
        exclude_post_id: Option<i64>,
    ) -> Result<bool, RepoError> {
        let tables = self.store.tables.read().await;
        Ok(tables
            .posts
            .iter()
            .any(|p| p.slug == slug && exclude_post_id != Some(p.id)))
    }

    async fn list_published(
        &self,
        author_id: Option<i64>,
        category: Option<&str>,
    ) -> Result<Vec<Post>, RepoError> {
        let tables = self.store.tables.read().await;
        let mut posts: Vec<Post> = tables
            .posts
            .iter()
            .filter(|p| p.is_published)
            .filter(|p| author_id.is_none_or(|id| p.user_id == id))
            .filter(|p| category.is_none_or(|c| p.category.as_deref() == Some(c)))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }
}
