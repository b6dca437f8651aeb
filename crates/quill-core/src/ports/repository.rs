use async_trait::async_trait;

use crate::domain::{NewPost, NewUser, Post, User};
use crate::error::RepoError;

/// Generic repository trait defining the operations every entity supports.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Find an entity by its unique ID.
    async fn find_by_id(&self, id: ID) -> Result<Option<T>, RepoError>;

    /// Delete an entity by its ID. `RepoError::NotFound` if no row matched.
    async fn delete(&self, id: ID) -> Result<(), RepoError>;
}

/// User repository with domain-specific methods.
#[async_trait]
pub trait UserRepository: BaseRepository<User, i64> {
    /// Persist a new user; the store assigns the id. Unique violations on
    /// username or email surface as `RepoError::Constraint`.
    async fn create(&self, user: NewUser) -> Result<User, RepoError>;

    /// Find a user by their email address.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepoError>;

    /// Find a user by their username.
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Post repository.
#[async_trait]
pub trait PostRepository: BaseRepository<Post, i64> {
    /// Persist a new post; the store assigns the id. A slug unique violation
    /// surfaces as `RepoError::Constraint` with the store's message.
    async fn create(&self, post: NewPost) -> Result<Post, RepoError>;

    /// Persist changes to an existing post (matched by id).
    async fn update(&self, post: Post) -> Result<Post, RepoError>;

    /// Find a post by its slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// Whether `slug` is already taken, optionally ignoring one post
    /// (the post being retitled).
    async fn slug_exists(&self, slug: &str, exclude_post_id: Option<i64>)
    -> Result<bool, RepoError>;

    /// Published posts, newest first, optionally filtered by author and/or
    /// category.
    async fn list_published(
        &self,
        author_id: Option<i64>,
        category: Option<&str>,
    ) -> Result<Vec<Post>, RepoError>;
}
