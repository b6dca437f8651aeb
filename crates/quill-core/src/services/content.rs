//! Content service - post CRUD, slug allocation, and ownership checks.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::slug::slugify;
use crate::domain::{NewPost, Post, User};
use crate::error::{DomainError, RepoError};
use crate::ports::{PostRepository, UserRepository};

const TITLE_MIN: usize = 3;
const TITLE_MAX: usize = 255;
const CONTENT_MIN: usize = 10;
const EXCERPT_MAX: usize = 500;
const CATEGORY_MAX: usize = 100;

/// Attempts at persisting a freshly resolved slug before giving up. Every
/// retry re-probes the table, so a handful is plenty even under contention.
const MAX_SLUG_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone)]
pub struct CreatePostInput {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub is_published: bool,
}

/// Partial update. `None` leaves a field untouched; an empty string clears
/// the optional text fields.
#[derive(Debug, Clone, Default)]
pub struct UpdatePostInput {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub is_published: Option<bool>,
}

#[derive(Debug, Clone, Default)]
pub struct PostFilter {
    pub author_username: Option<String>,
    pub category: Option<String>,
}

/// Owns the post lifecycle: creation with slug allocation, ownership-gated
/// mutation, and published listings.
pub struct ContentService {
    posts: Arc<dyn PostRepository>,
    users: Arc<dyn UserRepository>,
}

impl ContentService {
    pub fn new(posts: Arc<dyn PostRepository>, users: Arc<dyn UserRepository>) -> Self {
        Self { posts, users }
    }

    /// Create a post for `author_id`, deriving a unique slug from the title.
    ///
    /// The slug is probed before the insert; if a concurrent writer claims
    /// the same slug between probe and commit, the unique index rejects the
    /// insert and we re-probe, a bounded number of times.
    pub async fn create_post(
        &self,
        author_id: i64,
        input: CreatePostInput,
    ) -> Result<Post, DomainError> {
        validate_title(&input.title)?;
        validate_content(&input.content)?;
        let excerpt = normalize_optional(input.excerpt);
        let category = normalize_optional(input.category);
        validate_excerpt(excerpt.as_deref())?;
        validate_category(category.as_deref())?;

        if self.users.find_by_id(author_id).await?.is_none() {
            return Err(DomainError::Forbidden("unknown author".to_string()));
        }

        let base = slugify(&input.title);
        let mut draft = NewPost::new(author_id, input.title, input.content, base.clone());
        draft.excerpt = excerpt;
        draft.category = category;
        draft.is_published = input.is_published;

        for _ in 0..MAX_SLUG_ATTEMPTS {
            draft.slug = self.resolve_slug(&base, None).await?;
            match self.posts.create(draft.clone()).await {
                Ok(post) => return Ok(post),
                Err(RepoError::Constraint(msg)) if is_slug_conflict(&msg) => continue,
                Err(err) => return Err(err.into()),
            }
        }
        Err(DomainError::Conflict(
            "could not allocate a unique slug, retry the request".to_string(),
        ))
    }

    /// Apply a partial update to a post. Only the owner or an admin may
    /// modify it; a changed title re-derives the slug.
    pub async fn update_post(
        &self,
        post_id: i64,
        editor_id: i64,
        input: UpdatePostInput,
    ) -> Result<Post, DomainError> {
        let Some(post) = self.posts.find_by_id(post_id).await? else {
            return Err(DomainError::not_found("post", post_id));
        };
        let Some(editor) = self.users.find_by_id(editor_id).await? else {
            return Err(DomainError::Forbidden("unknown editor".to_string()));
        };
        if !can_modify(post.user_id, &editor) {
            return Err(DomainError::Forbidden(
                "only the author may modify this post".to_string(),
            ));
        }

        let mut updated = post;
        let mut title_changed = false;
        if let Some(title) = input.title {
            validate_title(&title)?;
            title_changed = title != updated.title;
            updated.title = title;
        }
        if let Some(content) = input.content {
            validate_content(&content)?;
            updated.content = content;
        }
        if let Some(excerpt) = input.excerpt {
            let excerpt = normalize_optional(Some(excerpt));
            validate_excerpt(excerpt.as_deref())?;
            updated.excerpt = excerpt;
        }
        if let Some(category) = input.category {
            let category = normalize_optional(Some(category));
            validate_category(category.as_deref())?;
            updated.category = category;
        }
        if let Some(is_published) = input.is_published {
            updated.is_published = is_published;
        }
        updated.updated_at = Utc::now();

        if !title_changed {
            return match self.posts.update(updated).await {
                Ok(post) => Ok(post),
                // deleted out from under us
                Err(RepoError::NotFound) => Err(DomainError::not_found("post", post_id)),
                Err(err) => Err(err.into()),
            };
        }

        let base = slugify(&updated.title);
        for _ in 0..MAX_SLUG_ATTEMPTS {
            updated.slug = self.resolve_slug(&base, Some(post_id)).await?;
            match self.posts.update(updated.clone()).await {
                Ok(post) => return Ok(post),
                Err(RepoError::Constraint(msg)) if is_slug_conflict(&msg) => continue,
                Err(RepoError::NotFound) => return Err(DomainError::not_found("post", post_id)),
                Err(err) => return Err(err.into()),
            }
        }
        Err(DomainError::Conflict(
            "could not allocate a unique slug, retry the request".to_string(),
        ))
    }

    /// Delete a post. Same ownership rules as [`Self::update_post`].
    pub async fn delete_post(&self, post_id: i64, editor_id: i64) -> Result<(), DomainError> {
        let Some(post) = self.posts.find_by_id(post_id).await? else {
            return Err(DomainError::not_found("post", post_id));
        };
        let Some(editor) = self.users.find_by_id(editor_id).await? else {
            return Err(DomainError::Forbidden("unknown editor".to_string()));
        };
        if !can_modify(post.user_id, &editor) {
            return Err(DomainError::Forbidden(
                "only the author may delete this post".to_string(),
            ));
        }

        match self.posts.delete(post_id).await {
            Ok(()) => Ok(()),
            // lost a race with another delete
            Err(RepoError::NotFound) => Err(DomainError::not_found("post", post_id)),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn get_by_id(&self, id: i64) -> Result<Option<Post>, DomainError> {
        Ok(self.posts.find_by_id(id).await?)
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Option<Post>, DomainError> {
        Ok(self.posts.find_by_slug(slug).await?)
    }

    /// List published posts, newest first, optionally narrowed to an author
    /// or a category. An unknown author is a not-found error rather than an
    /// empty list.
    pub async fn list_published(&self, filter: PostFilter) -> Result<Vec<Post>, DomainError> {
        let author_id = match &filter.author_username {
            Some(username) => match self.users.find_by_username(username).await? {
                Some(user) => Some(user.id),
                None => return Err(DomainError::not_found("user", username)),
            },
            None => None,
        };

        Ok(self
            .posts
            .list_published(author_id, filter.category.as_deref())
            .await?)
    }

    /// Walk `base`, `base-2`, `base-3`, ... until a candidate has no matching
    /// row. `exclude_post_id` lets an update keep its own slug.
    async fn resolve_slug(
        &self,
        base: &str,
        exclude_post_id: Option<i64>,
    ) -> Result<String, DomainError> {
        if !self.posts.slug_exists(base, exclude_post_id).await? {
            return Ok(base.to_string());
        }
        let mut n: u64 = 2;
        loop {
            let candidate = format!("{base}-{n}");
            if !self.posts.slug_exists(&candidate, exclude_post_id).await? {
                return Ok(candidate);
            }
            n += 1;
        }
    }
}

/// Whether `editor` may mutate a post owned by `owner_id`. Admins may touch
/// anything; everyone else only their own posts.
pub fn can_modify(owner_id: i64, editor: &User) -> bool {
    editor.id == owner_id || editor.is_admin
}

/// Constraint messages name the violated index; only slug collisions are
/// worth retrying, other unique violations bubble up as conflicts.
fn is_slug_conflict(message: &str) -> bool {
    message.to_lowercase().contains("slug")
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

fn validate_title(title: &str) -> Result<(), DomainError> {
    let len = title.chars().count();
    if len < TITLE_MIN || len > TITLE_MAX {
        return Err(DomainError::validation(format!(
            "title must be between {TITLE_MIN} and {TITLE_MAX} characters"
        )));
    }
    Ok(())
}

fn validate_content(content: &str) -> Result<(), DomainError> {
    if content.chars().count() < CONTENT_MIN {
        return Err(DomainError::validation(format!(
            "content must be at least {CONTENT_MIN} characters"
        )));
    }
    Ok(())
}

fn validate_excerpt(excerpt: Option<&str>) -> Result<(), DomainError> {
    match excerpt {
        Some(e) if e.chars().count() > EXCERPT_MAX => Err(DomainError::validation(format!(
            "excerpt must be at most {EXCERPT_MAX} characters"
        ))),
        _ => Ok(()),
    }
}

fn validate_category(category: Option<&str>) -> Result<(), DomainError> {
    match category {
        Some(c) if c.chars().count() > CATEGORY_MAX => Err(DomainError::validation(format!(
            "category must be at most {CATEGORY_MAX} characters"
        ))),
        _ => Ok(()),
    }
}
