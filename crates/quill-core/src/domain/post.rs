use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Post entity - a blog post owned by a user, addressable by its slug.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A post about to be persisted. The id is assigned by the store; the slug
/// must already be resolved against the existing slug set.
#[derive(Debug, Clone)]
pub struct NewPost {
    pub user_id: i64,
    pub title: String,
    pub content: String,
    pub slug: String,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub is_published: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl NewPost {
    /// Create a published post draft with fresh timestamps.
    pub fn new(user_id: i64, title: String, content: String, slug: String) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            title,
            content,
            slug,
            excerpt: None,
            category: None,
            is_published: true,
            created_at: now,
            updated_at: now,
        }
    }
}
