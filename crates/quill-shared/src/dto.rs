//! Data Transfer Objects - request/response types for the API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request to register a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Request to login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    /// Extends the token lifetime when set.
    #[serde(default)]
    pub remember: bool,
}

/// Public view of a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// Token issued after registration or login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub user: UserResponse,
}

/// Request to create a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    /// Posts go live immediately unless the client says otherwise.
    #[serde(default = "default_published")]
    pub is_published: bool,
}

fn default_published() -> bool {
    true
}

/// Partial update to a post. Absent fields are left untouched; an empty
/// string clears the optional text fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub category: Option<String>,
    pub is_published: Option<bool>,
}

/// Full view of a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostResponse {
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

/// A page of posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<PostResponse>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_remember_defaults_off() {
        let req: LoginRequest =
            serde_json::from_str(r#"{"email":"a@x.com","password":"secret1"}"#).unwrap();
        assert!(!req.remember);

        let req: LoginRequest = serde_json::from_str(
            r#"{"email":"a@x.com","password":"secret1","remember":true}"#,
        )
        .unwrap();
        assert!(req.remember);
    }

    #[test]
    fn test_create_post_defaults_to_published() {
        let req: CreatePostRequest =
            serde_json::from_str(r#"{"title":"Hello World","content":"long enough body"}"#)
                .unwrap();

        assert!(req.is_published);
        assert_eq!(req.excerpt, None);
        assert_eq!(req.category, None);
    }

    #[test]
    fn test_update_post_fields_are_optional() {
        let req: UpdatePostRequest = serde_json::from_str(r#"{"title":"New Title"}"#).unwrap();

        assert_eq!(req.title.as_deref(), Some("New Title"));
        assert_eq!(req.content, None);
        assert_eq!(req.is_published, None);
    }
}
