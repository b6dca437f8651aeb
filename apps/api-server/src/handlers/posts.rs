//! Post handlers - browsing, creation, and ownership-gated mutation.

use actix_web::{HttpResponse, web};
use serde::Deserialize;

use quill_core::domain::Post;
use quill_core::services::{CreatePostInput, PostFilter, UpdatePostInput, can_modify};
use quill_shared::dto::{CreatePostRequest, PostListResponse, PostResponse, UpdatePostRequest};

use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

fn post_response(post: Post) -> PostResponse {
    PostResponse {
        id: post.id,
        user_id: post.user_id,
        title: post.title,
        content: post.content,
        slug: post.slug,
        excerpt: post.excerpt,
        category: post.category,
        is_published: post.is_published,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}

fn list_response(posts: Vec<Post>) -> PostListResponse {
    let posts: Vec<PostResponse> = posts.into_iter().map(post_response).collect();
    PostListResponse {
        total: posts.len(),
        posts,
    }
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<String>,
}

/// GET /api/posts?category=
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
) -> AppResult<HttpResponse> {
    let posts = state
        .content
        .list_published(PostFilter {
            category: query.into_inner().category,
            ..Default::default()
        })
        .await?;

    Ok(HttpResponse::Ok().json(list_response(posts)))
}

/// GET /api/posts/{slug}
///
/// Unpublished posts are visible to their owner (or an admin) only;
/// everyone else gets the same 404 as for a slug that never existed.
pub async fn get_by_slug(
    state: web::Data<AppState>,
    path: web::Path<String>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    let slug = path.into_inner();
    let not_found = || AppError::NotFound(format!("post {slug} not found"));

    let post = state
        .content
        .get_by_slug(&slug)
        .await?
        .ok_or_else(not_found)?;

    if !post.is_published {
        let caller = match identity.0 {
            Some(identity) => state.identity.get_by_id(identity.user_id).await?,
            None => None,
        };
        let allowed = caller.is_some_and(|user| can_modify(post.user_id, &user));
        if !allowed {
            return Err(not_found());
        }
    }

    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// POST /api/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let post = state
        .content
        .create_post(
            identity.user_id,
            CreatePostInput {
                title: req.title,
                content: req.content,
                excerpt: req.excerpt,
                category: req.category,
                is_published: req.is_published,
            },
        )
        .await?;

    tracing::info!(post_id = post.id, slug = %post.slug, "Post created");

    Ok(HttpResponse::Created().json(post_response(post)))
}

/// PUT /api/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
    body: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let post = state
        .content
        .update_post(
            path.into_inner(),
            identity.user_id,
            UpdatePostInput {
                title: req.title,
                content: req.content,
                excerpt: req.excerpt,
                category: req.category,
                is_published: req.is_published,
            },
        )
        .await?;

    Ok(HttpResponse::Ok().json(post_response(post)))
}

/// DELETE /api/posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> AppResult<HttpResponse> {
    let post_id = path.into_inner();
    state.content.delete_post(post_id, identity.user_id).await?;

    tracing::info!(post_id, "Post deleted");

    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/users/{username}/posts
pub async fn by_author(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let posts = state
        .content
        .list_published(PostFilter {
            author_username: Some(path.into_inner()),
            ..Default::default()
        })
        .await?;

    Ok(HttpResponse::Ok().json(list_response(posts)))
}

/// GET /api/categories/{category}/posts
pub async fn by_category(
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> AppResult<HttpResponse> {
    let posts = state
        .content
        .list_published(PostFilter {
            category: Some(path.into_inner()),
            ..Default::default()
        })
        .await?;

    Ok(HttpResponse::Ok().json(list_response(posts)))
}
