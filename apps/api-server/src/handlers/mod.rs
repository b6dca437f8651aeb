//! HTTP handlers and route configuration.

mod auth;
mod health;
mod posts;

use actix_web::web;

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Public routes
            .route("/health", web::get().to(health::health_check))
            // Auth routes
            .service(
                web::scope("/auth")
                    .route("/register", web::post().to(auth::register))
                    .route("/login", web::post().to(auth::login))
                    .route("/me", web::get().to(auth::me)),
            )
            // Post routes
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list))
                    .route("", web::post().to(posts::create))
                    .route("/{id:\\d+}", web::put().to(posts::update))
                    .route("/{id:\\d+}", web::delete().to(posts::delete))
                    .route("/{slug}", web::get().to(posts::get_by_slug)),
            )
            // Browse routes
            .route("/users/{username}/posts", web::get().to(posts::by_author))
            .route(
                "/categories/{category}/posts",
                web::get().to(posts::by_category),
            ),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::header;
    use actix_web::{App, test};
    use serde_json::{Value, json};

    use crate::state::AppState;

    macro_rules! test_app {
        () => {{
            let state = AppState::in_memory();
            let tokens = state.tokens.clone();
            test::init_service(
                App::new()
                    .app_data(actix_web::web::Data::new(state))
                    .app_data(actix_web::web::Data::new(tokens))
                    .configure(configure_routes),
            )
            .await
        }};
    }

    /// Register a user and yield their access token.
    macro_rules! register {
        ($app:expr, $username:expr) => {{
            let req = test::TestRequest::post()
                .uri("/api/auth/register")
                .set_json(json!({
                    "username": $username,
                    "email": format!("{}@x.com", $username),
                    "password": "secret1",
                }))
                .to_request();
            let resp = test::call_service($app, req).await;
            assert_eq!(resp.status().as_u16(), 201);
            let body: Value = test::read_body_json(resp).await;
            body["access_token"].as_str().unwrap().to_string()
        }};
    }

    /// Create a post as the given token's user and yield the response body.
    macro_rules! create_post {
        ($app:expr, $token:expr, $body:expr) => {{
            let req = test::TestRequest::post()
                .uri("/api/posts")
                .insert_header((header::AUTHORIZATION, format!("Bearer {}", $token)))
                .set_json($body)
                .to_request();
            let resp = test::call_service($app, req).await;
            assert_eq!(resp.status().as_u16(), 201);
            let body: Value = test::read_body_json(resp).await;
            body
        }};
    }

    #[actix_web::test]
    async fn test_health() {
        let app = test_app!();

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_register_login_me_flow() {
        let app = test_app!();
        register!(&app, "alice");

        // Duplicate email conflicts
        let req = test::TestRequest::post()
            .uri("/api/auth/register")
            .set_json(json!({
                "username": "alice2",
                "email": "alice@x.com",
                "password": "secret1",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 409);

        // Wrong password is a 401, indistinguishable from unknown email
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"email": "alice@x.com", "password": "wrong!!"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 401);

        // Correct login returns a token that /me accepts
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .set_json(json!({"email": "alice@x.com", "password": "secret1"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 200);
        let body: Value = test::read_body_json(resp).await;
        let token = body["access_token"].as_str().unwrap();

        let req = test::TestRequest::get()
            .uri("/api/auth/me")
            .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 200);
        let me: Value = test::read_body_json(resp).await;
        assert_eq!(me["username"], "alice");
    }

    #[actix_web::test]
    async fn test_me_requires_token() {
        let app = test_app!();

        let req = test::TestRequest::get().uri("/api/auth/me").to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status().as_u16(), 401);
    }

    #[actix_web::test]
    async fn test_post_lifecycle_and_ownership() {
        let app = test_app!();
        let alice = register!(&app, "alice");
        let bob = register!(&app, "bob");

        let first = create_post!(&app, alice, json!({"title": "Hello World", "content": "a body long enough to pass"}));
        assert_eq!(first["slug"], "hello-world");

        // Same title gets the next free disambiguator
        let second = create_post!(&app, alice, json!({"title": "Hello World", "content": "a body long enough to pass"}));
        assert_eq!(second["slug"], "hello-world-2");

        // Bob may not edit Alice's post
        let req = test::TestRequest::put()
            .uri(&format!("/api/posts/{}", first["id"]))
            .insert_header((header::AUTHORIZATION, format!("Bearer {bob}")))
            .set_json(json!({"title": "Hijacked"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 403);

        // Nor delete it
        let req = test::TestRequest::delete()
            .uri(&format!("/api/posts/{}", first["id"]))
            .insert_header((header::AUTHORIZATION, format!("Bearer {bob}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 403);

        // Alice edits her own; a new title means a new slug
        let req = test::TestRequest::put()
            .uri(&format!("/api/posts/{}", first["id"]))
            .insert_header((header::AUTHORIZATION, format!("Bearer {alice}")))
            .set_json(json!({"title": "Goodbye Moon"}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 200);
        let updated: Value = test::read_body_json(resp).await;
        assert_eq!(updated["slug"], "goodbye-moon");

        // And deletes it
        let req = test::TestRequest::delete()
            .uri(&format!("/api/posts/{}", first["id"]))
            .insert_header((header::AUTHORIZATION, format!("Bearer {alice}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 204);

        let req = test::TestRequest::get()
            .uri("/api/posts/goodbye-moon")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 404);
    }

    #[actix_web::test]
    async fn test_create_requires_auth() {
        let app = test_app!();

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .set_json(json!({"title": "Hello World", "content": "a body long enough"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status().as_u16(), 401);
    }

    #[actix_web::test]
    async fn test_browse_routes() {
        let app = test_app!();
        let alice = register!(&app, "alice");
        let bob = register!(&app, "bob");

        create_post!(&app, alice, json!({"title": "Rust Tips", "content": "a body long enough", "category": "rust"}));
        create_post!(&app, bob, json!({"title": "Bob Speaks", "content": "a body long enough"}));
        create_post!(&app, alice, json!({"title": "Secret Draft", "content": "a body long enough", "is_published": false}));

        let req = test::TestRequest::get().uri("/api/posts").to_request();
        let all: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(all["total"], 2);

        let req = test::TestRequest::get()
            .uri("/api/users/alice/posts")
            .to_request();
        let alices: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(alices["total"], 1);
        assert_eq!(alices["posts"][0]["slug"], "rust-tips");

        let req = test::TestRequest::get()
            .uri("/api/categories/rust/posts")
            .to_request();
        let rust: Value = test::read_body_json(test::call_service(&app, req).await).await;
        assert_eq!(rust["total"], 1);

        let req = test::TestRequest::get()
            .uri("/api/users/ghost/posts")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 404);
    }

    #[actix_web::test]
    async fn test_unpublished_post_hidden_from_strangers() {
        let app = test_app!();
        let alice = register!(&app, "alice");
        let bob = register!(&app, "bob");

        create_post!(&app, alice, json!({"title": "Secret Draft", "content": "a body long enough", "is_published": false}));

        // Anonymous: 404
        let req = test::TestRequest::get()
            .uri("/api/posts/secret-draft")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 404);

        // Another user: still 404
        let req = test::TestRequest::get()
            .uri("/api/posts/secret-draft")
            .insert_header((header::AUTHORIZATION, format!("Bearer {bob}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 404);

        // The owner sees it
        let req = test::TestRequest::get()
            .uri("/api/posts/secret-draft")
            .insert_header((header::AUTHORIZATION, format!("Bearer {alice}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 200);
    }

    #[actix_web::test]
    async fn test_validation_errors_are_400() {
        let app = test_app!();
        let alice = register!(&app, "alice");

        let req = test::TestRequest::post()
            .uri("/api/posts")
            .insert_header((header::AUTHORIZATION, format!("Bearer {alice}")))
            .set_json(json!({"title": "ab", "content": "a body long enough"}))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status().as_u16(), 400);
    }
}
