//! Host header guard - rejects requests addressed to unknown host names.
//!
//! The allow-list comes from `ALLOWED_HOSTS`. A single `*` entry disables
//! the check (useful behind a trusted proxy).

use actix_web::{
    Error,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
    http::header,
};
use std::future::{Future, Ready, ready};
use std::pin::Pin;
use std::rc::Rc;

use crate::middleware::error::AppError;

/// Middleware that validates the request's Host header.
pub struct HostGuard {
    allowed: Rc<Vec<String>>,
}

impl HostGuard {
    pub fn new(allowed_hosts: Vec<String>) -> Self {
        Self {
            allowed: Rc::new(allowed_hosts),
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for HostGuard
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Transform = HostGuardService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(HostGuardService {
            service,
            allowed: self.allowed.clone(),
        }))
    }
}

pub struct HostGuardService<S> {
    service: S,
    allowed: Rc<Vec<String>>,
}

impl<S, B> Service<ServiceRequest> for HostGuardService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if !host_allowed(&req, &self.allowed) {
            let host = request_host(&req).unwrap_or_default();
            tracing::warn!(host = %host, "Rejected request for disallowed host");
            return Box::pin(ready(Err(AppError::BadRequest(format!(
                "host {host:?} is not served here"
            ))
            .into())));
        }

        let fut = self.service.call(req);
        Box::pin(fut)
    }
}

fn host_allowed(req: &ServiceRequest, allowed: &[String]) -> bool {
    if allowed.iter().any(|h| h == "*") {
        return true;
    }
    match request_host(req) {
        Some(host) => allowed.iter().any(|h| h == &host),
        None => false,
    }
}

/// Host header value, lowercased, with any port stripped.
fn request_host(req: &ServiceRequest) -> Option<String> {
    let value = req.headers().get(header::HOST)?.to_str().ok()?;
    let host = value.rsplit_once(':').map_or(value, |(h, _)| h);
    Some(host.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, HttpResponse, test, web};

    async fn ok() -> HttpResponse {
        HttpResponse::Ok().finish()
    }

    fn guard(hosts: &[&str]) -> HostGuard {
        HostGuard::new(hosts.iter().map(|h| h.to_string()).collect())
    }

    #[actix_web::test]
    async fn test_allows_listed_host() {
        let app = test::init_service(
            App::new()
                .wrap(guard(&["example.com"]))
                .route("/", web::get().to(ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::HOST, "example.com"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_ignores_port_and_case() {
        let app = test::init_service(
            App::new()
                .wrap(guard(&["example.com"]))
                .route("/", web::get().to(ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::HOST, "Example.COM:8080"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
    }

    #[actix_web::test]
    async fn test_rejects_unknown_host() {
        let app = test::init_service(
            App::new()
                .wrap(guard(&["example.com"]))
                .route("/", web::get().to(ok)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::HOST, "evil.test"))
            .to_request();
        let resp = test::try_call_service(&app, req).await;

        let err = resp.unwrap_err();
        assert_eq!(err.as_response_error().status_code().as_u16(), 400);
    }

    #[actix_web::test]
    async fn test_wildcard_disables_check() {
        let app =
            test::init_service(App::new().wrap(guard(&["*"])).route("/", web::get().to(ok))).await;

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::HOST, "anything.example"))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert!(resp.status().is_success());
    }
}
