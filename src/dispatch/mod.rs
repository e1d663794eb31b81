use crate::acl::AclFactory;
use crate::handler::{HandlerReply, ServiceHandler};
use crate::negotiation::{self, Acceptable};
use crate::render::Renderer;
use crate::request::{ServiceRequest, json_error};
use crate::validation::Validator;
use axum::Json;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

/// The view mounted for one (path, method): content negotiation, then
/// validation, then the real handler.
pub(crate) struct ServiceView {
    pub(crate) service: String,
    pub(crate) path: String,
    pub(crate) accept: Option<Acceptable>,
    pub(crate) validators: Vec<Arc<dyn Validator>>,
    pub(crate) renderer: Arc<dyn Renderer>,
    pub(crate) acl_factory: Option<AclFactory>,
    pub(crate) handler: Arc<dyn ServiceHandler>,
}

impl ServiceView {
    pub(crate) async fn call(self: Arc<Self>, request: Request<Body>) -> Response {
        let mut request = match ServiceRequest::wrap(request).await {
            Ok(request) => request,
            Err(response) => return response,
        };

        if let Some(factory) = &self.acl_factory {
            let acl = factory(&request);
            request.set_acl(acl);
        }

        // Negotiation only applies when the definition constrains content
        // types and the client stated a preference.
        if let Some(acceptable) = &self.accept {
            if let Some(sent) = request.header(header::ACCEPT) {
                let offered = acceptable.resolve(&request);
                if negotiation::best_match(sent, &offered).is_none() {
                    tracing::debug!(
                        service = %self.service,
                        path = %self.path,
                        "no acceptable content type, returning 406"
                    );
                    return not_acceptable(&offered);
                }
            }
        }

        for validator in &self.validators {
            validator.validate(&mut request).await;
            if !request.errors.is_empty() {
                tracing::debug!(
                    service = %self.service,
                    path = %self.path,
                    errors = request.errors.len(),
                    "validation failed"
                );
                return json_error(&request.errors);
            }
        }

        match self.handler.handle(&request).await {
            HandlerReply::Value(value) => self.renderer.render(value),
            HandlerReply::Response(response) => response,
        }
    }
}

/// HTTP 406 whose body is exactly the JSON-encoded list of acceptable types.
fn not_acceptable(offered: &[String]) -> Response {
    (StatusCode::NOT_ACCEPTABLE, Json(offered.to_vec())).into_response()
}

#[cfg(test)]
mod tests {
    use crate::acl::AclEntry;
    use crate::config::Configurator;
    use crate::handler::{ServiceHandler, handler_fn};
    use crate::request::ServiceRequest;
    use crate::service::{Api, Service};
    use crate::validation::validator_fn;
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{Value, json};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn spy_handler(called: Arc<AtomicBool>) -> impl ServiceHandler {
        handler_fn(move |_request: &ServiceRequest| {
            let called = Arc::clone(&called);
            async move {
                called.store(true, Ordering::SeqCst);
                json!({"ok": true})
            }
        })
    }

    fn build_router(service: Service) -> Router {
        let mut config = Configurator::new();
        config.register(service);
        config.build().unwrap()
    }

    fn get_with_accept(uri: &str, accept: &str) -> Request<Body> {
        Request::builder()
            .method("GET")
            .uri(uri)
            .header("accept", accept)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn matching_accept_reaches_the_handler() {
        let called = Arc::new(AtomicBool::new(false));
        let mut service = Service::new("ping", "/ping");
        service.get(
            Api::new().accept(["application/json", "text/plain"]),
            spy_handler(Arc::clone(&called)),
        );
        let router = build_router(service);

        let response = router
            .oneshot(get_with_accept("/ping", "application/json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({"ok": true}));
        assert!(called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn unacceptable_accept_returns_406_with_choices() {
        let called = Arc::new(AtomicBool::new(false));
        let mut service = Service::new("ping", "/ping");
        service.get(
            Api::new().accept(["application/json", "text/plain"]),
            spy_handler(Arc::clone(&called)),
        );
        let router = build_router(service);

        let response = router
            .oneshot(get_with_accept("/ping", "text/html"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
        assert_eq!(
            body_json(response).await,
            json!(["application/json", "text/plain"])
        );
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn missing_accept_header_skips_negotiation() {
        let called = Arc::new(AtomicBool::new(false));
        let mut service = Service::new("ping", "/ping");
        service.get(
            Api::new().accept("application/json"),
            spy_handler(Arc::clone(&called)),
        );
        let router = build_router(service);

        let request = Request::builder()
            .method("GET")
            .uri("/ping")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn dynamic_accept_is_computed_from_the_request() {
        let called = Arc::new(AtomicBool::new(false));
        let mut service = Service::new("ping", "/ping");
        service.get(
            Api::new().accept_fn(|_request| vec!["application/xml".to_string()]),
            spy_handler(Arc::clone(&called)),
        );
        let router = build_router(service);

        let response = router
            .oneshot(get_with_accept("/ping", "application/json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
        assert_eq!(body_json(response).await, json!(["application/xml"]));
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn failing_validator_short_circuits_before_the_handler() {
        let called = Arc::new(AtomicBool::new(false));
        let mut service = Service::new("things", "/things");
        service.get(
            Api::new().validator(validator_fn(|request: &mut ServiceRequest| {
                request.errors.add("body", Some("name"), "Missing field name");
            })),
            spy_handler(Arc::clone(&called)),
        );
        let router = build_router(service);

        let request = Request::builder()
            .method("GET")
            .uri("/things")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["errors"][0]["name"], "name");
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn validators_still_run_when_negotiation_succeeds() {
        let called = Arc::new(AtomicBool::new(false));
        let mut service = Service::new("things", "/things");
        service.get(
            Api::new()
                .accept("application/json")
                .validator(validator_fn(|request: &mut ServiceRequest| {
                    request.errors.add("querystring", None, "Bad query");
                })),
            spy_handler(Arc::clone(&called)),
        );
        let router = build_router(service);

        let response = router
            .oneshot(get_with_accept("/things", "application/json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(!called.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn validators_run_in_the_order_supplied() {
        let mut service = Service::new("things", "/things");
        service.get(
            Api::new()
                .validator(validator_fn(|request: &mut ServiceRequest| {
                    request.errors.add("body", None, "first");
                }))
                .validator(validator_fn(|request: &mut ServiceRequest| {
                    request.errors.add("body", None, "second");
                })),
            handler_fn(|_request: &ServiceRequest| async move { json!(null) }),
        );
        let router = build_router(service);

        let request = Request::builder()
            .method("GET")
            .uri("/things")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        // The first failing validator short-circuits; the second never runs.
        let body = body_json(response).await;
        assert_eq!(body["errors"].as_array().unwrap().len(), 1);
        assert_eq!(body["errors"][0]["description"], "first");
    }

    #[tokio::test]
    async fn acl_factory_output_is_attached_to_the_request() {
        let mut service = Service::new("admin", "/admin")
            .acl(|_request| vec![AclEntry::allow("group:admins", "view")]);
        service.get(
            Api::new(),
            handler_fn(|request: &ServiceRequest| {
                let acl = request.acl().to_vec();
                async move { serde_json::to_value(&acl).unwrap() }
            }),
        );
        let router = build_router(service);

        let request = Request::builder()
            .method("GET")
            .uri("/admin")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!([{"action": "allow", "principal": "group:admins", "permission": "view"}])
        );
    }

    #[tokio::test]
    async fn raw_response_replies_bypass_the_renderer() {
        use axum::response::IntoResponse;

        let mut service = Service::new("teapot", "/teapot");
        service.get(
            Api::new(),
            handler_fn(|_request: &ServiceRequest| async move {
                (StatusCode::IM_A_TEAPOT, "short and stout").into_response()
            }),
        );
        let router = build_router(service);

        let request = Request::builder()
            .method("GET")
            .uri("/teapot")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::IM_A_TEAPOT);
    }
}
