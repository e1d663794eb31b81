use crate::acl::AclEntry;
use axum::Json;
use axum::body::{Body, Bytes, to_bytes};
use axum::http::header::AsHeaderName;
use axum::http::{HeaderMap, HeaderValue, Method, Request, StatusCode, Uri, header};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;

/// A normalized request handed to validators and handlers.
///
/// Wrapping a raw request collects the body, defaults a missing Content-Type
/// to `application/json` when a body is present, and pre-parses a JSON body.
/// A body that cannot be read at all short-circuits wrapping with a 400
/// response. Validators report problems through the attached [`Errors`]
/// collection instead of failing.
#[derive(Debug)]
pub struct ServiceRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
    json: Option<serde_json::Value>,
    acl: Vec<AclEntry>,
    pub errors: Errors,
}

impl ServiceRequest {
    pub(crate) async fn wrap(request: Request<Body>) -> Result<Self, Response> {
        let (parts, body) = request.into_parts();
        let body = match to_bytes(body, usize::MAX).await {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(%err, "failed to read request body");
                let mut errors = Errors::default();
                errors.add("body", None, "Unable to read request body");
                return Err(json_error(&errors));
            }
        };

        let mut headers = parts.headers;
        if !body.is_empty() && !headers.contains_key(header::CONTENT_TYPE) {
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }

        let json = if !body.is_empty() && is_json(headers.get(header::CONTENT_TYPE)) {
            serde_json::from_slice(&body).ok()
        } else {
            None
        };

        Ok(Self {
            method: parts.method,
            uri: parts.uri,
            headers,
            body,
            json,
            acl: Vec::new(),
            errors: Errors::default(),
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// A single header value, when present and valid UTF-8.
    pub fn header(&self, name: impl AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// The body parsed as JSON, if it was parseable.
    pub fn json(&self) -> Option<&serde_json::Value> {
        self.json.as_ref()
    }

    /// The access-control list produced by the route's ACL factory, if any.
    pub fn acl(&self) -> &[AclEntry] {
        &self.acl
    }

    pub(crate) fn set_acl(&mut self, acl: Vec<AclEntry>) {
        self.acl = acl;
    }
}

/// One structured validation problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEntry {
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub description: String,
}

/// The per-request error collection validators report into.
#[derive(Debug, Clone)]
pub struct Errors {
    entries: Vec<ErrorEntry>,
    pub status: StatusCode,
}

impl Default for Errors {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            status: StatusCode::BAD_REQUEST,
        }
    }
}

impl Errors {
    pub fn add(&mut self, location: &str, name: Option<&str>, description: impl Into<String>) {
        self.entries.push(ErrorEntry {
            location: location.to_string(),
            name: name.map(str::to_string),
            description: description.into(),
        });
    }

    pub fn entries(&self) -> &[ErrorEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Build the JSON error response for a non-empty error collection.
pub fn json_error(errors: &Errors) -> Response {
    let body = json!({
        "status": "error",
        "errors": errors.entries(),
    });
    (errors.status, Json(body)).into_response()
}

fn is_json(content_type: Option<&HeaderValue>) -> bool {
    content_type
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            let mime = value.split(';').next().unwrap_or(value).trim();
            mime == "application/json" || mime.ends_with("+json")
        })
        .unwrap_or(false)
}
