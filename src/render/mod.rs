use axum::Json;
use axum::response::{IntoResponse, Response};
use serde_json::Value;

/// The renderer name every [`Configurator`](crate::Configurator) pre-registers.
pub const DEFAULT_RENDERER: &str = "json";

/// Turns a handler's value reply into an HTTP response.
///
/// Definitions carry a renderer name; the configurator resolves it against
/// its renderer registry at scan time, so an unknown name fails before the
/// application serves a single request.
pub trait Renderer: Send + Sync + 'static {
    fn render(&self, value: Value) -> Response;
}

/// Default renderer: HTTP 200 with an `application/json` body.
#[derive(Default)]
pub struct JsonRenderer;

impl Renderer for JsonRenderer {
    fn render(&self, value: Value) -> Response {
        Json(value).into_response()
    }
}
