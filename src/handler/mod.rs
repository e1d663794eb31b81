use crate::request::ServiceRequest;
use async_trait::async_trait;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::Value;
use std::future::Future;
use std::marker::PhantomData;

/// What a handler hands back to the dispatch wrapper.
///
/// A `Value` reply is rendered through the definition's renderer; a raw
/// `Response` passes through untouched.
pub enum HandlerReply {
    Value(Value),
    Response(Response),
}

impl HandlerReply {
    /// Serialize any value into a renderable reply.
    pub fn json<T: Serialize>(value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => Self::Value(value),
            Err(err) => {
                tracing::error!(%err, "failed to serialize handler reply");
                Self::Response(
                    (StatusCode::INTERNAL_SERVER_ERROR, "serialization failed").into_response(),
                )
            }
        }
    }
}

impl From<Value> for HandlerReply {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

impl From<Response> for HandlerReply {
    fn from(response: Response) -> Self {
        Self::Response(response)
    }
}

/// Anything invocable with a request.
///
/// This is the seam the dispatch wrapper calls through once negotiation and
/// validation have passed. Implement it directly for stateful handlers, or
/// use [`handler_fn`] / [`resource_handler`] for the two common shapes.
#[async_trait]
pub trait ServiceHandler: Send + Sync + 'static {
    async fn handle(&self, request: &ServiceRequest) -> HandlerReply;
}

/// Adapter for a plain async function of the request.
pub struct FnHandler<F> {
    f: F,
}

pub fn handler_fn<F, Fut, R>(f: F) -> FnHandler<F>
where
    F: Fn(&ServiceRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<HandlerReply> + Send,
{
    FnHandler { f }
}

#[async_trait]
impl<F, Fut, R> ServiceHandler for FnHandler<F>
where
    F: Fn(&ServiceRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: Into<HandlerReply> + Send,
{
    async fn handle(&self, request: &ServiceRequest) -> HandlerReply {
        (self.f)(request).await.into()
    }
}

/// A value constructed from the request once per call.
///
/// The attribute-style counterpart to [`handler_fn`]: the resource pulls what
/// it needs out of the request at construction time, then the registered
/// method runs on the owned resource.
pub trait Resource: Send + 'static {
    fn from_request(request: &ServiceRequest) -> Self;
}

/// Adapter dispatching to a method on a per-request [`Resource`].
pub struct ResourceHandler<R, F> {
    f: F,
    _resource: PhantomData<fn() -> R>,
}

pub fn resource_handler<R, F, Fut, T>(f: F) -> ResourceHandler<R, F>
where
    R: Resource,
    F: Fn(R) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = T> + Send + 'static,
    T: Into<HandlerReply> + Send,
{
    ResourceHandler {
        f,
        _resource: PhantomData,
    }
}

#[async_trait]
impl<R, F, Fut, T> ServiceHandler for ResourceHandler<R, F>
where
    R: Resource,
    F: Fn(R) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = T> + Send + 'static,
    T: Into<HandlerReply> + Send,
{
    async fn handle(&self, request: &ServiceRequest) -> HandlerReply {
        let resource = R::from_request(request);
        (self.f)(resource).await.into()
    }
}
