//! # Declarest
//!
//! Declarative REST service registration for axum.
//!
//! Declare an endpoint once (path, methods, content negotiation, validators,
//! access control) and let a [`Configurator`] wire up routes, dispatch
//! wrappers, and documentation entries during a one-time scan at startup.
//!
//! ## Features
//!
//! - **Service descriptors**: one [`Service`] per logical endpoint, with
//!   per-method option sets merged over descriptor defaults
//! - **Deferred registration**: descriptors capture what to register;
//!   the configurator's scan phase does the wiring exactly once
//! - **Content negotiation**: per-method acceptable types, static or
//!   computed from the request, with HTTP 406 listing the choices on mismatch
//! - **Validation**: validators report structured errors into the request
//!   and keep the handler from running
//! - **Access control**: an ACL factory per route, evaluated per request
//! - **API docs**: every (path, method) pair lands in a runtime-readable
//!   documentation registry
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use declarest::{Api, Configurator, Service, handler_fn};
//! use declarest::request::ServiceRequest;
//! use declarest::validation::builtins::RequireJsonBody;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() {
//!     // 1. Describe the endpoint
//!     let mut users = Service::new("users", "/users/{id}")
//!         .description("User lookup and update");
//!
//!     users.get(
//!         Api::new().accept("application/json"),
//!         handler_fn(|request: &ServiceRequest| {
//!             let path = request.path().to_string();
//!             async move { json!({"at": path}) }
//!         }),
//!     );
//!
//!     users.put(
//!         Api::new().validator(RequireJsonBody),
//!         handler_fn(|_request: &ServiceRequest| async move { json!({"updated": true}) }),
//!     );
//!
//!     // 2. Register and scan
//!     let mut config = Configurator::new();
//!     config.register(users);
//!     let app = config.build().expect("invalid service configuration");
//!
//!     // 3. Serve
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod acl;
pub mod apidoc;
pub mod config;
mod dispatch;
pub mod error;
pub mod handler;
pub mod negotiation;
pub mod render;
pub mod request;
pub mod service;
pub mod validation;

// Re-export core types
pub use config::{Configurator, ServiceRecord};
pub use error::{ConfigError, Result};
pub use handler::{HandlerReply, ServiceHandler, handler_fn, resource_handler};
pub use request::ServiceRequest;
pub use service::{Api, Service};
pub use validation::{Validator, validator_fn};

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use declarest::prelude::*;
/// ```
pub mod prelude {
    pub use crate::acl::{AclAction, AclEntry, AclFactory};
    pub use crate::apidoc::{ApiDoc, ApiDocRegistry};
    pub use crate::config::{Configurator, ServiceRecord};
    pub use crate::error::{ConfigError, Result};
    pub use crate::handler::{
        FnHandler, HandlerReply, Resource, ResourceHandler, ServiceHandler, handler_fn,
        resource_handler,
    };
    pub use crate::negotiation::{Acceptable, best_match};
    pub use crate::render::{JsonRenderer, Renderer};
    pub use crate::request::{ErrorEntry, Errors, ServiceRequest, json_error};
    pub use crate::service::{Api, Service};
    pub use crate::validation::builtins::*;
    pub use crate::validation::{Validator, validator_fn};
    pub use async_trait::async_trait;
    pub use axum::{
        Json, Router,
        http::{Method, StatusCode},
        response::{IntoResponse, Response},
    };
    pub use std::sync::Arc;
}
