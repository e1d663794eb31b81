use crate::acl::{AclEntry, AclFactory};
use crate::handler::ServiceHandler;
use crate::negotiation::Acceptable;
use crate::render::DEFAULT_RENDERER;
use crate::request::ServiceRequest;
use crate::validation::Validator;
use axum::http::Method;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Call-time options for a single method registration.
///
/// Unset fields fall back to the service defaults; `extras` merge per key,
/// with call-time keys winning. Extras carry through to the API-doc entry
/// untouched; `accept` and `validators` stay in the dispatch wrapper and are
/// never part of the view registration itself.
#[derive(Clone, Default)]
pub struct Api {
    pub(crate) renderer: Option<String>,
    pub(crate) accept: Option<Acceptable>,
    pub(crate) validators: Option<Vec<Arc<dyn Validator>>>,
    pub(crate) extras: HashMap<String, Value>,
}

impl Api {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn renderer(mut self, name: impl Into<String>) -> Self {
        self.renderer = Some(name.into());
        self
    }

    /// Acceptable content types, as a single type or a list.
    pub fn accept(mut self, acceptable: impl Into<Acceptable>) -> Self {
        self.accept = Some(acceptable.into());
        self
    }

    /// Acceptable content types computed from the request.
    pub fn accept_fn<F>(mut self, f: F) -> Self
    where
        F: Fn(&ServiceRequest) -> Vec<String> + Send + Sync + 'static,
    {
        self.accept = Some(Acceptable::dynamic(f));
        self
    }

    pub fn validator(mut self, validator: impl Validator) -> Self {
        self.validators
            .get_or_insert_with(Vec::new)
            .push(Arc::new(validator));
        self
    }

    /// An arbitrary pass-through option, surfaced in the API docs.
    pub fn extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }

    fn merged_over(self, defaults: &Api) -> Api {
        let mut extras = defaults.extras.clone();
        extras.extend(self.extras);
        Api {
            renderer: self.renderer.or_else(|| defaults.renderer.clone()),
            accept: self.accept.or_else(|| defaults.accept.clone()),
            validators: self.validators.or_else(|| defaults.validators.clone()),
            extras,
        }
    }
}

/// The resolved option set attached to one (service, method) pair.
#[derive(Clone)]
pub struct Definition {
    pub(crate) renderer: String,
    pub(crate) accept: Option<Acceptable>,
    pub(crate) validators: Vec<Arc<dyn Validator>>,
    pub(crate) extras: HashMap<String, Value>,
}

pub(crate) struct MethodDefinition {
    pub(crate) method: Method,
    pub(crate) definition: Definition,
    pub(crate) handler: Arc<dyn ServiceHandler>,
}

/// A named, path-bound endpoint descriptor.
///
/// Construction sets the descriptor-level defaults; the per-verb methods
/// record one definition per HTTP method. Nothing is wired into a router
/// until the descriptor is handed to a [`Configurator`](crate::Configurator)
/// and the scan runs.
///
/// # Example
/// ```
/// use declarest::{Api, Service, handler_fn};
/// use declarest::request::ServiceRequest;
/// use serde_json::json;
///
/// let mut users = Service::new("users", "/users/{id}")
///     .description("User lookup");
/// users.get(
///     Api::new().accept("application/json"),
///     handler_fn(|_request: &ServiceRequest| async move { json!({"name": "bob"}) }),
/// );
/// ```
pub struct Service {
    pub(crate) name: String,
    pub(crate) path: String,
    pub(crate) renderer: String,
    pub(crate) description: Option<String>,
    pub(crate) acl_factory: Option<AclFactory>,
    pub(crate) defaults: Api,
    pub(crate) definitions: Vec<MethodDefinition>,
}

impl Service {
    /// The path doubles as the route name, one route per unique pattern.
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            renderer: DEFAULT_RENDERER.to_string(),
            description: None,
            acl_factory: None,
            defaults: Api::default(),
            definitions: Vec::new(),
        }
    }

    pub fn renderer(mut self, name: impl Into<String>) -> Self {
        self.renderer = name.into();
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Attach an ACL factory; the route created for this path computes its
    /// access-control list per request from it.
    pub fn acl<F>(mut self, factory: F) -> Self
    where
        F: Fn(&ServiceRequest) -> Vec<AclEntry> + Send + Sync + 'static,
    {
        self.acl_factory = Some(Arc::new(factory));
        self
    }

    /// Default options merged under every method registration.
    pub fn defaults(mut self, defaults: Api) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn get(&mut self, options: Api, handler: impl ServiceHandler) -> &mut Self {
        self.api(Method::GET, options, handler)
    }

    pub fn post(&mut self, options: Api, handler: impl ServiceHandler) -> &mut Self {
        self.api(Method::POST, options, handler)
    }

    pub fn put(&mut self, options: Api, handler: impl ServiceHandler) -> &mut Self {
        self.api(Method::PUT, options, handler)
    }

    pub fn delete(&mut self, options: Api, handler: impl ServiceHandler) -> &mut Self {
        self.api(Method::DELETE, options, handler)
    }

    /// Record a definition for an arbitrary method.
    ///
    /// Call-time options override the descriptor defaults, and the renderer
    /// falls back to the descriptor renderer. Registering the same method
    /// again replaces the earlier definition; a descriptor holds at most one
    /// definition per method.
    pub fn api(&mut self, method: Method, options: Api, handler: impl ServiceHandler) -> &mut Self {
        let merged = options.merged_over(&self.defaults);
        let definition = Definition {
            renderer: merged.renderer.unwrap_or_else(|| self.renderer.clone()),
            accept: merged.accept,
            validators: merged.validators.unwrap_or_default(),
            extras: merged.extras,
        };
        let handler: Arc<dyn ServiceHandler> = Arc::new(handler);

        if let Some(existing) = self.definitions.iter_mut().find(|d| d.method == method) {
            existing.definition = definition;
            existing.handler = handler;
        } else {
            self.definitions.push(MethodDefinition {
                method,
                definition,
                handler,
            });
        }
        self
    }
}
