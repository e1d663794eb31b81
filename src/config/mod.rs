use crate::acl::AclFactory;
use crate::apidoc::{ApiDoc, ApiDocRegistry};
use crate::dispatch::ServiceView;
use crate::error::{ConfigError, Result};
use crate::handler::ServiceHandler;
use crate::render::{DEFAULT_RENDERER, JsonRenderer, Renderer};
use crate::service::{Definition, MethodDefinition, Service};
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::routing::{MethodFilter, MethodRouter};
use std::collections::HashMap;
use std::sync::Arc;

/// One route pattern in the shared registry, and everything its methods share.
///
/// Created on first use of a path and reused for every later registration on
/// the same path; records are never removed.
pub struct ServiceRecord {
    pub name: String,
    pub path: String,
    /// Creation order among all records.
    pub index: usize,
    pub description: Option<String>,
    pub defined_methods: Vec<Method>,
    pub(crate) acl_factory: Option<AclFactory>,
}

/// Descriptor data shared by the deferred actions of one service.
struct ServiceMeta {
    name: String,
    path: String,
    description: Option<String>,
    acl_factory: Option<AclFactory>,
}

type DeferredAction = Box<dyn FnOnce(&mut Configurator) -> Result<()> + Send>;

/// Collects service registrations and wires them into an [`axum::Router`].
///
/// Registration is deferred: [`register`](Self::register) only captures
/// actions, and the scan phase runs them all exactly once. Everything here
/// is mutated on one thread before the application starts serving.
///
/// # Example
/// ```
/// use declarest::{Api, Configurator, Service, handler_fn};
/// use declarest::request::ServiceRequest;
/// use serde_json::json;
///
/// let mut ping = Service::new("ping", "/ping");
/// ping.get(
///     Api::new(),
///     handler_fn(|_request: &ServiceRequest| async move { json!({"pong": true}) }),
/// );
///
/// let mut config = Configurator::new();
/// config.register(ping);
/// let app = config.build().expect("invalid service configuration");
/// # let _: axum::Router = app;
/// ```
pub struct Configurator {
    registry: HashMap<String, ServiceRecord>,
    apidocs: ApiDocRegistry,
    renderers: HashMap<String, Arc<dyn Renderer>>,
    deferred: Vec<DeferredAction>,
    routes: HashMap<String, MethodRouter>,
}

impl Default for Configurator {
    fn default() -> Self {
        Self::new()
    }
}

impl Configurator {
    pub fn new() -> Self {
        let mut renderers: HashMap<String, Arc<dyn Renderer>> = HashMap::new();
        renderers.insert(DEFAULT_RENDERER.to_string(), Arc::new(JsonRenderer));
        Self {
            registry: HashMap::new(),
            apidocs: ApiDocRegistry::new(),
            renderers,
            deferred: Vec::new(),
            routes: HashMap::new(),
        }
    }

    /// Register a renderer under a name definitions can refer to.
    pub fn add_renderer(&mut self, name: impl Into<String>, renderer: impl Renderer) -> &mut Self {
        self.renderers.insert(name.into(), Arc::new(renderer));
        self
    }

    /// Capture one deferred registration per definition on the service.
    ///
    /// Nothing touches the registry or the router until [`scan`](Self::scan).
    pub fn register(&mut self, service: Service) -> &mut Self {
        let Service {
            name,
            path,
            description,
            acl_factory,
            definitions,
            ..
        } = service;
        let meta = Arc::new(ServiceMeta {
            name,
            path,
            description,
            acl_factory,
        });
        for MethodDefinition {
            method,
            definition,
            handler,
        } in definitions
        {
            let meta = Arc::clone(&meta);
            self.deferred.push(Box::new(move |config: &mut Configurator| {
                config.define(meta, method, definition, handler)
            }));
        }
        self
    }

    /// The scan phase: run every deferred registration exactly once, in the
    /// order the definitions were declared.
    pub fn scan(&mut self) -> Result<()> {
        let actions = std::mem::take(&mut self.deferred);
        for action in actions {
            action(self)?;
        }
        Ok(())
    }

    /// Scan and assemble the final router.
    pub fn build(mut self) -> Result<Router> {
        self.scan()?;

        let mut routes: Vec<(String, MethodRouter)> = self.routes.drain().collect();
        routes.sort_by_key(|(path, _)| {
            self.registry
                .get(path)
                .map(|record| record.index)
                .unwrap_or(usize::MAX)
        });

        let mut router = Router::new();
        for (path, method_router) in routes {
            router = router.route(&path, method_router);
        }
        Ok(router)
    }

    /// A runtime-readable handle on the documentation registry.
    pub fn api_docs(&self) -> ApiDocRegistry {
        self.apidocs.clone()
    }

    pub fn service_record(&self, path: &str) -> Option<&ServiceRecord> {
        self.registry.get(path)
    }

    /// All records in creation order.
    pub fn services(&self) -> Vec<&ServiceRecord> {
        let mut records: Vec<&ServiceRecord> = self.registry.values().collect();
        records.sort_by_key(|record| record.index);
        records
    }

    fn define(
        &mut self,
        meta: Arc<ServiceMeta>,
        method: Method,
        definition: Definition,
        handler: Arc<dyn ServiceHandler>,
    ) -> Result<()> {
        let Definition {
            renderer: renderer_name,
            accept,
            validators,
            extras,
        } = definition;

        let renderer = self
            .renderers
            .get(&renderer_name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownRenderer {
                name: renderer_name.clone(),
                path: meta.path.clone(),
            })?;
        let filter =
            MethodFilter::try_from(method.clone()).map_err(|_| ConfigError::UnroutableMethod {
                method: method.to_string(),
                path: meta.path.clone(),
            })?;

        // Route creation happens once per unique path; later definitions on
        // the same path reuse the record, so several methods share one route.
        let next_index = self.registry.len();
        let record = self.registry.entry(meta.path.clone()).or_insert_with(|| {
            tracing::info!(service = %meta.name, path = %meta.path, "adding route");
            ServiceRecord {
                name: meta.name.clone(),
                path: meta.path.clone(),
                index: next_index,
                description: meta.description.clone(),
                defined_methods: Vec::new(),
                acl_factory: meta.acl_factory.clone(),
            }
        });
        if record.defined_methods.contains(&method) {
            return Err(ConfigError::DuplicateView {
                method: method.to_string(),
                path: meta.path.clone(),
            });
        }
        record.defined_methods.push(method.clone());
        let acl_factory = record.acl_factory.clone();

        self.apidocs.insert(ApiDoc {
            service: meta.name.clone(),
            path: meta.path.clone(),
            method: method.clone(),
            description: meta.description.clone(),
            renderer: renderer_name,
            accept: accept.as_ref().and_then(|a| a.as_fixed().map(<[String]>::to_vec)),
            extras,
        });

        tracing::debug!(service = %meta.name, path = %meta.path, method = %method, "adding view");
        let view = Arc::new(ServiceView {
            service: meta.name.clone(),
            path: meta.path.clone(),
            accept,
            validators,
            renderer,
            acl_factory,
            handler,
        });
        let endpoint = move |request: Request<Body>| {
            let view = Arc::clone(&view);
            async move { view.call(request).await }
        };

        let method_router = self
            .routes
            .remove(&meta.path)
            .unwrap_or_else(MethodRouter::new);
        self.routes
            .insert(meta.path.clone(), method_router.on(filter, endpoint));
        Ok(())
    }
}
