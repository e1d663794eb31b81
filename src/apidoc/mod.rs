use axum::http::Method;
use dashmap::DashMap;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Documentation metadata recorded for one (path, method) pair at scan time.
#[derive(Clone)]
pub struct ApiDoc {
    pub service: String,
    pub path: String,
    pub method: Method,
    pub description: Option<String>,
    pub renderer: String,
    /// Static acceptable content types; dynamically computed lists are not
    /// representable ahead of a request and are left out.
    pub accept: Option<Vec<String>>,
    pub extras: HashMap<String, Value>,
}

/// Registry of everything registered during the scan, readable at runtime.
///
/// Handles are cheap clones over shared storage, so a docs endpoint or an
/// operator tool can keep one around while the application serves.
#[derive(Clone, Default)]
pub struct ApiDocRegistry {
    entries: Arc<DashMap<(String, Method), ApiDoc>>,
}

impl ApiDocRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&self, doc: ApiDoc) {
        self.entries.insert((doc.path.clone(), doc.method.clone()), doc);
    }

    pub fn get(&self, path: &str, method: &Method) -> Option<ApiDoc> {
        self.entries
            .get(&(path.to_string(), method.clone()))
            .map(|entry| entry.value().clone())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in stable (path, method) order.
    pub fn all(&self) -> Vec<ApiDoc> {
        let mut docs: Vec<ApiDoc> = self
            .entries
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        docs.sort_by(|a, b| {
            (a.path.as_str(), a.method.as_str()).cmp(&(b.path.as_str(), b.method.as_str()))
        });
        docs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(path: &str, method: Method) -> ApiDoc {
        ApiDoc {
            service: "things".to_string(),
            path: path.to_string(),
            method,
            description: None,
            renderer: "json".to_string(),
            accept: None,
            extras: HashMap::new(),
        }
    }

    #[test]
    fn lookup_is_keyed_by_path_and_method() {
        let registry = ApiDocRegistry::new();
        registry.insert(doc("/things", Method::GET));
        registry.insert(doc("/things", Method::POST));

        assert_eq!(registry.len(), 2);
        assert!(registry.get("/things", &Method::GET).is_some());
        assert!(registry.get("/things", &Method::DELETE).is_none());
    }

    #[test]
    fn all_is_ordered_by_path_then_method() {
        let registry = ApiDocRegistry::new();
        registry.insert(doc("/b", Method::GET));
        registry.insert(doc("/a", Method::POST));
        registry.insert(doc("/a", Method::GET));

        let order: Vec<_> = registry
            .all()
            .into_iter()
            .map(|d| (d.path, d.method))
            .collect();
        assert_eq!(
            order,
            vec![
                ("/a".to_string(), Method::GET),
                ("/a".to_string(), Method::POST),
                ("/b".to_string(), Method::GET),
            ]
        );
    }
}
