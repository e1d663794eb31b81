use crate::request::ServiceRequest;
use serde::Serialize;
use std::sync::Arc;

/// A function that derives the access-control list for a request.
///
/// Attached to a [`Service`](crate::Service) descriptor; evaluated once per
/// request before dispatch, with the result made available through
/// [`ServiceRequest::acl`].
pub type AclFactory = Arc<dyn Fn(&ServiceRequest) -> Vec<AclEntry> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AclAction {
    Allow,
    Deny,
}

/// One access-control statement: allow or deny a principal a permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AclEntry {
    pub action: AclAction,
    pub principal: String,
    pub permission: String,
}

impl AclEntry {
    pub fn allow(principal: impl Into<String>, permission: impl Into<String>) -> Self {
        Self {
            action: AclAction::Allow,
            principal: principal.into(),
            permission: permission.into(),
        }
    }

    pub fn deny(principal: impl Into<String>, permission: impl Into<String>) -> Self {
        Self {
            action: AclAction::Deny,
            principal: principal.into(),
            permission: permission.into(),
        }
    }
}
