use crate::request::ServiceRequest;
use async_trait::async_trait;

pub mod builtins;

/// The validation seam for a definition.
///
/// A validator inspects the request and reports problems by appending to
/// `request.errors`; it never fails on its own. Validators run in the order
/// they were supplied, before the handler, and any reported error keeps the
/// handler from being invoked.
#[async_trait]
pub trait Validator: Send + Sync + 'static {
    async fn validate(&self, request: &mut ServiceRequest);
}

/// Adapter turning a plain closure into a [`Validator`].
pub struct ValidatorFn<F> {
    f: F,
}

pub fn validator_fn<F>(f: F) -> ValidatorFn<F>
where
    F: Fn(&mut ServiceRequest) + Send + Sync + 'static,
{
    ValidatorFn { f }
}

#[async_trait]
impl<F> Validator for ValidatorFn<F>
where
    F: Fn(&mut ServiceRequest) + Send + Sync + 'static,
{
    async fn validate(&self, request: &mut ServiceRequest) {
        (self.f)(request)
    }
}
