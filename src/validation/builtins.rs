use crate::request::ServiceRequest;
use crate::validation::Validator;
use async_trait::async_trait;

/// Reports an error unless the request carried a parseable JSON body.
#[derive(Default)]
pub struct RequireJsonBody;

#[async_trait]
impl Validator for RequireJsonBody {
    async fn validate(&self, request: &mut ServiceRequest) {
        if request.json().is_none() {
            request
                .errors
                .add("body", None, "Invalid or missing JSON body");
        }
    }
}

/// Reports an error unless the named header is present.
pub struct RequireHeader {
    name: String,
}

impl RequireHeader {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Validator for RequireHeader {
    async fn validate(&self, request: &mut ServiceRequest) {
        if request.header(self.name.as_str()).is_none() {
            request.errors.add(
                "header",
                Some(&self.name),
                format!("Missing header {}", self.name),
            );
        }
    }
}

/// Reports an error for every named field missing from the JSON body object.
pub struct RequireFields {
    fields: Vec<String>,
}

impl RequireFields {
    pub fn new<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl Validator for RequireFields {
    async fn validate(&self, request: &mut ServiceRequest) {
        let object = request.json().and_then(|value| value.as_object()).cloned();
        for field in &self.fields {
            let present = object
                .as_ref()
                .map(|obj| obj.contains_key(field))
                .unwrap_or(false);
            if !present {
                request
                    .errors
                    .add("body", Some(field), format!("Missing field {field}"));
            }
        }
    }
}
