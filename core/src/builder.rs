//! Configure a call, execute it and transform the result in one go.
//!
//! ```no_run
//! use resting_core::{RestingBuilder, TransformationType, Verb};
//!
//! #[derive(serde::Deserialize)]
//! struct Product {
//!     name: String,
//! }
//!
//! let products: Vec<Product> = RestingBuilder::new("http://local.myapis.com/products")
//!     .port(8080)
//!     .verb(Verb::Post)
//!     .transformation_type(TransformationType::Xml)
//!     .connection_timeout(std::time::Duration::from_secs(3))
//!     .build()?;
//! # Ok::<(), resting_core::RestingError>(())
//! ```

use std::marker::PhantomData;
use std::time::Duration;

use serde::de::DeserializeOwned;

use crate::accessor::{AccessorConfig, ServiceAccessor};
use crate::alias::{Alias, EntityMap};
use crate::context::{ServiceContext, Target};
use crate::encoding::EncodingType;
use crate::error::RestingError;
use crate::http::Verb;
use crate::params::RequestParams;
use crate::response::ServiceResponse;
use crate::transform::TransformationType;

const DEFAULT_PORT: u16 = 80;

/// Builder for one REST invocation producing entities of type `T`.
///
/// Building does not change the builder, so it can be built repeatedly.
#[derive(Debug, Clone)]
pub struct RestingBuilder<T> {
    uri: String,
    port: u16,
    verb: Verb,
    encoding: EncodingType,
    transformation_type: TransformationType,
    additional_headers: Vec<(String, String)>,
    request_params: RequestParams,
    connection_timeout: Option<Duration>,
    socket_timeout: Option<Duration>,
    alias: Option<String>,
    target_type: PhantomData<fn() -> T>,
}

impl<T> RestingBuilder<T> {
    /// Defaults: port 80, GET, UTF-8, JSON, no headers, no parameters,
    /// no timeouts.
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            port: DEFAULT_PORT,
            verb: Verb::default(),
            encoding: EncodingType::default(),
            transformation_type: TransformationType::default(),
            additional_headers: Vec::new(),
            request_params: RequestParams::new(),
            connection_timeout: None,
            socket_timeout: None,
            alias: None,
            target_type: PhantomData,
        }
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn verb(mut self, verb: Verb) -> Self {
        self.verb = verb;
        self
    }

    pub fn encoding(mut self, encoding: EncodingType) -> Self {
        self.encoding = encoding;
        self
    }

    pub fn transformation_type(mut self, transformation_type: TransformationType) -> Self {
        self.transformation_type = transformation_type;
        self
    }

    pub fn additional_headers(mut self, headers: Vec<(String, String)>) -> Self {
        self.additional_headers = headers;
        self
    }

    /// Append one header to the additional headers.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.additional_headers.push((name.into(), value.into()));
        self
    }

    pub fn request_params(mut self, params: RequestParams) -> Self {
        self.request_params = params;
        self
    }

    pub fn connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = Some(timeout);
        self
    }

    pub fn socket_timeout(mut self, timeout: Duration) -> Self {
        self.socket_timeout = Some(timeout);
        self
    }

    /// Name of the collection to read entities from.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Execute the call and return the raw response, whatever its status.
    pub fn send(&self) -> Result<ServiceResponse, RestingError> {
        let accessor = ServiceAccessor::new(AccessorConfig {
            connect_timeout: self.connection_timeout,
            socket_timeout: self.socket_timeout,
            headers: self.additional_headers.clone(),
            encoding: self.encoding.clone(),
        });
        accessor.access(self.context())
    }

    /// Execute and decode the response as a keyed set of collections.
    pub fn build_map(&self, aliases: Option<&Alias>) -> Result<EntityMap, RestingError> {
        let aliases = aliases.ok_or_else(|| {
            RestingError::Configuration("map build requires an alias mapping".to_string())
        })?;
        let response = check_status(self.send()?)?;
        self.transformation_type.transform_map(&response, Some(aliases))
    }

    fn context(&self) -> ServiceContext {
        let target = Target::new(self.uri.clone(), self.port);
        ServiceContext::with_params(self.verb, target, self.request_params.clone())
    }
}

impl<T: DeserializeOwned> RestingBuilder<T> {
    /// Execute and decode the response as a list of `T`.
    pub fn build(&self) -> Result<Vec<T>, RestingError> {
        let response = check_status(self.send()?)?;
        self.transformation_type.transform(&response, self.alias.as_deref())
    }
}

/// Reject non-2xx responses before they reach a transformer.
pub(crate) fn check_status(response: ServiceResponse) -> Result<ServiceResponse, RestingError> {
    if response.is_success() {
        return Ok(response);
    }
    Err(RestingError::Status {
        status: response.status_code(),
        body: String::from_utf8_lossy(response.body_bytes()).into_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Product;

    #[test]
    fn defaults_match_documented_values() {
        let builder = RestingBuilder::<Product>::new("http://localhost/products");
        assert_eq!(builder.port, 80);
        assert_eq!(builder.verb, Verb::Get);
        assert_eq!(builder.encoding, EncodingType::Utf8);
        assert_eq!(builder.transformation_type, TransformationType::Json);
        assert!(builder.additional_headers.is_empty());
        assert!(builder.request_params.is_empty());
        assert_eq!(builder.connection_timeout, None);
        assert_eq!(builder.socket_timeout, None);
        assert_eq!(builder.alias, None);
    }

    #[test]
    fn setters_order_does_not_matter() {
        let a = RestingBuilder::<Product>::new("http://h/p")
            .port(8080)
            .verb(Verb::Put)
            .request_params(RequestParams::new().with("k", "v"));
        let b = RestingBuilder::<Product>::new("http://h/p")
            .request_params(RequestParams::new().with("k", "v"))
            .verb(Verb::Put)
            .port(8080);
        assert_eq!(a.context(), b.context());
        assert_eq!(a.context().verb(), Verb::Put);
    }

    #[test]
    fn build_map_without_aliases_fails_before_network() {
        let builder = RestingBuilder::<Product>::new("http://127.0.0.1/never-called").port(1);
        let err = builder.build_map(None).unwrap_err();
        assert!(matches!(err, RestingError::Configuration(_)));
    }

    #[test]
    fn non_success_status_is_rejected() {
        let response = ServiceResponse::from_parts(503, Vec::new(), b"busy".to_vec(), EncodingType::Utf8).unwrap();
        let err = check_status(response).unwrap_err();
        assert!(matches!(err, RestingError::Status { status: 503, ref body } if body == "busy"));
    }
}
