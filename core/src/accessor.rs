//! Executes service contexts over HTTP.
//!
//! # Design
//! `ServiceAccessor` owns a `ureq::Agent` configured once with the
//! connection and socket timeouts. `access` lowers the context to an
//! `HttpRequest`, performs exactly one round trip, and captures the result
//! as a `ServiceResponse`. 4xx and 5xx answers come back as responses;
//! only failures to talk to the server at all are `Transport` errors.

use std::time::Duration;

use ureq::http;
use ureq::{Agent, Body, RequestBuilder};

use crate::context::ServiceContext;
use crate::encoding::EncodingType;
use crate::error::RestingError;
use crate::http::{HttpRequest, Verb};
use crate::response::ServiceResponse;

/// Settings applied to every call made through one accessor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessorConfig {
    /// Time allowed to establish the connection. `None` waits indefinitely.
    pub connect_timeout: Option<Duration>,
    /// Time allowed to wait for the response head, and separately the total
    /// time allowed to receive the body. This bounds the whole body transfer,
    /// not the idle gap between reads, so a large body arriving steadily can
    /// still exceed it. `None` waits indefinitely.
    pub socket_timeout: Option<Duration>,
    /// Sent with every request, after any payload default.
    pub headers: Vec<(String, String)>,
    /// Declared encoding of response bodies.
    pub encoding: EncodingType,
}

pub struct ServiceAccessor {
    agent: Agent,
    headers: Vec<(String, String)>,
    encoding: EncodingType,
}

impl ServiceAccessor {
    pub fn new(config: AccessorConfig) -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .timeout_connect(config.connect_timeout)
            .timeout_recv_response(config.socket_timeout)
            .timeout_recv_body(config.socket_timeout)
            .build()
            .new_agent();
        Self {
            agent,
            headers: config.headers,
            encoding: config.encoding,
        }
    }

    /// Perform the request described by `context`.
    pub fn access(&self, context: ServiceContext) -> Result<ServiceResponse, RestingError> {
        let request = context.into_request(&self.headers)?;
        self.execute(&request)
    }

    /// Perform an already lowered request.
    pub fn execute(&self, request: &HttpRequest) -> Result<ServiceResponse, RestingError> {
        tracing::debug!(target: "resting::http", method = %request.method, url = %request.url, "sending request");
        let response = self.send(request).inspect_err(|e| {
            tracing::debug!(target: "resting::http", method = %request.method, url = %request.url, err = %e, "request error");
        })?;
        let response = ServiceResponse::new(Some(response.map(Body::into_reader)), self.encoding.clone())?;
        tracing::debug!(
            target: "resting::http",
            url = %request.url,
            status = response.status_code(),
            length = response.body_length(),
            "response received"
        );
        Ok(response)
    }

    fn send(&self, request: &HttpRequest) -> Result<http::Response<Body>, ureq::Error> {
        let url = request.url.as_str();
        match request.method {
            Verb::Get => with_headers(self.agent.get(url), &request.headers).call(),
            Verb::Delete => with_headers(self.agent.delete(url), &request.headers).call(),
            Verb::Post => send_body(with_headers(self.agent.post(url), &request.headers), request.body.as_deref()),
            Verb::Put => send_body(with_headers(self.agent.put(url), &request.headers), request.body.as_deref()),
        }
    }
}

impl Default for ServiceAccessor {
    fn default() -> Self {
        Self::new(AccessorConfig::default())
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send_body(builder: RequestBuilder<ureq::typestate::WithBody>, body: Option<&[u8]>) -> Result<http::Response<Body>, ureq::Error> {
    match body {
        Some(bytes) => builder.send(bytes),
        None => builder.send_empty(),
    }
}

#[cfg(test)]
mod tests {
    use std::net::TcpListener;

    use super::*;
    use crate::context::Target;
    use crate::params::RequestParams;

    #[test]
    fn default_config_has_no_timeouts() {
        let config = AccessorConfig::default();
        assert_eq!(config.connect_timeout, None);
        assert_eq!(config.socket_timeout, None);
        assert!(config.headers.is_empty());
        assert_eq!(config.encoding, EncodingType::Utf8);
    }

    #[test]
    fn refused_connection_is_transport_error() {
        // Bind then drop to get a port nothing listens on.
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let accessor = ServiceAccessor::new(AccessorConfig {
            connect_timeout: Some(Duration::from_secs(2)),
            ..AccessorConfig::default()
        });
        let context = ServiceContext::get(Target::new("http://127.0.0.1/", port), RequestParams::new());
        let err = accessor.access(context).unwrap_err();
        assert!(matches!(err, RestingError::Transport(_)));
    }

    #[test]
    fn bad_target_fails_before_network() {
        let context = ServiceContext::get(Target::new("::nope::", 80), RequestParams::new());
        let err = ServiceAccessor::default().access(context).unwrap_err();
        assert!(matches!(err, RestingError::Configuration(_)));
    }
}
