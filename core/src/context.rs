//! Verb-tagged descriptions of one pending request.
//!
//! # Design
//! `ServiceContext` is a sum type: GET and DELETE always carry query
//! parameters, POST and PUT always carry exactly one `Payload`. A context is
//! built per call and consumed by `into_request`, which resolves the target
//! URL, encodes the payload and applies default headers. Headers supplied by
//! the caller win over the defaults.

use std::path::PathBuf;

use url::Url;

use crate::encoding::EncodingType;
use crate::error::RestingError;
use crate::http::{HttpRequest, Verb};
use crate::params::RequestParams;

const CONTENT_TYPE: &str = "content-type";
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const BINARY_CONTENT_TYPE: &str = "application/octet-stream";

/// Host URL plus port.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    url: String,
    port: u16,
}

impl Target {
    pub fn new(url: impl Into<String>, port: u16) -> Self {
        Self { url: url.into(), port }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Parse the URL and apply the port. A port equal to the scheme default
    /// is left implicit.
    pub fn resolve(&self) -> Result<Url, RestingError> {
        let mut url = Url::parse(&self.url)
            .map_err(|e| RestingError::Configuration(format!("invalid URL `{}`: {e}", self.url)))?;
        url.set_port(Some(self.port))
            .map_err(|()| RestingError::Configuration(format!("URL `{}` cannot carry a port", self.url)))?;
        Ok(url)
    }
}

/// Body of a POST or PUT.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// Form-encoded parameters.
    Params(RequestParams),
    /// Raw text body.
    Message { body: String, encoding: EncodingType },
    /// Contents of a file, read when the request is lowered.
    File {
        path: PathBuf,
        encoding: EncodingType,
        binary: bool,
    },
}

impl Payload {
    fn into_body(self) -> Result<(Vec<u8>, String), RestingError> {
        match self {
            Payload::Params(params) => Ok((params.to_form().into_bytes(), FORM_CONTENT_TYPE.to_string())),
            Payload::Message { body, encoding } => {
                let bytes = encoding.encode(&body)?;
                Ok((bytes, text_content_type(&encoding)))
            }
            Payload::File { path, encoding, binary } => {
                let bytes = std::fs::read(&path).map_err(|source| RestingError::File { path, source })?;
                let content_type = if binary {
                    BINARY_CONTENT_TYPE.to_string()
                } else {
                    text_content_type(&encoding)
                };
                Ok((bytes, content_type))
            }
        }
    }
}

fn text_content_type(encoding: &EncodingType) -> String {
    format!("text/plain; charset={}", encoding.label())
}

/// One pending request: verb, target and the payload that verb requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceContext {
    Get { target: Target, params: RequestParams },
    Post { target: Target, payload: Payload },
    Put { target: Target, payload: Payload },
    Delete { target: Target, params: RequestParams },
}

impl ServiceContext {
    pub fn get(target: Target, params: RequestParams) -> Self {
        ServiceContext::Get { target, params }
    }

    pub fn post(target: Target, payload: Payload) -> Self {
        ServiceContext::Post { target, payload }
    }

    pub fn put(target: Target, payload: Payload) -> Self {
        ServiceContext::Put { target, payload }
    }

    pub fn delete(target: Target, params: RequestParams) -> Self {
        ServiceContext::Delete { target, params }
    }

    /// Context for `verb` with `params` as its payload: the query string for
    /// GET and DELETE, a form body for POST and PUT.
    pub fn with_params(verb: Verb, target: Target, params: RequestParams) -> Self {
        match verb {
            Verb::Get => Self::get(target, params),
            Verb::Post => Self::post(target, Payload::Params(params)),
            Verb::Put => Self::put(target, Payload::Params(params)),
            Verb::Delete => Self::delete(target, params),
        }
    }

    pub fn verb(&self) -> Verb {
        match self {
            ServiceContext::Get { .. } => Verb::Get,
            ServiceContext::Post { .. } => Verb::Post,
            ServiceContext::Put { .. } => Verb::Put,
            ServiceContext::Delete { .. } => Verb::Delete,
        }
    }

    pub fn target(&self) -> &Target {
        match self {
            ServiceContext::Get { target, .. }
            | ServiceContext::Post { target, .. }
            | ServiceContext::Put { target, .. }
            | ServiceContext::Delete { target, .. } => target,
        }
    }

    /// Lower into a plain `HttpRequest`, appending `headers` after any
    /// payload default. A caller-supplied Content-Type suppresses the default.
    pub fn into_request(self, headers: &[(String, String)]) -> Result<HttpRequest, RestingError> {
        let method = self.verb();
        let (url, body) = match self {
            ServiceContext::Get { target, params } | ServiceContext::Delete { target, params } => {
                let mut url = target.resolve()?;
                if !params.is_empty() {
                    url.query_pairs_mut().extend_pairs(params.iter());
                }
                (url, None)
            }
            ServiceContext::Post { target, payload } | ServiceContext::Put { target, payload } => {
                (target.resolve()?, Some(payload.into_body()?))
            }
        };

        let caller_sets_type = headers.iter().any(|(name, _)| name.eq_ignore_ascii_case(CONTENT_TYPE));
        let mut request_headers = Vec::with_capacity(headers.len() + 1);
        let body = body.map(|(bytes, content_type)| {
            if !caller_sets_type {
                request_headers.push((CONTENT_TYPE.to_string(), content_type));
            }
            bytes
        });
        request_headers.extend(headers.iter().cloned());

        Ok(HttpRequest {
            method,
            url: url.into(),
            headers: request_headers,
            body,
        })
    }
}
