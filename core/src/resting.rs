//! One-call helpers with default configuration.
//!
//! Each helper builds a `ServiceContext`, runs it through a default
//! `ServiceAccessor` (UTF-8 responses, no timeouts, no extra headers) and
//! returns the response. The `*_by_*` helpers also reject non-2xx statuses
//! and transform the body. Use `RestingBuilder` for anything else.

use std::path::PathBuf;

use serde::de::DeserializeOwned;

use crate::accessor::ServiceAccessor;
use crate::alias::{Alias, EntityMap};
use crate::builder::check_status;
use crate::context::{Payload, ServiceContext, Target};
use crate::encoding::EncodingType;
use crate::error::RestingError;
use crate::params::RequestParams;
use crate::response::ServiceResponse;
use crate::transform::TransformationType;

fn access(context: ServiceContext) -> Result<ServiceResponse, RestingError> {
    ServiceAccessor::default().access(context)
}

fn message(body: &str, encoding: EncodingType) -> Payload {
    Payload::Message {
        body: body.to_string(),
        encoding,
    }
}

fn file(path: impl Into<PathBuf>, encoding: EncodingType, binary: bool) -> Payload {
    Payload::File {
        path: path.into(),
        encoding,
        binary,
    }
}

pub fn get(url: &str, port: u16, params: RequestParams) -> Result<ServiceResponse, RestingError> {
    access(ServiceContext::get(Target::new(url, port), params))
}

pub fn delete(url: &str, port: u16, params: RequestParams) -> Result<ServiceResponse, RestingError> {
    access(ServiceContext::delete(Target::new(url, port), params))
}

/// POST `params` as a form.
pub fn post(url: &str, port: u16, params: RequestParams) -> Result<ServiceResponse, RestingError> {
    access(ServiceContext::post(Target::new(url, port), Payload::Params(params)))
}

pub fn post_message(url: &str, port: u16, body: &str, encoding: EncodingType) -> Result<ServiceResponse, RestingError> {
    access(ServiceContext::post(Target::new(url, port), message(body, encoding)))
}

pub fn post_file(
    url: &str,
    port: u16,
    path: impl Into<PathBuf>,
    encoding: EncodingType,
    binary: bool,
) -> Result<ServiceResponse, RestingError> {
    access(ServiceContext::post(Target::new(url, port), file(path, encoding, binary)))
}

/// PUT `params` as a form.
pub fn put(url: &str, port: u16, params: RequestParams) -> Result<ServiceResponse, RestingError> {
    access(ServiceContext::put(Target::new(url, port), Payload::Params(params)))
}

pub fn put_message(url: &str, port: u16, body: &str, encoding: EncodingType) -> Result<ServiceResponse, RestingError> {
    access(ServiceContext::put(Target::new(url, port), message(body, encoding)))
}

pub fn put_file(
    url: &str,
    port: u16,
    path: impl Into<PathBuf>,
    encoding: EncodingType,
    binary: bool,
) -> Result<ServiceResponse, RestingError> {
    access(ServiceContext::put(Target::new(url, port), file(path, encoding, binary)))
}

/// GET and decode a JSON list of `T`.
pub fn get_by_json<T: DeserializeOwned>(
    url: &str,
    port: u16,
    params: RequestParams,
    alias: Option<&str>,
) -> Result<Vec<T>, RestingError> {
    let response = check_status(get(url, port, params)?)?;
    TransformationType::Json.transform(&response, alias)
}

/// GET and decode an XML list of `T`.
pub fn get_by_xml<T: DeserializeOwned>(
    url: &str,
    port: u16,
    params: RequestParams,
    alias: Option<&str>,
) -> Result<Vec<T>, RestingError> {
    let response = check_status(get(url, port, params)?)?;
    TransformationType::Xml.transform(&response, alias)
}

/// GET a JSON document holding several collections and decode each one.
pub fn get_by_json_aliases(
    url: &str,
    port: u16,
    params: RequestParams,
    aliases: &Alias,
) -> Result<EntityMap, RestingError> {
    let response = check_status(get(url, port, params)?)?;
    TransformationType::Json.transform_map(&response, Some(aliases))
}
