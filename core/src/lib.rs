//! Synchronous REST client: call an endpoint, get typed entities back.
//!
//! # Overview
//! A call flows through four stages:
//! 1. a `ServiceContext` describes the request (verb, target, payload);
//! 2. a `ServiceAccessor` executes it over HTTP with `ureq`;
//! 3. the outcome is captured as an immutable `ServiceResponse`;
//! 4. a JSON or XML `Transformer` turns the body into entities, either one
//!    list of `T` or an `EntityMap` of differently typed lists keyed by
//!    `Alias`.
//!
//! `RestingBuilder` and the `resting` helpers wire the stages together.
//!
//! # Design
//! - Every fallible step returns `RestingError`; nothing is swallowed.
//! - Request lowering (`ServiceContext::into_request`) is pure, so request
//!   shapes are testable without a server.
//! - Response text is decoded lazily, once, and never lossily.

pub mod accessor;
pub mod alias;
pub mod builder;
pub mod content;
pub mod context;
pub mod encoding;
pub mod error;
pub mod http;
pub mod json;
pub mod params;
pub mod resting;
pub mod response;
pub mod transform;
pub mod xml;

pub use accessor::{AccessorConfig, ServiceAccessor};
pub use alias::{Alias, EntityMap};
pub use builder::RestingBuilder;
pub use content::ContentData;
pub use context::{Payload, ServiceContext, Target};
pub use encoding::{DecodeError, EncodeError, EncodingType};
pub use error::RestingError;
pub use http::{HttpRequest, Verb};
pub use json::JsonTransformer;
pub use params::RequestParams;
pub use response::ServiceResponse;
pub use transform::{TransformationType, Transformer};
pub use xml::XmlTransformer;
