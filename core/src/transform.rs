//! Turning response bodies into typed entities.
//!
//! # Design
//! A `Transformer` reads `ServiceResponse::body_text` and produces either a
//! list of one entity type or, driven by an `Alias`, an `EntityMap` holding
//! one list per key with a different type behind each key. The response
//! status is not inspected here; callers that want to reject non-2xx
//! responses do so before transforming.

use std::fmt;

use serde::de::DeserializeOwned;

use crate::alias::{Alias, EntityMap};
use crate::error::RestingError;
use crate::json::JsonTransformer;
use crate::response::ServiceResponse;
use crate::xml::XmlTransformer;

const EXCERPT_CHARS: usize = 80;

/// Document format of a response body.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TransformationType {
    #[default]
    Json,
    Xml,
}

impl TransformationType {
    /// List of `T` using the transformer for this format.
    pub fn transform<T: DeserializeOwned>(
        self,
        response: &ServiceResponse,
        alias: Option<&str>,
    ) -> Result<Vec<T>, RestingError> {
        match self {
            TransformationType::Json => JsonTransformer.list(response, alias),
            TransformationType::Xml => XmlTransformer.list(response, alias),
        }
    }

    /// Keyed lists using the transformer for this format.
    pub fn transform_map(self, response: &ServiceResponse, aliases: Option<&Alias>) -> Result<EntityMap, RestingError> {
        match self {
            TransformationType::Json => JsonTransformer.map(response, aliases),
            TransformationType::Xml => XmlTransformer.map(response, aliases),
        }
    }
}

impl fmt::Display for TransformationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransformationType::Json => f.write_str("JSON"),
            TransformationType::Xml => f.write_str("XML"),
        }
    }
}

/// Converts response text of one format into entities.
pub trait Transformer {
    fn format(&self) -> TransformationType;

    /// Entities of a single type, in document order. `alias` narrows the
    /// document to one named collection.
    fn list<T: DeserializeOwned>(&self, response: &ServiceResponse, alias: Option<&str>) -> Result<Vec<T>, RestingError>;

    /// One list per alias key. A missing alias mapping is a configuration
    /// error.
    fn map(&self, response: &ServiceResponse, aliases: Option<&Alias>) -> Result<EntityMap, RestingError>;
}

pub(crate) fn require_aliases(format: TransformationType, aliases: Option<&Alias>) -> Result<&Alias, RestingError> {
    aliases.ok_or_else(|| {
        RestingError::Configuration(format!("{format} map transformation requires an alias mapping"))
    })
}

/// At most `EXCERPT_CHARS` characters of `text`, marked when cut.
pub(crate) fn excerpt(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(EXCERPT_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::encoding::EncodingType;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Record {
        name: String,
    }

    #[test]
    fn display_names_format() {
        assert_eq!(TransformationType::Json.to_string(), "JSON");
        assert_eq!(TransformationType::Xml.to_string(), "XML");
        assert_eq!(TransformationType::default(), TransformationType::Json);
    }

    #[test]
    fn dispatch_selects_transformer() {
        let json = ServiceResponse::from_parts(200, Vec::new(), br#"[{"name":"A"}]"#.to_vec(), EncodingType::Utf8).unwrap();
        let xml = ServiceResponse::from_parts(
            200,
            Vec::new(),
            b"<list><record><name>A</name></record></list>".to_vec(),
            EncodingType::Utf8,
        )
        .unwrap();
        let expected = vec![Record { name: "A".to_string() }];
        assert_eq!(TransformationType::Json.transform::<Record>(&json, None).unwrap(), expected);
        assert_eq!(TransformationType::Xml.transform::<Record>(&xml, None).unwrap(), expected);
    }

    #[test]
    fn map_without_aliases_is_configuration_error() {
        let response = ServiceResponse::from_parts(200, Vec::new(), b"{}".to_vec(), EncodingType::Utf8).unwrap();
        for format in [TransformationType::Json, TransformationType::Xml] {
            let err = format.transform_map(&response, None).unwrap_err();
            assert!(matches!(err, RestingError::Configuration(_)), "{format}");
        }
    }

    #[test]
    fn excerpt_truncates_long_text() {
        assert_eq!(excerpt("short"), "short");
        let long = "x".repeat(100);
        let cut = excerpt(&long);
        assert_eq!(cut.len(), EXCERPT_CHARS + 3);
        assert!(cut.ends_with("..."));
    }
}
