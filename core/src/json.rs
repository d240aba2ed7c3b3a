//! JSON documents to entities, backed by `serde_json`.
//!
//! A top-level array yields one entity per element. A top-level object is a
//! single entity, unless an alias names the member that holds the
//! collection. `null` yields no entities.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::alias::{Alias, EntityMap};
use crate::error::RestingError;
use crate::response::ServiceResponse;
use crate::transform::{excerpt, require_aliases, TransformationType, Transformer};

const FORMAT: TransformationType = TransformationType::Json;

#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTransformer;

impl Transformer for JsonTransformer {
    fn format(&self) -> TransformationType {
        FORMAT
    }

    fn list<T: DeserializeOwned>(&self, response: &ServiceResponse, alias: Option<&str>) -> Result<Vec<T>, RestingError> {
        let mut document = parse_document(response.body_text()?)?;
        let collection = match alias {
            Some(key) => take_member(&mut document, key)?,
            None => document,
        };
        let entities = decode_items(items(collection)?)?;
        tracing::debug!(target: "resting::transform", format = %FORMAT, count = entities.len(), "transformed list");
        Ok(entities)
    }

    fn map(&self, response: &ServiceResponse, aliases: Option<&Alias>) -> Result<EntityMap, RestingError> {
        let aliases = require_aliases(FORMAT, aliases)?;
        let mut document = parse_document(response.body_text()?)?;
        let mut entities = EntityMap::default();
        for (key, binding) in aliases.bindings() {
            let collection = take_member(&mut document, key)?;
            entities.insert(key, binding.decode_json(items(collection)?)?);
        }
        tracing::debug!(target: "resting::transform", format = %FORMAT, keys = entities.len(), "transformed map");
        Ok(entities)
    }
}

/// Decode each item as `T`, keeping order.
pub(crate) fn decode_items<T: DeserializeOwned>(items: Vec<Value>) -> Result<Vec<T>, RestingError> {
    items
        .into_iter()
        .map(|item| {
            T::deserialize(&item)
                .map_err(|e| RestingError::parse(FORMAT, e.to_string(), Some(excerpt(&item.to_string()))))
        })
        .collect()
}

fn parse_document(text: &str) -> Result<Value, RestingError> {
    serde_json::from_str(text).map_err(|e| {
        let fragment = text
            .lines()
            .nth(e.line().saturating_sub(1))
            .map(|line| excerpt(line.get(e.column().saturating_sub(20)..).unwrap_or(line)));
        RestingError::parse(FORMAT, e.to_string(), fragment)
    })
}

fn take_member(document: &mut Value, key: &str) -> Result<Value, RestingError> {
    match document {
        Value::Object(members) => members
            .remove(key)
            .ok_or_else(|| RestingError::parse(FORMAT, format!("document has no `{key}` member"), None)),
        other => Err(RestingError::parse(
            FORMAT,
            format!("expected an object holding `{key}`"),
            Some(excerpt(&other.to_string())),
        )),
    }
}

fn items(collection: Value) -> Result<Vec<Value>, RestingError> {
    match collection {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        object @ Value::Object(_) => Ok(vec![object]),
        other => Err(RestingError::parse(
            FORMAT,
            "expected an array or an object",
            Some(excerpt(&other.to_string())),
        )),
    }
}
