//! XML documents to entities, backed by `quick-xml`.
//!
//! The root element is a container: each of its direct child elements is one
//! entity, deserialized on its own so that a type mismatch can name the
//! element that caused it. For a list, an alias keeps only the children with
//! that local name. For a map, each alias key names a child of the root
//! whose own children are the collection.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use serde::de::DeserializeOwned;

use crate::alias::{Alias, EntityMap};
use crate::error::RestingError;
use crate::response::ServiceResponse;
use crate::transform::{excerpt, require_aliases, TransformationType, Transformer};

const FORMAT: TransformationType = TransformationType::Xml;

#[derive(Debug, Clone, Copy, Default)]
pub struct XmlTransformer;

impl Transformer for XmlTransformer {
    fn format(&self) -> TransformationType {
        FORMAT
    }

    fn list<T: DeserializeOwned>(&self, response: &ServiceResponse, alias: Option<&str>) -> Result<Vec<T>, RestingError> {
        let fragments: Vec<String> = child_elements(response.body_text()?)?
            .into_iter()
            .filter(|element| alias.map_or(true, |name| element.name == name))
            .map(|element| element.fragment)
            .collect();
        let entities = decode_fragments(&fragments)?;
        tracing::debug!(target: "resting::transform", format = %FORMAT, count = entities.len(), "transformed list");
        Ok(entities)
    }

    fn map(&self, response: &ServiceResponse, aliases: Option<&Alias>) -> Result<EntityMap, RestingError> {
        let aliases = require_aliases(FORMAT, aliases)?;
        let collections = child_elements(response.body_text()?)?;
        let mut entities = EntityMap::default();
        for (key, binding) in aliases.bindings() {
            let collection = collections
                .iter()
                .find(|element| element.name == key)
                .ok_or_else(|| RestingError::parse(FORMAT, format!("document has no `{key}` element"), None))?;
            let fragments: Vec<String> = child_elements(&collection.fragment)?
                .into_iter()
                .map(|element| element.fragment)
                .collect();
            entities.insert(key, binding.decode_xml(&fragments)?);
        }
        tracing::debug!(target: "resting::transform", format = %FORMAT, keys = entities.len(), "transformed map");
        Ok(entities)
    }
}

/// Deserialize each standalone element as `T`, keeping order.
pub(crate) fn decode_fragments<T: DeserializeOwned>(fragments: &[String]) -> Result<Vec<T>, RestingError> {
    fragments
        .iter()
        .map(|fragment| {
            quick_xml::de::from_str(fragment)
                .map_err(|e| RestingError::parse(FORMAT, e.to_string(), Some(excerpt(fragment))))
        })
        .collect()
}

/// A direct child of the root, re-serialized as a standalone document.
#[derive(Debug, PartialEq, Eq)]
struct Element {
    name: String,
    fragment: String,
}

fn child_elements(text: &str) -> Result<Vec<Element>, RestingError> {
    let mut reader = Reader::from_str(text);
    let mut children = Vec::new();
    let mut in_root = false;
    let mut seen_root = false;

    loop {
        let event = reader.read_event().map_err(|e| syntax_error(&e, text, reader.buffer_position()))?;
        match event {
            Event::Start(start) if in_root => {
                let name = local_name(&start)?;
                let inner = reader
                    .read_text(start.name())
                    .map_err(|e| syntax_error(&e, text, reader.buffer_position()))?;
                let fragment = format!("<{}>{inner}</{}>", raw_tag(&start)?, qualified_name(&start)?);
                children.push(Element { name, fragment });
            }
            Event::Empty(start) if in_root => {
                children.push(Element {
                    name: local_name(&start)?,
                    fragment: format!("<{}/>", raw_tag(&start)?),
                });
            }
            Event::Start(_) | Event::Empty(_) if seen_root => {
                return Err(RestingError::parse(FORMAT, "document has more than one root element", None));
            }
            Event::Start(_) => {
                in_root = true;
                seen_root = true;
            }
            Event::Empty(_) => seen_root = true,
            Event::End(_) => in_root = false,
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(RestingError::parse(FORMAT, "document has no root element", Some(excerpt(text))));
    }
    Ok(children)
}

fn syntax_error(error: &impl std::fmt::Display, text: &str, position: impl TryInto<usize>) -> RestingError {
    let fragment = position
        .try_into()
        .ok()
        .and_then(|end: usize| text.get(end.saturating_sub(40)..end))
        .map(excerpt);
    RestingError::parse(FORMAT, error.to_string(), fragment)
}

fn utf8<'a>(bytes: &'a [u8]) -> Result<Cow<'a, str>, RestingError> {
    std::str::from_utf8(bytes)
        .map(Cow::Borrowed)
        .map_err(|e| RestingError::parse(FORMAT, e.to_string(), None))
}

fn local_name(start: &BytesStart<'_>) -> Result<String, RestingError> {
    utf8(start.local_name().as_ref()).map(Cow::into_owned)
}

fn qualified_name(start: &BytesStart<'_>) -> Result<String, RestingError> {
    utf8(start.name().as_ref()).map(Cow::into_owned)
}

/// Tag name plus attributes, exactly as written.
fn raw_tag<'a>(start: &'a BytesStart<'_>) -> Result<Cow<'a, str>, RestingError> {
    utf8(start)
}
