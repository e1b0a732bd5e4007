//! Resource parsers
//!
//! A parser turns one resource's declarative data into registry entries.
//! Parsers are discovered through `parser` markers on loaded units and bound
//! to native implementations by unit name.

use std::any::Any;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use crate::error::{LoadstoneError, Result};
use crate::registry::ResourceId;

/// Entries produced from one resource: key and type-erased value
pub type ParsedEntries = Vec<(ResourceId, Box<dyn Any + Send + Sync>)>;

/// Native implementation behind a `parser` marker
pub trait ResourceParser {
    /// Produce entries for resource `id` from its decoded data
    fn parse(&self, id: &ResourceId, data: serde_json::Value) -> Result<ParsedEntries>;
}

/// Deserializes the whole resource into one `T` keyed by the resource id
pub struct JsonParser<T> {
    _value: PhantomData<fn() -> T>,
}

impl<T> JsonParser<T> {
    pub fn new() -> Self {
        Self {
            _value: PhantomData,
        }
    }
}

impl<T> Default for JsonParser<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ResourceParser for JsonParser<T>
where
    T: DeserializeOwned + Any + Send + Sync,
{
    fn parse(&self, id: &ResourceId, data: serde_json::Value) -> Result<ParsedEntries> {
        let value: T = serde_json::from_value(data).map_err(invalid_data)?;
        let value: Box<dyn Any + Send + Sync> = Box::new(value);
        Ok(vec![(id.clone(), value)])
    }
}

/// Deserializes a `{ "variants": { name: T } }` object into one entry per variant
///
/// Variant keys are the resource id with `/name` appended, in key order.
pub struct VariantParser<T> {
    _value: PhantomData<fn() -> T>,
}

impl<T> VariantParser<T> {
    pub fn new() -> Self {
        Self {
            _value: PhantomData,
        }
    }
}

impl<T> Default for VariantParser<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(serde::Deserialize)]
struct Variants<T> {
    variants: indexmap::IndexMap<String, T>,
}

impl<T> ResourceParser for VariantParser<T>
where
    T: DeserializeOwned + Any + Send + Sync,
{
    fn parse(&self, id: &ResourceId, data: serde_json::Value) -> Result<ParsedEntries> {
        let parsed: Variants<T> = serde_json::from_value(data).map_err(invalid_data)?;

        let mut entries: ParsedEntries = Vec::with_capacity(parsed.variants.len());
        for (name, value) in parsed.variants {
            let value: Box<dyn Any + Send + Sync> = Box::new(value);
            entries.push((id.child(&name)?, value));
        }
        Ok(entries)
    }
}

fn invalid_data(err: serde_json::Error) -> LoadstoneError {
    LoadstoneError::application(format!("invalid resource data: {err}"))
}
