//! Product records and collection validation
//!
//! A product is an opaque JSON object that must carry a non-empty string
//! `id`. Every other field is passed through untouched, in its original order.

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Store key holding the whole serialized collection
pub const PRODUCTS_KEY: &str = "products";

/// Reasons a request body is rejected before anything is written
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Request body must be an array of products")]
    NotAnArray,
    /// `index` is the position of the first offending element.
    #[error("Each product must have a string 'id' field")]
    MissingId { index: usize },
}

/// A single product record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Product(Map<String, Value>);

impl Product {
    /// Wrap a JSON value, returning `None` unless it is an object with a
    /// non-empty string `id`
    pub fn from_json(value: Value) -> Option<Self> {
        match value {
            Value::Object(fields) if has_valid_id(&fields) => Some(Self(fields)),
            _ => None,
        }
    }

    pub fn id(&self) -> &str {
        self.0.get("id").and_then(Value::as_str).unwrap_or_default()
    }
}

fn has_valid_id(fields: &Map<String, Value>) -> bool {
    matches!(fields.get("id"), Some(Value::String(id)) if !id.is_empty())
}

/// Ordered collection of products, always stored and replaced as a whole
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProductCollection(Vec<Product>);

impl ProductCollection {
    /// Validate a parsed request body.
    ///
    /// The body must be an array; elements are checked in order and the
    /// first invalid one rejects the whole collection.
    pub fn from_json(value: Value) -> Result<Self, ValidationError> {
        let Value::Array(items) = value else {
            return Err(ValidationError::NotAnArray);
        };

        let mut products = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            match Product::from_json(item) {
                Some(product) => products.push(product),
                None => return Err(ValidationError::MissingId { index }),
            }
        }

        Ok(Self(products))
    }

    /// Serialize the collection into the blob kept under [`PRODUCTS_KEY`]
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Product> {
        self.0.iter()
    }
}
