pub mod deref;
pub mod node;
pub mod pointer;

pub use deref::Dereferencer;
pub use node::{ArrayNode, CanonicalPath, DocNode, ObjectNode};

use serde_json::Value;

use crate::error::ParseError;

/// Parse a description document from YAML into a raw value.
pub fn from_yaml(input: &str) -> Result<Value, ParseError> {
    let value: Value = serde_yaml_ng::from_str(input)?;
    validate_root(&value)?;
    Ok(value)
}

/// Parse a description document from JSON into a raw value.
pub fn from_json(input: &str) -> Result<Value, ParseError> {
    let value: Value = serde_json::from_str(input)?;
    validate_root(&value)?;
    Ok(value)
}

fn validate_root(value: &Value) -> Result<(), ParseError> {
    if !value.is_object() {
        return Err(ParseError::NotAnObject);
    }
    Ok(())
}
