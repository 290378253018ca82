//! Declared object shapes and their validators
//!
//! Increments coming off the stream are checked against `code_block_partial`
//! (every field optional, but typed). The final object is checked against
//! `code_block` (every field required). Both are plain JSON Schema documents
//! compiled once with the `jsonschema` crate.

use anyhow::{anyhow, Result};
use serde_json::{json, Value};
use std::fmt;

/// A compiled JSON Schema used as an accept/reject black box
pub struct ObjectSchema {
    name: &'static str,
    document: Value,
    validator: jsonschema::Validator,
}

impl ObjectSchema {
    /// Compile a schema document
    pub fn compile(name: &'static str, document: Value) -> Result<Self> {
        let validator = jsonschema::validator_for(&document)
            .map_err(|e| anyhow!("Invalid schema '{}': {}", name, e))?;
        Ok(Self {
            name,
            document,
            validator,
        })
    }

    /// `{ code?: string, language?: string }` - shape of a streamed increment
    pub fn code_block_partial() -> Result<Self> {
        Self::compile(
            "code_block_partial",
            json!({
                "type": "object",
                "properties": {
                    "code": { "type": "string" },
                    "language": { "type": "string" }
                }
            }),
        )
    }

    /// `{ code: string, language: string }` - shape of the finished object
    pub fn code_block() -> Result<Self> {
        Self::compile(
            "code_block",
            json!({
                "type": "object",
                "properties": {
                    "code": { "type": "string" },
                    "language": { "type": "string" }
                },
                "required": ["code", "language"]
            }),
        )
    }

    /// Validate a candidate value.
    ///
    /// Returns the first violation as a readable message.
    pub fn check(&self, candidate: &Value) -> std::result::Result<(), String> {
        match self.validator.iter_errors(candidate).next() {
            None => Ok(()),
            Some(err) => Err(format!("{}: {}", self.name, err)),
        }
    }
}

impl fmt::Debug for ObjectSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectSchema")
            .field("name", &self.name)
            .field("document", &self.document)
            .finish()
    }
}
