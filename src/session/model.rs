//! Values owned by a generation session
//!
//! `Prompt` is validated at construction, `PartialCodeBlock` is the
//! progressively-complete object rendered while streaming, and `CodeBlock`
//! is the strict shape produced once the stream has closed.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-empty, trimmed prompt ready to be submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt(String);

impl Prompt {
    /// Build a prompt from raw input. Returns `None` when the trimmed text is empty.
    pub fn new(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Prompt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A code block as it streams in: either field may still be missing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartialCodeBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl PartialCodeBlock {
    pub fn new(code: Option<&str>, language: Option<&str>) -> Self {
        Self {
            code: code.map(String::from),
            language: language.map(String::from),
        }
    }

    /// True when no field has arrived yet
    pub fn is_empty(&self) -> bool {
        self.code.is_none() && self.language.is_none()
    }

    /// Length of the code text received so far (0 when absent)
    pub fn code_len(&self) -> usize {
        self.code.as_ref().map_or(0, String::len)
    }

    /// Check whether `next` only grows this value.
    ///
    /// A well-behaved service never retracts a field and only appends to
    /// `code`. Violations are reported, not rejected.
    pub fn is_superseded_by(&self, next: &PartialCodeBlock) -> bool {
        let keeps_code = self.code.is_none() || next.code.is_some();
        let keeps_language = self.language.is_none() || next.language.is_some();
        keeps_code && keeps_language && next.code_len() >= self.code_len()
    }
}

/// The strict shape: both fields present
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlock {
    pub code: String,
    pub language: String,
}

impl From<CodeBlock> for PartialCodeBlock {
    fn from(block: CodeBlock) -> Self {
        Self {
            code: Some(block.code),
            language: Some(block.language),
        }
    }
}
