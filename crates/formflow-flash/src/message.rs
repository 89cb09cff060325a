//! Flash message levels and records.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder substitutions for a message, e.g. `{"%name%": "Article"}`.
pub type FlashParams = BTreeMap<String, String>;

/// The severity level of a flash message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    /// Informational message.
    Info,
    /// Success notification (e.g. "Saved").
    Success,
    /// Warning that requires attention (e.g. validation failed).
    Warning,
    /// Error message indicating a failure.
    Error,
}

impl FlashLevel {
    /// Returns the tag used for storage keys and CSS classes.
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for FlashLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A recorded flash message: a level, a message key, and its parameters.
///
/// The key is resolved to text at render time by a
/// [`MessageCatalog`](crate::MessageCatalog).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    /// The severity level.
    pub level: FlashLevel,
    /// The message key (e.g. `formflow.flash.created`).
    pub key: String,
    /// Placeholder substitutions.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: FlashParams,
}

impl FlashMessage {
    /// Creates a message without parameters.
    pub fn new(level: FlashLevel, key: impl Into<String>) -> Self {
        Self {
            level,
            key: key.into(),
            params: FlashParams::new(),
        }
    }

    /// Adds a placeholder substitution.
    #[must_use]
    pub fn with_param(mut self, placeholder: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(placeholder.into(), value.into());
        self
    }
}
