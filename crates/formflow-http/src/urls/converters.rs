//! Path converters for route placeholders.
//!
//! | Name   | Pattern                                    |
//! |--------|--------------------------------------------|
//! | `str`  | `[^/]+` (default when no type is given)    |
//! | `int`  | `[0-9]+`                                   |
//! | `slug` | `[-a-zA-Z0-9_]+`                           |
//! | `uuid` | lowercase hyphenated UUID                  |
//! | `path` | `.+` (may contain `/`)                     |

use formflow_core::{FormflowError, FormflowResult};

/// A typed route placeholder converter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    /// Any non-empty segment without `/`.
    Str,
    /// Non-negative integers.
    Int,
    /// ASCII letters, digits, hyphens and underscores.
    Slug,
    /// Hyphenated lowercase UUIDs.
    Uuid,
    /// Any non-empty string, including `/`.
    Path,
}

impl Converter {
    /// Looks up a converter by the name used in route templates.
    pub fn from_name(name: &str) -> FormflowResult<Self> {
        match name {
            "str" => Ok(Self::Str),
            "int" => Ok(Self::Int),
            "slug" => Ok(Self::Slug),
            "uuid" => Ok(Self::Uuid),
            "path" => Ok(Self::Path),
            other => Err(FormflowError::ConfigurationError(format!(
                "Unknown path converter '{other}'"
            ))),
        }
    }

    /// Returns the (unanchored) regex pattern for this converter.
    pub const fn pattern(self) -> &'static str {
        match self {
            Self::Str => "[^/]+",
            Self::Int => "[0-9]+",
            Self::Slug => "[-a-zA-Z0-9_]+",
            Self::Uuid => "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}",
            Self::Path => ".+",
        }
    }

    /// Returns `true` if generated values may contain unescaped `/`.
    pub const fn allows_slash(self) -> bool {
        matches!(self, Self::Path)
    }
}
