//! Named routes and URL generation.
//!
//! - [`converters`] - Typed placeholder converters (`int`, `str`, `slug`, `uuid`, `path`)
//! - [`router`] - The [`Router`] route table and the [`UrlGenerator`] seam

pub mod converters;
pub mod router;

use std::collections::BTreeMap;

pub use router::{Router, UrlGenerator};

/// Parameters substituted into (or captured from) a route, ordered by name.
pub type RouteParams = BTreeMap<String, String>;

/// The result of matching a path against the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch {
    /// The name of the matched route.
    pub name: String,
    /// Parameters captured from the path.
    pub params: RouteParams,
}

impl RouteMatch {
    /// Creates a match with no captured parameters.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: RouteParams::new(),
        }
    }
}
