//! Named route table.
//!
//! Routes are declared with a name and a template such as
//! `/articles/<int:id>/edit`. The [`Router`] resolves incoming paths to a
//! [`RouteMatch`] and generates URLs from a route name plus parameters.
//! Parameters that do not appear in the template are appended as a query
//! string.

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use regex::Regex;

use formflow_core::{FormflowError, FormflowResult};

use super::converters::Converter;
use super::{RouteMatch, RouteParams};

/// Characters escaped inside a generated path segment or query component.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Same as [`COMPONENT`] but keeps `/` for `path` placeholders.
const PATH_COMPONENT: &AsciiSet = &COMPONENT.remove(b'/');

/// Generates URLs for named routes.
///
/// This is the seam the form workflow uses to build form action URLs.
pub trait UrlGenerator: Send + Sync {
    /// Generates the URL for `name`, substituting `params`.
    fn generate(&self, name: &str, params: &RouteParams) -> FormflowResult<String>;
}

#[derive(Debug, Clone)]
enum Segment {
    Literal(String),
    Param {
        name: String,
        converter: Converter,
        validator: Regex,
    },
}

#[derive(Debug, Clone)]
struct Route {
    name: String,
    template: String,
    segments: Vec<Segment>,
    matcher: Regex,
}

impl Route {
    fn parse(name: &str, template: &str) -> FormflowResult<Self> {
        let template = if template.starts_with('/') {
            template.to_string()
        } else {
            format!("/{template}")
        };

        let mut segments = Vec::new();
        let mut pattern = String::from("^");
        let mut remaining = template.as_str();

        while !remaining.is_empty() {
            let Some(start) = remaining.find('<') else {
                pattern.push_str(&regex::escape(remaining));
                segments.push(Segment::Literal(remaining.to_string()));
                break;
            };

            if start > 0 {
                pattern.push_str(&regex::escape(&remaining[..start]));
                segments.push(Segment::Literal(remaining[..start].to_string()));
            }

            let end = remaining[start..].find('>').ok_or_else(|| {
                FormflowError::ConfigurationError(format!(
                    "Unclosed angle bracket in route template: {template}"
                ))
            })? + start;

            let inner = &remaining[start + 1..end];
            let (converter, param_name) = match inner.split_once(':') {
                Some((conv, param)) => (Converter::from_name(conv)?, param),
                None => (Converter::Str, inner),
            };
            if param_name.is_empty() {
                return Err(FormflowError::ConfigurationError(format!(
                    "Empty placeholder name in route template: {template}"
                )));
            }

            pattern.push_str(&format!("(?P<{param_name}>{})", converter.pattern()));
            let validator = compile(&format!("^(?:{})$", converter.pattern()))?;
            segments.push(Segment::Param {
                name: param_name.to_string(),
                converter,
                validator,
            });

            remaining = &remaining[end + 1..];
        }

        pattern.push('$');

        Ok(Self {
            name: name.to_string(),
            matcher: compile(&pattern)?,
            template,
            segments,
        })
    }

    fn generate(&self, params: &RouteParams) -> FormflowResult<String> {
        let mut url = String::new();
        let mut used = Vec::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => url.push_str(text),
                Segment::Param {
                    name,
                    converter,
                    validator,
                } => {
                    let value = params.get(name).ok_or_else(|| {
                        FormflowError::InvalidRouteParameter(format!(
                            "Missing parameter '{name}' for route '{}'",
                            self.name
                        ))
                    })?;
                    if !validator.is_match(value) {
                        return Err(FormflowError::InvalidRouteParameter(format!(
                            "Parameter '{name}' for route '{}' must match '{}', got '{value}'",
                            self.name,
                            converter.pattern()
                        )));
                    }
                    let set = if converter.allows_slash() {
                        PATH_COMPONENT
                    } else {
                        COMPONENT
                    };
                    url.push_str(&utf8_percent_encode(value, set).to_string());
                    used.push(name.as_str());
                }
            }
        }

        let query: Vec<String> = params
            .iter()
            .filter(|(key, _)| !used.contains(&key.as_str()))
            .map(|(key, value)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(key, COMPONENT),
                    utf8_percent_encode(value, COMPONENT)
                )
            })
            .collect();

        if !query.is_empty() {
            url.push('?');
            url.push_str(&query.join("&"));
        }

        Ok(url)
    }

    fn resolve(&self, path: &str) -> Option<RouteMatch> {
        let caps = self.matcher.captures(path)?;
        let params = self
            .segments
            .iter()
            .filter_map(|segment| match segment {
                Segment::Param { name, .. } => caps
                    .name(name)
                    .map(|m| (name.clone(), m.as_str().to_string())),
                Segment::Literal(_) => None,
            })
            .collect();
        Some(RouteMatch {
            name: self.name.clone(),
            params,
        })
    }
}

fn compile(pattern: &str) -> FormflowResult<Regex> {
    Regex::new(pattern).map_err(|e| {
        FormflowError::ConfigurationError(format!("Invalid route pattern '{pattern}': {e}"))
    })
}

/// A table of named routes.
///
/// # Examples
///
/// ```
/// use formflow_http::urls::{RouteParams, Router, UrlGenerator};
///
/// let router = Router::new()
///     .route("article_new", "/articles/new").unwrap()
///     .route("article_edit", "/articles/<int:id>/edit").unwrap();
///
/// let mut params = RouteParams::new();
/// params.insert("id".to_string(), "7".to_string());
/// assert_eq!(router.generate("article_edit", &params).unwrap(), "/articles/7/edit");
///
/// let matched = router.resolve("/articles/7/edit").unwrap();
/// assert_eq!(matched.name, "article_edit");
/// ```
#[derive(Debug, Clone, Default)]
pub struct Router {
    routes: Vec<Route>,
}

impl Router {
    /// Creates an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a named route.
    ///
    /// # Errors
    ///
    /// Returns [`FormflowError::ConfigurationError`] for malformed templates,
    /// unknown converters, or a name that is already registered.
    pub fn route(mut self, name: &str, template: &str) -> FormflowResult<Self> {
        if self.routes.iter().any(|r| r.name == name) {
            return Err(FormflowError::ConfigurationError(format!(
                "Route '{name}' is already registered"
            )));
        }
        self.routes.push(Route::parse(name, template)?);
        Ok(self)
    }

    /// Returns the template registered for `name`.
    pub fn template(&self, name: &str) -> Option<&str> {
        self.routes
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.template.as_str())
    }

    /// Matches `path` against the routes in registration order.
    pub fn resolve(&self, path: &str) -> Option<RouteMatch> {
        self.routes.iter().find_map(|route| route.resolve(path))
    }

    /// Returns the number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns `true` if no routes are registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl UrlGenerator for Router {
    fn generate(&self, name: &str, params: &RouteParams) -> FormflowResult<String> {
        let route = self
            .routes
            .iter()
            .find(|r| r.name == name)
            .ok_or_else(|| FormflowError::RouteNotFound(name.to_string()))?;
        let url = route.generate(params)?;
        tracing::trace!(route = name, %url, "generated url");
        Ok(url)
    }
}
