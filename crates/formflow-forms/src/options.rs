//! Form options.
//!
//! [`FormOptions`] holds what a caller set explicitly. The handler fills in
//! the rest from the entity and the request and produces
//! [`ResolvedFormOptions`], which is what a form is built with.

use std::collections::BTreeMap;

use http::Method;

/// Caller-supplied form options. Unset fields are filled in by
/// [`FormHandler::build_form_options`](crate::FormHandler::build_form_options).
///
/// # Examples
///
/// ```
/// use formflow_forms::FormOptions;
///
/// let options = FormOptions::new()
///     .method(http::Method::PATCH)
///     .option("csrf_protection", false);
///
/// let resolved = options.resolve();
/// assert_eq!(resolved.method, http::Method::PATCH);
/// assert_eq!(resolved.option("csrf_protection"), Some(&serde_json::json!(false)));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormOptions {
    /// The submission method, if set by the caller.
    pub method: Option<Method>,
    /// The form action. `Some(None)` means the caller explicitly asked for
    /// no action.
    #[allow(clippy::option_option)]
    pub action: Option<Option<String>>,
    /// Validation groups, if set by the caller.
    pub validation_groups: Option<Vec<String>>,
    /// Any other option, passed through to the form untouched.
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl FormOptions {
    /// Creates an empty set of options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the submission method.
    #[must_use]
    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets the form action.
    #[must_use]
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(Some(action.into()));
        self
    }

    /// Explicitly clears the form action so no URL is generated for it.
    #[must_use]
    pub fn without_action(mut self) -> Self {
        self.action = Some(None);
        self
    }

    /// Sets the validation groups.
    #[must_use]
    pub fn validation_groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.validation_groups = Some(groups.into_iter().map(Into::into).collect());
        self
    }

    /// Sets an arbitrary option.
    #[must_use]
    pub fn option(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Returns `true` if the caller set the method.
    pub const fn has_method(&self) -> bool {
        self.method.is_some()
    }

    /// Returns `true` if the caller set the action, including an explicit
    /// empty one.
    pub const fn has_action(&self) -> bool {
        self.action.is_some()
    }

    /// Resolves the options against the plain defaults: `POST`, no action,
    /// no validation groups.
    pub fn resolve(self) -> ResolvedFormOptions {
        ResolvedFormOptions {
            method: self.method.unwrap_or(Method::POST),
            action: self.action.flatten(),
            validation_groups: self.validation_groups,
            extra: self.extra,
        }
    }
}

/// The options a form is built with.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFormOptions {
    /// The submission method.
    pub method: Method,
    /// The URL the form submits to.
    pub action: Option<String>,
    /// The validation groups; `None` validates the default group.
    pub validation_groups: Option<Vec<String>>,
    /// Extra options.
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl ResolvedFormOptions {
    /// Returns an extra option by key.
    pub fn option(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }
}

impl Default for ResolvedFormOptions {
    fn default() -> Self {
        FormOptions::new().resolve()
    }
}
