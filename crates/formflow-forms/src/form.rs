//! The form seams of the workflow.
//!
//! [`Form`] is what [`FormHandler`](crate::FormHandler) drives: bind a
//! request, ask whether it was submitted and whether it validates, and
//! read back its data and error tree. [`FormFactory`] builds forms by type
//! name; [`FormRegistry`] is a factory backed by registered builders.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use formflow_core::{FormflowError, FormflowResult};
use formflow_http::HttpRequest;

use crate::node::FormNode;
use crate::options::ResolvedFormOptions;

/// A form bound to an entity's data.
///
/// `is_valid()` is async so implementations can validate against I/O-bound
/// sources such as uniqueness checks in a database.
#[async_trait]
pub trait Form: Send + Sync {
    /// Returns the form's root name.
    fn name(&self) -> &str;

    /// Binds the submitted data of `request` to this form.
    fn handle_request(&mut self, request: &HttpRequest);

    /// Returns `true` if the last handled request submitted this form.
    fn is_submitted(&self) -> bool;

    /// Validates the bound data. Returns `true` if the form is valid.
    ///
    /// After this call, [`to_node`](Self::to_node) carries the validation
    /// messages.
    async fn is_valid(&mut self) -> bool;

    /// Returns the form hierarchy with the messages attached to each node.
    fn to_node(&self) -> FormNode;

    /// Returns the form's current data: the initial data overlaid with the
    /// submitted values.
    fn data(&self) -> serde_json::Value;
}

/// Creates forms by type name.
pub trait FormFactory: Send + Sync {
    /// Creates a form of `form_type` with `data` as its initial data.
    fn create(
        &self,
        form_type: &str,
        data: serde_json::Value,
        options: ResolvedFormOptions,
    ) -> FormflowResult<Box<dyn Form>>;
}

type FormBuilder =
    dyn Fn(serde_json::Value, ResolvedFormOptions) -> FormflowResult<Box<dyn Form>> + Send + Sync;

/// A [`FormFactory`] that maps type names to builder closures.
///
/// # Examples
///
/// ```
/// use formflow_forms::{FieldForm, FieldSpec, FormFactory, FormRegistry, ResolvedFormOptions};
///
/// let registry = FormRegistry::new().register("article", |data, options| {
///     Ok(Box::new(
///         FieldForm::new("article", vec![FieldSpec::new("title").required()], options)
///             .with_initial(data),
///     ))
/// });
///
/// let form = registry
///     .create("article", serde_json::json!({}), ResolvedFormOptions::default())
///     .unwrap();
/// assert_eq!(form.name(), "article");
/// assert!(registry.create("comment", serde_json::json!({}), ResolvedFormOptions::default()).is_err());
/// ```
#[derive(Default)]
pub struct FormRegistry {
    builders: HashMap<String, Arc<FormBuilder>>,
}

impl FormRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a builder for `form_type`, replacing any previous one.
    #[must_use]
    pub fn register<F>(mut self, form_type: impl Into<String>, builder: F) -> Self
    where
        F: Fn(serde_json::Value, ResolvedFormOptions) -> FormflowResult<Box<dyn Form>>
            + Send
            + Sync
            + 'static,
    {
        self.builders.insert(form_type.into(), Arc::new(builder));
        self
    }

    /// Returns `true` if a builder is registered for `form_type`.
    pub fn contains(&self, form_type: &str) -> bool {
        self.builders.contains_key(form_type)
    }

    /// Returns the registered type names, sorted.
    pub fn form_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.builders.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }
}

impl fmt::Debug for FormRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormRegistry")
            .field("form_types", &self.form_types())
            .finish()
    }
}

impl FormFactory for FormRegistry {
    fn create(
        &self,
        form_type: &str,
        data: serde_json::Value,
        options: ResolvedFormOptions,
    ) -> FormflowResult<Box<dyn Form>> {
        let builder = self
            .builders
            .get(form_type)
            .ok_or_else(|| FormflowError::UnknownFormType(form_type.to_string()))?;
        tracing::debug!(form_type, "building form");
        builder(data, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct StaticForm {
        name: String,
        data: serde_json::Value,
    }

    #[async_trait]
    impl Form for StaticForm {
        fn name(&self) -> &str {
            &self.name
        }

        fn handle_request(&mut self, _request: &HttpRequest) {}

        fn is_submitted(&self) -> bool {
            false
        }

        async fn is_valid(&mut self) -> bool {
            true
        }

        fn to_node(&self) -> FormNode {
            FormNode::new(self.name.clone())
        }

        fn data(&self) -> serde_json::Value {
            self.data.clone()
        }
    }

    fn registry() -> FormRegistry {
        FormRegistry::new()
            .register("static", |data, _options| {
                Ok(Box::new(StaticForm {
                    name: "static".to_string(),
                    data,
                }))
            })
            .register("broken", |_data, _options| {
                Err(FormflowError::ConfigurationError("no fields".to_string()))
            })
    }

    #[test]
    fn test_create_passes_data() {
        let form = registry()
            .create(
                "static",
                serde_json::json!({"title": "x"}),
                ResolvedFormOptions::default(),
            )
            .unwrap();
        assert_eq!(form.name(), "static");
        assert_eq!(form.data(), serde_json::json!({"title": "x"}));
    }

    #[test]
    fn test_unknown_type() {
        let err = registry()
            .create("missing", serde_json::Value::Null, ResolvedFormOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, FormflowError::UnknownFormType(t) if t == "missing"));
    }

    #[test]
    fn test_builder_error_propagates() {
        let err = registry()
            .create("broken", serde_json::Value::Null, ResolvedFormOptions::default())
            .err()
            .unwrap();
        assert!(matches!(err, FormflowError::ConfigurationError(_)));
    }

    #[test]
    fn test_form_types_sorted() {
        let registry = registry();
        assert_eq!(registry.form_types(), vec!["broken", "static"]);
        assert!(registry.contains("static"));
        assert!(!registry.contains("other"));
        assert!(format!("{registry:?}").contains("static"));
    }
}
