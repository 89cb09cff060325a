//! A minimal tree-shaped form bound from bracketed request keys.
//!
//! A [`FieldForm`] named `article` with a `title` field and an `author`
//! sub-form holding `email` reads `article[title]` and
//! `article[author][email]` from the submitted data.

use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use serde_json::{Map, Value};

use formflow_http::HttpRequest;

use crate::form::Form;
use crate::node::FormNode;
use crate::options::ResolvedFormOptions;

/// The group a field belongs to unless told otherwise, and the group
/// validated when the form options name none.
pub const DEFAULT_GROUP: &str = "Default";

const NOT_BLANK_MESSAGE: &str = "This value should not be blank.";
const EXTRA_FIELDS_MESSAGE: &str = "This form should not contain extra fields.";

/// The definition of one field. A field with children is a sub-form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// The field name.
    pub name: String,
    /// Whether a blank value is a violation.
    pub required: bool,
    /// The maximum length in characters, if any.
    pub max_length: Option<usize>,
    /// The validation groups the field's constraints belong to.
    pub groups: Vec<String>,
    /// Nested fields.
    pub children: Vec<Self>,
}

impl FieldSpec {
    /// Creates an optional field in the default group.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            required: false,
            max_length: None,
            groups: vec![DEFAULT_GROUP.to_string()],
            children: Vec::new(),
        }
    }

    /// Marks the field as required.
    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Limits the value to `max` characters.
    #[must_use]
    pub const fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Replaces the field's validation groups.
    #[must_use]
    pub fn groups<I, S>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    /// Adds a nested field.
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    fn violation(&self, value: Option<&str>) -> Option<String> {
        let value = value.unwrap_or_default();
        if value.trim().is_empty() {
            return self.required.then(|| NOT_BLANK_MESSAGE.to_string());
        }
        match self.max_length {
            Some(max) if value.chars().count() > max => Some(format!(
                "This value is too long. It should have {max} characters or less."
            )),
            _ => None,
        }
    }
}

/// A form built from [`FieldSpec`]s.
///
/// The form counts as submitted when the request method equals the resolved
/// method and the submitted data holds the form's root key or any
/// `root[...]` key. Submitted keys under the root that match no field are
/// reported on the root node.
#[derive(Debug, Clone)]
pub struct FieldForm {
    name: String,
    fields: Vec<FieldSpec>,
    options: ResolvedFormOptions,
    initial: Value,
    submitted: bool,
    validated: bool,
    values: BTreeMap<Vec<String>, Option<String>>,
    extra_fields: Vec<String>,
    errors: BTreeMap<Vec<String>, Vec<String>>,
}

impl FieldForm {
    /// Creates an unbound form.
    pub fn new(name: impl Into<String>, fields: Vec<FieldSpec>, options: ResolvedFormOptions) -> Self {
        Self {
            name: name.into(),
            fields,
            options,
            initial: Value::Object(Map::new()),
            submitted: false,
            validated: false,
            values: BTreeMap::new(),
            extra_fields: Vec::new(),
            errors: BTreeMap::new(),
        }
    }

    /// Sets the initial data, usually an entity's snapshot.
    #[must_use]
    pub fn with_initial(mut self, initial: Value) -> Self {
        self.initial = initial;
        self
    }

    /// Returns the options the form was built with.
    pub const fn options(&self) -> &ResolvedFormOptions {
        &self.options
    }

    /// Returns the submitted value of a field by dotted path.
    pub fn value(&self, path: &str) -> Option<&str> {
        let path: Vec<String> = path.split('.').map(String::from).collect();
        self.values.get(&path).and_then(Option::as_deref)
    }

    /// Returns the submitted keys that matched no field.
    pub fn extra_fields(&self) -> &[String] {
        &self.extra_fields
    }

    /// Attaches a message to the field at the dotted `path`. An empty or
    /// unknown path attaches it to the form itself.
    pub fn add_error(&mut self, path: &str, message: impl Into<String>) {
        let segments: Vec<String> = if path.is_empty() {
            Vec::new()
        } else {
            path.split('.').map(String::from).collect()
        };
        let key = if field_exists(&self.fields, &segments) {
            segments
        } else {
            Vec::new()
        };
        self.errors.entry(key).or_default().push(message.into());
    }

    fn validate(&mut self) {
        let groups: Vec<&str> = self.options.validation_groups.as_ref().map_or_else(
            || vec![DEFAULT_GROUP],
            |groups| groups.iter().map(String::as_str).collect(),
        );

        let mut violations = Vec::new();
        for (path, spec) in leaves(&self.fields) {
            if !spec.groups.iter().any(|g| groups.contains(&g.as_str())) {
                continue;
            }
            let value = self.values.get(&path).and_then(Option::as_deref);
            if let Some(message) = spec.violation(value) {
                violations.push((path, message));
            }
        }
        if !self.extra_fields.is_empty() {
            violations.push((Vec::new(), EXTRA_FIELDS_MESSAGE.to_string()));
        }

        for (path, message) in violations {
            self.errors.entry(path).or_default().push(message);
        }
    }

    fn field_node(&self, spec: &FieldSpec, path: &mut Vec<String>) -> FormNode {
        path.push(spec.name.clone());
        let mut node = FormNode::new(spec.name.clone());
        if let Some(errors) = self.errors.get(path.as_slice()) {
            node.errors.clone_from(errors);
        }
        node.children = spec
            .children
            .iter()
            .map(|child| self.field_node(child, path))
            .collect();
        path.pop();
        node
    }
}

#[async_trait]
impl Form for FieldForm {
    fn name(&self) -> &str {
        &self.name
    }

    fn handle_request(&mut self, request: &HttpRequest) {
        self.submitted = false;
        self.validated = false;
        self.values.clear();
        self.extra_fields.clear();
        self.errors.clear();

        if *request.method() != self.options.method {
            tracing::debug!(
                form = %self.name,
                method = %request.method(),
                expected = %self.options.method,
                "request method does not match form method"
            );
            return;
        }

        let data = request.submitted_data();
        if !data.contains_prefix(&self.name) {
            return;
        }
        self.submitted = true;

        let mut known = HashSet::new();
        for (path, _) in leaves(&self.fields) {
            let key = field_key(&self.name, &path);
            self.values.insert(path, data.get(&key).map(String::from));
            known.insert(key);
        }

        let nested = format!("{}[", self.name);
        self.extra_fields = data
            .keys()
            .filter(|key| key.starts_with(&nested) && !known.contains(*key))
            .map(String::from)
            .collect();
    }

    fn is_submitted(&self) -> bool {
        self.submitted
    }

    async fn is_valid(&mut self) -> bool {
        if !self.submitted {
            return false;
        }
        if !self.validated {
            self.validate();
            self.validated = true;
        }
        self.errors.is_empty()
    }

    fn to_node(&self) -> FormNode {
        let mut root = FormNode::new(self.name.clone());
        let root_path: &[String] = &[];
        if let Some(errors) = self.errors.get(root_path) {
            root.errors.clone_from(errors);
        }
        let mut path = Vec::new();
        root.children = self
            .fields
            .iter()
            .map(|spec| self.field_node(spec, &mut path))
            .collect();
        root
    }

    fn data(&self) -> Value {
        let mut data = match &self.initial {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };
        if self.submitted {
            for (path, value) in &self.values {
                let value = value.clone().map_or(Value::Null, Value::String);
                set_path(&mut data, path, value);
            }
        }
        Value::Object(data)
    }
}

fn field_key(root: &str, path: &[String]) -> String {
    format!("{root}[{}]", path.join("]["))
}

fn leaves(fields: &[FieldSpec]) -> Vec<(Vec<String>, &FieldSpec)> {
    let mut out = Vec::new();
    let mut stack: Vec<(Vec<String>, &FieldSpec)> = fields
        .iter()
        .rev()
        .map(|spec| (vec![spec.name.clone()], spec))
        .collect();

    while let Some((path, spec)) = stack.pop() {
        if spec.children.is_empty() {
            out.push((path, spec));
            continue;
        }
        for child in spec.children.iter().rev() {
            let mut child_path = path.clone();
            child_path.push(child.name.clone());
            stack.push((child_path, child));
        }
    }
    out
}

fn field_exists(fields: &[FieldSpec], path: &[String]) -> bool {
    if path.is_empty() {
        return false;
    }
    let mut level = fields;
    for segment in path {
        match level.iter().find(|f| &f.name == segment) {
            Some(spec) => level = &spec.children,
            None => return false,
        }
    }
    true
}

fn set_path(map: &mut Map<String, Value>, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut current = map;
    for segment in parents {
        let entry = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(next) = entry else {
            return;
        };
        current = next;
    }
    current.insert(last.clone(), value);
}

#[cfg(test)]
mod tests {
    use http::Method;

    use crate::errors::flatten;

    use super::*;

    fn article_form(options: ResolvedFormOptions) -> FieldForm {
        FieldForm::new(
            "article",
            vec![
                FieldSpec::new("title").required().max_length(10),
                FieldSpec::new("summary"),
                FieldSpec::new("author")
                    .child(FieldSpec::new("email").required().groups(["strict"])),
            ],
            options,
        )
    }

    fn post(body: &str) -> HttpRequest {
        HttpRequest::builder()
            .method(Method::POST)
            .form_body(body)
            .build()
    }

    #[tokio::test]
    async fn test_not_submitted_without_root_key() {
        let mut form = article_form(ResolvedFormOptions::default());
        form.handle_request(&post("comment[body]=x"));
        assert!(!form.is_submitted());
        assert!(!form.is_valid().await);
    }

    #[test]
    fn test_not_submitted_on_method_mismatch() {
        let mut form = article_form(ResolvedFormOptions::default());
        let request = HttpRequest::builder()
            .method(Method::GET)
            .query_string("article[title]=Hi")
            .build();
        form.handle_request(&request);
        assert!(!form.is_submitted());
    }

    #[tokio::test]
    async fn test_valid_submission() {
        let mut form = article_form(ResolvedFormOptions::default());
        form.handle_request(&post("article[title]=Hello&article[summary]=Short"));
        assert!(form.is_submitted());
        assert!(form.is_valid().await);
        assert_eq!(form.value("title"), Some("Hello"));
        assert!(!form.to_node().has_errors());
    }

    #[tokio::test]
    async fn test_required_and_length() {
        let mut form = article_form(ResolvedFormOptions::default());
        form.handle_request(&post("article[title]=%20%20"));
        assert!(!form.is_valid().await);
        assert_eq!(
            flatten(&form.to_node()).to_json().unwrap(),
            serde_json::json!({ "title": [NOT_BLANK_MESSAGE] })
        );

        form.handle_request(&post("article[title]=Much+too+long+a+title"));
        assert!(!form.is_valid().await);
        let node = form.to_node();
        assert_eq!(
            node.child("title").unwrap().errors,
            vec!["This value is too long. It should have 10 characters or less."]
        );
    }

    #[tokio::test]
    async fn test_validation_groups() {
        let options = ResolvedFormOptions {
            validation_groups: Some(vec!["strict".to_string()]),
            ..ResolvedFormOptions::default()
        };
        let mut form = article_form(options);
        form.handle_request(&post("article[summary]=x"));
        assert!(!form.is_valid().await);

        let report = flatten(&form.to_node());
        assert!(report.get("title").is_none());
        assert_eq!(
            report.get("author").unwrap().get("email").unwrap().messages().collect::<Vec<_>>(),
            vec![NOT_BLANK_MESSAGE]
        );
    }

    #[tokio::test]
    async fn test_extra_fields_on_root() {
        let mut form = article_form(ResolvedFormOptions::default());
        form.handle_request(&post("article[title]=Hi&article[sneaky]=1"));
        assert_eq!(form.extra_fields(), ["article[sneaky]".to_string()]);
        assert!(!form.is_valid().await);
        assert_eq!(form.to_node().errors, vec![EXTRA_FIELDS_MESSAGE]);
    }

    #[tokio::test]
    async fn test_add_error() {
        let mut form = article_form(ResolvedFormOptions::default());
        form.handle_request(&post("article[title]=Hi"));
        assert!(form.is_valid().await);

        form.add_error("author.email", "Already taken.");
        form.add_error("nope", "Global.");
        assert!(!form.is_valid().await);

        let node = form.to_node();
        assert_eq!(node.errors, vec!["Global."]);
        assert_eq!(
            node.child("author").unwrap().child("email").unwrap().errors,
            vec!["Already taken."]
        );
    }

    #[test]
    fn test_data_overlays_initial() {
        let mut form = article_form(ResolvedFormOptions::default())
            .with_initial(serde_json::json!({ "id": 4, "title": "Old", "summary": "Keep" }));
        assert_eq!(form.data()["title"], "Old");

        form.handle_request(&post("article[title]=New&article[author][email]=a%40b.c"));
        assert_eq!(
            form.data(),
            serde_json::json!({
                "id": 4,
                "title": "New",
                "summary": null,
                "author": { "email": "a@b.c" }
            })
        );
    }

    #[test]
    fn test_leaves_in_definition_order() {
        let fields = vec![
            FieldSpec::new("a").child(FieldSpec::new("b")).child(FieldSpec::new("c")),
            FieldSpec::new("d"),
        ];
        let keys: Vec<String> = leaves(&fields)
            .into_iter()
            .map(|(path, _)| field_key("f", &path))
            .collect();
        assert_eq!(keys, vec!["f[a][b]", "f[a][c]", "f[d]"]);
    }
}
