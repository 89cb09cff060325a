//! The tree shape of a submitted form.

use serde::{Deserialize, Serialize};

/// A node of a submitted form: a field or a sub-form.
///
/// A node owns its children, so a tree is acyclic by construction. Names are
/// expected to be unique among siblings.
///
/// # Examples
///
/// ```
/// use formflow_forms::FormNode;
///
/// let form = FormNode::new("article")
///     .with_error("Global Error")
///     .with_child(FormNode::new("title").with_error("Too short."));
///
/// assert_eq!(form.children.len(), 1);
/// assert!(form.child("title").is_some());
/// ```
///
/// Dropping a node never recurses. The derived `Clone`, `PartialEq`, `Debug`,
/// `Serialize` and `Deserialize` impls recurse once per level, so very deep
/// trees should only be walked with [`flatten`](crate::flatten).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormNode {
    /// The field name.
    pub name: String,
    /// Validation messages attached directly to this node.
    #[serde(default)]
    pub errors: Vec<String>,
    /// Child fields, in definition order.
    #[serde(default)]
    pub children: Vec<Self>,
}

impl FormNode {
    /// Creates a node without errors or children.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            errors: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Adds a validation message.
    #[must_use]
    pub fn with_error(mut self, message: impl Into<String>) -> Self {
        self.errors.push(message.into());
        self
    }

    /// Adds a child node.
    #[must_use]
    pub fn with_child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    /// Returns the direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&Self> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Returns `true` if this node or any descendant carries an error.
    pub fn has_errors(&self) -> bool {
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            if !node.errors.is_empty() {
                return true;
            }
            stack.extend(node.children.iter());
        }
        false
    }
}

// Dropping a deeply nested tree must not recurse once per level.
impl Drop for FormNode {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(mut node) = stack.pop() {
            stack.append(&mut node.children);
        }
    }
}
