//! Nested error reports for submitted forms.
//!
//! [`flatten`] walks a [`FormNode`] tree and collects its validation messages
//! into an [`ErrorReport`] that keeps the tree shape: a node's own messages
//! come first as plain entries, followed by one keyed entry per child whose
//! subtree has at least one message, in child order. Children without any
//! message are left out entirely.
//!
//! The walk uses an explicit work stack, so arbitrarily deep trees are
//! handled without growing the call stack. Serialization is bounded by
//! [`MAX_SERIALIZE_DEPTH`].

use std::fmt;

use serde::ser::{Error as _, SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use formflow_core::FormflowResult;

use crate::node::FormNode;

/// The deepest nesting below the root that an [`ErrorReport`] serializes.
/// Deeper reports fail with a serialization error.
pub const MAX_SERIALIZE_DEPTH: usize = 128;

/// One entry of an [`ErrorReport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportEntry {
    /// A message attached directly to the reported node.
    Message(String),
    /// The report of a child node, keyed by the child's name.
    Nested {
        /// The child's name.
        name: String,
        /// The child's (non-empty) report.
        report: ErrorReport,
    },
}

/// The ordered, nested validation messages of a form.
///
/// # Examples
///
/// ```
/// use formflow_forms::{flatten, ErrorReport, FormNode};
///
/// let form = FormNode::new("article")
///     .with_error("Global Error")
///     .with_child(FormNode::new("title").with_error("Too short."))
///     .with_child(FormNode::new("body"));
///
/// let report = flatten(&form);
/// let expected = ErrorReport::new()
///     .with_message("Global Error")
///     .with_nested("title", ErrorReport::new().with_message("Too short."));
/// assert_eq!(report, expected);
/// assert_eq!(
///     report.to_json().unwrap(),
///     serde_json::json!({ "0": "Global Error", "title": ["Too short."] })
/// );
/// ```
///
/// Building, comparing, walking and dropping a report never recurse.
/// `Clone` and `Debug` are derived and do recurse once per level.
#[derive(Debug, Clone, Default)]
pub struct ErrorReport {
    entries: Vec<ReportEntry>,
}

impl ErrorReport {
    /// Creates an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a plain message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.entries.push(ReportEntry::Message(message.into()));
        self
    }

    /// Appends a keyed child report.
    #[must_use]
    pub fn with_nested(mut self, name: impl Into<String>, report: Self) -> Self {
        self.entries.push(ReportEntry::Nested {
            name: name.into(),
            report,
        });
        self
    }

    /// Returns the entries in order.
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Returns an iterator over the entries.
    pub fn iter(&self) -> std::slice::Iter<'_, ReportEntry> {
        self.entries.iter()
    }

    /// Returns the number of top-level entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the report has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the plain messages of this level.
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().filter_map(|e| match e {
            ReportEntry::Message(m) => Some(m.as_str()),
            ReportEntry::Nested { .. } => None,
        })
    }

    /// Returns the nested report for the named child.
    pub fn get(&self, name: &str) -> Option<&Self> {
        self.entries.iter().find_map(|e| match e {
            ReportEntry::Nested { name: n, report } if n == name => Some(report),
            _ => None,
        })
    }

    /// Returns every message in the report paired with the dotted path of
    /// the node it belongs to (empty for the root).
    pub fn paths(&self) -> Vec<(String, &str)> {
        let mut out = Vec::new();
        let mut stack = vec![(String::new(), self, 0usize)];

        while let Some((path, report, index)) = stack.pop() {
            let Some(entry) = report.entries.get(index) else {
                continue;
            };
            match entry {
                ReportEntry::Message(m) => {
                    out.push((path.clone(), m.as_str()));
                    stack.push((path, report, index + 1));
                }
                ReportEntry::Nested {
                    name,
                    report: child,
                } => {
                    let child_path = if path.is_empty() {
                        name.clone()
                    } else {
                        format!("{path}.{name}")
                    };
                    stack.push((path, report, index + 1));
                    stack.push((child_path, child, 0));
                }
            }
        }

        out
    }

    /// Returns the total number of messages at every level.
    pub fn message_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(report) = stack.pop() {
            for entry in &report.entries {
                match entry {
                    ReportEntry::Message(_) => count += 1,
                    ReportEntry::Nested { report, .. } => stack.push(report),
                }
            }
        }
        count
    }

    /// Projects the report into JSON.
    ///
    /// A level made only of messages becomes an array. A level with keyed
    /// entries becomes an object in which messages sit under their position
    /// (`"0"`, `"1"`, ...) and child reports under the child's name.
    ///
    /// Fails with [`FormflowError::SerializationError`] when the report is
    /// nested deeper than [`MAX_SERIALIZE_DEPTH`].
    ///
    /// [`FormflowError::SerializationError`]: formflow_core::FormflowError::SerializationError
    pub fn to_json(&self) -> FormflowResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl<'a> IntoIterator for &'a ErrorReport {
    type Item = &'a ReportEntry;
    type IntoIter = std::slice::Iter<'a, ReportEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl PartialEq for ErrorReport {
    fn eq(&self, other: &Self) -> bool {
        let mut stack = vec![(self, other)];
        while let Some((left, right)) = stack.pop() {
            if left.entries.len() != right.entries.len() {
                return false;
            }
            for pair in left.entries.iter().zip(&right.entries) {
                match pair {
                    (ReportEntry::Message(a), ReportEntry::Message(b)) if a == b => {}
                    (
                        ReportEntry::Nested { name: a, report: ra },
                        ReportEntry::Nested { name: b, report: rb },
                    ) if a == b => stack.push((ra, rb)),
                    _ => return false,
                }
            }
        }
        true
    }
}

impl Eq for ErrorReport {}

// Dropping a deeply nested report must not recurse once per level.
impl Drop for ErrorReport {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.entries);
        while let Some(entry) = stack.pop() {
            if let ReportEntry::Nested { mut report, .. } = entry {
                stack.append(&mut report.entries);
            }
        }
    }
}

impl Serialize for ErrorReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Level {
            report: self,
            depth: 0,
        }
        .serialize(serializer)
    }
}

/// A report level together with its distance from the root.
struct Level<'a> {
    report: &'a ErrorReport,
    depth: usize,
}

impl Serialize for Level<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if self.depth > MAX_SERIALIZE_DEPTH {
            return Err(S::Error::custom(format!(
                "error report nested deeper than {MAX_SERIALIZE_DEPTH} levels"
            )));
        }

        let entries = &self.report.entries;
        let only_messages = entries
            .iter()
            .all(|e| matches!(e, ReportEntry::Message(_)));

        if only_messages {
            let mut seq = serializer.serialize_seq(Some(entries.len()))?;
            for message in self.report.messages() {
                seq.serialize_element(message)?;
            }
            return seq.end();
        }

        let mut map = serializer.serialize_map(Some(entries.len()))?;
        let mut position = 0usize;
        for entry in entries {
            match entry {
                ReportEntry::Message(m) => {
                    map.serialize_entry(&position.to_string(), m)?;
                    position += 1;
                }
                ReportEntry::Nested { name, report } => map.serialize_entry(
                    name,
                    &Level {
                        report,
                        depth: self.depth + 1,
                    },
                )?,
            }
        }
        map.end()
    }
}

impl fmt::Display for ErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (path, message)) in self.paths().into_iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            if path.is_empty() {
                f.write_str(message)?;
            } else {
                write!(f, "{path}: {message}")?;
            }
        }
        Ok(())
    }
}

struct Frame<'a> {
    node: &'a FormNode,
    next_child: usize,
    report: ErrorReport,
}

impl<'a> Frame<'a> {
    fn enter(node: &'a FormNode) -> Self {
        Self {
            node,
            next_child: 0,
            report: ErrorReport {
                entries: node
                    .errors
                    .iter()
                    .cloned()
                    .map(ReportEntry::Message)
                    .collect(),
            },
        }
    }
}

/// Collects the validation messages of `node` and its descendants into a
/// nested [`ErrorReport`].
///
/// The result holds the node's own messages first, then a keyed entry for
/// each child that has a message anywhere in its subtree. A tree without any
/// message yields an empty report. The walk is read-only and never fails.
pub fn flatten(node: &FormNode) -> ErrorReport {
    let mut stack = vec![Frame::enter(node)];

    loop {
        let Some(top) = stack.last_mut() else {
            return ErrorReport::new();
        };

        let parent = top.node;
        if let Some(child) = parent.children.get(top.next_child) {
            top.next_child += 1;
            stack.push(Frame::enter(child));
            continue;
        }

        let Some(done) = stack.pop() else {
            return ErrorReport::new();
        };
        let Some(parent) = stack.last_mut() else {
            return done.report;
        };
        if !done.report.is_empty() {
            parent.report.entries.push(ReportEntry::Nested {
                name: done.node.name.clone(),
                report: done.report,
            });
        }
    }
}
