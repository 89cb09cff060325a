//! # formflow-forms
//!
//! The "create or update an entity through an HTML form" workflow.
//!
//! - [`node`] - [`FormNode`], the tree shape of a submitted form and its errors
//! - [`errors`] - [`flatten`](errors::flatten) and the nested [`ErrorReport`]
//! - [`options`] - Form options with per-entity defaults
//! - [`form`] - The [`Form`] and [`FormFactory`] seams plus [`FormRegistry`]
//! - [`field_form`] - [`FieldForm`], a minimal tree form bound from request data
//! - [`messages`] - Flash message keys used by the workflow
//! - [`handler`] - [`FormHandler`], which ties forms, persistence, routing, and
//!   flash messages together

pub mod errors;
pub mod field_form;
pub mod form;
pub mod handler;
pub mod messages;
pub mod node;
pub mod options;

pub use errors::{flatten, ErrorReport, ReportEntry, MAX_SERIALIZE_DEPTH};
pub use field_form::{FieldForm, FieldSpec};
pub use form::{Form, FormFactory, FormRegistry};
pub use handler::FormHandler;
pub use messages::FormMessages;
pub use node::FormNode;
pub use options::{FormOptions, ResolvedFormOptions};
