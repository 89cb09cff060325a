//! # formflow
//!
//! Helpers for the "create or update an entity through an HTML form"
//! workflow.
//!
//! This is the meta-crate that re-exports all sub-crates for convenient
//! access. Depend on `formflow` to get everything, or on individual crates
//! for finer-grained control.

/// Errors, settings, and logging setup.
pub use formflow_core as core;

/// Requests, query dictionaries, and named routes.
#[cfg(feature = "http")]
pub use formflow_http as http;

/// Entities, the unit-of-work contract, and an in-memory object manager.
#[cfg(feature = "db")]
pub use formflow_db as db;

/// Flash messages, storage, and rendering.
#[cfg(feature = "flash")]
pub use formflow_flash as flash;

/// Forms, nested error reports, and the form handler.
#[cfg(feature = "forms")]
pub use formflow_forms as forms;

pub use async_trait::async_trait;
pub use serde;
pub use serde_json;
pub use tokio;
pub use tracing;

/// The types most applications need.
pub mod prelude {
    pub use formflow_core::{FormflowError, FormflowResult, Settings};

    #[cfg(feature = "db")]
    pub use formflow_db::{Entity, EntityId, MemoryObjectManager, ObjectManager};

    #[cfg(feature = "flash")]
    pub use formflow_flash::{FlashBag, FlashHandler, FlashLevel, MessageCatalog};

    #[cfg(feature = "forms")]
    pub use formflow_forms::{
        flatten, ErrorReport, FieldForm, FieldSpec, Form, FormHandler, FormNode, FormOptions,
        FormRegistry,
    };

    #[cfg(feature = "http")]
    pub use formflow_http::{HttpRequest, Router, UrlGenerator};
}
