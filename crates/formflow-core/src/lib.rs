//! # formflow-core
//!
//! Core types shared by every formflow crate: the error enum, settings, and
//! tracing-based logging setup.
//!
//! ## Modules
//!
//! - [`error`] - Error types and result aliases
//! - [`settings`] - Workflow settings and global configuration
//! - [`settings_loader`] - Loading settings from TOML, JSON, and the environment
//! - [`logging`] - Tracing-based logging integration

pub mod error;
pub mod logging;
pub mod settings;
pub mod settings_loader;

pub use error::{FormflowError, FormflowResult};
pub use settings::{Settings, SETTINGS};
