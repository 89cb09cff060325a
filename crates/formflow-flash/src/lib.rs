//! # formflow-flash
//!
//! One-time user notifications ("flash messages"). A workflow records a
//! message key plus parameters through the [`FlashHandler`] seam; the
//! [`FlashBag`] stores them until the next render, and a [`MessageCatalog`]
//! turns keys into text.

pub mod catalog;
pub mod message;
pub mod storage;

pub use catalog::MessageCatalog;
pub use message::{FlashLevel, FlashMessage, FlashParams};
pub use storage::{FlashBag, FlashHandler};
