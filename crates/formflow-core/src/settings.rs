//! Settings for formflow.
//!
//! This module provides the [`Settings`] struct, which holds the workflow's
//! configuration, and [`LazySettings`], a globally-accessible, lazily-initialized
//! settings instance.

use std::collections::HashMap;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// The complete set of formflow settings.
///
/// # Examples
///
/// ```
/// use formflow_core::settings::Settings;
///
/// let settings = Settings::default();
/// assert!(settings.debug);
/// assert_eq!(settings.default_entity_name, "Record");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    // ── Core ─────────────────────────────────────────────────────────

    /// Whether debug mode is enabled.
    pub debug: bool,

    // ── Logging ──────────────────────────────────────────────────────

    /// The log filter (e.g. "info", "formflow_forms=debug").
    pub log_level: String,

    // ── Flash messages ───────────────────────────────────────────────

    /// Message templates keyed by flash message key. Templates may contain
    /// `%param%` placeholders.
    pub flash_messages: HashMap<String, String>,
    /// Name used in flash messages when a caller does not supply one.
    pub default_entity_name: String,

    // ── Escape hatch ─────────────────────────────────────────────────

    /// Custom settings that don't fit into the above categories.
    pub extra: HashMap<String, serde_json::Value>,
}

impl Default for Settings {
    fn default() -> Self {
        let mut flash_messages = HashMap::new();
        flash_messages.insert(
            "formflow.flash.created".to_string(),
            "%name% has been created.".to_string(),
        );
        flash_messages.insert(
            "formflow.flash.updated".to_string(),
            "%name% has been updated.".to_string(),
        );
        flash_messages.insert(
            "formflow.flash.validation_errors".to_string(),
            "The form contains errors. Please correct them and try again.".to_string(),
        );

        Self {
            debug: true,
            log_level: "info".to_string(),
            flash_messages,
            default_entity_name: "Record".to_string(),
            extra: HashMap::new(),
        }
    }
}

/// A lazily-initialized, globally-accessible settings container.
///
/// Call [`configure`](LazySettings::configure) once at startup, then use
/// [`get`](LazySettings::get) or [`get_or_default`](LazySettings::get_or_default).
pub struct LazySettings {
    inner: OnceLock<Settings>,
}

impl Default for LazySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LazySettings {
    /// Creates a new, unconfigured `LazySettings`.
    pub const fn new() -> Self {
        Self {
            inner: OnceLock::new(),
        }
    }

    /// Configures the global settings. Must be called exactly once.
    ///
    /// # Panics
    ///
    /// Panics if settings have already been configured.
    pub fn configure(&self, settings: Settings) {
        self.inner
            .set(settings)
            .expect("Settings have already been configured");
    }

    /// Returns a reference to the configured settings.
    ///
    /// # Panics
    ///
    /// Panics if settings have not been configured.
    pub fn get(&self) -> &Settings {
        self.inner
            .get()
            .expect("Settings have not been configured. Call SETTINGS.configure() first.")
    }

    /// Returns the configured settings, installing the defaults if nothing
    /// was configured yet.
    pub fn get_or_default(&self) -> &Settings {
        self.inner.get_or_init(Settings::default)
    }

    /// Returns `true` if settings have been configured.
    pub fn is_configured(&self) -> bool {
        self.inner.get().is_some()
    }
}

/// The global settings instance.
pub static SETTINGS: LazySettings = LazySettings::new();

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let s = Settings::default();
        assert!(s.debug);
        assert_eq!(s.log_level, "info");
        assert_eq!(s.default_entity_name, "Record");
        assert_eq!(s.flash_messages.len(), 3);
        assert_eq!(
            s.flash_messages.get("formflow.flash.created").unwrap(),
            "%name% has been created."
        );
        assert!(s.extra.is_empty());
    }

    #[test]
    fn test_lazy_settings_configure_and_get() {
        let lazy = LazySettings::new();
        assert!(!lazy.is_configured());

        let settings = Settings {
            debug: false,
            default_entity_name: "Article".to_string(),
            ..Settings::default()
        };

        lazy.configure(settings);
        assert!(lazy.is_configured());
        assert!(!lazy.get().debug);
        assert_eq!(lazy.get().default_entity_name, "Article");
    }

    #[test]
    fn test_lazy_settings_get_or_default() {
        let lazy = LazySettings::new();
        assert_eq!(lazy.get_or_default().log_level, "info");
        assert!(lazy.is_configured());
    }

    #[test]
    #[should_panic(expected = "already been configured")]
    fn test_lazy_settings_double_configure_panics() {
        let lazy = LazySettings::new();
        lazy.configure(Settings::default());
        lazy.configure(Settings::default());
    }

    #[test]
    #[should_panic(expected = "not been configured")]
    fn test_lazy_settings_get_before_configure_panics() {
        let lazy = LazySettings::new();
        let _ = lazy.get();
    }
}
