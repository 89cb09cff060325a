//! Message key to text resolution.

use std::collections::HashMap;

use formflow_core::Settings;

use crate::message::{FlashMessage, FlashParams};

/// Resolves message keys to templates and substitutes `%param%` placeholders.
///
/// Unknown keys render as the key itself.
///
/// # Examples
///
/// ```
/// use formflow_flash::{FlashLevel, FlashMessage, MessageCatalog};
///
/// let catalog = MessageCatalog::new().with_template("saved", "%name% saved.");
/// let msg = FlashMessage::new(FlashLevel::Success, "saved").with_param("%name%", "Post");
/// assert_eq!(catalog.render_message(&msg), "Post saved.");
/// ```
#[derive(Debug, Clone, Default)]
pub struct MessageCatalog {
    templates: HashMap<String, String>,
}

impl MessageCatalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a catalog from the `flash_messages` table of the settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            templates: settings.flash_messages.clone(),
        }
    }

    /// Adds or replaces a template.
    #[must_use]
    pub fn with_template(mut self, key: impl Into<String>, template: impl Into<String>) -> Self {
        self.templates.insert(key.into(), template.into());
        self
    }

    /// Renders `key` with the given substitutions.
    ///
    /// The template is scanned once from left to right. At each position the
    /// longest matching placeholder wins, and substituted values are never
    /// scanned again.
    pub fn render(&self, key: &str, params: &FlashParams) -> String {
        let template = self.templates.get(key).map_or(key, String::as_str);
        let mut out = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(ch) = rest.chars().next() {
            let matched = params
                .iter()
                .filter(|(placeholder, _)| {
                    !placeholder.is_empty() && rest.starts_with(placeholder.as_str())
                })
                .max_by_key(|(placeholder, _)| placeholder.len());
            match matched {
                Some((placeholder, value)) => {
                    out.push_str(value);
                    rest = &rest[placeholder.len()..];
                }
                None => {
                    out.push(ch);
                    rest = &rest[ch.len_utf8()..];
                }
            }
        }
        out
    }

    /// Renders a recorded message.
    pub fn render_message(&self, message: &FlashMessage) -> String {
        self.render(&message.key, &message.params)
    }
}
