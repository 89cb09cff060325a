//! Settings loading from configuration files.
//!
//! ## Loading Order
//!
//! 1. Start with default settings.
//! 2. Load from a TOML or JSON file (overriding defaults, merged deeply so a
//!    file can override a single flash message template).
//! 3. Apply environment variable overrides (highest priority).
//!
//! ## Environment Variable Mapping
//!
//! | Env Var | Setting |
//! |---|---|
//! | `FORMFLOW_DEBUG` | `debug` |
//! | `FORMFLOW_LOG_LEVEL` | `log_level` |
//! | `FORMFLOW_DEFAULT_ENTITY_NAME` | `default_entity_name` |

use std::path::Path;

use crate::error::FormflowError;
use crate::settings::Settings;

/// Loads settings from a TOML string.
///
/// # Errors
///
/// Returns an error if the TOML is malformed or cannot be deserialized.
pub fn from_toml_str(toml_str: &str) -> Result<Settings, FormflowError> {
    let toml_value: toml::Value = toml::from_str(toml_str)
        .map_err(|e| FormflowError::ConfigurationError(format!("Failed to parse TOML: {e}")))?;

    merge_with_defaults(toml_to_json(toml_value, "")?, "TOML")
}

/// Loads settings from a TOML file.
pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Settings, FormflowError> {
    let content = read_config(path.as_ref(), "TOML")?;
    from_toml_str(&content)
}

/// Loads settings from a TOML file and then applies environment variable overrides.
pub fn from_toml_file_with_env(path: impl AsRef<Path>) -> Result<Settings, FormflowError> {
    let mut settings = from_toml_file(path)?;
    apply_env_overrides(&mut settings);
    Ok(settings)
}

/// Loads settings from a JSON string.
pub fn from_json_str(json_str: &str) -> Result<Settings, FormflowError> {
    let json_value: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|e| FormflowError::ConfigurationError(format!("Failed to parse JSON: {e}")))?;

    merge_with_defaults(json_value, "JSON")
}

/// Loads settings from a JSON file.
pub fn from_json_file(path: impl AsRef<Path>) -> Result<Settings, FormflowError> {
    let content = read_config(path.as_ref(), "JSON")?;
    from_json_str(&content)
}

/// Loads settings from just environment variables (starting from defaults).
pub fn from_env() -> Settings {
    let mut settings = Settings::default();
    apply_env_overrides(&mut settings);
    settings
}

/// Applies `FORMFLOW_*` environment variable overrides to a settings struct.
pub fn apply_env_overrides(settings: &mut Settings) {
    if let Ok(val) = std::env::var("FORMFLOW_DEBUG") {
        settings.debug = matches!(val.to_lowercase().as_str(), "true" | "1" | "yes");
    }

    if let Ok(val) = std::env::var("FORMFLOW_LOG_LEVEL") {
        settings.log_level = val;
    }

    if let Ok(val) = std::env::var("FORMFLOW_DEFAULT_ENTITY_NAME") {
        settings.default_entity_name = val;
    }
}

// ============================================================
// Helpers
// ============================================================

fn read_config(path: &Path, format: &str) -> Result<String, FormflowError> {
    std::fs::read_to_string(path).map_err(|e| {
        FormflowError::ConfigurationError(format!(
            "Failed to read {format} file '{}': {e}",
            path.display()
        ))
    })
}

fn merge_with_defaults(
    value: serde_json::Value,
    format: &str,
) -> Result<Settings, FormflowError> {
    let mut merged = serde_json::to_value(Settings::default()).map_err(|e| {
        FormflowError::ConfigurationError(format!("Failed to serialize default settings: {e}"))
    })?;
    overlay(&mut merged, value);

    serde_json::from_value(merged).map_err(|e| {
        FormflowError::ConfigurationError(format!(
            "Failed to deserialize settings from {format}: {e}"
        ))
    })
}

/// Converts a parsed TOML document into the JSON shape [`Settings`] is read
/// from. `path` is the dotted key of `value`, used in error messages.
fn toml_to_json(value: toml::Value, path: &str) -> Result<serde_json::Value, FormflowError> {
    Ok(match value {
        toml::Value::Table(table) => {
            let mut object = serde_json::Map::with_capacity(table.len());
            for (key, item) in table {
                let child = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                object.insert(key, toml_to_json(item, &child)?);
            }
            serde_json::Value::Object(object)
        }
        toml::Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, item)| toml_to_json(item, &format!("{path}[{i}]")))
            .collect::<Result<serde_json::Value, _>>()?,
        toml::Value::Datetime(_) => {
            return Err(FormflowError::ConfigurationError(format!(
                "Unsupported TOML datetime at '{path}'"
            )));
        }
        toml::Value::String(s) => s.into(),
        toml::Value::Integer(i) => i.into(),
        toml::Value::Float(f) => f.into(),
        toml::Value::Boolean(b) => b.into(),
    })
}

/// Overlays `layer` onto `base`. Tables are merged key by key, so a file can
/// override one flash template and keep the rest; any other value replaces
/// what was there.
fn overlay(base: &mut serde_json::Value, layer: serde_json::Value) {
    match (base.as_object_mut(), layer) {
        (Some(target), serde_json::Value::Object(entries)) => {
            for (key, value) in entries {
                match target.get_mut(&key) {
                    Some(slot) => overlay(slot, value),
                    None => {
                        target.insert(key, value);
                    }
                }
            }
        }
        (_, layer) => *base = layer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_toml_str_basic() {
        let toml = r#"
            debug = false
            log_level = "formflow_forms=debug"
            default_entity_name = "Article"
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert!(!settings.debug);
        assert_eq!(settings.log_level, "formflow_forms=debug");
        assert_eq!(settings.default_entity_name, "Article");
        // Defaults preserved
        assert_eq!(settings.flash_messages.len(), 3);
    }

    #[test]
    fn test_from_toml_str_overrides_single_flash_template() {
        let toml = r#"
            [flash_messages]
            "formflow.flash.created" = "Saved %name%!"
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(
            settings.flash_messages.get("formflow.flash.created").unwrap(),
            "Saved %name%!"
        );
        // The other templates survive the merge.
        assert!(settings
            .flash_messages
            .contains_key("formflow.flash.updated"));
    }

    #[test]
    fn test_from_toml_str_empty() {
        let settings = from_toml_str("").unwrap();
        assert!(settings.debug);
        assert_eq!(settings.log_level, "info");
    }

    #[test]
    fn test_from_toml_str_invalid() {
        let result = from_toml_str("[[invalid toml content");
        assert!(matches!(result, Err(FormflowError::ConfigurationError(_))));
    }

    #[test]
    fn test_from_toml_str_wrong_type() {
        let result = from_toml_str("debug = \"sometimes\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_json_str_basic() {
        let json = r#"{
            "debug": false,
            "extra": { "theme": "dark" }
        }"#;

        let settings = from_json_str(json).unwrap();
        assert!(!settings.debug);
        assert_eq!(
            settings.extra.get("theme"),
            Some(&serde_json::json!("dark"))
        );
    }

    #[test]
    fn test_from_json_str_invalid() {
        assert!(from_json_str("{not json").is_err());
    }

    #[test]
    fn test_from_toml_file_missing() {
        let result = from_toml_file("/definitely/not/here/formflow.toml");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("Failed to read TOML file"));
    }

    #[test]
    fn test_from_json_file_roundtrip() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("formflow-settings-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"default_entity_name": "Invoice"}"#).unwrap();

        let settings = from_json_file(&path).unwrap();
        assert_eq!(settings.default_entity_name, "Invoice");

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_overlay_merges_tables_and_replaces_leaves() {
        let mut base = serde_json::json!({"a": {"b": 1, "c": 2}, "list": [1, 2]});
        overlay(
            &mut base,
            serde_json::json!({"a": {"c": 3}, "list": [9], "new": true}),
        );
        assert_eq!(
            base,
            serde_json::json!({"a": {"b": 1, "c": 3}, "list": [9], "new": true})
        );
    }

    #[test]
    fn test_from_toml_str_keeps_extra_tables() {
        let toml = r#"
            [extra.ui]
            theme = "dark"
            columns = [1, 2.5]
        "#;

        let settings = from_toml_str(toml).unwrap();
        assert_eq!(
            settings.extra.get("ui"),
            Some(&serde_json::json!({ "theme": "dark", "columns": [1, 2.5] }))
        );
    }

    #[test]
    fn test_from_toml_str_rejects_datetime() {
        let err = from_toml_str("[extra]\nreleased = 2024-01-02T03:04:05Z").unwrap_err();
        assert!(matches!(err, FormflowError::ConfigurationError(_)));
        assert!(err.to_string().contains("extra.released"));
    }
}
