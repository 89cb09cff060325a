//! Entity identity.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use formflow_core::FormflowResult;

/// The identity of a persisted entity.
///
/// Serializes untagged, so an integer id is a JSON number and a UUID or
/// string id is a JSON string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EntityId {
    /// An auto-increment integer key.
    Int(i64),
    /// A UUID key.
    Uuid(Uuid),
    /// A natural string key.
    Str(String),
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Uuid(u) => write!(f, "{u}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for EntityId {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<Uuid> for EntityId {
    fn from(value: Uuid) -> Self {
        Self::Uuid(value)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// A domain object that can be edited through a form and persisted.
///
/// The trait is object safe so the workflow can hold `&dyn Entity`.
///
/// # Examples
///
/// ```
/// use formflow_db::{Entity, EntityId};
/// use formflow_core::FormflowResult;
///
/// #[derive(serde::Serialize)]
/// struct Article {
///     id: Option<i64>,
///     title: String,
/// }
///
/// impl Entity for Article {
///     fn entity_type(&self) -> &'static str { "article" }
///     fn id(&self) -> Option<EntityId> { self.id.map(EntityId::Int) }
///     fn to_data(&self) -> FormflowResult<serde_json::Value> {
///         Ok(serde_json::to_value(self)?)
///     }
/// }
///
/// let draft = Article { id: None, title: "Draft".into() };
/// assert!(draft.is_new());
/// ```
pub trait Entity: Send + Sync {
    /// A stable name for the entity's type (used as the storage key).
    fn entity_type(&self) -> &'static str;

    /// The assigned identity, or `None` if the entity has never been saved.
    fn id(&self) -> Option<EntityId>;

    /// A serialized snapshot of the entity, used as a form's initial data
    /// and as the row stored by persistence backends.
    fn to_data(&self) -> FormflowResult<serde_json::Value>;

    /// Returns `true` if the entity has no identity yet.
    fn is_new(&self) -> bool {
        self.id().is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(EntityId::Int(42).to_string(), "42");
        assert_eq!(EntityId::from("abc").to_string(), "abc");
        let u = Uuid::nil();
        assert_eq!(
            EntityId::from(u).to_string(),
            "00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_serde_untagged() {
        assert_eq!(serde_json::to_value(EntityId::Int(3)).unwrap(), serde_json::json!(3));
        assert_eq!(
            serde_json::to_value(EntityId::from("x")).unwrap(),
            serde_json::json!("x")
        );
        let back: EntityId = serde_json::from_value(serde_json::json!(7)).unwrap();
        assert_eq!(back, EntityId::Int(7));
    }

    struct Thing(Option<i64>);

    impl Entity for Thing {
        fn entity_type(&self) -> &'static str {
            "thing"
        }
        fn id(&self) -> Option<EntityId> {
            self.0.map(EntityId::Int)
        }
        fn to_data(&self) -> FormflowResult<serde_json::Value> {
            Ok(serde_json::json!({ "id": self.0 }))
        }
    }

    #[test]
    fn test_is_new() {
        assert!(Thing(None).is_new());
        assert!(!Thing(Some(1)).is_new());
    }
}
