//! In-memory unit of work.
//!
//! [`MemoryObjectManager`] keeps an identity map of stored rows keyed by
//! `(entity_type, id)` and a queue of pending inserts. Entities scheduled with
//! [`persist`](ObjectManager::persist) are snapshotted at that moment; on
//! flush, entities without an id receive the next integer id for their type,
//! which is also written to a null `id` field of the stored snapshot.
//! A pending insert whose id already exists fails the whole flush with
//! [`FormflowError::IntegrityError`]: nothing is written and the queue is left
//! as it was, so it can be inspected or discarded with
//! [`clear`](MemoryObjectManager::clear).

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use formflow_core::{FormflowError, FormflowResult};

use crate::entity::{Entity, EntityId};
use crate::manager::ObjectManager;

#[derive(Debug)]
struct PendingInsert {
    entity_type: &'static str,
    id: Option<EntityId>,
    data: serde_json::Value,
}

#[derive(Debug, Default)]
struct State {
    rows: BTreeMap<(String, EntityId), serde_json::Value>,
    pending: Vec<PendingInsert>,
    sequences: HashMap<String, i64>,
    last_insert_ids: HashMap<String, EntityId>,
    flushes: usize,
}

/// An in-memory [`ObjectManager`].
///
/// # Examples
///
/// ```
/// use formflow_db::{Entity, EntityId, MemoryObjectManager, ObjectManager};
/// use formflow_core::FormflowResult;
///
/// struct Tag(Option<i64>);
///
/// impl Entity for Tag {
///     fn entity_type(&self) -> &'static str { "tag" }
///     fn id(&self) -> Option<EntityId> { self.0.map(EntityId::Int) }
///     fn to_data(&self) -> FormflowResult<serde_json::Value> {
///         Ok(serde_json::json!({ "id": self.0 }))
///     }
/// }
///
/// # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
/// let em = MemoryObjectManager::new();
/// em.persist(&Tag(None)).unwrap();
/// em.flush().await.unwrap();
/// assert_eq!(em.count("tag"), 1);
/// assert_eq!(em.last_insert_id("tag"), Some(EntityId::Int(1)));
/// assert_eq!(em.find("tag", &EntityId::Int(1)), Some(serde_json::json!({ "id": 1 })));
/// # });
/// ```
#[derive(Debug, Default)]
pub struct MemoryObjectManager {
    state: Mutex<State>,
}

impl MemoryObjectManager {
    /// Creates an empty manager.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().expect("object manager lock poisoned")
    }

    /// Stores an entity that already exists, as if it had been loaded.
    ///
    /// # Errors
    ///
    /// Returns [`FormflowError::DatabaseError`] if the entity has no id, or
    /// the entity's snapshot error.
    pub fn register(&self, entity: &dyn Entity) -> FormflowResult<()> {
        let id = entity.id().ok_or_else(|| {
            FormflowError::DatabaseError(format!(
                "Cannot register a '{}' without an id",
                entity.entity_type()
            ))
        })?;
        let data = entity.to_data()?;
        self.state()
            .rows
            .insert((entity.entity_type().to_string(), id), data);
        Ok(())
    }

    /// Returns the stored row for `(entity_type, id)`.
    pub fn find(&self, entity_type: &str, id: &EntityId) -> Option<serde_json::Value> {
        self.state()
            .rows
            .get(&(entity_type.to_string(), id.clone()))
            .cloned()
    }

    /// Returns the number of stored rows of the given type.
    pub fn count(&self, entity_type: &str) -> usize {
        self.state()
            .rows
            .keys()
            .filter(|(t, _)| t == entity_type)
            .count()
    }

    /// Returns the number of inserts waiting for the next flush.
    pub fn pending(&self) -> usize {
        self.state().pending.len()
    }

    /// Returns the id assigned to the most recently flushed insert of a type.
    pub fn last_insert_id(&self, entity_type: &str) -> Option<EntityId> {
        self.state().last_insert_ids.get(entity_type).cloned()
    }

    /// Returns how many flushes completed successfully.
    pub fn flush_count(&self) -> usize {
        self.state().flushes
    }

    /// Discards every scheduled insert. Stored rows are kept.
    pub fn clear(&self) {
        self.state().pending.clear();
    }
}

#[async_trait]
impl ObjectManager for MemoryObjectManager {
    fn contains(&self, entity: &dyn Entity) -> bool {
        entity.id().is_some_and(|id| {
            self.state()
                .rows
                .contains_key(&(entity.entity_type().to_string(), id))
        })
    }

    fn persist(&self, entity: &dyn Entity) -> FormflowResult<()> {
        if self.contains(entity) {
            return Ok(());
        }
        let data = entity.to_data()?;
        tracing::debug!(entity_type = entity.entity_type(), "scheduled insert");
        self.state().pending.push(PendingInsert {
            entity_type: entity.entity_type(),
            id: entity.id(),
            data,
        });
        Ok(())
    }

    #[allow(clippy::significant_drop_tightening)]
    async fn flush(&self) -> FormflowResult<()> {
        let mut guard = self.state();
        let state = &mut *guard;

        let mut sequences = state.sequences.clone();
        let mut staged = Vec::with_capacity(state.pending.len());

        for insert in &state.pending {
            let id = match &insert.id {
                Some(id) => id.clone(),
                None => {
                    let next = sequences.entry(insert.entity_type.to_string()).or_insert(0);
                    // Skip ids taken by explicitly-keyed rows.
                    loop {
                        *next += 1;
                        let key = (insert.entity_type.to_string(), EntityId::Int(*next));
                        if !state.rows.contains_key(&key) {
                            break;
                        }
                    }
                    EntityId::Int(*next)
                }
            };

            let key = (insert.entity_type.to_string(), id);
            if state.rows.contains_key(&key) || staged.iter().any(|(k, _)| k == &key) {
                return Err(FormflowError::IntegrityError(format!(
                    "Duplicate key {} for '{}'",
                    key.1, key.0
                )));
            }
            let mut data = insert.data.clone();
            if let Some(slot) = data.get_mut("id").filter(|v| v.is_null()) {
                *slot = serde_json::to_value(&key.1)?;
            }
            staged.push((key, data));
        }

        let inserted = staged.len();
        for ((entity_type, id), data) in staged {
            state.last_insert_ids.insert(entity_type.clone(), id.clone());
            state.rows.insert((entity_type, id), data);
        }
        state.pending.clear();
        state.sequences = sequences;
        state.flushes += 1;

        tracing::debug!(inserted, "flushed unit of work");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Note {
        id: Option<EntityId>,
        body: &'static str,
    }

    impl Entity for Note {
        fn entity_type(&self) -> &'static str {
            "note"
        }
        fn id(&self) -> Option<EntityId> {
            self.id.clone()
        }
        fn to_data(&self) -> FormflowResult<serde_json::Value> {
            Ok(serde_json::json!({ "body": self.body }))
        }
    }

    fn note(id: Option<i64>, body: &'static str) -> Note {
        Note {
            id: id.map(EntityId::Int),
            body,
        }
    }

    #[tokio::test]
    async fn test_persist_and_flush_assigns_ids() {
        let em = MemoryObjectManager::new();
        em.persist(&note(None, "a")).unwrap();
        em.persist(&note(None, "b")).unwrap();
        assert_eq!(em.pending(), 2);
        assert_eq!(em.count("note"), 0);

        em.flush().await.unwrap();
        assert_eq!(em.pending(), 0);
        assert_eq!(em.count("note"), 2);
        assert_eq!(em.last_insert_id("note"), Some(EntityId::Int(2)));
        assert_eq!(
            em.find("note", &EntityId::Int(1)),
            Some(serde_json::json!({ "body": "a" }))
        );
        assert_eq!(em.flush_count(), 1);
    }

    #[test]
    fn test_contains() {
        let em = MemoryObjectManager::new();
        let existing = note(Some(5), "x");
        assert!(!em.contains(&existing));
        em.register(&existing).unwrap();
        assert!(em.contains(&existing));
        assert!(!em.contains(&note(None, "new")));
        assert!(!em.contains(&note(Some(6), "other")));
    }

    #[test]
    fn test_register_without_id_fails() {
        let em = MemoryObjectManager::new();
        let err = em.register(&note(None, "x")).unwrap_err();
        assert!(matches!(err, FormflowError::DatabaseError(_)));
    }

    #[test]
    fn test_persist_managed_is_noop() {
        let em = MemoryObjectManager::new();
        let existing = note(Some(1), "x");
        em.register(&existing).unwrap();
        em.persist(&existing).unwrap();
        assert_eq!(em.pending(), 0);
    }

    #[tokio::test]
    async fn test_sequence_skips_registered_ids() {
        let em = MemoryObjectManager::new();
        em.register(&note(Some(1), "seeded")).unwrap();
        em.persist(&note(None, "fresh")).unwrap();
        em.flush().await.unwrap();
        assert_eq!(em.last_insert_id("note"), Some(EntityId::Int(2)));
    }

    #[tokio::test]
    async fn test_duplicate_key_fails_flush_atomically() {
        let em = MemoryObjectManager::new();
        em.persist(&note(None, "ok")).unwrap();
        em.persist(&note(Some(9), "first")).unwrap();
        em.persist(&note(Some(9), "second")).unwrap();

        let err = em.flush().await.unwrap_err();
        assert!(matches!(err, FormflowError::IntegrityError(_)));
        assert_eq!(em.count("note"), 0);
        assert_eq!(em.flush_count(), 0);
        assert_eq!(em.pending(), 3);
    }

    #[tokio::test]
    async fn test_failed_flush_keeps_queue_until_cleared() {
        let em = MemoryObjectManager::new();
        em.register(&note(Some(5), "seeded")).unwrap();
        em.persist(&note(None, "fresh")).unwrap();
        em.persist(&note(Some(9), "first")).unwrap();
        em.persist(&note(Some(9), "second")).unwrap();

        assert!(em.flush().await.is_err());
        assert_eq!(em.pending(), 3);

        // Retrying the same batch fails the same way and still writes nothing.
        assert!(em.flush().await.is_err());
        assert_eq!(em.count("note"), 1);
        assert_eq!(em.pending(), 3);

        em.clear();
        assert_eq!(em.pending(), 0);
        em.persist(&note(None, "fresh")).unwrap();
        em.persist(&note(Some(9), "first")).unwrap();
        em.flush().await.unwrap();

        assert_eq!(em.count("note"), 3);
        assert_eq!(em.last_insert_id("note"), Some(EntityId::Int(9)));
        assert_eq!(
            em.find("note", &EntityId::Int(1)),
            Some(serde_json::json!({ "body": "fresh" }))
        );
    }

    #[tokio::test]
    async fn test_flush_empty() {
        let em = MemoryObjectManager::new();
        em.flush().await.unwrap();
        assert_eq!(em.flush_count(), 1);
    }
}
