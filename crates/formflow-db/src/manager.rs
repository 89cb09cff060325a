//! The unit-of-work contract.

use async_trait::async_trait;

use formflow_core::FormflowResult;

use crate::entity::Entity;

/// A persistence session that batches creates and updates until [`flush`].
///
/// - [`contains`] reports whether the entity is already managed (loaded from
///   or saved to the store). The form workflow uses it to tell a create from
///   an update.
/// - [`persist`] schedules a new entity for insertion.
/// - [`flush`] writes all scheduled work. Failures propagate to the caller.
///
/// [`contains`]: ObjectManager::contains
/// [`persist`]: ObjectManager::persist
/// [`flush`]: ObjectManager::flush
#[async_trait]
pub trait ObjectManager: Send + Sync {
    /// Returns `true` if the entity is managed by this session.
    fn contains(&self, entity: &dyn Entity) -> bool;

    /// Schedules the entity for insertion on the next flush.
    fn persist(&self, entity: &dyn Entity) -> FormflowResult<()>;

    /// Writes all scheduled changes.
    async fn flush(&self) -> FormflowResult<()>;
}
