//! One-time message storage.

use std::sync::{Mutex, MutexGuard};

use formflow_core::{FormflowError, FormflowResult};

use crate::message::{FlashLevel, FlashMessage, FlashParams};

/// Records user-facing flash messages.
///
/// This is the notification seam the form workflow writes to.
pub trait FlashHandler: Send + Sync {
    /// Records a message with the given level, key, and parameters.
    fn add(&self, level: FlashLevel, key: &str, params: &FlashParams);
}

/// In-process storage for flash messages.
///
/// Messages are added during request processing and drained when read.
///
/// # Examples
///
/// ```
/// use formflow_flash::{FlashBag, FlashHandler, FlashLevel, FlashParams};
///
/// let bag = FlashBag::new();
/// bag.add(FlashLevel::Success, "saved", &FlashParams::new());
/// bag.add(FlashLevel::Warning, "check", &FlashParams::new());
///
/// assert_eq!(bag.get_messages().len(), 2);
/// // Messages are drained after reading
/// assert!(bag.get_messages().is_empty());
/// ```
#[derive(Debug, Default)]
pub struct FlashBag {
    messages: Mutex<Vec<FlashMessage>>,
}

impl FlashBag {
    /// Creates an empty bag.
    pub fn new() -> Self {
        Self::default()
    }

    fn messages(&self) -> MutexGuard<'_, Vec<FlashMessage>> {
        self.messages.lock().expect("flash bag lock poisoned")
    }

    /// Drains and returns all stored messages.
    pub fn get_messages(&self) -> Vec<FlashMessage> {
        std::mem::take(&mut *self.messages())
    }

    /// Drains and returns the messages of one level, keeping the rest.
    pub fn take_level(&self, level: FlashLevel) -> Vec<FlashMessage> {
        let mut messages = self.messages();
        let (taken, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut *messages)
            .into_iter()
            .partition(|m| m.level == level);
        *messages = kept;
        taken
    }

    /// Returns a copy of the stored messages without consuming them.
    pub fn peek_messages(&self) -> Vec<FlashMessage> {
        self.messages().clone()
    }

    /// Returns the number of stored messages.
    pub fn len(&self) -> usize {
        self.messages().len()
    }

    /// Returns `true` if no messages are stored.
    pub fn is_empty(&self) -> bool {
        self.messages().is_empty()
    }

    /// Clears all stored messages.
    pub fn clear(&self) {
        self.messages().clear();
    }

    /// Serializes the pending messages, e.g. for storing them in a session
    /// across a redirect.
    pub fn export(&self) -> FormflowResult<String> {
        Ok(serde_json::to_string(&*self.messages())?)
    }

    /// Restores messages produced by [`export`](Self::export), appending them
    /// after any messages already stored.
    pub fn restore(&self, exported: &str) -> FormflowResult<()> {
        let restored: Vec<FlashMessage> = serde_json::from_str(exported).map_err(|e| {
            FormflowError::SerializationError(format!("Invalid flash message payload: {e}"))
        })?;
        self.messages().extend(restored);
        Ok(())
    }
}

impl FlashHandler for FlashBag {
    fn add(&self, level: FlashLevel, key: &str, params: &FlashParams) {
        tracing::debug!(%level, key, "flash message recorded");
        self.messages().push(FlashMessage {
            level,
            key: key.to_string(),
            params: params.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_param(name: &str) -> FlashParams {
        let mut params = FlashParams::new();
        params.insert("%name%".to_string(), name.to_string());
        params
    }

    #[test]
    fn test_add_and_drain() {
        let bag = FlashBag::new();
        bag.add(FlashLevel::Success, "created", &name_param("Record"));
        assert_eq!(bag.len(), 1);

        let messages = bag.get_messages();
        assert_eq!(messages[0].level, FlashLevel::Success);
        assert_eq!(messages[0].key, "created");
        assert_eq!(messages[0].params.get("%name%").unwrap(), "Record");
        assert!(bag.is_empty());
    }

    #[test]
    fn test_peek_does_not_consume() {
        let bag = FlashBag::new();
        bag.add(FlashLevel::Info, "a", &FlashParams::new());
        assert_eq!(bag.peek_messages().len(), 1);
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn test_take_level() {
        let bag = FlashBag::new();
        bag.add(FlashLevel::Success, "a", &FlashParams::new());
        bag.add(FlashLevel::Warning, "b", &FlashParams::new());
        bag.add(FlashLevel::Success, "c", &FlashParams::new());

        let success = bag.take_level(FlashLevel::Success);
        assert_eq!(success.len(), 2);
        assert_eq!(success[1].key, "c");
        let rest = bag.get_messages();
        assert_eq!(rest.len(), 1);
        assert_eq!(rest[0].key, "b");
    }

    #[test]
    fn test_export_restore() {
        let bag = FlashBag::new();
        bag.add(FlashLevel::Success, "created", &name_param("Post"));
        let payload = bag.export().unwrap();

        let next_request = FlashBag::new();
        next_request.restore(&payload).unwrap();
        assert_eq!(next_request.peek_messages(), bag.peek_messages());
    }

    #[test]
    fn test_restore_invalid_payload() {
        let bag = FlashBag::new();
        let err = bag.restore("not json").unwrap_err();
        assert!(matches!(err, FormflowError::SerializationError(_)));
    }

    #[test]
    fn test_clear() {
        let bag = FlashBag::new();
        bag.add(FlashLevel::Error, "x", &FlashParams::new());
        bag.clear();
        assert!(bag.is_empty());
    }
}
