use super::types::{Message, Sender};
use parking_lot::RwLock;
use std::sync::Arc;

/// Thread-safe, in-memory message log. Nothing is persisted beyond the
/// lifetime of the open window.
#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Arc<RwLock<Vec<Message>>>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, message: Message) {
        self.messages.write().push(message);
    }

    pub fn get_all(&self) -> Vec<Message> {
        self.messages.read().clone()
    }

    pub fn last(&self) -> Option<Message> {
        self.messages.read().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.messages.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.read().is_empty()
    }

    /// Whether the user has sent anything yet. The suggestion grid is shown
    /// until they have.
    pub fn has_user_messages(&self) -> bool {
        self.messages
            .read()
            .iter()
            .any(|m| m.sender == Sender::User)
    }

    pub fn clear(&self) {
        self.messages.write().clear();
    }
}
