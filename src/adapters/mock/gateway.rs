//! Mock WhatsApp gateway. Serves chats and messages from memory.
//!
//! Decryption returns `payload:<message id>` so written files can be checked.

use crate::domain::{Chat, DomainError, Message};
use crate::ports::WaGateway;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Default)]
pub struct MockWaGateway {
    chats: Mutex<Vec<Chat>>,
    messages: Mutex<HashMap<String, Vec<Message>>>,
    failing: HashSet<String>,
    decrypt_calls: AtomicUsize,
}

impl MockWaGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_chat(self, id: &str, name: &str, timestamp: i64) -> Self {
        self.upsert_chat(id, name, timestamp);
        self
    }

    pub fn with_messages(self, chat_id: &str, messages: Vec<Message>) -> Self {
        lock(&self.messages)
            .entry(chat_id.to_string())
            .or_default()
            .extend(messages);
        self
    }

    /// Decrypting this message id will fail.
    pub fn failing_decrypt(mut self, message_id: &str) -> Self {
        self.failing.insert(message_id.to_string());
        self
    }

    /// Append a message and bump the chat's activity timestamp, as a live session would.
    pub fn push_message(&self, message: Message) {
        {
            let mut chats = lock(&self.chats);
            if let Some(chat) = chats.iter_mut().find(|c| c.id == message.chat_id) {
                chat.timestamp = chat.timestamp.max(message.timestamp);
            }
        }
        lock(&self.messages)
            .entry(message.chat_id.clone())
            .or_default()
            .push(message);
    }

    pub fn decrypt_calls(&self) -> usize {
        self.decrypt_calls.load(Ordering::SeqCst)
    }

    fn upsert_chat(&self, id: &str, name: &str, timestamp: i64) {
        let mut chats = lock(&self.chats);
        chats.retain(|c| c.id != id);
        chats.push(Chat {
            id: id.to_string(),
            name: name.to_string(),
            timestamp,
        });
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Convenience constructor for a message.
pub fn message(chat_id: &str, id: &str, timestamp: i64, mimetype: Option<&str>) -> Message {
    Message {
        id: id.to_string(),
        chat_id: chat_id.to_string(),
        timestamp,
        body: None,
        mimetype: mimetype.map(String::from),
        filename: None,
        sender: None,
        from_me: false,
    }
}

#[async_trait::async_trait]
impl WaGateway for MockWaGateway {
    async fn get_chats(&self) -> Result<Vec<Chat>, DomainError> {
        Ok(lock(&self.chats).clone())
    }

    async fn get_messages(&self, chat_id: &str) -> Result<Vec<Message>, DomainError> {
        Ok(lock(&self.messages)
            .get(chat_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_message(
        &self,
        chat_id: &str,
        message_id: &str,
    ) -> Result<Option<Message>, DomainError> {
        Ok(lock(&self.messages)
            .get(chat_id)
            .and_then(|msgs| msgs.iter().find(|m| m.id == message_id).cloned()))
    }

    async fn decrypt_media(&self, message: &Message) -> Result<Vec<u8>, DomainError> {
        self.decrypt_calls.fetch_add(1, Ordering::SeqCst);
        if !message.has_attachment() {
            return Err(DomainError::NoAttachment(message.id.clone()));
        }
        if self.failing.contains(&message.id) {
            return Err(DomainError::Decrypt(format!("mock failure for {}", message.id)));
        }
        Ok(format!("payload:{}", message.id).into_bytes())
    }
}
