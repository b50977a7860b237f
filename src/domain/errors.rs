//! Domain errors. Used by ports and use cases.
//!
//! Adapters map infrastructure errors into these.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("WhatsApp session not ready: {0}")]
    SessionNotReady(String),

    #[error("Automation client error: {0}")]
    Automation(String),

    #[error("Media decryption failed: {0}")]
    Decrypt(String),

    #[error("Message {message_id} not found in chat {chat_id}")]
    MessageNotFound { chat_id: String, message_id: String },

    #[error("Message {0} has no media")]
    NoAttachment(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Print failed: {0}")]
    Print(String),

    #[error("Invalid print option: {0}")]
    InvalidPrintOption(String),

    #[error("Could not open folder: {0}")]
    Shell(String),

    #[error("Prompt failed: {0}")]
    Ui(String),

    #[error("Malformed command: {0}")]
    Protocol(String),
}
