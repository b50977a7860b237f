//! Outbound ports. Application calls into infrastructure.
//!
//! Implemented by adapters.

use crate::domain::{Chat, DomainError, Message, Printer, SpoolOptions};
use std::path::Path;

/// WhatsApp automation session. Listing, lookup and attachment decryption.
///
/// A value implementing this only exists once the session is connected, so
/// use cases never see a half-initialized client.
#[async_trait::async_trait]
pub trait WaGateway: Send + Sync {
    /// All chats the session participates in.
    async fn get_chats(&self) -> Result<Vec<Chat>, DomainError>;

    /// All messages of a chat, oldest first.
    async fn get_messages(&self, chat_id: &str) -> Result<Vec<Message>, DomainError>;

    /// One message by id. `Ok(None)` when the library does not know it.
    async fn get_message(
        &self,
        chat_id: &str,
        message_id: &str,
    ) -> Result<Option<Message>, DomainError>;

    /// Decrypt the attachment referenced by `message` into raw bytes.
    async fn decrypt_media(&self, message: &Message) -> Result<Vec<u8>, DomainError>;
}

/// Local print spooler.
#[async_trait::async_trait]
pub trait PrinterPort: Send + Sync {
    /// Installed printers, with the system default flagged.
    async fn list_printers(&self) -> Result<Vec<Printer>, DomainError>;

    /// Submit one file. Returns once the spooler accepted (or rejected) the job.
    async fn print(&self, path: &Path, options: &SpoolOptions) -> Result<(), DomainError>;
}

/// Reveals a folder in the system file browser.
pub trait FolderOpener: Send + Sync {
    fn open_folder(&self, path: &Path) -> Result<(), DomainError>;
}
