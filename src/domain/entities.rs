//! Domain entities. Pure data structures for the core business.
//!
//! No automation-library types here; adapters map their wire shapes into these.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A chat (contact or group) as listed by the automation session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: String,
    pub name: String,
    /// Last activity, unix seconds.
    #[serde(rename = "t")]
    pub timestamp: i64,
}

/// A single message from a chat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub chat_id: String,
    #[serde(rename = "t")]
    pub timestamp: i64,
    pub body: Option<String>,
    pub mimetype: Option<String>,
    pub filename: Option<String>,
    #[serde(rename = "from")]
    pub sender: Option<String>,
    /// Sent by the session's own account.
    #[serde(default)]
    pub from_me: bool,
}

impl Message {
    /// True when the message references an attachment the library can decrypt.
    pub fn has_attachment(&self) -> bool {
        self.mimetype.as_deref().is_some_and(|m| !m.is_empty())
    }
}

/// Message projection for display, with an inline preview for images.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageView {
    pub id: String,
    #[serde(rename = "t")]
    pub timestamp: i64,
    pub mimetype: Option<String>,
    pub filename: Option<String>,
    pub body: Option<String>,
    pub from: Option<String>,
    /// `data:<mime>;base64,...` for image messages that decrypted successfully.
    pub media_url: Option<String>,
}

/// Payload published once per newly observed message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingMessage {
    pub id: String,
    pub from: Option<String>,
    pub chat_id: Option<String>,
    pub body: Option<String>,
    pub mimetype: Option<String>,
    pub t: i64,
}

impl From<&Message> for IncomingMessage {
    fn from(m: &Message) -> Self {
        Self {
            id: m.id.clone(),
            from: m.sender.clone().or_else(|| Some(m.chat_id.clone())),
            chat_id: Some(m.chat_id.clone()),
            body: m.body.clone(),
            mimetype: m.mimetype.clone(),
            t: m.timestamp,
        }
    }
}

/// One tick of a bulk download, sent after each successful write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadProgress {
    pub total: usize,
    pub completed: usize,
    pub last_file: PathBuf,
}

/// A file found in a download folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedFile {
    pub path: PathBuf,
    pub filename: String,
    pub size_bytes: u64,
    /// Human readable, e.g. "1.5 KB".
    pub size: String,
}

/// Outcome of a bulk download. `saved <= total` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadResult {
    pub total: usize,
    pub saved: usize,
    pub folder: PathBuf,
    pub files: Vec<SavedFile>,
}

/// Outcome of a single-message download.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleDownload {
    pub folder: PathBuf,
    pub path: PathBuf,
}

/// A printer known to the local spooler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Printer {
    pub name: String,
    pub is_default: bool,
}

/// Printer names plus the one to preselect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrinterList {
    pub printers: Vec<String>,
    pub default: String,
}
