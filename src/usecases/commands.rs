//! Command surface shared by the presentation adapters.
//!
//! Every command answers with `{ok: true, result}` or `{ok: false, error}`;
//! errors never escape as failures.

use crate::domain::{DomainError, DownloadKind, DownloadProgress, PrintJob};
use crate::ports::FolderOpener;
use crate::usecases::{ChatService, DownloadService, PrintService};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "cmd", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    GetChats,
    GetMessages {
        chat_id: String,
    },
    DownloadMedia {
        chat_id: String,
        #[serde(rename = "type")]
        kind: DownloadKind,
    },
    DownloadMessage {
        chat_id: String,
        message_id: String,
    },
    OpenFolder {
        path: PathBuf,
    },
    GetPrinters,
    PrintPdfs {
        jobs: Vec<PrintJob>,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::GetChats => "getChats",
            Command::GetMessages { .. } => "getMessages",
            Command::DownloadMedia { .. } => "downloadMedia",
            Command::DownloadMessage { .. } => "downloadMessage",
            Command::OpenFolder { .. } => "openFolder",
            Command::GetPrinters => "getPrinters",
            Command::PrintPdfs { .. } => "printPdfs",
        }
    }
}

/// Uniform command outcome.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Response {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    pub fn success(result: Value) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(error: &DomainError) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(error.to_string()),
        }
    }
}

/// Routes commands to the use cases. Only constructible from live services,
/// so every command runs against a connected session.
pub struct CommandHandler {
    chats: Arc<ChatService>,
    downloads: Arc<DownloadService>,
    printing: Arc<PrintService>,
    opener: Arc<dyn FolderOpener>,
}

impl CommandHandler {
    pub fn new(
        chats: Arc<ChatService>,
        downloads: Arc<DownloadService>,
        printing: Arc<PrintService>,
        opener: Arc<dyn FolderOpener>,
    ) -> Self {
        Self {
            chats,
            downloads,
            printing,
            opener,
        }
    }

    /// Run one command. `progress` only matters for `downloadMedia`.
    pub async fn handle(
        &self,
        command: Command,
        progress: Option<&mpsc::UnboundedSender<DownloadProgress>>,
    ) -> Response {
        let name = command.name();
        match self.dispatch(command, progress).await {
            Ok(value) => Response::success(value),
            Err(e) => {
                warn!(command = name, error = %e, "command failed");
                Response::failure(&e)
            }
        }
    }

    async fn dispatch(
        &self,
        command: Command,
        progress: Option<&mpsc::UnboundedSender<DownloadProgress>>,
    ) -> Result<Value, DomainError> {
        match command {
            Command::GetChats => to_value(self.chats.list_chats().await?),
            Command::GetMessages { chat_id } => to_value(self.chats.list_messages(&chat_id).await?),
            Command::DownloadMedia { chat_id, kind } => {
                to_value(self.downloads.download_media(&chat_id, kind, progress).await?)
            }
            Command::DownloadMessage {
                chat_id,
                message_id,
            } => to_value(self.downloads.download_message(&chat_id, &message_id).await?),
            Command::OpenFolder { path } => {
                self.opener.open_folder(&path)?;
                Ok(serde_json::json!({ "path": path }))
            }
            Command::GetPrinters => to_value(self.printing.get_printers().await?),
            Command::PrintPdfs { jobs } => {
                let submitted = self.printing.print_all(&jobs).await?;
                Ok(serde_json::json!({ "submitted": submitted }))
            }
        }
    }
}

fn to_value(v: impl Serialize) -> Result<Value, DomainError> {
    serde_json::to_value(v).map_err(|e| DomainError::Protocol(e.to_string()))
}
