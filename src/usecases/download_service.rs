//! Media download pipeline: list messages -> filter by kind -> decrypt -> write -> report.
//!
//! - Runs one sequential pass per request; no worker pool
//! - A failed decrypt or write skips that file, never the batch
//! - Progress ticks go out on an unbounded channel after each write

use crate::domain::media::{
    INDIVIDUAL_DIR, extension_for_mime, format_file_size, sanitize_chat_id, single_download_name,
};
use crate::domain::{
    DomainError, DownloadKind, DownloadProgress, DownloadResult, Message, SavedFile,
    SingleDownload,
};
use crate::ports::WaGateway;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Download service. Decrypts attachments through the gateway and stores them
/// under `<root>/<sanitized chat id>/<kind>/`.
pub struct DownloadService {
    wa: Arc<dyn WaGateway>,
    root: PathBuf,
}

impl DownloadService {
    pub fn new(wa: Arc<dyn WaGateway>, root: impl Into<PathBuf>) -> Self {
        Self {
            wa,
            root: root.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Folder that holds `kind` downloads for `chat_id`.
    pub fn folder_for(&self, chat_id: &str, kind: DownloadKind) -> PathBuf {
        self.root.join(sanitize_chat_id(chat_id)).join(kind.as_str())
    }

    /// Download every attachment of `kind` in the chat.
    ///
    /// `progress` receives `{total, completed, last_file}` after each file is written;
    /// a dropped receiver is ignored.
    pub async fn download_media(
        &self,
        chat_id: &str,
        kind: DownloadKind,
        progress: Option<&mpsc::UnboundedSender<DownloadProgress>>,
    ) -> Result<DownloadResult, DomainError> {
        let messages = self.wa.get_messages(chat_id).await?;
        let candidates: Vec<&Message> = messages
            .iter()
            .filter(|m| m.mimetype.as_deref().is_some_and(|mime| kind.matches(mime)))
            .collect();
        let total = candidates.len();

        let folder = self.folder_for(chat_id, kind);
        fs::create_dir_all(&folder)
            .await
            .map_err(|e| DomainError::Storage(format!("create {}: {}", folder.display(), e)))?;

        info!(chat_id, %kind, total, folder = %folder.display(), "starting media download");

        let mut saved = 0usize;
        for msg in candidates {
            let path = match self.save_one(msg, &folder).await {
                Ok(path) => path,
                Err(e) => {
                    warn!(chat_id, msg_id = %msg.id, error = %e, "skipping media");
                    continue;
                }
            };
            saved += 1;
            debug!(chat_id, msg_id = %msg.id, path = %path.display(), "media saved");
            if let Some(tx) = progress {
                let _ = tx.send(DownloadProgress {
                    total,
                    completed: saved,
                    last_file: path,
                });
            }
        }

        let files = list_folder(&folder).await?;
        info!(chat_id, %kind, total, saved, "media download finished");

        Ok(DownloadResult {
            total,
            saved,
            folder,
            files,
        })
    }

    /// Download the attachment of exactly one message into `<chat>/individual/`.
    ///
    /// Returns `MessageNotFound` / `NoAttachment` as values so the caller can show them.
    pub async fn download_message(
        &self,
        chat_id: &str,
        message_id: &str,
    ) -> Result<SingleDownload, DomainError> {
        let msg = self
            .wa
            .get_message(chat_id, message_id)
            .await?
            .ok_or_else(|| DomainError::MessageNotFound {
                chat_id: chat_id.to_string(),
                message_id: message_id.to_string(),
            })?;
        let Some(mimetype) = msg.mimetype.as_deref().filter(|m| !m.is_empty()) else {
            return Err(DomainError::NoAttachment(msg.id.clone()));
        };

        let folder = self.root.join(sanitize_chat_id(chat_id)).join(INDIVIDUAL_DIR);
        fs::create_dir_all(&folder)
            .await
            .map_err(|e| DomainError::Storage(format!("create {}: {}", folder.display(), e)))?;

        let bytes = self.wa.decrypt_media(&msg).await?;
        let ext = extension_for_mime(mimetype);
        let path = folder.join(single_download_name(msg.filename.as_deref(), &msg.id, &ext));
        fs::write(&path, &bytes)
            .await
            .map_err(|e| DomainError::Storage(format!("write {}: {}", path.display(), e)))?;

        info!(chat_id, msg_id = %msg.id, path = %path.display(), "message media saved");
        Ok(SingleDownload { folder, path })
    }

    async fn save_one(&self, msg: &Message, folder: &Path) -> Result<PathBuf, DomainError> {
        let bytes = self.wa.decrypt_media(msg).await?;
        let ext = extension_for_mime(msg.mimetype.as_deref().unwrap_or_default());
        let path = folder.join(format!("{}_{}.{}", msg.timestamp, msg.id, ext));
        fs::write(&path, &bytes)
            .await
            .map_err(|e| DomainError::Storage(format!("write {}: {}", path.display(), e)))?;
        Ok(path)
    }
}

/// Regular files in `folder`, sorted by name.
pub async fn list_folder(folder: &Path) -> Result<Vec<SavedFile>, DomainError> {
    let mut entries = fs::read_dir(folder)
        .await
        .map_err(|e| DomainError::Storage(format!("read {}: {}", folder.display(), e)))?;
    let mut files = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| DomainError::Storage(e.to_string()))?
    {
        let meta = match entry.metadata().await {
            Ok(m) if m.is_file() => m,
            _ => continue,
        };
        files.push(SavedFile {
            path: entry.path(),
            filename: entry.file_name().to_string_lossy().into_owned(),
            size_bytes: meta.len(),
            size: format_file_size(meta.len()),
        });
    }
    files.sort_by(|a, b| a.filename.cmp(&b.filename));
    Ok(files)
}
