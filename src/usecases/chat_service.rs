//! Chat browsing: sorted chat list and message list with inline image previews.

use crate::domain::{Chat, DomainError, Message, MessageView};
use crate::ports::WaGateway;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::sync::Arc;
use tracing::debug;

pub struct ChatService {
    wa: Arc<dyn WaGateway>,
    /// Decrypt image attachments into `data:` URLs when listing messages.
    preview_images: bool,
}

impl ChatService {
    pub fn new(wa: Arc<dyn WaGateway>, preview_images: bool) -> Self {
        Self { wa, preview_images }
    }

    /// Chats, most recently active first.
    pub async fn list_chats(&self) -> Result<Vec<Chat>, DomainError> {
        let mut chats = self.wa.get_chats().await?;
        chats.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(chats)
    }

    /// Messages of a chat. Preview failures leave `media_url` empty.
    pub async fn list_messages(&self, chat_id: &str) -> Result<Vec<MessageView>, DomainError> {
        let messages = self.wa.get_messages(chat_id).await?;
        let mut out = Vec::with_capacity(messages.len());
        for m in messages {
            let media_url = if self.preview_images {
                self.preview(&m).await
            } else {
                None
            };
            out.push(MessageView {
                id: m.id,
                timestamp: m.timestamp,
                mimetype: m.mimetype,
                filename: m.filename,
                body: m.body,
                from: m.sender,
                media_url,
            });
        }
        Ok(out)
    }

    async fn preview(&self, m: &Message) -> Option<String> {
        let mime = m.mimetype.as_deref().filter(|mime| mime.contains("image"))?;
        match self.wa.decrypt_media(m).await {
            Ok(bytes) => Some(format!("data:{};base64,{}", mime, STANDARD.encode(bytes))),
            Err(e) => {
                debug!(msg_id = %m.id, error = %e, "image preview unavailable");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockWaGateway;
    use crate::adapters::mock::gateway::message;

    #[tokio::test]
    async fn test_chats_sorted_by_activity() {
        let wa = MockWaGateway::new()
            .with_chat("a@c.us", "Alice", 100)
            .with_chat("b@c.us", "Bob", 300)
            .with_chat("g@g.us", "Group", 200);
        let chats = ChatService::new(Arc::new(wa), true).list_chats().await.unwrap();
        let ids: Vec<_> = chats.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b@c.us", "g@g.us", "a@c.us"]);
    }

    #[tokio::test]
    async fn test_image_messages_get_data_url() {
        let wa = MockWaGateway::new()
            .with_messages(
                "a@c.us",
                vec![
                    message("a@c.us", "img", 1, Some("image/png")),
                    message("a@c.us", "doc", 2, Some("application/pdf")),
                    message("a@c.us", "bad", 3, Some("image/jpeg")),
                ],
            )
            .failing_decrypt("bad");
        let views = ChatService::new(Arc::new(wa), true)
            .list_messages("a@c.us")
            .await
            .unwrap();
        assert_eq!(
            views[0].media_url.as_deref(),
            Some(format!("data:image/png;base64,{}", STANDARD.encode("payload:img")).as_str())
        );
        assert_eq!(views[1].media_url, None);
        assert_eq!(views[2].media_url, None);
    }

    #[tokio::test]
    async fn test_previews_can_be_disabled() {
        let wa = Arc::new(
            MockWaGateway::new()
                .with_messages("a@c.us", vec![message("a@c.us", "img", 1, Some("image/png"))]),
        );
        let views = ChatService::new(wa.clone(), false)
            .list_messages("a@c.us")
            .await
            .unwrap();
        assert_eq!(views[0].media_url, None);
        assert_eq!(wa.decrypt_calls(), 0);
    }
}
