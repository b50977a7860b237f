//! Watcher use case: poll chat activity and publish newly observed messages.
//!
//! Events go out on a broadcast channel so any number of presentation adapters
//! can subscribe or go away without the watcher noticing. Uses tokio::time::sleep.

use crate::domain::{Chat, DomainError, IncomingMessage};
use crate::ports::WaGateway;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Buffered events per subscriber before a slow one starts lagging.
const EVENT_CAPACITY: usize = 256;

/// Progress through one chat. Timestamps are whole seconds, so the ids already
/// seen at `last` tell a second message in the same second apart from the first.
#[derive(Debug)]
struct ChatMark {
    last: i64,
    /// `None` until the chat has been fetched once; until then only messages
    /// strictly after `last` count as new.
    at_last: Option<HashSet<String>>,
}

/// Last seen activity per chat, plus a watermark for chats that appear later.
#[derive(Debug, Default)]
pub struct SeenState {
    per_chat: HashMap<String, ChatMark>,
    watermark: i64,
}

impl SeenState {
    fn from_chats(chats: &[Chat]) -> Self {
        Self {
            per_chat: chats
                .iter()
                .map(|c| {
                    let mark = ChatMark {
                        last: c.timestamp,
                        at_last: None,
                    };
                    (c.id.clone(), mark)
                })
                .collect(),
            watermark: chats.iter().map(|c| c.timestamp).max().unwrap_or(0),
        }
    }
}

/// Watcher service. Runs a loop: list chats -> fetch chats with new activity -> publish -> sleep.
pub struct WatcherService {
    wa: Arc<dyn WaGateway>,
    events: broadcast::Sender<IncomingMessage>,
    poll_interval: Duration,
}

impl WatcherService {
    pub fn new(wa: Arc<dyn WaGateway>, poll_interval: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            wa,
            events,
            poll_interval,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<IncomingMessage> {
        self.events.subscribe()
    }

    /// Snapshot current activity so only later messages are published.
    pub async fn baseline(&self) -> Result<SeenState, DomainError> {
        let chats = self.wa.get_chats().await?;
        Ok(SeenState::from_chats(&chats))
    }

    /// Run until the process stops. A failed poll is logged and retried next cycle.
    pub async fn run_loop(&self) -> Result<(), DomainError> {
        let mut seen = self.baseline().await?;
        info!(
            chats = seen.per_chat.len(),
            poll_secs = self.poll_interval.as_secs(),
            "watcher started"
        );
        loop {
            tokio::time::sleep(self.poll_interval).await;
            match self.poll_once(&mut seen).await {
                Ok(0) => {}
                Ok(n) => debug!(published = n, "new messages forwarded"),
                Err(e) => warn!(error = %e, "watcher poll failed"),
            }
        }
    }

    /// One poll cycle. Returns how many messages were published.
    ///
    /// Chats already fetched by the watcher are re-read while their activity
    /// second is unchanged, so a message landing in that same second is not lost.
    /// Messages sent by the session itself are never published.
    pub async fn poll_once(&self, seen: &mut SeenState) -> Result<usize, DomainError> {
        let chats = self.wa.get_chats().await?;
        let mut published = 0usize;

        for chat in chats {
            let watermark = seen.watermark;
            let mark = seen.per_chat.entry(chat.id.clone()).or_insert(ChatMark {
                last: watermark,
                at_last: None,
            });
            let recheck = chat.timestamp > mark.last
                || (chat.timestamp == mark.last && mark.at_last.is_some());
            if !recheck {
                continue;
            }

            let messages = self.wa.get_messages(&chat.id).await?;
            for m in &messages {
                let is_new = m.timestamp > mark.last
                    || (m.timestamp == mark.last
                        && mark.at_last.as_ref().is_some_and(|ids| !ids.contains(&m.id)));
                if !is_new || m.from_me {
                    continue;
                }
                // no subscribers is fine
                let _ = self.events.send(IncomingMessage::from(m));
                published += 1;
            }

            let newest = messages
                .iter()
                .map(|m| m.timestamp)
                .chain([chat.timestamp, mark.last])
                .max()
                .unwrap_or(mark.last);
            let mut at_newest: HashSet<String> = messages
                .iter()
                .filter(|m| m.timestamp == newest)
                .map(|m| m.id.clone())
                .collect();
            if newest == mark.last {
                if let Some(previous) = mark.at_last.take() {
                    at_newest.extend(previous);
                }
            }
            mark.last = newest;
            mark.at_last = Some(at_newest);
            seen.watermark = seen.watermark.max(newest);
        }

        Ok(published)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockWaGateway;
    use crate::adapters::mock::gateway::message;

    #[tokio::test]
    async fn test_publishes_only_new_messages() {
        let wa = Arc::new(
            MockWaGateway::new()
                .with_chat("a@c.us", "Alice", 100)
                .with_messages("a@c.us", vec![message("a@c.us", "old", 100, None)]),
        );
        let watcher = WatcherService::new(wa.clone(), Duration::from_secs(1));
        let mut rx = watcher.subscribe();
        let mut seen = watcher.baseline().await.unwrap();

        assert_eq!(watcher.poll_once(&mut seen).await.unwrap(), 0);

        let mut fresh = message("a@c.us", "new", 150, Some("image/jpeg"));
        fresh.body = Some("hi".into());
        wa.push_message(fresh);

        assert_eq!(watcher.poll_once(&mut seen).await.unwrap(), 1);
        let event = rx.recv().await.unwrap();
        assert_eq!(event.id, "new");
        assert_eq!(event.chat_id.as_deref(), Some("a@c.us"));
        assert_eq!(event.mimetype.as_deref(), Some("image/jpeg"));
        assert_eq!(event.t, 150);

        assert_eq!(watcher.poll_once(&mut seen).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_new_chat_uses_watermark() {
        let mut seen = SeenState::from_chats(&[Chat {
            id: "a@c.us".into(),
            name: "Alice".into(),
            timestamp: 100,
        }]);
        let wa = Arc::new(
            MockWaGateway::new()
                .with_chat("a@c.us", "Alice", 100)
                .with_chat("n@c.us", "New", 120)
                .with_messages(
                    "n@c.us",
                    vec![
                        message("n@c.us", "history", 50, None),
                        message("n@c.us", "hello", 120, None),
                    ],
                ),
        );
        let watcher = WatcherService::new(wa, Duration::from_secs(1));
        let mut rx = watcher.subscribe();

        assert_eq!(watcher.poll_once(&mut seen).await.unwrap(), 1);
        assert_eq!(rx.recv().await.unwrap().id, "hello");
    }

    #[tokio::test]
    async fn test_same_second_messages_are_each_published() {
        let wa = Arc::new(
            MockWaGateway::new()
                .with_chat("a@c.us", "Alice", 100)
                .with_messages("a@c.us", vec![message("a@c.us", "old", 100, None)]),
        );
        let watcher = WatcherService::new(wa.clone(), Duration::from_secs(1));
        let mut rx = watcher.subscribe();
        let mut seen = watcher.baseline().await.unwrap();

        wa.push_message(message("a@c.us", "m1", 150, None));
        assert_eq!(watcher.poll_once(&mut seen).await.unwrap(), 1);

        wa.push_message(message("a@c.us", "m2", 150, None));
        assert_eq!(watcher.poll_once(&mut seen).await.unwrap(), 1);
        assert_eq!(watcher.poll_once(&mut seen).await.unwrap(), 0);

        assert_eq!(rx.recv().await.unwrap().id, "m1");
        assert_eq!(rx.recv().await.unwrap().id, "m2");
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_own_messages_are_not_published() {
        let wa = Arc::new(MockWaGateway::new().with_chat("a@c.us", "Alice", 100));
        let watcher = WatcherService::new(wa.clone(), Duration::from_secs(1));
        let mut rx = watcher.subscribe();
        let mut seen = watcher.baseline().await.unwrap();

        let mut mine = message("a@c.us", "mine", 120, None);
        mine.from_me = true;
        wa.push_message(mine);
        wa.push_message(message("a@c.us", "theirs", 120, None));

        assert_eq!(watcher.poll_once(&mut seen).await.unwrap(), 1);
        assert_eq!(rx.recv().await.unwrap().id, "theirs");
        assert_eq!(watcher.poll_once(&mut seen).await.unwrap(), 0);
    }
}
