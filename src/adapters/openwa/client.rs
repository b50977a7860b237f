//! Implements WaGateway against the automation library's HTTP easy API.
//!
//! Every library method is `POST <base>/<method>` with `{"args": {...}}` and
//! answers `{"success": bool, "response": ...}`.

use crate::adapters::openwa::mapper::{self, RawChat, RawMessage};
use crate::domain::{Chat, DomainError, Message};
use crate::ports::WaGateway;
use async_trait::async_trait;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

/// Header carrying the easy-API key, when the library was started with one.
const API_KEY_HEADER: &str = "api_key";

#[derive(Debug, Deserialize)]
struct Envelope {
    success: bool,
    #[serde(default)]
    response: Value,
    #[serde(default)]
    error: Value,
}

/// Gateway adapter. Cheap to share behind an `Arc`; reqwest pools connections.
pub struct OpenWaGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl OpenWaGateway {
    /// Use `session::connect` instead; it only hands out a gateway once the
    /// session reports CONNECTED.
    pub(crate) fn new(base_url: &str, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
        }
    }

    /// Invoke a library method and deserialize its `response`.
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        args: Value,
    ) -> Result<T, DomainError> {
        let url = format!("{}/{}", self.base_url, method);
        let mut req = self.client.post(&url).json(&json!({ "args": args }));
        if let Some(key) = &self.api_key {
            req = req.header(API_KEY_HEADER, key);
        }

        let resp = req
            .send()
            .await
            .map_err(|e| DomainError::Automation(format!("{}: {}", method, e)))?;
        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| DomainError::Automation(format!("{}: read body: {}", method, e)))?;
        if !status.is_success() {
            return Err(DomainError::Automation(format!(
                "{}: HTTP {}: {}",
                method, status, text
            )));
        }

        let envelope: Envelope = serde_json::from_str(&text)
            .map_err(|e| DomainError::Automation(format!("{}: invalid response: {}", method, e)))?;
        if !envelope.success {
            let detail = match envelope.error {
                Value::Null => "unknown error".to_string(),
                Value::String(s) => s,
                other => other.to_string(),
            };
            return Err(DomainError::Automation(format!("{}: {}", method, detail)));
        }
        debug!(method, "easy API call ok");
        serde_json::from_value(envelope.response)
            .map_err(|e| DomainError::Automation(format!("{}: unexpected shape: {}", method, e)))
    }
}

#[async_trait]
impl WaGateway for OpenWaGateway {
    async fn get_chats(&self) -> Result<Vec<Chat>, DomainError> {
        let raw: Vec<RawChat> = self.call("getAllChats", json!({})).await?;
        Ok(raw.into_iter().filter_map(mapper::chat_to_domain).collect())
    }

    async fn get_messages(&self, chat_id: &str) -> Result<Vec<Message>, DomainError> {
        let raw: Vec<RawMessage> = self
            .call(
                "getAllMessagesInChat",
                json!({ "chatId": chat_id, "includeMe": true, "includeNotifications": false }),
            )
            .await?;
        let total = raw.len();
        let messages: Vec<Message> = raw
            .into_iter()
            .filter_map(|m| mapper::message_to_domain(m, chat_id))
            .collect();
        if messages.len() < total {
            warn!(
                chat_id,
                dropped = total - messages.len(),
                "messages without id dropped"
            );
        }
        Ok(messages)
    }

    async fn get_message(
        &self,
        chat_id: &str,
        message_id: &str,
    ) -> Result<Option<Message>, DomainError> {
        let raw: Option<RawMessage> = self
            .call("getMessageById", json!({ "messageId": message_id }))
            .await?;
        Ok(raw
            .and_then(|m| mapper::message_to_domain(m, chat_id))
            .filter(|m| m.chat_id == chat_id))
    }

    async fn decrypt_media(&self, message: &Message) -> Result<Vec<u8>, DomainError> {
        if !message.has_attachment() {
            return Err(DomainError::NoAttachment(message.id.clone()));
        }
        let data_url: String = self
            .call("decryptMedia", json!({ "message": message.id }))
            .await
            .map_err(|e| DomainError::Decrypt(e.to_string()))?;
        mapper::decode_data_url(&data_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::gateway::message;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ok(response: Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({"success": true, "response": response}))
    }

    #[tokio::test]
    async fn test_unwraps_envelope_and_sends_api_key() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/getAllChats"))
            .and(header("api_key", "secret"))
            .and(body_json(json!({"args": {}})))
            .respond_with(ok(json!([
                {"id": {"_serialized": "1@c.us"}, "t": 5, "name": "Alice"},
                {"id": "2@g.us", "t": 9}
            ])))
            .mount(&server)
            .await;

        let wa = OpenWaGateway::new(&server.uri(), Some("secret".into()));
        let chats = wa.get_chats().await.unwrap();
        assert_eq!(chats.len(), 2);
        assert_eq!(chats[0].id, "1@c.us");
        assert_eq!(chats[0].name, "Alice");
        assert_eq!(chats[1].timestamp, 9);
    }

    #[tokio::test]
    async fn test_messages_request_args() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/getAllMessagesInChat"))
            .and(body_json(json!({"args": {
                "chatId": "1@c.us",
                "includeMe": true,
                "includeNotifications": false
            }})))
            .respond_with(ok(json!([
                {"id": "m1", "t": 3, "mimetype": "application/pdf", "fromMe": false},
                {"id": 7, "t": 4}
            ])))
            .mount(&server)
            .await;

        let wa = OpenWaGateway::new(&server.uri(), None);
        let messages = wa.get_messages("1@c.us").await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].chat_id, "1@c.us");
        assert!(messages[0].has_attachment());
    }

    #[tokio::test]
    async fn test_failed_envelope_and_http_errors_are_automation_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/getAllChats"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": false, "error": "session closed"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/getAllMessagesInChat"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let wa = OpenWaGateway::new(&server.uri(), None);
        match wa.get_chats().await.unwrap_err() {
            DomainError::Automation(msg) => assert_eq!(msg, "getAllChats: session closed"),
            other => panic!("unexpected error: {other}"),
        }
        match wa.get_messages("1@c.us").await.unwrap_err() {
            DomainError::Automation(msg) => assert!(msg.contains("HTTP 500"), "{msg}"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_get_message_filters_other_chats() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/getMessageById"))
            .and(body_json(json!({"args": {"messageId": "m1"}})))
            .respond_with(ok(json!({"id": "m1", "t": 1, "chatId": "other@c.us"})))
            .mount(&server)
            .await;

        let wa = OpenWaGateway::new(&server.uri(), None);
        assert_eq!(wa.get_message("1@c.us", "m1").await.unwrap(), None);
        assert!(wa.get_message("other@c.us", "m1").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_decrypt_media() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/decryptMedia"))
            .and(body_json(json!({"args": {"message": "good"}})))
            .respond_with(ok(json!("data:application/pdf;base64,aGVsbG8=")))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/decryptMedia"))
            .and(body_json(json!({"args": {"message": "bad"}})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"success": false, "error": "media expired"})),
            )
            .mount(&server)
            .await;

        let wa = OpenWaGateway::new(&server.uri(), None);
        let good = message("1@c.us", "good", 1, Some("application/pdf"));
        assert_eq!(wa.decrypt_media(&good).await.unwrap(), b"hello");

        let bad = message("1@c.us", "bad", 2, Some("application/pdf"));
        match wa.decrypt_media(&bad).await.unwrap_err() {
            DomainError::Decrypt(msg) => assert!(msg.contains("media expired"), "{msg}"),
            other => panic!("unexpected error: {other}"),
        }

        let text = message("1@c.us", "txt", 3, None);
        assert!(matches!(
            wa.decrypt_media(&text).await.unwrap_err(),
            DomainError::NoAttachment(_)
        ));
    }
}
