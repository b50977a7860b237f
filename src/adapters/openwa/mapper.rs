//! Map easy-API JSON shapes to domain entities.
//!
//! Ids arrive either as plain strings or as `{"_serialized": "..."}` objects
//! depending on the library version; both are accepted.

use crate::domain::{Chat, DomainError, Message};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::Value;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawContact {
    pub formatted_name: Option<String>,
    pub pushname: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChat {
    pub id: Value,
    #[serde(default)]
    pub t: Option<i64>,
    pub name: Option<String>,
    pub contact: Option<RawContact>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawMessage {
    pub id: Value,
    #[serde(default)]
    pub t: Option<i64>,
    pub body: Option<String>,
    pub mimetype: Option<String>,
    pub filename: Option<String>,
    pub from: Option<Value>,
    pub sender: Option<Value>,
    pub chat_id: Option<Value>,
    #[serde(default)]
    pub from_me: Option<bool>,
}

/// `"x"` or `{"_serialized": "x"}` -> `"x"`.
pub fn id_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Object(o) => o
            .get("_serialized")
            .and_then(Value::as_str)
            .map(String::from),
        _ => None,
    }
}

fn non_empty(s: Option<&str>) -> Option<String> {
    s.map(str::trim).filter(|s| !s.is_empty()).map(String::from)
}

pub fn chat_to_domain(raw: RawChat) -> Option<Chat> {
    let id = id_string(&raw.id)?;
    let contact_name = raw.contact.as_ref().and_then(|c| {
        non_empty(c.formatted_name.as_deref()).or_else(|| non_empty(c.pushname.as_deref()))
    });
    let name = contact_name
        .or_else(|| non_empty(raw.name.as_deref()))
        .unwrap_or_else(|| id.clone());
    Some(Chat {
        id,
        name,
        timestamp: raw.t.unwrap_or(0),
    })
}

/// `fallback_chat_id` is used when the payload does not carry its chat.
pub fn message_to_domain(raw: RawMessage, fallback_chat_id: &str) -> Option<Message> {
    let id = id_string(&raw.id)?;
    let chat_id = raw
        .chat_id
        .as_ref()
        .and_then(id_string)
        .unwrap_or_else(|| fallback_chat_id.to_string());
    let sender = raw.from.as_ref().and_then(id_string).or_else(|| {
        raw.sender
            .as_ref()
            .and_then(|s| s.get("id"))
            .and_then(id_string)
    });
    Some(Message {
        id,
        chat_id,
        timestamp: raw.t.unwrap_or(0),
        body: raw.body,
        mimetype: non_empty(raw.mimetype.as_deref()),
        filename: non_empty(raw.filename.as_deref()),
        sender,
        from_me: raw.from_me.unwrap_or(false),
    })
}

/// Decode `data:<mime>;base64,<payload>` (or a bare base64 payload) into bytes.
pub fn decode_data_url(s: &str) -> Result<Vec<u8>, DomainError> {
    let payload = match s.strip_prefix("data:") {
        Some(rest) => rest
            .split_once(',')
            .map(|(_, data)| data)
            .ok_or_else(|| DomainError::Decrypt("data URL without payload".into()))?,
        None => s,
    };
    STANDARD
        .decode(payload.trim())
        .map_err(|e| DomainError::Decrypt(format!("invalid base64: {}", e)))
}
