//! Buyer/farmer chat threads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::define_id_type;

define_id_type!(ChatId);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatSender {
    Buyer,
    Farmer,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub sender: ChatSender,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// The conversation between one buyer and one farm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    #[serde(rename = "_id")]
    pub id: ChatId,
    pub buyer_id: String,
    pub farm_id: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chat {
    pub fn open(buyer_id: &str, farm_id: &str, now: DateTime<Utc>) -> Self {
        Self {
            id: ChatId::generate(),
            buyer_id: buyer_id.to_string(),
            farm_id: farm_id.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn push(&mut self, sender: ChatSender, message: String, now: DateTime<Utc>) {
        self.messages.push(ChatMessage {
            sender,
            message,
            timestamp: now,
        });
        self.updated_at = now;
    }
}

/// Request body for sending a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    pub sender: ChatSender,
    pub message: String,
}

impl NewMessage {
    pub fn validate(&self) -> Result<(), String> {
        if self.message.trim().is_empty() {
            return Err("message is required".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sender_wire_format() {
        let msg: NewMessage =
            serde_json::from_str(r#"{"sender":"farmer","message":"Fresh stock"}"#).unwrap();
        assert_eq!(msg.sender, ChatSender::Farmer);
        assert!(serde_json::from_str::<NewMessage>(r#"{"sender":"broker","message":"x"}"#).is_err());
    }

    #[test]
    fn test_push_bumps_updated_at() {
        let opened = Utc::now() - chrono::Duration::minutes(5);
        let mut chat = Chat::open("b1", "f1", opened);
        let now = Utc::now();
        chat.push(ChatSender::Buyer, "Price for 200kg?".to_string(), now);
        assert_eq!(chat.messages.len(), 1);
        assert_eq!(chat.updated_at, now);
        assert_eq!(chat.created_at, opened);
    }
}
