//! The persisted application state: bot configuration, recipients, and
//! per-recipient message logs.
//!
//! Everything here is plain data; mutation goes through `console::ChatConsole`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{BotIdentity, MessageId, RecipientId};

/// Lifecycle tag of an outbound message as reconciled with Telegram's
/// acknowledgment. Transitions exactly once: `Pending` -> `Delivered` or
/// `Pending` -> `Failed`.
///
/// `Read` is part of the model for a future inbound read-receipt feature;
/// nothing produces it today.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryState {
    Pending,
    Delivered,
    Read,
    Failed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Outbound,
    Inbound,
}

/// One chat message. Immutable once created except for `delivery`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub origin: Origin,
    pub body: String,
    /// Local wall-clock time at creation, formatted `HH:MM`.
    pub created_at_label: String,
    pub delivery: DeliveryState,
}

/// A conversational counterparty. `id` is the Telegram chat id the operator
/// supplied; it is not generated and not checked for collisions on add.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: RecipientId,
    pub name: String,
    pub avatar: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unread_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
}

/// Bot credentials plus the identity confirmed by the last successful
/// verification. The token is never validated locally beyond non-emptiness.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identity: Option<BotIdentity>,
}

impl BotConfig {
    pub fn is_configured(&self) -> bool {
        !self.token.is_empty()
    }
}

/// Root aggregate, serialized whole to the state file on every mutation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppState {
    #[serde(default)]
    pub config: BotConfig,
    #[serde(default)]
    pub recipients: Vec<Recipient>,
    /// Message log per recipient id. Append-only per key; entries survive
    /// recipient removal.
    #[serde(default)]
    pub messages: HashMap<RecipientId, Vec<Message>>,
    #[serde(default)]
    pub active_recipient_id: Option<RecipientId>,
}

impl AppState {
    /// Fresh state for a first run: no token, two placeholder recipients so
    /// the console is not empty before the operator adds real chats.
    pub fn seed() -> Self {
        let recipients = vec![
            Recipient {
                id: RecipientId::new("12345678"),
                name: "Dev Support".to_string(),
                avatar: "https://api.dicebear.com/7.x/avataaars/svg?seed=dev".to_string(),
                last_message: Some("System: Ready".to_string()),
                last_time: Some("now".to_string()),
                unread_count: None,
                pinned: Some(true),
            },
            Recipient {
                id: RecipientId::new("23456789"),
                name: "Eva Summer".to_string(),
                avatar: "https://api.dicebear.com/7.x/avataaars/svg?seed=eva".to_string(),
                last_message: Some("Waiting for bot...".to_string()),
                last_time: Some("11:28 PM".to_string()),
                unread_count: Some(0),
                pinned: None,
            },
        ];
        let active = recipients.first().map(|r| r.id.clone());
        Self {
            config: BotConfig::default(),
            recipients,
            messages: HashMap::new(),
            active_recipient_id: active,
        }
    }

    /// Restore invariant: `active_recipient_id` must point at an existing
    /// recipient. Falls back to the first recipient, or none.
    pub fn repair_active(&mut self) {
        let valid = self
            .active_recipient_id
            .as_ref()
            .is_some_and(|id| self.contains_recipient(id));
        if !valid {
            self.active_recipient_id = self.recipients.first().map(|r| r.id.clone());
        }
    }

    pub fn contains_recipient(&self, id: &RecipientId) -> bool {
        self.recipients.iter().any(|r| &r.id == id)
    }

    pub fn recipient(&self, id: &RecipientId) -> Option<&Recipient> {
        self.recipients.iter().find(|r| &r.id == id)
    }

    pub fn active_recipient(&self) -> Option<&Recipient> {
        self.active_recipient_id
            .as_ref()
            .and_then(|id| self.recipient(id))
    }

    /// Messages of the active recipient, empty when none is selected.
    pub fn active_messages(&self) -> &[Message] {
        self.active_recipient_id
            .as_ref()
            .and_then(|id| self.messages.get(id))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
