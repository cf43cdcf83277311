//! The application state container.
//!
//! Owns the single `AppState` aggregate behind a mutex, exposes the narrow
//! mutation API the presentation layer calls, and persists the whole
//! aggregate after every mutation. Remote sends follow an optimistic-update /
//! reconciliation protocol: the message is appended as `Pending` before the
//! HTTP call is dispatched, then flipped to `Delivered` or `Failed` by id
//! once the call resolves.

use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use chrono::{Local, Utc};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::{
    domain::{BotIdentity, MessageId, RecipientId},
    messaging::port::TelegramPort,
    state::{AppState, BotConfig, DeliveryState, Message, Origin, Recipient},
    store::StateStore,
    Error, Result,
};

/// Result of one `send_message` call, after the remote phase settled.
#[derive(Debug)]
pub enum SendOutcome {
    /// No recipient selected; state unchanged.
    NoActiveRecipient,
    /// No token configured; the message was recorded locally and stays
    /// `Pending`. Offline mode still captures outbound intent.
    Recorded { message_id: MessageId },
    /// Telegram acknowledged the send.
    Delivered { message_id: MessageId },
    /// The remote call failed; the message is kept with `Failed` delivery and
    /// the error is reported here rather than thrown.
    Failed { message_id: MessageId, error: Error },
}

pub struct ChatConsole {
    store: StateStore,
    api: Arc<dyn TelegramPort>,
    state: Mutex<AppState>,
    msg_seq: AtomicU64,
}

impl ChatConsole {
    /// Restore from the store, or start from the seed state.
    pub fn new(store: StateStore, api: Arc<dyn TelegramPort>) -> Self {
        let state = store.load().unwrap_or_else(AppState::seed);
        Self::with_state(store, api, state)
    }

    pub fn with_state(store: StateStore, api: Arc<dyn TelegramPort>, state: AppState) -> Self {
        Self {
            store,
            api,
            state: Mutex::new(state),
            msg_seq: AtomicU64::new(0),
        }
    }

    /// Read projection for the presentation layer.
    pub async fn snapshot(&self) -> AppState {
        self.state.lock().await.clone()
    }

    pub async fn is_configured(&self) -> bool {
        self.state.lock().await.config.is_configured()
    }

    /// Select a recipient. Unknown ids are a silent no-op (returns `false`),
    /// matching the permissive selection behavior the UI relies on.
    pub async fn select_recipient(&self, id: &RecipientId) -> bool {
        let mut st = self.state.lock().await;
        if !st.contains_recipient(id) {
            return false;
        }
        st.active_recipient_id = Some(id.clone());
        self.persist(&st);
        true
    }

    /// Prepend a recipient and make it active. Ids are caller-supplied and
    /// deliberately not deduplicated; a duplicate id shadows the older entry
    /// in id-keyed lookups.
    pub async fn add_recipient(&self, recipient: Recipient) {
        let mut st = self.state.lock().await;
        st.active_recipient_id = Some(recipient.id.clone());
        st.recipients.insert(0, recipient);
        self.persist(&st);
    }

    /// Remove a recipient. If it was active, activation falls back to the
    /// first remaining recipient, or none. Its message log is kept.
    pub async fn remove_recipient(&self, id: &RecipientId) {
        let mut st = self.state.lock().await;
        st.recipients.retain(|r| &r.id != id);
        if st.active_recipient_id.as_ref() == Some(id) {
            st.active_recipient_id = st.recipients.first().map(|r| r.id.clone());
        }
        self.persist(&st);
    }

    /// Wholesale replace of the bot configuration.
    pub async fn update_bot_config(&self, config: BotConfig) {
        let mut st = self.state.lock().await;
        st.config = config;
        self.persist(&st);
    }

    /// Verify a token against `getMe` and, on success, store it together with
    /// the confirmed identity. Errors surface to the caller (the settings
    /// flow) and leave the existing configuration untouched.
    pub async fn verify_token(&self, token: &str) -> Result<BotIdentity> {
        let identity = self.api.get_me(token).await?;
        let mut st = self.state.lock().await;
        st.config = BotConfig {
            token: token.to_string(),
            identity: Some(identity.clone()),
        };
        self.persist(&st);
        Ok(identity)
    }

    /// Send `text` to the active recipient.
    ///
    /// Phase 1 (synchronous): append a `Pending` message and update the
    /// recipient's preview fields, then persist. Phase 2 (after the await
    /// point): if a token is configured, call Telegram and flip that one
    /// message to `Delivered` or `Failed`. The lock is not held across the
    /// HTTP call; reconciliation re-locates the message by id in whatever the
    /// aggregate has become, so concurrent sends and selection changes are
    /// safe.
    pub async fn send_message(&self, text: &str) -> SendOutcome {
        let message_id = self.next_message_id();
        let (recipient_id, token) = {
            let mut st = self.state.lock().await;
            let Some(active) = st.active_recipient_id.clone() else {
                return SendOutcome::NoActiveRecipient;
            };

            let label = Local::now().format("%H:%M").to_string();
            let message = Message {
                id: message_id.clone(),
                origin: Origin::Outbound,
                body: text.to_string(),
                created_at_label: label.clone(),
                delivery: DeliveryState::Pending,
            };
            st.messages.entry(active.clone()).or_default().push(message);
            if let Some(r) = st.recipients.iter_mut().find(|r| r.id == active) {
                r.last_message = Some(text.to_string());
                r.last_time = Some(label);
            }
            self.persist(&st);
            (active, st.config.token.clone())
        };

        if token.is_empty() {
            debug!(%recipient_id, "no token configured, message recorded as pending");
            return SendOutcome::Recorded { message_id };
        }

        match self.api.send_message(&token, &recipient_id, text).await {
            Ok(echo) => {
                debug!(%recipient_id, remote_id = echo.message_id, "message delivered");
                self.reconcile(&recipient_id, &message_id, DeliveryState::Delivered)
                    .await;
                SendOutcome::Delivered { message_id }
            }
            Err(error) => {
                warn!(%recipient_id, %error, "send failed");
                self.reconcile(&recipient_id, &message_id, DeliveryState::Failed)
                    .await;
                SendOutcome::Failed { message_id, error }
            }
        }
    }

    /// Flip one message's delivery state, leaving everything else alone.
    /// Only a `Pending` message transitions; the flip happens at most once.
    async fn reconcile(&self, recipient: &RecipientId, id: &MessageId, to: DeliveryState) {
        let mut st = self.state.lock().await;
        if let Some(msg) = st
            .messages
            .get_mut(recipient)
            .and_then(|log| log.iter_mut().find(|m| &m.id == id))
        {
            if msg.delivery == DeliveryState::Pending {
                msg.delivery = to;
            }
        }
        self.persist(&st);
    }

    fn next_message_id(&self) -> MessageId {
        // Timestamp-ordered like the original ids, with a sequence suffix so
        // two sends in the same millisecond stay unique.
        let seq = self.msg_seq.fetch_add(1, Ordering::Relaxed);
        MessageId(format!("{}-{seq}", Utc::now().timestamp_millis()))
    }

    /// Persistence is fire-and-forget: a failed write is logged and the
    /// session stays interactive.
    fn persist(&self, state: &AppState) {
        if let Err(e) = self.store.save(state) {
            warn!(error = %e, "failed to persist state");
        }
    }
}
