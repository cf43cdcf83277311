//! Telegram Bot API adapter (reqwest).
//!
//! Implements the `botdeck-core` TelegramPort over the two raw HTTP calls the
//! console needs: `getMe` and `sendMessage`. No retry, no backoff; a failure
//! is reported once and immediately.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use botdeck_core::{
    domain::{BotIdentity, MessageEcho, RecipientId},
    errors::Error,
    messaging::port::TelegramPort,
    Result,
};

/// Every Bot API response uses the same envelope; the adapter depends on
/// nothing beyond this shape.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiEnvelope<T> {
    pub ok: bool,
    #[serde(default)]
    pub result: Option<T>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Clone, Debug)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("reqwest client build");
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    fn method_url(&self, token: &str, method: &str) -> String {
        format!("{}/bot{token}/{method}", self.base_url.trim_end_matches('/'))
    }

    fn map_transport(e: reqwest::Error) -> Error {
        Error::Remote(format!("request error: {e}"))
    }
}

/// `getMe` envelope -> identity, or `InvalidCredentials` with the remote
/// description.
fn interpret_get_me(envelope: ApiEnvelope<BotIdentity>) -> Result<BotIdentity> {
    if !envelope.ok {
        return Err(Error::InvalidCredentials(
            envelope
                .description
                .unwrap_or_else(|| "invalid token".to_string()),
        ));
    }
    envelope
        .result
        .ok_or_else(|| Error::Remote("getMe returned ok with no result".to_string()))
}

/// `sendMessage` envelope -> echo. A "chat not found" description gets its
/// own error so the operator sees why (the recipient never started a chat
/// with the bot) instead of a bare Bad Request.
fn interpret_send(envelope: ApiEnvelope<MessageEcho>) -> Result<MessageEcho> {
    if !envelope.ok {
        let description = envelope
            .description
            .unwrap_or_else(|| "failed to send message".to_string());
        if description.to_lowercase().contains("chat not found") {
            return Err(Error::ChatNotFound);
        }
        return Err(Error::Remote(description));
    }
    envelope
        .result
        .ok_or_else(|| Error::Remote("sendMessage returned ok with no result".to_string()))
}

#[async_trait]
impl TelegramPort for TelegramClient {
    async fn get_me(&self, token: &str) -> Result<BotIdentity> {
        if token.is_empty() {
            return Err(Error::InvalidCredentials("token is required".to_string()));
        }
        debug!("verifying bot token via getMe");
        let envelope = self
            .http
            .get(self.method_url(token, "getMe"))
            .send()
            .await
            .map_err(Self::map_transport)?
            .json::<ApiEnvelope<BotIdentity>>()
            .await
            .map_err(Self::map_transport)?;
        interpret_get_me(envelope)
    }

    async fn send_message(
        &self,
        token: &str,
        chat_id: &RecipientId,
        text: &str,
    ) -> Result<MessageEcho> {
        if token.is_empty() {
            return Err(Error::NotConfigured);
        }
        debug!(chat_id = %chat_id, "sending message");
        let envelope = self
            .http
            .post(self.method_url(token, "sendMessage"))
            .json(&json!({ "chat_id": chat_id.as_str(), "text": text }))
            .send()
            .await
            .map_err(Self::map_transport)?
            .json::<ApiEnvelope<MessageEcho>>()
            .await
            .map_err(Self::map_transport)?;
        interpret_send(envelope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn send_envelope(body: &str) -> ApiEnvelope<MessageEcho> {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn method_url_embeds_the_token_in_the_path() {
        let client = TelegramClient::new("https://api.telegram.org/", Duration::from_secs(10));
        assert_eq!(
            client.method_url("123:abc", "getMe"),
            "https://api.telegram.org/bot123:abc/getMe"
        );
    }

    #[test]
    fn ok_send_yields_the_echo() {
        let echo = interpret_send(send_envelope(
            r#"{"ok":true,"result":{"message_id":99,"chat":{"id":1}}}"#,
        ))
        .unwrap();
        assert_eq!(echo.message_id, 99);
    }

    #[test]
    fn chat_not_found_description_maps_to_its_own_error() {
        let err = interpret_send(send_envelope(
            r#"{"ok":false,"description":"Bad Request: chat not found"}"#,
        ))
        .unwrap_err();
        assert!(matches!(err, Error::ChatNotFound));
    }

    #[test]
    fn other_failures_carry_the_remote_description() {
        let err = interpret_send(send_envelope(
            r#"{"ok":false,"description":"Forbidden: bot was blocked by the user"}"#,
        ))
        .unwrap_err();
        match err {
            Error::Remote(d) => assert!(d.contains("blocked")),
            other => panic!("expected Remote, got {other:?}"),
        }
    }

    #[test]
    fn not_ok_get_me_is_invalid_credentials() {
        let envelope: ApiEnvelope<BotIdentity> =
            serde_json::from_str(r#"{"ok":false,"description":"Unauthorized"}"#).unwrap();
        let err = interpret_get_me(envelope).unwrap_err();
        match err {
            Error::InvalidCredentials(d) => assert_eq!(d, "Unauthorized"),
            other => panic!("expected InvalidCredentials, got {other:?}"),
        }
    }

    #[test]
    fn ok_get_me_without_result_is_a_remote_error() {
        let envelope: ApiEnvelope<BotIdentity> =
            serde_json::from_str(r#"{"ok":true}"#).unwrap();
        assert!(matches!(
            interpret_get_me(envelope).unwrap_err(),
            Error::Remote(_)
        ));
    }
}
