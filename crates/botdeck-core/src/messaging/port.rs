use async_trait::async_trait;

use crate::{
    domain::{BotIdentity, MessageEcho, RecipientId},
    Result,
};

/// Port over the remote bot-messaging API.
///
/// Exactly two operations, each a single round trip with no retry; a caller
/// that wants another attempt issues another call. Implementations map remote
/// failures into the core error taxonomy:
/// - `get_me`: `Error::InvalidCredentials` for an empty token or a not-ok
///   response;
/// - `send_message`: `Error::NotConfigured` for an empty token,
///   `Error::ChatNotFound` when the remote description says the chat does not
///   exist (the recipient never messaged the bot), `Error::Remote` otherwise.
#[async_trait]
pub trait TelegramPort: Send + Sync {
    async fn get_me(&self, token: &str) -> Result<BotIdentity>;

    async fn send_message(
        &self,
        token: &str,
        chat_id: &RecipientId,
        text: &str,
    ) -> Result<MessageEcho>;
}
