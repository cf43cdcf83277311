/// Core error type.
///
/// The adapter crate maps Telegram API responses into these variants so the
/// console can handle failures consistently (surface to the operator vs mark
/// a message as failed).
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Empty token, or `getMe` reported not-ok.
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),

    /// A send was attempted without a configured bot token.
    #[error("bot token is not configured")]
    NotConfigured,

    /// The recipient has never started a chat with the bot.
    #[error("chat not found: the recipient must start a chat with the bot first")]
    ChatNotFound,

    /// Any other not-ok response or transport failure, carrying the remote
    /// description where one exists.
    #[error("telegram error: {0}")]
    Remote(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
