//! botdeck: a send-only Telegram chat console.
//!
//! The binary is deliberately thin: it wires config, store, and the Telegram
//! client into the state container, then translates console lines into
//! container operations and renders snapshots back. All state lives in the
//! container.

use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use botdeck_core::{
    config::Config,
    console::{ChatConsole, SendOutcome},
    domain::RecipientId,
    state::{DeliveryState, Message, Recipient},
    store::StateStore,
};
use botdeck_telegram::TelegramClient;

#[tokio::main]
async fn main() -> Result<()> {
    botdeck_core::logging::init("botdeck");

    let cfg = Config::load();
    let api = Arc::new(TelegramClient::new(cfg.api_base.clone(), cfg.http_timeout));
    let console = Arc::new(ChatConsole::new(StateStore::new(&cfg.state_file), api));

    println!("botdeck — type /help for commands");
    print_status(&console).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !dispatch(&console, line).await {
            break;
        }
    }
    Ok(())
}

/// Handle one input line; returns false on /quit.
async fn dispatch(console: &Arc<ChatConsole>, line: &str) -> bool {
    if !line.starts_with('/') {
        spawn_send(console, line.to_string());
        return true;
    }

    let (cmd, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    match cmd {
        "/help" => print_help(),
        "/quit" | "/exit" => return false,
        "/token" => {
            if rest.is_empty() {
                println!("usage: /token <bot-token>");
            } else {
                match console.verify_token(rest).await {
                    Ok(identity) => {
                        println!("connected as @{} ({})", identity.username, identity.first_name)
                    }
                    Err(e) => println!("token rejected: {e}"),
                }
            }
        }
        "/chats" => print_chats(console).await,
        "/open" => {
            let id = RecipientId::new(rest);
            if console.select_recipient(&id).await {
                print_status(console).await;
            } else {
                println!("no chat with id {rest}");
            }
        }
        "/add" => match rest.split_once(char::is_whitespace) {
            Some((id, name)) if !name.trim().is_empty() => {
                console
                    .add_recipient(Recipient {
                        id: RecipientId::new(id),
                        name: name.trim().to_string(),
                        avatar: format!("https://api.dicebear.com/7.x/avataaars/svg?seed={id}"),
                        last_message: None,
                        last_time: None,
                        unread_count: None,
                        pinned: None,
                    })
                    .await;
                print_status(console).await;
            }
            _ => println!("usage: /add <chat-id> <name>"),
        },
        "/remove" => {
            if rest.is_empty() {
                println!("usage: /remove <chat-id>");
            } else {
                console.remove_recipient(&RecipientId::new(rest)).await;
                print_status(console).await;
            }
        }
        "/history" => print_history(console).await,
        other => println!("unknown command {other}; /help lists commands"),
    }
    true
}

/// Each send runs as its own task so slow deliveries never block typing;
/// the container reconciles every in-flight message by id.
fn spawn_send(console: &Arc<ChatConsole>, text: String) {
    let console = console.clone();
    tokio::spawn(async move {
        match console.send_message(&text).await {
            SendOutcome::NoActiveRecipient => {
                println!("no chat open — /open <chat-id> first")
            }
            SendOutcome::Recorded { .. } => {
                println!("recorded (no token configured, staying pending)")
            }
            SendOutcome::Delivered { .. } => println!("delivered"),
            SendOutcome::Failed { error, .. } => println!("send failed: {error}"),
        }
    });
}

async fn print_status(console: &Arc<ChatConsole>) {
    let st = console.snapshot().await;
    match st.active_recipient() {
        Some(r) => println!(
            "[{}] {} — {}",
            r.id,
            r.name,
            if st.config.is_configured() {
                "token configured"
            } else {
                "no token (offline)"
            }
        ),
        None => println!("no chat open"),
    }
}

async fn print_chats(console: &Arc<ChatConsole>) {
    let st = console.snapshot().await;
    if st.recipients.is_empty() {
        println!("no chats — /add <chat-id> <name>");
        return;
    }
    for r in &st.recipients {
        let marker = if st.active_recipient_id.as_ref() == Some(&r.id) {
            '>'
        } else {
            ' '
        };
        let pin = if r.pinned == Some(true) { " *" } else { "" };
        let preview = r.last_message.as_deref().unwrap_or("");
        let when = r.last_time.as_deref().unwrap_or("");
        println!("{marker} {} {}{pin}  {preview} {when}", r.id, r.name);
    }
}

async fn print_history(console: &Arc<ChatConsole>) {
    let st = console.snapshot().await;
    let messages = st.active_messages();
    if messages.is_empty() {
        println!("no messages");
        return;
    }
    for m in messages {
        println!("{} {} {}", m.created_at_label, delivery_mark(m), m.body);
    }
}

fn delivery_mark(m: &Message) -> &'static str {
    match m.delivery {
        DeliveryState::Pending => "…",
        DeliveryState::Delivered => "✓",
        DeliveryState::Read => "✓✓",
        DeliveryState::Failed => "✗",
    }
}

fn print_help() {
    println!("/token <bot-token>     verify and store the bot token");
    println!("/chats                 list chats (> marks the open one)");
    println!("/open <chat-id>        open a chat");
    println!("/add <chat-id> <name>  add a chat and open it");
    println!("/remove <chat-id>      remove a chat (its history is kept)");
    println!("/history               show the open chat's messages");
    println!("/quit                  exit");
    println!("anything else is sent to the open chat");
}
