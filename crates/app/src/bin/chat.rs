// Relaychat - Terminal Chat Client
//
// Reads prompts from stdin and prints the conversation as it changes.
// `/retry` resends the most recent failed reply, `/quit` exits.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tracing::info;

use relaychat_conversations::{
    ChatSession, HttpRelayClient, Message, MessageStatus, RelayConfig, SessionError,
};

fn render(message: &Message) -> String {
    match message.status {
        None => format!("[{}] you: {}", message.id, message.text),
        Some(MessageStatus::Pending | MessageStatus::Done) => {
            format!("[{}] bot: {}", message.id, message.text)
        }
        Some(MessageStatus::Error) => {
            format!("[{}] bot: {}  (type /retry)", message.id, message.text)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = RelayConfig::from_env();
    info!(relay = %config.base_url, "Starting chat session");

    let session = ChatSession::new(Arc::new(HttpRelayClient::new(config)));

    let mut updates = session.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match updates.recv().await {
                Ok(message) => println!("{}", render(&message)),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Display fell behind");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "/quit" => break,
            "/retry" => match session.latest_failed().await {
                Some(failed) => {
                    if let Err(e) = session.retry(failed.id).await {
                        eprintln!("retry failed: {}", e);
                    }
                }
                None => eprintln!("nothing to retry"),
            },
            _ => match session.submit(&line).await {
                Ok(_) | Err(SessionError::EmptyPrompt) => {}
                Err(SessionError::Busy) => eprintln!("still waiting for the last reply"),
                Err(e) => eprintln!("send failed: {}", e),
            },
        }
    }

    drop(session);
    printer.abort();
    Ok(())
}
