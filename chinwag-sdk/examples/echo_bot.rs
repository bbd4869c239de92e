//! Echo bot example — logs every event and repeats public messages back.
//!
//! Usage:
//!   cargo run --example echo_bot -- --host chat.example.net --port 1300 \
//!     --username echobot

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use chinwag_sdk::{ChatClient, ChatObserver, TextMessage};

#[derive(Parser)]
#[command(name = "echo-bot", about = "Chinwag echo bot example")]
struct Args {
    #[arg(long, default_value = "127.0.0.1")]
    host: String,
    #[arg(long, default_value_t = 1300)]
    port: u16,
    #[arg(long, default_value = "echobot")]
    username: String,
}

struct EchoObserver {
    client: ChatClient,
    username: String,
}

impl ChatObserver for EchoObserver {
    fn on_login_result(&self, success: bool, message: &str) {
        tracing::info!(success, message, "login result");
    }

    fn on_message_received(&self, message: &TextMessage) {
        tracing::info!(
            sender = %message.sender,
            private = message.private,
            text = %message.text,
            "message"
        );
        if message.private || message.sender == self.username {
            return;
        }
        // Callbacks run on the reader task — hand the reply to its own task.
        let client = self.client.clone();
        let reply = format!("{} said: {}", message.sender, message.text);
        tokio::spawn(async move {
            if !client.send_public_message(&reply).await {
                tracing::warn!(error = %client.get_last_error(), "echo failed");
            }
        });
    }

    fn on_user_list(&self, users: &[String]) {
        tracing::info!(count = users.len(), ?users, "user roster");
    }

    fn on_message_error(&self, message: &str) {
        tracing::warn!(message, "message rejected");
    }

    fn on_command_error(&self, message: &str) {
        tracing::warn!(message, "command rejected");
    }

    fn on_supported_commands(&self, commands: &[String]) {
        tracing::info!(?commands, "server capabilities");
    }

    fn on_disconnect(&self) {
        tracing::info!("disconnected from server");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let args = Args::parse();

    let client = ChatClient::new();
    client.add_observer(Arc::new(EchoObserver {
        client: client.clone(),
        username: args.username.clone(),
    }));

    if !client.connect(&args.host, args.port).await {
        anyhow::bail!("connect failed: {}", client.get_last_error());
    }
    client.login(&args.username).await;
    client.ask_supported_commands().await;
    client.refresh_user_list().await;

    tokio::signal::ctrl_c().await?;
    client.disconnect().await;
    Ok(())
}
