//! Client SDK for chinwag chat servers.
//!
//! The chinwag protocol is line-oriented text over TCP: every command and
//! every server response is one newline-terminated line, fields separated
//! by spaces, the last field free-form. This crate manages a single
//! connection: [`ChatClient`] writes command lines on the caller's task and
//! runs a background reader that parses server lines into typed events and
//! fans them out to registered [`ChatObserver`]s.
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use chinwag_sdk::{ChatClient, ChatObserver};
//!
//! struct Printer;
//! impl ChatObserver for Printer {
//!     fn on_login_result(&self, success: bool, message: &str) {
//!         println!("login: {success} ({message})");
//!     }
//! }
//!
//! # async fn example() {
//! let client = ChatClient::new();
//! client.add_observer(Arc::new(Printer));
//! if client.connect("chat.example.net", 1300).await {
//!     client.login("alice").await;
//!     client.start_listening();
//! }
//! # }
//! ```
//!
//! The SDK does not reconnect on its own. Consumers should watch for
//! [`ChatObserver::on_disconnect`] and call [`ChatClient::connect`] again
//! (followed by [`ChatClient::start_listening`]) if they want a new session.

pub mod client;
pub mod error;
pub mod event;
pub mod proto;

pub use client::ChatClient;
pub use error::ClientError;
pub use event::{ChatObserver, Event, TextMessage};
pub use proto::Command;
