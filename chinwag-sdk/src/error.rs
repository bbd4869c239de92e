//! Failure type behind the client's last-error slot.

use thiserror::Error;

/// Failures surfaced by connection and send operations.
///
/// The public API reports these as `false` returns; the rendered
/// description is retained and readable via
/// [`ChatClient::get_last_error`](crate::ChatClient::get_last_error).
#[derive(Debug, Error)]
pub enum ClientError {
    /// A session is already active; the client manages one connection at a time.
    #[error("already connected")]
    AlreadyConnected,

    /// No session is active.
    #[error("not connected")]
    NotConnected,

    /// The underlying transport failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
