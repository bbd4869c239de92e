//! Connection lifecycle and the background reader.
//!
//! [`ChatClient`] owns one TCP session at a time. Commands are written on
//! the caller's task, serialized by the session lock; inbound lines are
//! consumed by a single reader task spawned via [`ChatClient::start_listening`]
//! and dispatched to observers as they arrive.
//!
//! Teardown is the one genuinely shared path: a foreground disconnect can
//! race the reader discovering end-of-stream. Both funnel through
//! [`ClientShared::disconnect`], where taking the session out of its slot
//! under the lock makes the close-and-notify sequence run at most once.
//! Dropping the session also drops its close-signal sender, which wakes a
//! reader blocked mid-read so the task winds down without peer action.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::watch;

use crate::error::ClientError;
use crate::event::{ChatObserver, Event};
use crate::proto::{self, Command, Inbound};

/// Client for one chinwag server session.
///
/// Cloning yields another handle to the same session; all clones share
/// connection state and the observer registry.
#[derive(Clone, Default)]
pub struct ChatClient {
    inner: Arc<ClientShared>,
}

/// Write side of an active session.
struct Session {
    writer: OwnedWriteHalf,
    /// Dropped on teardown; the reader selects on the paired receiver so
    /// a read blocked mid-line aborts on local disconnect.
    _closed_tx: watch::Sender<()>,
}

/// Read side of a session, parked between `connect` and `start_listening`.
struct ParkedReader {
    reader: BufReader<OwnedReadHalf>,
    closed: watch::Receiver<()>,
}

/// State shared between caller tasks and the reader task.
#[derive(Default)]
struct ClientShared {
    /// The active session. `Some` iff connected; `Option::take` under
    /// this lock is the single teardown point. Also serializes sends,
    /// so write order is call order.
    session: tokio::sync::Mutex<Option<Session>>,
    /// Parked read half awaiting the listener.
    reader: Mutex<Option<ParkedReader>>,
    /// Mirror of "session is `Some`", readable without the async lock.
    active: AtomicBool,
    /// True while a reader task is running.
    listening: AtomicBool,
    /// Most recent failure description; empty until the first failure.
    last_error: Mutex<String>,
    /// Registered observers, in registration order.
    observers: Mutex<Vec<Arc<dyn ChatObserver>>>,
}

impl ChatClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a TCP connection to `host:port`.
    ///
    /// Returns true on success. On failure nothing is stored, the failure
    /// description is recorded for [`get_last_error`](Self::get_last_error),
    /// and the result is false — an unreachable or empty host is an
    /// ordinary I/O failure, not a distinct error kind. Connecting while a
    /// session is already active fails the same way.
    pub async fn connect(&self, host: &str, port: u16) -> bool {
        match self.try_connect(host, port).await {
            Ok(()) => {
                tracing::info!(host, port, "connected");
                true
            }
            Err(e) => {
                tracing::warn!(host, port, error = %e, "connect failed");
                self.inner.record_error(&e);
                false
            }
        }
    }

    async fn try_connect(&self, host: &str, port: u16) -> Result<(), ClientError> {
        let mut session_slot = self.inner.session.lock().await;
        if session_slot.is_some() {
            return Err(ClientError::AlreadyConnected);
        }
        if host.is_empty() {
            return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty host").into());
        }
        let stream = TcpStream::connect((host, port)).await?;
        let (read_half, write_half) = stream.into_split();
        let (closed_tx, closed_rx) = watch::channel(());
        *self.inner.reader.lock() = Some(ParkedReader {
            reader: BufReader::new(read_half),
            closed: closed_rx,
        });
        *session_slot = Some(Session {
            writer: write_half,
            _closed_tx: closed_tx,
        });
        self.inner.active.store(true, Ordering::SeqCst);
        Ok(())
    }

    /// Close the connection and notify observers.
    ///
    /// Idempotent and safe under concurrent callers: a foreground "hang
    /// up" racing the reader's end-of-stream teardown still closes the
    /// stream once and fires exactly one `on_disconnect`. A no-op when no
    /// session is active.
    pub async fn disconnect(&self) {
        self.inner.disconnect().await;
    }

    /// Whether a session is currently active. A point-in-time snapshot:
    /// the state may change concurrently right after this returns.
    pub fn is_active(&self) -> bool {
        self.inner.active.load(Ordering::SeqCst)
    }

    /// Write one already-terminated protocol line to the server.
    ///
    /// Fire-and-forget: returns once the write completes, without waiting
    /// for any server reply. False (with the error recorded) when the
    /// write fails or no session is active.
    pub async fn send_command(&self, line: &str) -> bool {
        match self.try_send(line).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "send failed");
                self.inner.record_error(&e);
                false
            }
        }
    }

    async fn try_send(&self, line: &str) -> Result<(), ClientError> {
        let mut session_slot = self.inner.session.lock().await;
        let session = session_slot.as_mut().ok_or(ClientError::NotConnected)?;
        session.writer.write_all(line.as_bytes()).await?;
        session.writer.flush().await?;
        Ok(())
    }

    /// Request login under `username`.
    pub async fn login(&self, username: &str) -> bool {
        self.send(Command::Login {
            username: username.to_string(),
        })
        .await
    }

    /// Send a public message to all connected users.
    pub async fn send_public_message(&self, text: &str) -> bool {
        self.send(Command::PublicMessage {
            text: text.to_string(),
        })
        .await
    }

    /// Send a private message to a single recipient.
    pub async fn send_private_message(&self, recipient: &str, text: &str) -> bool {
        self.send(Command::PrivateMessage {
            recipient: recipient.to_string(),
            text: text.to_string(),
        })
        .await
    }

    /// Request a fresh user roster. The roster arrives as an
    /// [`ChatObserver::on_user_list`] notification, so this also makes
    /// sure the listener is running.
    pub async fn refresh_user_list(&self) -> bool {
        let sent = self.send(Command::Users).await;
        self.start_listening();
        sent
    }

    /// Ask which command verbs the server supports.
    pub async fn ask_supported_commands(&self) -> bool {
        self.send(Command::Help).await
    }

    async fn send(&self, command: Command) -> bool {
        self.send_command(&command.to_line()).await
    }

    /// The most recently recorded failure description, or an empty string
    /// if nothing has failed since construction. Overwritten on every
    /// failure; no history.
    pub fn get_last_error(&self) -> String {
        self.inner.last_error.lock().clone()
    }

    /// Spawn the background reader task.
    ///
    /// Idempotent: while a reader is running (or when there is no parked
    /// read half to consume, because no session is active), this is a
    /// no-op — a double start can never put two readers on one stream.
    /// The reader runs until end-of-stream, a read error, or a local
    /// disconnect; listening again after that requires a fresh
    /// [`connect`](Self::connect) followed by another call here.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start_listening(&self) {
        if self.inner.listening.swap(true, Ordering::SeqCst) {
            return;
        }
        let Some(parked) = self.inner.reader.lock().take() else {
            self.inner.listening.store(false, Ordering::SeqCst);
            return;
        };
        let shared = Arc::clone(&self.inner);
        tokio::spawn(async move {
            shared.read_loop(parked.reader, parked.closed).await;
            shared.listening.store(false, Ordering::SeqCst);
        });
    }

    /// Register an observer. Observers are notified in registration
    /// order; registering the same observer (by identity) twice is a
    /// no-op, so no event is ever delivered to it twice.
    pub fn add_observer(&self, observer: Arc<dyn ChatObserver>) {
        let mut observers = self.inner.observers.lock();
        if observers.iter().any(|o| Arc::ptr_eq(o, &observer)) {
            return;
        }
        observers.push(observer);
    }

    /// Unregister an observer previously passed to
    /// [`add_observer`](Self::add_observer). Unknown observers are ignored.
    pub fn remove_observer(&self, observer: &Arc<dyn ChatObserver>) {
        self.inner
            .observers
            .lock()
            .retain(|o| !Arc::ptr_eq(o, observer));
    }
}

impl ClientShared {
    /// Close-and-notify. Exactly one caller takes the session out of its
    /// slot; everyone else sees `None` and returns without side effects.
    async fn disconnect(&self) {
        let mut session_slot = self.session.lock().await;
        let Some(mut session) = session_slot.take() else {
            return;
        };
        self.active.store(false, Ordering::SeqCst);
        // Drop the parked read half, if the listener never claimed it.
        self.reader.lock().take();
        if let Err(e) = session.writer.shutdown().await {
            tracing::debug!(error = %e, "error shutting down stream");
        }
        // Dropping the session drops the close-signal sender, waking a
        // reader blocked mid-read.
        drop(session);
        drop(session_slot);
        tracing::info!("disconnected");
        self.notify(&Event::Disconnected);
    }

    /// Read loop: one line at a time until the session ends.
    ///
    /// End-of-stream or a read error while the session is still active is
    /// a terminal disconnect and goes through the shared teardown. An
    /// error after the session was already closed locally is the expected
    /// teardown race and is suppressed, as is the close signal itself.
    async fn read_loop(
        &self,
        mut reader: BufReader<OwnedReadHalf>,
        mut closed: watch::Receiver<()>,
    ) {
        let mut line = String::new();
        while self.active.load(Ordering::SeqCst) {
            line.clear();
            tokio::select! {
                result = reader.read_line(&mut line) => match result {
                    Ok(0) => {
                        tracing::debug!("server closed the stream");
                        self.disconnect().await;
                        break;
                    }
                    Ok(_) => self.dispatch(&line),
                    Err(e) => {
                        if self.active.load(Ordering::SeqCst) {
                            let error = ClientError::Io(e);
                            tracing::warn!(error = %error, "read failed");
                            self.record_error(&error);
                            self.disconnect().await;
                        }
                        break;
                    }
                },
                _ = closed.changed() => {
                    // Local disconnect while blocked on the read.
                    break;
                }
            }
        }
    }

    fn dispatch(&self, line: &str) {
        match proto::parse_line(line) {
            Inbound::Event(event) => self.notify(&event),
            Inbound::Silent => {}
            Inbound::Unknown => {
                tracing::debug!(line = line.trim_end(), "ignoring unknown server command");
            }
        }
    }

    /// Fan one event out to every observer, synchronously, in
    /// registration order. Iterates a snapshot so observers may
    /// add/remove registrations from inside a callback.
    fn notify(&self, event: &Event) {
        let observers = self.observers.lock().clone();
        for observer in &observers {
            match event {
                Event::LoginResult { success, message } => {
                    observer.on_login_result(*success, message);
                }
                Event::UserList { users } => observer.on_user_list(users),
                Event::Message(message) => observer.on_message_received(message),
                Event::MessageError { message } => observer.on_message_error(message),
                Event::CommandError { message } => observer.on_command_error(message),
                Event::SupportedCommands { commands } => observer.on_supported_commands(commands),
                Event::Disconnected => observer.on_disconnect(),
            }
        }
    }

    fn record_error(&self, error: &impl std::fmt::Display) {
        *self.last_error.lock() = error.to_string();
    }
}
