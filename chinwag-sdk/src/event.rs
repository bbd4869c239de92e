//! Events parsed from server lines, and the observer interface that
//! receives them.

/// A chat message received from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextMessage {
    /// Username of the sender.
    pub sender: String,
    /// True when the message was addressed to this client alone.
    pub private: bool,
    /// Message body. May contain spaces; never split by the parser.
    pub text: String,
}

/// One parsed server event.
///
/// Built by the reader task (or by the teardown path, for
/// [`Event::Disconnected`]), delivered synchronously to every registered
/// observer, then dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Login accepted or rejected. `message` is the server's optional
    /// explanation ("" when absent).
    LoginResult { success: bool, message: String },
    /// Current user roster, in server order.
    UserList { users: Vec<String> },
    /// A public or private chat message.
    Message(TextMessage),
    /// Our last message was not delivered.
    MessageError { message: String },
    /// The server did not understand a command we sent.
    CommandError { message: String },
    /// Command verbs the server supports.
    SupportedCommands { commands: Vec<String> },
    /// The connection was closed, by either side. Fired exactly once per
    /// session.
    Disconnected,
}

/// Callback interface for chat events.
///
/// Every method has an empty default body, so implementors override only
/// the events they care about. Callbacks run synchronously on the reader
/// task: return quickly, and hand anything slow to another task. A
/// callback that panics takes the read loop down with it.
pub trait ChatObserver: Send + Sync {
    /// Login accepted (`success` true) or rejected.
    fn on_login_result(&self, _success: bool, _message: &str) {}

    /// The connection closed. Delivered once per session, whether the
    /// close was requested locally or the server went away.
    fn on_disconnect(&self) {}

    /// Fresh user roster, replacing any previously delivered list.
    fn on_user_list(&self, _users: &[String]) {}

    /// A public or private message arrived.
    fn on_message_received(&self, _message: &TextMessage) {}

    /// Our last message could not be delivered.
    fn on_message_error(&self, _message: &str) {}

    /// The server rejected a command as invalid or unknown.
    fn on_command_error(&self, _message: &str) {}

    /// The server's supported command verbs, in response to a help request.
    fn on_supported_commands(&self, _commands: &[String]) {}
}
