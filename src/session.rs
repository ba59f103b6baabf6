//! Conversation state shared by the TUI and the one-shot CLI.
//!
//! The transcript always starts with a greeting that is shown to the user but
//! never sent back to the server. Everything after it is append-only.

use serde::{Deserialize, Serialize};

/// Greeting seeded as the first assistant turn of every session.
pub const GREETING: &str =
    "Halo! Saya CCCC.AI, asisten virtual CC Cup. Ada yang bisa saya bantu?";

/// Shown instead of a reply when the exchange fails for any reason.
pub const ERROR_REPLY: &str =
    "Maaf, terjadi kesalahan saat menghubungi server. Silakan coba lagi.";

/// Shown when the server answered but carried no usable content.
pub const EMPTY_REPLY: &str = "Maaf, respons kosong dari model.";

/// Transient indicator rendered while a request is outstanding.
pub const TYPING_INDICATOR: &str = "CCCC.AI sedang mengetik…";

/// Number of most recent turns sent to the server as context.
pub const CONTEXT_WINDOW: usize = 12;

/// A chat message in the conversation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

/// The role of a chat message sender
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionState {
    messages: Vec<Message>,
    loading: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self {
            messages: vec![Message::assistant(GREETING)],
            loading: false,
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Mark a request as outstanding. Returns false if one already is.
    pub fn start_loading(&mut self) -> bool {
        if self.loading {
            return false;
        }
        self.loading = true;
        true
    }

    pub fn finish_loading(&mut self) {
        self.loading = false;
    }

    /// The turns sent to the server: greeting excluded, last
    /// [`CONTEXT_WINDOW`] entries at most, oldest first.
    pub fn context_window(&self) -> Vec<Message> {
        let history = &self.messages[1..];
        let start = history.len().saturating_sub(CONTEXT_WINDOW);
        history[start..].to_vec()
    }
}
