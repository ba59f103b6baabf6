//! The chat session controller.
//!
//! Owns the transcript, the input box and the theme, and performs one
//! completion exchange per accepted submit. Rendering is left to callers: any
//! change to the transcript bumps [`ChatController::revision`] so a view can
//! tell when to redraw and scroll to the bottom.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::client::{ClientError, CompletionBackend};
use crate::input::InputBox;
use crate::session::{Message, SessionState, ERROR_REPLY};
use crate::theme::{Theme, ThemeStore};

pub struct ChatController {
    session: SessionState,
    input: InputBox,
    theme: Theme,
    backend: Arc<dyn CompletionBackend>,
    theme_store: Box<dyn ThemeStore>,
    revision: u64,
}

impl ChatController {
    pub fn new(
        backend: Arc<dyn CompletionBackend>,
        theme_store: Box<dyn ThemeStore>,
        input_limit: usize,
    ) -> Self {
        let theme = match theme_store.load() {
            Ok(Some(value)) => Theme::from_str(&value),
            Ok(None) => Theme::default(),
            Err(err) => {
                warn!(error = %err, "could not read theme preference");
                Theme::default()
            }
        };

        Self {
            session: SessionState::new(),
            input: InputBox::new(input_limit),
            theme,
            backend,
            theme_store,
            revision: 0,
        }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn messages(&self) -> &[Message] {
        self.session.messages()
    }

    pub fn is_loading(&self) -> bool {
        self.session.is_loading()
    }

    pub fn input(&self) -> &InputBox {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut InputBox {
        &mut self.input
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn backend(&self) -> Arc<dyn CompletionBackend> {
        Arc::clone(&self.backend)
    }

    /// Synchronous half of a submit. Returns the context to send, or `None`
    /// when the text is blank or a request is already in flight.
    pub fn begin_submit(&mut self, text: &str) -> Option<Vec<Message>> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        if !self.session.start_loading() {
            debug!("submit ignored while a request is outstanding");
            return None;
        }

        self.session.push(Message::user(text));
        self.input.clear();
        self.revision += 1;

        Some(self.session.context_window())
    }

    /// Completion half of a submit: append the reply (or the error notice)
    /// and clear the loading flag.
    pub fn settle(&mut self, result: Result<String, ClientError>) {
        let reply = match result {
            Ok(reply) => reply,
            Err(err) => {
                warn!(error = %err, "completion request failed");
                ERROR_REPLY.to_string()
            }
        };

        self.session.push(Message::assistant(reply));
        self.session.finish_loading();
        self.revision += 1;
    }

    /// Submit `text` and wait for the reply. Returns false if it was ignored.
    pub async fn submit(&mut self, text: &str) -> bool {
        let Some(context) = self.begin_submit(text) else {
            return false;
        };
        let backend = self.backend();
        let result = backend.complete(&context).await;
        self.settle(result);
        true
    }

    /// Truncate the input to its limit and return the counter text.
    pub fn update_counter(&mut self) -> String {
        self.input.update_counter()
    }

    /// Flip the theme and persist it. A failed write keeps the new theme.
    pub fn toggle_theme(&mut self) -> Theme {
        self.theme = self.theme.toggled();
        match self.theme_store.save(self.theme.as_str()) {
            Ok(()) => info!(theme = self.theme.as_str(), "theme changed"),
            Err(err) => warn!(error = %err, "could not persist theme preference"),
        }
        self.theme
    }
}
