use std::path::PathBuf;

use ratatui::layout::Rect;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::client::ClientError;
use crate::controller::ChatController;
use crate::export::{write_html, TRANSCRIPT_FILE};
use crate::keymap::Keymap;

pub const APP_TITLE: &str = "CCCC.AI";

type PendingReply = JoinHandle<Result<String, ClientError>>;

pub struct App {
    pub should_quit: bool,
    pub controller: ChatController,
    pub keymap: Keymap,

    // In-flight completion request, settled from the event loop
    pending: Option<PendingReply>,

    // Chat pane scroll state
    pub chat_scroll: u16,
    pub chat_height: u16,
    pub chat_area: Option<Rect>,
    seen_revision: Option<u64>,

    pub animation_frame: u8,
    pub status: Option<String>,
    pub export_path: PathBuf,
}

impl App {
    pub fn new(controller: ChatController, keymap: Keymap) -> Self {
        Self {
            should_quit: false,
            controller,
            keymap,
            pending: None,
            chat_scroll: 0,
            chat_height: 0,
            chat_area: None,
            seen_revision: None,
            animation_frame: 0,
            status: None,
            export_path: PathBuf::from(TRANSCRIPT_FILE),
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Submit the current input. The exchange runs on its own task so the
    /// loop keeps handling keys; [`App::poll_pending`] settles it.
    pub fn submit(&mut self) {
        let text = self.controller.input().text().to_string();
        let Some(context) = self.controller.begin_submit(&text) else {
            return;
        };

        self.status = None;
        let backend = self.controller.backend();
        self.pending = Some(tokio::spawn(async move { backend.complete(&context).await }));
    }

    /// Settle the pending request if its task has finished.
    pub async fn poll_pending(&mut self) {
        let finished = self
            .pending
            .as_ref()
            .map(|handle| handle.is_finished())
            .unwrap_or(false);
        if !finished {
            return;
        }

        if let Some(handle) = self.pending.take() {
            let result = match handle.await {
                Ok(result) => result,
                Err(err) => Err(ClientError::Network(format!("request task failed: {}", err))),
            };
            self.controller.settle(result);
        }
    }

    pub async fn tick(&mut self) {
        if self.controller.is_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
        self.poll_pending().await;
    }

    pub fn toggle_theme(&mut self) {
        let theme = self.controller.toggle_theme();
        self.status = Some(format!("Tema: {}", theme.as_str()));
    }

    pub fn export_transcript(&mut self) {
        let result = write_html(
            &self.export_path,
            APP_TITLE,
            self.controller.messages(),
            self.controller.theme(),
        );
        self.status = Some(match result {
            Ok(()) => {
                info!(path = %self.export_path.display(), "transcript exported");
                format!("Transkrip disimpan ke {}", self.export_path.display())
            }
            Err(err) => {
                warn!(error = %err, "transcript export failed");
                format!("Gagal menyimpan transkrip: {}", err)
            }
        });
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_down(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_add(lines);
    }

    pub fn page(&self) -> u16 {
        (self.chat_height / 2).max(1)
    }

    /// Clamp the scroll offset to the content and jump to the bottom whenever
    /// the transcript changed since the last frame.
    pub fn sync_scroll(&mut self, total_lines: u16, visible: u16) {
        self.chat_height = visible;
        let max_scroll = total_lines.saturating_sub(visible);

        let revision = self.controller.revision();
        if self.seen_revision != Some(revision) {
            self.seen_revision = Some(revision);
            self.chat_scroll = max_scroll;
        }
        self.chat_scroll = self.chat_scroll.min(max_scroll);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::CompletionBackend;
    use crate::session::{Message, ERROR_REPLY};
    use crate::theme::MemoryThemeStore;
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Notify;

    /// Holds its reply until released, so tests can act mid-request.
    struct GatedBackend {
        gate: Notify,
        fail: bool,
    }

    #[async_trait]
    impl CompletionBackend for GatedBackend {
        async fn complete(&self, _messages: &[Message]) -> Result<String, ClientError> {
            self.gate.notified().await;
            if self.fail {
                Err(ClientError::Network("connection reset".to_string()))
            } else {
                Ok("Hi there".to_string())
            }
        }
    }

    fn app_with(backend: Arc<GatedBackend>) -> App {
        let controller = ChatController::new(backend, Box::new(MemoryThemeStore::new()), 350);
        App::new(controller, Keymap::default())
    }

    async fn settle(app: &mut App) {
        for _ in 0..100 {
            app.poll_pending().await;
            if !app.has_pending() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("request never settled");
    }

    #[tokio::test]
    async fn test_app_stays_responsive_while_loading() {
        let backend = Arc::new(GatedBackend { gate: Notify::new(), fail: false });
        let mut app = app_with(backend.clone());

        app.controller.input_mut().set_text("Hello");
        app.submit();
        assert!(app.controller.is_loading());
        assert!(app.controller.input().is_empty());

        // Theme and typing still work; a second submit is rejected
        app.toggle_theme();
        app.controller.input_mut().set_text("again");
        app.submit();
        assert_eq!(app.controller.messages().len(), 2);

        backend.gate.notify_one();
        settle(&mut app).await;

        assert!(!app.controller.is_loading());
        assert_eq!(app.controller.messages().last().unwrap().content, "Hi there");
        assert_eq!(app.controller.input().text(), "again");
    }

    #[tokio::test]
    async fn test_failed_request_settles_with_error() {
        let backend = Arc::new(GatedBackend { gate: Notify::new(), fail: true });
        let mut app = app_with(backend.clone());

        app.controller.input_mut().set_text("Hello");
        app.submit();
        backend.gate.notify_one();
        settle(&mut app).await;

        assert_eq!(app.controller.messages().len(), 3);
        assert_eq!(app.controller.messages()[2].content, ERROR_REPLY);
    }

    #[tokio::test]
    async fn test_sync_scroll_follows_new_messages() {
        let backend = Arc::new(GatedBackend { gate: Notify::new(), fail: false });
        let mut app = app_with(backend);

        app.sync_scroll(50, 10);
        assert_eq!(app.chat_scroll, 40);

        app.scroll_up(15);
        app.sync_scroll(50, 10);
        assert_eq!(app.chat_scroll, 25);

        app.scroll_down(100);
        app.sync_scroll(50, 10);
        assert_eq!(app.chat_scroll, 40);

        app.scroll_up(20);
        app.controller.input_mut().set_text("Hello");
        app.submit();
        app.sync_scroll(55, 10);
        assert_eq!(app.chat_scroll, 45);
    }

    #[tokio::test]
    async fn test_export_writes_file() {
        let backend = Arc::new(GatedBackend { gate: Notify::new(), fail: false });
        let mut app = app_with(backend);
        let dir = tempfile::tempdir().unwrap();
        app.export_path = dir.path().join("t.html");

        app.export_transcript();

        assert!(app.export_path.exists());
        assert!(app.status.as_deref().unwrap_or("").starts_with("Transkrip disimpan"));
    }
}
