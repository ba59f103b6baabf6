use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use crate::app::App;
use crate::keymap::Action;
use crate::tui::AppEvent;

const MOUSE_SCROLL_LINES: u16 = 3;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Paste(text) => handle_paste(app, &text),
        AppEvent::Resize => {}
        AppEvent::Tick => app.tick().await,
    }
    // A reply may have landed while we were handling input
    app.poll_pending().await;
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    if let Some(action) = app.keymap.resolve(&key) {
        perform(app, action);
        return;
    }

    let input = app.controller.input_mut();
    match key.code {
        KeyCode::Char(c) if !key.modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            input.insert(c);
        }
        KeyCode::Backspace => input.backspace(),
        KeyCode::Delete => input.delete(),
        KeyCode::Left => input.move_left(),
        KeyCode::Right => input.move_right(),
        KeyCode::Home => input.move_home(),
        KeyCode::End => input.move_end(),
        _ => return,
    }
    app.controller.update_counter();
}

fn perform(app: &mut App, action: Action) {
    match action {
        Action::Submit => app.submit(),
        Action::Newline => {
            app.controller.input_mut().insert('\n');
            app.controller.update_counter();
        }
        Action::ToggleTheme => app.toggle_theme(),
        Action::ScrollUp => {
            let page = app.page();
            app.scroll_up(page);
        }
        Action::ScrollDown => {
            let page = app.page();
            app.scroll_down(page);
        }
        Action::ExportHtml => app.export_transcript(),
        Action::Quit => app.should_quit = true,
    }
}

fn handle_paste(app: &mut App, text: &str) {
    let input = app.controller.input_mut();
    for c in text.chars().filter(|c| *c != '\r') {
        input.insert(c);
    }
    app.controller.update_counter();
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_chat = app
        .chat_area
        .map(|r| point_in_rect(mouse.column, mouse.row, r))
        .unwrap_or(false);
    if !in_chat {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_down(MOUSE_SCROLL_LINES),
        MouseEventKind::ScrollUp => app.scroll_up(MOUSE_SCROLL_LINES),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientError, CompletionBackend};
    use crate::controller::ChatController;
    use crate::keymap::Keymap;
    use crate::session::Message;
    use crate::theme::{MemoryThemeStore, Theme};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct Echo;

    #[async_trait]
    impl CompletionBackend for Echo {
        async fn complete(&self, messages: &[Message]) -> Result<String, ClientError> {
            Ok(messages.last().map(|m| m.content.clone()).unwrap_or_default())
        }
    }

    fn app(limit: usize) -> App {
        let controller = ChatController::new(Arc::new(Echo), Box::new(MemoryThemeStore::new()), limit);
        App::new(controller, Keymap::default())
    }

    fn press(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    async fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_event(app, press(KeyCode::Char(c))).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_typing_is_truncated_to_limit() {
        let mut app = app(5);
        type_text(&mut app, "abcdefgh").await;
        assert_eq!(app.controller.input().text(), "abcde");
        assert_eq!(app.controller.input().counter(), "5 / 5");
    }

    #[tokio::test]
    async fn test_enter_submits_and_reply_arrives() {
        let mut app = app(350);
        type_text(&mut app, "Halo").await;
        handle_event(&mut app, press(KeyCode::Enter)).await.unwrap();
        assert!(app.controller.is_loading());

        for _ in 0..100 {
            if !app.has_pending() {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            handle_event(&mut app, AppEvent::Tick).await.unwrap();
        }

        assert!(!app.controller.is_loading());
        assert_eq!(app.controller.messages().last().unwrap().content, "Halo");
    }

    #[tokio::test]
    async fn test_ctrl_t_toggles_theme() {
        let mut app = app(350);
        let key = KeyEvent::new(KeyCode::Char('t'), KeyModifiers::CONTROL);
        handle_event(&mut app, AppEvent::Key(key)).await.unwrap();
        assert_eq!(app.controller.theme(), Theme::Light);
        assert_eq!(app.controller.input().text(), "");
    }

    #[tokio::test]
    async fn test_paste_and_newline() {
        let mut app = app(350);
        handle_event(&mut app, AppEvent::Paste("a\r\nb".to_string())).await.unwrap();
        let alt_enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT);
        handle_event(&mut app, AppEvent::Key(alt_enter)).await.unwrap();
        assert_eq!(app.controller.input().text(), "a\nb\n");
    }

    #[tokio::test]
    async fn test_esc_quits() {
        let mut app = app(350);
        handle_event(&mut app, press(KeyCode::Esc)).await.unwrap();
        assert!(app.should_quit);
    }
}
