use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};
use crate::app::{App, APP_TITLE};
use crate::format::styled_lines;
use crate::keymap::{Action, Keymap};
use crate::session::{Role, SessionState, TYPING_INDICATOR};
use crate::theme::Palette;

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let palette = app.controller.theme().palette();

    frame.render_widget(
        Block::default().style(Style::default().bg(palette.background).fg(palette.foreground)),
        area,
    );

    let input_inner_width = area.width.saturating_sub(2);
    let input_rows = app.controller.input().rows(input_inner_width);

    // Header, chat, input (grows with content), footer
    let [header_area, chat_area, input_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(input_rows + 2),
        Constraint::Length(1),
    ])
    .areas(area);

    render_header(app, frame, header_area, &palette);
    render_chat(app, frame, chat_area, &palette);
    render_input(app, frame, input_area, &palette);
    render_footer(app, frame, footer_area, &palette);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let title = Line::from(vec![
        Span::styled(format!(" {} ", APP_TITLE), Style::default().fg(palette.accent).bold()),
        Span::styled(
            format!("[{}]", app.controller.theme().as_str()),
            Style::default().fg(palette.foreground),
        ),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(palette.muted),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(palette.header_bg));
    frame.render_widget(header, area);
}

/// Transcript as styled lines: one bubble per message, plus the typing
/// indicator while a request is outstanding.
pub fn transcript_lines(
    session: &SessionState,
    palette: &Palette,
    animation_frame: u8,
) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();
    let body = Style::default().fg(palette.foreground);

    for msg in session.messages() {
        match msg.role {
            Role::User => {
                lines.push(Line::from(Span::styled(
                    "Anda:",
                    Style::default().fg(palette.user_bubble).add_modifier(Modifier::BOLD),
                )));
                // User text is shown verbatim
                for line in msg.content.split('\n') {
                    lines.push(Line::from(Span::styled(line.to_string(), body)));
                }
            }
            Role::Assistant => {
                lines.push(Line::from(Span::styled(
                    format!("{}:", APP_TITLE),
                    Style::default().fg(palette.assistant_bubble).add_modifier(Modifier::BOLD),
                )));
                lines.extend(styled_lines(&msg.content, body));
            }
        }
        lines.push(Line::default());
    }

    if session.is_loading() {
        // Animated ellipsis on top of the fixed indicator text
        let dots = ".".repeat(animation_frame as usize);
        lines.push(Line::from(Span::styled(
            format!("{}{}", TYPING_INDICATOR, dots),
            Style::default().fg(palette.muted).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

/// Rows the paragraph occupies once word-wrapped at `width` columns.
fn wrapped_height(paragraph: &Paragraph, width: u16) -> u16 {
    paragraph.line_count(width.max(1)).min(u16::MAX as usize) as u16
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect, palette: &Palette) {
    app.chat_area = Some(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(palette.muted))
        .title(" Percakapan ");

    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2);

    let lines = transcript_lines(app.controller.session(), palette, app.animation_frame);
    let chat = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });
    let total = wrapped_height(&chat, inner_width);
    app.sync_scroll(total, inner_height);

    let chat = chat.block(block).scroll((app.chat_scroll, 0));
    frame.render_widget(chat, area);

    if total > inner_height {
        let mut state = ScrollbarState::new(total.saturating_sub(inner_height) as usize)
            .position(app.chat_scroll as usize);
        frame.render_stateful_widget(
            Scrollbar::new(ScrollbarOrientation::VerticalRight),
            area,
            &mut state,
        );
    }
}

fn render_input(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let input = app.controller.input();
    let border_color = if app.controller.is_loading() {
        palette.muted
    } else {
        palette.accent
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Tulis pesan ")
        .title_bottom(Line::from(format!(" {} ", input.counter())).right_aligned());

    let inner_width = area.width.saturating_sub(2);
    let inner_height = area.height.saturating_sub(2).max(1);

    // Keep the cursor row visible once the box stops growing
    let (cursor_x, cursor_y) = input.cursor_position(inner_width);
    let scroll = cursor_y.saturating_sub(inner_height - 1);

    // Drawn from the same rows the cursor is placed on, so no Wrap here
    let rows: Vec<Line> = input
        .display_rows(inner_width)
        .into_iter()
        .map(Line::from)
        .collect();
    let paragraph = Paragraph::new(Text::from(rows))
        .style(Style::default().fg(palette.user_bubble))
        .block(block)
        .scroll((scroll, 0));
    frame.render_widget(paragraph, area);

    frame.set_cursor_position((area.x + 1 + cursor_x, area.y + 1 + cursor_y - scroll));
}

fn footer_hints(keymap: &Keymap) -> String {
    [
        (Action::Submit, "kirim"),
        (Action::Newline, "baris baru"),
        (Action::ToggleTheme, "tema"),
        (Action::ExportHtml, "simpan"),
        (Action::Quit, "keluar"),
    ]
    .iter()
    .filter_map(|(action, label)| keymap.hint(*action).map(|key| format!("{} {}", key, label)))
    .collect::<Vec<_>>()
    .join(" · ")
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect, palette: &Palette) {
    let text = match &app.status {
        Some(status) => status.clone(),
        None => footer_hints(&app.keymap),
    };
    let footer = Paragraph::new(Line::from(Span::styled(
        format!(" {}", text),
        Style::default().fg(palette.muted),
    )));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ClientError, CompletionBackend};
    use crate::controller::ChatController;
    use crate::session::{Message, GREETING};
    use crate::theme::{MemoryThemeStore, Theme};
    use async_trait::async_trait;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_transcript_lines_idle() {
        let mut session = SessionState::new();
        session.push(Message::user("Hello"));
        session.push(Message::assistant("- **a**\n- b"));

        let lines = transcript_lines(&session, &Theme::Dark.palette(), 0);
        let rendered: Vec<String> = lines.iter().map(text_of).collect();

        assert_eq!(
            rendered,
            vec![
                "CCCC.AI:", GREETING, "",
                "Anda:", "Hello", "",
                "CCCC.AI:", "• a", "• b", "",
            ]
        );
    }

    #[test]
    fn test_transcript_lines_loading_indicator() {
        let mut session = SessionState::new();
        session.push(Message::user("Hello"));
        session.start_loading();

        let lines = transcript_lines(&session, &Theme::Light.palette(), 2);
        assert_eq!(text_of(lines.last().unwrap()), format!("{}..", TYPING_INDICATOR));

        session.finish_loading();
        let lines = transcript_lines(&session, &Theme::Light.palette(), 2);
        assert!(!lines.iter().any(|l| text_of(l).starts_with(TYPING_INDICATOR)));
    }

    #[test]
    fn test_wrapped_height_counts_word_wraps() {
        let lines = vec![Line::from("x".repeat(25)), Line::default(), Line::from("abc")];
        let paragraph = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });
        assert_eq!(wrapped_height(&paragraph, 10), 5);

        // Two 11-letter words never share a 20-column row
        let words = Paragraph::new("aaaaaaaaaaa bbbbbbbbbbb ccccccccccc").wrap(Wrap { trim: false });
        assert_eq!(wrapped_height(&words, 20), 3);
    }

    #[test]
    fn test_wrapped_height_uses_display_width() {
        let paragraph = Paragraph::new("日本語日本語").wrap(Wrap { trim: false });
        assert_eq!(wrapped_height(&paragraph, 6), 2);
    }

    struct SilentBackend;

    #[async_trait]
    impl CompletionBackend for SilentBackend {
        async fn complete(&self, _messages: &[Message]) -> Result<String, ClientError> {
            Ok(String::new())
        }
    }

    fn screen_rows(terminal: &Terminal<TestBackend>) -> Vec<String> {
        let buffer = terminal.backend().buffer();
        buffer
            .content
            .chunks(buffer.area.width as usize)
            .map(|row| row.iter().map(|cell| cell.symbol()).collect())
            .collect()
    }

    #[test]
    fn test_render_follows_word_wrapped_transcript() {
        let controller = ChatController::new(
            Arc::new(SilentBackend),
            Box::new(MemoryThemeStore::new()),
            350,
        );
        let mut app = App::new(controller, Keymap::default());
        let prose = "aaaaaaaaaaa bbbbbbbbbbb ccccccccccc ddddddddddd eeeeeeeeeee fffffffffff";
        for _ in 0..4 {
            assert!(app.controller.begin_submit(prose).is_some());
            app.controller.settle(Ok(prose.to_string()));
        }
        assert!(app.controller.begin_submit("last").is_some());

        let mut terminal = Terminal::new(TestBackend::new(22, 16)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        let rows = screen_rows(&terminal);
        let screen = rows.join("\n");
        assert!(screen.contains("last"), "newest message hidden:\n{}", screen);
        assert!(screen.contains("mengetik"), "typing indicator hidden:\n{}", screen);
    }

    #[test]
    fn test_render_input_cursor_on_wrapped_row() {
        let controller = ChatController::new(
            Arc::new(SilentBackend),
            Box::new(MemoryThemeStore::new()),
            350,
        );
        let mut app = App::new(controller, Keymap::default());
        app.controller.input_mut().set_text("halo apa kabar semua");

        let mut terminal = Terminal::new(TestBackend::new(12, 16)).unwrap();
        terminal.draw(|frame| render(&mut app, frame)).unwrap();

        // Inner width 10: "halo apa k" / "abar semua" / ""
        let rows = screen_rows(&terminal);
        assert!(rows.iter().any(|row| row.contains("halo apa k")));
        assert!(rows.iter().any(|row| row.contains("abar semua")));
        let cursor = terminal.get_cursor_position().unwrap();
        assert_eq!(cursor.x, 1);
    }

    #[test]
    fn test_footer_hints_follow_keymap() {
        let hints = footer_hints(&Keymap::default());
        assert!(hints.starts_with("Enter kirim"));
        assert!(hints.contains("Ctrl+T tema"));
    }
}
