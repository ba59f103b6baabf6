//! Markdown-lite formatting for assistant replies.
//!
//! Only three constructs are recognised: `**bold**` spans, lines starting with
//! `-` or `*` followed by whitespace (rendered as bullets), and newlines.

use std::sync::OnceLock;

use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use regex::Regex;

pub const BULLET: &str = "• ";

fn bold_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\*\*(.+?)\*\*").expect("valid bold pattern"))
}

fn bullet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?m)^[ \t]*[-*][ \t]+").expect("valid bullet pattern"))
}

/// Escape the characters that would otherwise be read as markup.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

/// Convert reply text to an HTML fragment: escape, bold, bullets, newlines,
/// in that order.
pub fn format_content(text: &str) -> String {
    let escaped = escape_html(text);
    let bolded = bold_re().replace_all(&escaped, "<strong>$1</strong>");
    let bulleted = bullet_re().replace_all(&bolded, BULLET);
    bulleted.replace('\n', "<br>")
}

/// Terminal counterpart of [`format_content`]: one styled line per source line.
/// Markup characters are kept literally since the terminal never interprets them.
pub fn styled_lines(text: &str, base: Style) -> Vec<Line<'static>> {
    text.split('\n')
        .map(|line| styled_line(line, base))
        .collect()
}

fn styled_line(line: &str, base: Style) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();

    let rest = match bullet_re().find(line) {
        Some(m) => {
            spans.push(Span::styled(BULLET, base));
            &line[m.end()..]
        }
        None => line,
    };

    let bold = base.add_modifier(Modifier::BOLD);
    let mut last = 0;
    for caps in bold_re().captures_iter(rest) {
        let (Some(whole), Some(inner)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        if whole.start() > last {
            spans.push(Span::styled(rest[last..whole.start()].to_string(), base));
        }
        spans.push(Span::styled(inner.as_str().to_string(), bold));
        last = whole.end();
    }
    if last < rest.len() {
        spans.push(Span::styled(rest[last..].to_string(), base));
    }

    if spans.is_empty() {
        Line::default()
    } else {
        Line::from(spans)
    }
}
