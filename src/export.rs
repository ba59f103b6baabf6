//! Standalone HTML rendering of a transcript.

use std::fs;
use std::path::Path;

use anyhow::Result;

use crate::format::{escape_html, format_content};
use crate::session::{Message, Role};
use crate::theme::Theme;

/// Default file name used by the TUI export key.
pub const TRANSCRIPT_FILE: &str = "cccc-chat-transcript.html";

const STYLE: &str = "\
*{margin:0;padding:0;box-sizing:border-box}
body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',sans-serif;background:#f5f5f5;color:#222;padding:20px}
body.dark{background:#1e1e1e;color:#ccc}
.messages{max-width:720px;margin:0 auto;display:flex;flex-direction:column;gap:10px}
.msg{max-width:80%;padding:10px 14px;border-radius:12px;font-size:14px;line-height:1.5;word-wrap:break-word}
.msg.user{align-self:flex-end;background:#d8ecff}
.msg.assistant{align-self:flex-start;background:#fff;border:1px solid #ddd}
body.dark .msg.user{background:#2a2d2e;border:1px solid #ff00ff33}
body.dark .msg.assistant{background:#252526;border:1px solid #3c3c3c}";

/// Build the page: one bubble per message, bodies run through
/// [`format_content`].
pub fn export_html(title: &str, messages: &[Message], theme: Theme) -> String {
    let body_class = match theme {
        Theme::Dark => " class=\"dark\"",
        Theme::Light => "",
    };

    let bubbles: String = messages
        .iter()
        .map(|m| {
            let class = match m.role {
                Role::User => "user",
                Role::Assistant => "assistant",
            };
            format!(
                "<div class=\"msg {}\">{}</div>\n",
                class,
                format_content(&m.content)
            )
        })
        .collect();

    format!(
        "<!DOCTYPE html>\n<html lang=\"id\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>\n{STYLE}\n</style>\n</head>\n\
         <body{body_class}>\n<div class=\"messages\">\n{bubbles}</div>\n</body>\n</html>\n",
        title = escape_html(title),
    )
}

pub fn write_html(path: &Path, title: &str, messages: &[Message], theme: Theme) -> Result<()> {
    fs::write(path, export_html(title, messages, theme))?;
    Ok(())
}
