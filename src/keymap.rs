//! Key bindings, registered explicitly and handed to the app at startup.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Submit,
    Newline,
    ToggleTheme,
    ScrollUp,
    ScrollDown,
    ExportHtml,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn matches(&self, key: &KeyEvent) -> bool {
        // Shift is folded into the character itself for printable keys
        let mods = key.modifiers.difference(KeyModifiers::SHIFT);
        self.code == key.code && self.modifiers == mods
    }
}

/// Ordered list of bindings; the first match wins.
#[derive(Debug, Clone)]
pub struct Keymap {
    bindings: Vec<(KeyBinding, Action)>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new()
            .bind(KeyBinding::plain(KeyCode::Enter), Action::Submit)
            .bind(KeyBinding::new(KeyCode::Enter, KeyModifiers::ALT), Action::Newline)
            .bind(KeyBinding::ctrl('t'), Action::ToggleTheme)
            .bind(KeyBinding::ctrl('s'), Action::ExportHtml)
            .bind(KeyBinding::plain(KeyCode::PageUp), Action::ScrollUp)
            .bind(KeyBinding::plain(KeyCode::PageDown), Action::ScrollDown)
            .bind(KeyBinding::ctrl('c'), Action::Quit)
            .bind(KeyBinding::plain(KeyCode::Esc), Action::Quit)
    }
}

impl Keymap {
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
        }
    }

    pub fn bind(mut self, binding: KeyBinding, action: Action) -> Self {
        self.bindings.push((binding, action));
        self
    }

    pub fn resolve(&self, key: &KeyEvent) -> Option<Action> {
        self.bindings
            .iter()
            .find(|(binding, _)| binding.matches(key))
            .map(|(_, action)| *action)
    }

    /// First key bound to `action`, for the footer hints.
    pub fn hint(&self, action: Action) -> Option<String> {
        let (binding, _) = self.bindings.iter().find(|(_, a)| *a == action)?;
        let key = match binding.code {
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::PageUp => "PgUp".to_string(),
            KeyCode::PageDown => "PgDn".to_string(),
            other => format!("{:?}", other),
        };
        let prefix = if binding.modifiers.contains(KeyModifiers::CONTROL) {
            "Ctrl+"
        } else if binding.modifiers.contains(KeyModifiers::ALT) {
            "Alt+"
        } else {
            ""
        };
        Some(format!("{}{}", prefix, key))
    }
}
