//! Single-line text input used by the search bar and wizards.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::render::sgr::faint;

/// Editable line with a char-indexed cursor.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    value: String,
    cursor: usize,
    focused: bool,
    prompt: &'static str,
    placeholder: &'static str,
}

impl TextInput {
    /// Empty, unfocused input.
    pub fn new(prompt: &'static str, placeholder: &'static str) -> Self {
        Self {
            prompt,
            placeholder,
            ..Self::default()
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Replace the text and move the cursor to the end.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.chars().count();
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn blur(&mut self) {
        self.focused = false;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    fn byte_at(&self, cursor: usize) -> usize {
        self.value
            .char_indices()
            .nth(cursor)
            .map_or(self.value.len(), |(i, _)| i)
    }

    /// Apply an editing key. Returns false for keys the input does not use.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let len = self.value.chars().count();
        match key.code {
            KeyCode::Char('a') if ctrl => self.cursor = 0,
            KeyCode::Char('e') if ctrl => self.cursor = len,
            KeyCode::Char('u') if ctrl => {
                let at = self.byte_at(self.cursor);
                self.value.drain(..at);
                self.cursor = 0;
            }
            KeyCode::Char('k') if ctrl => {
                let at = self.byte_at(self.cursor);
                self.value.truncate(at);
            }
            KeyCode::Char(_) if ctrl => return false,
            KeyCode::Char(c) => {
                let at = self.byte_at(self.cursor);
                self.value.insert(at, c);
                self.cursor += 1;
            }
            KeyCode::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_at(self.cursor);
                    self.value.remove(at);
                }
            }
            KeyCode::Delete => {
                if self.cursor < len {
                    let at = self.byte_at(self.cursor);
                    self.value.remove(at);
                }
            }
            KeyCode::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Right => self.cursor = (self.cursor + 1).min(len),
            KeyCode::Home => self.cursor = 0,
            KeyCode::End => self.cursor = len,
            _ => return false,
        }
        true
    }

    /// Prompt followed by the value (or the faint placeholder). A focused
    /// input shows its cursor as a reversed cell.
    pub fn view(&self) -> String {
        let mut out = String::from(self.prompt);
        if self.value.is_empty() {
            if self.focused {
                out.push_str("\x1b[7m \x1b[0m");
            }
            out.push_str(&faint(self.placeholder));
            return out;
        }

        // Newlines are shown as a visible glyph to keep the input on one row.
        let shown: Vec<char> = self
            .value
            .chars()
            .map(|c| if c == '\n' { '↵' } else { c })
            .collect();
        for (i, c) in shown.iter().enumerate() {
            if self.focused && i == self.cursor {
                out.push_str("\x1b[7m");
                out.push(*c);
                out.push_str("\x1b[0m");
            } else {
                out.push(*c);
            }
        }
        if self.focused && self.cursor >= shown.len() {
            out.push_str("\x1b[7m \x1b[0m");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::strip;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn typed(s: &str) -> TextInput {
        let mut input = TextInput::new("> ", "hint");
        for c in s.chars() {
            input.handle_key(key(KeyCode::Char(c)));
        }
        input
    }

    #[test]
    fn typing_and_backspace() {
        let mut input = typed("héllo");
        assert_eq!(input.value(), "héllo");
        input.handle_key(key(KeyCode::Backspace));
        assert_eq!(input.value(), "héll");
    }

    #[test]
    fn insert_at_cursor() {
        let mut input = typed("ac");
        input.handle_key(key(KeyCode::Left));
        input.handle_key(key(KeyCode::Char('b')));
        assert_eq!(input.value(), "abc");
        input.handle_key(key(KeyCode::Home));
        input.handle_key(key(KeyCode::Delete));
        assert_eq!(input.value(), "bc");
    }

    #[test]
    fn ctrl_u_and_ctrl_k() {
        let mut input = typed("abcd");
        input.handle_key(key(KeyCode::Left));
        input.handle_key(ctrl('k'));
        assert_eq!(input.value(), "abc");
        input.handle_key(key(KeyCode::Left));
        input.handle_key(ctrl('u'));
        assert_eq!(input.value(), "c");
    }

    #[test]
    fn unhandled_keys_report_false() {
        let mut input = typed("x");
        assert!(!input.handle_key(key(KeyCode::Enter)));
        assert!(!input.handle_key(ctrl('c')));
        assert_eq!(input.value(), "x");
    }

    #[test]
    fn view_shows_placeholder_when_empty() {
        let input = TextInput::new("/ ", "Search diff");
        assert_eq!(strip(&input.view()), "/ Search diff");
        let mut input = TextInput::new("> ", "hint");
        input.set_value("a\nb");
        assert_eq!(strip(&input.view()), "> a↵b");
    }
}
