//! Single-line text input

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::tui::ui::Styles;

/// Input field widget
#[derive(Debug, Clone)]
pub struct InputField {
    pub label: String,
    pub value: String,
    pub placeholder: String,
    pub is_focused: bool,
    /// Cursor position in characters
    pub cursor_position: usize,
    /// Render the value as bullets
    pub masked: bool,
}

impl InputField {
    pub fn new(label: &str) -> Self {
        Self {
            label: label.to_string(),
            value: String::new(),
            placeholder: String::new(),
            is_focused: false,
            cursor_position: 0,
            masked: false,
        }
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = placeholder.to_string();
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.set_value(value);
        self
    }

    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    pub fn set_value(&mut self, value: &str) {
        self.value = value.to_string();
        self.cursor_position = value.chars().count();
    }

    pub fn set_focus(&mut self, focused: bool) {
        self.is_focused = focused;
    }

    fn byte_index(&self) -> usize {
        self.value
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let index = self.byte_index();
        self.value.insert(index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            let index = self.byte_index();
            self.value.remove(index);
        }
    }

    pub fn delete_char_forward(&mut self) {
        if self.cursor_position < self.value.chars().count() {
            let index = self.byte_index();
            self.value.remove(index);
        }
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor_position = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Apply an editing key; returns false for keys the field ignores
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => self.insert_char(c),
            KeyCode::Backspace => self.delete_char(),
            KeyCode::Delete => self.delete_char_forward(),
            KeyCode::Left => self.cursor_position = self.cursor_position.saturating_sub(1),
            KeyCode::Right => {
                self.cursor_position = (self.cursor_position + 1).min(self.value.chars().count())
            }
            KeyCode::Home => self.cursor_position = 0,
            KeyCode::End => self.cursor_position = self.value.chars().count(),
            _ => return false,
        }
        true
    }

    pub fn display_value(&self) -> String {
        if self.masked {
            "•".repeat(self.value.chars().count())
        } else {
            self.value.clone()
        }
    }

    /// Render the input field as a widget
    pub fn render(&self, f: &mut Frame, area: Rect) {
        let (text, style) = if self.value.is_empty() && !self.placeholder.is_empty() {
            (self.placeholder.clone(), Styles::inactive())
        } else {
            (self.display_value(), Styles::default())
        };

        let block = Block::default()
            .title(self.label.as_str())
            .borders(Borders::ALL)
            .border_style(Styles::border(self.is_focused));

        f.render_widget(Paragraph::new(text).style(style).block(block), area);

        if self.is_focused {
            let cursor_x = area.x + 1 + self.cursor_position as u16;
            let cursor_y = area.y + 1;
            if cursor_x < area.x + area.width.saturating_sub(1) {
                f.set_cursor(cursor_x, cursor_y);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_editing_is_char_based() {
        let mut input = InputField::new("Name").with_value("Budi");
        input.handle_key(key(KeyCode::Char('é')));
        assert_eq!(input.value, "Budié");
        input.handle_key(key(KeyCode::Home));
        input.handle_key(key(KeyCode::Delete));
        assert_eq!(input.value, "udié");
        input.handle_key(key(KeyCode::End));
        input.handle_key(key(KeyCode::Backspace));
        assert_eq!(input.value, "udi");
        assert!(!input.handle_key(key(KeyCode::Tab)));
    }

    #[test]
    fn test_masked_display() {
        let input = InputField::new("Password").masked().with_value("secret");
        assert_eq!(input.display_value(), "••••••");
        assert_eq!(input.value, "secret");
    }
}
