//! System settings editor

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::context::AppContext;
use crate::models::{SettingField, SystemSettings, SYSTEM_INFO};
use crate::tui::components::InputField;
use crate::tui::events::EventSender;
use crate::tui::traits::{step_selection, ScreenAction, View};
use crate::tui::ui::{field_line, key_hints, Styles};

pub struct SettingsScreen {
    /// Working copy; saved into the context with `s`
    draft: SystemSettings,
    state: ListState,
    editor: Option<InputField>,
}

impl Default for SettingsScreen {
    fn default() -> Self {
        let mut state = ListState::default();
        state.select(Some(0));
        Self {
            draft: SystemSettings::default(),
            state,
            editor: None,
        }
    }
}

impl SettingsScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn draft(&self) -> &SystemSettings {
        &self.draft
    }

    fn selected_field(&self) -> Option<SettingField> {
        self.state.selected().and_then(|i| SettingField::ALL.get(i)).copied()
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        let Some(ref mut editor) = self.editor else {
            return;
        };
        match key.code {
            KeyCode::Enter => {
                let text = editor.value.clone();
                if let Some(field) = self.selected_field() {
                    self.draft.set_from_text(field, &text);
                }
                self.editor = None;
            }
            KeyCode::Esc => self.editor = None,
            KeyCode::Char(c) if !(c.is_ascii_digit() || c == '.') => {}
            _ => {
                editor.handle_key(key);
            }
        }
    }
}

impl View for SettingsScreen {
    fn draw(&mut self, f: &mut Frame, area: Rect, ctx: &AppContext) {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
            .split(area);
        let left = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(9),
                Constraint::Length(if self.editor.is_some() { 3 } else { 0 }),
                Constraint::Length(1),
            ])
            .split(columns[0]);

        let dirty = self.draft != ctx.data.settings;
        let items: Vec<ListItem> = SettingField::ALL
            .iter()
            .map(|field| {
                let value_style = if field.is_toggle() {
                    Styles::info()
                } else {
                    Styles::default()
                };
                ListItem::new(Line::from(vec![
                    Span::raw(format!("{:<34}", field.label())),
                    Span::styled(self.draft.display_value(*field), value_style),
                ]))
            })
            .collect();
        let title = if dirty { "System Settings (unsaved)" } else { "System Settings" };
        f.render_stateful_widget(
            List::new(items)
                .block(
                    Block::default()
                        .title(title)
                        .borders(Borders::ALL)
                        .border_style(Styles::border(self.editor.is_none())),
                )
                .highlight_style(Styles::selected())
                .highlight_symbol("> "),
            left[0],
            &mut self.state,
        );

        if let Some(ref editor) = self.editor {
            editor.render(f, left[1]);
        }

        f.render_widget(
            Paragraph::new(key_hints(&[
                ("←/→", "Adjust"),
                ("Space", "Toggle"),
                ("Enter", "Type value"),
                ("s", "Save"),
                ("r", "Revert"),
            ])),
            left[2],
        );

        let mut info: Vec<Line> = SYSTEM_INFO
            .iter()
            .map(|(label, value)| field_line(label, value, 18))
            .collect();
        info.push(Line::raw(""));
        info.push(field_line("Theme", ctx.theme.as_str(), 18));
        if let Some(admin) = ctx.session.user() {
            info.push(field_line("Signed in as", &admin.email, 18));
        }
        f.render_widget(
            Paragraph::new(info).block(Block::default().title("System Info").borders(Borders::ALL)),
            columns[1],
        );
    }

    fn handle_key_event(
        &mut self,
        key: KeyEvent,
        ctx: &mut AppContext,
        _events: &EventSender,
    ) -> Result<ScreenAction> {
        if self.editor.is_some() {
            self.handle_editor_key(key);
            return Ok(ScreenAction::None);
        }

        let count = SettingField::ALL.len();
        let action = match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.select(step_selection(self.state.selected(), count, false));
                ScreenAction::None
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.state.select(step_selection(self.state.selected(), count, true));
                ScreenAction::None
            }
            KeyCode::Left | KeyCode::Right => {
                if let Some(field) = self.selected_field() {
                    let steps = if key.code == KeyCode::Right { 1 } else { -1 };
                    self.draft.adjust(field, steps);
                }
                ScreenAction::None
            }
            KeyCode::Char(' ') => {
                if let Some(field) = self.selected_field().filter(SettingField::is_toggle) {
                    self.draft.adjust(field, 1);
                }
                ScreenAction::None
            }
            KeyCode::Enter => {
                match self.selected_field() {
                    Some(field) if field.is_toggle() => self.draft.adjust(field, 1),
                    Some(field) => {
                        let current = self.draft.display_value(field);
                        let digits: String = current
                            .chars()
                            .filter(|c| c.is_ascii_digit() || *c == '.')
                            .collect();
                        let mut editor = InputField::new(field.label()).with_value(&digits);
                        editor.set_focus(true);
                        self.editor = Some(editor);
                    }
                    None => {}
                }
                ScreenAction::None
            }
            KeyCode::Char('s') => {
                ctx.save_settings(self.draft.clone());
                ScreenAction::success("Settings saved successfully")
            }
            KeyCode::Char('r') => {
                self.draft = ctx.data.settings.clone();
                ScreenAction::info("Changes discarded")
            }
            KeyCode::Esc => ScreenAction::FocusSidebar,
            _ => ScreenAction::None,
        };
        Ok(action)
    }

    fn on_enter(&mut self, ctx: &AppContext, _events: &EventSender) {
        self.draft = ctx.data.settings.clone();
        self.editor = None;
    }

    fn on_exit(&mut self) {
        self.editor = None;
    }

    fn captures_text(&self) -> bool {
        self.editor.is_some()
    }

    fn help(&self) -> &'static str {
        "Settings:\n\
        ↑/↓ - Select setting\n\
        ←/→ - Decrease/increase (surge 1.0-3.0, commission 5-30%, cancellation 0-25%)\n\
        Space - Toggle a switch\n\
        Enter - Type a value\n\
        s - Save\n\
        r - Revert unsaved changes\n\
        Esc - Back"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::session::MemorySessionStore;
    use crossterm::event::KeyModifiers;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[tokio::test]
    async fn test_adjust_then_save() {
        let mut ctx = AppContext::init_with_store(Config::default(), Arc::new(MemorySessionStore::new()))
            .await
            .unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut screen = SettingsScreen::new();
        screen.on_enter(&ctx, &tx);
        let surge = ctx.data.settings.surge_multiplier;

        screen.handle_key_event(key(KeyCode::Right), &mut ctx, &tx).unwrap();
        assert_eq!(ctx.data.settings.surge_multiplier, surge);

        let action = screen.handle_key_event(key(KeyCode::Char('s')), &mut ctx, &tx).unwrap();
        assert_eq!(action, ScreenAction::success("Settings saved successfully"));
        assert_eq!(ctx.data.settings, *screen.draft());
        assert!(ctx.data.settings.surge_multiplier >= surge);
    }

    #[tokio::test]
    async fn test_typed_value_is_clamped() {
        let mut ctx = AppContext::init_with_store(Config::default(), Arc::new(MemorySessionStore::new()))
            .await
            .unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut screen = SettingsScreen::new();
        screen.on_enter(&ctx, &tx);

        // commission percentage
        screen.handle_key_event(key(KeyCode::Down), &mut ctx, &tx).unwrap();
        screen.handle_key_event(key(KeyCode::Enter), &mut ctx, &tx).unwrap();
        assert!(screen.captures_text());
        screen.handle_key_event(key(KeyCode::End), &mut ctx, &tx).unwrap();
        for _ in 0..4 {
            screen.handle_key_event(key(KeyCode::Backspace), &mut ctx, &tx).unwrap();
        }
        for c in "99".chars() {
            screen.handle_key_event(key(KeyCode::Char(c)), &mut ctx, &tx).unwrap();
        }
        screen.handle_key_event(key(KeyCode::Enter), &mut ctx, &tx).unwrap();
        assert!(!screen.captures_text());
        assert_eq!(screen.draft().commission_percentage, 30);
    }
}
