//! Admin login form

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::context::AppContext;
use crate::session::validate_credentials;
use crate::tui::app::Screen;
use crate::tui::components::InputField;
use crate::tui::events::{schedule, AppEvent, EventSender, Timer};
use crate::tui::traits::{ScreenAction, View};
use crate::tui::ui::{centered_rect, key_hints, Styles};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Email,
    Password,
}

pub struct LoginScreen {
    email: InputField,
    password: InputField,
    focus: Focus,
    error: Option<&'static str>,
    ticket: u64,
    timer: Timer,
}

impl Default for LoginScreen {
    fn default() -> Self {
        let mut email = InputField::new("Email").with_placeholder("admin@autoservice.id");
        email.set_focus(true);
        Self {
            email,
            password: InputField::new("Password").masked(),
            focus: Focus::Email,
            error: None,
            ticket: 0,
            timer: Timer::default(),
        }
    }
}

impl LoginScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_signing_in(&self) -> bool {
        self.timer.is_pending()
    }

    fn set_focus(&mut self, focus: Focus) {
        self.focus = focus;
        self.email.set_focus(focus == Focus::Email);
        self.password.set_focus(focus == Focus::Password);
    }

    fn active_input(&mut self) -> &mut InputField {
        match self.focus {
            Focus::Email => &mut self.email,
            Focus::Password => &mut self.password,
        }
    }

    fn submit(&mut self, ctx: &mut AppContext, events: &EventSender) {
        if let Err(message) = validate_credentials(&self.email.value, &self.password.value) {
            self.error = Some(message);
            return;
        }
        self.error = None;
        self.ticket += 1;
        ctx.session.begin_login();
        self.timer.set(schedule(
            events,
            ctx.config.login_delay(),
            AppEvent::LoginFinished { ticket: self.ticket },
        ));
    }
}

impl View for LoginScreen {
    fn draw(&mut self, f: &mut Frame, area: Rect, _ctx: &AppContext) {
        let form_area = centered_rect(60, 70, area);
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(1),
            ])
            .split(form_area);

        f.render_widget(
            Paragraph::new(vec![
                Line::styled("Admin Login", Styles::title()),
                Line::styled("Sign in to manage the platform", Styles::inactive()),
            ])
            .block(Block::default().borders(Borders::BOTTOM)),
            chunks[0],
        );
        self.email.render(f, chunks[1]);
        self.password.render(f, chunks[2]);

        let status = if self.is_signing_in() {
            Line::styled("Signing in...", Styles::info())
        } else if let Some(error) = self.error {
            Line::styled(error, Styles::error())
        } else {
            Line::styled("Any email and password will do in demo mode", Styles::inactive())
        };
        f.render_widget(Paragraph::new(status), chunks[3]);

        f.render_widget(
            Paragraph::new(key_hints(&[
                ("Tab", "Switch field"),
                ("Ctrl+S", "Show/hide password"),
                ("Enter", "Sign in"),
                ("Esc", "Back"),
            ])),
            chunks[5],
        );
    }

    fn handle_key_event(
        &mut self,
        key: KeyEvent,
        ctx: &mut AppContext,
        events: &EventSender,
    ) -> Result<ScreenAction> {
        if self.is_signing_in() {
            return Ok(ScreenAction::None);
        }
        match key.code {
            KeyCode::Esc => return Ok(ScreenAction::NavigateTo(Screen::Landing)),
            KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                let next = match self.focus {
                    Focus::Email => Focus::Password,
                    Focus::Password => Focus::Email,
                };
                self.set_focus(next);
            }
            KeyCode::Enter => match self.focus {
                Focus::Email if self.password.is_empty() => self.set_focus(Focus::Password),
                _ => self.submit(ctx, events),
            },
            KeyCode::Char('s') if key.modifiers.contains(crossterm::event::KeyModifiers::CONTROL) => {
                self.password.masked = !self.password.masked;
            }
            _ => {
                if self.active_input().handle_key(key) {
                    self.error = None;
                }
            }
        }
        Ok(ScreenAction::None)
    }

    fn handle_app_event(&mut self, event: &AppEvent, _ctx: &mut AppContext) -> ScreenAction {
        match event {
            AppEvent::LoginFinished { ticket } if *ticket == self.ticket => {
                self.timer.cancel();
                let email = self.email.value.trim().to_string();
                self.password.clear();
                ScreenAction::Login(email)
            }
            _ => ScreenAction::None,
        }
    }

    fn on_exit(&mut self) {
        self.timer.cancel();
        self.ticket += 1;
        self.error = None;
    }

    fn captures_text(&self) -> bool {
        true
    }

    fn help(&self) -> &'static str {
        "Login:\n\
        Tab - Switch between email and password\n\
        Ctrl+S - Show or hide the password\n\
        Enter - Sign in\n\
        Esc - Back to landing"
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

    async fn context() -> AppContext {
        let mut config = Config::default();
        config.timing.login_delay_ms = 5;
        AppContext::init_with_store(config, Arc::new(MemorySessionStore::new()))
            .await
            .unwrap()
    }

    fn type_text(screen: &mut LoginScreen, ctx: &mut AppContext, events: &EventSender, text: &str) {
        for c in text.chars() {
            screen.handle_key_event(key(KeyCode::Char(c)), ctx, events).unwrap();
        }
    }

    #[tokio::test]
    async fn test_blank_password_is_rejected() {
        let mut ctx = context().await;
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut screen = LoginScreen::new();
        type_text(&mut screen, &mut ctx, &tx, "admin@autoservice.id");
        screen.handle_key_event(key(KeyCode::Tab), &mut ctx, &tx).unwrap();
        screen.handle_key_event(key(KeyCode::Enter), &mut ctx, &tx).unwrap();
        assert_eq!(screen.error, Some("Password is required"));
        assert!(!screen.is_signing_in());
    }

    #[tokio::test]
    async fn test_login_completes_after_delay() {
        let mut ctx = context().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut screen = LoginScreen::new();
        type_text(&mut screen, &mut ctx, &tx, "admin@autoservice.id");
        screen.handle_key_event(key(KeyCode::Enter), &mut ctx, &tx).unwrap();
        type_text(&mut screen, &mut ctx, &tx, "secret");
        screen.handle_key_event(key(KeyCode::Enter), &mut ctx, &tx).unwrap();
        assert!(ctx.session.is_loading());

        let event = rx.recv().await.unwrap();
        let action = screen.handle_app_event(&event, &mut ctx);
        assert_eq!(action, ScreenAction::Login("admin@autoservice.id".to_string()));
    }

    #[tokio::test]
    async fn test_leaving_drops_pending_login() {
        let mut ctx = context().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut screen = LoginScreen::new();
        type_text(&mut screen, &mut ctx, &tx, "admin@autoservice.id");
        screen.handle_key_event(key(KeyCode::Tab), &mut ctx, &tx).unwrap();
        type_text(&mut screen, &mut ctx, &tx, "secret");
        screen.handle_key_event(key(KeyCode::Enter), &mut ctx, &tx).unwrap();
        let stale = AppEvent::LoginFinished { ticket: screen.ticket };
        screen.on_exit();

        tokio::time::sleep(std::time::Duration::from_millis(30)).await;
        assert!(rx.try_recv().is_err());
        assert_eq!(screen.handle_app_event(&stale, &mut ctx), ScreenAction::None);
    }
}
