//! Public service booking wizard

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{layout::Rect, Frame};
use tracing::info;

use crate::context::AppContext;
use crate::tui::app::Screen;
use crate::tui::components::{WizardOutcome, WizardPanel};
use crate::tui::events::{AppEvent, EventSender, FormKind};
use crate::tui::traits::{ScreenAction, View};
use crate::wizard::BookingForm;

pub struct BookingScreen {
    panel: WizardPanel<BookingForm>,
}

impl Default for BookingScreen {
    fn default() -> Self {
        Self {
            panel: WizardPanel::new(FormKind::Booking, "Book a Service", BookingForm::default()),
        }
    }
}

impl BookingScreen {
    pub fn new() -> Self {
        Self::default()
    }
}

impl View for BookingScreen {
    fn draw(&mut self, f: &mut Frame, area: Rect, _ctx: &AppContext) {
        self.panel.render(f, area);
    }

    fn handle_key_event(
        &mut self,
        key: KeyEvent,
        ctx: &mut AppContext,
        events: &EventSender,
    ) -> Result<ScreenAction> {
        if self.panel.wizard.is_submitted() {
            return Ok(match key.code {
                KeyCode::Enter => {
                    self.panel.reset(BookingForm::default());
                    ScreenAction::None
                }
                KeyCode::Esc => ScreenAction::NavigateTo(Screen::Landing),
                _ => ScreenAction::None,
            });
        }

        let action = match self.panel.handle_key(key, events, ctx.config.submit_delay()) {
            WizardOutcome::Leave => ScreenAction::NavigateTo(Screen::Landing),
            WizardOutcome::Blocked => ScreenAction::error("Please fill in the required fields"),
            WizardOutcome::Started | WizardOutcome::None => ScreenAction::None,
        };
        Ok(action)
    }

    fn handle_app_event(&mut self, event: &AppEvent, _ctx: &mut AppContext) -> ScreenAction {
        match event {
            AppEvent::SubmitFinished {
                form: FormKind::Booking,
                ticket,
            } if self.panel.finish(*ticket) => {
                let form = self.panel.wizard.form();
                info!("Booking requested by {} for {}", form.name.trim(), form.date.trim());
                ScreenAction::success("Booking submitted! We will contact you shortly.")
            }
            _ => ScreenAction::None,
        }
    }

    fn on_exit(&mut self) {
        self.panel.reset(BookingForm::default());
    }

    fn captures_text(&self) -> bool {
        self.panel.captures_text()
    }

    fn help(&self) -> &'static str {
        "Book a Service:\n\
        Tab/↑/↓ - Move between fields\n\
        ←/→/Space - Change a choice\n\
        Enter - Next step / Submit\n\
        Esc - Previous step, or leave from step 1"
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

    #[tokio::test]
    async fn test_back_from_first_step_returns_to_landing() {
        let mut ctx = AppContext::init_with_store(Config::default(), Arc::new(MemorySessionStore::new()))
            .await
            .unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut screen = BookingScreen::new();

        let blocked = screen
            .handle_key_event(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE), &mut ctx, &tx)
            .unwrap();
        assert!(matches!(blocked, ScreenAction::Toast(..)));

        let action = screen
            .handle_key_event(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE), &mut ctx, &tx)
            .unwrap();
        assert_eq!(action, ScreenAction::NavigateTo(Screen::Landing));
    }
}
