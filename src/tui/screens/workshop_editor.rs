//! Add/edit workshop wizard

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{layout::Rect, Frame};
use tracing::info;

use crate::context::AppContext;
use crate::errors::AppResult;
use crate::tui::app::Screen;
use crate::tui::components::{WizardOutcome, WizardPanel};
use crate::tui::events::{AppEvent, EventSender, FormKind};
use crate::tui::traits::{ScreenAction, View};
use crate::wizard::WorkshopForm;

pub struct WorkshopEditorScreen {
    panel: WizardPanel<WorkshopForm>,
    /// Workshop being edited; `None` adds a new one
    editing: Option<String>,
}

impl Default for WorkshopEditorScreen {
    fn default() -> Self {
        Self {
            panel: WizardPanel::new(FormKind::Workshop, "Add Workshop", WorkshopForm::default()),
            editing: None,
        }
    }
}

impl WorkshopEditorScreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepare the form for a new workshop or prefill it from `id`
    pub fn open(&mut self, id: Option<&str>, ctx: &AppContext) -> AppResult<()> {
        match id {
            Some(id) => {
                let workshop = ctx.data.workshop(id)?;
                self.panel.reset(WorkshopForm::from_workshop(workshop));
                self.panel.set_title("Edit Workshop");
                self.editing = Some(id.to_string());
            }
            None => {
                self.panel.reset(WorkshopForm::default());
                self.panel.set_title("Add Workshop");
                self.editing = None;
            }
        }
        Ok(())
    }

    pub fn editing(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    fn save(&mut self, ctx: &mut AppContext) -> ScreenAction {
        let form = self.panel.wizard.form().clone();
        match self.editing {
            Some(ref id) => match ctx.update_workshop(id, &form) {
                Ok(()) => {
                    info!("Workshop {} updated", id);
                    ScreenAction::success(format!("{} has been updated", form.name.trim()))
                }
                Err(e) => ScreenAction::error(e.to_string()),
            },
            None => {
                let workshop = ctx.add_workshop(form);
                info!("Workshop {} added", workshop.id);
                ScreenAction::success(format!("{} has been added", workshop.name))
            }
        }
    }
}

impl View for WorkshopEditorScreen {
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
                KeyCode::Enter | KeyCode::Esc => ScreenAction::NavigateTo(Screen::Workshops),
                _ => ScreenAction::None,
            });
        }

        let action = match self.panel.handle_key(key, events, ctx.config.submit_delay()) {
            WizardOutcome::Leave => ScreenAction::NavigateTo(Screen::Workshops),
            WizardOutcome::Blocked => ScreenAction::error("Please fill in the required fields"),
            WizardOutcome::Started | WizardOutcome::None => ScreenAction::None,
        };
        Ok(action)
    }

    fn handle_app_event(&mut self, event: &AppEvent, ctx: &mut AppContext) -> ScreenAction {
        match event {
            AppEvent::SubmitFinished {
                form: FormKind::Workshop,
                ticket,
            } if self.panel.finish(*ticket) => self.save(ctx),
            _ => ScreenAction::None,
        }
    }

    fn on_exit(&mut self) {
        self.panel.reset(WorkshopForm::default());
        self.editing = None;
    }

    fn captures_text(&self) -> bool {
        self.panel.captures_text()
    }

    fn help(&self) -> &'static str {
        "Workshop editor:\n\
        Tab/↑/↓ - Move between fields\n\
        ←/→ - Change city\n\
        Space - Toggle a service\n\
        Enter - Next step / Save\n\
        Esc - Previous step, or back to workshops from step 1"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::session::MemorySessionStore;
    use crate::wizard::WizardForm;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    async fn context() -> AppContext {
        let mut config = Config::default();
        config.timing.submit_delay_ms = 5;
        AppContext::init_with_store(config, Arc::new(MemorySessionStore::new()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_edit_prefills_and_saves() {
        let mut ctx = context().await;
        let (tx, mut rx) = mpsc::unbounded_channel();
        let mut screen = WorkshopEditorScreen::new();
        let id = ctx.data.workshops[0].id.clone();
        let name = ctx.data.workshops[0].name.clone();

        screen.open(Some(&id), &ctx).unwrap();
        assert_eq!(screen.editing(), Some(id.as_str()));
        assert_eq!(screen.panel.wizard.form().name, name);

        let enter = KeyEvent::new(KeyCode::Enter, crossterm::event::KeyModifiers::NONE);
        for _ in 0..WorkshopForm::STEPS.len() {
            screen.handle_key_event(enter, &mut ctx, &tx).unwrap();
        }
        let event = rx.recv().await.unwrap();
        let action = screen.handle_app_event(&event, &mut ctx);
        assert!(matches!(action, ScreenAction::Toast(crate::tui::components::ToastKind::Success, _)));
        assert_eq!(ctx.data.workshops.len(), 6);
    }

    #[tokio::test]
    async fn test_unknown_workshop_is_not_found() {
        let ctx = context().await;
        let mut screen = WorkshopEditorScreen::new();
        let err = screen.open(Some("ws-404"), &ctx).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(screen.editing(), None);
    }
}
