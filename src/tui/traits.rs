//! Core traits shared by the TUI screens

use anyhow::Result;
use crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use super::app::Screen;
use super::components::toast::ToastKind;
use super::events::{AppEvent, EventSender};
use crate::context::AppContext;

/// Actions that can be returned from screen event handling
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenAction {
    /// Navigate to a different screen
    NavigateTo(Screen),
    /// Go back to previous screen
    NavigateBack,
    /// Hand focus to the sidebar menu
    FocusSidebar,
    /// Quit the application
    Quit,
    /// Show a toast
    Toast(ToastKind, String),
    /// Finish a login for this email
    Login(String),
    /// Sign out and return to the login screen
    Logout,
    /// Open the workshop editor; `None` adds a new workshop
    EditWorkshop(Option<String>),
    /// No action taken
    None,
}

impl ScreenAction {
    pub fn success(message: impl Into<String>) -> Self {
        ScreenAction::Toast(ToastKind::Success, message.into())
    }

    pub fn info(message: impl Into<String>) -> Self {
        ScreenAction::Toast(ToastKind::Info, message.into())
    }

    pub fn error(message: impl Into<String>) -> Self {
        ScreenAction::Toast(ToastKind::Error, message.into())
    }
}

/// A screen of the application
pub trait View {
    /// Draw the screen content
    fn draw(&mut self, f: &mut Frame, area: Rect, ctx: &AppContext);

    /// Handle keyboard input and return an action for the app
    fn handle_key_event(
        &mut self,
        key: KeyEvent,
        ctx: &mut AppContext,
        events: &EventSender,
    ) -> Result<ScreenAction>;

    /// Handle a timer event addressed to this screen
    fn handle_app_event(&mut self, _event: &AppEvent, _ctx: &mut AppContext) -> ScreenAction {
        ScreenAction::None
    }

    /// Called when screen becomes active
    fn on_enter(&mut self, _ctx: &AppContext, _events: &EventSender) {}

    /// Called when screen becomes inactive; pending timers must stop here
    fn on_exit(&mut self) {}

    /// Whether printable keys currently go into a text input
    fn captures_text(&self) -> bool {
        false
    }

    /// Context help shown in the help popup
    fn help(&self) -> &'static str;
}

/// Trait for screens with navigable lists
pub trait Navigable {
    /// Move selection up
    fn navigate_up(&mut self);

    /// Move selection down
    fn navigate_down(&mut self);

    /// Get currently selected index
    fn get_selected_index(&self) -> Option<usize>;

    /// Set selected index
    fn set_selected_index(&mut self, index: Option<usize>);

    /// Get total number of items
    fn get_item_count(&self) -> usize;

    /// Navigate to first item
    fn navigate_to_first(&mut self) {
        if self.get_item_count() > 0 {
            self.set_selected_index(Some(0));
        }
    }

    /// Navigate to last item
    fn navigate_to_last(&mut self) {
        let count = self.get_item_count();
        if count > 0 {
            self.set_selected_index(Some(count - 1));
        }
    }
}

/// Wrapping up/down movement over `count` items
pub fn step_selection(selected: Option<usize>, count: usize, forward: bool) -> Option<usize> {
    if count == 0 {
        return None;
    }
    Some(match selected {
        None => 0,
        Some(i) if forward => (i + 1) % count,
        Some(0) => count - 1,
        Some(i) => i - 1,
    })
}
