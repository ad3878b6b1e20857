//! Admin sidebar navigation

use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::tui::app::Screen;
use crate::tui::traits::{step_selection, Navigable};
use crate::tui::ui::Styles;

/// Admin menu entries in display order
pub const MENU: &[Screen] = &[
    Screen::Dashboard,
    Screen::Bookings,
    Screen::Mechanics,
    Screen::Workshops,
    Screen::Users,
    Screen::Services,
    Screen::Finance,
    Screen::Monitoring,
    Screen::Notifications,
    Screen::Broadcasts,
    Screen::Settings,
];

pub struct Sidebar {
    pub state: ListState,
}

impl Default for Sidebar {
    fn default() -> Self {
        let mut state = ListState::default();
        state.select(Some(0));
        Self { state }
    }
}

impl Sidebar {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected_screen(&self) -> Option<Screen> {
        self.state.selected().and_then(|i| MENU.get(i)).copied()
    }

    /// Highlight the entry of `screen`; screens outside the menu keep
    /// the current highlight
    pub fn follow(&mut self, screen: Screen) {
        let owner = match screen {
            Screen::WorkshopEditor => Screen::Workshops,
            other => other,
        };
        if let Some(index) = MENU.iter().position(|s| *s == owner) {
            self.state.select(Some(index));
        }
    }

    pub fn render(&mut self, f: &mut Frame, area: Rect, focused: bool, unread: usize) {
        let items: Vec<ListItem> = MENU
            .iter()
            .map(|screen| {
                let mut spans = vec![Span::raw(screen.title())];
                if *screen == Screen::Notifications && unread > 0 {
                    spans.push(Span::styled(format!(" ({})", unread), Styles::error()));
                }
                ListItem::new(Line::from(spans))
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .title("AutoService")
                    .borders(Borders::ALL)
                    .border_style(Styles::border(focused)),
            )
            .highlight_style(if focused {
                Styles::selected()
            } else {
                Styles::title()
            })
            .highlight_symbol("> ");

        f.render_stateful_widget(list, area, &mut self.state);
    }
}

impl Navigable for Sidebar {
    fn navigate_up(&mut self) {
        let next = step_selection(self.state.selected(), MENU.len(), false);
        self.state.select(next);
    }

    fn navigate_down(&mut self) {
        let next = step_selection(self.state.selected(), MENU.len(), true);
        self.state.select(next);
    }

    fn get_selected_index(&self) -> Option<usize> {
        self.state.selected()
    }

    fn set_selected_index(&mut self, index: Option<usize>) {
        self.state.select(index);
    }

    fn get_item_count(&self) -> usize {
        MENU.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_navigation_wraps_and_follows() {
        let mut sidebar = Sidebar::new();
        sidebar.navigate_up();
        assert_eq!(sidebar.selected_screen(), Some(Screen::Settings));
        sidebar.navigate_down();
        assert_eq!(sidebar.selected_screen(), Some(Screen::Dashboard));

        sidebar.follow(Screen::WorkshopEditor);
        assert_eq!(sidebar.selected_screen(), Some(Screen::Workshops));
        sidebar.follow(Screen::Login);
        assert_eq!(sidebar.selected_screen(), Some(Screen::Workshops));
        sidebar.navigate_to_last();
        assert_eq!(sidebar.selected_screen(), Some(Screen::Settings));
    }
}
