//! Public landing screen

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::context::AppContext;
use crate::tui::app::Screen;
use crate::tui::events::EventSender;
use crate::tui::traits::{step_selection, Navigable, ScreenAction, View};
use crate::tui::ui::{key_hints, Styles};

const ABOUT: &str = "AutoService connects vehicle owners with verified mechanics and \
partner workshops across Jakarta, Bandung and Surabaya. Book routine maintenance, \
engine diagnostics, safety inspections or performance tuning at a workshop or at \
home. Payments are held in escrow until the job is done.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    BookService,
    AdminLogin,
    About,
    Quit,
}

/// Landing menu options
#[derive(Debug, Clone)]
struct MenuOption {
    title: &'static str,
    description: &'static str,
    shortcut: char,
    entry: Entry,
}

const MENU_OPTIONS: &[MenuOption] = &[
    MenuOption {
        title: "Book a Service",
        description: "Schedule maintenance or repairs in four quick steps",
        shortcut: 'b',
        entry: Entry::BookService,
    },
    MenuOption {
        title: "Admin Login",
        description: "Sign in to the admin dashboard",
        shortcut: 'l',
        entry: Entry::AdminLogin,
    },
    MenuOption {
        title: "About AutoService",
        description: "What the platform does",
        shortcut: 'a',
        entry: Entry::About,
    },
    MenuOption {
        title: "Quit",
        description: "Leave the application",
        shortcut: 'q',
        entry: Entry::Quit,
    },
];

pub struct LandingScreen {
    pub menu_state: ListState,
    show_about: bool,
}

impl Default for LandingScreen {
    fn default() -> Self {
        let mut menu_state = ListState::default();
        menu_state.select(Some(0));
        Self {
            menu_state,
            show_about: false,
        }
    }
}

impl LandingScreen {
    pub fn new() -> Self {
        Self::default()
    }

    fn choose(&mut self, entry: Entry, ctx: &AppContext) -> ScreenAction {
        match entry {
            Entry::BookService => ScreenAction::NavigateTo(Screen::BookService),
            Entry::AdminLogin if ctx.session.is_authenticated() => {
                ScreenAction::NavigateTo(Screen::Dashboard)
            }
            Entry::AdminLogin => ScreenAction::NavigateTo(Screen::Login),
            Entry::About => {
                self.show_about = !self.show_about;
                ScreenAction::None
            }
            Entry::Quit => ScreenAction::Quit,
        }
    }
}

impl View for LandingScreen {
    fn draw(&mut self, f: &mut Frame, area: Rect, ctx: &AppContext) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(5),
                Constraint::Min(8),
                Constraint::Length(if self.show_about { 6 } else { 0 }),
                Constraint::Length(1),
            ])
            .split(area);

        let signed_in = match ctx.session.user() {
            Some(admin) => format!("Signed in as {}", admin.name),
            None => "Vehicle service, wherever you are".to_string(),
        };
        let hero = Paragraph::new(vec![
            Line::styled("AutoService", Styles::title()),
            Line::raw("Trusted mechanics for cars and motorcycles"),
            Line::styled(signed_in, Styles::inactive()),
        ])
        .alignment(ratatui::layout::Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        f.render_widget(hero, chunks[0]);

        let items: Vec<ListItem> = MENU_OPTIONS
            .iter()
            .map(|option| {
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(format!("[{}] ", option.shortcut), Styles::info()),
                        Span::styled(option.title, Styles::default()),
                    ]),
                    Line::styled(format!("    {}", option.description), Styles::inactive()),
                ])
            })
            .collect();
        let menu = List::new(items)
            .block(Block::default().title("Menu").borders(Borders::ALL))
            .highlight_style(Styles::selected())
            .highlight_symbol("> ");
        f.render_stateful_widget(menu, chunks[1], &mut self.menu_state);

        if self.show_about {
            f.render_widget(
                Paragraph::new(ABOUT)
                    .wrap(Wrap { trim: true })
                    .block(Block::default().title("About").borders(Borders::ALL)),
                chunks[2],
            );
        }

        f.render_widget(
            Paragraph::new(key_hints(&[("↑/↓", "Navigate"), ("Enter", "Select"), ("F1", "Help")])),
            chunks[3],
        );
    }

    fn handle_key_event(
        &mut self,
        key: KeyEvent,
        ctx: &mut AppContext,
        _events: &EventSender,
    ) -> Result<ScreenAction> {
        let action = match key.code {
            KeyCode::Up => {
                self.navigate_up();
                ScreenAction::None
            }
            KeyCode::Down => {
                self.navigate_down();
                ScreenAction::None
            }
            KeyCode::Enter => match self.menu_state.selected().and_then(|i| MENU_OPTIONS.get(i)) {
                Some(option) => self.choose(option.entry, ctx),
                None => ScreenAction::None,
            },
            KeyCode::Char(c) => {
                match MENU_OPTIONS.iter().position(|o| o.shortcut == c.to_ascii_lowercase()) {
                    Some(index) => {
                        self.menu_state.select(Some(index));
                        self.choose(MENU_OPTIONS[index].entry, ctx)
                    }
                    None => ScreenAction::None,
                }
            }
            _ => ScreenAction::None,
        };
        Ok(action)
    }

    fn help(&self) -> &'static str {
        "Landing:\n\
        ↑/↓ - Navigate menu\n\
        Enter - Select option\n\
        b - Book a service\n\
        l - Admin login\n\
        a - About\n\
        q - Quit"
    }
}

impl Navigable for LandingScreen {
    fn navigate_up(&mut self) {
        let next = step_selection(self.menu_state.selected(), MENU_OPTIONS.len(), false);
        self.menu_state.select(next);
    }

    fn navigate_down(&mut self) {
        let next = step_selection(self.menu_state.selected(), MENU_OPTIONS.len(), true);
        self.menu_state.select(next);
    }

    fn get_selected_index(&self) -> Option<usize> {
        self.menu_state.selected()
    }

    fn set_selected_index(&mut self, index: Option<usize>) {
        self.menu_state.select(index);
    }

    fn get_item_count(&self) -> usize {
        MENU_OPTIONS.len()
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
    async fn test_shortcuts_and_menu() {
        let mut ctx = AppContext::init_with_store(Config::default(), Arc::new(MemorySessionStore::new()))
            .await
            .unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut screen = LandingScreen::new();

        let action = screen.handle_key_event(key(KeyCode::Char('b')), &mut ctx, &tx).unwrap();
        assert_eq!(action, ScreenAction::NavigateTo(Screen::BookService));

        let action = screen.handle_key_event(key(KeyCode::Char('L')), &mut ctx, &tx).unwrap();
        assert_eq!(action, ScreenAction::NavigateTo(Screen::Login));

        screen.handle_key_event(key(KeyCode::Down), &mut ctx, &tx).unwrap();
        assert_eq!(screen.menu_state.selected(), Some(2));
        screen.handle_key_event(key(KeyCode::Enter), &mut ctx, &tx).unwrap();
        assert!(screen.show_about);
    }

    #[tokio::test]
    async fn test_admin_login_skips_form_when_signed_in() {
        let mut ctx = AppContext::init_with_store(Config::default(), Arc::new(MemorySessionStore::new()))
            .await
            .unwrap();
        ctx.session.complete_login("admin@autoservice.id").await.unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut screen = LandingScreen::new();
        let action = screen.handle_key_event(key(KeyCode::Char('l')), &mut ctx, &tx).unwrap();
        assert_eq!(action, ScreenAction::NavigateTo(Screen::Dashboard));
    }
}
