//! Compose and review outgoing notifications

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

use crate::context::AppContext;
use crate::listing::Listing;
use crate::models::Notification;
use crate::table::DataTable;
use crate::tui::components::{column_widths, handle_table_key, render_table};
use crate::tui::events::EventSender;
use crate::tui::traits::{ScreenAction, View};
use crate::tui::ui::{key_hints, Styles};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Title,
    Message,
    Target,
    Kind,
    Send,
    History,
}

impl Focus {
    const ORDER: [Focus; 6] = [
        Focus::Title,
        Focus::Message,
        Focus::Target,
        Focus::Kind,
        Focus::Send,
        Focus::History,
    ];

    fn step(self, forward: bool) -> Focus {
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        let n = Self::ORDER.len();
        Self::ORDER[if forward { (i + 1) % n } else { (i + n - 1) % n }]
    }
}

pub struct BroadcastsScreen {
    focus: Focus,
    history: DataTable<Notification>,
}

impl BroadcastsScreen {
    pub fn new(page_size: Option<usize>) -> Self {
        Self {
            focus: Focus::Title,
            history: DataTable::new(Notification::columns())
                .with_page_size(page_size.unwrap_or_else(Notification::page_size))
                .with_empty_message(Notification::empty_message()),
        }
    }

    fn send(&mut self, ctx: &mut AppContext) -> ScreenAction {
        let recipients = ctx.audience_size(ctx.broadcasts.draft.target);
        let now = ctx.now();
        match ctx.broadcasts.send(recipients, now) {
            Some(sent) => {
                let message = format!("'{}' sent to {} recipients", sent.title, recipients);
                self.focus = Focus::Title;
                ScreenAction::success(message)
            }
            None => ScreenAction::error("Title and message are required"),
        }
    }

    fn input_line(&self, label: &str, value: &str, focus: Focus) -> Line<'static> {
        let focused = self.focus == focus;
        let marker = if focused { "> " } else { "  " };
        let cursor = if focused { "▏" } else { "" };
        Line::from(vec![
            Span::styled(
                format!("{}{:<9}", marker, label),
                if focused { Styles::title() } else { Styles::inactive() },
            ),
            Span::raw(format!("{}{}", value, cursor)),
        ])
    }

    fn choice_line(&self, label: &str, value: &str, focus: Focus) -> Line<'static> {
        let focused = self.focus == focus;
        let marker = if focused { "> " } else { "  " };
        Line::from(vec![
            Span::styled(
                format!("{}{:<9}", marker, label),
                if focused { Styles::title() } else { Styles::inactive() },
            ),
            Span::raw(format!("‹ {} ›", value)),
        ])
    }
}

impl View for BroadcastsScreen {
    fn draw(&mut self, f: &mut Frame, area: Rect, ctx: &AppContext) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(9), Constraint::Min(6), Constraint::Length(1)])
            .split(area);

        let draft = &ctx.broadcasts.draft;
        let recipients = ctx.audience_size(draft.target);
        let send_style = match (self.focus == Focus::Send, draft.can_send()) {
            (_, false) => Styles::inactive(),
            (true, true) => Styles::selected(),
            (false, true) => Styles::success(),
        };
        let lines = vec![
            self.input_line("Title", &draft.title, Focus::Title),
            self.input_line("Message", &draft.message, Focus::Message),
            self.choice_line("Target", draft.target.label(), Focus::Target),
            self.choice_line("Type", draft.kind.label(), Focus::Kind),
            Line::styled(format!("  Reaches {} recipients", recipients), Styles::inactive()),
            Line::from(Span::styled("  [ Send Notification ]", send_style)),
        ];
        f.render_widget(
            Paragraph::new(lines).wrap(Wrap { trim: false }).block(
                Block::default()
                    .title("Send Notification")
                    .borders(Borders::ALL)
                    .border_style(Styles::border(self.focus != Focus::History)),
            ),
            chunks[0],
        );

        let sent = ctx.broadcasts.sent();
        self.history.sync(sent);
        let view = self.history.view(sent);
        let widths = column_widths(self.history.columns());
        render_table(
            f,
            chunks[1],
            &view,
            &widths,
            Notification::TITLE,
            self.focus == Focus::History,
        );

        f.render_widget(
            Paragraph::new(key_hints(&[
                ("Tab", "Next field"),
                ("←/→", "Change option"),
                ("Enter", "Send"),
                ("Ctrl+S", "Send from any field"),
                ("Esc", "Menu"),
            ])),
            chunks[2],
        );
    }

    fn handle_key_event(
        &mut self,
        key: KeyEvent,
        ctx: &mut AppContext,
        _events: &EventSender,
    ) -> Result<ScreenAction> {
        if key.code == KeyCode::Char('s') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Ok(self.send(ctx));
        }
        let action = match (self.focus, key.code) {
            (_, KeyCode::Esc) => ScreenAction::FocusSidebar,
            (_, KeyCode::Tab) => {
                self.focus = self.focus.step(true);
                ScreenAction::None
            }
            (_, KeyCode::BackTab) => {
                self.focus = self.focus.step(false);
                ScreenAction::None
            }
            (Focus::Title | Focus::Message, KeyCode::Enter) => {
                self.focus = self.focus.step(true);
                ScreenAction::None
            }
            (Focus::Title, KeyCode::Char(c)) => {
                ctx.broadcasts.draft.title.push(c);
                ScreenAction::None
            }
            (Focus::Message, KeyCode::Char(c)) => {
                ctx.broadcasts.draft.message.push(c);
                ScreenAction::None
            }
            (Focus::Title, KeyCode::Backspace) => {
                ctx.broadcasts.draft.title.pop();
                ScreenAction::None
            }
            (Focus::Message, KeyCode::Backspace) => {
                ctx.broadcasts.draft.message.pop();
                ScreenAction::None
            }
            (Focus::Target, KeyCode::Left | KeyCode::Right) => {
                ctx.broadcasts.draft.cycle_target(key.code == KeyCode::Right);
                ScreenAction::None
            }
            (Focus::Kind, KeyCode::Left | KeyCode::Right) => {
                ctx.broadcasts.draft.cycle_kind(key.code == KeyCode::Right);
                ScreenAction::None
            }
            (Focus::Target | Focus::Kind | Focus::Send, KeyCode::Enter) => self.send(ctx),
            (Focus::History, _) => {
                let sent = ctx.broadcasts.sent().to_vec();
                self.history.sync(&sent);
                handle_table_key(&mut self.history, key, &sent);
                ScreenAction::None
            }
            _ => ScreenAction::None,
        };
        Ok(action)
    }

    fn captures_text(&self) -> bool {
        matches!(self.focus, Focus::Title | Focus::Message)
    }

    fn help(&self) -> &'static str {
        "Broadcasts:\n\
        Tab/Shift+Tab - Move between fields and the history table\n\
        ←/→ - Change target or type\n\
        Enter - Send (title and message are required)\n\
        Ctrl+S - Send from any field\n\
        1-9 - Sort history (when focused)\n\
        Esc - Back"
    }
}
