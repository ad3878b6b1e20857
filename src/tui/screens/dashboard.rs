//! Admin dashboard

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::context::AppContext;
use crate::format::{format_currency, format_time_ago};
use crate::stats::{self, DashboardStats};
use crate::status;
use crate::tui::app::Screen;
use crate::tui::events::EventSender;
use crate::tui::traits::{ScreenAction, View};
use crate::tui::ui::{key_hints, sparkline, Styles};

const RECENT_LIMIT: usize = 5;

#[derive(Default)]
pub struct DashboardScreen;

impl DashboardScreen {
    pub fn new() -> Self {
        Self
    }

    fn draw_cards(&self, f: &mut Frame, area: Rect, stats: &DashboardStats) {
        let cards = stats.cards();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Length(4)])
            .split(area);
        for (row, chunk) in cards.chunks(4).zip(rows.iter()) {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Ratio(1, 4); 4])
                .split(*chunk);
            for ((title, value), col) in row.iter().zip(cols.iter()) {
                let card = Paragraph::new(vec![
                    Line::styled(value.clone(), Styles::title()),
                    Line::styled(*title, Styles::inactive()),
                ])
                .block(Block::default().borders(Borders::ALL));
                f.render_widget(card, *col);
            }
        }
    }
}

impl View for DashboardScreen {
    fn draw(&mut self, f: &mut Frame, area: Rect, ctx: &AppContext) {
        let data = &ctx.data;
        let stats = DashboardStats::compute(data);
        let now = ctx.now();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(8),
                Constraint::Length(5),
                Constraint::Min(6),
                Constraint::Length(1),
            ])
            .split(area);

        self.draw_cards(f, chunks[0], &stats);

        let charts = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(chunks[1]);

        let revenue: Vec<u64> = data.revenue_series.iter().map(|p| p.value).collect();
        let total: u64 = revenue.iter().sum();
        f.render_widget(
            Paragraph::new(vec![
                Line::styled(sparkline(&revenue), Styles::success()),
                Line::styled(format!("Week total {}", format_currency(total)), Styles::inactive()),
            ])
            .block(Block::default().title("Revenue").borders(Borders::ALL)),
            charts[0],
        );

        let per_day = stats::bookings_per_day(&data.bookings, now);
        let counts: Vec<u64> = per_day.iter().map(|(_, n)| *n).collect();
        let days: String = per_day
            .iter()
            .map(|(day, _)| day.format("%a").to_string().chars().next().unwrap_or(' '))
            .collect();
        f.render_widget(
            Paragraph::new(vec![
                Line::styled(sparkline(&counts), Styles::info()),
                Line::styled(days, Styles::inactive()),
            ])
            .block(Block::default().title("Bookings per Day").borders(Borders::ALL)),
            charts[1],
        );

        let lists = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
            .split(chunks[2]);

        let recent: Vec<ListItem> = stats::recent_bookings(&data.bookings, RECENT_LIMIT)
            .into_iter()
            .map(|b| {
                let state = b.status.as_str();
                ListItem::new(Line::from(vec![
                    Span::raw(format!("{} ", b.booking_number)),
                    Span::raw(format!("{} · {} ", b.customer.name, b.service.name)),
                    Span::styled(status::label(state), Styles::tone(status::tone(state))),
                    Span::styled(format!("  {}", format_time_ago(&b.created_at, &now)), Styles::inactive()),
                ]))
            })
            .collect();
        f.render_widget(
            List::new(recent).block(Block::default().title("Recent Bookings").borders(Borders::ALL)),
            lists[0],
        );

        let top: Vec<ListItem> = stats::top_mechanics(&data.mechanics, RECENT_LIMIT)
            .into_iter()
            .enumerate()
            .map(|(i, m)| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{}. ", i + 1), Styles::title()),
                    Span::raw(m.name.clone()),
                    Span::styled(
                        format!("  ★ {:.1} · {} jobs", m.rating, m.completed_jobs),
                        Styles::inactive(),
                    ),
                ]))
            })
            .collect();
        f.render_widget(
            List::new(top).block(Block::default().title("Top Mechanics").borders(Borders::ALL)),
            lists[1],
        );

        f.render_widget(
            Paragraph::new(key_hints(&[
                ("b", "Bookings"),
                ("m", "Monitoring"),
                ("f", "Finance"),
                ("Esc", "Menu"),
            ])),
            chunks[3],
        );
    }

    fn handle_key_event(
        &mut self,
        key: KeyEvent,
        _ctx: &mut AppContext,
        _events: &EventSender,
    ) -> Result<ScreenAction> {
        let action = match key.code {
            KeyCode::Char('b') => ScreenAction::NavigateTo(Screen::Bookings),
            KeyCode::Char('m') => ScreenAction::NavigateTo(Screen::Monitoring),
            KeyCode::Char('f') => ScreenAction::NavigateTo(Screen::Finance),
            KeyCode::Esc => ScreenAction::FocusSidebar,
            _ => ScreenAction::None,
        };
        Ok(action)
    }

    fn help(&self) -> &'static str {
        "Dashboard:\n\
        b - Open bookings\n\
        m - Open live monitoring\n\
        f - Open finance\n\
        Esc - Back to the menu"
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
    async fn test_shortcuts_open_screens() {
        let mut ctx = AppContext::init_with_store(Config::default(), Arc::new(MemorySessionStore::new()))
            .await
            .unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut screen = DashboardScreen::new();
        let cases = [
            (KeyCode::Char('b'), ScreenAction::NavigateTo(Screen::Bookings)),
            (KeyCode::Char('m'), ScreenAction::NavigateTo(Screen::Monitoring)),
            (KeyCode::Char('f'), ScreenAction::NavigateTo(Screen::Finance)),
            (KeyCode::Esc, ScreenAction::FocusSidebar),
            (KeyCode::Char('x'), ScreenAction::None),
        ];
        for (code, expected) in cases {
            let action = screen
                .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE), &mut ctx, &tx)
                .unwrap();
            assert_eq!(action, expected);
        }
    }
}
