//! Live operations monitor

use std::time::Duration;

use anyhow::Result;
use chrono::Duration as ChronoDuration;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use crate::context::AppContext;
use crate::format::format_time_ago;
use crate::listing::{ListQuery, Listing};
use crate::models::{ActivityLog, MechanicStatus};
use crate::stats;
use crate::table::DataTable;
use crate::tui::components::{column_widths, handle_table_key, render_table};
use crate::tui::events::{every, AppEvent, EventSender, Timer};
use crate::tui::traits::{ScreenAction, View};
use crate::tui::ui::{key_hints, Styles};

const CLOCK_PERIOD: Duration = Duration::from_secs(1);

pub struct MonitoringScreen {
    activity: DataTable<ActivityLog>,
    filter: usize,
    /// Seconds since the screen was opened
    elapsed: i64,
    clock: Timer,
}

impl MonitoringScreen {
    pub fn new(page_size: Option<usize>) -> Self {
        Self {
            activity: DataTable::new(ActivityLog::columns())
                .with_page_size(page_size.unwrap_or_else(ActivityLog::page_size))
                .with_empty_message(ActivityLog::empty_message()),
            filter: 0,
            elapsed: 0,
            clock: Timer::default(),
        }
    }

    pub fn is_clock_running(&self) -> bool {
        self.clock.is_pending()
    }

    pub fn elapsed(&self) -> i64 {
        self.elapsed
    }

    fn query(&self) -> ListQuery {
        match self.filter {
            0 => ListQuery::new(),
            i => ActivityLog::status_filters()
                .get(i - 1)
                .map(|(value, _)| ListQuery::new().with_status(value))
                .unwrap_or_default(),
        }
    }

    fn filter_label(&self) -> &'static str {
        match self.filter {
            0 => "All",
            i => ActivityLog::status_filters()
                .get(i - 1)
                .map(|(_, label)| *label)
                .unwrap_or("All"),
        }
    }

    fn filtered(&self, ctx: &AppContext) -> Vec<ActivityLog> {
        let mut logs = self.query().apply(&ctx.data.activity_logs);
        logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        logs
    }
}

impl View for MonitoringScreen {
    fn draw(&mut self, f: &mut Frame, area: Rect, ctx: &AppContext) {
        let data = &ctx.data;
        let now = ctx.now();
        let clock = now + ChronoDuration::seconds(self.elapsed);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(9),
                Constraint::Min(6),
                Constraint::Length(1),
            ])
            .split(area);

        let (online, busy, offline) = stats::mechanic_status_counts(&data.mechanics);
        f.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("● LIVE ", Styles::success()),
                Span::styled(clock.format("%H:%M:%S").to_string(), Styles::title()),
                Span::raw(format!(
                    "   Online {} · Busy {} · Offline {}",
                    online, busy, offline
                )),
            ]))
            .block(Block::default().title("Live Monitoring").borders(Borders::ALL)),
            chunks[0],
        );

        let panels = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Ratio(1, 3); 3])
            .split(chunks[1]);

        let trips: Vec<ListItem> = stats::live_trips(&data.bookings)
            .into_iter()
            .map(|b| {
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled("● ", Styles::info()),
                        Span::raw(format!("{} · {}", b.booking_number, b.mechanic_name())),
                    ]),
                    Line::styled(
                        format!("  {} → {}", b.service.name, b.location.city),
                        Styles::inactive(),
                    ),
                ])
            })
            .collect();
        f.render_widget(
            List::new(trips).block(Block::default().title("Live Trips").borders(Borders::ALL)),
            panels[0],
        );

        let incoming: Vec<ListItem> = stats::incoming_bookings(&data.bookings)
            .into_iter()
            .map(|b| {
                ListItem::new(vec![
                    Line::raw(format!("{} · {}", b.booking_number, b.customer.name)),
                    Line::styled(
                        format!("  {} · {}", b.service.name, format_time_ago(&b.created_at, &now)),
                        Styles::inactive(),
                    ),
                ])
            })
            .collect();
        f.render_widget(
            List::new(incoming).block(Block::default().title("Incoming Bookings").borders(Borders::ALL)),
            panels[1],
        );

        let mechanics: Vec<ListItem> = data
            .mechanics
            .iter()
            .filter(|m| m.status == MechanicStatus::Online)
            .map(|m| {
                ListItem::new(Line::from(vec![
                    Span::styled("● ", Styles::success()),
                    Span::raw(m.name.clone()),
                    Span::styled(format!("  {}", m.city), Styles::inactive()),
                ]))
            })
            .collect();
        f.render_widget(
            List::new(mechanics).block(Block::default().title("Online Mechanics").borders(Borders::ALL)),
            panels[2],
        );

        let logs = self.filtered(ctx);
        self.activity.sync(&logs);
        let view = self.activity.view(&logs);
        let widths = column_widths(self.activity.columns());
        let title = format!("Activity Log · {}", self.filter_label());
        render_table(f, chunks[2], &view, &widths, &title, true);

        f.render_widget(
            Paragraph::new(key_hints(&[
                ("Tab", "Filter events"),
                ("↑/↓", "Select"),
                ("←/→", "Page"),
                ("Esc", "Menu"),
            ])),
            chunks[3],
        );
    }

    fn handle_key_event(
        &mut self,
        key: KeyEvent,
        ctx: &mut AppContext,
        _events: &EventSender,
    ) -> Result<ScreenAction> {
        let count = ActivityLog::status_filters().len() + 1;
        match key.code {
            KeyCode::Tab => self.filter = (self.filter + 1) % count,
            KeyCode::BackTab => self.filter = (self.filter + count - 1) % count,
            KeyCode::Esc => return Ok(ScreenAction::FocusSidebar),
            _ => {
                let logs = self.filtered(ctx);
                self.activity.sync(&logs);
                handle_table_key(&mut self.activity, key, &logs);
            }
        }
        Ok(ScreenAction::None)
    }

    fn handle_app_event(&mut self, event: &AppEvent, _ctx: &mut AppContext) -> ScreenAction {
        if *event == AppEvent::ClockTick && self.clock.is_pending() {
            self.elapsed += 1;
        }
        ScreenAction::None
    }

    fn on_enter(&mut self, _ctx: &AppContext, events: &EventSender) {
        self.elapsed = 0;
        self.clock.set(every(events, CLOCK_PERIOD, AppEvent::ClockTick));
    }

    fn on_exit(&mut self) {
        self.clock.cancel();
    }

    fn help(&self) -> &'static str {
        "Monitoring:\n\
        Tab - Cycle activity filter (all, bookings, mechanics, payments, system)\n\
        ↑/↓ - Select activity\n\
        ←/→ - Page through activity\n\
        1 - Sort by time\n\
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

    #[tokio::test]
    async fn test_clock_runs_only_while_visible() {
        let mut ctx = AppContext::init_with_store(Config::default(), Arc::new(MemorySessionStore::new()))
            .await
            .unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut screen = MonitoringScreen::new(None);

        screen.on_enter(&ctx, &tx);
        assert!(screen.is_clock_running());
        screen.handle_app_event(&AppEvent::ClockTick, &mut ctx);
        assert_eq!(screen.elapsed(), 1);

        screen.on_exit();
        assert!(!screen.is_clock_running());
        screen.handle_app_event(&AppEvent::ClockTick, &mut ctx);
        assert_eq!(screen.elapsed(), 1);
    }

    #[tokio::test]
    async fn test_filter_cycles_event_families() {
        let mut ctx = AppContext::init_with_store(Config::default(), Arc::new(MemorySessionStore::new()))
            .await
            .unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut screen = MonitoringScreen::new(None);
        let all = screen.filtered(&ctx).len();

        screen
            .handle_key_event(KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE), &mut ctx, &tx)
            .unwrap();
        assert_eq!(screen.filter_label(), "Bookings");
        let bookings = screen.filtered(&ctx);
        assert!(bookings.len() <= all);
        assert!(bookings.iter().all(|log| log.kind.as_str().contains("booking")));
    }
}
