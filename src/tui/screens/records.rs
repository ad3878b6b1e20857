//! List/detail screens for the record collections
//!
//! [`ListScreen`] handles search, status tabs, the data table and the detail
//! panel for any [`Listing`]. Each record type plugs its data source and
//! extra behavior in through [`RecordView`].

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use tracing::{debug, warn};

use crate::context::AppContext;
use crate::fixtures::find;
use crate::format::{format_currency, format_date_time, format_time_ago};
use crate::listing::{status_counts, ListQuery, Listing};
use crate::models::{AdminNotification, Booking, Mechanic, Transaction, User, Workshop};
use crate::stats::{self, FinanceStats};
use crate::status;
use crate::table::DataTable;
use crate::tui::components::{column_widths, handle_table_key, render_table, InputField, TableKey};
use crate::tui::events::EventSender;
use crate::tui::traits::{ScreenAction, View};
use crate::tui::ui::{field_line, key_hints, Styles};

/// Per-collection hooks of a [`ListScreen`]
pub trait RecordView: Listing + Sized {
    fn records(ctx: &AppContext) -> &[Self];

    /// Summary cards above the table
    fn summary(_ctx: &AppContext) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Lines appended to the detail panel
    fn detail_extras(&self, _ctx: &AppContext) -> Vec<Line<'static>> {
        Vec::new()
    }

    /// Single-key actions; `selected` is the highlighted or opened record
    fn record_action(_key: char, _selected: Option<&Self>, _ctx: &mut AppContext) -> Option<ScreenAction> {
        None
    }

    /// Extra footer hints for [`RecordView::record_action`] keys
    fn action_hints() -> &'static [(&'static str, &'static str)] {
        &[]
    }

    /// Called when a record is opened in the detail panel
    fn on_open(_id: &str, _ctx: &mut AppContext) {}

    fn help() -> &'static str;
}

pub struct ListScreen<T: RecordView> {
    table: DataTable<T>,
    query: ListQuery,
    search: InputField,
    searching: bool,
    tab: usize,
    detail: Option<String>,
}

impl<T: RecordView> ListScreen<T> {
    /// `page_size` overrides the listing's own page size
    pub fn new(page_size: Option<usize>) -> Self {
        let table = DataTable::new(T::columns())
            .with_page_size(page_size.unwrap_or_else(T::page_size))
            .with_empty_message(T::empty_message());
        Self {
            table,
            query: ListQuery::new(),
            search: InputField::new("Search").with_placeholder("Press / to search"),
            searching: false,
            tab: 0,
            detail: None,
        }
    }

    /// Open the detail panel for `id`
    pub fn show(&mut self, id: &str, ctx: &mut AppContext) {
        T::on_open(id, ctx);
        debug!("Opening {} {}", T::KIND, id);
        self.detail = Some(id.to_string());
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn detail_id(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    fn filtered(&self, ctx: &AppContext) -> Vec<T> {
        self.query.apply(T::records(ctx))
    }

    fn set_tab(&mut self, tab: usize) {
        let count = T::status_filters().len() + 1;
        self.tab = tab % count;
        self.query.status = match self.tab {
            0 => None,
            i => T::status_filters().get(i - 1).map(|(value, _)| value.to_string()),
        };
    }

    fn clear_filters(&mut self) {
        self.query.reset();
        self.search.clear();
        self.tab = 0;
    }

    fn draw_summary(&self, f: &mut Frame, area: Rect, cards: &[(&'static str, String)]) {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, cards.len() as u32); cards.len()])
            .split(area);
        for ((title, value), col) in cards.iter().zip(cols.iter()) {
            f.render_widget(
                Paragraph::new(vec![
                    Line::styled(value.clone(), Styles::title()),
                    Line::styled(*title, Styles::inactive()),
                ])
                .block(Block::default().borders(Borders::ALL)),
                *col,
            );
        }
    }

    fn tabs_line(&self, ctx: &AppContext) -> Line<'static> {
        let mut spans = Vec::new();
        for (i, (_, label, count)) in status_counts(T::records(ctx)).into_iter().enumerate() {
            if i > 0 {
                spans.push(Span::styled(" | ", Styles::inactive()));
            }
            let style = if i == self.tab { Styles::selected() } else { Styles::default() };
            spans.push(Span::styled(format!(" {} ({}) ", label, count), style));
        }
        Line::from(spans)
    }

    fn draw_list(&mut self, f: &mut Frame, area: Rect, ctx: &AppContext) {
        let filtered = self.filtered(ctx);
        self.table.sync(&filtered);

        let cards = T::summary(ctx);
        let has_tabs = !T::status_filters().is_empty();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(if cards.is_empty() { 0 } else { 4 }),
                Constraint::Length(3),
                Constraint::Length(if has_tabs { 1 } else { 0 }),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(area);

        if !cards.is_empty() {
            self.draw_summary(f, chunks[0], &cards);
        }
        self.search.set_focus(self.searching);
        self.search.render(f, chunks[1]);
        if has_tabs {
            f.render_widget(Paragraph::new(self.tabs_line(ctx)), chunks[2]);
        }

        let view = self.table.view(&filtered);
        let widths = column_widths(self.table.columns());
        render_table(f, chunks[3], &view, &widths, T::TITLE, !self.searching);

        let mut hints = vec![("/", "Search"), ("Enter", "Details"), ("1-9", "Sort"), ("←/→", "Page")];
        if has_tabs {
            hints.push(("Tab", "Filter"));
        }
        if self.query.is_filtered() {
            hints.push(("c", "Clear"));
        }
        hints.extend_from_slice(T::action_hints());
        f.render_widget(Paragraph::new(key_hints(&hints)), chunks[4]);
    }

    fn draw_detail(&self, f: &mut Frame, area: Rect, ctx: &AppContext, id: &str) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(1)])
            .split(area);

        let body = match find(T::records(ctx), id) {
            Ok(record) => {
                let mut lines: Vec<Line> = record
                    .detail()
                    .into_iter()
                    .map(|(label, value)| field_line(label, &value, 20))
                    .collect();
                let extras = record.detail_extras(ctx);
                if !extras.is_empty() {
                    lines.push(Line::raw(""));
                    lines.extend(extras);
                }
                Paragraph::new(lines)
                    .wrap(Wrap { trim: false })
                    .block(
                        Block::default()
                            .title(format!("{} {}", T::KIND, id))
                            .borders(Borders::ALL)
                            .border_style(Styles::active_border()),
                    )
            }
            Err(e) => Paragraph::new(vec![
                Line::styled(format!("{} not found", T::KIND), Styles::error()),
                Line::raw(""),
                Line::styled(e.to_string(), Styles::inactive()),
                Line::raw("Press Esc to go back to the list."),
            ])
            .block(Block::default().title(T::TITLE).borders(Borders::ALL)),
        };
        f.render_widget(body, chunks[0]);

        let mut hints = vec![("Esc", "Back to list")];
        hints.extend_from_slice(T::action_hints());
        f.render_widget(Paragraph::new(key_hints(&hints)), chunks[1]);
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc | KeyCode::Enter | KeyCode::Down => self.searching = false,
            _ => {
                if self.search.handle_key(key) {
                    self.query.search = self.search.value.clone();
                }
            }
        }
    }

    fn handle_detail_key(&mut self, key: KeyEvent, ctx: &mut AppContext) -> ScreenAction {
        match key.code {
            KeyCode::Esc | KeyCode::Backspace => {
                self.detail = None;
                ScreenAction::None
            }
            KeyCode::Char(c) => {
                let id = self.detail.clone().unwrap_or_default();
                let selected = find(T::records(ctx), &id).ok().cloned();
                T::record_action(c, selected.as_ref(), ctx).unwrap_or(ScreenAction::None)
            }
            _ => ScreenAction::None,
        }
    }

    fn handle_list_key(&mut self, key: KeyEvent, ctx: &mut AppContext) -> ScreenAction {
        let filtered = self.filtered(ctx);
        self.table.sync(&filtered);

        match key.code {
            KeyCode::Char('/') => {
                self.searching = true;
                return ScreenAction::None;
            }
            KeyCode::Tab if !T::status_filters().is_empty() => {
                self.set_tab(self.tab + 1);
                return ScreenAction::None;
            }
            KeyCode::BackTab if !T::status_filters().is_empty() => {
                let count = T::status_filters().len() + 1;
                self.set_tab(self.tab + count - 1);
                return ScreenAction::None;
            }
            KeyCode::Char('c') if self.query.is_filtered() => {
                self.clear_filters();
                return ScreenAction::None;
            }
            KeyCode::Esc => return ScreenAction::FocusSidebar,
            _ => {}
        }

        match handle_table_key(&mut self.table, key, &filtered) {
            TableKey::Activated(id) => {
                self.show(&id, ctx);
                ScreenAction::None
            }
            TableKey::Handled => ScreenAction::None,
            TableKey::Ignored => match key.code {
                KeyCode::Char(c) => {
                    let selected = self.table.selected_record(&filtered);
                    T::record_action(c, selected, ctx).unwrap_or(ScreenAction::None)
                }
                _ => ScreenAction::None,
            },
        }
    }
}

impl<T: RecordView> View for ListScreen<T> {
    fn draw(&mut self, f: &mut Frame, area: Rect, ctx: &AppContext) {
        match self.detail.clone() {
            Some(id) => self.draw_detail(f, area, ctx, &id),
            None => self.draw_list(f, area, ctx),
        }
    }

    fn handle_key_event(
        &mut self,
        key: KeyEvent,
        ctx: &mut AppContext,
        _events: &EventSender,
    ) -> Result<ScreenAction> {
        let action = if self.searching {
            self.handle_search_key(key);
            ScreenAction::None
        } else if self.detail.is_some() {
            self.handle_detail_key(key, ctx)
        } else {
            self.handle_list_key(key, ctx)
        };
        Ok(action)
    }

    fn on_exit(&mut self) {
        self.searching = false;
    }

    fn captures_text(&self) -> bool {
        self.searching
    }

    fn help(&self) -> &'static str {
        T::help()
    }
}

pub type BookingsScreen = ListScreen<Booking>;
pub type MechanicsScreen = ListScreen<Mechanic>;
pub type WorkshopsScreen = ListScreen<Workshop>;
pub type UsersScreen = ListScreen<User>;
pub type FinanceScreen = ListScreen<Transaction>;
pub type NotificationsScreen = ListScreen<AdminNotification>;

impl RecordView for Booking {
    fn records(ctx: &AppContext) -> &[Self] {
        &ctx.data.bookings
    }

    fn summary(ctx: &AppContext) -> Vec<(&'static str, String)> {
        let bookings = &ctx.data.bookings;
        let active = bookings.iter().filter(|b| b.is_active()).count();
        let volume: u64 = bookings.iter().map(|b| b.amount).sum();
        vec![
            ("Total Bookings", bookings.len().to_string()),
            ("Active", active.to_string()),
            ("Booking Volume", format_currency(volume)),
        ]
    }

    fn detail_extras(&self, _ctx: &AppContext) -> Vec<Line<'static>> {
        let mut lines = vec![Line::styled("Status Timeline", Styles::header())];
        for step in self.timeline() {
            let (marker, style) = if step.done {
                ("●", Styles::success())
            } else {
                ("○", Styles::inactive())
            };
            let time = match step.time {
                Some(ts) if step.done => format_date_time(&ts),
                _ => "-".to_string(),
            };
            lines.push(Line::from(vec![
                Span::styled(format!("  {} ", marker), style),
                Span::raw(format!("{:<18}", step.label)),
                Span::styled(time, Styles::inactive()),
            ]));
        }
        if let Some(ref notes) = self.notes {
            lines.push(Line::raw(""));
            lines.push(field_line("Notes", notes, 20));
        }
        lines
    }

    fn help() -> &'static str {
        "Bookings:\n\
        / - Search booking number, customer, service, mechanic or city\n\
        Tab - Cycle status filter\n\
        1-9 - Sort by column\n\
        ←/→ - Previous/next page\n\
        Enter - Booking details and timeline\n\
        c - Clear filters\n\
        Esc - Back"
    }
}

impl RecordView for Mechanic {
    fn records(ctx: &AppContext) -> &[Self] {
        &ctx.data.mechanics
    }

    fn summary(ctx: &AppContext) -> Vec<(&'static str, String)> {
        let (online, busy, offline) = stats::mechanic_status_counts(&ctx.data.mechanics);
        vec![
            ("Online", online.to_string()),
            ("Busy", busy.to_string()),
            ("Offline", offline.to_string()),
        ]
    }

    fn detail_extras(&self, ctx: &AppContext) -> Vec<Line<'static>> {
        let jobs = ctx.data.bookings_for_mechanic(&self.id);
        let mut lines = vec![Line::styled(
            format!("Recent Jobs ({})", jobs.len()),
            Styles::header(),
        )];
        let now = ctx.now();
        for booking in jobs.into_iter().take(5) {
            let state = booking.status.as_str();
            lines.push(Line::from(vec![
                Span::raw(format!("  {} {} ", booking.booking_number, booking.service.name)),
                Span::styled(status::label(state), Styles::tone(status::tone(state))),
                Span::styled(format!("  {}", format_time_ago(&booking.created_at, &now)), Styles::inactive()),
            ]));
        }
        lines
    }

    fn help() -> &'static str {
        "Mechanics:\n\
        / - Search name, email, phone, city or specialization\n\
        Tab - Cycle status filter\n\
        1-9 - Sort by column\n\
        Enter - Mechanic profile and recent jobs\n\
        Esc - Back"
    }
}

impl RecordView for Workshop {
    fn records(ctx: &AppContext) -> &[Self] {
        &ctx.data.workshops
    }

    fn summary(ctx: &AppContext) -> Vec<(&'static str, String)> {
        let workshops = &ctx.data.workshops;
        let active = workshops.iter().filter(|w| w.is_active).count();
        let jobs: u64 = workshops.iter().map(|w| w.total_jobs as u64).sum();
        vec![
            ("Workshops", workshops.len().to_string()),
            ("Active", active.to_string()),
            ("Total Jobs", jobs.to_string()),
        ]
    }

    fn record_action(key: char, selected: Option<&Self>, _ctx: &mut AppContext) -> Option<ScreenAction> {
        match key {
            'a' => Some(ScreenAction::EditWorkshop(None)),
            'e' => selected.map(|w| ScreenAction::EditWorkshop(Some(w.id.clone()))),
            _ => None,
        }
    }

    fn action_hints() -> &'static [(&'static str, &'static str)] {
        &[("a", "Add"), ("e", "Edit")]
    }

    fn help() -> &'static str {
        "Workshops:\n\
        / - Search name, city, address or service\n\
        Enter - Workshop details\n\
        a - Add a workshop\n\
        e - Edit the selected workshop\n\
        Esc - Back"
    }
}

impl RecordView for User {
    fn records(ctx: &AppContext) -> &[Self] {
        &ctx.data.users
    }

    fn summary(ctx: &AppContext) -> Vec<(&'static str, String)> {
        let users = &ctx.data.users;
        let blocked = users.iter().filter(|u| u.is_blocked).count();
        vec![
            ("Total Users", users.len().to_string()),
            ("Active", (users.len() - blocked).to_string()),
            ("Blocked", blocked.to_string()),
        ]
    }

    fn record_action(key: char, selected: Option<&Self>, ctx: &mut AppContext) -> Option<ScreenAction> {
        if key != 'b' {
            return None;
        }
        let user = selected?;
        Some(match ctx.toggle_user_block(&user.id) {
            Ok(true) => ScreenAction::info(format!("{} has been blocked", user.name)),
            Ok(false) => ScreenAction::success(format!("{} has been unblocked", user.name)),
            Err(e) => {
                warn!("Block toggle failed: {}", e);
                ScreenAction::error(e.to_string())
            }
        })
    }

    fn action_hints() -> &'static [(&'static str, &'static str)] {
        &[("b", "Block/Unblock")]
    }

    fn help() -> &'static str {
        "Users:\n\
        / - Search name, email, phone or city\n\
        Enter - User details\n\
        b - Block or unblock the selected user\n\
        Esc - Back"
    }
}

impl RecordView for Transaction {
    fn records(ctx: &AppContext) -> &[Self] {
        &ctx.data.transactions
    }

    fn summary(ctx: &AppContext) -> Vec<(&'static str, String)> {
        let finance = FinanceStats::compute(&ctx.data.transactions);
        finance.cards().into_iter().skip(1).take(4).collect()
    }

    fn detail_extras(&self, ctx: &AppContext) -> Vec<Line<'static>> {
        let Some(ref booking_id) = self.booking_id else {
            return Vec::new();
        };
        match ctx.data.booking(booking_id) {
            Ok(booking) => vec![
                Line::styled("Related Booking", Styles::header()),
                field_line("Booking", &booking.booking_number, 20),
                field_line("Customer", &booking.customer.name, 20),
                field_line("Service", &booking.service.name, 20),
            ],
            Err(_) => vec![Line::styled(
                format!("Booking {} is no longer available", booking_id),
                Styles::inactive(),
            )],
        }
    }

    fn help() -> &'static str {
        "Finance:\n\
        / - Search transaction id or description\n\
        Tab - Cycle transaction type\n\
        1-9 - Sort by column\n\
        Enter - Transaction details\n\
        Esc - Back"
    }
}

impl RecordView for AdminNotification {
    fn records(ctx: &AppContext) -> &[Self] {
        ctx.notifications.items()
    }

    fn summary(ctx: &AppContext) -> Vec<(&'static str, String)> {
        vec![
            ("Notifications", ctx.notifications.items().len().to_string()),
            ("Unread", ctx.notifications.unread_count().to_string()),
        ]
    }

    fn record_action(key: char, _selected: Option<&Self>, ctx: &mut AppContext) -> Option<ScreenAction> {
        if key != 'm' {
            return None;
        }
        Some(match ctx.notifications.mark_all_read() {
            0 => ScreenAction::info("No unread notifications"),
            n => ScreenAction::success(format!("Marked {} notifications as read", n)),
        })
    }

    fn action_hints() -> &'static [(&'static str, &'static str)] {
        &[("m", "Mark all read")]
    }

    fn on_open(id: &str, ctx: &mut AppContext) {
        if let Err(e) = ctx.notifications.open(id) {
            debug!("Cannot mark notification read: {}", e);
        }
    }

    fn help() -> &'static str {
        "Notifications:\n\
        / - Search title or message\n\
        Tab - Cycle all / unread / type\n\
        Enter - Open and mark as read\n\
        m - Mark all as read\n\
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

    async fn context() -> AppContext {
        AppContext::init_with_store(Config::default(), Arc::new(MemorySessionStore::new()))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_search_and_status_tabs_build_query() {
        let mut ctx = context().await;
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut screen = BookingsScreen::new(None);

        screen.handle_key_event(key(KeyCode::Char('/')), &mut ctx, &tx).unwrap();
        assert!(screen.captures_text());
        for c in "bk".chars() {
            screen.handle_key_event(key(KeyCode::Char(c)), &mut ctx, &tx).unwrap();
        }
        screen.handle_key_event(key(KeyCode::Enter), &mut ctx, &tx).unwrap();
        assert!(!screen.captures_text());
        assert_eq!(screen.query().search, "bk");

        screen.handle_key_event(key(KeyCode::Tab), &mut ctx, &tx).unwrap();
        assert_eq!(screen.query().status.as_deref(), Some("pending"));
        screen.handle_key_event(key(KeyCode::BackTab), &mut ctx, &tx).unwrap();
        assert_eq!(screen.query().status, None);

        screen.handle_key_event(key(KeyCode::Char('c')), &mut ctx, &tx).unwrap();
        assert!(!screen.query().is_filtered());
    }

    #[tokio::test]
    async fn test_enter_opens_detail_and_esc_closes() {
        let mut ctx = context().await;
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut screen = MechanicsScreen::new(None);

        screen.handle_key_event(key(KeyCode::Enter), &mut ctx, &tx).unwrap();
        let opened = screen.detail_id().map(str::to_string);
        assert!(opened.is_some());
        screen.handle_key_event(key(KeyCode::Esc), &mut ctx, &tx).unwrap();
        assert_eq!(screen.detail_id(), None);

        let action = screen.handle_key_event(key(KeyCode::Esc), &mut ctx, &tx).unwrap();
        assert_eq!(action, ScreenAction::FocusSidebar);
    }

    #[tokio::test]
    async fn test_user_block_toggle_from_list() {
        let mut ctx = context().await;
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut screen = UsersScreen::new(None);

        let first = ctx.data.users[0].clone();
        let action = screen.handle_key_event(key(KeyCode::Char('b')), &mut ctx, &tx).unwrap();
        assert!(matches!(action, ScreenAction::Toast(..)));
        assert_ne!(ctx.data.users[0].is_blocked, first.is_blocked);
    }

    #[tokio::test]
    async fn test_opening_notification_marks_it_read() {
        let mut ctx = context().await;
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut screen = NotificationsScreen::new(None);
        let unread = ctx
            .notifications
            .items()
            .iter()
            .find(|n| !n.is_read)
            .map(|n| n.id.clone())
            .unwrap();
        let before = ctx.notifications.unread_count();

        screen.show(&unread, &mut ctx);
        assert_eq!(ctx.notifications.unread_count(), before - 1);

        screen.handle_key_event(key(KeyCode::Esc), &mut ctx, &tx).unwrap();
        screen.handle_key_event(key(KeyCode::Char('m')), &mut ctx, &tx).unwrap();
        assert_eq!(ctx.notifications.unread_count(), 0);
    }

    #[tokio::test]
    async fn test_workshop_actions_open_editor() {
        let mut ctx = context().await;
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut screen = WorkshopsScreen::new(Some(3));

        let add = screen.handle_key_event(key(KeyCode::Char('a')), &mut ctx, &tx).unwrap();
        assert_eq!(add, ScreenAction::EditWorkshop(None));
        let edit = screen.handle_key_event(key(KeyCode::Char('e')), &mut ctx, &tx).unwrap();
        assert!(matches!(edit, ScreenAction::EditWorkshop(Some(_))));
    }

    #[tokio::test]
    async fn test_unknown_detail_shows_not_found_lookup() {
        let ctx = context().await;
        assert!(find(Booking::records(&ctx), "bk-404").is_err());
        assert_eq!(
            find(Booking::records(&ctx), "bk-404").unwrap_err().to_string(),
            "Booking 'bk-404' not found"
        );
    }
}
