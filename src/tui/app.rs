//! Main TUI application state and logic

use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tracing::{debug, error, info, warn};

use super::components::{Sidebar, ToastKind, Toasts};
use super::events::{AppEvent, EventSender};
use super::screens::*;
use super::traits::{step_selection, Navigable, ScreenAction, View};
use super::ui::{centered_rect, key_hints, top_right_rect, Styles};
use crate::context::AppContext;
use crate::format::format_time_ago;
use crate::notifications::DROPDOWN_LIMIT;

/// Application screens
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Landing,
    Login,
    BookService,
    Dashboard,
    Bookings,
    Mechanics,
    Workshops,
    WorkshopEditor,
    Users,
    Services,
    Finance,
    Monitoring,
    Notifications,
    Broadcasts,
    Settings,
}

impl Screen {
    pub fn title(&self) -> &'static str {
        match self {
            Screen::Landing => "Home",
            Screen::Login => "Admin Login",
            Screen::BookService => "Book a Service",
            Screen::Dashboard => "Dashboard",
            Screen::Bookings => "Bookings",
            Screen::Mechanics => "Mechanics",
            Screen::Workshops => "Workshops",
            Screen::WorkshopEditor => "Workshop Editor",
            Screen::Users => "Users",
            Screen::Services => "Services",
            Screen::Finance => "Finance",
            Screen::Monitoring => "Monitoring",
            Screen::Notifications => "Notifications",
            Screen::Broadcasts => "Broadcasts",
            Screen::Settings => "Settings",
        }
    }

    /// Admin screens need a signed-in session
    pub fn requires_session(&self) -> bool {
        !matches!(self, Screen::Landing | Screen::Login | Screen::BookService)
    }
}

/// State of every screen
pub struct Screens {
    pub landing: LandingScreen,
    pub login: LoginScreen,
    pub booking: BookingScreen,
    pub dashboard: DashboardScreen,
    pub bookings: BookingsScreen,
    pub mechanics: MechanicsScreen,
    pub workshops: WorkshopsScreen,
    pub workshop_editor: WorkshopEditorScreen,
    pub users: UsersScreen,
    pub services: ServicesScreen,
    pub finance: FinanceScreen,
    pub monitoring: MonitoringScreen,
    pub notifications: NotificationsScreen,
    pub broadcasts: BroadcastsScreen,
    pub settings: SettingsScreen,
}

impl Screens {
    pub fn new(page_size: Option<usize>) -> Self {
        Self {
            landing: LandingScreen::new(),
            login: LoginScreen::new(),
            booking: BookingScreen::new(),
            dashboard: DashboardScreen::new(),
            bookings: BookingsScreen::new(page_size),
            mechanics: MechanicsScreen::new(page_size),
            workshops: WorkshopsScreen::new(page_size),
            workshop_editor: WorkshopEditorScreen::new(),
            users: UsersScreen::new(page_size),
            services: ServicesScreen::new(),
            finance: FinanceScreen::new(page_size),
            monitoring: MonitoringScreen::new(page_size),
            notifications: NotificationsScreen::new(page_size),
            broadcasts: BroadcastsScreen::new(page_size),
            settings: SettingsScreen::new(),
        }
    }

    pub fn view(&mut self, screen: Screen) -> &mut dyn View {
        match screen {
            Screen::Landing => &mut self.landing,
            Screen::Login => &mut self.login,
            Screen::BookService => &mut self.booking,
            Screen::Dashboard => &mut self.dashboard,
            Screen::Bookings => &mut self.bookings,
            Screen::Mechanics => &mut self.mechanics,
            Screen::Workshops => &mut self.workshops,
            Screen::WorkshopEditor => &mut self.workshop_editor,
            Screen::Users => &mut self.users,
            Screen::Services => &mut self.services,
            Screen::Finance => &mut self.finance,
            Screen::Monitoring => &mut self.monitoring,
            Screen::Notifications => &mut self.notifications,
            Screen::Broadcasts => &mut self.broadcasts,
            Screen::Settings => &mut self.settings,
        }
    }
}

/// Main TUI application state
pub struct App {
    pub ctx: AppContext,
    /// Current active screen
    pub current_screen: Screen,
    /// Previous screen for navigation
    pub previous_screen: Option<Screen>,
    pub screens: Screens,
    pub sidebar: Sidebar,
    /// Keys go to the sidebar instead of the content
    pub sidebar_focused: bool,
    pub toasts: Toasts,

    events_tx: EventSender,
    events_rx: UnboundedReceiver<AppEvent>,

    // Global application state
    pub should_quit: bool,
    pub show_help_popup: bool,
    pub show_notification_dropdown: bool,
    dropdown_state: ListState,
}

impl App {
    /// Create a new TUI application; a restored session opens the dashboard
    pub fn new(ctx: AppContext) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let current_screen = if ctx.session.is_authenticated() {
            Screen::Dashboard
        } else {
            Screen::Landing
        };
        let screens = Screens::new(ctx.config.page_size);
        let mut sidebar = Sidebar::new();
        sidebar.follow(current_screen);

        Self {
            ctx,
            current_screen,
            previous_screen: None,
            screens,
            sidebar,
            sidebar_focused: false,
            toasts: Toasts::new(),
            events_tx,
            events_rx,
            should_quit: false,
            show_help_popup: false,
            show_notification_dropdown: false,
            dropdown_state: ListState::default(),
        }
    }

    /// Run the main application loop
    pub async fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<()> {
        let tick = self.ctx.config.tick_rate();
        self.screens
            .view(self.current_screen)
            .on_enter(&self.ctx, &self.events_tx);

        loop {
            // Draw the UI
            terminal.draw(|f| self.draw(f))?;

            // Timer events first so completions land before the next key
            while let Ok(event) = self.events_rx.try_recv() {
                self.handle_app_event(event).await;
            }

            if crossterm::event::poll(tick)? {
                if let Event::Key(key) = crossterm::event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key_event(key).await?;
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        self.screens.view(self.current_screen).on_exit();
        Ok(())
    }

    pub fn events(&self) -> &EventSender {
        &self.events_tx
    }

    /// Deliver a timer event
    pub async fn handle_app_event(&mut self, event: AppEvent) {
        debug!(?event, "App event");
        match event {
            AppEvent::ToastExpired(id) => self.toasts.dismiss(id),
            event => {
                let action = self
                    .screens
                    .view(self.current_screen)
                    .handle_app_event(&event, &mut self.ctx);
                self.apply(action).await;
            }
        }
    }

    /// Handle keyboard input events
    pub async fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        if self.show_help_popup {
            if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('?') | KeyCode::Enter) {
                self.show_help_popup = false;
            }
            return Ok(());
        }
        if self.show_notification_dropdown {
            self.handle_dropdown_key(key).await;
            return Ok(());
        }

        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let admin = self.current_screen.requires_session();

        // Global shortcuts
        match key.code {
            KeyCode::F(1) => {
                self.show_help_popup = true;
                return Ok(());
            }
            KeyCode::Char('c') if ctrl => {
                self.should_quit = true;
                return Ok(());
            }
            KeyCode::Char('t') if ctrl => {
                self.ctx.toggle_theme();
                let message = format!("Switched to {} theme", self.ctx.theme.as_str());
                self.apply(ScreenAction::info(message)).await;
                return Ok(());
            }
            KeyCode::Char('n') if ctrl && admin => {
                self.show_notification_dropdown = true;
                self.dropdown_state.select(Some(0));
                return Ok(());
            }
            KeyCode::Char('l') if ctrl && admin => {
                self.apply(ScreenAction::Logout).await;
                return Ok(());
            }
            _ => {}
        }

        let capturing = !self.sidebar_focused && self.screens.view(self.current_screen).captures_text();
        if !capturing {
            match key.code {
                KeyCode::Char('q') => {
                    self.should_quit = true;
                    return Ok(());
                }
                KeyCode::Char('?') => {
                    self.show_help_popup = true;
                    return Ok(());
                }
                _ => {}
            }
        }

        if admin && self.sidebar_focused {
            self.handle_sidebar_key(key);
            return Ok(());
        }

        let action = self.screens.view(self.current_screen).handle_key_event(
            key,
            &mut self.ctx,
            &self.events_tx,
        )?;
        self.apply(action).await;
        Ok(())
    }

    fn handle_sidebar_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.sidebar.navigate_up(),
            KeyCode::Down | KeyCode::Char('j') => self.sidebar.navigate_down(),
            KeyCode::Home => self.sidebar.navigate_to_first(),
            KeyCode::End => self.sidebar.navigate_to_last(),
            KeyCode::Enter | KeyCode::Right | KeyCode::Tab => {
                if let Some(screen) = self.sidebar.selected_screen() {
                    self.navigate_to_screen(screen);
                }
                self.sidebar_focused = false;
            }
            KeyCode::Esc => {
                self.sidebar.follow(self.current_screen);
                self.sidebar_focused = false;
            }
            _ => {}
        }
    }

    async fn handle_dropdown_key(&mut self, key: KeyEvent) {
        let latest: Vec<String> = self
            .ctx
            .notifications
            .latest(DROPDOWN_LIMIT)
            .iter()
            .map(|n| n.id.clone())
            .collect();
        match key.code {
            KeyCode::Esc => self.show_notification_dropdown = false,
            KeyCode::Char('n') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.show_notification_dropdown = false
            }
            KeyCode::Up => {
                let next = step_selection(self.dropdown_state.selected(), latest.len(), false);
                self.dropdown_state.select(next);
            }
            KeyCode::Down => {
                let next = step_selection(self.dropdown_state.selected(), latest.len(), true);
                self.dropdown_state.select(next);
            }
            KeyCode::Enter => {
                self.show_notification_dropdown = false;
                if let Some(id) = self.dropdown_state.selected().and_then(|i| latest.get(i)) {
                    self.navigate_to_screen(Screen::Notifications);
                    self.screens.notifications.show(id, &mut self.ctx);
                }
            }
            KeyCode::Char('a') => {
                self.show_notification_dropdown = false;
                self.navigate_to_screen(Screen::Notifications);
            }
            KeyCode::Char('m') => {
                let changed = self.ctx.notifications.mark_all_read();
                if changed > 0 {
                    self.apply(ScreenAction::success(format!("Marked {} notifications as read", changed)))
                        .await;
                }
            }
            _ => {}
        }
    }

    /// Carry out what a screen asked for
    pub async fn apply(&mut self, action: ScreenAction) {
        match action {
            ScreenAction::None => {}
            ScreenAction::NavigateTo(screen) => self.navigate_to_screen(screen),
            ScreenAction::NavigateBack => self.go_back(),
            ScreenAction::FocusSidebar => {
                if self.current_screen.requires_session() {
                    self.sidebar.follow(self.current_screen);
                    self.sidebar_focused = true;
                } else {
                    self.navigate_to_screen(Screen::Landing);
                }
            }
            ScreenAction::Quit => self.should_quit = true,
            ScreenAction::Toast(kind, message) => {
                self.toasts.push(kind, message, &self.events_tx, self.ctx.config.toast_duration());
            }
            ScreenAction::Login(email) => match self.ctx.session.complete_login(&email).await {
                Ok(admin) => {
                    self.navigate_to_screen(Screen::Dashboard);
                    self.toast(ToastKind::Success, format!("Welcome back, {}", admin.name));
                }
                Err(e) => {
                    error!("Login failed: {}", e);
                    self.toast(ToastKind::Error, format!("Login failed: {}", e));
                }
            },
            ScreenAction::Logout => {
                if let Err(e) = self.ctx.teardown().await {
                    warn!("Could not clear the stored session: {}", e);
                }
                self.sidebar_focused = false;
                self.show_notification_dropdown = false;
                self.navigate_to_screen(Screen::Login);
                self.toast(ToastKind::Info, "You have been signed out".to_string());
            }
            ScreenAction::EditWorkshop(id) => {
                match self.screens.workshop_editor.open(id.as_deref(), &self.ctx) {
                    Ok(()) => self.navigate_to_screen(Screen::WorkshopEditor),
                    Err(e) => self.toast(ToastKind::Error, e.to_string()),
                }
            }
        }
    }

    fn toast(&mut self, kind: ToastKind, message: String) {
        self.toasts.push(kind, message, &self.events_tx, self.ctx.config.toast_duration());
    }

    /// Navigate to a different screen; admin screens without a session
    /// redirect to the login screen
    pub fn navigate_to_screen(&mut self, screen: Screen) {
        let target = if screen.requires_session() && !self.ctx.session.is_authenticated() {
            warn!("{} requires a session, showing login", screen.title());
            Screen::Login
        } else {
            screen
        };
        if target == self.current_screen {
            return;
        }

        info!("Navigating from {:?} to {:?}", self.current_screen, target);
        self.screens.view(self.current_screen).on_exit();
        self.previous_screen = Some(self.current_screen);
        self.current_screen = target;
        self.sidebar.follow(target);
        self.sidebar_focused = false;
        self.screens.view(target).on_enter(&self.ctx, &self.events_tx);
    }

    /// Go back to previous screen
    pub fn go_back(&mut self) {
        let target = self.previous_screen.unwrap_or(Screen::Landing);
        self.navigate_to_screen(target);
    }

    /// Draw the UI
    pub fn draw(&mut self, f: &mut Frame) {
        let size = f.size();
        f.render_widget(Block::default().style(Styles::base(self.ctx.theme)), size);

        if self.current_screen.requires_session() {
            self.draw_admin(f, size);
        } else {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(1)])
                .split(size);
            self.screens
                .view(self.current_screen)
                .draw(f, chunks[0], &self.ctx);
            f.render_widget(
                Paragraph::new(key_hints(&[("F1", "Help"), ("Ctrl+T", "Theme"), ("Ctrl+C", "Quit")]))
                    .style(Styles::inactive()),
                chunks[1],
            );
        }

        self.toasts.render(f, size);

        if self.show_notification_dropdown {
            self.draw_notification_dropdown(f, size);
        }
        if self.show_help_popup {
            self.draw_help_popup(f, size);
        }
    }

    fn draw_admin(&mut self, f: &mut Frame, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)])
            .split(area);
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(24), Constraint::Min(0)])
            .split(rows[1]);

        self.draw_header(f, rows[0]);
        let unread = self.ctx.notifications.unread_count();
        self.sidebar.render(f, body[0], self.sidebar_focused, unread);
        self.screens
            .view(self.current_screen)
            .draw(f, body[1], &self.ctx);

        let hints = if self.sidebar_focused {
            key_hints(&[("↑/↓", "Menu"), ("Enter", "Open"), ("Esc", "Back to content"), ("q", "Quit")])
        } else {
            key_hints(&[
                ("F1", "Help"),
                ("Esc", "Menu"),
                ("Ctrl+N", "Notifications"),
                ("Ctrl+T", "Theme"),
                ("Ctrl+L", "Logout"),
            ])
        };
        f.render_widget(Paragraph::new(hints).style(Styles::inactive()), rows[2]);
    }

    fn draw_header(&self, f: &mut Frame, area: Rect) {
        let admin = self
            .ctx
            .session
            .user()
            .map(|a| format!("{} ({})", a.name, a.role))
            .unwrap_or_default();
        let unread = self.ctx.notifications.unread_count();
        let bell = if unread > 0 {
            Span::styled(format!("🔔 {}", unread), Styles::error())
        } else {
            Span::styled("🔔 0", Styles::inactive())
        };
        let line = Line::from(vec![
            Span::styled("AutoService Admin", Styles::title()),
            Span::raw(format!("  ›  {}", self.current_screen.title())),
            Span::raw("    "),
            bell,
            Span::raw("    "),
            Span::styled(admin, Styles::info()),
        ]);
        f.render_widget(
            Paragraph::new(line).block(Block::default().borders(Borders::ALL)),
            area,
        );
    }

    fn draw_notification_dropdown(&mut self, f: &mut Frame, area: Rect) {
        let now = self.ctx.now();
        let latest = self.ctx.notifications.latest(DROPDOWN_LIMIT);
        let below_header = Rect::new(area.x, area.y + 2, area.width, area.height.saturating_sub(2));
        let popup = top_right_rect(56, (latest.len() as u16) * 2 + 3, below_header);
        let items: Vec<ListItem> = latest
            .iter()
            .map(|n| {
                let marker = if n.is_read { "  " } else { "● " };
                ListItem::new(vec![
                    Line::from(vec![
                        Span::styled(marker, Styles::info()),
                        Span::raw(n.title.clone()),
                    ]),
                    Line::styled(format!("  {}", format_time_ago(&n.created_at, &now)), Styles::inactive()),
                ])
            })
            .collect();
        let title = format!(
            "Notifications ({} unread) · Enter open · a all · m mark read",
            self.ctx.notifications.unread_count()
        );
        f.render_widget(Clear, popup);
        f.render_stateful_widget(
            List::new(items)
                .block(Block::default().title(title).borders(Borders::ALL).border_style(Styles::active_border()))
                .highlight_style(Styles::selected()),
            popup,
            &mut self.dropdown_state,
        );
    }

    /// Draw help popup with context-sensitive shortcuts
    fn draw_help_popup(&mut self, f: &mut Frame, area: Rect) {
        let popup_area = centered_rect(70, 70, area);
        f.render_widget(Clear, popup_area);

        let help_content = self.get_context_help();
        let help_popup = Paragraph::new(help_content)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .title("Help - Context Shortcuts")
                    .borders(Borders::ALL)
                    .border_style(Styles::warning()),
            );
        f.render_widget(help_popup, popup_area);
    }

    /// Get context-sensitive help content
    fn get_context_help(&mut self) -> String {
        let global_help = if self.current_screen.requires_session() {
            "Global Shortcuts:\n\
            F1 / ? - Toggle this help\n\
            Esc - Focus the menu\n\
            Ctrl+N - Latest notifications\n\
            Ctrl+T - Toggle theme\n\
            Ctrl+L - Sign out\n\
            q / Ctrl+C - Quit\n\n"
        } else {
            "Global Shortcuts:\n\
            F1 / ? - Toggle this help\n\
            Ctrl+T - Toggle theme\n\
            q / Ctrl+C - Quit\n\n"
        };
        let screen_help = self.screens.view(self.current_screen).help();
        format!("{}{}", global_help, screen_help)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::session::MemorySessionStore;
    use std::sync::Arc;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn app() -> App {
        let ctx = AppContext::init_with_store(Config::default(), Arc::new(MemorySessionStore::new()))
            .await
            .unwrap();
        App::new(ctx)
    }

    #[tokio::test]
    async fn test_starts_on_landing_without_session() {
        let app = app().await;
        assert_eq!(app.current_screen, Screen::Landing);
    }

    #[tokio::test]
    async fn test_admin_screens_redirect_to_login() {
        let mut app = app().await;
        app.navigate_to_screen(Screen::Bookings);
        assert_eq!(app.current_screen, Screen::Login);
        assert_eq!(app.previous_screen, Some(Screen::Landing));
    }

    #[tokio::test]
    async fn test_login_and_logout() {
        let mut app = app().await;
        app.navigate_to_screen(Screen::Login);
        app.apply(ScreenAction::Login("admin@autoservice.id".to_string())).await;
        assert_eq!(app.current_screen, Screen::Dashboard);
        assert!(app.ctx.session.is_authenticated());
        assert_eq!(app.toasts.items().len(), 1);

        app.navigate_to_screen(Screen::Users);
        assert_eq!(app.current_screen, Screen::Users);

        app.handle_key_event(KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL))
            .await
            .unwrap();
        assert_eq!(app.current_screen, Screen::Login);
        assert!(!app.ctx.session.is_authenticated());
    }

    #[tokio::test]
    async fn test_q_quits_only_outside_text_input() {
        let mut app = app().await;
        app.navigate_to_screen(Screen::Login);
        app.handle_key_event(key(KeyCode::Char('q'))).await.unwrap();
        assert!(!app.should_quit);

        app.navigate_to_screen(Screen::Landing);
        app.handle_key_event(key(KeyCode::Char('q'))).await.unwrap();
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_sidebar_navigation() {
        let mut app = app().await;
        app.apply(ScreenAction::Login("admin@autoservice.id".to_string())).await;

        app.handle_key_event(key(KeyCode::Esc)).await.unwrap();
        assert!(app.sidebar_focused);
        app.handle_key_event(key(KeyCode::Down)).await.unwrap();
        app.handle_key_event(key(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.current_screen, Screen::Bookings);
        assert!(!app.sidebar_focused);
    }

    #[tokio::test]
    async fn test_help_popup_and_theme() {
        let mut app = app().await;
        app.handle_key_event(key(KeyCode::F(1))).await.unwrap();
        assert!(app.show_help_popup);
        assert!(app.get_context_help().contains("Landing"));
        app.handle_key_event(key(KeyCode::Esc)).await.unwrap();
        assert!(!app.show_help_popup);

        app.handle_key_event(KeyEvent::new(KeyCode::Char('t'), KeyModifiers::CONTROL))
            .await
            .unwrap();
        assert_eq!(app.ctx.theme, crate::context::Theme::Light);
    }

    #[tokio::test]
    async fn test_edit_unknown_workshop_shows_error() {
        let mut app = app().await;
        app.apply(ScreenAction::Login("admin@autoservice.id".to_string())).await;
        app.navigate_to_screen(Screen::Workshops);
        app.apply(ScreenAction::EditWorkshop(Some("ws-404".to_string()))).await;
        assert_eq!(app.current_screen, Screen::Workshops);
        assert!(app
            .toasts
            .items()
            .iter()
            .any(|t| t.kind == ToastKind::Error && t.message.contains("ws-404")));

        app.apply(ScreenAction::EditWorkshop(None)).await;
        assert_eq!(app.current_screen, Screen::WorkshopEditor);
    }

    #[tokio::test]
    async fn test_dropdown_opens_notification() {
        let mut app = app().await;
        app.apply(ScreenAction::Login("admin@autoservice.id".to_string())).await;
        let unread = app.ctx.notifications.unread_count();

        app.handle_key_event(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::CONTROL))
            .await
            .unwrap();
        assert!(app.show_notification_dropdown);
        app.handle_key_event(key(KeyCode::Enter)).await.unwrap();
        assert!(!app.show_notification_dropdown);
        assert_eq!(app.current_screen, Screen::Notifications);
        assert!(app.screens.notifications.detail_id().is_some());
        assert!(app.ctx.notifications.unread_count() <= unread);
    }
}
