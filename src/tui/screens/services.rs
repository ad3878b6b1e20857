//! Service catalog grouped by category

use std::collections::HashSet;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::context::AppContext;
use crate::models::{filter_catalog, ServiceCategory};
use crate::status;
use crate::tui::components::InputField;
use crate::tui::events::EventSender;
use crate::tui::traits::{step_selection, ScreenAction, View};
use crate::tui::ui::{key_hints, Styles};

/// One visible line of the catalog
#[derive(Debug, Clone, PartialEq)]
enum CatalogRow {
    Category { id: String },
    Service { category: String, index: usize },
}

pub struct ServicesScreen {
    search: InputField,
    searching: bool,
    expanded: HashSet<String>,
    state: ListState,
}

impl Default for ServicesScreen {
    fn default() -> Self {
        Self {
            search: InputField::new("Search services").with_placeholder("Press / to search"),
            searching: false,
            expanded: HashSet::new(),
            state: ListState::default(),
        }
    }
}

impl ServicesScreen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, category: &str) -> bool {
        // a search opens every matching category
        !self.search.value.trim().is_empty() || self.expanded.contains(category)
    }

    fn catalog(&self, ctx: &AppContext) -> Vec<ServiceCategory> {
        filter_catalog(&ctx.data.service_categories, &self.search.value)
    }

    fn rows(&self, catalog: &[ServiceCategory]) -> Vec<CatalogRow> {
        let mut rows = Vec::new();
        for category in catalog {
            rows.push(CatalogRow::Category {
                id: category.id.clone(),
            });
            if self.is_expanded(&category.id) {
                rows.extend((0..category.services.len()).map(|index| CatalogRow::Service {
                    category: category.id.clone(),
                    index,
                }));
            }
        }
        rows
    }

    fn toggle_selected(&mut self, rows: &[CatalogRow]) {
        let Some(row) = self.state.selected().and_then(|i| rows.get(i)) else {
            return;
        };
        let id = match row {
            CatalogRow::Category { id } => id,
            CatalogRow::Service { category, .. } => category,
        };
        if !self.expanded.remove(id) {
            self.expanded.insert(id.clone());
        }
    }

    fn clamp_selection(&mut self, count: usize) {
        match self.state.selected() {
            _ if count == 0 => self.state.select(None),
            None => self.state.select(Some(0)),
            Some(i) if i >= count => self.state.select(Some(count - 1)),
            _ => {}
        }
    }
}

impl View for ServicesScreen {
    fn draw(&mut self, f: &mut Frame, area: Rect, ctx: &AppContext) {
        let catalog = self.catalog(ctx);
        let rows = self.rows(&catalog);
        self.clamp_selection(rows.len());

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(1),
                Constraint::Min(5),
                Constraint::Length(1),
            ])
            .split(area);

        self.search.set_focus(self.searching);
        self.search.render(f, chunks[0]);

        let total: usize = ctx.data.service_categories.iter().map(|c| c.services.len()).sum();
        let active: usize = ctx.data.service_categories.iter().map(|c| c.active_services()).sum();
        f.render_widget(
            Paragraph::new(Line::styled(
                format!(
                    "{} categories · {} services · {} active",
                    ctx.data.service_categories.len(),
                    total,
                    active
                ),
                Styles::inactive(),
            )),
            chunks[1],
        );

        let items: Vec<ListItem> = rows
            .iter()
            .filter_map(|row| match row {
                CatalogRow::Category { id } => {
                    let category = catalog.iter().find(|c| &c.id == id)?;
                    let arrow = if self.is_expanded(id) { "▾" } else { "▸" };
                    Some(ListItem::new(Line::from(vec![
                        Span::styled(format!("{} {}", arrow, category.name), Styles::title()),
                        Span::styled(
                            format!(
                                "  {} services · {} active · {}",
                                category.services.len(),
                                category.active_services(),
                                category.description
                            ),
                            Styles::inactive(),
                        ),
                    ])))
                }
                CatalogRow::Service { category, index } => {
                    let service = catalog.iter().find(|c| &c.id == category)?.services.get(*index)?;
                    let state = if service.is_active { "active" } else { "offline" };
                    Some(ListItem::new(Line::from(vec![
                        Span::raw(format!("    {:<28}", service.name)),
                        Span::raw(format!("{:<22}", service.price_label())),
                        Span::raw(format!("{:<9}", service.duration_label())),
                        Span::styled(status::label(state), Styles::tone(status::tone(state))),
                    ])))
                }
            })
            .collect();

        let list = if items.is_empty() {
            List::new(vec![ListItem::new(Line::styled(
                "No services match your search",
                Styles::inactive(),
            ))])
        } else {
            List::new(items)
        };
        f.render_stateful_widget(
            list.block(
                Block::default()
                    .title("Service Catalog")
                    .borders(Borders::ALL)
                    .border_style(Styles::border(!self.searching)),
            )
            .highlight_style(Styles::selected()),
            chunks[2],
            &mut self.state,
        );

        f.render_widget(
            Paragraph::new(key_hints(&[
                ("/", "Search"),
                ("Enter/Space", "Expand/Collapse"),
                ("+/-", "Expand/Collapse all"),
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
        if self.searching {
            match key.code {
                KeyCode::Esc | KeyCode::Enter | KeyCode::Down => self.searching = false,
                _ => {
                    self.search.handle_key(key);
                }
            }
            return Ok(ScreenAction::None);
        }

        let catalog = self.catalog(ctx);
        let rows = self.rows(&catalog);
        match key.code {
            KeyCode::Char('/') => self.searching = true,
            KeyCode::Up | KeyCode::Char('k') => {
                self.state.select(step_selection(self.state.selected(), rows.len(), false))
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.state.select(step_selection(self.state.selected(), rows.len(), true))
            }
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_selected(&rows),
            KeyCode::Char('+') => {
                self.expanded = catalog.iter().map(|c| c.id.clone()).collect();
            }
            KeyCode::Char('-') => {
                self.expanded.clear();
                self.state.select(Some(0));
            }
            KeyCode::Esc => return Ok(ScreenAction::FocusSidebar),
            _ => {}
        }
        Ok(ScreenAction::None)
    }

    fn on_exit(&mut self) {
        self.searching = false;
    }

    fn captures_text(&self) -> bool {
        self.searching
    }

    fn help(&self) -> &'static str {
        "Services:\n\
        / - Search service name or description\n\
        ↑/↓ - Move\n\
        Enter/Space - Expand or collapse a category\n\
        + / - - Expand or collapse all\n\
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

    #[tokio::test]
    async fn test_expand_and_collapse_category() {
        let mut ctx = AppContext::init_with_store(Config::default(), Arc::new(MemorySessionStore::new()))
            .await
            .unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut screen = ServicesScreen::new();
        let first = ctx.data.service_categories[0].id.clone();
        let collapsed = screen.rows(&screen.catalog(&ctx)).len();
        assert_eq!(collapsed, ctx.data.service_categories.len());

        screen.state.select(Some(0));
        screen.handle_key_event(key(KeyCode::Enter), &mut ctx, &tx).unwrap();
        assert!(screen.is_expanded(&first));
        assert_eq!(
            screen.rows(&screen.catalog(&ctx)).len(),
            collapsed + ctx.data.service_categories[0].services.len()
        );

        screen.handle_key_event(key(KeyCode::Char(' ')), &mut ctx, &tx).unwrap();
        assert!(!screen.is_expanded(&first));
    }

    #[tokio::test]
    async fn test_search_narrows_catalog() {
        let mut ctx = AppContext::init_with_store(Config::default(), Arc::new(MemorySessionStore::new()))
            .await
            .unwrap();
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut screen = ServicesScreen::new();
        screen.handle_key_event(key(KeyCode::Char('/')), &mut ctx, &tx).unwrap();
        for c in "zzzz-no-such-service".chars() {
            screen.handle_key_event(key(KeyCode::Char(c)), &mut ctx, &tx).unwrap();
        }
        assert!(screen.captures_text());
        assert!(screen.catalog(&ctx).is_empty());
    }
}
