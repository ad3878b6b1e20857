//! Data table component for listed records

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell as TuiCell, Paragraph, Row, Table},
    Frame,
};

use crate::table::{Column, DataTable, TableBody, TableRecord, TableView};
use crate::tui::ui::Styles;

/// Outcome of a key press on a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableKey {
    /// Row activated; carries the record key
    Activated(String),
    Handled,
    Ignored,
}

pub fn column_widths<T>(columns: &[Column<T>]) -> Vec<Constraint> {
    columns
        .iter()
        .map(|c| match c.width {
            Some(width) => Constraint::Length(width),
            None => Constraint::Min(8),
        })
        .collect()
}

/// Map a key press onto the table: row selection, paging, header
/// clicks on the digit keys and Enter as row click
pub fn handle_table_key<T: TableRecord>(table: &mut DataTable<T>, key: KeyEvent, data: &[T]) -> TableKey {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => table.select_previous_row(),
        KeyCode::Down | KeyCode::Char('j') => table.select_next_row(),
        KeyCode::Left | KeyCode::PageUp => {
            table.previous_page();
        }
        KeyCode::Right | KeyCode::PageDown => {
            table.next_page();
        }
        KeyCode::Home => {
            table.go_to_page(1);
        }
        KeyCode::End => {
            let last = table.total_pages();
            table.go_to_page(last);
        }
        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            if !table.click_header_at(index) {
                return TableKey::Ignored;
            }
        }
        KeyCode::Enter => {
            return match table.activate_selected(data) {
                Some(key) => TableKey::Activated(key),
                None => TableKey::Ignored,
            };
        }
        _ => return TableKey::Ignored,
    }
    TableKey::Handled
}

/// Draw one table frame with its pagination line
pub fn render_table(
    f: &mut Frame,
    area: Rect,
    view: &TableView,
    widths: &[Constraint],
    title: &str,
    focused: bool,
) {
    let block = Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_style(Styles::border(focused));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    let header = Row::new(
        view.headers
            .iter()
            .enumerate()
            .map(|(i, h)| {
                let label = if h.sortable {
                    format!("{}·{}", i + 1, h.label())
                } else {
                    h.label()
                };
                TuiCell::from(label)
            })
            .collect::<Vec<_>>(),
    )
    .style(Styles::header());

    let rows: Vec<Row> = match view.body {
        TableBody::Rows(ref rows) => rows
            .iter()
            .map(|row| {
                let cells: Vec<TuiCell> = row
                    .cells
                    .iter()
                    .map(|cell| match cell.tone {
                        Some(tone) => {
                            let marker = if cell.live { "● " } else { "" };
                            TuiCell::from(Span::styled(
                                format!("{}{}", marker, cell.text),
                                Styles::tone(tone),
                            ))
                        }
                        None => TuiCell::from(cell.text.clone()),
                    })
                    .collect();
                let style = if row.selected {
                    Styles::selected()
                } else {
                    Styles::default()
                };
                Row::new(cells).style(style)
            })
            .collect(),
        TableBody::Loading { rows, columns } => (0..rows)
            .map(|_| {
                Row::new((0..columns).map(|_| TuiCell::from("░░░░░░")).collect::<Vec<_>>())
                    .style(Styles::inactive())
            })
            .collect(),
        TableBody::Empty(_) => Vec::new(),
    };

    let table = Table::new(rows, widths.to_vec()).header(header);
    f.render_widget(table, chunks[0]);

    if let TableBody::Empty(ref message) = view.body {
        if chunks[0].height > 2 {
            let placeholder = Rect::new(chunks[0].x, chunks[0].y + 2, chunks[0].width, 1);
            f.render_widget(
                Paragraph::new(message.clone())
                    .style(Styles::inactive())
                    .alignment(ratatui::layout::Alignment::Center),
                placeholder,
            );
        }
    }

    if let Some(ref pagination) = view.pagination {
        let mut spans = vec![Span::styled(pagination.summary(), Styles::inactive()), Span::raw("  ")];
        spans.push(Span::styled(
            "‹ Prev ",
            if pagination.can_previous { Styles::default() } else { Styles::inactive() },
        ));
        for page in &pagination.pages {
            let style = if *page == pagination.current_page {
                Styles::selected()
            } else {
                Styles::default()
            };
            spans.push(Span::styled(format!(" {} ", page), style));
        }
        spans.push(Span::styled(
            " Next ›",
            if pagination.can_next { Styles::default() } else { Styles::inactive() },
        ));
        f.render_widget(Paragraph::new(Line::from(spans)), chunks[1]);
    }
}
