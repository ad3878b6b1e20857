//! Generic sortable, paginated table over in-memory records
//!
//! [`DataTable`] holds only view state (sort column and direction, current
//! page, selected row). Records are passed in by reference on every call, so
//! the same slice can back several views at once.

pub mod column;

use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

pub use column::{CellValue, Column, ColumnKind, TableRecord};

use crate::status::{self, Tone};

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const SKELETON_ROWS: usize = 5;
pub const MAX_PAGE_BUTTONS: usize = 5;
pub const DEFAULT_EMPTY_MESSAGE: &str = "No data available";

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn toggled(self) -> Self {
        match self {
            SortOrder::Ascending => SortOrder::Descending,
            SortOrder::Descending => SortOrder::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortOrder::Ascending => "▲",
            SortOrder::Descending => "▼",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortState {
    pub key: String,
    pub order: SortOrder,
}

/// Callback invoked with the record behind a clicked row
pub type RowClickHandler<T> = Box<dyn FnMut(&T) + Send>;

/// Compare two strings the way a user expects a name list to be ordered.
/// Base letters decide first, ignoring accents and case. Then unaccented
/// before accented, then lowercase before uppercase.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| {
            a.nfd()
                .flat_map(char::to_lowercase)
                .cmp(b.nfd().flat_map(char::to_lowercase))
        })
        .then_with(|| {
            a.nfd()
                .map(char::is_uppercase)
                .cmp(b.nfd().map(char::is_uppercase))
        })
}

fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
}

/// Ordering of two cells. Mixed or missing values compare equal so a stable
/// sort leaves them where they were.
pub fn compare_cells(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Text(a), CellValue::Text(b)) => locale_compare(a, b),
        (CellValue::Number(a), CellValue::Number(b)) => {
            a.partial_cmp(b).unwrap_or(Ordering::Equal)
        }
        _ => Ordering::Equal,
    }
}

/// Header cell as it should be drawn
#[derive(Debug, Clone, PartialEq)]
pub struct HeaderCell {
    pub key: &'static str,
    pub title: &'static str,
    pub sortable: bool,
    pub sort: Option<SortOrder>,
}

impl HeaderCell {
    pub fn label(&self) -> String {
        match self.sort {
            Some(order) => format!("{} {}", self.title, order.arrow()),
            None => self.title.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    pub tone: Option<Tone>,
    /// Badge of a live status, drawn with a pulse marker
    pub live: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub key: String,
    pub cells: Vec<Cell>,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableBody {
    /// Skeleton placeholder while data is loading
    Loading { rows: usize, columns: usize },
    /// Single placeholder row with this message
    Empty(String),
    Rows(Vec<TableRow>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaginationView {
    pub current_page: usize,
    pub total_pages: usize,
    pub first_entry: usize,
    pub last_entry: usize,
    pub total_entries: usize,
    pub pages: Vec<usize>,
    pub can_previous: bool,
    pub can_next: bool,
}

impl PaginationView {
    pub fn summary(&self) -> String {
        format!(
            "Showing {} to {} of {} entries",
            self.first_entry, self.last_entry, self.total_entries
        )
    }
}

/// Everything needed to draw one frame of the table
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub headers: Vec<HeaderCell>,
    pub body: TableBody,
    pub pagination: Option<PaginationView>,
}

/// View state of a table over records of type `T`
pub struct DataTable<T> {
    columns: Vec<Column<T>>,
    page_size: usize,
    empty_message: String,
    loading: bool,
    sort: Option<SortState>,
    current_page: usize,
    selected: Option<usize>,
    record_count: usize,
    fingerprint: Option<u64>,
    on_row_click: Option<RowClickHandler<T>>,
}

impl<T: TableRecord> DataTable<T> {
    pub fn new(columns: Vec<Column<T>>) -> Self {
        Self {
            columns,
            page_size: DEFAULT_PAGE_SIZE,
            empty_message: DEFAULT_EMPTY_MESSAGE.to_string(),
            loading: false,
            sort: None,
            current_page: 1,
            selected: None,
            record_count: 0,
            fingerprint: None,
            on_row_click: None,
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_empty_message(mut self, message: &str) -> Self {
        self.empty_message = message.to_string();
        self
    }

    pub fn with_row_click<F>(mut self, handler: F) -> Self
    where
        F: FnMut(&T) + Send + 'static,
    {
        self.on_row_click = Some(Box::new(handler));
        self
    }

    pub fn columns(&self) -> &[Column<T>] {
        &self.columns
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn sort_state(&self) -> Option<&SortState> {
        self.sort.as_ref()
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn selected_row(&self) -> Option<usize> {
        self.selected
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Tell the table which record set it is showing. When the set differs
    /// from the previous one the table goes back to page 1.
    ///
    /// Returns `true` when the set changed.
    pub fn sync(&mut self, data: &[T]) -> bool {
        let mut hasher = DefaultHasher::new();
        data.len().hash(&mut hasher);
        for record in data {
            record.record_key().hash(&mut hasher);
        }
        let fingerprint = hasher.finish();
        self.record_count = data.len();

        if self.fingerprint == Some(fingerprint) {
            return false;
        }
        self.fingerprint = Some(fingerprint);
        self.current_page = 1;
        self.selected = if data.is_empty() { None } else { Some(0) };
        true
    }

    /// Header click. Non-sortable or unknown columns are ignored.
    pub fn click_header(&mut self, key: &str) -> bool {
        let Some(column) = self.columns.iter().find(|c| c.key == key) else {
            return false;
        };
        if !column.sortable {
            return false;
        }

        self.sort = Some(match self.sort.take() {
            Some(state) if state.key == key => SortState {
                key: state.key,
                order: state.order.toggled(),
            },
            _ => SortState {
                key: key.to_string(),
                order: SortOrder::Ascending,
            },
        });
        true
    }

    /// Header click on the n-th column
    pub fn click_header_at(&mut self, index: usize) -> bool {
        match self.columns.get(index).map(|c| c.key) {
            Some(key) => self.click_header(key),
            None => false,
        }
    }

    /// Set the sort directly, bypassing the click toggle
    pub fn sort_by(&mut self, key: &str, order: SortOrder) -> bool {
        if !self.columns.iter().any(|c| c.key == key && c.sortable) {
            return false;
        }
        self.sort = Some(SortState {
            key: key.to_string(),
            order,
        });
        true
    }

    pub fn clear_sort(&mut self) {
        self.sort = None;
    }

    /// All records in display order
    pub fn sorted<'a>(&self, data: &'a [T]) -> Vec<&'a T> {
        let mut rows: Vec<&T> = data.iter().collect();
        if let Some(ref sort) = self.sort {
            rows.sort_by(|a, b| {
                let ordering = compare_cells(&a.field(&sort.key), &b.field(&sort.key));
                match sort.order {
                    SortOrder::Ascending => ordering,
                    SortOrder::Descending => ordering.reverse(),
                }
            });
        }
        rows
    }

    fn total_pages_for(&self, len: usize) -> usize {
        (len + self.page_size - 1) / self.page_size
    }

    /// Number of pages for the synced record set
    pub fn total_pages(&self) -> usize {
        self.total_pages_for(self.record_count)
    }

    fn effective_page(&self, len: usize) -> usize {
        self.current_page.clamp(1, self.total_pages_for(len).max(1))
    }

    /// Records on the current page, in display order
    pub fn page_rows<'a>(&self, data: &'a [T]) -> Vec<&'a T> {
        let page = self.effective_page(data.len());
        self.sorted(data)
            .into_iter()
            .skip((page - 1) * self.page_size)
            .take(self.page_size)
            .collect()
    }

    pub fn can_go_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    pub fn can_go_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn next_page(&mut self) -> bool {
        if !self.can_go_next() {
            return false;
        }
        self.current_page += 1;
        self.selected = Some(0);
        true
    }

    pub fn previous_page(&mut self) -> bool {
        if !self.can_go_previous() {
            return false;
        }
        self.current_page -= 1;
        self.selected = Some(0);
        true
    }

    /// Jump to a 1-based page; out of range pages are ignored
    pub fn go_to_page(&mut self, page: usize) -> bool {
        if page == 0 || page > self.total_pages() || page == self.current_page {
            return false;
        }
        self.current_page = page;
        self.selected = Some(0);
        true
    }

    /// Page numbers to offer as direct links, at most [`MAX_PAGE_BUTTONS`]
    pub fn page_window(&self) -> Vec<usize> {
        page_window(self.current_page, self.total_pages())
    }

    fn rows_on_current_page(&self) -> usize {
        let start = (self.current_page - 1) * self.page_size;
        self.record_count.saturating_sub(start).min(self.page_size)
    }

    pub fn select_next_row(&mut self) {
        let rows = self.rows_on_current_page();
        if rows == 0 {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) => (i + 1) % rows,
            None => 0,
        });
    }

    pub fn select_previous_row(&mut self) {
        let rows = self.rows_on_current_page();
        if rows == 0 {
            self.selected = None;
            return;
        }
        self.selected = Some(match self.selected {
            Some(0) | None => rows - 1,
            Some(i) => i - 1,
        });
    }

    pub fn select_row(&mut self, row: Option<usize>) {
        self.selected = row.filter(|&r| r < self.rows_on_current_page());
    }

    /// Record behind the selected row
    pub fn selected_record<'a>(&self, data: &'a [T]) -> Option<&'a T> {
        let row = self.selected?;
        self.page_rows(data).get(row).copied()
    }

    /// Row click: selects the row and hands the record to the row-click
    /// callback. Returns the clicked record's key.
    pub fn click_row(&mut self, data: &[T], row: usize) -> Option<String> {
        if self.loading {
            return None;
        }
        let record = self.page_rows(data).get(row).copied()?;
        self.selected = Some(row);
        if let Some(handler) = self.on_row_click.as_mut() {
            handler(record);
        }
        Some(record.record_key())
    }

    /// Row click on the currently selected row
    pub fn activate_selected(&mut self, data: &[T]) -> Option<String> {
        let row = self.selected?;
        self.click_row(data, row)
    }

    pub fn headers(&self) -> Vec<HeaderCell> {
        self.columns
            .iter()
            .map(|c| HeaderCell {
                key: c.key,
                title: c.title,
                sortable: c.sortable,
                sort: self
                    .sort
                    .as_ref()
                    .filter(|s| c.sortable && s.key == c.key)
                    .map(|s| s.order),
            })
            .collect()
    }

    /// Build the frame to draw for `data`
    pub fn view(&self, data: &[T]) -> TableView {
        let headers = self.headers();

        if self.loading {
            return TableView {
                headers,
                body: TableBody::Loading {
                    rows: SKELETON_ROWS,
                    columns: self.columns.len(),
                },
                pagination: None,
            };
        }

        let page = self.effective_page(data.len());
        let total_pages = self.total_pages_for(data.len());
        let rows: Vec<TableRow> = self
            .page_rows(data)
            .into_iter()
            .enumerate()
            .map(|(i, record)| TableRow {
                key: record.record_key(),
                cells: self
                    .columns
                    .iter()
                    .map(|c| {
                        let badge = c.badge_status(record);
                        Cell {
                            text: c.render(record),
                            tone: badge.as_deref().map(status::tone),
                            live: badge.as_deref().map_or(false, status::is_live),
                        }
                    })
                    .collect(),
                selected: self.selected == Some(i),
            })
            .collect();

        let body = if rows.is_empty() {
            TableBody::Empty(self.empty_message.clone())
        } else {
            TableBody::Rows(rows)
        };

        let pagination = (total_pages > 1).then(|| PaginationView {
            current_page: page,
            total_pages,
            first_entry: (page - 1) * self.page_size + 1,
            last_entry: (page * self.page_size).min(data.len()),
            total_entries: data.len(),
            pages: page_window(page, total_pages),
            can_previous: page > 1,
            can_next: page < total_pages,
        });

        TableView {
            headers,
            body,
            pagination,
        }
    }
}

/// Sliding window of page numbers centered on `current` where possible
pub fn page_window(current: usize, total_pages: usize) -> Vec<usize> {
    let count = MAX_PAGE_BUTTONS.min(total_pages);
    let start = if total_pages <= MAX_PAGE_BUTTONS || current <= 3 {
        1
    } else if current + 2 >= total_pages {
        total_pages + 1 - MAX_PAGE_BUTTONS
    } else {
        current - 2
    };
    (start..start + count).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct Mechanic {
        id: String,
        name: String,
        rating: Option<f64>,
        status: &'static str,
    }

    impl TableRecord for Mechanic {
        fn record_key(&self) -> String {
            self.id.clone()
        }

        fn field(&self, key: &str) -> CellValue {
            match key {
                "id" => self.id.as_str().into(),
                "name" => self.name.as_str().into(),
                "rating" => self.rating.into(),
                "status" => self.status.into(),
                _ => CellValue::Empty,
            }
        }
    }

    fn mechanics(n: usize) -> Vec<Mechanic> {
        (0..n)
            .map(|i| Mechanic {
                id: format!("m-{:02}", i),
                name: format!("Mechanic {:02}", (i * 7) % n.max(1)),
                rating: Some(((i * 13) % 50) as f64 / 10.0 + i as f64 / 1000.0),
                status: if i % 2 == 0 { "online" } else { "offline" },
            })
            .collect()
    }

    fn table() -> DataTable<Mechanic> {
        DataTable::new(vec![
            Column::new("id", "ID"),
            Column::new("name", "Name").sortable(),
            Column::new("rating", "Rating").number().sortable(),
            Column::new("status", "Status").badge(),
        ])
    }

    fn keys(rows: &[&Mechanic]) -> Vec<String> {
        rows.iter().map(|m| m.id.clone()).collect()
    }

    #[test]
    fn test_locale_compare_ignores_case_first() {
        assert_eq!(locale_compare("apple", "Banana"), Ordering::Less);
        assert_eq!(locale_compare("Zed", "alpha"), Ordering::Greater);
        assert_eq!(locale_compare("a", "A"), Ordering::Less);
        assert_eq!(locale_compare("same", "same"), Ordering::Equal);
    }

    #[test]
    fn test_locale_compare_folds_accents() {
        assert_eq!(locale_compare("Émile", "Fajar"), Ordering::Less);
        assert_eq!(locale_compare("Émile", "Zed"), Ordering::Less);
        assert_eq!(locale_compare("Dewi", "Émile"), Ordering::Less);
        assert_eq!(locale_compare("Emile", "Émile"), Ordering::Less);
        assert_eq!(locale_compare("émile", "Émile"), Ordering::Less);
        // precomposed and decomposed forms are the same name
        assert_eq!(locale_compare("Jos\u{e9}", "Jose\u{301}"), Ordering::Equal);

        let mut names = vec!["Zed", "Émile", "Fajar", "élan", "Ana"];
        names.sort_by(|a, b| locale_compare(a, b));
        assert_eq!(names, vec!["Ana", "élan", "Émile", "Fajar", "Zed"]);
    }

    #[test]
    fn test_mixed_and_missing_values_compare_equal() {
        assert_eq!(compare_cells(&CellValue::Empty, &"x".into()), Ordering::Equal);
        assert_eq!(compare_cells(&1.0.into(), &"1".into()), Ordering::Equal);
        assert_eq!(compare_cells(&true.into(), &false.into()), Ordering::Equal);
        assert_eq!(compare_cells(&1.0.into(), &2.0.into()), Ordering::Less);
    }

    #[test]
    fn test_header_click_toggles_and_resets() {
        let mut t = table();
        assert!(t.click_header("name"));
        assert_eq!(t.sort_state().map(|s| s.order), Some(SortOrder::Ascending));
        assert!(t.click_header("name"));
        assert_eq!(t.sort_state().map(|s| s.order), Some(SortOrder::Descending));
        assert!(t.click_header("rating"));
        let sort = t.sort_state().unwrap();
        assert_eq!(sort.key, "rating");
        assert_eq!(sort.order, SortOrder::Ascending);
    }

    #[test]
    fn test_non_sortable_header_is_ignored() {
        let mut t = table();
        assert!(!t.click_header("status"));
        assert!(!t.click_header("nope"));
        assert!(t.sort_state().is_none());
    }

    #[test]
    fn test_descending_is_reverse_of_ascending() {
        let data = mechanics(9);
        let mut t = table();
        t.click_header("rating");
        let asc = keys(&t.sorted(&data));
        t.click_header("rating");
        let desc = keys(&t.sorted(&data));
        let mut reversed = asc.clone();
        reversed.reverse();
        assert_eq!(desc, reversed);

        t.click_header("rating");
        assert_eq!(keys(&t.sorted(&data)), asc);
    }

    #[test]
    fn test_missing_values_keep_their_position() {
        let mut data = mechanics(4);
        data[1].rating = None;
        let mut t = table();
        t.click_header("rating");
        let sorted = keys(&t.sorted(&data));
        assert_eq!(sorted.len(), 4);
        assert!(sorted.contains(&"m-01".to_string()));
    }

    #[test]
    fn test_pages_concatenate_to_sorted_list() {
        for (n, size) in [(0, 10), (1, 10), (10, 10), (12, 10), (23, 4), (7, 1)] {
            let data = mechanics(n);
            let mut t = table().with_page_size(size);
            t.click_header("name");
            t.sync(&data);

            let mut collected = Vec::new();
            loop {
                collected.extend(keys(&t.page_rows(&data)));
                if !t.next_page() {
                    break;
                }
            }
            assert_eq!(collected, keys(&t.sorted(&data)), "n={} size={}", n, size);
        }
    }

    #[test]
    fn test_empty_table_shows_message_without_pagination() {
        let data: Vec<Mechanic> = Vec::new();
        let mut t = table().with_empty_message("No mechanics found");
        t.sync(&data);
        let view = t.view(&data);
        assert_eq!(view.body, TableBody::Empty("No mechanics found".to_string()));
        assert!(view.pagination.is_none());
        assert_eq!(t.total_pages(), 0);
    }

    #[test]
    fn test_next_then_previous_returns_to_first_page() {
        let data = mechanics(12);
        let mut t = table();
        t.sync(&data);
        let first = keys(&t.page_rows(&data));
        assert_eq!(t.total_pages(), 2);

        assert!(t.next_page());
        assert_eq!(t.current_page(), 2);
        assert_eq!(t.page_rows(&data).len(), 2);
        assert!(!t.next_page());

        assert!(t.previous_page());
        assert!(!t.previous_page());
        assert_eq!(t.current_page(), 1);
        assert_eq!(keys(&t.page_rows(&data)), first);
    }

    #[test]
    fn test_pagination_view_bounds() {
        let data = mechanics(12);
        let mut t = table();
        t.sync(&data);
        let view = t.view(&data);
        let pagination = view.pagination.unwrap();
        assert_eq!(pagination.summary(), "Showing 1 to 10 of 12 entries");
        assert!(!pagination.can_previous);
        assert!(pagination.can_next);
        assert_eq!(pagination.pages, vec![1, 2]);

        t.next_page();
        let pagination = t.view(&data).pagination.unwrap();
        assert_eq!(pagination.summary(), "Showing 11 to 12 of 12 entries");
        assert!(!pagination.can_next);
    }

    #[test]
    fn test_page_window_slides() {
        assert_eq!(page_window(1, 3), vec![1, 2, 3]);
        assert_eq!(page_window(2, 9), vec![1, 2, 3, 4, 5]);
        assert_eq!(page_window(5, 9), vec![3, 4, 5, 6, 7]);
        assert_eq!(page_window(8, 9), vec![5, 6, 7, 8, 9]);
        assert_eq!(page_window(9, 9), vec![5, 6, 7, 8, 9]);
        assert!(page_window(1, 0).is_empty());
    }

    #[test]
    fn test_loading_renders_skeleton() {
        let data = mechanics(12);
        let mut t = table();
        t.sync(&data);
        t.set_loading(true);
        let view = t.view(&data);
        assert_eq!(
            view.body,
            TableBody::Loading {
                rows: SKELETON_ROWS,
                columns: 4
            }
        );
        assert!(view.pagination.is_none());
        assert!(t.click_row(&data, 0).is_none());
    }

    #[test]
    fn test_changed_record_set_resets_to_first_page() {
        let data = mechanics(25);
        let mut t = table();
        t.sync(&data);
        t.next_page();
        t.next_page();
        assert_eq!(t.current_page(), 3);

        assert!(!t.sync(&data));
        assert_eq!(t.current_page(), 3);

        let filtered: Vec<Mechanic> = data.iter().filter(|m| m.status == "online").cloned().collect();
        assert!(t.sync(&filtered));
        assert_eq!(t.current_page(), 1);
    }

    #[test]
    fn test_row_click_invokes_callback() {
        use std::sync::{Arc, Mutex};

        let clicked = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&clicked);
        let data = mechanics(3);
        let mut t = table().with_row_click(move |m: &Mechanic| {
            sink.lock().unwrap().push(m.id.clone());
        });
        t.sync(&data);

        assert_eq!(t.click_row(&data, 2).as_deref(), Some("m-02"));
        assert_eq!(t.selected_row(), Some(2));
        assert!(t.click_row(&data, 7).is_none());
        assert_eq!(*clicked.lock().unwrap(), vec!["m-02".to_string()]);
    }

    #[test]
    fn test_badge_cells_carry_tone() {
        let data = mechanics(2);
        let mut t = table();
        t.sync(&data);
        match t.view(&data).body {
            TableBody::Rows(rows) => {
                assert_eq!(rows[0].cells[3].text, "Online");
                assert_eq!(rows[0].cells[3].tone, Some(Tone::Success));
                assert_eq!(rows[0].cells[0].tone, None);
                assert!(rows[0].selected);
            }
            other => panic!("unexpected body: {:?}", other),
        }
    }
}
