//! Column descriptors and cell values for the generic data table

use std::fmt;

use crate::{format, status};

/// Raw value of a single record field as seen by the table
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Empty,
}

impl CellValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => f.write_str(s),
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        CellValue::Text(value)
    }
}

impl From<&String> for CellValue {
    fn from(value: &String) -> Self {
        CellValue::Text(value.clone())
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        CellValue::Number(value)
    }
}

impl From<u64> for CellValue {
    fn from(value: u64) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<u32> for CellValue {
    fn from(value: u32) -> Self {
        CellValue::Number(value as f64)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        CellValue::Bool(value)
    }
}

impl<V: Into<CellValue>> From<Option<V>> for CellValue {
    fn from(value: Option<V>) -> Self {
        value.map(Into::into).unwrap_or(CellValue::Empty)
    }
}

/// A record that can be shown in a [`DataTable`](super::DataTable)
pub trait TableRecord {
    /// Unique key of the record within its collection
    fn record_key(&self) -> String;

    /// Value of the field named `key`, or [`CellValue::Empty`] when the record has none
    fn field(&self, key: &str) -> CellValue;
}

/// How a column turns a record into display text
pub enum ColumnKind<T> {
    Text,
    Number,
    Currency,
    Date,
    DateTime,
    /// Status code rendered as a colored label
    Badge,
    /// Caller-supplied renderer
    Custom(fn(&T) -> String),
}

impl<T> Clone for ColumnKind<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ColumnKind<T> {}

impl<T> fmt::Debug for ColumnKind<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ColumnKind::Text => "Text",
            ColumnKind::Number => "Number",
            ColumnKind::Currency => "Currency",
            ColumnKind::Date => "Date",
            ColumnKind::DateTime => "DateTime",
            ColumnKind::Badge => "Badge",
            ColumnKind::Custom(_) => "Custom",
        };
        f.write_str(name)
    }
}

/// Column descriptor: which field to show, its header and how to render it
#[derive(Debug, Clone)]
pub struct Column<T> {
    pub key: &'static str,
    pub title: &'static str,
    pub sortable: bool,
    pub kind: ColumnKind<T>,
    /// Preferred display width in terminal cells
    pub width: Option<u16>,
}

impl<T: TableRecord> Column<T> {
    pub fn new(key: &'static str, title: &'static str) -> Self {
        Self {
            key,
            title,
            sortable: false,
            kind: ColumnKind::Text,
            width: None,
        }
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn with_kind(mut self, kind: ColumnKind<T>) -> Self {
        self.kind = kind;
        self
    }

    pub fn number(self) -> Self {
        self.with_kind(ColumnKind::Number)
    }

    pub fn currency(self) -> Self {
        self.with_kind(ColumnKind::Currency)
    }

    pub fn date(self) -> Self {
        self.with_kind(ColumnKind::Date)
    }

    pub fn date_time(self) -> Self {
        self.with_kind(ColumnKind::DateTime)
    }

    pub fn badge(self) -> Self {
        self.with_kind(ColumnKind::Badge)
    }

    pub fn custom(self, render: fn(&T) -> String) -> Self {
        self.with_kind(ColumnKind::Custom(render))
    }

    pub fn with_width(mut self, width: u16) -> Self {
        self.width = Some(width);
        self
    }

    /// Display text of this column for `record`
    pub fn render(&self, record: &T) -> String {
        match self.kind {
            ColumnKind::Custom(render) => render(record),
            ColumnKind::Text | ColumnKind::Number => record.field(self.key).to_string(),
            ColumnKind::Currency => match record.field(self.key) {
                CellValue::Number(n) if n >= 0.0 => format::format_currency(n as u64),
                other => other.to_string(),
            },
            ColumnKind::Date => match record.field(self.key) {
                CellValue::Text(s) => format::format_date_str(&s),
                other => other.to_string(),
            },
            ColumnKind::DateTime => match record.field(self.key) {
                CellValue::Text(s) => format::format_date_time_str(&s),
                other => other.to_string(),
            },
            ColumnKind::Badge => match record.field(self.key) {
                CellValue::Text(s) => status::label(&s),
                other => other.to_string(),
            },
        }
    }

    /// Raw status code behind a badge column, used to pick the badge tone
    pub fn badge_status(&self, record: &T) -> Option<String> {
        match self.kind {
            ColumnKind::Badge => record.field(self.key).as_text().map(str::to_string),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        id: &'static str,
        amount: u64,
        status: &'static str,
        note: Option<&'static str>,
    }

    impl TableRecord for Row {
        fn record_key(&self) -> String {
            self.id.to_string()
        }

        fn field(&self, key: &str) -> CellValue {
            match key {
                "id" => self.id.into(),
                "amount" => self.amount.into(),
                "status" => self.status.into(),
                "note" => self.note.into(),
                _ => CellValue::Empty,
            }
        }
    }

    fn row() -> Row {
        Row {
            id: "r-1",
            amount: 1_250_000,
            status: "in_progress",
            note: None,
        }
    }

    #[test]
    fn test_raw_values_are_coerced_to_strings() {
        let col: Column<Row> = Column::new("amount", "Amount");
        assert_eq!(col.render(&row()), "1250000");

        let missing: Column<Row> = Column::new("note", "Note");
        assert_eq!(missing.render(&row()), "");
    }

    #[test]
    fn test_kinds_format_values() {
        let currency: Column<Row> = Column::new("amount", "Amount").currency();
        assert_eq!(currency.render(&row()), "Rp 1.250.000");

        let badge: Column<Row> = Column::new("status", "Status").badge();
        assert_eq!(badge.render(&row()), "In Progress");
        assert_eq!(badge.badge_status(&row()).as_deref(), Some("in_progress"));

        let custom: Column<Row> = Column::new("id", "ID").custom(|r| r.id.to_uppercase());
        assert_eq!(custom.render(&row()), "R-1");
    }
}
