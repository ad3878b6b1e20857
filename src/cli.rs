use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use unicode_width::UnicodeWidthStr;

use crate::errors::{AppError, AppResult};
use crate::export::export_to_file;
use crate::fixtures::{find, Collection, FixtureSet};
use crate::format::{fit_width, format_currency, format_date_time};
use crate::listing::{ListQuery, Listing};
use crate::stats::{self, DashboardStats, FinanceStats};
use crate::table::{DataTable, SortOrder, TableBody, TableView};

/// Widest a column gets in printed tables
const MAX_COLUMN_WIDTH: usize = 36;

#[derive(Parser)]
#[command(name = "autoservice")]
#[command(about = "Admin console for the AutoService vehicle-service booking platform")]
#[command(version)]
pub struct Cli {
    /// Fixture file to load instead of the embedded data set
    #[arg(long, global = true)]
    pub fixtures: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Launch the terminal UI (default)
    Tui,

    /// Print one page of a collection as a table
    List {
        /// bookings, mechanics, workshops, users, transactions, broadcasts,
        /// notifications, activity or services
        collection: String,

        #[command(flatten)]
        args: ListArgs,
    },

    /// Print the details of one record
    Show {
        collection: String,

        /// Record id
        id: String,
    },

    /// Write a filtered collection to a CSV file
    Export {
        collection: String,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Case-insensitive search text
        #[arg(short, long)]
        search: Option<String>,

        /// Status or type filter tab
        #[arg(long)]
        status: Option<String>,
    },

    /// Print dashboard and finance statistics
    Stats,
}

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Case-insensitive search text
    #[arg(short, long)]
    pub search: Option<String>,

    /// Status or type filter tab
    #[arg(long)]
    pub status: Option<String>,

    /// Column key to sort by
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Page number (1-based)
    #[arg(short, long, default_value = "1")]
    pub page: usize,

    /// Rows per page
    #[arg(long)]
    pub page_size: Option<usize>,
}

impl Default for ListArgs {
    fn default() -> Self {
        Self {
            search: None,
            status: None,
            sort: None,
            desc: false,
            page: 1,
            page_size: None,
        }
    }
}

impl Commands {
    pub fn parse_collection(collection: &str) -> AppResult<Collection> {
        collection.parse()
    }
}

fn build_query(search: &Option<String>, status: &Option<String>) -> ListQuery {
    let mut query = ListQuery::new();
    if let Some(ref search) = search {
        query = query.with_search(search);
    }
    if let Some(ref status) = status {
        query = query.with_status(status);
    }
    query
}

/// Runs `body` against the records of `collection`
macro_rules! with_records {
    ($data:expr, $collection:expr, |$records:ident| $body:expr) => {
        match $collection {
            Collection::Bookings => {
                let $records = &$data.bookings[..];
                $body
            }
            Collection::Mechanics => {
                let $records = &$data.mechanics[..];
                $body
            }
            Collection::Workshops => {
                let $records = &$data.workshops[..];
                $body
            }
            Collection::Users => {
                let $records = &$data.users[..];
                $body
            }
            Collection::Transactions => {
                let $records = &$data.transactions[..];
                $body
            }
            Collection::Broadcasts => {
                let $records = &$data.notifications[..];
                $body
            }
            Collection::Notifications => {
                let $records = &$data.admin_notifications[..];
                $body
            }
            Collection::Activity => {
                let $records = &$data.activity_logs[..];
                $body
            }
            Collection::Services => {
                let services = $data.services();
                let $records = &services[..];
                $body
            }
        }
    };
}

/// Runs a non-interactive command. `page_size` overrides every listing's
/// own page size when set.
pub fn execute(
    command: &Commands,
    data: &FixtureSet,
    page_size: Option<usize>,
    out: &mut dyn Write,
) -> AppResult<()> {
    match command {
        Commands::Tui => Err(AppError::InvalidArgument(
            "the terminal UI cannot run in print mode".to_string(),
        )),
        Commands::List { collection, args } => {
            let collection = Commands::parse_collection(collection)?;
            let args = ListArgs {
                page_size: args.page_size.or(page_size),
                ..args.clone()
            };
            with_records!(data, collection, |records| print_list(records, &args, out))
        }
        Commands::Show { collection, id } => {
            let collection = Commands::parse_collection(collection)?;
            with_records!(data, collection, |records| print_detail(records, id, out))?;
            if collection == Collection::Bookings {
                print_timeline(data, id, out)?;
            }
            Ok(())
        }
        Commands::Export {
            collection,
            output,
            search,
            status,
        } => {
            let collection = Commands::parse_collection(collection)?;
            let query = build_query(search, status);
            let rows = with_records!(data, collection, |records| export_to_file(
                records, &query, output
            ))?;
            writeln!(out, "Exported {} {} to {}", rows, collection, output.display())?;
            Ok(())
        }
        Commands::Stats => print_stats(data, out),
    }
}

/// Prints one page of `records` after search, filter and sort
pub fn print_list<T: Listing>(records: &[T], args: &ListArgs, out: &mut dyn Write) -> AppResult<()> {
    if args.page_size == Some(0) {
        return Err(AppError::InvalidArgument(
            "page size must be greater than 0".to_string(),
        ));
    }
    let filtered = build_query(&args.search, &args.status).apply(records);

    let mut table = DataTable::new(T::columns())
        .with_page_size(args.page_size.unwrap_or_else(T::page_size))
        .with_empty_message(T::empty_message());
    table.sync(&filtered);

    if let Some(ref key) = args.sort {
        let order = if args.desc {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        };
        if !table.sort_by(key, order) {
            let sortable: Vec<&str> = T::columns()
                .iter()
                .filter(|c| c.sortable)
                .map(|c| c.key)
                .collect();
            return Err(AppError::InvalidArgument(format!(
                "cannot sort {} by '{}'. Sortable columns: {}",
                T::KIND,
                key,
                sortable.join(", ")
            )));
        }
    }

    if args.page != 1 && !table.go_to_page(args.page) {
        return Err(AppError::InvalidArgument(format!(
            "page {} is out of range (1-{})",
            args.page,
            table.total_pages().max(1)
        )));
    }

    writeln!(out, "{}", T::TITLE)?;
    writeln!(out)?;
    write_table(&table.view(&filtered), out)?;
    Ok(())
}

/// Plain-text rendering of a table frame
pub fn write_table(view: &TableView, out: &mut dyn Write) -> AppResult<()> {
    let headers: Vec<String> = view.headers.iter().map(|h| h.label()).collect();
    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    if let TableBody::Rows(ref rows) = view.body {
        for row in rows {
            for (width, cell) in widths.iter_mut().zip(&row.cells) {
                *width = (*width).max(cell.text.width());
            }
        }
    }
    for width in widths.iter_mut() {
        *width = (*width).min(MAX_COLUMN_WIDTH);
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(text, &width)| fit_width(text, width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(out, "{}", line(headers.iter().map(String::as_str).collect()))?;
    writeln!(out, "{}", "-".repeat(widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1)))?;

    match view.body {
        TableBody::Rows(ref rows) => {
            for row in rows {
                writeln!(out, "{}", line(row.cells.iter().map(|c| c.text.as_str()).collect()))?;
            }
        }
        TableBody::Empty(ref message) => writeln!(out, "{}", message)?,
        TableBody::Loading { .. } => writeln!(out, "Loading...")?,
    }

    if let Some(ref pagination) = view.pagination {
        writeln!(out)?;
        writeln!(
            out,
            "{} (page {} of {})",
            pagination.summary(),
            pagination.current_page,
            pagination.total_pages
        )?;
    }
    Ok(())
}

pub fn print_detail<T: Listing>(records: &[T], id: &str, out: &mut dyn Write) -> AppResult<()> {
    let record = find(records, id)?;
    let detail = record.detail();
    let label_width = detail.iter().map(|(label, _)| label.width()).max().unwrap_or(0);

    writeln!(out, "{} {}", T::KIND, id)?;
    writeln!(out)?;
    for (label, value) in detail {
        writeln!(out, "{}  {}", fit_width(label, label_width), value)?;
    }
    Ok(())
}

fn print_timeline(data: &FixtureSet, id: &str, out: &mut dyn Write) -> AppResult<()> {
    let booking = data.booking(id)?;
    writeln!(out)?;
    writeln!(out, "Timeline")?;
    for step in booking.timeline() {
        let time = match (step.done, step.time) {
            (true, Some(ref t)) => format_date_time(t),
            _ => "-".to_string(),
        };
        let mark = if step.done { "[x]" } else { "[ ]" };
        writeln!(out, "{} {:<16} {}", mark, step.label, time)?;
    }
    Ok(())
}

fn write_cards(out: &mut dyn Write, title: &str, cards: Vec<(&'static str, String)>) -> AppResult<()> {
    writeln!(out, "{}", title)?;
    let width = cards.iter().map(|(t, _)| t.width()).max().unwrap_or(0);
    for (card, value) in cards {
        writeln!(out, "  {}  {}", fit_width(card, width), value)?;
    }
    writeln!(out)?;
    Ok(())
}

pub fn print_stats(data: &FixtureSet, out: &mut dyn Write) -> AppResult<()> {
    write_cards(out, "Dashboard", DashboardStats::compute(data).cards())?;
    write_cards(out, "Finance", FinanceStats::compute(&data.transactions).cards())?;

    writeln!(out, "Bookings (last 7 days)")?;
    for (day, count) in stats::bookings_per_day(&data.bookings, data.generated_at) {
        writeln!(out, "  {}  {:>3} {}", day.format("%b %d"), count, "#".repeat(count as usize))?;
    }
    writeln!(out)?;

    if !data.revenue_series.is_empty() {
        writeln!(out, "Revenue")?;
        for point in &data.revenue_series {
            writeln!(out, "  {:<8} {}", point.date, format_currency(point.value))?;
        }
        writeln!(out)?;
    }

    writeln!(out, "Top Mechanics")?;
    for (rank, mechanic) in stats::top_mechanics(&data.mechanics, 5).iter().enumerate() {
        writeln!(
            out,
            "  {}. {} ({} jobs, {:.1})",
            rank + 1,
            mechanic.name,
            mechanic.completed_jobs,
            mechanic.rating
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn data() -> FixtureSet {
        FixtureSet::embedded().unwrap()
    }

    fn run(command: Commands) -> AppResult<String> {
        let mut out = Vec::new();
        execute(&command, &data(), None, &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "autoservice",
            "list",
            "bookings",
            "--status",
            "pending",
            "--sort",
            "amount",
            "--desc",
            "--page",
            "2",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::List { collection, args }) => {
                assert_eq!(collection, "bookings");
                assert_eq!(args.status.as_deref(), Some("pending"));
                assert!(args.desc);
                assert_eq!(args.page, 2);
            }
            _ => panic!("expected list command"),
        }

        let cli = Cli::try_parse_from(["autoservice", "--fixtures", "fx.json"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.fixtures, Some(PathBuf::from("fx.json")));
    }

    #[test]
    fn test_list_prints_page_and_summary() {
        let output = run(Commands::List {
            collection: "bookings".to_string(),
            args: ListArgs::default(),
        })
        .unwrap();
        assert!(output.starts_with("Booking Management"));
        assert!(output.contains("Showing 1 to 8 of 14 entries (page 1 of 2)"));

        let output = run(Commands::List {
            collection: "bookings".to_string(),
            args: ListArgs {
                page: 2,
                ..ListArgs::default()
            },
        })
        .unwrap();
        assert!(output.contains("Showing 9 to 14 of 14 entries"));
    }

    #[test]
    fn test_list_filters_and_empty_state() {
        let output = run(Commands::List {
            collection: "users".to_string(),
            args: ListArgs {
                search: Some("zzz-nobody".to_string()),
                ..ListArgs::default()
            },
        })
        .unwrap();
        assert!(output.contains("No users match your search"));
        assert!(!output.contains("Showing"));
    }

    #[test]
    fn test_list_rejects_bad_sort_and_page() {
        let err = run(Commands::List {
            collection: "bookings".to_string(),
            args: ListArgs {
                sort: Some("nonexistent".to_string()),
                ..ListArgs::default()
            },
        })
        .unwrap_err();
        assert!(err.to_string().contains("Sortable columns"));

        let err = run(Commands::List {
            collection: "bookings".to_string(),
            args: ListArgs {
                page: 9,
                ..ListArgs::default()
            },
        })
        .unwrap_err();
        assert!(err.to_string().contains("out of range (1-2)"));

        let err = run(Commands::List {
            collection: "garages".to_string(),
            args: ListArgs::default(),
        })
        .unwrap_err();
        assert!(matches!(err, AppError::UnknownCollection(_)));
    }

    #[test]
    fn test_list_rejects_zero_page_size() {
        let err = run(Commands::List {
            collection: "bookings".to_string(),
            args: ListArgs {
                page_size: Some(0),
                ..ListArgs::default()
            },
        })
        .unwrap_err();
        assert!(matches!(err, AppError::InvalidArgument(_)));
        assert!(err.to_string().contains("page size must be greater than 0"));
    }

    #[test]
    fn test_show_detail_and_not_found() {
        let output = run(Commands::Show {
            collection: "bookings".to_string(),
            id: "bk-1".to_string(),
        })
        .unwrap();
        assert!(output.contains("BK-2024-0001"));
        assert!(output.contains("Timeline"));

        let err = run(Commands::Show {
            collection: "mechanics".to_string(),
            id: "mech-404".to_string(),
        })
        .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Mechanic 'mech-404' not found");
    }

    #[test]
    fn test_export_writes_csv() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("users.csv");
        let printed = run(Commands::Export {
            collection: "users".to_string(),
            output: output.clone(),
            search: None,
            status: None,
        })
        .unwrap();
        assert!(printed.starts_with("Exported 10 users"));
        assert!(output.exists());
    }

    #[test]
    fn test_stats_output() {
        let output = run(Commands::Stats).unwrap();
        assert!(output.contains("Total Revenue"));
        assert!(output.contains("Rp 8.700.000"));
        assert!(output.contains("Top Mechanics"));
    }
}
