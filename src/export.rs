//! CSV export of listed tables

use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::errors::AppResult;
use crate::listing::{ListQuery, Listing};

/// Writes the records passing `query` as CSV: one header row of column
/// titles, then the rendered cells. Returns the number of data rows.
pub fn write_csv<T: Listing, W: Write>(records: &[T], query: &ListQuery, out: W) -> AppResult<usize> {
    let columns = T::columns();
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(columns.iter().map(|c| c.title))?;

    let mut rows = 0;
    for record in records.iter().filter(|r| query.matches(*r)) {
        writer.write_record(columns.iter().map(|c| c.render(record)))?;
        rows += 1;
    }
    writer.flush()?;
    Ok(rows)
}

pub fn export_to_file<T: Listing>(records: &[T], query: &ListQuery, path: &Path) -> AppResult<usize> {
    let file = std::fs::File::create(path)?;
    let rows = write_csv(records, query, file)?;
    info!("Exported {} {} rows to {}", rows, T::KIND, path.display());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::FixtureSet;
    use crate::models::Transaction;
    use tempfile::TempDir;

    #[test]
    fn test_csv_headers_and_rendered_cells() {
        let data = FixtureSet::embedded().unwrap();
        let mut buf = Vec::new();
        let rows = write_csv(
            &data.transactions,
            &ListQuery::new().with_status("refund"),
            &mut buf,
        )
        .unwrap();
        assert_eq!(rows, 1);

        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Transaction ID,Type,Description,Amount,Escrow,Status,Date"
        );
        let row = lines.next().unwrap();
        assert!(row.starts_with("TRX-005,Refund,"));
        assert!(row.contains("-Rp 150.000"));
    }

    #[test]
    fn test_export_to_file() {
        let data = FixtureSet::embedded().unwrap();
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("transactions.csv");
        let rows = export_to_file::<Transaction>(&data.transactions, &ListQuery::new(), &path).unwrap();
        assert_eq!(rows, data.transactions.len());

        let mut reader = csv::Reader::from_path(&path).unwrap();
        assert_eq!(reader.records().count(), rows);
    }
}
