use autoservice::cli::{execute, Commands, ListArgs};
use autoservice::fixtures::FixtureSet;
use tempfile::TempDir;

fn run(command: Commands) -> (autoservice::AppResult<()>, String) {
    let data = FixtureSet::embedded().unwrap();
    let mut out = Vec::new();
    let result = execute(&command, &data, None, &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn test_list_prints_page_summary() {
    let data = FixtureSet::embedded().unwrap();
    let (result, out) = run(Commands::List {
        collection: "bookings".to_string(),
        args: ListArgs {
            page_size: Some(3),
            ..ListArgs::default()
        },
    });
    result.unwrap();
    let expected = format!("Showing 1 to 3 of {} entries", data.bookings.len());
    assert!(out.contains(&expected), "{}", out);
}

#[test]
fn test_list_unknown_collection_fails() {
    let (result, _) = run(Commands::List {
        collection: "invoices".to_string(),
        args: ListArgs::default(),
    });
    assert!(result.is_err());
}

#[test]
fn test_show_missing_record_is_not_found() {
    let (result, _) = run(Commands::Show {
        collection: "mechanics".to_string(),
        id: "mech-404".to_string(),
    });
    let err = result.unwrap_err();
    assert!(err.is_not_found());
    assert!(err.to_string().contains("mech-404"));
}

#[test]
fn test_export_writes_filtered_rows() {
    let data = FixtureSet::embedded().unwrap();
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("users.csv");
    let (result, out) = run(Commands::Export {
        collection: "users".to_string(),
        output: output.clone(),
        search: None,
        status: None,
    });
    result.unwrap();
    assert!(out.contains(&format!("Exported {} users", data.users.len())), "{}", out);

    let mut reader = csv::Reader::from_path(&output).unwrap();
    assert_eq!(reader.records().count(), data.users.len());
}

#[test]
fn test_stats_mentions_revenue() {
    let (result, out) = run(Commands::Stats);
    result.unwrap();
    assert!(out.contains("Rp"), "{}", out);
}
