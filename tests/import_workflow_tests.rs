//! Import pass integration tests
//!
//! End-to-end CSV → store runs against temp directories: id assignment
//! and preservation, collision suffixing, skip rules, and the guarantee
//! that a failed import never touches an existing store.

use barkartan::store;
use barkartan::workflow::import;
use std::path::Path;
use tempfile::tempdir;

fn write_csv(path: &Path, body: &str) {
    std::fs::write(path, body).unwrap();
}

#[test]
fn test_fresh_import_assigns_slug_ids() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("bars.csv");
    let store_path = dir.path().join("bars.json");

    write_csv(
        &csv,
        "name,address,cheapest_beer_sek\n\
         Kvarnen,Tjärhovsgatan 4,62\n\
         Röda Huset,Sveavägen 80,55\n",
    );

    let summary = import::run(&csv, &store_path).unwrap();

    assert_eq!(summary.rows_read, 2);
    assert_eq!(summary.records_imported, 2);
    assert_eq!(summary.ids_assigned, 2);
    assert_eq!(summary.ids_preserved, 0);

    let records = store::load_store(&store_path).unwrap();
    assert_eq!(records[0].id, "kvarnen");
    assert_eq!(records[1].id, "roda-huset");
    assert_eq!(records[0].price, Some(62));
    assert!(records[0].last_updated.is_some());
}

#[test]
fn test_reimport_preserves_ids_for_matching_names() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("bars.csv");
    let store_path = dir.path().join("bars.json");

    // Existing store where Kvarnen got a hand-edited id at some point.
    let existing = barkartan::models::BarRecord::new("kvarnen-classic", "Kvarnen");
    store::save_store(&store_path, &[existing]).unwrap();

    write_csv(&csv, "name,address\nKvarnen,Tjärhovsgatan 4\nSnotty,Skånegatan 90\n");

    let summary = import::run(&csv, &store_path).unwrap();

    assert_eq!(summary.ids_preserved, 1);
    assert_eq!(summary.ids_assigned, 1);

    let records = store::load_store(&store_path).unwrap();
    assert_eq!(records[0].id, "kvarnen-classic");
    assert_eq!(records[1].id, "snotty");
}

#[test]
fn test_row_provided_ids_are_kept() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("bars.csv");
    let store_path = dir.path().join("bars.json");

    write_csv(&csv, "id,name\ncustom-id,Kvarnen\n");

    let summary = import::run(&csv, &store_path).unwrap();
    assert_eq!(summary.ids_preserved, 1);

    let records = store::load_store(&store_path).unwrap();
    assert_eq!(records[0].id, "custom-id");
}

#[test]
fn test_duplicate_names_get_suffixed_ids() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("bars.csv");
    let store_path = dir.path().join("bars.json");

    write_csv(
        &csv,
        "name\nCarmen\nCarmen\nCarmen\n",
    );

    import::run(&csv, &store_path).unwrap();

    let records = store::load_store(&store_path).unwrap();
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["carmen", "carmen-2", "carmen-3"]);
}

#[test]
fn test_reimport_keeps_ids_for_duplicate_named_bars() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("bars.csv");
    let store_path = dir.path().join("bars.json");

    // Two distinct bars sharing a name, suffixed by an earlier import.
    let existing = vec![
        barkartan::models::BarRecord::new("carmen", "Carmen"),
        barkartan::models::BarRecord::new("carmen-2", "Carmen"),
    ];
    store::save_store(&store_path, &existing).unwrap();

    write_csv(&csv, "name\nCarmen\nCarmen\n");

    let summary = import::run(&csv, &store_path).unwrap();
    assert_eq!(summary.ids_preserved, 2);
    assert_eq!(summary.ids_assigned, 0);

    let records = store::load_store(&store_path).unwrap();
    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, ["carmen", "carmen-2"]);
}

#[test]
fn test_unnamed_rows_are_skipped() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("bars.csv");
    let store_path = dir.path().join("bars.json");

    write_csv(&csv, "name,address\n,Gatan 1\nKvarnen,Tjärhovsgatan 4\n");

    let summary = import::run(&csv, &store_path).unwrap();

    assert_eq!(summary.skipped_unnamed, 1);
    assert_eq!(summary.records_imported, 1);

    let records = store::load_store(&store_path).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].name, "Kvarnen");
}

#[test]
fn test_missing_input_leaves_existing_store_untouched() {
    let dir = tempdir().unwrap();
    let store_path = dir.path().join("bars.json");

    let existing = barkartan::models::BarRecord::new("kvarnen", "Kvarnen");
    store::save_store(&store_path, &[existing]).unwrap();
    let before = std::fs::read_to_string(&store_path).unwrap();

    let missing_csv = dir.path().join("does-not-exist.csv");
    let result = import::run(&missing_csv, &store_path);

    assert!(result.is_err());
    let after = std::fs::read_to_string(&store_path).unwrap();
    assert_eq!(before, after);
}

#[test]
fn test_corrupt_existing_store_aborts_the_import() {
    let dir = tempdir().unwrap();
    let csv = dir.path().join("bars.csv");
    let store_path = dir.path().join("bars.json");

    write_csv(&csv, "name\nKvarnen\n");
    std::fs::write(&store_path, "{definitely not json").unwrap();
    let before = std::fs::read_to_string(&store_path).unwrap();

    let result = import::run(&csv, &store_path);

    // Overwriting a store we cannot read would destroy whatever ids it
    // held; the import must refuse instead.
    assert!(result.is_err());
    assert_eq!(std::fs::read_to_string(&store_path).unwrap(), before);
}
