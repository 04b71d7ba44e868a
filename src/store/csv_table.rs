//! CSV import/export for the bar table
//!
//! The tabular form of the store, used both as the original import source
//! (spreadsheet exports with drifting header spellings) and as a snapshot
//! for sharing. Reading is lenient: headers are matched case-insensitively
//! against the known aliases, a UTF-8 BOM on the first header is stripped,
//! missing columns and unparsable numbers become `None`. Writing is
//! strict: one fixed header, BOM prepended so spreadsheet apps pick up the
//! encoding, `csv` crate quoting rules.

use crate::error::{Error, Result};
use crate::models::BarRecord;
use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

pub const DEFAULT_CSV_PATH: &str = "data/bars.csv";

/// Export header, in store-canonical column order.
pub const CSV_HEADER: [&str; 11] = [
    "id",
    "bar_name",
    "address",
    "correct_address",
    "lat",
    "lng",
    "price",
    "opening_hours",
    "dance_floor",
    "dance_notes",
    "last_updated",
];

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Read bar records from a CSV file.
///
/// Rows without an id come back with an empty `id`; assigning one is the
/// import pass's job. Cells that fail numeric parsing resolve to `None`.
pub fn read_csv_table(path: &Path) -> Result<Vec<BarRecord>> {
    if !path.exists() {
        return Err(Error::NotFound(format!(
            "input file {} does not exist",
            path.display()
        )));
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)?;

    let columns = map_columns(reader.headers()?);

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        records.push(record_from_row(&row, &columns));
    }

    tracing::debug!(path = %path.display(), rows = records.len(), "Read CSV table");

    Ok(records)
}

/// Write the fixed-header CSV snapshot.
pub fn write_csv_table(path: &Path, records: &[BarRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut file = std::fs::File::create(path)?;
    file.write_all(UTF8_BOM)?;

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(CSV_HEADER)?;

    for record in records {
        let lat = optional_to_cell(record.lat);
        let lng = optional_to_cell(record.lng);
        let price = optional_to_cell(record.price);
        let opening_hours = opening_hours_cell(record.opening_hours.as_ref());

        writer.write_record([
            record.id.as_str(),
            record.name.as_str(),
            record.address.as_deref().unwrap_or(""),
            record.correct_address.as_deref().unwrap_or(""),
            lat.as_str(),
            lng.as_str(),
            price.as_str(),
            opening_hours.as_str(),
            record.dance_floor.as_deref().unwrap_or(""),
            record.dance_notes.as_deref().unwrap_or(""),
            record.last_updated.as_deref().unwrap_or(""),
        ])?;
    }

    writer.flush()?;

    tracing::info!(path = %path.display(), records = records.len(), "CSV snapshot written");

    Ok(())
}

/// Map header positions to canonical column names. Unknown headers are
/// ignored; the first occurrence of a column wins.
fn map_columns(headers: &csv::StringRecord) -> HashMap<&'static str, usize> {
    let mut columns = HashMap::new();
    for (index, header) in headers.iter().enumerate() {
        if let Some(canonical) = canonical_column(header) {
            columns.entry(canonical).or_insert(index);
        }
    }
    columns
}

/// Match one header cell against the accepted spellings.
///
/// The BOM shows up glued to the first header of files exported from
/// spreadsheet apps, so it is stripped here rather than at file level.
fn canonical_column(header: &str) -> Option<&'static str> {
    let normalized = header
        .trim_start_matches('\u{feff}')
        .trim()
        .to_lowercase()
        .replace(' ', "_");

    match normalized.as_str() {
        "id" => Some("id"),
        "name" | "bar_name" | "barname" => Some("name"),
        "address" | "location" | "full_address" | "fulladdress" => Some("address"),
        "correct_address" | "correctaddress" => Some("correct_address"),
        "lat" | "latitude" => Some("lat"),
        "lng" | "lon" | "longitude" => Some("lng"),
        "price" | "cheapest_beer_sek" | "cheapestbeersek" => Some("price"),
        "opening_hours" | "openinghours" | "hours" => Some("opening_hours"),
        "dance_floor" | "dancefloor" => Some("dance_floor"),
        "dance_notes" | "dancenotes" => Some("dance_notes"),
        "last_updated" | "lastupdated" => Some("last_updated"),
        _ => None,
    }
}

fn record_from_row(
    row: &csv::StringRecord,
    columns: &HashMap<&'static str, usize>,
) -> BarRecord {
    let cell = |name: &str| -> Option<String> {
        let index = *columns.get(name)?;
        let value = row.get(index)?.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    };

    let mut record = BarRecord::new(
        cell("id").unwrap_or_default(),
        cell("name").unwrap_or_default(),
    );
    record.address = cell("address");
    record.correct_address = cell("correct_address");
    record.lat = cell("lat").and_then(|v| v.parse().ok());
    record.lng = cell("lng").and_then(|v| v.parse().ok());
    record.price = cell("price").and_then(|v| v.parse().ok());
    record.opening_hours = cell("opening_hours").map(|v| parse_opening_hours(&v));
    record.dance_floor = cell("dance_floor");
    record.dance_notes = cell("dance_notes");
    record.last_updated = cell("last_updated");

    record
}

/// Cells that look like JSON are stored structured; anything else stays
/// free text.
fn parse_opening_hours(cell: &str) -> serde_json::Value {
    if cell.starts_with('{') || cell.starts_with('[') {
        if let Ok(value) = serde_json::from_str(cell) {
            return value;
        }
    }
    serde_json::Value::String(cell.to_string())
}

fn opening_hours_cell(value: Option<&serde_json::Value>) -> String {
    match value {
        None => String::new(),
        Some(serde_json::Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn optional_to_cell<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_read_with_aliased_headers_and_bom() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bars.csv");
        std::fs::write(
            &path,
            "\u{feff}bar_name,location,latitude,longitude,cheapest_beer_sek,danceFloor\n\
             Kvarnen,Tjärhovsgatan 4,59.3157,18.0751,62,yes\n",
        )
        .unwrap();

        let records = read_csv_table(&path).unwrap();
        assert_eq!(records.len(), 1);

        let bar = &records[0];
        assert_eq!(bar.id, "");
        assert_eq!(bar.name, "Kvarnen");
        assert_eq!(bar.address.as_deref(), Some("Tjärhovsgatan 4"));
        assert_eq!(bar.lat, Some(59.3157));
        assert_eq!(bar.lng, Some(18.0751));
        assert_eq!(bar.price, Some(62));
        assert_eq!(bar.dance_floor.as_deref(), Some("yes"));
    }

    #[test]
    fn test_read_tolerates_missing_cells_and_bad_numbers() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bars.csv");
        std::fs::write(
            &path,
            "name,address,lat,price\n\
             Kvarnen,,not-a-number,62 kr\n\
             Snotty\n",
        )
        .unwrap();

        let records = read_csv_table(&path).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].name, "Kvarnen");
        assert_eq!(records[0].address, None);
        assert_eq!(records[0].lat, None);
        assert_eq!(records[0].price, None);

        assert_eq!(records[1].name, "Snotty");
        assert_eq!(records[1].address, None);
    }

    #[test]
    fn test_read_handles_quoted_commas_and_doubled_quotes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bars.csv");
        std::fs::write(
            &path,
            "name,address\n\
             \"O'Learys, \"\"Best\"\" bar\",\"Götgatan 11, Stockholm\"\n",
        )
        .unwrap();

        let records = read_csv_table(&path).unwrap();
        assert_eq!(records[0].name, "O'Learys, \"Best\" bar");
        assert_eq!(records[0].address.as_deref(), Some("Götgatan 11, Stockholm"));
    }

    #[test]
    fn test_read_handles_newlines_inside_quoted_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bars.csv");
        std::fs::write(
            &path,
            "name,dance_notes\n\
             Kvarnen,\"packed\non weekends\"\n",
        )
        .unwrap();

        let records = read_csv_table(&path).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Kvarnen");
        assert_eq!(records[0].dance_notes.as_deref(), Some("packed\non weekends"));
    }

    #[test]
    fn test_write_prepends_bom_and_fixed_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bars.csv");

        let bar = BarRecord::new("kvarnen", "Kvarnen");
        write_csv_table(&path, &[bar]).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(UTF8_BOM));

        let text = String::from_utf8(bytes[UTF8_BOM.len()..].to_vec()).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, CSV_HEADER.join(","));
    }

    #[test]
    fn test_write_escapes_embedded_quotes_and_commas() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bars.csv");

        let bar = BarRecord::new("o-learys", "O'Learys, \"Best\" bar");
        write_csv_table(&path, &[bar]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"O'Learys, \"\"Best\"\" bar\""));
    }

    #[test]
    fn test_round_trip_preserves_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bars.csv");

        let mut bar = BarRecord::new("kvarnen", "Kvarnen");
        bar.address = Some("Hornsgatan 66".to_string());
        bar.correct_address = Some("Tjärhovsgatan 4".to_string());
        bar.lat = Some(59.3157);
        bar.lng = Some(18.0751);
        bar.price = Some(62);
        bar.dance_floor = Some("yes".to_string());
        bar.dance_notes = Some("weekends only".to_string());
        bar.last_updated = Some("2024-05-01T12:00:00+00:00".to_string());

        write_csv_table(&path, std::slice::from_ref(&bar)).unwrap();
        let records = read_csv_table(&path).unwrap();

        assert_eq!(records.len(), 1);
        let back = &records[0];
        assert_eq!(back.id, bar.id);
        assert_eq!(back.name, bar.name);
        assert_eq!(back.address, bar.address);
        assert_eq!(back.correct_address, bar.correct_address);
        assert_eq!(back.lat, bar.lat);
        assert_eq!(back.lng, bar.lng);
        assert_eq!(back.price, bar.price);
        assert_eq!(back.dance_floor, bar.dance_floor);
        assert_eq!(back.dance_notes, bar.dance_notes);
        assert_eq!(back.last_updated, bar.last_updated);
    }

    #[test]
    fn test_embedded_newlines_survive_the_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bars.csv");

        let mut bar = BarRecord::new("kvarnen", "Kvarnen");
        bar.dance_notes = Some("packed\non weekends".to_string());

        write_csv_table(&path, std::slice::from_ref(&bar)).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"packed\non weekends\""));

        let records = read_csv_table(&path).unwrap();
        assert_eq!(records[0].dance_notes, bar.dance_notes);
    }

    #[test]
    fn test_structured_opening_hours_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bars.csv");

        let mut bar = BarRecord::new("kvarnen", "Kvarnen");
        bar.opening_hours = Some(serde_json::json!({"mon": "11-01", "sun": "12-23"}));

        write_csv_table(&path, std::slice::from_ref(&bar)).unwrap();
        let records = read_csv_table(&path).unwrap();

        assert_eq!(records[0].opening_hours, bar.opening_hours);
    }

    #[test]
    fn test_free_text_opening_hours_stay_text() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bars.csv");
        std::fs::write(&path, "name,opening_hours\nKvarnen,11-01 every day\n").unwrap();

        let records = read_csv_table(&path).unwrap();
        assert_eq!(
            records[0].opening_hours,
            Some(serde_json::Value::String("11-01 every day".to_string()))
        );
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.csv");
        assert!(matches!(read_csv_table(&path), Err(Error::NotFound(_))));
    }
}
