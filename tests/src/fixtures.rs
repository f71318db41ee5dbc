//! Test fixtures and export generators.

use std::io::{Cursor, Write};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{Duration, NaiveDate};
use zip::write::SimpleFileOptions;

/// `Dates.csv` with one row per `(date, clicks, impressions)`.
pub fn dates_csv(rows: &[(&str, u64, u64)]) -> String {
    let mut csv = String::from("Date,Clicks,Impressions,CTR,Position\n");
    for (date, clicks, impressions) in rows {
        csv.push_str(&format!("{},{},{},0%,1\n", date, clicks, impressions));
    }
    csv
}

/// `Dates.csv` covering `days` consecutive days from `start`, each with
/// `clicks` clicks and ten times as many impressions.
pub fn daily_dates_csv(start: NaiveDate, days: i64, clicks: u64) -> String {
    let rows: Vec<(String, u64, u64)> = (0..days)
        .map(|offset| {
            let date = start + Duration::days(offset);
            (date.format("%Y-%m-%d").to_string(), clicks, clicks * 10)
        })
        .collect();
    let borrowed: Vec<(&str, u64, u64)> =
        rows.iter().map(|(d, c, i)| (d.as_str(), *c, *i)).collect();
    dates_csv(&borrowed)
}

/// Category table with `header` as the category column.
pub fn category_csv(header: &str, rows: &[(&str, u64)]) -> String {
    let mut csv = format!("{},Clicks,Impressions\n", header);
    for (category, clicks) in rows {
        csv.push_str(&format!("{},{},0\n", category, clicks));
    }
    csv
}

pub fn devices_csv(rows: &[(&str, u64)]) -> String {
    category_csv("Device", rows)
}

pub fn countries_csv(rows: &[(&str, u64)]) -> String {
    category_csv("Country", rows)
}

pub fn queries_csv(rows: &[(&str, u64)]) -> String {
    category_csv("Top queries", rows)
}

pub fn pages_csv(rows: &[(&str, u64)]) -> String {
    category_csv("Top pages", rows)
}

/// ZIP archive holding `(name, contents)` entries.
pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, contents) in entries {
        writer
            .start_file(*name, SimpleFileOptions::default())
            .expect("Failed to start zip entry");
        writer
            .write_all(contents.as_bytes())
            .expect("Failed to write zip entry");
    }
    writer.finish().expect("Failed to finish zip").into_inner()
}

/// Base64 data URI, as a browser `FileReader` produces.
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

pub fn csv_upload(filename: &str, csv: &str) -> serde_json::Value {
    serde_json::json!({
        "filename": filename,
        "content": data_uri("text/csv", csv.as_bytes()),
    })
}

pub fn zip_upload(filename: &str, archive: &[u8]) -> serde_json::Value {
    serde_json::json!({
        "filename": filename,
        "content": data_uri("application/zip", archive),
    })
}

/// Upload request body.
pub fn upload_payload(files: Vec<serde_json::Value>) -> serde_json::Value {
    serde_json::json!({ "files": files })
}
