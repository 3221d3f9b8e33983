//! Street-level incident file loader.
//!
//! Reads the police.uk street export (optionally with the derived `Year`
//! column and the district columns joined on) into [`IncidentRecord`]s.
//! `Month` is accepted either as a bare month number, in which case `Year`
//! is required, or in the export's own `YYYY-MM` form.
//!
//! The export carries some incidents with no location at all, and so no
//! `LSOA code`. Those rows are skipped with a warning.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use std::sync::Arc;

use chrono::{Datelike as _, NaiveDate};
use serde::Deserialize;
use uk_crime_crime_models::CrimeType;
use uk_crime_dataset_models::IncidentRecord;

use crate::DatasetError;
use crate::progress::ProgressCallback;

/// Rows read between progress updates.
const PROGRESS_BATCH: u64 = 10_000;

#[derive(Debug, Deserialize)]
struct RawIncidentRow {
    #[serde(rename = "Year", default)]
    year: Option<i32>,
    #[serde(rename = "Month")]
    month: String,
    #[serde(rename = "Crime type")]
    crime_type: String,
    #[serde(rename = "LSOA code")]
    small_area_code: String,
    #[serde(rename = "LSOA name")]
    small_area_name: String,
    #[serde(rename = "District code")]
    district_code: String,
    #[serde(rename = "District name")]
    district_name: String,
    #[serde(rename = "Latitude", default)]
    latitude: Option<f64>,
    #[serde(rename = "Longitude", default)]
    longitude: Option<f64>,
    #[serde(rename = "Location", default)]
    location: Option<String>,
}

/// Loads the incident file at `path`.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be read or any row is
/// invalid.
pub fn load_incidents(
    path: &Path,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<IncidentRecord>, DatasetError> {
    log::info!("Loading incidents from {}", path.display());
    if let Some(name) = path.file_name() {
        progress.set_message(format!("Loading {}", name.to_string_lossy()));
    }
    let reader = crate::file::open(path)?;
    let incidents = read_incidents(reader, progress)?;
    log::info!(
        "Loaded {} incidents from {}",
        incidents.len(),
        path.display()
    );
    Ok(incidents)
}

/// Reads incidents from any CSV source.
///
/// # Errors
///
/// Returns [`DatasetError`] if the CSV is malformed or any row is invalid.
pub fn read_incidents(
    reader: impl Read,
    progress: &Arc<dyn ProgressCallback>,
) -> Result<Vec<IncidentRecord>, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut incidents = Vec::new();
    let mut unrecognized: BTreeSet<String> = BTreeSet::new();
    let mut raw = csv::StringRecord::new();
    let mut pending: u64 = 0;
    let mut skipped: u64 = 0;

    while csv_reader.read_record(&mut raw)? {
        let line = raw.position().map_or(0, csv::Position::line);
        let row: RawIncidentRow = raw.deserialize(Some(&headers))?;
        let Some(incident) = normalize_row(row).map_err(|message| DatasetError::InvalidRow {
            line,
            message,
        })?
        else {
            if skipped == 0 {
                log::warn!("Skipping incident without an LSOA code on line {line}");
            }
            skipped += 1;
            continue;
        };

        if !CrimeType::is_known(&incident.crime_type)
            && unrecognized.insert(incident.crime_type.clone())
        {
            log::warn!(
                "Unrecognized crime type '{}' (first seen on line {line})",
                incident.crime_type
            );
        }

        incidents.push(incident);

        pending += 1;
        if pending == PROGRESS_BATCH {
            progress.inc(pending);
            pending = 0;
        }
    }

    progress.inc(pending);
    progress.finish(format!("{} incidents", incidents.len()));

    if skipped > 0 {
        log::warn!("Skipped {skipped} incident(s) without an LSOA code");
    }

    Ok(incidents)
}

/// Validates one row. `Ok(None)` means the incident has no location and is
/// left out.
fn normalize_row(row: RawIncidentRow) -> Result<Option<IncidentRecord>, String> {
    let (year, month) = parse_period(row.year, &row.month)?;

    if row.crime_type.is_empty() {
        return Err("empty crime type".to_string());
    }
    if row.small_area_code.is_empty() {
        return Ok(None);
    }
    if row.district_code.is_empty() {
        return Err("empty district code".to_string());
    }

    Ok(Some(IncidentRecord {
        year,
        month,
        crime_type: row.crime_type,
        small_area_code: row.small_area_code,
        small_area_name: row.small_area_name,
        district_code: row.district_code,
        district_name: row.district_name,
        latitude: row.latitude,
        longitude: row.longitude,
        location: row.location.filter(|l| !l.is_empty()),
    }))
}

/// Resolves the occurrence `(year, month)` from the `Year` and `Month`
/// columns.
fn parse_period(year: Option<i32>, month: &str) -> Result<(i32, u8), String> {
    if month.contains('-') {
        let date = NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
            .map_err(|e| format!("invalid month '{month}': {e}. Expected YYYY-MM"))?;
        if let Some(year) = year
            && year != date.year()
        {
            return Err(format!("Year {year} disagrees with Month '{month}'"));
        }
        let month = u8::try_from(date.month()).map_err(|e| e.to_string())?;
        return Ok((date.year(), month));
    }

    let month: u8 = month
        .parse()
        .map_err(|_| format!("invalid month '{month}'"))?;
    if !(1..=12).contains(&month) {
        return Err(format!("month {month} out of range 1-12"));
    }
    let year = year.ok_or_else(|| "missing Year for numeric Month".to_string())?;

    Ok((year, month))
}
