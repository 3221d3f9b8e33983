//! District population reference loader.

use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use uk_crime_dataset_models::{RegionRecord, RegionTable};

use crate::DatasetError;

#[derive(Debug, Deserialize)]
struct RawRegionRow {
    #[serde(rename = "Code")]
    code: String,
    #[serde(rename = "Name")]
    name: String,
    #[serde(rename = "Population")]
    population: String,
}

/// Loads the region reference file at `path`.
///
/// # Errors
///
/// Returns [`DatasetError`] if the file cannot be read, a population is not
/// a positive integer, or a code repeats.
pub fn load_regions(path: &Path) -> Result<RegionTable, DatasetError> {
    let reader = crate::file::open(path)?;
    let table = read_regions(reader)?;
    log::info!("Loaded {} regions from {}", table.len(), path.display());
    Ok(table)
}

/// Reads a region reference table from any CSV source.
///
/// Populations may carry thousands separators (`"9,721"`).
///
/// # Errors
///
/// Returns [`DatasetError`] if the CSV is malformed, a population is not a
/// positive integer, or a code repeats.
pub fn read_regions(reader: impl Read) -> Result<RegionTable, DatasetError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let headers = csv_reader.headers()?.clone();

    let mut records = Vec::new();
    let mut raw = csv::StringRecord::new();

    while csv_reader.read_record(&mut raw)? {
        let line = raw.position().map_or(0, csv::Position::line);
        let row: RawRegionRow = raw.deserialize(Some(&headers))?;

        if row.code.is_empty() {
            return Err(DatasetError::InvalidRow {
                line,
                message: "empty region code".to_string(),
            });
        }

        let population = parse_population(&row.population).ok_or_else(|| {
            DatasetError::InvalidPopulation {
                code: row.code.clone(),
                value: row.population.clone(),
            }
        })?;

        records.push(RegionRecord {
            code: row.code,
            name: row.name,
            population,
        });
    }

    Ok(RegionTable::from_records(records)?)
}

fn parse_population(raw: &str) -> Option<u64> {
    let digits: String = raw.chars().filter(|c| *c != ',').collect();
    digits.parse::<u64>().ok().filter(|p| *p > 0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_reference_rows() {
        let csv = "Code,Name,Population\nE09000001,City of London,\"9,721\"\nE09000002,Barking and Dagenham,212906\n";
        let table = read_regions(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("E09000001").unwrap().population, 9721);
        assert_eq!(table.get("E09000002").unwrap().name, "Barking and Dagenham");
    }

    #[test]
    fn rejects_zero_population() {
        let csv = "Code,Name,Population\nR1,Region One,0\n";
        let err = read_regions(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidPopulation { ref code, .. } if code == "R1"));
    }

    #[test]
    fn rejects_non_numeric_population() {
        let csv = "Code,Name,Population\nR1,Region One,lots\n";
        assert!(read_regions(csv.as_bytes()).is_err());
    }

    #[test]
    fn rejects_duplicate_codes() {
        let csv = "Code,Name,Population\nR1,A,10\nR1,B,20\n";
        let err = read_regions(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, DatasetError::DuplicateRegion(_)));
    }
}
