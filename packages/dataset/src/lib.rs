#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Flat-file loaders and discovered facts for the UK crime dataset.
//!
//! The incident file and the district population reference are loaded once
//! at startup into a [`Dataset`], which is never mutated afterwards. The
//! crime type vocabulary, the year range and the month marks offered by the
//! dashboard controls are all discovered from the loaded incidents.

pub mod file;
pub mod incidents;
pub mod progress;
pub mod regions;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use uk_crime_dataset_models::{DuplicateRegionError, Granularity, IncidentRecord, RegionTable};

use crate::progress::ProgressCallback;

/// Errors that can occur while loading the dataset.
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    /// An input file could not be opened.
    #[error("Failed to open {}: {source}", .path.display())]
    Open {
        /// The path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// CSV parsing failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A row was well-formed CSV but not a valid record.
    #[error("Invalid row on line {line}: {message}")]
    InvalidRow {
        /// 1-based line number in the source file.
        line: u64,
        /// Description of what went wrong.
        message: String,
    },

    /// A region population was not a positive integer.
    #[error("Invalid population '{value}' for region {code}")]
    InvalidPopulation {
        /// The region code.
        code: String,
        /// The raw population value.
        value: String,
    },

    /// Two reference rows share a region code.
    #[error("Region reference error: {0}")]
    DuplicateRegion(#[from] DuplicateRegionError),
}

/// The loaded incident table and district reference.
#[derive(Debug, Clone)]
pub struct Dataset {
    incidents: Vec<IncidentRecord>,
    districts: RegionTable,
    crime_types: BTreeSet<String>,
    years: BTreeSet<i32>,
    months: BTreeSet<u8>,
}

impl Dataset {
    /// Builds a dataset from already-loaded tables.
    #[must_use]
    pub fn new(incidents: Vec<IncidentRecord>, districts: RegionTable) -> Self {
        let crime_types = incidents.iter().map(|i| i.crime_type.clone()).collect();
        let years = incidents.iter().map(|i| i.year).collect();
        let months = incidents.iter().map(|i| i.month).collect();

        Self {
            incidents,
            districts,
            crime_types,
            years,
            months,
        }
    }

    /// Loads the incident file and district reference file.
    ///
    /// Logs a warning if some incident district codes have no reference
    /// row; rate queries touching those districts will fail.
    ///
    /// # Errors
    ///
    /// Returns [`DatasetError`] if either file fails to load.
    pub fn load(
        incidents_path: &Path,
        districts_path: &Path,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<Self, DatasetError> {
        let districts = regions::load_regions(districts_path)?;
        let incidents = incidents::load_incidents(incidents_path, progress)?;
        let dataset = Self::new(incidents, districts);

        let unmatched = dataset.unmatched_district_codes();
        if !unmatched.is_empty() {
            log::warn!(
                "{} district code(s) in {} have no row in {}: {}",
                unmatched.len(),
                incidents_path.display(),
                districts_path.display(),
                unmatched.join(", ")
            );
        }

        Ok(dataset)
    }

    /// All incident rows, in file order.
    #[must_use]
    pub fn incidents(&self) -> &[IncidentRecord] {
        &self.incidents
    }

    /// The district population reference.
    #[must_use]
    pub const fn districts(&self) -> &RegionTable {
        &self.districts
    }

    /// Total number of incidents.
    #[must_use]
    pub fn incident_count(&self) -> usize {
        self.incidents.len()
    }

    /// The discovered crime type vocabulary, sorted.
    #[must_use]
    pub const fn crime_types(&self) -> &BTreeSet<String> {
        &self.crime_types
    }

    /// Distinct occurrence years, sorted.
    #[must_use]
    pub const fn years(&self) -> &BTreeSet<i32> {
        &self.years
    }

    /// Distinct occurrence months, sorted.
    #[must_use]
    pub const fn months(&self) -> &BTreeSet<u8> {
        &self.months
    }

    /// The `(min, max)` occurrence year, or `None` for an empty dataset.
    #[must_use]
    pub fn year_range(&self) -> Option<(i32, i32)> {
        Some((*self.years.first()?, *self.years.last()?))
    }

    /// District codes used by incidents that have no reference row, sorted.
    #[must_use]
    pub fn unmatched_district_codes(&self) -> Vec<&str> {
        let codes: BTreeSet<&str> = self
            .incidents
            .iter()
            .map(|i| i.region(Granularity::District).code)
            .filter(|code| self.districts.get(code).is_none())
            .collect();
        codes.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use uk_crime_dataset_models::RegionRecord;

    use super::*;
    use crate::progress::null_progress;

    fn incident(year: i32, month: u8, crime_type: &str, district: &str) -> IncidentRecord {
        IncidentRecord {
            year,
            month,
            crime_type: crime_type.to_string(),
            small_area_code: format!("{district}-A"),
            small_area_name: format!("{district} A"),
            district_code: district.to_string(),
            district_name: district.to_string(),
            latitude: None,
            longitude: None,
            location: None,
        }
    }

    fn districts() -> RegionTable {
        RegionTable::from_records([RegionRecord {
            code: "R1".to_string(),
            name: "Region One".to_string(),
            population: 1000,
        }])
        .unwrap()
    }

    #[test]
    fn discovers_vocabulary_and_periods() {
        let dataset = Dataset::new(
            vec![
                incident(2021, 5, "Robbery", "R1"),
                incident(2019, 2, "Burglary", "R1"),
                incident(2020, 5, "Burglary", "R1"),
            ],
            districts(),
        );

        let types: Vec<&str> = dataset.crime_types().iter().map(String::as_str).collect();
        assert_eq!(types, ["Burglary", "Robbery"]);
        assert_eq!(dataset.year_range(), Some((2019, 2021)));
        assert_eq!(dataset.months().iter().copied().collect::<Vec<_>>(), [2, 5]);
        assert_eq!(dataset.incident_count(), 3);
    }

    #[test]
    fn empty_dataset_has_no_year_range() {
        let dataset = Dataset::new(Vec::new(), RegionTable::default());
        assert!(dataset.year_range().is_none());
        assert!(dataset.crime_types().is_empty());
    }

    #[test]
    fn reports_unmatched_district_codes() {
        let dataset = Dataset::new(
            vec![
                incident(2020, 1, "Drugs", "R1"),
                incident(2020, 1, "Drugs", "R9"),
                incident(2020, 2, "Drugs", "R9"),
            ],
            districts(),
        );
        assert_eq!(dataset.unmatched_district_codes(), ["R9"]);
    }

    #[test]
    fn loads_from_files() {
        let dir = std::env::temp_dir().join("uk_crime_dataset_load_test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();

        let incidents_path = dir.join("street.csv");
        std::fs::write(
            &incidents_path,
            "Year,Month,Crime type,LSOA code,LSOA name,District code,District name\n\
             2020,1,Burglary,E01,A,R1,Region One\n",
        )
        .unwrap();
        let districts_path = dir.join("districts.csv");
        std::fs::write(&districts_path, "Code,Name,Population\nR1,Region One,1000\n").unwrap();

        let dataset = Dataset::load(&incidents_path, &districts_path, &null_progress()).unwrap();
        assert_eq!(dataset.incident_count(), 1);
        assert_eq!(dataset.districts().len(), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
