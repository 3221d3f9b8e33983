#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Incident and region reference row types.
//!
//! These types represent the two flat tables the dashboard loads at startup:
//! street-level incidents and the district population reference. Both are
//! read-only once loaded. They are distinct from the query parameter and
//! result types in `uk_crime_analytics_models` and the view payloads in
//! `uk_crime_dashboard_models`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Level of UK administrative geography used to group incidents.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Granularity {
    /// Lower-layer super output area (LSOA). Finer, and has no population join.
    SmallArea,
    /// Local authority district. Coarser, with a population reference.
    District,
}

impl Granularity {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::SmallArea, Self::District]
    }

    /// Human-readable label for selectors.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SmallArea => "Small area (LSOA)",
            Self::District => "District",
        }
    }
}

/// A region code and display name as carried on an incident row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegionKey<'a> {
    /// Region code (e.g. `"E01000001"`, `"E09000001"`).
    pub code: &'a str,
    /// Region display name.
    pub name: &'a str,
}

/// One reported street-level crime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    /// Occurrence year.
    pub year: i32,
    /// Occurrence month, 1-12.
    pub month: u8,
    /// Crime type label as it appears in the source file.
    pub crime_type: String,
    /// Small-area (LSOA) code.
    pub small_area_code: String,
    /// Small-area (LSOA) name.
    pub small_area_name: String,
    /// District code.
    pub district_code: String,
    /// District name.
    pub district_name: String,
    /// Latitude (WGS84). `None` if the incident was not geocoded.
    pub latitude: Option<f64>,
    /// Longitude (WGS84). `None` if the incident was not geocoded.
    pub longitude: Option<f64>,
    /// Street description (e.g. "On or near High Street").
    pub location: Option<String>,
}

impl IncidentRecord {
    /// Returns the region this incident falls in at `granularity`.
    #[must_use]
    pub fn region(&self, granularity: Granularity) -> RegionKey<'_> {
        match granularity {
            Granularity::SmallArea => RegionKey {
                code: &self.small_area_code,
                name: &self.small_area_name,
            },
            Granularity::District => RegionKey {
                code: &self.district_code,
                name: &self.district_name,
            },
        }
    }

    /// Returns `(latitude, longitude)` when both are present.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        Some((self.latitude?, self.longitude?))
    }
}

/// One administrative region with its resident population.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionRecord {
    /// Region code, unique within its table.
    pub code: String,
    /// Region display name.
    pub name: String,
    /// Resident population. Always positive.
    pub population: u64,
}

/// Error returned when two reference rows share a region code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateRegionError {
    /// The repeated region code.
    pub code: String,
}

impl std::fmt::Display for DuplicateRegionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "duplicate region code '{}'", self.code)
    }
}

impl std::error::Error for DuplicateRegionError {}

/// Region reference table keyed by region code.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegionTable {
    regions: BTreeMap<String, RegionRecord>,
}

impl RegionTable {
    /// Builds a table from reference rows.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateRegionError`] if two rows share a code.
    pub fn from_records(
        records: impl IntoIterator<Item = RegionRecord>,
    ) -> Result<Self, DuplicateRegionError> {
        let mut regions = BTreeMap::new();
        for record in records {
            if regions.contains_key(&record.code) {
                return Err(DuplicateRegionError { code: record.code });
            }
            regions.insert(record.code.clone(), record);
        }
        Ok(Self { regions })
    }

    /// Looks up a region by code.
    #[must_use]
    pub fn get(&self, code: &str) -> Option<&RegionRecord> {
        self.regions.get(code)
    }

    /// Number of regions in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    /// Returns `true` if the table holds no regions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Iterates regions in code order.
    pub fn iter(&self) -> impl Iterator<Item = &RegionRecord> {
        self.regions.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(code: &str, population: u64) -> RegionRecord {
        RegionRecord {
            code: code.to_string(),
            name: format!("{code} name"),
            population,
        }
    }

    #[test]
    fn region_table_rejects_duplicates() {
        let err = RegionTable::from_records([region("R1", 10), region("R1", 20)]).unwrap_err();
        assert_eq!(err.code, "R1");
    }

    #[test]
    fn region_table_lookup() {
        let table = RegionTable::from_records([region("R2", 500), region("R1", 1000)]).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("R1").unwrap().population, 1000);
        assert!(table.get("R3").is_none());
        let codes: Vec<&str> = table.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, ["R1", "R2"]);
    }

    #[test]
    fn granularity_string_forms() {
        assert_eq!(Granularity::SmallArea.to_string(), "small_area");
        assert_eq!(
            "district".parse::<Granularity>().unwrap(),
            Granularity::District
        );
        assert_eq!(
            serde_json::to_string(&Granularity::SmallArea).unwrap(),
            "\"small_area\""
        );
    }

    #[test]
    fn incident_region_by_granularity() {
        let incident = IncidentRecord {
            year: 2020,
            month: 1,
            crime_type: "Burglary".to_string(),
            small_area_code: "E01000001".to_string(),
            small_area_name: "City of London 001A".to_string(),
            district_code: "E09000001".to_string(),
            district_name: "City of London".to_string(),
            latitude: Some(51.52),
            longitude: None,
            location: None,
        };
        assert_eq!(incident.region(Granularity::SmallArea).code, "E01000001");
        assert_eq!(incident.region(Granularity::District).name, "City of London");
        assert!(incident.coordinates().is_none());
    }
}
