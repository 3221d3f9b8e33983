#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Query parameter and result types for the crime rate aggregator and the
//! individual-incident selector.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uk_crime_dataset_models::Granularity;

/// The crime type multi-select as the user left it.
///
/// [`Self::All`] is the "select all" shortcut. It must be expanded with
/// [`Self::resolve`] before querying so that the aggregator only ever sees
/// a concrete set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrimeTypeSelection {
    /// Every crime type in the discovered vocabulary.
    #[default]
    All,
    /// Exactly these crime types. An empty set selects nothing.
    Only(BTreeSet<String>),
}

impl CrimeTypeSelection {
    /// Expands the selection against the discovered `vocabulary`.
    #[must_use]
    pub fn resolve(&self, vocabulary: &BTreeSet<String>) -> BTreeSet<String> {
        match self {
            Self::All => vocabulary.clone(),
            Self::Only(types) => types.clone(),
        }
    }
}

/// Parameters for a per-region aggregate query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateParams {
    /// Occurrence year to select.
    pub year: i32,
    /// Crime types to include.
    pub crime_types: BTreeSet<String>,
    /// Geography to group by.
    pub granularity: Granularity,
}

/// Parameters for an individual-incident (point mode) query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointParams {
    /// Occurrence year to select.
    pub year: i32,
    /// Occurrence month to select, 1-12.
    pub month: u8,
    /// Crime types to include.
    pub crime_types: BTreeSet<String>,
}

/// One region's line in an aggregate result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRow {
    /// Region code.
    pub region_code: String,
    /// Region display name.
    pub region_name: String,
    /// Matching incidents in the region. Always at least 1.
    pub count: u64,
    /// Incidents per 1,000 residents, rounded to 2 places. A rate that
    /// rounds to zero is reported as 1.
    /// Only present at district granularity.
    pub rate_per_1000: Option<f64>,
    /// Natural log of the rate (district) or of the count (small area),
    /// rounded to 2 places. Drives the choropleth colour scale.
    pub log_value: f64,
}

/// Totals across an aggregate result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateSummary {
    /// Sum of `count` over all rows.
    pub total_count: u64,
    /// Number of rows.
    pub region_count: usize,
    /// Smallest `log_value`, `None` when there are no rows.
    pub min_log_value: Option<f64>,
    /// Largest `log_value`, `None` when there are no rows.
    pub max_log_value: Option<f64>,
}

impl AggregateSummary {
    /// Computes the summary of `rows`.
    #[must_use]
    pub fn of(rows: &[AggregateRow]) -> Self {
        let log_values = rows.iter().map(|r| r.log_value);
        Self {
            total_count: rows.iter().map(|r| r.count).sum(),
            region_count: rows.len(),
            min_log_value: log_values.clone().reduce(f64::min),
            max_log_value: log_values.reduce(f64::max),
        }
    }
}

/// Result of an aggregate query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateResult {
    /// The granularity the rows are grouped by.
    pub granularity: Granularity,
    /// One row per region, sorted by region code.
    pub rows: Vec<AggregateRow>,
    /// Totals across `rows`.
    pub summary: AggregateSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocabulary() -> BTreeSet<String> {
        ["Burglary", "Drugs", "Robbery"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn select_all_expands_to_vocabulary() {
        assert_eq!(CrimeTypeSelection::All.resolve(&vocabulary()), vocabulary());
    }

    #[test]
    fn explicit_selection_is_kept() {
        let only: BTreeSet<String> = std::iter::once("Drugs".to_string()).collect();
        let selection = CrimeTypeSelection::Only(only.clone());
        assert_eq!(selection.resolve(&vocabulary()), only);
        assert!(
            CrimeTypeSelection::Only(BTreeSet::new())
                .resolve(&vocabulary())
                .is_empty()
        );
    }

    #[test]
    fn selection_serde_forms() {
        assert_eq!(
            serde_json::to_string(&CrimeTypeSelection::All).unwrap(),
            "\"all\""
        );
        let parsed: CrimeTypeSelection =
            serde_json::from_str(r#"{"only":["Burglary"]}"#).unwrap();
        assert_eq!(
            parsed,
            CrimeTypeSelection::Only(std::iter::once("Burglary".to_string()).collect())
        );
    }

    #[test]
    fn summary_of_rows() {
        let row = |code: &str, count: u64, log_value: f64| AggregateRow {
            region_code: code.to_string(),
            region_name: code.to_string(),
            count,
            rate_per_1000: None,
            log_value,
        };
        let summary = AggregateSummary::of(&[row("A", 3, 1.1), row("B", 1, 0.0)]);
        assert_eq!(summary.total_count, 4);
        assert_eq!(summary.region_count, 2);
        assert_eq!(summary.min_log_value, Some(0.0));
        assert_eq!(summary.max_log_value, Some(1.1));

        let empty = AggregateSummary::of(&[]);
        assert_eq!(empty.total_count, 0);
        assert!(empty.min_log_value.is_none());
    }
}
