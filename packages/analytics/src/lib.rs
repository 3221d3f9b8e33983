#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Crime rate aggregation and individual-incident selection.
//!
//! [`aggregate::compute_aggregate`] turns incident rows into per-region
//! counts, rates per 1,000 residents and log-scaled display values for the
//! choropleth views. [`points::select_incidents`] returns the raw rows for
//! the scatter view. Both are pure functions of their inputs.

pub mod aggregate;
pub mod points;
pub mod rounding;

use std::collections::BTreeSet;

use thiserror::Error;
use uk_crime_dataset_models::{Granularity, IncidentRecord};

/// Errors that can occur during aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalyticsError {
    /// Incidents reference regions missing from the population reference.
    #[error("{} {granularity} code(s) missing from the region reference: {}", .codes.len(), .codes.join(", "))]
    UnmatchedRegions {
        /// The granularity being normalized.
        granularity: Granularity,
        /// Every unmatched region code, sorted.
        codes: Vec<String>,
    },

    /// One region code carries two different display names.
    #[error("Region {code} is named both '{first}' and '{second}'")]
    ConflictingRegionName {
        /// The region code.
        code: String,
        /// The name seen first.
        first: String,
        /// The conflicting name.
        second: String,
    },
}

/// Returns `true` if `record` is in `year` and one of `crime_types`.
pub(crate) fn matches_filter(
    record: &IncidentRecord,
    year: i32,
    crime_types: &BTreeSet<String>,
) -> bool {
    record.year == year && crime_types.contains(&record.crime_type)
}
