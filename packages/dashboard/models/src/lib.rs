#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Control state and view payload types for the dashboard.
//!
//! These types are what crosses the rendering boundary: the full set of
//! control values sent on every change, the option lists the controls are
//! populated from, and the choropleth and point views returned. They are
//! serialized to JSON and kept separate from the analytics row types so
//! that the view contract can evolve on its own.

use std::collections::BTreeMap;

use geojson::FeatureCollection;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};
use uk_crime_analytics_models::{
    AggregateParams, AggregateRow, AggregateSummary, CrimeTypeSelection, PointParams,
};
use uk_crime_dataset_models::{Granularity, IncidentRecord};

/// Which view the dashboard shows.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ViewMode {
    /// Per-region choropleth for a year.
    #[default]
    Aggregate,
    /// Individual incidents for a year and month.
    Individual,
}

impl ViewMode {
    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Aggregate, Self::Individual]
    }

    /// Human-readable label for selectors.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Aggregate => "Crime rate by area",
            Self::Individual => "Individual crimes",
        }
    }
}

/// Every control value, sent in full on each change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlState {
    /// Which view to produce.
    #[serde(default)]
    pub mode: ViewMode,
    /// Occurrence year.
    pub year: i32,
    /// Occurrence month, 1-12. Only used by [`ViewMode::Individual`].
    pub month: u8,
    /// Crime type multi-select.
    #[serde(default)]
    pub crime_types: CrimeTypeSelection,
    /// Aggregation level. Only used by [`ViewMode::Aggregate`].
    pub granularity: Granularity,
    /// Postcode to center the map on. Never filters rows.
    #[serde(default)]
    pub postcode: Option<String>,
}

/// A selectable granularity with its label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GranularityOption {
    /// The granularity.
    pub value: Granularity,
    /// Label shown in the selector.
    pub label: String,
}

/// Option lists the controls are populated from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlOptions {
    /// Year slider marks, ascending.
    pub years: Vec<i32>,
    /// Month slider marks, ascending.
    pub months: Vec<u8>,
    /// Crime type vocabulary, sorted.
    pub crime_types: Vec<String>,
    /// Granularity choices.
    pub granularities: Vec<GranularityOption>,
    /// View mode choices.
    pub modes: Vec<ViewMode>,
}

/// Control options plus the initial control state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Controls {
    /// Available options.
    pub options: ControlOptions,
    /// Initial values.
    pub defaults: ControlState,
}

/// Where the map is centered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapAnchor {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Map zoom level.
    pub zoom: f64,
    /// The postcode the anchor was resolved from, if any.
    pub postcode: Option<String>,
    /// District containing the anchor, when boundaries are loaded.
    pub district_code: Option<String>,
    /// `true` when this is the national default anchor.
    pub is_default: bool,
}

/// A per-region choropleth view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoroplethView {
    /// The query that produced the rows.
    pub params: AggregateParams,
    /// One row per region, sorted by region code.
    pub rows: Vec<AggregateRow>,
    /// Totals across `rows`.
    pub summary: AggregateSummary,
    /// Boundary polygons joined to `rows`. `None` if no boundary file is
    /// configured for the granularity.
    pub features: Option<FeatureCollection>,
    /// Codes of rows with no boundary polygon.
    pub missing_boundaries: Vec<String>,
    /// Map center.
    pub anchor: MapAnchor,
}

/// One located incident for the scatter view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentPoint {
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Crime type, used for the point colour.
    pub crime_type: String,
    /// Street description, used for hover text.
    pub location: Option<String>,
    /// Small-area name.
    pub small_area_name: String,
    /// District name.
    pub district_name: String,
}

impl IncidentPoint {
    /// Builds a point from an incident, or `None` if it is not geocoded.
    #[must_use]
    pub fn from_record(record: &IncidentRecord) -> Option<Self> {
        let (latitude, longitude) = record.coordinates()?;
        Some(Self {
            latitude,
            longitude,
            crime_type: record.crime_type.clone(),
            location: record.location.clone(),
            small_area_name: record.small_area_name.clone(),
            district_name: record.district_name.clone(),
        })
    }
}

/// An individual-incident view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointView {
    /// The query that produced the points.
    pub params: PointParams,
    /// Located incidents, in input order.
    pub points: Vec<IncidentPoint>,
    /// Matching incidents with no coordinates.
    pub unlocated_count: usize,
    /// Matching incidents per crime type, located or not.
    pub type_counts: BTreeMap<String, u64>,
    /// Map center.
    pub anchor: MapAnchor,
}

/// The view produced by a control change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum View {
    /// [`ViewMode::Aggregate`].
    Aggregate(ChoroplethView),
    /// [`ViewMode::Individual`].
    Individual(PointView),
}

impl View {
    /// The map center of either view.
    #[must_use]
    pub const fn anchor(&self) -> &MapAnchor {
        match self {
            Self::Aggregate(view) => &view.anchor,
            Self::Individual(view) => &view.anchor,
        }
    }
}
