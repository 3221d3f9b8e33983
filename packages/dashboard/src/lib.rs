#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Control-change handlers for the UK crime dashboard.
//!
//! The dataset and boundary files are loaded once at startup into a
//! [`Dashboard`]. Every control change then calls [`Dashboard::update`]
//! with the full [`ControlState`], which recomputes the view from scratch
//! and returns either a choropleth or a point view for the rendering
//! boundary. Nothing is cached between calls.

pub mod config;
pub mod interactive;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use uk_crime_analytics::AnalyticsError;
use uk_crime_analytics::aggregate::compute_aggregate;
use uk_crime_analytics::points::select_incidents;
use uk_crime_analytics_models::{AggregateParams, CrimeTypeSelection, PointParams};
use uk_crime_dashboard_models::{
    ChoroplethView, ControlOptions, ControlState, Controls, GranularityOption, IncidentPoint,
    MapAnchor, PointView, View, ViewMode,
};
use uk_crime_dataset::progress::ProgressCallback;
use uk_crime_dataset::{Dataset, DatasetError};
use uk_crime_dataset_models::Granularity;
use uk_crime_geocoder::{GeocodeError, PostcodeLookup};
use uk_crime_spatial::{BoundaryIndex, BoundarySet, SpatialError};

use crate::config::{BoundaryFileConfig, DashboardConfig, MapConfig};

/// Errors that can occur while starting or driving the dashboard.
#[derive(Debug, thiserror::Error)]
pub enum DashboardError {
    /// The config file could not be read.
    #[error("Failed to read config {}: {source}", .path.display())]
    ConfigRead {
        /// The config path.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The config file is not valid.
    #[error("Invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Loading the incident or district files failed.
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    /// Loading a boundary file failed.
    #[error(transparent)]
    Spatial(#[from] SpatialError),

    /// The aggregate could not be computed.
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    /// The postcode lookup service could not be set up.
    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    /// The incident file has no rows, so there is nothing to select.
    #[error("The incident dataset is empty")]
    EmptyDataset,

    /// An interactive prompt failed.
    #[error("Prompt error: {0}")]
    Prompt(#[from] dialoguer::Error),
}

/// Loaded data plus the postcode lookup, shared by every handler call.
pub struct Dashboard {
    dataset: Arc<Dataset>,
    boundaries: Arc<BoundarySet>,
    lookup: Option<Box<dyn PostcodeLookup>>,
    map: MapConfig,
}

impl std::fmt::Debug for Dashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dashboard")
            .field("incidents", &self.dataset.incident_count())
            .field("boundaries", &self.boundaries)
            .field("geocoding", &self.lookup.is_some())
            .field("map", &self.map)
            .finish()
    }
}

impl Dashboard {
    /// Wraps already-loaded data.
    ///
    /// Without a `lookup`, postcodes are ignored and every view uses the
    /// default anchor.
    #[must_use]
    pub fn new(
        dataset: Arc<Dataset>,
        boundaries: Arc<BoundarySet>,
        lookup: Option<Box<dyn PostcodeLookup>>,
        map: MapConfig,
    ) -> Self {
        Self {
            dataset,
            boundaries,
            lookup,
            map,
        }
    }

    /// Loads every input named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError`] if any file fails to load.
    pub fn load(
        config: &DashboardConfig,
        lookup: Option<Box<dyn PostcodeLookup>>,
        progress: &Arc<dyn ProgressCallback>,
    ) -> Result<Self, DashboardError> {
        let dataset = Dataset::load(&config.data.incidents, &config.data.districts, progress)?;

        let load_boundary = |file: Option<&BoundaryFileConfig>| {
            file.map(|f| BoundaryIndex::load(&f.path, &f.code_property))
                .transpose()
        };
        let boundaries = BoundarySet {
            small_area: load_boundary(config.boundaries.small_area.as_ref())?,
            district: load_boundary(config.boundaries.district.as_ref())?,
        };

        log::info!(
            "Dashboard ready: {} incidents, {} crime types, years {:?}",
            dataset.incident_count(),
            dataset.crime_types().len(),
            dataset.year_range()
        );

        Ok(Self::new(
            Arc::new(dataset),
            Arc::new(boundaries),
            lookup,
            config.map.clone(),
        ))
    }

    /// Option lists and initial values for the controls.
    ///
    /// Defaults are the earliest year and month in the data, every crime
    /// type, district granularity and the aggregate view.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::EmptyDataset`] if there are no incidents.
    pub fn controls(&self) -> Result<Controls, DashboardError> {
        let (min_year, _) = self
            .dataset
            .year_range()
            .ok_or(DashboardError::EmptyDataset)?;
        let min_month = self
            .dataset
            .months()
            .first()
            .copied()
            .ok_or(DashboardError::EmptyDataset)?;

        Ok(Controls {
            options: ControlOptions {
                years: self.dataset.years().iter().copied().collect(),
                months: self.dataset.months().iter().copied().collect(),
                crime_types: self.dataset.crime_types().iter().cloned().collect(),
                granularities: Granularity::all()
                    .iter()
                    .map(|&g| GranularityOption {
                        value: g,
                        label: g.label().to_string(),
                    })
                    .collect(),
                modes: ViewMode::all().to_vec(),
            },
            defaults: ControlState {
                mode: ViewMode::Aggregate,
                year: min_year,
                month: min_month,
                crime_types: CrimeTypeSelection::All,
                granularity: Granularity::District,
                postcode: None,
            },
        })
    }

    /// Recomputes the view for `state`.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::Analytics`] on a data-integrity failure in
    /// aggregate mode. Postcode lookup failures never fail the update.
    pub async fn update(&self, state: &ControlState) -> Result<View, DashboardError> {
        let anchor = self.anchor(state.postcode.as_deref()).await;

        Ok(match state.mode {
            ViewMode::Aggregate => View::Aggregate(self.choropleth(state, anchor)?),
            ViewMode::Individual => View::Individual(self.points(state, anchor)),
        })
    }

    /// Computes the choropleth view for `state`.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError`] on a data-integrity failure.
    pub fn choropleth(
        &self,
        state: &ControlState,
        anchor: MapAnchor,
    ) -> Result<ChoroplethView, AnalyticsError> {
        let params = AggregateParams {
            year: state.year,
            crime_types: state.crime_types.resolve(self.dataset.crime_types()),
            granularity: state.granularity,
        };
        let result = compute_aggregate(self.dataset.incidents(), self.dataset.districts(), &params)?;

        let (features, missing_boundaries) = self
            .boundaries
            .get(params.granularity)
            .map_or((None, Vec::new()), |index| {
                let (collection, missing) = index.to_feature_collection(&result.rows);
                (Some(collection), missing)
            });

        Ok(ChoroplethView {
            params,
            rows: result.rows,
            summary: result.summary,
            features,
            missing_boundaries,
            anchor,
        })
    }

    /// Computes the individual-incident view for `state`.
    #[must_use]
    pub fn points(&self, state: &ControlState, anchor: MapAnchor) -> PointView {
        let params = PointParams {
            year: state.year,
            month: state.month,
            crime_types: state.crime_types.resolve(self.dataset.crime_types()),
        };
        let selected = select_incidents(self.dataset.incidents(), &params);

        let mut type_counts: BTreeMap<String, u64> = BTreeMap::new();
        for record in &selected {
            *type_counts.entry(record.crime_type.clone()).or_default() += 1;
        }

        let points: Vec<IncidentPoint> = selected
            .iter()
            .filter_map(|r| IncidentPoint::from_record(r))
            .collect();
        let unlocated_count = selected.len() - points.len();
        if unlocated_count > 0 {
            log::debug!("{unlocated_count} selected incident(s) have no coordinates");
        }

        PointView {
            params,
            points,
            unlocated_count,
            type_counts,
            anchor,
        }
    }

    /// Resolves the map anchor for an optional postcode.
    ///
    /// Falls back to the configured default on any lookup failure.
    pub async fn anchor(&self, postcode: Option<&str>) -> MapAnchor {
        let default = self.map.default_anchor();

        let Some(postcode) = postcode.map(str::trim).filter(|p| !p.is_empty()) else {
            return default;
        };
        let Some(lookup) = self.lookup.as_deref() else {
            log::warn!("Postcode lookup is disabled, keeping default map anchor");
            return default;
        };
        let Some(found) = uk_crime_geocoder::locate(lookup, postcode).await else {
            return default;
        };

        let district_code = self
            .boundaries
            .get(Granularity::District)
            .and_then(|index| index.region_at(found.longitude, found.latitude))
            .map(str::to_string);

        MapAnchor {
            latitude: found.latitude,
            longitude: found.longitude,
            zoom: self.map.postcode_zoom,
            postcode: Some(found.postcode),
            district_code,
            is_default: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use uk_crime_dataset_models::{IncidentRecord, RegionRecord, RegionTable};
    use uk_crime_geocoder::GeocodedPostcode;

    use super::*;

    struct StubLookup;

    #[async_trait]
    impl PostcodeLookup for StubLookup {
        async fn lookup(&self, postcode: &str) -> Result<Option<GeocodedPostcode>, GeocodeError> {
            match postcode {
                "EC1A 1BB" => Ok(Some(GeocodedPostcode {
                    postcode: postcode.to_string(),
                    latitude: 51.52,
                    longitude: -0.1,
                    admin_district: Some("City of London".to_string()),
                })),
                "ZZ1 1ZZ" => Err(GeocodeError::Status { status: 500 }),
                _ => Ok(None),
            }
        }
    }

    fn incident(
        year: i32,
        month: u8,
        crime_type: &str,
        district: &str,
        located: bool,
    ) -> IncidentRecord {
        IncidentRecord {
            year,
            month,
            crime_type: crime_type.to_string(),
            small_area_code: format!("{district}-A"),
            small_area_name: format!("{district} A"),
            district_code: district.to_string(),
            district_name: format!("{district} name"),
            latitude: located.then_some(51.5),
            longitude: located.then_some(-0.5),
            location: Some("On or near High Street".to_string()),
        }
    }

    fn district_boundaries() -> BoundaryIndex {
        BoundaryIndex::from_geojson_str(
            r#"{"type":"FeatureCollection","features":[
                {"type":"Feature","properties":{"LAD19CD":"R1"},
                 "geometry":{"type":"Polygon","coordinates":[[[-1.0,51.0],[0.0,51.0],[0.0,52.0],[-1.0,52.0],[-1.0,51.0]]]}}
            ]}"#,
            "LAD19CD",
        )
        .unwrap()
    }

    fn dashboard(lookup: Option<Box<dyn PostcodeLookup>>) -> Dashboard {
        let incidents = vec![
            incident(2020, 1, "Burglary", "R1", true),
            incident(2020, 1, "Burglary", "R1", false),
            incident(2020, 2, "Robbery", "R2", true),
            incident(2021, 1, "Drugs", "R1", true),
        ];
        let districts = RegionTable::from_records([
            RegionRecord {
                code: "R1".to_string(),
                name: "R1 name".to_string(),
                population: 1000,
            },
            RegionRecord {
                code: "R2".to_string(),
                name: "R2 name".to_string(),
                population: 500,
            },
        ])
        .unwrap();

        Dashboard::new(
            Arc::new(Dataset::new(incidents, districts)),
            Arc::new(BoundarySet {
                small_area: None,
                district: Some(district_boundaries()),
            }),
            lookup,
            MapConfig::default(),
        )
    }

    fn state(mode: ViewMode) -> ControlState {
        ControlState {
            mode,
            year: 2020,
            month: 1,
            crime_types: CrimeTypeSelection::All,
            granularity: Granularity::District,
            postcode: None,
        }
    }

    #[test]
    fn controls_default_to_earliest_period() {
        let controls = dashboard(None).controls().unwrap();
        assert_eq!(controls.options.years, [2020, 2021]);
        assert_eq!(controls.options.months, [1, 2]);
        assert_eq!(controls.options.crime_types, ["Burglary", "Drugs", "Robbery"]);
        assert_eq!(controls.options.granularities.len(), 2);
        assert_eq!(controls.defaults, state(ViewMode::Aggregate));
    }

    #[test]
    fn controls_on_empty_dataset() {
        let empty = Dashboard::new(
            Arc::new(Dataset::new(Vec::new(), RegionTable::default())),
            Arc::new(BoundarySet::default()),
            None,
            MapConfig::default(),
        );
        assert!(matches!(empty.controls(), Err(DashboardError::EmptyDataset)));
    }

    #[tokio::test]
    async fn aggregate_view_joins_boundaries() {
        let view = dashboard(None)
            .update(&state(ViewMode::Aggregate))
            .await
            .unwrap();
        let View::Aggregate(view) = view else {
            panic!("expected aggregate view");
        };

        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.summary.total_count, 3);
        assert_eq!(view.features.unwrap().features.len(), 1);
        assert_eq!(view.missing_boundaries, ["R2"]);
        assert!(view.anchor.is_default);
    }

    #[tokio::test]
    async fn small_area_view_has_no_features_without_boundaries() {
        let mut s = state(ViewMode::Aggregate);
        s.granularity = Granularity::SmallArea;
        let View::Aggregate(view) = dashboard(None).update(&s).await.unwrap() else {
            panic!("expected aggregate view");
        };
        assert!(view.features.is_none());
        assert!(view.missing_boundaries.is_empty());
        assert!(view.rows.iter().all(|r| r.rate_per_1000.is_none()));
    }

    #[tokio::test]
    async fn empty_selection_gives_empty_view() {
        let mut s = state(ViewMode::Aggregate);
        s.crime_types = CrimeTypeSelection::Only(std::collections::BTreeSet::new());
        let View::Aggregate(view) = dashboard(None).update(&s).await.unwrap() else {
            panic!("expected aggregate view");
        };
        assert!(view.rows.is_empty());
    }

    #[tokio::test]
    async fn unmatched_district_fails_update() {
        let mut s = state(ViewMode::Aggregate);
        s.year = 2021;
        let mut board = dashboard(None);
        board.dataset = Arc::new(Dataset::new(
            vec![incident(2021, 1, "Drugs", "R9", true)],
            RegionTable::default(),
        ));
        let err = board.update(&s).await.unwrap_err();
        assert!(matches!(
            err,
            DashboardError::Analytics(AnalyticsError::UnmatchedRegions { .. })
        ));
    }

    #[tokio::test]
    async fn point_view_splits_located_and_unlocated() {
        let View::Individual(view) = dashboard(None)
            .update(&state(ViewMode::Individual))
            .await
            .unwrap()
        else {
            panic!("expected point view");
        };

        assert_eq!(view.points.len(), 1);
        assert_eq!(view.unlocated_count, 1);
        assert_eq!(view.type_counts.get("Burglary"), Some(&2));
        assert_eq!(view.type_counts.len(), 1);
    }

    #[tokio::test]
    async fn postcode_recenters_without_filtering() {
        let board = dashboard(Some(Box::new(StubLookup)));
        let mut s = state(ViewMode::Aggregate);
        s.postcode = Some("ec1a1bb".to_string());

        let view = board.update(&s).await.unwrap();
        let anchor = view.anchor();
        assert!(!anchor.is_default);
        assert_eq!(anchor.postcode.as_deref(), Some("EC1A 1BB"));
        assert_eq!(anchor.district_code.as_deref(), Some("R1"));
        assert!((anchor.zoom - MapConfig::default().postcode_zoom).abs() < f64::EPSILON);

        let View::Aggregate(view) = view else {
            panic!("expected aggregate view");
        };
        assert_eq!(view.summary.total_count, 3);
    }

    #[tokio::test]
    async fn failed_lookups_keep_default_anchor() {
        let board = dashboard(Some(Box::new(StubLookup)));
        for postcode in ["not a postcode", "M1 1AE", "ZZ1 1ZZ", "   "] {
            let anchor = board.anchor(Some(postcode)).await;
            assert_eq!(anchor, MapConfig::default().default_anchor(), "{postcode}");
        }
    }

    #[tokio::test]
    async fn postcode_ignored_without_lookup() {
        let anchor = dashboard(None).anchor(Some("EC1A 1BB")).await;
        assert!(anchor.is_default);
    }

    #[test]
    fn loads_from_config() {
        let dir = std::env::temp_dir().join("uk_crime_dashboard_load_test");
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("street.csv"),
            "Month,Crime type,LSOA code,LSOA name,District code,District name\n\
             2020-03,Burglary,E01,A,R1,Region One\n",
        )
        .unwrap();
        std::fs::write(dir.join("districts.csv"), "Code,Name,Population\nR1,Region One,1000\n")
            .unwrap();

        let config = DashboardConfig::from_toml_str(
            "[data]\nincidents = \"street.csv\"\ndistricts = \"districts.csv\"\n",
            &dir,
        )
        .unwrap();
        let board =
            Dashboard::load(&config, None, &uk_crime_dataset::progress::null_progress()).unwrap();
        let controls = board.controls().unwrap();
        assert_eq!(controls.defaults.year, 2020);
        assert_eq!(controls.defaults.month, 3);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
