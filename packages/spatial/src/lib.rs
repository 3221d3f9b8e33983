#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! In-memory boundary polygons for the choropleth views.
//!
//! Loads a `GeoJSON` `FeatureCollection` of region boundaries once at startup,
//! keys each polygon by the region code found in a configurable feature
//! property, and builds an R-tree for point-in-region lookups. The
//! dashboard joins aggregate rows to these polygons to build the choropleth
//! `FeatureCollection`, and uses the lookup to report which district a
//! geocoded anchor falls in.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use geo::{Contains, MultiPolygon};
use geojson::{Feature, FeatureCollection, GeoJson, JsonObject, JsonValue};
use rstar::{AABB, RTree, RTreeObject};
use uk_crime_analytics_models::AggregateRow;
use uk_crime_dataset_models::Granularity;

/// Errors that can occur while loading boundary files.
#[derive(Debug, thiserror::Error)]
pub enum SpatialError {
    /// The boundary file could not be read.
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        /// The path that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The file is not valid `GeoJSON`.
    #[error("GeoJSON error: {0}")]
    GeoJson(#[from] Box<geojson::Error>),

    /// The top-level object is not a `FeatureCollection`.
    #[error("Expected a GeoJSON FeatureCollection")]
    NotFeatureCollection,

    /// A feature has no string value for the code property.
    #[error("Feature {index} has no string '{property}' property")]
    MissingCodeProperty {
        /// 0-based position of the feature in the collection.
        index: usize,
        /// The configured code property.
        property: String,
    },

    /// Two features share a region code.
    #[error("Duplicate boundary for region {code}")]
    DuplicateCode {
        /// The repeated region code.
        code: String,
    },
}

/// A boundary polygon with its region code.
struct Boundary {
    code: String,
    geometry: geojson::Geometry,
    polygon: MultiPolygon<f64>,
}

/// R-tree entry pointing back into the boundary list.
struct BoundaryEnvelope {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for BoundaryEnvelope {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// Boundary polygons for one granularity, keyed by region code.
pub struct BoundaryIndex {
    boundaries: Vec<Boundary>,
    by_code: BTreeMap<String, usize>,
    tree: RTree<BoundaryEnvelope>,
}

impl std::fmt::Debug for BoundaryIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoundaryIndex")
            .field("boundaries", &self.boundaries.len())
            .finish_non_exhaustive()
    }
}

impl BoundaryIndex {
    /// Loads a boundary `FeatureCollection` from `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError`] if the file cannot be read or parsed, or if
    /// any polygon feature lacks `code_property` or repeats a code.
    pub fn load(path: &Path, code_property: &str) -> Result<Self, SpatialError> {
        let text = std::fs::read_to_string(path).map_err(|source| SpatialError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let index = Self::from_geojson_str(&text, code_property)?;
        log::info!(
            "Loaded {} boundaries from {} (keyed by {code_property})",
            index.len(),
            path.display()
        );
        Ok(index)
    }

    /// Parses a boundary `FeatureCollection` from a string.
    ///
    /// Features whose geometry is missing or not a `Polygon`/`MultiPolygon`
    /// are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`SpatialError`] if the text is not a `FeatureCollection`, or
    /// if any polygon feature lacks `code_property` or repeats a code.
    pub fn from_geojson_str(text: &str, code_property: &str) -> Result<Self, SpatialError> {
        let geojson = text.parse::<GeoJson>().map_err(Box::new)?;
        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(SpatialError::NotFeatureCollection);
        };

        let mut boundaries = Vec::with_capacity(collection.features.len());
        let mut by_code = BTreeMap::new();

        for (index, feature) in collection.features.into_iter().enumerate() {
            let code = feature
                .property(code_property)
                .and_then(JsonValue::as_str)
                .map(str::to_string);

            let Some(geometry) = feature.geometry else {
                log::warn!("Skipping boundary feature {index}: no geometry");
                continue;
            };
            let Some(polygon) = to_multipolygon(&geometry) else {
                log::warn!("Skipping boundary feature {index}: not a polygon");
                continue;
            };

            let Some(code) = code else {
                return Err(SpatialError::MissingCodeProperty {
                    index,
                    property: code_property.to_string(),
                });
            };
            if by_code.contains_key(&code) {
                return Err(SpatialError::DuplicateCode { code });
            }

            by_code.insert(code.clone(), boundaries.len());
            boundaries.push(Boundary {
                code,
                geometry,
                polygon,
            });
        }

        let tree = RTree::bulk_load(
            boundaries
                .iter()
                .enumerate()
                .map(|(index, b)| BoundaryEnvelope {
                    index,
                    envelope: compute_envelope(&b.polygon),
                })
                .collect(),
        );

        Ok(Self {
            boundaries,
            by_code,
            tree,
        })
    }

    /// Number of boundaries loaded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boundaries.len()
    }

    /// Returns `true` if no boundaries were loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boundaries.is_empty()
    }

    /// Returns the code of the region containing the point.
    ///
    /// Regions at one granularity tile the country without overlap, so the
    /// first match wins.
    #[must_use]
    pub fn region_at(&self, lng: f64, lat: f64) -> Option<&str> {
        let point = geo::Point::new(lng, lat);
        let query_env = AABB::from_point([lng, lat]);

        self.tree
            .locate_in_envelope_intersecting(&query_env)
            .map(|entry| &self.boundaries[entry.index])
            .find(|boundary| boundary.polygon.contains(&point))
            .map(|boundary| boundary.code.as_str())
    }

    /// Joins aggregate rows to their boundary polygons.
    ///
    /// Returns one feature per row that has a boundary, in row order, plus
    /// the codes of rows with no boundary.
    #[must_use]
    pub fn to_feature_collection(&self, rows: &[AggregateRow]) -> (FeatureCollection, Vec<String>) {
        let mut features = Vec::with_capacity(rows.len());
        let mut missing = Vec::new();

        for row in rows {
            let Some(&index) = self.by_code.get(&row.region_code) else {
                missing.push(row.region_code.clone());
                continue;
            };
            features.push(Feature {
                bbox: None,
                geometry: Some(self.boundaries[index].geometry.clone()),
                id: Some(geojson::feature::Id::String(row.region_code.clone())),
                properties: Some(row_properties(row)),
                foreign_members: None,
            });
        }

        if !missing.is_empty() {
            log::warn!("{} region(s) have no boundary polygon", missing.len());
        }

        (
            FeatureCollection {
                bbox: None,
                features,
                foreign_members: None,
            },
            missing,
        )
    }
}

/// Boundary indexes for both granularities. Either may be absent when no
/// boundary file is configured.
#[derive(Debug, Default)]
pub struct BoundarySet {
    /// Small-area (LSOA) boundaries.
    pub small_area: Option<BoundaryIndex>,
    /// District boundaries.
    pub district: Option<BoundaryIndex>,
}

impl BoundarySet {
    /// The index for `granularity`, if loaded.
    #[must_use]
    pub const fn get(&self, granularity: Granularity) -> Option<&BoundaryIndex> {
        match granularity {
            Granularity::SmallArea => self.small_area.as_ref(),
            Granularity::District => self.district.as_ref(),
        }
    }
}

fn row_properties(row: &AggregateRow) -> JsonObject {
    let mut properties = JsonObject::new();
    properties.insert("code".to_string(), JsonValue::from(row.region_code.clone()));
    properties.insert("name".to_string(), JsonValue::from(row.region_name.clone()));
    properties.insert("count".to_string(), JsonValue::from(row.count));
    properties.insert(
        "ratePer1000".to_string(),
        row.rate_per_1000.map_or(JsonValue::Null, JsonValue::from),
    );
    properties.insert("logValue".to_string(), JsonValue::from(row.log_value));
    properties
}

/// Converts a `GeoJSON` geometry into a [`MultiPolygon`].
/// Handles both `Polygon` and `MultiPolygon` geometry types.
fn to_multipolygon(geometry: &geojson::Geometry) -> Option<MultiPolygon<f64>> {
    let geo_geom: geo::Geometry<f64> = geometry.clone().try_into().ok()?;
    match geo_geom {
        geo::Geometry::MultiPolygon(mp) => Some(mp),
        geo::Geometry::Polygon(p) => Some(MultiPolygon(vec![p])),
        _ => None,
    }
}

/// Compute the bounding box envelope for a [`MultiPolygon`].
fn compute_envelope(mp: &MultiPolygon<f64>) -> AABB<[f64; 2]> {
    use geo::BoundingRect;

    mp.bounding_rect().map_or_else(
        || AABB::from_point([0.0, 0.0]),
        |rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]),
    )
}
