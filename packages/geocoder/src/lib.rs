#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! UK postcode lookup for re-centering the crime map.
//!
//! A postcode typed into the dashboard is normalized, validated and then
//! resolved to a latitude/longitude through a [`PostcodeLookup`]
//! implementation. The only implementation shipped is
//! [`postcodes_io::PostcodesIoClient`], configured from the embedded
//! [`service_registry`].
//!
//! The result is only ever used to move the map. [`locate`] swallows every
//! failure (malformed input, unknown postcode, HTTP error, timeout) with a
//! warning so that the caller can keep the default anchor.

pub mod postcode;
pub mod postcodes_io;
pub mod service_registry;

use async_trait::async_trait;
use thiserror::Error;

pub use postcode::normalize_postcode;

/// A postcode resolved to coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPostcode {
    /// Canonical postcode as returned by the service.
    pub postcode: String,
    /// Latitude (WGS84).
    pub latitude: f64,
    /// Longitude (WGS84).
    pub longitude: f64,
    /// Administrative district name, when the service reports one.
    pub admin_district: Option<String>,
}

/// Errors from postcode lookups.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed (including timeouts).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an unexpected status.
    #[error("Unexpected HTTP status {status}")]
    Status {
        /// The HTTP status code.
        status: u16,
    },

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// The input is not a well-formed UK postcode.
    #[error("Invalid postcode '{postcode}'")]
    InvalidPostcode {
        /// The rejected input, trimmed.
        postcode: String,
    },

    /// Service configuration is missing or malformed.
    #[error("Config error: {message}")]
    Config {
        /// Description of the configuration problem.
        message: String,
    },
}

/// Resolves normalized postcodes to coordinates.
#[async_trait]
pub trait PostcodeLookup: Send + Sync {
    /// Looks up a postcode already in canonical form (see
    /// [`normalize_postcode`]).
    ///
    /// Returns `Ok(None)` if the service does not know the postcode.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the request or response parsing fails.
    async fn lookup(&self, postcode: &str) -> Result<Option<GeocodedPostcode>, GeocodeError>;
}

/// Normalizes and looks up `input`, returning `None` on any failure.
///
/// Failures are logged at warn level and never propagated.
pub async fn locate(lookup: &dyn PostcodeLookup, input: &str) -> Option<GeocodedPostcode> {
    let postcode = match normalize_postcode(input) {
        Ok(postcode) => postcode,
        Err(e) => {
            log::warn!("{e}, keeping default map anchor");
            return None;
        }
    };

    match lookup.lookup(&postcode).await {
        Ok(Some(found)) => {
            log::info!(
                "Postcode {} -> ({:.5}, {:.5})",
                found.postcode,
                found.latitude,
                found.longitude
            );
            Some(found)
        }
        Ok(None) => {
            log::warn!("Postcode {postcode} not found, keeping default map anchor");
            None
        }
        Err(e) => {
            log::warn!("Postcode lookup for {postcode} failed: {e}, keeping default map anchor");
            None
        }
    }
}
