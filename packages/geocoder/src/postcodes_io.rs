//! postcodes.io client.
//!
//! Free, no API key. Returns the centroid of a postcode unit along with its
//! administrative district.
//!
//! See <https://postcodes.io/docs>

use std::time::Duration;

use async_trait::async_trait;

use crate::service_registry::{self, GeocodingService, ProviderConfig};
use crate::{GeocodeError, GeocodedPostcode, PostcodeLookup};

/// Postcode lookup against the postcodes.io REST API.
#[derive(Debug, Clone)]
pub struct PostcodesIoClient {
    client: reqwest::Client,
    base_url: String,
}

impl PostcodesIoClient {
    /// Builds a client from a service configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new(service: &GeocodingService) -> Result<Self, GeocodeError> {
        let ProviderConfig::PostcodesIo {
            base_url,
            timeout_secs,
        } = &service.provider;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(*timeout_secs))
            .user_agent(concat!("uk-crime-map/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Builds a client from the highest-priority enabled service in the
    /// embedded registry.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Config`] if no service is enabled, or
    /// [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn from_registry() -> Result<Self, GeocodeError> {
        let services = service_registry::enabled_services()?;
        let service = services.first().ok_or_else(|| GeocodeError::Config {
            message: "No postcode lookup service is enabled".to_string(),
        })?;
        log::debug!("Using postcode lookup service {} ({})", service.name, service.base_url());
        Self::new(service)
    }
}

#[async_trait]
impl PostcodeLookup for PostcodesIoClient {
    async fn lookup(&self, postcode: &str) -> Result<Option<GeocodedPostcode>, GeocodeError> {
        let compact: String = postcode.chars().filter(|c| !c.is_whitespace()).collect();
        let url = format!("{}/{compact}", self.base_url);

        let resp = self.client.get(&url).send().await?;

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !resp.status().is_success() {
            return Err(GeocodeError::Status {
                status: resp.status().as_u16(),
            });
        }

        let body: serde_json::Value = resp.json().await?;
        parse_response(&body)
    }
}

/// Parses a postcodes.io single-postcode response.
///
/// Terminated and some non-geographic postcodes come back with null
/// coordinates; those are treated as not found.
fn parse_response(body: &serde_json::Value) -> Result<Option<GeocodedPostcode>, GeocodeError> {
    let result = body.get("result").ok_or_else(|| GeocodeError::Parse {
        message: "postcodes.io response has no result".to_string(),
    })?;

    if result.is_null() {
        return Ok(None);
    }

    let postcode = result["postcode"]
        .as_str()
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing postcode in postcodes.io response".to_string(),
        })?
        .to_string();

    let (Some(latitude), Some(longitude)) =
        (result["latitude"].as_f64(), result["longitude"].as_f64())
    else {
        log::debug!("Postcode {postcode} has no coordinates");
        return Ok(None);
    };

    Ok(Some(GeocodedPostcode {
        postcode,
        latitude,
        longitude,
        admin_district: result["admin_district"].as_str().map(String::from),
    }))
}
