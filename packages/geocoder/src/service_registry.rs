//! Compile-time registry of postcode lookup service configurations.
//!
//! Each provider is defined in a TOML file under `services/`. The registry
//! embeds these at compile time and exposes them via [`all_services`] and
//! [`enabled_services`].

use serde::Deserialize;

use crate::GeocodeError;

/// A postcode lookup service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Unique identifier (e.g., `"postcodes_io"`).
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// Whether this service may be used.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Preference order, lower values first.
    pub priority: u32,
    /// Provider-specific configuration.
    pub provider: ProviderConfig,
}

/// Provider-specific configuration, tagged by `type` in TOML.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// The public postcodes.io API.
    PostcodesIo {
        /// Postcode endpoint (e.g., `"https://api.postcodes.io/postcodes"`).
        base_url: String,
        /// Whole-request timeout in seconds.
        #[serde(default = "default_timeout_secs")]
        timeout_secs: u64,
    },
}

const fn default_true() -> bool {
    true
}

const fn default_timeout_secs() -> u64 {
    5
}

impl GeocodingService {
    /// Returns the provider's base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        match &self.provider {
            ProviderConfig::PostcodesIo { base_url, .. } => base_url,
        }
    }
}

const SERVICE_TOMLS: &[(&str, &str)] = &[(
    "postcodes_io",
    include_str!("../services/postcodes_io.toml"),
)];

/// Returns all service configurations (enabled and disabled).
///
/// # Errors
///
/// Returns [`GeocodeError::Config`] if an embedded TOML file is malformed.
pub fn all_services() -> Result<Vec<GeocodingService>, GeocodeError> {
    SERVICE_TOMLS
        .iter()
        .map(|(name, toml_str)| {
            toml::de::from_str(toml_str).map_err(|e| GeocodeError::Config {
                message: format!("Failed to parse geocoding service '{name}': {e}"),
            })
        })
        .collect()
}

/// Returns only enabled services, sorted by priority (ascending).
///
/// # Errors
///
/// Returns [`GeocodeError::Config`] if an embedded TOML file is malformed.
pub fn enabled_services() -> Result<Vec<GeocodingService>, GeocodeError> {
    let mut services: Vec<GeocodingService> =
        all_services()?.into_iter().filter(|s| s.enabled).collect();
    services.sort_by_key(|s| s.priority);
    Ok(services)
}
