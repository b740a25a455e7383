//! Location lookup with a fixed fallback coordinate.
//!
//! [`GeocodingAdapter::resolve`] never fails: unknown locations, lookup
//! errors and empty results all produce the default coordinate. Every external
//! lookup is preceded by a courtesy delay, and lookups through one adapter are
//! serialized so the delay is honoured across concurrent requests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use legacytree_core::{Error, GeocoderConfig, Result};

pub const DEFAULT_LATITUDE: f64 = 43.6532;
pub const DEFAULT_LONGITUDE: f64 = -79.3832;
pub const DEFAULT_ADDRESS: &str = "Toronto, Canada";
/// Location recorded when the user gave none.
pub const UNKNOWN_LOCATION: &str = "Unknown";

/// A match returned by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Place {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub raw: Value,
}

/// Outcome of a lookup. `resolved` is false when the defaults were used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub resolved: bool,
    /// Provider payload of the match, when there was one.
    pub raw: Option<Value>,
}

impl GeocodeResult {
    pub fn fallback() -> Self {
        Self {
            latitude: DEFAULT_LATITUDE,
            longitude: DEFAULT_LONGITUDE,
            address: DEFAULT_ADDRESS.to_string(),
            resolved: false,
            raw: None,
        }
    }
}

impl From<Place> for GeocodeResult {
    fn from(place: Place) -> Self {
        Self {
            latitude: place.latitude,
            longitude: place.longitude,
            address: place.address,
            resolved: true,
            raw: Some(place.raw),
        }
    }
}

/// External geocoding service.
#[async_trait]
pub trait GeocodeProvider: Send + Sync {
    /// First match for the query, `Ok(None)` when nothing matched.
    async fn lookup(&self, query: &str) -> Result<Option<Place>>;

    fn name(&self) -> &str;
}

/// OpenStreetMap Nominatim search.
pub struct NominatimProvider {
    http: reqwest::Client,
    base_url: String,
}

impl NominatimProvider {
    pub fn new(config: &GeocoderConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl GeocodeProvider for NominatimProvider {
    async fn lookup(&self, query: &str) -> Result<Option<Place>> {
        let url = format!("{}/search", self.base_url);
        debug!("Geocoding '{}' via {}", query, url);

        let response = self
            .http
            .get(&url)
            .query(&[("format", "json"), ("limit", "1"), ("q", query)])
            .send()
            .await
            .map_err(|e| Error::Http(format!("Geocoder request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Http(format!("Geocoder returned {}", response.status())));
        }

        let matches: Vec<Value> = response
            .json()
            .await
            .map_err(|e| Error::Http(format!("Invalid geocoder response: {}", e)))?;

        matches.into_iter().next().map(parse_nominatim).transpose()
    }

    fn name(&self) -> &str {
        "nominatim"
    }
}

/// Nominatim returns coordinates as strings.
fn parse_nominatim(raw: Value) -> Result<Place> {
    let coord = |key: &str| -> Result<f64> {
        match &raw[key] {
            Value::String(s) => s
                .parse()
                .map_err(|_| Error::Http(format!("Invalid {} in geocoder response: {}", key, s))),
            Value::Number(n) => n
                .as_f64()
                .ok_or_else(|| Error::Http(format!("Invalid {} in geocoder response", key))),
            _ => Err(Error::Http(format!("Missing {} in geocoder response", key))),
        }
    };
    let latitude = coord("lat")?;
    let longitude = coord("lon")?;
    let address = raw["display_name"].as_str().unwrap_or_default().to_string();
    Ok(Place {
        latitude,
        longitude,
        address,
        raw,
    })
}

/// Resolves free-text locations, falling back to the default coordinate.
pub struct GeocodingAdapter {
    provider: Arc<dyn GeocodeProvider>,
    delay: Duration,
    /// One lookup at a time, each preceded by the full delay (the first one too,
    /// which a token-bucket limiter would let through immediately).
    gate: Mutex<()>,
}

impl GeocodingAdapter {
    pub fn new(provider: Arc<dyn GeocodeProvider>, delay: Duration) -> Self {
        Self {
            provider,
            delay,
            gate: Mutex::new(()),
        }
    }

    /// Adapter backed by Nominatim with the configured delay.
    pub fn from_config(config: &GeocoderConfig) -> Result<Self> {
        let provider = NominatimProvider::new(config)?;
        info!("Geocoder configured: {}", config.base_url);
        Ok(Self::new(
            Arc::new(provider),
            Duration::from_millis(config.delay_ms),
        ))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub async fn resolve(&self, location: &str) -> GeocodeResult {
        let query = location.trim();
        if query.is_empty() || query.eq_ignore_ascii_case(UNKNOWN_LOCATION) {
            return GeocodeResult::fallback();
        }

        let _turn = self.gate.lock().await;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match self.provider.lookup(query).await {
            Ok(Some(place)) => {
                debug!("Geocoded '{}' to ({}, {})", query, place.latitude, place.longitude);
                place.into()
            }
            Ok(None) => {
                warn!("No geocoding match for '{}', using default location", query);
                GeocodeResult::fallback()
            }
            Err(e) => {
                warn!("Geocoding error for '{}': {}. Using default location.", query, e);
                GeocodeResult::fallback()
            }
        }
    }
}
