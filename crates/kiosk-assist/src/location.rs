//! Location and crowding context fed into prompts.

use crate::config::MapsConfig;
use crate::error::AssistError;
use async_trait::async_trait;
use kiosk_types::CrowdingLevel;
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Returned when the kiosk does not know where it is.
pub const UNKNOWN_LOCATION: &str = "Ubicación desconocida.";

/// Search radius around the kiosk, in meters.
const NEARBY_STATION_RADIUS_METERS: u32 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Zócalo/Tenochtitlan station.
    pub const ZOCALO: Coordinates = Coordinates {
        latitude: 19.4326,
        longitude: -99.1332,
    };

    /// Finite and within the WGS84 latitude/longitude ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Produces the location string passed to the responder.
#[async_trait]
pub trait LocationProvider: Send + Sync {
    /// Context for the kiosk's own position.
    async fn current_context(&self) -> String;

    /// Context for a position reported by the visitor's device.
    ///
    /// Providers that cannot use coordinates fall back to
    /// [`current_context`](Self::current_context).
    async fn context_near(&self, _coordinates: Coordinates) -> String {
        self.current_context().await
    }
}

/// Uniform occupancy percentage in `[10, 95]`.
pub fn simulated_occupancy() -> u8 {
    rand::thread_rng().gen_range(10..=95)
}

/// Fixed coordinates plus a synthetic crowding reading.
pub struct SimulatedLocationProvider {
    coordinates: Coordinates,
    occupancy: Box<dyn Fn() -> u8 + Send + Sync>,
}

impl SimulatedLocationProvider {
    /// Random occupancy on every call.
    pub fn new(coordinates: Coordinates) -> Self {
        Self::with_occupancy(coordinates, simulated_occupancy)
    }

    pub fn with_occupancy(
        coordinates: Coordinates,
        occupancy: impl Fn() -> u8 + Send + Sync + 'static,
    ) -> Self {
        Self {
            coordinates,
            occupancy: Box::new(occupancy),
        }
    }

    /// Always reports the same occupancy.
    pub fn fixed(coordinates: Coordinates, occupancy: u8) -> Self {
        Self::with_occupancy(coordinates, move || occupancy)
    }

    pub fn describe(&self, occupancy: u8) -> String {
        describe_crowding(self.coordinates, occupancy)
    }
}

fn describe_crowding(coordinates: Coordinates, occupancy: u8) -> String {
    format!(
        "Coordenadas: {}, {}. Afluencia: {} ({}%).",
        coordinates.latitude,
        coordinates.longitude,
        CrowdingLevel::from_occupancy(occupancy).label(),
        occupancy
    )
}

#[async_trait]
impl LocationProvider for SimulatedLocationProvider {
    async fn current_context(&self) -> String {
        self.describe((self.occupancy)())
    }

    async fn context_near(&self, coordinates: Coordinates) -> String {
        describe_crowding(coordinates, (self.occupancy)())
    }
}

#[derive(Deserialize)]
struct NearbySearchResponse {
    status: String,
    #[serde(default)]
    results: Vec<NearbyPlace>,
}

#[derive(Deserialize)]
struct NearbyPlace {
    name: String,
}

/// Nearby-places lookup for transit stations.
#[derive(Debug, Clone)]
pub struct PlacesClient {
    config: MapsConfig,
    client: Client,
}

impl PlacesClient {
    pub fn new(config: MapsConfig) -> Result<Self, AssistError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AssistError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    /// Name of the closest subway station, if any.
    pub async fn nearest_station(
        &self,
        coordinates: Coordinates,
    ) -> Result<Option<String>, AssistError> {
        let location = format!("{},{}", coordinates.latitude, coordinates.longitude);
        let radius = NEARBY_STATION_RADIUS_METERS.to_string();

        let response = self
            .client
            .get(&self.config.places_url)
            .query(&[
                ("location", location.as_str()),
                ("radius", radius.as_str()),
                ("type", "subway_station"),
                ("language", self.config.language.as_str()),
                ("key", self.config.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(AssistError::RemoteService(format!(
                "places HTTP {}",
                response.status()
            )));
        }

        let parsed: NearbySearchResponse = response
            .json()
            .await
            .map_err(|e| AssistError::RemoteService(format!("malformed places response: {}", e)))?;

        match parsed.status.as_str() {
            "OK" | "ZERO_RESULTS" => Ok(parsed.results.into_iter().next().map(|p| p.name)),
            other => Err(AssistError::RemoteService(format!("places status {}", other))),
        }
    }
}

/// Kiosk coordinates, enriched with the nearest station when a places
/// lookup is available.
pub struct StationLocationProvider {
    coordinates: Option<Coordinates>,
    places: Option<PlacesClient>,
}

impl StationLocationProvider {
    pub fn new(coordinates: Option<Coordinates>, places: Option<PlacesClient>) -> Self {
        Self {
            coordinates,
            places,
        }
    }

    async fn describe(&self, coords: Coordinates) -> String {
        if let Some(places) = &self.places {
            match places.nearest_station(coords).await {
                Ok(Some(station)) => {
                    return format!(
                        "El usuario está en Lat:{}, Lon:{}. Estación cercana: {}.",
                        coords.latitude, coords.longitude, station
                    )
                }
                Ok(None) => {}
                Err(e) => warn!(error = %e, "nearby station lookup failed"),
            }
        }

        format!("Coordenadas: {}, {}.", coords.latitude, coords.longitude)
    }
}

#[async_trait]
impl LocationProvider for StationLocationProvider {
    async fn current_context(&self) -> String {
        match self.coordinates {
            Some(coords) => self.describe(coords).await,
            None => UNKNOWN_LOCATION.to_string(),
        }
    }

    async fn context_near(&self, coordinates: Coordinates) -> String {
        self.describe(coordinates).await
    }
}
