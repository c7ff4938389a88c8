//! Transit directions lookup.

use crate::config::MapsConfig;
use crate::error::AssistError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TravelMode {
    Transit,
    Walking,
    Other,
}

/// Transit-specific part of a step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitDetails {
    /// Spoken vehicle name, e.g. "Metro" or "Tren ligero".
    pub vehicle: String,
    /// Line short name, falling back to the long name.
    pub line: String,
    /// Direction shown on the vehicle.
    pub headsign: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteStep {
    pub travel_mode: TravelMode,
    pub transit: Option<TransitDetails>,
}

impl RouteStep {
    pub fn transit(vehicle: &str, line: &str, headsign: &str) -> Self {
        Self {
            travel_mode: TravelMode::Transit,
            transit: Some(TransitDetails {
                vehicle: vehicle.to_string(),
                line: line.to_string(),
                headsign: headsign.to_string(),
            }),
        }
    }

    pub fn walking() -> Self {
        Self {
            travel_mode: TravelMode::Walking,
            transit: None,
        }
    }
}

/// One route alternative, steps flattened across legs in travel order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitRoute {
    pub duration_seconds: u64,
    pub steps: Vec<RouteStep>,
}

impl TransitRoute {
    /// Transit steps in travel order.
    pub fn transit_legs(&self) -> impl Iterator<Item = &TransitDetails> {
        self.steps.iter().filter_map(|s| s.transit.as_ref())
    }
}

/// Source of transit directions.
#[async_trait]
pub trait DirectionsService: Send + Sync {
    /// Transit alternatives departing now. An empty list means no route.
    async fn transit_routes(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<Vec<TransitRoute>, AssistError>;
}

#[derive(Deserialize)]
struct DirectionsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    routes: Vec<WireRoute>,
}

#[derive(Deserialize)]
struct WireRoute {
    #[serde(default)]
    legs: Vec<WireLeg>,
}

#[derive(Deserialize)]
struct WireLeg {
    duration: Option<WireDuration>,
    #[serde(default)]
    steps: Vec<WireStep>,
}

#[derive(Deserialize)]
struct WireDuration {
    value: u64,
}

#[derive(Deserialize)]
struct WireStep {
    travel_mode: String,
    transit_details: Option<WireTransitDetails>,
}

#[derive(Deserialize)]
struct WireTransitDetails {
    #[serde(default)]
    headsign: String,
    line: WireLine,
}

#[derive(Deserialize)]
struct WireLine {
    short_name: Option<String>,
    name: Option<String>,
    vehicle: Option<WireVehicle>,
}

#[derive(Deserialize)]
struct WireVehicle {
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Spoken name for a vehicle type code.
fn vehicle_label(kind: &str) -> &'static str {
    match kind {
        "SUBWAY" | "METRO_RAIL" => "Metro",
        "TRAM" | "LIGHT_RAIL" => "Tren ligero",
        "BUS" | "INTERCITY_BUS" => "autobús",
        "TROLLEYBUS" => "trolebús",
        "RAIL" | "HEAVY_RAIL" | "COMMUTER_TRAIN" => "tren",
        "CABLE_CAR" | "GONDOLA_LIFT" => "Cablebús",
        _ => "transporte",
    }
}

impl From<WireStep> for RouteStep {
    fn from(step: WireStep) -> Self {
        let travel_mode = match step.travel_mode.as_str() {
            "TRANSIT" => TravelMode::Transit,
            "WALKING" => TravelMode::Walking,
            _ => TravelMode::Other,
        };

        let transit = match (travel_mode, step.transit_details) {
            (TravelMode::Transit, Some(details)) => {
                let vehicle = details
                    .line
                    .vehicle
                    .map(|v| {
                        v.name
                            .filter(|n| !n.trim().is_empty())
                            .unwrap_or_else(|| vehicle_label(v.kind.as_deref().unwrap_or("")).to_string())
                    })
                    .unwrap_or_else(|| vehicle_label("").to_string());
                let line = details
                    .line
                    .short_name
                    .filter(|n| !n.trim().is_empty())
                    .or(details.line.name)
                    .unwrap_or_default();
                Some(TransitDetails {
                    vehicle,
                    line,
                    headsign: details.headsign,
                })
            }
            _ => None,
        };

        RouteStep {
            travel_mode,
            transit,
        }
    }
}

impl From<WireRoute> for TransitRoute {
    fn from(route: WireRoute) -> Self {
        let duration_seconds = route
            .legs
            .iter()
            .filter_map(|l| l.duration.as_ref())
            .map(|d| d.value)
            .sum();
        let steps = route
            .legs
            .into_iter()
            .flat_map(|l| l.steps)
            .map(RouteStep::from)
            .collect();
        TransitRoute {
            duration_seconds,
            steps,
        }
    }
}

/// Google Directions client.
#[derive(Debug, Clone)]
pub struct GoogleDirectionsClient {
    config: MapsConfig,
    client: Client,
}

impl GoogleDirectionsClient {
    pub fn new(config: MapsConfig) -> Result<Self, AssistError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AssistError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }
}

#[async_trait]
impl DirectionsService for GoogleDirectionsClient {
    async fn transit_routes(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<Vec<TransitRoute>, AssistError> {
        let response = self
            .client
            .get(&self.config.directions_url)
            .query(&[
                ("origin", origin),
                ("destination", destination),
                ("mode", "transit"),
                ("departure_time", "now"),
                ("language", self.config.language.as_str()),
                ("key", self.config.api_key.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AssistError::RemoteService(format!("HTTP {}: {}", status, body)));
        }

        let parsed: DirectionsResponse = response
            .json()
            .await
            .map_err(|e| AssistError::RemoteService(format!("malformed directions: {}", e)))?;

        match parsed.status.as_str() {
            "OK" => {}
            "ZERO_RESULTS" | "NOT_FOUND" => {
                debug!(origin, destination, status = %parsed.status, "no transit route");
                return Ok(Vec::new());
            }
            other => {
                return Err(AssistError::RemoteService(format!(
                    "directions status {}: {}",
                    other,
                    parsed.error_message.unwrap_or_default()
                )))
            }
        }

        Ok(parsed.routes.into_iter().map(TransitRoute::from).collect())
    }
}
