//! Embeddable route maps.

use crate::config::MapsConfig;
use crate::error::AssistError;
use kiosk_types::MapReference;
use url::Url;

const TRANSIT: &str = "transit";

/// Builds map references for the presentation surface.
#[derive(Debug, Clone)]
pub struct MapEmbedBuilder {
    embed_url: String,
    api_key: String,
}

impl MapEmbedBuilder {
    pub fn new(config: &MapsConfig) -> Self {
        Self {
            embed_url: config.embed_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Transit route map from `origin` to `destination`.
    pub fn route_map(&self, origin: &str, destination: &str) -> Result<MapReference, AssistError> {
        let url = Url::parse_with_params(
            &self.embed_url,
            &[
                ("key", self.api_key.as_str()),
                ("origin", origin),
                ("destination", destination),
                ("mode", TRANSIT),
            ],
        )
        .map_err(|e| AssistError::Config(format!("invalid map embed url: {}", e)))?;

        Ok(MapReference {
            origin: origin.to_string(),
            destination: destination.to_string(),
            travel_mode: TRANSIT.to_string(),
            embed_url: url.into(),
        })
    }
}
