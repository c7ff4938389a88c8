//! Question answering for the Metro kiosk.
//!
//! Everything between "the visitor said something" and "the avatar has a
//! sentence to speak" lives here:
//!
//! - [`llm`]: the hosted language model, behind [`LanguageModel`].
//! - [`responder`]: structured replies (spoken text, optional route) with a
//!   fixed fallback whenever the model misbehaves.
//! - [`classifier`]: closed-set intent classification mapped to canned
//!   answer bundles.
//! - [`directions`] and [`narrator`]: transit directions condensed into a
//!   short spoken narrative.
//! - [`location`]: the location/crowding context fed into prompts.
//! - [`map`]: embeddable route map URLs for the presentation surface.
//! - [`persona`]: per-mode prompts and greetings.
//!
//! Components in this crate never surface hosted-service failures to the
//! conversation. Each one has a defined fallback value.

pub mod classifier;
pub mod config;
pub mod directions;
pub mod error;
pub mod llm;
pub mod location;
pub mod map;
pub mod narrator;
pub mod persona;
pub mod responder;

pub use classifier::{canned_bundle, CannedBundle, IntentClassifier};
pub use config::{LlmConfig, MapsConfig};
pub use directions::{
    DirectionsService, GoogleDirectionsClient, RouteStep, TransitDetails, TransitRoute,
    TravelMode,
};
pub use error::AssistError;
pub use llm::{GeminiClient, LanguageModel};
pub use location::{
    Coordinates, LocationProvider, PlacesClient, SimulatedLocationProvider,
    StationLocationProvider,
};
pub use map::MapEmbedBuilder;
pub use narrator::RouteNarrator;
pub use responder::{IntentResponder, ReplyOutcome, FALLBACK_REPLY_TEXT};
