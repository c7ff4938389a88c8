//! The kiosk orchestrator.
//!
//! [`Kiosk`] ties the hosted services together for one visit: it owns the
//! avatar session and the conversation state, and runs each interaction as
//! a single linear sequence of awaited calls. Callers serialize access (the
//! HTTP layer keeps it behind one async mutex), so at most one interaction
//! is in flight.

use crate::config::{Config, ResponseStrategy};
use crate::conversation::ConversationState;
use kiosk_assist::{
    persona, AssistError, Coordinates, DirectionsService, GeminiClient, GoogleDirectionsClient,
    IntentClassifier, IntentResponder, LanguageModel, LocationProvider, MapEmbedBuilder,
    PlacesClient, RouteNarrator, SimulatedLocationProvider, StationLocationProvider,
};
use kiosk_types::{ConversationTurn, MapReference, Mode, Reply};
use kiosk_voice::{
    AvatarClient, AvatarSessionManager, AvatarStream, GoogleSpeechTranscriber, IceCandidate,
    Session, SessionDescription, SpeechTranscriber, VoiceError,
};
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors surfaced by the orchestrator.
#[derive(Debug, Error)]
pub enum KioskError {
    /// No live avatar session; the visitor has to retry creating one.
    #[error("avatar session unavailable")]
    SessionUnavailable,

    #[error("query is empty")]
    EmptyQuery,

    #[error(transparent)]
    Voice(#[from] VoiceError),

    #[error(transparent)]
    Assist(#[from] AssistError),
}

/// Hosted services the kiosk talks to.
pub struct KioskServices {
    pub avatar: Arc<dyn AvatarStream>,
    pub transcriber: Arc<dyn SpeechTranscriber>,
    pub location: Arc<dyn LocationProvider>,
    pub model: Arc<dyn LanguageModel>,
    pub directions: Arc<dyn DirectionsService>,
    pub maps: MapEmbedBuilder,
}

/// Conversation behavior that does not depend on a service.
#[derive(Debug, Clone)]
pub struct KioskSettings {
    pub route_origin: String,
    pub strategy: ResponseStrategy,
}

/// Result of one answered utterance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Exchange {
    pub reply: Reply,
    /// Text pushed to the avatar stream, narration included.
    pub spoken: String,
    /// The assistant turn appended to the transcript.
    pub turn: ConversationTurn,
    /// Whether the fixed fallback replaced the model reply.
    pub fallback: bool,
}

/// What happened to a submitted audio capture.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AudioOutcome {
    /// Same capture id as the previous submission; ignored.
    Duplicate,
    /// Nothing was recognized.
    NoInput,
    Answered {
        transcript: String,
        exchange: Exchange,
    },
}

pub struct Kiosk {
    avatar: AvatarSessionManager,
    transcriber: Arc<dyn SpeechTranscriber>,
    location: Arc<dyn LocationProvider>,
    responder: IntentResponder,
    classifier: IntentClassifier,
    narrator: RouteNarrator,
    maps: MapEmbedBuilder,
    settings: KioskSettings,
    state: ConversationState,
}

impl Kiosk {
    pub fn new(services: KioskServices, settings: KioskSettings) -> Self {
        Self {
            avatar: AvatarSessionManager::new(services.avatar),
            transcriber: services.transcriber,
            location: services.location,
            responder: IntentResponder::new(services.model.clone()),
            classifier: IntentClassifier::new(services.model),
            narrator: RouteNarrator::new(services.directions),
            maps: services.maps,
            settings,
            state: ConversationState::new(),
        }
    }

    /// Builds a kiosk backed by the hosted services in `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if a client cannot be constructed, for example when
    /// the avatar credentials are empty.
    pub fn from_config(config: &Config) -> Result<Self, KioskError> {
        let avatar = AvatarClient::new(config.avatar.clone())?;
        let transcriber = GoogleSpeechTranscriber::new(config.speech.clone())?;
        let model = GeminiClient::new(config.llm.clone())?;
        let directions = GoogleDirectionsClient::new(config.maps.clone())?;

        let location: Arc<dyn LocationProvider> = if config.kiosk.simulate_crowding {
            let coordinates = config.kiosk.location.unwrap_or(Coordinates::ZOCALO);
            Arc::new(SimulatedLocationProvider::new(coordinates))
        } else {
            let places = PlacesClient::new(config.maps.clone())?;
            Arc::new(StationLocationProvider::new(
                config.kiosk.location,
                Some(places),
            ))
        };

        let services = KioskServices {
            avatar: Arc::new(avatar),
            transcriber: Arc::new(transcriber),
            location,
            model: Arc::new(model),
            directions: Arc::new(directions),
            maps: MapEmbedBuilder::new(&config.maps),
        };
        let settings = KioskSettings {
            route_origin: config.kiosk.route_origin.clone(),
            strategy: config.kiosk.strategy,
        };

        Ok(Self::new(services, settings))
    }

    pub fn session(&self) -> Option<&Session> {
        self.avatar.session()
    }

    /// Creates a fresh avatar session, replacing any previous one.
    pub async fn create_session(&mut self) -> Result<Session, KioskError> {
        Ok(self.avatar.create_session().await?.clone())
    }

    pub async fn submit_answer(&self, answer: &SessionDescription) -> Result<(), KioskError> {
        Ok(self.avatar.submit_answer(answer).await?)
    }

    pub async fn submit_ice_candidate(&self, candidate: &IceCandidate) -> Result<(), KioskError> {
        Ok(self.avatar.submit_ice_candidate(candidate).await?)
    }

    pub fn mode(&self) -> Option<Mode> {
        self.state.mode()
    }

    pub fn transcript(&self) -> &[ConversationTurn] {
        self.state.transcript()
    }

    pub fn settings(&self) -> &KioskSettings {
        &self.settings
    }

    /// Selects `mode`, resets the transcript and greets the visitor.
    pub async fn enter_mode(&mut self, mode: Mode) -> ConversationTurn {
        self.state.enter_mode(mode);
        info!(mode = mode.as_str(), "mode entered");

        let greeting = persona::greeting(mode);
        self.avatar.send_text(greeting).await;

        let turn = ConversationTurn::assistant(greeting);
        self.state.push(turn.clone());
        turn
    }

    pub fn exit_mode(&mut self) {
        if let Some(mode) = self.state.mode() {
            info!(mode = mode.as_str(), "mode exited");
        }
        self.state.exit_mode();
    }

    /// Location and crowding context as fed to the responder.
    pub async fn context(&self) -> String {
        self.location.current_context().await
    }

    /// Answers a typed or transcribed utterance.
    ///
    /// # Errors
    ///
    /// `SessionUnavailable` when there is no avatar session to speak
    /// through, `EmptyQuery` for blank input. Service failures past that
    /// point are absorbed into fallback replies.
    pub async fn handle_query(&mut self, query: &str) -> Result<Exchange, KioskError> {
        self.handle_query_near(query, None).await
    }

    /// Like [`handle_query`](Self::handle_query), with the position
    /// reported by the visitor's device taking the place of the kiosk's
    /// own location context.
    pub async fn handle_query_near(
        &mut self,
        query: &str,
        visitor: Option<Coordinates>,
    ) -> Result<Exchange, KioskError> {
        if self.avatar.session().is_none() {
            return Err(KioskError::SessionUnavailable);
        }
        let query = query.trim();
        if query.is_empty() {
            return Err(KioskError::EmptyQuery);
        }

        self.state.push(ConversationTurn::user(query));

        let (reply, video, fallback) = match self.settings.strategy {
            ResponseStrategy::Generated => {
                let context = persona::context(self.state.mode());
                let location = match visitor {
                    Some(coordinates) => self.location.context_near(coordinates).await,
                    None => self.location.current_context().await,
                };
                let outcome = self.responder.respond(query, context, &location).await;
                let fallback = outcome.is_fallback();
                (outcome.into_reply(), None, fallback)
            }
            ResponseStrategy::Canned => {
                let bundle = self.classifier.answer(query).await;
                debug!(category = bundle.category.token(), "canned answer selected");
                (bundle.to_reply(), Some(bundle.video), false)
            }
        };

        let mut spoken = reply.response_text.clone();
        let mut map = None;
        if let Some(destination) = reply.route_destination() {
            let origin = self.settings.route_origin.as_str();
            let narration = self.narrator.narrate(origin, destination).await;
            spoken = format!("{} {}", spoken.trim_end(), narration);
            map = self.route_map(origin, destination);
        }

        self.avatar.send_text(&spoken).await;

        let mut turn = ConversationTurn::assistant(spoken.clone());
        if let Some(map) = map {
            turn = turn.with_map(map);
        }
        if let Some(video) = video {
            turn = turn.with_video(video);
        }
        self.state.push(turn.clone());

        info!(
            strategy = self.settings.strategy.as_str(),
            show_route = reply.show_route,
            fallback,
            "query answered"
        );

        Ok(Exchange {
            reply,
            spoken,
            turn,
            fallback,
        })
    }

    fn route_map(&self, origin: &str, destination: &str) -> Option<MapReference> {
        match self.maps.route_map(origin, destination) {
            Ok(map) => Some(map),
            Err(e) => {
                warn!(destination, error = %e, "could not build route map");
                None
            }
        }
    }

    /// Transcribes and answers one audio capture.
    ///
    /// A capture id equal to the previous one is ignored, so a surface that
    /// re-submits the same recording triggers a single cycle.
    pub async fn handle_audio(
        &mut self,
        capture_id: &str,
        audio: &[u8],
    ) -> Result<AudioOutcome, KioskError> {
        if self.avatar.session().is_none() {
            return Err(KioskError::SessionUnavailable);
        }
        if !self.state.accept_capture(capture_id) {
            debug!(capture_id, "duplicate audio capture ignored");
            return Ok(AudioOutcome::Duplicate);
        }

        let transcript = self.transcriber.transcribe(audio).await;
        if transcript.trim().is_empty() {
            info!(capture_id, "no speech recognized");
            return Ok(AudioOutcome::NoInput);
        }

        let exchange = self.handle_query(&transcript).await?;
        Ok(AudioOutcome::Answered {
            transcript,
            exchange,
        })
    }

    /// Closes the avatar stream. Called once on shutdown.
    pub async fn shutdown(&mut self) {
        self.avatar.close_session().await;
    }
}
