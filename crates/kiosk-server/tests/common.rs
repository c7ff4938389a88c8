//! In-process fakes for the hosted services.

#![allow(dead_code)]

use async_trait::async_trait;
use kiosk_assist::{
    AssistError, Coordinates, DirectionsService, LanguageModel, LocationProvider, MapEmbedBuilder,
    MapsConfig, RouteStep, TransitRoute,
};
use kiosk_server::config::ResponseStrategy;
use kiosk_server::kiosk::{Kiosk, KioskServices, KioskSettings};
use kiosk_voice::{
    AvatarStream, IceCandidate, Session, SessionDescription, SpeechTranscriber, VoiceError,
};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

pub const LOCATION: &str = "Coordenadas: 19.4326, -99.1332. Afluencia: Medium (50%).";

pub fn session(id: &str) -> Session {
    Session {
        id: id.to_string(),
        session_id: format!("sess-{}", id),
        offer: SessionDescription {
            kind: "offer".to_string(),
            sdp: "v=0".to_string(),
        },
        ice_servers: Vec::new(),
    }
}

/// Avatar stream that hands out scripted sessions and records speech.
#[derive(Default)]
pub struct FakeAvatar {
    pub creations: Mutex<VecDeque<Result<Session, VoiceError>>>,
    pub spoken: Mutex<Vec<String>>,
    pub answers: Mutex<Vec<SessionDescription>>,
    pub candidates: Mutex<Vec<IceCandidate>>,
    pub closed: Mutex<Vec<String>>,
}

impl FakeAvatar {
    pub fn with_creations(creations: Vec<Result<Session, VoiceError>>) -> Self {
        Self {
            creations: Mutex::new(creations.into()),
            ..Self::default()
        }
    }

    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap().clone()
    }
}

#[async_trait]
impl AvatarStream for FakeAvatar {
    async fn create_stream(&self) -> Result<Session, VoiceError> {
        self.creations
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(session("strm_default")))
    }

    async fn speak(&self, _session: &Session, text: &str) -> Result<(), VoiceError> {
        self.spoken.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn submit_answer(
        &self,
        _session: &Session,
        answer: &SessionDescription,
    ) -> Result<(), VoiceError> {
        self.answers.lock().unwrap().push(answer.clone());
        Ok(())
    }

    async fn submit_ice_candidate(
        &self,
        _session: &Session,
        candidate: &IceCandidate,
    ) -> Result<(), VoiceError> {
        self.candidates.lock().unwrap().push(candidate.clone());
        Ok(())
    }

    async fn close_stream(&self, session: &Session) -> Result<(), VoiceError> {
        self.closed.lock().unwrap().push(session.id.clone());
        Ok(())
    }
}

/// Transcriber keyed by the raw audio bytes.
#[derive(Default)]
pub struct FakeTranscriber {
    pub transcripts: HashMap<Vec<u8>, String>,
    pub calls: Mutex<usize>,
}

impl FakeTranscriber {
    pub fn hearing(audio: &[u8], text: &str) -> Self {
        let mut transcripts = HashMap::new();
        transcripts.insert(audio.to_vec(), text.to_string());
        Self {
            transcripts,
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl SpeechTranscriber for FakeTranscriber {
    async fn transcribe(&self, audio_data: &[u8]) -> String {
        *self.calls.lock().unwrap() += 1;
        self.transcripts.get(audio_data).cloned().unwrap_or_default()
    }
}

pub struct FixedLocation;

#[async_trait]
impl LocationProvider for FixedLocation {
    async fn current_context(&self) -> String {
        LOCATION.to_string()
    }

    async fn context_near(&self, coordinates: Coordinates) -> String {
        visitor_context(coordinates)
    }
}

pub fn visitor_context(coordinates: Coordinates) -> String {
    format!(
        "Visitante en {}, {}.",
        coordinates.latitude, coordinates.longitude
    )
}

/// Language model answering from a queue of scripted results.
#[derive(Default)]
pub struct ScriptedModel {
    pub outputs: Mutex<VecDeque<Result<Value, AssistError>>>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn push(&self, output: Result<Value, AssistError>) {
        self.outputs.lock().unwrap().push_back(output);
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    fn next(&self, prompt: &str) -> Result<Value, AssistError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.outputs
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AssistError::Transport("no scripted output".into())))
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn generate_text(&self, prompt: &str) -> Result<String, AssistError> {
        self.next(prompt).map(|v| v.as_str().unwrap_or_default().to_string())
    }

    async fn generate_json(&self, prompt: &str, _schema: &Value) -> Result<Value, AssistError> {
        self.next(prompt)
    }
}

/// Directions service returning one Metro + Tren Ligero route.
#[derive(Default)]
pub struct RecordingDirections {
    pub calls: Mutex<Vec<(String, String)>>,
}

impl RecordingDirections {
    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl DirectionsService for RecordingDirections {
    async fn transit_routes(
        &self,
        origin: &str,
        destination: &str,
    ) -> Result<Vec<TransitRoute>, AssistError> {
        self.calls
            .lock()
            .unwrap()
            .push((origin.to_string(), destination.to_string()));
        Ok(vec![TransitRoute {
            duration_seconds: 3120,
            steps: vec![
                RouteStep::walking(),
                RouteStep::transit("Metro", "2", "Tasqueña"),
                RouteStep::transit("Tren ligero", "Tren Ligero", "Xochimilco"),
                RouteStep::walking(),
            ],
        }])
    }
}

/// Every fake wired into one kiosk.
pub struct Harness {
    pub avatar: Arc<FakeAvatar>,
    pub transcriber: Arc<FakeTranscriber>,
    pub model: Arc<ScriptedModel>,
    pub directions: Arc<RecordingDirections>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with(FakeAvatar::default(), FakeTranscriber::default())
    }

    pub fn with(avatar: FakeAvatar, transcriber: FakeTranscriber) -> Self {
        Self {
            avatar: Arc::new(avatar),
            transcriber: Arc::new(transcriber),
            model: Arc::new(ScriptedModel::default()),
            directions: Arc::new(RecordingDirections::default()),
        }
    }

    pub fn kiosk(&self, strategy: ResponseStrategy) -> Kiosk {
        let services = KioskServices {
            avatar: self.avatar.clone(),
            transcriber: self.transcriber.clone(),
            location: Arc::new(FixedLocation),
            model: self.model.clone(),
            directions: self.directions.clone(),
            maps: MapEmbedBuilder::new(&MapsConfig::new("maps-key")),
        };
        let settings = KioskSettings {
            route_origin: "Zócalo, CDMX".to_string(),
            strategy,
        };
        Kiosk::new(services, settings)
    }
}
