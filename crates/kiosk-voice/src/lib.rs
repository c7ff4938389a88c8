//! Voice and video plumbing for the Metro kiosk.
//!
//! Owns the two hosted services that turn text into a talking avatar and
//! audio into text: the avatar stream (a remote service that renders a
//! talking head over WebRTC and speaks whatever script it is sent) and the
//! speech recognizer used for the microphone button.
//!
//! The avatar side is split in two layers. [`AvatarStream`] is the raw
//! remote API (create a stream, push a script, relay signaling, close).
//! [`AvatarSessionManager`] owns the single live [`Session`] of a kiosk
//! visit on top of it and decides which failures reach the visitor: only
//! session creation does; pushing speech is fire-and-forget.

pub mod avatar;
pub mod config;
pub mod error;
pub mod session;
pub mod stt;

pub use avatar::{authorization_header, AvatarClient, AvatarStream};
pub use config::{AvatarConfig, SpeechConfig, VoiceProfile, DEFAULT_AVATAR_BASE_URL};
pub use error::VoiceError;
pub use session::{
    AvatarSessionManager, IceCandidate, IceServer, Session, SessionDescription,
};
pub use stt::{decode_wav, GoogleSpeechTranscriber, PcmClip, SpeechTranscriber};
