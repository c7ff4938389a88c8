use crate::config::SpeechConfig;
use crate::error::VoiceError;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use hound::{SampleFormat, WavReader};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::io::Cursor;
use std::time::Duration;
use tracing::{debug, warn};

/// Maximum audio input size for STT (10 MiB). Prevents OOM from oversized payloads.
const MAX_STT_INPUT_BYTES: usize = 10 * 1024 * 1024;

/// Turns a recorded clip into text.
///
/// Implementations never fail: anything unusable comes back as an empty
/// string, which callers treat as "nothing understood".
#[async_trait]
pub trait SpeechTranscriber: Send + Sync {
    async fn transcribe(&self, audio_data: &[u8]) -> String;
}

/// Mono 16-bit PCM decoded from a WAV clip.
#[derive(Debug, Clone, PartialEq)]
pub struct PcmClip {
    pub sample_rate: u32,
    pub samples: Vec<i16>,
}

impl PcmClip {
    /// Little-endian LINEAR16 bytes.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        self.samples.iter().flat_map(|s| s.to_le_bytes()).collect()
    }
}

/// Decodes a WAV clip and down-mixes it to mono 16-bit samples.
pub fn decode_wav(bytes: &[u8]) -> Result<PcmClip, VoiceError> {
    if bytes.len() > MAX_STT_INPUT_BYTES {
        return Err(VoiceError::InvalidAudio(format!(
            "audio data exceeds maximum size: {} bytes (limit: {} bytes)",
            bytes.len(),
            MAX_STT_INPUT_BYTES
        )));
    }

    let mut reader = WavReader::new(Cursor::new(bytes))
        .map_err(|e| VoiceError::InvalidAudio(format!("not a WAV clip: {}", e)))?;
    let spec = reader.spec();
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .collect::<Result<_, _>>()
            .map_err(|e| VoiceError::InvalidAudio(e.to_string()))?,
        (SampleFormat::Int, bits) if bits <= 32 => {
            let shift = i32::from(bits) - 16;
            reader
                .samples::<i32>()
                .map(|s| {
                    s.map(|v| {
                        if shift >= 0 {
                            (v >> shift) as i16
                        } else {
                            (v << -shift) as i16
                        }
                    })
                })
                .collect::<Result<_, _>>()
                .map_err(|e| VoiceError::InvalidAudio(e.to_string()))?
        }
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .map(|s| s.map(|v| (v.clamp(-1.0, 1.0) * f32::from(i16::MAX)) as i16))
            .collect::<Result<_, _>>()
            .map_err(|e| VoiceError::InvalidAudio(e.to_string()))?,
        (format, bits) => {
            return Err(VoiceError::InvalidAudio(format!(
                "unsupported sample format: {:?} {} bits",
                format, bits
            )))
        }
    };

    let samples = if channels == 1 {
        interleaved
    } else {
        interleaved
            .chunks(channels)
            .map(|frame| {
                let sum: i32 = frame.iter().map(|&s| i32::from(s)).sum();
                (sum / frame.len() as i32) as i16
            })
            .collect()
    };

    if samples.is_empty() {
        return Err(VoiceError::InvalidAudio("clip has no samples".to_string()));
    }

    Ok(PcmClip {
        sample_rate: spec.sample_rate,
        samples,
    })
}

#[derive(Debug, Default, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    results: Vec<RecognitionResult>,
}

#[derive(Debug, Deserialize)]
struct RecognitionResult {
    #[serde(default)]
    alternatives: Vec<RecognitionAlternative>,
}

#[derive(Debug, Deserialize)]
struct RecognitionAlternative {
    #[serde(default)]
    transcript: String,
}

/// Hosted speech-to-text recognizer.
#[derive(Debug, Clone)]
pub struct GoogleSpeechTranscriber {
    config: SpeechConfig,
    client: Client,
}

impl GoogleSpeechTranscriber {
    pub fn new(config: SpeechConfig) -> Result<Self, VoiceError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| VoiceError::Config(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self { config, client })
    }

    /// Transcribes a clip, reporting why when nothing comes back.
    pub async fn try_transcribe(&self, audio_data: &[u8]) -> Result<String, VoiceError> {
        let clip = decode_wav(audio_data)?;
        debug!(
            sample_rate = clip.sample_rate,
            samples = clip.samples.len(),
            "decoded audio clip"
        );

        let body = json!({
            "config": {
                "encoding": "LINEAR16",
                "sampleRateHertz": clip.sample_rate,
                "languageCode": self.config.locale,
                "audioChannelCount": 1,
            },
            "audio": {
                "content": BASE64_STANDARD.encode(clip.to_le_bytes()),
            },
        });

        let url = format!(
            "{}/speech:recognize",
            self.config.base_url.trim_end_matches('/')
        );
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(VoiceError::Stt(format!("HTTP {}: {}", status, text)));
        }

        let parsed: RecognizeResponse = response
            .json()
            .await
            .map_err(|e| VoiceError::Stt(format!("malformed recognizer response: {}", e)))?;

        let transcript = parsed
            .results
            .iter()
            .filter_map(|r| r.alternatives.first())
            .map(|a| a.transcript.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        Ok(transcript)
    }
}

#[async_trait]
impl SpeechTranscriber for GoogleSpeechTranscriber {
    async fn transcribe(&self, audio_data: &[u8]) -> String {
        match self.try_transcribe(audio_data).await {
            Ok(text) => {
                if text.is_empty() {
                    debug!("recognizer heard no speech");
                }
                text
            }
            Err(e) => {
                warn!(error = %e, "speech transcription failed");
                String::new()
            }
        }
    }
}
