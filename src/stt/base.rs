//! Host-facing STT plugin contract.
//!
//! The host runtime loads the plugin, hands it a per-request
//! [`SpeechMetadata`] plus an [`AudioStream`] of byte chunks, and consumes a
//! [`SpeechResult`]. Capability lists are advertised through
//! [`SttCapabilities`], computed once at provider construction.

use bytes::Bytes;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Asynchronous, finite, single-pass sequence of audio byte chunks.
///
/// The stream is not restartable; the provider drains it exactly once.
pub type AudioStream = BoxStream<'static, Bytes>;

/// Per-request description of the incoming audio stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechMetadata {
    /// Number of interleaved channels in the PCM data.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

/// Outcome of one transcription request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeechResult {
    /// Transcription succeeded.
    Success {
        /// The transcribed text (may be empty).
        text: String,
    },
    /// Transcription failed; detail is logged, not surfaced.
    Error,
}

impl SpeechResult {
    /// Create a success result.
    pub fn success(text: impl Into<String>) -> Self {
        Self::Success { text: text.into() }
    }

    /// Create an error result.
    pub fn error() -> Self {
        Self::Error
    }

    /// Get the transcript, if the request succeeded.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Success { text } => Some(text),
            Self::Error => None,
        }
    }
}

// =============================================================================
// Capability Types
// =============================================================================

/// Supported container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// WAV container (RIFF).
    Wav,
}

impl AudioFormat {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
        }
    }
}

/// Supported codecs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    /// Uncompressed PCM samples.
    Pcm,
}

impl AudioCodec {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pcm => "pcm",
        }
    }
}

/// Supported sample widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioBitRate {
    /// 16-bit signed little-endian samples.
    Bits16,
}

impl AudioBitRate {
    /// Sample width in bits.
    #[inline]
    pub fn bits(&self) -> u16 {
        match self {
            Self::Bits16 => 16,
        }
    }
}

/// Supported sample rates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioSampleRate {
    /// 16 kHz.
    Hz16000,
}

impl AudioSampleRate {
    /// Sample rate in Hz.
    #[inline]
    pub fn hz(&self) -> u32 {
        match self {
            Self::Hz16000 => 16000,
        }
    }
}

/// Supported channel layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioChannel {
    /// Single channel.
    Mono,
}

impl AudioChannel {
    /// Channel count.
    #[inline]
    pub fn count(&self) -> u16 {
        match self {
            Self::Mono => 1,
        }
    }
}

/// Fixed capability surface advertised to the host.
///
/// Computed once at provider construction; never re-derived per access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SttCapabilities {
    pub formats: Vec<AudioFormat>,
    pub codecs: Vec<AudioCodec>,
    pub bit_rates: Vec<AudioBitRate>,
    pub sample_rates: Vec<AudioSampleRate>,
    pub channels: Vec<AudioChannel>,
    /// Languages the provider accepts (the configured language tag).
    pub languages: Vec<String>,
}

impl SttCapabilities {
    /// Capability lists for a WAV/PCM 16-bit 16 kHz mono provider serving
    /// the given language tag.
    pub fn for_language(language: impl Into<String>) -> Self {
        Self {
            formats: vec![AudioFormat::Wav],
            codecs: vec![AudioCodec::Pcm],
            bit_rates: vec![AudioBitRate::Bits16],
            sample_rates: vec![AudioSampleRate::Hz16000],
            channels: vec![AudioChannel::Mono],
            languages: vec![language.into()],
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Internal error taxonomy.
///
/// Everything except `ConfigurationError` collapses to
/// [`SpeechResult::Error`] at the [`SttProvider`] boundary after being
/// logged with distinguishing detail.
#[derive(Debug, Error)]
pub enum SttError {
    /// An option could not be coerced or validated at setup.
    #[error("configuration error: {0}")]
    ConfigurationError(String),

    /// The audio stream produced zero bytes.
    #[error("received empty audio stream")]
    EmptyAudio,

    /// The transcription endpoint answered with a non-200 status.
    #[error("transcription endpoint returned status {status}: {body}")]
    UpstreamError { status: u16, body: String },

    /// Request construction or transport failure.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The response body could not be read or parsed.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// WAV framing or working-file I/O failure.
    #[error("audio processing error: {0}")]
    AudioProcessingError(String),
}

// =============================================================================
// Provider Trait
// =============================================================================

/// The host-facing provider object.
///
/// One instance serves many independent `transcribe` calls; implementations
/// must hold no per-call mutable state so that concurrent calls only share
/// the pooled HTTP session.
#[async_trait::async_trait]
pub trait SttProvider: Send + Sync {
    /// Static capability lists, computed once at construction.
    fn capabilities(&self) -> &SttCapabilities;

    /// Human-readable provider identifier.
    fn provider_info(&self) -> &'static str;

    /// Transcribe one audio stream.
    ///
    /// Drains `stream` fully, performs a single upstream request, and maps
    /// the outcome to a [`SpeechResult`]. Never panics and never fails the
    /// host process; all failures collapse to [`SpeechResult::Error`].
    async fn transcribe(&self, metadata: SpeechMetadata, stream: AudioStream) -> SpeechResult;
}
