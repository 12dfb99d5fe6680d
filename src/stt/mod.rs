//! Speech-to-text plugin surface.
//!
//! [`base`] defines the host-facing contract (provider trait, metadata,
//! result, capability types); [`whisper_api`] implements it against a
//! Whisper-compatible transcription endpoint.

pub mod base;
pub mod whisper_api;

pub use base::{
    AudioBitRate, AudioChannel, AudioCodec, AudioFormat, AudioSampleRate, AudioStream,
    SpeechMetadata, SpeechResult, SttCapabilities, SttError, SttProvider,
};
pub use whisper_api::{WhisperApiConfig, WhisperApiSTT};

/// Set up the Whisper API STT plugin from the host's settings block.
///
/// Parses and validates the recognized options (see [`WhisperApiConfig`])
/// and constructs the provider. This is the plugin's setup entry point:
/// `Ok` means the plugin is ready to serve [`SttProvider::transcribe`]
/// calls.
///
/// # Errors
///
/// Returns [`SttError::ConfigurationError`] when an option cannot be coerced
/// to its declared type, `server_url` is missing or not a valid HTTP(S) URL,
/// or `temperature` is out of range.
pub fn setup(options: &serde_json::Value) -> Result<WhisperApiSTT, SttError> {
    let config = WhisperApiConfig::from_options(options)?;
    WhisperApiSTT::new(config)
}
