//! Whisper API STT plugin.
//!
//! Forwards recorded audio to a Whisper-compatible transcription HTTP
//! endpoint and returns the resulting text. The crate is loaded by a host
//! runtime that supplies audio streams and consumes [`SpeechResult`] values
//! through the [`SttProvider`] contract.
//!
//! # Example
//!
//! ```rust,no_run
//! use futures::StreamExt;
//! use whisper_api_stt::{setup, SpeechMetadata, SttProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = setup(&serde_json::json!({
//!         "api_key": "sk-...",
//!         "language": "en-US",
//!         "server_url": "https://api.openai.com/v1/audio/transcriptions",
//!     }))?;
//!
//!     let metadata = SpeechMetadata { channels: 1, sample_rate: 16000 };
//!     let audio = vec![0u8; 16000 * 2]; // 1 second of 16kHz 16-bit audio
//!     let stream = futures::stream::iter(vec![bytes::Bytes::from(audio)]).boxed();
//!
//!     let result = provider.transcribe(metadata, stream).await;
//!     println!("{:?}", result);
//!     Ok(())
//! }
//! ```

pub mod stt;

// Re-export commonly used items for convenience
pub use stt::base::{
    AudioBitRate, AudioChannel, AudioCodec, AudioFormat, AudioSampleRate, AudioStream,
    SpeechMetadata, SpeechResult, SttCapabilities, SttError, SttProvider,
};
pub use stt::whisper_api::{WhisperApiConfig, WhisperApiSTT};
pub use stt::setup;
