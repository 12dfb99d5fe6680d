//! Whisper API STT provider.
//!
//! Implements the [`crate::stt::base::SttProvider`] contract against a
//! Whisper-compatible HTTP transcription endpoint (OpenAI's
//! `/v1/audio/transcriptions` shape, or any self-hosted server speaking the
//! same protocol).
//!
//! # Architecture
//!
//! The upstream API is a REST batch endpoint, not a streaming socket. Each
//! `transcribe` call:
//!
//! 1. Drains the incoming byte-chunk stream into one in-memory buffer
//! 2. Frames the PCM bytes as a WAV payload ([`messages::wav`])
//! 3. Stages the payload in a scoped working file (removed on every exit
//!    path, including failures and cancellation)
//! 4. Sends one multipart POST and maps the response to a
//!    [`crate::stt::base::SpeechResult`]
//!
//! The module is organized into focused submodules:
//!
//! - [`config`]: option parsing, defaults, and validation
//! - [`messages`]: response types and WAV framing
//! - [`client`]: the `WhisperApiSTT` provider implementation

mod client;
mod config;
mod messages;

#[cfg(test)]
mod tests;

// Re-export public types
pub use client::WhisperApiSTT;
pub use config::{DEFAULT_LANGUAGE, DEFAULT_MODEL, WhisperApiConfig};
pub use messages::{ApiError, ApiErrorResponse, TranscriptionResponse, wav};
