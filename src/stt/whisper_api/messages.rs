//! Wire types for the Whisper-compatible transcription API, plus WAV
//! framing for raw PCM audio.
//!
//! API shape: `POST <server_url>` with a multipart form; success responses
//! are JSON objects carrying a `text` field.

use serde::{Deserialize, Serialize};

// =============================================================================
// Response Types
// =============================================================================

/// Successful transcription response.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranscriptionResponse {
    /// The transcribed text. Absent field maps to an empty transcript.
    #[serde(default)]
    pub text: String,
}

/// Structured upstream error body, parsed best-effort for log detail.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiErrorResponse {
    /// Error details.
    pub error: ApiError,
}

/// Upstream error details.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiError {
    /// Human-readable error message.
    pub message: String,

    /// Error type identifier.
    #[serde(rename = "type", default)]
    pub error_type: Option<String>,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.error_type {
            Some(error_type) => write!(f, "{} ({})", self.message, error_type),
            None => write!(f, "{}", self.message),
        }
    }
}

// =============================================================================
// WAV Framing
// =============================================================================

/// Utility functions for framing raw PCM data as WAV.
///
/// The transcription endpoint expects a properly formed audio file; this
/// module packages the buffered 16-bit PCM stream into a WAV container.
pub mod wav {
    /// Byte length of the WAV header produced by [`create_header`].
    pub const HEADER_LEN: usize = 44;

    /// Create a WAV file header for PCM audio.
    ///
    /// # Arguments
    /// * `data_size` - Size of the audio data in bytes
    /// * `sample_rate` - Sample rate in Hz (e.g., 16000)
    /// * `channels` - Number of channels (1 for mono, 2 for stereo)
    /// * `bits_per_sample` - Bits per sample (typically 16)
    pub fn create_header(
        data_size: u32,
        sample_rate: u32,
        channels: u16,
        bits_per_sample: u16,
    ) -> [u8; HEADER_LEN] {
        let byte_rate = sample_rate * u32::from(channels) * u32::from(bits_per_sample) / 8;
        let block_align = channels * bits_per_sample / 8;
        let file_size = 36 + data_size; // File size minus 8 bytes for RIFF header

        let mut header = [0u8; HEADER_LEN];

        // RIFF chunk descriptor
        header[0..4].copy_from_slice(b"RIFF");
        header[4..8].copy_from_slice(&file_size.to_le_bytes());
        header[8..12].copy_from_slice(b"WAVE");

        // fmt sub-chunk
        header[12..16].copy_from_slice(b"fmt ");
        header[16..20].copy_from_slice(&16u32.to_le_bytes()); // Subchunk1 size (16 for PCM)
        header[20..22].copy_from_slice(&1u16.to_le_bytes()); // Audio format (1 = PCM)
        header[22..24].copy_from_slice(&channels.to_le_bytes());
        header[24..28].copy_from_slice(&sample_rate.to_le_bytes());
        header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
        header[32..34].copy_from_slice(&block_align.to_le_bytes());
        header[34..36].copy_from_slice(&bits_per_sample.to_le_bytes());

        // data sub-chunk
        header[36..40].copy_from_slice(b"data");
        header[40..44].copy_from_slice(&data_size.to_le_bytes());

        header
    }

    /// Create a complete WAV payload from raw 16-bit PCM data.
    ///
    /// The result is exactly `HEADER_LEN + pcm_data.len()` bytes.
    pub fn create_wav(pcm_data: &[u8], sample_rate: u32, channels: u16) -> Vec<u8> {
        let header = create_header(pcm_data.len() as u32, sample_rate, channels, 16);
        let mut payload = Vec::with_capacity(HEADER_LEN + pcm_data.len());
        payload.extend_from_slice(&header);
        payload.extend_from_slice(pcm_data);
        payload
    }
}
