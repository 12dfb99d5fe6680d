//! Whisper API STT provider implementation.

use std::io::Write as _;
use std::path::PathBuf;
use std::time::Duration;

use futures::StreamExt;
use reqwest::Client;
use reqwest::multipart::{Form, Part};
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

use crate::stt::base::{
    AudioStream, SpeechMetadata, SpeechResult, SttCapabilities, SttError, SttProvider,
};

use super::config::{REQUEST_TIMEOUT_SECS, WhisperApiConfig};
use super::messages::{ApiErrorResponse, TranscriptionResponse, wav};

/// Pre-allocation hint for the stream buffer: roughly 30 seconds of
/// 16 kHz 16-bit mono audio.
const AUDIO_BUFFER_CAPACITY: usize = 32 * 1024 * 30;

/// STT provider backed by a Whisper-compatible HTTP transcription endpoint.
///
/// One instance holds one pooled HTTP session shared across all
/// `transcribe` calls. The instance is immutable after construction, so
/// concurrent calls need no synchronization.
pub struct WhisperApiSTT {
    config: WhisperApiConfig,
    http_client: Client,
    capabilities: SttCapabilities,
    /// Override for the working-file directory; tests point this at a
    /// scoped directory to observe cleanup.
    staging_dir: Option<PathBuf>,
}

impl WhisperApiSTT {
    /// Create a new provider from a validated configuration.
    ///
    /// # Errors
    /// [`SttError::ConfigurationError`] when the configuration fails
    /// validation or the HTTP client cannot be constructed.
    pub fn new(config: WhisperApiConfig) -> Result<Self, SttError> {
        config.validate()?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|e| {
                SttError::ConfigurationError(format!("failed to build HTTP client: {e}"))
            })?;

        let capabilities = SttCapabilities::for_language(config.language.clone());

        Ok(Self {
            config,
            http_client,
            capabilities,
            staging_dir: None,
        })
    }

    /// Access the provider configuration.
    pub fn config(&self) -> &WhisperApiConfig {
        &self.config
    }

    #[cfg(test)]
    pub(crate) fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = Some(dir.into());
        self
    }

    /// Drain the stream, frame it as WAV, and run one transcription request.
    async fn run_transcription(
        &self,
        metadata: SpeechMetadata,
        mut stream: AudioStream,
    ) -> Result<String, SttError> {
        if metadata.channels == 0 || metadata.sample_rate == 0 {
            return Err(SttError::AudioProcessingError(format!(
                "invalid stream metadata: channels={}, sample_rate={}",
                metadata.channels, metadata.sample_rate
            )));
        }

        // Buffer the complete utterance; the endpoint takes whole files,
        // not chunks.
        let mut audio = Vec::with_capacity(AUDIO_BUFFER_CAPACITY);
        while let Some(chunk) = stream.next().await {
            audio.extend_from_slice(&chunk);
        }

        if audio.is_empty() {
            return Err(SttError::EmptyAudio);
        }

        debug!(
            bytes = audio.len(),
            sample_rate = metadata.sample_rate,
            channels = metadata.channels,
            "buffered audio stream"
        );

        let wav_data = wav::create_wav(&audio, metadata.sample_rate, metadata.channels);

        // Stage the payload on disk so it is removed even if the request
        // errors out or the task is cancelled mid-flight.
        let staged = self.stage_wav(&wav_data)?;
        let payload = tokio::fs::read(staged.path())
            .await
            .map_err(|e| SttError::AudioProcessingError(format!("failed to read WAV file: {e}")))?;

        let file_part = Part::bytes(payload)
            .file_name("audio.wav")
            .mime_str("audio/wav")
            .map_err(|e| SttError::NetworkError(format!("failed to build file part: {e}")))?;

        let mut form = Form::new()
            .text("model", self.config.model.clone())
            .text("language", self.config.language_code().to_string())
            .text("temperature", self.config.temperature.to_string());

        if let Some(prompt) = &self.config.prompt {
            form = form.text("prompt", prompt.clone());
        }

        form = form.part("file", file_part);

        let mut request = self
            .http_client
            .post(&self.config.server_url)
            .multipart(form);

        // Endpoints without auth are common for self-hosted servers; only
        // attach the header when a credential is configured.
        if !self.config.api_key.is_empty() {
            request = request.bearer_auth(&self.config.api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| SttError::NetworkError(format!("request failed: {e}")))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SttError::InvalidResponse(format!("failed to read response body: {e}")))?;

        self.discard_staged(staged);

        if status != reqwest::StatusCode::OK {
            return Err(SttError::UpstreamError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranscriptionResponse = serde_json::from_str(&body)
            .map_err(|e| SttError::InvalidResponse(format!("malformed response body: {e}")))?;

        Ok(parsed.text)
    }

    /// Write the WAV payload to a working file.
    ///
    /// The returned handle removes the file on drop, covering early returns
    /// and cancellation; [`Self::discard_staged`] handles the normal path.
    fn stage_wav(&self, wav_data: &[u8]) -> Result<NamedTempFile, SttError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("whisper-stt-").suffix(".wav");

        let mut staged = match &self.staging_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| {
            SttError::AudioProcessingError(format!("failed to create working file: {e}"))
        })?;

        staged.write_all(wav_data).map_err(|e| {
            SttError::AudioProcessingError(format!("failed to write WAV file: {e}"))
        })?;

        Ok(staged)
    }

    /// Remove the working file. Failure to remove is not a transcription
    /// failure; it only gets a warning.
    fn discard_staged(&self, staged: NamedTempFile) {
        let path = staged.path().to_path_buf();
        if let Err(e) = staged.close() {
            warn!(path = %path.display(), "failed to remove working file: {e}");
        }
    }
}

#[async_trait::async_trait]
impl SttProvider for WhisperApiSTT {
    fn capabilities(&self) -> &SttCapabilities {
        &self.capabilities
    }

    fn provider_info(&self) -> &'static str {
        "Whisper API STT"
    }

    async fn transcribe(&self, metadata: SpeechMetadata, stream: AudioStream) -> SpeechResult {
        match self.run_transcription(metadata, stream).await {
            Ok(text) => {
                info!(chars = text.len(), "transcription completed");
                SpeechResult::success(text)
            }
            Err(SttError::EmptyAudio) => {
                error!("received empty audio stream");
                SpeechResult::error()
            }
            Err(SttError::UpstreamError { status, body }) => {
                // Pull out the structured message when the endpoint sends
                // one; otherwise log the raw body.
                let detail = serde_json::from_str::<ApiErrorResponse>(&body)
                    .map(|r| r.error.to_string())
                    .unwrap_or(body);
                error!("error from transcription endpoint (status {status}): {detail}");
                SpeechResult::error()
            }
            Err(err) => {
                error!("error processing audio stream: {err}");
                SpeechResult::error()
            }
        }
    }
}
