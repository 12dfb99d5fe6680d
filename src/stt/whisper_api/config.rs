//! Configuration for the Whisper API STT provider.
//!
//! The host hands the plugin a static key/value settings block. Recognized
//! keys, with defaults:
//!
//! | key           | type   | default        |
//! |---------------|--------|----------------|
//! | `api_key`     | string | `""`           |
//! | `language`    | string | `"en-US"`      |
//! | `model`       | string | `"whisper-1"`  |
//! | `server_url`  | string | required       |
//! | `prompt`      | string | absent         |
//! | `temperature` | float  | `0.0`          |
//!
//! `server_url` is deliberately required: transcription endpoints are
//! deployment-specific and a baked-in default would only ever point at
//! someone else's network.

use serde::{Deserialize, Deserializer};
use url::Url;

use crate::stt::base::SttError;

/// Default language tag.
pub const DEFAULT_LANGUAGE: &str = "en-US";

/// Default transcription model.
pub const DEFAULT_MODEL: &str = "whisper-1";

/// Upstream request timeout, per call.
pub(crate) const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Validated, immutable provider configuration.
///
/// Created once at plugin setup and owned by the provider instance; never
/// mutated afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct WhisperApiConfig {
    /// Bearer credential; empty means the endpoint requires no auth.
    #[serde(default)]
    pub api_key: String,

    /// Language tag advertised to the host (e.g. `en-US`). The upstream
    /// request carries only the short code, see [`Self::language_code`].
    #[serde(default = "default_language")]
    pub language: String,

    /// Transcription model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Transcription endpoint URL. Required.
    pub server_url: String,

    /// Optional text prompt to guide the transcription.
    #[serde(default)]
    pub prompt: Option<String>,

    /// Sampling temperature (0.0 to 1.0). Lower is more deterministic.
    #[serde(default, deserialize_with = "coerce_temperature")]
    pub temperature: f32,
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

/// Accept `temperature` as a JSON number or a numeric string.
fn coerce_temperature<'de, D>(deserializer: D) -> Result<f32, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Number(n) => n
            .as_f64()
            .map(|f| f as f32)
            .ok_or_else(|| D::Error::custom("temperature is not a finite number")),
        serde_json::Value::String(s) => s.trim().parse::<f32>().map_err(|e| {
            D::Error::custom(format!("cannot coerce temperature {s:?} to float: {e}"))
        }),
        other => Err(D::Error::custom(format!(
            "cannot coerce temperature {other} to float"
        ))),
    }
}

impl WhisperApiConfig {
    /// Parse and validate the host's settings block.
    ///
    /// Unrecognized keys are ignored (the host passes its own bookkeeping
    /// keys alongside ours).
    ///
    /// # Errors
    /// [`SttError::ConfigurationError`] when a value cannot be coerced to
    /// its declared type or fails validation.
    pub fn from_options(options: &serde_json::Value) -> Result<Self, SttError> {
        let config: Self = serde_json::from_value(options.clone())
            .map_err(|e| SttError::ConfigurationError(format!("invalid options: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), SttError> {
        let url = Url::parse(&self.server_url).map_err(|e| {
            SttError::ConfigurationError(format!(
                "invalid server_url {:?}: {e}",
                self.server_url
            ))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(SttError::ConfigurationError(format!(
                "server_url scheme must be http or https, got {:?}",
                url.scheme()
            )));
        }

        if !(0.0..=1.0).contains(&self.temperature) {
            return Err(SttError::ConfigurationError(format!(
                "temperature must be between 0.0 and 1.0, got {}",
                self.temperature
            )));
        }

        Ok(())
    }

    /// Short language code expected by Whisper-style endpoints: the portion
    /// of the configured tag before the first `-` or `_` (ISO-639-1-ish,
    /// e.g. `en-US` -> `en`, `fr_FR` -> `fr`).
    pub fn language_code(&self) -> &str {
        self.language
            .split(['-', '_'])
            .next()
            .unwrap_or(&self.language)
    }
}
