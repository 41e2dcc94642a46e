use serde::Serialize;
use thiserror::Error;

/// Settings for one encoding session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    /// JPEG quality, 1..=100.
    pub quality: u8,
    /// None = keep original size.
    pub max_dimension: Option<u32>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            quality: 95,
            max_dimension: Some(2048),
        }
    }
}

impl SessionConfig {
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }
}

#[derive(Default)]
pub struct SessionConfigBuilder {
    quality: Option<u8>,
    max_dimension: Option<u32>,
}

impl SessionConfigBuilder {
    pub fn quality(mut self, quality: u8) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn max_dimension(mut self, max_dimension: u32) -> Self {
        self.max_dimension = Some(max_dimension);
        self
    }

    pub fn build(self) -> SessionConfig {
        let defaults = SessionConfig::default();
        SessionConfig {
            quality: self.quality.unwrap_or(defaults.quality),
            max_dimension: self.max_dimension.or(defaults.max_dimension),
        }
    }
}

/// Batch progress: `Idle -> Encoding(i) -> { Encoding(i+1) | Done }`.
/// `Encoding(i)` means file i is the single outstanding encode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state", content = "index")]
pub enum BatchState {
    Idle,
    Encoding(usize),
    Done,
}

/// Result of one processed batch.
#[derive(Debug, Default, Serialize)]
pub struct BatchOutcome {
    /// Number of outputs appended to the archive.
    pub archived: usize,
    /// Input names that failed to encode and were skipped.
    pub skipped: Vec<String>,
}

#[derive(Debug, Error)]
pub enum BatchError {
    #[error("empty batch")]
    EmptyBatch,
    #[error("encoder unavailable")]
    EncoderUnavailable,
}

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("nothing to save")]
    Empty,
    #[error("zip write failed: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("zip write failed: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_builder() {
        let config = SessionConfig::builder().build();
        assert_eq!(config, SessionConfig::default());

        let config = SessionConfig::builder()
            .quality(80)
            .max_dimension(512)
            .build();
        assert_eq!(config.quality, 80);
        assert_eq!(config.max_dimension, Some(512));
    }

    #[test]
    fn test_batch_state_serialization() {
        let state = serde_json::to_value(BatchState::Encoding(2)).unwrap();
        assert_eq!(state, serde_json::json!({"state": "encoding", "index": 2}));

        let state = serde_json::to_value(BatchState::Idle).unwrap();
        assert_eq!(state, serde_json::json!({"state": "idle"}));

        let state = serde_json::to_value(BatchState::Done).unwrap();
        assert_eq!(state, serde_json::json!({"state": "done"}));
    }
}
