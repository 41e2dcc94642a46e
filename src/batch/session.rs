use std::sync::Arc;

use bytes::Bytes;
use jpeg_bus::{
    frame::InputImage,
    jpeg::{ImageCodec, JpegCodec, Settings},
};
use tokio::sync::Mutex;

use crate::batch::{
    archive::Archive,
    controller::BatchController,
    types::{ArchiveError, BatchError, BatchOutcome, BatchState, SessionConfig},
};

/// One encoding session: a controller plus the archive that accumulates
/// outputs across all batches submitted to the session.
pub struct Session {
    id: String,
    controller: BatchController,
    archive: Mutex<Archive>,
}

impl Session {
    /// Begins a session with a fresh, empty archive.
    pub fn begin(id: impl Into<String>, config: SessionConfig) -> Self {
        let codec = JpegCodec::new(Settings {
            quality: config.quality,
            max_dimension: config.max_dimension,
        });
        Self::with_codec(id, Arc::new(codec))
    }

    pub fn with_codec(id: impl Into<String>, codec: Arc<dyn ImageCodec>) -> Self {
        Self {
            id: id.into(),
            controller: BatchController::new(codec),
            archive: Mutex::new(Archive::new()),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> BatchState {
        self.controller.state()
    }

    pub async fn archived(&self) -> usize {
        self.archive.lock().await.len()
    }

    /// Runs one batch against the session archive. The archive lock is held
    /// for the whole batch, so overlapping submissions queue up and append
    /// to the same archive instead of interleaving completions.
    pub async fn process_batch(&self, files: Vec<InputImage>) -> Result<BatchOutcome, BatchError> {
        let mut archive = self.archive.lock().await;
        self.controller.run(files, &mut archive).await
    }

    /// Packages everything archived so far. Callable between batches; an
    /// empty archive is "nothing to save".
    pub async fn finalize(&self) -> Result<Bytes, ArchiveError> {
        self.archive.lock().await.generate()
    }

    pub fn cancel(&self) {
        self.controller.cancel();
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;
