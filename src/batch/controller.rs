use std::sync::Arc;

use futures::StreamExt;
use jpeg_bus::{bus::EncoderBus, frame::InputImage, jpeg::ImageCodec};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::batch::{
    archive::Archive,
    types::{BatchError, BatchOutcome, BatchState},
};

/// Sequential file admission controller: feeds one file at a time into the
/// encoder bus. The next encode is only started after the previous
/// completion event has been consumed, so at most one encode is ever
/// outstanding.
pub struct BatchController {
    bus: EncoderBus,
    cancel: CancellationToken,
    state: watch::Sender<BatchState>,
}

impl BatchController {
    pub fn new(codec: Arc<dyn ImageCodec>) -> Self {
        let (state, _) = watch::channel(BatchState::Idle);
        Self {
            bus: EncoderBus::new("batch", codec),
            cancel: CancellationToken::new(),
            state,
        }
    }

    /// Stops admitting files. The in-flight encode drains; its result is
    /// discarded with the rest of the batch.
    pub fn cancel(&self) {
        self.cancel.cancel();
        self.bus.stop();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn state(&self) -> BatchState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<BatchState> {
        self.state.subscribe()
    }

    /// Runs one batch to completion, appending encoded outputs to `archive`.
    /// Entry names continue from the archive's current size, so a second
    /// batch on the same archive extends the numbering instead of
    /// overwriting earlier entries.
    pub async fn run(
        &self,
        files: Vec<InputImage>,
        archive: &mut Archive,
    ) -> Result<BatchOutcome, BatchError> {
        if files.is_empty() {
            return Err(BatchError::EmptyBatch);
        }

        let total = files.len();
        log::info!("batch: {} files", total);

        // Subscribe before the first start so no completion can be missed.
        let mut events = self.bus.subscribe();
        let mut outcome = BatchOutcome::default();
        let mut processed = 0usize;

        self.state.send_replace(BatchState::Encoding(0));
        if self.bus.start_encoding(files[0].clone()).await.is_err() {
            self.state.send_replace(BatchState::Idle);
            return Err(BatchError::EncoderUnavailable);
        }

        while processed < total {
            let event = tokio::select! {
                _ = self.cancel.cancelled() => {
                    log::info!("batch: cancelled after {} of {} files", processed, total);
                    return Ok(outcome);
                },
                event = events.next() => match event {
                    Some(event) => event,
                    None => return Err(BatchError::EncoderUnavailable),
                },
            };

            processed += 1;
            match event.result {
                Ok(encoded) => {
                    let name = format!("{}.jpg", archive.len() + 1);
                    log::debug!("batch: archived {} as {}", event.source, name);
                    archive.file(&name, encoded.data);
                    outcome.archived += 1;
                }
                Err(e) => {
                    // Skip-and-continue: a failing file never stalls the batch.
                    log::warn!("batch: skipping {}: {}", event.source, e);
                    outcome.skipped.push(event.source);
                }
            }

            if processed < total {
                self.state.send_replace(BatchState::Encoding(processed));
                if self
                    .bus
                    .start_encoding(files[processed].clone())
                    .await
                    .is_err()
                {
                    return Err(BatchError::EncoderUnavailable);
                }
            }
        }

        self.state.send_replace(BatchState::Done);
        log::info!(
            "batch: done, {} archived, {} skipped",
            outcome.archived,
            outcome.skipped.len()
        );
        Ok(outcome)
    }
}

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;
