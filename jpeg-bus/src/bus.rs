use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::{
    frame::{EncodeEvent, InputImage},
    jpeg::{EncodeError, ImageCodec},
    sink::{EventSinkSource, EventStream},
};

/// Encoder bus: accepts `StartEncoding` commands and emits exactly one
/// completion event per started input. Commands are handled serially, so the
/// bus never runs two encodes at once.
pub struct EncoderBus {
    id: String,
    cancel: CancellationToken,
    tx: tokio::sync::mpsc::Sender<BusCommand>,
    events: Arc<EventSinkSource>,
}

impl EncoderBus {
    pub fn new(id: &str, codec: Arc<dyn ImageCodec>) -> Self {
        let id = id.to_string();
        let cancel = CancellationToken::new();
        let (tx, rx) = tokio::sync::mpsc::channel(1024);
        let events = Arc::new(EventSinkSource::new());

        let cancel_clone = cancel.clone();
        let writer = events.writer.clone();
        tokio::spawn(async move { Self::inner_loop(cancel_clone, rx, codec, writer).await });
        Self {
            id,
            cancel,
            tx,
            events,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Subscribe to completion events. Subscribe before the first
    /// `start_encoding` so no event can be missed.
    pub fn subscribe(&self) -> EventStream {
        EventSinkSource::as_stream(Arc::clone(&self.events))
    }

    /// Queue one input for encoding. Returns as soon as the command is
    /// accepted; the result arrives on the subscribed event stream.
    pub async fn start_encoding(&self, image: InputImage) -> anyhow::Result<()> {
        self.tx
            .send(BusCommand::StartEncoding { image })
            .await
            .map_err(|_| anyhow::anyhow!("encoder bus stopped"))
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }

    pub fn is_stopped(&self) -> bool {
        self.cancel.is_cancelled()
    }

    async fn inner_loop(
        cancel: CancellationToken,
        mut rx: tokio::sync::mpsc::Receiver<BusCommand>,
        codec: Arc<dyn ImageCodec>,
        events: tokio::sync::mpsc::Sender<EncodeEvent>,
    ) {
        let cancel_clone = cancel.clone();
        loop {
            tokio::select! {
                _ = cancel_clone.cancelled() => {
                    break;
                },
                Some(cmd) = rx.recv() => {
                    if let Err(e) = Self::inner_command_handler(&codec, &events, cmd).await {
                        log::error!("inner_command_handler error: {:#?}", e);
                    }
                },
            }
        }
    }

    async fn inner_command_handler(
        codec: &Arc<dyn ImageCodec>,
        events: &tokio::sync::mpsc::Sender<EncodeEvent>,
        cmd: BusCommand,
    ) -> anyhow::Result<()> {
        match cmd {
            BusCommand::StartEncoding { image } => {
                let source = image.name.clone();
                let codec = Arc::clone(codec);
                // Pixel work is CPU-bound, keep it off the runtime threads.
                let result = tokio::task::spawn_blocking(move || codec.transcode(&image))
                    .await
                    .unwrap_or(Err(EncodeError::Canceled));

                match &result {
                    Ok(encoded) => log::debug!("encoded {}: {}", source, encoded),
                    Err(e) => log::warn!("encode {} failed: {}", source, e),
                }

                events
                    .send(EncodeEvent { source, result })
                    .await
                    .map_err(|_| anyhow::anyhow!("event receiver dropped"))?;
            }
        }

        Ok(())
    }
}

enum BusCommand {
    StartEncoding { image: InputImage },
}

#[cfg(test)]
#[path = "bus_test.rs"]
mod bus_test;
