use futures::Stream;
use std::{
    pin::Pin,
    sync::{Arc, Mutex},
    task::{Context, Poll},
};

use crate::frame::EncodeEvent;

/// Channel-backed sink for completion events. The bus writes, a single
/// consumer drains via the `Stream` impls below.
pub struct EventSinkSource {
    pub writer: tokio::sync::mpsc::Sender<EncodeEvent>,
    inner: Mutex<tokio::sync::mpsc::Receiver<EncodeEvent>>,
}

impl EventSinkSource {
    pub fn new() -> Self {
        Self::with_capacity(32)
    }

    pub fn with_capacity(buffer_size: usize) -> Self {
        let (writer, receiver) = tokio::sync::mpsc::channel(buffer_size);
        Self {
            writer,
            inner: Mutex::new(receiver),
        }
    }
}

impl Default for EventSinkSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Stream for EventSinkSource {
    type Item = EncodeEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut guard = self.get_mut().inner.lock().unwrap();
        guard.poll_recv(cx)
    }
}

/// Wrapper to use `Arc<EventSinkSource>` as Stream (orphan rule workaround).
pub struct EventStream(pub Arc<EventSinkSource>);

impl Stream for EventStream {
    type Item = EncodeEvent;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let source = &self.0;
        let mut guard = source.inner.lock().unwrap();
        guard.poll_recv(cx)
    }
}

impl EventSinkSource {
    /// Returns a stream of completion events. Use this when you have
    /// `Arc<EventSinkSource>`.
    pub fn as_stream(this: Arc<Self>) -> EventStream {
        EventStream(this)
    }
}
