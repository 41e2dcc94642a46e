use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};
use std::time::Duration;

use bytes::Bytes;
use jpeg_bus::{
    frame::{EncodedImage, InputImage},
    jpeg::{EncodeError, ImageCodec},
};

use super::Session;
use crate::batch::types::{ArchiveError, BatchError, BatchState};

struct CountingCodec {
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    calls: Mutex<Vec<String>>,
}

impl CountingCodec {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            calls: Mutex::new(Vec::new()),
        })
    }
}

impl ImageCodec for CountingCodec {
    fn transcode(&self, input: &InputImage) -> Result<EncodedImage, EncodeError> {
        let n = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(n, Ordering::SeqCst);
        self.calls.lock().unwrap().push(input.name.clone());
        std::thread::sleep(Duration::from_millis(5));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        Ok(EncodedImage {
            source: input.name.clone(),
            data: Bytes::from(format!("enc:{}", input.name)),
            width: 1,
            height: 1,
        })
    }
}

fn batch(names: &[&str]) -> Vec<InputImage> {
    names
        .iter()
        .map(|name| InputImage::new(*name, Bytes::new()))
        .collect()
}

#[tokio::test]
async fn test_session_accumulates_across_batches() {
    let session = Session::with_codec("s", CountingCodec::new());

    session.process_batch(batch(&["a", "b"])).await.unwrap();
    session.process_batch(batch(&["c"])).await.unwrap();

    // One archive per session; the second batch extends it.
    assert_eq!(session.archived().await, 3);
    assert_eq!(session.state(), BatchState::Done);

    let data = session.finalize().await.unwrap();
    let zip = zip::ZipArchive::new(std::io::Cursor::new(data.to_vec())).unwrap();
    assert_eq!(zip.len(), 3);
}

#[tokio::test]
async fn test_overlapping_submissions_queue_on_one_archive() {
    let codec = CountingCodec::new();
    let session = Arc::new(Session::with_codec("s", codec.clone()));

    let first = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.process_batch(batch(&["a", "b"])).await })
    };
    let second = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.process_batch(batch(&["c", "d"])).await })
    };

    first.await.unwrap().unwrap();
    second.await.unwrap().unwrap();

    // Never a second archive and never interleaved completions.
    assert_eq!(session.archived().await, 4);
    assert_eq!(codec.max_in_flight.load(Ordering::SeqCst), 1);

    let data = session.finalize().await.unwrap();
    let mut zip = zip::ZipArchive::new(std::io::Cursor::new(data.to_vec())).unwrap();
    let mut names: Vec<String> = (0..zip.len())
        .map(|i| zip.by_index(i).unwrap().name().to_string())
        .collect();
    names.sort();
    assert_eq!(
        names,
        vec![
            "images/1.jpg",
            "images/2.jpg",
            "images/3.jpg",
            "images/4.jpg"
        ]
    );
}

#[tokio::test]
async fn test_finalize_empty_session_is_nothing_to_save() {
    let session = Session::with_codec("s", CountingCodec::new());

    match session.finalize().await {
        Err(ArchiveError::Empty) => {}
        other => panic!("expected Empty, got {:?}", other.map(|b| b.len())),
    }
}

#[tokio::test]
async fn test_empty_batch_leaves_session_idle() {
    let session = Session::with_codec("s", CountingCodec::new());

    match session.process_batch(Vec::new()).await {
        Err(BatchError::EmptyBatch) => {}
        other => panic!("expected EmptyBatch, got {:?}", other),
    }
    assert_eq!(session.state(), BatchState::Idle);
    assert_eq!(session.archived().await, 0);
}
