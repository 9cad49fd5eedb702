//! Isolated OCR worker with correlated request/response messaging.
//!
//! Requests travel to a single worker task tagged with a fresh [`Uuid`].
//! Each caller parks on its own `oneshot` completion in a pending table; a
//! dispatcher task routes responses back by id and removes the entry as it
//! delivers, so no completion ever fires twice. A caller that waits longer
//! than the configured timeout removes its own entry and fails with
//! [`PickerError::RecognitionTimeout`]. When the worker ends for any reason
//! the dispatcher fails everything still pending and refuses new requests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

use super::extractor::TextExtractor;
use crate::error::PickerError;

/// Default per-request timeout.
pub const DEFAULT_OCR_TIMEOUT: Duration = Duration::from_secs(60);

const REQUEST_QUEUE: usize = 16;

type Completion = oneshot::Sender<Result<String, PickerError>>;

#[derive(Debug, Default)]
struct PendingTable {
    waiters: HashMap<Uuid, Completion>,
    closed: bool,
}

type Pending = Arc<Mutex<PendingTable>>;

fn lock(pending: &Pending) -> MutexGuard<'_, PendingTable> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

fn worker_stopped() -> PickerError {
    PickerError::Recognition("OCR worker is not running".to_string())
}

#[derive(Debug)]
struct OcrRequest {
    id: Uuid,
    image: Vec<u8>,
}

#[derive(Debug)]
struct OcrResponse {
    id: Uuid,
    result: Result<String, PickerError>,
}

/// Handle for sending images to the OCR worker. Cheap to clone.
#[derive(Debug, Clone)]
pub struct OcrClient {
    requests: mpsc::Sender<OcrRequest>,
    pending: Pending,
    timeout: Duration,
}

impl OcrClient {
    /// Starts a worker around `extractor`.
    ///
    /// Must be called inside a Tokio runtime.
    #[must_use]
    pub fn spawn<E: TextExtractor>(extractor: E, timeout: Duration) -> Self {
        let (request_tx, request_rx) = mpsc::channel(REQUEST_QUEUE);
        let (response_tx, response_rx) = mpsc::unbounded_channel();
        let pending: Pending = Arc::new(Mutex::new(PendingTable::default()));

        tokio::spawn(worker_loop(extractor, request_rx, response_tx));
        tokio::spawn(dispatch_loop(response_rx, Arc::clone(&pending)));
        tracing::info!(timeout_secs = timeout.as_secs(), "OCR worker started");

        Self {
            requests: request_tx,
            pending,
            timeout,
        }
    }

    /// The per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Number of requests waiting for a response.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        lock(&self.pending).waiters.len()
    }

    /// Sends `image` to the worker and waits for the extracted text.
    ///
    /// # Errors
    ///
    /// - [`PickerError::Recognition`] if extraction fails or the worker is
    ///   gone.
    /// - [`PickerError::RecognitionTimeout`] if no answer arrives in time.
    pub async fn recognize(&self, image: Vec<u8>) -> Result<String, PickerError> {
        let id = Uuid::new_v4();
        let (tx, rx) = oneshot::channel();
        {
            let mut table = lock(&self.pending);
            if table.closed {
                return Err(worker_stopped());
            }
            table.waiters.insert(id, tx);
        }

        tracing::debug!(%id, bytes = image.len(), "OCR request queued");
        if self.requests.send(OcrRequest { id, image }).await.is_err() {
            lock(&self.pending).waiters.remove(&id);
            return Err(worker_stopped());
        }

        match tokio::time::timeout(self.timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(worker_stopped()),
            Err(_) => {
                lock(&self.pending).waiters.remove(&id);
                tracing::warn!(%id, timeout_secs = self.timeout.as_secs(), "OCR request timed out");
                Err(PickerError::RecognitionTimeout {
                    secs: self.timeout.as_secs(),
                })
            }
        }
    }
}

async fn worker_loop<E: TextExtractor>(
    extractor: E,
    mut requests: mpsc::Receiver<OcrRequest>,
    responses: mpsc::UnboundedSender<OcrResponse>,
) {
    while let Some(OcrRequest { id, image }) = requests.recv().await {
        let result = extractor.extract(image).await;
        match &result {
            Ok(text) => tracing::debug!(%id, chars = text.len(), "OCR request done"),
            Err(e) => tracing::warn!(%id, error = %e, "text recognition failed"),
        }
        if responses.send(OcrResponse { id, result }).is_err() {
            break;
        }
    }
    tracing::debug!("OCR worker stopped");
}

async fn dispatch_loop(mut responses: mpsc::UnboundedReceiver<OcrResponse>, pending: Pending) {
    while let Some(OcrResponse { id, result }) = responses.recv().await {
        let waiter = lock(&pending).waiters.remove(&id);
        match waiter {
            Some(tx) => {
                let _ = tx.send(result);
            }
            None => tracing::debug!(%id, "dropping response for abandoned OCR request"),
        }
    }

    let orphaned: Vec<Completion> = {
        let mut table = lock(&pending);
        table.closed = true;
        table.waiters.drain().map(|(_, tx)| tx).collect()
    };
    if !orphaned.is_empty() {
        tracing::error!(pending = orphaned.len(), "OCR worker died with requests pending");
    }
    for tx in orphaned {
        let _ = tx.send(Err(worker_stopped()));
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use std::future::Future;

    use super::*;

    /// Returns the image bytes as text, upper-cased.
    struct EchoExtractor;

    impl TextExtractor for EchoExtractor {
        fn extract(
            &self,
            image: Vec<u8>,
        ) -> impl Future<Output = Result<String, PickerError>> + Send {
            async move {
                let text = String::from_utf8(image)
                    .map_err(|e| PickerError::Recognition(e.to_string()))?;
                Ok::<_, PickerError>(text.to_uppercase())
            }
        }
    }

    struct SlowExtractor(Duration);

    impl TextExtractor for SlowExtractor {
        fn extract(
            &self,
            _image: Vec<u8>,
        ) -> impl Future<Output = Result<String, PickerError>> + Send {
            let delay = self.0;
            async move {
                tokio::time::sleep(delay).await;
                Ok::<_, PickerError>(String::new())
            }
        }
    }

    /// Panics on any non-empty image, taking the worker down.
    struct CrashingExtractor;

    impl TextExtractor for CrashingExtractor {
        fn extract(
            &self,
            image: Vec<u8>,
        ) -> impl Future<Output = Result<String, PickerError>> + Send {
            async move {
                if !image.is_empty() {
                    panic!("extractor crashed");
                }
                Ok::<_, PickerError>(String::new())
            }
        }
    }

    #[tokio::test]
    async fn routes_each_response_to_its_caller() {
        let client = OcrClient::spawn(EchoExtractor, DEFAULT_OCR_TIMEOUT);
        let (a, b) = tokio::join!(
            client.recognize(b"ada".to_vec()),
            client.recognize(b"bea".to_vec())
        );
        assert_eq!(a.ok().as_deref(), Some("ADA"));
        assert_eq!(b.ok().as_deref(), Some("BEA"));
        assert_eq!(client.pending_count(), 0);
    }

    #[tokio::test]
    async fn extractor_errors_are_surfaced() {
        let client = OcrClient::spawn(EchoExtractor, DEFAULT_OCR_TIMEOUT);
        let result = client.recognize(vec![0xff, 0xfe]).await;
        assert!(matches!(result, Err(PickerError::Recognition(_))));
        // the worker keeps serving after a failed request
        assert!(client.recognize(b"ok".to_vec()).await.is_ok());
    }

    #[tokio::test]
    async fn slow_extraction_times_out_and_clears_pending() {
        let client = OcrClient::spawn(
            SlowExtractor(Duration::from_secs(30)),
            Duration::from_millis(50),
        );
        let result = client.recognize(b"image".to_vec()).await;
        assert!(matches!(result, Err(PickerError::RecognitionTimeout { .. })));
        assert_eq!(client.pending_count(), 0);
    }

    #[tokio::test]
    async fn worker_death_fails_pending_and_later_requests() {
        let client = OcrClient::spawn(CrashingExtractor, DEFAULT_OCR_TIMEOUT);
        let first = client.recognize(b"image".to_vec()).await;
        assert!(matches!(first, Err(PickerError::Recognition(_))));

        let second = client.recognize(b"image".to_vec()).await;
        assert!(matches!(second, Err(PickerError::Recognition(_))));
        assert_eq!(client.pending_count(), 0);
    }
}
