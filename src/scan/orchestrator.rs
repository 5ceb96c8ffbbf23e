use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info, instrument, warn, Instrument};

use crate::api::ApiClient;
use crate::error::{ClientError, ClientResult};
use crate::results::{self, ScanResult};
use crate::scan::image::ImageRef;
use crate::scan::mode::ScanMode;
use crate::scan::upload::build_scan_request;

/// Upload lifecycle of the pending scan.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ScanPhase {
    #[default]
    Idle,
    Ready,
    Uploading,
    Succeeded(Arc<ScanResult>),
    Failed(ClientError),
}

impl ScanPhase {
    pub fn is_uploading(&self) -> bool {
        matches!(self, ScanPhase::Uploading)
    }
}

#[derive(Debug, Clone, Default)]
pub struct PendingScan {
    pub mode: ScanMode,
    pub images: Vec<ImageRef>,
    pub phase: ScanPhase,
}

/// State shared with the upload task.
struct Shared {
    state: Mutex<PendingScan>,
    phase_tx: watch::Sender<ScanPhase>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PendingScan> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, state: &mut PendingScan, phase: ScanPhase) {
        debug!(from = ?state.phase, to = ?phase, "scan phase");
        state.phase = phase.clone();
        self.phase_tx.send_replace(phase);
    }

    /// Leaves `Uploading` for good: success clears the images, failure keeps
    /// them for a retry.
    fn finish(&self, mode: ScanMode, outcome: &ClientResult<ScanResult>) {
        let mut state = self.lock();
        match outcome {
            Ok(result) => {
                info!(%mode, score = result.health_score.overall_score, "scan succeeded");
                state.images.clear();
                self.transition(&mut state, ScanPhase::Succeeded(Arc::new(result.clone())));
            }
            Err(e) => {
                warn!(%mode, error = %e, "scan failed");
                self.transition(&mut state, ScanPhase::Failed(e.clone()));
            }
        }
    }
}

/// Owns the pending scan and drives it through upload.
///
/// Only `submit` suspends. The state lock is never held across an await,
/// so a second `submit` observes `Uploading` and is rejected. The request
/// itself runs on a spawned task, so dropping the `submit` future does not
/// strand the orchestrator in `Uploading`.
pub struct ScanOrchestrator {
    api: ApiClient,
    shared: Arc<Shared>,
}

impl ScanOrchestrator {
    pub fn new(api: ApiClient) -> Self {
        let (phase_tx, _) = watch::channel(ScanPhase::Idle);
        Self {
            api,
            shared: Arc::new(Shared {
                state: Mutex::new(PendingScan::default()),
                phase_tx,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PendingScan> {
        self.shared.lock()
    }

    fn transition(&self, state: &mut PendingScan, phase: ScanPhase) {
        self.shared.transition(state, phase);
    }

    fn ensure_not_uploading(state: &PendingScan) -> ClientResult<()> {
        if state.phase.is_uploading() {
            return Err(ClientError::InvalidState("upload in progress"));
        }
        Ok(())
    }

    pub fn snapshot(&self) -> PendingScan {
        self.lock().clone()
    }

    pub fn phase(&self) -> ScanPhase {
        self.lock().phase.clone()
    }

    pub fn mode(&self) -> ScanMode {
        self.lock().mode
    }

    /// Completion events for presentation; always holds the latest phase.
    pub fn phases(&self) -> watch::Receiver<ScanPhase> {
        self.shared.phase_tx.subscribe()
    }

    /// Switching mode discards any staged images.
    pub fn select_mode(&self, mode: ScanMode) -> ClientResult<()> {
        let mut state = self.lock();
        Self::ensure_not_uploading(&state)?;
        state.mode = mode;
        state.images.clear();
        self.transition(&mut state, ScanPhase::Idle);
        Ok(())
    }

    /// Returns the number of staged images.
    pub fn add_image(&self, image: ImageRef) -> ClientResult<usize> {
        let mut state = self.lock();
        Self::ensure_not_uploading(&state)?;
        image.check()?;

        let desc = state.mode.descriptor();
        if state.mode.is_multi_image() {
            if state.images.len() >= desc.max_images {
                return Err(ClientError::CapacityExceeded {
                    mode: state.mode.as_str(),
                    max: desc.max_images,
                });
            }
            state.images.push(image);
        } else {
            state.images.clear();
            state.images.push(image);
        }
        self.transition(&mut state, ScanPhase::Ready);
        Ok(state.images.len())
    }

    pub fn remove_image(&self, index: usize) -> ClientResult<usize> {
        let mut state = self.lock();
        Self::ensure_not_uploading(&state)?;
        if index >= state.images.len() {
            return Err(ClientError::Validation(format!(
                "no staged image at index {}",
                index
            )));
        }
        state.images.remove(index);
        let next = if state.images.is_empty() {
            ScanPhase::Idle
        } else {
            ScanPhase::Ready
        };
        self.transition(&mut state, next);
        Ok(state.images.len())
    }

    pub fn discard(&self) -> ClientResult<()> {
        let mut state = self.lock();
        Self::ensure_not_uploading(&state)?;
        state.images.clear();
        self.transition(&mut state, ScanPhase::Idle);
        Ok(())
    }

    /// Upload the staged images. From `Failed` this is a retry with the
    /// same images.
    #[instrument(skip(self))]
    pub async fn submit(&self) -> ClientResult<ScanResult> {
        let (mode, request) = {
            let mut state = self.lock();
            if state.phase.is_uploading() {
                return Err(ClientError::AlreadyInProgress);
            }
            if state.images.is_empty() {
                return Err(ClientError::InvalidState("no images staged"));
            }
            self.api.session().authorized_token()?;
            let request = build_scan_request(state.mode, &state.images)?;
            self.transition(&mut state, ScanPhase::Uploading);
            (state.mode, request)
        };
        info!(%mode, endpoint = %request.path, "uploading scan");

        let api = self.api.clone();
        let shared = self.shared.clone();
        let upload = tokio::spawn(async move {
            let outcome = match api.send_authorized(request).await {
                Ok(response) => results::project(&response.body),
                Err(e) => Err(e),
            };
            shared.finish(mode, &outcome);
            outcome
        }
        .in_current_span());

        match upload.await {
            Ok(outcome) => outcome,
            Err(e) => {
                let outcome = Err(ClientError::Network(format!("upload task failed: {}", e)));
                self.shared.finish(mode, &outcome);
                outcome
            }
        }
    }
}
