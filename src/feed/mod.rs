//! Image feed - the lifecycle-bound owner of one aggregate fetch
//!
//! A feed is mounted once. Mounting spawns a single task that fetches every
//! endpoint concurrently and commits exactly one terminal state. Unmounting
//! (or dropping the feed) cancels the task; a cancelled task never commits.

mod state;

pub use state::{FetchState, StateSnapshot};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::photos::PhotoClient;

/// Mounted image feed
#[derive(Debug)]
pub struct ImageFeed {
    state: watch::Receiver<FetchState>,
    cancel_tx: watch::Sender<bool>,
}

impl ImageFeed {
    /// Mount a feed and start its fetch task. Must be called inside a tokio runtime.
    pub fn mount(client: PhotoClient, endpoints: Vec<String>) -> Self {
        let (state_tx, state_rx) = watch::channel(FetchState::Loading);
        let (cancel_tx, cancel_rx) = watch::channel(false);

        info!("Mounting image feed with {} endpoints", endpoints.len());
        tokio::spawn(run(client, endpoints, state_tx, cancel_rx));

        Self {
            state: state_rx,
            cancel_tx,
        }
    }

    /// Current state
    pub fn state(&self) -> FetchState {
        self.state.borrow().clone()
    }

    /// True until the fetch settles
    pub fn loading(&self) -> bool {
        self.state.borrow().is_loading()
    }

    /// Watch state changes
    pub fn subscribe(&self) -> watch::Receiver<FetchState> {
        self.state.clone()
    }

    /// Wait for the terminal state.
    ///
    /// Returns `Loading` if the feed was unmounted before the fetch completed.
    pub async fn settled(&self) -> FetchState {
        let mut rx = self.state.clone();
        if rx.wait_for(|state| !state.is_loading()).await.is_err() {
            debug!("Image feed task ended without committing");
        }
        let state = rx.borrow().clone();
        state
    }

    /// Cancel the fetch task. Idempotent.
    pub fn unmount(&self) {
        if !self.cancel_tx.send_replace(true) {
            debug!("Unmounting image feed");
        }
    }

    pub fn is_unmounted(&self) -> bool {
        *self.cancel_tx.borrow()
    }
}

impl Drop for ImageFeed {
    fn drop(&mut self) {
        self.unmount();
    }
}

/// Fetch task body
async fn run(
    client: PhotoClient,
    endpoints: Vec<String>,
    state_tx: watch::Sender<FetchState>,
    mut cancel_rx: watch::Receiver<bool>,
) {
    let result = tokio::select! {
        biased;
        _ = cancelled(&mut cancel_rx) => {
            debug!("Image feed cancelled with requests in flight");
            return;
        }
        result = client.fetch_urls(&endpoints) => result,
    };

    if *cancel_rx.borrow() {
        debug!("Image feed cancelled before commit");
        return;
    }

    match &result {
        Ok(urls) => info!("Image feed ready with {} images", urls.len()),
        Err(e) => warn!("Image feed failed: {}", e),
    }

    commit(&state_tx, result.into());
}

/// Resolves once cancellation is requested or the feed is gone
async fn cancelled(cancel_rx: &mut watch::Receiver<bool>) {
    let _ = cancel_rx.wait_for(|cancelled| *cancelled).await;
}

/// Move out of `Loading`. Later commits are ignored.
fn commit(state_tx: &watch::Sender<FetchState>, next: FetchState) -> bool {
    state_tx.send_if_modified(|state| {
        if state.is_loading() {
            *state = next;
            true
        } else {
            false
        }
    })
}
