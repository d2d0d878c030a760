//! Map widget loader
//!
//! Loading the widget is the only asynchronous step of the workspace.
//! [`MapLoader`] makes it a single shared operation: the first caller of
//! [`MapLoader::ensure_loaded`] drives the load and every concurrent caller
//! waits on the same outcome through a `tokio::sync::watch` channel.
//!
//! A failure is sticky until [`MapLoader::reset`]. If the driving caller is
//! cancelled mid-load the loader re-arms and a waiting caller takes over.

use agroavia_core::MapError;
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::watch;

use crate::map::MapWidget;

/// Produces a ready map widget
#[async_trait]
pub trait WidgetLoader: Send + Sync {
    async fn load(&self) -> Result<Arc<dyn MapWidget>, MapError>;
}

type LoadOutcome = Option<Result<Arc<dyn MapWidget>, MapError>>;

enum LoadState {
    Idle,
    Loading(watch::Receiver<LoadOutcome>),
    Ready(Arc<dyn MapWidget>),
    Failed(MapError),
}

enum Step {
    Done(Result<Arc<dyn MapWidget>, MapError>),
    Wait(watch::Receiver<LoadOutcome>),
    Drive(watch::Sender<LoadOutcome>),
}

/// Shared, de-duplicated widget loading
pub struct MapLoader {
    loader: Arc<dyn WidgetLoader>,
    state: Mutex<LoadState>,
}

impl MapLoader {
    pub fn new(loader: Arc<dyn WidgetLoader>) -> Self {
        Self {
            loader,
            state: Mutex::new(LoadState::Idle),
        }
    }

    /// Wait until the widget is ready, loading it if nobody has yet
    pub async fn ensure_loaded(&self) -> Result<Arc<dyn MapWidget>, MapError> {
        loop {
            match self.next_step() {
                Step::Done(result) => return result,
                Step::Drive(tx) => return self.drive(tx).await,
                Step::Wait(mut rx) => loop {
                    let current = rx.borrow().clone();
                    if let Some(result) = current {
                        return result;
                    }
                    if rx.changed().await.is_err() {
                        // The driving caller went away; start over
                        break;
                    }
                },
            }
        }
    }

    /// Whether a widget is ready
    pub fn is_loaded(&self) -> bool {
        matches!(*self.state.lock(), LoadState::Ready(_))
    }

    /// The ready widget, if any
    pub fn widget(&self) -> Option<Arc<dyn MapWidget>> {
        match &*self.state.lock() {
            LoadState::Ready(widget) => Some(widget.clone()),
            _ => None,
        }
    }

    /// Forget a loaded widget or a failure so the next caller loads again
    pub fn reset(&self) {
        let mut state = self.state.lock();
        if !matches!(*state, LoadState::Loading(_)) {
            *state = LoadState::Idle;
        }
    }

    fn next_step(&self) -> Step {
        let mut state = self.state.lock();
        match &*state {
            LoadState::Ready(widget) => Step::Done(Ok(widget.clone())),
            LoadState::Failed(err) => Step::Done(Err(err.clone())),
            LoadState::Loading(rx) => Step::Wait(rx.clone()),
            LoadState::Idle => {
                let (tx, rx) = watch::channel(None);
                *state = LoadState::Loading(rx);
                Step::Drive(tx)
            }
        }
    }

    async fn drive(&self, tx: watch::Sender<LoadOutcome>) -> Result<Arc<dyn MapWidget>, MapError> {
        tracing::info!("Loading map widget");
        let mut guard = InFlight {
            state: &self.state,
            armed: true,
        };
        let result = self.loader.load().await;
        guard.armed = false;

        *self.state.lock() = match &result {
            Ok(widget) => LoadState::Ready(widget.clone()),
            Err(err) => LoadState::Failed(err.clone()),
        };
        match &result {
            Ok(_) => tracing::info!("Map widget ready"),
            Err(e) => tracing::warn!("Map widget unavailable: {}", e),
        }
        // Waiters may all be gone; that is fine
        let _ = tx.send(Some(result.clone()));
        result
    }
}

impl std::fmt::Debug for MapLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match &*self.state.lock() {
            LoadState::Idle => "idle",
            LoadState::Loading(_) => "loading",
            LoadState::Ready(_) => "ready",
            LoadState::Failed(_) => "failed",
        };
        f.debug_struct("MapLoader").field("state", &state).finish()
    }
}

/// Re-arms the loader if the driving future is dropped before completion
struct InFlight<'a> {
    state: &'a Mutex<LoadState>,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed {
            tracing::debug!("Map widget load cancelled");
            *self.state.lock() = LoadState::Idle;
        }
    }
}
