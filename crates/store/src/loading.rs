use log::debug;
use serde::{Deserialize, Serialize};
use std::{
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use crate::observable::{Subject, Subscription};

/// How overlapping operations affect the loading flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadingMode {
    /// The flag stays on until every wrapped operation has finished
    #[default]
    Counted,

    /// Any wrapped operation finishing turns the flag off, even if others are still running
    LastCompletion,
}

/// Tracks whether anything is currently loading.
/// Cloning gives another handle to the same flag.
#[derive(Clone)]
pub struct LoadingIndicator {
    flag: Subject<bool>,
    in_flight: Arc<Mutex<usize>>,
    mode: LoadingMode,
}

impl Default for LoadingIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingIndicator {
    pub fn new() -> Self {
        Self::with_mode(LoadingMode::default())
    }

    pub fn with_mode(mode: LoadingMode) -> Self {
        debug!("created loading indicator ({:?})", mode);
        Self {
            flag: Subject::new(false),
            in_flight: Default::default(),
            mode,
        }
    }

    pub fn mode(&self) -> LoadingMode {
        self.mode
    }

    /// Watch the loading flag, starting with its current value
    pub fn loading(&self) -> Subscription<bool> {
        self.flag.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.flag.get()
    }

    /// Set the flag directly. Turning it off also forgets any operations still in flight.
    pub fn set_loading(&self, loading: bool) {
        debug!("set_loading({})", loading);
        let mut in_flight = self.lock();
        if !loading {
            *in_flight = 0;
        }
        self.flag.publish_if_changed(loading);
    }

    /// Wrap `operation` so the flag is on while it runs.
    ///
    /// Nothing happens until the returned future is polled. The flag is released exactly once when
    /// `operation` finishes, or when the returned future is dropped before then.
    pub fn wrap<F>(&self, operation: F) -> impl Future<Output = F::Output>
    where
        F: Future,
    {
        let indicator = self.clone();
        async move {
            let _guard = indicator.begin();
            operation.await
        }
    }

    fn begin(&self) -> LoadingGuard {
        let mut in_flight = self.lock();
        *in_flight += 1;
        debug!("loading on ({} in flight)", *in_flight);
        self.flag.publish_if_changed(true);

        LoadingGuard {
            indicator: self.clone(),
        }
    }

    fn end(&self) {
        let mut in_flight = self.lock();
        *in_flight = in_flight.saturating_sub(1);
        debug!("loading off ({} in flight)", *in_flight);

        let loading = match self.mode {
            LoadingMode::Counted => *in_flight > 0,
            LoadingMode::LastCompletion => false,
        };
        self.flag.publish_if_changed(loading);
    }

    fn lock(&self) -> MutexGuard<'_, usize> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases one claim on the loading flag when dropped
struct LoadingGuard {
    indicator: LoadingIndicator,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.indicator.end();
    }
}
