//! Values that can be watched over time.
//!
//! A [`Subject`] holds the latest value and broadcasts every value published after it.
//! A [`Subscription`] first yields the value that was current when it subscribed, then
//! every later one in the order they were published.
use futures::Stream;
use log::warn;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};

/// How many values a subscriber may fall behind before it starts missing some
pub const DEFAULT_CAPACITY: usize = 64;

/// The latest value of something, and a channel of its changes.
pub struct Subject<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

struct Inner<T> {
    current: T,
    /// `None` once completed
    sender: Option<broadcast::Sender<T>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T: Clone> Subject<T> {
    pub fn new(initial: T) -> Self {
        Self::with_capacity(initial, DEFAULT_CAPACITY)
    }

    /// A subject whose subscribers may fall `capacity` values behind. A capacity of 0 is treated as 1.
    pub fn with_capacity(initial: T, capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            inner: Arc::new(Mutex::new(Inner {
                current: initial,
                sender: Some(sender),
            })),
        }
    }

    /// The latest published value
    pub fn get(&self) -> T {
        self.lock().current.clone()
    }

    /// Subscribe to this subject, starting with its current value.
    pub fn subscribe(&self) -> Subscription<T> {
        let inner = self.lock();
        match &inner.sender {
            Some(sender) => Subscription {
                replay: Some(inner.current.clone()),
                receiver: Some(sender.subscribe()),
            },
            None => Subscription {
                replay: None,
                receiver: None,
            },
        }
    }

    /// Replace the current value and send it to all subscribers.
    /// Returns false if the subject has been completed, in which case nothing happens.
    pub fn publish(&self, value: T) -> bool {
        let mut inner = self.lock();
        Self::publish_locked(&mut inner, value)
    }

    /// Compute the next value from the current one and publish it.
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> bool {
        let mut inner = self.lock();
        let next = f(&inner.current);
        Self::publish_locked(&mut inner, next)
    }

    /// Like [`Self::update`], but `f` may fail, in which case nothing is published.
    /// Nothing else can publish between `f` reading the current value and its result being published.
    pub fn try_update<R, E>(&self, f: impl FnOnce(&T) -> Result<(T, R), E>) -> Result<R, E> {
        let mut inner = self.lock();
        let (next, ret) = f(&inner.current)?;
        Self::publish_locked(&mut inner, next);

        Ok(ret)
    }

    /// End the subject. Subscribers get `None` once they've read everything already published.
    pub fn complete(&self) {
        self.lock().sender = None;
    }

    pub fn is_completed(&self) -> bool {
        self.lock().sender.is_none()
    }

    pub fn subscriber_count(&self) -> usize {
        self.lock()
            .sender
            .as_ref()
            .map(|s| s.receiver_count())
            .unwrap_or(0)
    }

    fn publish_locked(inner: &mut Inner<T>, value: T) -> bool {
        let Some(sender) = &inner.sender else {
            return false;
        };

        // An error here only means nobody is subscribed
        let _ = sender.send(value.clone());
        inner.current = value;

        true
    }

    fn lock(&self) -> MutexGuard<'_, Inner<T>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Clone + PartialEq> Subject<T> {
    /// Publish `value` only if it differs from the current one.
    /// Returns true if it was published.
    pub fn publish_if_changed(&self, value: T) -> bool {
        let mut inner = self.lock();
        if inner.current == value {
            return false;
        }

        Self::publish_locked(&mut inner, value)
    }
}

/// A subscriber's view of a [`Subject`]. Dropping it unsubscribes.
pub struct Subscription<T> {
    replay: Option<T>,
    receiver: Option<broadcast::Receiver<T>>,
}

impl<T: Clone> Subscription<T> {
    /// Wait for the next value, or `None` if the subject has completed.
    pub async fn next(&mut self) -> Option<T> {
        if let Some(v) = self.replay.take() {
            return Some(v);
        }

        loop {
            let result = match self.receiver.as_mut() {
                Some(r) => r.recv().await,
                None => return None,
            };

            match result {
                Ok(v) => return Some(v),
                Err(RecvError::Lagged(n)) => warn!("subscriber fell behind, skipped {} values", n),
                Err(RecvError::Closed) => {
                    self.receiver = None;
                    return None;
                }
            }
        }
    }

    /// Get the next value if one is ready, without waiting.
    pub fn try_next(&mut self) -> Option<T> {
        if let Some(v) = self.replay.take() {
            return Some(v);
        }

        loop {
            match self.receiver.as_mut()?.try_recv() {
                Ok(v) => return Some(v),
                Err(TryRecvError::Lagged(n)) => {
                    warn!("subscriber fell behind, skipped {} values", n)
                }
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Closed) => {
                    self.receiver = None;
                    return None;
                }
            }
        }
    }

    /// Read every value that is ready right now.
    pub fn drain(&mut self) -> Vec<T> {
        std::iter::from_fn(|| self.try_next()).collect()
    }

    pub fn unsubscribe(self) {}

    pub fn into_stream(self) -> impl Stream<Item = T>
    where
        T: Send + 'static,
    {
        futures::stream::unfold(self, |mut s| async move { s.next().await.map(|v| (v, s)) })
    }
}
