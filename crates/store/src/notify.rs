use log::{error, info};

use crate::observable::{Subject, Subscription};

/// How many messages are kept before the oldest are dropped
pub const MAX_MESSAGES: usize = 20;

/// Somewhere to show errors to the user
pub trait Notifier: Send + Sync {
    fn show_errors(&self, message: &str);
}

/// Error messages waiting to be shown, for a UI to watch.
/// Only the latest [`MAX_MESSAGES`] are kept.
#[derive(Clone)]
pub struct Messages {
    errors: Subject<Vec<String>>,
}

impl Default for Messages {
    fn default() -> Self {
        Self::new()
    }
}

impl Messages {
    pub fn new() -> Self {
        Self {
            errors: Subject::new(vec![]),
        }
    }

    pub fn errors(&self) -> Subscription<Vec<String>> {
        self.errors.subscribe()
    }

    pub fn current(&self) -> Vec<String> {
        self.errors.get()
    }

    /// Dismiss all messages
    pub fn clear(&self) {
        self.errors.publish(vec![]);
    }
}

impl Notifier for Messages {
    fn show_errors(&self, message: &str) {
        info!("showing error: {}", message);
        self.errors.update(|errors| {
            let skip = (errors.len() + 1).saturating_sub(MAX_MESSAGES);
            errors
                .iter()
                .skip(skip)
                .cloned()
                .chain(std::iter::once(message.to_string()))
                .collect()
        });
    }
}

/// Sends errors to the log and nowhere else
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn show_errors(&self, message: &str) {
        error!("{}", message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_show_and_clear() {
        let messages = Messages::new();
        let mut errors = messages.errors();

        messages.show_errors("Could not load courses");
        messages.show_errors("Could not save course");
        assert_eq!(
            messages.current(),
            vec!["Could not load courses", "Could not save course"]
        );

        messages.clear();
        assert!(messages.current().is_empty());
        assert_eq!(errors.drain().len(), 4);
    }

    #[test]
    fn test_oldest_dropped() {
        let messages = Messages::new();
        for i in 0..MAX_MESSAGES + 5 {
            messages.show_errors(&format!("error {}", i));
        }

        let current = messages.current();
        assert_eq!(current.len(), MAX_MESSAGES);
        assert_eq!(current[0], "error 5");
        assert_eq!(current[MAX_MESSAGES - 1], format!("error {}", MAX_MESSAGES + 4));
    }
}
