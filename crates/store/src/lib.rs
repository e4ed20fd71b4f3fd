//! In-memory state for the course catalog.
//!
//! A [`CourseStore`] owns the list of courses and publishes a fresh, immutable snapshot every time
//! it changes. Saves are applied locally straight away and sent to the backend in the background.
//! A [`LoadingIndicator`] tracks whether anything is in flight, and a [`Notifier`] is told about
//! anything the user should know went wrong.
mod api;
mod error;
mod loading;
mod notify;
pub mod observable;
mod store;
mod view;

pub use api::CourseApi;
pub use error::{Error, Result};
pub use loading::{LoadingIndicator, LoadingMode};
pub use notify::{LogNotifier, Messages, Notifier, MAX_MESSAGES};
pub use store::{CourseStore, Courses, PendingSave, StoreOptions, StoreStatus};
pub use view::{filter_by_category, CategoryView};

pub use course_client::{Course, CourseChanges};
