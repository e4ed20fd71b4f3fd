use course_client::{sort_by_seq_no, Course};
use futures::Stream;
use log::trace;

use crate::{observable::Subscription, Courses};

/// A live view of the courses in one category, sorted by `seq_no`.
///
/// Nothing is yielded while the store has no courses at all. After that, every change to the
/// store yields the category's courses again, even if they didn't change.
pub struct CategoryView {
    category: String,
    courses: Subscription<Courses>,
}

impl CategoryView {
    pub(crate) fn new(category: String, courses: Subscription<Courses>) -> Self {
        Self { category, courses }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Wait for the next version of the view, or `None` once the store is closed.
    pub async fn next(&mut self) -> Option<Vec<Course>> {
        loop {
            let courses = self.courses.next().await?;
            if let Some(v) = self.apply(&courses) {
                return Some(v);
            }
        }
    }

    /// Get the next version of the view if one is ready, without waiting.
    pub fn try_next(&mut self) -> Option<Vec<Course>> {
        loop {
            let courses = self.courses.try_next()?;
            if let Some(v) = self.apply(&courses) {
                return Some(v);
            }
        }
    }

    pub fn into_stream(self) -> impl Stream<Item = Vec<Course>> {
        futures::stream::unfold(self, |mut v| async move { v.next().await.map(|c| (c, v)) })
    }

    fn apply(&self, courses: &[Course]) -> Option<Vec<Course>> {
        trace!("filtering {} courses by {}", courses.len(), self.category);
        if courses.is_empty() {
            return None;
        }

        Some(filter_by_category(courses, &self.category))
    }
}

/// The courses in `category`, sorted by `seq_no`
pub fn filter_by_category(courses: &[Course], category: &str) -> Vec<Course> {
    let mut filtered: Vec<_> = courses
        .iter()
        .filter(|c| c.category == category)
        .cloned()
        .collect();
    sort_by_seq_no(&mut filtered);

    filtered
}
