use course_client::{Course, CourseChanges};
use log::{debug, error, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{
    collections::HashSet,
    future::Future,
    pin::Pin,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    task::{Context, Poll},
};
use tokio::task::JoinHandle;

use crate::{
    api::CourseApi,
    error::{Error, Result},
    loading::LoadingIndicator,
    notify::Notifier,
    observable::{Subject, Subscription},
    view::CategoryView,
};

/// An immutable snapshot of every course
pub type Courses = Arc<[Course]>;

const LOAD_FAILED: &str = "Could not load courses";
const SAVE_FAILED: &str = "Could not save course";

/// Where the store is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreStatus {
    /// Nothing has been loaded yet
    Empty,
    /// A load is in flight
    Loading,
    /// At least one load has succeeded
    Populated,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreOptions {
    /// Put a course back how it was if saving it fails
    #[serde(default)]
    pub revert_on_failure: bool,
}

/// Holds all courses, and keeps the backend up to date with changes to them.
///
/// Cloning gives another handle to the same store.
#[derive(Clone)]
pub struct CourseStore {
    api: Arc<dyn CourseApi>,
    loading: LoadingIndicator,
    notifier: Arc<dyn Notifier>,
    options: StoreOptions,

    courses: Subject<Courses>,
    status: Subject<StoreStatus>,
    /// Set once any load has succeeded
    loaded: Arc<AtomicBool>,
}

impl CourseStore {
    /// Create an empty store. Nothing is fetched until [`Self::load_all`] is called.
    pub fn new(
        api: Arc<dyn CourseApi>,
        loading: LoadingIndicator,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            api,
            loading,
            notifier,
            options: StoreOptions::default(),
            courses: Subject::new(Courses::from(Vec::new())),
            status: Subject::new(StoreStatus::Empty),
            loaded: Default::default(),
        }
    }

    pub fn with_options(mut self, options: StoreOptions) -> Self {
        self.options = options;
        self
    }

    /// Watch all courses, starting with the current ones
    pub fn courses(&self) -> Subscription<Courses> {
        self.courses.subscribe()
    }

    pub fn snapshot(&self) -> Courses {
        self.courses.get()
    }

    pub fn course(&self, id: &str) -> Option<Course> {
        self.snapshot().iter().find(|c| c.id == id).cloned()
    }

    pub fn status(&self) -> Subscription<StoreStatus> {
        self.status.subscribe()
    }

    pub fn loading(&self) -> &LoadingIndicator {
        &self.loading
    }

    /// Fetch every course from the backend, replacing whatever we had.
    ///
    /// On failure the user is told, and the courses we had stay as they were.
    pub async fn load_all(&self) -> Result<Courses> {
        debug!("loading courses...");
        self.status.publish(StoreStatus::Loading);

        match self.loading.wrap(self.api.load_courses()).await {
            Ok(courses) => {
                debug!("loaded {} courses", courses.len());
                warn_duplicates(&courses);

                let courses: Courses = courses.into();
                self.courses.publish(courses.clone());
                self.loaded.store(true, Ordering::SeqCst);
                self.status.publish(StoreStatus::Populated);

                Ok(courses)
            }
            Err(e) => {
                self.notifier.show_errors(LOAD_FAILED);
                error!("{}: {}", LOAD_FAILED, e);
                // Another load may have succeeded while this one was in flight
                self.status.publish(match self.loaded.load(Ordering::SeqCst) {
                    true => StoreStatus::Populated,
                    false => StoreStatus::Empty,
                });

                Err(Error::Load(e))
            }
        }
    }

    /// Apply `changes` to the course with the given id, then save them to the backend.
    ///
    /// The change is visible to subscribers before this returns. The save runs in the background
    /// whether or not the returned [`PendingSave`] is awaited. If it fails the user is told, but the
    /// change stays unless [`StoreOptions::revert_on_failure`] is set.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn save_course(&self, id: &str, changes: CourseChanges) -> Result<PendingSave> {
        let prior = self
            .courses
            .try_update(|courses| {
                let idx = courses
                    .iter()
                    .position(|c| c.id == id)
                    .ok_or_else(|| Error::NotFound(id.to_string()))?;

                let updated = courses[idx]
                    .merged(&changes)
                    .map_err(|source| Error::InvalidChanges {
                        id: id.to_string(),
                        source,
                    })?;
                if updated.id != id {
                    return Err(Error::IdChanged(id.to_string()));
                }

                let mut next = courses.to_vec();
                let prior = std::mem::replace(&mut next[idx], updated);

                Ok((Courses::from(next), prior))
            })
            .map_err(|e| {
                warn!("not saving course: {}", e);
                e
            })?;
        debug!("updated course {} locally, saving", id);

        let store = self.clone();
        let task_id = id.to_string();
        let task_prior = prior.clone();
        let handle =
            tokio::spawn(async move { store.persist(task_id, changes, task_prior).await });

        Ok(PendingSave {
            id: id.to_string(),
            prior,
            handle,
        })
    }

    /// Put a single course back to how it was, e.g. after a failed save.
    /// Returns false if there's no longer a course with that id.
    pub fn revert_course(&self, prior: Course) -> bool {
        let reverted = self.courses.try_update(|courses| {
            let idx = courses.iter().position(|c| c.id == prior.id).ok_or(())?;

            let mut next = courses.to_vec();
            next[idx] = prior.clone();

            Ok((Courses::from(next), ()))
        });

        match reverted {
            Ok(()) => {
                debug!("reverted course {}", prior.id);
                true
            }
            Err(()) => {
                warn!("can't revert course {}, it's gone", prior.id);
                false
            }
        }
    }

    /// Undo the keys a save changed, putting back their values from `prior`.
    ///
    /// Keys that have been changed again since, and other keys of the course, are left alone.
    /// Returns false if there's nothing left to undo.
    pub fn revert_changes(&self, prior: &Course, changes: &CourseChanges) -> bool {
        let reverted = self.courses.try_update(|courses| {
            let idx = courses.iter().position(|c| c.id == prior.id).ok_or(())?;

            let undone = courses[idx].undo(prior, changes).map_err(|e| {
                warn!("can't undo changes to course {}: {}", prior.id, e);
            })?;
            if undone == courses[idx] {
                return Err(());
            }

            let mut next = courses.to_vec();
            next[idx] = undone;

            Ok((Courses::from(next), ()))
        });

        match reverted {
            Ok(()) => {
                debug!("undid changes to course {}", prior.id);
                true
            }
            Err(()) => {
                debug!("nothing to undo for course {}", prior.id);
                false
            }
        }
    }

    /// Go back to an earlier snapshot of all courses
    pub fn restore(&self, snapshot: Courses) {
        debug!("restoring snapshot of {} courses", snapshot.len());
        self.courses.publish(snapshot);
    }

    /// Watch the courses in one category
    pub fn filter_by_category(&self, category: impl Into<String>) -> CategoryView {
        CategoryView::new(category.into(), self.courses())
    }

    /// Stop publishing. Subscribers see the end of their streams once they've caught up.
    pub fn close(&self) {
        debug!("closing store");
        self.courses.complete();
        self.status.complete();
    }

    async fn persist(&self, id: String, changes: CourseChanges, prior: Course) -> Result<Value> {
        match self.api.save_course(&id, &changes).await {
            Ok(v) => {
                debug!("saved course {}", id);
                Ok(v)
            }
            Err(e) => {
                self.notifier.show_errors(SAVE_FAILED);
                error!("{}: {}", SAVE_FAILED, e);
                if self.options.revert_on_failure {
                    self.revert_changes(&prior, &changes);
                }

                Err(Error::Save { id, source: e })
            }
        }
    }
}

fn warn_duplicates(courses: &[Course]) {
    let mut seen = HashSet::new();
    for c in courses {
        if !seen.insert(c.id.as_str()) {
            warn!("backend sent course {} more than once", c.id);
        }
    }
}

/// A save that's running in the background. Resolves to the backend's response.
pub struct PendingSave {
    id: String,
    prior: Course,
    handle: JoinHandle<Result<Value>>,
}

impl PendingSave {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The course as it was before the change
    pub fn prior(&self) -> &Course {
        &self.prior
    }
}

impl Future for PendingSave {
    type Output = Result<Value>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match Pin::new(&mut this.handle).poll(cx) {
            Poll::Ready(Ok(r)) => Poll::Ready(r),
            Poll::Ready(Err(source)) => Poll::Ready(Err(Error::Aborted {
                id: this.id.clone(),
                source,
            })),
            Poll::Pending => Poll::Pending,
        }
    }
}
