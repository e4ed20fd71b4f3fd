#![allow(dead_code)]

use async_trait::async_trait;
use course_client::{Course, CourseChanges, Error, Result};
use course_store::{CourseApi, CourseStore, LoadingIndicator, Messages, StoreOptions};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use tokio::sync::{Notify, Semaphore};

/// An in-memory backend. Saves can be held open until released.
pub struct FakeApi {
    courses: Mutex<Option<Vec<Course>>>,
    save_status: Mutex<Option<u16>>,
    saves: Mutex<Vec<(String, CourseChanges)>>,
    rejected: Mutex<Vec<(String, Value)>>,
    held: Option<Semaphore>,
    held_load: Mutex<Option<Arc<Notify>>>,
}

impl FakeApi {
    pub fn new(courses: Vec<Course>) -> Self {
        Self {
            courses: Mutex::new(Some(courses)),
            save_status: Mutex::new(None),
            saves: Default::default(),
            rejected: Default::default(),
            held: None,
            held_load: Default::default(),
        }
    }

    /// A backend that's unreachable for loads
    pub fn failing() -> Self {
        Self {
            courses: Mutex::new(None),
            ..Self::new(vec![])
        }
    }

    /// Don't answer saves until [`Self::release`] is called
    pub fn hold_saves(mut self) -> Self {
        self.held = Some(Semaphore::new(0));
        self
    }

    /// Let one held save through
    pub fn release(&self) {
        if let Some(s) = &self.held {
            s.add_permits(1);
        }
    }

    /// Hold the next load open until the returned gate is notified.
    /// The load's result is decided when it starts, not when it's let through.
    pub fn hold_next_load(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.held_load.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Reject saves that set `key` to `value`
    pub fn reject_when(&self, key: &str, value: Value) {
        self.rejected
            .lock()
            .unwrap()
            .push((key.to_string(), value));
    }

    /// Reject all saves from now on with the given status
    pub fn reject_saves(&self, status: u16) {
        *self.save_status.lock().unwrap() = Some(status);
    }

    pub fn set_courses(&self, courses: Vec<Course>) {
        *self.courses.lock().unwrap() = Some(courses);
    }

    /// Fail all loads from now on
    pub fn fail_loads(&self) {
        *self.courses.lock().unwrap() = None;
    }

    pub fn saves(&self) -> Vec<(String, CourseChanges)> {
        self.saves.lock().unwrap().clone()
    }
}

#[async_trait]
impl CourseApi for FakeApi {
    async fn load_courses(&self) -> Result<Vec<Course>> {
        let result = self.courses.lock().unwrap().clone().ok_or(Error::Status {
            status: 503,
            url: "/api/courses".to_string(),
        });

        let gate = self.held_load.lock().unwrap().take();
        match gate {
            Some(gate) => gate.notified().await,
            None => tokio::task::yield_now().await,
        }

        result
    }

    async fn save_course(&self, course_id: &str, changes: &CourseChanges) -> Result<Value> {
        self.saves
            .lock()
            .unwrap()
            .push((course_id.to_string(), changes.clone()));

        if let Some(s) = &self.held {
            s.acquire().await.unwrap().forget();
        }

        let rejected = self
            .rejected
            .lock()
            .unwrap()
            .iter()
            .any(|(k, v)| changes.get(k) == Some(v));
        if rejected {
            return Err(Error::Status {
                status: 422,
                url: format!("/api/courses/{}", course_id),
            });
        }

        match *self.save_status.lock().unwrap() {
            Some(status) => Err(Error::Status {
                status,
                url: format!("/api/courses/{}", course_id),
            }),
            None => Ok(json!({ "id": course_id })),
        }
    }
}

pub struct Harness {
    pub api: Arc<FakeApi>,
    pub loading: LoadingIndicator,
    pub messages: Messages,
    pub store: CourseStore,
}

pub fn harness(api: FakeApi) -> Harness {
    harness_with(api, StoreOptions::default())
}

pub fn harness_with(api: FakeApi, options: StoreOptions) -> Harness {
    let api = Arc::new(api);
    let loading = LoadingIndicator::new();
    let messages = Messages::new();
    let store = CourseStore::new(api.clone(), loading.clone(), Arc::new(messages.clone()))
        .with_options(options);

    Harness {
        api,
        loading,
        messages,
        store,
    }
}

/// `[{a, x, 2}, {b, x, 1}]`
pub fn two_courses() -> Vec<Course> {
    vec![Course::new("a", "x", 2), Course::new("b", "x", 1)]
}

pub fn catalog() -> Vec<Course> {
    vec![
        Course::new("ng-1", "BEGINNER", 3).with("description", "Angular for beginners"),
        Course::new("ng-2", "ADVANCED", 2).with("description", "Angular security"),
        Course::new("rx-1", "BEGINNER", 1).with("description", "RxJs in practice"),
        Course::new("rx-2", "ADVANCED", 1).with("description", "Reactive patterns"),
        Course::new("ng-3", "BEGINNER", 1).with("description", "Angular core deep dive"),
    ]
}

pub fn ids(courses: &[Course]) -> Vec<&str> {
    courses.iter().map(|c| c.id.as_str()).collect()
}
