pub mod course;

pub use course::{sort_by_seq_no, Course, CourseChanges};
use log::debug;
use reqwest::{Response, Url};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub const DEFAULT_BASE: &str = "http://localhost:9000/";

/// A client for the course catalog API
#[derive(Debug, Clone)]
pub struct Client {
    base: String,
    http: reqwest::Client,
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("http error: {}", .0)]
    HTTPError(#[from] reqwest::Error),

    #[error("server responded {status} to {url}")]
    Status { status: u16, url: String },

    #[error("serde error: {}", .0)]
    SerdeError(#[from] serde_json::Error),

    #[error("bad base url {}: {}", .0, .1)]
    BadUrl(String, String),
}

/// The envelope the course list is wrapped in
#[derive(Deserialize)]
struct CoursesResp {
    payload: Vec<Course>,
}

impl Client {
    pub fn new(base: impl Into<String>) -> Self {
        Client {
            base: normalise_base(base.into()),
            http: reqwest::Client::new(),
        }
    }

    /// Create a client whose requests give up after `timeout`
    pub fn with_timeout(base: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Client {
            base: normalise_base(base.into()),
            http,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Fetch every course
    pub async fn courses(&self) -> Result<Vec<Course>> {
        self.get::<CoursesResp>(&["api", "courses"])
            .await
            .map(|r| r.payload)
    }

    /// Persist a partial update to a single course, returning whatever the server replied with.
    pub async fn save_course(&self, course_id: &str, changes: &CourseChanges) -> Result<Value> {
        self.put(&["api", "courses", course_id], changes).await
    }

    /// Build a url under the base from path segments. Each segment is percent-encoded, so ids
    /// containing `/`, `?` or `#` stay in one segment.
    pub(crate) fn url(&self, segments: &[&str]) -> Result<Url> {
        let bad_url = |e: String| Error::BadUrl(self.base.clone(), e);
        let mut url = Url::parse(&self.base).map_err(|e| bad_url(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| bad_url("cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
        let url = self.url(segments)?;
        debug!("GET {}", url);
        let resp = check_status(self.http.get(url.clone()).send().await?, url)?;
        if log::log_enabled!(log::Level::Debug) {
            let s = resp.text().await?;
            debug!("response: {}", s);
            Ok(serde_json::from_str(&s)?)
        } else {
            Ok(resp.json().await?)
        }
    }

    pub(crate) async fn put<B: Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<Value> {
        let url = self.url(segments)?;
        debug!("PUT {}", url);
        let resp = check_status(self.http.put(url.clone()).json(body).send().await?, url)?;

        // Any body is accepted, including none at all
        let s = resp.text().await?;
        debug!("response: {}", s);
        if s.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&s).unwrap_or(Value::String(s)))
    }
}

fn check_status(resp: Response, url: Url) -> Result<Response> {
    let status = resp.status();
    if !status.is_success() {
        return Err(Error::Status {
            status: status.as_u16(),
            url: url.to_string(),
        });
    }

    Ok(resp)
}

fn normalise_base(mut base: String) -> String {
    if !base.ends_with('/') {
        base.push('/');
    }
    base
}
