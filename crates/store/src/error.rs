use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("could not load courses: {}", .0)]
    Load(#[source] course_client::Error),

    #[error("could not save course {id}: {source}")]
    Save {
        id: String,
        #[source]
        source: course_client::Error,
    },

    #[error("no course with id {}", .0)]
    NotFound(String),

    #[error("changes to course {id} are invalid: {source}")]
    InvalidChanges {
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("changes would alter the id of course {}", .0)]
    IdChanged(String),

    #[error("saving course {id} never finished: {source}")]
    Aborted {
        id: String,
        #[source]
        source: tokio::task::JoinError,
    },
}
