use async_trait::async_trait;
use course_client::{Client, Course, CourseChanges, Result};
use serde_json::Value;

/// The backend the store loads from and saves to
#[async_trait]
pub trait CourseApi: Send + Sync {
    /// Fetch every course
    async fn load_courses(&self) -> Result<Vec<Course>>;

    /// Persist a partial update to one course
    async fn save_course(&self, course_id: &str, changes: &CourseChanges) -> Result<Value>;
}

#[async_trait]
impl CourseApi for Client {
    async fn load_courses(&self) -> Result<Vec<Course>> {
        self.courses().await
    }

    async fn save_course(&self, course_id: &str, changes: &CourseChanges) -> Result<Value> {
        Client::save_course(self, course_id, changes).await
    }
}
