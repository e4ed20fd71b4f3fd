use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Unique identifier of the course.
    pub id: String,
    /// Label the catalog is grouped by.
    pub category: String,
    /// Display order of the course within its category.
    pub seq_no: i64,

    /// Everything else the server sent, kept as-is.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Course {
    pub fn new(id: impl Into<String>, category: impl Into<String>, seq_no: i64) -> Self {
        Course {
            id: id.into(),
            category: category.into(),
            seq_no,
            extra: Map::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn description(&self) -> Option<&str> {
        self.extra.get("description").and_then(Value::as_str)
    }

    /// A copy of this course with every key in `changes` overwritten.
    /// Keys not present in `changes` are left untouched.
    pub fn merged(&self, changes: &CourseChanges) -> Result<Course, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(fields) = &mut value {
            for (k, v) in changes.iter() {
                fields.insert(k.clone(), v.clone());
            }
        }

        serde_json::from_value(value)
    }

    /// Undo `changes`, putting each changed key back to its value in `prior`.
    /// Keys whose value no longer matches `changes` have been changed again since, so are kept.
    pub fn undo(
        &self,
        prior: &Course,
        changes: &CourseChanges,
    ) -> Result<Course, serde_json::Error> {
        let mut value = serde_json::to_value(self)?;
        let prior = serde_json::to_value(prior)?;
        if let (Value::Object(fields), Value::Object(prior)) = (&mut value, &prior) {
            for (k, v) in changes.iter() {
                if fields.get(k) != Some(v) {
                    continue;
                }

                match prior.get(k) {
                    Some(p) => fields.insert(k.clone(), p.clone()),
                    None => fields.remove(k),
                };
            }
        }

        serde_json::from_value(value)
    }
}

/// Sort courses by ascending `seq_no`, keeping the existing order of equal ones.
pub fn sort_by_seq_no(courses: &mut [Course]) {
    courses.sort_by_key(|c| c.seq_no);
}

/// A partial update to a course, sent to the server as-is.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseChanges(Map<String, Value>);

impl CourseChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn category(self, category: impl Into<String>) -> Self {
        self.set("category", category.into())
    }

    pub fn seq_no(self, seq_no: i64) -> Self {
        self.set("seqNo", seq_no)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Map<String, Value>> for CourseChanges {
    fn from(value: Map<String, Value>) -> Self {
        CourseChanges(value)
    }
}
