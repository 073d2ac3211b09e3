use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn label(self) -> &'static str {
        match self {
            Priority::Low => "Low",
            Priority::Medium => "Medium",
            Priority::High => "High",
        }
    }

    /// Cycles low -> medium -> high, or backwards when `forward` is false.
    /// Stops at the ends.
    pub fn step(self, forward: bool) -> Self {
        match (self, forward) {
            (Priority::Low, true) => Priority::Medium,
            (Priority::Medium, true) | (Priority::High, true) => Priority::High,
            (Priority::High, false) => Priority::Medium,
            (Priority::Medium, false) | (Priority::Low, false) => Priority::Low,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Pending,
    Completed,
}

impl Status {
    pub fn toggled(self) -> Self {
        match self {
            Status::Pending => Status::Completed,
            Status::Completed => Status::Pending,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Pending => "Pending",
            Status::Completed => "Completed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: Priority,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Builds a new pending task stamped with `now`. The title is expected to
    /// be validated already.
    pub fn new(draft: TaskDraft, now: DateTime<Utc>) -> Self {
        let mut task = Self {
            id: TaskId::generate(),
            title: String::new(),
            description: String::new(),
            priority: Priority::default(),
            status: Status::Pending,
            due_date: None,
            tags: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        task.apply(draft, now);
        task.status = Status::Pending;
        task
    }

    /// Replaces every user-editable field and refreshes `updated_at`.
    pub fn apply(&mut self, draft: TaskDraft, now: DateTime<Utc>) {
        self.title = draft.title.trim().to_string();
        self.description = draft.description;
        self.priority = draft.priority;
        self.status = draft.status;
        self.due_date = draft.due_date;
        self.tags.clear();
        for tag in draft.tags {
            self.add_tag(&tag);
        }
        self.touch(now);
    }

    /// Returns false when the tag is blank or already present.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        push_unique_tag(&mut self.tags, tag)
    }

    pub fn toggle_status(&mut self, now: DateTime<Utc>) -> Status {
        self.status = self.status.toggled();
        self.touch(now);
        self.status
    }

    pub fn is_completed(&self) -> bool {
        self.status == Status::Completed
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        // Never let updated_at fall behind created_at, even with a skewed clock.
        self.updated_at = now.max(self.created_at);
    }
}

/// User-editable fields of a task, used for both create and edit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskDraft {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub status: Status,
    pub due_date: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
}

impl TaskDraft {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn has_title(&self) -> bool {
        !self.title.trim().is_empty()
    }
}

pub(crate) fn push_unique_tag(tags: &mut Vec<String>, tag: &str) -> bool {
    let tag = tag.trim();
    if tag.is_empty() || tags.iter().any(|t| t == tag) {
        return false;
    }
    tags.push(tag.to_string());
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn new_task_is_pending_with_equal_timestamps() {
        let mut draft = TaskDraft::titled("  Buy milk  ");
        draft.status = Status::Completed;
        let task = Task::new(draft, at(9));
        assert_eq!(task.title, "Buy milk");
        assert_eq!(task.status, Status::Pending);
        assert_eq!(task.created_at, task.updated_at);
    }

    #[test]
    fn duplicate_tags_are_rejected() {
        let mut task = Task::new(TaskDraft::titled("x"), at(9));
        assert!(task.add_tag("urgent"));
        assert!(!task.add_tag("urgent"));
        assert!(!task.add_tag("   "));
        assert!(task.add_tag("home"));
        assert_eq!(task.tags, vec!["urgent", "home"]);
    }

    #[test]
    fn apply_keeps_identity_and_creation_time() {
        let mut task = Task::new(TaskDraft::titled("old"), at(9));
        let id = task.id.clone();
        let mut draft = TaskDraft::titled("new");
        draft.tags = vec!["a".into(), "a".into(), "b".into()];
        task.apply(draft, at(10));
        assert_eq!(task.id, id);
        assert_eq!(task.created_at, at(9));
        assert_eq!(task.updated_at, at(10));
        assert_eq!(task.tags, vec!["a", "b"]);
    }

    #[test]
    fn updated_at_never_precedes_created_at() {
        let mut task = Task::new(TaskDraft::titled("x"), at(9));
        task.toggle_status(at(9) - Duration::hours(1));
        assert_eq!(task.updated_at, task.created_at);
    }

    #[test]
    fn serializes_with_camel_case_and_lowercase_enums() {
        let mut task = Task::new(TaskDraft::titled("x"), at(9));
        task.priority = Priority::High;
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["priority"], "high");
        assert_eq!(json["status"], "pending");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("dueDate").is_none());
    }

    #[test]
    fn reads_browser_written_records() {
        let raw = r#"{
            "id": "1717171717171",
            "title": "Paint house",
            "description": "",
            "priority": "low",
            "status": "completed",
            "dueDate": "2024-06-01T10:30:00.000Z",
            "tags": ["home"],
            "createdAt": "2024-05-30T08:00:00.000Z",
            "updatedAt": "2024-05-31T08:00:00.000Z"
        }"#;
        let task: Task = serde_json::from_str(raw).unwrap();
        assert_eq!(task.id.as_str(), "1717171717171");
        assert_eq!(task.status, Status::Completed);
        assert_eq!(
            task.due_date,
            Some(Utc.with_ymd_and_hms(2024, 6, 1, 10, 30, 0).unwrap())
        );
    }

    #[test]
    fn priority_step_stops_at_ends() {
        assert_eq!(Priority::High.step(true), Priority::High);
        assert_eq!(Priority::Low.step(false), Priority::Low);
        assert_eq!(Priority::Medium.step(true), Priority::High);
    }
}
