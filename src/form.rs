//! Create/edit dialog state.

use crate::error::FormError;
use crate::task::{push_unique_tag, Priority, Status, Task, TaskDraft, TaskId};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

pub const DUE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";
const DATE_ONLY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Title,
    Description,
    Priority,
    DueDate,
    Tags,
}

impl FormField {
    const ORDER: [FormField; 5] = [
        FormField::Title,
        FormField::Description,
        FormField::Priority,
        FormField::DueDate,
        FormField::Tags,
    ];

    pub fn next(self) -> Self {
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(i + 1) % Self::ORDER.len()]
    }

    pub fn prev(self) -> Self {
        let i = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        Self::ORDER[(i + Self::ORDER.len() - 1) % Self::ORDER.len()]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskForm {
    pub editing: Option<TaskId>,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: String,
    pub tags: Vec<String>,
    pub tag_input: String,
    pub focus: FormField,
    pub error: Option<FormError>,
    status: Status,
    /// Due date of the edited task and the text it was rendered as. Submitting
    /// unchanged text keeps the stored value with full precision.
    original_due: Option<DateTime<Utc>>,
    original_due_text: String,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskForm {
    pub fn new() -> Self {
        Self {
            editing: None,
            title: String::new(),
            description: String::new(),
            priority: Priority::Medium,
            due_date: String::new(),
            tags: Vec::new(),
            tag_input: String::new(),
            focus: FormField::Title,
            error: None,
            status: Status::Pending,
            original_due: None,
            original_due_text: String::new(),
        }
    }

    pub fn edit(task: &Task) -> Self {
        let due_text = task
            .due_date
            .map(|d| d.with_timezone(&Local).format(DUE_DATE_FORMAT).to_string())
            .unwrap_or_default();
        Self {
            editing: Some(task.id.clone()),
            title: task.title.clone(),
            description: task.description.clone(),
            priority: task.priority,
            due_date: due_text.clone(),
            tags: task.tags.clone(),
            tag_input: String::new(),
            focus: FormField::Title,
            error: None,
            status: task.status,
            original_due: task.due_date,
            original_due_text: due_text,
        }
    }

    pub fn heading(&self) -> &'static str {
        if self.editing.is_some() {
            "Edit Task"
        } else {
            "Create New Task"
        }
    }

    /// Moves the trimmed tag input into the tag list. Blank and duplicate
    /// tags are ignored and leave the input in place.
    pub fn add_tag(&mut self) -> bool {
        let added = push_unique_tag(&mut self.tags, &self.tag_input);
        if added {
            self.tag_input.clear();
        }
        added
    }

    pub fn pop_tag(&mut self) -> Option<String> {
        self.tags.pop()
    }

    /// Text buffer of the focused field, if it is a text field.
    pub fn focused_text_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Title => Some(&mut self.title),
            FormField::Description => Some(&mut self.description),
            FormField::DueDate => Some(&mut self.due_date),
            FormField::Tags => Some(&mut self.tag_input),
            FormField::Priority => None,
        }
    }

    pub fn submit(&self) -> Result<TaskDraft, FormError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(FormError::EmptyTitle);
        }
        Ok(TaskDraft {
            title: title.to_string(),
            description: self.description.trim().to_string(),
            priority: self.priority,
            status: self.status,
            due_date: self.due_date()?,
            tags: self.tags.clone(),
        })
    }

    fn due_date(&self) -> Result<Option<DateTime<Utc>>, FormError> {
        if self.editing.is_some() && self.due_date.trim() == self.original_due_text {
            return Ok(self.original_due);
        }
        parse_due_date(&self.due_date)
    }
}

/// Parses local `YYYY-MM-DD HH:MM`, or `YYYY-MM-DD` meaning 23:59 that day.
/// Blank input means no due date.
pub fn parse_due_date(input: &str) -> Result<Option<DateTime<Utc>>, FormError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    let invalid = || FormError::InvalidDueDate(input.to_string());
    let naive = match NaiveDateTime::parse_from_str(input, DUE_DATE_FORMAT) {
        Ok(naive) => naive,
        Err(_) => NaiveDate::parse_from_str(input, DATE_ONLY_FORMAT)
            .ok()
            .and_then(|date| date.and_hms_opt(23, 59, 0))
            .ok_or_else(invalid)?,
    };
    let local = Local.from_local_datetime(&naive).earliest().ok_or_else(invalid)?;
    Ok(Some(local.with_timezone(&Utc)))
}
