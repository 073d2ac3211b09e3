//! Derived views over the task collection.
//!
//! Everything here is a pure function of the tasks, the query and `now`.

use crate::task::{Priority, Status, Task};
use chrono::{DateTime, Duration, Utc};

pub fn is_overdue(task: &Task, now: DateTime<Utc>) -> bool {
    task.status == Status::Pending && task.due_date.is_some_and(|due| due < now)
}

pub fn is_due_soon(task: &Task, now: DateTime<Utc>) -> bool {
    task.status == Status::Pending
        && task
            .due_date
            .is_some_and(|due| now <= due && due - now < Duration::hours(24))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueState {
    None,
    Upcoming,
    DueSoon,
    Overdue,
}

pub fn due_state(task: &Task, now: DateTime<Utc>) -> DueState {
    if task.due_date.is_none() {
        DueState::None
    } else if is_overdue(task, now) {
        DueState::Overdue
    } else if is_due_soon(task, now) {
        DueState::DueSoon
    } else {
        DueState::Upcoming
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    pub fn matches(self, status: Status) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Only(wanted) => wanted == status,
        }
    }

    /// all -> pending -> completed -> all
    pub fn next(self) -> Self {
        match self {
            StatusFilter::All => StatusFilter::Only(Status::Pending),
            StatusFilter::Only(Status::Pending) => StatusFilter::Only(Status::Completed),
            StatusFilter::Only(Status::Completed) => StatusFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "All Tasks",
            StatusFilter::Only(status) => status.label(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PriorityFilter {
    #[default]
    All,
    Only(Priority),
}

impl PriorityFilter {
    pub fn matches(self, priority: Priority) -> bool {
        match self {
            PriorityFilter::All => true,
            PriorityFilter::Only(wanted) => wanted == priority,
        }
    }

    /// Selects `priority`, or goes back to `All` if it is already selected.
    pub fn toggle(self, priority: Priority) -> Self {
        if self == PriorityFilter::Only(priority) {
            PriorityFilter::All
        } else {
            PriorityFilter::Only(priority)
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PriorityFilter::All => "Any",
            PriorityFilter::Only(priority) => priority.label(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub text: String,
    pub status: StatusFilter,
    pub priority: PriorityFilter,
}

impl TaskQuery {
    pub fn is_active(&self) -> bool {
        !self.text.is_empty()
            || self.status != StatusFilter::All
            || self.priority != PriorityFilter::All
    }

    pub fn matches(&self, task: &Task) -> bool {
        let needle = self.text.to_lowercase();
        let text_ok = needle.is_empty()
            || task.title.to_lowercase().contains(&needle)
            || task.description.to_lowercase().contains(&needle);
        text_ok && self.status.matches(task.status) && self.priority.matches(task.priority)
    }
}

pub fn filter<'a>(tasks: &'a [Task], query: &TaskQuery) -> Vec<&'a Task> {
    tasks.iter().filter(|t| query.matches(t)).collect()
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: usize,
    pub completed: usize,
    pub pending: usize,
    pub high_priority_pending: usize,
    pub overdue: usize,
    /// Whole percent, 0 for an empty collection.
    pub completion_rate: u8,
}

pub fn stats(tasks: &[Task], now: DateTime<Utc>) -> TaskStats {
    let mut stats = TaskStats {
        total: tasks.len(),
        ..TaskStats::default()
    };
    for task in tasks {
        match task.status {
            Status::Completed => stats.completed += 1,
            Status::Pending => {
                stats.pending += 1;
                if task.priority == Priority::High {
                    stats.high_priority_pending += 1;
                }
            }
        }
        if is_overdue(task, now) {
            stats.overdue += 1;
        }
    }
    if stats.total > 0 {
        stats.completion_rate =
            (stats.completed as f64 / stats.total as f64 * 100.0).round() as u8;
    }
    stats
}

#[derive(Debug, Default)]
pub struct TaskGroups<'a> {
    pub pending: Vec<&'a Task>,
    pub completed: Vec<&'a Task>,
}

impl<'a> TaskGroups<'a> {
    pub fn len(&self) -> usize {
        self.pending.len() + self.completed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Pending tasks followed by completed ones, in display order.
    pub fn iter(&self) -> impl Iterator<Item = &'a Task> + '_ {
        self.pending.iter().chain(self.completed.iter()).copied()
    }
}

pub fn group_by_status<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> TaskGroups<'a> {
    let mut groups = TaskGroups::default();
    for task in tasks {
        match task.status {
            Status::Pending => groups.pending.push(task),
            Status::Completed => groups.completed.push(task),
        }
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::TaskDraft;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    fn task(title: &str, priority: Priority, status: Status) -> Task {
        let mut draft = TaskDraft::titled(title);
        draft.priority = priority;
        let mut task = Task::new(draft, now() - Duration::days(3));
        task.status = status;
        task
    }

    fn due(mut task: Task, offset: Duration) -> Task {
        task.due_date = Some(now() + offset);
        task
    }

    #[test]
    fn overdue_and_due_soon_are_exclusive() {
        let past = due(task("a", Priority::Low, Status::Pending), Duration::hours(-1));
        let soon = due(task("b", Priority::Low, Status::Pending), Duration::hours(23));
        let later = due(task("c", Priority::Low, Status::Pending), Duration::hours(25));
        let exact = due(task("d", Priority::Low, Status::Pending), Duration::zero());

        assert!(is_overdue(&past, now()) && !is_due_soon(&past, now()));
        assert!(is_due_soon(&soon, now()) && !is_overdue(&soon, now()));
        assert!(!is_due_soon(&later, now()) && !is_overdue(&later, now()));
        assert!(is_due_soon(&exact, now()));
        assert_eq!(due_state(&later, now()), DueState::Upcoming);
    }

    #[test]
    fn due_in_exactly_a_day_is_not_due_soon() {
        let boundary = due(task("a", Priority::Low, Status::Pending), Duration::hours(24));
        assert!(!is_due_soon(&boundary, now()));
        assert!(!is_overdue(&boundary, now()));
        assert_eq!(due_state(&boundary, now()), DueState::Upcoming);

        let just_inside = due(
            task("b", Priority::Low, Status::Pending),
            Duration::hours(24) - Duration::seconds(1),
        );
        assert!(is_due_soon(&just_inside, now()));
    }

    #[test]
    fn completed_tasks_are_never_overdue() {
        let done = due(task("a", Priority::Low, Status::Completed), Duration::days(-2));
        assert!(!is_overdue(&done, now()));
        assert_eq!(due_state(&done, now()), DueState::Upcoming);
        assert_eq!(due_state(&task("b", Priority::Low, Status::Pending), now()), DueState::None);
    }

    #[test]
    fn filter_by_text_and_priority() {
        let mut described = task("Chores", Priority::High, Status::Pending);
        described.description = "clean the HOUSE".into();
        let tasks = vec![
            task("Paint House", Priority::High, Status::Completed),
            task("House party", Priority::Low, Status::Pending),
            described,
            task("Groceries", Priority::High, Status::Pending),
        ];
        let query = TaskQuery {
            text: "house".into(),
            status: StatusFilter::All,
            priority: PriorityFilter::Only(Priority::High),
        };
        let titles: Vec<_> = filter(&tasks, &query).iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Paint House", "Chores"]);
    }

    #[test]
    fn empty_query_keeps_everything() {
        let tasks = vec![
            task("a", Priority::Low, Status::Pending),
            task("b", Priority::High, Status::Completed),
        ];
        assert_eq!(filter(&tasks, &TaskQuery::default()).len(), 2);
        assert!(!TaskQuery::default().is_active());
    }

    #[test]
    fn status_filter_cycles_and_priority_filter_toggles() {
        let mut status = StatusFilter::All;
        status = status.next();
        assert_eq!(status, StatusFilter::Only(Status::Pending));
        status = status.next().next();
        assert_eq!(status, StatusFilter::All);

        let priority = PriorityFilter::All.toggle(Priority::High);
        assert_eq!(priority, PriorityFilter::Only(Priority::High));
        assert_eq!(priority.toggle(Priority::Low), PriorityFilter::Only(Priority::Low));
        assert_eq!(priority.toggle(Priority::High), PriorityFilter::All);
    }

    #[test]
    fn stats_for_single_overdue_task() {
        let tasks = vec![due(task("A", Priority::Medium, Status::Pending), Duration::days(-1))];
        let stats = stats(&tasks, now());
        assert_eq!(stats.overdue, 1);
        assert_eq!(stats.completion_rate, 0);
        assert_eq!(stats.pending, 1);
    }

    #[test]
    fn stats_counts_and_rounds() {
        let tasks = vec![
            task("a", Priority::High, Status::Pending),
            task("b", Priority::High, Status::Completed),
            task("c", Priority::Low, Status::Completed),
        ];
        let stats = stats(&tasks, now());
        assert_eq!(
            stats,
            TaskStats {
                total: 3,
                completed: 2,
                pending: 1,
                high_priority_pending: 1,
                overdue: 0,
                completion_rate: 67,
            }
        );
        assert_eq!(super::stats(&[], now()).completion_rate, 0);
    }

    #[test]
    fn grouping_preserves_order() {
        let tasks = vec![
            task("a", Priority::Low, Status::Completed),
            task("b", Priority::Low, Status::Pending),
            task("c", Priority::Low, Status::Completed),
            task("d", Priority::Low, Status::Pending),
        ];
        let groups = group_by_status(&tasks);
        let order: Vec<_> = groups.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(order, vec!["b", "d", "a", "c"]);
        assert_eq!(groups.completed.len(), 2);
    }
}
