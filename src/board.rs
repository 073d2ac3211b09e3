use crate::error::BoardError;
use crate::storage::{KeyValueStore, TaskStorage};
use crate::task::{Status, Task, TaskDraft, TaskId};
use chrono::{DateTime, Utc};
use log::{debug, error, info};

type Clock = Box<dyn Fn() -> DateTime<Utc>>;

/// Owner of the task collection.
///
/// Every successful mutation is written through to storage. A failed write is
/// logged and the in-memory collection stays authoritative. Rejected
/// operations leave the collection exactly as it was.
pub struct TaskBoard<S: KeyValueStore> {
    tasks: Vec<Task>,
    storage: TaskStorage<S>,
    clock: Clock,
}

impl<S: KeyValueStore> TaskBoard<S> {
    /// Loads the collection from `store`. Missing or corrupt data yields an
    /// empty board.
    pub fn open(store: S) -> Self {
        Self::open_with_clock(store, Box::new(Utc::now))
    }

    pub fn open_with_clock(store: S, clock: Clock) -> Self {
        let storage = TaskStorage::new(store);
        let tasks = storage.load();
        info!("event=board_open status=ok count={}", tasks.len());
        Self {
            tasks,
            storage,
            clock,
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| &t.id == id)
    }

    pub fn now(&self) -> DateTime<Utc> {
        (self.clock)()
    }

    pub fn storage(&self) -> &TaskStorage<S> {
        &self.storage
    }

    /// Prepends a new pending task. Blank titles are rejected.
    pub fn create(&mut self, draft: TaskDraft) -> Result<TaskId, BoardError> {
        if !draft.has_title() {
            debug!("event=task_create status=rejected reason=empty_title");
            return Err(BoardError::EmptyTitle);
        }
        let mut task = Task::new(draft, self.now());
        while self.get(&task.id).is_some() {
            task.id = TaskId::generate();
        }
        let id = task.id.clone();
        self.tasks.insert(0, task);
        debug!("event=task_create status=ok id={id}");
        self.persist();
        Ok(id)
    }

    /// Replaces every field except `id` and `created_at`.
    pub fn update(&mut self, id: &TaskId, draft: TaskDraft) -> Result<(), BoardError> {
        if !draft.has_title() {
            debug!("event=task_update status=rejected reason=empty_title id={id}");
            return Err(BoardError::EmptyTitle);
        }
        let now = self.now();
        let task = self.find_mut(id)?;
        task.apply(draft, now);
        debug!("event=task_update status=ok id={id}");
        self.persist();
        Ok(())
    }

    pub fn toggle_status(&mut self, id: &TaskId) -> Result<Status, BoardError> {
        let now = self.now();
        let status = self.find_mut(id)?.toggle_status(now);
        debug!("event=task_toggle status=ok id={id} new_status={status:?}");
        self.persist();
        Ok(status)
    }

    pub fn delete(&mut self, id: &TaskId) -> Result<Task, BoardError> {
        let Some(index) = self.tasks.iter().position(|t| &t.id == id) else {
            debug!("event=task_delete status=noop id={id}");
            return Err(BoardError::NotFound(id.clone()));
        };
        let removed = self.tasks.remove(index);
        debug!("event=task_delete status=ok id={id}");
        self.persist();
        Ok(removed)
    }

    /// Final write of the collection, returning the underlying store.
    pub fn close(mut self) -> S {
        self.persist();
        info!("event=board_close status=ok count={}", self.tasks.len());
        self.storage.into_store()
    }

    fn find_mut(&mut self, id: &TaskId) -> Result<&mut Task, BoardError> {
        self.tasks
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| BoardError::NotFound(id.clone()))
    }

    fn persist(&mut self) {
        if let Err(err) = self.storage.save(&self.tasks) {
            error!("event=tasks_save status=error error={err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStore, MemoryStore};
    use chrono::{Duration, TimeZone};
    use std::cell::Cell;
    use std::rc::Rc;

    /// Board whose clock advances one second per reading.
    fn ticking_board() -> TaskBoard<MemoryStore> {
        let time = Rc::new(Cell::new(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()));
        let clock = Box::new(move || {
            let now = time.get();
            time.set(now + Duration::seconds(1));
            now
        });
        TaskBoard::open_with_clock(MemoryStore::new(), clock)
    }

    #[test]
    fn create_prepends_and_persists() {
        let mut board = ticking_board();
        let first = board.create(TaskDraft::titled("first")).unwrap();
        let second = board.create(TaskDraft::titled("second")).unwrap();
        assert_eq!(board.tasks()[0].id, second);
        assert_eq!(board.tasks()[1].id, first);
        assert_eq!(board.storage().load().len(), 2);
    }

    #[test]
    fn blank_title_is_rejected_without_change() {
        let mut board = ticking_board();
        board.create(TaskDraft::titled("keep")).unwrap();
        let before = board.tasks().to_vec();
        assert_eq!(board.create(TaskDraft::titled("   \t")), Err(BoardError::EmptyTitle));
        assert_eq!(board.tasks(), before.as_slice());
    }

    #[test]
    fn update_replaces_fields_but_keeps_identity() {
        let mut board = ticking_board();
        let id = board.create(TaskDraft::titled("draft")).unwrap();
        let created_at = board.get(&id).unwrap().created_at;

        let mut draft = TaskDraft::titled("final");
        draft.description = "details".into();
        board.update(&id, draft).unwrap();

        let task = board.get(&id).unwrap();
        assert_eq!(task.title, "final");
        assert_eq!(task.description, "details");
        assert_eq!(task.created_at, created_at);
        assert!(task.updated_at > created_at);
    }

    #[test]
    fn update_of_unknown_id_is_noop() {
        let mut board = ticking_board();
        board.create(TaskDraft::titled("a")).unwrap();
        let before = board.tasks().to_vec();
        let missing = TaskId::from("missing");
        assert_eq!(
            board.update(&missing, TaskDraft::titled("b")),
            Err(BoardError::NotFound(missing.clone()))
        );
        assert_eq!(board.tasks(), before.as_slice());
    }

    #[test]
    fn update_with_blank_title_is_rejected_without_change() {
        let mut board = ticking_board();
        let id = board.create(TaskDraft::titled("keep")).unwrap();
        let before = board.tasks().to_vec();
        assert_eq!(board.update(&id, TaskDraft::titled("  ")), Err(BoardError::EmptyTitle));
        assert_eq!(board.tasks(), before.as_slice());
    }

    #[test]
    fn failed_write_keeps_memory_authoritative() {
        let dir = tempfile::tempdir().unwrap();
        let not_a_dir = dir.path().join("tasks");
        std::fs::write(&not_a_dir, "occupied").unwrap();

        let mut board = TaskBoard::open(FileStore::new(&not_a_dir));
        let id = board.create(TaskDraft::titled("in memory")).unwrap();
        assert_eq!(board.toggle_status(&id), Ok(Status::Completed));

        assert_eq!(board.tasks().len(), 1);
        assert_eq!(board.get(&id).unwrap().title, "in memory");
        assert!(board.storage().load().is_empty());
    }

    #[test]
    fn toggle_twice_restores_status_and_advances_updated_at() {
        let mut board = ticking_board();
        let id = board.create(TaskDraft::titled("a")).unwrap();
        let t0 = board.get(&id).unwrap().updated_at;

        assert_eq!(board.toggle_status(&id), Ok(Status::Completed));
        let t1 = board.get(&id).unwrap().updated_at;
        assert_eq!(board.toggle_status(&id), Ok(Status::Pending));
        let t2 = board.get(&id).unwrap().updated_at;

        assert!(t0 < t1 && t1 < t2);
    }

    #[test]
    fn close_writes_final_state() {
        let mut board = ticking_board();
        board.create(TaskDraft::titled("a")).unwrap();
        let store = board.close();
        let reopened = TaskBoard::open(store);
        assert_eq!(reopened.tasks().len(), 1);
    }
}
