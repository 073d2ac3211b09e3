pub mod board;
pub mod config;
pub mod error;
pub mod form;
pub mod logging;
pub mod storage;
pub mod task;
pub mod ui;
pub mod view;

pub use board::TaskBoard;
pub use error::{BoardError, FormError, StorageError};
pub use storage::{FileStore, KeyValueStore, MemoryStore, TaskStorage, TASKS_KEY};
pub use task::{Priority, Status, Task, TaskDraft, TaskId};
pub use view::{PriorityFilter, StatusFilter, TaskQuery, TaskStats};
