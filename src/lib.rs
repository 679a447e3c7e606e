//! todolist - a personal to-do list kept in a local JSON file.

pub mod config;
pub mod error;
pub mod export;
pub mod storage;
pub mod task;
pub mod task_list;
pub mod ui;

pub use error::{Error, Result};
pub use storage::{JsonFileStorage, TaskStorage};
pub use task::{Task, TaskFilter};
pub use task_list::TaskService;
