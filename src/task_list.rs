//! Operations on the in-memory task list.
//!
//! The list itself is owned by the caller and passed in by reference. Every
//! mutation is followed by a full save through the configured [`TaskStorage`];
//! when that save fails the mutation stays in memory and the I/O error is
//! returned.

use chrono::{Local, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::export;
use crate::storage::TaskStorage;
use crate::task::{parse_due_date, Task, TaskFilter};

#[derive(Debug)]
pub struct TaskService<S> {
    storage: S,
    data_file: PathBuf,
}

impl<S: TaskStorage> TaskService<S> {
    pub fn new(storage: S, data_file: impl Into<PathBuf>) -> Self {
        Self {
            storage,
            data_file: data_file.into(),
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn data_file(&self) -> &Path {
        &self.data_file
    }

    /// Loads the initial list; see [`TaskStorage::load`].
    pub fn load(&self) -> Vec<Task> {
        self.storage.load(&self.data_file)
    }

    fn save(&self, tasks: &[Task]) -> Result<()> {
        self.storage.save(&self.data_file, tasks)
    }

    pub fn add(
        &self,
        tasks: &mut Vec<Task>,
        title: &str,
        description: &str,
        due_date: &str,
    ) -> Result<Task> {
        let due_date = parse_due_date(due_date)?;
        let id = match tasks.iter().map(|t| t.id).max() {
            None => 1,
            Some(max) => max
                .checked_add(1)
                .ok_or_else(|| Error::InvalidInput("no more task ids available".into()))?,
        };
        let task = Task {
            id,
            title: title.to_string(),
            description: description.to_string(),
            due_date,
            completed: false,
        };
        tasks.push(task.clone());
        tracing::debug!(id, "added task");
        self.save(tasks)?;
        Ok(task)
    }

    /// Marks the task done. Completing an already completed task still saves.
    pub fn complete(&self, tasks: &mut [Task], id: u32) -> Result<()> {
        let task = tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(Error::NotFound(id))?;
        task.completed = true;
        tracing::debug!(id, "completed task");
        self.save(tasks)
    }

    /// Removes the task when `confirmed`; returns the removed task.
    pub fn delete(&self, tasks: &mut Vec<Task>, id: u32, confirmed: bool) -> Result<Task> {
        let index = tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(Error::NotFound(id))?;
        if !confirmed {
            return Err(Error::Cancelled);
        }
        let removed = tasks.remove(index);
        tracing::debug!(id, "deleted task");
        self.save(tasks)?;
        Ok(removed)
    }

    /// Writes a text report into `dir` and returns the file path.
    pub fn export(&self, tasks: &[Task], dir: &Path) -> Result<PathBuf> {
        self.export_at(tasks, dir, Local::now().naive_local())
    }

    pub fn export_at(&self, tasks: &[Task], dir: &Path, now: NaiveDateTime) -> Result<PathBuf> {
        if tasks.is_empty() {
            return Err(Error::InvalidInput("there are no tasks to export".into()));
        }
        fs::create_dir_all(dir)?;
        let path = dir.join(export::file_name(now));
        fs::write(&path, export::render_report(sorted_by_due_date(tasks), now))?;
        tracing::info!(path = %path.display(), count = tasks.len(), "exported tasks");
        Ok(path)
    }
}

pub fn find(tasks: &[Task], id: u32) -> Option<&Task> {
    tasks.iter().find(|t| t.id == id)
}

/// Parses a task id typed by the user.
pub fn parse_id(input: &str) -> Result<u32> {
    let input = input.trim();
    input
        .parse()
        .map_err(|_| Error::InvalidInput(format!("'{}' is not a task id", input)))
}

pub fn list(tasks: &[Task], filter: TaskFilter) -> Vec<&Task> {
    match filter {
        TaskFilter::All => tasks.iter().collect(),
        TaskFilter::IncompleteOnly => tasks.iter().filter(|t| !t.completed).collect(),
        TaskFilter::CompleteOnly => tasks.iter().filter(|t| t.completed).collect(),
        TaskFilter::SortedByDueDate => sorted_by_due_date(tasks),
    }
}

/// Ascending by due date; ties keep insertion order.
pub fn sorted_by_due_date(tasks: &[Task]) -> Vec<&Task> {
    let mut sorted: Vec<&Task> = tasks.iter().collect();
    sorted.sort_by_key(|t| t.due_date);
    sorted
}

/// A numeric query matches by id; anything else is a case-insensitive
/// substring match on title or description. Blank queries match nothing.
pub fn search<'a>(tasks: &'a [Task], query: &str) -> Vec<&'a Task> {
    let query = query.trim();
    if query.is_empty() {
        return Vec::new();
    }
    if let Ok(id) = query.parse::<i64>() {
        return tasks.iter().filter(|t| i64::from(t.id) == id).collect();
    }
    let needle = query.to_lowercase();
    tasks
        .iter()
        .filter(|t| {
            t.title.to_lowercase().contains(&needle)
                || t.description.to_lowercase().contains(&needle)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::cell::{Cell, RefCell};

    #[derive(Default)]
    struct RecordingStorage {
        saves: RefCell<Vec<Vec<Task>>>,
        fail: Cell<bool>,
    }

    impl TaskStorage for RecordingStorage {
        fn load(&self, _path: &Path) -> Vec<Task> {
            Vec::new()
        }

        fn save(&self, _path: &Path, tasks: &[Task]) -> Result<()> {
            if self.fail.get() {
                return Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only").into());
            }
            self.saves.borrow_mut().push(tasks.to_vec());
            Ok(())
        }
    }

    impl RecordingStorage {
        fn save_count(&self) -> usize {
            self.saves.borrow().len()
        }
    }

    fn service() -> TaskService<RecordingStorage> {
        TaskService::new(RecordingStorage::default(), "tasks.json")
    }

    fn ids(tasks: &[&Task]) -> Vec<u32> {
        tasks.iter().map(|t| t.id).collect()
    }

    fn task(id: u32, title: &str, due: &str, completed: bool) -> Task {
        Task {
            id,
            title: title.into(),
            description: String::new(),
            due_date: parse_due_date(due).unwrap(),
            completed,
        }
    }

    #[test]
    fn add_assigns_one_to_empty_list_and_saves() {
        let svc = service();
        let mut tasks = Vec::new();
        let created = svc.add(&mut tasks, "Buy milk", "", "2024-01-10").unwrap();

        assert_eq!(created.id, 1);
        assert!(!created.completed);
        assert_eq!(tasks, vec![created]);
        assert_eq!(svc.storage().save_count(), 1);
    }

    #[test]
    fn add_uses_max_id_plus_one_not_length() {
        let svc = service();
        let mut tasks = vec![task(7, "a", "2024-01-01", false), task(3, "b", "2024-01-01", false)];
        let created = svc.add(&mut tasks, "c", "", "2024-01-02").unwrap();
        assert_eq!(created.id, 8);
        assert_eq!(tasks.last().map(|t| t.id), Some(8));
    }

    #[test]
    fn add_with_bad_date_changes_nothing() {
        let svc = service();
        let mut tasks = vec![task(1, "a", "2024-01-01", false)];
        let before = tasks.clone();

        let err = svc.add(&mut tasks, "x", "y", "someday").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(tasks, before);
        assert_eq!(svc.storage().save_count(), 0);
    }

    #[test]
    fn ids_stay_unique_across_adds_and_deletes() {
        let svc = service();
        let mut tasks = Vec::new();
        for i in 0..5 {
            svc.add(&mut tasks, &format!("t{i}"), "", "2024-01-01").unwrap();
        }
        svc.delete(&mut tasks, 5, true).unwrap();
        svc.delete(&mut tasks, 2, true).unwrap();
        svc.add(&mut tasks, "again", "", "2024-01-01").unwrap();

        let mut seen: Vec<u32> = tasks.iter().map(|t| t.id).collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen.len(), tasks.len());
        assert_eq!(tasks.last().map(|t| t.id), Some(5));
    }

    #[test]
    fn list_filters_preserve_order() {
        let tasks = vec![
            task(1, "a", "2024-01-03", true),
            task(2, "b", "2024-01-01", false),
            task(3, "c", "2024-01-02", true),
        ];
        assert_eq!(ids(&list(&tasks, TaskFilter::All)), vec![1, 2, 3]);
        assert_eq!(ids(&list(&tasks, TaskFilter::IncompleteOnly)), vec![2]);
        assert_eq!(ids(&list(&tasks, TaskFilter::CompleteOnly)), vec![1, 3]);
        assert_eq!(ids(&list(&tasks, TaskFilter::SortedByDueDate)), vec![2, 3, 1]);
        assert!(list(&[], TaskFilter::All).is_empty());
    }

    #[test]
    fn sorting_by_due_date_is_stable() {
        let tasks = vec![
            task(1, "a", "2024-02-01", false),
            task(2, "b", "2024-01-01", false),
            task(3, "c", "2024-02-01", false),
            task(4, "d", "2024-01-01", false),
        ];
        assert_eq!(ids(&sorted_by_due_date(&tasks)), vec![2, 4, 1, 3]);
        assert_eq!(ids(&list(&tasks, TaskFilter::All)), vec![1, 2, 3, 4]);
    }

    #[test]
    fn complete_marks_task_and_is_idempotent() {
        let svc = service();
        let mut tasks = vec![task(1, "a", "2024-01-01", false)];

        svc.complete(&mut tasks, 1).unwrap();
        svc.complete(&mut tasks, 1).unwrap();
        assert_eq!(ids(&list(&tasks, TaskFilter::CompleteOnly)), vec![1]);
        assert_eq!(svc.storage().save_count(), 2);
    }

    #[test]
    fn complete_unknown_id_is_not_found_without_save() {
        let svc = service();
        let mut tasks = vec![task(1, "a", "2024-01-01", false)];
        let before = tasks.clone();

        assert!(matches!(svc.complete(&mut tasks, 9), Err(Error::NotFound(9))));
        assert_eq!(tasks, before);
        assert_eq!(svc.storage().save_count(), 0);
    }

    #[test]
    fn delete_requires_confirmation() {
        let svc = service();
        let mut tasks = vec![task(1, "a", "2024-01-01", false), task(2, "b", "2024-01-01", false)];

        assert!(matches!(svc.delete(&mut tasks, 2, false), Err(Error::Cancelled)));
        assert_eq!(tasks.len(), 2);
        assert_eq!(svc.storage().save_count(), 0);

        let removed = svc.delete(&mut tasks, 1, true).unwrap();
        assert_eq!(removed.id, 1);
        assert_eq!(tasks, vec![task(2, "b", "2024-01-01", false)]);
        assert_eq!(svc.storage().save_count(), 1);
    }

    #[test]
    fn delete_unknown_id_reports_not_found_before_cancel() {
        let svc = service();
        let mut tasks = vec![task(1, "a", "2024-01-01", false)];
        assert!(matches!(svc.delete(&mut tasks, 4, false), Err(Error::NotFound(4))));
        assert!(matches!(svc.delete(&mut tasks, 4, true), Err(Error::NotFound(4))));
        assert_eq!(tasks.len(), 1);
    }

    #[test]
    fn failed_save_keeps_mutation_in_memory() {
        let svc = service();
        svc.storage().fail.set(true);
        let mut tasks = Vec::new();

        let err = svc.add(&mut tasks, "a", "", "2024-01-01").unwrap_err();
        assert!(err.is_io_failure());
        assert_eq!(tasks.len(), 1);

        let err = svc.complete(&mut tasks, 1).unwrap_err();
        assert!(err.is_io_failure());
        assert!(tasks[0].completed);
    }

    #[test]
    fn add_refuses_when_ids_are_exhausted() {
        let svc = service();
        let mut tasks = vec![task(u32::MAX, "last", "2024-01-01", false)];
        let before = tasks.clone();

        let err = svc.add(&mut tasks, "one more", "", "2024-01-02").unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert_eq!(tasks, before);
        assert_eq!(svc.storage().save_count(), 0);
    }

    #[test]
    fn failed_save_keeps_deletion_in_memory() {
        let svc = service();
        let mut tasks = vec![task(1, "a", "2024-01-01", false), task(2, "b", "2024-01-02", false)];
        svc.storage().fail.set(true);

        let err = svc.delete(&mut tasks, 1, true).unwrap_err();
        assert!(err.is_io_failure());
        assert_eq!(tasks, vec![task(2, "b", "2024-01-02", false)]);
    }

    #[test]
    fn export_into_a_regular_file_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("Exports");
        fs::write(&blocker, "not a directory").unwrap();
        let svc = service();
        let tasks = vec![task(1, "Buy milk", "2024-01-10", false)];
        let before = tasks.clone();

        let err = svc.export(&tasks, &blocker).unwrap_err();
        assert!(err.is_io_failure());
        assert_eq!(tasks, before);
        assert_eq!(fs::read_to_string(&blocker).unwrap(), "not a directory");
        assert_eq!(svc.storage().save_count(), 0);
    }

    #[test]
    fn search_by_id_or_text() {
        let mut tasks = vec![
            task(1, "Write report", "2024-01-01", false),
            task(2, "Call bank", "2024-01-01", false),
            task(3, "Groceries", "2024-01-01", false),
        ];
        tasks[2].description = "and the REPORT card".into();

        assert_eq!(ids(&search(&tasks, "2")), vec![2]);
        assert_eq!(ids(&search(&tasks, " 3 ")), vec![3]);
        assert!(search(&tasks, "42").is_empty());
        assert_eq!(ids(&search(&tasks, "report")), vec![1, 3]);
        assert_eq!(ids(&search(&tasks, "BANK")), vec![2]);
        assert!(search(&tasks, "   ").is_empty());
    }

    #[test]
    fn parse_id_rejects_non_numbers() {
        assert_eq!(parse_id(" 12 ").unwrap(), 12);
        assert!(matches!(parse_id("abc"), Err(Error::InvalidInput(_))));
        assert!(matches!(parse_id("-1"), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn export_writes_sorted_report() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("Exports");
        let svc = service();
        let tasks = vec![task(1, "Buy milk", "2024-01-10", false), task(2, "Pay rent", "2024-01-05", true)];
        let now = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();

        let path = svc.export_at(&tasks, &out, now).unwrap();
        assert_eq!(path, out.join("ToDoList_Export_20240102_100000.txt"));

        let report = fs::read_to_string(&path).unwrap();
        let rent = report.find("Title: Pay rent").unwrap();
        let milk = report.find("Title: Buy milk").unwrap();
        assert!(rent < milk);
        assert_eq!(svc.storage().save_count(), 0);
    }

    #[test]
    fn export_of_empty_list_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("Exports");
        let err = service().export(&[], &out).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(!out.exists());
    }
}
