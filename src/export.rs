//! Plain-text report written by the export action.

use chrono::NaiveDateTime;

use crate::task::Task;

const SEPARATOR: &str = "-----------------------------";

pub fn file_name(now: NaiveDateTime) -> String {
    format!("ToDoList_Export_{}.txt", now.format("%Y%m%d_%H%M%S"))
}

/// Renders `tasks` in the order given; callers sort beforehand.
pub fn render_report<'a>(tasks: impl IntoIterator<Item = &'a Task>, now: NaiveDateTime) -> String {
    let mut out = String::from("===== TO-DO LIST EXPORT =====\n");
    out.push_str(&format!("Exported: {}\n", now.format("%Y-%m-%d %H:%M")));
    out.push_str("=============================\n\n");

    for task in tasks {
        out.push_str(&format!("ID: {}\n", task.id));
        out.push_str(&format!("Title: {}\n", task.title));
        out.push_str(&format!("Description: {}\n", task.description));
        out.push_str(&format!("Due date: {}\n", task.due_date.format("%Y-%m-%d")));
        out.push_str(&format!("Status: {}\n", task.status_label()));
        out.push_str(SEPARATOR);
        out.push('\n');
    }
    out
}
