use crate::error::Error;
use crate::storage::TaskStorage;
use crate::task::{Task, TaskFilter};
use crate::task_list::{self, TaskService};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame, Terminal,
};
use std::io;
use std::path::PathBuf;

const MENU: [&str; 7] = [
    "1. Show tasks",
    "2. Add task",
    "3. Mark task as done",
    "4. Delete task",
    "5. Search tasks",
    "6. Export to text file",
    "7. Quit",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Info,
    Success,
    Warning,
    Error,
}

impl Tone {
    fn color(self) -> Color {
        match self {
            Tone::Info => Color::White,
            Tone::Success => Color::Green,
            Tone::Warning => Color::Yellow,
            Tone::Error => Color::Red,
        }
    }
}

pub struct App<S> {
    pub service: TaskService<S>,
    pub tasks: Vec<Task>,
    pub export_dir: PathBuf,
    pub view_title: String,
    pub view: Vec<Task>,
    pub status: (Tone, String),
    pub running: bool,
}

impl<S: TaskStorage> App<S> {
    pub fn new(service: TaskService<S>, export_dir: PathBuf) -> Self {
        let tasks = service.load();
        let view = tasks.clone();
        Self {
            service,
            tasks,
            export_dir,
            view_title: TaskFilter::All.label().to_string(),
            view,
            status: (Tone::Info, "Choose an option (1-7)".to_string()),
            running: true,
        }
    }

    fn set_status(&mut self, tone: Tone, message: impl Into<String>) {
        self.status = (tone, message.into());
    }

    fn report(&mut self, err: Error) {
        let tone = match err {
            Error::Cancelled => Tone::Warning,
            _ => Tone::Error,
        };
        self.set_status(tone, err.to_string());
    }

    fn show(&mut self, title: String, tasks: Vec<Task>) {
        self.view_title = title;
        self.view = tasks;
    }

    fn refresh(&mut self) {
        self.view_title = TaskFilter::All.label().to_string();
        self.view = self.tasks.clone();
    }

    /// Runs one menu choice. `ask` shows a prompt and returns the typed line,
    /// or `None` when input is closed.
    pub fn handle_choice<F>(&mut self, choice: char, mut ask: F)
    where
        F: FnMut(&str) -> Option<String>,
    {
        match choice {
            '1' => self.show_tasks(&mut ask),
            '2' => self.add_task(&mut ask),
            '3' => self.complete_task(&mut ask),
            '4' => self.delete_task(&mut ask),
            '5' => self.search_tasks(&mut ask),
            '6' => self.export_tasks(),
            '7' | 'q' => self.running = false,
            _ => self.set_status(Tone::Error, "Invalid choice! Enter a number between 1 and 7."),
        }
    }

    fn show_tasks(&mut self, ask: &mut impl FnMut(&str) -> Option<String>) {
        if self.tasks.is_empty() {
            self.show(TaskFilter::All.label().to_string(), Vec::new());
            self.set_status(Tone::Warning, "No tasks to show.");
            return;
        }
        let Some(option) = ask("1 All, 2 Not done, 3 Done, 4 Sorted by due date ([Enter] to go back)")
        else {
            return;
        };
        let filter = match option.trim() {
            "" => return,
            "1" => TaskFilter::All,
            "2" => TaskFilter::IncompleteOnly,
            "3" => TaskFilter::CompleteOnly,
            "4" => TaskFilter::SortedByDueDate,
            _ => {
                self.set_status(Tone::Error, "Invalid choice! Enter a number between 1 and 4.");
                return;
            }
        };
        let shown: Vec<Task> = task_list::list(&self.tasks, filter)
            .into_iter()
            .cloned()
            .collect();
        let count = shown.len();
        self.show(filter.label().to_string(), shown);
        self.set_status(Tone::Info, format!("{} task(s)", count));
    }

    fn add_task(&mut self, ask: &mut impl FnMut(&str) -> Option<String>) {
        let Some(title) = ask("Title") else { return };
        let Some(description) = ask("Description") else { return };
        let Some(due_date) = ask("Due date (YYYY-MM-DD)") else { return };

        match self.service.add(&mut self.tasks, &title, &description, &due_date) {
            Ok(task) => {
                self.refresh();
                self.set_status(Tone::Success, format!("Task {} saved!", task.id));
            }
            Err(Error::InvalidInput(msg)) => {
                self.set_status(Tone::Error, format!("{}. The task was not saved.", msg));
            }
            Err(err) => {
                self.refresh();
                self.report(err);
            }
        }
    }

    fn ask_id(&mut self, ask: &mut impl FnMut(&str) -> Option<String>, prompt: &str) -> Option<u32> {
        let input = ask(prompt)?;
        match task_list::parse_id(&input) {
            Ok(id) => Some(id),
            Err(err) => {
                self.report(err);
                None
            }
        }
    }

    fn complete_task(&mut self, ask: &mut impl FnMut(&str) -> Option<String>) {
        let Some(id) = self.ask_id(ask, "Task id to mark as done") else {
            return;
        };
        let result = self.service.complete(&mut self.tasks, id);
        self.refresh();
        match result {
            Ok(()) => self.set_status(Tone::Success, format!("Task {} marked as done!", id)),
            Err(err) => self.report(err),
        }
    }

    fn delete_task(&mut self, ask: &mut impl FnMut(&str) -> Option<String>) {
        let Some(id) = self.ask_id(ask, "Task id to delete") else {
            return;
        };
        let Some(title) = task_list::find(&self.tasks, id).map(|t| t.title.clone()) else {
            self.report(Error::NotFound(id));
            return;
        };
        let confirmed = ask(&format!("Delete \"{}\"? (y/n)", title))
            .map(|answer| answer.trim().eq_ignore_ascii_case("y"))
            .unwrap_or(false);

        let result = self.service.delete(&mut self.tasks, id, confirmed);
        self.refresh();
        match result {
            Ok(removed) => self.set_status(Tone::Success, format!("Deleted \"{}\".", removed.title)),
            Err(err) => self.report(err),
        }
    }

    fn search_tasks(&mut self, ask: &mut impl FnMut(&str) -> Option<String>) {
        if self.tasks.is_empty() {
            self.set_status(Tone::Warning, "There are no tasks to search.");
            return;
        }
        let Some(query) = ask("Search term or id ([Enter] to cancel)") else {
            return;
        };
        if query.trim().is_empty() {
            return;
        }
        let found: Vec<Task> = task_list::search(&self.tasks, &query)
            .into_iter()
            .cloned()
            .collect();
        if found.is_empty() {
            self.set_status(Tone::Error, "No tasks matched your search.");
        } else {
            self.set_status(Tone::Info, format!("{} match(es)", found.len()));
        }
        self.show(format!("Search: {}", query.trim()), found);
    }

    fn export_tasks(&mut self) {
        if self.tasks.is_empty() {
            self.set_status(Tone::Warning, "There are no tasks to export.");
            return;
        }
        match self.service.export(&self.tasks, &self.export_dir) {
            Ok(path) => self.set_status(Tone::Success, format!("Tasks exported to: {}", path.display())),
            Err(err) => self.report(err),
        }
    }
}

pub fn draw<S>(f: &mut Frame, app: &App<S>) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Min(3), Constraint::Length(3)])
        .split(f.area());
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(rows[0]);

    let menu: Vec<ListItem> = MENU.iter().map(|item| ListItem::new(*item)).collect();
    let menu = List::new(menu).block(
        Block::default()
            .title("TO-DO LIST")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan)),
    );
    f.render_widget(menu, columns[0]);

    let items: Vec<ListItem> = app
        .view
        .iter()
        .map(|t| {
            let style = if t.completed {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default().fg(Color::White)
            };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{}. ", t.id)),
                Span::styled(&t.title, style.add_modifier(Modifier::BOLD)),
                Span::raw(format!(" - {}", t.status_label())),
                Span::raw(format!(" (Due: {})", t.due_date.format("%Y-%m-%d"))),
            ]))
        })
        .collect();
    let tasks = List::new(items).block(
        Block::default()
            .title(app.view_title.as_str())
            .borders(Borders::ALL),
    );
    f.render_widget(tasks, columns[1]);

    let (tone, message) = &app.status;
    let status = Paragraph::new(Span::styled(message.as_str(), Style::default().fg(tone.color())))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(status, rows[1]);
}

pub fn run_app<B: Backend, S: TaskStorage>(
    terminal: &mut Terminal<B>,
    app: &mut App<S>,
) -> io::Result<()> {
    while app.running {
        terminal.draw(|f| draw(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if let KeyCode::Char(choice) = key.code {
                app.handle_choice(choice, prompt);
                terminal.clear()?;
            }
        }
    }
    Ok(())
}

fn prompt(message: &str) -> Option<String> {
    disable_raw_mode().ok();
    println!("\r\n{}: ", message);
    let mut input = String::new();
    let read = io::stdin().read_line(&mut input);
    enable_raw_mode().ok();
    match read {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(input.trim_end_matches(['\r', '\n']).to_string()),
    }
}
