use crate::model::{is_reserved, Planner, Priority, Recurrence, Status, Task, TaskDraft};
use crate::rules::{classify_deadline, sort_for_display};
use crate::storage::Storage;
use crate::theme::ThemeTokens;
use anyhow::Result;
use chrono::{NaiveDate, Utc};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::{Alignment, Color, Modifier, Rect, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Terminal;
use std::io::{stdout, Stdout};
use std::time::{Duration, Instant};

pub fn run(planner: Planner, storage: Storage) -> Result<()> {
    let mut terminal = setup_terminal()?;
    let mut app = App::new(planner, storage);
    let result = app.event_loop(&mut terminal);
    teardown_terminal(&mut terminal)?;
    result
}

struct App {
    planner: Planner,
    storage: Storage,
    focus: Focus,
    selected_task: usize,
    sidebar_offset: usize,
    task_offset: usize,
    last_save: Instant,
    status: String,
    mode: Mode,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum Focus {
    Sidebar,
    Tasks,
}

enum Mode {
    Normal,
    NewTask(TaskForm),
    NewCategory(FieldValue),
    RenameCategory {
        category_id: String,
        field: FieldValue,
    },
    ConfirmDeleteTask {
        task_id: String,
    },
    ConfirmDeleteCategory {
        category_id: String,
    },
}

struct TaskForm {
    title: FieldValue,
    deadline: FieldValue,
    priority: Priority,
    recurring: Recurrence,
    field: FormField,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum FormField {
    Title,
    Deadline,
    Priority,
    Recurring,
}

impl TaskForm {
    fn new() -> Self {
        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        TaskForm {
            title: FieldValue::new(""),
            deadline: FieldValue::new(&today),
            priority: Priority::Medium,
            recurring: Recurrence::None,
            field: FormField::Title,
        }
    }

    fn next_field(&mut self) {
        self.field = match self.field {
            FormField::Title => FormField::Deadline,
            FormField::Deadline => FormField::Priority,
            FormField::Priority => FormField::Recurring,
            FormField::Recurring => FormField::Title,
        };
    }

    fn prev_field(&mut self) {
        self.field = match self.field {
            FormField::Title => FormField::Recurring,
            FormField::Deadline => FormField::Title,
            FormField::Priority => FormField::Deadline,
            FormField::Recurring => FormField::Priority,
        };
    }

    fn text_field_mut(&mut self) -> Option<&mut FieldValue> {
        match self.field {
            FormField::Title => Some(&mut self.title),
            FormField::Deadline => Some(&mut self.deadline),
            FormField::Priority | FormField::Recurring => None,
        }
    }

    fn cycle(&mut self, forward: bool) {
        match self.field {
            FormField::Priority => {
                self.priority = match (self.priority, forward) {
                    (Priority::High, true) => Priority::Medium,
                    (Priority::Medium, true) => Priority::Low,
                    (Priority::Low, true) => Priority::High,
                    (Priority::High, false) => Priority::Low,
                    (Priority::Medium, false) => Priority::High,
                    (Priority::Low, false) => Priority::Medium,
                };
            }
            FormField::Recurring => {
                self.recurring = match (self.recurring, forward) {
                    (Recurrence::None, true) => Recurrence::Daily,
                    (Recurrence::Daily, true) => Recurrence::Weekly,
                    (Recurrence::Weekly, true) => Recurrence::Monthly,
                    (Recurrence::Monthly, true) => Recurrence::None,
                    (Recurrence::None, false) => Recurrence::Monthly,
                    (Recurrence::Daily, false) => Recurrence::None,
                    (Recurrence::Weekly, false) => Recurrence::Daily,
                    (Recurrence::Monthly, false) => Recurrence::Weekly,
                };
            }
            _ => {}
        }
    }
}

#[derive(Clone)]
struct FieldValue {
    value: String,
    cursor: usize,
}

impl FieldValue {
    fn new(value: &str) -> Self {
        FieldValue {
            value: value.to_string(),
            cursor: value.len(),
        }
    }

    fn move_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor = prev_char_boundary(self.cursor, &self.value);
    }

    fn move_right(&mut self) {
        if self.cursor >= self.value.len() {
            return;
        }
        self.cursor = next_char_boundary(self.cursor, &self.value);
    }

    fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = prev_char_boundary(self.cursor, &self.value);
        self.value.drain(prev..self.cursor);
        self.cursor = prev;
    }

    fn insert_char(&mut self, ch: char) {
        self.value.insert(self.cursor, ch);
        self.cursor += ch.len_utf8();
    }

    fn with_caret(&self) -> String {
        let mut text = self.value.clone();
        text.insert_str(self.cursor, "▌");
        text
    }
}

impl App {
    fn new(planner: Planner, storage: Storage) -> Self {
        let status = format!("Loaded planner from {}", storage.dir().display());
        App {
            planner,
            storage,
            focus: Focus::Sidebar,
            selected_task: 0,
            sidebar_offset: 0,
            task_offset: 0,
            last_save: Instant::now(),
            status,
            mode: Mode::Normal,
        }
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            if event::poll(Duration::from_millis(200))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key)? {
                        break;
                    }
                }
            }
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<bool> {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::NewTask(_) => self.handle_task_form_key(key),
            Mode::NewCategory(_) | Mode::RenameCategory { .. } => self.handle_name_form_key(key),
            Mode::ConfirmDeleteTask { .. } | Mode::ConfirmDeleteCategory { .. } => {
                self.handle_confirm_key(key)
            }
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Result<bool> {
        match key.code {
            KeyCode::Char('q') => return Ok(true),
            KeyCode::Tab => {
                self.focus = match self.focus {
                    Focus::Sidebar => Focus::Tasks,
                    Focus::Tasks => Focus::Sidebar,
                };
            }
            KeyCode::Left | KeyCode::Char('h') => self.focus = Focus::Sidebar,
            KeyCode::Right | KeyCode::Char('l') => self.focus = Focus::Tasks,
            KeyCode::Up | KeyCode::Char('k') => self.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_selection(1),
            KeyCode::Enter if self.focus == Focus::Sidebar => self.focus = Focus::Tasks,
            KeyCode::Char('n') => {
                if self.planner.active_category.is_some() {
                    self.mode = Mode::NewTask(TaskForm::new());
                    self.status =
                        "New task: Tab moves fields, Left/Right cycle choices, Enter saves".into();
                } else {
                    self.status = "No category to add the task to".into();
                }
            }
            KeyCode::Char('c') => {
                self.mode = Mode::NewCategory(FieldValue::new(""));
                self.status = "New category: Enter saves, Esc cancels".into();
            }
            KeyCode::Char('r') => {
                if let Some((category_id, name)) = self.active_category_info() {
                    self.mode = Mode::RenameCategory {
                        category_id,
                        field: FieldValue::new(&name),
                    };
                    self.status = "Rename category: Enter saves, Esc cancels".into();
                } else {
                    self.status = "No category selected".into();
                }
            }
            KeyCode::Char(' ') | KeyCode::Char('t') => self.toggle_selected(),
            KeyCode::Enter if self.focus == Focus::Tasks => self.toggle_selected(),
            KeyCode::Char('d') => {
                if let Some(task) = self.selected_task() {
                    self.status = format!("Delete task \"{}\"? (y/n)", task.title);
                    self.mode = Mode::ConfirmDeleteTask { task_id: task.id };
                } else {
                    self.status = "No task selected to delete".into();
                }
            }
            KeyCode::Char('D') => {
                if let Some((id, name)) = self.active_category_info() {
                    if is_reserved(&id) {
                        self.status = format!("{} is built in and cannot be deleted", name);
                    } else {
                        self.status = format!("Delete category \"{}\" and its tasks? (y/n)", name);
                        self.mode = Mode::ConfirmDeleteCategory { category_id: id };
                    }
                } else {
                    self.status = "No category selected".into();
                }
            }
            KeyCode::Char('m') => {
                self.planner.dark_mode = !self.planner.dark_mode;
                let message = if self.planner.dark_mode {
                    "Dark mode on"
                } else {
                    "Dark mode off"
                };
                self.persist(message);
            }
            KeyCode::Char('b') => {
                self.planner.background_theme = self.planner.background_theme.next();
                let message = format!(
                    "Background theme: {}",
                    self.planner.background_theme.display_name()
                );
                self.persist(message);
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_task_form_key(&mut self, key: KeyEvent) -> Result<bool> {
        let mut close_form = false;
        let mut mode = std::mem::replace(&mut self.mode, Mode::Normal);
        if let Mode::NewTask(form) = &mut mode {
            match key.code {
                KeyCode::Esc => {
                    close_form = true;
                    self.status = "Canceled".into();
                }
                KeyCode::Tab | KeyCode::Down => form.next_field(),
                KeyCode::BackTab | KeyCode::Up => form.prev_field(),
                KeyCode::Left => match form.text_field_mut() {
                    Some(field) => field.move_left(),
                    None => form.cycle(false),
                },
                KeyCode::Right => match form.text_field_mut() {
                    Some(field) => field.move_right(),
                    None => form.cycle(true),
                },
                KeyCode::Backspace => {
                    if let Some(field) = form.text_field_mut() {
                        field.backspace();
                    }
                }
                KeyCode::Enter => close_form = self.submit_task_form(form),
                KeyCode::Char(c) => {
                    if !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                    {
                        if let Some(field) = form.text_field_mut() {
                            field.insert_char(c);
                        }
                    }
                }
                _ => {}
            }
        }
        self.mode = if close_form { Mode::Normal } else { mode };
        Ok(false)
    }

    fn submit_task_form(&mut self, form: &TaskForm) -> bool {
        let deadline_raw = form.deadline.value.trim();
        let deadline = if deadline_raw.is_empty() {
            None
        } else {
            match NaiveDate::parse_from_str(deadline_raw, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    self.status = format!("Invalid deadline (use YYYY-MM-DD): {}", deadline_raw);
                    return false;
                }
            }
        };
        let Some(category_id) = self.planner.active_category.clone() else {
            self.status = "No category to add the task to".into();
            return true;
        };
        let draft = TaskDraft {
            title: form.title.value.clone(),
            deadline,
            priority: form.priority,
            recurring: form.recurring,
            ..TaskDraft::default()
        };
        match self.planner.add_task(&category_id, draft) {
            Ok(id) => {
                self.persist(format!("Created task {}", id));
                true
            }
            Err(err) => {
                self.status = format!("Could not create: {}", err);
                false
            }
        }
    }

    fn handle_name_form_key(&mut self, key: KeyEvent) -> Result<bool> {
        let mut close_form = false;
        let mut mode = std::mem::replace(&mut self.mode, Mode::Normal);
        let (field, rename_target) = match &mut mode {
            Mode::NewCategory(field) => (Some(field), None),
            Mode::RenameCategory { category_id, field } => {
                (Some(field), Some(category_id.clone()))
            }
            _ => (None, None),
        };
        if let Some(field) = field {
            match key.code {
                KeyCode::Esc => {
                    close_form = true;
                    self.status = "Canceled".into();
                }
                KeyCode::Left => field.move_left(),
                KeyCode::Right => field.move_right(),
                KeyCode::Backspace => field.backspace(),
                KeyCode::Enter => {
                    let name = field.value.clone();
                    close_form = match rename_target {
                        Some(category_id) => self.submit_rename(&category_id, &name),
                        None => self.submit_new_category(&name),
                    };
                }
                KeyCode::Char(c) => {
                    if !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT)
                    {
                        field.insert_char(c);
                    }
                }
                _ => {}
            }
        }
        self.mode = if close_form { Mode::Normal } else { mode };
        Ok(false)
    }

    fn submit_new_category(&mut self, name: &str) -> bool {
        match self.planner.add_category(name) {
            Ok(id) => {
                self.planner.select_category(&id);
                self.selected_task = 0;
                self.persist(format!("Added category {}", name.trim()));
                true
            }
            Err(err) => {
                self.status = format!("Could not add: {}", err);
                false
            }
        }
    }

    fn submit_rename(&mut self, category_id: &str, name: &str) -> bool {
        match self.planner.rename_category(category_id, name) {
            Ok(()) => {
                self.persist(format!("Renamed to {}", name.trim()));
                true
            }
            Err(err) => {
                self.status = format!("Could not rename: {}", err);
                false
            }
        }
    }

    fn handle_confirm_key(&mut self, key: KeyEvent) -> Result<bool> {
        enum Target {
            Task(String),
            Category(String),
        }
        let target = match &self.mode {
            Mode::ConfirmDeleteTask { task_id } => Target::Task(task_id.clone()),
            Mode::ConfirmDeleteCategory { category_id } => Target::Category(category_id.clone()),
            _ => return Ok(false),
        };
        match key.code {
            KeyCode::Char('y') | KeyCode::Enter => {
                match target {
                    Target::Task(task_id) => {
                        let category = self.planner.active_category.clone().unwrap_or_default();
                        if self.planner.delete_task(&category, &task_id) {
                            self.persist(format!("Deleted task {}", task_id));
                        } else {
                            self.status = format!("Task {} was already gone", task_id);
                        }
                    }
                    Target::Category(category_id) => {
                        match self.planner.delete_category(&category_id) {
                            Ok(()) => {
                                self.selected_task = 0;
                                self.persist(format!("Deleted category {}", category_id));
                            }
                            Err(err) => self.status = format!("Delete failed: {}", err),
                        }
                    }
                }
                self.mode = Mode::Normal;
            }
            KeyCode::Char('n') | KeyCode::Esc => {
                self.status = "Delete canceled".into();
                self.mode = Mode::Normal;
            }
            _ => {}
        }
        Ok(false)
    }

    fn move_selection(&mut self, delta: isize) {
        match self.focus {
            Focus::Sidebar => {
                if self.planner.categories.is_empty() {
                    return;
                }
                let current = self.selected_category_index();
                let max = self.planner.categories.len() as isize - 1;
                let target = (current as isize + delta).clamp(0, max) as usize;
                let id = self.planner.categories[target].id.clone();
                self.planner.select_category(&id);
                self.selected_task = 0;
                self.task_offset = 0;
            }
            Focus::Tasks => {
                let len = self.planner.active_tasks().len();
                if len == 0 {
                    return;
                }
                let max = len as isize - 1;
                self.selected_task = (self.selected_task as isize + delta).clamp(0, max) as usize;
            }
        }
    }

    fn toggle_selected(&mut self) {
        let Some(task) = self.selected_task() else {
            self.status = "No task selected".into();
            return;
        };
        let category = self.planner.active_category.clone().unwrap_or_default();
        if self.planner.toggle_task(&category, &task.id) {
            let status = self
                .planner
                .category_tasks(&category)
                .iter()
                .find(|t| t.id == task.id)
                .map(|t| t.status.label())
                .unwrap_or("?");
            self.persist(format!("Marked \"{}\" {}", task.title, status.to_lowercase()));
        }
    }

    fn selected_category_index(&self) -> usize {
        self.planner
            .active_category
            .as_deref()
            .and_then(|id| self.planner.categories.iter().position(|c| c.id == id))
            .unwrap_or(0)
    }

    fn active_category_info(&self) -> Option<(String, String)> {
        let id = self.planner.active_category.clone()?;
        let category = self.planner.category(&id)?;
        Some((category.id.clone(), category.name.clone()))
    }

    /// Tasks of the active category in display order. Recomputed on every
    /// use so the stored insertion order is never touched.
    fn sorted_active(&self) -> Vec<Task> {
        sort_for_display(self.planner.active_tasks())
    }

    fn selected_task(&self) -> Option<Task> {
        self.sorted_active().get(self.selected_task).cloned()
    }

    fn persist(&mut self, message: impl Into<String>) {
        self.storage.save(&self.planner);
        self.last_save = Instant::now();
        self.status = message.into();
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.planner.active_tasks().len();
        self.selected_task = self.selected_task.min(len.saturating_sub(1));
    }

    fn tokens(&self) -> ThemeTokens {
        self.planner.background_theme.resolve()
    }

    fn panel_background(&self) -> Color {
        if self.planner.dark_mode {
            self.tokens().background
        } else {
            Color::Reset
        }
    }

    fn draw(&mut self, f: &mut ratatui::Frame<'_>) {
        let layout = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(4),
            ])
            .split(f.size());

        self.draw_header(f, layout[0]);

        let main = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(28), Constraint::Percentage(72)])
            .split(layout[1]);
        self.draw_sidebar(f, main[0]);
        self.draw_tasks(f, main[1]);
        self.draw_footer(f, layout[2]);

        match &self.mode {
            Mode::NewTask(form) => self.draw_task_form(f, form),
            Mode::NewCategory(field) => self.draw_name_form(f, "New Category", field),
            Mode::RenameCategory { field, .. } => self.draw_name_form(f, "Rename Category", field),
            Mode::ConfirmDeleteTask { task_id } => {
                let title = self
                    .sorted_active()
                    .iter()
                    .find(|t| &t.id == task_id)
                    .map(|t| t.title.clone())
                    .unwrap_or_else(|| task_id.clone());
                self.draw_confirm(f, &format!("Delete \"{}\"?", title), None);
            }
            Mode::ConfirmDeleteCategory { category_id } => {
                let name = self
                    .planner
                    .category(category_id)
                    .map(|c| c.name.clone())
                    .unwrap_or_else(|| category_id.clone());
                self.draw_confirm(
                    f,
                    &format!("Delete \"{}\"?", name),
                    Some("All tasks in this category will be deleted."),
                );
            }
            Mode::Normal => {}
        }
    }

    fn draw_header(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let tokens = self.tokens();
        let (category_name, total, pending) = match self.active_category_info() {
            Some((id, name)) => (
                name,
                self.planner.category_tasks(&id).len(),
                self.planner.pending_count(&id),
            ),
            None => ("Personal Planner".to_string(), 0, 0),
        };
        let title = Line::from(vec![
            Span::styled(
                "taskdeck ",
                Style::default()
                    .fg(tokens.icon)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(category_name, Style::default().add_modifier(Modifier::BOLD)),
            Span::raw("  |  "),
            Span::styled(
                format!("{} tasks, {} pending", total, pending),
                Style::default().fg(Color::Gray),
            ),
            Span::raw("  |  "),
            Span::styled(
                self.planner.background_theme.display_name(),
                Style::default().fg(tokens.button),
            ),
            Span::raw("  |  "),
            Span::styled(
                if self.planner.dark_mode { "dark" } else { "light" },
                Style::default().fg(Color::DarkGray),
            ),
            Span::raw("  |  "),
            Span::styled(
                format!("saved {}", format_elapsed(self.last_save)),
                Style::default().fg(Color::Gray),
            ),
        ]);

        let block = Block::default()
            .borders(Borders::BOTTOM)
            .border_style(Style::default().fg(Color::DarkGray));
        let paragraph = Paragraph::new(title)
            .alignment(Alignment::Center)
            .block(block);
        f.render_widget(paragraph, area);
    }

    fn draw_sidebar(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let tokens = self.tokens();
        let focused = self.focus == Focus::Sidebar;
        let selected = self.selected_category_index();

        let items: Vec<ListItem<'static>> = if self.planner.categories.is_empty() {
            vec![ListItem::new("No categories")]
        } else {
            self.planner
                .categories
                .iter()
                .map(|c| {
                    let mut spans = vec![
                        Span::styled(c.name.clone(), Style::default().fg(Color::White)),
                        Span::styled(
                            format!(" ({})", c.task_count),
                            Style::default().fg(Color::Gray),
                        ),
                    ];
                    if is_reserved(&c.id) {
                        spans.push(Span::styled(" •", Style::default().fg(tokens.icon)));
                    }
                    ListItem::new(Line::from(spans))
                })
                .collect()
        };

        let mut state = ListState::default();
        let viewport = area.height.saturating_sub(2) as usize;
        self.sidebar_offset = adjust_offset(
            selected,
            self.sidebar_offset,
            viewport,
            1,
            self.planner.categories.len(),
        );
        *state.offset_mut() = self.sidebar_offset;
        if !self.planner.categories.is_empty() {
            state.select(Some(selected));
        }

        let block = Block::default()
            .title(Span::styled(
                format!("Categories ({})", self.planner.categories.len()),
                Style::default()
                    .fg(if focused { tokens.icon } else { Color::Gray })
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if focused {
                tokens.icon
            } else {
                Color::DarkGray
            }))
            .style(Style::default().bg(self.panel_background()));
        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .bg(tokens.button)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        );
        f.render_stateful_widget(list, area, &mut state);
    }

    fn draw_tasks(&mut self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let tokens = self.tokens();
        let focused = self.focus == Focus::Tasks;
        let tasks = self.sorted_active();
        let today = Utc::now().date_naive();

        let items: Vec<ListItem<'static>> = if tasks.is_empty() {
            vec![ListItem::new(
                "No tasks yet. Press n to add your first task.",
            )]
        } else {
            tasks.iter().map(|t| task_item(t, today)).collect()
        };

        let mut state = ListState::default();
        let viewport = area.height.saturating_sub(2) as usize;
        let selected = self.selected_task.min(tasks.len().saturating_sub(1));
        self.task_offset = adjust_offset(selected, self.task_offset, viewport, 1, tasks.len());
        *state.offset_mut() = self.task_offset;
        if focused && !tasks.is_empty() {
            state.select(Some(selected));
        }

        let done = tasks.iter().filter(|t| t.status == Status::Done).count();
        let block = Block::default()
            .title(Span::styled(
                format!(
                    "Your Tasks ({} total, {} pending, {} done)",
                    tasks.len(),
                    tasks.len() - done,
                    done
                ),
                Style::default()
                    .fg(if focused { tokens.icon } else { Color::Gray })
                    .add_modifier(Modifier::BOLD),
            ))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(if focused {
                tokens.icon
            } else {
                Color::DarkGray
            }))
            .style(Style::default().bg(self.panel_background()));
        let list = List::new(items).block(block).highlight_style(
            Style::default()
                .bg(tokens.button)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        );
        f.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, f: &mut ratatui::Frame<'_>, area: Rect) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Length(2)])
            .split(area);

        let help = Line::from(vec![
            Span::styled("jk", Style::default().fg(Color::LightCyan)),
            Span::raw(" move  "),
            Span::styled("Tab", Style::default().fg(Color::LightCyan)),
            Span::raw(" focus  "),
            Span::styled("Space", Style::default().fg(Color::LightGreen)),
            Span::raw(" toggle  "),
            Span::styled("n", Style::default().fg(Color::LightMagenta)),
            Span::raw(" task  "),
            Span::styled("c", Style::default().fg(Color::LightMagenta)),
            Span::raw(" category  "),
            Span::styled("r", Style::default().fg(Color::LightYellow)),
            Span::raw(" rename  "),
            Span::styled("d/D", Style::default().fg(Color::LightRed)),
            Span::raw(" delete  "),
            Span::styled("m", Style::default().fg(Color::LightBlue)),
            Span::raw(" dark  "),
            Span::styled("b", Style::default().fg(Color::LightBlue)),
            Span::raw(" theme  "),
            Span::styled("q", Style::default().fg(Color::LightRed)),
            Span::raw(" quit"),
        ]);
        let help_bar = Paragraph::new(help).alignment(Alignment::Center).block(
            Block::default()
                .borders(Borders::TOP)
                .border_style(Style::default().fg(Color::DarkGray)),
        );
        f.render_widget(help_bar, rows[0]);

        let status = Paragraph::new(self.status.clone())
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::TOP)
                    .border_style(Style::default().fg(Color::DarkGray)),
            );
        f.render_widget(status, rows[1]);
    }

    fn draw_task_form(&self, f: &mut ratatui::Frame<'_>, form: &TaskForm) {
        let tokens = self.tokens();
        let area = centered_rect(60, 50, f.size());
        let mut lines = Vec::new();
        lines.push(field_line(
            "Title",
            &form.title,
            form.field == FormField::Title,
        ));
        lines.push(field_line(
            "Deadline (YYYY-MM-DD)",
            &form.deadline,
            form.field == FormField::Deadline,
        ));
        lines.push(choice_line(
            "Priority",
            form.priority.label(),
            form.field == FormField::Priority,
        ));
        lines.push(choice_line(
            "Recurring",
            form.recurring.label(),
            form.field == FormField::Recurring,
        ));
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            "Enter saves, Esc cancels, Tab moves, Left/Right cycle choices",
            Style::default().fg(Color::Gray),
        )));
        let dialog = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(Span::styled(
                        "New Task",
                        Style::default()
                            .fg(tokens.icon)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(tokens.icon)),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }

    fn draw_name_form(&self, f: &mut ratatui::Frame<'_>, title: &str, field: &FieldValue) {
        let tokens = self.tokens();
        let area = centered_rect(50, 25, f.size());
        let lines = vec![
            field_line("Name", field, true),
            Line::from(""),
            Line::from(Span::styled(
                "Enter saves, Esc cancels",
                Style::default().fg(Color::Gray),
            )),
        ];
        let dialog = Paragraph::new(lines)
            .block(
                Block::default()
                    .title(Span::styled(
                        title.to_string(),
                        Style::default()
                            .fg(tokens.icon)
                            .add_modifier(Modifier::BOLD),
                    ))
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(tokens.icon)),
            )
            .wrap(Wrap { trim: true });
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }

    fn draw_confirm(&self, f: &mut ratatui::Frame<'_>, question: &str, warning: Option<&str>) {
        let area = centered_rect(50, 30, f.size());
        let mut body = vec![Line::from(Span::styled(
            question.to_string(),
            Style::default()
                .fg(Color::LightRed)
                .add_modifier(Modifier::BOLD),
        ))];
        if let Some(warning) = warning {
            body.push(Line::from(""));
            body.push(Line::from(Span::styled(
                warning.to_string(),
                Style::default().fg(Color::Yellow),
            )));
        }
        body.push(Line::from(""));
        body.push(Line::from("Press y to confirm, n or Esc to cancel"));
        let dialog = Paragraph::new(body).alignment(Alignment::Center).block(
            Block::default()
                .title(Span::styled(
                    "Confirm Delete",
                    Style::default()
                        .fg(Color::LightRed)
                        .add_modifier(Modifier::BOLD),
                ))
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::LightRed)),
        );
        f.render_widget(Clear, area);
        f.render_widget(dialog, area);
    }
}

fn task_item(task: &Task, today: NaiveDate) -> ListItem<'static> {
    let deadline = classify_deadline(task.deadline, today);
    let mut spans = Vec::new();
    let (marker, marker_color) = match task.status {
        Status::Done => ("✔", Color::Green),
        Status::Pending => ("○", Color::Yellow),
    };
    spans.push(Span::styled(
        format!("{} ", marker),
        Style::default().fg(marker_color),
    ));
    let title_style = match task.status {
        Status::Done => Style::default()
            .fg(Color::Gray)
            .add_modifier(Modifier::CROSSED_OUT),
        Status::Pending => Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    };
    spans.push(Span::styled(task.title.clone(), title_style));
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        format!("[{}]", task.priority.label()),
        Style::default().fg(priority_color(task.priority)),
    ));
    spans.push(Span::raw("  "));
    spans.push(Span::styled(
        deadline.label(),
        Style::default().fg(deadline.color()),
    ));
    if task.recurring != Recurrence::None {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(
            format!("repeats {}", task.recurring.label().to_lowercase()),
            Style::default().fg(Color::LightMagenta),
        ));
    }
    ListItem::new(Line::from(spans))
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::LightRed,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

fn choice_line(label: &str, value: &str, active: bool) -> Line<'static> {
    let label_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::BOLD | Modifier::DIM);
    let value_style = Style::default().fg(if active { Color::Cyan } else { Color::White });
    let text = if active {
        format!("< {} >", value)
    } else {
        value.to_string()
    };
    Line::from(vec![
        Span::styled(format!("{}: ", label), label_style),
        Span::styled(text, value_style),
    ])
}

fn field_line(label: &str, field: &FieldValue, active: bool) -> Line<'static> {
    let label_style = Style::default()
        .fg(Color::Gray)
        .add_modifier(Modifier::BOLD | Modifier::DIM);
    let value_style = Style::default().fg(if active { Color::Cyan } else { Color::White });
    let text = if active {
        field.with_caret()
    } else {
        field.value.clone()
    };
    Line::from(vec![
        Span::styled(format!("{}: ", label), label_style),
        Span::styled(text, value_style),
    ])
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let terminal = Terminal::new(backend)?;
    Ok(terminal)
}

fn teardown_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(popup_layout[1])[1]
}

/// Keeps `selected` visible with a margin of `scrolloff` rows, sliding the
/// list offset only when the selection would leave the viewport.
fn adjust_offset(
    selected: usize,
    current_offset: usize,
    viewport: usize,
    scrolloff: usize,
    len: usize,
) -> usize {
    if viewport == 0 || len == 0 {
        return 0;
    }
    let max_offset = len.saturating_sub(viewport);
    let margin = scrolloff.min(viewport.saturating_sub(1));
    let mut offset = current_offset.min(max_offset);
    if selected < offset.saturating_add(margin) {
        offset = selected.saturating_sub(margin);
    } else {
        let upper = offset
            .saturating_add(viewport.saturating_sub(1))
            .saturating_sub(margin);
        if selected > upper {
            offset = selected.saturating_add(margin + 1).saturating_sub(viewport);
        }
    }
    offset.min(max_offset)
}

fn prev_char_boundary(cursor: usize, text: &str) -> usize {
    if cursor == 0 {
        return 0;
    }
    let mut prev = 0;
    for (idx, _) in text.char_indices() {
        if idx >= cursor {
            break;
        }
        prev = idx;
    }
    prev
}

fn next_char_boundary(cursor: usize, text: &str) -> usize {
    for (idx, ch) in text.char_indices() {
        if idx > cursor {
            return idx;
        }
        if idx == cursor {
            return cursor + ch.len_utf8();
        }
    }
    text.len()
}

fn format_elapsed(last: Instant) -> String {
    let secs = last.elapsed().as_secs();
    if secs < 60 {
        format!("{}s ago", secs)
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}
