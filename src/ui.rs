use crate::board::TaskBoard;
use crate::form::{FormField, TaskForm};
use crate::storage::KeyValueStore;
use crate::task::{Priority, Task, TaskId};
use crate::view::{self, DueState, TaskQuery, TaskStats};
use chrono::{DateTime, Local, Utc};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Browse,
    Search,
    Form(TaskForm),
}

/// UI state on top of a borrowed [`TaskBoard`].
pub struct App<'a, S: KeyValueStore> {
    pub board: &'a mut TaskBoard<S>,
    pub query: TaskQuery,
    pub selected: usize,
    pub mode: Mode,
}

impl<'a, S: KeyValueStore> App<'a, S> {
    pub fn new(board: &'a mut TaskBoard<S>) -> Self {
        Self {
            board,
            query: TaskQuery::default(),
            selected: 0,
            mode: Mode::Browse,
        }
    }

    /// Ids of the filtered tasks in display order: pending first, then
    /// completed.
    pub fn visible_ids(&self) -> Vec<TaskId> {
        let filtered = view::filter(self.board.tasks(), &self.query);
        view::group_by_status(filtered)
            .iter()
            .map(|t| t.id.clone())
            .collect()
    }

    pub fn selected_task(&self) -> Option<&Task> {
        let id = self.visible_ids().into_iter().nth(self.selected)?;
        self.board.get(&id)
    }

    /// Returns true when the app should quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('c') => return true,
                KeyCode::Char('s') if matches!(self.mode, Mode::Form(_)) => {}
                KeyCode::Char(_) => return false,
                _ => {}
            }
        }
        match self.mode {
            Mode::Browse => return self.handle_browse_key(key),
            Mode::Search => self.handle_search_key(key),
            Mode::Form(_) => self.handle_form_key(key),
        }
        self.clamp_selection();
        false
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('n') => self.mode = Mode::Form(TaskForm::new()),
            KeyCode::Char('e') | KeyCode::Enter => {
                if let Some(form) = self.selected_task().map(TaskForm::edit) {
                    self.mode = Mode::Form(form);
                }
            }
            KeyCode::Char(' ') => {
                if let Some(id) = self.selected_task().map(|t| t.id.clone()) {
                    if self.board.toggle_status(&id).is_ok() {
                        self.select(&id);
                    }
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(id) = self.selected_task().map(|t| t.id.clone()) {
                    let _ = self.board.delete(&id);
                }
            }
            KeyCode::Char('/') => self.mode = Mode::Search,
            KeyCode::Char('s') => self.query.status = self.query.status.next(),
            KeyCode::Char('1') => self.query.priority = self.query.priority.toggle(Priority::High),
            KeyCode::Char('2') => {
                self.query.priority = self.query.priority.toggle(Priority::Medium)
            }
            KeyCode::Char('3') => self.query.priority = self.query.priority.toggle(Priority::Low),
            KeyCode::Char('c') | KeyCode::Esc => self.query = TaskQuery::default(),
            KeyCode::Up | KeyCode::Char('k') => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => self.selected += 1,
            _ => {}
        }
        self.clamp_selection();
        false
    }

    fn handle_search_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => self.mode = Mode::Browse,
            KeyCode::Backspace => {
                self.query.text.pop();
            }
            KeyCode::Char(c) => self.query.text.push(c),
            _ => {}
        }
    }

    fn handle_form_key(&mut self, key: KeyEvent) {
        let Mode::Form(form) = &mut self.mode else {
            return;
        };
        let submit = match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Browse;
                return;
            }
            KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => true,
            KeyCode::Enter if form.focus == FormField::Tags && !form.tag_input.trim().is_empty() => {
                form.add_tag();
                false
            }
            KeyCode::Enter => true,
            KeyCode::Tab => {
                form.focus = form.focus.next();
                false
            }
            KeyCode::BackTab => {
                form.focus = form.focus.prev();
                false
            }
            KeyCode::Left | KeyCode::Right if form.focus == FormField::Priority => {
                form.priority = form.priority.step(key.code == KeyCode::Right);
                false
            }
            KeyCode::Backspace => {
                if form.focus == FormField::Tags && form.tag_input.is_empty() {
                    form.pop_tag();
                } else if let Some(text) = form.focused_text_mut() {
                    text.pop();
                }
                false
            }
            KeyCode::Char(c) => {
                if let Some(text) = form.focused_text_mut() {
                    text.push(c);
                }
                false
            }
            _ => false,
        };
        if !submit {
            return;
        }

        let draft = match form.submit() {
            Ok(draft) => draft,
            Err(err) => {
                form.error = Some(err);
                return;
            }
        };
        let editing = form.editing.clone();
        self.mode = Mode::Browse;
        match editing {
            Some(id) => {
                let _ = self.board.update(&id, draft);
                self.select(&id);
            }
            None => {
                if let Ok(id) = self.board.create(draft) {
                    self.select(&id);
                }
            }
        }
    }

    fn select(&mut self, id: &TaskId) {
        if let Some(index) = self.visible_ids().iter().position(|v| v == id) {
            self.selected = index;
        }
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_ids().len();
        self.selected = self.selected.min(len.saturating_sub(1));
    }
}

pub fn run_app<B: Backend, S: KeyValueStore>(
    terminal: &mut Terminal<B>,
    board: &mut TaskBoard<S>,
) -> io::Result<()> {
    let mut app = App::new(board);
    loop {
        let now = app.board.now();
        terminal.draw(|f| draw(f, &app, now))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

pub fn draw<S: KeyValueStore>(f: &mut Frame, app: &App<S>, now: DateTime<Utc>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(f.area());

    let header = Paragraph::new(Line::from(vec![
        Span::styled("TaskFlow", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("  n: new task"),
    ]))
    .block(Block::default().borders(Borders::ALL));
    f.render_widget(header, chunks[0]);

    draw_stats(f, chunks[1], &view::stats(app.board.tasks(), now));
    draw_filters(f, chunks[2], app);
    draw_tasks(f, chunks[3], app, now);

    let help = match app.mode {
        Mode::Browse => "q quit  n new  e edit  space toggle  d delete  / search  s status  1/2/3 priority  c clear",
        Mode::Search => "type to search  Enter/Esc done",
        Mode::Form(_) => "Tab next field  \u{2190}/\u{2192} priority  Enter save  Esc cancel",
    };
    f.render_widget(
        Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
        chunks[4],
    );

    if let Mode::Form(form) = &app.mode {
        let area = f.area();
        draw_form(f, area, form);
    }
}

fn draw_stats(f: &mut Frame, area: Rect, stats: &TaskStats) {
    let mut cards = vec![
        ("Total Tasks", stats.total.to_string(), None, Color::Blue),
        (
            "Completed",
            stats.completed.to_string(),
            (stats.total > 0).then(|| format!("{}% completion rate", stats.completion_rate)),
            Color::Green,
        ),
        ("Pending", stats.pending.to_string(), None, Color::Yellow),
        ("High Priority", stats.high_priority_pending.to_string(), None, Color::Red),
    ];
    if stats.overdue > 0 {
        let note = if stats.overdue == 1 {
            "task needs attention"
        } else {
            "tasks need attention"
        };
        cards.push(("Overdue", stats.overdue.to_string(), Some(note.to_string()), Color::Red));
    }

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, cards.len() as u32); cards.len()])
        .split(area);
    for (i, (title, value, note, color)) in cards.into_iter().enumerate() {
        let mut lines = vec![Line::from(Span::styled(
            value,
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))];
        if let Some(note) = note {
            lines.push(Line::from(Span::styled(note, Style::default().fg(Color::DarkGray))));
        }
        let card = Paragraph::new(lines).block(Block::default().title(title).borders(Borders::ALL));
        f.render_widget(card, chunks[i]);
    }
}

fn draw_filters<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>) {
    let searching = app.mode == Mode::Search;
    let search = if searching {
        format!("{}_", app.query.text)
    } else if app.query.text.is_empty() {
        "Search tasks...".to_string()
    } else {
        app.query.text.clone()
    };
    let line = Line::from(vec![
        Span::raw("Search: "),
        Span::styled(
            search,
            if searching {
                Style::default().fg(Color::Cyan)
            } else {
                Style::default()
            },
        ),
        Span::raw("   Status: "),
        Span::styled(app.query.status.label(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw("   Priority: "),
        Span::styled(app.query.priority.label(), Style::default().add_modifier(Modifier::BOLD)),
    ]);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(if searching {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        });
    f.render_widget(Paragraph::new(line).block(block), area);
}

fn draw_tasks<S: KeyValueStore>(f: &mut Frame, area: Rect, app: &App<S>, now: DateTime<Utc>) {
    let filtered = view::filter(app.board.tasks(), &app.query);
    let groups = view::group_by_status(filtered);
    let block = Block::default().borders(Borders::ALL);

    if groups.is_empty() {
        let (headline, hint) = if app.query.is_active() {
            ("No tasks match your filters", "Try adjusting your search or filters")
        } else {
            ("No tasks yet", "Press n to create your first task")
        };
        let empty = Paragraph::new(vec![
            Line::from(Span::styled(headline, Style::default().add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))),
        ])
        .alignment(Alignment::Center)
        .block(block);
        f.render_widget(empty, area);
        return;
    }

    let mut items = Vec::new();
    let mut selected_row = None;
    let mut position = 0;
    let sections = [
        ("Pending Tasks", &groups.pending, Color::Reset),
        ("Completed Tasks", &groups.completed, Color::DarkGray),
    ];
    for (heading, tasks, color) in sections {
        if tasks.is_empty() {
            continue;
        }
        items.push(ListItem::new(Line::from(Span::styled(
            format!("{heading} ({})", tasks.len()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))));
        for task in tasks.iter() {
            if position == app.selected {
                selected_row = Some(items.len());
            }
            items.push(ListItem::new(task_line(task, now)));
            position += 1;
        }
    }

    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(selected_row);
    f.render_stateful_widget(list, area, &mut state);
}

fn task_line(task: &Task, now: DateTime<Utc>) -> Line<'static> {
    let completed = task.is_completed();
    let title_style = if completed {
        Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT)
    } else {
        Style::default().fg(Color::White)
    };
    let mut spans = vec![
        Span::raw(if completed { "[x] " } else { "[ ] " }),
        Span::styled(task.title.clone(), title_style),
        Span::raw(" "),
        Span::styled(
            format!("[{} Priority]", task.priority.label()),
            Style::default().fg(priority_color(task.priority)),
        ),
    ];
    if let Some(due) = task.due_date {
        let state = view::due_state(task, now);
        let style = match state {
            DueState::Overdue => Style::default().fg(Color::Red),
            DueState::DueSoon => Style::default().fg(Color::Yellow),
            _ => Style::default().fg(Color::DarkGray),
        };
        let mut text = format!(" due {}", format_due(due));
        if state == DueState::Overdue {
            text.push_str(" !");
        }
        spans.push(Span::styled(text, style));
    }
    for tag in &task.tags {
        spans.push(Span::styled(format!(" #{tag}"), Style::default().fg(Color::Cyan)));
    }
    if !task.description.is_empty() {
        let description_style = if completed {
            title_style
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(format!("  {}", task.description), description_style));
    }
    Line::from(spans)
}

fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::High => Color::Red,
        Priority::Medium => Color::Yellow,
        Priority::Low => Color::Green,
    }
}

fn format_due(due: DateTime<Utc>) -> String {
    due.with_timezone(&Local).format("%b %-d, %H:%M").to_string()
}

fn draw_form(f: &mut Frame, area: Rect, form: &TaskForm) {
    let popup = centered_rect(60, 60, area);
    f.render_widget(Clear, popup);

    let field = |label: &str, value: String, which: FormField| {
        let focused = form.focus == which;
        Line::from(vec![
            Span::raw(if focused { "> " } else { "  " }),
            Span::styled(
                format!("{label}: "),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::styled(
                if focused && which != FormField::Priority {
                    format!("{value}_")
                } else {
                    value
                },
                if focused {
                    Style::default().fg(Color::Cyan)
                } else {
                    Style::default()
                },
            ),
        ])
    };

    let tags = form
        .tags
        .iter()
        .map(|t| format!("[{t}]"))
        .collect::<Vec<_>>()
        .join(" ");
    let mut lines = vec![
        field("Title", form.title.clone(), FormField::Title),
        field("Description", form.description.clone(), FormField::Description),
        field(
            "Priority",
            format!("< {} Priority >", form.priority.label()),
            FormField::Priority,
        ),
        field("Due (YYYY-MM-DD HH:MM)", form.due_date.clone(), FormField::DueDate),
        field("Tags", form.tag_input.clone(), FormField::Tags),
        Line::from(Span::styled(format!("  {tags}"), Style::default().fg(Color::Cyan))),
    ];
    if let Some(err) = &form.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            err.to_string(),
            Style::default().fg(Color::Red),
        )));
    }

    let dialog = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .title(form.heading())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Cyan)),
        );
    f.render_widget(dialog, popup);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}
