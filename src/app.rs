use crate::form::FormController;
use crate::render::{self, TaskListView};
use crate::storage::KeyValueStore;
use crate::task::Status;
use crate::task_store::TaskStore;
use chrono::{Local, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Title,
    Description,
    Date,
    Status,
    List,
}

impl Focus {
    const ORDER: [Focus; 5] = [
        Focus::Title,
        Focus::Description,
        Focus::Date,
        Focus::Status,
        Focus::List,
    ];

    fn step(self, forward: bool) -> Self {
        let len = Self::ORDER.len();
        let pos = Self::ORDER.iter().position(|f| *f == self).unwrap_or(0);
        let next = if forward { pos + 1 } else { pos + len - 1 };
        Self::ORDER[next % len]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

pub struct App<S> {
    store: TaskStore<S>,
    pub form: FormController,
    pub focus: Focus,
    pub selected: usize,
    pub view: TaskListView,
    pub notice: Option<String>,
    date_edited: bool,
    today: fn() -> NaiveDate,
}

impl<S: KeyValueStore> App<S> {
    pub fn new(store: TaskStore<S>) -> Self {
        Self::with_clock(store, local_today)
    }

    /// `today` supplies the default date for the form.
    pub fn with_clock(store: TaskStore<S>, today: fn() -> NaiveDate) -> Self {
        let mut app = Self {
            store,
            form: FormController::new(today()),
            focus: Focus::Title,
            selected: 0,
            view: TaskListView::default(),
            notice: None,
            date_edited: false,
            today,
        };
        app.reload();
        app
    }

    pub fn store(&self) -> &TaskStore<S> {
        &self.store
    }

    /// Starts a new render pass from what is in storage.
    pub fn reload(&mut self) {
        self.view = render::render(&self.store.get_tasks());
        self.selected = self.selected.min(self.view.len().saturating_sub(1));
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Control {
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Control::Quit;
        }
        self.notice = None;

        match key.code {
            KeyCode::Tab => self.move_focus(true),
            KeyCode::BackTab => self.move_focus(false),
            _ if self.focus == Focus::List => return self.handle_list_key(key.code),
            KeyCode::Enter => self.submit(),
            _ if self.focus == Focus::Status => match key.code {
                KeyCode::Left => self.form.status = self.form.status.previous(),
                KeyCode::Right | KeyCode::Char(' ') => self.form.status = self.form.status.next(),
                _ => {}
            },
            KeyCode::Char(c) if !c.is_control() => self.edit_field(|value| value.push(c)),
            KeyCode::Backspace => self.edit_field(|value| {
                value.pop();
            }),
            _ => {}
        }
        Control::Continue
    }

    fn handle_list_key(&mut self, code: KeyCode) -> Control {
        match code {
            KeyCode::Char('q') => return Control::Quit,
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => {
                if self.selected + 1 < self.view.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Left => self.change_status(Status::previous),
            KeyCode::Right => self.change_status(Status::next),
            KeyCode::Char('d') | KeyCode::Delete => self.delete_selected(),
            _ => {}
        }
        Control::Continue
    }

    fn edit_field(&mut self, edit: impl FnOnce(&mut String)) {
        match self.focus {
            Focus::Title => {
                edit(&mut self.form.title);
                self.form.on_title_input();
            }
            Focus::Description => edit(&mut self.form.description),
            Focus::Date => {
                edit(&mut self.form.date);
                self.date_edited = true;
            }
            Focus::Status | Focus::List => {}
        }
    }

    /// Leaving a field fires its blur/change handling before focus moves.
    pub fn move_focus(&mut self, forward: bool) {
        match self.focus {
            Focus::Title => self.form.on_title_blur(),
            Focus::Date if self.date_edited => {
                self.date_edited = false;
                self.form.on_date_change();
            }
            _ => {}
        }
        self.focus = self.focus.step(forward);
    }

    pub fn submit(&mut self) {
        let Some(fields) = self.form.submission() else {
            return;
        };
        match self.store.add_task(fields) {
            Ok(_) => {
                self.form.reset((self.today)());
                self.date_edited = false;
                self.reload();
            }
            Err(err) => self.report(format!("Could not save task: {err}")),
        }
    }

    fn change_status(&mut self, pick: fn(Status) -> Status) {
        let Some(item) = self.view.items.get(self.selected) else {
            return;
        };
        let (index, status) = (item.index, pick(item.status));
        if let Err(err) = self.store.set_status(index, status) {
            self.report(format!("Could not update task: {err}"));
        }
        self.reload();
    }

    fn delete_selected(&mut self) {
        let Some(index) = self.view.items.get(self.selected).map(|item| item.index) else {
            return;
        };
        if let Err(err) = self.store.delete_task(index) {
            self.report(format!("Could not delete task: {err}"));
        }
        self.reload();
    }

    fn report(&mut self, message: String) {
        error!("{message}");
        self.notice = Some(message);
    }
}
