use crate::task::{NewTask, Status};
use chrono::NaiveDate;

pub const TITLE_REQUIRED: &str = "Task title is required";
pub const DATE_REQUIRED: &str = "Date is required";

const DATE_FORMAT: &str = "%Y-%m-%d";

/// The add-task form: field values plus the error shown under each
/// validated field.
#[derive(Debug, Clone)]
pub struct FormController {
    pub title: String,
    pub description: String,
    pub date: String,
    pub status: Status,
    title_error: Option<&'static str>,
    date_error: Option<&'static str>,
}

impl FormController {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            date: today.format(DATE_FORMAT).to_string(),
            status: Status::default(),
            title_error: None,
            date_error: None,
        }
    }

    pub fn title_error(&self) -> Option<&'static str> {
        self.title_error
    }

    pub fn date_error(&self) -> Option<&'static str> {
        self.date_error
    }

    /// Like a browser date input, the field only has a value once its text
    /// is a real calendar date.
    pub fn date_value(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT).ok()
    }

    fn title_present(&self) -> bool {
        !self.title.trim().is_empty()
    }

    pub fn clear_errors(&mut self) {
        self.title_error = None;
        self.date_error = None;
    }

    pub fn validate(&mut self) -> bool {
        self.clear_errors();
        if !self.title_present() {
            self.title_error = Some(TITLE_REQUIRED);
        }
        if self.date_value().is_none() {
            self.date_error = Some(DATE_REQUIRED);
        }
        self.title_error.is_none() && self.date_error.is_none()
    }

    /// Focus left the title field. A valid title clears both errors.
    pub fn on_title_blur(&mut self) {
        if self.title_present() {
            self.clear_errors();
        } else {
            self.title_error = Some(TITLE_REQUIRED);
        }
    }

    pub fn on_title_input(&mut self) {
        if self.title_present() {
            self.clear_errors();
        }
    }

    pub fn on_date_change(&mut self) {
        if self.date_value().is_some() {
            self.clear_errors();
        } else {
            self.date_error = Some(DATE_REQUIRED);
        }
    }

    /// Validates and, when both fields pass, returns the trimmed input.
    /// Field values are left as typed; call `reset` once the task is stored.
    pub fn submission(&mut self) -> Option<NewTask> {
        if !self.validate() {
            return None;
        }
        let date = self.date_value()?;
        Some(NewTask {
            title: self.title.trim().to_string(),
            description: self.description.trim().to_string(),
            date,
            status: self.status,
        })
    }

    pub fn reset(&mut self, today: NaiveDate) {
        *self = Self::new(today);
    }
}
