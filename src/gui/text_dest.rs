//! Button handler channel between the form and the menu script
//!
//! The shell owns the [`TextDest`]. The form only borrows it while it handles
//! input, and the shell drains it afterwards to call into the script.

use std::collections::{BTreeMap, VecDeque};

#[derive(Debug, Clone, PartialEq)]
pub enum FormEvent {
    /// Field values when a button is pressed, keyed by field name
    Fields(BTreeMap<String, String>),
    /// Free-form event, e.g. `MenuQuit`
    Text(String),
}

#[derive(Debug, Default)]
pub struct TextDest {
    queue: VecDeque<FormEvent>,
}

impl TextDest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn got_fields(&mut self, fields: BTreeMap<String, String>) {
        self.queue.push_back(FormEvent::Fields(fields));
    }

    pub fn got_text(&mut self, text: &str) {
        self.queue.push_back(FormEvent::Text(text.to_string()));
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Removes and returns all pending events in arrival order
    pub fn drain(&mut self) -> Vec<FormEvent> {
        self.queue.drain(..).collect()
    }
}
