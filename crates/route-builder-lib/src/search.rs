//! Place-name search box

use crate::event_bus::{Event, EventBus};

/// Key reported by the text field on release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCode(pub u32);

impl KeyCode {
    pub const ENTER: Self = Self(13);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchEvent {
    /// User confirmed a place name
    Submit { text: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchEventKind {
    Submit,
}

impl SearchEventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Submit => "submit",
        }
    }
}

impl Event for SearchEvent {
    type Kind = SearchEventKind;

    fn kind(&self) -> SearchEventKind {
        match self {
            Self::Submit { .. } => SearchEventKind::Submit,
        }
    }
}

/// Text field that submits its value on Enter
#[derive(Debug, Default)]
pub struct SearchInput {
    value: String,
    bus: EventBus<SearchEvent>,
}

impl SearchInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&mut self, kind: SearchEventKind, callback: F)
    where
        F: FnMut(&SearchEvent) + 'static,
    {
        self.bus.subscribe(kind, callback);
    }

    pub fn on_submit<F>(&mut self, mut callback: F)
    where
        F: FnMut(&str) + 'static,
    {
        self.on(SearchEventKind::Submit, move |event| match event {
            SearchEvent::Submit { text } => callback(text),
        });
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    /// Text buffer for binding to an editable widget
    pub fn value_mut(&mut self) -> &mut String {
        &mut self.value
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// A key was released in the field.
    ///
    /// Enter with a non-blank value submits the trimmed text and clears the
    /// field. Anything else leaves the field alone.
    pub fn key_released(&mut self, key: KeyCode) {
        if key != KeyCode::ENTER {
            return;
        }
        let text = self.value.trim();
        if text.is_empty() {
            return;
        }

        let event = SearchEvent::Submit {
            text: text.to_owned(),
        };
        tracing::debug!(event = event.kind().as_str(), ?event, "Search submitted");
        self.bus.publish(&event);
        self.value.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recording_input() -> (SearchInput, Rc<RefCell<Vec<String>>>) {
        let submitted = Rc::new(RefCell::new(Vec::new()));
        let mut input = SearchInput::new();
        {
            let submitted = submitted.clone();
            input.on_submit(move |text| submitted.borrow_mut().push(text.to_owned()));
        }
        (input, submitted)
    }

    #[test]
    fn test_enter_submits_and_clears() {
        let (mut input, submitted) = recording_input();
        input.set_value("  Moscow ");

        input.key_released(KeyCode::ENTER);

        assert_eq!(*submitted.borrow(), vec!["Moscow"]);
        assert_eq!(input.value(), "");
    }

    #[test]
    fn test_other_keys_ignored() {
        let (mut input, submitted) = recording_input();
        input.set_value("Paris");

        input.key_released(KeyCode(65));

        assert!(submitted.borrow().is_empty());
        assert_eq!(input.value(), "Paris");
    }

    #[test]
    fn test_empty_value_not_submitted() {
        let (mut input, submitted) = recording_input();

        input.key_released(KeyCode::ENTER);
        input.set_value("   ");
        input.key_released(KeyCode::ENTER);

        assert!(submitted.borrow().is_empty());
        assert_eq!(input.value(), "   ");
    }
}
