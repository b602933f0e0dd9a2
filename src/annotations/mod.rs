//! Comment thread state for a single movie detail view.
//!
//! Holds the comments shown under the movie and the text currently typed in
//! the input box. Entries are only ever appended, in submission order, and the
//! whole thing is dropped when the view closes.

/// Comments the detail view opens with before anyone has posted.
pub const SAMPLE_COMMENTS: [&str; 3] = [
    "Great movie!",
    "Amazing plot and cinematography.",
    "The acting was top notch.",
];

/// Whether the input box holds anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    Empty,
    Pending,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationStore {
    entries: Vec<String>,
    buffer: String,
}

impl AnnotationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `entries` already in the list, in the given order.
    pub fn seeded<I, E>(entries: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
            buffer: String::new(),
        }
    }

    pub fn with_sample_comments() -> Self {
        Self::seeded(SAMPLE_COMMENTS)
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn buffer_state(&self) -> BufferState {
        if self.buffer.is_empty() {
            BufferState::Empty
        } else {
            BufferState::Pending
        }
    }

    /// Replace the input buffer. Never touches the list.
    pub fn edit(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    /// Append the trimmed buffer and clear it.
    ///
    /// Blank input (empty or whitespace-only) is a no-op: the list does not
    /// grow and the buffer keeps its content. Returns the appended entry.
    pub fn submit(&mut self) -> Option<&str> {
        let trimmed = self.buffer.trim();
        if trimmed.is_empty() {
            return None;
        }

        let entry = trimmed.to_string();
        self.buffer.clear();
        self.entries.push(entry);
        self.entries.last().map(String::as_str)
    }
}
