//! Text input state: buffer and cursor management for modal editing.

/// State for the single-line text input used by the editing modals.
#[derive(Debug, Default)]
pub struct InputState {
    /// Input buffer.
    pub buffer: String,

    /// Cursor position within `buffer` (byte offset, always on a char
    /// boundary).
    pub cursor: usize,
}

impl InputState {
    /// Create an empty input state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            buffer: String::new(),
            cursor: 0,
        }
    }

    /// Clear the buffer and reset the cursor.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }

    /// Set the buffer content and move the cursor to the end.
    pub fn set(&mut self, content: String) {
        self.cursor = content.len();
        self.buffer = content;
    }

    /// Insert a character at the cursor position.
    pub fn insert_char(&mut self, c: char) {
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Delete the character before the cursor (backspace).
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            let prev_char_boundary = self.buffer[..self.cursor]
                .char_indices()
                .next_back()
                .map_or(0, |(i, _)| i);
            self.buffer.remove(prev_char_boundary);
            self.cursor = prev_char_boundary;
        }
    }

    /// Delete the character at the cursor (delete key).
    pub fn delete(&mut self) {
        if self.cursor < self.buffer.len() {
            self.buffer.remove(self.cursor);
        }
    }

    /// Move the cursor left by one character.
    pub fn cursor_left(&mut self) {
        if self.cursor > 0 {
            self.cursor = self.buffer[..self.cursor]
                .char_indices()
                .next_back()
                .map_or(0, |(i, _)| i);
        }
    }

    /// Move the cursor right by one character.
    pub fn cursor_right(&mut self) {
        if self.cursor < self.buffer.len() {
            self.cursor += self.buffer[self.cursor..]
                .chars()
                .next()
                .map_or(0, char::len_utf8);
        }
    }

    /// Move the cursor to the start of the buffer.
    pub fn cursor_home(&mut self) {
        self.cursor = 0;
    }

    /// Move the cursor to the end of the buffer.
    pub fn cursor_end(&mut self) {
        self.cursor = self.buffer.len();
    }
}
