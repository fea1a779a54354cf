//! The command line at the bottom of the console.
//!
//! Cursor positions are character indices, so editing is Unicode-safe.
#[derive(Debug, Default)]
pub struct InputLine {
    buffer: String,
    cursor: usize,
    history: Vec<String>,
    history_index: Option<usize>,
}

impl InputLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = self.byte_index(self.cursor);
        self.buffer.insert(byte_pos, c);
        self.cursor += 1;
        self.history_index = None;
    }

    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        let byte_pos = self.byte_index(self.cursor - 1);
        self.buffer.remove(byte_pos);
        self.cursor -= 1;
        self.history_index = None;
        true
    }

    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.buffer.chars().count() {
            return false;
        }
        let byte_pos = self.byte_index(self.cursor);
        self.buffer.remove(byte_pos);
        true
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        if self.cursor < self.buffer.chars().count() {
            self.cursor += 1;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.buffer.chars().count();
    }

    /// Takes the current line, remembering it in the history. Blank lines
    /// return `None`.
    pub fn submit(&mut self) -> Option<String> {
        let line = std::mem::take(&mut self.buffer);
        self.cursor = 0;
        self.history_index = None;
        if line.trim().is_empty() {
            return None;
        }
        self.history.push(line.clone());
        Some(line)
    }

    /// Steps through earlier (`up`) or later submissions.
    pub fn navigate_history(&mut self, up: bool) {
        if self.history.is_empty() {
            return;
        }

        let new_index = if up {
            match self.history_index {
                None => Some(self.history.len() - 1),
                Some(0) => Some(0),
                Some(i) => Some(i - 1),
            }
        } else {
            match self.history_index {
                None => None,
                Some(i) if i + 1 >= self.history.len() => None,
                Some(i) => Some(i + 1),
            }
        };

        self.history_index = new_index;
        match new_index {
            Some(index) => {
                self.buffer = self.history[index].clone();
                self.end();
            }
            None => {
                self.buffer.clear();
                self.home();
            }
        }
    }

    fn byte_index(&self, char_pos: usize) -> usize {
        self.buffer
            .char_indices()
            .nth(char_pos)
            .map(|(idx, _)| idx)
            .unwrap_or(self.buffer.len())
    }
}
