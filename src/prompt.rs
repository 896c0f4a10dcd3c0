//! The working prompt being composed, plus the canned templates.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptTemplate {
    pub name: &'static str,
    pub text: &'static str,
}

pub const TEMPLATES: &[PromptTemplate] = &[
    PromptTemplate {
        name: "Greeting",
        text: "Hello! How can I help you today?",
    },
    PromptTemplate {
        name: "Summarize Text",
        text: "Please summarize the following text:",
    },
];

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Text plus a cursor measured in characters.
#[derive(Debug, Clone, Default)]
pub struct PromptBuffer {
    text: String,
    cursor: usize,
}

impl PromptBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.text, self.cursor);
        self.text.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.text.chars().count() {
            let byte_pos = char_to_byte_index(&self.text, self.cursor);
            self.text.remove(byte_pos);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.text.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.text.chars().count();
    }

    /// Replaces the whole text, leaving the cursor at the end.
    pub fn replace(&mut self, text: &str) {
        self.text = text.to_string();
        self.move_end();
    }

    pub fn apply_template(&mut self, template: &PromptTemplate) {
        self.replace(template.text);
    }

    /// Hands out the text and leaves the buffer empty.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editing_is_utf8_safe() {
        let mut buffer = PromptBuffer::new();
        for c in "héllo".chars() {
            buffer.insert(c);
        }
        buffer.move_home();
        buffer.move_right();
        buffer.delete();
        assert_eq!(buffer.text(), "hllo");
        buffer.insert('é');
        buffer.move_end();
        buffer.backspace();
        assert_eq!(buffer.text(), "héll");
        assert_eq!(buffer.cursor(), 4);
    }

    #[test]
    fn test_template_replaces_instead_of_appending() {
        let mut buffer = PromptBuffer::new();
        buffer.replace("draft text");
        buffer.apply_template(&TEMPLATES[1]);
        assert_eq!(buffer.text(), "Please summarize the following text:");
        assert_eq!(buffer.cursor(), buffer.text().chars().count());
    }

    #[test]
    fn test_take_empties_buffer() {
        let mut buffer = PromptBuffer::new();
        buffer.replace("Hello");
        assert_eq!(buffer.take(), "Hello");
        assert!(buffer.is_empty());
        assert_eq!(buffer.cursor(), 0);
    }
}
