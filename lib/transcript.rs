use std::fmt;

/// Append-only text log owned by whoever drives the engine.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Transcript {
    buffer: String,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    pub fn writeln(&mut self, text: &str) {
        self.buffer.push_str(text);
        self.buffer.push('\n');
    }

    pub fn clear(&mut self) {
        self.buffer.clear();
    }

    pub fn contents(&self) -> &str {
        &self.buffer
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl fmt::Display for Transcript {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.buffer)
    }
}
