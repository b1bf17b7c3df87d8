/// Destination for the raw lines of the match in progress.
pub trait LineSink: Send + Sync {
    fn write_line(&mut self, line: &str);
    /// Everything written since the last clear, one line per `\n`.
    fn contents(&self) -> &str;
    fn clear(&mut self);
}

/// In-memory line buffer handed to the archiver at match end.
#[derive(Debug, Default)]
pub struct LineBuffer {
    buffer: String,
    lines: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line_count(&self) -> usize {
        self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines == 0
    }
}

impl LineSink for LineBuffer {
    fn write_line(&mut self, line: &str) {
        self.buffer.push_str(line);
        self.buffer.push('\n');
        self.lines += 1;
    }

    fn contents(&self) -> &str {
        &self.buffer
    }

    // Keeps the allocation for the next match.
    fn clear(&mut self) {
        self.buffer.clear();
        self.lines = 0;
    }
}
