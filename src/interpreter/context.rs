/// Where `print` output goes.
pub trait SystemContext {
    fn writeln(&mut self, text: &str);
}

pub struct StdioContext;

impl SystemContext for StdioContext {
    fn writeln(&mut self, text: &str) {
        println!("{text}");
    }
}

/// Collects printed lines in memory.
#[derive(Debug, Default)]
pub struct BufferedContext {
    lines: Vec<String>,
}

impl BufferedContext {
    pub fn new() -> Self {
        Self { lines: Vec::new() }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// All printed lines, each terminated by a newline.
    pub fn into_data(self) -> String {
        let mut buffer = String::new();
        for line in self.lines {
            buffer.push_str(&line);
            buffer.push('\n');
        }
        buffer
    }
}

impl SystemContext for BufferedContext {
    fn writeln(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }
}
