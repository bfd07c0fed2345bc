//! Line-oriented progress sinks.
//!
//! Training narrates its progress (hyperparameter dump, sample count,
//! periodic epoch/RMSE lines, stop reason, training time) as plain text
//! lines. A [`LogSink`] receives them in call order; it cannot influence
//! training. Structured diagnostics go through `tracing` independently.

/// Receiver of human-readable progress lines.
pub trait LogSink {
    /// Records one line of text.
    fn log(&mut self, line: &str);
}

impl<S: LogSink + ?Sized> LogSink for &mut S {
    fn log(&mut self, line: &str) {
        (**self).log(line);
    }
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    fn log(&mut self, line: &str) {
        (**self).log(line);
    }
}

/// Forwards every line to `tracing` at INFO level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn log(&mut self, line: &str) {
        tracing::info!(target: "latentmf::progress", "{}", line);
    }
}

/// Keeps every line in memory, optionally echoing it to stdout.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Vec<String>,
    echo: bool,
}

impl MemorySink {
    /// Creates a silent sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sink that also prints each line.
    pub fn echoing() -> Self {
        Self {
            lines: Vec::new(),
            echo: true,
        }
    }

    /// Lines recorded so far, oldest first.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether any recorded line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }

    /// Drops all recorded lines.
    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

impl LogSink for MemorySink {
    fn log(&mut self, line: &str) {
        if self.echo {
            println!("{line}");
        }
        self.lines.push(line.to_owned());
    }
}

/// Discards every line.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl LogSink for NullSink {
    fn log(&mut self, _line: &str) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn narrate(sink: &mut impl LogSink) {
        sink.log("first");
        sink.log("");
        sink.log("third");
    }

    #[test]
    fn test_memory_sink_keeps_order() {
        let mut sink = MemorySink::new();
        narrate(&mut sink);
        assert_eq!(sink.lines(), &["first", "", "third"]);
        assert!(sink.contains("thi"));

        sink.clear();
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn test_forwarding_through_references() {
        let mut sink = MemorySink::new();
        {
            let mut borrowed = &mut sink;
            narrate(&mut borrowed);
        }
        let mut boxed: Box<dyn LogSink> = Box::new(NullSink);
        narrate(&mut boxed);
        assert_eq!(sink.lines().len(), 3);
    }

    #[test]
    fn test_tracing_sink_accepts_lines() {
        let mut sink = TracingSink;
        narrate(&mut sink);
    }
}
