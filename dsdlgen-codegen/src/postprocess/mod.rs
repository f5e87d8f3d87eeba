//! Post-processing of generated files.
//!
//! Line processors see every line of a file as it is written, file
//! processors see the finished file's path. Both run in the order they were
//! added.

mod builtin;
mod writer;

use std::{fmt, path::PathBuf};

pub use builtin::{ExternalProgram, LimitEmptyLines, SetFileMode, TrimTrailingWhitespace};
pub use writer::LineProcessingWriter;

use crate::{Error, Result};

/// Line terminators a line may carry.
const TERMINATORS: [&str; 3] = ["", "\n", "\r\n"];

/// One line of output and its terminator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub content: String,
    pub terminator: String,
}

impl Line {
    pub fn new(content: impl Into<String>, terminator: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            terminator: terminator.into(),
        }
    }

    /// The value a processor returns to drop a line.
    pub fn elided() -> Self {
        Self::default()
    }

    pub fn is_elided(&self) -> bool {
        self.content.is_empty() && self.terminator.is_empty()
    }

    /// Content without surrounding whitespace is empty.
    pub fn is_blank(&self) -> bool {
        self.content.trim().is_empty()
    }
}

/// Rewrites or drops lines as they are written.
pub trait LinePostProcessor: fmt::Debug + Send {
    fn name(&self) -> &str;

    /// Forget per-file state. Called before every file.
    fn reset(&mut self) {}

    /// Return the rewritten line, or [`Line::elided`] to drop it.
    fn process(&mut self, line: Line) -> Result<Line>;
}

/// Acts on a finished file.
pub trait FilePostProcessor: fmt::Debug + Send {
    fn name(&self) -> &str;

    /// Returns the file's path afterwards, which may differ if the
    /// processor moved it.
    fn process(&mut self, path: PathBuf) -> Result<PathBuf>;
}

/// Ordered line processors.
#[derive(Debug, Default)]
pub struct LineChain {
    processors: Vec<Box<dyn LinePostProcessor>>,
}

impl LineChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, processor: Box<dyn LinePostProcessor>) {
        self.processors.push(processor);
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    /// A processor with this name is in the chain.
    pub fn contains(&self, name: &str) -> bool {
        self.processors.iter().any(|p| p.name() == name)
    }

    pub fn reset(&mut self) {
        for processor in &mut self.processors {
            processor.reset();
        }
    }

    /// Run `line` through every processor; `None` if one of them drops it.
    pub fn apply(&mut self, line: Line) -> Result<Option<Line>> {
        let mut line = line;
        for processor in &mut self.processors {
            line = processor.process(line)?;
            check_contract(processor.name(), &line)?;
            if line.is_elided() {
                return Ok(None);
            }
        }
        Ok(Some(line))
    }
}

fn check_contract(processor: &str, line: &Line) -> Result<()> {
    if !TERMINATORS.contains(&line.terminator.as_str()) {
        return Err(Error::PostProcessorContract {
            processor: processor.to_string(),
            message: format!("{:?} is not a line terminator", line.terminator),
        });
    }
    if line.content.contains('\n') {
        return Err(Error::PostProcessorContract {
            processor: processor.to_string(),
            message: "line content must not contain a line break".to_string(),
        });
    }
    Ok(())
}

/// Reassembles lines from rendered chunks.
///
/// A chunk may hold no terminator, one or many, and a `\r\n` pair may be
/// split across chunks.
#[derive(Debug, Default)]
pub struct LineAccumulator {
    buffer: String,
}

impl LineAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a chunk, returning every line it completes.
    pub fn push(&mut self, chunk: &str) -> Vec<Line> {
        self.buffer.push_str(chunk);
        let mut lines = Vec::new();
        let mut consumed = 0;
        while let Some(offset) = self.buffer[consumed..].find('\n') {
            let end = consumed + offset;
            let raw = &self.buffer[consumed..end];
            let line = match raw.strip_suffix('\r') {
                Some(content) => Line::new(content, "\r\n"),
                None => Line::new(raw, "\n"),
            };
            lines.push(line);
            consumed = end + 1;
        }
        self.buffer.replace_range(..consumed, "");
        lines
    }

    /// The trailing partial line, if any, with an empty terminator.
    pub fn finish(self) -> Option<Line> {
        (!self.buffer.is_empty()).then(|| Line::new(self.buffer, ""))
    }
}
