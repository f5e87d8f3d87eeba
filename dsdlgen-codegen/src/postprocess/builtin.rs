//! Post-processors shipped with dsdlgen.

use std::{
    path::PathBuf,
    process::Command,
};

use dsdlgen_core::set_file_mode;
use tracing::debug;

use super::{FilePostProcessor, Line, LinePostProcessor};
use crate::{Error, Result};

/// Strips trailing whitespace from every line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrimTrailingWhitespace;

impl TrimTrailingWhitespace {
    pub const NAME: &'static str = "trim-trailing-whitespace";
}

impl LinePostProcessor for TrimTrailingWhitespace {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn process(&mut self, line: Line) -> Result<Line> {
        let trimmed = line.content.trim_end();
        if trimmed.len() == line.content.len() {
            return Ok(line);
        }
        Ok(Line::new(trimmed, line.terminator))
    }
}

/// Allows at most `max` consecutive blank lines; `0` drops every blank line.
#[derive(Debug, Clone, Copy)]
pub struct LimitEmptyLines {
    max: usize,
    run: usize,
}

impl LimitEmptyLines {
    pub const NAME: &'static str = "limit-empty-lines";

    pub fn new(max: usize) -> Self {
        Self { max, run: 0 }
    }
}

impl LinePostProcessor for LimitEmptyLines {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn reset(&mut self) {
        self.run = 0;
    }

    fn process(&mut self, line: Line) -> Result<Line> {
        if !line.is_blank() {
            self.run = 0;
            return Ok(line);
        }
        self.run += 1;
        if self.run > self.max {
            Ok(Line::elided())
        } else {
            Ok(line)
        }
    }
}

/// Sets the permission bits of each generated file.
#[derive(Debug, Clone, Copy)]
pub struct SetFileMode {
    mode: u32,
}

impl SetFileMode {
    pub const NAME: &'static str = "set-file-mode";

    pub fn new(mode: u32) -> Self {
        Self { mode }
    }
}

impl FilePostProcessor for SetFileMode {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn process(&mut self, path: PathBuf) -> Result<PathBuf> {
        set_file_mode(&path, self.mode)?;
        Ok(path)
    }
}

/// Runs an external program with the generated file's path as its last
/// argument.
#[derive(Debug, Clone)]
pub struct ExternalProgram {
    program: String,
    args: Vec<String>,
    check: bool,
}

impl ExternalProgram {
    pub const NAME: &'static str = "run-program";

    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            check: true,
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Whether a non-zero exit status is an error (the default).
    pub fn with_check(mut self, check: bool) -> Self {
        self.check = check;
        self
    }
}

impl FilePostProcessor for ExternalProgram {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn process(&mut self, path: PathBuf) -> Result<PathBuf> {
        debug!(program = %self.program, args = ?self.args, path = %path.display(), "running post-processor");
        let status = Command::new(&self.program)
            .args(&self.args)
            .arg(&path)
            .status()
            .map_err(|e| Error::PostProcessorFailed {
                processor: self.program.clone(),
                path: path.clone(),
                message: e.to_string(),
            })?;
        if self.check && !status.success() {
            return Err(Error::PostProcessorFailed {
                processor: self.program.clone(),
                path,
                message: format!("exited with {status}"),
            });
        }
        Ok(path)
    }
}
