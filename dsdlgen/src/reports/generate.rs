//! Generate command report data structures.

use std::path::{Path, PathBuf};

use super::output::{Output, Report};

/// Report data from a generation run.
#[derive(Debug)]
pub struct GenerateReport {
    /// Target language name.
    pub language: String,
    /// Full name of the root namespace.
    pub root_namespace: String,
    pub output_dir: PathBuf,
    /// Generated (or, in a dry run, planned) files in generation order.
    pub files: Vec<PathBuf>,
    pub dry_run: bool,
}

impl GenerateReport {
    /// File paths relative to the output directory where possible.
    pub fn relative_files(&self) -> impl Iterator<Item = &Path> {
        self.files
            .iter()
            .map(|f| f.strip_prefix(&self.output_dir).unwrap_or(f))
    }
}

impl Report for GenerateReport {
    fn render(&self, out: &mut dyn Output) {
        out.key_value("Language", &self.language);
        out.key_value("Root namespace", &self.root_namespace);
        out.key_value("Output", &self.output_dir.display().to_string());
        out.newline();

        if self.files.is_empty() {
            out.section("Nothing to generate");
            return;
        }

        if self.dry_run {
            out.section(&format!("Would generate ({})", self.files.len()));
            for file in self.relative_files() {
                out.list_item(&file.display().to_string());
            }
        } else {
            out.section(&format!("Generated ({})", self.files.len()));
            for file in self.relative_files() {
                out.added_item(&file.display().to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::output::RecordingOutput;

    fn report(dry_run: bool) -> GenerateReport {
        GenerateReport {
            language: "c".to_string(),
            root_namespace: "demo".to_string(),
            output_dir: PathBuf::from("out"),
            files: vec![PathBuf::from("out").join("demo").join("Heartbeat_1_0.h")],
            dry_run,
        }
    }

    #[test]
    fn test_render_generated() {
        let mut out = RecordingOutput::default();
        report(false).render(&mut out);

        assert_eq!(out.lines[0], "Language: c");
        assert_eq!(out.lines[4], "Generated (1):");
        assert_eq!(
            out.lines[5],
            format!("  + {}", Path::new("demo").join("Heartbeat_1_0.h").display())
        );
    }

    #[test]
    fn test_render_dry_run() {
        let mut out = RecordingOutput::default();
        report(true).render(&mut out);

        assert_eq!(out.lines[4], "Would generate (1):");
        assert!(out.lines[5].starts_with("  - "));
    }
}
