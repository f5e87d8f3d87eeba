//! Report data structures for commands.
//!
//! This module provides data structures that separate data collection from rendering.
//! Commands build reports, then render them to an Output target.

mod generate;
mod languages;
mod output;

pub use generate::GenerateReport;
pub use languages::{LanguageInfo, LanguagesReport};
pub use output::{Report, TerminalOutput};
