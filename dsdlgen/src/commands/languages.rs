use clap::Args;
use dsdlgen_codegen::LanguageRegistry;
use eyre::Result;

use super::UnwrapOrExit;
use crate::{
    ops,
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct LanguagesCommand {}

impl LanguagesCommand {
    pub fn run(&self) -> Result<()> {
        let registry = LanguageRegistry::with_builtins();
        let report = ops::languages(&registry).unwrap_or_exit();
        report.render(&mut TerminalOutput::new());
        Ok(())
    }
}
