use std::path::PathBuf;

use clap::Args;
use dsdlgen_codegen::{GenerateOptions, LanguageRegistry};
use eyre::Result;

use super::UnwrapOrExit;
use crate::{
    ops::{self, GenerateRequest},
    reports::{Report, TerminalOutput},
};

#[derive(Args)]
pub struct GenerateCommand {
    /// JSON type list produced by the schema front-end
    pub types: PathBuf,

    /// Folder of the root namespace to generate
    pub root_namespace: PathBuf,

    /// Output directory
    #[arg(short = 'O', long, default_value = "dsdlgen_out")]
    pub outdir: PathBuf,

    /// Target language (c, cpp, py, js)
    #[arg(short, long, default_value = "c")]
    pub language: String,

    /// Rule table overlays merged over the language's table, in order
    #[arg(long = "language-config", value_name = "TOML")]
    pub language_config: Vec<PathBuf>,

    /// Template override directories, highest priority first
    #[arg(long, value_name = "DIR")]
    pub templates: Vec<PathBuf>,

    /// Extension of generated files (defaults to the language's)
    #[arg(short = 'e', long)]
    pub output_extension: Option<String>,

    /// File stem of namespace files (defaults to the language's)
    #[arg(long, value_name = "STEM")]
    pub namespace_output_stem: Option<String>,

    /// Compute outputs without writing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Print the files that would be generated, separated by ';', and exit
    #[arg(long, conflicts_with = "list_inputs")]
    pub list_outputs: bool,

    /// Print the files generation reads, separated by ';', and exit
    #[arg(long)]
    pub list_inputs: bool,

    /// Fail instead of replacing existing files
    #[arg(long)]
    pub no_overwrite: bool,

    /// Permission bits of generated files, in octal (e.g. 444)
    #[arg(long, value_parser = parse_mode)]
    pub file_mode: Option<u32>,

    /// Generate a file per namespace
    #[arg(long, conflicts_with = "no_namespace_types")]
    pub namespace_types: bool,

    /// Never generate namespace files
    #[arg(long)]
    pub no_namespace_types: bool,

    /// Skip the language's serialization support files
    #[arg(long)]
    pub omit_serialization_support: bool,

    /// Keep at most this many consecutive empty lines
    #[arg(long = "pp-max-emptylines", value_name = "N")]
    pub pp_max_empty_lines: Option<usize>,

    /// Strip trailing whitespace from generated lines
    #[arg(long)]
    pub pp_trim_trailing_whitespace: bool,

    /// Program run on every generated file, with the file path appended
    #[arg(long, value_name = "PROGRAM")]
    pub pp_run_program: Option<String>,

    /// Argument passed to --pp-run-program before the file path (repeatable)
    #[arg(long, value_name = "ARG", allow_hyphen_values = true, requires = "pp_run_program")]
    pub pp_run_program_arg: Vec<String>,

    /// Put the generation time into generated files
    #[arg(long)]
    pub embed_auditing_info: bool,
}

impl GenerateCommand {
    pub fn run(&self) -> Result<()> {
        let registry = LanguageRegistry::with_builtins();
        let language =
            ops::load_language(&registry, &self.language, &self.language_config).unwrap_or_exit();
        let request = self.request();

        if self.list_inputs {
            let inputs = ops::list_inputs(language, &request)?;
            print!("{}", inputs.join(";"));
            return Ok(());
        }

        let report = ops::generate(language, &request)?;
        if self.list_outputs {
            let outputs: Vec<String> = report
                .files
                .iter()
                .map(|f| f.display().to_string())
                .collect();
            print!("{}", outputs.join(";"));
            return Ok(());
        }

        report.render(&mut TerminalOutput::new());
        Ok(())
    }

    fn request(&self) -> GenerateRequest {
        let generate_namespace_types = if self.namespace_types {
            Some(true)
        } else if self.no_namespace_types {
            Some(false)
        } else {
            None
        };

        GenerateRequest {
            types: self.types.clone(),
            root_namespace: self.root_namespace.clone(),
            output_dir: self.outdir.clone(),
            templates: self.templates.clone(),
            output_extension: self.output_extension.clone(),
            namespace_output_stem: self.namespace_output_stem.clone(),
            options: GenerateOptions {
                dry_run: self.dry_run || self.list_outputs,
                allow_overwrite: !self.no_overwrite,
                generate_namespace_types,
                omit_serialization_support: self.omit_serialization_support.then_some(true),
                embed_auditing_info: self.embed_auditing_info,
            },
            max_empty_lines: self.pp_max_empty_lines,
            trim_trailing_whitespace: self.pp_trim_trailing_whitespace,
            file_mode: self.file_mode,
            run_program: self.pp_run_program.clone(),
            run_program_args: self.pp_run_program_arg.clone(),
        }
    }
}

fn parse_mode(s: &str) -> std::result::Result<u32, String> {
    let digits = s.strip_prefix("0o").unwrap_or(s);
    u32::from_str_radix(digits, 8)
        .ok()
        .filter(|mode| *mode <= 0o7777)
        .ok_or_else(|| format!("'{s}' is not an octal file mode"))
}
