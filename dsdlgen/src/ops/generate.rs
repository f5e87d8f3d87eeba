//! Generate operation - render every type under a root namespace.

use std::{
    fs,
    path::{Path, PathBuf},
};

use dsdlgen_codegen::{
    CodeGenerator, GenerateOptions, Language, LanguageRegistry, NamespaceTree,
    postprocess::{ExternalProgram, LimitEmptyLines, SetFileMode, TrimTrailingWhitespace},
    template::TemplateLocation,
};
use dsdlgen_ir::TypeCatalog;
use eyre::{Context, Result};
use tracing::info;

use crate::reports::GenerateReport;

/// Everything a generation run needs besides the language.
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    /// JSON document listing the parsed types.
    pub types: PathBuf,
    /// Folder of the root namespace; its name is the root namespace name.
    pub root_namespace: PathBuf,
    pub output_dir: PathBuf,
    /// Template override directories, highest priority first.
    pub templates: Vec<PathBuf>,
    pub output_extension: Option<String>,
    pub namespace_output_stem: Option<String>,
    pub options: GenerateOptions,
    pub max_empty_lines: Option<usize>,
    pub trim_trailing_whitespace: bool,
    pub file_mode: Option<u32>,
    pub run_program: Option<String>,
    pub run_program_args: Vec<String>,
}

/// Look up a language and load its rule table with overlays applied.
pub fn load_language(
    registry: &LanguageRegistry,
    name: &str,
    overlays: &[PathBuf],
) -> dsdlgen_codegen::Result<Language> {
    let plugin = registry.get(name)?;
    Language::load(plugin, overlays)
}

/// Parse the type list.
pub fn load_catalog(path: &Path) -> Result<TypeCatalog> {
    let json = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    TypeCatalog::from_json(&json).wrap_err_with(|| format!("Invalid type list {}", path.display()))
}

/// Configure a generator for the request.
pub fn build_generator(language: Language, request: &GenerateRequest) -> dsdlgen_codegen::Result<CodeGenerator> {
    let mut generator = CodeGenerator::new(language, &request.output_dir, request.options.clone());
    for dir in &request.templates {
        generator = generator.with_template_dir(dir)?;
    }
    if let Some(extension) = &request.output_extension {
        generator = generator.with_output_extension(extension);
    }
    if let Some(stem) = &request.namespace_output_stem {
        generator = generator.with_namespace_file_stem(stem);
    }
    if request.trim_trailing_whitespace {
        generator = generator.with_line_post_processor(TrimTrailingWhitespace);
    }
    if let Some(max) = request.max_empty_lines {
        generator = generator.with_line_post_processor(LimitEmptyLines::new(max));
    }
    if let Some(mode) = request.file_mode {
        generator = generator.with_file_post_processor(SetFileMode::new(mode));
    }
    if let Some(program) = &request.run_program {
        generator = generator.with_file_post_processor(
            ExternalProgram::new(program).with_args(request.run_program_args.iter().cloned()),
        );
    }
    Ok(generator)
}

/// Execute the generate operation.
///
/// In a dry run the report lists the files that would be written.
pub fn generate(language: Language, request: &GenerateRequest) -> Result<GenerateReport> {
    let catalog = load_catalog(&request.types)?;
    let language_name = language.name().to_string();
    let mut generator = build_generator(language, request).wrap_err("Invalid generator configuration")?;
    let tree = NamespaceTree::build(&catalog, &request.root_namespace, generator.layout())
        .wrap_err("Failed to build the namespace tree")?;

    info!(
        root = tree.root().full_name(),
        namespaces = tree.len(),
        types = catalog.len(),
        "generating"
    );
    let files = generator
        .generate_all(&tree)
        .wrap_err("Failed to generate code")?;

    Ok(GenerateReport {
        language: language_name,
        root_namespace: tree.root().full_name().to_string(),
        output_dir: request.output_dir.clone(),
        files,
        dry_run: request.options.dry_run,
    })
}

/// Files the run reads: the type list, then every template visible to
/// the generator (overrides first).
pub fn list_inputs(language: Language, request: &GenerateRequest) -> Result<Vec<String>> {
    let generator = build_generator(language, request).wrap_err("Invalid generator configuration")?;
    let templates = generator
        .list_templates()
        .wrap_err("Failed to list templates")?;

    let mut inputs = vec![request.types.display().to_string()];
    inputs.extend(templates.iter().map(|template| match template.location() {
        TemplateLocation::File(path) => path.display().to_string(),
        TemplateLocation::Inline { .. } => template.id(),
    }));
    Ok(inputs)
}

#[cfg(test)]
mod tests {
    use dsdlgen_codegen::testing::{Fixture, sample_types};
    use dsdlgen_lang::BuiltinLanguage;

    use super::*;

    fn request(fixture: &Fixture) -> GenerateRequest {
        let types = fixture.path().join("types.json");
        let json = serde_json::json!({ "types": sample_types() });
        fs::write(&types, json.to_string()).unwrap();
        GenerateRequest {
            types,
            root_namespace: fixture.root_dir("demo"),
            output_dir: fixture.output_dir(),
            ..GenerateRequest::default()
        }
    }

    fn language(name: &str) -> Language {
        load_language(&LanguageRegistry::with_builtins(), name, &[]).unwrap()
    }

    #[test]
    fn test_generate_reports_files() {
        let fixture = Fixture::sample().unwrap();
        let request = request(&fixture);

        let report = generate(language("c"), &request).unwrap();

        assert_eq!(report.language, "c");
        assert_eq!(report.root_namespace, "demo");
        assert_eq!(report.files.len(), 5);
        assert!(report.files.iter().all(|f| f.is_file()));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let fixture = Fixture::sample().unwrap();
        let mut request = request(&fixture);
        request.options.dry_run = true;

        let report = generate(language("python"), &request).unwrap();

        assert!(report.dry_run);
        assert_eq!(report.files.len(), 7);
        assert!(!fixture.output_dir().exists());
    }

    #[test]
    fn test_output_extension_override() {
        let fixture = Fixture::sample().unwrap();
        let mut request = request(&fixture);
        request.options.dry_run = true;
        request.output_extension = Some("hh".to_string());

        let report = generate(language("c"), &request).unwrap();

        assert!(report.files.iter().all(|f| f.extension().is_some_and(|e| e == "hh")));
    }

    #[test]
    fn test_namespace_output_stem_override() {
        let fixture = Fixture::sample().unwrap();
        let mut request = request(&fixture);
        request.options.dry_run = true;
        request.namespace_output_stem = Some("_ns".to_string());

        let report = generate(language("py"), &request).unwrap();

        let out = fixture.output_dir();
        assert!(report.files.contains(&out.join("demo").join("_ns.py")));
        assert!(report.files.contains(&out.join("demo").join("sensors").join("_ns.py")));
        assert!(!report.files.iter().any(|f| f.ends_with("__init__.py")));
    }

    #[test]
    fn test_unknown_language() {
        let err = load_language(&LanguageRegistry::with_builtins(), "cobol", &[]).unwrap_err();
        assert!(err.to_string().contains("cobol"));
    }

    #[test]
    fn test_invalid_type_list() {
        let fixture = Fixture::sample().unwrap();
        let request = request(&fixture);
        fs::write(&request.types, "{\"types\": 3}").unwrap();

        let err = generate(language("c"), &request).unwrap_err();

        assert!(format!("{err:#}").contains("Invalid type list"));
    }

    #[test]
    fn test_list_inputs() {
        let fixture = Fixture::sample().unwrap();
        let templates = fixture.path().join("templates");
        fs::create_dir_all(&templates).unwrap();
        fs::write(templates.join("StructureType.hbs"), "").unwrap();
        let mut request = request(&fixture);
        request.templates = vec![templates.clone()];

        let inputs = list_inputs(language(BuiltinLanguage::C.as_str()), &request).unwrap();

        assert_eq!(inputs[0], request.types.display().to_string());
        assert_eq!(inputs[1], templates.join("StructureType.hbs").display().to_string());
        assert!(inputs.contains(&"c:CompositeType.hbs".to_string()));
        assert!(inputs.contains(&"c:serialization.hbs".to_string()));
    }
}
