//! The generation pipeline: resolve, render, post-process, write.

use std::{
    io::Write,
    path::{Path, PathBuf},
};

use dsdlgen_core::{Overwrite, create_output};
use dsdlgen_lang::LanguageRules;
use serde_json::Value;
use tracing::{debug, info};

use crate::{
    Error, Result,
    includes::IncludeResolver,
    language::Language,
    namespace::{Entity, NamespaceTree, OutputLayout},
    naming::SharedUniqueNames,
    postprocess::{
        FilePostProcessor, LimitEmptyLines, LineChain, LinePostProcessor, LineProcessingWriter,
        TrimTrailingWhitespace,
    },
    render::{GenerationContext, HandlebarsEngine, RenderData, TemplateEngine},
    template::{DirectorySource, InlineSource, TemplateRef, TemplateResolver},
};

/// Options for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Compute output paths without rendering or writing anything.
    pub dry_run: bool,
    /// Replace existing files.
    pub allow_overwrite: bool,
    /// Generate namespace files; `None` uses the language default.
    pub generate_namespace_types: Option<bool>,
    /// Skip support files; `None` uses the language default.
    pub omit_serialization_support: Option<bool>,
    /// Put the generation time into the template context.
    pub embed_auditing_info: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self {
            dry_run: false,
            allow_overwrite: true,
            generate_namespace_types: None,
            omit_serialization_support: None,
            embed_auditing_info: false,
        }
    }
}

impl GenerateOptions {
    pub fn namespace_types_enabled(&self, rules: &LanguageRules) -> bool {
        self.generate_namespace_types
            .unwrap_or_else(|| rules.generate_namespace_types_default())
    }

    pub fn serialization_support_omitted(&self, rules: &LanguageRules) -> bool {
        self.omit_serialization_support
            .unwrap_or(rules.language.omit_serialization_support)
    }
}

/// Generates every file of a run for one target language.
///
/// # Example
///
/// ```ignore
/// let mut generator = CodeGenerator::new(language, "out", GenerateOptions::default())
///     .with_template_dir("my-templates")?
///     .with_file_post_processor(SetFileMode::new(0o444));
/// let tree = NamespaceTree::build(&catalog, root_dir, generator.layout())?;
/// let written = generator.generate_all(&tree)?;
/// ```
#[derive(Debug)]
pub struct CodeGenerator {
    language: Language,
    layout: OutputLayout,
    options: GenerateOptions,
    context: GenerationContext,
    resolver: TemplateResolver,
    override_dirs: Vec<PathBuf>,
    engine: Box<dyn TemplateEngine>,
    unique_names: SharedUniqueNames,
    line_processors: LineChain,
    file_processors: Vec<Box<dyn FilePostProcessor>>,
}

impl CodeGenerator {
    pub fn new(language: Language, output_dir: impl Into<PathBuf>, options: GenerateOptions) -> Self {
        let layout = OutputLayout::new(output_dir, language.rules(), language.encoder().clone());
        let context = GenerationContext::new(&language, &options);
        let resolver = TemplateResolver::new().with_source(InlineSource::bundled(
            language.name(),
            language.plugin().bundled_templates(),
        ));
        let unique_names = SharedUniqueNames::new();
        let engine = Box::new(HandlebarsEngine::new(&language, unique_names.clone()));

        Self {
            language,
            layout,
            options,
            context,
            resolver,
            override_dirs: Vec::new(),
            engine,
            unique_names,
            line_processors: LineChain::new(),
            file_processors: Vec::new(),
        }
    }

    /// Add a template directory that takes priority over the bundled
    /// templates and over directories added after it.
    pub fn with_template_dir(mut self, dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let source = DirectorySource::new(&dir)?;
        self.resolver
            .insert_source(self.override_dirs.len(), Box::new(source));
        self.override_dirs.push(dir);
        Ok(self)
    }

    /// Replace the templating service.
    pub fn with_engine(mut self, engine: impl TemplateEngine + 'static) -> Self {
        self.engine = Box::new(engine);
        self
    }

    /// Override the extension of generated files.
    pub fn with_output_extension(mut self, extension: impl Into<String>) -> Self {
        self.layout = self.layout.with_extension(extension);
        self
    }

    /// Override the rule table's namespace file stem.
    pub fn with_namespace_file_stem(mut self, stem: impl Into<String>) -> Self {
        self.layout = self.layout.with_namespace_file_stem(stem);
        self
    }

    /// Use a fixed generation context, e.g. for reproducible output.
    pub fn with_context(mut self, context: GenerationContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_line_post_processor(mut self, processor: impl LinePostProcessor + 'static) -> Self {
        self.line_processors.push(Box::new(processor));
        self
    }

    pub fn with_file_post_processor(mut self, processor: impl FilePostProcessor + 'static) -> Self {
        self.file_processors.push(Box::new(processor));
        self
    }

    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    pub fn context(&self) -> &GenerationContext {
        &self.context
    }

    pub fn resolver(&self) -> &TemplateResolver {
        &self.resolver
    }

    /// Every template visible to this generator, override directories first.
    pub fn list_templates(&self) -> Result<Vec<TemplateRef>> {
        let mut templates = self.resolver.list_templates()?;
        templates.extend(self.support_templates());
        Ok(templates)
    }

    /// Generate support files, then every type and (if enabled) namespace
    /// file of the tree. Returns the paths of all outputs in generation
    /// order; in a dry run nothing is written but the same paths are
    /// returned.
    pub fn generate_all(&mut self, tree: &NamespaceTree<'_>) -> Result<Vec<PathBuf>> {
        // Template bindings live for one run.
        self.resolver.clear_cache();
        self.add_rule_line_processors();

        let support = self.generate_support()?;
        let support_headers: Vec<PathBuf> = support
            .iter()
            .filter_map(|p| p.strip_prefix(self.layout.output_dir()).ok())
            .map(Path::to_path_buf)
            .collect();

        let entities: Vec<(Entity<'_>, PathBuf)> = if self.context.generate_namespace_types {
            tree.entities().map(|(e, p)| (e, p.to_path_buf())).collect()
        } else {
            tree.types().map(|(e, p)| (e, p.to_path_buf())).collect()
        };

        let mut generated = support;
        for (entity, path) in entities {
            let includes = match entity {
                Entity::Type(ty) if !self.options.dry_run => IncludeResolver::new(tree, &self.layout, &self.language)
                    .with_support_headers(support_headers.iter().cloned())
                    .for_type(ty),
                _ => Vec::new(),
            };
            generated.push(self.generate_entity(tree, &entity, &path, &includes)?);
        }

        info!(
            language = self.language.name(),
            files = generated.len(),
            dry_run = self.options.dry_run,
            "generation complete"
        );
        Ok(generated)
    }

    /// Generate the file for one type or namespace.
    pub fn generate_entity(
        &mut self,
        tree: &NamespaceTree<'_>,
        entity: &Entity<'_>,
        path: &Path,
        includes: &[String],
    ) -> Result<PathBuf> {
        self.unique_names.reset();
        self.line_processors.reset();

        let template = self.resolver.resolve_entity(entity)?;
        if self.options.dry_run {
            debug!(entity = entity.full_name(), path = %path.display(), "dry run, not writing");
            return Ok(path.to_path_buf());
        }

        let data = RenderData::new(&self.language, &self.context);
        let data = match entity {
            Entity::Type(ty) => data.for_type(tree.catalog(), ty, includes),
            Entity::Namespace(ns) => data.for_namespace(ns),
        };
        self.write(&template, &data, path)
    }

    /// Render support templates into the support namespace folder.
    ///
    /// A language without support templates, or a run that omits
    /// serialization support, generates nothing.
    pub fn generate_support(&mut self) -> Result<Vec<PathBuf>> {
        if self.context.omit_serialization_support {
            debug!(language = self.language.name(), "serialization support omitted");
            return Ok(Vec::new());
        }
        let templates = self.support_templates();
        if templates.is_empty() {
            info!(language = self.language.name(), "no support files for this language");
            return Ok(Vec::new());
        }

        let folder = self.layout.output_dir().join(
            self.layout
                .relative_folder(self.language.rules().language.support_namespace.iter().map(String::as_str)),
        );
        let mut generated = Vec::new();
        for template in templates {
            let path = folder.join(format!("{}{}", template.stem(), self.layout.extension()));
            self.unique_names.reset();
            self.line_processors.reset();
            if self.options.dry_run {
                generated.push(path);
                continue;
            }
            let data = RenderData::new(&self.language, &self.context).for_support(template.stem());
            info!(path = %path.display(), "generating support file");
            generated.push(self.write(&template, &data, &path)?);
        }
        Ok(generated)
    }

    /// Support templates, an override directory's `support/<stem>.hbs`
    /// taking priority over the bundled one.
    fn support_templates(&self) -> Vec<TemplateRef> {
        self.language
            .plugin()
            .support_templates()
            .iter()
            .map(|bundled| {
                self.override_dirs
                    .iter()
                    .map(|dir| dir.join("support").join(format!("{}.hbs", bundled.name)))
                    .find(|candidate| candidate.is_file())
                    .map(|path| TemplateRef::file(bundled.name, path))
                    .unwrap_or_else(|| {
                        TemplateRef::inline(bundled.name, self.language.name(), bundled.source)
                    })
            })
            .collect()
    }

    fn add_rule_line_processors(&mut self) {
        let options = &self.language.rules().options;
        if options.trim_trailing_whitespace && !self.line_processors.contains(TrimTrailingWhitespace::NAME) {
            debug!("adding trailing whitespace trimming from language options");
            self.line_processors.push(Box::new(TrimTrailingWhitespace));
        }
        if let Some(max) = options.limit_empty_lines {
            if !self.line_processors.contains(LimitEmptyLines::NAME) {
                debug!(max, "adding empty line limit from language options");
                self.line_processors.push(Box::new(LimitEmptyLines::new(max)));
            }
        }
    }

    fn write(&mut self, template: &TemplateRef, data: &Value, path: &Path) -> Result<PathBuf> {
        let overwrite = Overwrite::from_allowed(self.options.allow_overwrite);
        let mut file = create_output(path, overwrite)?;

        let mut writer = LineProcessingWriter::new(&mut file, &mut self.line_processors, path);
        let rendered = self.engine.render_to(template, data, &mut writer);
        if let Some(err) = writer.take_error() {
            return Err(err);
        }
        rendered?;
        writer.finish()?;
        file.flush().map_err(|e| Error::io(path, e))?;
        drop(file);
        debug!(path = %path.display(), template = %template, "generated");

        let mut path = path.to_path_buf();
        for processor in &mut self.file_processors {
            debug!(processor = processor.name(), path = %path.display(), "running file post-processor");
            path = processor.process(path)?;
        }
        Ok(path)
    }
}
