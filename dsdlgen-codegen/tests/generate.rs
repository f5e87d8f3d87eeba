//! End-to-end generation over the sample `demo` namespace.
//!
//! Run `cargo insta review` to update snapshots when making intentional changes.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
};

use dsdlgen_codegen::{
    CodeGenerator, Error, GenerateOptions, Language, LanguagePlugin,
    language::BuiltinPlugin,
    postprocess::{LimitEmptyLines, SetFileMode},
    testing::{ChunkedEngine, Fixture},
};
use dsdlgen_lang::{BuiltinLanguage, BundledTemplate, RuleTableLoader};

fn language(lang: BuiltinLanguage) -> Language {
    Language::load(Arc::new(BuiltinPlugin::new(lang)), &[]).expect("builtin language loads")
}

fn generator(fixture: &Fixture, lang: BuiltinLanguage, options: GenerateOptions) -> CodeGenerator {
    CodeGenerator::new(language(lang), fixture.output_dir(), options)
}

fn run(fixture: &Fixture, generator: &mut CodeGenerator) -> Result<Vec<PathBuf>, Error> {
    let tree = fixture.tree("demo", generator.layout())?;
    generator.generate_all(&tree)
}

/// Output paths relative to the output directory, one per line.
fn listing(out: &Path, paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| {
            p.strip_prefix(out)
                .expect("output below output dir")
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn read(path: &Path) -> String {
    fs::read_to_string(path)
        .expect("generated file is readable")
        .replace(env!("CARGO_PKG_VERSION"), "[version]")
}

fn dry_run() -> GenerateOptions {
    GenerateOptions {
        dry_run: true,
        ..GenerateOptions::default()
    }
}

#[test]
fn test_c_dry_run_listing() {
    let fixture = Fixture::sample().unwrap();
    let mut generator = generator(&fixture, BuiltinLanguage::C, dry_run());

    let paths = run(&fixture, &mut generator).unwrap();

    insta::assert_snapshot!(listing(&fixture.output_dir(), &paths), @r"
    dsdlgen/support/serialization.h
    demo/Heartbeat_1_0.h
    demo/Ping_1_0.h
    demo/_if/Value_1_0.h
    demo/sensors/Reading_1_0.h
    ");
    assert!(!fixture.output_dir().exists());
}

#[test]
fn test_python_dry_run_listing() {
    let fixture = Fixture::sample().unwrap();
    let mut generator = generator(&fixture, BuiltinLanguage::Python, dry_run());

    let paths = run(&fixture, &mut generator).unwrap();

    insta::assert_snapshot!(listing(&fixture.output_dir(), &paths), @r"
    demo/__init__.py
    demo/Heartbeat_1_0.py
    demo/Ping_1_0.py
    demo/if_/__init__.py
    demo/if_/Value_1_0.py
    demo/sensors/__init__.py
    demo/sensors/Reading_1_0.py
    ");
}

#[test]
fn test_dry_run_matches_real_run() {
    let fixture = Fixture::sample().unwrap();
    let planned = run(&fixture, &mut generator(&fixture, BuiltinLanguage::Cpp, dry_run())).unwrap();

    let written = run(
        &fixture,
        &mut generator(&fixture, BuiltinLanguage::Cpp, GenerateOptions::default()),
    )
    .unwrap();

    assert_eq!(planned, written);
    assert!(written.iter().all(|p| p.is_file()));
}

#[test]
fn test_python_namespace_file() {
    let fixture = Fixture::sample().unwrap();
    let mut generator = generator(&fixture, BuiltinLanguage::Python, GenerateOptions::default());

    run(&fixture, &mut generator).unwrap();

    let init = read(&fixture.output_dir().join("demo/__init__.py"));
    insta::assert_snapshot!(init.trim_end(), @r"
    #
    # Namespace demo
    # Generated by dsdlgen [version]. Do not edit.
    #

    from .Heartbeat_1_0 import Heartbeat_1_0 as Heartbeat_1_0
    from .Ping_1_0 import Ping_1_0 as Ping_1_0
    ");
}

#[test]
fn test_c_structure_header() {
    let fixture = Fixture::sample().unwrap();
    let mut generator = generator(&fixture, BuiltinLanguage::C, GenerateOptions::default());

    run(&fixture, &mut generator).unwrap();

    let reading = read(&fixture.output_dir().join("demo/sensors/Reading_1_0.h"));
    assert!(reading.contains("#ifndef DEMO_SENSORS_READING_1_0_INCLUDED_"));
    assert!(reading.contains("#include \"demo/_if/Value_1_0.h\"\n"));
    assert!(reading.contains("#include \"dsdlgen/support/serialization.h\"\n"));
    assert!(reading.contains("#include <stddef.h>\n"));
    assert!(reading.contains("    demo_if_Value_1_0 value;\n"));
    assert!(reading.contains("        float elements[8];\n"));
    assert!(reading.contains("} demo_sensors_Reading_1_0;"));
    // Empty line runs are limited and trailing whitespace trimmed.
    assert!(!reading.contains("\n\n\n"));
    assert!(reading.lines().all(|line| line == line.trim_end()));

    let value = read(&fixture.output_dir().join("demo/_if/Value_1_0.h"));
    assert!(value.contains("    uint8_t _tag0_;\n"));
    assert!(value.contains("        int32_t integer;\n"));
    assert!(value.contains("        bool flag;\n"));

    let heartbeat = read(&fixture.output_dir().join("demo/Heartbeat_1_0.h"));
    assert!(heartbeat.contains("#define demo_Heartbeat_1_0_MAX_HEALTH ((uint8_t) 3)"));
}

#[test]
fn test_c_service_header_holds_sections() {
    let fixture = Fixture::sample().unwrap();
    let mut generator = generator(&fixture, BuiltinLanguage::C, GenerateOptions::default());

    let paths = run(&fixture, &mut generator).unwrap();

    assert!(!paths.iter().any(|p| p.ends_with("Request_1_0.h")));
    let ping = read(&fixture.output_dir().join("demo/Ping_1_0.h"));
    assert!(ping.contains("    uint16_t sequence;\n"));
    assert!(ping.contains("} demo_Ping_Request_1_0;"));
    assert!(ping.contains("    demo_Heartbeat_1_0 heartbeat;\n"));
    assert!(ping.contains("} demo_Ping_Response_1_0;"));
    assert!(ping.contains("#include \"demo/Heartbeat_1_0.h\"\n"));
    // Unique names restart with every file but not within one.
    assert!(ping.contains("uint8_t _reserved0_;"));
    assert!(ping.contains("uint8_t _reserved1_;"));
}

#[test]
fn test_cpp_composite_fields_use_declared_names() {
    let fixture = Fixture::sample().unwrap();
    let mut generator = generator(&fixture, BuiltinLanguage::Cpp, GenerateOptions::default());

    run(&fixture, &mut generator).unwrap();

    let value = read(&fixture.output_dir().join("demo/_if/Value_1_0.hpp"));
    assert!(value.contains("namespace _if\n"));
    assert!(value.contains("struct Value_1_0\n"));

    let reading = read(&fixture.output_dir().join("demo/sensors/Reading_1_0.hpp"));
    assert!(reading.contains("#include \"demo/_if/Value_1_0.hpp\"\n"));
    assert!(reading.contains("struct Reading_1_0\n"));
    assert!(reading.contains("    demo::_if::Value_1_0 value{};\n"));
    assert!(reading.contains("VariableLengthArray<float, 8> samples;"));
    assert!(!reading.contains("__"));
}

#[test]
fn test_javascript_uses_serializable_template() {
    let fixture = Fixture::sample().unwrap();
    let mut generator = generator(&fixture, BuiltinLanguage::JavaScript, GenerateOptions::default());

    let paths = run(&fixture, &mut generator).unwrap();

    // No support templates ship for this language.
    assert_eq!(paths.len(), 4);
    let value = read(&fixture.output_dir().join("demo/_if/Value_1_0.js"));
    assert!(value.contains("export const Value = {"));
    assert!(value.contains("\"kind\": \"union\""));
}

#[test]
fn test_overwrite_denied() {
    let fixture = Fixture::sample().unwrap();
    let options = GenerateOptions {
        allow_overwrite: false,
        ..GenerateOptions::default()
    };
    run(&fixture, &mut generator(&fixture, BuiltinLanguage::C, options.clone())).unwrap();
    let heartbeat = fixture.output_dir().join("demo/Heartbeat_1_0.h");
    let before = fs::read_to_string(&heartbeat).unwrap();

    let err = run(&fixture, &mut generator(&fixture, BuiltinLanguage::C, options)).unwrap_err();

    assert!(matches!(err, Error::OverwriteDenied { .. }));
    assert_eq!(fs::read_to_string(&heartbeat).unwrap(), before);
}

#[cfg(unix)]
#[test]
fn test_overwrite_allowed_replaces_read_only_files() {
    use std::os::unix::fs::PermissionsExt;

    let fixture = Fixture::sample().unwrap();
    let mut first = generator(&fixture, BuiltinLanguage::C, GenerateOptions::default())
        .with_file_post_processor(SetFileMode::new(0o444));
    let paths = run(&fixture, &mut first).unwrap();
    for path in &paths {
        assert_eq!(fs::metadata(path).unwrap().permissions().mode() & 0o777, 0o444);
    }

    let mut second = generator(&fixture, BuiltinLanguage::C, GenerateOptions::default())
        .with_engine(ChunkedEngine::new("regenerated\n", 4));
    run(&fixture, &mut second).unwrap();

    assert_eq!(
        fs::read_to_string(fixture.output_dir().join("demo/Heartbeat_1_0.h")).unwrap(),
        "regenerated\n"
    );
}

#[test]
fn test_streamed_output_is_post_processed() {
    let fixture = Fixture::sample().unwrap();
    let options = GenerateOptions {
        omit_serialization_support: Some(true),
        ..GenerateOptions::default()
    };
    let mut generator = generator(&fixture, BuiltinLanguage::JavaScript, options)
        .with_line_post_processor(LimitEmptyLines::new(1))
        .with_engine(ChunkedEngine::new("a  \r\n\n\n\n\u{2764} b\t\nend", 3));

    let paths = run(&fixture, &mut generator).unwrap();

    for path in paths {
        assert_eq!(fs::read_to_string(path).unwrap(), "a\r\n\n\u{2764} b\nend");
    }
}

#[test]
fn test_override_templates() {
    let fixture = Fixture::sample().unwrap();
    let templates = fixture.path().join("templates");
    fs::create_dir_all(templates.join("support")).unwrap();
    fs::write(templates.join("UnionType.hbs"), "union {{T.type_name}}\n").unwrap();
    fs::write(templates.join("support/serialization.hbs"), "support {{stem}}\n").unwrap();
    let mut generator = generator(&fixture, BuiltinLanguage::C, GenerateOptions::default())
        .with_template_dir(&templates)
        .unwrap();

    run(&fixture, &mut generator).unwrap();

    let out = fixture.output_dir();
    assert_eq!(read(&out.join("demo/_if/Value_1_0.h")), "union demo_if_Value_1_0\n");
    assert_eq!(read(&out.join("dsdlgen/support/serialization.h")), "support serialization\n");
    assert!(read(&out.join("demo/Heartbeat_1_0.h")).contains("typedef struct"));
}

#[derive(Debug)]
struct Bare;

impl LanguagePlugin for Bare {
    fn name(&self) -> &str {
        "bare"
    }

    fn rule_loader(&self) -> dsdlgen_lang::Result<RuleTableLoader> {
        RuleTableLoader::new("[language]\nname = \"bare\"\nextension = \".txt\"\n", "bare.toml")
    }

    fn bundled_templates(&self) -> &[BundledTemplate] {
        &[]
    }
}

#[test]
fn test_missing_template_fails() {
    let fixture = Fixture::sample().unwrap();
    let templates = fixture.path().join("templates");
    fs::create_dir_all(&templates).unwrap();
    fs::write(templates.join("StructureType.hbs"), "{{T.full_name}}\n").unwrap();
    let language = Language::load(Arc::new(Bare), &[]).unwrap();
    let mut generator = CodeGenerator::new(language, fixture.output_dir(), GenerateOptions::default())
        .with_template_dir(&templates)
        .unwrap();

    let err = run(&fixture, &mut generator).unwrap_err();

    assert!(matches!(
        err,
        Error::TemplateNotFound { ref entity, ref kind } if entity == "demo.Ping" && kind == "ServiceType"
    ));
    assert_eq!(
        fs::read_to_string(fixture.output_dir().join("demo/Heartbeat_1_0.txt")).unwrap(),
        "demo.Heartbeat\n"
    );
}
