//! Test utilities for the generator.
//!
//! This module is only available when the `testing` feature is enabled
//! or during tests.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use dsdlgen_ir::{
    ArrayCapacity, Attribute, CompositeType, DataType, PrimitiveType, TypeCatalog, TypeKey, Version,
};
use serde_json::Value;
use tempfile::TempDir;

use crate::{
    Error, Result,
    namespace::{NamespaceTree, OutputLayout},
    render::TemplateEngine,
    template::TemplateRef,
};

/// A type catalog plus a scratch directory holding its namespace folders.
#[derive(Debug)]
pub struct Fixture {
    temp: TempDir,
    catalog: TypeCatalog,
}

impl Fixture {
    /// Create the source folder of every namespace that owns a type.
    pub fn new(types: impl IntoIterator<Item = CompositeType>) -> Result<Self> {
        let temp = TempDir::new().map_err(|e| Error::io(std::env::temp_dir(), e))?;
        let catalog = TypeCatalog::from_types(types)
            .map_err(|e| Error::Configuration(e.to_string()))?;
        for ty in catalog.iter().filter(|t| t.parent_service.is_none()) {
            let dir = ty
                .namespace_components()
                .iter()
                .fold(temp.path().join("src"), |dir, c| dir.join(c));
            fs::create_dir_all(&dir).map_err(|e| Error::io(&dir, e))?;
        }
        Ok(Self { temp, catalog })
    }

    /// Fixture over [`sample_types`].
    pub fn sample() -> Result<Self> {
        Self::new(sample_types())
    }

    pub fn catalog(&self) -> &TypeCatalog {
        &self.catalog
    }

    /// Source folder of a root namespace.
    pub fn root_dir(&self, root: &str) -> PathBuf {
        self.temp.path().join("src").join(root)
    }

    /// Output folder inside the scratch directory; not created.
    pub fn output_dir(&self) -> PathBuf {
        self.temp.path().join("out")
    }

    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    pub fn tree(&self, root: &str, layout: &OutputLayout) -> Result<NamespaceTree<'_>> {
        NamespaceTree::build(&self.catalog, &self.root_dir(root), layout)
    }
}

fn primitive(primitive: PrimitiveType) -> DataType {
    DataType::Primitive(primitive)
}

/// A small `demo` root namespace with a structure, a union, a nested
/// namespace, a reserved-word namespace and a service.
pub fn sample_types() -> Vec<CompositeType> {
    let v1 = Version::new(1, 0);
    let heartbeat = TypeKey::new("demo.Heartbeat", v1);
    let value = TypeKey::new("demo.if.Value", v1);
    let ping = TypeKey::new("demo.Ping", v1);
    let request = TypeKey::new("demo.Ping.Request", v1);
    let response = TypeKey::new("demo.Ping.Response", v1);

    vec![
        CompositeType::structure("demo.Heartbeat", v1)
            .with_attribute(Attribute::constant(
                "MAX_HEALTH",
                primitive(PrimitiveType::UnsignedInteger { bits: 8 }),
                "3",
            ))
            .with_attribute(Attribute::field(
                "uptime",
                primitive(PrimitiveType::UnsignedInteger { bits: 32 }),
            ))
            .with_attribute(Attribute::field(
                "health",
                primitive(PrimitiveType::UnsignedInteger { bits: 8 }),
            )),
        CompositeType::union("demo.if.Value", v1)
            .with_attribute(Attribute::field(
                "integer",
                primitive(PrimitiveType::SignedInteger { bits: 32 }),
            ))
            .with_attribute(Attribute::field("real", primitive(PrimitiveType::Float { bits: 64 })))
            .with_attribute(Attribute::field("flag", primitive(PrimitiveType::Boolean))),
        CompositeType::structure("demo.sensors.Reading", v1)
            .with_attribute(Attribute::field("value", DataType::Composite(value)))
            .with_attribute(Attribute::field(
                "samples",
                DataType::Array {
                    element: Box::new(primitive(PrimitiveType::Float { bits: 32 })),
                    capacity: ArrayCapacity::Variable(8),
                },
            )),
        CompositeType::service("demo.Ping", v1, request, response),
        CompositeType::structure("demo.Ping.Request", v1)
            .with_attribute(Attribute::field(
                "sequence",
                primitive(PrimitiveType::UnsignedInteger { bits: 16 }),
            ))
            .with_parent_service(ping.clone()),
        CompositeType::structure("demo.Ping.Response", v1)
            .with_attribute(Attribute::field("heartbeat", DataType::Composite(heartbeat)))
            .with_parent_service(ping),
    ]
}

/// Engine that writes a fixed text in chunks of `chunk` bytes, split
/// without regard for line or character boundaries.
#[derive(Debug, Clone)]
pub struct ChunkedEngine {
    text: String,
    chunk: usize,
}

impl ChunkedEngine {
    pub fn new(text: impl Into<String>, chunk: usize) -> Self {
        Self {
            text: text.into(),
            chunk: chunk.max(1),
        }
    }
}

impl TemplateEngine for ChunkedEngine {
    fn render_to(&mut self, template: &TemplateRef, _: &Value, out: &mut dyn Write) -> Result<()> {
        for chunk in self.text.as_bytes().chunks(self.chunk) {
            out.write_all(chunk).map_err(|e| Error::Render {
                template: template.id(),
                message: e.to_string(),
            })?;
        }
        Ok(())
    }
}
