//! Template data for types, namespaces and support files.
//!
//! Templates see:
//!
//! - `T` - the type being generated, or `N` - the namespace
//! - `includes` - quoted include entries (types only)
//! - `language` - name, extension and flags of the target language
//! - `ctx` - the [`GenerationContext`]

use dsdlgen_ir::{
    Attribute, AttributeKind, CompositeKind, CompositeType, DataType, PrimitiveType, TypeCatalog,
    TypeKey,
};
use serde_json::{Value, json};

use super::GenerationContext;
use crate::{
    language::Language,
    namespace::{Namespace, OutputLayout},
};

/// Builds the JSON value a template is rendered with.
#[derive(Debug, Clone, Copy)]
pub struct RenderData<'a> {
    language: &'a Language,
    context: &'a GenerationContext,
}

impl<'a> RenderData<'a> {
    pub fn new(language: &'a Language, context: &'a GenerationContext) -> Self {
        Self { language, context }
    }

    /// Data for a type file.
    pub fn for_type(&self, catalog: &TypeCatalog, ty: &CompositeType, includes: &[String]) -> Value {
        json!({
            "T": self.type_value(catalog, ty),
            "includes": includes,
            "language": self.language_value(),
            "ctx": self.context,
        })
    }

    /// Data for a namespace file.
    pub fn for_namespace(&self, namespace: &Namespace) -> Value {
        let types: Vec<Value> = namespace
            .types()
            .map(|(key, path)| {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                json!({
                    "full_name": key.full_name,
                    "short_name": key.short_name(),
                    "version": key.version,
                    "type_name": self.type_name(key),
                    "stem": OutputLayout::type_file_stem(key),
                    "file_name": file_name,
                })
            })
            .collect();
        let children: Vec<&str> = namespace.children().collect();

        json!({
            "N": {
                "full_name": namespace.full_name(),
                "short_name": namespace.short_name(),
                "encoded_name": namespace.encoded_name(),
                "components": namespace.components().collect::<Vec<_>>(),
                "types": types,
                "children": children,
            },
            "language": self.language_value(),
            "ctx": self.context,
        })
    }

    /// Data for a support file.
    pub fn for_support(&self, stem: &str) -> Value {
        json!({
            "stem": stem,
            "language": self.language_value(),
            "ctx": self.context,
        })
    }

    fn language_value(&self) -> Value {
        let rules = self.language.rules();
        json!({
            "name": rules.name(),
            "extension": rules.extension(),
            "has_standard_namespace_files": rules.language.has_standard_namespace_files,
            "enable_stropping": rules.language.enable_stropping,
        })
    }

    fn type_value(&self, catalog: &TypeCatalog, ty: &CompositeType) -> Value {
        let mut value = self.composite_value(ty);
        if let CompositeKind::Service { request, response } = &ty.kind {
            value["request"] = self.section_value(catalog, request);
            value["response"] = self.section_value(catalog, response);
        }
        value
    }

    fn section_value(&self, catalog: &TypeCatalog, key: &TypeKey) -> Value {
        match catalog.get(key) {
            Some(section) => self.composite_value(section),
            None => json!({
                "full_name": key.full_name,
                "short_name": key.short_name(),
                "version": key.version,
                "type_name": self.type_name(key),
                "fields": [],
                "constants": [],
            }),
        }
    }

    fn composite_value(&self, ty: &CompositeType) -> Value {
        let kind = match ty.kind {
            CompositeKind::Structure => "structure",
            CompositeKind::Union => "union",
            CompositeKind::Service { .. } => "service",
        };
        let fields: Vec<Value> = ty.fields().map(|a| self.attribute_value(a)).collect();
        let constants: Vec<Value> = ty.constants().map(|a| self.attribute_value(a)).collect();

        json!({
            "full_name": ty.full_name,
            "short_name": ty.short_name(),
            "version": ty.version,
            "kind": kind,
            "is_union": ty.is_union(),
            "is_service": ty.is_service(),
            "deprecated": ty.deprecated,
            "namespace": ty.namespace(),
            "namespace_components": ty.namespace_components(),
            "type_name": self.type_name(&ty.key()),
            "local_name": self.local_name(&ty.key()),
            "qualified_name": self.qualified_name(&ty.key()),
            "fields": fields,
            "constants": constants,
        })
    }

    fn attribute_value(&self, attribute: &Attribute) -> Value {
        let (is_array, is_variable_length, capacity) = match &attribute.data_type {
            DataType::Array { capacity, .. } => (true, capacity.is_variable(), Some(capacity.max())),
            _ => (false, false, None),
        };
        let value = match &attribute.kind {
            AttributeKind::Constant { value } => Some(self.language.rules().named_value(value)),
            _ => None,
        };

        json!({
            "name": attribute.name,
            "type_name": self.data_type_name(&attribute.data_type, Self::type_name),
            "qualified_type_name": self.data_type_name(&attribute.data_type, Self::qualified_name),
            "value": value,
            "is_padding": matches!(attribute.kind, AttributeKind::Padding),
            "is_constant": attribute.is_constant(),
            "is_composite": attribute.data_type.as_composite().is_some(),
            "is_array": is_array,
            "is_variable_length": is_variable_length,
            "capacity": capacity,
        })
    }

    /// Target language name of a data type; arrays are named by their
    /// element type, composites by `composite_name`.
    fn data_type_name(&self, data_type: &DataType, composite_name: fn(&Self, &TypeKey) -> String) -> String {
        match data_type {
            DataType::Primitive(primitive) => self.primitive_name(primitive),
            DataType::Array { element, .. } => self.data_type_name(element, composite_name),
            DataType::Composite(key) => composite_name(self, key),
        }
    }

    fn primitive_name(&self, primitive: &PrimitiveType) -> String {
        let schema_name = primitive.schema_name();
        self.language.rules().named_type(&schema_name).to_string()
    }

    /// Flat identifier of a type: the full name with `.` replaced by `_`,
    /// followed by the version, encoded as a whole.
    fn type_name(&self, key: &TypeKey) -> String {
        let flat = key.full_name.replace('.', "_");
        self.language
            .encoder()
            .encode(&format!("{flat}_{}_{}", key.version.major, key.version.minor))
    }

    /// Identifier of a type inside its own namespace: short name and version.
    fn local_name(&self, key: &TypeKey) -> String {
        self.language.encoder().encode(&format!(
            "{}_{}_{}",
            key.short_name(),
            key.version.major,
            key.version.minor
        ))
    }

    /// Namespace-qualified identifier, e.g. `demo::_if::Value_1_0`.
    fn qualified_name(&self, key: &TypeKey) -> String {
        let encoder = self.language.encoder();
        let mut components: Vec<String> = key
            .full_name
            .split('.')
            .map(|component| encoder.encode(component))
            .collect();
        components.pop();
        components.push(self.local_name(key));
        components.join("::")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use dsdlgen_ir::{ArrayCapacity, Version};
    use dsdlgen_lang::BuiltinLanguage;

    use super::*;
    use crate::{generator::GenerateOptions, language::BuiltinPlugin};

    fn v1() -> Version {
        Version::new(1, 0)
    }

    fn language(lang: BuiltinLanguage) -> Language {
        Language::load(Arc::new(BuiltinPlugin::new(lang)), &[]).unwrap()
    }

    #[test]
    fn test_type_data() {
        let c = language(BuiltinLanguage::C);
        let context = GenerationContext::new(&c, &GenerateOptions::default());
        let ty = CompositeType::structure("a.if.Thing", v1())
            .with_attribute(Attribute::constant(
                "MAX",
                DataType::Primitive(PrimitiveType::UnsignedInteger { bits: 8 }),
                "true",
            ))
            .with_attribute(Attribute::field(
                "samples",
                DataType::Array {
                    element: Box::new(DataType::Primitive(PrimitiveType::Float { bits: 64 })),
                    capacity: ArrayCapacity::Variable(16),
                },
            ))
            .with_attribute(Attribute::field("child", DataType::Composite(TypeKey::new("a.Other", v1()))));
        let catalog = TypeCatalog::from_types([ty.clone()]).unwrap();

        let data = RenderData::new(&c, &context).for_type(&catalog, &ty, &["<stdint.h>".to_string()]);

        let t = &data["T"];
        assert_eq!(t["type_name"], "a_if_Thing_1_0");
        assert_eq!(t["local_name"], "Thing_1_0");
        assert_eq!(t["qualified_name"], "a::_if::Thing_1_0");
        assert_eq!(t["kind"], "structure");
        assert_eq!(t["namespace_components"], json!(["a", "if"]));
        assert_eq!(t["constants"][0]["type_name"], "uint8_t");
        assert_eq!(t["constants"][0]["value"], "true");
        assert_eq!(t["fields"][0]["type_name"], "double");
        assert_eq!(t["fields"][0]["is_variable_length"], true);
        assert_eq!(t["fields"][0]["capacity"], 16);
        assert_eq!(t["fields"][1]["type_name"], "a_Other_1_0");
        assert_eq!(data["includes"], json!(["<stdint.h>"]));
        assert_eq!(data["language"]["name"], "c");
        assert_eq!(data["ctx"]["language"], "c");
    }

    #[test]
    fn test_cpp_names_are_encoded_whole() {
        let cpp = language(BuiltinLanguage::Cpp);
        let context = GenerationContext::new(&cpp, &GenerateOptions::default());
        let ty = CompositeType::structure("demo.sensors.Reading", v1()).with_attribute(Attribute::field(
            "value",
            DataType::Composite(TypeKey::new("demo.if.Value", v1())),
        ));
        let catalog = TypeCatalog::from_types([ty.clone()]).unwrap();

        let data = RenderData::new(&cpp, &context).for_type(&catalog, &ty, &[]);

        let field = &data["T"]["fields"][0];
        assert_eq!(field["type_name"], "demo_if_Value_1_0");
        assert_eq!(field["qualified_type_name"], "demo::_if::Value_1_0");
        assert!(!field["type_name"].as_str().unwrap().contains("__"));
    }

    #[test]
    fn test_python_named_values() {
        let py = language(BuiltinLanguage::Python);
        let context = GenerationContext::new(&py, &GenerateOptions::default());
        let ty = CompositeType::structure("a.Flag", v1()).with_attribute(Attribute::constant(
            "ON",
            DataType::Primitive(PrimitiveType::Boolean),
            "true",
        ));
        let catalog = TypeCatalog::from_types([ty.clone()]).unwrap();

        let data = RenderData::new(&py, &context).for_type(&catalog, &ty, &[]);

        assert_eq!(data["T"]["constants"][0]["value"], "True");
        assert_eq!(data["T"]["constants"][0]["type_name"], "bool");
    }

    #[test]
    fn test_service_sections() {
        let c = language(BuiltinLanguage::C);
        let context = GenerationContext::new(&c, &GenerateOptions::default());
        let request = TypeKey::new("a.Get.Request", v1());
        let response = TypeKey::new("a.Get.Response", v1());
        let service = CompositeType::service("a.Get", v1(), request.clone(), response);
        let catalog = TypeCatalog::from_types([
            service.clone(),
            CompositeType::structure("a.Get.Request", v1()).with_attribute(Attribute::field(
                "id",
                DataType::Primitive(PrimitiveType::UnsignedInteger { bits: 16 }),
            )),
        ])
        .unwrap();

        let data = RenderData::new(&c, &context).for_type(&catalog, &service, &[]);

        assert_eq!(data["T"]["is_service"], true);
        assert_eq!(data["T"]["request"]["type_name"], "a_Get_Request_1_0");
        assert_eq!(data["T"]["request"]["fields"][0]["type_name"], "uint16_t");
        assert_eq!(data["T"]["response"]["fields"], json!([]));
    }
}
