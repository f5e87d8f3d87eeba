//! Dependency resolution between composite types.

use std::collections::BTreeSet;

use dsdlgen_ir::{
    ArrayCapacity, Attribute, CompositeKind, CompositeType, DataType, PrimitiveType, TypeCatalog,
    TypeKey,
};
use serde::Serialize;
use tracing::warn;

/// Types and language features a set of composite types relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dependencies {
    /// Composite types referenced by attributes.
    pub composite_types: BTreeSet<TypeKey>,
    pub uses_integer: bool,
    pub uses_float: bool,
    pub uses_bool: bool,
    /// A fixed-length array is used.
    pub uses_array: bool,
    pub uses_variable_length_array: bool,
    /// A fixed-length array of primitives is used.
    pub uses_primitive_static_array: bool,
    /// One of the types is a union (which needs an integer tag).
    pub uses_union: bool,
}

/// Computes [`Dependencies`] for composite types.
///
/// References between types are resolved through the catalog, so cyclic
/// references are allowed and each composite is expanded at most once.
#[derive(Debug, Clone, Copy)]
pub struct DependencyResolver<'a> {
    catalog: &'a TypeCatalog,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(catalog: &'a TypeCatalog) -> Self {
        Self { catalog }
    }

    /// Dependencies found in the given types' own attributes.
    pub fn direct(&self, types: &[&CompositeType]) -> Dependencies {
        let mut deps = Dependencies::default();
        self.extract(types.iter().copied(), false, &mut deps);
        deps
    }

    /// Dependencies of the given types and, recursively, of every composite
    /// type they reference.
    pub fn transitive(&self, types: &[&CompositeType]) -> Dependencies {
        let mut deps = Dependencies::default();
        self.extract(types.iter().copied(), true, &mut deps);
        deps
    }

    fn extract<'t>(
        &self,
        types: impl IntoIterator<Item = &'t CompositeType>,
        transitive: bool,
        deps: &mut Dependencies,
    ) {
        for ty in types {
            if ty.is_union() {
                deps.uses_integer = true;
                deps.uses_union = true;
            }
            for attribute in self.attributes_of(ty) {
                self.extract_data_type(&attribute.data_type, transitive, deps);
            }
        }
    }

    /// Services have no attributes of their own; their request and response
    /// attributes stand in for them.
    fn attributes_of<'t>(&'t self, ty: &'t CompositeType) -> Vec<&'t Attribute> {
        match &ty.kind {
            CompositeKind::Service { request, response } => [request, response]
                .into_iter()
                .filter_map(|key| self.lookup(key))
                .flat_map(|t| t.attributes.iter())
                .collect(),
            _ => ty.attributes.iter().collect(),
        }
    }

    fn extract_data_type(&self, data_type: &DataType, transitive: bool, deps: &mut Dependencies) {
        match data_type {
            DataType::Composite(key) => {
                if deps.composite_types.insert(key.clone()) && transitive {
                    if let Some(referenced) = self.lookup(key) {
                        self.extract([referenced], transitive, deps);
                    }
                }
            }
            DataType::Array { element, capacity } => {
                match capacity {
                    ArrayCapacity::Variable(_) => deps.uses_variable_length_array = true,
                    ArrayCapacity::Fixed(_) => {
                        deps.uses_array = true;
                        if element.is_primitive() {
                            deps.uses_primitive_static_array = true;
                        }
                    }
                }
                self.extract_data_type(element, transitive, deps);
            }
            DataType::Primitive(primitive) => match primitive {
                PrimitiveType::SignedInteger { .. } | PrimitiveType::UnsignedInteger { .. } => {
                    deps.uses_integer = true
                }
                PrimitiveType::Float { .. } => deps.uses_float = true,
                PrimitiveType::Boolean => deps.uses_bool = true,
                PrimitiveType::Void { .. } => {}
            },
        }
    }

    fn lookup(&self, key: &TypeKey) -> Option<&'a CompositeType> {
        let found = self.catalog.get(key);
        if found.is_none() {
            warn!(r#type = %key, "referenced type is not in the catalog");
        }
        found
    }
}
