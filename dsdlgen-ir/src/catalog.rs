//! Lookup table of every composite type in a generation run.

use indexmap::IndexMap;
use serde::Deserialize;
use thiserror::Error;

use crate::{CompositeType, TypeKey};

/// Errors raised while assembling a catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to parse type list: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("type '{0}' is defined more than once")]
    Duplicate(TypeKey),
}

/// Ordered collection of composite types indexed by [`TypeKey`].
///
/// Insertion order is the order in which the front-end produced the types
/// and is preserved by every traversal built on top of the catalog.
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    types: IndexMap<TypeKey, CompositeType>,
}

#[derive(Deserialize)]
struct TypeList {
    types: Vec<CompositeType>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a list of types, rejecting duplicate keys.
    pub fn from_types(
        types: impl IntoIterator<Item = CompositeType>,
    ) -> Result<Self, CatalogError> {
        let mut catalog = Self::new();
        for ty in types {
            catalog.insert(ty)?;
        }
        Ok(catalog)
    }

    /// Parse a JSON document of the form `{ "types": [ ... ] }`.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let list: TypeList = serde_json::from_str(json)?;
        Self::from_types(list.types)
    }

    /// Add a type.
    pub fn insert(&mut self, ty: CompositeType) -> Result<(), CatalogError> {
        let key = ty.key();
        if self.types.contains_key(&key) {
            return Err(CatalogError::Duplicate(key));
        }
        self.types.insert(key, ty);
        Ok(())
    }

    /// Look up a type by key.
    pub fn get(&self, key: &TypeKey) -> Option<&CompositeType> {
        self.types.get(key)
    }

    pub fn contains(&self, key: &TypeKey) -> bool {
        self.types.contains_key(key)
    }

    /// Iterate over all types in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &CompositeType> {
        self.types.values()
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Version;

    #[test]
    fn test_from_json() {
        let json = r#"{ "types": [
            { "full_name": "a.b.C", "version": { "major": 1, "minor": 0 }, "kind": "structure" },
            { "full_name": "a.D", "version": { "major": 0, "minor": 1 }, "kind": "union" }
        ] }"#;
        let catalog = TypeCatalog::from_json(json).unwrap();

        assert_eq!(catalog.len(), 2);
        let names: Vec<_> = catalog.iter().map(|t| t.full_name.as_str()).collect();
        assert_eq!(names, vec!["a.b.C", "a.D"]);
        assert!(catalog.contains(&TypeKey::new("a.D", Version::new(0, 1))));
    }

    #[test]
    fn test_duplicate_rejected() {
        let ty = CompositeType::structure("a.B", Version::new(1, 0));
        let err = TypeCatalog::from_types([ty.clone(), ty]).unwrap_err();
        assert!(matches!(err, CatalogError::Duplicate(_)));
        assert_eq!(err.to_string(), "type 'a.B.1.0' is defined more than once");
    }

    #[test]
    fn test_versions_are_distinct() {
        let catalog = TypeCatalog::from_types([
            CompositeType::structure("a.B", Version::new(1, 0)),
            CompositeType::structure("a.B", Version::new(1, 1)),
        ])
        .unwrap();
        assert_eq!(catalog.len(), 2);
    }
}
