//! Entity kinds and their fallback chain.

use std::fmt;

use dsdlgen_ir::{CompositeKind, CompositeType};

use crate::namespace::Entity;

/// Kind of a generated entity, used to pick its template.
///
/// Each kind names its bases; template lookup walks them breadth-first so a
/// language can override a single kind without forking the whole template
/// set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// Universal root, never used for lookup.
    Any,
    SerializableType,
    CompositeType,
    StructureType,
    UnionType,
    ServiceType,
    Namespace,
}

impl EntityKind {
    /// Every kind, most derived last.
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Any,
        EntityKind::SerializableType,
        EntityKind::CompositeType,
        EntityKind::StructureType,
        EntityKind::UnionType,
        EntityKind::ServiceType,
        EntityKind::Namespace,
    ];

    /// Template stem for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            EntityKind::Any => "Any",
            EntityKind::SerializableType => "SerializableType",
            EntityKind::CompositeType => "CompositeType",
            EntityKind::StructureType => "StructureType",
            EntityKind::UnionType => "UnionType",
            EntityKind::ServiceType => "ServiceType",
            EntityKind::Namespace => "Namespace",
        }
    }

    /// Direct bases.
    pub fn bases(&self) -> &'static [EntityKind] {
        match self {
            EntityKind::Any => &[],
            EntityKind::SerializableType | EntityKind::Namespace => &[EntityKind::Any],
            EntityKind::CompositeType => &[EntityKind::SerializableType],
            EntityKind::StructureType | EntityKind::UnionType | EntityKind::ServiceType => {
                &[EntityKind::CompositeType]
            }
        }
    }

    /// Lookup order: the kind itself, then its bases breadth-first, without
    /// the universal root.
    pub fn search_order(&self) -> Vec<EntityKind> {
        let mut order = vec![*self];
        let mut next = 0;
        while next < order.len() {
            let bases = order[next].bases();
            for base in bases {
                if !order.contains(base) {
                    order.push(*base);
                }
            }
            next += 1;
        }
        order.retain(|kind| *kind != EntityKind::Any);
        order
    }

    pub fn of_type(ty: &CompositeType) -> Self {
        match ty.kind {
            CompositeKind::Structure => EntityKind::StructureType,
            CompositeKind::Union => EntityKind::UnionType,
            CompositeKind::Service { .. } => EntityKind::ServiceType,
        }
    }

    pub fn of_entity(entity: &Entity<'_>) -> Self {
        match entity {
            Entity::Type(ty) => Self::of_type(ty),
            Entity::Namespace(_) => EntityKind::Namespace,
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use dsdlgen_ir::{TypeKey, Version};

    use super::*;

    #[test]
    fn test_structure_search_order() {
        assert_eq!(
            EntityKind::StructureType.search_order(),
            vec![
                EntityKind::StructureType,
                EntityKind::CompositeType,
                EntityKind::SerializableType
            ]
        );
    }

    #[test]
    fn test_namespace_search_order() {
        assert_eq!(EntityKind::Namespace.search_order(), vec![EntityKind::Namespace]);
        assert!(EntityKind::Any.search_order().is_empty());
    }

    #[test]
    fn test_of_type() {
        let v = Version::new(1, 0);
        assert_eq!(
            EntityKind::of_type(&CompositeType::union("a.U", v)),
            EntityKind::UnionType
        );
        let service = CompositeType::service(
            "a.S",
            v,
            TypeKey::new("a.S.Request", v),
            TypeKey::new("a.S.Response", v),
        );
        assert_eq!(EntityKind::of_type(&service), EntityKind::ServiceType);
    }
}
