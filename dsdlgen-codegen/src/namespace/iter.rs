//! Depth-first traversal of a [`NamespaceTree`].

use std::{collections::VecDeque, path::Path};

use dsdlgen_ir::CompositeType;

use super::{Namespace, NamespaceTree};

/// Something a file is generated for.
#[derive(Debug, Clone, Copy)]
pub enum Entity<'t> {
    Type(&'t CompositeType),
    Namespace(&'t Namespace),
}

impl<'t> Entity<'t> {
    pub fn full_name(&self) -> &'t str {
        match *self {
            Entity::Type(ty) => &ty.full_name,
            Entity::Namespace(ns) => ns.full_name(),
        }
    }

    pub fn as_type(&self) -> Option<&'t CompositeType> {
        match *self {
            Entity::Type(ty) => Some(ty),
            Entity::Namespace(_) => None,
        }
    }

    pub fn as_namespace(&self) -> Option<&'t Namespace> {
        match *self {
            Entity::Namespace(ns) => Some(ns),
            Entity::Type(_) => None,
        }
    }

    /// Full name of the namespace the entity's file belongs to.
    pub fn owning_namespace(&self) -> &'t str {
        match *self {
            Entity::Type(ty) => ty.namespace(),
            Entity::Namespace(ns) => ns.full_name(),
        }
    }
}

/// Lazy depth-first iterator over entities and their output paths.
///
/// Each namespace is visited before its own types, and its types before
/// its children. Children are visited in name order.
#[derive(Debug)]
pub struct EntityIter<'t, 'c> {
    tree: &'t NamespaceTree<'c>,
    include_types: bool,
    include_namespaces: bool,
    stack: Vec<&'t Namespace>,
    pending: VecDeque<(Entity<'t>, &'t Path)>,
}

impl<'t, 'c> EntityIter<'t, 'c> {
    pub(super) fn new(
        tree: &'t NamespaceTree<'c>,
        include_types: bool,
        include_namespaces: bool,
    ) -> Self {
        Self {
            tree,
            include_types,
            include_namespaces,
            stack: vec![tree.root()],
            pending: VecDeque::new(),
        }
    }

    fn expand(&mut self, namespace: &'t Namespace) {
        let tree = self.tree;
        if self.include_namespaces {
            self.pending
                .push_back((Entity::Namespace(namespace), namespace.output_path()));
        }
        if self.include_types {
            let catalog = tree.catalog();
            for (key, path) in namespace.types() {
                if let Some(ty) = catalog.get(key) {
                    self.pending.push_back((Entity::Type(ty), path));
                }
            }
        }
        let children: Vec<&'t Namespace> = namespace
            .children()
            .filter_map(|name| tree.get(name))
            .collect();
        self.stack.extend(children.into_iter().rev());
    }
}

impl<'t, 'c> Iterator for EntityIter<'t, 'c> {
    type Item = (Entity<'t>, &'t Path);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.pending.pop_front() {
                return Some(item);
            }
            let namespace = self.stack.pop()?;
            self.expand(namespace);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use dsdlgen_ir::{TypeCatalog, Version};
    use dsdlgen_lang::BuiltinLanguage;
    use tempfile::TempDir;

    use super::*;
    use crate::{namespace::OutputLayout, naming::IdentifierEncoder};

    struct Fixture {
        temp: TempDir,
        catalog: TypeCatalog,
    }

    impl Fixture {
        fn new() -> Self {
            let temp = TempDir::new().unwrap();
            for dir in ["a/b", "a/c"] {
                fs::create_dir_all(temp.path().join(dir)).unwrap();
            }
            let catalog = TypeCatalog::from_types(
                ["a.c.Z", "a.b.Y", "a.X", "a.b.W"]
                    .into_iter()
                    .map(|n| CompositeType::structure(n, Version::new(1, 0))),
            )
            .unwrap();
            Self { temp, catalog }
        }

        fn tree(&self) -> NamespaceTree<'_> {
            let rules = BuiltinLanguage::C.rules().unwrap();
            let layout = OutputLayout::new(
                self.temp.path().join("out"),
                &rules,
                IdentifierEncoder::for_language(&rules).unwrap(),
            );
            NamespaceTree::build(&self.catalog, &self.temp.path().join("a"), &layout).unwrap()
        }
    }

    #[test]
    fn test_entities_order() {
        let fixture = Fixture::new();
        let tree = fixture.tree();

        let names: Vec<_> = tree.entities().map(|(e, _)| e.full_name()).collect();

        assert_eq!(names, vec!["a", "a.X", "a.b", "a.b.Y", "a.b.W", "a.c", "a.c.Z"]);
    }

    #[test]
    fn test_types_only() {
        let fixture = Fixture::new();
        let tree = fixture.tree();

        let names: Vec<_> = tree.types().map(|(e, _)| e.full_name()).collect();

        assert_eq!(names, vec!["a.X", "a.b.Y", "a.b.W", "a.c.Z"]);
        assert!(tree.types().all(|(e, _)| e.as_type().is_some()));
    }

    #[test]
    fn test_namespaces_only() {
        let fixture = Fixture::new();
        let tree = fixture.tree();

        let names: Vec<_> = tree.namespaces().map(|(e, _)| e.full_name()).collect();

        assert_eq!(names, vec!["a", "a.b", "a.c"]);
    }

    #[test]
    fn test_paths_match_tree() {
        let fixture = Fixture::new();
        let tree = fixture.tree();

        for (entity, path) in tree.entities() {
            match entity {
                Entity::Namespace(ns) => assert_eq!(path, ns.output_path()),
                Entity::Type(ty) => {
                    let expected = tree
                        .find_output_path_for_type(ty.namespace(), &ty.key())
                        .unwrap();
                    assert_eq!(path, expected);
                }
            }
        }
    }

    #[test]
    fn test_owning_namespace() {
        let fixture = Fixture::new();
        let tree = fixture.tree();
        let (entity, _) = tree.types().next().unwrap();
        assert_eq!(entity.owning_namespace(), "a");
    }
}
