//! Namespace tree construction and lookup.
//!
//! - [`NamespaceTree`] - arena of [`Namespace`] nodes keyed by full name
//! - [`OutputLayout`] - output file naming
//! - [`Entity`] - a type or namespace yielded by the depth-first iterators

mod iter;
mod layout;

use std::{
    collections::{BTreeSet, VecDeque},
    path::{Path, PathBuf},
};

use dsdlgen_ir::{TypeCatalog, TypeKey};
use indexmap::{IndexMap, map::Entry};
use tracing::debug;

pub use iter::{Entity, EntityIter};
pub use layout::OutputLayout;

use crate::{Error, Result};

/// A node in the namespace tree.
///
/// Links to the parent and children are full names resolved through the
/// owning [`NamespaceTree`].
#[derive(Debug, Clone)]
pub struct Namespace {
    full_name: String,
    encoded_name: String,
    source_dir: PathBuf,
    output_folder: PathBuf,
    output_path: PathBuf,
    parent: Option<String>,
    children: BTreeSet<String>,
    types: IndexMap<TypeKey, PathBuf>,
}

impl Namespace {
    /// Full dotted name, e.g. `uavcan.node`.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Last component of the name.
    pub fn short_name(&self) -> &str {
        self.full_name
            .rsplit_once('.')
            .map(|(_, short)| short)
            .unwrap_or(&self.full_name)
    }

    /// Name components.
    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.full_name.split('.')
    }

    /// Full name with every component encoded for the target language.
    pub fn encoded_name(&self) -> &str {
        &self.encoded_name
    }

    /// Directory holding this namespace's definitions.
    pub fn source_dir(&self) -> &Path {
        &self.source_dir
    }

    /// Directory this namespace's files are generated into.
    pub fn output_folder(&self) -> &Path {
        &self.output_folder
    }

    /// Path of the namespace file.
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Full name of the parent, `None` for the root.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Full names of the nested namespaces, sorted.
    pub fn children(&self) -> impl Iterator<Item = &str> {
        self.children.iter().map(String::as_str)
    }

    /// Types placed directly in this namespace and their output paths.
    pub fn types(&self) -> impl Iterator<Item = (&TypeKey, &Path)> {
        self.types.iter().map(|(key, path)| (key, path.as_path()))
    }

    /// Output path of a type placed directly in this namespace.
    pub fn output_path_for(&self, key: &TypeKey) -> Option<&Path> {
        self.types.get(key).map(PathBuf::as_path)
    }
}

/// The namespace hierarchy of one generation run.
///
/// Built once from the type catalog and immutable afterwards. Only types
/// below the root namespace are placed; anything else in the catalog is a
/// lookup dependency and is left out. Service requests and responses are
/// emitted inside their service's file and get no entry of their own.
#[derive(Debug, Clone)]
pub struct NamespaceTree<'c> {
    catalog: &'c TypeCatalog,
    nodes: IndexMap<String, Namespace>,
    root: String,
}

impl<'c> NamespaceTree<'c> {
    /// Build the tree for the namespace rooted at `root_namespace_dir`.
    ///
    /// The root namespace is named after the directory. Every namespace,
    /// including empty intermediate ones, must have a matching directory
    /// below the root's parent.
    pub fn build(
        catalog: &'c TypeCatalog,
        root_namespace_dir: &Path,
        layout: &OutputLayout,
    ) -> Result<Self> {
        let root = root_namespace_dir
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                Error::Configuration(format!(
                    "cannot derive a root namespace name from {}",
                    root_namespace_dir.display()
                ))
            })?
            .to_string();

        let mut builder = TreeBuilder {
            nodes: IndexMap::new(),
            source_root: root_namespace_dir
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
            layout,
        };
        builder.get_or_create(&root)?;

        for ty in catalog.iter() {
            let namespace = ty.namespace();
            if !is_within(namespace, &root) {
                debug!(r#type = %ty.full_name, root = %root, "type is outside the root namespace, not generating");
                continue;
            }
            if let Some(service) = &ty.parent_service {
                debug!(r#type = %ty.full_name, service = %service, "service section is generated with its service");
                continue;
            }
            let path = layout.output_dir().join(layout.relative_type_path(&ty.key()));
            let node = builder.get_or_create(namespace)?;
            if node.types.insert(ty.key(), path).is_some() {
                return Err(Error::Configuration(format!(
                    "type '{}' was placed twice",
                    ty.key()
                )));
            }
        }

        // Materialize empty intermediate namespaces.
        let placed: Vec<String> = builder.nodes.keys().cloned().collect();
        for name in &placed {
            let mut ancestor = parent_name(name);
            while let Some(current) = ancestor {
                if builder.nodes.contains_key(current) {
                    break;
                }
                builder.get_or_create(current)?;
                ancestor = parent_name(current);
            }
        }

        let names: Vec<String> = builder.nodes.keys().cloned().collect();
        for name in &names {
            if let Some(parent) = parent_name(name) {
                builder.get_or_create(parent)?.children.insert(name.clone());
                if let Some(node) = builder.nodes.get_mut(name) {
                    node.parent = Some(parent.to_string());
                }
            }
        }

        Ok(Self {
            catalog,
            nodes: builder.nodes,
            root,
        })
    }

    /// The type catalog the tree was built from.
    pub fn catalog(&self) -> &'c TypeCatalog {
        self.catalog
    }

    /// The root namespace.
    pub fn root(&self) -> &Namespace {
        &self.nodes[self.root.as_str()]
    }

    /// Look up a namespace by full name.
    pub fn get(&self, full_name: &str) -> Option<&Namespace> {
        self.nodes.get(full_name)
    }

    /// Number of namespaces in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Full names of every namespace, in creation order.
    pub fn namespace_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(String::as_str)
    }

    /// Walk parent links from `full_name` up to the root.
    pub fn root_of(&self, full_name: &str) -> Option<&Namespace> {
        let mut current = self.nodes.get(full_name)?;
        while let Some(parent) = current.parent() {
            current = self.nodes.get(parent)?;
        }
        Some(current)
    }

    /// Find the output path of a type, searching `from` first.
    ///
    /// On a miss the whole tree is searched breadth-first from the root
    /// (skipping `from`) and the first namespace that owns the type wins.
    /// A type's namespace is derived from its name, so at most one
    /// namespace can own it.
    pub fn find_output_path_for_type(&self, from: &str, key: &TypeKey) -> Result<&Path> {
        if let Some(path) = self.nodes.get(from).and_then(|ns| ns.output_path_for(key)) {
            return Ok(path);
        }

        let start = self.root_of(from).unwrap_or_else(|| self.root());
        let mut queue: VecDeque<&Namespace> = VecDeque::from([start]);
        while let Some(namespace) = queue.pop_front() {
            if namespace.full_name() != from {
                if let Some(path) = namespace.output_path_for(key) {
                    return Ok(path);
                }
            }
            queue.extend(namespace.children().filter_map(|c| self.nodes.get(c)));
        }

        Err(Error::TypeNotFound(key.to_string()))
    }

    /// All types, depth-first: a namespace's types before its children.
    pub fn types(&self) -> EntityIter<'_, 'c> {
        EntityIter::new(self, true, false)
    }

    /// All namespaces, depth-first pre-order.
    pub fn namespaces(&self) -> EntityIter<'_, 'c> {
        EntityIter::new(self, false, true)
    }

    /// Namespaces and types, depth-first: each namespace, then its types,
    /// then its children.
    pub fn entities(&self) -> EntityIter<'_, 'c> {
        EntityIter::new(self, true, true)
    }
}

struct TreeBuilder<'l> {
    nodes: IndexMap<String, Namespace>,
    source_root: PathBuf,
    layout: &'l OutputLayout,
}

impl TreeBuilder<'_> {
    /// Read-through cache of namespaces keyed by full name.
    fn get_or_create(&mut self, full_name: &str) -> Result<&mut Namespace> {
        match self.nodes.entry(full_name.to_string()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let namespace = create_namespace(&self.source_root, self.layout, full_name)?;
                Ok(entry.insert(namespace))
            }
        }
    }
}

fn create_namespace(source_root: &Path, layout: &OutputLayout, full_name: &str) -> Result<Namespace> {
    let source_dir: PathBuf = std::iter::once(source_root.to_path_buf())
        .chain(full_name.split('.').map(PathBuf::from))
        .collect();
    if !source_dir.is_dir() {
        return Err(Error::SourceNotFound {
            namespace: full_name.to_string(),
            path: source_dir,
        });
    }

    let relative = layout.relative_folder(full_name.split('.'));
    let encoded_name = full_name
        .split('.')
        .map(|c| layout.encoder().encode(c))
        .collect::<Vec<_>>()
        .join(".");
    let output_folder = layout.output_dir().join(relative);
    let output_path = output_folder.join(layout.namespace_file_name());

    debug!(namespace = full_name, source = %source_dir.display(), "creating namespace");
    Ok(Namespace {
        full_name: full_name.to_string(),
        encoded_name,
        source_dir,
        output_folder,
        output_path,
        parent: None,
        children: BTreeSet::new(),
        types: IndexMap::new(),
    })
}

fn parent_name(full_name: &str) -> Option<&str> {
    full_name.rsplit_once('.').map(|(parent, _)| parent)
}

fn is_within(namespace: &str, root: &str) -> bool {
    namespace == root
        || namespace
            .strip_prefix(root)
            .is_some_and(|rest| rest.starts_with('.'))
}
