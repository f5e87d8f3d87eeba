//! Include lists for generated type files.

use std::{
    collections::BTreeSet,
    path::{Component, Path, PathBuf},
};

use dsdlgen_ir::{CompositeType, TypeKey};
use tracing::debug;

use crate::{
    dependencies::DependencyResolver,
    language::Language,
    namespace::{NamespaceTree, OutputLayout},
};

/// Computes what a generated type file must include.
///
/// That is the files of the composite types it references directly, the
/// support headers, and whatever the language's include resolver asks for.
/// Entries are quoted and sorted.
#[derive(Debug, Clone)]
pub struct IncludeResolver<'t, 'c> {
    tree: &'t NamespaceTree<'c>,
    layout: &'t OutputLayout,
    language: &'t Language,
    support_headers: Vec<String>,
}

impl<'t, 'c> IncludeResolver<'t, 'c> {
    pub fn new(tree: &'t NamespaceTree<'c>, layout: &'t OutputLayout, language: &'t Language) -> Self {
        Self {
            tree,
            layout,
            language,
            support_headers: Vec::new(),
        }
    }

    /// Support files every type includes, relative to the output directory.
    pub fn with_support_headers(mut self, headers: impl IntoIterator<Item = PathBuf>) -> Self {
        self.support_headers
            .extend(headers.into_iter().map(|h| to_slash(&h)));
        self
    }

    pub fn for_type(&self, ty: &CompositeType) -> Vec<String> {
        let catalog = self.tree.catalog();
        let deps = DependencyResolver::new(catalog).direct(&[ty]);
        let own = ty.key();

        let mut local: BTreeSet<String> = BTreeSet::new();
        for key in &deps.composite_types {
            // Service sections live in their service's file.
            let owner = catalog
                .get(key)
                .and_then(|t| t.parent_service.clone())
                .unwrap_or_else(|| key.clone());
            if owner != own {
                local.insert(self.relative_path(ty.namespace(), &owner));
            }
        }
        local.extend(self.support_headers.iter().cloned());

        let system = self.language.includes(&deps).into_iter().map(|i| format!("<{i}>"));
        let quoted = local.into_iter().map(|path| self.quote(&path));
        let mut includes: Vec<String> = system.chain(quoted).collect();
        includes.sort();
        includes.dedup();
        includes
    }

    fn relative_path(&self, from: &str, key: &TypeKey) -> String {
        let path = match self.tree.find_output_path_for_type(from, key) {
            Ok(path) => path
                .strip_prefix(self.layout.output_dir())
                .unwrap_or(path)
                .to_path_buf(),
            Err(_) => {
                debug!(r#type = %key, "type is not generated in this run, assuming standard layout");
                self.layout.relative_type_path(key)
            }
        };
        to_slash(&path)
    }

    fn quote(&self, path: &str) -> String {
        if self.language.rules().options.prefer_system_includes {
            format!("<{path}>")
        } else {
            format!("\"{path}\"")
        }
    }
}

/// Join path components with `/` regardless of platform.
fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
