//! Registry construction
//!
//! Actions are registered explicitly at startup into an append-only list;
//! `build` turns the list into the tree exactly once. There is no rebuild:
//! a registry goes from unbuilt to built and the tree lives for the rest of
//! the process.

use std::collections::HashSet;

use tracing::debug;

use crate::descriptor::ActionDescriptor;
use crate::error::{RegistryError, Result};
use crate::tree::{ActionNode, ActionTree, Category};

/// Collects registrations and assembles the action tree.
pub struct RegistryBuilder<C: Send> {
    descriptors: Vec<ActionDescriptor<C>>,
}

impl<C: Send> RegistryBuilder<C> {
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }

    /// Append one descriptor.
    ///
    /// Order matters: sibling order in the built tree is registration
    /// order. Collisions are reported by `build`, not here, so a bad
    /// registration cannot be half-applied.
    pub fn register(&mut self, descriptor: ActionDescriptor<C>) {
        debug!(
            action = descriptor.display_name(),
            path = ?descriptor.qualified_path(),
            "registered action"
        );
        self.descriptors.push(descriptor);
    }

    /// Assemble the tree, consuming the builder.
    ///
    /// Fails on the first duplicate `(qualified_path, display_name)` pair
    /// or empty category path; a failed build yields no tree at all.
    pub fn build(self) -> Result<ActionTree<C>> {
        let mut seen = HashSet::new();
        for descriptor in &self.descriptors {
            if descriptor.qualified_path().is_empty() {
                return Err(RegistryError::EmptyCategoryPath {
                    name: descriptor.display_name().to_string(),
                });
            }
            let key = (
                descriptor.qualified_path().join("/"),
                descriptor.display_name().to_string(),
            );
            if !seen.insert(key) {
                return Err(RegistryError::DuplicateAction {
                    path: descriptor.qualified_path().join("/"),
                    name: descriptor.display_name().to_string(),
                });
            }
        }

        let mut root = Category::new("");
        for descriptor in self.descriptors {
            let category = descriptor
                .qualified_path()
                .to_vec()
                .iter()
                .fold(&mut root, |node, segment| node.child_category_mut(segment));
            category.push(ActionNode::Leaf(std::sync::Arc::new(descriptor)));
        }
        Ok(ActionTree::from_root(root))
    }
}

impl<C: Send> Default for RegistryBuilder<C> {
    fn default() -> Self {
        Self::new()
    }
}
