//! The navigable action tree
//!
//! Categories mirror the registered qualified paths; leaves wrap exactly
//! one descriptor. A node is one or the other, never both. Sibling order is
//! registration order: a category sits where its first descendant was
//! registered.

use std::sync::Arc;

use tracing::warn;

use crate::descriptor::{ActionDescriptor, Enablement};

/// One node in the tree.
#[derive(Debug)]
pub enum ActionNode<C: Send> {
    Category(Category<C>),
    Leaf(Arc<ActionDescriptor<C>>),
}

/// A grouping node with no behavior of its own.
#[derive(Debug)]
pub struct Category<C: Send> {
    name: String,
    children: Vec<ActionNode<C>>,
}

impl<C: Send> Category<C> {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn children(&self) -> &[ActionNode<C>] {
        &self.children
    }

    pub(crate) fn push(&mut self, node: ActionNode<C>) {
        self.children.push(node);
    }

    /// Mutable handle to the child category `name`, created in place at the
    /// end of the sibling list if absent.
    pub(crate) fn child_category_mut(&mut self, name: &str) -> &mut Category<C> {
        let index = self
            .children
            .iter()
            .position(|node| matches!(node, ActionNode::Category(cat) if cat.name == name));
        let index = match index {
            Some(index) => index,
            None => {
                self.children.push(ActionNode::Category(Category::new(name)));
                self.children.len() - 1
            }
        };
        match &mut self.children[index] {
            ActionNode::Category(category) => category,
            ActionNode::Leaf(_) => unreachable!("position() only matches categories"),
        }
    }
}

/// A record of one enablement probe that failed.
///
/// The leaf in question is treated as disabled; evaluation of its siblings
/// continues regardless.
#[derive(Debug, Clone)]
pub struct EnablementDiagnostic {
    pub qualified_path: Vec<String>,
    pub display_name: String,
    pub message: String,
}

/// The built, read-only action tree.
#[derive(Debug)]
pub struct ActionTree<C: Send> {
    root: Category<C>,
}

impl<C: Send> ActionTree<C> {
    pub(crate) fn from_root(root: Category<C>) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Category<C> {
        &self.root
    }

    pub fn is_empty(&self) -> bool {
        self.root.children.is_empty()
    }

    /// All descriptors in depth-first registration order.
    pub fn actions(&self) -> Vec<&Arc<ActionDescriptor<C>>> {
        fn collect<'a, C: Send>(
            category: &'a Category<C>,
            out: &mut Vec<&'a Arc<ActionDescriptor<C>>>,
        ) {
            for child in &category.children {
                match child {
                    ActionNode::Category(sub) => collect(sub, out),
                    ActionNode::Leaf(descriptor) => out.push(descriptor),
                }
            }
        }
        let mut out = Vec::new();
        collect(&self.root, &mut out);
        out
    }

    /// The same tree filtered down to currently enabled leaves.
    ///
    /// Every leaf's probe is evaluated in isolation: a probe failure
    /// disables that leaf, records a diagnostic, and moves on. Categories
    /// left without any enabled leaf are pruned, so the menu never shows a
    /// dead end.
    pub fn enabled(&self) -> (ActionTree<C>, Vec<EnablementDiagnostic>) {
        let mut diagnostics = Vec::new();
        let root = filter_category(&self.root, &mut diagnostics);
        (
            ActionTree {
                root: root.unwrap_or_else(|| Category::new(self.root.name.clone())),
            },
            diagnostics,
        )
    }
}

fn filter_category<C: Send>(
    category: &Category<C>,
    diagnostics: &mut Vec<EnablementDiagnostic>,
) -> Option<Category<C>> {
    let mut filtered = Category::new(category.name.clone());
    for child in &category.children {
        match child {
            ActionNode::Category(sub) => {
                if let Some(kept) = filter_category(sub, diagnostics) {
                    filtered.push(ActionNode::Category(kept));
                }
            }
            ActionNode::Leaf(descriptor) => {
                if leaf_enabled(descriptor, diagnostics) {
                    filtered.push(ActionNode::Leaf(Arc::clone(descriptor)));
                }
            }
        }
    }
    (!filtered.children.is_empty()).then_some(filtered)
}

fn leaf_enabled<C: Send>(
    descriptor: &ActionDescriptor<C>,
    diagnostics: &mut Vec<EnablementDiagnostic>,
) -> bool {
    match descriptor.enablement() {
        Enablement::Always(enabled) => *enabled,
        Enablement::Dynamic(probe) => match probe() {
            Ok(enabled) => enabled,
            Err(e) => {
                warn!(
                    action = descriptor.display_name(),
                    error = %e,
                    "enablement probe failed, treating action as disabled"
                );
                diagnostics.push(EnablementDiagnostic {
                    qualified_path: descriptor.qualified_path().to_vec(),
                    display_name: descriptor.display_name().to_string(),
                    message: e.to_string(),
                });
                false
            }
        },
    }
}
