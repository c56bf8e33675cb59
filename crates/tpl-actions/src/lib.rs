//! Action registry and menu tree
//!
//! Actions register themselves once at startup with a display name, a
//! category path, and an enablement rule; the builder turns the flat list
//! into a navigable tree of categories. The built tree is a read-only,
//! process-wide snapshot: safe to share across tasks, never rebuilt
//! mid-run.
//!
//! The registry is generic over the context type `C` handed to action
//! bodies. It stores and forwards the context without ever inspecting it;
//! rendering and interaction stay the caller's business.

pub mod descriptor;
pub mod error;
pub mod registry;
pub mod tree;

pub use descriptor::{Action, ActionDescriptor, Enablement};
pub use error::{ActionError, RegistryError, Result};
pub use registry::RegistryBuilder;
pub use tree::{ActionNode, ActionTree, Category, EnablementDiagnostic};
