//! Action descriptors
//!
//! One descriptor per selectable unit of work: menu metadata, an enablement
//! rule, and the body that runs when the user picks it. Descriptors are
//! immutable once registered; the runner only reads them.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::ActionError;

/// The body of an action.
///
/// Implementations own no long-lived state; everything they need at run
/// time comes through the context `C`, which the registry passes along
/// without interpreting it.
#[async_trait]
pub trait Action<C: Send>: Send + Sync {
    async fn run(&self, ctx: &mut C) -> Result<(), ActionError>;
}

/// Whether an action is currently selectable.
///
/// Either a static flag or a side-effect-free probe evaluated at render
/// time. Only these two shapes are legal; a probe that fails reads as
/// "disabled" plus a diagnostic, never as a crash.
#[derive(Clone)]
pub enum Enablement {
    Always(bool),
    Dynamic(Arc<dyn Fn() -> std::io::Result<bool> + Send + Sync>),
}

impl Enablement {
    pub fn always() -> Self {
        Self::Always(true)
    }

    pub fn never() -> Self {
        Self::Always(false)
    }

    pub fn dynamic(probe: impl Fn() -> std::io::Result<bool> + Send + Sync + 'static) -> Self {
        Self::Dynamic(Arc::new(probe))
    }

    pub(crate) fn evaluate(&self) -> std::io::Result<bool> {
        match self {
            Self::Always(enabled) => Ok(*enabled),
            Self::Dynamic(probe) => probe(),
        }
    }
}

impl fmt::Debug for Enablement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always(enabled) => f.debug_tuple("Always").field(enabled).finish(),
            Self::Dynamic(_) => f.write_str("Dynamic(..)"),
        }
    }
}

/// One registered action: menu metadata plus its body.
pub struct ActionDescriptor<C: Send> {
    display_name: String,
    qualified_path: Vec<String>,
    description: String,
    enabled: Enablement,
    body: Arc<dyn Action<C>>,
}

impl<C: Send> ActionDescriptor<C> {
    /// Create a descriptor under the category chain `qualified_path`.
    ///
    /// The path must be non-empty; the builder rejects an empty one at
    /// build time. New descriptors default to always enabled.
    pub fn new(
        qualified_path: impl IntoIterator<Item = impl Into<String>>,
        display_name: impl Into<String>,
        body: impl Action<C> + 'static,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            qualified_path: qualified_path.into_iter().map(Into::into).collect(),
            description: String::new(),
            enabled: Enablement::always(),
            body: Arc::new(body),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_enablement(mut self, enabled: Enablement) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Category breadcrumb, e.g. `["Hardware", "Altium"]`.
    pub fn qualified_path(&self) -> &[String] {
        &self.qualified_path
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub(crate) fn enablement(&self) -> &Enablement {
        &self.enabled
    }

    /// Run the action body.
    pub async fn run(&self, ctx: &mut C) -> Result<(), ActionError> {
        self.body.run(ctx).await
    }
}

impl<C: Send> fmt::Debug for ActionDescriptor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionDescriptor")
            .field("display_name", &self.display_name)
            .field("qualified_path", &self.qualified_path)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}
