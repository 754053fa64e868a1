//! Text plugins wrapped around dialect parsing.
//!
//! A plugin sees the raw markup before the dialect parser runs and the HTML
//! after it. Plugins run in registration order, each one receiving the output
//! of the previous one. A plugin that fails, by returning an error or by
//! panicking, is skipped for that step and the rest of the chain carries on.
//!
//! Plugins that need a piece of output to survive the dialect parser and the
//! sanitizer untouched wrap it with [`protect`].
pub mod builtin;
pub mod protect;

use std::{
  fmt,
  panic::{AssertUnwindSafe, catch_unwind},
  sync::Arc,
};

use log::{debug, warn};

pub use self::{
  builtin::{ExternalLinksPlugin, NoWikiPlugin},
  protect::{PROTECT_END, PROTECT_START, ProtectedRegions, protect, strip_sentinels},
};
use crate::{error::PluginError, utils::panic_message};

/// An extension hooking into the render pipeline.
///
/// Plugins are shared by concurrent renders; any internal state needs its own
/// synchronization.
pub trait TextPlugin: Send + Sync {
  /// Stable, unique identifier.
  fn id(&self) -> &str;

  /// Disabled plugins are skipped without being called.
  fn is_enabled(&self) -> bool {
    true
  }

  /// Transform raw markup before it reaches the dialect parser.
  ///
  /// # Errors
  ///
  /// An error skips this plugin's step; the input passes through unchanged.
  fn before_parse(&self, text: &str) -> Result<String, PluginError> {
    Ok(text.to_string())
  }

  /// Transform HTML produced by the dialect parser, before sanitization.
  ///
  /// # Errors
  ///
  /// An error skips this plugin's step; the input passes through unchanged.
  fn after_parse(&self, html: &str) -> Result<String, PluginError> {
    Ok(html.to_string())
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
  BeforeParse,
  AfterParse,
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::BeforeParse => f.write_str("before_parse"),
      Self::AfterParse => f.write_str("after_parse"),
    }
  }
}

/// Ordered, enabled-aware list of plugins.
#[derive(Clone, Default)]
pub struct PluginChain {
  plugins: Vec<Arc<dyn TextPlugin>>,
}

impl fmt::Debug for PluginChain {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.ids()).finish()
  }
}

impl PluginChain {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Append a plugin to the chain.
  ///
  /// # Errors
  ///
  /// Returns [`PluginError::DuplicateId`] if a plugin with the same id is
  /// already registered.
  pub fn register<P>(&mut self, plugin: P) -> Result<(), PluginError>
  where
    P: TextPlugin + 'static,
  {
    self.register_shared(Arc::new(plugin))
  }

  /// Append a shared plugin to the chain.
  ///
  /// # Errors
  ///
  /// Returns [`PluginError::DuplicateId`] if a plugin with the same id is
  /// already registered.
  pub fn register_shared(
    &mut self,
    plugin: Arc<dyn TextPlugin>,
  ) -> Result<(), PluginError> {
    if self.plugins.iter().any(|p| p.id() == plugin.id()) {
      return Err(PluginError::DuplicateId(plugin.id().to_string()));
    }
    debug!("Registered plugin '{}'", plugin.id());
    self.plugins.push(plugin);
    Ok(())
  }

  /// Registered plugin ids, in order.
  pub fn ids(&self) -> impl Iterator<Item = &str> {
    self.plugins.iter().map(|p| p.id())
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.plugins.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.plugins.is_empty()
  }

  /// Fold `before_parse` over the enabled plugins.
  #[must_use]
  pub fn run_before(&self, text: &str) -> String {
    self.fold(text, Stage::BeforeParse)
  }

  /// Fold `after_parse` over the enabled plugins.
  #[must_use]
  pub fn run_after(&self, html: &str) -> String {
    self.fold(html, Stage::AfterParse)
  }

  fn fold(&self, input: &str, stage: Stage) -> String {
    let mut current = input.to_string();
    for plugin in self.plugins.iter().filter(|p| p.is_enabled()) {
      if let Some(output) = run_isolated(plugin.as_ref(), stage, &current) {
        current = output;
      }
    }
    current
  }
}

/// Run one hook, turning errors and panics into a skipped step.
fn run_isolated(
  plugin: &dyn TextPlugin,
  stage: Stage,
  input: &str,
) -> Option<String> {
  let result = catch_unwind(AssertUnwindSafe(|| {
    match stage {
      Stage::BeforeParse => plugin.before_parse(input),
      Stage::AfterParse => plugin.after_parse(input),
    }
  }));

  match result {
    Ok(Ok(output)) => Some(output),
    Ok(Err(e)) => {
      warn!("{e}; skipping its {stage} step");
      None
    },
    Err(payload) => {
      warn!(
        "Plugin '{}' panicked in {stage}: {}; skipping its step",
        plugin.id(),
        panic_message(&*payload)
      );
      None
    },
  }
}
