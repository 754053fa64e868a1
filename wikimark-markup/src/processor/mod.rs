//! Render pipeline orchestration.
//!
//! - [`core`]: the pipeline's render, rename and reload operations
//! - [`process`]: the fail-closed error boundary
//! - [`types`]: options, the pipeline struct and its builder
pub mod core;
pub mod process;
pub mod types;

pub use process::{escape_markup, process_safe};
pub use types::{
  DEFAULT_TOKENS_KEY,
  DEFAULT_WHITELIST_KEY,
  MarkupPipeline,
  PipelineBuilder,
  PipelineOptions,
};
