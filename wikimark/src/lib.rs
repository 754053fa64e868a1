//! Expose the wikimark CLI internals for integration tests. Embedders should
//! depend on `wikimark-markup` and `wikimark-config` directly.
pub mod cli;
pub mod commands;
