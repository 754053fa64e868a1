//! The dialect parser capability.
//!
//! A dialect turns one wiki markup syntax into raw HTML. While converting it
//! reports every link and image it emits to a [`ReferenceVisitor`], in document
//! order, and applies whatever the visitor wrote back into the event.
#[cfg(feature = "markdown")]
pub mod markdown;

#[cfg(feature = "markdown")]
pub use markdown::MarkdownDialect;

use crate::types::{ImageEvent, LinkEvent};

/// Placeholder for the link target inside [`DialectParser::link_start`] and
/// [`DialectParser::link_end`].
pub const URL_PLACEHOLDER: &str = "%URL%";

/// Placeholder for the visible link text.
pub const LINK_TEXT_PLACEHOLDER: &str = "%LINKTEXT%";

/// Receives links and images as a dialect discovers them.
///
/// Methods take `&self` so that a single visitor can be shared by concurrent
/// renders; visitors that need to record state use interior mutability.
pub trait ReferenceVisitor {
  fn visit_link(&self, link: &mut LinkEvent);

  fn visit_image(&self, image: &mut ImageEvent);
}

/// Visitor that leaves every reference untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopVisitor;

impl ReferenceVisitor for NoopVisitor {
  fn visit_link(&self, _link: &mut LinkEvent) {}

  fn visit_image(&self, _image: &mut ImageEvent) {}
}

/// A wiki markup dialect.
pub trait DialectParser: Send + Sync {
  /// Convert markup to HTML, reporting links and images to `visitor` before
  /// returning.
  fn transform(&self, text: &str, visitor: &dyn ReferenceVisitor) -> String;

  /// Opening part of the dialect's link syntax, with [`URL_PLACEHOLDER`] and
  /// [`LINK_TEXT_PLACEHOLDER`] where the target and text go.
  fn link_start(&self) -> &str;

  /// Closing part of the dialect's link syntax.
  fn link_end(&self) -> &str;

  /// Link form without visible text, where the target doubles as the text,
  /// with [`URL_PLACEHOLDER`] where the target goes.
  fn bare_link(&self) -> Option<&str> {
    None
  }

  /// Short dialect name for logs.
  fn name(&self) -> &str {
    "custom"
  }
}
