// Layout engine for exported documents.
// Implements: font metrics, greedy word wrap, page cursor with overflow checks.
// Layout is CPU-bound; the HTTP layer runs it inside tokio::task::spawn_blocking.

pub mod cursor;
pub mod font_metrics;
pub mod wrap;

// Re-export the public API consumed by the export renderers.
pub use cursor::{DocumentBuilder, LaidOutDocument, PageGeometry, TextStyle};
pub use wrap::wrap_text;
