// PDF encoding of laid-out documents. Layout decisions are made upstream in
// `layout`; this module only serializes them.

pub mod pdf;

pub use pdf::{encode, RenderError};
