//! Variable substitution for install arguments.

mod engine;

pub use engine::{TemplateContext, TemplateEngine, LOOPBACK_ADDRESS};
