//! Tera template engine wrapper.
//!
//! Renders install argument values as one-off templates with the cluster
//! addresses bound as variables. Names the context does not define render
//! as empty strings, the way Jinja2 treats undefined variables.

use std::error::Error as _;

use serde::{Deserialize, Serialize};
use tera::{Context, Tera};
use tracing::debug;

use crate::error::{ConfigErrorKind, SvcmError, SvcmResult};

/// Address used for any cluster variable the configuration leaves unset.
pub const LOOPBACK_ADDRESS: &str = "127.0.0.1";

/// Substitution variables available to install argument templates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateContext {
    /// Address of the cluster master node.
    pub master_ip: String,
    /// Address of this agent node.
    pub local_ip: String,
}

impl TemplateContext {
    /// Build a context from optional cluster addresses.
    pub fn new(master_ip: Option<&str>, local_ip: Option<&str>) -> Self {
        Self {
            master_ip: master_ip.unwrap_or(LOOPBACK_ADDRESS).to_string(),
            local_ip: local_ip.unwrap_or(LOOPBACK_ADDRESS).to_string(),
        }
    }
}

impl Default for TemplateContext {
    fn default() -> Self {
        Self::new(None, None)
    }
}

/// Upper bound on undefined names bound per value.
const MAX_UNDEFINED: usize = 32;

/// Template engine for rendering install argument values.
#[derive(Clone)]
pub struct TemplateEngine {
    context: Context,
}

impl TemplateEngine {
    /// Create an engine bound to the given substitution variables.
    pub fn new(vars: &TemplateContext) -> SvcmResult<Self> {
        let context = Context::from_serialize(vars).map_err(|e| SvcmError::Config {
            kind: ConfigErrorKind::Substitution {
                message: format!("Invalid template context: {}", describe(&e)),
            },
        })?;

        Ok(Self { context })
    }

    /// Render a single raw value.
    ///
    /// A value without template syntax renders unchanged. Malformed syntax
    /// is an error; an undefined variable renders as an empty string.
    pub fn render(&self, raw: &str) -> SvcmResult<String> {
        let mut context = self.context.clone();

        for _ in 0..=MAX_UNDEFINED {
            match Tera::one_off(raw, &context, false) {
                Ok(rendered) => return Ok(rendered),
                Err(e) => match undefined_variable(&e) {
                    Some(name) if !context.contains_key(&name) => {
                        debug!(value = raw, variable = %name, "Undefined template variable");
                        context.insert(name, "");
                    }
                    _ => return Err(substitution_error(raw, &e)),
                },
            }
        }

        Err(SvcmError::Config {
            kind: ConfigErrorKind::Substitution {
                message: format!("'{}': too many undefined variables", raw),
            },
        })
    }

    /// Render every value, preserving order.
    pub fn render_all<S: AsRef<str>>(&self, raw: &[S]) -> SvcmResult<Vec<String>> {
        let rendered = raw
            .iter()
            .map(|value| self.render(value.as_ref()))
            .collect::<SvcmResult<Vec<_>>>()?;

        debug!(count = rendered.len(), "Template values rendered");
        Ok(rendered)
    }
}

fn substitution_error(raw: &str, err: &tera::Error) -> SvcmError {
    SvcmError::Config {
        kind: ConfigErrorKind::Substitution {
            message: format!("'{}': {}", raw, describe(err)),
        },
    }
}

/// Plain variable name from a Tera "not found in context" error.
///
/// Dotted or indexed lookups are not reported, so attribute access on an
/// undefined name stays an error.
fn undefined_variable(err: &tera::Error) -> Option<String> {
    let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(cause) = current {
        let message = cause.to_string();
        if let Some(rest) = message.strip_prefix("Variable `") {
            if let Some((name, tail)) = rest.split_once('`') {
                let plain = !name.is_empty()
                    && !name.starts_with(|c: char| c.is_ascii_digit())
                    && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
                if plain && tail.starts_with(" not found in context") {
                    return Some(name.to_string());
                }
            }
        }
        current = cause.source();
    }
    None
}

/// Tera nests the useful part of its messages in the source chain.
fn describe(err: &tera::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
