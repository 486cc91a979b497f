//! Handlebars rendering of option templates.

use handlebars::{Handlebars, Template};
use serde_json::Value;

use super::ConfigError;

/// Returns true if `text` contains a template expression.
#[must_use]
pub fn is_template(text: &str) -> bool {
    text.contains("{{")
}

/// Checks template syntax without rendering.
///
/// # Errors
///
/// Returns the parser message for malformed templates.
pub fn check_template(text: &str) -> Result<(), String> {
    if !is_template(text) {
        return Ok(());
    }
    Template::compile(text).map(|_| ()).map_err(|e| e.to_string())
}

/// Renders option templates against one context document.
///
/// Values are substituted verbatim (no HTML escaping); missing variables
/// render as empty strings.
pub struct Interpolator<'a> {
    registry: Handlebars<'static>,
    context: &'a Value,
}

impl<'a> Interpolator<'a> {
    /// Creates an interpolator for `context`.
    #[must_use]
    pub fn new(context: &'a Value) -> Self {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        Self { registry, context }
    }

    /// Renders `text`, or returns it unchanged if it has no template.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Template`] naming `field` if rendering fails.
    pub fn render(&self, field: &'static str, text: &str) -> Result<String, ConfigError> {
        if !is_template(text) {
            return Ok(text.to_string());
        }
        self.registry
            .render_template(text, self.context)
            .map_err(|e| ConfigError::Template {
                field,
                reason: e.to_string(),
            })
    }
}
