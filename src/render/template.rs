//! Handlebars-backed renderer.

use std::path::Path;

use handlebars::Handlebars;

use crate::model::ConfigModel;
use crate::render::{ConfigRenderer, TemplateError};

/// Built-in HAProxy TCP load-balancing template.
pub const DEFAULT_TEMPLATE: &str = include_str!("../../templates/haproxy.cfg.hbs");

const TEMPLATE_NAME: &str = "lb-config";

/// Renders models through a single registered template.
pub struct HandlebarsRenderer {
    registry: Handlebars<'static>,
}

impl HandlebarsRenderer {
    /// Renderer for the given template source.
    pub fn from_source(source: &str) -> Result<Self, TemplateError> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry.register_escape_fn(handlebars::no_escape);
        registry.register_template_string(TEMPLATE_NAME, source)?;
        Ok(Self { registry })
    }

    /// Renderer for the built-in HAProxy template.
    pub fn builtin() -> Result<Self, TemplateError> {
        Self::from_source(DEFAULT_TEMPLATE)
    }

    /// Renderer for a template file.
    pub fn from_file(path: &Path) -> Result<Self, TemplateError> {
        let source = std::fs::read_to_string(path).map_err(|source| TemplateError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_source(&source)
    }
}

impl ConfigRenderer for HandlebarsRenderer {
    fn render(&self, model: &ConfigModel) -> Result<String, TemplateError> {
        Ok(self.registry.render(TEMPLATE_NAME, model)?)
    }
}
