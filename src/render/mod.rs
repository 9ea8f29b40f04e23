//! Configuration rendering subsystem.
//!
//! # Data Flow
//! ```text
//! ConfigModel (serialized to JSON-like data)
//!     → template.rs (handlebars, strict mode)
//!     → configuration text for the load balancer
//! ```
//!
//! # Design Decisions
//! - Rendering is a pure function of the model: same model, same bytes
//! - Strict mode turns a missing field into an error instead of blank output
//! - No HTML escaping; output is a plain config file

use std::path::PathBuf;

use thiserror::Error;

use crate::model::ConfigModel;

pub mod template;

pub use template::HandlebarsRenderer;

/// Turns a model into load-balancer configuration text.
pub trait ConfigRenderer: Send + Sync {
    fn render(&self, model: &ConfigModel) -> Result<String, TemplateError>;
}

/// Errors raised while loading or rendering a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("could not read template {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid template: {0}")]
    Register(#[from] handlebars::TemplateError),

    #[error("template rendering failed: {0}")]
    Render(#[from] handlebars::RenderError),
}
