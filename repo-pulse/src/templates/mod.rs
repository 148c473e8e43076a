//! Template rendering using Handlebars.
//!
//! Renders the title and description of update-from-default-branch pull
//! requests from the formats in the configuration.

mod error;
mod renderer;

pub use error::TemplateError;
pub use renderer::{create_handlebars_registry, TemplateRenderer, UpdateContext};
