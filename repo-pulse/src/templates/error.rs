//! Template error types.

use thiserror::Error;

/// Errors that can occur while rendering a pull request template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Handlebars rendering error.
    #[error("Template rendering failed: {0}")]
    Render(#[from] handlebars::RenderError),
}
