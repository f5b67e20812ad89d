//! Renderer module with trait-based format dispatch.

pub mod json;
pub mod preamble;
pub mod python;

use crate::error::RenderError;
use crate::model::Bindings;

/// Trait for rendering a binding model into a specific output format.
pub trait Renderer {
    fn render(&self, bindings: &Bindings) -> Result<String, RenderError>;
    fn file_extension(&self) -> &str;
}

/// Settings shared by every renderer.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Fully expanded loader preamble.
    pub preamble: String,
    /// Name of the native library handle in generated code.
    pub handle: String,
}

/// Create a renderer for the given format name.
pub fn create_renderer(
    format: &str,
    options: RenderOptions,
) -> Result<Box<dyn Renderer>, RenderError> {
    match format {
        "python" | "py" => Ok(Box::new(python::PythonRenderer::new(
            options.preamble,
            options.handle,
        ))),
        "json" => Ok(Box::new(json::JsonRenderer::new(options.handle))),
        _ => Err(RenderError::UnknownFormat(format.to_string())),
    }
}
