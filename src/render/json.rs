//! JSON renderer: structured output for tooling integration.
//!
//! Serializes the binding model as a manifest: the export table plus every
//! definition, palette entry and function signature, with types rendered as
//! their ctypes expressions.

use serde::Serialize;

use crate::error::RenderError;
use crate::model::*;
use crate::render::Renderer;

pub struct JsonRenderer {
    handle: String,
}

impl JsonRenderer {
    pub fn new(handle: impl Into<String>) -> Self {
        Self {
            handle: handle.into(),
        }
    }
}

#[derive(Serialize)]
struct Manifest<'a> {
    handle: &'a str,
    #[serde(flatten)]
    bindings: &'a Bindings,
}

impl Renderer for JsonRenderer {
    fn render(&self, bindings: &Bindings) -> Result<String, RenderError> {
        let manifest = Manifest {
            handle: &self.handle,
            bindings,
        };
        let mut out = serde_json::to_string_pretty(&manifest)?;
        out.push('\n');
        Ok(out)
    }

    fn file_extension(&self) -> &str {
        "json"
    }
}
