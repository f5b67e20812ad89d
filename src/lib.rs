//! ctbind: Generate Python ctypes bindings from annotated C headers.
//!
//! A header opts into translation with directive comments:
//!
//! ```text
//! // @struct_begin
//! typedef struct Vector2 {
//!     float x;
//!     float y;
//! } Vector2;
//! // @struct_end
//! ```
//!
//! Generation is a pure function of the header text and the configuration:
//! [`parser::parse`] builds a [`model::Bindings`] in one forward pass and a
//! [`render::Renderer`] turns it into the artifact. [`generate_file`] wraps
//! that with the file I/O, and [`loader`] can import the result.

pub mod builder;
pub mod config;
pub mod error;
pub mod loader;
pub mod model;
pub mod parser;
pub mod render;
pub mod types;

use log::info;
use std::fs;
use std::path::PathBuf;

pub use config::{GeneratorConfig, OutputFormat};
pub use error::{Error, GenerateError};
pub use model::Bindings;

use render::Renderer;

/// Translate header text into the configured output format.
pub fn generate(source: &str, config: &GeneratorConfig) -> Result<String, Error> {
    let renderer = configured_renderer(config)?;
    translate(source, config, renderer.as_ref())
}

/// Read `config.header`, generate, and write the artifact.
///
/// Without `config.output` the artifact lands next to the header with the
/// renderer's extension. Returns the path written.
pub fn generate_file(config: &GeneratorConfig) -> Result<PathBuf, Error> {
    let header = config
        .header
        .as_deref()
        .ok_or(error::ConfigError::MissingHeader)?;
    let source = fs::read_to_string(header).map_err(|source| Error::Read {
        path: header.to_path_buf(),
        source,
    })?;

    let renderer = configured_renderer(config)?;
    let output = translate(&source, config, renderer.as_ref())?;

    let out_path = match config.output {
        Some(ref path) => path.clone(),
        None => header.with_extension(renderer.file_extension()),
    };
    fs::write(&out_path, output).map_err(|source| Error::Write {
        path: out_path.clone(),
        source,
    })?;
    info!("wrote {} from {}", out_path.display(), header.display());
    Ok(out_path)
}

fn configured_renderer(config: &GeneratorConfig) -> Result<Box<dyn Renderer>, Error> {
    let renderer = render::create_renderer(
        config.format.name(),
        render::RenderOptions {
            preamble: config.preamble_text()?,
            handle: config.handle_name.clone(),
        },
    )?;
    Ok(renderer)
}

fn translate(
    source: &str,
    config: &GeneratorConfig,
    renderer: &dyn Renderer,
) -> Result<String, Error> {
    let bindings = parser::parse(source, &config.parse_options())?;
    Ok(renderer.render(&bindings)?)
}
