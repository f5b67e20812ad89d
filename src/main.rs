//! ctbind: Generate Python ctypes bindings from an annotated C header.
//!
//! - **stdin mode**: `ctbind < raylib.h > raylib.py`
//! - **file mode**: `ctbind raylib.h -o raylib.py [--import]`

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use ctbind::config::{GeneratorConfig, OutputFormat};
use ctbind::loader::{ModuleLoader, PythonLoader};
use env_logger::Env;
use log::{debug, info};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "ctbind",
    version,
    about = "Generate Python ctypes bindings from annotated C headers"
)]
struct Cli {
    /// Annotated header. If omitted, reads from stdin.
    header: Option<PathBuf>,

    /// Output file. If omitted, writes to stdout.
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Output format: python (default) or json
    #[arg(short = 'f', long, value_enum)]
    format: Option<OutputFormat>,

    /// JSON configuration file. Command-line flags take precedence.
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Macro that starts exported function declarations
    #[arg(long)]
    api_macro: Option<String>,

    /// Name of the native library handle in generated code
    #[arg(long)]
    handle: Option<String>,

    /// Preamble template file. Supports ${library}, ${lib_windows},
    /// ${lib_linux}, ${lib_macos} and ${handle} substitution.
    #[arg(long)]
    preamble: Option<PathBuf>,

    /// Also list color palette constants in __all__
    #[arg(long)]
    export_palette: bool,

    /// Import the generated module after writing it (requires --output)
    #[arg(long)]
    import: bool,

    /// Increase log verbosity (-v info, -vv debug). RUST_LOG overrides.
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let mut config = match cli.config {
        Some(ref path) => GeneratorConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => GeneratorConfig::default(),
    };
    apply_cli_overrides(&mut config, &cli);
    debug!("configuration: {:?}", config);

    if cli.import && config.output.is_none() {
        bail!("--import requires --output");
    }

    if let (Some(header), Some(_)) = (&config.header, &config.output) {
        let path = ctbind::generate_file(&config)
            .with_context(|| format!("failed to generate bindings for {}", header.display()))?;
        if cli.import {
            import_module(&path)?;
        }
        return Ok(());
    }

    let (source, origin) = match config.header {
        Some(ref path) => (
            fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?,
            path.display().to_string(),
        ),
        None => {
            let mut input = String::new();
            io::stdin()
                .read_to_string(&mut input)
                .context("failed to read stdin")?;
            (input, "<stdin>".to_string())
        }
    };

    let output = ctbind::generate(&source, &config)
        .with_context(|| format!("failed to generate bindings for {}", origin))?;

    match config.output {
        Some(ref path) => {
            fs::write(path, &output)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!("wrote {}", path.display());
            if cli.import {
                import_module(path)?;
            }
        }
        None => print!("{}", output),
    }
    Ok(())
}

/// Command-line flags win over the configuration file.
fn apply_cli_overrides(config: &mut GeneratorConfig, cli: &Cli) {
    if let Some(ref header) = cli.header {
        config.header = Some(header.clone());
    }
    if let Some(ref output) = cli.output {
        config.output = Some(output.clone());
    }
    if let Some(format) = cli.format {
        config.format = format;
    }
    if let Some(ref api_macro) = cli.api_macro {
        config.api_macro = api_macro.clone();
    }
    if let Some(ref handle) = cli.handle {
        config.handle_name = handle.clone();
    }
    if let Some(ref preamble) = cli.preamble {
        config.preamble = Some(preamble.clone());
    }
    if cli.export_palette {
        config.export_palette = true;
    }
}

fn import_module(path: &Path) -> Result<()> {
    let module = PythonLoader::new()
        .load(path)
        .with_context(|| format!("failed to import {}", path.display()))?;
    let exports = module
        .call("len(__all__)")
        .with_context(|| format!("failed to inspect {}", module.name()))?;
    println!("imported {} ({} exports)", module.name(), exports);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "ctbind",
            "raylib.h",
            "-f",
            "py",
            "--handle",
            "_lib",
            "--export-palette",
        ]);
        let mut config = GeneratorConfig {
            format: OutputFormat::Json,
            api_macro: "MYAPI".to_string(),
            ..GeneratorConfig::default()
        };
        apply_cli_overrides(&mut config, &cli);
        assert_eq!(config.header, Some(PathBuf::from("raylib.h")));
        assert_eq!(config.format, OutputFormat::Python);
        assert_eq!(config.handle_name, "_lib");
        assert_eq!(config.api_macro, "MYAPI");
        assert!(config.export_palette);
        assert_eq!(config.output, None);
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::parse_from(["ctbind", "-vv"]);
        assert_eq!(cli.verbose, 2);
    }
}
