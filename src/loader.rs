//! Loading collaborator: turns a generated artifact into a live handle.
//!
//! Generation never depends on this module. The Python loader runs the
//! configured interpreter with the artifact's directory on `sys.path`, so
//! every call happens in a fresh interpreter process.

use log::debug;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::error::LoadError;

const IMPORT_SNIPPET: &str =
    "import importlib, sys; sys.path.insert(0, sys.argv[1]); importlib.import_module(sys.argv[2])";

const EVAL_SNIPPET: &str = "import importlib, sys; sys.path.insert(0, sys.argv[1]); \
     m = importlib.import_module(sys.argv[2]); print(eval(sys.argv[3], vars(m)))";

/// Something that can import a generated artifact.
pub trait ModuleLoader {
    type Handle;

    fn load(&self, artifact: &Path) -> Result<Self::Handle, LoadError>;
}

#[derive(Debug, Clone)]
pub struct PythonLoader {
    interpreter: String,
}

impl Default for PythonLoader {
    fn default() -> Self {
        Self {
            interpreter: "python3".to_string(),
        }
    }
}

impl PythonLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interpreter(interpreter: impl Into<String>) -> Self {
        Self {
            interpreter: interpreter.into(),
        }
    }
}

impl ModuleLoader for PythonLoader {
    type Handle = LoadedModule;

    fn load(&self, artifact: &Path) -> Result<LoadedModule, LoadError> {
        let invalid = || LoadError::InvalidArtifact(artifact.to_path_buf());
        if artifact.extension().and_then(|e| e.to_str()) != Some("py") {
            return Err(invalid());
        }
        let module = artifact
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| is_identifier(s))
            .ok_or_else(invalid)?
            .to_string();
        let dir = match artifact.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let handle = LoadedModule {
            interpreter: self.interpreter.clone(),
            dir,
            module,
        };
        debug!("importing {} from {}", handle.module, handle.dir.display());
        let output = handle.run(IMPORT_SNIPPET, &[])?;
        if !output.status.success() {
            return Err(LoadError::Import {
                module: handle.module,
                stderr: stderr_text(&output),
            });
        }
        Ok(handle)
    }
}

/// An importable generated module.
#[derive(Debug, Clone)]
pub struct LoadedModule {
    interpreter: String,
    dir: PathBuf,
    module: String,
}

impl LoadedModule {
    pub fn name(&self) -> &str {
        &self.module
    }

    /// Evaluate `expr` against the module namespace and return what it
    /// prints, without the trailing newline.
    pub fn call(&self, expr: &str) -> Result<String, LoadError> {
        let output = self.run(EVAL_SNIPPET, &[expr])?;
        if !output.status.success() {
            return Err(LoadError::Eval {
                module: self.module.clone(),
                expr: expr.to_string(),
                stderr: stderr_text(&output),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }

    fn run(&self, snippet: &str, extra: &[&str]) -> Result<Output, LoadError> {
        Command::new(&self.interpreter)
            .arg("-c")
            .arg(snippet)
            .arg(&self.dir)
            .arg(&self.module)
            .args(extra)
            .env("PYTHONDONTWRITEBYTECODE", "1")
            .output()
            .map_err(|source| LoadError::Spawn {
                interpreter: self.interpreter.clone(),
                source,
            })
    }
}

fn stderr_text(output: &Output) -> String {
    let text = String::from_utf8_lossy(&output.stderr);
    // the exception line is the useful part of a traceback
    text.lines()
        .rev()
        .find(|l| !l.trim().is_empty())
        .unwrap_or("")
        .trim()
        .to_string()
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
