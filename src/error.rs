//! Error types for header translation, configuration and module loading.

use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::parser::rules::ContextKind;

/// Top-level error type for the library API.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Generate(#[from] GenerateError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// The header construct an error was raised for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructKind {
    Directive,
    Macro,
    Alias,
    Struct,
    Enum,
    Callback,
    Function,
    Color,
}

impl fmt::Display for ConstructKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConstructKind::Directive => "directive",
            ConstructKind::Macro => "macro",
            ConstructKind::Alias => "alias",
            ConstructKind::Struct => "struct",
            ConstructKind::Enum => "enum",
            ConstructKind::Callback => "callback",
            ConstructKind::Function => "function",
            ConstructKind::Color => "color",
        };
        f.write_str(name)
    }
}

/// A fatal translation error, tagged with its 1-based source line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {construct}: {kind}")]
pub struct GenerateError {
    pub line: usize,
    pub construct: ConstructKind,
    pub kind: ErrorKind,
}

impl GenerateError {
    pub fn new(line: usize, construct: ConstructKind, kind: ErrorKind) -> Self {
        Self {
            line,
            construct,
            kind,
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[error("unknown directive @{0}")]
    UnknownDirective(String),

    #[error("malformed directive `{0}`")]
    MalformedDirective(String),

    #[error("@{0} requires a count")]
    MissingCount(String),

    #[error("@{0} count must be at least 1")]
    InvalidCount(String),

    #[error("@{0} does not take a count")]
    CountNotAllowed(String),

    #[error("overlapped block: {0} is already active")]
    OverlappedBlock(ContextKind),

    #[error("unmatched end: {0} is not active")]
    UnmatchedEnd(ContextKind),

    #[error("{0} block is never closed")]
    UnclosedBlock(ContextKind),

    #[error("{context} expects {remaining} more declaration(s)")]
    UnfinishedCountdown { context: ContextKind, remaining: u32 },

    #[error("overlapped definition: previous one is still open")]
    OverlappedDefinition,

    #[error("closing line without an open definition")]
    UnmatchedClose,

    #[error("definition is never closed")]
    UnclosedDefinition,

    #[error("definition name is empty")]
    EmptyName,

    #[error("definition `{0}` has no members")]
    EmptyDefinition(String),

    #[error("enum member `{0}` has no prefix")]
    EnumMemberWithoutPrefix(String),

    #[error("duplicate enum member `{0}`")]
    DuplicateEnumMember(String),

    #[error("invalid enum value `{0}`")]
    InvalidEnumValue(String),

    #[error("`{0}` does not match any member shape")]
    UnmatchedMember(String),

    #[error("invalid array length in `{0}`")]
    InvalidArrayLength(String),

    #[error("color channel `{0}` is out of range")]
    InvalidColorChannel(String),

    #[error("parameter `{0}` does not match any parameter shape")]
    UnmatchedParameter(String),

    #[error("callbacks cannot be variadic")]
    VariadicCallback,

    #[error("`...` must be the last parameter")]
    MisplacedVariadic,

    #[error("`{0}` cannot have type void")]
    VoidValue(String),

    #[error("invalid API macro `{0}`")]
    InvalidApiMacro(String),

    #[error(transparent)]
    Type(#[from] TypeError),
}

/// Failures of the type mapper.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("`unsigned` cannot qualify `{0}`")]
    InvalidUnsigned(String),

    #[error("arrays of void are not representable")]
    VoidArray,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to read preamble template {}: {source}", .path.display())]
    Preamble {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("no header given")]
    MissingHeader,
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("unknown format: {0}. Use python or json")]
    UnknownFormat(String),

    #[error("failed to serialize manifest: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("failed to launch interpreter `{interpreter}`: {source}")]
    Spawn {
        interpreter: String,
        #[source]
        source: io::Error,
    },

    #[error("artifact {} is not an importable module", .0.display())]
    InvalidArtifact(PathBuf),

    #[error("module `{module}` failed to import: {stderr}")]
    Import { module: String, stderr: String },

    #[error("`{expr}` failed in module `{module}`: {stderr}")]
    Eval {
        module: String,
        expr: String,
        stderr: String,
    },
}
