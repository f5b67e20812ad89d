//! Line classification: directive comments, documentation comments, code.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::ErrorKind;
use crate::parser::rules::ContextKind;

static RE_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^// @(\w+)(?: (\d+))?\s*$").unwrap());

static RE_COMMENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^// (.*)").unwrap());

const DIRECTIVE_PREFIX: &str = "// @";

/// A classified header line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    Directive(Directive),
    Doc(&'a str),
    Code(&'a str),
}

/// A parsed `// @command [N]` line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Directive {
    pub command: Command,
    pub count: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    DefineBegin,
    DefineEnd,
    FunctionsBegin,
    FunctionsEnd,
    StructBegin,
    StructEnd,
    EnumBegin,
    EnumEnd,
    ColorDefinesBegin,
    ColorDefinesEnd,
    CallbackNotation,
    DefineNameAlias,
}

/// What a command does to the rule set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Begin,
    End,
    /// Activate for a fixed number of matches.
    Countdown,
}

impl Command {
    pub fn from_name(name: &str) -> Option<Self> {
        let command = match name {
            "define_begin" => Command::DefineBegin,
            "define_end" => Command::DefineEnd,
            "functions_begin" => Command::FunctionsBegin,
            "functions_end" => Command::FunctionsEnd,
            "struct_begin" => Command::StructBegin,
            "struct_end" => Command::StructEnd,
            "enum_begin" => Command::EnumBegin,
            "enum_end" => Command::EnumEnd,
            "color_defines_begin" => Command::ColorDefinesBegin,
            "color_defines_end" => Command::ColorDefinesEnd,
            "callback_notation" => Command::CallbackNotation,
            "define_name_alias" => Command::DefineNameAlias,
            _ => return None,
        };
        Some(command)
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::DefineBegin => "define_begin",
            Command::DefineEnd => "define_end",
            Command::FunctionsBegin => "functions_begin",
            Command::FunctionsEnd => "functions_end",
            Command::StructBegin => "struct_begin",
            Command::StructEnd => "struct_end",
            Command::EnumBegin => "enum_begin",
            Command::EnumEnd => "enum_end",
            Command::ColorDefinesBegin => "color_defines_begin",
            Command::ColorDefinesEnd => "color_defines_end",
            Command::CallbackNotation => "callback_notation",
            Command::DefineNameAlias => "define_name_alias",
        }
    }

    /// Transition table: the context a command drives and how.
    pub fn transition(self) -> (ContextKind, Action) {
        match self {
            Command::DefineBegin => (ContextKind::Macro, Action::Begin),
            Command::DefineEnd => (ContextKind::Macro, Action::End),
            Command::FunctionsBegin => (ContextKind::Function, Action::Begin),
            Command::FunctionsEnd => (ContextKind::Function, Action::End),
            Command::StructBegin => (ContextKind::Struct, Action::Begin),
            Command::StructEnd => (ContextKind::Struct, Action::End),
            Command::EnumBegin => (ContextKind::Enum, Action::Begin),
            Command::EnumEnd => (ContextKind::Enum, Action::End),
            Command::ColorDefinesBegin => (ContextKind::Color, Action::Begin),
            Command::ColorDefinesEnd => (ContextKind::Color, Action::End),
            Command::CallbackNotation => (ContextKind::Callback, Action::Countdown),
            Command::DefineNameAlias => (ContextKind::NameAlias, Action::Countdown),
        }
    }
}

/// Classify one header line.
///
/// Directives are validated here: unknown commands, missing or zero counts on
/// countdown commands and counts on block commands are all rejected, as is
/// any other `// @` line.
pub fn classify(line: &str) -> Result<Line<'_>, ErrorKind> {
    if let Some(caps) = RE_DIRECTIVE.captures(line) {
        let name = &caps[1];
        let command =
            Command::from_name(name).ok_or_else(|| ErrorKind::UnknownDirective(name.to_string()))?;
        let count = match caps.get(2) {
            Some(m) => Some(
                m.as_str()
                    .parse::<u32>()
                    .map_err(|_| ErrorKind::InvalidCount(name.to_string()))?,
            ),
            None => None,
        };

        match (command.transition().1, count) {
            (Action::Countdown, None) => return Err(ErrorKind::MissingCount(name.to_string())),
            (Action::Countdown, Some(0)) => return Err(ErrorKind::InvalidCount(name.to_string())),
            (Action::Begin | Action::End, Some(_)) => {
                return Err(ErrorKind::CountNotAllowed(name.to_string()))
            }
            _ => {}
        }

        return Ok(Line::Directive(Directive { command, count }));
    }

    if line.starts_with(DIRECTIVE_PREFIX) {
        return Err(ErrorKind::MalformedDirective(line.trim_end().to_string()));
    }

    if let Some(m) = RE_COMMENT.captures(line).and_then(|caps| caps.get(1)) {
        return Ok(Line::Doc(m.as_str().trim_end()));
    }

    Ok(Line::Code(line))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_block_directive() {
        assert_eq!(
            classify("// @struct_begin").unwrap(),
            Line::Directive(Directive {
                command: Command::StructBegin,
                count: None
            })
        );
    }

    #[test]
    fn classifies_countdown_directive() {
        assert_eq!(
            classify("// @callback_notation 2").unwrap(),
            Line::Directive(Directive {
                command: Command::CallbackNotation,
                count: Some(2)
            })
        );
    }

    #[test]
    fn classifies_doc_and_code() {
        assert_eq!(classify("// Vector2 type").unwrap(), Line::Doc("Vector2 type"));
        assert_eq!(classify("    // indented").unwrap(), Line::Code("    // indented"));
        assert_eq!(classify("#define PI 3.14f").unwrap(), Line::Code("#define PI 3.14f"));
    }

    #[test]
    fn rejects_unknown_directive() {
        assert_eq!(
            classify("// @define_skip"),
            Err(ErrorKind::UnknownDirective("define_skip".to_string()))
        );
    }

    #[test]
    fn rejects_malformed_directives() {
        for line in [
            "// @struct-begin",
            "// @callback_notation two",
            "// @enum_begin // note",
        ] {
            assert_eq!(
                classify(line),
                Err(ErrorKind::MalformedDirective(line.to_string())),
                "{}",
                line
            );
        }
    }

    #[test]
    fn countdown_requires_positive_count() {
        assert_eq!(
            classify("// @define_name_alias"),
            Err(ErrorKind::MissingCount("define_name_alias".to_string()))
        );
        assert_eq!(
            classify("// @callback_notation 0"),
            Err(ErrorKind::InvalidCount("callback_notation".to_string()))
        );
    }

    #[test]
    fn block_directive_rejects_count() {
        assert_eq!(
            classify("// @enum_begin 3"),
            Err(ErrorKind::CountNotAllowed("enum_begin".to_string()))
        );
    }

    #[test]
    fn transition_table_pairs_begin_and_end() {
        assert_eq!(Command::DefineBegin.transition().0, Command::DefineEnd.transition().0);
        assert_eq!(Command::StructEnd.transition(), (ContextKind::Struct, Action::End));
    }
}
